use free_piano_midi::{decode, decode_with, DecodeOptions, Error, NoteInterval};
use pretty_assertions::assert_eq;

const END_OF_TRACK: &[u8] = &[0, 0xFF, 0x2F, 0];

fn init_logger() {
    env_logger::builder()
        .is_test(true)
        .try_init()
        .unwrap_or_default();
}

/// Assembles a file from a header and already framed `MTrk` bodies.
fn smf(format: u16, division: u16, tracks: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes = b"MThd\0\0\0\x06".to_vec();
    bytes.extend(format.to_be_bytes());
    bytes.extend((tracks.len() as u16).to_be_bytes());
    bytes.extend(division.to_be_bytes());
    for track in tracks {
        bytes.extend(b"MTrk");
        bytes.extend((track.len() as u32).to_be_bytes());
        bytes.extend(track);
    }
    bytes
}

fn track(events: &[&[u8]]) -> Vec<u8> {
    events.concat()
}

fn tempo(delta: u8, micros_per_quarter: u32) -> Vec<u8> {
    let [_, a, b, c] = micros_per_quarter.to_be_bytes();
    vec![delta, 0xFF, 0x51, 3, a, b, c]
}

fn note(start: f64, end: f64, code: u8) -> NoteInterval {
    NoteInterval { start, end, code }
}

#[test]
fn running_status_note_off_closes_note() {
    init_logger();
    // 96 ticks per quarter at 120 BPM: 10 ticks are 50/960 s
    let bytes = smf(0, 96, &[track(&[&[0, 0x90, 64, 100], &[10, 64, 0], END_OF_TRACK])]);
    let notes = decode(&bytes).unwrap();
    assert_eq!(notes, vec![note(0.0, 10.0 * 500_000.0 / 96e6, 64)]);
}

#[test]
fn running_status_without_matching_note_on() {
    // the second event is a note off for 64, which never started; 60 is closed at the end
    let bytes = smf(0, 96, &[track(&[&[0, 0x90, 60, 64], &[10, 64, 0], END_OF_TRACK])]);
    let notes = decode(&bytes).unwrap();
    assert_eq!(notes, vec![note(0.0, 10.0 * 500_000.0 / 96e6, 60)]);
}

#[test]
fn default_tempo_quarter_note_is_half_a_second() {
    let bytes = smf(
        0,
        480,
        &[track(&[&[0, 0x90, 60, 100], &[0x83, 0x60, 0x80, 60, 0], END_OF_TRACK])],
    );
    let notes = decode(&bytes).unwrap();
    assert_eq!(notes, vec![note(0.0, 0.5, 60)]);
    assert_eq!(notes[0].duration(), 0.5);
}

#[test]
fn tempo_change_in_first_track_applies_to_all_tracks() {
    // 480 ticks = 0x83 0x60
    let conductor = track(&[
        &tempo(0, 500_000),
        &[0x83, 0x60, 0xFF, 0x51, 3, 0x0F, 0x42, 0x40],
        END_OF_TRACK,
    ]);
    let melody = track(&[
        &[0, 0x90, 60, 100],
        &[0x83, 0x60, 0x80, 60, 0],
        &[0, 0x90, 62, 100],
        &[0x83, 0x60, 0x80, 62, 0],
        END_OF_TRACK,
    ]);
    let notes = decode(&smf(1, 480, &[conductor, melody])).unwrap();
    assert_eq!(notes, vec![note(0.0, 0.5, 60), note(0.5, 1.5, 62)]);
    assert_eq!(notes[1].duration(), 2.0 * notes[0].duration());
}

#[test]
fn format_2_tracks_keep_their_own_tempo() {
    init_logger();
    let slow = track(&[
        &tempo(0, 1_000_000),
        &[0, 0x90, 60, 100],
        &[96, 0x80, 60, 0],
        END_OF_TRACK,
    ]);
    let default = track(&[&[0, 0x90, 62, 100], &[96, 0x80, 62, 0], END_OF_TRACK]);
    let notes = decode(&smf(2, 96, &[slow, default])).unwrap();
    assert_eq!(notes, vec![note(0.0, 1.0, 60), note(0.0, 0.5, 62)]);
}

#[test]
fn smpte_division_uses_a_fixed_rate() {
    // 25 fps, 40 ticks per frame: one tick per millisecond, tempo has no effect
    let bytes = smf(
        0,
        0xE728,
        &[track(&[
            &tempo(0, 2_000_000),
            &[0, 0x90, 60, 100],
            &[0x87, 0x68, 0x80, 60, 0],
            END_OF_TRACK,
        ])],
    );
    assert_eq!(decode(&bytes).unwrap(), vec![note(0.0, 1.0, 60)]);
}

#[test]
fn velocity_zero_note_on_equals_note_off() {
    let with_note_on = smf(0, 96, &[track(&[&[0, 0x90, 60, 64], &[48, 0x90, 60, 0]])]);
    let with_note_off = smf(0, 96, &[track(&[&[0, 0x90, 60, 64], &[48, 0x80, 60, 0]])]);
    assert_eq!(decode(&with_note_on).unwrap(), decode(&with_note_off).unwrap());
    assert_eq!(decode(&with_note_on).unwrap(), vec![note(0.0, 0.25, 60)]);
}

#[test]
fn truncated_track_chunk_is_an_error() {
    let mut bytes = smf(0, 96, &[track(&[&[0, 0x90, 60, 64], &[48, 0x80, 60, 0]])]);
    // declare 16 more bytes than present
    bytes[21] += 16;
    assert!(matches!(
        decode(&bytes),
        Err(Error::TruncatedData { offset: 22, .. })
    ));

    let bytes = smf(0, 96, &[track(&[&[0, 0x90, 60]])]);
    assert!(matches!(decode(&bytes), Err(Error::TruncatedData { .. })));
}

#[test]
fn not_a_midi_file() {
    assert_eq!(
        decode(b"RIFF\0\0\0\x06\0\0\0\x01\0\x60"),
        Err(Error::BadMagic { found: *b"RIFF" })
    );
}

#[test]
fn decode_error_reports_offset() {
    let bytes = smf(0, 96, &[track(&[&[0, 60, 64]])]);
    let error = decode(&bytes).unwrap_err();
    assert_eq!(error.offset(), Some(23));
    assert!(matches!(error, Error::Decode { .. }));
}

#[test]
fn output_is_ordered_and_complete() {
    init_logger();
    let drums = track(&[
        &[0, 0x99, 36, 100],
        &[0, 0x99, 42, 100],
        &[24, 0x89, 36, 0],
        &[0, 42, 0],
        &[0, 0x99, 38, 100],
        END_OF_TRACK,
    ]);
    let piano = track(&[
        &[0, 0x90, 72, 100],
        &[0, 60, 100],
        &[12, 60, 100],
        &[12, 0x80, 60, 0],
        &[12, 60, 0],
        &[0, 0xFF, 0x01, 3, b'e', b'n', b'd'],
        &[0, 72, 0],
        &[0, 0x80, 50, 0],
        &[48, 0xFF, 0x2F, 0],
    ]);
    let bytes = smf(1, 96, &[drums, piano]);
    let notes = decode(&bytes).unwrap();

    // 3 drum hits, 3 piano notes; the stray note off for 50 produces nothing
    assert_eq!(notes.len(), 6);
    for note in &notes {
        assert!(note.start >= 0.0 && note.end >= note.start, "{note:?}");
        assert!(note.code <= 127);
    }
    for pair in notes.windows(2) {
        assert!(
            (pair[0].start, pair[0].code) <= (pair[1].start, pair[1].code),
            "{pair:?}"
        );
    }

    let codes: Vec<_> = notes.iter().map(|note| note.code).collect();
    assert_eq!(codes, vec![36, 42, 60, 72, 60, 38]);
    // the drum track has no note off for 38, so it closes at its end of track
    assert_eq!(notes[5], note(0.125, 0.125, 38));
    // retriggered 60: the second note on is closed first
    assert_eq!(notes[4], note(0.0625, 0.125, 60));
    assert_eq!(notes[2], note(0.0, 0.1875, 60));

    let no_drums = decode_with(
        &bytes,
        &DecodeOptions {
            skip_percussion: true,
            ..DecodeOptions::default()
        },
    )
    .unwrap();
    assert_eq!(no_drums.len(), 3);
    assert!(no_drums.iter().all(|note| note.code >= 60));
}

#[test]
fn unknown_chunks_and_meta_events_are_skipped() {
    let mut bytes = smf(
        0,
        96,
        &[track(&[
            &[0, 0xFF, 0x03, 5, b'p', b'i', b'a', b'n', b'o'],
            &[0, 0xFF, 0x58, 4, 4, 2, 24, 8],
            &[0, 0x90, 60, 100],
            &[96, 0x80, 60, 0],
            END_OF_TRACK,
        ])],
    );
    bytes.extend(b"XFKM\0\0\0\x02ab");
    assert_eq!(decode(&bytes).unwrap(), vec![note(0.0, 0.5, 60)]);
}

#[test]
fn serializes_as_array_of_objects() {
    let notes = vec![note(0.0, 0.5, 60)];
    let json = serde_json::to_value(&notes).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{ "start": 0.0, "end": 0.5, "code": 60 }])
    );
}
