use crate::chunk::Division;
use crate::event::{Event, MetaEvent, MetaKind, TrackEvent};

/// Tempo before the first explicit tempo event: 120 BPM.
pub const DEFAULT_MICROS_PER_QUARTER: u32 = 500_000;

/// A tempo change at an absolute tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoPoint {
    pub tick: u64,
    pub micros_per_quarter: u32,
}

/// Converts absolute tick positions into elapsed seconds.
///
/// Built once, then shared read-only by every track that runs on its clock.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    clock: Clock,
}

#[derive(Debug, Clone, PartialEq)]
enum Clock {
    Metrical {
        ticks_per_quarter_note: f64,
        /// Tick-ascending, unique ticks, always starting at tick 0.
        segments: Vec<Segment>,
    },
    /// SMPTE division: a fixed rate, tempo events do not apply.
    TimeCode { ticks_per_second: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    point: TempoPoint,
    /// Elapsed seconds at `point.tick`.
    seconds: f64,
}

impl TempoMap {
    /// Builds a map from tempo points given in any order.
    ///
    /// When several points share a tick, the one given last wins.
    pub fn new(division: Division, points: impl IntoIterator<Item = TempoPoint>) -> Self {
        let clock = match division {
            Division::Metrical {
                ticks_per_quarter_note,
            } => Clock::Metrical {
                ticks_per_quarter_note: f64::from(ticks_per_quarter_note),
                segments: Self::segments(f64::from(ticks_per_quarter_note), points),
            },
            Division::TimeCode {
                smpte_format,
                ticks_per_frame,
            } => Clock::TimeCode {
                ticks_per_second: smpte_format.frames_per_second() * f64::from(ticks_per_frame),
            },
        };
        Self { clock }
    }

    /// Builds a map from the tempo events found in the given decoded tracks.
    pub fn from_tracks<'t, 'a: 't>(
        division: Division,
        tracks: impl IntoIterator<Item = &'t [TrackEvent<'a>]>,
    ) -> Self {
        let points: Vec<_> = tracks.into_iter().flat_map(tempo_points).collect();
        if matches!(division, Division::TimeCode { .. }) && !points.is_empty() {
            log::debug!(
                "ignoring {} tempo events under SMPTE division",
                points.len()
            );
        }
        Self::new(division, points)
    }

    /// Elapsed seconds from the start of the track to `tick`.
    pub fn seconds_at(&self, tick: u64) -> f64 {
        match &self.clock {
            Clock::Metrical {
                ticks_per_quarter_note,
                segments,
            } => {
                // segments[0] sits at tick 0, so the index is never below 1
                let index = segments.partition_point(|segment| segment.point.tick <= tick);
                let Segment { point, seconds } = segments[index - 1];
                seconds
                    + elapsed(
                        tick - point.tick,
                        point.micros_per_quarter,
                        *ticks_per_quarter_note,
                    )
            }
            Clock::TimeCode { ticks_per_second } => tick as f64 / ticks_per_second,
        }
    }

    fn segments(
        ticks_per_quarter_note: f64,
        points: impl IntoIterator<Item = TempoPoint>,
    ) -> Vec<Segment> {
        let mut points: Vec<_> = points.into_iter().collect();
        points.sort_by_key(|point| point.tick);

        let mut segments = Vec::with_capacity(points.len() + 1);
        let mut current = Segment {
            point: TempoPoint {
                tick: 0,
                micros_per_quarter: DEFAULT_MICROS_PER_QUARTER,
            },
            seconds: 0.0,
        };
        for point in points {
            if point.tick == current.point.tick {
                current.point = point;
                continue;
            }
            let seconds = current.seconds
                + elapsed(
                    point.tick - current.point.tick,
                    current.point.micros_per_quarter,
                    ticks_per_quarter_note,
                );
            segments.push(current);
            current = Segment { point, seconds };
        }
        segments.push(current);
        segments
    }
}

fn elapsed(ticks: u64, micros_per_quarter: u32, ticks_per_quarter_note: f64) -> f64 {
    ticks as f64 * f64::from(micros_per_quarter) / (ticks_per_quarter_note * 1_000_000.0)
}

/// Tempo changes of one track, tagged with their absolute ticks.
fn tempo_points(events: &[TrackEvent<'_>]) -> Vec<TempoPoint> {
    let mut tick = 0u64;
    let mut points = Vec::new();
    for event in events {
        tick += u64::from(event.delta);
        let Event::Meta(meta @ MetaEvent {
            kind: MetaKind::Tempo,
            ..
        }) = event.event
        else {
            continue;
        };
        match meta.tempo() {
            Some(micros_per_quarter) => points.push(TempoPoint {
                tick,
                micros_per_quarter,
            }),
            None => log::debug!("ignoring malformed tempo {:02X?} at tick {tick}", meta.data),
        }
    }
    points
}
