//! Timeline construction.
//!
//! A [`Timeline`] is the full, ordered list of [`Segment`]s for one match
//! day. It is built once from a [`ScheduleConfig`] and never edited while a
//! clock runs over it; the clock keeps the per-segment countdown itself.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::storage::ScheduleConfig;

pub const SECONDS_IN_MINUTE: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Gametime,
    Breaktime,
    Downtime,
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SegmentKind::Gametime => "Gametime",
            SegmentKind::Breaktime => "Breaktime",
            SegmentKind::Downtime => "Downtime",
        };
        f.write_str(s)
    }
}

/// One timed unit of the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Game this segment belongs to. `None` for downtime.
    pub game_number: Option<u32>,
    /// Game a downtime segment leads into. `None` otherwise.
    pub next_game: Option<u32>,
    pub section_name: String,
    /// Unique across the timeline; used for jumps.
    pub full_name: String,
    pub duration_secs: i64,
    /// Lead time before the natural end at which the warning zone begins.
    pub warn_threshold_secs: f64,
    pub warn_message: String,
    pub end_message: String,
}

impl Segment {
    /// Game number shown for progress. Downtime reports the game just played.
    pub fn progress_game(&self) -> u32 {
        match (self.game_number, self.next_game) {
            (Some(game), _) => game,
            (None, Some(next)) => next.saturating_sub(1).max(1),
            (None, None) => 1,
        }
    }
}

/// Ordered sequence of segments for one configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    segments: Vec<Segment>,
}

impl Timeline {
    /// Expand a schedule into its timeline.
    ///
    /// Pure and deterministic. Assumes `config` passed
    /// [`ScheduleConfig::validate`]; an invalid config simply yields a short
    /// or empty timeline.
    pub fn build(config: &ScheduleConfig) -> Self {
        let warn_threshold_secs = config.warn_bell_time * SECONDS_IN_MINUTE as f64;
        let last_quarter = config.play_times.len().saturating_sub(1);
        let mut segments = Vec::new();

        for game in 1..=config.num_games {
            for (q, &play_min) in config.play_times.iter().enumerate() {
                let (warn_message, end_message) = if q == last_quarter {
                    ("🔔 Game ending soon!!!", "Game over")
                } else {
                    ("🔔 Quarter ending soon!!!", "End of quarter")
                };
                segments.push(Segment {
                    kind: SegmentKind::Gametime,
                    game_number: Some(game),
                    next_game: None,
                    section_name: format!("Q {}", q + 1),
                    full_name: format!("Game {} Q {}", game, q + 1),
                    duration_secs: minutes_to_secs(play_min),
                    warn_threshold_secs,
                    warn_message: warn_message.to_string(),
                    end_message: end_message.to_string(),
                });

                if let Some(&break_min) = config.break_times.get(q) {
                    segments.push(Segment {
                        kind: SegmentKind::Breaktime,
                        game_number: Some(game),
                        next_game: None,
                        section_name: format!("Break {}", q + 1),
                        full_name: format!("Game {} Break {}", game, q + 1),
                        duration_secs: minutes_to_secs(break_min),
                        warn_threshold_secs,
                        warn_message: "🔔 Next quarter starting soon!!!".to_string(),
                        end_message: "Break over".to_string(),
                    });
                }
            }

            if game < config.num_games || config.trailing_downtime {
                segments.push(Segment {
                    kind: SegmentKind::Downtime,
                    game_number: None,
                    next_game: Some(game + 1),
                    section_name: format!("Downtime {game}"),
                    full_name: format!("Downtime {game}"),
                    duration_secs: minutes_to_secs(config.down_time),
                    warn_threshold_secs,
                    warn_message: "🔔 Next game starting soon!!!".to_string(),
                    end_message: format!("Game {} starting", game + 1),
                });
            }
        }

        Self { segments }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Index of the segment with the given full name.
    pub fn position(&self, full_name: &str) -> Option<usize> {
        self.segments.iter().position(|s| s.full_name == full_name)
    }

    /// Full names in timeline order, for a "start from" selector.
    pub fn full_names(&self) -> Vec<&str> {
        self.segments.iter().map(|s| s.full_name.as_str()).collect()
    }

    pub fn total_duration_secs(&self) -> i64 {
        self.segments.iter().map(|s| s.duration_secs).sum()
    }

    pub fn count(&self, kind: SegmentKind) -> usize {
        self.segments.iter().filter(|s| s.kind == kind).count()
    }
}

fn minutes_to_secs(minutes: u32) -> i64 {
    i64::from(minutes) * SECONDS_IN_MINUTE
}
