use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Color;

/// Day thresholds shared by the zone classifier and the submission deriver.
/// Each bound is exclusive: a student is past a threshold only when the
/// elapsed days are strictly greater than it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    pub black_after: i64,
    pub red_after: i64,
    pub orange_after: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            black_after: 139,
            red_after: 83,
            orange_after: 55,
        }
    }
}

impl Thresholds {
    /// First match wins on descending thresholds.
    pub fn classify(&self, elapsed_days: i64) -> Color {
        if elapsed_days > self.black_after {
            Color::Black
        } else if elapsed_days > self.red_after {
            Color::Red
        } else if elapsed_days > self.orange_after {
            Color::Orange
        } else {
            Color::Green
        }
    }

    /// Rejects thresholds that would make a zone unreachable.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.orange_after < self.red_after && self.red_after < self.black_after) {
            anyhow::bail!(
                "thresholds must be increasing: orange {} < red {} < black {}",
                self.orange_after,
                self.red_after,
                self.black_after
            );
        }
        Ok(())
    }
}

/// Settings for a single processing run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub as_of: NaiveDate,
    pub thresholds: Thresholds,
    pub out_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_exclusive() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.classify(140), Color::Black);
        assert_eq!(thresholds.classify(139), Color::Red);
        assert_eq!(thresholds.classify(84), Color::Red);
        assert_eq!(thresholds.classify(83), Color::Orange);
        assert_eq!(thresholds.classify(56), Color::Orange);
        assert_eq!(thresholds.classify(55), Color::Green);
        assert_eq!(thresholds.classify(0), Color::Green);
        assert_eq!(thresholds.classify(-10), Color::Green);
    }

    #[test]
    fn rejects_out_of_order_thresholds() {
        let thresholds = Thresholds {
            black_after: 50,
            red_after: 83,
            orange_after: 55,
        };
        assert!(thresholds.validate().is_err());
        assert!(Thresholds::default().validate().is_ok());
    }
}
