#[cfg(test)]
use std::cell::RefCell;

use tracing::info;

/// Checkpoints of a processing run, in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Zones,
    Submissions,
    Resolve,
    CarryForward,
    Purple,
    Snapshot,
    ChangeLists,
    TagCounts,
    Changes,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Zones => "zone classification",
            Stage::Submissions => "submission tags",
            Stage::Resolve => "tag resolution",
            Stage::CarryForward => "inactive carry-forward",
            Stage::Purple => "purple override",
            Stage::Snapshot => "snapshot assembly",
            Stage::ChangeLists => "change-lists",
            Stage::TagCounts => "tag counts",
            Stage::Changes => "change detection",
        }
    }
}

/// Receives stage checkpoints from the pipeline.
pub trait ProgressSink {
    fn finished(&self, stage: Stage, items: usize);
}

/// Logs each checkpoint at info level.
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn finished(&self, stage: Stage, items: usize) {
        info!(stage = stage.label(), items, "finished {}", stage.label());
    }
}

/// Collects checkpoints in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub checkpoints: RefCell<Vec<(Stage, usize)>>,
}

#[cfg(test)]
impl ProgressSink for RecordingProgress {
    fn finished(&self, stage: Stage, items: usize) {
        self.checkpoints.borrow_mut().push((stage, items));
    }
}
