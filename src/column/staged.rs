use super::Column;
use crate::error::ColumnError;
use crate::wire::{InputChannel, OutputChannel};

/// Progress through the staged load/save protocol.
///
/// Stages only move forward, one at a time: `Idle → PrefixDone → BodyDone → SuffixDone`.
/// Loading stops at `BodyDone`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    PrefixDone,
    BodyDone,
    SuffixDone,
}

impl Stage {
    fn next(self) -> Option<Stage> {
        match self {
            Stage::Idle => Some(Stage::PrefixDone),
            Stage::PrefixDone => Some(Stage::BodyDone),
            Stage::BodyDone => Some(Stage::SuffixDone),
            Stage::SuffixDone => None,
        }
    }
}

/// Runs the stages of one load or save in order and refuses to continue after a failure.
#[derive(Debug, Default)]
pub(crate) struct StageTracker {
    current: Stage,
    failed: bool,
}

impl StageTracker {
    pub(crate) fn current(&self) -> Stage {
        self.current
    }

    pub(crate) fn run<F>(&mut self, to: Stage, stage: F) -> Result<(), ColumnError>
    where
        F: FnOnce() -> Result<(), ColumnError>,
    {
        if self.failed || self.current.next() != Some(to) {
            return Err(ColumnError::ProtocolOrderViolation {
                from: self.current,
                to,
            });
        }
        match stage() {
            Ok(()) => {
                self.current = to;
                Ok(())
            }
            Err(e) => {
                self.failed = true;
                tracing::debug!(from=?self.current, ?to, err=%e, "column stage failed");
                Err(e)
            }
        }
    }
}

/// Streaming a whole column.
///
/// This is implemented for every [`Column`] and cannot be overridden, so the order of the
/// stages is the same for every column type.
pub trait ColumnIo: Column {
    /// Replace the contents of this column with `rows` rows read from `input`.
    ///
    /// The body is only read if the prefix was read successfully. If either stage fails the
    /// column contents are unspecified; discard the column or load it again from the start.
    /// [`ColumnError::is_end_of_data`] tells whether the input simply ran out.
    fn load(&mut self, input: &mut dyn InputChannel, rows: usize) -> Result<(), ColumnError>;

    /// Write the prefix, body and suffix of this column to `output`.
    ///
    /// The first failing stage stops the sequence. Bytes already written are not rolled back.
    fn save(&self, output: &mut dyn OutputChannel) -> Result<(), ColumnError>;
}

impl<C: Column + ?Sized> ColumnIo for C {
    fn load(&mut self, input: &mut dyn InputChannel, rows: usize) -> Result<(), ColumnError> {
        tracing::trace!(column=%self.type_name(), rows, "loading column");
        let mut stages = StageTracker::default();
        stages.run(Stage::PrefixDone, || self.load_prefix(input, rows))?;
        stages.run(Stage::BodyDone, || self.load_body(input, rows))
    }

    fn save(&self, output: &mut dyn OutputChannel) -> Result<(), ColumnError> {
        tracing::trace!(column=%self.type_name(), rows=self.size(), "saving column");
        let mut stages = StageTracker::default();
        stages.run(Stage::PrefixDone, || self.save_prefix(output))?;
        stages.run(Stage::BodyDone, || self.save_body(output))?;
        stages.run(Stage::SuffixDone, || self.save_suffix(output))?;
        debug_assert_eq!(stages.current(), Stage::SuffixDone);
        Ok(())
    }
}
