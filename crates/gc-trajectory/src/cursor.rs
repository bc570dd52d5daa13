//! Forward-only playback over a [`TrajectorySource`].

use std::collections::VecDeque;

use crate::{TrajectoryRecord, TrajectoryResult, TrajectorySource};

/// Streams one person's records in order, pulling the next segment from the
/// source whenever the buffered one runs dry.
///
/// Empty segments (header-only files) are skipped transparently.  Once the
/// source is exhausted the cursor stays exhausted.
pub struct TrajectoryCursor {
    source:    Box<dyn TrajectorySource>,
    buffered:  VecDeque<TrajectoryRecord>,
    exhausted: bool,
    consumed:  u64,
    segments:  u32,
}

impl TrajectoryCursor {
    pub fn new(source: Box<dyn TrajectorySource>) -> Self {
        Self {
            source,
            buffered:  VecDeque::new(),
            exhausted: false,
            consumed:  0,
            segments:  0,
        }
    }

    /// The next record without consuming it.
    pub fn peek(&mut self) -> TrajectoryResult<Option<&TrajectoryRecord>> {
        self.fill()?;
        Ok(self.buffered.front())
    }

    /// Consume and return the next record.
    pub fn advance(&mut self) -> TrajectoryResult<Option<TrajectoryRecord>> {
        self.fill()?;
        let next = self.buffered.pop_front();
        if next.is_some() {
            self.consumed += 1;
        }
        Ok(next)
    }

    /// `true` once every record of every segment has been consumed.
    ///
    /// Only reflects segments already pulled from the source; call
    /// [`peek`](Self::peek) first for a definitive answer.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted && self.buffered.is_empty()
    }

    #[inline]
    pub fn label(&self) -> &str {
        self.source.label()
    }

    /// Records handed out so far.
    #[inline]
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Non-empty segments loaded so far.
    #[inline]
    pub fn segments_loaded(&self) -> u32 {
        self.segments
    }

    fn fill(&mut self) -> TrajectoryResult<()> {
        while self.buffered.is_empty() && !self.exhausted {
            match self.source.next_segment()? {
                Some(records) => {
                    if !records.is_empty() {
                        self.segments += 1;
                        self.buffered.extend(records);
                    }
                }
                None => self.exhausted = true,
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for TrajectoryCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrajectoryCursor")
            .field("label", &self.label())
            .field("buffered", &self.buffered.len())
            .field("consumed", &self.consumed)
            .field("exhausted", &self.exhausted)
            .finish()
    }
}
