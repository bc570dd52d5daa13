//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use gc_agent::Population;
use gc_core::{GeoBounds, Tick};
use gc_sim::{SimObserver, StepSummary};
use gc_spatial::RiskMap;

use crate::render::RiskRenderer;
use crate::row::{AgentSnapshotRow, StepSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes step summaries, agent snapshots and the
/// final risk map to any [`OutputWriter`] backend (CSV or SQLite), then hands
/// the risk map to each registered [`RiskRenderer`].
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    bounds:     GeoBounds,
    renderers:  Vec<Box<dyn RiskRenderer>>,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`.  `bounds` is the area the risk
    /// grid covers.
    pub fn new(writer: W, bounds: GeoBounds) -> Self {
        Self {
            writer,
            bounds,
            renderers:  Vec::new(),
            last_error: None,
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn RiskRenderer>) -> Self {
        self.renderers.push(renderer);
        self
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_step_end(&mut self, summary: &StepSummary) {
        let result = self.writer.write_step_summary(&StepSummaryRow::from(summary));
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, population: &Population) {
        let rows: Vec<AgentSnapshotRow> = population
            .iter()
            .map(|agent| AgentSnapshotRow::capture(tick, agent))
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick, risk: &RiskMap) {
        let result = self.writer.write_risk_map(risk);
        self.store_err(result);

        let bounds = self.bounds;
        let results: Vec<OutputResult<()>> = self
            .renderers
            .iter_mut()
            .map(|r| r.render(risk, bounds))
            .collect();
        for result in results {
            self.store_err(result);
        }

        let result = self.writer.finish();
        self.store_err(result);
    }
}
