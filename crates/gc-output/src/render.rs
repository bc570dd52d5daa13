//! End-of-run risk map export for external renderers.
//!
//! The simulator does no drawing of its own.  A [`RiskRenderer`] receives the
//! normalized map plus the geographic bounds it covers; [`JsonRiskExport`]
//! writes both to a JSON document a map front end can overlay.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use gc_core::GeoBounds;
use gc_spatial::RiskMap;
use serde::{Deserialize, Serialize};

use crate::OutputResult;

/// Consumer of the final risk map.
pub trait RiskRenderer {
    fn render(&mut self, risk: &RiskMap, bounds: GeoBounds) -> OutputResult<()>;
}

/// Serialized form of a risk map: bounds, grid size and row-major rows.
/// Row 0 is the southernmost row; column 0 the westernmost.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskExport {
    pub bounds: GeoBounds,
    pub size:   usize,
    pub rows:   Vec<Vec<u8>>,
}

impl RiskExport {
    pub fn new(risk: &RiskMap, bounds: GeoBounds) -> Self {
        Self {
            bounds,
            size: risk.size(),
            rows: risk.rows().map(<[u8]>::to_vec).collect(),
        }
    }
}

/// Writes a [`RiskExport`] as pretty-printed JSON.
pub struct JsonRiskExport {
    path: PathBuf,
}

impl JsonRiskExport {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RiskRenderer for JsonRiskExport {
    fn render(&mut self, risk: &RiskMap, bounds: GeoBounds) -> OutputResult<()> {
        let file = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(file, &RiskExport::new(risk, bounds))?;
        Ok(())
    }
}
