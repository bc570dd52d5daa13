//! Per-person ages from a CSV file.
//!
//! ```csv
//! person,age
//! 000,34
//! 001,61
//! ```
//!
//! `person` is the trajectory directory name.  People missing from the file
//! keep their sampled age.

use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{PopulationError, PopulationResult};

#[derive(Deserialize)]
struct DemographicsRecord {
    person: String,
    age:    f64,
}

/// Ages keyed by person label.
pub type AgeTable = FxHashMap<String, f64>;

pub fn load_demographics(path: &Path) -> PopulationResult<AgeTable> {
    let file = std::fs::File::open(path).map_err(|source| PopulationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_demographics_reader(file, path)
}

/// Like [`load_demographics`] but accepts any `Read` source.
pub fn load_demographics_reader<R: Read>(reader: R, path: &Path) -> PopulationResult<AgeTable> {
    let mut ages = AgeTable::default();
    for result in csv::Reader::from_reader(reader).deserialize::<DemographicsRecord>() {
        let row = result.map_err(|e| PopulationError::Csv {
            path:   path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if row.age.is_nan() || row.age < 0.0 {
            return Err(PopulationError::Csv {
                path:   path.to_path_buf(),
                reason: format!("invalid age {} for {}", row.age, row.person),
            });
        }
        ages.insert(row.person.trim().to_owned(), row.age);
    }
    Ok(ages)
}
