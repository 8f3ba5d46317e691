use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::constants::{MAX_VALID_TEMP, MIN_VALID_TEMP, TEMP_TOLERANCE};

/// One day of forecast temperatures for a region. Natural key is
/// `(region_id, valid_time)`; re-fetching the same window overwrites.
///
/// A `None` temperature means the upstream value was missing or not numeric.
/// It is stored as SQL NULL rather than dropping the whole reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub region_id: String,
    pub valid_time: NaiveDate,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
}

impl TemperatureReading {
    pub fn new(
        region_id: String,
        valid_time: NaiveDate,
        min_temp: Option<f64>,
        max_temp: Option<f64>,
    ) -> Self {
        Self {
            region_id,
            valid_time,
            min_temp,
            max_temp,
        }
    }

    /// Both temperatures present, inside plausibility bounds, and ordered.
    /// Used to decide whether a parsed record is worth keeping as-is.
    pub fn is_plausible(&self) -> bool {
        let in_bounds =
            |t: f64| (MIN_VALID_TEMP..=MAX_VALID_TEMP).contains(&t);

        if let Some(min) = self.min_temp {
            if !in_bounds(min) {
                return false;
            }
        }
        if let Some(max) = self.max_temp {
            if !in_bounds(max) {
                return false;
            }
        }
        if let (Some(min), Some(max)) = (self.min_temp, self.max_temp) {
            if min > max + TEMP_TOLERANCE {
                return false;
            }
        }
        true
    }

    pub fn has_any_temperature(&self) -> bool {
        self.min_temp.is_some() || self.max_temp.is_some()
    }
}

/// Output of one normalization pass: locations and readings in upstream
/// order, plus the number of records skipped as malformed.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub locations: Vec<super::Location>,
    pub readings: Vec<TemperatureReading>,
    pub skipped: usize,
}
