use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One joined row of the output dataset: a temperature reading with its
/// region metadata attached. This is the only shape the visualization layer
/// consumes; it cannot tell whether the row came from the network or cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub region_id: String,
    pub region_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub valid_time: NaiveDate,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
}

/// Ordered sequence of joined rows, produced fresh per read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub rows: Vec<DatasetRow>,
}

impl Dataset {
    pub fn new(rows: Vec<DatasetRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct region names in row order.
    pub fn region_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !names.contains(&row.region_name.as_str()) {
                names.push(&row.region_name);
            }
        }
        names
    }

    /// Earliest and latest forecast dates in the dataset.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.rows.iter().map(|r| r.valid_time).min()?;
        let max = self.rows.iter().map(|r| r.valid_time).max()?;
        Some((min, max))
    }

    /// Rows for a single forecast date, in stored order.
    pub fn rows_for_date(&self, date: NaiveDate) -> Vec<&DatasetRow> {
        self.rows.iter().filter(|r| r.valid_time == date).collect()
    }
}
