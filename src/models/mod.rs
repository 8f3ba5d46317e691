pub mod dataset;
pub mod location;
pub mod reading;

pub use dataset::{Dataset, DatasetRow};
pub use location::Location;
pub use reading::{NormalizedBatch, TemperatureReading};
