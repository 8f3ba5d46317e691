use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::constants::{
    TAIWAN_MAX_LAT, TAIWAN_MAX_LON, TAIWAN_MIN_LAT, TAIWAN_MIN_LON,
};

/// A forecast region from the upstream feed. `region_id` is the upstream
/// geocode when the payload carries one, otherwise the region name itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Location {
    #[validate(length(min = 1))]
    pub region_id: String,

    #[validate(length(min = 1))]
    pub region_name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl Location {
    pub fn new(region_id: String, region_name: String, latitude: f64, longitude: f64) -> Self {
        Self {
            region_id,
            region_name,
            latitude,
            longitude,
        }
    }

    pub fn is_within_taiwan_bounds(&self) -> bool {
        self.latitude >= TAIWAN_MIN_LAT
            && self.latitude <= TAIWAN_MAX_LAT
            && self.longitude >= TAIWAN_MIN_LON
            && self.longitude <= TAIWAN_MAX_LON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_validation() {
        let location = Location::new(
            "北部地區".to_string(),
            "北部地區".to_string(),
            25.03,
            121.56,
        );

        assert!(location.validate().is_ok());
        assert!(location.is_within_taiwan_bounds());
    }

    #[test]
    fn test_invalid_coordinates() {
        let location = Location::new(
            "somewhere".to_string(),
            "Somewhere".to_string(),
            91.0,
            121.56,
        );

        assert!(location.validate().is_err());
    }

    #[test]
    fn test_empty_region_name_rejected() {
        let location = Location::new("id".to_string(), String::new(), 25.0, 121.5);
        assert!(location.validate().is_err());
    }

    #[test]
    fn test_outside_taiwan_bounds() {
        let london = Location::new("london".to_string(), "London".to_string(), 51.5, -0.12);
        assert!(london.validate().is_ok());
        assert!(!london.is_within_taiwan_bounds());
    }
}
