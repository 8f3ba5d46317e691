/// Upstream feed defaults (CWA agricultural weekly forecast, F-A0010-001)
pub const DEFAULT_ENDPOINT: &str =
    "https://opendata.cwa.gov.tw/fileapi/v1/opendataapi/F-A0010-001";
pub const DEFAULT_STORE_FILE: &str = "cwa-forecast.sqlite";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const USER_AGENT: &str = "cwa-forecast/0.1 (forecast cache)";

/// Query parameter names required by the CWA file API
pub const PARAM_AUTHORIZATION: &str = "Authorization";
pub const PARAM_DOWNLOAD_TYPE: &str = "downloadType";
pub const PARAM_FORMAT: &str = "format";
pub const DOWNLOAD_TYPE_WEB: &str = "WEB";
pub const FORMAT_JSON: &str = "JSON";

/// Temperature plausibility bounds (degrees Celsius)
pub const MIN_VALID_TEMP: f64 = -50.0;
pub const MAX_VALID_TEMP: f64 = 60.0;
pub const TEMP_TOLERANCE: f64 = 0.1;

/// Taiwan geographic bounds, used to sanity-check payload coordinates
pub const TAIWAN_MIN_LAT: f64 = 21.5;
pub const TAIWAN_MAX_LAT: f64 = 25.5;
pub const TAIWAN_MIN_LON: f64 = 119.0;
pub const TAIWAN_MAX_LON: f64 = 122.5;

/// Fallback coordinates for the six agricultural forecast regions. The weekly
/// feed names regions without coordinates, so the map layer needs these.
pub const REGION_COORDINATES: &[(&str, f64, f64)] = &[
    ("北部地區", 25.03, 121.56),
    ("東北部地區", 24.75, 121.76),
    ("中部地區", 24.14, 120.67),
    ("東部地區", 23.99, 121.60),
    ("南部地區", 22.63, 120.30),
    ("東南部地區", 22.66, 121.49),
];

/// Look up fallback coordinates for a region name.
pub fn region_coordinates(region_name: &str) -> Option<(f64, f64)> {
    REGION_COORDINATES
        .iter()
        .find(|(name, _, _)| *name == region_name)
        .map(|(_, lat, lon)| (*lat, *lon))
}
