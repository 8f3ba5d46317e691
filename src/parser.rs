//! Normalizes the upstream forecast JSON into flat location and reading
//! records. The CWA file API has shifted its nesting over schema versions,
//! so traversal is best-effort: known paths first, then a bounded search.
//! Individual malformed records are skipped and counted, never fatal.

use chrono::NaiveDate;
use serde_json::Value;
use validator::Validate;

use crate::error::ParseError;
use crate::models::{Location, NormalizedBatch, TemperatureReading};
use crate::utils::constants::region_coordinates;

/// Maximum depth for the fallback search of the location array. The known
/// schema sits at depth 7; anything much deeper is not this feed.
const MAX_SEARCH_DEPTH: usize = 10;

/// Flatten a raw payload into locations and min/max temperature readings.
///
/// Fails only when the payload is not JSON, not an object, or carries no
/// recognizable forecast location array.
pub fn normalize(raw: &str) -> Result<NormalizedBatch, ParseError> {
    let root: Value = serde_json::from_str(raw)?;
    if !root.is_object() {
        return Err(ParseError::UnexpectedRoot);
    }

    let location_nodes = find_location_array(&root).ok_or(ParseError::MissingLocations)?;

    let mut batch = NormalizedBatch::default();
    for node in location_nodes {
        flatten_location(node, &mut batch);
    }

    if batch.skipped > 0 {
        tracing::warn!(skipped = batch.skipped, "skipped malformed forecast records");
    }

    Ok(batch)
}

/// Locate the array of forecast locations. Tries the documented path for the
/// weekly agricultural feed first, then searches the tree for any `location`
/// array whose entries look like forecast locations.
fn find_location_array(root: &Value) -> Option<&Vec<Value>> {
    const KNOWN_PATH: [&str; 7] = [
        "cwaopendata",
        "resources",
        "resource",
        "data",
        "agrWeatherForecasts",
        "weatherForecasts",
        "location",
    ];

    let mut node = root;
    let mut followed = true;
    for key in KNOWN_PATH {
        match node.get(key) {
            Some(next) => node = next,
            None => {
                followed = false;
                break;
            }
        }
    }
    if followed {
        if let Some(array) = node.as_array() {
            return Some(array);
        }
    }

    search_location_array(root, 0)
}

fn search_location_array(node: &Value, depth: usize) -> Option<&Vec<Value>> {
    if depth > MAX_SEARCH_DEPTH {
        return None;
    }

    if let Some(object) = node.as_object() {
        for (key, child) in object {
            if key == "location" {
                if let Some(array) = child.as_array() {
                    if array.iter().any(looks_like_location) {
                        return Some(array);
                    }
                }
            }
            if let Some(found) = search_location_array(child, depth + 1) {
                return Some(found);
            }
        }
    }

    None
}

fn looks_like_location(node: &Value) -> bool {
    node.get("locationName").and_then(Value::as_str).is_some()
}

/// Flatten one location node into a `Location` plus its daily readings.
/// A node without a usable name or coordinates is skipped whole.
fn flatten_location(node: &Value, batch: &mut NormalizedBatch) {
    let Some(region_name) = node.get("locationName").and_then(Value::as_str) else {
        tracing::warn!("location node without locationName, skipping");
        batch.skipped += 1;
        return;
    };

    let region_id = node
        .get("geocode")
        .and_then(value_as_string)
        .unwrap_or_else(|| region_name.to_string());

    let coords = payload_coordinates(node).or_else(|| region_coordinates(region_name));
    let Some((latitude, longitude)) = coords else {
        tracing::warn!(region = region_name, "no coordinates for region, skipping");
        batch.skipped += 1;
        return;
    };

    let location = Location::new(region_id.clone(), region_name.to_string(), latitude, longitude);
    if location.validate().is_err() {
        tracing::warn!(region = region_name, "location failed validation, skipping");
        batch.skipped += 1;
        return;
    }
    if !location.is_within_taiwan_bounds() {
        tracing::debug!(region = region_name, "coordinates outside Taiwan bounds");
    }

    let max_daily = element_daily(node, "MaxT").unwrap_or_default();
    let min_daily = element_daily(node, "MinT").unwrap_or_default();
    let readings = join_daily(&region_id, region_name, &min_daily, &max_daily, batch);

    batch.locations.push(location);
    batch.readings.extend(readings);
}

/// Join the min and max daily arrays by date, preserving the max array's
/// upstream order and appending min-only dates afterwards.
fn join_daily(
    region_id: &str,
    region_name: &str,
    min_daily: &[&Value],
    max_daily: &[&Value],
    batch: &mut NormalizedBatch,
) -> Vec<TemperatureReading> {
    let mut min_by_date: Vec<(NaiveDate, Option<f64>)> = Vec::new();
    for entry in min_daily {
        match entry_date(entry) {
            Some(date) => min_by_date.push((date, entry_temperature(entry))),
            None => {
                tracing::warn!(region = region_name, "daily record without date, skipping");
                batch.skipped += 1;
            }
        }
    }

    let mut readings = Vec::new();
    for entry in max_daily {
        let Some(date) = entry_date(entry) else {
            tracing::warn!(region = region_name, "daily record without date, skipping");
            batch.skipped += 1;
            continue;
        };
        let max_temp = entry_temperature(entry);
        let min_temp = match min_by_date.iter().position(|(d, _)| *d == date) {
            Some(idx) => min_by_date.remove(idx).1,
            None => None,
        };

        push_reading(
            TemperatureReading::new(region_id.to_string(), date, min_temp, max_temp),
            region_name,
            &mut readings,
            batch,
        );
    }

    // Dates present only in the min series still carry usable data.
    for (date, min_temp) in min_by_date {
        push_reading(
            TemperatureReading::new(region_id.to_string(), date, min_temp, None),
            region_name,
            &mut readings,
            batch,
        );
    }

    readings
}

fn push_reading(
    reading: TemperatureReading,
    region_name: &str,
    readings: &mut Vec<TemperatureReading>,
    batch: &mut NormalizedBatch,
) {
    if reading.is_plausible() {
        readings.push(reading);
    } else {
        tracing::warn!(
            region = region_name,
            date = %reading.valid_time,
            "implausible temperature pair, skipping"
        );
        batch.skipped += 1;
    }
}

/// The daily array for one weather element, accepting both schema shapes:
/// an object keyed by element name (`weatherElements.MaxT.daily`) and an
/// array of `{elementName, daily}` entries (`weatherElement[..]`).
fn element_daily<'a>(node: &'a Value, element: &str) -> Option<Vec<&'a Value>> {
    let elements = node
        .get("weatherElements")
        .or_else(|| node.get("weatherElement"))?;

    let daily = if let Some(object) = elements.as_object() {
        object.get(element)?.get("daily")?
    } else if let Some(array) = elements.as_array() {
        array
            .iter()
            .find(|e| e.get("elementName").and_then(Value::as_str) == Some(element))?
            .get("daily")?
    } else {
        return None;
    };

    Some(daily.as_array()?.iter().collect())
}

/// Coordinates from the location node itself, when the schema carries them.
/// The weekly feed usually does not, in which case the caller falls back to
/// the built-in region table.
fn payload_coordinates(node: &Value) -> Option<(f64, f64)> {
    let lat = numeric_field(node.get("latitude").or_else(|| node.get("lat"))?)?;
    let lon = numeric_field(node.get("longitude").or_else(|| node.get("lon"))?)?;
    Some((lat, lon))
}

fn numeric_field(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn entry_date(entry: &Value) -> Option<NaiveDate> {
    let text = entry
        .get("dataDate")
        .or_else(|| entry.get("date"))
        .and_then(Value::as_str)?;

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y/%m/%d"))
        .ok()
}

/// Temperature values arrive as strings in this feed, occasionally as bare
/// numbers, and sometimes as "-" for missing. Anything non-numeric becomes
/// `None` rather than failing the record.
fn entry_temperature(entry: &Value) -> Option<f64> {
    numeric_field(entry.get("temperature")?)
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
