use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::cli::args::{Cli, Commands};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{Dataset, DatasetRow};
use crate::pipeline::{Pipeline, PipelineOutcome};
use crate::store::Store;
use crate::utils::progress::ProgressReporter;

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Sync {
            refresh,
            api_key,
            endpoint,
            store,
            timeout_secs,
        } => {
            let config = PipelineConfig::new(api_key)
                .with_endpoint(endpoint)
                .with_store_path(store)
                .with_timeout(Duration::from_secs(timeout_secs))
                .with_refresh(refresh);

            let pipeline = Pipeline::new(config)?;

            let progress = ProgressReporter::new_spinner("Syncing forecast data...", false);
            let outcome = pipeline.run().await?;
            progress.finish_with_message("Sync complete");

            report_outcome(&outcome);
        }

        Commands::Show {
            store,
            date,
            region,
            limit,
        } => {
            let dataset = Store::new(store).read_all()?;
            if dataset.is_empty() {
                println!("Store is empty - run `cwa-forecast sync` first");
                return Ok(());
            }

            let rows: Vec<&DatasetRow> = dataset
                .rows
                .iter()
                .filter(|r| date.map_or(true, |d| r.valid_time == d))
                .filter(|r| {
                    region
                        .as_deref()
                        .map_or(true, |name| r.region_name == name)
                })
                .collect();

            print_table(&rows, limit);
            print_summary(&dataset);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Ignore the error if a subscriber is already installed (tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn report_outcome(outcome: &PipelineOutcome) {
    match outcome {
        PipelineOutcome::Fresh { dataset, skipped } => {
            println!("Fetched fresh forecast: {} readings", dataset.len());
            if *skipped > 0 {
                println!("Skipped {} malformed records", skipped);
            }
        }
        PipelineOutcome::Cached(dataset) => {
            println!("Serving cached forecast: {} readings", dataset.len());
        }
        PipelineOutcome::Stale { dataset, cause } => {
            println!(
                "Refresh failed ({}), showing previous snapshot: {} readings",
                cause,
                dataset.len()
            );
        }
    }
}

fn print_table(rows: &[&DatasetRow], limit: usize) {
    println!(
        "{:<14} {:<12} {:>8} {:>8}",
        "Region", "Date", "Min °C", "Max °C"
    );

    let shown = if limit > 0 { limit } else { rows.len() };
    for row in rows.iter().take(shown) {
        println!(
            "{:<14} {:<12} {:>8} {:>8}",
            row.region_name,
            row.valid_time,
            format_temp(row.min_temp),
            format_temp(row.max_temp),
        );
    }
    if rows.len() > shown {
        println!("... {} more rows", rows.len() - shown);
    }
}

fn print_summary(dataset: &Dataset) {
    let Some((start, end)) = dataset.date_range() else {
        return;
    };

    println!(
        "\n{} regions, {} readings, {} to {}",
        dataset.region_names().len(),
        dataset.len(),
        start,
        end
    );

    let hottest = dataset
        .rows
        .iter()
        .filter_map(|r| r.max_temp.map(|t| (r, t)))
        .max_by(|a, b| a.1.total_cmp(&b.1));
    let coldest = dataset
        .rows
        .iter()
        .filter_map(|r| r.min_temp.map(|t| (r, t)))
        .min_by(|a, b| a.1.total_cmp(&b.1));

    if let Some((row, temp)) = hottest {
        println!("Hottest: {} {:.1}°C on {}", row.region_name, temp, row.valid_time);
    }
    if let Some((row, temp)) = coldest {
        println!("Coldest: {} {:.1}°C on {}", row.region_name, temp, row.valid_time);
    }
}

fn format_temp(temp: Option<f64>) -> String {
    match temp {
        Some(t) => format!("{:.1}", t),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_format_temp() {
        assert_eq!(format_temp(Some(33.25)), "33.2");
        assert_eq!(format_temp(None), "-");
    }

    #[test]
    fn test_summary_handles_all_null_temperatures() {
        let dataset = Dataset::new(vec![DatasetRow {
            region_id: "北部地區".into(),
            region_name: "北部地區".into(),
            latitude: 25.03,
            longitude: 121.56,
            valid_time: NaiveDate::from_ymd_opt(2025, 8, 24).unwrap(),
            min_temp: None,
            max_temp: None,
        }]);

        // Must not panic when no row carries a numeric temperature.
        print_summary(&dataset);
    }
}
