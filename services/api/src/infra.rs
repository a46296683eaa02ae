use dealer_csi::config::AppConfig;
use dealer_csi::error::AppError;
use dealer_csi::telemetry;
use dealer_csi::workflows::feed::SurveyFeed;
use dealer_csi::workflows::survey::{Selection, SurveyDataset};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads config and installs the stderr subscriber for one-shot commands.
pub(crate) fn cli_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init_cli(&config.telemetry)?;
    Ok(config)
}

/// Reads a survey feed from a file, or from stdin when the path is `-`.
pub(crate) fn load_dataset(input: &Path) -> Result<SurveyDataset, AppError> {
    let dataset = if input == Path::new("-") {
        SurveyFeed::from_reader(std::io::stdin().lock())?
    } else {
        SurveyFeed::from_path(input)?
    };
    Ok(dataset)
}

pub(crate) fn parse_month(raw: &str) -> Result<Selection<u8>, String> {
    let selection: Selection<u8> = raw.parse().map_err(|err| format!("{err}"))?;
    match selection {
        Selection::Only(month) if !(1..=12).contains(&month) => {
            Err(format!("month must be between 1 and 12, got {month}"))
        }
        other => Ok(other),
    }
}
