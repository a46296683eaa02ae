//! Loader for the survey collections exported by the dealership data service.

use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::workflows::survey::SurveyDataset;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("failed to read survey feed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid survey feed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct SurveyFeed;

impl SurveyFeed {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<SurveyDataset, FeedError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<SurveyDataset, FeedError> {
        let dataset: SurveyDataset = serde_json::from_reader(reader)?;
        log_loaded(&dataset);
        Ok(dataset)
    }

    pub fn from_json(raw: &str) -> Result<SurveyDataset, FeedError> {
        let dataset: SurveyDataset = serde_json::from_str(raw)?;
        log_loaded(&dataset);
        Ok(dataset)
    }
}

fn log_loaded(dataset: &SurveyDataset) {
    debug!(
        questions = dataset.questions.len(),
        completed = dataset.customers.len(),
        in_progress = dataset.in_progress.len(),
        not_answered = dataset.not_answered.len(),
        "survey feed loaded"
    );
}
