use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::domain::{Partition, SurveyDataset, SurveyResponse};
use super::scoring::SurveyRules;

/// Either every value (`"all"`) or one exact value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selection<T> {
    pub fn admits(&self, value: Option<&T>) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => value == Some(expected),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid selection '{value}': {reason}")]
pub struct SelectionParseError {
    value: String,
    reason: String,
}

impl<T> FromStr for Selection<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    type Err = SelectionParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }

        trimmed
            .parse()
            .map(Self::Only)
            .map_err(|err: T::Err| SelectionParseError {
                value: trimmed.to_string(),
                reason: err.to_string(),
            })
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(value) => value.fmt(f),
        }
    }
}

impl<T: fmt::Display> Serialize for Selection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, T> Deserialize<'de> for Selection<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = match Value::deserialize(deserializer)? {
            Value::Null => return Ok(Self::All),
            Value::String(text) => text,
            Value::Number(number) => number.to_string(),
            other => {
                return Err(D::Error::custom(format!(
                    "expected \"all\" or a value, found {other}"
                )))
            }
        };

        raw.parse().map_err(D::Error::custom)
    }
}

/// Filter selection driving a report rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AggregationFilter {
    pub year: Selection<String>,
    pub month: Selection<u8>,
    pub exclude_ignored: bool,
    /// Only narrows the completed partition.
    pub dissatisfied_only: bool,
}

impl AggregationFilter {
    /// Year, month and ignore predicates shared by every partition.
    pub fn admits(&self, response: &SurveyResponse) -> bool {
        self.year.admits(response.delivery_year.as_ref())
            && self.month.admits(response.delivery_month.as_ref())
            && !(self.exclude_ignored && response.ignore)
    }

    pub fn is_unrestricted(&self) -> bool {
        *self == Self::default()
    }
}

pub fn filter_partition<'a>(
    responses: &'a [SurveyResponse],
    filter: &AggregationFilter,
) -> Vec<&'a SurveyResponse> {
    responses
        .iter()
        .filter(|response| filter.admits(response))
        .collect()
}

pub fn filter_completed<'a>(
    responses: &'a [SurveyResponse],
    filter: &AggregationFilter,
    rules: &SurveyRules,
) -> Vec<&'a SurveyResponse> {
    let mut kept = filter_partition(responses, filter);
    if filter.dissatisfied_only {
        kept.retain(|response| rules.is_dissatisfied(rules.composite_score(&response.fields)));
    }
    kept
}

/// Borrowed views of the three partitions after filtering, in input order.
#[derive(Debug, Clone, Default)]
pub struct FilteredPartitions<'a> {
    pub completed: Vec<&'a SurveyResponse>,
    pub in_progress: Vec<&'a SurveyResponse>,
    pub not_answered: Vec<&'a SurveyResponse>,
}

impl<'a> FilteredPartitions<'a> {
    pub fn apply(
        dataset: &'a SurveyDataset,
        filter: &AggregationFilter,
        rules: &SurveyRules,
    ) -> Self {
        let partitions = Self {
            completed: filter_completed(&dataset.customers, filter, rules),
            in_progress: filter_partition(&dataset.in_progress, filter),
            not_answered: filter_partition(&dataset.not_answered, filter),
        };

        debug!(
            completed = partitions.completed.len(),
            in_progress = partitions.in_progress.len(),
            not_answered = partitions.not_answered.len(),
            %filter.year,
            %filter.month,
            "survey partitions filtered"
        );

        partitions
    }

    pub fn get(&self, partition: Partition) -> &[&'a SurveyResponse] {
        match partition {
            Partition::Completed => &self.completed,
            Partition::InProgress => &self.in_progress,
            Partition::NotAnswered => &self.not_answered,
        }
    }

    pub fn total(&self) -> usize {
        self.completed.len() + self.in_progress.len() + self.not_answered.len()
    }
}
