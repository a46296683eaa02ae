use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::{self, MapAccess, Visitor};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::scoring::SurveyRules;

/// One answer inside a response's field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Numeric(f64),
    Text(String),
}

impl FieldValue {
    /// Maps a raw JSON answer onto a field value. Anything that is neither a number
    /// nor a string counts as unanswered.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_f64().map(Self::Numeric),
            Value::String(text) => Some(Self::Text(text)),
            _ => None,
        }
    }

    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Self::Numeric(score) => Some(*score),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Numeric(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Sparse answer set of a single response, kept in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldMap {
    entries: IndexMap<String, FieldValue>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an answer. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMap
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for FieldMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldMapVisitor;

        impl<'de> Visitor<'de> for FieldMapVisitor {
            type Value = FieldMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of question keys to answers")
            }

            fn visit_unit<E>(self) -> Result<FieldMap, E>
            where
                E: de::Error,
            {
                Ok(FieldMap::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FieldMap, A::Error> {
                let mut entries = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, raw)) = access.next_entry::<String, Value>()? {
                    if let Some(value) = FieldValue::from_json(raw) {
                        entries.insert(key, value);
                    }
                }
                Ok(FieldMap { entries })
            }
        }

        deserializer.deserialize_any(FieldMapVisitor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone_number: String,
}

/// A single customer's survey record as delivered by the data service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub contact: Contact,
    #[serde(default)]
    pub fields: FieldMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_month")]
    pub delivery_month: Option<u8>,
    #[serde(default, deserialize_with = "lenient_year")]
    pub delivery_year: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub delivery_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub pipeline_change_time: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ignore: bool,
}

impl SurveyResponse {
    /// Human readable delivery period: the explicit date when present, otherwise
    /// `year/month`, otherwise just the year.
    pub fn delivery_period(&self) -> String {
        if let Some(date) = &self.delivery_date {
            return date.clone();
        }

        match (&self.delivery_year, self.delivery_month) {
            (Some(year), Some(month)) => format!("{year}/{month:02}"),
            (Some(year), None) => year.clone(),
            (None, _) => String::new(),
        }
    }

    pub fn pipeline_changed_at(&self) -> Option<NaiveDateTime> {
        self.pipeline_change_time.as_deref().and_then(parse_timestamp)
    }
}

/// The three disjoint collections assigned by the data service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    Completed,
    InProgress,
    NotAnswered,
}

impl Partition {
    pub const fn ordered() -> [Self; 3] {
        [Self::Completed, Self::InProgress, Self::NotAnswered]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::InProgress => "In Progress",
            Self::NotAnswered => "Not Answered",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SatisfactionTier {
    Dissatisfied,
    Average,
    Good,
    Excellent,
}

impl SatisfactionTier {
    pub const fn ordered() -> [Self; 4] {
        [Self::Dissatisfied, Self::Average, Self::Good, Self::Excellent]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dissatisfied => "Dissatisfied",
            Self::Average => "Average",
            Self::Good => "Good",
            Self::Excellent => "Excellent",
        }
    }
}

/// Question key to label lookup with a two-level fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionCatalog {
    questions: BTreeMap<String, String>,
    fallback: BTreeMap<String, String>,
    default_label: String,
}

impl QuestionCatalog {
    pub fn new(questions: BTreeMap<String, String>, default_label: impl Into<String>) -> Self {
        Self {
            questions,
            fallback: BTreeMap::new(),
            default_label: default_label.into(),
        }
    }

    pub fn with_fallback(mut self, fallback: BTreeMap<String, String>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn label_for(&self, key: &str) -> &str {
        self.questions
            .get(key)
            .or_else(|| self.fallback.get(key))
            .map(String::as_str)
            .unwrap_or(self.default_label.as_str())
    }
}

/// Input contract of the survey report: catalog plus the three partitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDataset {
    #[serde(default, deserialize_with = "label_map")]
    pub averages: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "label_map")]
    pub questions: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub customers: Vec<SurveyResponse>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub in_progress: Vec<SurveyResponse>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub not_answered: Vec<SurveyResponse>,
}

impl SurveyDataset {
    pub fn partition(&self, partition: Partition) -> &[SurveyResponse] {
        match partition {
            Partition::Completed => &self.customers,
            Partition::InProgress => &self.in_progress,
            Partition::NotAnswered => &self.not_answered,
        }
    }

    pub fn total_responses(&self) -> usize {
        Partition::ordered()
            .into_iter()
            .map(|partition| self.partition(partition).len())
            .sum()
    }

    pub fn catalog(&self, rules: &SurveyRules) -> QuestionCatalog {
        QuestionCatalog::new(self.questions.clone(), rules.fallback_label.clone())
            .with_fallback(self.averages.clone())
    }

    fn all_responses(&self) -> impl Iterator<Item = &SurveyResponse> {
        self.customers
            .iter()
            .chain(&self.in_progress)
            .chain(&self.not_answered)
    }

    /// Distinct delivery years across every partition, newest first.
    pub fn delivery_years(&self) -> Vec<String> {
        let distinct: BTreeSet<&str> = self
            .all_responses()
            .filter_map(|response| response.delivery_year.as_deref())
            .collect();

        let mut years: Vec<String> = distinct.into_iter().map(str::to_string).collect();
        years.sort_by_key(|year| Reverse((year.parse::<u32>().ok(), year.clone())));
        years
    }

    /// Distinct delivery months across every partition, ascending.
    pub fn delivery_months(&self) -> Vec<u8> {
        let distinct: BTreeSet<u8> = self
            .all_responses()
            .filter_map(|response| response.delivery_month)
            .collect();
        distinct.into_iter().collect()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn lenient_month<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let month = match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };

    Ok(month
        .filter(|month| (1..=12).contains(month))
        .map(|month| month as u8))
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let year = match Value::deserialize(deserializer)? {
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => Some(text.trim().to_string()),
        _ => None,
    };

    Ok(year.filter(|year| !year.is_empty()))
}

fn label_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(label) => Some((key, label)),
            _ => None,
        })
        .collect())
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
