use serde::{Deserialize, Serialize};

use super::domain::{FieldMap, SatisfactionTier};

pub const DEFAULT_NUMERIC_PREFIX: &str = "Field_";
pub const DEFAULT_DISSATISFIED_BELOW: f64 = 7.0;
pub const DEFAULT_FALLBACK_LABEL: &str = "Untitled question";

/// Lower bounds of the satisfaction tiers. Everything below `average_from` is
/// dissatisfied and everything from `excellent_from` upwards is excellent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierBands {
    pub average_from: f64,
    pub good_from: f64,
    pub excellent_from: f64,
}

impl Default for TierBands {
    fn default() -> Self {
        Self {
            average_from: 5.0,
            good_from: 7.0,
            excellent_from: 9.0,
        }
    }
}

/// Scoring constants shared by the filter, aggregator and distribution builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRules {
    pub numeric_prefix: String,
    pub dissatisfied_below: f64,
    pub bands: TierBands,
    pub fallback_label: String,
}

impl Default for SurveyRules {
    fn default() -> Self {
        Self {
            numeric_prefix: DEFAULT_NUMERIC_PREFIX.to_string(),
            dissatisfied_below: DEFAULT_DISSATISFIED_BELOW,
            bands: TierBands::default(),
            fallback_label: DEFAULT_FALLBACK_LABEL.to_string(),
        }
    }
}

impl SurveyRules {
    /// Numeric answers under the question prefix, in document order. Text answers
    /// are skipped by type even when their key carries the prefix.
    pub fn scored_answers<'a>(
        &'a self,
        fields: &'a FieldMap,
    ) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        fields.iter().filter_map(move |(key, value)| {
            if !key.starts_with(self.numeric_prefix.as_str()) {
                return None;
            }
            value.as_numeric().map(|score| (key, score))
        })
    }

    /// Composite score of one response: the mean of its scored answers, or 0.0 when
    /// the response has none.
    pub fn composite_score(&self, fields: &FieldMap) -> f64 {
        let (sum, count) = self
            .scored_answers(fields)
            .fold((0.0, 0usize), |(sum, count), (_, score)| {
                (sum + score, count + 1)
            });

        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    pub fn is_dissatisfied(&self, score: f64) -> bool {
        score < self.dissatisfied_below
    }

    pub fn tier_for(&self, score: f64) -> SatisfactionTier {
        let bands = &self.bands;
        if score >= bands.excellent_from {
            SatisfactionTier::Excellent
        } else if score >= bands.good_from {
            SatisfactionTier::Good
        } else if score >= bands.average_from {
            SatisfactionTier::Average
        } else {
            SatisfactionTier::Dissatisfied
        }
    }

    /// Free-text answers (comments) of a response, blank ones skipped.
    pub fn comments<'a>(&self, fields: &'a FieldMap) -> Vec<&'a str> {
        fields
            .iter()
            .filter_map(|(_, value)| value.as_text())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .collect()
    }
}
