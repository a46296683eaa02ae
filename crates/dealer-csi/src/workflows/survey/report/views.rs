use chrono::NaiveDateTime;
use serde::Serialize;

use super::super::domain::{Partition, SatisfactionTier};
use super::super::extractor::VehicleInfo;
use super::super::filter::AggregationFilter;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAverage {
    pub key: String,
    pub label: String,
    pub score: f64,
    /// Number of responses that answered this question.
    pub responses: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SatisfactionDistribution {
    pub dissatisfied: usize,
    pub average: usize,
    pub good: usize,
    pub excellent: usize,
}

impl SatisfactionDistribution {
    pub fn count(&self, tier: SatisfactionTier) -> usize {
        match tier {
            SatisfactionTier::Dissatisfied => self.dissatisfied,
            SatisfactionTier::Average => self.average,
            SatisfactionTier::Good => self.good,
            SatisfactionTier::Excellent => self.excellent,
        }
    }

    pub(crate) fn record(&mut self, tier: SatisfactionTier) {
        let slot = match tier {
            SatisfactionTier::Dissatisfied => &mut self.dissatisfied,
            SatisfactionTier::Average => &mut self.average,
            SatisfactionTier::Good => &mut self.good,
            SatisfactionTier::Excellent => &mut self.excellent,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        SatisfactionTier::ordered()
            .into_iter()
            .map(|tier| self.count(tier))
            .sum()
    }

    pub fn entries(&self) -> Vec<TierCountEntry> {
        let total = self.total();
        SatisfactionTier::ordered()
            .into_iter()
            .map(|tier| {
                let count = self.count(tier);
                TierCountEntry {
                    tier,
                    tier_label: tier.label(),
                    count,
                    share: if total == 0 {
                        0.0
                    } else {
                        count as f64 / total as f64
                    },
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierCountEntry {
    pub tier: SatisfactionTier,
    pub tier_label: &'static str,
    pub count: usize,
    pub share: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionCountEntry {
    pub partition: Partition,
    pub partition_label: &'static str,
    pub total: usize,
    pub filtered: usize,
}

/// One row of a partition listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRowView {
    pub partition: Partition,
    pub display_name: String,
    pub phone_number: String,
    /// Composite score; only set for completed responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<SatisfactionTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier_label: Option<&'static str>,
    pub dissatisfied: bool,
    pub ignored: bool,
    pub vehicle: VehicleInfo,
    pub delivery_period: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_changed_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyReportSummary {
    pub filter: AggregationFilter,
    pub partition_counts: Vec<PartitionCountEntry>,
    pub question_averages: Vec<QuestionAverage>,
    pub overall_index: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_tier: Option<SatisfactionTier>,
    pub distribution: SatisfactionDistribution,
    pub completed: Vec<CustomerRowView>,
    pub in_progress: Vec<CustomerRowView>,
    pub not_answered: Vec<CustomerRowView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionHighlight {
    pub key: String,
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyInsights {
    /// Completed share of all filtered responses.
    pub response_rate: f64,
    /// Share of completed responses under the dissatisfaction threshold.
    pub dissatisfied_share: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strongest_question: Option<QuestionHighlight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weakest_question: Option<QuestionHighlight>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub follow_up: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptionsView {
    pub years: Vec<String>,
    pub months: Vec<u8>,
}
