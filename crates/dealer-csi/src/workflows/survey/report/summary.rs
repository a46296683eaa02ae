use tracing::debug;

use super::super::domain::{Partition, QuestionCatalog, SurveyDataset, SurveyResponse};
use super::super::extractor::{MarkerExtractor, VehicleInfo};
use super::super::filter::{AggregationFilter, FilteredPartitions};
use super::super::scoring::SurveyRules;
use super::aggregate::{overall_index, question_averages};
use super::distribution::satisfaction_distribution;
use super::views::{
    CustomerRowView, PartitionCountEntry, QuestionAverage, SatisfactionDistribution,
    SurveyInsights, SurveyReportSummary,
};

/// A survey dataset seen through one filter selection.
///
/// Holds borrowed partitions only; building a new report for a different filter
/// never touches the dataset.
#[derive(Debug)]
pub struct SurveyReport<'a> {
    dataset: &'a SurveyDataset,
    rules: &'a SurveyRules,
    filter: AggregationFilter,
    catalog: QuestionCatalog,
    partitions: FilteredPartitions<'a>,
    extractor: MarkerExtractor,
}

impl<'a> SurveyReport<'a> {
    pub fn build(
        dataset: &'a SurveyDataset,
        filter: &AggregationFilter,
        rules: &'a SurveyRules,
    ) -> Self {
        Self {
            dataset,
            rules,
            filter: filter.clone(),
            catalog: dataset.catalog(rules),
            partitions: FilteredPartitions::apply(dataset, filter, rules),
            extractor: MarkerExtractor::vehicle(),
        }
    }

    /// Swaps the description extractor, e.g. for a different description layout.
    pub fn with_extractor(mut self, extractor: MarkerExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn partitions(&self) -> &FilteredPartitions<'a> {
        &self.partitions
    }

    pub fn question_averages(&self) -> Vec<QuestionAverage> {
        question_averages(
            self.partitions.completed.iter().copied(),
            &self.catalog,
            self.rules,
        )
    }

    pub fn distribution(&self) -> SatisfactionDistribution {
        satisfaction_distribution(self.partitions.completed.iter().copied(), self.rules)
    }

    pub fn partition_counts(&self) -> Vec<PartitionCountEntry> {
        Partition::ordered()
            .into_iter()
            .map(|partition| PartitionCountEntry {
                partition,
                partition_label: partition.label(),
                total: self.dataset.partition(partition).len(),
                filtered: self.partitions.get(partition).len(),
            })
            .collect()
    }

    pub fn rows(&self, partition: Partition) -> Vec<CustomerRowView> {
        self.partitions
            .get(partition)
            .iter()
            .map(|response| self.row(partition, response))
            .collect()
    }

    fn row(&self, partition: Partition, response: &SurveyResponse) -> CustomerRowView {
        let score = match partition {
            Partition::Completed => Some(self.rules.composite_score(&response.fields)),
            Partition::InProgress | Partition::NotAnswered => None,
        };
        let tier = score.map(|score| self.rules.tier_for(score));

        CustomerRowView {
            partition,
            display_name: response.contact.display_name.clone(),
            phone_number: response.contact.phone_number.clone(),
            score,
            tier,
            tier_label: tier.map(|tier| tier.label()),
            dissatisfied: score.is_some_and(|score| self.rules.is_dissatisfied(score)),
            ignored: response.ignore,
            vehicle: VehicleInfo::from_fields(&self.extractor.extract(&response.description)),
            delivery_period: response.delivery_period(),
            pipeline_changed_at: response.pipeline_changed_at(),
            comments: self
                .rules
                .comments(&response.fields)
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn summary(&self) -> SurveyReportSummary {
        let question_averages = self.question_averages();
        let overall_index = overall_index(&question_averages);
        let overall_tier = if question_averages.is_empty() {
            None
        } else {
            Some(self.rules.tier_for(overall_index))
        };
        let distribution = self.distribution();

        debug!(
            questions = question_averages.len(),
            overall_index,
            completed = distribution.total(),
            "survey report summarised"
        );

        SurveyReportSummary {
            filter: self.filter.clone(),
            partition_counts: self.partition_counts(),
            question_averages,
            overall_index,
            overall_tier,
            distribution,
            completed: self.rows(Partition::Completed),
            in_progress: self.rows(Partition::InProgress),
            not_answered: self.rows(Partition::NotAnswered),
        }
    }
}

impl SurveyReportSummary {
    pub fn insights(&self) -> SurveyInsights {
        super::generate_insights(self)
    }

    pub fn filtered_total(&self) -> usize {
        self.partition_counts.iter().map(|entry| entry.filtered).sum()
    }
}
