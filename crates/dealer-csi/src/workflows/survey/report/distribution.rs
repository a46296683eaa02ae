use super::super::domain::SurveyResponse;
use super::super::scoring::SurveyRules;
use super::views::SatisfactionDistribution;

/// Buckets every response's composite score into exactly one satisfaction tier.
pub fn satisfaction_distribution<'a, I>(responses: I, rules: &SurveyRules) -> SatisfactionDistribution
where
    I: IntoIterator<Item = &'a SurveyResponse>,
{
    let mut distribution = SatisfactionDistribution::default();
    for response in responses {
        let score = rules.composite_score(&response.fields);
        distribution.record(rules.tier_for(score));
    }
    distribution
}
