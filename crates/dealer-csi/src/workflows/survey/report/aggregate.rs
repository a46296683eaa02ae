use indexmap::IndexMap;

use super::super::domain::{QuestionCatalog, SurveyResponse};
use super::super::scoring::SurveyRules;
use super::views::QuestionAverage;

/// Per-question averages over the given responses, best first.
///
/// Each question divides by the number of responses that answered it, not by the
/// size of the set. Questions with equal scores keep the order in which they were
/// first encountered.
pub fn question_averages<'a, I>(
    responses: I,
    catalog: &QuestionCatalog,
    rules: &'a SurveyRules,
) -> Vec<QuestionAverage>
where
    I: IntoIterator<Item = &'a SurveyResponse>,
{
    // (sum, count) per question key, in first-encounter order
    let mut tallies: IndexMap<&'a str, (f64, usize)> = IndexMap::new();

    for response in responses {
        for (key, score) in rules.scored_answers(&response.fields) {
            let tally = tallies.entry(key).or_default();
            tally.0 += score;
            tally.1 += 1;
        }
    }

    let mut averages: Vec<QuestionAverage> = tallies
        .into_iter()
        .map(|(key, (sum, count))| QuestionAverage {
            key: key.to_string(),
            label: catalog.label_for(key).to_string(),
            score: sum / count as f64,
            responses: count,
        })
        .collect();

    averages.sort_by(|a, b| b.score.total_cmp(&a.score));
    averages
}

/// Overall satisfaction index: the unweighted mean of the per-question averages.
/// Every question weighs the same no matter how many customers answered it.
pub fn overall_index(averages: &[QuestionAverage]) -> f64 {
    if averages.is_empty() {
        return 0.0;
    }

    averages.iter().map(|average| average.score).sum::<f64>() / averages.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::survey::domain::{FieldMap, FieldValue, SurveyDataset};
    use std::collections::BTreeMap;

    fn response(entries: &[(&str, FieldValue)]) -> SurveyResponse {
        SurveyResponse {
            fields: entries.iter().cloned().collect::<FieldMap>(),
            ..SurveyResponse::default()
        }
    }

    fn catalog() -> QuestionCatalog {
        QuestionCatalog::new(
            BTreeMap::from([
                ("Field_A".to_string(), "Delivery explanation".to_string()),
                ("Field_B".to_string(), "Vehicle cleanliness".to_string()),
            ]),
            "Untitled question",
        )
    }

    #[test]
    fn equal_averages_keep_encounter_order_and_index_is_mean_of_means() {
        let responses = [
            response(&[
                ("Field_A", FieldValue::Numeric(8.0)),
                ("Field_B", FieldValue::Numeric(10.0)),
            ]),
            response(&[
                ("Field_A", FieldValue::Numeric(6.0)),
                ("Field_B", FieldValue::Numeric(4.0)),
            ]),
        ];

        let averages = question_averages(&responses, &catalog(), &SurveyRules::default());
        let keys: Vec<&str> = averages.iter().map(|avg| avg.key.as_str()).collect();
        assert_eq!(keys, ["Field_A", "Field_B"]);
        assert_eq!(averages[0].score, 7.0);
        assert_eq!(averages[1].score, 7.0);
        assert_eq!(averages[0].label, "Delivery explanation");
        assert_eq!(overall_index(&averages), 7.0);
    }

    #[test]
    fn ties_follow_first_encounter_not_key_order() {
        let dataset: SurveyDataset = serde_json::from_str(
            r#"{"customers":[{"fields":{"Field_B":5,"Field_A":5}},{"fields":{"Field_A":5}}]}"#,
        )
        .expect("dataset parses");

        let averages =
            question_averages(&dataset.customers, &catalog(), &SurveyRules::default());
        let keys: Vec<&str> = averages.iter().map(|average| average.key.as_str()).collect();
        assert_eq!(keys, ["Field_B", "Field_A"]);
        assert_eq!(averages[0].responses, 1);
        assert_eq!(averages[1].responses, 2);
    }

    #[test]
    fn sparse_answers_divide_by_their_own_count() {
        let responses = [
            response(&[("Field_A", FieldValue::Numeric(10.0))]),
            response(&[
                ("Field_A", FieldValue::Numeric(6.0)),
                ("Field_C", FieldValue::Numeric(3.0)),
            ]),
            response(&[("Field_Comment", FieldValue::from("too slow"))]),
        ];

        let averages = question_averages(&responses, &catalog(), &SurveyRules::default());
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].key, "Field_A");
        assert_eq!(averages[0].score, 8.0);
        assert_eq!(averages[0].responses, 2);
        assert_eq!(averages[1].key, "Field_C");
        assert_eq!(averages[1].score, 3.0);
        assert_eq!(averages[1].responses, 1);
        assert_eq!(averages[1].label, "Untitled question");

        // mean of means, not the mean of the three raw answers
        assert_eq!(overall_index(&averages), 5.5);
    }

    #[test]
    fn scores_sort_descending() {
        let responses = [response(&[
            ("Field_X", FieldValue::Numeric(4.0)),
            ("Field_Y", FieldValue::Numeric(9.0)),
            ("Field_Z", FieldValue::Numeric(6.5)),
        ])];

        let averages = question_averages(&responses, &catalog(), &SurveyRules::default());
        assert!(averages
            .windows(2)
            .all(|pair| pair[0].score >= pair[1].score));
        assert_eq!(averages[0].key, "Field_Y");
    }

    #[test]
    fn empty_input_yields_no_averages_and_zero_index() {
        let averages = question_averages(
            std::iter::empty::<&SurveyResponse>(),
            &catalog(),
            &SurveyRules::default(),
        );
        assert!(averages.is_empty());
        assert_eq!(overall_index(&averages), 0.0);
    }
}
