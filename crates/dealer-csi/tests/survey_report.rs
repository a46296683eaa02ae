use std::collections::HashMap;

use dealer_csi::workflows::feed::SurveyFeed;
use dealer_csi::workflows::survey::extractor::{CAR_MODEL, COLOR};
use dealer_csi::workflows::survey::report::question_averages;
use dealer_csi::workflows::survey::{
    AggregationFilter, FieldMarker, MarkerExtractor, Partition, SatisfactionTier, Selection,
    SurveyDataset, SurveyReport, SurveyRules,
};
use serde_json::{json, Value};

const FEED: &str = include_str!("fixtures/survey_feed.json");

fn dataset() -> SurveyDataset {
    SurveyFeed::from_json(FEED).expect("fixture feed parses")
}

fn approx(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}

#[test]
fn unfiltered_report_ranks_questions_and_builds_distribution() {
    let dataset = dataset();
    let rules = SurveyRules::default();
    let summary = SurveyReport::build(&dataset, &AggregationFilter::default(), &rules).summary();

    let keys: Vec<&str> = summary
        .question_averages
        .iter()
        .map(|average| average.key.as_str())
        .collect();
    assert_eq!(keys, ["Field_3", "Field_1", "Field_2", "Field_9", "Field_4"]);

    let labels: Vec<&str> = summary
        .question_averages
        .iter()
        .map(|average| average.label.as_str())
        .collect();
    assert_eq!(labels[0], "Delivered on the promised date");
    assert_eq!(labels[3], "Untitled question");
    assert_eq!(labels[4], "Courtesy of the delivery advisor");

    let expected_index = (9.0 + 23.0 / 3.0 + 23.0 / 3.0 + 5.0 + 3.0) / 5.0;
    assert!(approx(summary.overall_index, expected_index));
    assert_eq!(summary.overall_tier, Some(SatisfactionTier::Average));

    let distribution = summary.distribution;
    assert_eq!(distribution.excellent, 1);
    assert_eq!(distribution.good, 1);
    assert_eq!(distribution.average, 2);
    assert_eq!(distribution.dissatisfied, 0);
    assert_eq!(distribution.total(), summary.completed.len());
}

#[test]
fn equal_averages_keep_encounter_order() {
    let dataset = dataset();
    let rules = SurveyRules::default();
    let catalog = dataset.catalog(&rules);
    let averages = question_averages(&dataset.customers, &catalog, &rules);

    let field_1 = averages
        .iter()
        .position(|average| average.key == "Field_1")
        .expect("Field_1 averaged");
    let field_2 = averages
        .iter()
        .position(|average| average.key == "Field_2")
        .expect("Field_2 averaged");
    assert_eq!(averages[field_1].score, averages[field_2].score);
    assert_eq!(field_2, field_1 + 1);

    assert!(averages
        .windows(2)
        .all(|pair| pair[0].score >= pair[1].score));
}

#[test]
fn averages_match_brute_force_recomputation() {
    let dataset = dataset();
    let rules = SurveyRules::default();
    let catalog = dataset.catalog(&rules);
    let averages = question_averages(&dataset.customers, &catalog, &rules);

    let raw: Value = serde_json::from_str(FEED).expect("fixture is JSON");
    let mut sums: HashMap<String, (f64, usize)> = HashMap::new();
    for customer in raw["customers"].as_array().expect("customers array") {
        let Some(fields) = customer["fields"].as_object() else {
            continue;
        };
        for (key, value) in fields {
            if let (true, Some(score)) = (key.starts_with("Field_"), value.as_f64()) {
                let slot = sums.entry(key.clone()).or_insert((0.0, 0));
                slot.0 += score;
                slot.1 += 1;
            }
        }
    }

    assert_eq!(averages.len(), sums.len());
    for average in &averages {
        let (sum, count) = sums[&average.key];
        assert_eq!(average.responses, count, "{}", average.key);
        assert!(approx(average.score, sum / count as f64), "{}", average.key);
    }
}

#[test]
fn excluding_ignored_drops_flagged_rows_everywhere() {
    let dataset = dataset();
    let rules = SurveyRules::default();
    let filter = AggregationFilter {
        exclude_ignored: true,
        ..AggregationFilter::default()
    };
    let summary = SurveyReport::build(&dataset, &filter, &rules).summary();

    assert_eq!(summary.completed.len(), 3);
    assert!(summary.completed.iter().all(|row| !row.ignored));
    assert_eq!(summary.not_answered.len(), 1);
    assert_eq!(summary.filtered_total(), 5);

    let field_1 = summary
        .question_averages
        .iter()
        .find(|average| average.key == "Field_1")
        .expect("Field_1 averaged");
    assert!(approx(field_1.score, 8.5));
    assert_eq!(field_1.responses, 2);
}

#[test]
fn ignore_toggle_counts_three_then_two() {
    let dataset: SurveyDataset = serde_json::from_value(json!({
        "customers": [
            { "fields": { "Field_A": 9 } },
            { "fields": { "Field_A": 2 }, "ignore": true },
            { "fields": { "Field_A": 7 } }
        ]
    }))
    .expect("dataset parses");
    let rules = SurveyRules::default();

    let mut filter = AggregationFilter::default();
    let included = SurveyReport::build(&dataset, &filter, &rules);
    assert_eq!(included.partitions().completed.len(), 3);

    filter.exclude_ignored = true;
    let excluded = SurveyReport::build(&dataset, &filter, &rules);
    assert_eq!(excluded.partitions().completed.len(), 2);
}

#[test]
fn period_filter_and_dissatisfied_post_filter_combine() {
    let dataset = dataset();
    let rules = SurveyRules::default();
    let filter = AggregationFilter {
        year: Selection::Only("1403".to_string()),
        month: Selection::Only(2),
        dissatisfied_only: true,
        ..AggregationFilter::default()
    };
    let summary = SurveyReport::build(&dataset, &filter, &rules).summary();

    let names: Vec<&str> = summary
        .completed
        .iter()
        .map(|row| row.display_name.as_str())
        .collect();
    assert_eq!(names, ["Customer Two"]);
    assert_eq!(summary.completed[0].score, Some(5.0));
    assert!(summary.in_progress.is_empty());
    assert_eq!(summary.not_answered.len(), 1);

    let counts: Vec<(Partition, usize, usize)> = summary
        .partition_counts
        .iter()
        .map(|entry| (entry.partition, entry.total, entry.filtered))
        .collect();
    assert_eq!(
        counts,
        [
            (Partition::Completed, 4, 1),
            (Partition::InProgress, 1, 0),
            (Partition::NotAnswered, 2, 1),
        ]
    );
}

#[test]
fn rows_carry_extracted_vehicle_details() {
    let dataset = dataset();
    let rules = SurveyRules::default();
    let summary = SurveyReport::build(&dataset, &AggregationFilter::default(), &rules).summary();

    let first = &summary.completed[0];
    assert_eq!(first.vehicle.car_model, "X200");
    assert_eq!(first.vehicle.color, "سفید");
    assert_eq!(first.comments, ["Great handover"]);
    assert_eq!(first.delivery_period, "1403/02");

    let third = &summary.completed[2];
    assert_eq!(third.vehicle.car_model, "Tiggo 8");
    assert_eq!(third.vehicle.chassis_number, "LVV123");
    assert_eq!(third.tier, Some(SatisfactionTier::Good));

    let fourth = &summary.completed[3];
    assert!(fourth.vehicle.is_empty());
    assert_eq!(fourth.delivery_period, "1402/12");

    assert!(summary.in_progress.iter().all(|row| row.score.is_none()));
}

#[test]
fn rebuilding_with_the_same_filter_is_deterministic() {
    let dataset = dataset();
    let rules = SurveyRules::default();
    let filter = AggregationFilter {
        year: Selection::Only("1403".to_string()),
        ..AggregationFilter::default()
    };

    let first = serde_json::to_value(SurveyReport::build(&dataset, &filter, &rules).summary())
        .expect("summary serializes");
    let second = serde_json::to_value(SurveyReport::build(&dataset, &filter, &rules).summary())
        .expect("summary serializes");
    assert_eq!(first, second);
}

#[test]
fn filter_that_matches_nothing_yields_empty_aggregates() {
    let dataset = dataset();
    let rules = SurveyRules::default();
    let filter = AggregationFilter {
        year: Selection::Only("1390".to_string()),
        ..AggregationFilter::default()
    };
    let summary = SurveyReport::build(&dataset, &filter, &rules).summary();
    let insights = summary.insights();

    assert!(summary.question_averages.is_empty());
    assert_eq!(summary.overall_index, 0.0);
    assert_eq!(summary.overall_tier, None);
    assert_eq!(summary.distribution.total(), 0);
    assert_eq!(insights.response_rate, 0.0);
    assert!(insights.follow_up.is_empty());
}

#[test]
fn custom_extractor_reads_a_different_description_layout() {
    let dataset: SurveyDataset = serde_json::from_value(json!({
        "customers": [
            {
                "fields": { "Field_A": 8 },
                "description": "Model: Arrizo 5<br>Colour: Blue<br>نام خودرو: ignored"
            }
        ]
    }))
    .expect("dataset parses");
    let rules = SurveyRules::default();
    let extractor = MarkerExtractor::new(vec![
        FieldMarker::new(CAR_MODEL, "Model"),
        FieldMarker::new(COLOR, "Colour"),
    ]);

    let summary = SurveyReport::build(&dataset, &AggregationFilter::default(), &rules)
        .with_extractor(extractor)
        .summary();
    let vehicle = &summary.completed[0].vehicle;
    assert_eq!(vehicle.car_model, "Arrizo 5");
    assert_eq!(vehicle.color, "Blue");
    assert_eq!(vehicle.chassis_number, "");

    let default_summary =
        SurveyReport::build(&dataset, &AggregationFilter::default(), &rules).summary();
    assert_eq!(default_summary.completed[0].vehicle.car_model, "ignored");
}
