use super::super::domain::{Partition, SatisfactionTier};
use super::views::{QuestionAverage, QuestionHighlight, SurveyInsights, SurveyReportSummary};

const FOLLOW_UP_LIMIT: usize = 5;

pub(crate) fn generate_insights(summary: &SurveyReportSummary) -> SurveyInsights {
    let filtered_total = summary.filtered_total();
    let completed = summary.completed.len();

    let response_rate = share(completed, filtered_total);
    let dissatisfied = summary
        .completed
        .iter()
        .filter(|row| row.dissatisfied)
        .count();
    let dissatisfied_share = share(dissatisfied, completed);

    // averages are sorted best first
    let strongest_question = summary.question_averages.first().map(highlight);
    let weakest_question = match (
        summary.question_averages.first(),
        summary.question_averages.last(),
    ) {
        (Some(best), Some(worst)) if worst.score < best.score => Some(highlight(worst)),
        _ => None,
    };

    let mut dissatisfied_rows: Vec<_> = summary
        .completed
        .iter()
        .filter(|row| row.dissatisfied)
        .collect();
    dissatisfied_rows.sort_by(|a, b| {
        let a = a.score.unwrap_or_default();
        let b = b.score.unwrap_or_default();
        a.total_cmp(&b)
    });
    let follow_up = dissatisfied_rows
        .into_iter()
        .take(FOLLOW_UP_LIMIT)
        .map(|row| {
            let name = if row.display_name.is_empty() {
                "Unnamed customer"
            } else {
                row.display_name.as_str()
            };
            format!(
                "{} ({}) scored {:.1}",
                name,
                row.phone_number,
                row.score.unwrap_or_default()
            )
        })
        .collect();

    let mut observations = Vec::new();
    if filtered_total > 0 {
        observations.push(format!(
            "{} of {} surveyed customers completed the survey ({:.0}% response rate)",
            completed,
            filtered_total,
            response_rate * 100.0
        ));
    }

    if let Some(tier) = summary.overall_tier {
        observations.push(format!(
            "Overall satisfaction index {:.2} ({})",
            summary.overall_index,
            tier.label()
        ));
    }

    if dissatisfied > 0 {
        observations.push(format!(
            "{} customer(s) below the satisfaction threshold need a follow-up call",
            dissatisfied
        ));
    }

    if let Some(weakest) = &weakest_question {
        observations.push(format!(
            "Lowest rated question: {} ({:.2})",
            weakest.label, weakest.score
        ));
    }

    let excellent = summary.distribution.count(SatisfactionTier::Excellent);
    if completed > 0 && excellent == completed {
        observations.push("Every completed survey rated the delivery as excellent".to_string());
    }

    let pending = summary
        .partition_counts
        .iter()
        .filter(|entry| entry.partition != Partition::Completed)
        .map(|entry| entry.filtered)
        .sum::<usize>();
    if pending > 0 {
        observations.push(format!(
            "{} customer(s) have not finished the survey yet",
            pending
        ));
    }

    if observations.is_empty() {
        observations.push("No survey responses match the current filter".to_string());
    }

    SurveyInsights {
        response_rate,
        dissatisfied_share,
        strongest_question,
        weakest_question,
        follow_up,
        observations,
    }
}

fn share(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn highlight(average: &QuestionAverage) -> QuestionHighlight {
    QuestionHighlight {
        key: average.key.clone(),
        label: average.label.clone(),
        score: average.score,
    }
}
