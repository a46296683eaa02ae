use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use super::domain::SurveyDataset;
use super::filter::AggregationFilter;
use super::report::views::{FilterOptionsView, SurveyInsights, SurveyReportSummary};
use super::report::SurveyReport;
use super::scoring::SurveyRules;

/// Report request: the pre-fetched dataset plus the filter selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyReportRequest {
    pub dataset: SurveyDataset,
    #[serde(default)]
    pub filter: AggregationFilter,
}

#[derive(Debug, Serialize)]
pub struct SurveyReportResponse {
    #[serde(flatten)]
    pub summary: SurveyReportSummary,
    pub insights: SurveyInsights,
}

/// Router builder exposing the survey report endpoints.
pub fn survey_router(rules: Arc<SurveyRules>) -> Router {
    Router::new()
        .route("/api/v1/surveys/report", post(report_handler))
        .route("/api/v1/surveys/filters", post(filter_options_handler))
        .with_state(rules)
}

pub(crate) async fn report_handler(
    State(rules): State<Arc<SurveyRules>>,
    Json(request): Json<SurveyReportRequest>,
) -> Json<SurveyReportResponse> {
    let SurveyReportRequest { dataset, filter } = request;
    let report = SurveyReport::build(&dataset, &filter, &rules);
    let summary = report.summary();
    let insights = summary.insights();

    Json(SurveyReportResponse { summary, insights })
}

pub(crate) async fn filter_options_handler(
    Json(dataset): Json<SurveyDataset>,
) -> Json<FilterOptionsView> {
    Json(FilterOptionsView {
        years: dataset.delivery_years(),
        months: dataset.delivery_months(),
    })
}
