use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use dealer_csi::workflows::survey::{survey_router, SurveyRules};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_survey_routes(rules: Arc<SurveyRules>) -> axum::Router {
    survey_router(rules)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn post_json(router: axum::Router, uri: &str, payload: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_vec(&payload).expect("serialize payload"),
            ))
            .expect("request");

        let response = router.oneshot(request).await.expect("router dispatch");
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        (status, serde_json::from_slice(&body).expect("json"))
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn report_route_returns_summary_and_insights() {
        let router = with_survey_routes(Arc::new(SurveyRules::default()));
        let payload = json!({
            "dataset": {
                "questions": { "Field_A": "Delivery explanation", "Field_B": "Vehicle cleanliness" },
                "customers": [
                    { "contact": { "displayName": "Ali", "phoneNumber": "0912" },
                      "fields": { "Field_A": 8, "Field_B": 10 },
                      "description": "نام خودرو: X200<br>رنگ خودرو: سفید" },
                    { "fields": { "Field_A": 6, "Field_B": 4 } }
                ],
                "inProgress": [{ "contact": { "displayName": "Mina" } }]
            },
            "filter": { "year": "all", "month": "all" }
        });

        let (status, body) = post_json(router, "/api/v1/surveys/report", payload).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overallIndex"], 7.0);
        assert_eq!(body["questionAverages"][0]["key"], "Field_A");
        assert_eq!(body["completed"][0]["vehicle"]["carModel"], "X200");
        assert_eq!(body["inProgress"].as_array().map(Vec::len), Some(1));
        let rate = body["insights"]["responseRate"].as_f64().expect("rate");
        assert!((rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn filters_route_lists_choices() {
        let router = with_survey_routes(Arc::new(SurveyRules::default()));
        let payload = json!({
            "customers": [{ "deliveryYear": "1402", "deliveryMonth": 9 }],
            "inProgress": [{ "deliveryYear": "1403", "deliveryMonth": 9 }]
        });

        let (status, body) = post_json(router, "/api/v1/surveys/filters", payload).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["years"], json!(["1403", "1402"]));
        assert_eq!(body["months"], json!([9]));
    }

    #[tokio::test]
    async fn malformed_report_body_is_rejected() {
        let router = with_survey_routes(Arc::new(SurveyRules::default()));
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/surveys/report")
            .header("content-type", "application/json")
            .body(Body::from("{\"dataset\": 5}"))
            .expect("request");

        let response = router.oneshot(request).await.expect("router dispatch");
        assert!(response.status().is_client_error());
    }
}
