use adoptix::{
    analysis::{Action, PortfolioSummary, Recommendation},
    api::{router, types::RegenerateResponse, AppState},
    config::Settings,
    data::DailyRecord,
};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tower::ServiceExt;

fn app() -> Router {
    let settings = Settings {
        days: 10,
        campaign_count: 3,
        seed: 42,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        ..Settings::default()
    };
    router(AppState::new(settings).unwrap())
}

async fn call(app: &Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json<T: DeserializeOwned>(app: &Router, uri: &str) -> T {
    let (status, body) = call(app, "GET", uri).await;
    assert_eq!(status, StatusCode::OK, "{}", String::from_utf8_lossy(&body));
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = call(&app(), "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn recommendations_split_three_campaigns() {
    let recs: Vec<Recommendation> = get_json(&app(), "/recommendations?shift_fraction=0.2").await;
    assert_eq!(recs.len(), 3);
    assert_eq!(recs[0].recommended_action, Action::Increase);
    assert_eq!(recs[0].budget_modifier, 0.2);
    assert_eq!(
        recs.iter()
            .filter(|r| r.recommended_action == Action::Decrease)
            .count(),
        2
    );
}

#[tokio::test]
async fn bad_shift_fraction_is_a_client_error() {
    let (status, body) = call(&app(), "GET", "/recommendations?shift_fraction=1.5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8_lossy(&body).contains("shift_fraction"));
}

#[tokio::test]
async fn summary_matches_record_totals() {
    let app = app();
    let records: Vec<DailyRecord> = get_json(&app, "/records").await;
    let summary: PortfolioSummary = get_json(&app, "/summary").await;
    assert_eq!(records.len(), 30);
    assert_eq!(summary.campaigns, 3);
    let spend: f64 = records.iter().map(|r| r.spend).sum();
    assert!((summary.total_spend - spend).abs() < 1e-6);
}

#[tokio::test]
async fn regenerate_swaps_the_dataset() {
    let app = app();
    let before: Vec<DailyRecord> = get_json(&app, "/records").await;
    let (status, body) = call(&app, "POST", "/regenerate?seed=7").await;
    assert_eq!(status, StatusCode::OK);
    let response: RegenerateResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.seed, 7);
    assert_eq!(response.rows, 30);
    let after: Vec<DailyRecord> = get_json(&app, "/records").await;
    assert_ne!(before, after);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn recommendations_and_regenerate_run_concurrently() {
    let app = app();
    let (recs, (status, _)) = tokio::join!(
        get_json::<Vec<Recommendation>>(&app, "/recommendations"),
        call(&app, "POST", "/regenerate?seed=9"),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(recs.len(), 3);
    let after: Vec<Recommendation> = get_json(&app, "/recommendations").await;
    assert_eq!(after.len(), 3);
}
