//! HTTP tests for the GlucoGuard router (form pages + /v1 API)

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use glucoguard::api::{create_router, AppState};
use glucoguard::models::config::{RateLimitConfig, ServerConfig};
use glucoguard::providers::{Activation, DenseLayer};
use glucoguard::{Artifacts, DenseNetwork, StandardScaler};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

// p = sigmoid(0.1 * glucose - 12.5) on unscaled features
fn glucose_artifacts() -> Artifacts {
    let scaler = StandardScaler::new([0.0; 8], [1.0; 8]).unwrap();
    let model =
        DenseNetwork::logistic([0.0, 0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], -12.5).unwrap();
    Artifacts::from_parts(scaler, model)
}

fn server_config(dir: &tempfile::TempDir) -> ServerConfig {
    ServerConfig {
        stats_dir: dir.path().to_path_buf(),
        ..ServerConfig::default()
    }
}

fn app_with(artifacts: Artifacts, config: &ServerConfig) -> Router {
    create_router(Arc::new(AppState::new(artifacts, config)))
}

fn app(dir: &tempfile::TempDir) -> Router {
    app_with(glucose_artifacts(), &server_config(dir))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn measurement(glucose: u32) -> Value {
    json!({
        "pregnancies": 1,
        "glucose": glucose,
        "blood_pressure": 70,
        "skin_thickness": 20,
        "insulin": 80,
        "bmi": 25.0,
        "diabetes_pedigree": 0.5,
        "age": 30
    })
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

#[tokio::test]
async fn test_health_envelope_and_request_id() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir).oneshot(get("/v1/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert!(body["timestamp"].is_i64());
}

#[tokio::test]
async fn test_fields_table() {
    let dir = tempfile::tempdir().unwrap();
    let body = body_json(app(&dir).oneshot(get("/v1/fields")).await.unwrap()).await;

    let fields = body["data"].as_array().unwrap();
    assert_eq!(fields.len(), 8);
    assert_eq!(fields[1]["key"], "glucose");
    assert_eq!(fields[1]["max"], 200.0);
    assert_eq!(fields[5]["kind"], "real");
}

#[tokio::test]
async fn test_assess_high_risk() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir)
        .oneshot(post_json("/v1/assess", measurement(150)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["label"], "High Risk");
    assert_eq!(data["high_risk"], true);
    assert_eq!(data["factors"], json!(["Elevated glucose"]));
    assert_eq!(data["risk_percent"], 92.4);
    assert_eq!(data["gauge"]["band"], "red");
}

#[tokio::test]
async fn test_assess_low_risk_explains_no_factors() {
    let dir = tempfile::tempdir().unwrap();
    let data = body_json(
        app(&dir)
            .oneshot(post_json("/v1/assess", measurement(120)))
            .await
            .unwrap(),
    )
    .await["data"]
        .clone();

    assert_eq!(data["label"], "Low Risk");
    assert_eq!(data["factors"], json!([]));
    assert_eq!(data["explanation"], "No major alerting factors detected.");
}

#[tokio::test]
async fn test_assess_rejects_malformed_body() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir)
        .oneshot(post_json("/v1/assess", json!({ "glucose": "high" })))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_inference_failure_is_500_with_code() {
    let dir = tempfile::tempdir().unwrap();
    // Linear output of 5.0 is not a probability
    let model = DenseNetwork::new(vec![DenseLayer {
        kernel: vec![vec![0.0]; 8],
        bias: vec![5.0],
        activation: Activation::Linear,
    }])
    .unwrap();
    let scaler = StandardScaler::new([0.0; 8], [1.0; 8]).unwrap();
    let app = app_with(Artifacts::from_parts(scaler, model), &server_config(&dir));

    let response = app
        .oneshot(post_json("/v1/assess", measurement(120)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INF_OUT_OF_RANGE");
}

#[tokio::test]
async fn test_batch_counts_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let request = json!({ "measurements": [measurement(150), measurement(100), measurement(130)] });
    let response = app(&dir)
        .oneshot(post_json("/v1/assess/batch", request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["total_requested"], 3);
    assert_eq!(data["total_processed"], 3);
    assert_eq!(data["total_high_risk"], 2);
    assert_eq!(data["total_low_risk"], 1);
    assert_eq!(data["results"][1]["index"], 1);
    assert_eq!(data["results"][1]["assessment"]["label"], "Low Risk");
}

#[tokio::test]
async fn test_batch_limits() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);

    let empty = app
        .clone()
        .oneshot(post_json("/v1/assess/batch", json!({ "measurements": [] })))
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let too_many: Vec<Value> = (0..101).map(|_| measurement(120)).collect();
    let response = app
        .oneshot(post_json("/v1/assess/batch", json!({ "measurements": too_many })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "API_BAD_REQUEST");
}

#[tokio::test]
async fn test_json_report_download_headers() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir)
        .oneshot(post_json("/v1/report?format=csv", measurement(150)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"diabetes_report.csv\""
    );
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));

    let csv = body_text(response).await;
    assert!(csv.starts_with("Field,Value\n"));
    assert!(csv.contains("Glucose (mg/dL),150\n"));
    assert!(csv.contains("Contributing Factors,Elevated glucose\n"));
}

#[tokio::test]
async fn test_form_report_download_defaults_to_text() {
    let dir = tempfile::tempdir().unwrap();
    let uri = "/report.txt?pregnancies=1&glucose=120&blood_pressure=70&skin_thickness=20&insulin=80&bmi=25.0&diabetes_pedigree=0.5&age=30";
    let response = app(&dir).oneshot(get(uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"GlucoGuard_Report.txt\""
    );
    let text = body_text(response).await;
    assert!(text.starts_with("GLUCOGUARD AI REPORT"));
    assert!(text.contains("Low Risk"));
}

#[tokio::test]
async fn test_index_page() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir).oneshot(get("/?theme=dark")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert_eq!(html.matches(r#"type="range""#).count(), 8);
    assert!(html.contains("GlucoGuard AI"));
    assert!(html.contains(r#"action="/assess?theme=dark""#));
}

#[tokio::test]
async fn test_form_submission_clamps_and_renders_result() {
    let dir = tempfile::tempdir().unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/assess")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(
            "pregnancies=1&glucose=250&blood_pressure=70&skin_thickness=20&insulin=80&bmi=25&diabetes_pedigree=0.5&age=30",
        ))
        .unwrap();
    let response = app(&dir).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    // glucose clamped to the slider maximum of 200
    assert!(html.contains("glucose=200"));
    assert!(html.contains("<strong>High Risk</strong> of Diabetes"));
    assert!(html.contains("<li>Elevated glucose</li>"));
    assert!(html.contains("Download Report (.csv)"));
}

#[tokio::test]
async fn test_api_key_guards_v1_only() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        api_key: Some("secret".to_string()),
        ..server_config(&dir)
    };
    let app = app_with(glucose_artifacts(), &config);

    let denied = app
        .clone()
        .oneshot(post_json("/v1/assess", measurement(120)))
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(denied).await["error"]["code"], "API_UNAUTHORIZED");

    let mut request = post_json("/v1/assess", measurement(120));
    request
        .headers_mut()
        .insert("x-api-key", "secret".parse().unwrap());
    assert_eq!(app.clone().oneshot(request).await.unwrap().status(), StatusCode::OK);

    assert_eq!(
        app.clone().oneshot(get("/v1/health")).await.unwrap().status(),
        StatusCode::OK
    );
    assert_eq!(app.oneshot(get("/")).await.unwrap().status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        rate_limit: RateLimitConfig {
            requests_per_window: 2,
            window_duration: Duration::from_secs(60),
        },
        ..server_config(&dir)
    };
    let app = app_with(glucose_artifacts(), &config);

    for _ in 0..2 {
        let ok = app.clone().oneshot(get("/v1/fields")).await.unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
    }
    let limited = app.clone().oneshot(get("/v1/fields")).await.unwrap();
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.headers().contains_key("retry-after"));

    // Health is never limited
    assert_eq!(app.oneshot(get("/v1/health")).await.unwrap().status(), StatusCode::OK);
}

#[tokio::test]
async fn test_stats_after_assessments() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);

    for glucose in [150, 100] {
        app.clone()
            .oneshot(post_json("/v1/assess", measurement(glucose)))
            .await
            .unwrap();
    }

    let data = body_json(app.oneshot(get("/v1/stats")).await.unwrap()).await["data"].clone();
    assert_eq!(data["total_assessed"], 2);
    assert_eq!(data["high_risk"], 1);
    assert_eq!(data["low_risk"], 1);
    assert_eq!(data["factor_counts"]["elevated_glucose"], 1);
    assert_eq!(data["high_risk_rate_percent"], 50.0);
}

fn limited_config(dir: &tempfile::TempDir, requests: u32, api_key: Option<&str>) -> ServerConfig {
    ServerConfig {
        api_key: api_key.map(String::from),
        rate_limit: RateLimitConfig {
            requests_per_window: requests,
            window_duration: Duration::from_secs(60),
        },
        ..server_config(dir)
    }
}

fn get_with_key(uri: &str, key: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-api-key", key)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_rotating_unvalidated_keys_share_one_bucket() {
    let dir = tempfile::tempdir().unwrap();
    let state = Arc::new(AppState::new(
        glucose_artifacts(),
        &limited_config(&dir, 1, None),
    ));
    let app = create_router(state.clone());

    let mut statuses = Vec::new();
    for i in 0..5 {
        let response = app
            .clone()
            .oneshot(get_with_key("/v1/fields", &format!("junk-{}", i)))
            .await
            .unwrap();
        statuses.push(response.status());
    }

    assert_eq!(statuses[0], StatusCode::OK);
    assert!(statuses[1..]
        .iter()
        .all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
    assert_eq!(state.rate_limiter.tracked_clients(), 1);
}

#[tokio::test]
async fn test_form_routes_ignore_presented_keys() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(glucose_artifacts(), &limited_config(&dir, 1, Some("secret")));

    let first = app.clone().oneshot(get_with_key("/", "junk-a")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.oneshot(get_with_key("/", "junk-b")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_configured_key_gets_its_own_bucket() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with(glucose_artifacts(), &limited_config(&dir, 1, Some("secret")));

    // Anonymous client spends the address bucket
    assert_eq!(app.clone().oneshot(get("/")).await.unwrap().status(), StatusCode::OK);

    let keyed = app
        .clone()
        .oneshot(get_with_key("/v1/fields", "secret"))
        .await
        .unwrap();
    assert_eq!(keyed.status(), StatusCode::OK);

    let keyed_again = app
        .oneshot(get_with_key("/v1/fields", "secret"))
        .await
        .unwrap();
    assert_eq!(keyed_again.status(), StatusCode::TOO_MANY_REQUESTS);
}
