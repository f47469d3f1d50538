// Equine Eligibility - Web Server
// REST API with Axum over the eligibility engine, appetite guide and plan catalogue

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use equine_eligibility::appetite::{AppetiteCategory, AppetiteGuide};
use equine_eligibility::config::{Config, CONFIG_ENV_VAR};
use equine_eligibility::logging;
use equine_eligibility::plans::{InsurancePlan, PlanCatalog, PlanFilter};
use equine_eligibility::reference::{
    reference_fingerprint, AgeBand, Category, Preference, REFERENCE_VERSION,
};
use equine_eligibility::report::{EvaluationReport, EvaluationRequest};
use equine_eligibility::VERSION;

#[derive(Parser, Debug)]
#[command(name = "eligibility-server")]
#[command(version, about = "HTTP API over the equine eligibility engine", long_about = None)]
struct ServerArgs {
    /// Path to a TOML config file
    #[arg(long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state; reference data is read-only
#[derive(Clone)]
struct AppState {
    appetite: Arc<AppetiteGuide>,
    plans: Arc<PlanCatalog>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

fn bad_request(message: impl Into<String>) -> Response {
    let message = message.into();
    warn!(%message, "rejected request");
    (StatusCode::BAD_REQUEST, Json(ApiResponse::error(message))).into_response()
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    reference_version: &'static str,
}

#[derive(Serialize)]
struct OptionResponse {
    key: &'static str,
    label: &'static str,
}

#[derive(Serialize)]
struct CategoryResponse {
    key: &'static str,
    label: &'static str,
    uses: Vec<OptionResponse>,
}

#[derive(Serialize)]
struct ReferenceResponse {
    version: &'static str,
    fingerprint: String,
    categories: Vec<CategoryResponse>,
    age_bands: Vec<OptionResponse>,
    preferences: Vec<OptionResponse>,
}

#[derive(Deserialize)]
struct AppetiteQuery {
    q: Option<String>,
    category: Option<String>,
}

#[derive(Serialize)]
struct PlansResponse {
    count: usize,
    plans: Vec<InsurancePlan>,
}

#[derive(Serialize)]
struct FormatResponse {
    summary: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "OK",
        version: VERSION,
        reference_version: REFERENCE_VERSION,
    }))
}

/// GET /api/reference - Categories, uses, age bands and preferences
async fn get_reference() -> impl IntoResponse {
    let categories = Category::ALL
        .into_iter()
        .map(|category| CategoryResponse {
            key: category.key(),
            label: category.label(),
            uses: category
                .uses()
                .iter()
                .map(|u| OptionResponse {
                    key: u.key(),
                    label: u.label(),
                })
                .collect(),
        })
        .collect();

    Json(ApiResponse::ok(ReferenceResponse {
        version: REFERENCE_VERSION,
        fingerprint: reference_fingerprint(),
        categories,
        age_bands: AgeBand::ALL
            .into_iter()
            .map(|a| OptionResponse {
                key: a.key(),
                label: a.label(),
            })
            .collect(),
        preferences: Preference::ALL
            .into_iter()
            .map(|p| OptionResponse {
                key: p.key(),
                label: p.label(),
            })
            .collect(),
    }))
}

/// POST /api/evaluate - Run the engine and return the evaluation document
async fn evaluate(payload: std::result::Result<Json<EvaluationRequest>, JsonRejection>) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return bad_request(rejection.body_text()),
    };

    let report = request
        .evaluate()
        .and_then(|(coverage, ranking)| EvaluationReport::build(&request, &coverage, &ranking));

    match report {
        Ok(report) => (StatusCode::OK, Json(ApiResponse::ok(report))).into_response(),
        Err(e) => bad_request(e.to_string()),
    }
}

/// GET /api/appetite?q=&category= - Search the appetite guide
async fn search_appetite(
    State(state): State<AppState>,
    Query(query): Query<AppetiteQuery>,
) -> impl IntoResponse {
    let results: Vec<AppetiteCategory> = state
        .appetite
        .search(query.q.as_deref().unwrap_or(""), query.category.as_deref());
    Json(ApiResponse::ok(results))
}

/// GET /api/plans?search=&company=&co_pay=&state=&horse_category= - Filter plans
async fn list_plans(
    State(state): State<AppState>,
    Query(filter): Query<PlanFilter>,
) -> impl IntoResponse {
    let plans: Vec<InsurancePlan> = state.plans.filter(&filter).into_iter().cloned().collect();
    Json(ApiResponse::ok(PlansResponse {
        count: plans.len(),
        plans,
    }))
}

/// POST /api/format - Evaluation JSON in, text summary out
async fn format_report(body: String) -> Response {
    match EvaluationReport::from_json(body.trim()) {
        Ok(report) => (
            StatusCode::OK,
            Json(ApiResponse::ok(FormatResponse {
                summary: report.summary_text(),
            })),
        )
            .into_response(),
        Err(e) => bad_request(e.to_string()),
    }
}

fn build_router(state: AppState, cors_permissive: bool) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/reference", get(get_reference))
        .route("/evaluate", post(evaluate))
        .route("/appetite", get(search_appetite))
        .route("/plans", get(list_plans))
        .route("/format", post(format_report))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http());

    if cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();
    let config = Config::load_or_default(args.config.as_deref())?;
    logging::init(&logging::resolve_filter(args.verbose, &config.logging.filter));

    let state = AppState {
        appetite: Arc::new(config.appetite_guide()?),
        plans: Arc::new(config.plan_catalog()?),
    };

    let app = build_router(state, config.server.cors_permissive);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(%addr, "eligibility server listening");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        build_router(
            AppState {
                appetite: Arc::new(AppetiteGuide::with_defaults()),
                plans: Arc::new(PlanCatalog::with_defaults()),
            },
            true,
        )
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(get_req("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "OK");
    }

    #[tokio::test]
    async fn test_reference_lists_uses_per_category() {
        let (_, body) = send(get_req("/api/reference")).await;
        let categories = body["data"]["categories"].as_array().unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[1]["uses"].as_array().unwrap().len(), 4);
        assert_eq!(body["data"]["fingerprint"].as_str().unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_evaluate_returns_report() {
        let (status, body) = send(post_json(
            "/api/evaluate",
            r#"{"category":"sport","use":"dressage","value":60000,"age":"31d_20y","preferences":["broad_coverage"]}"#,
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        let coverages = &body["data"]["coverage_eligibility"]["eligible_coverages"];
        assert_eq!(coverages["classic_major_medical"]["eligible"], true);
        assert_eq!(body["data"]["risk_appetite"]["status"], "ELIGIBLE");
    }

    #[tokio::test]
    async fn test_evaluate_rejects_mismatched_use() {
        let (status, body) = send(post_json(
            "/api/evaluate",
            r#"{"category":"western","use":"dressage","value":60000,"age":"31d_20y"}"#,
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("does not belong"));
    }

    #[tokio::test]
    async fn test_evaluate_rejects_unknown_age() {
        let (status, _) = send(post_json(
            "/api/evaluate",
            r#"{"category":"sport","use":"eventing","value":1,"age":"ancient"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_appetite_search() {
        let (status, body) = send(get_req("/api/appetite?q=draft")).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["category"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"Draft Horses (Under Saddle)"));
    }

    #[test]
    fn test_server_args() {
        let args =
            ServerArgs::try_parse_from(["eligibility-server", "--config", "server.toml", "-v"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("server.toml")));
        assert!(args.verbose);

        let help = ServerArgs::try_parse_from(["eligibility-server", "--help"]).unwrap_err();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[tokio::test]
    async fn test_plans_filter_by_state() {
        let (_, body) = send(get_req("/api/plans?state=CA&co_pay=None")).await;
        assert_eq!(body["data"]["count"], 3);
    }

    #[tokio::test]
    async fn test_format_round_trip_and_errors() {
        let request = EvaluationRequest::new(
            Category::Western,
            equine_eligibility::reference::Use::GeneralWestern,
            equine_eligibility::reference::InsuredValue::new(25_000.0).unwrap(),
            AgeBand::Age31dTo20y,
        );
        let (coverage, ranking) = request.evaluate().unwrap();
        let json = EvaluationReport::build(&request, &coverage, &ranking)
            .unwrap()
            .to_json_pretty()
            .unwrap();

        let (status, body) = send(post_json("/api/format", &json)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["summary"]
            .as_str()
            .unwrap()
            .starts_with("ELIGIBILITY SUMMARY - Unnamed horse"));

        let (status, body) = send(post_json("/api/format", "not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid evaluation JSON"));
    }
}
