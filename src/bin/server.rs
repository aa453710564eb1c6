//! Building FEA HTTP Server

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{
    extract::Json,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use building_fea::prelude::*;

const DEFAULT_PORT: u16 = 8086;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct MeshRequest {
    building: BuildingInput,
    #[serde(default)]
    options: AnalysisOptions,
}

#[derive(Debug, Serialize)]
struct MeshSummary {
    nodes: usize,
    elements: usize,
    dofs: usize,
    beams: usize,
    columns: usize,
    piles: usize,
    links: usize,
    shells: usize,
    levels: Vec<LevelMesh>,
}

impl MeshSummary {
    fn from_model(model: &StructuralModel) -> Self {
        Self {
            nodes: model.nodes.len(),
            elements: model.elements.len(),
            dofs: model.dof_count(),
            beams: model.count(ElementKind::Beam),
            columns: model.count(ElementKind::Column),
            piles: model.count(ElementKind::Pile),
            links: model.count(ElementKind::Link),
            shells: model.count(ElementKind::Shell),
            levels: model.levels.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnalysisRequest {
    building: BuildingInput,
    #[serde(default)]
    options: AnalysisOptions,
    #[serde(default)]
    load_cases: Vec<LoadCase>,
    #[serde(default)]
    combinations: Vec<LoadCombination>,
    /// Prepend a self-weight case with this name
    #[serde(default)]
    self_weight_case: Option<String>,
    /// Restraints keyed by node index
    #[serde(default)]
    supports: BTreeMap<usize, Support>,
}

#[derive(Debug, Serialize)]
struct AnalysisData {
    mesh: MeshSummary,
    results: BTreeMap<String, AnalysisResult>,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    error: Option<String>,
    data: Option<T>,
}

fn respond<T: Serialize>(outcome: Result<T, String>) -> (StatusCode, Json<ApiResponse<T>>) {
    match outcome {
        Ok(data) => (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                error: None,
                data: Some(data),
            }),
        ),
        Err(e) => {
            error!("Request failed: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse {
                    success: false,
                    error: Some(e),
                    data: None,
                }),
            )
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn mesh(Json(request): Json<MeshRequest>) -> impl IntoResponse {
    let outcome = tokio::task::spawn_blocking(move || {
        StructuralModel::from_building(&request.building, &request.options)
            .map(|model| MeshSummary::from_model(&model))
            .map_err(|e| e.to_string())
    })
    .await
    .unwrap_or_else(|e| Err(format!("mesh task failed: {}", e)));
    respond(outcome)
}

async fn analyze(Json(request): Json<AnalysisRequest>) -> impl IntoResponse {
    let outcome = tokio::task::spawn_blocking(move || run_analysis(request).map_err(|e| e.to_string()))
        .await
        .unwrap_or_else(|e| Err(format!("analysis task failed: {}", e)));
    respond(outcome)
}

fn run_analysis(request: AnalysisRequest) -> FEAResult<AnalysisData> {
    let options = request.options;
    let mut model = StructuralModel::from_building(&request.building, &options)?;
    for (node, support) in request.supports {
        model.add_support(node, support)?;
    }

    let mut cases = Vec::new();
    if let Some(name) = &request.self_weight_case {
        cases.push(model.self_weight(&options, name));
    }
    cases.extend(request.load_cases);
    for combo in &request.combinations {
        cases.push(combo.combine(&cases)?);
    }

    let results = model.analyze(&cases, &options)?;
    Ok(AnalysisData {
        mesh: MeshSummary::from_model(&model),
        results,
    })
}

fn server_port() -> u16 {
    std::env::var("FEA_SERVER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/v1/mesh", post(mesh))
        .route("/api/v1/analyze", post(analyze))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], server_port()));
    info!("Building FEA server listening on http://{}", addr);
    info!("  Health check: GET  /health");
    info!("  Mesh:         POST /api/v1/mesh");
    info!("  Analysis:     POST /api/v1/analyze");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
