use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{response::ApiResponse, state::AppState};

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "OK", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<ApiResponse<HealthData>> {
    let data = HealthData {
        status: "ok".to_string(),
        database: None,
    };

    Json(ApiResponse::success("Health check", data, None))
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "OK with database status", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn api_health(State(state): State<AppState>) -> Json<ApiResponse<HealthData>> {
    let database = match state.orm.ping().await {
        Ok(()) => "healthy",
        Err(_) => "unhealthy",
    };
    let data = HealthData {
        status: "ok".to_string(),
        database: Some(database.to_string()),
    };

    Json(ApiResponse::success("Health check", data, None))
}
