use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::admin::{
        DashboardStats, InventoryRow, RevenueAnalytics, SalesAnalytics, UpdateInventoryRequest,
        UpdateOrderStatusRequest, UpdateUserStatusRequest, UserDetail,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Order, UserPublic},
    response::ApiResponse,
    routes::params::{InventoryQuery, OrderListQuery, Pagination, SalesQuery, UserListQuery},
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/analytics/sales", get(sales_analytics))
        .route("/analytics/revenue", get(revenue_analytics))
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/orders", get(list_user_orders))
        .route("/users/{id}/status", put(update_user_status))
        .route("/orders", get(list_all_orders))
        .route("/orders/{id}/status", put(update_order_status))
        .route("/inventory", get(list_inventory))
        .route("/inventory/{id}", put(update_inventory))
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Dashboard counters and revenue", body = ApiResponse<DashboardStats>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let resp = admin_service::dashboard(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/analytics/sales",
    params(
        ("period" = Option<String>, Query, description = "day, week, month or year"),
    ),
    responses(
        (status = 200, description = "Orders and revenue per bucket", body = ApiResponse<SalesAnalytics>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn sales_analytics(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SalesQuery>,
) -> AppResult<Json<ApiResponse<SalesAnalytics>>> {
    let resp = admin_service::sales_analytics(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/analytics/revenue",
    responses(
        (status = 200, description = "Revenue by product type and state of origin", body = ApiResponse<RevenueAnalytics>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn revenue_analytics(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<RevenueAnalytics>>> {
    let resp = admin_service::revenue_analytics(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("role" = Option<String>, Query, description = "Filter by role"),
        ("search" = Option<String>, Query, description = "Search name or email"),
    ),
    responses(
        (status = 200, description = "Paginated users", body = ApiResponse<Vec<UserPublic>>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<ApiResponse<Vec<UserPublic>>>> {
    let resp = admin_service::list_users(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User with addresses", body = ApiResponse<UserDetail>),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UserDetail>>> {
    let resp = admin_service::get_user(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}/orders",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "The user's orders", body = ApiResponse<Vec<Order>>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_user_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let resp = admin_service::list_user_orders(&state, &user, id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/status",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserStatusRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserPublic>),
        (status = 400, description = "Invalid role or empty update"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_user_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserStatusRequest>,
) -> AppResult<Json<ApiResponse<UserPublic>>> {
    let resp = admin_service::update_user_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("user_id" = Option<Uuid>, Query, description = "Filter by user"),
    ),
    responses(
        (status = 200, description = "Paginated orders across all users", body = ApiResponse<Vec<Order>>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let resp = admin_service::list_all_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated with a history entry", body = ApiResponse<Order>),
        (status = 400, description = "Unknown status or invalid transition"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = admin_service::update_order_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/inventory",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("low_stock" = Option<bool>, Query, description = "Only items with stock below 10"),
    ),
    responses(
        (status = 200, description = "Stock levels, lowest first", body = ApiResponse<Vec<InventoryRow>>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<InventoryQuery>,
) -> AppResult<Json<ApiResponse<Vec<InventoryRow>>>> {
    let resp = admin_service::list_inventory(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/inventory/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateInventoryRequest,
    responses(
        (status = 200, description = "Stock updated", body = ApiResponse<InventoryRow>),
        (status = 400, description = "Negative stock"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInventoryRequest>,
) -> AppResult<Json<ApiResponse<InventoryRow>>> {
    let resp = admin_service::update_inventory(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
