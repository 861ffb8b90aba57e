use chrono::{Duration, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    activity::log_activity,
    dto::admin::{
        DashboardStats, InventoryRow, RevenueAnalytics, RevenueBucket, SalesAnalytics, SalesPoint,
        UpdateInventoryRequest, UpdateOrderStatusRequest, UpdateUserStatusRequest, UserDetail,
    },
    entity::{
        addresses::{Column as AddressCol, Entity as Addresses},
        order_status_history::ActiveModel as HistoryActive,
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{
            ActiveModel as ProductActive, Column as ProductCol, Entity as Products,
            Model as ProductModel,
        },
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Address, Order, OrderStatus, UserPublic},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, Pagination, InventoryQuery, SalesQuery, UserListQuery},
    state::AppState,
};

const LOW_STOCK_THRESHOLD: i32 = 10;

// Dashboard and analytics go through raw SQL: grouped aggregates over
// soft-delete-filtered sets read better as plain queries. Empty result sets
// come back as zeroes, never as errors.

pub async fn dashboard(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<DashboardStats>> {
    ensure_admin(user)?;

    let (total_users,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM users WHERE deleted_at IS NULL")
            .fetch_one(&state.pool)
            .await?;
    let (total_orders,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM orders WHERE deleted_at IS NULL")
            .fetch_one(&state.pool)
            .await?;
    let (total_products,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM products WHERE deleted_at IS NULL")
            .fetch_one(&state.pool)
            .await?;
    let (pending_orders,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM orders WHERE deleted_at IS NULL AND status = 'pending'",
    )
    .fetch_one(&state.pool)
    .await?;
    let (low_stock_products,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM products WHERE deleted_at IS NULL AND stock_quantity < $1",
    )
    .bind(LOW_STOCK_THRESHOLD)
    .fetch_one(&state.pool)
    .await?;
    let (total_revenue,): (f64,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(total_amount), 0)
        FROM orders
        WHERE deleted_at IS NULL
          AND (status = 'delivered' OR payment_status = 'completed')
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let stats = DashboardStats {
        total_users,
        total_orders,
        total_products,
        total_revenue,
        pending_orders,
        low_stock_products,
    };

    Ok(ApiResponse::success("Dashboard", stats, None))
}

pub async fn sales_analytics(
    state: &AppState,
    user: &AuthUser,
    query: SalesQuery,
) -> AppResult<ApiResponse<SalesAnalytics>> {
    ensure_admin(user)?;

    let period = query.period.unwrap_or_else(|| "month".to_string());
    let (bucket, window_days) = match period.as_str() {
        "day" => ("day", 30),
        "week" => ("week", 90),
        "year" => ("month", 730),
        _ => ("month", 365),
    };
    let start = Utc::now() - Duration::days(window_days);

    // `bucket` comes from the fixed table above, never from user input.
    let sql = format!(
        r#"
        SELECT to_char(date_trunc('{bucket}', created_at), 'YYYY-MM-DD') AS date,
               COUNT(*) AS orders,
               COALESCE(SUM(total_amount), 0) AS revenue
        FROM orders
        WHERE deleted_at IS NULL AND created_at >= $1
        GROUP BY 1
        ORDER BY 1
        "#
    );
    let rows: Vec<(String, i64, f64)> = sqlx::query_as(&sql)
        .bind(start)
        .fetch_all(&state.pool)
        .await?;

    let data = rows
        .into_iter()
        .map(|(date, orders, revenue)| SalesPoint {
            date,
            orders,
            revenue,
        })
        .collect();

    Ok(ApiResponse::success(
        "Sales analytics",
        SalesAnalytics { period, data },
        None,
    ))
}

pub async fn revenue_analytics(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<RevenueAnalytics>> {
    ensure_admin(user)?;

    let by_product_type: Vec<(String, i64, f64)> = sqlx::query_as(
        r#"
        SELECT p.product_type,
               COUNT(DISTINCT oi.order_id) AS orders,
               COALESCE(SUM(oi.total_price), 0) AS revenue
        FROM order_items oi
        JOIN products p ON p.id = oi.product_id
        WHERE oi.deleted_at IS NULL
        GROUP BY p.product_type
        ORDER BY revenue DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let by_state: Vec<(String, i64, f64)> = sqlx::query_as(
        r#"
        SELECT p.state_origin,
               COUNT(DISTINCT oi.order_id) AS orders,
               COALESCE(SUM(oi.total_price), 0) AS revenue
        FROM order_items oi
        JOIN products p ON p.id = oi.product_id
        WHERE oi.deleted_at IS NULL
          AND p.state_origin IS NOT NULL AND p.state_origin <> ''
        GROUP BY p.state_origin
        ORDER BY revenue DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let data = RevenueAnalytics {
        by_product_type: buckets(by_product_type),
        by_state: buckets(by_state),
    };

    Ok(ApiResponse::success("Revenue analytics", data, None))
}

fn buckets(rows: Vec<(String, i64, f64)>) -> Vec<RevenueBucket> {
    rows.into_iter()
        .map(|(label, orders, revenue)| RevenueBucket {
            label,
            orders,
            revenue,
        })
        .collect()
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: UserListQuery,
) -> AppResult<ApiResponse<Vec<UserPublic>>> {
    ensure_admin(user)?;
    let (page, per_page, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(role) = query.role.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(UserCol::Role.eq(role.clone()));
    }
    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(UserCol::Name).ilike(pattern.clone()))
                .add(Expr::col(UserCol::Email).ilike(pattern)),
        );
    }

    let finder = Users::find_alive()
        .filter(condition)
        .order_by_desc(UserCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(UserPublic::from_entity)
        .collect();

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success("Users", items, Some(meta)))
}

pub async fn get_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<UserDetail>> {
    ensure_admin(user)?;

    let found = Users::find_alive()
        .filter(UserCol::Id.eq(id))
        .one(&state.orm)
        .await?;
    let found = match found {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let addresses = Addresses::find_alive()
        .filter(AddressCol::UserId.eq(found.id))
        .order_by_desc(AddressCol::IsDefault)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Address::from_entity)
        .collect();

    Ok(ApiResponse::success(
        "User",
        UserDetail {
            user: UserPublic::from_entity(found),
            addresses,
        },
        None,
    ))
}

pub async fn list_user_orders(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<Order>>> {
    ensure_admin(user)?;
    let (page, per_page, offset) = pagination.normalize();

    let finder = Orders::find_alive()
        .filter(OrderCol::UserId.eq(id))
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from_entity)
        .collect();

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success("Orders", orders, Some(meta)))
}

pub async fn update_user_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserStatusRequest,
) -> AppResult<ApiResponse<UserPublic>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = Users::find_alive()
        .filter(UserCol::Id.eq(id))
        .one(&state.orm)
        .await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let mut active: UserActive = existing.into();
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(email_verified) = payload.email_verified {
        active.email_verified = Set(email_verified);
    }
    if let Some(role) = payload.role {
        active.role = Set(role);
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_activity(
        &state.pool,
        Some(user.user_id),
        "user_status_update",
        "user",
        Some(updated.id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "activity log failed");
    }

    Ok(ApiResponse::success(
        "User updated successfully",
        UserPublic::from_entity(updated),
        None,
    ))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<Vec<Order>>> {
    ensure_admin(user)?;
    let (page, per_page, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }
    if let Some(user_id) = query.user_id {
        condition = condition.add(OrderCol::UserId.eq(user_id));
    }

    let finder = Orders::find_alive()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from_entity)
        .collect();

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success("Orders", orders, Some(meta)))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;

    let next = OrderStatus::parse(&payload.status)
        .ok_or_else(|| AppError::BadRequest("Invalid order status".into()))?;

    let txn = state.orm.begin().await?;

    let existing = Orders::find_alive()
        .filter(OrderCol::Id.eq(id))
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let current = OrderStatus::parse(&existing.status)
        .ok_or_else(|| AppError::BadRequest("Order has an unknown status".into()))?;
    if !current.can_transition(next) {
        return Err(AppError::BadRequest(format!(
            "Invalid status transition {} -> {}",
            current.as_str(),
            next.as_str()
        )));
    }

    let mut active: OrderActive = existing.into();
    active.status = Set(next.as_str().into());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    HistoryActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        status: Set(next.as_str().into()),
        comment: Set(payload.notes.clone()),
        changed_by: Set(Some(user.user_id)),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    if let Err(err) = log_activity(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        "order",
        Some(order.id),
        Some(serde_json::json!({ "status": order.status, "notes": payload.notes })),
    )
    .await
    {
        tracing::warn!(error = %err, "activity log failed");
    }

    Ok(ApiResponse::success(
        "Order updated successfully",
        Order::from_entity(order),
        None,
    ))
}

pub async fn list_inventory(
    state: &AppState,
    user: &AuthUser,
    query: InventoryQuery,
) -> AppResult<ApiResponse<Vec<InventoryRow>>> {
    ensure_admin(user)?;
    let (page, per_page, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if query.low_stock.unwrap_or(false) {
        condition = condition.add(ProductCol::StockQuantity.lt(LOW_STOCK_THRESHOLD));
    }

    let finder = Products::find_alive()
        .filter(condition)
        .order_by_asc(ProductCol::StockQuantity);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(inventory_row)
        .collect();

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success("Inventory", items, Some(meta)))
}

pub async fn update_inventory(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateInventoryRequest,
) -> AppResult<ApiResponse<InventoryRow>> {
    ensure_admin(user)?;
    payload.validate()?;

    let txn = state.orm.begin().await?;

    let product = Products::find_alive()
        .filter(ProductCol::Id.eq(id))
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut active: ProductActive = product.into();
    active.stock_quantity = Set(payload.stock_quantity);
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_activity(
        &state.pool,
        Some(user.user_id),
        "inventory_update",
        "product",
        Some(updated.id),
        Some(serde_json::json!({ "stock_quantity": updated.stock_quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "activity log failed");
    }

    Ok(ApiResponse::success(
        "Inventory updated successfully",
        inventory_row(updated),
        None,
    ))
}

fn inventory_row(m: ProductModel) -> InventoryRow {
    InventoryRow {
        id: m.id,
        name: m.name,
        slug: m.slug,
        product_type: m.product_type,
        state_origin: m.state_origin,
        stock_quantity: m.stock_quantity,
        base_price: m.base_price,
        final_price: m.final_price,
        is_active: m.is_active,
    }
}
