use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    activity::log_activity,
    dto::orders::{CreateOrderRequest, OrderDetail, OrderWithItems, TrackingInfo},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        order_status_history::{ActiveModel as HistoryActive, Column as HistoryCol, Entity as OrderStatusHistory},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{Column as ProductCol, Entity as Products},
        shipments::{Column as ShipmentCol, Entity as Shipments},
        tracking_events::{Column as EventCol, Entity as TrackingEvents},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem, OrderStatus, OrderStatusEntry, PaymentStatus, Shipment},
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    state::AppState,
};

/// Create an order from the user's cart in one transaction: price and stock
/// are read under row locks, stock is decremented, the cart is cleared.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    payload.validate()?;

    let txn = state.orm.begin().await?;

    let cart_rows = CartItems::find_alive()
        .filter(CartCol::UserId.eq(user.user_id))
        .all(&txn)
        .await?;
    if cart_rows.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let product_ids: Vec<Uuid> = cart_rows.iter().map(|r| r.product_id).collect();
    let products: HashMap<Uuid, _> = Products::find_alive()
        .filter(ProductCol::Id.is_in(product_ids))
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut subtotal = 0.0_f64;
    for row in &cart_rows {
        let product = products
            .get(&row.product_id)
            .filter(|p| p.is_active)
            .ok_or_else(|| {
                AppError::BadRequest(format!("Product {} is unavailable", row.product_id))
            })?;
        if row.quantity < 1 {
            return Err(AppError::BadRequest("Cart has invalid quantity".into()));
        }
        if product.stock_quantity < row.quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {}",
                product.name
            )));
        }
        subtotal += product.final_price * f64::from(row.quantity);
    }

    let order_id = Uuid::new_v4();
    let order = OrderActive {
        id: Set(order_id),
        order_number: Set(build_order_number(order_id)),
        user_id: Set(user.user_id),
        status: Set(OrderStatus::Pending.as_str().into()),
        payment_status: Set(PaymentStatus::Pending.as_str().into()),
        payment_method: Set(payload.payment_method),
        subtotal_amount: Set(subtotal),
        discount_amount: Set(0.0),
        tax_amount: Set(0.0),
        shipping_amount: Set(0.0),
        total_amount: Set(subtotal),
        coupon_code: Set(None),
        shipping_address: Set(Some(payload.shipping_address)),
        billing_address: Set(payload.billing_address),
        customer_notes: Set(payload.customer_notes),
        admin_notes: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(cart_rows.len());
    for row in &cart_rows {
        let product = &products[&row.product_id];
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(product.id),
            product_name: Set(product.name.clone()),
            quantity: Set(row.quantity),
            unit_price: Set(product.final_price),
            total_price: Set(product.final_price * f64::from(row.quantity)),
            metadata: Set(None),
            created_at: NotSet,
            deleted_at: Set(None),
        }
        .insert(&txn)
        .await?;
        items.push(OrderItem::from_entity(item));

        Products::update_many()
            .col_expr(
                ProductCol::StockQuantity,
                Expr::col(ProductCol::StockQuantity).sub(row.quantity),
            )
            .filter(ProductCol::Id.eq(product.id))
            .exec(&txn)
            .await?;
    }

    HistoryActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        status: Set(OrderStatus::Pending.as_str().into()),
        comment: Set(Some("Order placed".into())),
        changed_by: Set(Some(user.user_id)),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    CartItems::update_many()
        .col_expr(CartCol::DeletedAt, Expr::value(Utc::now()))
        .filter(CartCol::UserId.eq(user.user_id))
        .filter(CartCol::DeletedAt.is_null())
        .exec(&txn)
        .await?;

    txn.commit().await?;

    if let Err(err) = log_activity(
        &state.pool,
        Some(user.user_id),
        "order_create",
        "order",
        Some(order.id),
        Some(serde_json::json!({ "order_number": order.order_number })),
    )
    .await
    {
        tracing::warn!(error = %err, "activity log failed");
    }

    Ok(ApiResponse::success(
        "Order placed successfully",
        OrderWithItems {
            order: Order::from_entity(order),
            items,
        },
        None,
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let (page, per_page, offset) = query.pagination.normalize();

    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
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

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    let order = find_user_order(state, user, id).await?;

    let items = OrderItems::find_alive()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItem::from_entity)
        .collect();

    let status_history = OrderStatusHistory::find()
        .filter(HistoryCol::OrderId.eq(order.id))
        .order_by_asc(HistoryCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderStatusEntry::from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Order",
        OrderDetail {
            order: Order::from_entity(order),
            items,
            status_history,
        },
        None,
    ))
}

/// Customers may cancel their own orders while they are still pending or
/// confirmed; the cancelled stock goes back on the shelf.
pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let txn = state.orm.begin().await?;

    let order = Orders::find_alive()
        .filter(OrderCol::Id.eq(id))
        .filter(OrderCol::UserId.eq(user.user_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let current = OrderStatus::parse(&order.status)
        .ok_or_else(|| AppError::BadRequest("Order has an unknown status".into()))?;
    if !current.can_transition(OrderStatus::Cancelled) {
        return Err(AppError::BadRequest(format!(
            "Cannot cancel an order in status {}",
            order.status
        )));
    }

    let items = OrderItems::find_alive()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&txn)
        .await?;
    for item in &items {
        Products::update_many()
            .col_expr(
                ProductCol::StockQuantity,
                Expr::col(ProductCol::StockQuantity).add(item.quantity),
            )
            .filter(ProductCol::Id.eq(item.product_id))
            .exec(&txn)
            .await?;
    }

    let mut active: OrderActive = order.into();
    active.status = Set(OrderStatus::Cancelled.as_str().into());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    HistoryActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        status: Set(OrderStatus::Cancelled.as_str().into()),
        comment: Set(Some("Cancelled by customer".into())),
        changed_by: Set(Some(user.user_id)),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    if let Err(err) = log_activity(
        &state.pool,
        Some(user.user_id),
        "order_cancel",
        "order",
        Some(order.id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "activity log failed");
    }

    Ok(ApiResponse::success(
        "Order cancelled",
        Order::from_entity(order),
        None,
    ))
}

pub async fn track_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<TrackingInfo>> {
    let order = find_user_order(state, user, id).await?;

    let shipment = Shipments::find_alive()
        .filter(ShipmentCol::OrderId.eq(order.id))
        .one(&state.orm)
        .await?;

    let shipment = match shipment {
        Some(s) => {
            let events = TrackingEvents::find()
                .filter(EventCol::ShipmentId.eq(s.id))
                .order_by_asc(EventCol::EventTime)
                .all(&state.orm)
                .await?;
            Some(Shipment::from_entity(s, events))
        }
        None => None,
    };

    Ok(ApiResponse::success(
        "Tracking",
        TrackingInfo {
            order_number: order.order_number,
            status: order.status,
            shipment,
        },
        None,
    ))
}

async fn find_user_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<crate::entity::orders::Model> {
    let order = Orders::find_alive()
        .filter(OrderCol::Id.eq(id))
        .filter(OrderCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?;
    match order {
        Some(o) => Ok(o),
        None => Err(AppError::NotFound),
    }
}

fn build_order_number(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let id = order_id.simple().to_string();
    format!("ORD-{}-{}", date, id[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_number_embeds_date_and_own_id() {
        let id = Uuid::new_v4();
        let number = build_order_number(id);
        assert!(number.starts_with("ORD-"));
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 8);
        assert!(
            id.simple()
                .to_string()
                .to_uppercase()
                .starts_with(parts[2])
        );
    }
}
