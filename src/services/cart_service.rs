use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    activity::log_activity,
    dto::cart::{AddToCartRequest, CartItemDto, UpdateCartItemRequest},
    entity::{
        cart_items::{
            ActiveModel as CartActive, Column as CartCol, Entity as CartItems, Model as CartModel,
        },
        products::{Column as ProductCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_cart(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<CartItemDto>>> {
    let (page, per_page, offset) = pagination.normalize();

    let finder = CartItems::find_alive()
        .filter(CartCol::UserId.eq(user.user_id))
        .order_by_desc(CartCol::AddedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let rows = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let product_ids: Vec<Uuid> = rows.iter().map(|r| r.product_id).collect();
    let products: HashMap<Uuid, ProductModel> = if product_ids.is_empty() {
        HashMap::new()
    } else {
        Products::find_alive()
            .filter(ProductCol::Id.is_in(product_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
    };

    // Rows whose product has since been soft-deleted are dropped from the view.
    let items = rows
        .into_iter()
        .filter_map(|row| {
            products
                .get(&row.product_id)
                .cloned()
                .map(|p| cart_item_dto(row, p))
        })
        .collect();

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success("Cart", items, Some(meta)))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItemDto>> {
    if payload.quantity < 1 {
        return Err(AppError::BadRequest("Quantity must be at least 1".into()));
    }

    let product = Products::find_alive()
        .filter(ProductCol::Id.eq(payload.product_id))
        .filter(ProductCol::IsActive.eq(true))
        .one(&state.orm)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::BadRequest("Product not found or inactive".into())),
    };

    // One cart row per (user, product): an existing row gets the new quantity.
    let existing = CartItems::find_alive()
        .filter(CartCol::UserId.eq(user.user_id))
        .filter(CartCol::ProductId.eq(payload.product_id))
        .one(&state.orm)
        .await?;

    let item = if let Some(item) = existing {
        let mut active: CartActive = item.into();
        active.quantity = Set(payload.quantity);
        active.updated_at = Set(Utc::now().into());
        active.update(&state.orm).await?
    } else {
        CartActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.user_id),
            product_id: Set(payload.product_id),
            quantity: Set(payload.quantity),
            added_at: NotSet,
            updated_at: NotSet,
            deleted_at: Set(None),
        }
        .insert(&state.orm)
        .await?
    };

    if let Err(err) = log_activity(
        &state.pool,
        Some(user.user_id),
        "cart_update",
        "cart_item",
        Some(item.id),
        Some(serde_json::json!({ "product_id": payload.product_id, "quantity": payload.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "activity log failed");
    }

    Ok(ApiResponse::success(
        "Added to cart",
        cart_item_dto(item, product),
        None,
    ))
}

pub async fn update_cart_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItemDto>> {
    if payload.quantity < 1 {
        return Err(AppError::BadRequest("Quantity must be at least 1".into()));
    }

    let item = CartItems::find_alive()
        .filter(CartCol::Id.eq(id))
        .filter(CartCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?;
    let item = match item {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };

    let product_id = item.product_id;
    let mut active: CartActive = item.into();
    active.quantity = Set(payload.quantity);
    active.updated_at = Set(Utc::now().into());
    let item = active.update(&state.orm).await?;

    let product = Products::find_alive()
        .filter(ProductCol::Id.eq(product_id))
        .one(&state.orm)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    Ok(ApiResponse::success(
        "Cart item updated",
        cart_item_dto(item, product),
        None,
    ))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let item = CartItems::find_alive()
        .filter(CartCol::Id.eq(id))
        .filter(CartCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?;
    let item = match item {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };

    let mut active: CartActive = item.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        None,
    ))
}

pub async fn clear_cart(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    CartItems::update_many()
        .col_expr(CartCol::DeletedAt, Expr::value(Utc::now()))
        .filter(CartCol::UserId.eq(user.user_id))
        .filter(CartCol::DeletedAt.is_null())
        .exec(&state.orm)
        .await?;

    Ok(ApiResponse::success(
        "Cart cleared",
        serde_json::json!({}),
        None,
    ))
}

fn cart_item_dto(item: CartModel, product: ProductModel) -> CartItemDto {
    CartItemDto {
        id: item.id,
        product: Product::from_entity(product, Vec::new()),
        quantity: item.quantity,
        added_at: item.added_at.with_timezone(&Utc),
    }
}
