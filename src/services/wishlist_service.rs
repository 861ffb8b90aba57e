use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    activity::log_activity,
    dto::cart::AddToWishlistRequest,
    entity::{
        products::{Column as ProductCol, Entity as Products, Model as ProductModel},
        wishlist_items::{
            ActiveModel as WishlistActive, Column as WishlistCol, Entity as WishlistItems,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_wishlist(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let (page, per_page, offset) = pagination.normalize();

    let finder = WishlistItems::find_alive()
        .filter(WishlistCol::UserId.eq(user.user_id))
        .order_by_desc(WishlistCol::AddedAt);

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

    let items = rows
        .into_iter()
        .filter_map(|row| {
            products
                .get(&row.product_id)
                .cloned()
                .map(|p| Product::from_entity(p, Vec::new()))
        })
        .collect();

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success("Wishlist", items, Some(meta)))
}

pub async fn add_to_wishlist(
    state: &AppState,
    user: &AuthUser,
    payload: AddToWishlistRequest,
) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_alive()
        .filter(ProductCol::Id.eq(payload.product_id))
        .filter(ProductCol::IsActive.eq(true))
        .one(&state.orm)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::BadRequest("Product not found or inactive".into())),
    };

    let existing = WishlistItems::find_alive()
        .filter(WishlistCol::UserId.eq(user.user_id))
        .filter(WishlistCol::ProductId.eq(payload.product_id))
        .one(&state.orm)
        .await?;

    if existing.is_none() {
        WishlistActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.user_id),
            product_id: Set(payload.product_id),
            added_at: NotSet,
            deleted_at: Set(None),
        }
        .insert(&state.orm)
        .await?;

        if let Err(err) = log_activity(
            &state.pool,
            Some(user.user_id),
            "wishlist_add",
            "wishlist_item",
            Some(payload.product_id),
            None,
        )
        .await
        {
            tracing::warn!(error = %err, "activity log failed");
        }
    }

    Ok(ApiResponse::success(
        "Added to wishlist",
        Product::from_entity(product, Vec::new()),
        None,
    ))
}

pub async fn remove_from_wishlist(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let item = WishlistItems::find_alive()
        .filter(WishlistCol::UserId.eq(user.user_id))
        .filter(WishlistCol::ProductId.eq(product_id))
        .one(&state.orm)
        .await?;
    let item = match item {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };

    let mut active: WishlistActive = item.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Removed from wishlist",
        serde_json::json!({}),
        None,
    ))
}
