use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    activity::log_activity,
    dto::products::{CreateProductRequest, UpdateProductRequest},
    entity::{
        product_images::{
            ActiveModel as ImageActive, Column as ImageCol, Entity as ProductImages,
            Model as ImageModel,
        },
        products::{ActiveModel as ProductActive, Column as ProductCol, Entity as Products},
        regions::{Column as RegionCol, Entity as Regions},
        reviews::{Column as ReviewCol, Entity as Reviews},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Product, Review},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, ProductQuery, ProductSortBy, SortOrder},
    slug,
    state::AppState,
};

/// The one place the catalog's price invariant is maintained.
pub fn compute_final_price(base_price: f64, discount_percentage: f64) -> f64 {
    base_price - base_price * discount_percentage / 100.0
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let (page, per_page, offset) = query.pagination.normalize();

    let mut condition = Condition::all().add(ProductCol::IsActive.eq(true));

    if let Some(state_code) = query.state.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(ProductCol::StateOrigin.eq(state_code.clone()));
    }
    if let Some(region_slug) = query.region.as_ref().filter(|s| !s.is_empty()) {
        let region = Regions::find_alive()
            .filter(RegionCol::Slug.eq(region_slug.clone()))
            .one(&state.orm)
            .await?;
        // An unknown region matches nothing; that is an empty page, not an error.
        match region {
            Some(r) => condition = condition.add(ProductCol::RegionId.eq(r.id)),
            None => {
                return Ok(ApiResponse::success(
                    "Products",
                    Vec::new(),
                    Some(Meta::new(page, per_page, 0)),
                ));
            }
        }
    }
    if let Some(saree_type) = query.saree_type.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(ProductCol::SareeType.eq(saree_type.clone()));
    }
    if let Some(fabric) = query.fabric.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(ProductCol::Fabric.eq(fabric.clone()));
    }
    if let Some(product_type) = query.product_type.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(ProductCol::ProductType.eq(product_type.clone()));
    }
    if let Some(occasion) = query.occasion.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(ProductCol::Occasion.eq(occasion.clone()));
    }
    if let Some(min_price) = query.min_price {
        condition = condition.add(ProductCol::FinalPrice.gte(min_price));
    }
    if let Some(max_price) = query.max_price {
        condition = condition.add(ProductCol::FinalPrice.lte(max_price));
    }

    let sort_col = match ProductSortBy::parse(query.sort.as_deref()) {
        ProductSortBy::CreatedAt => ProductCol::CreatedAt,
        ProductSortBy::Price => ProductCol::FinalPrice,
        ProductSortBy::Name => ProductCol::Name,
    };

    let mut finder = Products::find_alive().filter(condition);
    finder = match SortOrder::parse(query.order.as_deref()) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let mut images = load_images(state, models.iter().map(|m| m.id).collect()).await?;
    let items = models
        .into_iter()
        .map(|m| {
            let imgs = images.remove(&m.id).unwrap_or_default();
            Product::from_entity(m, imgs)
        })
        .collect();

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success("Products", items, Some(meta)))
}

pub async fn get_product_by_slug(
    state: &AppState,
    slug_value: &str,
) -> AppResult<ApiResponse<Product>> {
    let model = Products::find_alive()
        .filter(ProductCol::Slug.eq(slug_value))
        .filter(ProductCol::IsActive.eq(true))
        .one(&state.orm)
        .await?;
    let model = match model {
        Some(m) => m,
        None => return Err(AppError::NotFound),
    };

    let images = ProductImages::find()
        .filter(ImageCol::ProductId.eq(model.id))
        .order_by_asc(ImageCol::DisplayOrder)
        .all(&state.orm)
        .await?;

    let reviews = Reviews::find_alive()
        .filter(ReviewCol::ProductId.eq(model.id))
        .filter(ReviewCol::IsApproved.eq(true))
        .order_by_desc(ReviewCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Review::from_entity)
        .collect();

    let mut product = Product::from_entity(model, images);
    product.reviews = reviews;

    Ok(ApiResponse::success("Product", product, None))
}

pub async fn list_products_by_state(
    state: &AppState,
    state_code: &str,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let (page, per_page, offset) = pagination.normalize();

    let finder = Products::find_alive()
        .filter(ProductCol::StateOrigin.eq(state_code))
        .filter(ProductCol::IsActive.eq(true))
        .order_by_desc(ProductCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let models = finder
        .limit(per_page as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let mut images = load_images(state, models.iter().map(|m| m.id).collect()).await?;
    let items = models
        .into_iter()
        .map(|m| {
            let imgs = images.remove(&m.id).unwrap_or_default();
            Product::from_entity(m, imgs)
        })
        .collect();

    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success("Products", items, Some(meta)))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate()?;

    let id = Uuid::new_v4();
    let mut product_slug = slug::generate(&payload.name);
    let collision = Products::find()
        .filter(ProductCol::Slug.eq(product_slug.clone()))
        .one(&state.orm)
        .await?;
    if collision.is_some() {
        product_slug = slug::disambiguate(&product_slug, id);
    }

    let final_price = compute_final_price(payload.base_price, payload.discount_percentage);

    // Product and its images are one atomic unit: an image failure rolls back
    // the product row as well.
    let txn = state.orm.begin().await?;

    let product = ProductActive {
        id: Set(id),
        name: Set(payload.name),
        slug: Set(product_slug),
        description: Set(payload.description),
        product_type: Set(payload.product_type),
        region_id: Set(payload.region_id),
        vendor_id: Set(payload.vendor_id),
        state_origin: Set(payload.state_origin),
        saree_type: Set(payload.saree_type),
        base_price: Set(payload.base_price),
        discount_percentage: Set(payload.discount_percentage),
        final_price: Set(final_price),
        fabric: Set(payload.fabric),
        weave_type: Set(payload.weave_type),
        occasion: Set(payload.occasion),
        stock_quantity: Set(payload.stock_quantity),
        is_active: Set(true),
        metadata: Set(payload.metadata),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&txn)
    .await?;

    let mut images: Vec<ImageModel> = Vec::with_capacity(payload.images.len());
    for input in payload.images {
        let image = ImageActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product.id),
            image_url: Set(input.image_url),
            alt_text: Set(input.alt_text),
            display_order: Set(input.display_order),
            is_primary: Set(input.is_primary),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        images.push(image);
    }

    txn.commit().await?;

    images.sort_by_key(|img| img.display_order);

    if let Err(err) = log_activity(
        &state.pool,
        Some(user.user_id),
        "product_create",
        "product",
        Some(product.id),
        Some(serde_json::json!({ "slug": product.slug })),
    )
    .await
    {
        tracing::warn!(error = %err, "activity log failed");
    }

    Ok(ApiResponse::success(
        "Product created successfully",
        Product::from_entity(product, images),
        None,
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = Products::find_alive()
        .filter(ProductCol::Id.eq(id))
        .one(&state.orm)
        .await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    // Effective price inputs first; the stored final price is always derived.
    let base_price = payload.base_price.unwrap_or(existing.base_price);
    let discount = payload
        .discount_percentage
        .unwrap_or(existing.discount_percentage);

    let mut active: ProductActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(product_type) = payload.product_type {
        active.product_type = Set(product_type);
    }
    if let Some(region_id) = payload.region_id {
        active.region_id = Set(Some(region_id));
    }
    if let Some(vendor_id) = payload.vendor_id {
        active.vendor_id = Set(Some(vendor_id));
    }
    if let Some(state_origin) = payload.state_origin {
        active.state_origin = Set(Some(state_origin));
    }
    if let Some(saree_type) = payload.saree_type {
        active.saree_type = Set(Some(saree_type));
    }
    if let Some(fabric) = payload.fabric {
        active.fabric = Set(Some(fabric));
    }
    if let Some(weave_type) = payload.weave_type {
        active.weave_type = Set(Some(weave_type));
    }
    if let Some(occasion) = payload.occasion {
        active.occasion = Set(Some(occasion));
    }
    if let Some(stock) = payload.stock_quantity {
        active.stock_quantity = Set(stock);
    }
    if let Some(metadata) = payload.metadata {
        active.metadata = Set(Some(metadata));
    }
    active.base_price = Set(base_price);
    active.discount_percentage = Set(discount);
    active.final_price = Set(compute_final_price(base_price, discount));
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    let images = ProductImages::find()
        .filter(ImageCol::ProductId.eq(product.id))
        .order_by_asc(ImageCol::DisplayOrder)
        .all(&state.orm)
        .await?;

    if let Err(err) = log_activity(
        &state.pool,
        Some(user.user_id),
        "product_update",
        "product",
        Some(product.id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "activity log failed");
    }

    Ok(ApiResponse::success(
        "Product updated successfully",
        Product::from_entity(product, images),
        None,
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let existing = Products::find_alive()
        .filter(ProductCol::Id.eq(id))
        .one(&state.orm)
        .await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut active: ProductActive = existing.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    if let Err(err) = log_activity(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        "product",
        Some(id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "activity log failed");
    }

    Ok(ApiResponse::success(
        "Product deleted successfully",
        serde_json::json!({}),
        None,
    ))
}

/// Images for a page of products, grouped by product, display_order ascending.
async fn load_images(
    state: &AppState,
    product_ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, Vec<ImageModel>>> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = ProductImages::find()
        .filter(ImageCol::ProductId.is_in(product_ids))
        .order_by_asc(ImageCol::DisplayOrder)
        .all(&state.orm)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<ImageModel>> = HashMap::new();
    for row in rows {
        grouped.entry(row.product_id).or_default().push(row);
    }
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::compute_final_price;

    #[test]
    fn final_price_is_base_minus_discount() {
        assert_eq!(compute_final_price(4999.0, 20.0), 3999.2);
        assert_eq!(compute_final_price(1000.0, 0.0), 1000.0);
        assert_eq!(compute_final_price(1000.0, 100.0), 0.0);
    }

    #[test]
    fn final_price_holds_across_the_discount_range() {
        let base = 2500.0;
        for discount in [0.0, 5.0, 12.5, 50.0, 99.9, 100.0] {
            let expected = base - base * discount / 100.0;
            assert!((compute_final_price(base, discount) - expected).abs() < f64::EPSILON);
        }
    }
}
