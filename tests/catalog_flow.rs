mod common;

use common::{ProductSpec, create_user, seed_product, setup_state};
use handloom_market_api::{
    dto::products::ProductImageInput,
    error::AppError,
    routes::params::{Pagination, ProductQuery},
    services::product_service,
};

// Create with images -> fetch by slug -> images come back ordered; the slug
// collision suffix comes from the new row's own id.
#[tokio::test]
async fn create_and_fetch_product_with_images() -> anyhow::Result<()> {
    let db = match setup_state().await? {
        Some(d) => d,
        None => return Ok(()),
    };
    let state = db.state.clone();
    let admin = create_user(&state, "admin", "admin@example.com").await?;

    let mut spec = ProductSpec::new("Kasavu Saree Gold Border", 4999.0);
    spec.discount_percentage = 20.0;
    spec.images = vec![
        ProductImageInput {
            image_url: "https://cdn.example.com/b.jpg".into(),
            alt_text: None,
            display_order: 2,
            is_primary: false,
        },
        ProductImageInput {
            image_url: "https://cdn.example.com/a.jpg".into(),
            alt_text: Some("front".into()),
            display_order: 1,
            is_primary: true,
        },
    ];
    let created = seed_product(&state, &admin, spec).await?;

    assert_eq!(created.slug, "kasavu-saree-gold-border");
    assert_eq!(created.final_price, 4999.0 - 4999.0 * 20.0 / 100.0);

    let fetched = product_service::get_product_by_slug(&state, &created.slug)
        .await?
        .data
        .expect("product");
    let orders: Vec<i32> = fetched.images.iter().map(|i| i.display_order).collect();
    assert_eq!(orders, vec![1, 2]);
    assert_eq!(fetched.images.len(), 2);

    // Same name again: the new slug is disambiguated with the new row's own id.
    let duplicate = seed_product(&state, &admin, ProductSpec::new("Kasavu Saree Gold Border", 3000.0)).await?;
    let expected_suffix = &duplicate.id.simple().to_string()[..8];
    assert_eq!(
        duplicate.slug,
        format!("kasavu-saree-gold-border-{expected_suffix}")
    );

    Ok(())
}

#[tokio::test]
async fn listing_applies_filters_sort_and_pagination() -> anyhow::Result<()> {
    let db = match setup_state().await? {
        Some(d) => d,
        None => return Ok(()),
    };
    let state = db.state.clone();
    let admin = create_user(&state, "admin", "admin@example.com").await?;

    let mut cheap = ProductSpec::new("Cotton Daily Saree", 800.0);
    cheap.fabric = Some("Cotton");
    cheap.state_origin = Some("KL");
    seed_product(&state, &admin, cheap).await?;

    let mut mid = ProductSpec::new("Silk Festival Saree", 3000.0);
    mid.fabric = Some("Silk");
    mid.state_origin = Some("TN");
    seed_product(&state, &admin, mid).await?;

    let mut mid2 = ProductSpec::new("Silk Party Saree", 4500.0);
    mid2.fabric = Some("Silk");
    mid2.state_origin = Some("TN");
    seed_product(&state, &admin, mid2).await?;

    let mut costly = ProductSpec::new("Bridal Silk Saree", 16000.0);
    costly.fabric = Some("Silk");
    costly.state_origin = Some("TN");
    seed_product(&state, &admin, costly).await?;

    // Price window sorted ascending by price.
    let resp = product_service::list_products(
        &state,
        ProductQuery {
            min_price: Some(1000.0),
            max_price: Some(5000.0),
            sort: Some("price".into()),
            order: Some("asc".into()),
            ..Default::default()
        },
    )
    .await?;
    let items = resp.data.expect("products");
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|p| p.final_price >= 1000.0 && p.final_price <= 5000.0));
    assert!(items.windows(2).all(|w| w[0].final_price <= w[1].final_price));
    let meta = resp.pagination.expect("pagination");
    assert_eq!(meta.total, 2);
    assert_eq!(meta.total_pages, 1);

    // Conjoined equality filters.
    let resp = product_service::list_products(
        &state,
        ProductQuery {
            fabric: Some("Silk".into()),
            state: Some("TN".into()),
            ..Default::default()
        },
    )
    .await?;
    let items = resp.data.expect("products");
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|p| {
        p.fabric.as_deref() == Some("Silk") && p.state_origin.as_deref() == Some("TN") && p.is_active
    }));

    // Zero matches is an empty page, not an error.
    let resp = product_service::list_products(
        &state,
        ProductQuery {
            fabric: Some("Linen".into()),
            ..Default::default()
        },
    )
    .await?;
    assert!(resp.data.expect("products").is_empty());
    assert_eq!(resp.pagination.expect("pagination").total, 0);

    // Out-of-range paging coerces to defaults.
    let resp = product_service::list_products(
        &state,
        ProductQuery {
            pagination: Pagination {
                page: Some("0".into()),
                per_page: Some("500".into()),
            },
            ..Default::default()
        },
    )
    .await?;
    let meta = resp.pagination.expect("pagination");
    assert_eq!(meta.page, 1);
    assert_eq!(meta.per_page, 20);
    assert_eq!(meta.total, 4);

    Ok(())
}

#[tokio::test]
async fn soft_deleted_products_disappear_from_reads() -> anyhow::Result<()> {
    let db = match setup_state().await? {
        Some(d) => d,
        None => return Ok(()),
    };
    let state = db.state.clone();
    let admin = create_user(&state, "admin", "admin@example.com").await?;

    let product = seed_product(&state, &admin, ProductSpec::new("Short Lived Saree", 2000.0)).await?;

    product_service::delete_product(&state, &admin, product.id).await?;

    let err = product_service::get_product_by_slug(&state, &product.slug)
        .await
        .expect_err("deleted product should 404");
    assert!(matches!(err, AppError::NotFound));

    let resp = product_service::list_products(&state, ProductQuery::default()).await?;
    assert!(resp.data.expect("products").is_empty());

    // A second delete of the same row is also a 404.
    let err = product_service::delete_product(&state, &admin, product.id)
        .await
        .expect_err("double delete should 404");
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

#[tokio::test]
async fn customer_cannot_use_admin_product_endpoints() -> anyhow::Result<()> {
    let db = match setup_state().await? {
        Some(d) => d,
        None => return Ok(()),
    };
    let state = db.state.clone();
    let customer = create_user(&state, "customer", "user@example.com").await?;

    let err = seed_product(&state, &customer, ProductSpec::new("Nope", 100.0))
        .await
        .expect_err("customer create should be forbidden");
    assert!(err.to_string().contains("Forbidden"));

    Ok(())
}
