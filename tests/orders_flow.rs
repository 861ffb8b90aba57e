mod common;

use common::{ProductSpec, create_user, seed_product, setup_state};
use handloom_market_api::{
    dto::{
        admin::UpdateOrderStatusRequest,
        cart::AddToCartRequest,
        orders::CreateOrderRequest,
    },
    entity::products::Entity as Products,
    error::AppError,
    routes::params::{OrderListQuery, Pagination},
    services::{admin_service, cart_service, order_service},
};
use sea_orm::EntityTrait;

// Cart upsert -> order from cart -> guarded admin status updates -> cancel restocks.
#[tokio::test]
async fn cart_checkout_and_status_flow() -> anyhow::Result<()> {
    let db = match setup_state().await? {
        Some(d) => d,
        None => return Ok(()),
    };
    let state = db.state.clone();
    let admin = create_user(&state, "admin", "admin@example.com").await?;
    let customer = create_user(&state, "customer", "user@example.com").await?;

    let mut spec = ProductSpec::new("Banarasi Silk Saree", 5000.0);
    spec.discount_percentage = 10.0;
    spec.stock_quantity = 10;
    let product = seed_product(&state, &admin, spec).await?;
    assert_eq!(product.final_price, 4500.0);

    // Adding the same product twice keeps one row with the latest quantity.
    cart_service::add_to_cart(
        &state,
        &customer,
        AddToCartRequest {
            product_id: product.id,
            quantity: 2,
        },
    )
    .await?;
    cart_service::add_to_cart(
        &state,
        &customer,
        AddToCartRequest {
            product_id: product.id,
            quantity: 3,
        },
    )
    .await?;
    let cart = cart_service::list_cart(&state, &customer, Pagination::default())
        .await?
        .data
        .expect("cart");
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].quantity, 3);

    let order = order_service::create_order(
        &state,
        &customer,
        CreateOrderRequest {
            shipping_address: serde_json::json!({ "line1": "1 Weaver Lane", "pin": "680001" }),
            billing_address: None,
            payment_method: Some("cod".into()),
            customer_notes: None,
        },
    )
    .await?
    .data
    .expect("order");

    assert_eq!(order.order.subtotal_amount, 4500.0 * 3.0);
    assert_eq!(order.order.total_amount, 4500.0 * 3.0);
    assert_eq!(order.order.status, "pending");
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].product_name, "Banarasi Silk Saree");
    assert_eq!(order.items[0].unit_price, 4500.0);

    // Stock decremented under the transaction; cart cleared.
    let stocked = Products::find_by_id(product.id)
        .one(&state.orm)
        .await?
        .expect("product row");
    assert_eq!(stocked.stock_quantity, 7);
    let cart = cart_service::list_cart(&state, &customer, Pagination::default())
        .await?
        .data
        .expect("cart");
    assert!(cart.is_empty());

    // Forward transitions pass, jumps and backward moves do not.
    let order_id = order.order.id;
    for status in ["confirmed", "processing", "shipped", "delivered"] {
        let updated = admin_service::update_order_status(
            &state,
            &admin,
            order_id,
            UpdateOrderStatusRequest {
                status: status.into(),
                notes: None,
            },
        )
        .await?
        .data
        .expect("order");
        assert_eq!(updated.status, status);
    }

    let err = admin_service::update_order_status(
        &state,
        &admin,
        order_id,
        UpdateOrderStatusRequest {
            status: "pending".into(),
            notes: None,
        },
    )
    .await
    .expect_err("delivered -> pending must be rejected");
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = admin_service::update_order_status(
        &state,
        &admin,
        order_id,
        UpdateOrderStatusRequest {
            status: "paid".into(),
            notes: None,
        },
    )
    .await
    .expect_err("unknown status must be rejected");
    assert!(matches!(err, AppError::BadRequest(_)));

    // Status history recorded each hop, order detail shows it in order.
    let detail = order_service::get_order(&state, &customer, order_id)
        .await?
        .data
        .expect("detail");
    let statuses: Vec<&str> = detail
        .status_history
        .iter()
        .map(|h| h.status.as_str())
        .collect();
    assert_eq!(
        statuses,
        vec!["pending", "confirmed", "processing", "shipped", "delivered"]
    );

    Ok(())
}

#[tokio::test]
async fn cancelling_a_pending_order_restores_stock() -> anyhow::Result<()> {
    let db = match setup_state().await? {
        Some(d) => d,
        None => return Ok(()),
    };
    let state = db.state.clone();
    let admin = create_user(&state, "admin", "admin@example.com").await?;
    let customer = create_user(&state, "customer", "user@example.com").await?;

    let mut spec = ProductSpec::new("Kota Doria Saree", 2200.0);
    spec.stock_quantity = 5;
    let product = seed_product(&state, &admin, spec).await?;

    cart_service::add_to_cart(
        &state,
        &customer,
        AddToCartRequest {
            product_id: product.id,
            quantity: 2,
        },
    )
    .await?;
    let order = order_service::create_order(
        &state,
        &customer,
        CreateOrderRequest {
            shipping_address: serde_json::json!({ "line1": "1 Weaver Lane" }),
            billing_address: None,
            payment_method: None,
            customer_notes: None,
        },
    )
    .await?
    .data
    .expect("order");

    let cancelled = order_service::cancel_order(&state, &customer, order.order.id)
        .await?
        .data
        .expect("order");
    assert_eq!(cancelled.status, "cancelled");

    let stocked = Products::find_by_id(product.id)
        .one(&state.orm)
        .await?
        .expect("product row");
    assert_eq!(stocked.stock_quantity, 5);

    // A cancelled order is terminal for the customer too.
    let err = order_service::cancel_order(&state, &customer, order.order.id)
        .await
        .expect_err("cancelling twice must fail");
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn checkout_rejects_empty_cart_and_insufficient_stock() -> anyhow::Result<()> {
    let db = match setup_state().await? {
        Some(d) => d,
        None => return Ok(()),
    };
    let state = db.state.clone();
    let admin = create_user(&state, "admin", "admin@example.com").await?;
    let customer = create_user(&state, "customer", "user@example.com").await?;

    let err = order_service::create_order(
        &state,
        &customer,
        CreateOrderRequest {
            shipping_address: serde_json::json!({ "line1": "1 Weaver Lane" }),
            billing_address: None,
            payment_method: None,
            customer_notes: None,
        },
    )
    .await
    .expect_err("empty cart must fail");
    assert!(matches!(err, AppError::BadRequest(_)));

    let mut spec = ProductSpec::new("Low Stock Saree", 1500.0);
    spec.stock_quantity = 1;
    let product = seed_product(&state, &admin, spec).await?;

    cart_service::add_to_cart(
        &state,
        &customer,
        AddToCartRequest {
            product_id: product.id,
            quantity: 2,
        },
    )
    .await?;
    let err = order_service::create_order(
        &state,
        &customer,
        CreateOrderRequest {
            shipping_address: serde_json::json!({ "line1": "1 Weaver Lane" }),
            billing_address: None,
            payment_method: None,
            customer_notes: None,
        },
    )
    .await
    .expect_err("over-stock quantity must fail");
    assert!(matches!(err, AppError::BadRequest(_)));

    // The failed checkout must not have touched stock or the cart.
    let stocked = Products::find_by_id(product.id)
        .one(&state.orm)
        .await?
        .expect("product row");
    assert_eq!(stocked.stock_quantity, 1);

    Ok(())
}

#[tokio::test]
async fn order_listings_are_scoped_and_filterable() -> anyhow::Result<()> {
    let db = match setup_state().await? {
        Some(d) => d,
        None => return Ok(()),
    };
    let state = db.state.clone();
    let admin = create_user(&state, "admin", "admin@example.com").await?;
    let customer = create_user(&state, "customer", "user@example.com").await?;
    let other = create_user(&state, "customer", "other@example.com").await?;

    let product = seed_product(&state, &admin, ProductSpec::new("Tant Saree", 1200.0)).await?;
    cart_service::add_to_cart(
        &state,
        &customer,
        AddToCartRequest {
            product_id: product.id,
            quantity: 1,
        },
    )
    .await?;
    order_service::create_order(
        &state,
        &customer,
        CreateOrderRequest {
            shipping_address: serde_json::json!({ "line1": "1 Weaver Lane" }),
            billing_address: None,
            payment_method: None,
            customer_notes: None,
        },
    )
    .await?;

    let own = order_service::list_orders(&state, &customer, OrderListQuery::default())
        .await?
        .data
        .expect("orders");
    assert_eq!(own.len(), 1);

    let others = order_service::list_orders(&state, &other, OrderListQuery::default())
        .await?
        .data
        .expect("orders");
    assert!(others.is_empty());

    let filtered = admin_service::list_all_orders(
        &state,
        &admin,
        OrderListQuery {
            status: Some("cancelled".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("orders");
    assert!(filtered.is_empty());

    let all = admin_service::list_all_orders(&state, &admin, OrderListQuery::default())
        .await?
        .data
        .expect("orders");
    assert_eq!(all.len(), 1);

    Ok(())
}
