use handloom_market_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::products::{CreateProductRequest, ProductImageInput},
    middleware::auth::AuthUser,
    models::Product,
    services::product_service,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

// Tests in one binary run on parallel threads but share the database; the
// setup handle holds this lock so they run one at a time.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

pub struct TestDb {
    pub state: AppState,
    _guard: MutexGuard<'static, ()>,
}

/// Connect, migrate and truncate. Returns None (and a notice) when no test
/// database is configured so the suite can be run without one.
#[allow(dead_code)]
pub async fn setup_state() -> anyhow::Result<Option<TestDb>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let guard = DB_LOCK.lock().await;

    let pool = create_pool(&database_url, 5).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE activity_logs, notifications, return_items, returns, tracking_events, \
         shipments, logistics_providers, coupon_usages, coupons, payments, order_status_history, \
         order_items, orders, wishlist_items, cart_items, reviews, product_categories, categories, \
         product_images, products, inventory, warehouses, vendors, addresses, users, regions, \
         districts, states, countries RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(Some(TestDb {
        state: AppState { pool, orm },
        _guard: guard,
    }))
}

#[allow(dead_code)]
pub async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<AuthUser> {
    let user = handloom_market_api::entity::users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        name: Set("Test User".into()),
        phone: Set(None),
        role: Set(role.into()),
        email_verified: Set(false),
        is_active: Set(true),
        last_login: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        email: user.email,
        role: user.role,
    })
}

#[allow(dead_code)]
pub struct ProductSpec<'a> {
    pub name: &'a str,
    pub base_price: f64,
    pub discount_percentage: f64,
    pub stock_quantity: i32,
    pub fabric: Option<&'a str>,
    pub state_origin: Option<&'a str>,
    pub images: Vec<ProductImageInput>,
}

#[allow(dead_code)]
impl<'a> ProductSpec<'a> {
    pub fn new(name: &'a str, base_price: f64) -> Self {
        Self {
            name,
            base_price,
            discount_percentage: 0.0,
            stock_quantity: 10,
            fabric: None,
            state_origin: None,
            images: Vec::new(),
        }
    }
}

#[allow(dead_code)]
pub async fn seed_product(
    state: &AppState,
    admin: &AuthUser,
    spec: ProductSpec<'_>,
) -> anyhow::Result<Product> {
    let resp = product_service::create_product(
        state,
        admin,
        CreateProductRequest {
            name: spec.name.into(),
            description: None,
            product_type: "SAREE".into(),
            region_id: None,
            vendor_id: None,
            state_origin: spec.state_origin.map(String::from),
            saree_type: None,
            base_price: spec.base_price,
            discount_percentage: spec.discount_percentage,
            fabric: spec.fabric.map(String::from),
            weave_type: None,
            occasion: None,
            stock_quantity: spec.stock_quantity,
            images: spec.images,
            metadata: None,
        },
    )
    .await?;
    Ok(resp.data.expect("created product"))
}
