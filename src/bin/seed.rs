use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use handloom_market_api::{config::AppConfig, db::create_pool, services::product_service, slug};
use uuid::Uuid;

// Static reference data: the location hierarchy first, since states point at
// their country and regions point at states.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let india = ensure_country(&pool, "India", "IN", "+91", "INR").await?;

    let states = [
        ("Uttar Pradesh", "UP"),
        ("Kerala", "KL"),
        ("Tamil Nadu", "TN"),
        ("Karnataka", "KA"),
        ("West Bengal", "WB"),
        ("Bihar", "BR"),
    ];
    let mut state_ids = std::collections::HashMap::new();
    for (name, code) in states {
        let id = ensure_state(&pool, india, name, code).await?;
        state_ids.insert(code, id);
    }

    let regions = [
        ("Lucknow", "lucknow", "UP", "Chikankari embroidery"),
        ("Kanchipuram", "kanchipuram", "TN", "Kanchipuram silk sarees"),
        ("Kerala", "kerala", "KL", "Kasavu sarees"),
        ("Varanasi", "varanasi", "UP", "Banarasi silk sarees"),
        ("Madhubani", "madhubani", "BR", "Madhubani print sarees"),
    ];
    for (name, slug, state_code, famous_for) in regions {
        ensure_region(&pool, name, slug, state_ids.get(state_code).copied(), famous_for).await?;
    }

    let admin_id = ensure_user(&pool, "admin@example.com", "admin123", "Admin", "admin").await?;
    let user_id = ensure_user(&pool, "user@example.com", "user123", "Customer", "customer").await?;
    seed_products(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_country(
    pool: &sqlx::PgPool,
    name: &str,
    code: &str,
    phone_code: &str,
    currency: &str,
) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM countries WHERE code = $1")
        .bind(code)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO countries (id, name, code, phone_code, currency)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(code)
    .bind(phone_code)
    .bind(currency)
    .fetch_one(pool)
    .await?;
    println!("Seeded country {name}");
    Ok(id)
}

async fn ensure_state(
    pool: &sqlx::PgPool,
    country_id: Uuid,
    name: &str,
    code: &str,
) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM states WHERE country_id = $1 AND code = $2")
            .bind(country_id)
            .bind(code)
            .fetch_optional(pool)
            .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO states (id, country_id, name, code) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(country_id)
    .bind(name)
    .bind(code)
    .fetch_one(pool)
    .await?;
    println!("Seeded state {name}");
    Ok(id)
}

async fn ensure_region(
    pool: &sqlx::PgPool,
    name: &str,
    slug: &str,
    state_id: Option<Uuid>,
    famous_for: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO regions (id, name, slug, state_id, famous_for)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (slug) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(slug)
    .bind(state_id)
    .bind(famous_for)
    .execute(pool)
    .await?;
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    name: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, name, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products = [
        (
            "Lucknow White Chikankari Cotton Saree",
            "SAREE",
            "UP",
            "Chikankari",
            "Cotton",
            4999.0,
            20.0,
            50,
        ),
        (
            "Kerala Kasavu Saree with Gold Border",
            "SAREE",
            "KL",
            "Kasavu",
            "Cotton",
            3499.0,
            0.0,
            30,
        ),
        (
            "Kanchipuram Pure Silk Bridal Saree",
            "SAREE",
            "TN",
            "Kanchipuram",
            "Silk",
            15999.0,
            10.0,
            12,
        ),
        (
            "Chikankari Kurti in Pastel Green",
            "CHIKANKARI_KURTI",
            "UP",
            "Chikankari",
            "Georgette",
            1899.0,
            15.0,
            80,
        ),
    ];

    for (name, product_type, state, saree_type, fabric, base_price, discount, stock) in products {
        let slug = slug::generate(name);
        let final_price = product_service::compute_final_price(base_price, discount);
        sqlx::query(
            r#"
            INSERT INTO products
                (id, name, slug, product_type, state_origin, saree_type, fabric,
                 base_price, discount_percentage, final_price, stock_quantity)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .bind(product_type)
        .bind(state)
        .bind(saree_type)
        .bind(fabric)
        .bind(base_price)
        .bind(discount)
        .bind(final_price)
        .bind(stock)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
