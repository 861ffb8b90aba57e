mod common;

use common::setup_state;
use handloom_market_api::{
    dto::{
        admin::UpdateUserStatusRequest,
        auth::{LoginRequest, RegisterRequest},
    },
    error::AppError,
    middleware::auth::AuthUser,
    services::{admin_service, auth_service},
    token,
};

const TEST_SECRET: &str = "integration-test-secret";

fn set_jwt_env() {
    // SAFETY: tests run before any thread reads the environment concurrently.
    unsafe {
        std::env::set_var("JWT_SECRET", TEST_SECRET);
    }
}

#[tokio::test]
async fn register_then_login_roundtrips_claims() -> anyhow::Result<()> {
    set_jwt_env();
    let db = match setup_state().await? {
        Some(d) => d,
        None => return Ok(()),
    };
    let state = db.state.clone();

    let registered = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "a@b.com".into(),
            password: "secret1".into(),
            name: "A".into(),
            phone: None,
        },
    )
    .await?
    .data
    .expect("auth data");

    assert_eq!(registered.user.email, "a@b.com");
    assert_eq!(registered.user.role, "customer");
    assert!(!registered.token.is_empty());

    let claims = token::decode_claims(TEST_SECRET.as_bytes(), &registered.token)?;
    assert_eq!(claims.email, "a@b.com");
    assert_eq!(claims.role, "customer");
    assert_eq!(claims.sub, registered.user.id.to_string());

    let logged_in = auth_service::login_user(
        &state,
        LoginRequest {
            email: "a@b.com".into(),
            password: "secret1".into(),
        },
    )
    .await?
    .data
    .expect("auth data");

    let claims = token::decode_claims(TEST_SECRET.as_bytes(), &logged_in.token)?;
    assert_eq!(claims.email, "a@b.com");
    assert_eq!(claims.sub, registered.user.id.to_string());
    assert!(logged_in.user.last_login.is_some());

    Ok(())
}

#[tokio::test]
async fn wrong_password_and_unknown_email_are_indistinguishable() -> anyhow::Result<()> {
    set_jwt_env();
    let db = match setup_state().await? {
        Some(d) => d,
        None => return Ok(()),
    };
    let state = db.state.clone();

    auth_service::register_user(
        &state,
        RegisterRequest {
            email: "a@b.com".into(),
            password: "secret1".into(),
            name: "A".into(),
            phone: None,
        },
    )
    .await?;

    let wrong_password = auth_service::login_user(
        &state,
        LoginRequest {
            email: "a@b.com".into(),
            password: "not-it".into(),
        },
    )
    .await
    .expect_err("wrong password must fail");

    let unknown_email = auth_service::login_user(
        &state,
        LoginRequest {
            email: "nobody@b.com".into(),
            password: "secret1".into(),
        },
    )
    .await
    .expect_err("unknown email must fail");

    assert!(matches!(wrong_password, AppError::Unauthorized(_)));
    assert!(matches!(unknown_email, AppError::Unauthorized(_)));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());

    Ok(())
}

#[tokio::test]
async fn duplicate_email_conflicts_and_inactive_account_is_forbidden() -> anyhow::Result<()> {
    set_jwt_env();
    let db = match setup_state().await? {
        Some(d) => d,
        None => return Ok(()),
    };
    let state = db.state.clone();

    let registered = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "a@b.com".into(),
            password: "secret1".into(),
            name: "A".into(),
            phone: None,
        },
    )
    .await?
    .data
    .expect("auth data");

    let err = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "a@b.com".into(),
            password: "secret2".into(),
            name: "B".into(),
            phone: None,
        },
    )
    .await
    .expect_err("duplicate email must conflict");
    assert!(matches!(err, AppError::Conflict(_)));

    // Deactivate via the admin path, then login is rejected after verification.
    let admin = common::create_user(&state, "admin", "admin@example.com").await?;
    admin_service::update_user_status(
        &state,
        &admin,
        registered.user.id,
        UpdateUserStatusRequest {
            is_active: Some(false),
            email_verified: None,
            role: None,
        },
    )
    .await?;

    let err = auth_service::login_user(
        &state,
        LoginRequest {
            email: "a@b.com".into(),
            password: "secret1".into(),
        },
    )
    .await
    .expect_err("inactive account must be forbidden");
    assert!(matches!(err, AppError::Forbidden));

    Ok(())
}

#[tokio::test]
async fn me_returns_the_token_owner() -> anyhow::Result<()> {
    set_jwt_env();
    let db = match setup_state().await? {
        Some(d) => d,
        None => return Ok(()),
    };
    let state = db.state.clone();

    let registered = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "me@b.com".into(),
            password: "secret1".into(),
            name: "Me".into(),
            phone: Some("+919876543210".into()),
        },
    )
    .await?
    .data
    .expect("auth data");

    let auth_user = AuthUser {
        user_id: registered.user.id,
        email: registered.user.email.clone(),
        role: registered.user.role.clone(),
    };
    let me = auth_service::current_user(&state, &auth_user)
        .await?
        .data
        .expect("user");
    assert_eq!(me.id, registered.user.id);
    assert_eq!(me.phone.as_deref(), Some("+919876543210"));

    Ok(())
}
