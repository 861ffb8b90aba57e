use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    activity::log_activity,
    dto::auth::{AuthData, LoginRequest, RegisterRequest},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::UserPublic,
    response::ApiResponse,
    state::AppState,
    token,
};

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthData>> {
    payload.validate()?;

    let existing = Users::find_alive()
        .filter(UserCol::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&payload.password)?;

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(payload.email),
        password_hash: Set(password_hash),
        name: Set(payload.name),
        phone: Set(payload.phone),
        role: Set("customer".into()),
        email_verified: Set(false),
        is_active: Set(true),
        last_login: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&state.orm)
    .await?;

    let secret = token::secret_from_env()?;
    let jwt = token::issue(
        secret.as_bytes(),
        user.id,
        &user.email,
        &user.role,
        token::expiration_hours_from_env(),
    )?;

    if let Err(err) = log_activity(
        &state.pool,
        Some(user.id),
        "user_register",
        "user",
        Some(user.id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "activity log failed");
    }

    Ok(ApiResponse::success(
        "User registered successfully",
        AuthData {
            user: UserPublic::from_entity(user),
            token: jwt,
        },
        None,
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthData>> {
    payload.validate()?;

    let user = Users::find_alive()
        .filter(UserCol::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?;

    // Unknown email and wrong password must be indistinguishable.
    let user = match user {
        Some(u) => u,
        None => return Err(AppError::Unauthorized("Invalid credentials".into())),
    };

    if !verify_password(&user.password_hash, &payload.password)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    if !user.is_active {
        return Err(AppError::Forbidden);
    }

    let mut active: UserActive = user.into();
    active.last_login = Set(Some(Utc::now().into()));
    active.updated_at = Set(Utc::now().into());
    let user = active.update(&state.orm).await?;

    let secret = token::secret_from_env()?;
    let jwt = token::issue(
        secret.as_bytes(),
        user.id,
        &user.email,
        &user.role,
        token::expiration_hours_from_env(),
    )?;

    if let Err(err) = log_activity(
        &state.pool,
        Some(user.id),
        "user_login",
        "user",
        Some(user.id),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "activity log failed");
    }

    Ok(ApiResponse::success(
        "Login successful",
        AuthData {
            user: UserPublic::from_entity(user),
            token: jwt,
        },
        None,
    ))
}

pub async fn current_user(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserPublic>> {
    let found = Users::find_alive()
        .filter(UserCol::Id.eq(user.user_id))
        .one(&state.orm)
        .await?;
    let found = match found {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    Ok(ApiResponse::success(
        "OK",
        UserPublic::from_entity(found),
        None,
    ))
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    Ok(argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string())
}

fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrips() {
        let hash = hash_password("secret1").unwrap();
        assert!(verify_password(&hash, "secret1").unwrap());
        assert!(!verify_password(&hash, "secret2").unwrap());
    }
}
