//! Registration and login endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::{error::ApiError, extract::ApiJson},
    auth::{self, AuthError, IssuedToken},
    controller::AppState,
    repo::{ActivityAction, NewUser},
};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub username: String,
}

/// POST /api/v1/auth/register
pub async fn register(
    State(st): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))??;

    let user = st
        .repos
        .users
        .create(NewUser {
            username: req.username,
            email: req.email,
            password_hash,
        })
        .await?;
    st.repos
        .activity
        .record(user.id, ActivityAction::Register, None)
        .await?;
    info!(user_id = %user.id, username = %user.username, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisteredUser {
            id: user.id,
            username: user.username,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/v1/auth/login
pub async fn login(
    State(st): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<IssuedToken>, ApiError> {
    let user = st.repos.users.find_by_username(&req.username).await?;

    let password = req.password;
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let valid = tokio::task::spawn_blocking(move || auth::verify_login(&password, stored_hash.as_deref()))
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))??;
    let user = match user {
        Some(user) if valid => user,
        _ => {
            info!(username = %req.username, "login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let token = st.tokens.issue(user.id, &user.username)?;
    st.repos
        .activity
        .record(user.id, ActivityAction::Login, None)
        .await?;
    info!(user_id = %user.id, "login succeeded");

    Ok(Json(token))
}
