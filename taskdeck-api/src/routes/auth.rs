/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - create an account, returns a token pair
/// - `POST /v1/auth/login` - authenticate, returns a token pair
/// - `POST /v1/auth/refresh` - exchange a refresh token for a new access token
/// - `GET  /v1/auth/me` - profile of the authenticated user

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::{jwt, password, CurrentUser},
    models::user::{CreateUser, User},
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 50, message = "Username must be 1-50 characters"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password; also checked against the strength policy
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Register / login response: a token pair
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub success: bool,
    pub message: String,

    /// Access token (24 h)
    pub token: String,

    /// Refresh token (30 d)
    pub refresh_token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Refresh request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,

    /// New access token (24 h)
    pub token: String,
}

/// Profile response
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: User,
}

fn token_pair(user: &User, secret: &str) -> Result<(String, String), ApiError> {
    let access = jwt::Claims::new(user.id, user.email.clone(), jwt::TokenType::Access);
    let refresh = jwt::Claims::new(user.id, user.email.clone(), jwt::TokenType::Refresh);

    Ok((
        jwt::create_token(&access, secret)?,
        jwt::create_token(&refresh, secret)?,
    ))
}

/// Registers a new user
///
/// # Errors
///
/// - `409 Conflict`: email already registered
/// - `422 Unprocessable Entity`: validation or password policy failure
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<TokenPairResponse>)> {
    req.validate()?;

    password::validate_password_strength(&req.password).map_err(|message| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message,
        }])
    })?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "user registered");

    let (token, refresh_token) = token_pair(&user, state.jwt_secret())?;

    Ok((
        StatusCode::CREATED,
        Json(TokenPairResponse {
            success: true,
            message: "User registered successfully".to_string(),
            token,
            refresh_token,
        }),
    ))
}

/// Authenticates a user
///
/// Unknown email and wrong password return the same 401 so the endpoint
/// does not leak which emails are registered.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    tracing::info!(user_id = %user.id, "user logged in");

    let (token, refresh_token) = token_pair(&user, state.jwt_secret())?;

    Ok(Json(TokenPairResponse {
        success: true,
        message: "User logged in successfully".to_string(),
        token,
        refresh_token,
    }))
}

/// Exchanges a refresh token for a new access token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse {
        success: true,
        token,
    }))
}

/// Returns the authenticated user's profile
///
/// The password hash is excluded by the model's serialization.
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<CurrentUser>,
) -> ApiResult<Json<MeResponse>> {
    let user = User::find_by_id(&state.db, auth.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(MeResponse {
        success: true,
        user,
    }))
}
