use axum::extract::State;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use cookie::{Cookie, SameSite};
use rulehub_core::error_builder;
use rulehub_core::problemdetails::Problem;
use rulehub_core::ValidatedJson;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

use super::types::{LoginRequest, RegisterRequest, RegisterResponse, TokenResponse};
use crate::error::AuthError;
use crate::services::TokenPair;
use crate::AuthState;

pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

#[derive(OpenApi)]
#[openapi(
    paths(register, login, refresh),
    components(schemas(RegisterRequest, RegisterResponse, LoginRequest, TokenResponse)),
    tags((name = "Authentication", description = "Registration, login and token refresh"))
)]
pub struct AuthApiDoc;

pub fn configure_routes() -> Router<Arc<AuthState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = RegisterResponse),
        (status = 400, description = "Invalid username or password"),
        (status = 409, description = "Username already taken")
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<Arc<AuthState>>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, Problem> {
    let user = state
        .user_service
        .register(&request.username, &request.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            username: user.username,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token issued; refresh token set as cookie", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<Arc<AuthState>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, Problem> {
    let user = state
        .user_service
        .authenticate(&request.username, &request.password)
        .await?;

    let pair = state.token_service.issue_pair(user.id, &user.username)?;
    info!("User {} logged in", user.id);

    token_response(&state, pair)
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New access token; refresh cookie rotated", body = TokenResponse),
        (status = 401, description = "Missing, invalid or expired refresh token")
    ),
    tag = "Authentication"
)]
pub async fn refresh(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, Problem> {
    let token = refresh_cookie(&headers).ok_or_else(|| {
        error_builder::unauthorized()
            .detail("Refresh token cookie is missing")
            .build()
    })?;

    let claims = state.token_service.verify_refresh_token(&token)?;
    let user = state
        .user_service
        .find_active(claims.user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let pair = state.token_service.issue_pair(user.id, &user.username)?;
    token_response(&state, pair)
}

fn token_response(
    state: &AuthState,
    pair: TokenPair,
) -> Result<(HeaderMap, Json<TokenResponse>), Problem> {
    let cookie = Cookie::build((REFRESH_COOKIE_NAME, pair.refresh_token))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Strict)
        .secure(state.secure_cookies)
        .max_age(cookie::time::Duration::seconds(
            state.token_service.refresh_ttl().as_secs() as i64,
        ))
        .build();

    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| AuthError::TokenSigning(e.to_string()))?;
    headers.insert(SET_COOKIE, value);

    Ok((
        headers,
        Json(TokenResponse {
            access_token: pair.access_token,
            token_type: "Bearer".to_string(),
            expires_in: state.token_service.access_ttl().as_secs(),
        }),
    ))
}

fn refresh_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value).filter_map(Result::ok))
        .find(|cookie| cookie.name() == REFRESH_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_cookie_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; refresh_token=abc.def.ghi"),
        );
        assert_eq!(refresh_cookie(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_refresh_cookie_missing() {
        let mut headers = HeaderMap::new();
        assert_eq!(refresh_cookie(&headers), None);
        headers.insert(COOKIE, HeaderValue::from_static("refresh_token="));
        assert_eq!(refresh_cookie(&headers), None);
    }
}
