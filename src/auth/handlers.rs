use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest, StatusResponse, TokenResponse},
        jwt::JwtKeys,
        services,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<StatusResponse>), ApiError> {
    services::register(
        state.users.as_ref(),
        &state.config.password_pepper,
        payload,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(StatusResponse {
            status: "User created",
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let token = services::login(
        state.users.as_ref(),
        &keys,
        &state.config.password_pepper,
        payload,
    )
    .await?;
    Ok(Json(TokenResponse { token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_then_login_over_handlers() {
        let state = AppState::fake();
        let (status, Json(body)) = register(
            State(state.clone()),
            Json(RegisterRequest {
                first_name: Some("Grace".into()),
                last_name: Some("Hopper".into()),
                phone_number: Some("0611111111".into()),
                email: Some("grace@example.com".into()),
                password: Some("cobol-rules".into()),
            }),
        )
        .await
        .expect("register");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.status, "User created");

        let Json(token) = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "grace@example.com".into(),
                password: "cobol-rules".into(),
            }),
        )
        .await
        .expect("login");
        assert!(!token.token.is_empty());
    }

    #[tokio::test]
    async fn register_handler_returns_bad_request_on_violations() {
        let state = AppState::fake();
        let err = register(State(state), Json(RegisterRequest::default()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
