use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};

use crate::{
    dto::auth::{LoginRequest, LoginResponse},
    services::auth_service::check_credentials,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = LoginResponse)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> (StatusCode, Json<LoginResponse>) {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    if check_credentials(&state.admin, &payload) {
        (
            StatusCode::OK,
            Json(LoginResponse {
                success: true,
                message: "Login successful".into(),
            }),
        )
    } else {
        tracing::info!(username = %payload.username, "login rejected");
        (
            StatusCode::UNAUTHORIZED,
            Json(LoginResponse {
                success: false,
                message: "Invalid credentials".into(),
            }),
        )
    }
}
