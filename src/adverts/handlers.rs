use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    adverts::{
        dto::{AdvertPayload, AdvertView, CreatedResponse, MessageResponse, SearchParams},
        services,
    },
    auth::{jwt::AuthUser, services::current_user},
    error::ApiError,
    state::AppState,
};

pub fn advert_routes() -> Router<AppState> {
    Router::new()
        .route("/advert", get(list_adverts).post(create_advert))
        .route("/advert/search", get(search_adverts))
        .route(
            "/advert/:id",
            get(get_advert).patch(update_advert).delete(delete_advert),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_advert(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(payload): Json<AdvertPayload>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let user = current_user(state.users.as_ref(), caller).await?;
    let advert = services::create_advert(state.adverts.as_ref(), user.id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            status: "Advert created",
            id: advert.id,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_adverts(State(state): State<AppState>) -> Result<Json<Vec<AdvertView>>, ApiError> {
    let adverts = services::list_adverts(state.adverts.as_ref()).await?;
    Ok(Json(adverts.into_iter().map(AdvertView::user_group).collect()))
}

#[instrument(skip(state))]
pub async fn get_advert(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AdvertView>, ApiError> {
    let advert = services::get_advert(state.adverts.as_ref(), id).await?;
    Ok(Json(AdvertView::user_group(advert)))
}

#[instrument(skip(state))]
pub async fn search_adverts(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<AdvertView>>, ApiError> {
    let adverts = services::search_adverts(state.adverts.as_ref(), &params.into()).await?;
    Ok(Json(adverts.into_iter().map(AdvertView::user_group).collect()))
}

#[instrument(skip(state, payload))]
pub async fn update_advert(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<AdvertPayload>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::update_advert(state.adverts.as_ref(), id, user_id, payload).await?;
    Ok(Json(MessageResponse {
        message: "Advert updated successfully",
    }))
}

/// 204 carries no body, so the confirmation message is dropped.
#[instrument(skip(state))]
pub async fn delete_advert(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    services::delete_advert(state.adverts.as_ref(), id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
