use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    adverts::{
        dto::AdvertPayload,
        repo::AdvertRepo,
        repo_types::{Advert, AdvertFilter},
    },
    error::ApiError,
};

fn not_found() -> ApiError {
    ApiError::NotFound("Advert not found".into())
}

/// Loads an advert and checks that `caller` owns it.
async fn find_owned(repo: &dyn AdvertRepo, id: i64, caller: Uuid) -> Result<Advert, ApiError> {
    let advert = repo.find(id).await?.ok_or_else(not_found)?;
    if !advert.is_owned_by(caller) {
        warn!(advert_id = id, caller = %caller, owner = %advert.owner.id, "not the advert owner");
        return Err(ApiError::Forbidden(
            "Access denied, this advert is not yours".into(),
        ));
    }
    Ok(advert)
}

pub async fn create_advert(
    repo: &dyn AdvertRepo,
    caller: Uuid,
    payload: AdvertPayload,
) -> Result<Advert, ApiError> {
    let fields = payload.validate()?;
    let advert = repo.insert(caller, &fields).await?;
    info!(advert_id = advert.id, owner = %caller, "advert created");
    Ok(advert)
}

pub async fn get_advert(repo: &dyn AdvertRepo, id: i64) -> Result<Advert, ApiError> {
    repo.find(id).await?.ok_or_else(not_found)
}

pub async fn list_adverts(repo: &dyn AdvertRepo) -> Result<Vec<Advert>, ApiError> {
    Ok(repo.list().await?)
}

pub async fn search_adverts(
    repo: &dyn AdvertRepo,
    filter: &AdvertFilter,
) -> Result<Vec<Advert>, ApiError> {
    Ok(repo.search(filter).await?)
}

/// Overlays the present fields of `patch`, re-validates the result and saves it.
pub async fn update_advert(
    repo: &dyn AdvertRepo,
    id: i64,
    caller: Uuid,
    patch: AdvertPayload,
) -> Result<Advert, ApiError> {
    let current = find_owned(repo, id, caller).await?;
    let fields = AdvertPayload::from(&current.fields).overlay(patch).validate()?;
    let advert = repo.update(id, &fields).await?.ok_or_else(not_found)?;
    info!(advert_id = id, "advert updated");
    Ok(advert)
}

pub async fn delete_advert(repo: &dyn AdvertRepo, id: i64, caller: Uuid) -> Result<(), ApiError> {
    find_owned(repo, id, caller).await?;
    if !repo.delete(id).await? {
        return Err(not_found());
    }
    info!(advert_id = id, "advert deleted");
    Ok(())
}
