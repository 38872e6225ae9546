use tracing::info;
use uuid::Uuid;

use super::{
    dto::{BannerInput, BannerPatch},
    repo_types::{Banner, BannerChanges, NewBanner},
};
use crate::{
    auth::gate::CurrentUser,
    error::AppError,
    media::services::{self as media, UploadItem},
    ordering::ensure_permutation,
    state::AppState,
    users::services::resolve_owner,
};

const MEDIA_FOLDER: &str = "banners";

pub async fn list(st: &AppState, owner_id: Option<Uuid>) -> Result<Vec<Banner>, AppError> {
    Ok(st.banners.list(owner_id).await?)
}

pub async fn get(st: &AppState, id: Uuid) -> Result<Banner, AppError> {
    st.banners
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Banner not found"))
}

pub async fn create(
    st: &AppState,
    actor: &CurrentUser,
    input: BannerInput,
    image: Option<UploadItem>,
) -> Result<Banner, AppError> {
    let owner_id = resolve_owner(st, actor, input.user_id).await?;
    let image = media::upload_opt(st, MEDIA_FOLDER, owner_id, image).await?;

    let created = st
        .banners
        .insert(NewBanner {
            owner_id,
            title: input.title,
            subtitle: input.subtitle,
            link_url: input.link_url,
            image: image.clone(),
        })
        .await
        .map_err(AppError::from);
    let banner = media::rollback_on_err(st, image.as_ref(), created).await?;

    info!(banner_id = %banner.id, %owner_id, "banner created");
    Ok(banner)
}

pub async fn update(
    st: &AppState,
    actor: &CurrentUser,
    id: Uuid,
    patch: BannerPatch,
    image: Option<UploadItem>,
) -> Result<Banner, AppError> {
    let existing = get(st, id).await?;
    actor.ensure_can_manage(existing.owner_id)?;

    let image = media::upload_opt(st, MEDIA_FOLDER, existing.owner_id, image).await?;
    let updated = st
        .banners
        .update(
            id,
            BannerChanges {
                title: patch.title,
                subtitle: patch.subtitle,
                link_url: patch.link_url,
                image: image.clone(),
            },
        )
        .await
        .map_err(AppError::from)
        .and_then(|b| b.ok_or_else(|| AppError::not_found("Banner not found")));
    let banner = media::rollback_on_err(st, image.as_ref(), updated).await?;

    if image.is_some() {
        media::discard_opt(st, existing.image.as_ref()).await;
    }
    info!(banner_id = %id, "banner updated");
    Ok(banner)
}

pub async fn delete(st: &AppState, actor: &CurrentUser, id: Uuid) -> Result<(), AppError> {
    let existing = get(st, id).await?;
    actor.ensure_can_manage(existing.owner_id)?;

    let removed = st
        .banners
        .delete(id)
        .await?
        .ok_or_else(|| AppError::not_found("Banner not found"))?;
    media::discard_opt(st, removed.image.as_ref()).await;
    info!(banner_id = %id, "banner deleted");
    Ok(())
}

/// Persists the caller's drag-and-drop order.
pub async fn reorder(st: &AppState, actor: &CurrentUser, ids: Vec<Uuid>) -> Result<Vec<Banner>, AppError> {
    let owner_id = actor.0.id;
    let current: Vec<Uuid> = st.banners.list(Some(owner_id)).await?.iter().map(|b| b.id).collect();
    ensure_permutation(&current, &ids)?;
    st.banners.reorder(owner_id, &ids).await?;
    Ok(st.banners.list(Some(owner_id)).await?)
}
