use anyhow::Context;
use bytes::Bytes;
use tracing::{debug, warn};
use uuid::Uuid;

use super::StoredMedia;
use crate::{error::AppError, state::AppState};

pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
}

pub(crate) fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Uploads one image under `<folder>/<owner>/<uuid>.<ext>`.
pub async fn upload(
    st: &AppState,
    folder: &str,
    owner_id: Uuid,
    item: UploadItem,
) -> Result<StoredMedia, AppError> {
    if item.body.is_empty() {
        return Err(AppError::validation("Image file is empty"));
    }
    let ext = ext_from_mime(&item.content_type).ok_or_else(|| {
        AppError::validation(format!("Unsupported image type {}", item.content_type))
    })?;
    let key = format!("{}/{}/{}.{}", folder, owner_id, Uuid::new_v4(), ext);
    st.storage
        .put_object(&key, item.body, &item.content_type)
        .await
        .with_context(|| format!("put_object {}", key))
        .map_err(AppError::Upstream)?;
    debug!(%key, "media uploaded");
    Ok(StoredMedia {
        url: st.storage.public_url(&key),
        key,
    })
}

pub async fn upload_opt(
    st: &AppState,
    folder: &str,
    owner_id: Uuid,
    item: Option<UploadItem>,
) -> Result<Option<StoredMedia>, AppError> {
    match item {
        Some(item) => upload(st, folder, owner_id, item).await.map(Some),
        None => Ok(None),
    }
}

/// Best-effort delete; a failure only leaves an orphaned object behind.
pub async fn discard(st: &AppState, media: &StoredMedia) {
    if let Err(e) = st.storage.delete_object(&media.key).await {
        warn!(error = %e, key = %media.key, "failed to delete media; leaving orphan");
    }
}

pub async fn discard_opt(st: &AppState, media: Option<&StoredMedia>) {
    if let Some(m) = media {
        discard(st, m).await;
    }
}

/// Compensation step for upload-then-write: when the write failed, the object
/// that was uploaded for it is deleted again.
pub async fn rollback_on_err<T, E>(
    st: &AppState,
    uploaded: Option<&StoredMedia>,
    res: Result<T, E>,
) -> Result<T, E> {
    if res.is_err() {
        if let Some(m) = uploaded {
            warn!(key = %m.key, "record write failed; removing uploaded media");
            discard(st, m).await;
        }
    }
    res
}
