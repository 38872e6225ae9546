//! Shared pieces of the owner-scoped, user-ordered collections (banners, testimonials, faculty).

use std::collections::HashSet;

use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;

/// `?userId=` filter on public list endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerFilter {
    pub user_id: Option<Uuid>,
}

/// New display order coming from the dashboard's drag-and-drop list.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub ids: Vec<Uuid>,
}

/// The requested order must name each of the owner's records exactly once.
pub fn ensure_permutation(current: &[Uuid], requested: &[Uuid]) -> Result<(), AppError> {
    let have: HashSet<&Uuid> = current.iter().collect();
    let want: HashSet<&Uuid> = requested.iter().collect();
    if want.len() != requested.len() {
        return Err(AppError::validation("Order contains duplicate ids"));
    }
    if have != want {
        return Err(AppError::validation(
            "Order must list every one of your records exactly once",
        ));
    }
    Ok(())
}
