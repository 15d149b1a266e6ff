//! Object key generation for direct uploads.

use uuid::Uuid;

use visum_core::error::AppError;
use visum_core::result::AppResult;

/// Build a globally unique key for a client-chosen file name:
/// `<prefix><uuid>_<key_name>`.
///
/// Path separators in `key_name` are replaced so the object always lands
/// directly under `prefix`.
pub fn upload_key(prefix: &str, key_name: &str) -> AppResult<String> {
    let name = key_name.trim();
    if name.is_empty() {
        return Err(AppError::validation("keyName must not be empty"));
    }
    let name = name.replace(['/', '\\'], "_");
    Ok(format!("{prefix}{}_{name}", Uuid::new_v4()))
}
