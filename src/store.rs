use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Hard ceiling on entries per listing request imposed by the S3 API.
pub const MAX_KEYS: i32 = 1000;

/// One addressable, deletable unit: an object version or a delete marker.
///
/// Serializes as `{"Key": ..., "VersionId": ...}`, the shape S3 uses in its own payloads.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectVersionRef {
    pub key: String,
    pub version_id: String,
}

impl ObjectVersionRef {
    pub fn new<K: Into<String>, V: Into<String>>(
        key: K,
        version_id: V,
    ) -> Self {
        Self {
            key: key.into(),
            version_id: version_id.into(),
        }
    }
}

/// Where the next listing page resumes. `None` in the loop means "first page".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageCursor {
    pub key_marker: String,
    pub version_id_marker: Option<String>,
}

impl Display for PageCursor {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        match &self.version_id_marker {
            Some(version_id) => write!(f, "{}@{}", self.key_marker, version_id),
            None => write!(f, "{}", self.key_marker),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub versions: Vec<ObjectVersionRef>,
    pub delete_markers: Vec<ObjectVersionRef>,
    pub is_truncated: bool,
    pub next_key_marker: Option<String>,
    pub next_version_id_marker: Option<String>,
}

impl ListingPage {
    pub fn len(&self) -> usize {
        self.versions.len() + self.delete_markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cursor for the following page, `None` when this page is the last one.
    ///
    /// A truncated page without a next key marker cannot be continued from.
    pub fn continuation(&self) -> Result<Option<PageCursor>, StoreError> {
        if !self.is_truncated {
            return Ok(None);
        }

        let Some(key_marker) = &self.next_key_marker else {
            return Err(StoreError::new(
                "listing was truncated but returned no next key marker",
            ));
        };

        Ok(Some(PageCursor {
            key_marker: key_marker.clone(),
            version_id_marker: self.next_version_id_marker.clone(),
        }))
    }
}

/// Failure reported by the object store, carrying the client's message verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A version-aware object store, as far as purging needs one.
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    async fn list_versions(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        cursor: Option<&PageCursor>,
        max_keys: i32,
    ) -> Result<ListingPage, StoreError>;

    /// Deletes every reference in one request, without per-object success reporting.
    async fn delete_versions(
        &self,
        bucket: &str,
        objects: &[ObjectVersionRef],
    ) -> Result<(), StoreError>;
}
