use crate::helpers::StringExt;
use crate::store::{ListingPage, MAX_KEYS, ObjectStore, ObjectVersionRef, PageCursor, StoreError};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use tracing::{debug, info};

/// Bucket and key prefix a run operates on. Fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PurgeTarget {
    pub bucket: String,
    prefix: Option<String>,
}

impl PurgeTarget {
    pub fn new<S: Into<String>>(
        bucket: S,
        prefix: Option<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            // an empty prefix matches everything, same as no prefix at all
            prefix: prefix.filter(|prefix| !prefix.is_empty()),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }
}

impl Display for PurgeTarget {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        let prefix = self.prefix.clone().unwrap_or_default().or("*");
        write!(f, "s3://{}/{}", self.bucket, prefix)
    }
}

/// Everything one listing page returned, versions first, then delete markers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionBatch {
    objects: Vec<ObjectVersionRef>,
}

impl DeletionBatch {
    pub fn objects(&self) -> &[ObjectVersionRef] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl From<ListingPage> for DeletionBatch {
    fn from(page: ListingPage) -> Self {
        let objects = page
            .versions
            .into_iter()
            .chain(page.delete_markers)
            .collect();

        Self { objects }
    }
}

impl Display for DeletionBatch {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        let json = serde_json::to_string_pretty(&self.objects).map_err(|_| std::fmt::Error)?;
        write!(f, "{json}")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Listing pages requested, including a final empty one.
    pub pages: usize,
    /// Delete requests issued.
    pub batches: usize,
    /// Versions and delete markers submitted for deletion.
    pub deleted: usize,
}

/// Both variants are terminal. Batches deleted before the failing page stay deleted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PurgeError {
    #[error("listing object versions failed on page {page}")]
    ListingFailed {
        page: usize,
        #[source]
        source: StoreError,
    },
    #[error("deleting the batch from page {page} failed")]
    DeleteFailed {
        page: usize,
        #[source]
        source: StoreError,
    },
}

impl PurgeError {
    pub const fn page(&self) -> usize {
        match self {
            Self::ListingFailed { page, .. } | Self::DeleteFailed { page, .. } => *page,
        }
    }
}

/// Deletes every version and delete marker under the target, one page at a time.
///
/// Each page is listed, printed, and deleted before the next one is requested.
/// The loop stops after the first page that is not truncated, or at the first failure.
pub async fn purge<S: ObjectStore>(
    store: &S,
    target: &PurgeTarget,
) -> Result<PurgeReport, PurgeError> {
    let mut report = PurgeReport::default();
    let mut cursor: Option<PageCursor> = None;

    loop {
        report.pages += 1;
        let page_number = report.pages;

        match &cursor {
            Some(cursor) => info!(page = page_number, %cursor, "listing object versions"),
            None => info!(page = page_number, "listing object versions"),
        }

        let page = store
            .list_versions(&target.bucket, target.prefix(), cursor.as_ref(), MAX_KEYS)
            .await
            .map_err(|source| PurgeError::ListingFailed {
                page: page_number,
                source,
            })?;

        let next = page
            .continuation()
            .map_err(|source| PurgeError::ListingFailed {
                page: page_number,
                source,
            })?;

        // a store handing back the cursor it was given would be listed forever
        if next.is_some() && next == cursor {
            return Err(PurgeError::ListingFailed {
                page: page_number,
                source: StoreError::new("listing cursor did not advance"),
            });
        }

        let batch = DeletionBatch::from(page);

        if batch.is_empty() {
            debug!(page = page_number, truncated = next.is_some(), "nothing to delete on this page");

            match next {
                Some(next) => {
                    cursor = Some(next);
                    continue;
                }
                None => break,
            }
        }

        println!("{batch}");

        info!(page = page_number, objects = batch.len(), "deleting batch");
        store
            .delete_versions(&target.bucket, batch.objects())
            .await
            .map_err(|source| PurgeError::DeleteFailed {
                page: page_number,
                source,
            })?;

        report.batches += 1;
        report.deleted += batch.len();

        match next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    info!(
        pages = report.pages,
        batches = report.batches,
        deleted = report.deleted,
        "purge finished"
    );

    Ok(report)
}
