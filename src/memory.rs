//! In-memory versioned store for exercising the purge loop without a network.

use crate::store::{ListingPage, ObjectStore, ObjectVersionRef, PageCursor, StoreError};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Version,
    DeleteMarker,
}

#[derive(Debug)]
struct Inner {
    // ordered the way S3 orders a version listing: key, then version id
    entries: BTreeMap<(String, String), EntryKind>,
    next_version: u64,
    page_limit: usize,
    empty_truncated_first_page: bool,
    fail_listing_on: Option<usize>,
    fail_delete_on: Option<usize>,
    list_calls: Vec<Option<PageCursor>>,
    delete_attempts: usize,
    delete_calls: Vec<Vec<ObjectVersionRef>>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_version: 1,
            page_limit: usize::MAX,
            empty_truncated_first_page: false,
            fail_listing_on: None,
            fail_delete_on: None,
            list_calls: Vec::new(),
            delete_attempts: 0,
            delete_calls: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store lock poisoned")
    }

    /// Returns at most `limit` entries per page, even when more are requested.
    pub fn with_page_limit(
        self,
        limit: usize,
    ) -> Self {
        self.lock().page_limit = limit;
        self
    }

    /// Makes the first listing call return no entries but claim to be truncated.
    pub fn with_empty_truncated_first_page(self) -> Self {
        self.lock().empty_truncated_first_page = true;
        self
    }

    /// Fails the `call`-th listing request (1-based).
    pub fn fail_listing_on(
        self,
        call: usize,
    ) -> Self {
        self.lock().fail_listing_on = Some(call);
        self
    }

    /// Fails the `call`-th delete request (1-based) without removing anything.
    pub fn fail_delete_on(
        self,
        call: usize,
    ) -> Self {
        self.lock().fail_delete_on = Some(call);
        self
    }

    fn insert(
        &self,
        key: &str,
        kind: EntryKind,
    ) -> ObjectVersionRef {
        let mut inner = self.lock();
        let version_id = format!("v{:010}", inner.next_version);
        inner.next_version += 1;
        inner
            .entries
            .insert((key.to_owned(), version_id.clone()), kind);

        ObjectVersionRef::new(key, version_id)
    }

    pub fn put_version(
        &self,
        key: &str,
    ) -> ObjectVersionRef {
        self.insert(key, EntryKind::Version)
    }

    pub fn put_delete_marker(
        &self,
        key: &str,
    ) -> ObjectVersionRef {
        self.insert(key, EntryKind::DeleteMarker)
    }

    pub fn count_under(
        &self,
        prefix: &str,
    ) -> usize {
        self.lock()
            .entries
            .keys()
            .filter(|(key, _)| key.starts_with(prefix))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Cursor passed to every listing request, in call order.
    pub fn list_calls(&self) -> Vec<Option<PageCursor>> {
        self.lock().list_calls.clone()
    }

    /// Every batch that was actually applied, in call order.
    pub fn delete_calls(&self) -> Vec<Vec<ObjectVersionRef>> {
        self.lock().delete_calls.clone()
    }
}

fn is_after(
    cursor: Option<&PageCursor>,
    key: &str,
    version_id: &str,
) -> bool {
    let Some(cursor) = cursor else {
        return true;
    };

    match &cursor.version_id_marker {
        Some(marker) if key == cursor.key_marker => version_id > marker.as_str(),
        _ => key > cursor.key_marker.as_str(),
    }
}

impl ObjectStore for MemoryStore {
    async fn list_versions(
        &self,
        _bucket: &str,
        prefix: Option<&str>,
        cursor: Option<&PageCursor>,
        max_keys: i32,
    ) -> Result<ListingPage, StoreError> {
        let mut inner = self.lock();
        inner.list_calls.push(cursor.cloned());
        let call = inner.list_calls.len();

        if inner.fail_listing_on == Some(call) {
            return Err(StoreError::new(format!("injected listing failure (call {call})")));
        }

        if call == 1 && inner.empty_truncated_first_page {
            return Ok(ListingPage {
                is_truncated: true,
                next_key_marker: Some(String::new()),
                ..ListingPage::default()
            });
        }

        let limit = usize::try_from(max_keys)
            .unwrap_or_default()
            .min(inner.page_limit);
        let prefix = prefix.unwrap_or_default();

        let mut matching = inner
            .entries
            .iter()
            .filter(|((key, version_id), _)| {
                key.starts_with(prefix) && is_after(cursor, key, version_id)
            });

        let taken: Vec<_> = matching.by_ref().take(limit).collect();
        let is_truncated = matching.next().is_some();

        let mut page = ListingPage {
            is_truncated,
            ..ListingPage::default()
        };

        for ((key, version_id), kind) in &taken {
            let entry = ObjectVersionRef::new(key.as_str(), version_id.as_str());
            match kind {
                EntryKind::Version => page.versions.push(entry),
                EntryKind::DeleteMarker => page.delete_markers.push(entry),
            }
        }

        if is_truncated {
            if let Some(((key, version_id), _)) = taken.last() {
                page.next_key_marker = Some(key.clone());
                page.next_version_id_marker = Some(version_id.clone());
            }
        }

        Ok(page)
    }

    async fn delete_versions(
        &self,
        _bucket: &str,
        objects: &[ObjectVersionRef],
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.delete_attempts += 1;
        let call = inner.delete_attempts;

        if inner.fail_delete_on == Some(call) {
            return Err(StoreError::new(format!("injected delete failure (call {call})")));
        }

        for object in objects {
            inner
                .entries
                .remove(&(object.key.clone(), object.version_id.clone()));
        }
        inner.delete_calls.push(objects.to_vec());

        Ok(())
    }
}
