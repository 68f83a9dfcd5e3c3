//! Read-only catalog snapshots and the provider seam that supplies them.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::content::{ContentId, ContentItem, ContentKind, Lesson, Tool};
use crate::errors::CatalogError;

#[derive(Clone, Debug)]
pub struct Catalog<T> {
    items: Vec<T>,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: ContentItem> Catalog<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, id: &ContentId) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &ContentId) -> bool {
        self.find(id).is_some()
    }

    /// Rejects catalogs where an id appears more than once.
    pub fn validate_ids(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if !seen.insert(item.id()) {
                return Err(CatalogError::DuplicateId { kind: item.kind(), id: item.id().clone() });
            }
        }
        Ok(())
    }
}

/// One catalog as seen at a point in time.
///
/// A snapshot stands for "the same catalog" only while both its `catalog`
/// allocation and its `revision` are unchanged. Providers that keep a snapshot
/// around should hand out clones of it; building a new one per call is also
/// correct, it just defeats memoization downstream.
#[derive(Clone, Debug)]
pub struct CatalogSnapshot<T> {
    pub catalog: Arc<Catalog<T>>,
    pub is_loading: bool,
    pub revision: u64,
}

impl<T: ContentItem> CatalogSnapshot<T> {
    pub fn loaded(items: Vec<T>) -> Self {
        Self { catalog: Arc::new(Catalog::new(items)), is_loading: false, revision: 0 }
    }

    pub fn loading() -> Self {
        Self { catalog: Arc::new(Catalog::default()), is_loading: true, revision: 0 }
    }

    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }
}

/// Both catalogs handed to the engine together.
#[derive(Clone, Copy, Debug)]
pub struct CatalogSet<'a> {
    pub lessons: &'a CatalogSnapshot<Lesson>,
    pub tools: &'a CatalogSnapshot<Tool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DanglingRelation {
    pub kind: ContentKind,
    pub item_id: ContentId,
    pub missing_id: ContentId,
}

impl<'a> CatalogSet<'a> {
    pub fn new(lessons: &'a CatalogSnapshot<Lesson>, tools: &'a CatalogSnapshot<Tool>) -> Self {
        Self { lessons, tools }
    }

    pub fn is_loading(&self) -> bool {
        self.lessons.is_loading || self.tools.is_loading
    }

    pub fn find(&self, kind: ContentKind, id: &ContentId) -> Option<&'a dyn ContentItem> {
        match kind {
            ContentKind::Lesson => {
                self.lessons.catalog.find(id).map(|lesson| lesson as &dyn ContentItem)
            }
            ContentKind::Tool => self.tools.catalog.find(id).map(|tool| tool as &dyn ContentItem),
        }
    }

    pub fn len(&self, kind: ContentKind) -> usize {
        match kind {
            ContentKind::Lesson => self.lessons.catalog.len(),
            ContentKind::Tool => self.tools.catalog.len(),
        }
    }

    /// Relations whose target is missing from the opposite catalog.
    ///
    /// The engine tolerates these; they are reported for catalog hygiene only.
    pub fn dangling_relations(&self) -> Vec<DanglingRelation> {
        let mut dangling = Vec::new();
        collect_dangling(
            self.lessons.catalog.items(),
            |id| self.tools.catalog.contains(id),
            &mut dangling,
        );
        collect_dangling(
            self.tools.catalog.items(),
            |id| self.lessons.catalog.contains(id),
            &mut dangling,
        );
        dangling
    }
}

fn collect_dangling<T: ContentItem>(
    items: &[T],
    exists: impl Fn(&ContentId) -> bool,
    dangling: &mut Vec<DanglingRelation>,
) {
    for item in items {
        for related in item.related_ids() {
            if !exists(related) {
                dangling.push(DanglingRelation {
                    kind: item.kind(),
                    item_id: item.id().clone(),
                    missing_id: related.clone(),
                });
            }
        }
    }
}

/// Source of catalog snapshots. Implementations own fetching and caching.
pub trait CatalogProvider: Send + Sync {
    fn lessons(&self) -> CatalogSnapshot<Lesson>;
    fn tools(&self) -> CatalogSnapshot<Tool>;

    fn is_loading(&self, kind: ContentKind) -> bool {
        match kind {
            ContentKind::Lesson => self.lessons().is_loading,
            ContentKind::Tool => self.tools().is_loading,
        }
    }
}

/// Provider backed by snapshots published from elsewhere in the process.
///
/// Both catalogs start out loading until something publishes them.
#[derive(Debug)]
pub struct InMemoryCatalogProvider {
    lessons: RwLock<CatalogSnapshot<Lesson>>,
    tools: RwLock<CatalogSnapshot<Tool>>,
    revision: AtomicU64,
}

impl Default for InMemoryCatalogProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCatalogProvider {
    pub fn new() -> Self {
        Self {
            lessons: RwLock::new(CatalogSnapshot::loading()),
            tools: RwLock::new(CatalogSnapshot::loading()),
            revision: AtomicU64::new(0),
        }
    }

    pub fn with_catalogs(lessons: Vec<Lesson>, tools: Vec<Tool>) -> Self {
        let provider = Self::new();
        provider.publish_lessons(lessons);
        provider.publish_tools(tools);
        provider
    }

    pub fn publish_lessons(&self, lessons: Vec<Lesson>) {
        let snapshot = CatalogSnapshot::loaded(lessons).with_revision(self.next_revision());
        *self.lessons.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    pub fn publish_tools(&self, tools: Vec<Tool>) {
        let snapshot = CatalogSnapshot::loaded(tools).with_revision(self.next_revision());
        *self.tools.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    /// Flips a catalog back to loading, e.g. while a refresh is in flight.
    pub fn mark_loading(&self, kind: ContentKind) {
        let revision = self.next_revision();
        match kind {
            ContentKind::Lesson => {
                let mut snapshot = self.lessons.write().unwrap_or_else(PoisonError::into_inner);
                snapshot.is_loading = true;
                snapshot.revision = revision;
            }
            ContentKind::Tool => {
                let mut snapshot = self.tools.write().unwrap_or_else(PoisonError::into_inner);
                snapshot.is_loading = true;
                snapshot.revision = revision;
            }
        }
    }

    fn next_revision(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl CatalogProvider for InMemoryCatalogProvider {
    fn lessons(&self) -> CatalogSnapshot<Lesson> {
        self.lessons.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn tools(&self) -> CatalogSnapshot<Tool> {
        self.tools.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Reads a JSON array of catalog items and rejects duplicate ids.
pub fn read_catalog_file<T>(path: &Path) -> Result<Catalog<T>, CatalogError>
where
    T: ContentItem + DeserializeOwned,
{
    let raw = fs::read_to_string(path)
        .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
    let items = serde_json::from_str::<Vec<T>>(&raw)
        .map_err(|source| CatalogError::ParseFile { path: path.to_path_buf(), source })?;

    let catalog = Catalog::new(items);
    catalog.validate_ids()?;
    Ok(catalog)
}
