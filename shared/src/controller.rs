//! Async driver for one paginated collection.
//!
//! The controller owns a `Collection` behind a lock and runs fetches against
//! a `DataSource`. The lock is never held across a fetch: a ticket is taken,
//! the lock released, the page awaited, and the result applied under a fresh
//! lock, where the request token decides whether it still counts.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::capabilities::DataSource;
use crate::collection::{ApplyOutcome, Collection, CollectionSnapshot, CollectionStatus, FetchTicket};
use crate::config::CollectionConfig;
use crate::error::{ConfigError, FetchError};
use crate::filter::{FilterCriteria, Record};
use crate::mutation::Reload;

pub struct PaginatedCollectionController<T: Record, D> {
    source: Arc<D>,
    label: String,
    state: RwLock<Collection<T>>,
}

impl<T, D> PaginatedCollectionController<T, D>
where
    T: Record,
    D: DataSource<T>,
{
    pub fn new(source: Arc<D>, config: CollectionConfig) -> Result<Self, ConfigError> {
        let label = config.label.clone();
        let collection = Collection::new(config)?;
        debug!(collection = %label, id = %collection.id(), "collection created");
        Ok(Self {
            source,
            label,
            state: RwLock::new(collection),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Initial fetch of page 1. Ignored unless the collection is idle or in
    /// error.
    #[instrument(skip_all, fields(collection = %self.label))]
    pub async fn load(&self) {
        let ticket = self.state.write().await.begin_load();
        match ticket {
            Some(ticket) => self.run(ticket).await,
            None => debug!("load ignored, fetch already running"),
        }
    }

    /// Refetches page 1, keeping the current items visible until it lands.
    #[instrument(skip_all, fields(collection = %self.label))]
    pub async fn refresh(&self) {
        let ticket = self.state.write().await.begin_refresh();
        self.run(ticket).await;
    }

    #[instrument(skip_all, fields(collection = %self.label))]
    pub async fn load_more(&self) {
        let ticket = self.state.write().await.begin_load_more();
        match ticket {
            Some(ticket) => self.run(ticket).await,
            None => debug!("load_more ignored"),
        }
    }

    pub async fn reload(&self) {
        self.refresh().await;
    }

    /// Replaces the filter. Only a server-side status change fetches; text
    /// search is always local.
    #[instrument(skip_all, fields(collection = %self.label))]
    pub async fn set_filter(&self, criteria: FilterCriteria<T::Status>) {
        let change = self.state.write().await.set_filter(criteria);
        if change.needs_refetch {
            debug!("status filter changed on server-filtered collection, refetching");
            self.refresh().await;
        }
    }

    /// Edits the filter under a single write lock, e.g. only its search
    /// text, then refetches if the server-side status changed.
    #[instrument(skip_all, fields(collection = %self.label))]
    pub async fn update_filter<F>(&self, edit: F)
    where
        F: FnOnce(&mut FilterCriteria<T::Status>) + Send,
    {
        let change = self.state.write().await.update_filter(edit);
        if change.needs_refetch {
            debug!("status filter changed on server-filtered collection, refetching");
            self.refresh().await;
        }
    }

    async fn run(&self, ticket: FetchTicket<T::Status>) {
        debug!(token = %ticket.token, kind = ticket.kind.as_str(), page = ticket.params.page, "fetching");
        let result = self.source.fetch_page(ticket.params.clone()).await;
        let failure = result.as_ref().err().cloned();

        let mut state = self.state.write().await;
        match state.apply(&ticket, result) {
            ApplyOutcome::Applied => info!(
                token = %ticket.token,
                kind = ticket.kind.as_str(),
                items = state.items().len(),
                has_more = state.has_more(),
                "page applied"
            ),
            ApplyOutcome::Failed => warn!(
                token = %ticket.token,
                kind = ticket.kind.as_str(),
                error = ?failure,
                "fetch failed"
            ),
            ApplyOutcome::Stale => debug!(
                token = %ticket.token,
                kind = ticket.kind.as_str(),
                "discarding stale response"
            ),
        }
    }

    pub async fn status(&self) -> CollectionStatus {
        self.state.read().await.status()
    }

    pub async fn items(&self) -> Vec<T> {
        self.state.read().await.items().to_vec()
    }

    pub async fn view(&self) -> Vec<T> {
        self.state.read().await.view().into_iter().cloned().collect()
    }

    pub async fn page(&self) -> u32 {
        self.state.read().await.page()
    }

    pub async fn has_more(&self) -> bool {
        self.state.read().await.has_more()
    }

    pub async fn error(&self) -> Option<FetchError> {
        self.state.read().await.error().cloned()
    }

    pub async fn filter(&self) -> FilterCriteria<T::Status> {
        self.state.read().await.filter().clone()
    }

    pub async fn snapshot(&self) -> CollectionSnapshot<T, T::Status> {
        self.state.read().await.snapshot()
    }
}

#[async_trait]
impl<T, D> Reload for PaginatedCollectionController<T, D>
where
    T: Record,
    D: DataSource<T>,
{
    async fn reload(&self) {
        self.refresh().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{Page, PageParams};
    use crate::config::StatusFilterMode;
    use std::sync::Mutex;

    #[derive(Clone, Debug, PartialEq)]
    struct Note {
        id: u32,
        text: String,
    }

    impl Record for Note {
        type Id = u32;
        type Status = ();

        fn id(&self) -> u32 {
            self.id
        }

        fn status(&self) {}

        fn search_fields(&self) -> Vec<&str> {
            vec![&self.text]
        }
    }

    /// Serves `pages` in order of page number; fails while `failing` is set.
    struct PagedSource {
        pages: Vec<Vec<u32>>,
        failing: Mutex<bool>,
        calls: Mutex<Vec<PageParams<()>>>,
    }

    impl PagedSource {
        fn new(pages: Vec<Vec<u32>>) -> Arc<Self> {
            Arc::new(Self {
                pages,
                failing: Mutex::new(false),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn set_failing(&self, failing: bool) {
            *self.failing.lock().unwrap() = failing;
        }

        fn calls(&self) -> Vec<PageParams<()>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DataSource<Note> for PagedSource {
        async fn fetch_page(&self, params: PageParams<()>) -> Result<Page<Note>, FetchError> {
            self.calls.lock().unwrap().push(params.clone());
            if *self.failing.lock().unwrap() {
                return Err(FetchError::network("connection reset"));
            }
            let index = usize::try_from(params.page - 1).unwrap();
            let items = self.pages[index]
                .iter()
                .map(|&id| Note {
                    id,
                    text: format!("note {id}"),
                })
                .collect();
            let total = u32::try_from(self.pages.len()).unwrap();
            Ok(Page::new(items, params.page, total))
        }
    }

    fn controller(source: &Arc<PagedSource>) -> PaginatedCollectionController<Note, PagedSource> {
        PaginatedCollectionController::new(
            Arc::clone(source),
            CollectionConfig::new("notes").with_page_size(3),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn paginates_to_the_end() {
        let source = PagedSource::new(vec![vec![1, 2, 3], vec![4, 5, 6]]);
        let ctl = controller(&source);

        ctl.load().await;
        assert_eq!(ctl.items().await.len(), 3);
        assert!(ctl.has_more().await);

        ctl.load_more().await;
        assert_eq!(ctl.items().await.len(), 6);
        assert!(!ctl.has_more().await);

        ctl.load_more().await;
        assert_eq!(ctl.items().await.len(), 6);
        assert_eq!(source.calls().len(), 2);
        assert_eq!(source.calls()[1].page, 2);
        assert_eq!(source.calls()[1].page_size, 3);
    }

    #[tokio::test]
    async fn error_is_stored_not_thrown_and_retry_recovers() {
        let source = PagedSource::new(vec![vec![1, 2, 3], vec![4]]);
        let ctl = controller(&source);
        ctl.load().await;

        source.set_failing(true);
        ctl.load_more().await;
        assert_eq!(ctl.status().await, CollectionStatus::Error);
        assert_eq!(ctl.error().await, Some(FetchError::network("connection reset")));
        assert_eq!(ctl.page().await, 1);

        source.set_failing(false);
        ctl.load_more().await;
        assert_eq!(ctl.status().await, CollectionStatus::Idle);
        assert_eq!(ctl.error().await, None);
        assert_eq!(ctl.items().await.len(), 4);
        assert_eq!(source.calls()[2].page, 2);
    }

    #[tokio::test]
    async fn text_filter_never_fetches() {
        let source = PagedSource::new(vec![vec![1, 2, 3]]);
        let ctl = controller(&source);
        ctl.load().await;

        ctl.set_filter(FilterCriteria::text("note 2")).await;
        assert_eq!(ctl.view().await.len(), 1);
        assert_eq!(ctl.items().await.len(), 3);
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn update_filter_keeps_the_rest_of_the_criteria() {
        let source = PagedSource::new(vec![vec![1, 2, 3]]);
        let ctl = controller(&source);
        ctl.load().await;
        ctl.set_filter(FilterCriteria::text("note")).await;

        ctl.update_filter(|filter| filter.text.push_str(" 3")).await;
        assert_eq!(ctl.filter().await.text, "note 3");
        assert_eq!(ctl.view().await.len(), 1);
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn load_more_before_load_is_ignored() {
        let source = PagedSource::new(vec![vec![1, 2, 3], vec![4, 5, 6]]);
        let ctl = controller(&source);

        ctl.load_more().await;
        assert!(source.calls().is_empty());
        assert_eq!(ctl.status().await, CollectionStatus::Idle);

        source.set_failing(true);
        ctl.load().await;
        ctl.load_more().await;
        assert_eq!(source.calls().len(), 1);
        assert_eq!(ctl.page().await, 1);

        // Retrying the first page is what gets the list going.
        source.set_failing(false);
        ctl.load().await;
        ctl.load_more().await;
        assert_eq!(source.calls()[2].page, 2);
        assert_eq!(ctl.items().await.len(), 6);
    }

    #[tokio::test]
    async fn reload_through_trait_refetches_page_one() {
        let source = PagedSource::new(vec![vec![1, 2, 3], vec![4, 5, 6]]);
        let ctl = controller(&source);
        ctl.load().await;
        ctl.load_more().await;

        let reloadable: &dyn Reload = &ctl;
        reloadable.reload().await;
        assert_eq!(ctl.items().await.len(), 3);
        assert_eq!(ctl.page().await, 1);
        assert!(ctl.has_more().await);
    }

    #[test]
    fn rejects_invalid_config() {
        let source = PagedSource::new(vec![]);
        let result: Result<PaginatedCollectionController<Note, PagedSource>, _> =
            PaginatedCollectionController::new(
                source,
                CollectionConfig::new("notes")
                    .with_page_size(0)
                    .with_status_filter(StatusFilterMode::Server),
            );
        assert!(result.is_err());
    }
}
