//! In-memory state of one paginated remote list.
//!
//! `Collection` is a plain state machine: `begin_*` decides whether a fetch
//! may start and hands back a ticket, `apply` folds the fetch result back in.
//! It performs no I/O, so the async controller and a shell that drives fetches
//! itself share the same transitions.
//!
//! ```text
//! idle | error ──load/load_more──► loading | loading_more ──► idle | error
//! any ─────────────refresh───────► refreshing ────────────► idle | error
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::capabilities::{Page, PageParams};
use crate::config::{CollectionConfig, StatusFilterMode};
use crate::error::{ConfigError, FetchError};
use crate::filter::{FilterCriteria, Record};
use crate::request_gate::{RequestGate, RequestToken};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionId(Uuid);

impl CollectionId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    #[default]
    Idle,
    Loading,
    Refreshing,
    LoadingMore,
    Error,
}

impl CollectionStatus {
    /// No fetch of this collection is outstanding.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Idle | Self::Error)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchKind {
    Load,
    Refresh,
    LoadMore,
}

impl FetchKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Refresh => "refresh",
            Self::LoadMore => "load_more",
        }
    }
}

/// Load, refresh and load-more all rebuild the same page set, so they share
/// one gate key and the latest of them wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum FetchPurpose {
    PageSet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct GateKey {
    collection: CollectionId,
    purpose: FetchPurpose,
}

/// Permission to run one fetch. Hand it back to `Collection::apply` with
/// the result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchTicket<S> {
    /// Tickets from a replaced collection never apply to its successor.
    pub collection: CollectionId,
    pub token: RequestToken,
    pub kind: FetchKind,
    pub params: PageParams<S>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Failed,
    /// A newer fetch was issued meanwhile; nothing changed.
    Stale,
}

/// Result of `Collection::set_filter`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterChange {
    /// The server-side page set changed and page 1 must be refetched.
    pub needs_refetch: bool,
}

/// What a shell renders for a collection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CollectionSnapshot<T, S> {
    pub label: String,
    pub items: Vec<T>,
    pub view: Vec<T>,
    pub page: u32,
    pub has_more: bool,
    pub status: CollectionStatus,
    pub error: Option<FetchError>,
    pub filter: FilterCriteria<S>,
}

#[derive(Debug)]
pub struct Collection<T: Record> {
    id: CollectionId,
    config: CollectionConfig,
    items: Vec<T>,
    /// Set once a page-1 response has been applied.
    loaded: bool,
    page: u32,
    has_more: bool,
    status: CollectionStatus,
    error: Option<FetchError>,
    filter: FilterCriteria<T::Status>,
    gate: RequestGate<GateKey>,
}

impl<T: Record> Default for Collection<T> {
    fn default() -> Self {
        Self::with_config(CollectionConfig::default())
    }
}

impl<T: Record> Collection<T> {
    pub fn new(config: CollectionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: CollectionConfig) -> Self {
        Self {
            id: CollectionId::generate(),
            config,
            items: Vec::new(),
            loaded: false,
            page: 1,
            has_more: true,
            status: CollectionStatus::Idle,
            error: None,
            filter: FilterCriteria::default(),
            gate: RequestGate::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> CollectionId {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    #[must_use]
    pub fn status(&self) -> CollectionStatus {
        self.status
    }

    #[must_use]
    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn filter(&self) -> &FilterCriteria<T::Status> {
        &self.filter
    }

    /// Whether page 1 has ever been applied.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Items passing the current filter, in server order. Recomputed on
    /// every call. Status is checked in both modes, so a server-filtered
    /// list whose refetch failed still honours the selected status.
    pub fn view(&self) -> Vec<&T> {
        self.items
            .iter()
            .filter(|item| self.filter.matches_text(*item) && self.filter.matches_status(*item))
            .collect()
    }

    pub fn begin_load(&mut self) -> Option<FetchTicket<T::Status>> {
        if !self.status.is_terminal() {
            return None;
        }
        Some(self.issue(FetchKind::Load, 1))
    }

    /// Always accepted; supersedes whatever fetch is in flight.
    pub fn begin_refresh(&mut self) -> FetchTicket<T::Status> {
        self.issue(FetchKind::Refresh, 1)
    }

    /// Ignored until page 1 has landed; `load` is the way in from there.
    pub fn begin_load_more(&mut self) -> Option<FetchTicket<T::Status>> {
        if !self.loaded || !self.status.is_terminal() || !self.has_more {
            return None;
        }
        let next = self.page + 1;
        Some(self.issue(FetchKind::LoadMore, next))
    }

    fn issue(&mut self, kind: FetchKind, page: u32) -> FetchTicket<T::Status> {
        let token = self.gate.issue(self.gate_key());
        self.status = match kind {
            FetchKind::Load => CollectionStatus::Loading,
            FetchKind::Refresh => CollectionStatus::Refreshing,
            FetchKind::LoadMore => CollectionStatus::LoadingMore,
        };
        let status = match self.config.status_filter {
            StatusFilterMode::Local => None,
            StatusFilterMode::Server => self.filter.status.as_param(),
        };
        FetchTicket {
            collection: self.id,
            token,
            kind,
            params: PageParams {
                page,
                page_size: self.config.page_size,
                status,
            },
        }
    }

    #[must_use]
    pub fn is_current(&self, ticket: &FetchTicket<T::Status>) -> bool {
        ticket.collection == self.id && self.gate.is_current(&self.gate_key(), ticket.token)
    }

    pub fn apply(
        &mut self,
        ticket: &FetchTicket<T::Status>,
        result: Result<Page<T>, FetchError>,
    ) -> ApplyOutcome {
        if !self.is_current(ticket) {
            return ApplyOutcome::Stale;
        }
        let page = match result {
            Ok(page) => page,
            Err(e) => {
                // Items and cursor stay put so a retry asks for the same page.
                self.status = CollectionStatus::Error;
                self.error = Some(e);
                return ApplyOutcome::Failed;
            }
        };

        self.has_more = page.has_more();
        match ticket.kind {
            FetchKind::Load | FetchKind::Refresh => {
                self.items = page.items;
                self.page = 1;
                self.loaded = true;
            }
            FetchKind::LoadMore => {
                let mut seen: HashSet<T::Id> = self.items.iter().map(Record::id).collect();
                self.items
                    .extend(page.items.into_iter().filter(|item| seen.insert(item.id())));
                self.page = ticket.params.page;
            }
        }
        self.status = CollectionStatus::Idle;
        self.error = None;
        ApplyOutcome::Applied
    }

    /// Replaces the filter. Never touches items, cursor or status.
    pub fn set_filter(&mut self, criteria: FilterCriteria<T::Status>) -> FilterChange {
        self.update_filter(|filter| *filter = criteria)
    }

    /// Edits the filter in place, e.g. only its text.
    pub fn update_filter<F>(&mut self, edit: F) -> FilterChange
    where
        F: FnOnce(&mut FilterCriteria<T::Status>),
    {
        let previous = self.filter.status;
        edit(&mut self.filter);
        let needs_refetch =
            self.config.status_filter == StatusFilterMode::Server && self.filter.status != previous;
        FilterChange { needs_refetch }
    }

    pub fn snapshot(&self) -> CollectionSnapshot<T, T::Status> {
        CollectionSnapshot {
            label: self.config.label.clone(),
            items: self.items.clone(),
            view: self.view().into_iter().cloned().collect(),
            page: self.page,
            has_more: self.has_more,
            status: self.status,
            error: self.error.clone(),
            filter: self.filter.clone(),
        }
    }

    fn gate_key(&self) -> GateKey {
        GateKey {
            collection: self.id,
            purpose: FetchPurpose::PageSet,
        }
    }
}
