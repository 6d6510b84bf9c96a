//! Events the "my jobs" screen feeds into the core, and the view model the
//! core hands back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collection::{CollectionSnapshot, CollectionStatus, FetchTicket};
use crate::config::CollectionConfig;
use crate::error::{FetchError, MutationError};
use crate::filter::{FilterCriteria, StatusFilter};
use crate::model::{JobStatus, MarketplaceAction};
use crate::mutation::MutationRequest;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Screen lifecycle
    /// Replaces the collection, e.g. to filter by status on the server.
    Configure(CollectionConfig),
    Mounted,

    // User input
    PulledToRefresh,
    ScrolledToEnd,
    FilterChanged(FilterCriteria<JobStatus>),
    SearchTextChanged(String),
    StatusSelected(StatusFilter<JobStatus>),
    ActionRequested { action: MarketplaceAction, id: u64 },
    ToastDismissed,

    // Capability responses
    PageFetched {
        ticket: FetchTicket<JobStatus>,
        result: Result<Value, FetchError>,
    },
    ConfirmationAnswered {
        request: MutationRequest,
        confirmed: bool,
    },
    MutationFinished {
        request: MutationRequest,
        result: Result<Value, MutationError>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Configure(_) => "configure",
            Self::Mounted => "mounted",
            Self::PulledToRefresh => "pulled_to_refresh",
            Self::ScrolledToEnd => "scrolled_to_end",
            Self::FilterChanged(_) => "filter_changed",
            Self::SearchTextChanged(_) => "search_text_changed",
            Self::StatusSelected(_) => "status_selected",
            Self::ActionRequested { .. } => "action_requested",
            Self::ToastDismissed => "toast_dismissed",
            Self::PageFetched { .. } => "page_fetched",
            Self::ConfirmationAnswered { .. } => "confirmation_answered",
            Self::MutationFinished { .. } => "mutation_finished",
        }
    }

    pub fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::PulledToRefresh
                | Self::ScrolledToEnd
                | Self::FilterChanged(_)
                | Self::SearchTextChanged(_)
                | Self::StatusSelected(_)
                | Self::ActionRequested { .. }
                | Self::ToastDismissed
                | Self::ConfirmationAnswered { .. }
        )
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
}

impl ToastMessage {
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

/// Everything the shell needs to draw a list screen. The booleans are
/// derived from the single collection status.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ListViewModel<T, S> {
    pub collection: CollectionSnapshot<T, S>,
    pub show_spinner: bool,
    pub is_refreshing: bool,
    pub show_footer_loader: bool,
    pub show_empty_state: bool,
    pub error_message: Option<String>,
    pub toast: Option<ToastMessage>,
}

impl<T, S> ListViewModel<T, S> {
    pub fn from_snapshot(collection: CollectionSnapshot<T, S>, toast: Option<ToastMessage>) -> Self {
        let status = collection.status;
        Self {
            show_spinner: status == CollectionStatus::Loading && collection.items.is_empty(),
            is_refreshing: status == CollectionStatus::Refreshing,
            show_footer_loader: status == CollectionStatus::LoadingMore,
            show_empty_state: status.is_terminal() && collection.view.is_empty(),
            error_message: collection.error.as_ref().map(|e| e.user_message().to_string()),
            collection,
            toast,
        }
    }
}
