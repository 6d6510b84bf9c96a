//! Local filter criteria and the record contract the collection relies on.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// What the collection needs to know about an item: its identity, its
/// status, and the text fields the local search looks at.
pub trait Record: Clone + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + fmt::Debug + Send + Sync;
    type Status: Copy + Eq + fmt::Debug + Send + Sync;

    fn id(&self) -> Self::Id;

    fn status(&self) -> Self::Status;

    fn search_fields(&self) -> Vec<&str>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter<S> {
    #[default]
    All,
    Only(S),
}

impl<S: Copy + Eq> StatusFilter<S> {
    #[must_use]
    pub fn accepts(&self, status: S) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }

    /// The value to send as a server parameter, if any.
    #[must_use]
    pub fn as_param(&self) -> Option<S> {
        match self {
            Self::All => None,
            Self::Only(s) => Some(*s),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria<S> {
    pub text: String,
    pub status: StatusFilter<S>,
}

impl<S> Default for FilterCriteria<S> {
    fn default() -> Self {
        Self {
            text: String::new(),
            status: StatusFilter::All,
        }
    }
}

impl<S: Copy + Eq> FilterCriteria<S> {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: StatusFilter::All,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: S) -> Self {
        self.status = StatusFilter::Only(status);
        self
    }

    /// Case-insensitive substring match over the record's search fields.
    /// Blank text matches everything.
    pub fn matches_text<T: Record<Status = S>>(&self, record: &T) -> bool {
        let needle = self.text.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn matches_status<T: Record<Status = S>>(&self, record: &T) -> bool {
        self.status.accepts(record.status())
    }
}
