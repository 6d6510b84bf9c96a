use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

use crate::capabilities::JsonPageAdapter;
use crate::filter::Record;
use crate::mutation::MutationRequest;

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

typed_id!(JobId);
typed_id!(ProjectId);
typed_id!(OrderId);

// --- Actions ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketplaceAction {
    Create,
    Cancel,
    Complete,
    Accept,
    Reject,
}

impl MarketplaceAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Cancel => "cancel",
            Self::Complete => "complete",
            Self::Accept => "accept",
            Self::Reject => "reject",
        }
    }

    /// Prompt shown before a destructive action, if it needs one.
    #[must_use]
    pub const fn confirmation(self) -> Option<&'static str> {
        match self {
            Self::Cancel => Some("Are you sure you want to cancel?"),
            Self::Reject => Some("Are you sure you want to reject this?"),
            Self::Create | Self::Complete | Self::Accept => None,
        }
    }

    /// Request acting on an existing record.
    pub fn on(self, id: u64) -> MutationRequest {
        MutationRequest::new(self.as_str(), json!({ "id": id }))
    }
}

impl fmt::Display for MarketplaceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Jobs ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    #[must_use]
    pub fn available_actions(self) -> Vec<MarketplaceAction> {
        match self {
            Self::Open => vec![MarketplaceAction::Cancel],
            Self::InProgress => vec![MarketplaceAction::Complete, MarketplaceAction::Cancel],
            Self::Completed | Self::Cancelled => vec![],
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    pub status: JobStatus,
}

impl Job {
    pub fn page_adapter() -> JsonPageAdapter<Self> {
        JsonPageAdapter::new("jobs")
    }
}

impl Record for Job {
    type Id = JobId;
    type Status = JobStatus;

    fn id(&self) -> JobId {
        self.id
    }

    fn status(&self) -> JobStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.description.as_str()];
        fields.extend(self.location.as_deref());
        fields
    }
}

// --- Projects ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    #[must_use]
    pub fn available_actions(self) -> Vec<MarketplaceAction> {
        match self {
            Self::Active | Self::OnHold => {
                vec![MarketplaceAction::Complete, MarketplaceAction::Cancel]
            }
            Self::Completed | Self::Cancelled => vec![],
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub client_name: Option<String>,
    pub status: ProjectStatus,
}

impl Project {
    pub fn page_adapter() -> JsonPageAdapter<Self> {
        JsonPageAdapter::new("projects")
    }
}

impl Record for Project {
    type Id = ProjectId;
    type Status = ProjectStatus;

    fn id(&self) -> ProjectId {
        self.id
    }

    fn status(&self) -> ProjectStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.description.as_str()];
        fields.extend(self.client_name.as_deref());
        fields
    }
}

// --- Orders ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub fn available_actions(self) -> Vec<MarketplaceAction> {
        match self {
            Self::Pending => vec![
                MarketplaceAction::Accept,
                MarketplaceAction::Reject,
                MarketplaceAction::Cancel,
            ],
            Self::Accepted => vec![MarketplaceAction::Complete, MarketplaceAction::Cancel],
            Self::Rejected | Self::Completed | Self::Cancelled => vec![],
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub title: String,
    #[serde(default)]
    pub counterparty: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    pub status: OrderStatus,
}

impl Order {
    pub fn page_adapter() -> JsonPageAdapter<Self> {
        JsonPageAdapter::new("orders")
    }
}

impl Record for Order {
    type Id = OrderId;
    type Status = OrderStatus;

    fn id(&self) -> OrderId {
        self.id
    }

    fn status(&self) -> OrderStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.counterparty.as_deref());
        fields
    }
}
