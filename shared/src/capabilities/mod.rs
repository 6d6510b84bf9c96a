//! Seams to everything the core does not own: the remote API, the navigation
//! host and the confirmation dialog.
//!
//! The Crux app reaches them as effects through [`Capabilities`]. The async
//! controllers reach them through the traits below, which shells implement
//! and tests script.

mod api;
mod confirm;
mod page;

use async_trait::async_trait;
use crux_core::render::Render;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::App;
use crate::error::{FetchError, MutationError};
use crate::event::Event;
use crate::filter::Record;

pub use self::api::{Api, ApiRequest, HttpReply};
pub use self::confirm::{Confirm, ConfirmOperation};
pub use self::page::{Adapted, JsonPageAdapter, PageAdapter, RawDataSource};

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub render: Render<Event>,
    pub api: Api<Event>,
    pub confirm: Confirm<Event>,
}

/// Parameters of one page request. `status` is only set when the collection
/// filters by status on the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams<S> {
    pub page: u32,
    pub page_size: u32,
    pub status: Option<S>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
}

/// One normalized page. Absent pagination metadata means there is nothing
/// more to load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Option<Pagination>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, current_page: u32, total_pages: u32) -> Self {
        Self {
            items,
            pagination: Some(Pagination {
                current_page,
                total_pages,
            }),
        }
    }

    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            pagination: None,
        }
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.pagination
            .is_some_and(|p| p.current_page < p.total_pages)
    }
}

#[async_trait]
pub trait DataSource<T: Record>: Send + Sync {
    async fn fetch_page(&self, params: PageParams<T::Status>) -> Result<Page<T>, FetchError>;
}

#[async_trait]
pub trait Mutator: Send + Sync {
    async fn mutate(&self, action: &str, payload: &Value) -> Result<Value, MutationError>;
}

/// Fire-and-forget navigation. The host reports the resulting route change
/// back through `TabRouteSynchronizer::on_route_changed`.
pub trait NavigationHost<R>: Send + Sync {
    fn navigate(&self, route: &R, params: Option<Value>);
}

#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}
