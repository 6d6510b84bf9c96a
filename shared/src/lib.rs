//! Shared core for the marketplace app's list screens.
//!
//! Screens over jobs, projects and orders all do the same thing: fetch a
//! paginated list, refresh it, append pages, filter it locally, run an
//! action against one item and then resync the list. This crate holds that
//! logic once, independent of any UI runtime:
//!
//! - [`PaginatedCollectionController`] owns one list and its fetch state.
//! - [`MutationCoordinator`] runs remote actions and reloads the bound list.
//! - [`TabRouteSynchronizer`] keeps the bottom-tab highlight on the route.
//! - [`App`] is the "my jobs" screen as a Crux app: the same collection and
//!   action rules, driven by events with the I/O left to the shell.
//!
//! The remote API, navigation host and confirmation dialog are reached
//! through [`capabilities`], either as Crux effects or as async traits.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod app;
pub mod capabilities;
pub mod collection;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod filter;
pub mod model;
pub mod mutation;
pub mod navigation;
pub mod request_gate;

pub use app::{App, Model, MY_JOBS_LABEL};
pub use capabilities::{
    Adapted, Api, ApiRequest, Capabilities, Confirm, ConfirmOperation, ConfirmationPrompt,
    DataSource, Effect, HttpReply, JsonPageAdapter, Mutator, NavigationHost, Page, PageAdapter,
    PageParams, Pagination, RawDataSource,
};
pub use crux_core::{render::Render, App as CruxApp};
pub use collection::{
    ApplyOutcome, Collection, CollectionId, CollectionSnapshot, CollectionStatus, FetchKind,
    FetchTicket,
};
pub use config::{CollectionConfig, StatusFilterMode};
pub use controller::PaginatedCollectionController;
pub use error::{ConfigError, ErrorKind, FetchError, MutationError};
pub use event::{Event, ListViewModel, ToastKind, ToastMessage};
pub use filter::{FilterCriteria, Record, StatusFilter};
pub use model::{
    Job, JobId, JobStatus, MarketplaceAction, Order, OrderId, OrderStatus, Project, ProjectId,
    ProjectStatus,
};
pub use mutation::{
    InFlightActions, MutationCoordinator, MutationKey, MutationOutcome, MutationRequest,
    PerformOptions, Reload,
};
pub use navigation::{
    marketplace_tab_map, MapError, MarketplaceTab, TabPress, TabRouteMap, TabRouteSynchronizer,
};
pub use request_gate::{RequestGate, RequestToken};
