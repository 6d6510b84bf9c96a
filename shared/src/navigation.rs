//! Bottom-tab highlight kept in step with the navigation route.
//!
//! The route is the single source of truth. A tab press only asks the host
//! to navigate; the highlighted tab moves when the host reports the route
//! change. Routes with no tab (detail screens, forms) leave the highlight
//! where it was.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::capabilities::NavigationHost;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("tab/route table is empty")]
    Empty,
    #[error("tab {0} is mapped more than once")]
    DuplicateTab(String),
    #[error("route {0} is mapped more than once")]
    DuplicateRoute(String),
    #[error("tab {0} is not in the table")]
    UnknownTab(String),
}

/// One declarative table, indexed both ways.
#[derive(Debug, Clone)]
pub struct TabRouteMap<Tab, Route> {
    entries: Vec<(Tab, Route)>,
    by_tab: HashMap<Tab, Route>,
    by_route: HashMap<Route, Tab>,
}

impl<Tab, Route> TabRouteMap<Tab, Route>
where
    Tab: Clone + Eq + Hash + fmt::Debug,
    Route: Clone + Eq + Hash + fmt::Debug,
{
    pub fn new(entries: impl IntoIterator<Item = (Tab, Route)>) -> Result<Self, MapError> {
        let entries: Vec<(Tab, Route)> = entries.into_iter().collect();
        if entries.is_empty() {
            return Err(MapError::Empty);
        }

        let mut by_tab = HashMap::with_capacity(entries.len());
        let mut by_route = HashMap::with_capacity(entries.len());
        for (tab, route) in &entries {
            if by_tab.insert(tab.clone(), route.clone()).is_some() {
                return Err(MapError::DuplicateTab(format!("{tab:?}")));
            }
            if by_route.insert(route.clone(), tab.clone()).is_some() {
                return Err(MapError::DuplicateRoute(format!("{route:?}")));
            }
        }

        Ok(Self {
            entries,
            by_tab,
            by_route,
        })
    }

    /// `None` means the route does not change the highlighted tab.
    pub fn tab_for_route<Q>(&self, route: &Q) -> Option<&Tab>
    where
        Route: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.by_route.get(route)
    }

    pub fn route_for_tab(&self, tab: &Tab) -> Option<&Route> {
        self.by_tab.get(tab)
    }

    pub fn contains_tab(&self, tab: &Tab) -> bool {
        self.by_tab.contains_key(tab)
    }

    /// Tabs in table order.
    pub fn tabs(&self) -> impl Iterator<Item = &Tab> {
        self.entries.iter().map(|(tab, _)| tab)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabPress {
    /// The tab is already highlighted; nothing happened.
    AlreadyActive,
    /// Navigation to this tab was requested and has not landed yet.
    AlreadyPending,
    Navigated,
    Unmapped,
}

pub struct TabRouteSynchronizer<Tab, Route, N> {
    map: TabRouteMap<Tab, Route>,
    navigator: Arc<N>,
    active: Tab,
    pending: Option<Tab>,
}

impl<Tab, Route, N> TabRouteSynchronizer<Tab, Route, N>
where
    Tab: Clone + Eq + Hash + fmt::Debug,
    Route: Clone + Eq + Hash + fmt::Debug,
    N: NavigationHost<Route>,
{
    pub fn new(map: TabRouteMap<Tab, Route>, navigator: Arc<N>, initial: Tab) -> Result<Self, MapError> {
        if !map.contains_tab(&initial) {
            return Err(MapError::UnknownTab(format!("{initial:?}")));
        }
        Ok(Self {
            map,
            navigator,
            active: initial,
            pending: None,
        })
    }

    pub fn active_tab(&self) -> &Tab {
        &self.active
    }

    pub fn pending_tab(&self) -> Option<&Tab> {
        self.pending.as_ref()
    }

    pub fn map(&self) -> &TabRouteMap<Tab, Route> {
        &self.map
    }

    /// Returns true if the highlighted tab changed.
    pub fn on_route_changed<Q>(&mut self, route: &Q) -> bool
    where
        Route: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        self.pending = None;
        let Some(tab) = self.map.tab_for_route(route) else {
            return false;
        };
        if *tab == self.active {
            return false;
        }
        debug!(?route, ?tab, "active tab follows route");
        self.active = tab.clone();
        true
    }

    pub fn on_tab_pressed(&mut self, tab: &Tab) -> TabPress {
        if *tab == self.active {
            return TabPress::AlreadyActive;
        }
        if self.pending.as_ref() == Some(tab) {
            return TabPress::AlreadyPending;
        }
        let Some(route) = self.map.route_for_tab(tab) else {
            return TabPress::Unmapped;
        };
        debug!(?tab, ?route, "navigating for tab press");
        self.navigator.navigate(route, None);
        self.pending = Some(tab.clone());
        TabPress::Navigated
    }

    /// Whether the highlight agrees with `route` once navigation has settled.
    pub fn is_consistent_with<Q>(&self, route: &Q) -> bool
    where
        Route: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map
            .tab_for_route(route)
            .map_or(true, |tab| *tab == self.active)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketplaceTab {
    Home,
    Jobs,
    Projects,
    Orders,
    Profile,
}

impl MarketplaceTab {
    pub const ALL: [Self; 5] = [Self::Home, Self::Jobs, Self::Projects, Self::Orders, Self::Profile];

    #[must_use]
    pub const fn route_name(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Jobs => "Jobs",
            Self::Projects => "Projects",
            Self::Orders => "Orders",
            Self::Profile => "Profile",
        }
    }
}

/// Detail and form screens reachable from the tabs; none of them moves the
/// highlight.
pub const SECONDARY_ROUTES: &[&str] = &[
    "JobDetails",
    "CreateJob",
    "ProjectDetails",
    "OrderDetails",
    "EditProfile",
];

pub fn marketplace_tab_map() -> TabRouteMap<MarketplaceTab, String> {
    let entries: Vec<(MarketplaceTab, String)> = MarketplaceTab::ALL
        .iter()
        .map(|tab| (*tab, tab.route_name().to_string()))
        .collect();
    // Route names are distinct per variant, so the table is a bijection.
    TabRouteMap {
        by_tab: entries.iter().cloned().collect(),
        by_route: entries.iter().map(|(tab, route)| (route.clone(), *tab)).collect(),
        entries,
    }
}
