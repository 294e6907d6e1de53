//! Protected layout: guarded navigation between pages.

pub mod dashboard;

use serde::Serialize;
use std::fmt;

use crate::api::ApiClient;
use crate::auth::{Authorization, SessionGuard, StoreError};
use crate::notify::Notifier;
use crate::resource::{Resource, ResourceTable};

pub use dashboard::DashboardStats;

/// Protected pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Page {
    Home,
    Products,
    Inventory,
    Suppliers,
    PurchaseOrders,
    Shipments,
    Notifications,
}

impl Page {
    pub const ALL: [Page; 7] = [
        Page::Home,
        Page::Products,
        Page::Inventory,
        Page::Suppliers,
        Page::PurchaseOrders,
        Page::Shipments,
        Page::Notifications,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::Products => "/products",
            Page::Inventory => "/inventory",
            Page::Suppliers => "/suppliers",
            Page::PurchaseOrders => "/purchase-orders",
            Page::Shipments => "/shipments",
            Page::Notifications => "/notifications",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Products => "Products",
            Page::Inventory => "Inventory",
            Page::Suppliers => "Suppliers",
            Page::PurchaseOrders => "Purchase Orders",
            Page::Shipments => "Shipments",
            Page::Notifications => "Notifications",
        }
    }

    pub fn from_path(path: &str) -> Option<Page> {
        let path = path.trim_end_matches('/');
        let path = if path.is_empty() { "/" } else { path };
        Page::ALL.into_iter().find(|p| p.path() == path)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Entry points reachable without a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PublicPage {
    Login,
    Register,
}

impl PublicPage {
    pub fn path(&self) -> &'static str {
        match self {
            PublicPage::Login => "/login",
            PublicPage::Register => "/register",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Navigation {
    Render(Page),
    Redirect(PublicPage),
}

/// Owns the guard and the shared notifier; hands out tables for the active
/// page only after the guard has passed.
pub struct Shell {
    client: ApiClient,
    guard: SessionGuard,
    notifier: Notifier,
    active: Option<Page>,
}

impl Shell {
    pub fn new(client: ApiClient, notifier: Notifier) -> Self {
        Self {
            guard: SessionGuard::new(client.clone()),
            client,
            notifier,
            active: None,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn guard(&self) -> &SessionGuard {
        &self.guard
    }

    pub fn active(&self) -> Option<Page> {
        self.active
    }

    /// Run the guard, then render `page` or redirect to login. Nothing is
    /// rendered while unauthorized.
    pub async fn navigate(&mut self, page: Page) -> Navigation {
        match self.guard.authorize().await {
            Authorization::Authorized => {
                tracing::debug!("Navigating to {}", page.path());
                self.active = Some(page);
                Navigation::Render(page)
            }
            Authorization::Unauthorized => {
                self.active = None;
                Navigation::Redirect(PublicPage::Login)
            }
        }
    }

    /// Table for the active page; `None` unless a navigation was authorized
    pub fn table<R: Resource>(&self) -> Option<ResourceTable<R>> {
        self.guard
            .is_authorized()
            .then(|| ResourceTable::new(self.client.clone(), self.notifier.clone()))
    }

    pub async fn dashboard(&self) -> DashboardStats {
        DashboardStats::load(&self.client, crate::config::config().ui.low_stock_threshold).await
    }

    /// Clear the session and return to the login entry point
    pub fn logout(&mut self) -> Result<Navigation, StoreError> {
        self.client.session().clear()?;
        self.active = None;
        Ok(Navigation::Redirect(PublicPage::Login))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Supplier;
    use crate::testing::{client_with, live_credential, FakeBackend};
    use std::time::Duration;

    fn shell(backend: &FakeBackend, live: bool) -> Shell {
        let client = client_with(backend.clone(), live.then(live_credential));
        Shell::new(client, Notifier::new(Duration::from_secs(5)))
    }

    #[tokio::test]
    async fn unauthorized_navigation_redirects_and_renders_nothing() {
        let backend = FakeBackend::new();
        let mut shell = shell(&backend, false);

        assert_eq!(shell.navigate(Page::Suppliers).await, Navigation::Redirect(PublicPage::Login));
        assert_eq!(shell.active(), None);
        assert!(shell.table::<Supplier>().is_none());
        assert!(shell.notifier().current().is_none());
    }

    #[tokio::test]
    async fn authorized_navigation_renders_page() {
        let backend = FakeBackend::new();
        let mut shell = shell(&backend, true);

        assert_eq!(shell.navigate(Page::Suppliers).await, Navigation::Render(Page::Suppliers));
        assert_eq!(shell.active(), Some(Page::Suppliers));
        assert!(shell.table::<Supplier>().is_some());

        assert_eq!(shell.logout().unwrap(), Navigation::Redirect(PublicPage::Login));
        assert_eq!(shell.navigate(Page::Home).await, Navigation::Redirect(PublicPage::Login));
    }

    #[test]
    fn pages_resolve_from_paths() {
        assert_eq!(Page::from_path("/purchase-orders/"), Some(Page::PurchaseOrders));
        assert_eq!(Page::from_path(""), Some(Page::Home));
        assert_eq!(Page::from_path("/login"), None);
    }
}
