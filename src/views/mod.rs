//! Pages of the client and the state they share.
//!
//! The only cross-page state is the header title. It lives in a
//! [`PageContext`] that is handed to whichever page mounts; the returned
//! [`PageScope`] owns the page's in-flight requests and, when dropped,
//! aborts them and restores the default title.

pub mod analysis;
pub mod auth;
pub mod portfolio;
pub mod stock;
pub mod trends;

use crate::api::ApiError;
use std::future::Future;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::debug;

pub const DEFAULT_TITLE: &str = "Dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Register,
    Portfolio,
    Analysis,
    StockPrediction,
    Trends,
    Chat,
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Page::Login => "Login",
            Page::Register => "Register",
            Page::Portfolio => "Portfolio Dashboard Page",
            Page::Analysis => "AI Analysis Page",
            Page::StockPrediction => "AI Stock Prediction",
            Page::Trends => "Current Trends",
            Page::Chat => "TradeNexus Assistant",
        }
    }
}

/// Holder of the current page title. Cheap to clone; clones share the title.
#[derive(Debug, Clone)]
pub struct PageContext {
    title: watch::Sender<String>,
}

impl Default for PageContext {
    fn default() -> Self {
        Self {
            title: watch::Sender::new(DEFAULT_TITLE.to_string()),
        }
    }
}

impl PageContext {
    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }

    /// Mount `page`: set the title and open a scope for its requests.
    pub fn mount(&self, page: Page) -> PageScope {
        self.title.send_replace(page.title().to_string());
        debug!("Mounted {:?}", page);
        PageScope {
            ctx: self.clone(),
            page,
            tasks: Vec::new(),
        }
    }
}

/// Lifetime of one mounted page.
pub struct PageScope {
    ctx: PageContext,
    page: Page,
    tasks: Vec<AbortHandle>,
}

impl PageScope {
    /// Run `fut` as a task owned by this page. If the page unmounts first the
    /// task is aborted and the caller sees `ApiError::Cancelled`.
    pub async fn run<F, T>(&mut self, fut: F) -> Result<T, ApiError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let handle = tokio::spawn(fut);
        self.tasks.retain(|t| !t.is_finished());
        self.tasks.push(handle.abort_handle());
        handle.await.map_err(|_| ApiError::Cancelled)
    }

    /// Abort everything this page started without waiting.
    pub fn cancel_all(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for PageScope {
    fn drop(&mut self) {
        self.cancel_all();
        // only reset if no other page has replaced the title meanwhile
        self.ctx.title.send_if_modified(|title| {
            if title == self.page.title() {
                *title = DEFAULT_TITLE.to_string();
                true
            } else {
                false
            }
        });
        debug!("Unmounted {:?}", self.page);
    }
}
