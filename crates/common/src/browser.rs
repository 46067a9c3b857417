//! Capability boundary for whatever renders pages.
//!
//! The pipeline only needs to open pages inside one session, navigate them,
//! read their visible text and project anchors into plain data. Any engine
//! that can do that is substitutable.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::CrawlerResult;

/// An `<a>` element projected to plain data, in page source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnchorRef {
    pub text: String,
    pub href: Option<String>,
}

impl AnchorRef {
    pub fn new(text: impl Into<String>, href: Option<&str>) -> Self {
        Self {
            text: text.into(),
            href: href.map(str::to_string),
        }
    }
}

/// When a navigation counts as finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    DomContentLoaded,
    NetworkIdle,
}

#[async_trait]
pub trait BrowserEngine: Send + Sync {
    async fn launch(&self) -> CrawlerResult<Arc<dyn Browser>>;
}

#[async_trait]
pub trait Browser: Send + Sync {
    async fn new_page(&self) -> CrawlerResult<Box<dyn Page>>;

    /// Releases the session. Pages still open at this point are leaked by their owner.
    async fn close(&self) -> CrawlerResult<()>;
}

#[async_trait]
pub trait Page: Send + Sync {
    async fn goto(&mut self, url: &str, wait_until: WaitUntil, timeout: Duration) -> CrawlerResult<()>;

    /// Visible text of the first element matching `selector`, one line per block.
    async fn inner_text(&self, selector: &str) -> CrawlerResult<String>;

    /// Every element matching `selector` as trimmed text plus raw `href`.
    async fn anchors(&self, selector: &str) -> CrawlerResult<Vec<AnchorRef>>;

    async fn close(&mut self) -> CrawlerResult<()>;
}
