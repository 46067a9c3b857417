pub mod browser;
pub mod config;
pub mod crawler;
pub mod error;
pub mod http_browser;

pub use browser::{AnchorRef, Browser, BrowserEngine, Page, WaitUntil};
pub use config::{Config, HotDealConfig, OutputFormat};
pub use crawler::DataSource;
pub use error::{CrawlerError, CrawlerResult};
pub use http_browser::{HttpBrowser, HttpEngine, HttpPage};
