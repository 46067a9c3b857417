use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, warn};

use crate::browser::{AnchorRef, Browser, BrowserEngine, Page, WaitUntil};
use crate::error::{CrawlerError, CrawlerResult};

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "tbody", "tfoot", "thead", "tr", "ul",
];
const CELL_TAGS: &[&str] = &["td", "th"];
const SKIPPED_TAGS: &[&str] = &["head", "noscript", "script", "style", "template"];

/// Plain HTTP engine: a navigation is one GET, the page is the returned document.
///
/// Both wait conditions resolve once the response body is read, since no
/// scripts run.
pub struct HttpEngine {
    user_agent: String,
}

impl HttpEngine {
    pub fn new(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
        }
    }
}

#[async_trait]
impl BrowserEngine for HttpEngine {
    async fn launch(&self) -> CrawlerResult<Arc<dyn Browser>> {
        Ok(Arc::new(HttpBrowser::launch(&self.user_agent)?))
    }
}

#[derive(Clone)]
pub struct HttpBrowser {
    client: Client,
    open_pages: Arc<AtomicUsize>,
}

impl HttpBrowser {
    pub fn launch(user_agent: &str) -> CrawlerResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(CrawlerError::HttpRequest)?;

        Ok(Self {
            client,
            open_pages: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn open_pages(&self) -> usize {
        self.open_pages.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn new_page(&self) -> CrawlerResult<Box<dyn Page>> {
        self.open_pages.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(HttpPage {
            client: self.client.clone(),
            open_pages: Arc::clone(&self.open_pages),
            state: PageState::Blank,
        }))
    }

    async fn close(&self) -> CrawlerResult<()> {
        let open = self.open_pages();
        if open > 0 {
            warn!("Closing browser session with {} page(s) still open", open);
        } else {
            debug!("Browser session closed");
        }
        Ok(())
    }
}

enum PageState {
    Blank,
    Loaded { html: String },
    Closed,
}

pub struct HttpPage {
    client: Client,
    open_pages: Arc<AtomicUsize>,
    state: PageState,
}

impl HttpPage {
    fn document(&self) -> CrawlerResult<&str> {
        match &self.state {
            PageState::Loaded { html } => Ok(html),
            PageState::Blank => Err(CrawlerError::Navigation {
                url: "about:blank".to_string(),
                reason: "no document loaded".to_string(),
            }),
            PageState::Closed => Err(CrawlerError::PageClosed),
        }
    }
}

#[async_trait]
impl Page for HttpPage {
    async fn goto(&mut self, url: &str, wait_until: WaitUntil, timeout: Duration) -> CrawlerResult<()> {
        if matches!(self.state, PageState::Closed) {
            return Err(CrawlerError::PageClosed);
        }
        debug!("Navigating to {} (wait until {:?})", url, wait_until);

        let html = match tokio::time::timeout(timeout, fetch_document(&self.client, url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(CrawlerError::Timeout {
                    url: url.to_string(),
                    millis: timeout.as_millis(),
                })
            }
        };

        self.state = PageState::Loaded { html };
        Ok(())
    }

    async fn inner_text(&self, selector: &str) -> CrawlerResult<String> {
        render_inner_text(self.document()?, selector)
    }

    async fn anchors(&self, selector: &str) -> CrawlerResult<Vec<AnchorRef>> {
        project_anchors(self.document()?, selector)
    }

    async fn close(&mut self) -> CrawlerResult<()> {
        if !matches!(self.state, PageState::Closed) {
            self.state = PageState::Closed;
            self.open_pages.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

async fn fetch_document(client: &Client, url: &str) -> CrawlerResult<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| CrawlerError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrawlerError::Navigation {
            url: url.to_string(),
            reason: format!("HTTP {}", status),
        });
    }

    Ok(response.text().await?)
}

fn parse_selector(selector: &str) -> CrawlerResult<Selector> {
    Selector::parse(selector)
        .map_err(|e| CrawlerError::HtmlParse(format!("Invalid selector '{}': {}", selector, e)))
}

/// Approximates `innerText` for the first element matching `selector`:
/// blocks and `<br>` break lines, inline runs share a line, whitespace collapses.
pub fn render_inner_text(html: &str, selector: &str) -> CrawlerResult<String> {
    let parsed = parse_selector(selector)?;
    let document = Html::parse_document(html);
    let element = document
        .select(&parsed)
        .next()
        .ok_or_else(|| CrawlerError::HtmlParse(format!("No element matches '{}'", selector)))?;

    let mut raw = String::new();
    push_visible_text(element, &mut raw);

    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

pub fn project_anchors(html: &str, selector: &str) -> CrawlerResult<Vec<AnchorRef>> {
    let parsed = parse_selector(selector)?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&parsed)
        .map(|element| {
            let mut text = String::new();
            push_visible_text(element, &mut text);
            AnchorRef::new(text.trim(), element.attr("href"))
        })
        .collect())
}

fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_collapsed(text, out),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };

                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                } else if CELL_TAGS.contains(&name) {
                    out.push('\t');
                }
                push_visible_text(child_element, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

fn push_collapsed(text: &str, out: &mut String) {
    let words: Vec<&str> = text.split_whitespace().collect();
    let needs_gap = !out.is_empty() && !out.ends_with(char::is_whitespace);

    if words.is_empty() {
        if !text.is_empty() && needs_gap {
            out.push(' ');
        }
        return;
    }

    if text.starts_with(char::is_whitespace) && needs_gap {
        out.push(' ');
    }
    out.push_str(&words.join(" "));
    if text.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}
