pub mod classifier;
pub mod heat;
pub mod links;
pub mod listing;
pub mod models;
pub mod render;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{
    AnchorRef, Browser, BrowserEngine, Config, CrawlerError, CrawlerResult, DataSource,
    HotDealConfig, HttpEngine, OutputFormat, Page, WaitUntil,
};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

pub use classifier::{classify, PostAnalysis};
pub use heat::{FireTier, Heat, Verdict};
pub use links::{collect_post_links, LinkCursor, PostId, MARKER_PHRASE};
pub use listing::{parse_listing, ListingOptions, ParsedListing};
pub use models::{Classification, DealRecord, HotDealReport};
pub use render::{render_json, render_markdown};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Fetching,
    FetchFailed,
    ListParsed,
    Classifying,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Idle => "idle",
            RunPhase::Fetching => "fetching",
            RunPhase::FetchFailed => "fetch-failed",
            RunPhase::ListParsed => "list-parsed",
            RunPhase::Classifying => "classifying",
            RunPhase::Done => "done",
        };
        f.write_str(name)
    }
}

fn enter(phase: RunPhase) {
    debug!("Hot deal run entering {}", phase);
}

struct ListingSnapshot {
    text: String,
    anchors: Vec<AnchorRef>,
}

/// One trigger, one run: fetch the listing, parse it, analyze the leading
/// posts concurrently, and hand back the finished report. Nothing survives
/// between runs.
pub struct HotDealCrawler {
    engine: Arc<dyn BrowserEngine>,
    config: HotDealConfig,
    output: OutputFormat,
}

impl HotDealCrawler {
    pub fn new(config: &Config) -> Self {
        Self::with_engine(Arc::new(HttpEngine::new(&config.user_agent)), config.hot_deal.clone())
            .with_output(config.output)
    }

    pub fn with_engine(engine: Arc<dyn BrowserEngine>, config: HotDealConfig) -> Self {
        Self {
            engine,
            config,
            output: OutputFormat::default(),
        }
    }

    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }

    pub async fn run(&self) -> CrawlerResult<HotDealReport> {
        enter(RunPhase::Fetching);
        info!("Fetching hot deal listing from {}", self.config.listing_url);

        let browser = match self.engine.launch().await {
            Ok(browser) => browser,
            Err(e) => {
                enter(RunPhase::FetchFailed);
                return Err(self.fetch_failed(e));
            }
        };

        let outcome = self.run_session(&browser).await;
        if let Err(e) = browser.close().await {
            warn!("Failed to close browser session: {}", e);
        }

        match &outcome {
            Ok(report) => {
                enter(RunPhase::Done);
                info!(
                    "Hot deal run finished with {} deals ({} dropped titles, {} unused links)",
                    report.deals.len(),
                    report.unmatched_titles,
                    report.unused_links
                );
            }
            Err(e) => {
                enter(RunPhase::FetchFailed);
                warn!("Hot deal run failed: {}", e);
            }
        }
        enter(RunPhase::Idle);
        outcome
    }

    async fn run_session(&self, browser: &Arc<dyn Browser>) -> CrawlerResult<HotDealReport> {
        let snapshot = self
            .fetch_listing(browser.as_ref())
            .await
            .map_err(|e| self.fetch_failed(e))?;

        let links = collect_post_links(&snapshot.anchors, MARKER_PHRASE);
        let options = ListingOptions {
            site_origin: &self.config.site_origin,
            window_lines: self.config.window_lines,
        };
        let parsed = parse_listing(&snapshot.text, &links, &options);
        enter(RunPhase::ListParsed);
        info!(
            "Parsed {} deals from {} anchors ({} post links)",
            parsed.deals.len(),
            snapshot.anchors.len(),
            links.len()
        );

        let mut deals = parsed.deals;
        let batch = deals.len().min(self.config.max_analyzed);
        enter(RunPhase::Classifying);

        let urls: Vec<String> = deals[..batch].iter().map(|deal| deal.link.clone()).collect();
        let analyses = analyze_batch(browser, urls, self.config.post_timeout).await;
        for (deal, analysis) in deals.iter_mut().zip(analyses) {
            deal.apply(analysis.into_classification());
        }

        Ok(HotDealReport::new(deals, parsed.unmatched_titles, parsed.unused_links))
    }

    async fn fetch_listing(&self, browser: &dyn Browser) -> CrawlerResult<ListingSnapshot> {
        let mut page = browser.new_page().await?;
        let snapshot = read_listing(page.as_mut(), &self.config).await;
        if let Err(e) = page.close().await {
            warn!("Failed to close listing page: {}", e);
        }
        snapshot
    }

    fn fetch_failed(&self, error: CrawlerError) -> CrawlerError {
        CrawlerError::FetchFailed {
            url: self.config.listing_url.clone(),
            reason: error.to_string(),
        }
    }
}

async fn read_listing(page: &mut dyn Page, config: &HotDealConfig) -> CrawlerResult<ListingSnapshot> {
    page.goto(&config.listing_url, WaitUntil::NetworkIdle, config.listing_timeout)
        .await?;
    let text = page.inner_text("body").await?;
    let anchors = page.anchors("a").await?;
    Ok(ListingSnapshot { text, anchors })
}

/// Analyzes every url concurrently, one page per task. The returned vector is
/// index-aligned with `urls`; a task that dies leaves its slot degraded.
pub async fn analyze_batch(
    browser: &Arc<dyn Browser>,
    urls: Vec<String>,
    timeout: Duration,
) -> Vec<PostAnalysis> {
    let mut results: Vec<PostAnalysis> = urls
        .iter()
        .map(|_| PostAnalysis::degraded("analysis task did not finish"))
        .collect();

    let mut tasks = JoinSet::new();
    for (index, url) in urls.into_iter().enumerate() {
        let browser = Arc::clone(browser);
        tasks.spawn(async move {
            let analysis = analyze_post(browser.as_ref(), &url, timeout).await;
            (index, analysis)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, analysis)) => results[index] = analysis,
            Err(e) => warn!("Post analysis task failed: {}", e),
        }
    }

    let degraded = results.iter().filter(|analysis| analysis.is_degraded()).count();
    info!("Analyzed {} posts ({} degraded)", results.len(), degraded);
    results
}

/// Opens a page, reads the post, always closes the page. Never fails.
pub async fn analyze_post(browser: &dyn Browser, url: &str, timeout: Duration) -> PostAnalysis {
    let mut page = match browser.new_page().await {
        Ok(page) => page,
        Err(e) => {
            warn!("Could not open a page for {}: {}", url, e);
            return PostAnalysis::degraded(e.to_string());
        }
    };

    let text = read_post(page.as_mut(), url, timeout).await;
    if let Err(e) = page.close().await {
        debug!("Failed to close page for {}: {}", url, e);
    }

    match text {
        Ok(text) => PostAnalysis::from_text(&text),
        Err(e) => {
            warn!("Post {} left unanalyzed: {}", url, e);
            PostAnalysis::degraded(e.to_string())
        }
    }
}

async fn read_post(page: &mut dyn Page, url: &str, timeout: Duration) -> CrawlerResult<String> {
    page.goto(url, WaitUntil::DomContentLoaded, timeout).await?;
    page.inner_text("body").await
}

#[async_trait]
impl DataSource for HotDealCrawler {
    type Output = HotDealReport;

    async fn fetch(&self) -> CrawlerResult<HotDealReport> {
        self.run().await
    }

    fn format_output(&self, report: &HotDealReport) -> String {
        match self.output {
            OutputFormat::Markdown => render_markdown(report),
            OutputFormat::Json => render_json(report).unwrap_or_else(|e| {
                warn!("JSON rendering failed, falling back to markdown: {}", e);
                render_markdown(report)
            }),
        }
    }

    fn name(&self) -> &'static str {
        "Hot Deal"
    }
}

pub async fn run_hotdeal_crawler() -> anyhow::Result<String> {
    let _ = dotenv::dotenv();
    let config = Config::from_env()?;
    let crawler = HotDealCrawler::new(&config);
    let report = crawler.fetch().await?;
    Ok(crawler.format_output(&report))
}
