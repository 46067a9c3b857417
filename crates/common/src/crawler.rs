use async_trait::async_trait;
use crate::error::CrawlerResult;

/// A single-shot source: one `fetch` per trigger, rendered by `format_output`.
#[async_trait]
pub trait DataSource: Send + Sync {
    type Output: Send;

    async fn fetch(&self) -> CrawlerResult<Self::Output>;
    fn format_output(&self, output: &Self::Output) -> String;
    fn name(&self) -> &'static str;
}
