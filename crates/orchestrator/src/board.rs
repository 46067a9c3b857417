use common::CrawlerResult;
use hotdeal::HotDealReport;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Updated,
    KeptPrevious,
    NothingYet,
}

/// Last successful report, kept across triggers. A failed run never replaces it.
#[derive(Debug, Default)]
pub struct ReportBoard {
    current: Option<HotDealReport>,
    failed_runs: usize,
}

impl ReportBoard {
    pub fn accept(&mut self, result: CrawlerResult<HotDealReport>) -> SyncOutcome {
        match result {
            Ok(report) => {
                info!("Report updated with {} deals", report.deals.len());
                self.current = Some(report);
                SyncOutcome::Updated
            }
            Err(e) => {
                self.failed_runs += 1;
                warn!("Sync failed, keeping the previous report: {}", e);
                if self.current.is_some() {
                    SyncOutcome::KeptPrevious
                } else {
                    SyncOutcome::NothingYet
                }
            }
        }
    }

    pub fn current(&self) -> Option<&HotDealReport> {
        self.current.as_ref()
    }

    pub fn failed_runs(&self) -> usize {
        self.failed_runs
    }
}
