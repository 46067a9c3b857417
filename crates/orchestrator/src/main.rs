mod board;

use anyhow::Result;
use board::{ReportBoard, SyncOutcome};
use common::{Config, DataSource};
use hotdeal::HotDealCrawler;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    let _ = dotenv::dotenv();

    // Logs go to stderr so the rendered report owns stdout
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::from_env()?;
    let crawler = HotDealCrawler::new(&config);
    let mut board = ReportBoard::default();

    info!("{} terminal ready. Press Enter to sync, `q` then Enter to quit", crawler.name());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(input) if input.trim().eq_ignore_ascii_case("q") => break,
                    Some(_) => sync(&crawler, &mut board).await,
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received interrupt signal, shutting down...");
                break;
            }
        }
    }

    Ok(())
}

// Runs are awaited inline, so a second trigger waits for the first.
async fn sync(crawler: &HotDealCrawler, board: &mut ReportBoard) {
    info!("Syncing hot deals...");
    match board.accept(crawler.fetch().await) {
        SyncOutcome::Updated | SyncOutcome::KeptPrevious => {
            if let Some(report) = board.current() {
                println!("{}", crawler.format_output(report));
            }
        }
        SyncOutcome::NothingYet => info!("No report to show yet"),
    }
}
