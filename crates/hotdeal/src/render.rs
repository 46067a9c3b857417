use common::{CrawlerError, CrawlerResult};
use serde::Serialize;
use time::OffsetDateTime;

use crate::heat::Heat;
use crate::models::{DealRecord, HotDealReport};

const SOLD_OUT_LABEL: &str = "[종료]";

pub fn render_markdown(report: &HotDealReport) -> String {
    let mut content = String::new();
    content.push_str("# 🔥 Dealstock Hot Deals\n\n");
    content.push_str(&format!("*Fetched on {}*\n\n", report.fetched_at.date()));

    if report.deals.is_empty() {
        content.push_str("No deals found.\n");
    } else {
        content.push_str("| # | Deal / Tags | Heat | Verdict |\n");
        content.push_str("|---|-------------|------|---------|\n");
        for (index, deal) in report.deals.iter().enumerate() {
            content.push_str(&render_row(index + 1, deal));
        }
    }

    if report.unmatched_titles > 0 {
        content.push_str(&format!(
            "\n> {} listed deal(s) had no matching post link and were left out.\n",
            report.unmatched_titles
        ));
    }

    content
}

fn render_row(rank: usize, deal: &DealRecord) -> String {
    let heat = deal.heat();

    let mut cell = String::new();
    if deal.sold_out {
        cell.push_str(SOLD_OUT_LABEL);
        cell.push(' ');
    }
    cell.push_str(&format!("[{}]({})", escape_cell(&deal.title), deal.link));
    if !deal.tags.is_empty() {
        let tags: Vec<String> = deal.tags.iter().map(|t| format!("`{}`", t)).collect();
        cell.push_str("<br>");
        cell.push_str(&tags.join(" "));
    }
    if !deal.info.is_empty() {
        cell.push_str("<br>");
        cell.push_str(&escape_cell(&deal.info));
    }

    format!(
        "| {} | {} | {} {:.1}pt | {} |\n",
        rank,
        cell,
        heat.tier.icons(),
        heat.score,
        heat.verdict.label()
    )
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('[', "\\[").replace(']', "\\]")
}

#[derive(Serialize)]
struct ScoredDeal<'a> {
    #[serde(flatten)]
    deal: &'a DealRecord,
    heat: Heat,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(with = "time::serde::iso8601")]
    fetched_at: OffsetDateTime,
    unmatched_titles: usize,
    unused_links: usize,
    deals: Vec<ScoredDeal<'a>>,
}

pub fn render_json(report: &HotDealReport) -> CrawlerResult<String> {
    let json = JsonReport {
        fetched_at: report.fetched_at,
        unmatched_titles: report.unmatched_titles,
        unused_links: report.unused_links,
        deals: report
            .deals
            .iter()
            .map(|deal| ScoredDeal {
                deal,
                heat: deal.heat(),
            })
            .collect(),
    };

    serde_json::to_string_pretty(&json)
        .map_err(|e| CrawlerError::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal(title: &str, comments: u32, sold_out: bool, tags: &[&str]) -> DealRecord {
        let mut deal = DealRecord::new(
            title.to_string(),
            comments,
            "쇼핑몰: 쿠팡".to_string(),
            "https://www.fmkorea.com/1".to_string(),
        );
        deal.sold_out = sold_out;
        deal.tags = tags.iter().map(|t| t.to_string()).collect();
        deal
    }

    #[test]
    fn test_markdown_row_for_hot_deal() {
        let report = HotDealReport::new(vec![deal("만두 1kg", 40, false, &["💰 가격대박"])], 0, 0);
        let markdown = render_markdown(&report);

        assert!(markdown.contains("| 1 | [만두 1kg](https://www.fmkorea.com/1)<br>`💰 가격대박`<br>쇼핑몰: 쿠팡 | 🔥🔥🔥 80.0pt | 🟢 매수 |"));
        assert!(!markdown.contains("left out"));
    }

    #[test]
    fn test_markdown_marks_sold_out() {
        let report = HotDealReport::new(vec![deal("우산", 5, true, &["💬 관망중"])], 0, 0);
        let markdown = render_markdown(&report);

        assert!(markdown.contains("[종료] [우산]"));
        assert!(markdown.contains("🔥 10.0pt | 🔴 매도"));
    }

    #[test]
    fn test_markdown_escapes_table_syntax() {
        let report = HotDealReport::new(vec![deal("a | b [1+1]", 0, false, &[])], 0, 0);
        let markdown = render_markdown(&report);

        assert!(markdown.contains("[a \\| b \\[1+1\\]]"));
    }

    #[test]
    fn test_markdown_empty_and_dropped() {
        let report = HotDealReport::new(Vec::new(), 3, 0);
        let markdown = render_markdown(&report);

        assert!(markdown.contains("No deals found."));
        assert!(markdown.contains("3 listed deal(s) had no matching post link"));
    }

    #[test]
    fn test_json_includes_heat() {
        let report = HotDealReport::new(vec![deal("만두", 25, false, &["💬 관망중"])], 0, 2);
        let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();

        assert_eq!(json["unused_links"], 2);
        assert_eq!(json["deals"][0]["title"], "만두");
        assert_eq!(json["deals"][0]["comments"], 25);
        assert_eq!(json["deals"][0]["heat"]["score"], 50.0);
        assert_eq!(json["deals"][0]["heat"]["verdict"], "watch");
        assert_eq!(json["deals"][0]["heat"]["tier"], "warm");
        assert!(json["fetched_at"].is_string());
    }
}
