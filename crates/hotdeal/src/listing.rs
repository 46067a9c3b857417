use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::links::{LinkCursor, PostId};
use crate::models::DealRecord;

pub const SHOP_MARKER: &str = "쇼핑몰:";
const POPULAR_MARKER: &str = "인기";
const NOTICE_MARKER: &str = "공지";

static TRAILING_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]$").expect("comment count pattern is valid"));
static LEADING_CATEGORY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[^\]]*\]").expect("category pattern is valid"));

#[derive(Debug, Clone, Copy)]
pub struct ListingOptions<'a> {
    pub site_origin: &'a str,
    pub window_lines: usize,
}

#[derive(Debug, Default)]
pub struct ParsedListing {
    pub deals: Vec<DealRecord>,
    pub unmatched_titles: usize,
    pub unused_links: usize,
}

/// Walks the deal table in the listing's visible text and pairs each title
/// line with the next collected post link.
pub fn parse_listing(text: &str, links: &[PostId], options: &ListingOptions<'_>) -> ParsedListing {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let start = lines
        .iter()
        .position(|line| line.contains(SHOP_MARKER))
        .map(|index| index.saturating_sub(1))
        .unwrap_or(0);
    let end = (start + options.window_lines).min(lines.len());
    let window = &lines[start..end];
    debug!("Scanning {} listing lines from line {}", window.len(), start);

    let mut cursor = LinkCursor::new(links);
    let mut parsed = ParsedListing::default();

    for (index, line) in window.iter().enumerate() {
        if !is_title_line(line) {
            continue;
        }
        let Some(post) = cursor.next_link() else {
            parsed.unmatched_titles += 1;
            continue;
        };

        let info = window
            .get(index + 1)
            .filter(|next| next.contains(SHOP_MARKER))
            .map(|next| next.to_string())
            .unwrap_or_default();

        parsed.deals.push(DealRecord::new(
            clean_title(line),
            comment_count(line),
            info,
            post.absolute(options.site_origin),
        ));
    }

    parsed.unused_links = cursor.remaining();
    if parsed.unmatched_titles > 0 {
        warn!(
            "{} title line(s) had no post link left and were dropped ({} links collected)",
            parsed.unmatched_titles,
            links.len()
        );
    }
    if parsed.unused_links > 0 {
        debug!("{} collected post link(s) were not claimed by a title line", parsed.unused_links);
    }

    parsed
}

/// Bracketed lines are deal titles unless they are section headers or promoted rows.
pub fn is_title_line(line: &str) -> bool {
    line.contains('[')
        && line.contains(']')
        && ![SHOP_MARKER, POPULAR_MARKER, NOTICE_MARKER]
            .iter()
            .any(|excluded| line.contains(excluded))
}

pub fn comment_count(line: &str) -> u32 {
    TRAILING_COUNT
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|count| count.as_str().parse().ok())
        .unwrap_or(0)
}

pub fn clean_title(line: &str) -> String {
    let without_count = TRAILING_COUNT.replace(line, "");
    let without_category = LEADING_CATEGORY.replace(without_count.trim(), "");
    without_category.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://www.fmkorea.com";

    fn options(window_lines: usize) -> ListingOptions<'static> {
        ListingOptions {
            site_origin: ORIGIN,
            window_lines,
        }
    }

    fn posts(paths: &[&str]) -> Vec<PostId> {
        paths.iter().filter_map(|p| PostId::parse(p)).collect()
    }

    #[test]
    fn test_single_deal_with_shop_info() {
        let text = "쇼핑몰: A\n[카테고리] Title One[12]\n쇼핑몰: B";
        let parsed = parse_listing(text, &posts(&["/10"]), &options(60));

        assert_eq!(parsed.deals.len(), 1);
        let deal = &parsed.deals[0];
        assert_eq!(deal.title, "Title One");
        assert_eq!(deal.comments, 12);
        assert_eq!(deal.info, "쇼핑몰: B");
        assert_eq!(deal.link, "https://www.fmkorea.com/10");
        assert!(!deal.sold_out);
        assert!(deal.tags.is_empty());
    }

    #[test]
    fn test_window_starts_one_line_before_shop_marker() {
        let text = "\
            [메뉴] 사이트 헤더\n\
            전체\n\
            [먹거리] 만두 1kg [3]\n\
            쇼핑몰: 쿠팡 / 가격: 9,900원\n\
            [가전] 선풍기\n\
            쇼핑몰: 11번가";
        let parsed = parse_listing(text, &posts(&["/1", "/2", "/3"]), &options(60));

        let titles: Vec<&str> = parsed.deals.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["만두 1kg", "선풍기"]);
        assert_eq!(parsed.deals[0].link, "https://www.fmkorea.com/1");
        assert_eq!(parsed.deals[1].link, "https://www.fmkorea.com/2");
        assert_eq!(parsed.deals[1].comments, 0);
        assert_eq!(parsed.deals[1].info, "쇼핑몰: 11번가");
        assert_eq!(parsed.unused_links, 1);
    }

    #[test]
    fn test_without_shop_marker_window_starts_at_top() {
        let text = "[잡화] 우산 [7]\n그냥 텍스트\n[잡화] 장갑 [2]";
        let parsed = parse_listing(text, &posts(&["/1", "/2"]), &options(60));

        assert_eq!(parsed.deals.len(), 2);
        assert_eq!(parsed.deals[0].info, "");
        assert_eq!(parsed.deals[1].comments, 2);
    }

    #[test]
    fn test_excluded_bracket_lines() {
        let text = "\
            쇼핑몰: 헤더\n\
            [인기] 오늘의 인기글 [99]\n\
            [공지] 운영 공지 [5]\n\
            [쇼핑몰: 광고] 제휴 [1]\n\
            [식품] 진짜 딜 [4]";
        let parsed = parse_listing(text, &posts(&["/1", "/2"]), &options(60));

        assert_eq!(parsed.deals.len(), 1);
        assert_eq!(parsed.deals[0].title, "진짜 딜");
        assert_eq!(parsed.deals[0].link, "https://www.fmkorea.com/1");
    }

    #[test]
    fn test_no_links_produces_no_deals() {
        let text = "쇼핑몰: A\n[a] one [1]\n[b] two [2]";
        let parsed = parse_listing(text, &[], &options(60));

        assert!(parsed.deals.is_empty());
        assert_eq!(parsed.unmatched_titles, 2);
    }

    #[test]
    fn test_never_more_deals_than_links() {
        let text: String = (0..40).map(|i| format!("[c] deal {} [{}]\n", i, i)).collect();
        for link_count in [0, 1, 5, 39, 40, 60] {
            let paths: Vec<String> = (0..link_count).map(|i| format!("/{}", i + 1)).collect();
            let links: Vec<PostId> = paths.iter().filter_map(|p| PostId::parse(p)).collect();

            let parsed = parse_listing(&text, &links, &options(60));
            assert!(parsed.deals.len() <= links.len());
            assert_eq!(parsed.deals.len() + parsed.unmatched_titles, 40);
        }
    }

    #[test]
    fn test_window_bound_limits_scan() {
        let text: String = (0..20).map(|i| format!("[c] deal {}\n", i)).collect();
        let links: Vec<PostId> = (1..=20).filter_map(|i| PostId::parse(&format!("/{}", i))).collect();

        let parsed = parse_listing(&text, &links, &options(5));
        assert_eq!(parsed.deals.len(), 5);
        assert_eq!(parsed.unused_links, 15);
    }

    #[test]
    fn test_info_at_window_edge_is_empty() {
        let text = "[c] last [1]\n쇼핑몰: 밖";
        let parsed = parse_listing(text, &posts(&["/1"]), &options(1));

        assert_eq!(parsed.deals.len(), 1);
        assert_eq!(parsed.deals[0].info, "");
    }

    #[test]
    fn test_comment_count() {
        assert_eq!(comment_count("[c] title [12]"), 12);
        assert_eq!(comment_count("[c] title"), 0);
        assert_eq!(comment_count("[c] title [12] tail"), 0);
        assert_eq!(comment_count("[c] title [99999999999]"), 0);
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("[카테고리] Title One[12]"), "Title One");
        assert_eq!(clean_title("[먹거리] 만두 [1+1] [3]"), "만두 [1+1]");
        assert_eq!(clean_title("no brackets"), "no brackets");
    }

    #[test]
    fn test_is_title_line() {
        assert!(is_title_line("[c] deal"));
        assert!(!is_title_line("plain text"));
        assert!(!is_title_line("[only open"));
        assert!(!is_title_line("[공지] 안내"));
    }
}
