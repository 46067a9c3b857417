use std::fmt;
use std::sync::LazyLock;

use common::AnchorRef;
use regex::Regex;

/// Text of the announcement link that precedes the real deal links in page order.
pub const MARKER_PHRASE: &str = "핫딜게시판 통합공지사항";

static POST_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/\d+$").expect("post path pattern is valid"));

/// Site-relative path of a single post, always shaped like `/12345`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostId(String);

impl PostId {
    pub fn parse(href: &str) -> Option<Self> {
        POST_PATH.is_match(href).then(|| Self(href.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn absolute(&self, origin: &str) -> String {
        format!("{}{}", origin.trim_end_matches('/'), self.0)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collects post links that follow the marker anchor, dropping back-to-back
/// repeats (thumbnail and title usually link to the same post).
///
/// The marker anchor itself is eligible when its own href is a post path.
pub fn collect_post_links(anchors: &[AnchorRef], marker: &str) -> Vec<PostId> {
    let mut links: Vec<PostId> = Vec::new();
    let mut found_marker = false;

    for anchor in anchors {
        if anchor.text.contains(marker) {
            found_marker = true;
        }
        if !found_marker {
            continue;
        }

        let Some(post) = anchor.href.as_deref().and_then(PostId::parse) else {
            continue;
        };
        if links.last() != Some(&post) {
            links.push(post);
        }
    }

    links
}

/// Hands out collected links strictly in order, one per matched title line.
///
/// Title lines and links advance together; whatever is left on either side
/// once the listing is walked is a correlation mismatch worth reporting.
#[derive(Debug)]
pub struct LinkCursor<'a> {
    links: &'a [PostId],
    position: usize,
}

impl<'a> LinkCursor<'a> {
    pub fn new(links: &'a [PostId]) -> Self {
        Self { links, position: 0 }
    }

    pub fn next_link(&mut self) -> Option<&'a PostId> {
        let link = self.links.get(self.position)?;
        self.position += 1;
        Some(link)
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.links.len()
    }

    pub fn consumed(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.links.len() - self.position
    }
}
