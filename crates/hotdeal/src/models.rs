use serde::Serialize;
use time::OffsetDateTime;

use crate::heat::Heat;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DealRecord {
    pub title: String,
    pub comments: u32,
    /// The shop line under the title, or empty when the listing had none.
    pub info: String,
    pub link: String,
    pub sold_out: bool,
    /// Empty until the post is classified, then one or two tags.
    pub tags: Vec<String>,
}

impl DealRecord {
    pub fn new(title: String, comments: u32, info: String, link: String) -> Self {
        Self {
            title,
            comments,
            info,
            link,
            sold_out: false,
            tags: Vec::new(),
        }
    }

    pub fn apply(&mut self, classification: Classification) {
        self.sold_out = classification.sold_out;
        self.tags = classification.tags;
    }

    pub fn heat(&self) -> Heat {
        Heat::assess(self.comments, self.sold_out)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub sold_out: bool,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct HotDealReport {
    pub fetched_at: OffsetDateTime,
    pub deals: Vec<DealRecord>,
    /// Title lines dropped because every collected post link was already used.
    pub unmatched_titles: usize,
    /// Collected post links no title line claimed.
    pub unused_links: usize,
}

impl HotDealReport {
    pub fn new(deals: Vec<DealRecord>, unmatched_titles: usize, unused_links: usize) -> Self {
        Self {
            fetched_at: OffsetDateTime::now_utc(),
            deals,
            unmatched_titles,
            unused_links,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.deals.is_empty()
    }
}
