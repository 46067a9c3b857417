use crate::models::Classification;

const SOLD_OUT_PHRASES: &[&str] = &["품절", "종료", "끝났", "다 나갔"];
const PRICE_PRAISE_PHRASES: &[&str] = &["싸다", "역대급", "최저가"];
const FRENZY_PHRASES: &[&str] = &["지름", "탑승", "삼"];

pub const PRICE_WIN_TAG: &str = "💰 가격대박";
pub const IMPULSE_BUY_TAG: &str = "🛒 무지성구매";
pub const WATCHING_TAG: &str = "💬 관망중";
pub const PENDING_TAG: &str = "⚪ 분석대기";

const MAX_TAGS: usize = 2;

fn mentions_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| text.contains(phrase))
}

/// Keyword read of a post body: sold-out status plus up to two sentiment tags.
pub fn classify(text: &str) -> Classification {
    let mut tags = Vec::with_capacity(MAX_TAGS);
    if mentions_any(text, PRICE_PRAISE_PHRASES) {
        tags.push(PRICE_WIN_TAG.to_string());
    }
    if mentions_any(text, FRENZY_PHRASES) {
        tags.push(IMPULSE_BUY_TAG.to_string());
    }
    if tags.is_empty() {
        tags.push(WATCHING_TAG.to_string());
    }
    tags.truncate(MAX_TAGS);

    Classification {
        sold_out: mentions_any(text, SOLD_OUT_PHRASES),
        tags,
    }
}

/// Outcome of analyzing one post. A failed fetch is a value, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostAnalysis {
    Analyzed(Classification),
    Degraded { reason: String },
}

impl PostAnalysis {
    pub fn from_text(text: &str) -> Self {
        PostAnalysis::Analyzed(classify(text))
    }

    pub fn degraded(reason: impl Into<String>) -> Self {
        PostAnalysis::Degraded {
            reason: reason.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, PostAnalysis::Degraded { .. })
    }

    pub fn into_classification(self) -> Classification {
        match self {
            PostAnalysis::Analyzed(classification) => classification,
            PostAnalysis::Degraded { .. } => Classification {
                sold_out: false,
                tags: vec![PENDING_TAG.to_string()],
            },
        }
    }
}
