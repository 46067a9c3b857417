use serde::Serialize;

/// Comment count that maps to a full heat score.
pub const FULL_HEAT_COMMENTS: f64 = 50.0;

const WARM_FROM: f64 = 30.0;
const BLAZING_FROM: f64 = 70.0;
const BUY_ABOVE: f64 = 60.0;

pub fn heat_score(comments: u32) -> f64 {
    (f64::from(comments) * 100.0 / FULL_HEAT_COMMENTS).min(100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FireTier {
    Low = 1,
    Warm = 2,
    Blazing = 3,
}

impl FireTier {
    pub fn for_score(score: f64) -> Self {
        if score < WARM_FROM {
            FireTier::Low
        } else if score < BLAZING_FROM {
            FireTier::Warm
        } else {
            FireTier::Blazing
        }
    }

    pub fn icon_count(self) -> usize {
        self as usize
    }

    pub fn icons(self) -> String {
        "🔥".repeat(self.icon_count())
    }
}

// Buy uses a lower threshold than the top fire tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Sell,
    Watch,
    Buy,
}

impl Verdict {
    pub fn decide(score: f64, sold_out: bool) -> Self {
        if sold_out {
            Verdict::Sell
        } else if score > BUY_ABOVE {
            Verdict::Buy
        } else {
            Verdict::Watch
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::Sell => "🔴 매도",
            Verdict::Buy => "🟢 매수",
            Verdict::Watch => "⚪ 관망",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Heat {
    pub score: f64,
    pub tier: FireTier,
    pub verdict: Verdict,
}

impl Heat {
    pub fn assess(comments: u32, sold_out: bool) -> Self {
        let score = heat_score(comments);
        Self {
            score,
            tier: FireTier::for_score(score),
            verdict: Verdict::decide(score, sold_out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heat_score_is_twice_comments_capped() {
        assert_eq!(heat_score(0), 0.0);
        assert_eq!(heat_score(3), 6.0);
        assert_eq!(heat_score(25), 50.0);
        assert_eq!(heat_score(50), 100.0);
        assert_eq!(heat_score(51), 100.0);
        assert_eq!(heat_score(1000), 100.0);
        assert_eq!(heat_score(u32::MAX), 100.0);
    }

    #[test]
    fn test_fire_tier_boundaries() {
        assert_eq!(FireTier::for_score(0.0), FireTier::Low);
        assert_eq!(FireTier::for_score(29.0), FireTier::Low);
        assert_eq!(FireTier::for_score(30.0), FireTier::Warm);
        assert_eq!(FireTier::for_score(69.0), FireTier::Warm);
        assert_eq!(FireTier::for_score(70.0), FireTier::Blazing);
        assert_eq!(FireTier::for_score(100.0), FireTier::Blazing);
    }

    #[test]
    fn test_fire_tier_monotonic() {
        let mut previous = FireTier::Low;
        for comments in 0..=60 {
            let tier = FireTier::for_score(heat_score(comments));
            assert!(tier >= previous, "tier dropped at {} comments", comments);
            previous = tier;
        }
    }

    #[test]
    fn test_fire_icons() {
        assert_eq!(FireTier::Low.icons(), "🔥");
        assert_eq!(FireTier::Warm.icons(), "🔥🔥");
        assert_eq!(FireTier::Blazing.icons(), "🔥🔥🔥");
    }

    #[test]
    fn test_verdict_boundaries() {
        assert_eq!(Verdict::decide(60.0, false), Verdict::Watch);
        assert_eq!(Verdict::decide(61.0, false), Verdict::Buy);
        assert_eq!(Verdict::decide(0.0, false), Verdict::Watch);
    }

    #[test]
    fn test_sold_out_always_sells() {
        assert_eq!(Verdict::decide(100.0, true), Verdict::Sell);
        assert_eq!(Verdict::decide(0.0, true), Verdict::Sell);
    }

    #[test]
    fn test_verdict_and_tier_thresholds_differ() {
        // 32 comments: buy, but still two fires
        let heat = Heat::assess(32, false);
        assert_eq!(heat.score, 64.0);
        assert_eq!(heat.verdict, Verdict::Buy);
        assert_eq!(heat.tier, FireTier::Warm);
    }

    #[test]
    fn test_assess_is_pure() {
        assert_eq!(Heat::assess(17, false), Heat::assess(17, false));
        assert_eq!(Heat::assess(17, true), Heat::assess(17, true));
    }
}
