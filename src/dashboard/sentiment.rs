//! Five-tier sentiment bucketing shared by every sentiment badge.

#![allow(missing_docs)]

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SentimentTier {
    VeryPositive,
    Positive,
    Neutral,
    Negative,
    VeryNegative,
}

/// Badge color for a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TierColor {
    Green,
    Lime,
    Gray,
    Orange,
    Red,
}

impl SentimentTier {
    /// Bucket a score in `[-1, 1]`.
    ///
    /// Boundaries are strict: exactly `0.5` is Positive, exactly `-0.5` is
    /// Very Negative. NaN fails every comparison and lands in Very Negative.
    #[must_use]
    pub fn classify(score: f64) -> Self {
        if score > 0.5 {
            Self::VeryPositive
        } else if score > 0.0 {
            Self::Positive
        } else if score == 0.0 {
            Self::Neutral
        } else if score > -0.5 {
            Self::Negative
        } else {
            Self::VeryNegative
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryPositive => "Very Positive",
            Self::Positive => "Positive",
            Self::Neutral => "Neutral",
            Self::Negative => "Negative",
            Self::VeryNegative => "Very Negative",
        }
    }

    #[must_use]
    pub const fn color(self) -> TierColor {
        match self {
            Self::VeryPositive => TierColor::Green,
            Self::Positive => TierColor::Lime,
            Self::Neutral => TierColor::Gray,
            Self::Negative => TierColor::Orange,
            Self::VeryNegative => TierColor::Red,
        }
    }
}

impl fmt::Display for SentimentTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TierColor {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Lime => "lime",
            Self::Gray => "gray",
            Self::Orange => "orange",
            Self::Red => "red",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_scores_bucket_as_documented() {
        let cases = [
            (0.9, SentimentTier::VeryPositive),
            (0.3, SentimentTier::Positive),
            (0.0, SentimentTier::Neutral),
            (-0.3, SentimentTier::Negative),
            (-0.9, SentimentTier::VeryNegative),
        ];
        for (score, tier) in cases {
            assert_eq!(SentimentTier::classify(score), tier, "score {score}");
        }
    }

    #[test]
    fn boundaries_are_strict() {
        assert_eq!(SentimentTier::classify(0.5), SentimentTier::Positive);
        assert_eq!(SentimentTier::classify(-0.5), SentimentTier::VeryNegative);
        assert_eq!(SentimentTier::classify(-0.0), SentimentTier::Neutral);
    }

    #[test]
    fn nan_is_very_negative() {
        assert_eq!(SentimentTier::classify(f64::NAN), SentimentTier::VeryNegative);
    }

    #[test]
    fn colors_follow_tiers() {
        assert_eq!(SentimentTier::VeryPositive.color(), TierColor::Green);
        assert_eq!(SentimentTier::Positive.color(), TierColor::Lime);
        assert_eq!(SentimentTier::Neutral.color(), TierColor::Gray);
        assert_eq!(SentimentTier::Negative.color(), TierColor::Orange);
        assert_eq!(SentimentTier::VeryNegative.color(), TierColor::Red);
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(SentimentTier::VeryNegative.to_string(), "Very Negative");
    }
}
