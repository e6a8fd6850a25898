//! Header-card aggregates: portfolio value, market sentiment, top pick.

use crate::data::records::{Holding, Opportunity, SectorSentiment};

use super::sentiment::SentimentTier;

/// Sum of holding values in whole cents.
///
/// Each value is rounded to the cent before summing so the total is exact
/// regardless of how many holdings there are.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn portfolio_value_cents(holdings: &[Holding]) -> i64 {
    holdings
        .iter()
        .map(|h| (h.value * 100.0).round() as i64)
        .sum()
}

/// `$<int>.<2 digits>`; an empty portfolio is `$0.00`.
#[must_use]
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", abs / 100, abs % 100)
}

/// Formatted total portfolio value.
#[must_use]
pub fn portfolio_value(holdings: &[Holding]) -> String {
    format_cents(portfolio_value_cents(holdings))
}

/// Mean of the sector scores, or `None` with no sectors.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_sentiment(sectors: &[SectorSentiment]) -> Option<f64> {
    if sectors.is_empty() {
        return None;
    }
    let total: f64 = sectors.iter().map(|s| s.sentiment).sum();
    Some(total / sectors.len() as f64)
}

/// Bucketed market sentiment.
///
/// With no sectors the mean is undefined and, like any NaN score, falls
/// through every threshold to Very Negative.
#[must_use]
pub fn market_sentiment(sectors: &[SectorSentiment]) -> SentimentTier {
    SentimentTier::classify(average_sentiment(sectors).unwrap_or(f64::NAN))
}

/// First listed opportunity.
#[must_use]
pub fn top_opportunity(opportunities: &[Opportunity]) -> Option<&Opportunity> {
    opportunities.first()
}
