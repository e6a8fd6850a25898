//! Fixture keys, payloads, and the static fixture source.
//!
//! The dashboard has no backend: every data set is a hard-coded table chosen
//! purely by matching the key string. [`FixtureSource`] is the seam a real
//! backend would plug into.

#![allow(missing_docs)]

use std::fmt;
use std::str::FromStr;

use crate::core::errors::Result;
use crate::data::records::{
    ChartPoint, ChatMessage, Holding, Opportunity, RelatedOpportunity, SectorSentiment,
    StockSentiment,
};
use crate::data::service::QueryParams;

// ──────────────────── keys ────────────────────

/// The eight data sets the dashboard consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixtureKey {
    Portfolio,
    Opportunities,
    SectorSentiments,
    StockSentiments,
    PerformanceData,
    DiversificationData,
    Messages,
    RelatedOpportunities,
}

impl FixtureKey {
    /// Every key, in the order the view requests them at mount.
    pub const ALL: [Self; 8] = [
        Self::Portfolio,
        Self::Opportunities,
        Self::SectorSentiments,
        Self::StockSentiments,
        Self::PerformanceData,
        Self::DiversificationData,
        Self::Messages,
        Self::RelatedOpportunities,
    ];

    /// Keys that gate the initial render. Related opportunities load at
    /// mount too but never block the view.
    pub const REQUIRED: [Self; 7] = [
        Self::Portfolio,
        Self::Opportunities,
        Self::SectorSentiments,
        Self::StockSentiments,
        Self::PerformanceData,
        Self::DiversificationData,
        Self::Messages,
    ];

    /// Wire name of the data set.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Portfolio => "portfolio",
            Self::Opportunities => "opportunities",
            Self::SectorSentiments => "sectorSentiments",
            Self::StockSentiments => "stockSentiments",
            Self::PerformanceData => "performanceData",
            Self::DiversificationData => "diversificationData",
            Self::Messages => "messages",
            Self::RelatedOpportunities => "relatedOpportunities",
        }
    }
}

impl fmt::Display for FixtureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FixtureKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown fixture key {s:?}"))
    }
}

// ──────────────────── payloads ────────────────────

/// Resolved contents of one data set.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Holdings(Vec<Holding>),
    Opportunities(Vec<Opportunity>),
    SectorSentiments(Vec<SectorSentiment>),
    StockSentiments(Vec<StockSentiment>),
    Chart(Vec<ChartPoint>),
    Messages(Vec<ChatMessage>),
    RelatedOpportunities(Vec<RelatedOpportunity>),
    /// Result for keys the source does not know.
    Empty,
}

impl Payload {
    /// Number of rows carried by the payload.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Holdings(rows) => rows.len(),
            Self::Opportunities(rows) => rows.len(),
            Self::SectorSentiments(rows) => rows.len(),
            Self::StockSentiments(rows) => rows.len(),
            Self::Chart(rows) => rows.len(),
            Self::Messages(rows) => rows.len(),
            Self::RelatedOpportunities(rows) => rows.len(),
            Self::Empty => 0,
        }
    }

    /// True when the payload has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Typed view over a [`Payload`] variant.
///
/// Lets callers of the data service work with `Vec<Holding>` and friends
/// instead of matching on payload variants.
pub trait FixtureData: Clone {
    /// Borrow the typed rows if the payload holds this type.
    fn from_payload(payload: &Payload) -> Option<&Self>;
    /// Wrap typed rows back into a payload.
    fn into_payload(self) -> Payload;
}

macro_rules! fixture_data {
    ($ty:ty, $variant:ident) => {
        impl FixtureData for $ty {
            fn from_payload(payload: &Payload) -> Option<&Self> {
                match payload {
                    Payload::$variant(rows) => Some(rows),
                    _ => None,
                }
            }

            fn into_payload(self) -> Payload {
                Payload::$variant(self)
            }
        }
    };
}

fixture_data!(Vec<Holding>, Holdings);
fixture_data!(Vec<Opportunity>, Opportunities);
fixture_data!(Vec<SectorSentiment>, SectorSentiments);
fixture_data!(Vec<StockSentiment>, StockSentiments);
fixture_data!(Vec<ChartPoint>, Chart);
fixture_data!(Vec<ChatMessage>, Messages);
fixture_data!(Vec<RelatedOpportunity>, RelatedOpportunities);

// ──────────────────── sources ────────────────────

/// Producer of fixture payloads.
///
/// Errors returned here land in the requesting slot's error state.
pub trait FixtureSource: fmt::Debug + Send {
    fn produce(&self, key: &str, params: &QueryParams) -> Result<Payload>;
}

/// The built-in hard-coded data. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticFixtures;

impl FixtureSource for StaticFixtures {
    fn produce(&self, key: &str, _params: &QueryParams) -> Result<Payload> {
        Ok(static_payload(key))
    }
}

/// Look up the static payload for a key string. Unknown keys give
/// [`Payload::Empty`].
#[must_use]
pub fn static_payload(key: &str) -> Payload {
    let Ok(key) = key.parse::<FixtureKey>() else {
        return Payload::Empty;
    };
    match key {
        FixtureKey::Portfolio => Payload::Holdings(portfolio()),
        FixtureKey::Opportunities => Payload::Opportunities(opportunities()),
        FixtureKey::SectorSentiments => Payload::SectorSentiments(sector_sentiments()),
        FixtureKey::StockSentiments => Payload::StockSentiments(stock_sentiments()),
        FixtureKey::PerformanceData => Payload::Chart(performance_data()),
        FixtureKey::DiversificationData => Payload::Chart(diversification_data()),
        FixtureKey::Messages => Payload::Messages(vec![ChatMessage::assistant(GREETING)]),
        FixtureKey::RelatedOpportunities => {
            Payload::RelatedOpportunities(related_opportunities())
        }
    }
}

/// Opening line of the advisor transcript.
pub const GREETING: &str = "Hello! I'm your AI financial advisor. How can I help you today?";

fn holding(symbol: &str, name: &str, shares: u32, value: f64, allocation: f64) -> Holding {
    Holding {
        symbol: symbol.to_string(),
        name: name.to_string(),
        shares,
        value,
        allocation,
    }
}

fn portfolio() -> Vec<Holding> {
    vec![
        holding("AAPL", "Apple Inc.", 10, 1500.0, 30.0),
        holding("MSFT", "Microsoft Corporation", 8, 2000.0, 40.0),
        holding("GOOGL", "Alphabet Inc.", 5, 1000.0, 20.0),
        holding("AMZN", "Amazon.com Inc.", 2, 500.0, 10.0),
    ]
}

fn opportunity(symbol: &str, name: &str, sector: &str, growth: f64, potential: f64) -> Opportunity {
    Opportunity {
        symbol: symbol.to_string(),
        name: name.to_string(),
        sector: sector.to_string(),
        growth,
        potential,
    }
}

fn opportunities() -> Vec<Opportunity> {
    vec![
        opportunity("NVDA", "NVIDIA Corporation", "Technology", 125.0, 85.0),
        opportunity("TSLA", "Tesla, Inc.", "Automotive", 75.0, 70.0),
        opportunity("PLTR", "Palantir Technologies", "Software", 60.0, 80.0),
    ]
}

fn sector_sentiments() -> Vec<SectorSentiment> {
    [("Technology", 0.7, 1500), ("Healthcare", 0.3, 1200), ("Finance", -0.2, 1000)]
        .into_iter()
        .map(|(name, sentiment, comments)| SectorSentiment {
            name: name.to_string(),
            sentiment,
            comments,
        })
        .collect()
}

fn stock_sentiments() -> Vec<StockSentiment> {
    vec![
        StockSentiment {
            symbol: "AAPL".to_string(),
            name: "Apple Inc.".to_string(),
            sentiment: 0.8,
            comments: 500,
            recent_comments: vec![
                "Great new product lineup!".to_string(),
                "Concerned about supply chain issues".to_string(),
                "Strong financials this quarter".to_string(),
            ],
        },
        StockSentiment {
            symbol: "MSFT".to_string(),
            name: "Microsoft Corporation".to_string(),
            sentiment: 0.6,
            comments: 450,
            recent_comments: vec![
                "Cloud business is booming".to_string(),
                "Potential antitrust issues".to_string(),
                "Excited about AI integrations".to_string(),
            ],
        },
    ]
}

fn performance_data() -> Vec<ChartPoint> {
    vec![
        ChartPoint::new("Jan", 1000.0),
        ChartPoint::new("Feb", 1200.0),
        ChartPoint::new("Mar", 1100.0),
        ChartPoint::new("Apr", 1300.0),
        ChartPoint::new("May", 1600.0),
        ChartPoint::new("Jun", 1800.0),
    ]
}

fn diversification_data() -> Vec<ChartPoint> {
    vec![
        ChartPoint::new("Technology", 40.0),
        ChartPoint::new("Healthcare", 20.0),
        ChartPoint::new("Finance", 15.0),
        ChartPoint::new("Consumer Goods", 15.0),
        ChartPoint::new("Energy", 10.0),
    ]
}

fn related_opportunities() -> Vec<RelatedOpportunity> {
    vec![
        RelatedOpportunity {
            symbol: "CARR".to_string(),
            name: "Carrier Global Corporation".to_string(),
            sector: "HVAC".to_string(),
            relation: "Provides cooling systems for AI data centers".to_string(),
            growth: 40.0,
        },
        RelatedOpportunity {
            symbol: "EQIX".to_string(),
            name: "Equinix, Inc.".to_string(),
            sector: "Data Centers".to_string(),
            relation: "Operates data centers used for AI computing".to_string(),
            growth: 35.0,
        },
    ]
}

/// Client risk-profile split shown to advisors on the portfolio tab.
#[must_use]
pub fn client_risk_profiles() -> Vec<ChartPoint> {
    vec![
        ChartPoint::new("Conservative", 30.0),
        ChartPoint::new("Moderate", 45.0),
        ChartPoint::new("Aggressive", 25.0),
    ]
}

/// Shareholder mix shown to investor-relations users on the portfolio tab.
#[must_use]
pub fn investor_mix() -> Vec<ChartPoint> {
    vec![
        ChartPoint::new("Institutional", 70.0),
        ChartPoint::new("Retail", 30.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_key_has_rows() {
        for key in FixtureKey::ALL {
            let payload = static_payload(key.as_str());
            assert!(!payload.is_empty(), "{key} resolved empty");
        }
    }

    #[test]
    fn unknown_key_resolves_empty() {
        assert_eq!(static_payload("earningsCalendar"), Payload::Empty);
        assert_eq!(static_payload(""), Payload::Empty);
    }

    #[test]
    fn key_matching_is_case_sensitive() {
        assert_eq!(static_payload("Portfolio"), Payload::Empty);
        assert!("sectorsentiments".parse::<FixtureKey>().is_err());
    }

    #[test]
    fn key_round_trips_through_str() {
        for key in FixtureKey::ALL {
            assert_eq!(key.as_str().parse::<FixtureKey>(), Ok(key));
        }
    }

    #[test]
    fn only_related_opportunities_is_optional() {
        let optional: Vec<_> = FixtureKey::ALL
            .into_iter()
            .filter(|k| !FixtureKey::REQUIRED.contains(k))
            .collect();
        assert_eq!(optional, vec![FixtureKey::RelatedOpportunities]);
        assert_eq!(FixtureKey::REQUIRED.len(), 7);
    }

    #[test]
    fn typed_access_matches_variant() {
        let payload = static_payload("portfolio");
        let holdings = Vec::<Holding>::from_payload(&payload).unwrap();
        assert_eq!(holdings.len(), 4);
        assert_eq!(holdings[1].symbol, "MSFT");
        assert!(Vec::<Opportunity>::from_payload(&payload).is_none());
    }

    #[test]
    fn performance_and_diversification_share_chart_variant() {
        let perf = static_payload("performanceData");
        let div = static_payload("diversificationData");
        let perf_rows = Vec::<ChartPoint>::from_payload(&perf).unwrap();
        let div_rows = Vec::<ChartPoint>::from_payload(&div).unwrap();
        assert_eq!(perf_rows.first().map(|p| p.name.as_str()), Some("Jan"));
        let total: f64 = div_rows.iter().map(|p| p.value).sum();
        assert!((total - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn messages_start_with_assistant_greeting() {
        let payload = static_payload("messages");
        let messages = Vec::<ChatMessage>::from_payload(&payload).unwrap();
        assert_eq!(messages, &vec![ChatMessage::assistant(GREETING)]);
    }

    #[test]
    fn related_fixture_ignores_params() {
        let source = StaticFixtures;
        let a = source
            .produce("relatedOpportunities", &QueryParams::new().with("symbol", "NVDA"))
            .unwrap();
        let b = source
            .produce("relatedOpportunities", &QueryParams::new().with("symbol", "TSLA"))
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }
}
