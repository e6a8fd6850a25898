//! Flat record types served by the mock data service.
//!
//! Field names serialize in camelCase so fixture dumps line up with the keys
//! the dashboard surface has always consumed (`recentComments`, etc.).

#![allow(missing_docs)]

use std::fmt;

use serde::{Deserialize, Serialize};

/// One position in the user's portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub name: String,
    pub shares: u32,
    /// Market value in dollars.
    pub value: f64,
    /// Share of the portfolio, in percent.
    pub allocation: f64,
}

/// A growth candidate surfaced on the opportunities tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    /// Year-over-year growth, in percent.
    pub growth: f64,
    /// Growth potential score, in percent.
    pub potential: f64,
}

/// A company linked to the selected opportunity through its supply chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedOpportunity {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub relation: String,
    pub growth: f64,
}

/// Aggregate crowd sentiment for a market sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorSentiment {
    pub name: String,
    /// Score in `[-1, 1]`.
    pub sentiment: f64,
    pub comments: u32,
}

/// Crowd sentiment for a single ticker, with a sample of recent comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSentiment {
    pub symbol: String,
    pub name: String,
    /// Score in `[-1, 1]`.
    pub sentiment: f64,
    pub comments: u32,
    pub recent_comments: Vec<String>,
}

/// Labelled value for line, bar and pie charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: f64,
}

impl ChartPoint {
    #[must_use]
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Avatar initials shown next to the message bubble.
    #[must_use]
    pub const fn avatar(self) -> &'static str {
        match self {
            Self::User => "U",
            Self::Assistant => "AI",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Assistant => f.write_str("assistant"),
        }
    }
}

/// One entry of the advisor transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_sentiment_uses_camel_case_comments() {
        let stock = StockSentiment {
            symbol: "AAPL".to_string(),
            name: "Apple Inc.".to_string(),
            sentiment: 0.8,
            comments: 500,
            recent_comments: vec!["Great new product lineup!".to_string()],
        };
        let json = serde_json::to_value(&stock).unwrap();
        assert!(json.get("recentComments").is_some());
        assert!(json.get("recent_comments").is_none());
    }

    #[test]
    fn chat_role_serializes_lowercase() {
        let msg = ChatMessage::assistant("hello");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hello"}"#);
    }

    #[test]
    fn chat_role_avatars() {
        assert_eq!(ChatRole::User.avatar(), "U");
        assert_eq!(ChatRole::Assistant.avatar(), "AI");
        assert_eq!(ChatRole::User.to_string(), "user");
    }
}
