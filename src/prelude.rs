//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use nofomo_dashboard::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{NofomoError, Result};

// Data
pub use crate::data::fixtures::{FixtureKey, FixtureSource, Payload, StaticFixtures};
pub use crate::data::records::{
    ChartPoint, ChatMessage, ChatRole, Holding, Opportunity, RelatedOpportunity, SectorSentiment,
    StockSentiment,
};
pub use crate::data::service::{Completion, MockDataService, QueryParams};

// Dashboard
pub use crate::dashboard::sentiment::{SentimentTier, TierColor};
pub use crate::dashboard::surface::{Surface, TextSurface};
pub use crate::dashboard::{
    DashboardCmd, DashboardModel, DashboardMsg, DashboardRuntime, LoadState, Tab, UserType,
};

// Advisor
pub use crate::advisor::respond;

// Logger
pub use crate::logger::activity::{ActivityEvent, ActivityLoggerHandle, spawn_logger};
pub use crate::logger::jsonl::JsonlConfig;
