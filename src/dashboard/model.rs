//! Elm-style state model for the dashboard view.
//!
//! All view state lives in [`DashboardModel`]. User actions and elapsed timers
//! arrive as [`DashboardMsg`] values; side-effects are represented as
//! [`DashboardCmd`] values returned from the update function.
//!
//! **Design invariant:** the model is deterministic and testable; no I/O
//! happens here.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::config::Config;
use crate::data::fixtures::{FixtureData, FixtureKey};
use crate::data::records::{
    ChartPoint, ChatMessage, Holding, Opportunity, RelatedOpportunity, SectorSentiment,
    StockSentiment,
};
use crate::data::service::{FetchTicket, MockDataService, QueryParams};
use crate::logger::activity::ActivityEvent;

// ──────────────────── tabs ────────────────────

/// Mutually exclusive display modes of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    /// Sector sentiment and performance charts.
    #[default]
    Overview,
    /// Symbol search with related opportunities.
    Opportunities,
    /// Sector and stock sentiment tables.
    Sentiment,
    /// Holdings table and diversification.
    Portfolio,
    /// Scripted advisor chat.
    Advisor,
}

/// Total number of tabs (used for prev/next wrapping).
const TAB_COUNT: u8 = 5;

impl Tab {
    /// Every tab in navigation order.
    pub const ALL: [Self; 5] = [
        Self::Overview,
        Self::Opportunities,
        Self::Sentiment,
        Self::Portfolio,
        Self::Advisor,
    ];

    /// 1-based tab number for keyboard-style selection.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Overview => 1,
            Self::Opportunities => 2,
            Self::Sentiment => 3,
            Self::Portfolio => 4,
            Self::Advisor => 5,
        }
    }

    /// Resolve a 1-based number to a tab. Returns `None` for out-of-range.
    #[must_use]
    pub const fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Overview),
            2 => Some(Self::Opportunities),
            3 => Some(Self::Sentiment),
            4 => Some(Self::Portfolio),
            5 => Some(Self::Advisor),
            _ => None,
        }
    }

    /// Next tab, wrapping Advisor → Overview.
    #[must_use]
    pub const fn next(self) -> Self {
        let n = self.number() % TAB_COUNT + 1;
        match Self::from_number(n) {
            Some(t) => t,
            None => Self::Overview,
        }
    }

    /// Previous tab, wrapping Overview → Advisor.
    #[must_use]
    pub const fn prev(self) -> Self {
        let n = if self.number() == 1 {
            TAB_COUNT
        } else {
            self.number() - 1
        };
        match Self::from_number(n) {
            Some(t) => t,
            None => Self::Advisor,
        }
    }

    /// Navigation label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Opportunities => "Opportunities",
            Self::Sentiment => "Sentiment",
            Self::Portfolio => "Portfolio",
            Self::Advisor => "AI Advisor",
        }
    }

    /// Lowercase identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Opportunities => "opportunities",
            Self::Sentiment => "sentiment",
            Self::Portfolio => "portfolio",
            Self::Advisor => "advisor",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = String;

    /// Accepts the lowercase name or the 1-based number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<u8>() {
            return Self::from_number(n).ok_or_else(|| format!("tab number {n} out of range 1-5"));
        }
        let lowered = trimmed.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_str() == lowered)
            .ok_or_else(|| format!("unknown tab {trimmed:?}"))
    }
}

// ──────────────────── user type ────────────────────

/// Audience selector. Pure display routing: it only decides which extra
/// panels appear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserType {
    #[default]
    Individual,
    Advisor,
    InvestorRelations,
}

impl UserType {
    pub const ALL: [Self; 3] = [Self::Individual, Self::Advisor, Self::InvestorRelations];

    /// Selector label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::Advisor => "Investment Advisor",
            Self::InvestorRelations => "Investor Relations",
        }
    }

    /// Kebab-case identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Advisor => "advisor",
            Self::InvestorRelations => "investor-relations",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|u| u.as_str() == lowered)
            .ok_or_else(|| format!("unknown user type {s:?}"))
    }
}

// ──────────────────── lifecycle ────────────────────

/// View lifetime. Only a mounted view accepts data and timer messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Created,
    Mounted,
    Disposed,
}

/// All-or-nothing render gate over the seven required fixtures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// At least one required fixture has not resolved yet.
    Loading,
    /// Every required fixture resolved, at least one with an error.
    Failed {
        /// Keys that failed, in request order.
        keys: Vec<FixtureKey>,
    },
    Ready,
}

// ──────────────────── model ────────────────────

/// Complete display state for the dashboard.
///
/// This struct is the single source of truth for the view layer. The update
/// function mutates it; the render function reads it immutably.
#[derive(Debug)]
pub struct DashboardModel {
    /// Active tab.
    pub tab: Tab,
    /// Audience selector.
    pub user_type: UserType,
    /// Opportunity chosen by the last successful search.
    pub selected: Option<Opportunity>,
    /// Pending search text.
    pub search_text: String,
    /// Pending chat input.
    pub chat_input: String,
    /// Fixture slots, including the chat transcript.
    pub data: MockDataService,
    /// Current lifetime phase.
    pub lifecycle: Lifecycle,
    /// Simulated fixture latency.
    pub fetch_latency: Duration,
    /// Simulated advisor "thinking" time.
    pub reply_delay: Duration,
    /// Replies scheduled but not yet delivered.
    pub pending_replies: usize,
    /// Tickets redeemed with data.
    pub fetches_resolved: u64,
    /// Tickets redeemed with an error.
    pub fetch_failures: u64,
    /// Timer messages ignored because the view was not mounted or the slot
    /// had moved on.
    pub dropped_messages: u64,
}

impl DashboardModel {
    /// Create an unmounted model with default latencies.
    #[must_use]
    pub fn new(data: MockDataService) -> Self {
        Self {
            tab: Tab::default(),
            user_type: UserType::default(),
            selected: None,
            search_text: String::new(),
            chat_input: String::new(),
            data,
            lifecycle: Lifecycle::Created,
            fetch_latency: Duration::from_millis(500),
            reply_delay: Duration::from_millis(1_000),
            pending_replies: 0,
            fetches_resolved: 0,
            fetch_failures: 0,
            dropped_messages: 0,
        }
    }

    /// Create an unmounted model seeded from configuration.
    #[must_use]
    pub fn from_config(config: &Config, data: MockDataService) -> Self {
        let mut model = Self::new(data);
        model.tab = config.view.start_tab;
        model.user_type = config.view.user_type;
        model.fetch_latency = config.timing.fetch_latency();
        model.reply_delay = config.timing.reply_delay();
        model
    }

    /// Whether the view currently accepts messages.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.lifecycle == Lifecycle::Mounted
    }

    /// Parameter bag for fixtures that take none.
    #[must_use]
    pub fn no_params() -> QueryParams {
        QueryParams::new()
    }

    /// Parameter bag for the related-opportunities slot, keyed on the
    /// selected symbol. `None` when nothing is selected.
    #[must_use]
    pub fn related_params(&self) -> Option<QueryParams> {
        self.selected
            .as_ref()
            .map(|opp| QueryParams::new().with("symbol", &opp.symbol))
    }

    /// Evaluate the all-or-nothing render gate.
    #[must_use]
    pub fn load_state(&self) -> LoadState {
        let params = Self::no_params();
        if FixtureKey::REQUIRED
            .iter()
            .any(|key| self.data.is_pending(key.as_str(), &params))
        {
            return LoadState::Loading;
        }
        let failed: Vec<FixtureKey> = FixtureKey::REQUIRED
            .into_iter()
            .filter(|key| self.data.error(key.as_str(), &params).is_some())
            .collect();
        if failed.is_empty() {
            if FixtureKey::REQUIRED
                .iter()
                .all(|key| self.data.payload(key.as_str(), &params).is_some())
            {
                LoadState::Ready
            } else {
                LoadState::Loading
            }
        } else {
            LoadState::Failed { keys: failed }
        }
    }

    fn rows<T>(&self, key: FixtureKey) -> &[T]
    where
        Vec<T>: FixtureData,
    {
        self.data
            .query::<Vec<T>>(key.as_str(), &Self::no_params())
            .data
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn holdings(&self) -> &[Holding] {
        self.rows(FixtureKey::Portfolio)
    }

    #[must_use]
    pub fn opportunities(&self) -> &[Opportunity] {
        self.rows(FixtureKey::Opportunities)
    }

    #[must_use]
    pub fn sector_sentiments(&self) -> &[SectorSentiment] {
        self.rows(FixtureKey::SectorSentiments)
    }

    #[must_use]
    pub fn stock_sentiments(&self) -> &[StockSentiment] {
        self.rows(FixtureKey::StockSentiments)
    }

    #[must_use]
    pub fn performance(&self) -> &[ChartPoint] {
        self.rows(FixtureKey::PerformanceData)
    }

    #[must_use]
    pub fn diversification(&self) -> &[ChartPoint] {
        self.rows(FixtureKey::DiversificationData)
    }

    /// Chat transcript in send order.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        self.rows(FixtureKey::Messages)
    }

    /// Related opportunities for the current selection; empty when nothing
    /// is selected or the fetch has not resolved.
    #[must_use]
    pub fn related_opportunities(&self) -> &[RelatedOpportunity] {
        let Some(params) = self.related_params() else {
            return &[];
        };
        self.data
            .query::<Vec<RelatedOpportunity>>(FixtureKey::RelatedOpportunities.as_str(), &params)
            .data
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the related-opportunities fetch for the selection is in flight.
    #[must_use]
    pub fn related_loading(&self) -> bool {
        self.related_params().is_some_and(|params| {
            self.data
                .is_pending(FixtureKey::RelatedOpportunities.as_str(), &params)
        })
    }

    /// Case-insensitive exact symbol match against the loaded opportunities.
    #[must_use]
    pub fn find_opportunity(&self, symbol: &str) -> Option<&Opportunity> {
        self.opportunities()
            .iter()
            .find(|opp| opp.symbol.eq_ignore_ascii_case(symbol))
    }
}

// ──────────────────── messages ────────────────────

/// Events that drive state transitions in the dashboard model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardMsg {
    /// View attached: request every fixture.
    Mount,
    /// View torn down: drop data and cancel timers.
    Unmount,
    /// Make a tab active.
    SwitchTab(Tab),
    /// Cycle forward through tabs.
    NextTab,
    /// Cycle backward through tabs.
    PrevTab,
    /// Change the audience selector.
    SetUserType(UserType),
    /// Replace the pending search text.
    EditSearch(String),
    /// Look up the pending search text among opportunities.
    SubmitSearch,
    /// Replace the pending chat input.
    EditChat(String),
    /// Send the pending chat input to the advisor.
    SendChat,
    /// Re-fetch sector then stock sentiments.
    RefreshSentiments,
    /// Simulated fetch latency elapsed for a ticket.
    FetchElapsed(FetchTicket),
    /// Simulated thinking time elapsed for a chat prompt.
    ReplyElapsed { prompt: String },
}

// ──────────────────── commands ────────────────────

/// Side-effects returned by the update function for the runtime to execute.
///
/// All timed work is represented as a command; the update function never
/// sleeps or writes logs directly, keeping the state machine deterministic.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardCmd {
    /// No side-effect.
    None,
    /// Deliver `FetchElapsed(ticket)` after the given duration.
    ScheduleFetch { ticket: FetchTicket, after: Duration },
    /// Deliver `ReplyElapsed { prompt }` after the given duration.
    ScheduleReply { prompt: String, after: Duration },
    /// Drop every pending timer owned by this view.
    CancelTimers,
    /// Record an activity event.
    Log(ActivityEvent),
    /// Execute multiple commands in order.
    Batch(Vec<Self>),
}

impl DashboardCmd {
    /// Flatten nested batches into execution order.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::None => Vec::new(),
            Self::Batch(cmds) => cmds.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }
}

// ──────────────────── tests ────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn test_model() -> DashboardModel {
        DashboardModel::new(MockDataService::default())
    }

    // ── Tab enum ──

    #[test]
    fn default_tab_is_overview() {
        assert_eq!(Tab::default(), Tab::Overview);
    }

    #[test]
    fn tab_numbers_round_trip() {
        for tab in Tab::ALL {
            assert_eq!(Tab::from_number(tab.number()), Some(tab));
        }
        assert_eq!(Tab::from_number(0), None);
        assert_eq!(Tab::from_number(6), None);
    }

    #[test]
    fn tab_next_wraps() {
        assert_eq!(Tab::Advisor.next(), Tab::Overview);
        assert_eq!(Tab::Overview.prev(), Tab::Advisor);
        assert_eq!(Tab::Sentiment.next(), Tab::Portfolio);
    }

    #[test]
    fn tab_parses_names_and_numbers() {
        assert_eq!("sentiment".parse::<Tab>(), Ok(Tab::Sentiment));
        assert_eq!("ADVISOR".parse::<Tab>(), Ok(Tab::Advisor));
        assert_eq!("2".parse::<Tab>(), Ok(Tab::Opportunities));
        assert!("9".parse::<Tab>().is_err());
        assert!("charts".parse::<Tab>().is_err());
    }

    #[test]
    fn user_type_parses_kebab_case() {
        assert_eq!(
            "investor-relations".parse::<UserType>(),
            Ok(UserType::InvestorRelations)
        );
        assert!("investor_relations".parse::<UserType>().is_err());
        assert_eq!(UserType::Advisor.label(), "Investment Advisor");
    }

    #[test]
    fn tab_serde_is_lowercase() {
        let json = serde_json::to_string(&Tab::Opportunities).unwrap();
        assert_eq!(json, "\"opportunities\"");
        let user: UserType = serde_json::from_str("\"investor-relations\"").unwrap();
        assert_eq!(user, UserType::InvestorRelations);
    }

    // ── Model ──

    #[test]
    fn new_model_is_unmounted_and_empty() {
        let model = test_model();
        assert_eq!(model.lifecycle, Lifecycle::Created);
        assert!(model.selected.is_none());
        assert!(model.holdings().is_empty());
        assert!(model.messages().is_empty());
        assert!(model.related_opportunities().is_empty());
    }

    #[test]
    fn load_state_is_loading_before_any_request() {
        let model = test_model();
        assert_eq!(model.load_state(), LoadState::Loading);
    }

    #[test]
    fn from_config_applies_view_and_timing() {
        let mut cfg = Config::default();
        cfg.view.start_tab = Tab::Portfolio;
        cfg.view.user_type = UserType::Advisor;
        cfg.timing.fetch_latency_ms = 20;
        let model = DashboardModel::from_config(&cfg, MockDataService::default());
        assert_eq!(model.tab, Tab::Portfolio);
        assert_eq!(model.user_type, UserType::Advisor);
        assert_eq!(model.fetch_latency, Duration::from_millis(20));
    }

    #[test]
    fn related_params_follow_selection() {
        let mut model = test_model();
        assert!(model.related_params().is_none());
        model.selected = Some(Opportunity {
            symbol: "NVDA".to_string(),
            name: "NVIDIA Corporation".to_string(),
            sector: "Technology".to_string(),
            growth: 125.0,
            potential: 85.0,
        });
        let params = model.related_params().unwrap();
        assert_eq!(params.get("symbol"), Some("NVDA"));
    }

    #[test]
    fn flatten_preserves_order_and_drops_none() {
        let cmd = DashboardCmd::Batch(vec![
            DashboardCmd::None,
            DashboardCmd::CancelTimers,
            DashboardCmd::Batch(vec![DashboardCmd::ScheduleReply {
                prompt: "hi".to_string(),
                after: Duration::from_millis(1),
            }]),
        ]);
        let flat = cmd.flatten();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0], DashboardCmd::CancelTimers);
    }
}
