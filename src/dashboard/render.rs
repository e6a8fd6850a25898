//! Read-only projection of the model onto a [`Surface`].
//!
//! Rendering is all-or-nothing: until every required fixture has resolved the
//! surface only receives a Loading notice, and any failed fixture replaces the
//! whole view with the Error notice.

use crate::data::fixtures::{client_risk_profiles, investor_mix};
use crate::data::records::{ChartPoint, Opportunity};

use super::model::{DashboardModel, LoadState, Tab, UserType};
use super::sentiment::SentimentTier;
use super::summary;
use super::surface::{Card, Cell, Chart, ChartKind, Notice, Surface, Table};

/// Title shown above the whole dashboard.
pub const TITLE: &str = "NOFOMO Dashboard";

/// Render the current view.
pub fn render<S: Surface + ?Sized>(model: &DashboardModel, surface: &mut S) {
    match model.load_state() {
        LoadState::Loading => {
            surface.notice(Notice::Loading);
            return;
        }
        LoadState::Failed { .. } => {
            surface.notice(Notice::Error);
            return;
        }
        LoadState::Ready => {}
    }

    surface.heading(TITLE);
    surface.line(&nav_line(model.tab, model.user_type));
    for card in header_cards(model) {
        surface.card(&card);
    }

    match model.tab {
        Tab::Overview => render_overview(model, surface),
        Tab::Opportunities => render_opportunities(model, surface),
        Tab::Sentiment => render_sentiment(model, surface),
        Tab::Portfolio => render_portfolio(model, surface),
        Tab::Advisor => render_advisor(model, surface),
    }
}

/// Tab strip with the active tab bracketed, plus the audience.
#[must_use]
pub fn nav_line(active: Tab, user_type: UserType) -> String {
    let tabs: Vec<String> = Tab::ALL
        .iter()
        .map(|&tab| {
            if tab == active {
                format!("[{} {}]", tab.number(), tab.label())
            } else {
                format!("{} {}", tab.number(), tab.label())
            }
        })
        .collect();
    format!("{}   | {}", tabs.join("  "), user_type.label())
}

/// The four summary cards shown above every tab.
#[must_use]
pub fn header_cards(model: &DashboardModel) -> Vec<Card> {
    let top = summary::top_opportunity(model.opportunities()).map_or_else(
        || Card {
            title: "Top Opportunity".to_string(),
            value: "None".to_string(),
            caption: "No opportunities listed".to_string(),
        },
        |opp| Card {
            title: "Top Opportunity".to_string(),
            value: format!("{} ({})", opp.name, opp.symbol),
            caption: format!("{}% YoY Growth", opp.growth),
        },
    );
    vec![
        top,
        Card {
            title: "Portfolio Value".to_string(),
            value: summary::portfolio_value(model.holdings()),
            caption: "+2.5% from last month".to_string(),
        },
        Card {
            title: "Market Sentiment".to_string(),
            value: summary::market_sentiment(model.sector_sentiments())
                .label()
                .to_string(),
            caption: "Across all sectors".to_string(),
        },
        Card {
            title: "AI Advisor".to_string(),
            value: "Active".to_string(),
            caption: "Ready to assist you".to_string(),
        },
    ]
}

// ──────────────────── tabs ────────────────────

fn render_overview<S: Surface + ?Sized>(model: &DashboardModel, surface: &mut S) {
    surface.heading("Market Overview");
    surface.line("Key insights and trends");
    surface.chart(&Chart {
        title: "Top Performing Sectors".to_string(),
        kind: ChartKind::Bar,
        points: model
            .sector_sentiments()
            .iter()
            .map(|s| ChartPoint::new(&s.name, s.sentiment))
            .collect(),
    });
    surface.chart(&performance_chart(model, "Portfolio Performance"));
    match model.user_type {
        UserType::Individual => {}
        UserType::Advisor => surface.chart(&Chart {
            title: "Client Portfolio Distribution".to_string(),
            kind: ChartKind::Pie,
            points: model.diversification().to_vec(),
        }),
        UserType::InvestorRelations => {
            surface.chart(&performance_chart(model, "Investor Sentiment Trends"));
        }
    }
}

fn render_opportunities<S: Surface + ?Sized>(model: &DashboardModel, surface: &mut S) {
    surface.heading("Opportunity Explorer");
    surface.line("Discover undervalued stocks and related opportunities");
    surface.line("Search: enter a stock symbol (e.g., NVDA)");

    let Some(selected) = &model.selected else {
        return;
    };
    render_selection(model, selected, surface);

    if model.related_loading() {
        surface.line("Loading related opportunities...");
        return;
    }
    let related = model.related_opportunities();
    if related.is_empty() {
        return;
    }
    surface.table(&Table {
        title: "Related Opportunities".to_string(),
        description: Some(format!(
            "Explore opportunities in tertiary sectors related to {}",
            selected.symbol
        )),
        headers: vec!["Symbol", "Name", "Sector", "Relation", "Growth"],
        rows: related
            .iter()
            .map(|r| {
                vec![
                    Cell::text(&r.symbol),
                    Cell::text(&r.name),
                    Cell::text(&r.sector),
                    Cell::text(&r.relation),
                    Cell::text(format!("{}%", r.growth)),
                ]
            })
            .collect(),
    });
}

fn render_selection<S: Surface + ?Sized>(
    model: &DashboardModel,
    selected: &Opportunity,
    surface: &mut S,
) {
    surface.line(&format!("{} ({})", selected.name, selected.symbol));
    surface.line(&format!("Sector: {}", selected.sector));
    surface.line(&format!(
        "Growth Rate: {}%   Growth Potential: {}%",
        selected.growth, selected.potential
    ));
    surface.chart(&performance_chart(model, "Performance"));
}

fn render_sentiment<S: Surface + ?Sized>(model: &DashboardModel, surface: &mut S) {
    surface.table(&Table {
        title: "Sector Sentiment Analysis".to_string(),
        description: Some("Based on recent comments from Yahoo Finance and Reddit".to_string()),
        headers: vec!["Sector", "Sentiment", "Comments"],
        rows: model
            .sector_sentiments()
            .iter()
            .map(|s| {
                vec![
                    Cell::text(&s.name),
                    Cell::Badge(SentimentTier::classify(s.sentiment)),
                    Cell::text(s.comments.to_string()),
                ]
            })
            .collect(),
    });
    surface.table(&Table {
        title: "Stock Sentiment Analysis".to_string(),
        description: Some("Analyze sentiment for specific stocks".to_string()),
        headers: vec!["Symbol", "Name", "Sentiment", "Comments", "Latest"],
        rows: model
            .stock_sentiments()
            .iter()
            .map(|s| {
                vec![
                    Cell::text(&s.symbol),
                    Cell::text(&s.name),
                    Cell::Badge(SentimentTier::classify(s.sentiment)),
                    Cell::text(s.comments.to_string()),
                    Cell::text(s.recent_comments.first().cloned().unwrap_or_default()),
                ]
            })
            .collect(),
    });
}

fn render_portfolio<S: Surface + ?Sized>(model: &DashboardModel, surface: &mut S) {
    surface.table(&Table {
        title: portfolio_title(model.user_type).to_string(),
        description: Some("Overview of current stock holdings".to_string()),
        headers: vec!["Symbol", "Name", "Shares", "Value", "Allocation"],
        rows: model
            .holdings()
            .iter()
            .map(|h| {
                vec![
                    Cell::text(&h.symbol),
                    Cell::text(&h.name),
                    Cell::text(h.shares.to_string()),
                    Cell::text(format!("${}", h.value)),
                    Cell::text(format!("{}%", h.allocation)),
                ]
            })
            .collect(),
    });
    surface.chart(&Chart {
        title: "Portfolio Diversification".to_string(),
        kind: ChartKind::Pie,
        points: model.diversification().to_vec(),
    });
    match model.user_type {
        UserType::Individual => {}
        UserType::Advisor => surface.chart(&Chart {
            title: "Client Risk Profiles".to_string(),
            kind: ChartKind::Bar,
            points: client_risk_profiles(),
        }),
        UserType::InvestorRelations => surface.chart(&Chart {
            title: "Shareholder Composition".to_string(),
            kind: ChartKind::Pie,
            points: investor_mix(),
        }),
    }
}

fn render_advisor<S: Surface + ?Sized>(model: &DashboardModel, surface: &mut S) {
    surface.heading("AI Financial Advisor Chat");
    surface.transcript(model.messages());
    if model.pending_replies > 0 {
        surface.line("AI is thinking...");
    }
}

// ──────────────────── helpers ────────────────────

/// Holdings card title for an audience.
#[must_use]
pub const fn portfolio_title(user_type: UserType) -> &'static str {
    match user_type {
        UserType::Individual => "Your Portfolio",
        UserType::Advisor | UserType::InvestorRelations => "Client Portfolio",
    }
}

fn performance_chart(model: &DashboardModel, title: &str) -> Chart {
    Chart {
        title: title.to_string(),
        kind: ChartKind::Line,
        points: model.performance().to_vec(),
    }
}
