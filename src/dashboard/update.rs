//! Pure update function for the Elm-style dashboard.
//!
//! `update()` takes the current model and a message, mutates the model, and
//! returns a command describing any side-effects the runtime should execute.
//!
//! **Design invariant:** this module performs zero I/O. All effects are
//! described as [`DashboardCmd`] values.

use crate::advisor;
use crate::data::fixtures::FixtureKey;
use crate::data::records::ChatMessage;
use crate::data::service::{Completion, FetchTicket, QueryParams};
use crate::logger::activity::ActivityEvent;

use super::model::{DashboardCmd, DashboardModel, DashboardMsg, Lifecycle, Tab};

/// Apply a message to the model and return the next command for the runtime.
///
/// This is the core state machine of the dashboard. Every state transition
/// goes through this function, making the dashboard deterministic and testable.
pub fn update(model: &mut DashboardModel, msg: DashboardMsg) -> DashboardCmd {
    match msg {
        DashboardMsg::Mount => mount(model),

        DashboardMsg::Unmount => {
            if !model.is_mounted() {
                return DashboardCmd::None;
            }
            model.lifecycle = Lifecycle::Disposed;
            model.data.clear();
            model.selected = None;
            model.pending_replies = 0;
            DashboardCmd::Batch(vec![
                DashboardCmd::CancelTimers,
                DashboardCmd::Log(ActivityEvent::ViewUnmounted),
            ])
        }

        DashboardMsg::SwitchTab(tab) => switch_tab(model, tab),
        DashboardMsg::NextTab => switch_tab(model, model.tab.next()),
        DashboardMsg::PrevTab => switch_tab(model, model.tab.prev()),

        DashboardMsg::SetUserType(user_type) => {
            if model.user_type == user_type {
                return DashboardCmd::None;
            }
            model.user_type = user_type;
            DashboardCmd::Log(ActivityEvent::UserTypeChanged {
                to: user_type.as_str(),
            })
        }

        DashboardMsg::EditSearch(text) => {
            model.search_text = text;
            DashboardCmd::None
        }

        DashboardMsg::SubmitSearch => submit_search(model),

        DashboardMsg::EditChat(text) => {
            model.chat_input = text;
            DashboardCmd::None
        }

        DashboardMsg::SendChat => send_chat(model),

        DashboardMsg::ReplyElapsed { prompt } => {
            if !model.is_mounted() {
                model.dropped_messages += 1;
                return DashboardCmd::None;
            }
            model.pending_replies = model.pending_replies.saturating_sub(1);
            let rule = advisor::matched_rule(&prompt);
            let reply = rule.map_or(advisor::FALLBACK, |r| r.response);
            let appended = model.data.mutate(
                FixtureKey::Messages.as_str(),
                &QueryParams::new(),
                Some(|mut messages: Vec<ChatMessage>| {
                    messages.push(ChatMessage::assistant(reply));
                    messages
                }),
            );
            if !appended {
                model.dropped_messages += 1;
                return DashboardCmd::None;
            }
            DashboardCmd::Log(ActivityEvent::ChatReplied {
                rule: rule.map_or("fallback", |r| r.id),
            })
        }

        DashboardMsg::RefreshSentiments => {
            if !model.is_mounted() {
                return DashboardCmd::None;
            }
            let params = QueryParams::new();
            let sector = model
                .data
                .refetch(FixtureKey::SectorSentiments.as_str(), &params);
            let stock = model
                .data
                .refetch(FixtureKey::StockSentiments.as_str(), &params);
            DashboardCmd::Batch(vec![
                DashboardCmd::Log(ActivityEvent::RefreshRequested),
                schedule_fetch(model, sector),
                schedule_fetch(model, stock),
            ])
        }

        DashboardMsg::FetchElapsed(ticket) => {
            if !model.is_mounted() {
                model.dropped_messages += 1;
                return DashboardCmd::None;
            }
            match model.data.complete(&ticket) {
                Completion::Resolved { rows } => {
                    model.fetches_resolved += 1;
                    DashboardCmd::Log(ActivityEvent::FetchResolved {
                        key: ticket.slot.key,
                        rows,
                    })
                }
                Completion::Failed(failure) => {
                    model.fetch_failures += 1;
                    DashboardCmd::Log(ActivityEvent::FetchFailed {
                        key: ticket.slot.key,
                        code: failure.code.to_string(),
                        message: failure.message,
                    })
                }
                Completion::Stale => {
                    model.dropped_messages += 1;
                    DashboardCmd::None
                }
            }
        }
    }
}

// ──────────────────── handlers ────────────────────

fn mount(model: &mut DashboardModel) -> DashboardCmd {
    if model.is_mounted() {
        return DashboardCmd::None;
    }
    model.lifecycle = Lifecycle::Mounted;

    let mut cmds = vec![DashboardCmd::Log(ActivityEvent::ViewMounted {
        tab: model.tab.as_str(),
        user_type: model.user_type.as_str(),
    })];
    // Every fixture loads up front regardless of tab. Related opportunities
    // start with the empty bag; a selection later requests its own slot.
    let params = QueryParams::new();
    for key in FixtureKey::ALL {
        if let Some(ticket) = model.data.request(key.as_str(), &params) {
            cmds.push(schedule_fetch(model, ticket));
        }
    }
    DashboardCmd::Batch(cmds)
}

fn switch_tab(model: &mut DashboardModel, tab: Tab) -> DashboardCmd {
    if model.tab == tab {
        return DashboardCmd::None;
    }
    let from = model.tab;
    model.tab = tab;
    DashboardCmd::Log(ActivityEvent::TabSwitched {
        from: from.as_str(),
        to: tab.as_str(),
    })
}

/// Resolve the pending search text against the loaded opportunities.
///
/// A miss is not an error: the selection and related data are cleared and
/// nothing else is surfaced.
fn submit_search(model: &mut DashboardModel) -> DashboardCmd {
    if !model.is_mounted() {
        return DashboardCmd::None;
    }
    let term = std::mem::take(&mut model.search_text);
    let found = model.find_opportunity(&term).cloned();

    let Some(opportunity) = found else {
        drop_related(model);
        model.selected = None;
        return DashboardCmd::Log(ActivityEvent::SearchMiss {
            chars: term.chars().count(),
        });
    };

    let symbol = opportunity.symbol.clone();
    let already_selected = model
        .selected
        .as_ref()
        .is_some_and(|current| current.symbol == symbol);
    if already_selected {
        return DashboardCmd::Log(ActivityEvent::SearchHit { symbol });
    }

    drop_related(model);
    model.selected = Some(opportunity);
    let mut cmds = vec![DashboardCmd::Log(ActivityEvent::SearchHit { symbol })];
    if let Some(params) = model.related_params()
        && let Some(ticket) = model
            .data
            .request(FixtureKey::RelatedOpportunities.as_str(), &params)
    {
        cmds.push(schedule_fetch(model, ticket));
    }
    DashboardCmd::Batch(cmds)
}

/// Append the user message now and schedule the advisor reply.
///
/// The reply timer is only scheduled once the user message is in the
/// transcript, so the reply can never precede it.
fn send_chat(model: &mut DashboardModel) -> DashboardCmd {
    if !model.is_mounted() || model.chat_input.trim().is_empty() {
        return DashboardCmd::None;
    }
    let prompt = std::mem::take(&mut model.chat_input);
    let user_message = ChatMessage::user(prompt.clone());
    let appended = model.data.mutate(
        FixtureKey::Messages.as_str(),
        &QueryParams::new(),
        Some(move |mut messages: Vec<ChatMessage>| {
            messages.push(user_message);
            messages
        }),
    );
    if !appended {
        // Transcript not loaded yet: keep the input so nothing is lost.
        model.chat_input = prompt;
        return DashboardCmd::None;
    }

    model.pending_replies += 1;
    DashboardCmd::Batch(vec![
        DashboardCmd::Log(ActivityEvent::ChatSent {
            chars: prompt.chars().count(),
        }),
        DashboardCmd::ScheduleReply {
            prompt,
            after: model.reply_delay,
        },
    ])
}

fn drop_related(model: &mut DashboardModel) {
    if let Some(params) = model.related_params() {
        model
            .data
            .dispose(FixtureKey::RelatedOpportunities.as_str(), &params);
    }
}

fn schedule_fetch(model: &DashboardModel, ticket: FetchTicket) -> DashboardCmd {
    DashboardCmd::ScheduleFetch {
        ticket,
        after: model.fetch_latency,
    }
}

// ──────────────────── tests ────────────────────
