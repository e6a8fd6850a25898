//! Property-based tests for dashboard runtime invariants.
//!
//! Drives the runtime with arbitrary interleavings of user messages and clock
//! advances and checks that the chat transcript, the selection, and the
//! render gate stay consistent at every step.

use std::time::Duration;

use proptest::prelude::*;

use super::model::{DashboardModel, DashboardMsg, Lifecycle, LoadState, Tab, UserType};
use super::runtime::DashboardRuntime;
use crate::data::fixtures::FixtureKey;
use crate::data::records::ChatRole;
use crate::data::service::MockDataService;

// ──────────────────── strategies ────────────────────

#[derive(Debug, Clone)]
enum Step {
    Msg(DashboardMsg),
    Advance(u64),
}

fn arb_tab() -> impl Strategy<Value = Tab> {
    (1u8..=5).prop_map(|n| Tab::from_number(n).unwrap_or_default())
}

fn arb_user_type() -> impl Strategy<Value = UserType> {
    prop::sample::select(UserType::ALL.to_vec())
}

fn arb_search() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("NVDA".to_string()),
        Just("tsla".to_string()),
        Just("PLTR".to_string()),
        Just("ZZZZ".to_string()),
        Just(String::new()),
        "[A-Za-z]{0,5}",
    ]
}

fn arb_chat() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("What are some undervalued stocks?".to_string()),
        Just("market sentiment".to_string()),
        Just("show related opportunities".to_string()),
        Just("   ".to_string()),
        "[ a-z]{0,20}",
    ]
}

/// Messages that a user can trigger. Timer messages only come from the
/// scheduler, never from here.
fn arb_msg() -> impl Strategy<Value = DashboardMsg> {
    prop_oneof![
        Just(DashboardMsg::Mount),
        Just(DashboardMsg::Unmount),
        arb_tab().prop_map(DashboardMsg::SwitchTab),
        Just(DashboardMsg::NextTab),
        Just(DashboardMsg::PrevTab),
        arb_user_type().prop_map(DashboardMsg::SetUserType),
        arb_search().prop_map(DashboardMsg::EditSearch),
        Just(DashboardMsg::SubmitSearch),
        arb_chat().prop_map(DashboardMsg::EditChat),
        Just(DashboardMsg::SendChat),
        Just(DashboardMsg::RefreshSentiments),
    ]
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => arb_msg().prop_map(Step::Msg),
        1 => (0u64..1_500).prop_map(Step::Advance),
    ]
}

fn fresh_runtime() -> DashboardRuntime {
    DashboardRuntime::new(DashboardModel::new(MockDataService::default()))
}

fn apply(rt: &mut DashboardRuntime, step: Step) {
    match step {
        Step::Msg(msg) => rt.dispatch(msg),
        Step::Advance(ms) => {
            rt.advance(Duration::from_millis(ms));
        }
    }
}

// ──────────────────── invariant checks ────────────────────

fn assert_model_invariants(model: &DashboardModel) {
    // Every delivered reply answers an earlier user message.
    let messages = model.messages();
    if !messages.is_empty() {
        let users = messages.iter().filter(|m| m.role == ChatRole::User).count();
        let replies = messages
            .iter()
            .skip(1)
            .filter(|m| m.role == ChatRole::Assistant)
            .count();
        assert_eq!(
            replies + model.pending_replies,
            users,
            "replies {replies} + pending {} != user messages {users}",
            model.pending_replies
        );
        assert_eq!(messages[0].role, ChatRole::Assistant, "greeting displaced");
    }

    // A selection always names a loaded opportunity.
    if let Some(selected) = &model.selected {
        assert!(
            model.find_opportunity(&selected.symbol).is_some(),
            "selected {} not among opportunities",
            selected.symbol
        );
    }

    // Ready means every required fixture is present.
    if model.load_state() == LoadState::Ready {
        let params = DashboardModel::no_params();
        for key in FixtureKey::REQUIRED {
            assert!(
                model.data.payload(key.as_str(), &params).is_some(),
                "{key} missing while Ready"
            );
        }
    }

    // A disposed view holds nothing.
    if model.lifecycle == Lifecycle::Disposed {
        assert_eq!(model.data.slot_count(), 0);
        assert!(model.selected.is_none());
        assert_eq!(model.pending_replies, 0);
    }

    // Related data never outlives its selection.
    let max_slots = FixtureKey::ALL.len() + usize::from(model.selected.is_some());
    assert!(
        model.data.slot_count() <= max_slots,
        "{} slots exceed {max_slots}",
        model.data.slot_count()
    );
}

// ──────────────────── property tests ────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any interleaving of 1-60 steps preserves all model invariants.
    #[test]
    fn runtime_preserves_invariants(
        steps in prop::collection::vec(arb_step(), 1..60)
    ) {
        let mut rt = fresh_runtime();
        for step in steps {
            apply(&mut rt, step);
            assert_model_invariants(rt.model());
        }
    }

    /// Once idle, every accepted chat message has exactly one reply.
    #[test]
    fn idle_runtime_has_no_outstanding_replies(
        steps in prop::collection::vec(arb_step(), 1..40)
    ) {
        let mut rt = fresh_runtime();
        rt.mount();
        for step in steps {
            apply(&mut rt, step);
        }
        rt.run_until_idle();
        prop_assert_eq!(rt.model().pending_replies, 0);
        prop_assert_eq!(rt.pending_timers(), 0);
        assert_model_invariants(rt.model());
    }

    /// Tab and audience changes never touch fixture data.
    #[test]
    fn navigation_never_alters_data(
        tabs in prop::collection::vec(arb_tab(), 1..20),
        user_type in arb_user_type()
    ) {
        let mut rt = fresh_runtime();
        rt.mount();
        rt.run_until_idle();
        let before = rt.model().holdings().to_vec();
        let slots = rt.model().data.slot_count();
        rt.dispatch(DashboardMsg::SetUserType(user_type));
        for tab in tabs {
            rt.dispatch(DashboardMsg::SwitchTab(tab));
            prop_assert_eq!(rt.pending_timers(), 0);
        }
        prop_assert_eq!(rt.model().holdings(), before.as_slice());
        prop_assert_eq!(rt.model().data.slot_count(), slots);
    }

    /// Nothing scheduled before an unmount ever lands afterwards.
    #[test]
    fn unmount_is_final(
        steps in prop::collection::vec(arb_step(), 0..30),
        wait in 0u64..5_000
    ) {
        let mut rt = fresh_runtime();
        rt.mount();
        for step in steps {
            apply(&mut rt, step);
        }
        rt.unmount();
        rt.advance(Duration::from_millis(wait));
        prop_assert_eq!(rt.model().data.slot_count(), 0);
        prop_assert_eq!(rt.pending_timers(), 0);
    }

    /// next/prev are inverse and five steps return to the start.
    #[test]
    fn tab_cycle_identities(tab in arb_tab()) {
        prop_assert_eq!(tab.next().prev(), tab);
        let mut t = tab;
        for _ in 0..5 {
            t = t.next();
        }
        prop_assert_eq!(t, tab);
    }
}
