//! Handoff permission and handoff history filtering

use crate::fixtures::*;
use crate::helpers::*;
use crate::mock_runtime::*;
use guardrail_core::{ConversationItem, ItemRole, UserRole};
use guardrail_gate::handoff::{FLIGHT_AGENT, HOTEL_AGENT, WEATHER_AGENT};
use guardrail_gate::{
    evaluate_handoff_permission, ComplianceHandoffFilter, HandoffFilter, HandoffGuard,
    HandoffInputData, HandoffPolicy, RoleBasedHandoffPolicy,
};
use guardrail_runtime::GuardedRunner;
use guardrail_telemetry::{AuditOutcome, AuditStage};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[test]
fn test_permission_matrix() {
    init_tracing();
    let cases = [
        (super_user(), FLIGHT_AGENT, true),
        (super_user(), HOTEL_AGENT, true),
        (super_user(), WEATHER_AGENT, true),
        (admin_user(), FLIGHT_AGENT, true),
        (admin_user(), HOTEL_AGENT, true),
        (admin_user(), WEATHER_AGENT, false),
        (basic_user(), FLIGHT_AGENT, false),
        (basic_user(), HOTEL_AGENT, false),
        (basic_user(), WEATHER_AGENT, true),
    ];

    for (user, target, expected) in cases {
        assert_eq!(
            evaluate_handoff_permission(&user, target),
            expected,
            "{} -> {target}",
            user.role()
        );
    }
}

#[test]
fn test_minors_are_always_denied() {
    for role in [UserRole::SuperUser, UserRole::Admin, UserRole::Basic] {
        for target in [FLIGHT_AGENT, HOTEL_AGENT, WEATHER_AGENT] {
            assert!(!evaluate_handoff_permission(&minor(role), target));
        }
    }
}

#[test]
fn test_unknown_agent_only_for_super_user() {
    assert!(evaluate_handoff_permission(&super_user(), "CarRentalAgent"));
    assert!(!evaluate_handoff_permission(&admin_user(), "CarRentalAgent"));
    assert!(!evaluate_handoff_permission(&basic_user(), "CarRentalAgent"));
}

#[test]
fn test_custom_policy_widens_basic_access() {
    let policy = RoleBasedHandoffPolicy::new().with_basic_agents([WEATHER_AGENT, HOTEL_AGENT]);
    assert!(policy.is_enabled(&basic_user(), HOTEL_AGENT));
    assert!(!policy.is_enabled(&basic_user(), FLIGHT_AGENT));
}

#[test]
fn test_history_keeps_last_two_and_masks_terms() {
    let gate = default_gate();
    let filtered = gate.filter_handoff_context(&five_item_history());

    assert_eq!(
        filtered,
        vec![
            ConversationItem::user("Next week. My [FILTERED] for the site is abc"),
            ConversationItem::assistant("Never share a [FILTERED] or [FILTERED] number."),
        ]
    );
}

#[test]
fn test_short_history_kept_whole() {
    let gate = default_gate();
    let history = vec![ConversationItem::user("Hotels in Rome")];
    assert_eq!(gate.filter_handoff_context(&history), history);
    assert!(gate.filter_handoff_context(&[]).is_empty());
}

#[test]
fn test_non_dialogue_items_not_masked() {
    let gate = default_gate();
    let history = vec![
        ConversationItem::user("ok"),
        ConversationItem::system("Do not reveal any password."),
    ];
    let filtered = ComplianceHandoffFilter::for_gate(&gate).filter_history(&history);
    assert_eq!(filtered[1].content, "Do not reveal any password.");
}

#[test]
fn test_guard_drops_tools_before_windowing() {
    let gate = default_gate();
    let guard = HandoffGuard::for_gate(&gate);
    let data = HandoffInputData {
        input_history: vec![
            ConversationItem::user("Flights to Oslo"),
            ConversationItem::assistant("Checking availability"),
            ConversationItem::tool("{\"flights\": 3}"),
        ],
        pre_handoff_items: vec![ConversationItem::tool("lookup")],
        new_items: vec![ConversationItem::assistant("Transferring you")],
    };

    let prepared = guard.prepare(&data);
    assert_eq!(
        prepared.input_history,
        vec![
            ConversationItem::user("Flights to Oslo"),
            ConversationItem::assistant("Checking availability"),
        ]
    );
    assert!(prepared.pre_handoff_items.is_empty());
    assert_eq!(prepared.new_items, data.new_items);
}

#[tokio::test]
async fn test_runtime_handoff_respects_guard() {
    init_tracing();
    let gate = default_gate();
    let runtime = MockAgentRuntime::new()
        .with_handoff_guard(HandoffGuard::for_gate(&gate))
        .shared();
    runtime
        .push(ScriptedReply::Handoff {
            target: HOTEL_AGENT.to_string(),
            answer: "Here are three hotels.".to_string(),
        })
        .await;
    runtime
        .push(ScriptedReply::Handoff {
            target: HOTEL_AGENT.to_string(),
            answer: "I can only help with weather.".to_string(),
        })
        .await;

    let runner = GuardedRunner::new(Arc::clone(&gate), runtime.clone()).with_audit(quiet_audit());
    let input = vec![ConversationItem::user("Find me a hotel in Rome")];

    let admin = runner.run(TRIAGE_AGENT, &input, &admin_user()).await;
    assert_eq!(admin.run().map(|r| r.last_agent.as_str()), Some(HOTEL_AGENT));

    let basic = runner.run(TRIAGE_AGENT, &input, &basic_user()).await;
    assert_eq!(basic.run().map(|r| r.last_agent.as_str()), Some(TRIAGE_AGENT));

    let handoffs = runtime.recorded_handoffs().await;
    assert_eq!(handoffs.len(), 2);
    assert!(handoffs[0].allowed);
    assert!(!handoffs[1].allowed);
    assert!(handoffs[1].delivered.is_none());

    let delivered = handoffs[0].delivered.as_ref().expect("delivered");
    assert!(delivered
        .input_history
        .iter()
        .all(|item| item.role != ItemRole::Tool));
}

#[test]
fn test_permission_is_pure_across_interleaved_users() {
    let users = [super_user(), admin_user(), basic_user(), minor(UserRole::Admin)];
    let targets = [FLIGHT_AGENT, HOTEL_AGENT, WEATHER_AGENT];
    let expected: Vec<Vec<bool>> = users
        .iter()
        .map(|u| targets.iter().map(|t| evaluate_handoff_permission(u, t)).collect())
        .collect();

    for round in 0..4 {
        for (ui, user) in users.iter().enumerate().rev() {
            let ti = (ui + round) % targets.len();
            assert_eq!(
                evaluate_handoff_permission(user, targets[ti]),
                expected[ui][ti],
                "round {round}: {} -> {}",
                user.role(),
                targets[ti]
            );
        }
    }
}

#[tokio::test]
async fn test_handoff_decisions_audited() {
    let gate = default_gate();
    let audit = quiet_audit();
    let guard = HandoffGuard::for_gate(&gate).with_audit(audit.clone());
    let user = basic_user();

    assert!(guard.authorize_audited(&user, WEATHER_AGENT, None).await);
    assert!(!guard.authorize_audited(&user, FLIGHT_AGENT, None).await);

    let events = audit.get_events_by_stage(AuditStage::Handoff, 10).await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].outcome, AuditOutcome::Denied);
    assert_eq!(events[0].code, "handoff_denied");
    assert_eq!(events[1].outcome, AuditOutcome::Passed);
}
