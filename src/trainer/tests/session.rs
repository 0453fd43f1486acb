use super::common::*;
use crate::trainer::domain::{SessionId, SpeakerRole, TraineeDecision};
use crate::trainer::scoring::ScoringPolicy;
use crate::trainer::session::{ExchangeOutcome, HintOutcome, TrainingSession, FALLBACK_REPLY};

fn session() -> TrainingSession {
    TrainingSession::new(SessionId("sess-test".to_string()), clock(0))
}

#[test]
fn matched_question_records_both_lines_and_scores_atomically() {
    let scenario = border_scenario();
    let policy = ScoringPolicy::flag_reward(true);
    let mut session = session();
    session.select_scenario(&scenario, clock(0), true);

    let outcome =
        session.submit_question(&scenario, &policy, "  WHAT IS YOUR PURPOSE FOR VISITING?  ", clock(5));

    match outcome {
        ExchangeOutcome::Answered {
            red_flag_hit,
            score,
            emotion,
            ..
        } => {
            assert!(red_flag_hit);
            assert_eq!(score, 2);
            assert_eq!(emotion, "hesitant");
        }
        other => panic!("expected answered exchange, got {other:?}"),
    }

    assert_eq!(session.score(), 2);
    assert_eq!(session.conversation().len(), 2);
    assert_eq!(session.conversation()[0].role, SpeakerRole::Trainee);
    assert_eq!(
        session.conversation()[0].content,
        "WHAT IS YOUR PURPOSE FOR VISITING?"
    );
    assert_eq!(session.conversation()[1].role, SpeakerRole::Scenario);
}

#[test]
fn unrecognized_question_records_the_fallback_reply() {
    let scenario = border_scenario();
    let policy = ScoringPolicy::flag_reward(true);
    let mut session = session();
    session.select_scenario(&scenario, clock(0), true);

    let outcome = session.submit_question(&scenario, &policy, "Why are you here?", clock(3));

    match outcome {
        ExchangeOutcome::Unrecognized { reply, score } => {
            assert_eq!(reply, FALLBACK_REPLY);
            assert_eq!(score, -1);
        }
        other => panic!("expected unrecognized exchange, got {other:?}"),
    }

    assert_eq!(session.conversation().len(), 2);
    assert_eq!(session.conversation()[1].content, FALLBACK_REPLY);
}

#[test]
fn lenient_policy_leaves_score_alone_on_no_match() {
    let scenario = border_scenario();
    let policy = ScoringPolicy::flag_reward(false);
    let mut session = session();
    session.select_scenario(&scenario, clock(0), true);

    session.submit_question(&scenario, &policy, "Why are you here?", clock(3));
    assert_eq!(session.score(), 0);
}

#[test]
fn matched_question_without_red_flag_scores_nothing() {
    let scenario = border_scenario();
    let policy = ScoringPolicy::flag_reward(true);
    let mut session = session();
    session.select_scenario(&scenario, clock(0), true);

    let outcome =
        session.submit_question(&scenario, &policy, "Where will you be staying?", clock(4));

    assert!(matches!(
        outcome,
        ExchangeOutcome::Answered {
            red_flag_hit: false,
            score: 0,
            ..
        }
    ));
}

#[test]
fn scenario_switch_resets_per_scenario_state() {
    let border = border_scenario();
    let dating = dating_scenario();
    let policy = ScoringPolicy::flag_reward(true);
    let mut session = session();

    session.select_scenario(&border, clock(0), true);
    session.submit_question(&border, &policy, "What is your purpose for visiting?", clock(5));
    session.toggle_protocol("Verify visa class under INA 214(b)", true);
    session.validate_protocols(&border, &policy);
    session.record_decision(TraineeDecision {
        label: "Refer".to_string(),
        rationale: "Conflicting account".to_string(),
    });

    assert!(session.score() > 0);
    assert!(session.last_feedback().is_some());

    session.select_scenario(&dating, clock(120), true);

    assert_eq!(session.active_scenario(), Some(dating.id));
    assert_eq!(session.score(), 0);
    assert_eq!(session.started_at(), clock(120));
    assert!(session.selected_protocols().is_empty());
    assert!(session.last_feedback().is_none());
    assert!(!session.hints_revealed());
    assert!(session.decision().is_none());
    assert!(session.conversation().is_empty());
}

#[test]
fn scenario_switch_can_retain_the_conversation_log() {
    let border = border_scenario();
    let dating = dating_scenario();
    let policy = ScoringPolicy::flag_reward(true);
    let mut session = session();

    session.select_scenario(&border, clock(0), false);
    session.submit_question(&border, &policy, "How long will you stay?", clock(5));
    assert_eq!(session.conversation().len(), 2);

    session.select_scenario(&dating, clock(60), false);
    assert_eq!(session.conversation().len(), 2);
    assert_eq!(session.score(), 0);
}

#[test]
fn reselecting_the_active_scenario_is_a_noop() {
    let border = border_scenario();
    let policy = ScoringPolicy::flag_reward(true);
    let mut session = session();

    session.select_scenario(&border, clock(0), true);
    session.submit_question(&border, &policy, "What is your purpose for visiting?", clock(5));
    let score = session.score();

    session.select_scenario(&border, clock(300), true);

    assert_eq!(session.score(), score);
    assert_eq!(session.started_at(), clock(0));
    assert_eq!(session.conversation().len(), 2);
}

#[test]
fn protocol_toggles_accumulate_until_validation() {
    let border = border_scenario();
    let policy = ScoringPolicy::protocol_set();
    let mut session = session();
    session.select_scenario(&border, clock(0), true);

    session.toggle_protocol("Verify visa class under INA 214(b)", true);
    session.toggle_protocol("Made-up protocol", true);
    session.toggle_protocol("Made-up protocol", false);
    session.toggle_protocol("   ", true);

    assert_eq!(session.selected_protocols().len(), 1);

    let review = session.validate_protocols(&border, &policy);
    assert_eq!(review.feedback.correct.len(), 1);
    assert_eq!(review.feedback.missed.len(), 2);
    assert_eq!(review.score_delta, 0);
    assert_eq!(review.score, 0);
    assert_eq!(session.last_feedback(), Some(&review.feedback));
}

#[test]
fn hint_reveal_is_refused_at_zero_and_charged_once() {
    let border = border_scenario();
    let policy = ScoringPolicy::flag_reward(true);
    let mut session = session();
    session.select_scenario(&border, clock(0), true);

    let refused = session.reveal_hints(&border, &policy);
    assert!(matches!(refused, HintOutcome::Refused { score: 0 }));
    assert!(!session.hints_revealed());

    session.submit_question(&border, &policy, "What is your purpose for visiting?", clock(5));
    assert_eq!(session.score(), 2);

    let revealed = session.reveal_hints(&border, &policy);
    match revealed {
        HintOutcome::Revealed {
            hints,
            charged,
            score,
        } => {
            assert!(charged);
            assert_eq!(score, 1);
            assert_eq!(hints.len(), 3);
            assert!(hints
                .iter()
                .any(|hint| hint == "Verify visa class under [Immigration and Nationality Act] [Law]"));
        }
        other => panic!("expected revealed hints, got {other:?}"),
    }

    let again = session.reveal_hints(&border, &policy);
    assert!(matches!(
        again,
        HintOutcome::Revealed {
            charged: false,
            score: 1,
            ..
        }
    ));
    assert_eq!(session.score(), 1);
}

#[test]
fn conversation_tail_returns_the_most_recent_lines() {
    let border = border_scenario();
    let policy = ScoringPolicy::flag_reward(false);
    let mut session = session();
    session.select_scenario(&border, clock(0), true);

    for i in 0..4 {
        session.submit_question(&border, &policy, "How long will you stay?", clock(i));
    }

    assert_eq!(session.conversation().len(), 8);
    let tail = session.conversation_tail(5);
    assert_eq!(tail.len(), 5);
    assert_eq!(tail.last().unwrap().content, session.conversation()[7].content);

    assert_eq!(session.conversation_tail(50).len(), 8);
}
