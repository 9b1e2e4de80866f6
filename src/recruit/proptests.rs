//! Property-based tests for recruitment sessions
//!
//! Tests for:
//! - Relative deadlines: `N{m|h}` is exactly N minutes/hours
//! - Clock deadlines: always the next occurrence, within one day
//! - Roster bounds: no duplicates, never above capacity, frozen once closed

use super::deadline::parse_deadline;
use super::session::{CloseReason, RecruitmentSession, SessionState, Transition};
use crate::chat::traits::UserId;
use chrono::{FixedOffset, TimeZone, Timelike, Utc};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Join(u8),
    Leave(u8),
    Cancel(u8),
    Expire,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..8).prop_map(Op::Join),
        2 => (0u8..8).prop_map(Op::Leave),
        1 => (0u8..8).prop_map(Op::Cancel),
        1 => Just(Op::Expire),
    ]
}

fn user(id: u8) -> UserId {
    UserId(format!("user-{}", id))
}

proptest! {
    /// Relative forms are a pure unit conversion
    #[test]
    fn prop_relative_minutes_and_hours(n in 0u64..1_000_000) {
        let now = Utc::now();
        prop_assert_eq!(
            parse_deadline(&format!("{}m", n), &now).unwrap().as_millis(),
            u128::from(n) * 60_000
        );
        prop_assert_eq!(
            parse_deadline(&format!("{}h", n), &now).unwrap().as_millis(),
            u128::from(n) * 3_600_000
        );
    }

    /// Clock forms land on the requested wall-clock time, strictly in the
    /// future and no more than a day away
    #[test]
    fn prop_clock_lands_on_next_occurrence(
        hour in 0u32..24,
        minute in 0u32..60,
        offset_hours in -12i32..=14,
        now_secs in 1_600_000_000i64..1_900_000_000,
    ) {
        let tz = FixedOffset::east_opt(offset_hours * 3600).unwrap();
        let now = tz.timestamp_opt(now_secs, 0).unwrap();

        let remaining = parse_deadline(&format!("{}:{:02}", hour, minute), &now).unwrap();
        prop_assert!(remaining.as_secs() > 0);
        prop_assert!(remaining.as_secs() <= 24 * 3600);

        let landed = now + chrono::Duration::from_std(remaining).unwrap();
        prop_assert_eq!(landed.hour(), hour);
        prop_assert_eq!(landed.minute(), minute);
        prop_assert_eq!(landed.second(), 0);
    }

    /// Arbitrary event sequences never break the roster invariants
    #[test]
    fn prop_roster_invariants(
        capacity in 1u32..6,
        ops in proptest::collection::vec(op(), 0..40),
    ) {
        let owner = user(0);
        let mut session = RecruitmentSession::new(owner.clone(), capacity, Utc::now());

        for op in ops {
            let was_open = session.is_open();
            let before: Vec<UserId> = session.participants().to_vec();

            let result = match &op {
                Op::Join(id) => session.join(user(*id)),
                Op::Leave(id) => session.leave(&user(*id)),
                Op::Cancel(id) => session.cancel(&user(*id)),
                Op::Expire => session.expire(),
            };

            let roster = session.participants();
            let unique: HashSet<_> = roster.iter().collect();
            prop_assert_eq!(unique.len(), roster.len(), "duplicate participant");
            prop_assert!(roster.len() <= capacity as usize);

            if !was_open {
                prop_assert!(result.is_err());
                prop_assert_eq!(roster, before.as_slice());
                continue;
            }

            match (&op, result) {
                (Op::Join(id), Ok(Transition::Closed(CloseReason::LimitReached))) => {
                    prop_assert_eq!(roster.len(), capacity as usize);
                    prop_assert_eq!(roster.last(), Some(&user(*id)));
                }
                (Op::Join(id), Ok(Transition::Updated)) => {
                    prop_assert!(roster.len() < capacity as usize);
                    prop_assert!(roster.contains(&user(*id)));
                    if before.contains(&user(*id)) {
                        prop_assert_eq!(roster, before.as_slice());
                    }
                }
                (Op::Cancel(id), Ok(_)) => {
                    prop_assert_eq!(&user(*id), &owner);
                    prop_assert_eq!(session.state(), SessionState::Closed(CloseReason::Canceled));
                }
                (Op::Cancel(id), Err(_)) => {
                    prop_assert_ne!(&user(*id), &owner);
                    prop_assert!(session.is_open());
                }
                (Op::Leave(id), Err(_)) => {
                    prop_assert!(!before.contains(&user(*id)));
                    prop_assert_eq!(roster, before.as_slice());
                }
                (Op::Leave(id), Ok(_)) => {
                    prop_assert!(!roster.contains(&user(*id)));
                    prop_assert_eq!(roster.len() + 1, before.len());
                }
                (Op::Expire, result) => {
                    prop_assert_eq!(result, Ok(Transition::Closed(CloseReason::DeadlineExpired)));
                }
                (op, result) => {
                    prop_assert!(false, "unexpected outcome {:?} for {:?}", result, op);
                }
            }
        }
    }
}
