//! Display order for the question list.
//!
//! Questions are ordered by a composite ascending key:
//!
//! 1. not Escalated (Escalated first),
//! 2. Answered (Pending before Answered within a tier),
//! 3. timestamp descending (newest first).
//!
//! The net order is Escalated, then Pending, then Answered, each newest
//! first. Ties on the whole key keep their input order.

use std::cmp::Reverse;

use askline_types::{Question, QuestionStatus};
use chrono::{DateTime, Utc};

/// Returns `questions` in display order.
///
/// Pure and stable: ranking an already ranked list returns it unchanged.
pub fn rank(mut questions: Vec<Question>) -> Vec<Question> {
    questions.sort_by_key(sort_key);
    questions
}

fn sort_key(q: &Question) -> (bool, bool, Reverse<DateTime<Utc>>) {
    (
        q.status != QuestionStatus::Escalated,
        q.status == QuestionStatus::Answered,
        Reverse(q.timestamp),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn q(id: i64, status: QuestionStatus, secs: i64) -> Question {
        Question {
            id,
            content: format!("question {id}"),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            status,
            user_id: None,
            answers: Vec::new(),
        }
    }

    fn ids(questions: &[Question]) -> Vec<i64> {
        questions.iter().map(|q| q.id).collect()
    }

    #[test]
    fn escalated_then_pending_then_answered_newest_first() {
        let input = vec![
            q(1, QuestionStatus::Pending, 1),
            q(2, QuestionStatus::Escalated, 2),
            q(3, QuestionStatus::Answered, 3),
            q(4, QuestionStatus::Escalated, 0),
        ];

        let ranked = rank(input);
        assert_eq!(ids(&ranked), vec![2, 4, 1, 3]);
    }

    #[test]
    fn newer_first_within_each_tier() {
        let input = vec![
            q(1, QuestionStatus::Answered, 10),
            q(2, QuestionStatus::Pending, 10),
            q(3, QuestionStatus::Answered, 30),
            q(4, QuestionStatus::Pending, 20),
            q(5, QuestionStatus::Escalated, 5),
            q(6, QuestionStatus::Pending, 30),
        ];

        let ranked = rank(input);
        assert_eq!(ids(&ranked), vec![5, 6, 4, 2, 3, 1]);
    }

    #[test]
    fn ranking_is_idempotent() {
        let input = vec![
            q(1, QuestionStatus::Answered, 7),
            q(2, QuestionStatus::Pending, 3),
            q(3, QuestionStatus::Escalated, 9),
            q(4, QuestionStatus::Pending, 3),
            q(5, QuestionStatus::Escalated, 1),
        ];

        let once = rank(input);
        let twice = rank(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let input = vec![
            q(9, QuestionStatus::Pending, 5),
            q(3, QuestionStatus::Pending, 5),
            q(6, QuestionStatus::Pending, 5),
        ];

        assert_eq!(ids(&rank(input)), vec![9, 3, 6]);
    }

    #[test]
    fn empty_list() {
        assert!(rank(Vec::new()).is_empty());
    }
}
