use crate::bank::{Question, QuizDefinition};
use std::error::Error;
use std::fmt;

/// Errors a session can surface. Illegal user intents (double submit,
/// advancing before reveal, out-of-range selection) are not errors; they are
/// silent no-ops, since the UI disables those controls anyway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The theme has no quiz content; the UI shows a not-found screen.
    InvalidQuiz,
    /// Final score queried before the last question was advanced past.
    SessionNotComplete,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidQuiz => write!(f, "quiz has no questions"),
            SessionError::SessionNotComplete => write!(f, "quiz session is not complete"),
        }
    }
}

impl Error for SessionError {}

/// Qualitative bucket for a completed session's percent score.
/// Inclusive lower bounds; a 90 is Outstanding, not Great.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "title_case")]
pub enum Tier {
    Outstanding,
    Great,
    Okay,
    NeedsPractice,
}

impl Tier {
    pub fn from_percent(percent: u32) -> Self {
        match percent {
            90.. => Tier::Outstanding,
            70.. => Tier::Great,
            50.. => Tier::Okay,
            _ => Tier::NeedsPractice,
        }
    }

    /// Feedback copy shown on the results screen.
    pub fn message(&self) -> &'static str {
        match self {
            Tier::Outstanding => "Outstanding! You're a geography star!",
            Tier::Great => "Great job! Keep exploring!",
            Tier::Okay => "Good effort! A little more practice and you'll ace it.",
            Tier::NeedsPractice => "Needs practice. Try the quiz again!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalScore {
    pub correct: usize,
    pub total: usize,
    pub percent: u32,
    pub tier: Tier,
}

/// One learner's attempt at one quiz, from start to completion or reset.
///
/// The session moves Answering -> Revealed per question; after the last
/// question is advanced past, `current_index == questions.len()` and the
/// session is complete. Correctness commits on `advance`, not `submit`, so
/// the reveal screen can still read the running score for prior questions.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    pub quiz: QuizDefinition,
    pub current_index: usize,
    pub selected_option: Option<usize>,
    pub result_revealed: bool,
    pub correct_count: usize,
    pub history: Vec<bool>,
}

impl QuizSession {
    pub fn start(quiz: QuizDefinition) -> Result<Self, SessionError> {
        if quiz.questions.is_empty() {
            return Err(SessionError::InvalidQuiz);
        }
        Ok(Self {
            quiz,
            current_index: 0,
            selected_option: None,
            result_revealed: false,
            correct_count: 0,
            history: vec![],
        })
    }

    /// The active question, or None once the session is complete.
    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.questions.get(self.current_index)
    }

    /// Pick an answer. No-op when the index is out of range for the current
    /// question, once the result is revealed, or after completion.
    pub fn select_option(&mut self, option_index: usize) {
        if self.result_revealed {
            return;
        }
        let Some(question) = self.current_question() else {
            return;
        };
        if option_index < question.options.len() {
            self.selected_option = Some(option_index);
        }
    }

    /// Disclose correctness of the current selection. No-op without a
    /// selection and on double submission. Score and history stay untouched
    /// until `advance`.
    pub fn submit(&mut self) {
        if self.selected_option.is_none() || self.result_revealed || self.is_complete() {
            return;
        }
        self.result_revealed = true;
    }

    /// Commit the revealed answer and move on: next question, or the
    /// completed terminal state after the last one. No-op unless revealed.
    pub fn advance(&mut self) {
        if !self.result_revealed {
            return;
        }
        let correct = match (self.current_question(), self.selected_option) {
            (Some(q), Some(sel)) => sel == q.correct_index,
            _ => false,
        };
        self.history.push(correct);
        if correct {
            self.correct_count += 1;
        }

        self.current_index += 1;
        self.selected_option = None;
        self.result_revealed = false;
    }

    /// Back to zero progress on the same quiz.
    pub fn reset(&mut self) {
        self.current_index = 0;
        self.selected_option = None;
        self.result_revealed = false;
        self.correct_count = 0;
        self.history.clear();
    }

    pub fn is_complete(&self) -> bool {
        self.current_index >= self.quiz.questions.len()
    }

    /// Exact rational progress through the quiz; rounding is up to the
    /// presentation layer.
    pub fn progress_percent(&self) -> f64 {
        let len = self.quiz.questions.len();
        if self.is_complete() {
            100.0
        } else {
            100.0 * (self.current_index + 1) as f64 / len as f64
        }
    }

    pub fn final_score(&self) -> Result<FinalScore, SessionError> {
        if !self.is_complete() {
            return Err(SessionError::SessionNotComplete);
        }
        let total = self.quiz.questions.len();
        let percent = (100.0 * self.correct_count as f64 / total as f64).round() as u32;
        Ok(FinalScore {
            correct: self.correct_count,
            total,
            percent,
            tier: Tier::from_percent(percent),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::Difficulty;
    use assert_matches::assert_matches;

    fn question(id: u32, correct_index: usize) -> Question {
        Question {
            id,
            prompt: format!("question {id}"),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index,
            explanation: "because".into(),
            difficulty: Difficulty::Easy,
        }
    }

    fn quiz(num_questions: u32) -> QuizDefinition {
        QuizDefinition {
            title: "Test Quiz".into(),
            questions: (1..=num_questions).map(|id| question(id, 0)).collect(),
        }
    }

    fn answer(session: &mut QuizSession, option: usize) {
        session.select_option(option);
        session.submit();
        session.advance();
    }

    fn assert_invariants(session: &QuizSession) {
        assert!(session.current_index <= session.quiz.questions.len());
        assert_eq!(
            session.correct_count,
            session.history.iter().filter(|b| **b).count()
        );
        if !session.result_revealed && !session.is_complete() {
            assert_eq!(session.history.len(), session.current_index);
        }
    }

    #[test]
    fn test_start_fresh_state() {
        let session = QuizSession::start(quiz(3)).unwrap();

        assert_eq!(session.current_index, 0);
        assert_eq!(session.selected_option, None);
        assert!(!session.result_revealed);
        assert_eq!(session.correct_count, 0);
        assert!(session.history.is_empty());
        assert!(!session.is_complete());
        assert_invariants(&session);
    }

    #[test]
    fn test_start_empty_quiz_fails() {
        let empty = QuizDefinition {
            title: "Empty".into(),
            questions: vec![],
        };

        assert_matches!(QuizSession::start(empty), Err(SessionError::InvalidQuiz));
    }

    #[test]
    fn test_select_option_in_range() {
        let mut session = QuizSession::start(quiz(1)).unwrap();

        session.select_option(2);
        assert_eq!(session.selected_option, Some(2));

        // Idempotent: selecting the same option again changes nothing
        let before = session.clone();
        session.select_option(2);
        assert_eq!(session, before);
    }

    #[test]
    fn test_select_option_out_of_range_is_noop() {
        let mut session = QuizSession::start(quiz(1)).unwrap();

        session.select_option(4);
        assert_eq!(session.selected_option, None);

        session.select_option(usize::MAX);
        assert_eq!(session.selected_option, None);
        assert_invariants(&session);
    }

    #[test]
    fn test_select_option_locked_after_reveal() {
        let mut session = QuizSession::start(quiz(1)).unwrap();
        session.select_option(1);
        session.submit();

        session.select_option(3);
        assert_eq!(session.selected_option, Some(1));
    }

    #[test]
    fn test_submit_without_selection_is_noop() {
        let mut session = QuizSession::start(quiz(1)).unwrap();
        let before = session.clone();

        session.submit();
        assert_eq!(session, before);
    }

    #[test]
    fn test_double_submit_is_noop() {
        let mut session = QuizSession::start(quiz(1)).unwrap();
        session.select_option(0);
        session.submit();
        let before = session.clone();

        session.submit();
        assert_eq!(session, before);
    }

    #[test]
    fn test_submit_commits_nothing_yet() {
        let mut session = QuizSession::start(quiz(2)).unwrap();
        session.select_option(0);
        session.submit();

        // Reveal discloses correctness but the score only moves on advance
        assert!(session.result_revealed);
        assert_eq!(session.correct_count, 0);
        assert!(session.history.is_empty());
        assert_invariants(&session);
    }

    #[test]
    fn test_advance_before_reveal_is_noop() {
        let mut session = QuizSession::start(quiz(2)).unwrap();
        let before = session.clone();

        session.advance();
        assert_eq!(session, before);

        session.select_option(0);
        let before = session.clone();
        session.advance();
        assert_eq!(session, before);
    }

    #[test]
    fn test_advance_commits_and_moves_on() {
        let mut session = QuizSession::start(quiz(2)).unwrap();
        session.select_option(0); // correct
        session.submit();
        session.advance();

        assert_eq!(session.current_index, 1);
        assert_eq!(session.selected_option, None);
        assert!(!session.result_revealed);
        assert_eq!(session.correct_count, 1);
        assert_eq!(session.history, vec![true]);
        assert_invariants(&session);
    }

    #[test]
    fn test_advance_records_incorrect_answer() {
        let mut session = QuizSession::start(quiz(2)).unwrap();
        answer(&mut session, 3); // wrong

        assert_eq!(session.correct_count, 0);
        assert_eq!(session.history, vec![false]);
        assert_invariants(&session);
    }

    #[test]
    fn test_last_advance_enters_completed() {
        let mut session = QuizSession::start(quiz(1)).unwrap();
        answer(&mut session, 0);

        assert!(session.is_complete());
        assert_eq!(session.current_index, session.quiz.questions.len());
        assert!(session.current_question().is_none());
        assert_invariants(&session);
    }

    #[test]
    fn test_advance_twice_mutates_once() {
        let mut session = QuizSession::start(quiz(3)).unwrap();
        session.select_option(0);
        session.submit();
        session.advance();
        let after_first = session.clone();

        session.advance();
        assert_eq!(session, after_first);
    }

    #[test]
    fn test_no_transition_leaves_completed() {
        let mut session = QuizSession::start(quiz(1)).unwrap();
        answer(&mut session, 0);
        let completed = session.clone();

        session.select_option(0);
        session.submit();
        session.advance();
        assert_eq!(session, completed);
    }

    #[test]
    fn test_reset_equals_fresh_start() {
        let mut session = QuizSession::start(quiz(2)).unwrap();
        answer(&mut session, 0);
        answer(&mut session, 1);
        assert!(session.is_complete());

        session.reset();
        let fresh = QuizSession::start(session.quiz.clone()).unwrap();
        assert_eq!(session, fresh);
    }

    #[test]
    fn test_reset_mid_session() {
        let mut session = QuizSession::start(quiz(3)).unwrap();
        answer(&mut session, 0);
        session.select_option(2);
        session.submit();

        session.reset();
        assert_eq!(session, QuizSession::start(session.quiz.clone()).unwrap());
    }

    #[test]
    fn test_progress_percent() {
        let mut session = QuizSession::start(quiz(3)).unwrap();
        assert!((session.progress_percent() - 100.0 / 3.0).abs() < 1e-9);

        answer(&mut session, 0);
        assert!((session.progress_percent() - 200.0 / 3.0).abs() < 1e-9);

        answer(&mut session, 0);
        assert_eq!(session.progress_percent(), 100.0);
        assert!(!session.is_complete());

        answer(&mut session, 0);
        assert_eq!(session.progress_percent(), 100.0);
        assert!(session.is_complete());
    }

    #[test]
    fn test_final_score_before_completion_fails() {
        let mut session = QuizSession::start(quiz(2)).unwrap();
        assert_matches!(session.final_score(), Err(SessionError::SessionNotComplete));

        answer(&mut session, 0);
        assert_matches!(session.final_score(), Err(SessionError::SessionNotComplete));
    }

    #[test]
    fn test_final_score_two_of_three() {
        let mut session = QuizSession::start(quiz(3)).unwrap();
        answer(&mut session, 0); // correct
        answer(&mut session, 0); // correct
        answer(&mut session, 1); // wrong

        let score = session.final_score().unwrap();
        assert_eq!(score.correct, 2);
        assert_eq!(score.total, 3);
        assert_eq!(score.percent, 67);
        assert_eq!(score.tier, Tier::Okay);
    }

    #[test]
    fn test_final_score_perfect() {
        let mut session = QuizSession::start(quiz(2)).unwrap();
        answer(&mut session, 0);
        answer(&mut session, 0);

        let score = session.final_score().unwrap();
        assert_eq!(score.correct, 2);
        assert_eq!(score.total, 2);
        assert_eq!(score.percent, 100);
        assert_eq!(score.tier, Tier::Outstanding);
    }

    #[test]
    fn test_tier_display_names() {
        assert_eq!(Tier::Outstanding.to_string(), "Outstanding");
        assert_eq!(Tier::NeedsPractice.to_string(), "Needs Practice");
    }

    #[test]
    fn test_tier_boundaries_inclusive() {
        assert_eq!(Tier::from_percent(100), Tier::Outstanding);
        assert_eq!(Tier::from_percent(90), Tier::Outstanding);
        assert_eq!(Tier::from_percent(89), Tier::Great);
        assert_eq!(Tier::from_percent(70), Tier::Great);
        assert_eq!(Tier::from_percent(69), Tier::Okay);
        assert_eq!(Tier::from_percent(50), Tier::Okay);
        assert_eq!(Tier::from_percent(49), Tier::NeedsPractice);
        assert_eq!(Tier::from_percent(0), Tier::NeedsPractice);
    }

    #[test]
    fn test_invariants_across_random_walk() {
        // Hammer the session with a fixed pseudo-random intent sequence and
        // check the invariants hold after every step.
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(42);
        let mut session = QuizSession::start(quiz(4)).unwrap();

        for _ in 0..500 {
            match rng.gen_range(0..5) {
                0 => session.select_option(rng.gen_range(0..6)),
                1 => session.submit(),
                2 => session.advance(),
                3 => {
                    if rng.gen_bool(0.05) {
                        session.reset();
                    }
                }
                _ => {
                    let _ = session.progress_percent();
                    let _ = session.is_complete();
                }
            }
            assert_invariants(&session);
        }
    }

    #[test]
    fn test_session_error_display() {
        assert_eq!(
            SessionError::InvalidQuiz.to_string(),
            "quiz has no questions"
        );
        assert_eq!(
            SessionError::SessionNotComplete.to_string(),
            "quiz session is not complete"
        );
    }
}
