use crate::schema::{AnswerKey, Question};
use crate::util::percent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
    pub percent: u16,
}

/// A single attempt at a multiple-choice quiz
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<Question>,
    answers: Vec<Option<AnswerKey>>,
    index: usize,
    submitted: bool,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Self {
        let answers = vec![None; questions.len()];
        Self {
            questions,
            answers,
            index: 0,
            submitted: false,
        }
    }

    /// Record an answer for the current question
    pub fn choose(&mut self, answer: AnswerKey) {
        if self.submitted {
            return;
        }
        if let Some(slot) = self.answers.get_mut(self.index) {
            *slot = Some(answer);
        }
    }

    pub fn next(&mut self) -> bool {
        if self.index + 1 < self.questions.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn previous(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    pub fn all_answered(&self) -> bool {
        self.answers.iter().all(Option::is_some)
    }

    /// Lock in the answers. Refused until every question has one.
    pub fn submit(&mut self) -> bool {
        if self.submitted || !self.all_answered() {
            return false;
        }
        self.submitted = true;
        self.index = 0;
        true
    }

    pub fn score(&self) -> Option<Score> {
        if !self.submitted {
            return None;
        }
        let correct = self
            .questions
            .iter()
            .zip(&self.answers)
            .filter(|(q, a)| **a == Some(q.answer))
            .count();
        Some(Score {
            correct,
            total: self.questions.len(),
            percent: percent(correct, self.questions.len()),
        })
    }

    pub fn restart(&mut self) {
        self.answers.iter_mut().for_each(|a| *a = None);
        self.index = 0;
        self.submitted = false;
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    pub fn current_answer(&self) -> Option<AnswerKey> {
        self.answers.get(self.index).copied().flatten()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }
}
