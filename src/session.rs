use std::time::Duration;

use crate::flashcards::FlashcardSession;
use crate::matching::MatchingSession;
use crate::quiz::QuizSession;
use crate::schema::{Artifact, ArtifactKind};

/// The practice session built from one validated artifact
#[derive(Debug, Clone)]
pub enum Session {
    Flashcards(FlashcardSession),
    Quiz(QuizSession),
    Matching(MatchingSession),
}

impl Session {
    pub fn from_artifact(artifact: Artifact) -> Self {
        match artifact {
            Artifact::Flashcards(cards) => Session::Flashcards(FlashcardSession::new(cards)),
            Artifact::Quiz(questions) => Session::Quiz(QuizSession::new(questions)),
            Artifact::MatchingGame(pairs) => Session::Matching(MatchingSession::from_pairs(pairs)),
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        match self {
            Session::Flashcards(_) => ArtifactKind::Flashcards,
            Session::Quiz(_) => ArtifactKind::Quiz,
            Session::Matching(_) => ArtifactKind::MatchingGame,
        }
    }

    /// Reset progress but keep the generated content
    pub fn restart(&mut self) {
        match self {
            Session::Flashcards(s) => s.restart(),
            Session::Quiz(s) => s.restart(),
            Session::Matching(s) => s.restart(),
        }
    }

    pub fn on_tick(&mut self, dt: Duration) {
        if let Session::Matching(s) = self {
            s.on_tick(dt);
        }
    }

    pub fn is_done(&self) -> bool {
        match self {
            Session::Flashcards(s) => s.is_done(),
            Session::Quiz(s) => s.is_submitted(),
            Session::Matching(s) => s.is_done(),
        }
    }

    /// Called before the session is dropped
    pub fn teardown(&mut self) {
        if let Session::Matching(s) = self {
            s.cancel_timer();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Flashcard, Pair};

    #[test]
    fn builds_the_session_for_each_kind() {
        let cards = Session::from_artifact(Artifact::Flashcards(vec![Flashcard::new("a", "b")]));
        assert_eq!(cards.kind(), ArtifactKind::Flashcards);

        let quiz = Session::from_artifact(Artifact::Quiz(vec![]));
        assert_eq!(quiz.kind(), ArtifactKind::Quiz);

        let matching = Session::from_artifact(Artifact::MatchingGame(vec![Pair::new("a", "b")]));
        assert_eq!(matching.kind(), ArtifactKind::MatchingGame);
        assert!(!matching.is_done());
    }

    #[test]
    fn ticks_only_reach_the_matching_clock() {
        let mut session =
            Session::from_artifact(Artifact::MatchingGame(vec![Pair::new("a", "b")]));
        session.on_tick(Duration::from_secs(2));
        let Session::Matching(ref m) = session else {
            panic!("expected matching session");
        };
        assert_eq!(m.elapsed_secs(), 2);

        session.teardown();
        session.on_tick(Duration::from_secs(2));
        let Session::Matching(m) = session else {
            panic!("expected matching session");
        };
        assert_eq!(m.elapsed_secs(), 2);
    }

    #[test]
    fn restart_dispatches() {
        let mut session = Session::from_artifact(Artifact::Flashcards(vec![Flashcard::new("a", "b")]));
        if let Session::Flashcards(ref mut s) = session {
            s.mark_and_advance(crate::flashcards::Outcome::Known);
        }
        assert!(session.is_done());
        session.restart();
        assert!(!session.is_done());
    }
}
