use chrono::Utc;
use rand::Rng;

use crate::schema::Flashcard;
use crate::util::{percent, shuffle_away};

/// Self-assessment given when moving past a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Outcome {
    Known,
    Learning,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub known: usize,
    pub learning: usize,
}

impl Tally {
    pub fn total(&self) -> usize {
        self.known + self.learning
    }
}

/// A run through a deck of flashcards
#[derive(Debug, Clone)]
pub struct FlashcardSession {
    cards: Vec<Flashcard>,
    index: usize,
    flipped: bool,
    tally: Tally,
}

impl FlashcardSession {
    pub fn new(cards: Vec<Flashcard>) -> Self {
        Self {
            cards,
            index: 0,
            flipped: false,
            tally: Tally::default(),
        }
    }

    pub fn flip(&mut self) {
        if !self.is_done() {
            self.flipped = !self.flipped;
        }
    }

    /// Record `outcome` for the current card and move to the next one.
    /// Returns false once every card has been assessed.
    pub fn mark_and_advance(&mut self, outcome: Outcome) -> bool {
        if self.is_done() {
            return false;
        }

        match outcome {
            Outcome::Known => self.tally.known += 1,
            Outcome::Learning => self.tally.learning += 1,
        }
        let card = &mut self.cards[self.index];
        card.times_reviewed = card.times_reviewed.saturating_add(1);
        card.last_reviewed = Some(Utc::now());

        self.flipped = false;
        self.index = (self.index + 1) % self.cards.len();
        true
    }

    pub fn shuffle(&mut self) {
        self.shuffle_with_rng(&mut rand::thread_rng());
    }

    pub fn shuffle_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        shuffle_away(&mut self.cards, rng);
        self.restart();
    }

    /// Back to the first card with an empty tally; order is kept
    pub fn restart(&mut self) {
        self.index = 0;
        self.flipped = false;
        self.tally = Tally::default();
    }

    pub fn is_done(&self) -> bool {
        self.tally.total() == self.cards.len()
    }

    pub fn current(&self) -> Option<&Flashcard> {
        self.cards.get(self.index)
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn progress_percent(&self) -> u16 {
        percent(self.tally.total(), self.cards.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn deck(n: usize) -> Vec<Flashcard> {
        (0..n)
            .map(|i| Flashcard::new(format!("term {i}"), format!("definition {i}")))
            .collect()
    }

    #[test]
    fn two_card_scenario() {
        let mut session = FlashcardSession::new(deck(2));

        assert!(session.mark_and_advance(Outcome::Known));
        assert!(session.mark_and_advance(Outcome::Learning));

        assert_eq!(
            session.tally(),
            Tally {
                known: 1,
                learning: 1
            }
        );
        assert!(session.is_done());

        let index = session.index();
        assert!(!session.mark_and_advance(Outcome::Known));
        assert_eq!(session.index(), index);
        assert_eq!(session.tally().total(), 2);
    }

    #[test]
    fn advance_clears_flip_and_wraps() {
        let mut session = FlashcardSession::new(deck(3));
        session.flip();
        assert!(session.is_flipped());

        session.mark_and_advance(Outcome::Learning);
        assert!(!session.is_flipped());
        assert_eq!(session.index(), 1);

        session.mark_and_advance(Outcome::Learning);
        session.mark_and_advance(Outcome::Learning);
        assert_eq!(session.index(), 0);
    }

    #[test]
    fn advance_records_review() {
        let mut session = FlashcardSession::new(deck(2));
        session.mark_and_advance(Outcome::Known);

        let reviewed = &session.cards()[0];
        assert_eq!(reviewed.times_reviewed, 1);
        assert!(reviewed.last_reviewed.is_some());
        assert_eq!(session.cards()[1].times_reviewed, 0);
    }

    #[test]
    fn flip_is_ignored_when_done() {
        let mut session = FlashcardSession::new(deck(1));
        session.mark_and_advance(Outcome::Known);
        session.flip();
        assert!(!session.is_flipped());
    }

    #[test]
    fn shuffle_resets_progress() {
        let mut session = FlashcardSession::new(deck(10));
        session.flip();
        session.mark_and_advance(Outcome::Known);
        session.mark_and_advance(Outcome::Learning);

        session.shuffle_with_rng(&mut StdRng::seed_from_u64(3));

        assert_eq!(session.index(), 0);
        assert!(!session.is_flipped());
        assert_eq!(session.tally(), Tally::default());
        assert_eq!(session.cards().len(), 10);
        let terms: Vec<&str> = session.cards().iter().map(|c| c.term.as_str()).collect();
        let original: Vec<String> = deck(10).into_iter().map(|c| c.term).collect();
        assert_ne!(terms, original);
    }

    #[test]
    fn restart_keeps_order() {
        let mut session = FlashcardSession::new(deck(4));
        session.mark_and_advance(Outcome::Known);
        session.mark_and_advance(Outcome::Known);

        session.restart();

        assert_eq!(session.index(), 0);
        assert_eq!(session.tally(), Tally::default());
        assert_eq!(session.current().unwrap().term, "term 0");
        assert!(!session.is_done());
    }

    #[test]
    fn progress() {
        let mut session = FlashcardSession::new(deck(4));
        session.mark_and_advance(Outcome::Known);
        assert_eq!(session.progress_percent(), 25);
    }
}
