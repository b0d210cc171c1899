//! Matching game session.
//!
//! Tiles are identified by position, never by text: two tiles match only when
//! they were generated from the same pair. Time is fed in through
//! [`MatchingSession::on_tick`], so the whole state machine runs without a
//! clock or a terminal.

use std::time::Duration;

use log::{debug, info};
use rand::Rng;

use crate::schema::Pair;
use crate::util::{percent, shuffle_away};

/// How long a picked pair stays highlighted before the selection clears
pub const FEEDBACK_WINDOW: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub text: String,
    /// Index of the pair this tile was flattened from
    pub pair: usize,
    pub side: Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Playing,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    Match,
    Mismatch,
}

/// Where a playing session stands between two user picks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    AwaitingFirstPick,
    AwaitingSecondPick,
    ShowingFeedback(PickOutcome),
}

/// What a call to [`MatchingSession::select`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Ignored,
    FirstPick,
    Picked(PickOutcome),
}

#[derive(Debug, Clone, Copy)]
struct Feedback {
    outcome: PickOutcome,
    remaining: Duration,
}

/// Counts whole seconds out of arbitrary tick lengths
#[derive(Debug, Clone, Default)]
struct Stopwatch {
    carry: Duration,
}

impl Stopwatch {
    fn advance(&mut self, dt: Duration) -> u64 {
        self.carry += dt;
        let secs = self.carry.as_secs();
        self.carry -= Duration::from_secs(secs);
        secs
    }
}

#[derive(Debug, Clone)]
pub struct MatchingSession {
    pairs: Vec<Pair>,
    items: Vec<Tile>,
    selected: Vec<usize>,
    matched: Vec<usize>,
    elapsed_secs: u64,
    feedback: Option<Feedback>,
    // None whenever the clock must not run: loading, done, or torn down
    stopwatch: Option<Stopwatch>,
    phase: Phase,
}

impl Default for MatchingSession {
    fn default() -> Self {
        Self {
            pairs: Vec::new(),
            items: Vec::new(),
            selected: Vec::new(),
            matched: Vec::new(),
            elapsed_secs: 0,
            feedback: None,
            stopwatch: None,
            phase: Phase::Loading,
        }
    }
}

impl MatchingSession {
    /// A session still waiting for its pairs
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: Vec<Pair>) -> Self {
        let mut session = Self::new();
        session.load(pairs);
        session
    }

    pub fn load(&mut self, pairs: Vec<Pair>) {
        self.load_with_rng(pairs, &mut rand::thread_rng());
    }

    /// Flatten `pairs` into tiles, shuffle them and start playing
    pub fn load_with_rng<R: Rng + ?Sized>(&mut self, pairs: Vec<Pair>, rng: &mut R) {
        let mut items: Vec<Tile> = pairs
            .iter()
            .enumerate()
            .flat_map(|(idx, pair)| {
                [
                    Tile {
                        text: pair.left_item.clone(),
                        pair: idx,
                        side: Side::Left,
                    },
                    Tile {
                        text: pair.right_item.clone(),
                        pair: idx,
                        side: Side::Right,
                    },
                ]
            })
            .collect();
        shuffle_away(&mut items, rng);

        debug!("matching game loaded with {} tiles", items.len());
        self.pairs = pairs;
        self.items = items;
        self.phase = Phase::Playing;
        self.restart();
    }

    /// Clear progress and the clock; tile order is kept
    pub fn restart(&mut self) {
        if self.phase == Phase::Loading {
            return;
        }
        self.selected.clear();
        self.matched.clear();
        self.elapsed_secs = 0;
        self.feedback = None;
        self.phase = Phase::Playing;
        self.stopwatch = Some(Stopwatch::default());
        self.finish_if_complete();
    }

    pub fn select(&mut self, pos: usize) -> Selection {
        if self.phase != Phase::Playing
            || pos >= self.items.len()
            || self.feedback.is_some()
            || self.matched.contains(&pos)
        {
            return Selection::Ignored;
        }

        let first = match self.selected.as_slice() {
            [] => {
                self.selected.push(pos);
                return Selection::FirstPick;
            }
            [first] if *first == pos => return Selection::Ignored,
            [first] => *first,
            _ => return Selection::Ignored,
        };

        self.selected.push(pos);
        let outcome = if self.items[first].pair == self.items[pos].pair {
            self.matched.push(first);
            self.matched.push(pos);
            PickOutcome::Match
        } else {
            PickOutcome::Mismatch
        };
        debug!(
            "picked {:?} and {:?}: {:?}",
            self.items[first].text, self.items[pos].text, outcome
        );

        self.feedback = Some(Feedback {
            outcome,
            remaining: FEEDBACK_WINDOW,
        });
        self.finish_if_complete();
        Selection::Picked(outcome)
    }

    /// Advance the feedback window and the clock by `dt`
    pub fn on_tick(&mut self, dt: Duration) {
        if let Some(feedback) = self.feedback.as_mut() {
            feedback.remaining = feedback.remaining.saturating_sub(dt);
            if feedback.remaining.is_zero() {
                self.feedback = None;
                self.selected.clear();
            }
        }

        if let Some(stopwatch) = self.stopwatch.as_mut() {
            self.elapsed_secs += stopwatch.advance(dt);
        }
    }

    /// Stop the clock for good, e.g. when the session is torn down
    pub fn cancel_timer(&mut self) {
        self.stopwatch = None;
    }

    fn finish_if_complete(&mut self) {
        if self.phase == Phase::Playing && self.matched.len() == self.items.len() {
            self.phase = Phase::Done;
            self.stopwatch = None;
            info!("matching game completed in {}s", self.elapsed_secs);
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn(&self) -> Option<Turn> {
        if self.phase == Phase::Loading {
            return None;
        }
        Some(match (self.feedback, self.selected.len()) {
            (Some(feedback), _) => Turn::ShowingFeedback(feedback.outcome),
            (None, 0) => Turn::AwaitingFirstPick,
            (None, _) => Turn::AwaitingSecondPick,
        })
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn is_timer_running(&self) -> bool {
        self.stopwatch.is_some()
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(
            self.feedback,
            Some(Feedback {
                outcome: PickOutcome::Mismatch,
                ..
            })
        )
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn items(&self) -> &[Tile] {
        &self.items
    }

    /// Positions currently picked, first pick first
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    /// Positions confirmed paired, in the order they were matched
    pub fn matched(&self) -> &[usize] {
        &self.matched
    }

    pub fn matched_items(&self) -> Vec<&str> {
        self.matched
            .iter()
            .map(|&pos| self.items[pos].text.as_str())
            .collect()
    }

    pub fn is_selected(&self, pos: usize) -> bool {
        self.selected.contains(&pos)
    }

    pub fn is_matched(&self, pos: usize) -> bool {
        self.matched.contains(&pos)
    }

    /// Seconds on the clock; the final value is the score once done
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn progress_percent(&self) -> u16 {
        percent(self.matched.len(), self.items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pairs(n: usize) -> Vec<Pair> {
        (0..n)
            .map(|i| Pair::new(format!("term {i}"), format!("definition {i}")))
            .collect()
    }

    fn session(n: usize, seed: u64) -> MatchingSession {
        let mut s = MatchingSession::new();
        s.load_with_rng(pairs(n), &mut StdRng::seed_from_u64(seed));
        s
    }

    fn position_of(s: &MatchingSession, text: &str) -> usize {
        s.items().iter().position(|t| t.text == text).unwrap()
    }

    /// Position of the tile paired with `pos`
    fn partner_of(s: &MatchingSession, pos: usize) -> usize {
        let tile = &s.items()[pos];
        s.items()
            .iter()
            .enumerate()
            .position(|(i, t)| i != pos && t.pair == tile.pair)
            .unwrap()
    }

    fn wrong_partner_of(s: &MatchingSession, pos: usize) -> usize {
        let tile = &s.items()[pos];
        s.items().iter().position(|t| t.pair != tile.pair).unwrap()
    }

    fn solve(s: &mut MatchingSession) {
        while !s.is_done() {
            let first = (0..s.items().len()).find(|&p| !s.is_matched(p)).unwrap();
            let second = partner_of(s, first);
            s.select(first);
            s.select(second);
            s.on_tick(FEEDBACK_WINDOW);
        }
    }

    #[test]
    fn new_session_is_loading() {
        let mut s = MatchingSession::new();
        assert_eq!(s.phase(), Phase::Loading);
        assert_eq!(s.turn(), None);
        assert_eq!(s.select(0), Selection::Ignored);

        s.on_tick(Duration::from_secs(3));
        assert_eq!(s.elapsed_secs(), 0);
        assert!(!s.is_timer_running());
    }

    #[test]
    fn load_flattens_every_pair() {
        let s = session(8, 1);

        assert_eq!(s.items().len(), 16);
        assert_eq!(s.phase(), Phase::Playing);
        assert!(s.is_timer_running());
        for (idx, pair) in s.pairs().iter().enumerate() {
            let tiles: Vec<&Tile> = s.items().iter().filter(|t| t.pair == idx).collect();
            assert_eq!(tiles.len(), 2);
            assert!(tiles.iter().any(|t| t.text == pair.left_item && t.side == Side::Left));
            assert!(tiles.iter().any(|t| t.text == pair.right_item && t.side == Side::Right));
        }
    }

    #[test]
    fn load_changes_generation_order() {
        for seed in 0..16 {
            let s = session(8, seed);
            let in_order: Vec<String> = pairs(8)
                .into_iter()
                .flat_map(|p| [p.left_item, p.right_item])
                .collect();
            let shuffled: Vec<String> = s.items().iter().map(|t| t.text.clone()).collect();
            assert_ne!(shuffled, in_order);
        }
    }

    #[test]
    fn single_pair_scenario_in_either_order() {
        for first in ["cat", "feline"] {
            let mut s = MatchingSession::from_pairs(vec![Pair::new("cat", "feline")]);
            let mut texts: Vec<&str> = s.items().iter().map(|t| t.text.as_str()).collect();
            texts.sort();
            assert_eq!(texts, vec!["cat", "feline"]);

            let second = if first == "cat" { "feline" } else { "cat" };
            let (a, b) = (position_of(&s, first), position_of(&s, second));

            assert_eq!(s.select(a), Selection::FirstPick);
            assert_eq!(s.select(b), Selection::Picked(PickOutcome::Match));
            assert_eq!(s.matched_items(), vec![first, second]);
            assert!(s.is_done());
        }
    }

    #[test]
    fn matching_pair_enters_matched() {
        let mut s = session(8, 2);
        let first = 0;
        let second = partner_of(&s, first);

        s.select(first);
        assert_eq!(s.turn(), Some(Turn::AwaitingSecondPick));
        s.select(second);
        assert_eq!(s.turn(), Some(Turn::ShowingFeedback(PickOutcome::Match)));
        assert_eq!(s.selected(), &[first, second]);
        assert!(!s.is_mismatch());

        s.on_tick(FEEDBACK_WINDOW);
        assert_eq!(s.matched(), &[first, second]);
        assert!(s.selected().is_empty());
        assert_eq!(s.turn(), Some(Turn::AwaitingFirstPick));
    }

    #[test]
    fn mismatch_raises_flag_for_the_window() {
        let mut s = session(8, 3);
        let first = 0;
        let wrong = wrong_partner_of(&s, first);

        s.select(first);
        assert_eq!(s.select(wrong), Selection::Picked(PickOutcome::Mismatch));
        assert!(s.is_mismatch());
        assert!(s.matched().is_empty());

        s.on_tick(Duration::from_millis(200));
        assert!(s.is_mismatch());
        assert_eq!(s.selected().len(), 2);

        s.on_tick(Duration::from_millis(300));
        assert!(!s.is_mismatch());
        assert!(s.selected().is_empty());
        assert!(s.matched().is_empty());
    }

    #[test]
    fn picks_during_feedback_are_ignored() {
        let mut s = session(8, 4);
        let wrong = wrong_partner_of(&s, 0);
        s.select(0);
        s.select(wrong);

        let other = (0..16).find(|p| *p != 0 && *p != wrong).unwrap();
        assert_eq!(s.select(other), Selection::Ignored);
        assert_eq!(s.selected(), &[0, wrong]);
    }

    #[test]
    fn same_tile_twice_is_not_a_self_match() {
        let mut s = MatchingSession::from_pairs(vec![Pair::new("echo", "echo"), Pair::new("a", "b")]);
        let pos = position_of(&s, "echo");

        s.select(pos);
        assert_eq!(s.select(pos), Selection::Ignored);
        assert_eq!(s.selected(), &[pos]);
        assert!(s.matched().is_empty());
    }

    #[test]
    fn identical_text_in_one_pair_still_matches() {
        let mut s = MatchingSession::from_pairs(vec![Pair::new("echo", "echo")]);
        s.select(0);
        assert_eq!(s.select(1), Selection::Picked(PickOutcome::Match));
        assert!(s.is_done());
    }

    #[test]
    fn duplicate_text_across_pairs_matches_by_position() {
        let mut s = MatchingSession::new();
        s.load_with_rng(
            vec![Pair::new("bank", "river edge"), Pair::new("bank", "money store")],
            &mut StdRng::seed_from_u64(5),
        );
        let river = position_of(&s, "river edge");
        let bank_of_money = s
            .items()
            .iter()
            .position(|t| t.text == "bank" && t.pair != s.items()[river].pair)
            .unwrap();

        s.select(bank_of_money);
        assert_eq!(s.select(river), Selection::Picked(PickOutcome::Mismatch));
    }

    #[test]
    fn matched_tiles_are_ignored() {
        let mut s = session(8, 6);
        let partner = partner_of(&s, 0);
        s.select(0);
        s.select(partner);
        s.on_tick(FEEDBACK_WINDOW);

        assert_eq!(s.select(0), Selection::Ignored);
        assert_eq!(s.select(partner), Selection::Ignored);
        assert!(s.selected().is_empty());
    }

    #[test]
    fn out_of_range_pick_is_ignored() {
        let mut s = session(2, 7);
        assert_eq!(s.select(4), Selection::Ignored);
    }

    #[test]
    fn clock_counts_whole_seconds() {
        let mut s = session(8, 8);
        for _ in 0..25 {
            s.on_tick(Duration::from_millis(100));
        }
        assert_eq!(s.elapsed_secs(), 2);
    }

    #[test]
    fn completion_stops_clock_and_picks() {
        let mut s = session(8, 9);
        s.on_tick(Duration::from_secs(4));
        solve(&mut s);

        assert!(s.is_done());
        assert!(!s.is_timer_running());
        assert_eq!(s.matched().len(), 16);
        let score = s.elapsed_secs();

        s.on_tick(Duration::from_secs(10));
        assert_eq!(s.elapsed_secs(), score);
        assert_eq!(s.select(0), Selection::Ignored);
    }

    #[test]
    fn final_feedback_still_clears_after_done() {
        let mut s = MatchingSession::from_pairs(vec![Pair::new("x", "y")]);
        s.select(0);
        s.select(1);
        assert!(s.is_done());
        assert_eq!(s.selected().len(), 2);

        s.on_tick(FEEDBACK_WINDOW);
        assert!(s.selected().is_empty());
    }

    #[test]
    fn restart_is_idempotent_and_keeps_order() {
        let mut s = session(8, 10);
        let order = s.items().to_vec();
        let partner = partner_of(&s, 0);
        s.select(0);
        s.select(partner);
        s.on_tick(Duration::from_secs(3));

        s.restart();
        let once = (s.matched().to_vec(), s.selected().to_vec(), s.elapsed_secs());
        s.restart();
        let twice = (s.matched().to_vec(), s.selected().to_vec(), s.elapsed_secs());

        assert_eq!(once, (vec![], vec![], 0));
        assert_eq!(once, twice);
        assert_eq!(s.items(), order.as_slice());
        assert!(!s.is_mismatch());
    }

    #[test]
    fn restart_after_done_restarts_clock() {
        let mut s = session(3, 11);
        solve(&mut s);
        assert!(!s.is_timer_running());

        s.restart();
        assert_eq!(s.phase(), Phase::Playing);
        assert!(s.is_timer_running());
        s.on_tick(Duration::from_secs(1));
        assert_eq!(s.elapsed_secs(), 1);
    }

    #[test]
    fn restart_while_loading_stays_loading() {
        let mut s = MatchingSession::new();
        s.restart();
        assert_eq!(s.phase(), Phase::Loading);
    }

    #[test]
    fn empty_collection_is_done_immediately() {
        let s = MatchingSession::from_pairs(vec![]);
        assert!(s.is_done());
        assert!(!s.is_timer_running());
    }

    #[test]
    fn cancel_timer_freezes_clock() {
        let mut s = session(8, 12);
        s.cancel_timer();
        s.on_tick(Duration::from_secs(5));
        assert_eq!(s.elapsed_secs(), 0);
    }

    #[test]
    fn random_pick_sequences_keep_invariants() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut s = MatchingSession::new();
            s.load_with_rng(pairs(8), &mut rng);

            for _ in 0..400 {
                if rng.gen_bool(0.3) {
                    s.on_tick(Duration::from_millis(rng.gen_range(0..700)));
                } else {
                    let pos = rng.gen_range(0..18);
                    let result = s.select(pos);
                    if pos >= 16 {
                        assert_matches!(result, Selection::Ignored);
                    }
                }

                assert_eq!(s.matched().len() % 2, 0);
                assert!(s.matched().len() <= s.items().len());
                assert!(s.selected().len() <= 2);
                if !matches!(s.turn(), Some(Turn::ShowingFeedback(_))) {
                    assert!(s.selected().len() <= 1);
                }
                assert_eq!(s.is_done(), s.matched().len() == s.items().len());
                assert_eq!(s.is_timer_running(), !s.is_done());
            }
        }
    }

    #[test]
    fn progress_percent_tracks_matches() {
        let mut s = session(2, 13);
        assert_eq!(s.progress_percent(), 0);
        let partner = partner_of(&s, 0);
        s.select(0);
        s.select(partner);
        assert_eq!(s.progress_percent(), 50);
    }
}
