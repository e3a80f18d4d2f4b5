//! Per-side player aggregate.
//!
//! `PlayerState` is everything one seat owns during a round: the hand,
//! the four captured-card buckets, the gukjin dual-mode choice, go/stop
//! bookkeeping, the ppuk streak record, held bonus cards, gold, and the
//! per-event occurrence counters that feed scoring multipliers and the
//! replay log.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardId, Category};

/// Scoring mode chosen for the dual-mode September five.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GukjinMode {
    #[default]
    Five,
    Junk,
}

/// Captured cards partitioned by category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedSet {
    pub kwang: Vec<Card>,
    pub five: Vec<Card>,
    pub ribbon: Vec<Card>,
    pub junk: Vec<Card>,
}

impl CapturedSet {
    /// Bucket a card belongs to when captured.
    #[must_use]
    pub fn bucket(&self, category: Category) -> &Vec<Card> {
        match category {
            Category::Kwang => &self.kwang,
            Category::Five => &self.five,
            Category::Ribbon => &self.ribbon,
            Category::Junk => &self.junk,
        }
    }

    fn bucket_mut(&mut self, category: Category) -> &mut Vec<Card> {
        match category {
            Category::Kwang => &mut self.kwang,
            Category::Five => &mut self.five,
            Category::Ribbon => &mut self.ribbon,
            Category::Junk => &mut self.junk,
        }
    }

    /// Whether a card id is already captured somewhere.
    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.iter().any(|c| c.id == id)
    }

    /// Capture a card into its category bucket.
    ///
    /// A card that is already present is not added twice; the card
    /// partition invariant makes a duplicate push an engine bug upstream.
    pub fn push(&mut self, card: Card) {
        if self.contains(card.id) {
            debug_assert!(false, "card {} captured twice", card.id);
            return;
        }
        self.bucket_mut(card.category).push(card);
    }

    /// Iterate over all captured cards.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.kwang
            .iter()
            .chain(self.five.iter())
            .chain(self.ribbon.iter())
            .chain(self.junk.iter())
    }

    /// Total captured card count.
    #[must_use]
    pub fn total(&self) -> usize {
        self.kwang.len() + self.five.len() + self.ribbon.len() + self.junk.len()
    }
}

/// Per-event occurrence counters for one seat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCounters {
    /// Hand plays that swept a full month off the board.
    pub ttak: u32,
    /// Stuck flips.
    pub ppuk: u32,
    /// Flips that re-captured the card played this turn.
    pub jjob: u32,
    /// Flips that paired up with a different card of the played month.
    pub ddadak: u32,
    /// Captures that emptied the board.
    pub ssul: u32,
    /// Stuck stacks eaten back after a later capture.
    pub jabbeok: u32,
    /// Consecutive-ppuk streak rewards.
    pub yeon_ppuk: u32,
    pub shaking: u32,
    pub bomb: u32,
    pub kung: u32,
}

/// Where the most recent ppuk came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PpukSource {
    Hand,
    Flip,
}

/// Ppuk streak record for one seat.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PpukState {
    pub active: bool,
    pub streak: u32,
    pub last_turn_no: u32,
    pub last_source: Option<PpukSource>,
    pub last_month: Option<u8>,
}

/// Everything one seat owns during a round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub hand: Vec<Card>,
    pub captured: CapturedSet,
    pub gukjin_mode: GukjinMode,
    pub gukjin_locked: bool,
    pub go_count: u32,
    /// Base score recorded at the most recent go declaration.
    pub last_go_base: u32,
    pub turn_count: u32,
    pub president_hold: bool,
    pub president_hold_month: Option<u8>,
    pub shaking_declared_months: Vec<u8>,
    /// Bonus cards held while a ppuk stack is unresolved.
    pub held_bonus: Vec<Card>,
    pub ppuk_state: PpukState,
    pub gold: u64,
    pub declared_stop: bool,
    /// The one-time kung offer has been made (used or passed).
    pub kung_offered: bool,
    pub events: EventCounters,
}

impl PlayerState {
    /// Fresh seat with the given gold stake.
    #[must_use]
    pub fn new(gold: u64) -> Self {
        Self {
            hand: Vec::new(),
            captured: CapturedSet::default(),
            gukjin_mode: GukjinMode::Five,
            gukjin_locked: false,
            go_count: 0,
            last_go_base: 0,
            turn_count: 0,
            president_hold: false,
            president_hold_month: None,
            shaking_declared_months: Vec::new(),
            held_bonus: Vec::new(),
            ppuk_state: PpukState::default(),
            gold,
            declared_stop: false,
            kung_offered: false,
            events: EventCounters::default(),
        }
    }

    /// Count of non-placeholder hand cards of a month.
    #[must_use]
    pub fn hand_month_count(&self, month: u8) -> usize {
        self.hand
            .iter()
            .filter(|c| !c.pass_card && c.month == month)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::build_deck;

    #[test]
    fn test_captured_set_buckets() {
        let deck = build_deck();
        let mut captured = CapturedSet::default();

        captured.push(deck[0].clone()); // Pine Bright
        captured.push(deck[1].clone()); // Poetry Ribbon
        captured.push(deck[2].clone()); // Pine Junk A
        captured.push(deck[4].clone()); // Bush Warbler

        assert_eq!(captured.kwang.len(), 1);
        assert_eq!(captured.ribbon.len(), 1);
        assert_eq!(captured.junk.len(), 1);
        assert_eq!(captured.five.len(), 1);
        assert_eq!(captured.total(), 4);
        assert!(captured.contains(deck[0].id));
        assert!(!captured.contains(deck[9].id));
    }

    #[test]
    fn test_player_new() {
        let player = PlayerState::new(1_000_000);

        assert_eq!(player.gold, 1_000_000);
        assert_eq!(player.go_count, 0);
        assert_eq!(player.gukjin_mode, GukjinMode::Five);
        assert!(!player.ppuk_state.active);
        assert_eq!(player.events, EventCounters::default());
    }

    #[test]
    fn test_hand_month_count_skips_placeholders() {
        let deck = build_deck();
        let mut player = PlayerState::new(0);

        player.hand.push(deck[0].clone()); // month 1
        player.hand.push(deck[1].clone()); // month 1
        player.hand.push(Card::pass_placeholder(0));

        assert_eq!(player.hand_month_count(1), 2);
        assert_eq!(player.hand_month_count(0), 0);
    }

    #[test]
    fn test_event_counters_serde_names() {
        let json = serde_json::to_string(&EventCounters::default()).unwrap();
        assert!(json.contains("\"yeonPpuk\""));
        assert!(json.contains("\"ttak\""));
        assert!(json.contains("\"kung\""));
    }
}
