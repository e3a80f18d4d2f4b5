//! Game state: the root aggregate owned by the engine.
//!
//! A `GameState` is plain data. Every action function takes a state and
//! returns a new one; an illegal action (wrong phase, wrong actor,
//! unknown target) returns the input unchanged so callers can probe
//! legality speculatively. "Pending" phases are a discriminant plus a
//! payload that the matching resume action consumes - there is no
//! continuation hidden anywhere.
//!
//! No RNG lives in the state: randomness is spent entirely at the
//! opening deal, which keeps a round a pure function of (seed, actions).

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{Card, CardId, BONUS_MONTH};
use crate::engine::matching::MatchEvent;
use crate::engine::rules::{RuleKey, RuleSet};
use crate::engine::scoring::ScoreInfo;
use crate::kibo::{GoldSettlement, KiboEvent, KiboRecord, NagariReason, PackedCard, RoundWinner};

use super::player::{CapturedSet, EventCounters, PlayerState};
use super::side::{Side, SidePair};

/// State-machine discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Waiting for the current actor to play a hand card or declare.
    Playing,
    /// Waiting for a disambiguating board-card choice.
    SelectMatch,
    /// Waiting for go-or-stop from the actor who crossed the threshold.
    GoStop,
    /// Waiting for the four-of-a-month stop-or-hold choice.
    PresidentChoice,
    /// Waiting for the one-time gukjin mode lock.
    GukjinChoice,
    /// Waiting for use-or-pass on an opening three-plus-board month.
    KungChoice,
    /// Terminal: the round is decided.
    Resolution,
}

/// In-progress turn bookkeeping.
///
/// Built when a hand card is played and threaded through the flip phase
/// and finalize. When a flip needs a player choice the whole context is
/// parked inside [`PendingMatch`] and resumed later; the canonical zones
/// in `GameState` stay untouched until finalize installs the result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnContext {
    pub side: Side,
    pub played_month: u8,
    pub played_card_id: Option<CardId>,
    pub is_last_hand_turn: bool,
    pub hand: Vec<Card>,
    pub captured: CapturedSet,
    pub events: EventCounters,
    pub deck: Vec<Card>,
    pub board: Vec<Card>,
    pub log: Vector<String>,
    pub newly_captured: Vec<CardId>,
    pub captured_from_hand: Vec<Card>,
    pub captured_from_flip: Vec<Card>,
    pub pending_steal: u32,
    /// Bonus cards flipped mid-chain, deferred until the chain ends.
    pub pending_bonus: Vec<Card>,
    /// Bonus cards rerouted to the held queue by a ppuk outcome.
    pub held_bonus_on_ppuk: Vec<Card>,
    pub flips: Vec<Card>,
    pub match_events: Vec<MatchEvent>,
    /// The flip card awaiting a board choice while suspended.
    pub flip_card: Option<Card>,
}

/// Where a pending match choice came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOrigin {
    Hand {
        card: CardId,
        president_chain_armed: bool,
    },
    Flip(Box<TurnContext>),
}

/// Payload of [`Phase::SelectMatch`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingMatch {
    pub side: Side,
    /// Board cards the actor may pick between.
    pub board_cards: SmallVec<[CardId; 4]>,
    pub origin: MatchOrigin,
}

/// Payload of [`Phase::PresidentChoice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPresident {
    pub side: Side,
    pub month: u8,
}

/// Payload of [`Phase::KungChoice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingKung {
    pub side: Side,
    pub month: u8,
}

/// What a reveal announces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealKind {
    Shaking,
    Bomb,
}

/// A shake/bomb reveal shown to the table.
///
/// Lifetime is logical: a reveal survives the turn that produced it and
/// is cleared by the following turn's finalize. Viewers pace it with the
/// `revealMs` hint in the kibo record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReveal {
    pub kind: RevealKind,
    pub side: Side,
    pub month: Option<u8>,
    pub cards: Vec<PackedCard>,
    /// Turn sequence at creation.
    pub turn_seq: u32,
}

/// Terminal outcome of a round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub winner: RoundWinner,
    pub nagari: bool,
    pub nagari_reasons: Vec<NagariReason>,
    pub scores: SidePair<ScoreInfo>,
    pub gold: GoldSettlement,
}

/// How much of each zone the kibo snapshots per turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KiboDetail {
    /// Full zone snapshots per record.
    #[default]
    Full,
    /// Counts only; for bulk self-play archives.
    Lean,
}

/// Day/night parity for the first-turn rule.
///
/// This is an explicit external input: replays stay deterministic only
/// because the engine never reads a clock itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Daylight {
    #[default]
    Day,
    Night,
}

/// Options for dealing a round.
#[derive(Clone, Debug, Default)]
pub struct GameOptions {
    /// Carry-over multiplier entering this round (defaults to 1).
    pub carry_over_multiplier: Option<u32>,
    /// Per-seat starting gold; zero or absent falls back to the stake.
    pub initial_gold: SidePair<Option<u64>>,
    /// Fixed first actor; bypasses the day/night rule when set.
    pub first_turn: Option<Side>,
    pub daylight: Daylight,
    pub kibo_detail: KiboDetail,
}

/// Per-month count of cards not yet face-up or captured, plus the draw
/// pile size. From the table's point of view these cards are still in
/// hands or in the pile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingEstimate {
    pub draw_pile: usize,
    /// Indexed by month 1..=13; index 0 is unused.
    pub unseen_by_month: [u8; 14],
}

/// The root aggregate: one round of a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub rule_key: RuleKey,
    /// Draw pile, top first.
    pub deck: Vec<Card>,
    /// Face-up board cards.
    pub board: Vec<Card>,
    pub players: SidePair<PlayerState>,
    pub current_turn: Side,
    pub starting_side: Side,
    pub phase: Phase,
    pub pending_match: Option<PendingMatch>,
    pub pending_go_stop: Option<Side>,
    pub pending_president: Option<PendingPresident>,
    pub pending_gukjin: Option<Side>,
    pub pending_kung: Option<PendingKung>,
    pub reveal: Option<ActionReveal>,
    pub carry_over_multiplier: u32,
    pub next_carry_over_multiplier: u32,
    pub turn_seq: u32,
    pub kibo_seq: u32,
    pub pass_card_counter: u16,
    pub kibo_detail: KiboDetail,
    /// Human-readable narration, append-only.
    pub log: Vector<String>,
    /// The structured replay log, append-only.
    pub kibo: Vector<KiboRecord>,
    pub result: Option<RoundResult>,
}

impl GameState {
    /// Rule preset in effect.
    #[must_use]
    pub fn rules(&self) -> &'static RuleSet {
        self.rule_key.rules()
    }

    /// One seat's state.
    #[must_use]
    pub fn player(&self, side: Side) -> &PlayerState {
        &self.players[side]
    }

    /// The round has been decided.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.phase == Phase::Resolution
    }

    /// Append a narration line.
    pub(crate) fn push_log(&mut self, line: impl Into<String>) {
        self.log.push_back(line.into());
    }

    /// Append a replay record, assigning the next sequence number.
    pub(crate) fn push_kibo(&mut self, event: KiboEvent) {
        self.kibo_seq += 1;
        self.kibo.push_back(KiboRecord {
            no: self.kibo_seq,
            event,
        });
    }

    /// Allocate a fresh pass placeholder.
    pub(crate) fn next_pass_card(&mut self) -> Card {
        let card = Card::pass_placeholder(self.pass_card_counter);
        self.pass_card_counter += 1;
        card
    }

    /// The active shake/bomb reveal, if one is still showing.
    #[must_use]
    pub fn active_shake_reveal(&self) -> Option<&ActionReveal> {
        self.reveal.as_ref()
    }

    /// Estimate of cards not yet visible on the table.
    #[must_use]
    pub fn remaining_card_estimate(&self) -> RemainingEstimate {
        let mut unseen = [0u8; 14];
        for month in 1..=12usize {
            unseen[month] = 4;
        }
        unseen[BONUS_MONTH as usize] = 2;

        let mut mark_seen = |card: &Card| {
            if card.month >= 1 && card.month <= BONUS_MONTH {
                let slot = &mut unseen[card.month as usize];
                *slot = slot.saturating_sub(1);
            }
        };

        for card in &self.board {
            mark_seen(card);
        }
        for (_, player) in self.players.iter() {
            for card in player.captured.iter() {
                mark_seen(card);
            }
        }

        RemainingEstimate {
            draw_pile: self.deck.len(),
            unseen_by_month: unseen,
        }
    }

    /// Check the card partition invariant: every catalog card lives in
    /// exactly one zone and none are lost.
    ///
    /// A `false` here is an engine defect, not a game outcome; finalize
    /// asserts it in debug builds.
    #[must_use]
    pub fn card_partition_ok(&self) -> bool {
        let mut seen = rustc_hash::FxHashSet::default();
        let mut total = 0usize;

        let mut visit = |cards: &[Card]| -> bool {
            for card in cards {
                if card.pass_card {
                    continue;
                }
                if !seen.insert(card.id) {
                    return false;
                }
                total += 1;
            }
            true
        };

        if !visit(&self.deck) || !visit(&self.board) {
            return false;
        }
        for side in Side::BOTH {
            let player = &self.players[side];
            if !visit(&player.hand) || !visit(&player.held_bonus) {
                return false;
            }
            if !visit(&player.captured.kwang)
                || !visit(&player.captured.five)
                || !visit(&player.captured.ribbon)
                || !visit(&player.captured.junk)
            {
                return false;
            }
        }

        total == crate::cards::DECK_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_serde_names() {
        assert_eq!(serde_json::to_string(&Phase::SelectMatch).unwrap(), "\"select-match\"");
        assert_eq!(serde_json::to_string(&Phase::GoStop).unwrap(), "\"go-stop\"");
    }

    #[test]
    fn test_daylight_default_is_day() {
        assert_eq!(Daylight::default(), Daylight::Day);
    }

    #[test]
    fn test_pass_card_allocation_is_unique() {
        let mut state = crate::engine::opening::start_game(
            RuleKey::A,
            &mut crate::core::rng::GameRng::new(1),
            &GameOptions::default(),
        );

        let first = state.next_pass_card();
        let second = state.next_pass_card();
        assert_ne!(first.id, second.id);
        assert!(first.id.is_pass());
    }
}
