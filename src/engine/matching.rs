//! Match resolution.
//!
//! Classifies a played or flipped card against the face-up board: how many
//! board cards share its month, whether the acting player must choose
//! between them, and which chain event the match produces.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{Card, CardId};

/// How many board cards matched the card's month.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchKind {
    None,
    One,
    Two,
    ThreePlus,
}

/// Chain event produced by a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventTag {
    #[default]
    Normal,
    /// Hand play captured a full month off the board (ttak).
    Ttak,
    /// Flip matched the very card played this turn (jjob).
    Jjob,
    /// Flip paired with a different board card of the played month (ddadak).
    Ddadak,
    /// Flip got stuck on a multi-card stack (ppuk).
    Ppuk,
}

/// Where the matched card came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Hand,
    Flip,
}

/// Outcome of classifying one card against the board.
#[derive(Clone, Debug)]
pub struct MatchOutcome {
    pub kind: MatchKind,
    pub source: MatchSource,
    pub tag: EventTag,
    /// Matched board cards, in board order.
    pub matches: SmallVec<[Card; 4]>,
    /// Exactly two matches of differing categories: the player picks.
    pub needs_choice: bool,
}

/// Classify `card` against `board`.
///
/// `played_month`/`played_card_id` describe the hand card played this
/// turn and drive the flip-phase chain tags; both are `None` for hand
/// plays. `is_last_hand_turn` suppresses every chain tag, since steals
/// and streaks are void on the closing play.
#[must_use]
pub fn resolve_match(
    card: &Card,
    board: &[Card],
    source: MatchSource,
    is_last_hand_turn: bool,
    played_month: Option<u8>,
    played_card_id: Option<CardId>,
) -> MatchOutcome {
    let matches: SmallVec<[Card; 4]> = board
        .iter()
        .filter(|c| c.month == card.month && card.is_seasonal())
        .cloned()
        .collect();

    let mut outcome = MatchOutcome {
        kind: MatchKind::None,
        source,
        tag: EventTag::Normal,
        matches,
        needs_choice: false,
    };

    match outcome.matches.len() {
        0 => {}
        1 => {
            outcome.kind = MatchKind::One;
            if source == MatchSource::Flip
                && !is_last_hand_turn
                && played_month == Some(card.month)
            {
                let matched_played = played_card_id
                    .is_some_and(|id| outcome.matches[0].id == id);
                outcome.tag = if matched_played { EventTag::Jjob } else { EventTag::Ddadak };
            }
        }
        2 => {
            outcome.kind = MatchKind::Two;
            outcome.needs_choice =
                outcome.matches[0].category != outcome.matches[1].category;
            if source == MatchSource::Flip && !is_last_hand_turn {
                outcome.tag = EventTag::Ppuk;
            }
        }
        _ => {
            outcome.kind = MatchKind::ThreePlus;
            match source {
                MatchSource::Hand if !is_last_hand_turn => outcome.tag = EventTag::Ttak,
                MatchSource::Flip if !is_last_hand_turn => outcome.tag = EventTag::Ppuk,
                _ => {}
            }
        }
    }

    outcome
}

/// Auto-pick between matched cards when no player choice is required:
/// highest pip value first, ties broken by id order.
#[must_use]
pub fn best_match_card(cards: &[Card]) -> &Card {
    cards
        .iter()
        .max_by(|a, b| a.pi().cmp(&b.pi()).then(b.id.cmp(&a.id)))
        .expect("best_match_card on empty match list")
}

/// Match event entry recorded per turn for the replay log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchEvent {
    pub source: MatchSource,
    pub event_tag: EventTag,
    #[serde(rename = "type")]
    pub kind: MatchKind,
}
