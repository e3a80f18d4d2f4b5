//! Kibo: the append-only structured replay log.
//!
//! Every record carries a monotonically increasing sequence number and a
//! `type` discriminant. External analyzers, statistical optimizers and
//! bot trainers parse these records by field, which makes the shape a
//! hard compatibility boundary: names here are frozen (camelCase fields,
//! snake_case type tags).
//!
//! Records serialize to JSON for human tooling and to compact bincode
//! bytes for bulk self-play archives.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::core::player::{EventCounters, GukjinMode, PpukState};
use crate::core::side::{Side, SidePair};
pub use crate::engine::economy::GoldSettlement;
use crate::engine::matching::MatchEvent;
use crate::engine::scoring::ScoreInfo;

/// Pacing hint for shake/bomb reveals, carried for replay viewers.
pub const REVEAL_MS: u64 = 2000;

/// Card snapshot as written into replay records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackedCard {
    pub id: String,
    pub month: u8,
    pub category: crate::cards::Category,
    pub name: String,
    pub pass_card: bool,
}

impl PackedCard {
    /// Snapshot one card.
    #[must_use]
    pub fn from_card(card: &Card) -> Self {
        Self {
            id: card.id.code(),
            month: card.month,
            category: card.category,
            name: card.name.clone(),
            pass_card: card.pass_card,
        }
    }
}

/// Snapshot a list of cards.
#[must_use]
pub fn pack_cards(cards: &[Card]) -> Vec<PackedCard> {
    cards.iter().map(PackedCard::from_card).collect()
}

/// Captures split by where the capturing card came from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureBySource {
    pub hand: Vec<PackedCard>,
    pub flip: Vec<PackedCard>,
}

/// Steal totals applied while finalizing a turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StealDelta {
    pub pi: u32,
    pub gold: u64,
}

/// The action half of a `turn_end` record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum TurnAction {
    /// Ordinary hand play (with the chosen board card when the play was
    /// disambiguated).
    Play {
        card: PackedCard,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selected_board_card: Option<PackedCard>,
        flips: Vec<PackedCard>,
        match_events: Vec<MatchEvent>,
        capture_by_source: CaptureBySource,
    },
    /// Pass placeholder consumed: flip only.
    Pass {
        card: PackedCard,
        flips: Vec<PackedCard>,
        match_events: Vec<MatchEvent>,
        capture_by_source: CaptureBySource,
    },
    /// Resumed flip-origin match choice.
    #[serde(rename = "flip-select")]
    FlipSelect {
        card: PackedCard,
        selected_board_card: PackedCard,
        flips: Vec<PackedCard>,
        match_events: Vec<MatchEvent>,
        capture_by_source: CaptureBySource,
    },
    /// Bomb declaration that consumed the turn.
    DeclareBomb {
        month: u8,
        captured: Vec<PackedCard>,
        flips: Vec<PackedCard>,
        match_events: Vec<MatchEvent>,
        capture_by_source: CaptureBySource,
    },
    /// Kung use that consumed the turn.
    Kung {
        month: u8,
        captured: Vec<PackedCard>,
        flips: Vec<PackedCard>,
        match_events: Vec<MatchEvent>,
        capture_by_source: CaptureBySource,
    },
}

/// Round outcome discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundWinner {
    A,
    B,
    Draw,
}

impl From<Side> for RoundWinner {
    fn from(side: Side) -> Self {
        match side {
            Side::A => RoundWinner::A,
            Side::B => RoundWinner::B,
        }
    }
}

impl RoundWinner {
    /// The winning seat, if any.
    #[must_use]
    pub fn side(self) -> Option<Side> {
        match self {
            RoundWinner::A => Some(Side::A),
            RoundWinner::B => Some(Side::B),
            RoundWinner::Draw => None,
        }
    }
}

/// Why a round was voided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NagariReason {
    Draw,
    Scoreless,
    GoFail(Side),
}

impl NagariReason {
    /// Frozen wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NagariReason::Draw => "draw",
            NagariReason::Scoreless => "scoreless",
            NagariReason::GoFail(Side::A) => "go_fail_a",
            NagariReason::GoFail(Side::B) => "go_fail_b",
        }
    }
}

impl Serialize for NagariReason {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NagariReason {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        match text.as_str() {
            "draw" => Ok(NagariReason::Draw),
            "scoreless" => Ok(NagariReason::Scoreless),
            "go_fail_a" => Ok(NagariReason::GoFail(Side::A)),
            "go_fail_b" => Ok(NagariReason::GoFail(Side::B)),
            other => Err(serde::de::Error::custom(format!("unknown nagari reason: {other}"))),
        }
    }
}

/// One replay record body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum KiboEvent {
    InitialDeal {
        first_turn: Side,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hands: Option<SidePair<Vec<PackedCard>>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        board: Option<Vec<PackedCard>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deck: Option<Vec<PackedCard>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hands_count: Option<SidePair<usize>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        board_count: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        deck_count: Option<usize>,
    },
    TurnEnd {
        turn_no: u32,
        actor: Side,
        action: TurnAction,
        deck_count: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        board: Option<Vec<PackedCard>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hands: Option<SidePair<Vec<PackedCard>>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        board_count: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hands_count: Option<SidePair<usize>>,
        steals: StealDelta,
        held_bonus: Vec<PackedCard>,
        events: EventCounters,
        ppuk_state: PpukState,
    },
    Go {
        player_key: Side,
        go_count: u32,
    },
    Stop {
        player_key: Side,
    },
    ShakingDeclare {
        player_key: Side,
        month: u8,
        reveal_cards: Vec<PackedCard>,
        reveal_ms: u64,
    },
    GukjinMode {
        player_key: Side,
        mode: GukjinMode,
    },
    PresidentStop {
        player_key: Side,
        payout: u32,
    },
    PresidentHold {
        player_key: Side,
        month: u8,
    },
    KungUse {
        player_key: Side,
        month: u8,
        captured: Vec<PackedCard>,
    },
    KungPass {
        player_key: Side,
        month: u8,
    },
    RoundEnd {
        winner: RoundWinner,
        nagari: bool,
        nagari_reasons: Vec<NagariReason>,
        scores: SidePair<ScoreInfo>,
        gold: GoldSettlement,
    },
}

/// One replay record: sequence number plus body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KiboRecord {
    pub no: u32,
    #[serde(flatten)]
    pub event: KiboEvent,
}

/// Serialize a kibo to a JSON array.
pub fn to_json(records: &Vector<KiboRecord>) -> serde_json::Result<String> {
    let all: Vec<&KiboRecord> = records.iter().collect();
    serde_json::to_string(&all)
}

/// Serialize a kibo to JSON bytes for bulk archives.
pub fn to_bytes(records: &Vector<KiboRecord>) -> serde_json::Result<Vec<u8>> {
    let all: Vec<&KiboRecord> = records.iter().collect();
    serde_json::to_vec(&all)
}

/// Read a kibo back from archived bytes.
pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Vector<KiboRecord>> {
    let all: Vec<KiboRecord> = serde_json::from_slice(bytes)?;
    Ok(all.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::build_deck;

    #[test]
    fn test_packed_card_shape() {
        let deck = build_deck();
        let packed = PackedCard::from_card(&deck[0]);

        let json = serde_json::to_value(&packed).unwrap();
        assert_eq!(json["id"], "A0");
        assert_eq!(json["month"], 1);
        assert_eq!(json["category"], "kwang");
        assert_eq!(json["passCard"], false);
    }

    #[test]
    fn test_record_type_tags() {
        let record = KiboRecord {
            no: 3,
            event: KiboEvent::Go {
                player_key: Side::A,
                go_count: 2,
            },
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["no"], 3);
        assert_eq!(json["type"], "go");
        assert_eq!(json["playerKey"], "a");
        assert_eq!(json["goCount"], 2);
    }

    #[test]
    fn test_flip_select_tag_keeps_hyphen() {
        let deck = build_deck();
        let action = TurnAction::FlipSelect {
            card: PackedCard::from_card(&deck[0]),
            selected_board_card: PackedCard::from_card(&deck[1]),
            flips: vec![],
            match_events: vec![],
            capture_by_source: CaptureBySource::default(),
        };

        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "flip-select");
        assert!(json.get("selectedBoardCard").is_some());
    }

    #[test]
    fn test_nagari_reason_wire_names() {
        assert_eq!(
            serde_json::to_string(&NagariReason::GoFail(Side::B)).unwrap(),
            "\"go_fail_b\""
        );
        let back: NagariReason = serde_json::from_str("\"scoreless\"").unwrap();
        assert_eq!(back, NagariReason::Scoreless);
    }

    #[test]
    fn test_bytes_round_trip() {
        let mut records = Vector::new();
        records.push_back(KiboRecord {
            no: 1,
            event: KiboEvent::Stop { player_key: Side::B },
        });

        let bytes = to_bytes(&records).unwrap();
        let back = from_bytes(&bytes).unwrap();

        assert_eq!(back, records);
    }
}
