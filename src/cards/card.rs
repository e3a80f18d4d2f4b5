//! Card value type.
//!
//! A matgo deck is a fixed catalog of 48 seasonal cards (months 1-12,
//! four per month) plus two non-seasonal bonus cards. Cards are never
//! created or destroyed during a round; they only move between zones.
//!
//! Two cards need extra bookkeeping:
//! - The September five ("gukjin") is dual-mode: it scores as a five until
//!   its owner locks it, and can be converted into a 2-pip junk card.
//! - The bonus cards carry a steal-pi effect and belong to no month
//!   ([`BONUS_MONTH`]).
//!
//! Pass placeholders (month 0) are synthesized by the engine when a hand
//! runs dry before the draw pile does. They are not part of the catalog
//! and never score.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Month sentinel for the two non-seasonal bonus cards.
pub const BONUS_MONTH: u8 = 13;

/// First id used for synthesized pass placeholder cards.
pub const PASS_ID_BASE: u16 = 1000;

/// Stable card identity.
///
/// Catalog cards use their catalog index (0..50); pass placeholders are
/// allocated from [`PASS_ID_BASE`] by a per-state counter. The ordering of
/// ids is the stable tiebreak used whenever the engine must pick between
/// otherwise equal cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u16);

impl CardId {
    /// Create a card id.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Whether this id names a synthesized pass placeholder.
    #[must_use]
    pub const fn is_pass(self) -> bool {
        self.0 >= PASS_ID_BASE
    }

    /// The replay code for this card: `A0`..`M1` for catalog cards,
    /// `pass-N` for placeholders.
    #[must_use]
    pub fn code(self) -> String {
        if self.is_pass() {
            format!("pass-{}", self.0 - PASS_ID_BASE)
        } else {
            let letter = (b'A' + (self.0 / 4) as u8) as char;
            format!("{}{}", letter, self.0 % 4)
        }
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Card category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Bright card ("kwang").
    Kwang,
    /// Animal-of-the-month card.
    Five,
    Ribbon,
    /// Junk/pip card, worth 1-3 pips.
    Junk,
}

/// Named combo group membership.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComboTag {
    RedRibbons,
    BlueRibbons,
    PlainRibbons,
    FiveBirds,
}

/// One playing card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    /// 1-12 for seasonal cards, [`BONUS_MONTH`] for bonus cards, 0 for
    /// pass placeholders.
    pub month: u8,
    pub category: Category,
    pub name: String,
    /// Pip value; meaningful for junk cards only.
    pub pi_value: u8,
    /// Combo group memberships.
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub tags: SmallVec<[ComboTag; 1]>,
    /// Steal-pi bonus effect count (0 for ordinary cards).
    #[serde(default, skip_serializing_if = "is_zero")]
    pub steal_pi: u8,
    /// Synthesized pass placeholder.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pass_card: bool,
    /// Set once the gukjin has been converted into a junk card.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub gukjin_transformed: bool,
}

fn is_zero(n: &u8) -> bool {
    *n == 0
}

impl Card {
    /// The dual-mode September five.
    #[must_use]
    pub fn is_gukjin(&self) -> bool {
        self.id == super::deck::GUKJIN_ID
    }

    /// Carries a steal-pi bonus effect.
    #[must_use]
    pub fn is_bonus(&self) -> bool {
        self.steal_pi > 0
    }

    /// Pip value contributed when held in a junk bucket.
    #[must_use]
    pub fn pi(&self) -> u32 {
        if self.category == Category::Junk {
            u32::from(self.pi_value.max(1))
        } else {
            0
        }
    }

    /// Has one of the twelve seasonal months.
    #[must_use]
    pub fn is_seasonal(&self) -> bool {
        (1..=12).contains(&self.month)
    }

    /// Member of the given combo group.
    #[must_use]
    pub fn has_tag(&self, tag: ComboTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Synthesize a pass placeholder with the given serial.
    #[must_use]
    pub fn pass_placeholder(serial: u16) -> Self {
        Self {
            id: CardId(PASS_ID_BASE + serial),
            month: 0,
            category: Category::Junk,
            name: "Pass".to_string(),
            pi_value: 0,
            tags: SmallVec::new(),
            steal_pi: 0,
            pass_card: true,
            gukjin_transformed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_id_codes() {
        assert_eq!(CardId(0).code(), "A0");
        assert_eq!(CardId(3).code(), "A3");
        assert_eq!(CardId(32).code(), "I0");
        assert_eq!(CardId(49).code(), "M1");
        assert_eq!(CardId(PASS_ID_BASE + 2).code(), "pass-2");
    }

    #[test]
    fn test_pass_placeholder() {
        let pass = Card::pass_placeholder(0);
        assert!(pass.pass_card);
        assert!(pass.id.is_pass());
        assert_eq!(pass.month, 0);
        assert_eq!(pass.pi(), 0);
        assert!(!pass.is_seasonal());
    }

    #[test]
    fn test_category_serde_names() {
        assert_eq!(serde_json::to_string(&Category::Kwang).unwrap(), "\"kwang\"");
        assert_eq!(serde_json::to_string(&Category::Junk).unwrap(), "\"junk\"");
    }

    #[test]
    fn test_combo_tag_serde_names() {
        assert_eq!(
            serde_json::to_string(&ComboTag::RedRibbons).unwrap(),
            "\"redRibbons\""
        );
        assert_eq!(
            serde_json::to_string(&ComboTag::FiveBirds).unwrap(),
            "\"fiveBirds\""
        );
    }
}
