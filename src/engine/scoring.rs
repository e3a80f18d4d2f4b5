//! Scoring: base points from captured sets, bak penalties, multipliers.
//!
//! Base score is card-driven only: bright tiers, bucket overflows, the
//! three ribbon groups and the five-bird group. Go declarations add one
//! point each on top of base and start compounding the multiplier at the
//! third go. Shaking and bomb declarations, and each detected bak, double
//! the multiplier independently.
//!
//! The dual-mode gukjin threads through everything here: it counts as a
//! five until its owner locks junk mode, after which it contributes two
//! pips (and keeps doing so while still sitting unconverted in the five
//! bucket).

use serde::{Deserialize, Serialize};

use crate::cards::{Card, ComboTag, RAIN_KWANG_ID};
use crate::core::player::{GukjinMode, PlayerState};
use crate::engine::rules::RuleSet;

/// Structural penalty flags and their combined doubling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BakInfo {
    /// Opponent shut out of brights while the player holds three or more.
    pub gwang: bool,
    /// Opponent stuck on 1-7 pips while the player reached ten.
    pub pi: bool,
    /// Opponent shut out of fives while the player holds seven or more.
    pub mong_bak: bool,
    pub multiplier: u32,
}

/// Per-component base score breakdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub kwang_base: u32,
    pub five_base: u32,
    pub ribbon_base: u32,
    pub junk_base: u32,
    pub ribbon_set_bonus: u32,
    pub five_set_bonus: u32,
    pub go_bonus: u32,
    pub pi_count: u32,
    pub gukjin_mode: GukjinMode,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub president_stop: bool,
}

/// A full score evaluation for one seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreInfo {
    /// Base points plus the go bonus.
    pub base: u32,
    pub multiplier: u32,
    pub total: u32,
    pub bak: BakInfo,
    pub breakdown: ScoreBreakdown,
}

/// Five-bucket cards that currently score as fives.
pub fn scoring_five_cards(player: &PlayerState) -> Vec<&Card> {
    player
        .captured
        .five
        .iter()
        .filter(|c| {
            player.gukjin_mode == GukjinMode::Five || !(c.is_gukjin() && !c.gukjin_transformed)
        })
        .collect()
}

/// Pip total, including the junk-mode gukjin still parked as a five.
#[must_use]
pub fn scoring_pi_count(player: &PlayerState) -> u32 {
    let base: u32 = player.captured.junk.iter().map(|c| c.pi()).sum();
    if player.gukjin_mode != GukjinMode::Junk {
        return base;
    }
    let holds_unconverted = player
        .captured
        .five
        .iter()
        .any(|c| c.is_gukjin() && !c.gukjin_transformed);
    if holds_unconverted {
        base + 2
    } else {
        base
    }
}

fn kwang_base_score(kwang: &[Card]) -> u32 {
    match kwang.len() {
        0..=2 => 0,
        3 => {
            if kwang.iter().any(|c| c.id == RAIN_KWANG_ID) {
                2
            } else {
                3
            }
        }
        4 => 4,
        _ => 15,
    }
}

fn tag_months(cards: &[Card], tag: ComboTag) -> rustc_hash::FxHashSet<u8> {
    cards
        .iter()
        .filter(|c| c.has_tag(tag))
        .map(|c| c.month)
        .collect()
}

fn ribbon_bonus(ribbons: &[Card]) -> u32 {
    let complete = |tag| tag_months(ribbons, tag).len() >= 3;
    let mut bonus = 0;
    if complete(ComboTag::RedRibbons) {
        bonus += 3;
    }
    if complete(ComboTag::BlueRibbons) {
        bonus += 3;
    }
    if complete(ComboTag::PlainRibbons) {
        bonus += 3;
    }
    bonus
}

fn five_bird_bonus(fives: &[&Card]) -> u32 {
    let months: rustc_hash::FxHashSet<u8> = fives
        .iter()
        .filter(|c| c.has_tag(ComboTag::FiveBirds))
        .map(|c| c.month)
        .collect();
    if months.len() >= 3 {
        5
    } else {
        0
    }
}

/// Compute the base score (without the go bonus).
#[must_use]
pub fn calculate_base_score(player: &PlayerState) -> (u32, ScoreBreakdown) {
    let fives = scoring_five_cards(player);
    let five_count = fives.len() as u32;
    let ribbon_count = player.captured.ribbon.len() as u32;
    let pi_count = scoring_pi_count(player);

    let kwang_base = kwang_base_score(&player.captured.kwang);
    let five_base = five_count.saturating_sub(4);
    let ribbon_base = ribbon_count.saturating_sub(4);
    let junk_base = if pi_count >= 10 { pi_count - 9 } else { 0 };
    let ribbon_set_bonus = ribbon_bonus(&player.captured.ribbon);
    let five_set_bonus = five_bird_bonus(&fives);

    let base = kwang_base + five_base + ribbon_base + junk_base + ribbon_set_bonus + five_set_bonus;

    (
        base,
        ScoreBreakdown {
            kwang_base,
            five_base,
            ribbon_base,
            junk_base,
            ribbon_set_bonus,
            five_set_bonus,
            go_bonus: 0,
            pi_count,
            gukjin_mode: player.gukjin_mode,
            president_stop: false,
        },
    )
}

fn detect_bak(player: &PlayerState, opponent: &PlayerState, rules: &RuleSet) -> BakInfo {
    let player_pi = scoring_pi_count(player);
    let opponent_pi = scoring_pi_count(opponent);
    let player_fives = scoring_five_cards(player).len();
    let opponent_fives = scoring_five_cards(opponent).len();

    let gwang = player.captured.kwang.len() >= 3 && opponent.captured.kwang.is_empty();
    let pi = (1..=7).contains(&opponent_pi) && player_pi >= 10;
    let mong_bak = opponent_fives == 0 && player_fives >= 7;

    let mut multiplier = 1;
    if gwang {
        multiplier *= rules.bak_kwang;
    }
    if pi {
        multiplier *= rules.bak_pi;
    }
    if mong_bak {
        multiplier *= rules.bak_mong;
    }

    BakInfo {
        gwang,
        pi,
        mong_bak,
        multiplier,
    }
}

/// Full score for one seat against its opponent.
#[must_use]
pub fn calculate_score(player: &PlayerState, opponent: &PlayerState, rules: &RuleSet) -> ScoreInfo {
    let (base, mut breakdown) = calculate_base_score(player);
    let go_bonus = player.go_count;
    breakdown.go_bonus = go_bonus;

    let mut multiplier = 1u32;
    if player.go_count >= 3 {
        multiplier <<= player.go_count - 2;
    }
    multiplier <<= player.events.shaking;
    multiplier <<= player.events.bomb;

    let bak = detect_bak(player, opponent, rules);
    multiplier *= bak.multiplier;

    ScoreInfo {
        base: base + go_bonus,
        multiplier,
        total: (base + go_bonus) * multiplier,
        bak,
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{build_deck, CardId, Category};
    use crate::engine::rules::RuleKey;

    fn deck_card(id: u16) -> Card {
        build_deck().swap_remove(id as usize)
    }

    fn rules() -> &'static RuleSet {
        RuleKey::A.rules()
    }

    fn player_with(cards: &[u16]) -> PlayerState {
        let mut player = PlayerState::new(0);
        for &id in cards {
            player.captured.push(deck_card(id));
        }
        player
    }

    #[test]
    fn test_kwang_tiers() {
        // A0, C0, H0: three brights without the rain bright
        let player = player_with(&[0, 8, 28]);
        assert_eq!(calculate_base_score(&player).0, 3);

        // Rain bright (L0) drops the three-card tier to 2
        let player = player_with(&[0, 8, 44]);
        assert_eq!(calculate_base_score(&player).0, 2);

        let player = player_with(&[0, 8, 28, 40]);
        assert_eq!(calculate_base_score(&player).0, 4);

        let player = player_with(&[0, 8, 28, 40, 44]);
        assert_eq!(calculate_base_score(&player).0, 15);
    }

    #[test]
    fn test_five_overflow_and_birds() {
        // Five birds: B0 (2), D0 (4), H1 (8)
        let player = player_with(&[4, 12, 29]);
        let (base, breakdown) = calculate_base_score(&player);
        assert_eq!(breakdown.five_set_bonus, 5);
        assert_eq!(base, 5);

        // Five fives: +1 overflow on top of the bird set
        let player = player_with(&[4, 12, 29, 16, 20]);
        let (base, breakdown) = calculate_base_score(&player);
        assert_eq!(breakdown.five_base, 1);
        assert_eq!(base, 6);
    }

    #[test]
    fn test_ribbon_sets() {
        // Red ribbons: A1, B1, C1
        let player = player_with(&[1, 5, 9]);
        assert_eq!(calculate_base_score(&player).1.ribbon_set_bonus, 3);

        // Add blue ribbons F1, I1, J1: two complete sets, five ribbons -> +1 overflow
        let player = player_with(&[1, 5, 9, 21, 33, 37]);
        let (base, breakdown) = calculate_base_score(&player);
        assert_eq!(breakdown.ribbon_set_bonus, 6);
        assert_eq!(breakdown.ribbon_base, 2);
        assert_eq!(base, 8);
    }

    #[test]
    fn test_pi_overflow() {
        let mut player = PlayerState::new(0);
        // Nine plain junk: no score yet
        for id in [2, 3, 6, 7, 10, 11, 14, 15, 18] {
            player.captured.push(deck_card(id));
        }
        assert_eq!(calculate_base_score(&player).0, 0);

        player.captured.push(deck_card(19));
        let (base, breakdown) = calculate_base_score(&player);
        assert_eq!(breakdown.pi_count, 10);
        assert_eq!(base, 1);
    }

    #[test]
    fn test_gukjin_modes() {
        let mut player = player_with(&[32]); // gukjin in the five bucket

        assert_eq!(scoring_five_cards(&player).len(), 1);
        assert_eq!(scoring_pi_count(&player), 0);

        player.gukjin_mode = GukjinMode::Junk;
        assert_eq!(scoring_five_cards(&player).len(), 0);
        assert_eq!(scoring_pi_count(&player), 2);
    }

    #[test]
    fn test_go_multiplier_curve() {
        let opponent = PlayerState::new(0);
        let mut player = player_with(&[0, 8, 28]); // base 3

        player.go_count = 2;
        let score = calculate_score(&player, &opponent, rules());
        assert_eq!(score.base, 5);
        assert_eq!(score.multiplier, 1);

        player.go_count = 3;
        let score = calculate_score(&player, &opponent, rules());
        assert_eq!(score.multiplier, 2);

        player.go_count = 5;
        let score = calculate_score(&player, &opponent, rules());
        assert_eq!(score.multiplier, 8);
        assert_eq!(score.total, (3 + 5) * 8);
    }

    #[test]
    fn test_shaking_and_bomb_multipliers() {
        let opponent = PlayerState::new(0);
        let mut player = player_with(&[0, 8, 28]);
        player.events.shaking = 2;
        player.events.bomb = 1;

        let score = calculate_score(&player, &opponent, rules());
        assert_eq!(score.multiplier, 8);
    }

    #[test]
    fn test_all_three_baks_compose_to_eight() {
        let mut player = PlayerState::new(0);
        let mut opponent = PlayerState::new(0);

        // Three brights, seven fives, ten pips for the player
        for id in [0, 8, 28] {
            player.captured.push(deck_card(id));
        }
        for id in [4, 12, 16, 20, 24, 29, 36] {
            player.captured.push(deck_card(id));
        }
        for id in [2, 3, 6, 7, 10, 11, 14, 15, 18, 19] {
            player.captured.push(deck_card(id));
        }
        // Opponent: no brights, no fives, a few pips
        for id in [22, 23, 26] {
            opponent.captured.push(deck_card(id));
        }

        let score = calculate_score(&player, &opponent, rules());
        assert!(score.bak.gwang);
        assert!(score.bak.pi);
        assert!(score.bak.mong_bak);
        assert_eq!(score.bak.multiplier, 8);
        assert_eq!(score.multiplier, 8);
    }

    #[test]
    fn test_pi_bak_needs_nonzero_opponent_pips() {
        let mut player = PlayerState::new(0);
        let opponent = PlayerState::new(0);
        for id in [2, 3, 6, 7, 10, 11, 14, 15, 18, 19] {
            player.captured.push(deck_card(id));
        }

        let score = calculate_score(&player, &opponent, rules());
        assert!(!score.bak.pi);
    }

    #[test]
    fn test_transformed_gukjin_counts_as_junk() {
        let mut player = PlayerState::new(0);
        let mut gukjin = deck_card(32);
        gukjin.category = Category::Junk;
        gukjin.pi_value = 2;
        gukjin.gukjin_transformed = true;
        player.captured.push(gukjin);
        player.gukjin_mode = GukjinMode::Junk;

        assert_eq!(scoring_pi_count(&player), 2);
        assert!(player.captured.junk.iter().any(|c| c.id == CardId(32)));
    }
}
