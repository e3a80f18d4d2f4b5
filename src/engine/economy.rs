//! Gold economy.
//!
//! Points convert to gold at a fixed unit. Transfers drain the giver down
//! to zero at most; a shortfall is a normal outcome, recorded in the
//! narration log. A seat left at zero re-enters the next round at the
//! full starting stake.

use serde::{Deserialize, Serialize};

use crate::core::player::PlayerState;
use crate::core::side::{Side, SidePair};

/// Stake each seat starts a match with.
pub const STARTING_GOLD: u64 = 1_000_000;

/// Gold paid per point.
pub const POINT_GOLD_UNIT: u64 = 100;

/// Convert points to gold.
#[must_use]
pub fn points_to_gold(points: u32) -> u64 {
    u64::from(points) * POINT_GOLD_UNIT
}

/// Outcome of a gold transfer.
#[derive(Clone, Debug, Default)]
pub struct GoldTransfer {
    pub paid: u64,
    pub lines: Vec<String>,
}

/// Transfer up to `amount` gold from the taker's opponent.
pub fn steal_gold(players: &mut SidePair<PlayerState>, taker: Side, amount: u64) -> GoldTransfer {
    let giver = taker.other();
    let available = players[giver].gold;
    let paid = amount.min(available);

    players[taker].gold += paid;
    players[giver].gold = available - paid;

    let mut lines = vec![format!("{taker}: gains {paid} gold (from {giver})")];
    if paid < amount {
        log::debug!("gold shortfall: {giver} owed {amount}, paid {paid}");
        lines.push(format!("{giver}: could not fully pay ({} unpaid)", amount - paid));
    }
    if players[giver].gold == 0 {
        log::info!("{giver} is bankrupt; next round restarts at {STARTING_GOLD} gold");
        lines.push(format!(
            "{giver}: bankrupt (0 gold). Next round starts with {STARTING_GOLD} gold."
        ));
    }

    GoldTransfer { paid, lines }
}

/// Round-end settlement bookkeeping.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldSettlement {
    pub requested: u64,
    pub paid: u64,
    pub unit_per_point: u64,
}

/// Settle a won round: the winner requests `score_points` worth of gold.
pub fn settle_round_gold(
    players: &mut SidePair<PlayerState>,
    winner: Side,
    score_points: u32,
) -> (GoldSettlement, Vec<String>) {
    let requested = points_to_gold(score_points);
    let transfer = steal_gold(players, winner, requested);

    (
        GoldSettlement {
            requested,
            paid: transfer.paid,
            unit_per_point: POINT_GOLD_UNIT,
        },
        transfer.lines,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seats(a: u64, b: u64) -> SidePair<PlayerState> {
        SidePair::new(PlayerState::new(a), PlayerState::new(b))
    }

    #[test]
    fn test_points_to_gold() {
        assert_eq!(points_to_gold(0), 0);
        assert_eq!(points_to_gold(7), 700);
    }

    #[test]
    fn test_full_transfer() {
        let mut players = seats(1_000, 1_000);

        let transfer = steal_gold(&mut players, Side::A, 300);

        assert_eq!(transfer.paid, 300);
        assert_eq!(players[Side::A].gold, 1_300);
        assert_eq!(players[Side::B].gold, 700);
    }

    #[test]
    fn test_shortfall_is_not_an_error() {
        let mut players = seats(0, 200);

        let transfer = steal_gold(&mut players, Side::A, 500);

        assert_eq!(transfer.paid, 200);
        assert_eq!(players[Side::B].gold, 0);
        assert!(transfer.lines.iter().any(|l| l.contains("could not fully pay")));
        assert!(transfer.lines.iter().any(|l| l.contains("bankrupt")));
    }

    #[test]
    fn test_settlement_bookkeeping() {
        let mut players = seats(0, 1_000);

        let (settlement, _) = settle_round_gold(&mut players, Side::A, 12);

        assert_eq!(settlement.requested, 1_200);
        assert_eq!(settlement.paid, 1_000);
        assert_eq!(settlement.unit_per_point, POINT_GOLD_UNIT);
    }
}
