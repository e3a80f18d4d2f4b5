//! Round resolution: winner or void, multiplier compounding, settlement.
//!
//! Triple ppuk ends the round 7-0 on the spot. Otherwise an explicit
//! stop wins unconditionally, then totals decide. A lone failed go
//! concedes the round outright when the other side made the minimum;
//! unresolved go-fails, draws and scoreless boards each void the round
//! (nagari), doubling the stake carried into the next deal.

use crate::core::side::{Side, SidePair};
use crate::core::state::{GameState, Phase, RoundResult};
use crate::engine::economy::settle_round_gold;
use crate::engine::scoring::{calculate_base_score, calculate_score, ScoreInfo};
use crate::kibo::{GoldSettlement, KiboEvent, NagariReason, RoundWinner};

fn failed_go(state: &GameState, side: Side) -> bool {
    let player = &state.players[side];
    if player.go_count == 0 {
        return false;
    }
    let (base, _) = calculate_base_score(player);
    base <= player.last_go_base
}

fn apply_multiplier(score: &mut ScoreInfo, factor: u32) {
    score.multiplier *= factor;
    score.total *= factor;
}

/// Decide the round. `stopper` is the actor whose action closed it.
pub(crate) fn resolve_round(state: &GameState, stopper: Side) -> GameState {
    let rules = state.rules();
    let mut scores = SidePair::from_fn(|side| {
        calculate_score(&state.players[side], &state.players[side.other()], rules)
    });

    let ppuk_win = SidePair::from_fn(|side| state.players[side].events.ppuk >= 3);
    let ppuk_winner = match (ppuk_win[Side::A], ppuk_win[Side::B]) {
        (true, false) => Some(Side::A),
        (false, true) => Some(Side::B),
        _ => None,
    };

    let mut nagari_reasons: Vec<NagariReason> = Vec::new();
    let mut winner: RoundWinner;

    if let Some(side) = ppuk_winner {
        scores[side] = ScoreInfo {
            base: 7,
            multiplier: 1,
            total: 7,
            ..scores[side]
        };
        scores[side.other()] = ScoreInfo {
            base: 0,
            multiplier: 1,
            total: 0,
            ..scores[side.other()]
        };
        winner = side.into();
    } else {
        winner = if state.players[Side::A].declared_stop {
            RoundWinner::A
        } else if state.players[Side::B].declared_stop {
            RoundWinner::B
        } else if scores[Side::A].total == scores[Side::B].total {
            RoundWinner::Draw
        } else if scores[Side::A].total > scores[Side::B].total {
            RoundWinner::A
        } else {
            RoundWinner::B
        };

        let failed = SidePair::from_fn(|side| failed_go(state, side));
        match (failed[Side::A], failed[Side::B]) {
            (true, false) | (false, true) => {
                let failing = if failed[Side::A] { Side::A } else { Side::B };
                let other = failing.other();
                let (other_base, _) = calculate_base_score(&state.players[other]);
                if other_base >= rules.go_min_score {
                    winner = other.into();
                } else {
                    nagari_reasons.push(NagariReason::GoFail(failing));
                }
            }
            (true, true) => {
                nagari_reasons.push(NagariReason::GoFail(Side::A));
                nagari_reasons.push(NagariReason::GoFail(Side::B));
            }
            (false, false) => {}
        }

        let mut reasons = Vec::new();
        if winner == RoundWinner::Draw {
            reasons.push(NagariReason::Draw);
        }
        if scores[Side::A].base == 0 && scores[Side::B].base == 0 {
            reasons.push(NagariReason::Scoreless);
        }
        reasons.extend(nagari_reasons);
        nagari_reasons = reasons;
    }

    let nagari = !nagari_reasons.is_empty();
    let carry = state.carry_over_multiplier.max(1);
    let mut next_state = state.clone();
    let mut settlement = GoldSettlement::default();

    let resolved_winner = if nagari { RoundWinner::Draw } else { winner };

    if nagari {
        next_state.next_carry_over_multiplier = carry * 2;
        log::debug!("round voided ({nagari_reasons:?}); next carry-over x{}", carry * 2);
    } else {
        next_state.next_carry_over_multiplier = 1;

        if let Some(side) = resolved_winner.side() {
            if carry > 1 {
                apply_multiplier(&mut scores[side], carry);
            }

            let winner_player = &state.players[side];
            let shaking_or_bomb =
                winner_player.events.shaking > 0 || winner_player.events.bomb > 0;
            if winner_player.president_hold && shaking_or_bomb {
                apply_multiplier(&mut scores[side], 4);
            }

            // Forced continuation: the loser chased a go and got stopped.
            if winner_player.declared_stop && state.players[side.other()].go_count > 0 {
                apply_multiplier(&mut scores[side], 2);
            }

            let payout = scores[side].total;
            let (gold, lines) = settle_round_gold(&mut next_state.players, side, payout);
            settlement = gold;
            next_state.push_log(format!(
                "Round settled: A {} / B {} (winner: {side})",
                scores[Side::A].total,
                scores[Side::B].total
            ));
            for line in lines {
                next_state.push_log(line);
            }
        }
    }

    if nagari {
        let reason_list: Vec<&str> = nagari_reasons.iter().map(|r| r.as_str()).collect();
        next_state.push_log(format!(
            "Void round ({}): next round multiplier x{}",
            reason_list.join(", "),
            next_state.next_carry_over_multiplier
        ));
    }

    next_state.phase = Phase::Resolution;
    next_state.current_turn = stopper.other();
    next_state.pending_match = None;
    next_state.pending_go_stop = None;
    next_state.pending_gukjin = None;
    next_state.pending_president = None;
    next_state.pending_kung = None;
    next_state.push_kibo(KiboEvent::RoundEnd {
        winner: resolved_winner,
        nagari,
        nagari_reasons: nagari_reasons.clone(),
        scores: scores.clone(),
        gold: settlement.clone(),
    });
    next_state.result = Some(RoundResult {
        winner: resolved_winner,
        nagari,
        nagari_reasons,
        scores,
        gold: settlement,
    });
    next_state
}
