//! Auto-run helpers: who acts next, and a pluggable strategy driver.
//!
//! Heuristic policy layers live outside the engine and drive it through
//! the public action surface. The driver here is enough to host them:
//! resolve the acting seat from the phase, call the strategy, and stop
//! on a terminal phase, a human seat, or a strategy no-op.

use crate::cards::CardId;
use crate::core::rng::GameRng;
use crate::core::side::Side;
use crate::core::state::{GameState, Phase};
use crate::engine::declare::{
    choose_gukjin_mode, choose_kung_pass, choose_kung_use, choose_president_hold,
    choose_president_stop, declarable_bomb_months, declarable_shaking_months, declare_bomb,
    declare_go, declare_shaking, declare_stop,
};
use crate::engine::turn::{choose_match, play_card};
use crate::core::player::GukjinMode;

const DEFAULT_MAX_AUTO_STEPS: usize = 400;

/// The seat expected to act in the current phase, if any.
#[must_use]
pub fn acting_side(state: &GameState) -> Option<Side> {
    match state.phase {
        Phase::Playing => Some(state.current_turn),
        Phase::GoStop => state.pending_go_stop,
        Phase::SelectMatch => state.pending_match.as_ref().map(|p| p.side),
        Phase::PresidentChoice => state.pending_president.map(|p| p.side),
        Phase::GukjinChoice => state.pending_gukjin,
        Phase::KungChoice => state.pending_kung.map(|p| p.side),
        Phase::Resolution => None,
    }
}

/// A decision policy for one or both seats.
pub trait Strategy {
    /// Act once for `side`, returning the successor state.
    ///
    /// Returning the state unchanged signals the driver to stop.
    fn act(&mut self, state: &GameState, side: Side) -> GameState;
}

/// Advance bot-controlled seats until a human seat, a terminal phase,
/// a strategy no-op, or the step cap.
pub fn advance_auto(
    state: GameState,
    is_bot: impl Fn(Side) -> bool,
    strategy: &mut dyn Strategy,
    max_steps: Option<usize>,
) -> GameState {
    let max_steps = max_steps.unwrap_or(DEFAULT_MAX_AUTO_STEPS);
    let mut state = state;

    for _ in 0..max_steps {
        let Some(actor) = acting_side(&state) else { break };
        if !is_bot(actor) {
            break;
        }
        let next = strategy.act(&state, actor);
        if next == state {
            break;
        }
        state = next;
        if state.is_resolved() {
            break;
        }
    }
    state
}

/// Seeded random policy.
///
/// Useful as a self-play baseline and for soak-testing the engine: its
/// choices are deterministic per seed, so whole playouts replay exactly.
pub struct RandomStrategy {
    rng: GameRng,
}

impl RandomStrategy {
    /// Create a random policy with its own seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
        }
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            None
        } else {
            Some(items[self.rng.gen_range_usize(0..items.len())])
        }
    }
}

impl Strategy for RandomStrategy {
    fn act(&mut self, state: &GameState, side: Side) -> GameState {
        match state.phase {
            Phase::KungChoice => {
                if self.rng.coin() {
                    choose_kung_use(state, side)
                } else {
                    choose_kung_pass(state, side)
                }
            }
            Phase::GukjinChoice => {
                let mode = if self.rng.coin() {
                    GukjinMode::Five
                } else {
                    GukjinMode::Junk
                };
                choose_gukjin_mode(state, side, mode)
            }
            Phase::PresidentChoice => {
                if self.rng.coin() {
                    choose_president_stop(state, side)
                } else {
                    choose_president_hold(state, side)
                }
            }
            Phase::SelectMatch => {
                let options: Vec<CardId> = state
                    .pending_match
                    .as_ref()
                    .map(|p| p.board_cards.to_vec())
                    .unwrap_or_default();
                match self.pick(&options) {
                    Some(card) => choose_match(state, card),
                    None => state.clone(),
                }
            }
            Phase::GoStop => {
                if self.rng.coin() {
                    declare_go(state, side)
                } else {
                    declare_stop(state, side)
                }
            }
            Phase::Playing => {
                let bombs = declarable_bomb_months(state, side);
                if !bombs.is_empty() && self.rng.coin() {
                    if let Some(month) = self.pick(&bombs) {
                        return declare_bomb(state, side, month);
                    }
                }
                let shakes = declarable_shaking_months(state, side);
                if !shakes.is_empty() && self.rng.coin() {
                    if let Some(month) = self.pick(&shakes) {
                        return declare_shaking(state, side, month);
                    }
                }
                let hand: Vec<CardId> = state.players[side].hand.iter().map(|c| c.id).collect();
                match self.pick(&hand) {
                    Some(card) => play_card(state, card),
                    None => state.clone(),
                }
            }
            Phase::Resolution => state.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::GameOptions;
    use crate::engine::opening::start_game;
    use crate::engine::rules::RuleKey;

    #[test]
    fn test_acting_side_follows_phase() {
        let mut rng = GameRng::new(42);
        let state = start_game(RuleKey::A, &mut rng, &GameOptions::default());

        match state.phase {
            Phase::Playing => assert_eq!(acting_side(&state), Some(state.current_turn)),
            Phase::PresidentChoice | Phase::KungChoice => assert!(acting_side(&state).is_some()),
            _ => {}
        }
    }

    #[test]
    fn test_random_playout_terminates() {
        let mut rng = GameRng::new(7);
        let state = start_game(RuleKey::A, &mut rng, &GameOptions::default());
        let mut strategy = RandomStrategy::new(7);

        let end = advance_auto(state, |_| true, &mut strategy, None);

        assert!(end.is_resolved());
        assert!(end.result.is_some());
    }
}
