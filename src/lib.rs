//! # matgo
//!
//! A deterministic two-player Go-Stop (matgo) match engine.
//!
//! The engine is the authoritative rules core consumed by replay
//! viewers, bot trainers and statistical tuning tools, all of which
//! need bit-exact reproducibility: a round is a pure function of the
//! seed and the action sequence.
//!
//! ## Design Principles
//!
//! 1. **Pure transitions**: every action takes a `GameState` and returns
//!    a new one. Illegal actions return the input unchanged, so callers
//!    can probe legality without special-casing errors.
//!
//! 2. **Randomness only at the deal**: the injected [`core::GameRng`] is
//!    consumed by the opening shuffle and first-turn tiebreak; nothing
//!    after the deal draws randomness. Even the day/night first-turn
//!    parity is an explicit input ([`core::Daylight`]).
//!
//! 3. **Pending phases are data**: a suspended choice is a phase
//!    discriminant plus a payload, resumed by the matching action.
//!
//! 4. **The kibo is a contract**: the append-only replay log's field
//!    names and type tags are frozen for external analyzers.
//!
//! ## Modules
//!
//! - `core`: sides, RNG, player aggregates, the `GameState` root
//! - `cards`: card value type and the 50-card catalog
//! - `engine`: matching, steals, scoring, turn flow, resolution, opening
//! - `kibo`: the structured replay format
//! - `runner`: acting-seat resolution and pluggable strategy driving

pub mod cards;
pub mod core;
pub mod engine;
pub mod kibo;
pub mod runner;

// Re-export the public action surface and the types it touches.
pub use crate::core::{
    ActionReveal, Daylight, GameOptions, GameRng, GameRngState, GameState, GukjinMode, KiboDetail,
    Phase, PlayerState, RemainingEstimate, RoundResult, Side, SidePair,
};

pub use crate::cards::{Card, CardId, Category, ComboTag};

pub use crate::engine::{
    calculate_base_score, calculate_score, choose_gukjin_mode, choose_kung_pass, choose_kung_use,
    choose_match, choose_president_hold, choose_president_stop, declarable_bomb_months,
    declarable_shaking_months, declare_bomb, declare_go, declare_shaking, declare_stop, play_card,
    start_game, start_next_round, RuleKey, RuleSet, ScoreInfo,
};

pub use crate::kibo::{KiboEvent, KiboRecord, PackedCard, RoundWinner};

pub use crate::runner::{acting_side, advance_auto, RandomStrategy, Strategy};
