//! The match engine: matching, capture, scoring, turn flow, resolution,
//! opening, and the gold economy.

pub mod capture;
pub mod declare;
pub mod economy;
pub(crate) mod finalize;
pub mod matching;
pub mod opening;
pub mod resolution;
pub mod rules;
pub mod scoring;
pub mod turn;

pub use capture::{steal_pi, StealReport};
pub use declare::{
    choose_gukjin_mode, choose_kung_pass, choose_kung_use, choose_president_hold,
    choose_president_stop, declarable_bomb_months, declarable_shaking_months, declare_bomb,
    declare_go, declare_shaking, declare_stop,
};
pub use economy::{points_to_gold, settle_round_gold, steal_gold, POINT_GOLD_UNIT, STARTING_GOLD};
pub use matching::{best_match_card, resolve_match, EventTag, MatchEvent, MatchKind, MatchOutcome, MatchSource};
pub use opening::{
    decide_first_turn, find_kung_month, find_president_month, start_game, start_next_round,
    BOARD_SIZE, STARTING_HAND_SIZE,
};
pub use rules::{RuleKey, RuleSet};
pub use scoring::{
    calculate_base_score, calculate_score, scoring_five_cards, scoring_pi_count, BakInfo,
    ScoreBreakdown, ScoreInfo,
};
pub use turn::{choose_match, play_card};
