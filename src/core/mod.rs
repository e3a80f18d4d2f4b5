//! Core engine types: sides, RNG, player aggregates, and the game state.

pub mod player;
pub mod rng;
pub mod side;
pub mod state;

pub use player::{
    CapturedSet, EventCounters, GukjinMode, PlayerState, PpukSource, PpukState,
};
pub use rng::{GameRng, GameRngState};
pub use side::{Side, SidePair};
pub use state::{
    ActionReveal, Daylight, GameOptions, GameState, KiboDetail, MatchOrigin, PendingKung,
    PendingMatch, PendingPresident, Phase, RemainingEstimate, RevealKind, RoundResult,
    TurnContext,
};
