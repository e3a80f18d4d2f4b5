//! Card model: the immutable card value type and the fixed deck catalog.

mod card;
mod deck;

pub use card::{Card, CardId, Category, ComboTag, BONUS_MONTH, PASS_ID_BASE};
pub use deck::{build_deck, shuffled_deck, DECK_SIZE, GUKJIN_ID, RAIN_KWANG_ID};
