//! The fixed 50-card catalog and deck construction.
//!
//! Catalog order is months 1-12 with four cards each, then the two bonus
//! cards. A card's id is its catalog index, which keeps identity ordering
//! stable across builds.

use smallvec::smallvec;

use super::card::{Card, CardId, Category, ComboTag, BONUS_MONTH};
use crate::core::rng::GameRng;

/// The dual-mode September five ("gukjin").
pub const GUKJIN_ID: CardId = CardId(32);

/// The rain bright; three brights including it score one point less.
pub const RAIN_KWANG_ID: CardId = CardId(44);

/// Total cards in a deck.
pub const DECK_SIZE: usize = 50;

struct CatalogEntry {
    month: u8,
    category: Category,
    name: &'static str,
    pi_value: u8,
    tag: Option<ComboTag>,
    steal_pi: u8,
}

const fn seasonal(month: u8, category: Category, name: &'static str) -> CatalogEntry {
    CatalogEntry {
        month,
        category,
        name,
        pi_value: 0,
        tag: None,
        steal_pi: 0,
    }
}

const fn junk(month: u8, name: &'static str, pi_value: u8) -> CatalogEntry {
    CatalogEntry {
        month,
        category: Category::Junk,
        name,
        pi_value,
        tag: None,
        steal_pi: 0,
    }
}

const fn tagged(month: u8, category: Category, name: &'static str, tag: ComboTag) -> CatalogEntry {
    CatalogEntry {
        month,
        category,
        name,
        pi_value: 0,
        tag: Some(tag),
        steal_pi: 0,
    }
}

const fn bonus(name: &'static str, pi_value: u8) -> CatalogEntry {
    CatalogEntry {
        month: BONUS_MONTH,
        category: Category::Junk,
        name,
        pi_value,
        tag: None,
        steal_pi: 1,
    }
}

const CATALOG: [CatalogEntry; DECK_SIZE] = [
    seasonal(1, Category::Kwang, "Pine Bright"),
    tagged(1, Category::Ribbon, "Poetry Ribbon", ComboTag::RedRibbons),
    junk(1, "Pine Junk A", 1),
    junk(1, "Pine Junk B", 1),
    tagged(2, Category::Five, "Bush Warbler", ComboTag::FiveBirds),
    tagged(2, Category::Ribbon, "Poetry Ribbon", ComboTag::RedRibbons),
    junk(2, "Plum Junk A", 1),
    junk(2, "Plum Junk B", 1),
    seasonal(3, Category::Kwang, "Cherry Bright"),
    tagged(3, Category::Ribbon, "Poetry Ribbon", ComboTag::RedRibbons),
    junk(3, "Cherry Junk A", 1),
    junk(3, "Cherry Junk B", 1),
    tagged(4, Category::Five, "Cuckoo", ComboTag::FiveBirds),
    tagged(4, Category::Ribbon, "Plant Ribbon", ComboTag::PlainRibbons),
    junk(4, "Wisteria Junk A", 1),
    junk(4, "Wisteria Junk B", 1),
    seasonal(5, Category::Five, "Bridge"),
    tagged(5, Category::Ribbon, "Plant Ribbon", ComboTag::PlainRibbons),
    junk(5, "Iris Junk A", 1),
    junk(5, "Iris Junk B", 1),
    seasonal(6, Category::Five, "Butterflies"),
    tagged(6, Category::Ribbon, "Blue Ribbon", ComboTag::BlueRibbons),
    junk(6, "Peony Junk A", 1),
    junk(6, "Peony Junk B", 1),
    seasonal(7, Category::Five, "Boar"),
    tagged(7, Category::Ribbon, "Plant Ribbon", ComboTag::PlainRibbons),
    junk(7, "Clover Junk A", 1),
    junk(7, "Clover Junk B", 1),
    seasonal(8, Category::Kwang, "Moon Bright"),
    tagged(8, Category::Five, "Geese", ComboTag::FiveBirds),
    junk(8, "Pampas Junk A", 1),
    junk(8, "Pampas Junk B", 1),
    seasonal(9, Category::Five, "Sake Cup"),
    tagged(9, Category::Ribbon, "Blue Ribbon", ComboTag::BlueRibbons),
    junk(9, "Chrysanthemum Junk A", 1),
    junk(9, "Chrysanthemum Junk B", 1),
    seasonal(10, Category::Five, "Deer"),
    tagged(10, Category::Ribbon, "Maple Ribbon", ComboTag::BlueRibbons),
    junk(10, "Maple Junk A", 1),
    junk(10, "Maple Junk B", 1),
    seasonal(11, Category::Kwang, "Willow Bright"),
    junk(11, "Willow Double Junk", 2),
    junk(11, "Willow Junk A", 1),
    junk(11, "Willow Junk B", 1),
    seasonal(12, Category::Kwang, "Paulownia Bright"),
    seasonal(12, Category::Five, "Rain Five"),
    seasonal(12, Category::Ribbon, "Paulownia Ribbon"),
    junk(12, "Paulownia Junk", 2),
    bonus("Bonus Double", 2),
    bonus("Bonus Triple", 3),
];

/// Build the full deck in catalog order.
#[must_use]
pub fn build_deck() -> Vec<Card> {
    CATALOG
        .iter()
        .enumerate()
        .map(|(idx, entry)| Card {
            id: CardId(idx as u16),
            month: entry.month,
            category: entry.category,
            name: entry.name.to_string(),
            pi_value: entry.pi_value,
            tags: entry.tag.map_or_else(Default::default, |t| smallvec![t]),
            steal_pi: entry.steal_pi,
            pass_card: false,
            gukjin_transformed: false,
        })
        .collect()
}

/// Build a deck and shuffle it with the injected random source.
#[must_use]
pub fn shuffled_deck(rng: &mut GameRng) -> Vec<Card> {
    let mut deck = build_deck();
    rng.shuffle(&mut deck);
    deck
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_shape() {
        let deck = build_deck();
        assert_eq!(deck.len(), DECK_SIZE);

        for month in 1..=12u8 {
            assert_eq!(deck.iter().filter(|c| c.month == month).count(), 4);
        }
        assert_eq!(deck.iter().filter(|c| c.month == BONUS_MONTH).count(), 2);
    }

    #[test]
    fn test_category_counts() {
        let deck = build_deck();
        let count = |cat| deck.iter().filter(|c| c.category == cat).count();

        assert_eq!(count(Category::Kwang), 5);
        assert_eq!(count(Category::Five), 9);
        assert_eq!(count(Category::Ribbon), 10);
        assert_eq!(count(Category::Junk), 26);
    }

    #[test]
    fn test_special_card_ids() {
        let deck = build_deck();

        let gukjin = &deck[GUKJIN_ID.0 as usize];
        assert_eq!(gukjin.month, 9);
        assert_eq!(gukjin.category, Category::Five);
        assert!(gukjin.is_gukjin());

        let rain = &deck[RAIN_KWANG_ID.0 as usize];
        assert_eq!(rain.month, 12);
        assert_eq!(rain.category, Category::Kwang);
    }

    #[test]
    fn test_pi_values() {
        let deck = build_deck();
        let total_pi: u32 = deck.iter().map(Card::pi).sum();

        // 22 plain junk + 2 double junk + bonus double + bonus triple
        assert_eq!(total_pi, 22 + 4 + 2 + 3);
    }

    #[test]
    fn test_bonus_cards() {
        let deck = build_deck();
        let bonuses: Vec<_> = deck.iter().filter(|c| c.is_bonus()).collect();

        assert_eq!(bonuses.len(), 2);
        assert!(bonuses.iter().all(|c| c.month == BONUS_MONTH));
        assert_eq!(bonuses[0].pi(), 2);
        assert_eq!(bonuses[1].pi(), 3);
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let mut rng1 = GameRng::new(9);
        let mut rng2 = GameRng::new(9);

        let d1 = shuffled_deck(&mut rng1);
        let d2 = shuffled_deck(&mut rng2);

        assert_eq!(d1, d2);
        assert_ne!(d1, build_deck());
    }
}
