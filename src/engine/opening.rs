//! Opening: deal, first-turn decision, and normalization.
//!
//! The deal is the only place the engine touches randomness. After the
//! shuffle everything is normalized deterministically: exposed bonus
//! cards are routed to their owners and replaced, a four-of-a-month
//! board voids the deal outright, and the first actor may face the
//! president or kung openers before ordinary play begins.

use crate::cards::{shuffled_deck, Card};
use crate::core::player::PlayerState;
use crate::core::rng::GameRng;
use crate::core::side::{Side, SidePair};
use crate::core::state::{
    Daylight, GameOptions, GameState, KiboDetail, PendingKung, PendingPresident, Phase,
};
use crate::engine::economy::STARTING_GOLD;
use crate::engine::rules::RuleKey;
use crate::kibo::{pack_cards, KiboEvent};

/// Cards dealt to each hand.
pub const STARTING_HAND_SIZE: usize = 10;

/// Cards dealt face-up.
pub const BOARD_SIZE: usize = 8;

/// Decide who moves first from both players' first hand cards.
///
/// At night the lower month starts, by day the higher; equal months are
/// broken by the seeded coin. `Daylight` is an injected input, never an
/// ambient clock read.
pub fn decide_first_turn(
    card_a: &Card,
    card_b: &Card,
    rng: &mut GameRng,
    daylight: Daylight,
) -> (Side, String) {
    let (winner, reason) = if card_a.month == card_b.month {
        let side = if rng.coin() { Side::A } else { Side::B };
        (side, "same month random")
    } else if daylight == Daylight::Night {
        let side = if card_a.month < card_b.month { Side::A } else { Side::B };
        (side, "night rule: lower month starts")
    } else {
        let side = if card_a.month > card_b.month { Side::A } else { Side::B };
        (side, "day rule: higher month starts")
    };

    let tag = match daylight {
        Daylight::Day => "day",
        Daylight::Night => "night",
    };
    let log = format!(
        "Starter decided [{tag}]: A {} vs B {} -> {winner} ({reason})",
        card_a.month, card_b.month
    );
    (winner, log)
}

/// Month held four times among the given cards, if any.
///
/// Only the twelve seasonal months count; placeholders and bonus cards
/// are ignored.
#[must_use]
pub fn find_president_month(cards: &[Card]) -> Option<u8> {
    let mut counts = [0u8; 13];
    for card in cards {
        if card.pass_card || !card.is_seasonal() {
            continue;
        }
        counts[card.month as usize] += 1;
        if counts[card.month as usize] >= 4 {
            return Some(card.month);
        }
    }
    None
}

/// Month held three times in hand with exactly one board card, if any.
#[must_use]
pub fn find_kung_month(hand: &[Card], board: &[Card]) -> Option<u8> {
    (1..=12u8).find(|&month| {
        hand.iter().filter(|c| !c.pass_card && c.month == month).count() >= 3
            && board.iter().filter(|c| c.month == month).count() == 1
    })
}

/// Route every exposed bonus card to its owner and refill from the pile
/// until none remain exposed.
fn normalize_opening(
    players: &mut SidePair<PlayerState>,
    board: &mut Vec<Card>,
    pile: &mut Vec<Card>,
    first: Side,
    log: &mut Vec<String>,
) {
    loop {
        let mut changed = false;

        for side in Side::BOTH {
            while let Some(pos) = players[side].hand.iter().position(Card::is_bonus) {
                let card = players[side].hand.remove(pos);
                log.push(format!("Opening adjust: {side} captures hand bonus card {}", card.name));
                players[side].captured.push(card);
                if !pile.is_empty() {
                    players[side].hand.push(pile.remove(0));
                }
                changed = true;
            }
        }

        while let Some(pos) = board.iter().position(Card::is_bonus) {
            let card = board.remove(pos);
            log.push(format!(
                "Opening adjust: {first} captures board bonus card {}",
                card.name
            ));
            players[first].captured.push(card);
            changed = true;
        }
        while board.len() < BOARD_SIZE && !pile.is_empty() {
            board.push(pile.remove(0));
        }

        if !changed {
            break;
        }
    }
}

/// Deal and normalize a round.
///
/// A four-of-a-month board voids the deal: the carry-over doubles and a
/// fresh shuffle is drawn from the same random source.
#[must_use]
pub fn start_game(rule_key: RuleKey, rng: &mut GameRng, options: &GameOptions) -> GameState {
    let mut carry = options.carry_over_multiplier.unwrap_or(1).max(1);
    let mut redeal_logs: Vec<String> = Vec::new();

    loop {
        let deck = shuffled_deck(rng);
        let seat_gold = |side: Side| {
            options.initial_gold[side]
                .filter(|gold| *gold > 0)
                .unwrap_or(STARTING_GOLD)
        };
        let mut players = SidePair::from_fn(|side| PlayerState::new(seat_gold(side)));
        players[Side::A].hand = deck[..STARTING_HAND_SIZE].to_vec();
        players[Side::B].hand = deck[STARTING_HAND_SIZE..2 * STARTING_HAND_SIZE].to_vec();
        let mut board = deck[2 * STARTING_HAND_SIZE..2 * STARTING_HAND_SIZE + BOARD_SIZE].to_vec();
        let mut pile = deck[2 * STARTING_HAND_SIZE + BOARD_SIZE..].to_vec();

        let (first, first_log) = match options.first_turn {
            Some(side) => (side, format!("Starter fixed: {side}")),
            None => decide_first_turn(
                &players[Side::A].hand[0],
                &players[Side::B].hand[0],
                rng,
                options.daylight,
            ),
        };

        let mut init_log = vec![first_log];
        normalize_opening(&mut players, &mut board, &mut pile, first, &mut init_log);

        if let Some(month) = find_president_month(&board) {
            redeal_logs.push(format!(
                "Board holds four cards of month {month}: deal voided, next carry-over x{}",
                carry * 2
            ));
            carry *= 2;
            continue;
        }

        let mut phase = Phase::Playing;
        let mut pending_president = None;
        let mut pending_kung = None;
        if let Some(month) = find_president_month(&players[first].hand) {
            phase = Phase::PresidentChoice;
            pending_president = Some(PendingPresident { side: first, month });
            init_log.push(format!(
                "{first}: opening hand president (month {month} x4) - choose 10-point stop or hold"
            ));
        } else if let Some(month) = find_kung_month(&players[first].hand, &board) {
            phase = Phase::KungChoice;
            pending_kung = Some(PendingKung { side: first, month });
            init_log.push(format!(
                "{first}: opening kung available (month {month} x3 + board) - choose use or pass"
            ));
        }

        let mut log: Vec<String> = vec![format!(
            "Game start - rules: {}",
            rule_key.rules().name
        )];
        if carry > 1 {
            log.push(format!("Carry-over multiplier in effect: x{carry}"));
        }
        log.extend(redeal_logs.iter().cloned());
        log.extend(init_log);

        let initial_deal = match options.kibo_detail {
            KiboDetail::Full => KiboEvent::InitialDeal {
                first_turn: first,
                hands: Some(players.map(|p| pack_cards(&p.hand))),
                board: Some(pack_cards(&board)),
                deck: Some(pack_cards(&pile)),
                hands_count: None,
                board_count: None,
                deck_count: None,
            },
            KiboDetail::Lean => KiboEvent::InitialDeal {
                first_turn: first,
                hands: None,
                board: None,
                deck: None,
                hands_count: Some(players.map(|p| p.hand.len())),
                board_count: Some(board.len()),
                deck_count: Some(pile.len()),
            },
        };

        let mut state = GameState {
            rule_key,
            deck: pile,
            board,
            players,
            current_turn: first,
            starting_side: first,
            phase,
            pending_match: None,
            pending_go_stop: None,
            pending_president,
            pending_gukjin: None,
            pending_kung,
            reveal: None,
            carry_over_multiplier: carry,
            next_carry_over_multiplier: 1,
            turn_seq: 0,
            kibo_seq: 0,
            pass_card_counter: 0,
            kibo_detail: options.kibo_detail,
            log: log.into_iter().collect(),
            kibo: im::Vector::new(),
            result: None,
        };
        state.push_kibo(initial_deal);

        debug_assert!(state.card_partition_ok());
        return state;
    }
}

/// Deal the round after `prev`, inheriting starter, gold, and carry-over.
///
/// The previous winner starts; a voided round keeps the same starter. A
/// seat that went bankrupt re-enters at the full starting stake.
#[must_use]
pub fn start_next_round(prev: &GameState, rng: &mut GameRng, options: &GameOptions) -> GameState {
    let mut opts = options.clone();

    if opts.first_turn.is_none() {
        opts.first_turn = prev
            .result
            .as_ref()
            .and_then(|r| r.winner.side())
            .or(Some(prev.starting_side));
    }
    if opts.carry_over_multiplier.is_none() {
        opts.carry_over_multiplier = Some(prev.next_carry_over_multiplier.max(1));
    }
    for side in Side::BOTH {
        if opts.initial_gold[side].is_none() {
            opts.initial_gold[side] = Some(prev.players[side].gold);
        }
    }

    start_game(prev.rule_key, rng, &opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::build_deck;

    fn card(id: u16) -> Card {
        build_deck().swap_remove(id as usize)
    }

    #[test]
    fn test_first_turn_day_night() {
        let mut rng = GameRng::new(1);
        let low = card(0); // month 1
        let high = card(8); // month 3

        let (day_winner, _) = decide_first_turn(&low, &high, &mut rng, Daylight::Day);
        assert_eq!(day_winner, Side::B);

        let (night_winner, _) = decide_first_turn(&low, &high, &mut rng, Daylight::Night);
        assert_eq!(night_winner, Side::A);
    }

    #[test]
    fn test_first_turn_tie_uses_seeded_coin() {
        let a = card(0);
        let b = card(1); // same month

        let mut rng1 = GameRng::new(5);
        let mut rng2 = GameRng::new(5);
        let (w1, _) = decide_first_turn(&a, &b, &mut rng1, Daylight::Day);
        let (w2, _) = decide_first_turn(&a, &b, &mut rng2, Daylight::Day);

        assert_eq!(w1, w2);
    }

    #[test]
    fn test_find_president_month() {
        let month1: Vec<Card> = build_deck().into_iter().filter(|c| c.month == 1).collect();
        assert_eq!(find_president_month(&month1), Some(1));
        assert_eq!(find_president_month(&month1[..3]), None);

        let bonuses: Vec<Card> = build_deck().into_iter().filter(Card::is_bonus).collect();
        assert_eq!(find_president_month(&bonuses), None);
    }

    #[test]
    fn test_find_kung_month() {
        let month2: Vec<Card> = build_deck().into_iter().filter(|c| c.month == 2).collect();
        let hand = month2[..3].to_vec();
        let board = vec![month2[3].clone()];

        assert_eq!(find_kung_month(&hand, &board), Some(2));
        assert_eq!(find_kung_month(&hand, &[]), None);
        assert_eq!(find_kung_month(&hand[..2], &board), None);
    }

    #[test]
    fn test_deal_shape() {
        let mut rng = GameRng::new(42);
        let state = start_game(RuleKey::A, &mut rng, &GameOptions::default());

        assert_eq!(
            state.players[Side::A].hand.len() + state.players[Side::B].hand.len()
                + state.board.len()
                + state.deck.len()
                + state.players[Side::A].captured.total()
                + state.players[Side::B].captured.total(),
            50
        );
        assert!(state.card_partition_ok());
        assert_eq!(state.kibo.len(), 1);
        assert_eq!(state.carry_over_multiplier, 1);
        assert_eq!(state.next_carry_over_multiplier, 1);
    }

    #[test]
    fn test_deal_normalizes_bonus_cards() {
        // Across many seeds, no hand or board may hold a bonus card after
        // the deal.
        for seed in 0..40 {
            let mut rng = GameRng::new(seed);
            let state = start_game(RuleKey::A, &mut rng, &GameOptions::default());

            assert!(state.board.iter().all(|c| !c.is_bonus()));
            for side in Side::BOTH {
                assert!(state.players[side].hand.iter().all(|c| !c.is_bonus()));
            }
            assert!(!state.board.iter().any(|c| c.month > 12));
        }
    }

    #[test]
    fn test_deal_never_leaves_board_quad() {
        for seed in 0..60 {
            let mut rng = GameRng::new(seed);
            let state = start_game(RuleKey::A, &mut rng, &GameOptions::default());
            assert_eq!(find_president_month(&state.board), None);
        }
    }

    #[test]
    fn test_fixed_first_turn() {
        let mut rng = GameRng::new(3);
        let options = GameOptions {
            first_turn: Some(Side::B),
            ..GameOptions::default()
        };
        let state = start_game(RuleKey::A, &mut rng, &options);

        assert_eq!(state.current_turn, Side::B);
        assert_eq!(state.starting_side, Side::B);
    }

    #[test]
    fn test_next_round_inherits_gold_and_carry() {
        let mut rng = GameRng::new(11);
        let mut prev = start_game(RuleKey::A, &mut rng, &GameOptions::default());
        prev.players[Side::A].gold = 123_456;
        prev.players[Side::B].gold = 0; // bankrupt
        prev.next_carry_over_multiplier = 4;

        let next = start_next_round(&prev, &mut rng, &GameOptions::default());

        assert_eq!(next.players[Side::A].gold, 123_456);
        assert_eq!(next.players[Side::B].gold, STARTING_GOLD);
        assert_eq!(next.carry_over_multiplier, 4);
        assert_eq!(next.starting_side, prev.starting_side);
    }
}
