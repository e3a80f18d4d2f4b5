//! Turn execution: hand plays, the flip phase, and match-choice resumes.
//!
//! A turn is: play a hand card against the board, then flip the top of
//! the draw pile and resolve it the same way. Bonus cards flipped
//! mid-chain are held and the flip repeats; everything else ends the
//! chain with a placement or a capture. Either half can suspend into
//! `select-match` when exactly two board cards of differing categories
//! match - the caller resumes with [`choose_match`].

use smallvec::SmallVec;

use crate::cards::{Card, CardId};
use crate::core::side::Side;
use crate::core::state::{GameState, MatchOrigin, PendingMatch, Phase, TurnContext};
use crate::engine::finalize::finalize_turn;
use crate::engine::matching::{
    best_match_card, resolve_match, EventTag, MatchEvent, MatchKind, MatchSource,
};
use crate::kibo::{pack_cards, CaptureBySource, PackedCard, TurnAction};

/// Outcome of the flip phase.
pub(crate) enum FlipPhase {
    /// Suspended into `select-match`; the returned state is final for now.
    Pending(GameState),
    /// Chain ended; finalize with the returned context.
    Complete(TurnContext),
}

fn new_context(state: &GameState, side: Side, played: &Card, hand: Vec<Card>, is_last: bool) -> TurnContext {
    let player = &state.players[side];
    TurnContext {
        side,
        played_month: played.month,
        played_card_id: Some(played.id),
        is_last_hand_turn: is_last,
        hand,
        captured: player.captured.clone(),
        events: player.events,
        deck: state.deck.clone(),
        board: state.board.clone(),
        log: state.log.clone(),
        newly_captured: Vec::new(),
        captured_from_hand: Vec::new(),
        captured_from_flip: Vec::new(),
        pending_steal: 0,
        pending_bonus: Vec::new(),
        held_bonus_on_ppuk: Vec::new(),
        flips: Vec::new(),
        match_events: Vec::new(),
        flip_card: None,
    }
}

fn capture_from_hand(work: &mut TurnContext, card: Card) {
    work.newly_captured.push(card.id);
    work.captured_from_hand.push(card.clone());
    work.captured.push(card);
}

fn capture_from_flip(work: &mut TurnContext, card: Card) {
    work.newly_captured.push(card.id);
    work.captured_from_flip.push(card.clone());
    work.captured.push(card);
}

/// Capture every deferred bonus flip now that the chain resolved cleanly.
fn confirm_pending_bonus(work: &mut TurnContext) {
    if work.pending_bonus.is_empty() {
        return;
    }
    work.log
        .push_back(format!("Confirmed {} deferred bonus cards", work.pending_bonus.len()));
    for card in std::mem::take(&mut work.pending_bonus) {
        capture_from_flip(work, card);
    }
}

/// A ppuk outcome reroutes deferred bonus cards to the held queue
/// instead of capturing them (except on the closing play).
fn hold_or_confirm_bonus(work: &mut TurnContext) {
    if work.pending_bonus.is_empty() {
        return;
    }
    if work.is_last_hand_turn {
        confirm_pending_bonus(work);
    } else {
        work.log.push_back(format!(
            "Stuck flip: holding {} deferred bonus cards",
            work.pending_bonus.len()
        ));
        let held = std::mem::take(&mut work.pending_bonus);
        work.held_bonus_on_ppuk.extend(held);
    }
}

/// Resolve the flip phase until the chain ends or a choice is needed.
pub(crate) fn run_flip_phase(state: &GameState, mut work: TurnContext) -> FlipPhase {
    while !work.deck.is_empty() {
        let flip = work.deck.remove(0);
        work.flips.push(flip.clone());

        if flip.is_bonus() {
            work.log
                .push_back(format!("Flip: {} held, flipping again", flip.name));
            work.pending_bonus.push(flip);
            continue;
        }

        let outcome = resolve_match(
            &flip,
            &work.board,
            MatchSource::Flip,
            work.is_last_hand_turn,
            Some(work.played_month),
            work.played_card_id,
        );

        if outcome.kind == MatchKind::Two && outcome.needs_choice {
            let board_cards: SmallVec<[CardId; 4]> =
                outcome.matches.iter().map(|c| c.id).collect();
            work.log.push_back(format!(
                "Flip: month {} matches two board cards - waiting for choice",
                flip.month
            ));
            work.match_events.push(MatchEvent {
                source: MatchSource::Flip,
                event_tag: outcome.tag,
                kind: outcome.kind,
            });
            work.flip_card = Some(flip);

            let mut pending = state.clone();
            pending.phase = Phase::SelectMatch;
            pending.log = work.log.clone();
            pending.pending_match = Some(PendingMatch {
                side: work.side,
                board_cards,
                origin: MatchOrigin::Flip(Box::new(work)),
            });
            return FlipPhase::Pending(pending);
        }

        work.match_events.push(MatchEvent {
            source: MatchSource::Flip,
            event_tag: outcome.tag,
            kind: outcome.kind,
        });

        match outcome.kind {
            MatchKind::None => {
                confirm_pending_bonus(&mut work);
                work.log.push_back(format!("Flip: month {} placed on board", flip.month));
                work.board.push(flip);
                return FlipPhase::Complete(work);
            }
            MatchKind::One => {
                confirm_pending_bonus(&mut work);
                let matched = outcome.matches[0].clone();
                work.board.retain(|c| c.id != matched.id);
                work.log.push_back(format!("Flip: month {} captured", flip.month));
                capture_from_flip(&mut work, flip);
                capture_from_flip(&mut work, matched);
                match outcome.tag {
                    EventTag::Jjob => {
                        work.events.jjob += 1;
                        work.pending_steal += 1;
                        work.log.push_back("Jjob: flip re-took the played card (reserve steal 1 pi)".to_string());
                    }
                    EventTag::Ddadak => {
                        work.events.ddadak += 1;
                        work.pending_steal += 1;
                        work.log.push_back("Ddadak: flip paired the played month (reserve steal 1 pi)".to_string());
                    }
                    _ => {}
                }
                return FlipPhase::Complete(work);
            }
            MatchKind::Two => {
                hold_or_confirm_bonus(&mut work);
                if outcome.tag == EventTag::Ppuk {
                    work.events.ppuk += 1;
                }
                let matched = best_match_card(&outcome.matches).clone();
                work.board.retain(|c| c.id != matched.id);
                work.log
                    .push_back(format!("Flip: month {} two-stack capture", flip.month));
                capture_from_flip(&mut work, flip);
                capture_from_flip(&mut work, matched);
                return FlipPhase::Complete(work);
            }
            MatchKind::ThreePlus => {
                if outcome.tag == EventTag::Ppuk {
                    work.events.ppuk += 1;
                }
                hold_or_confirm_bonus(&mut work);
                let month = flip.month;
                let taken: Vec<Card> = work
                    .board
                    .iter()
                    .filter(|c| c.month == month)
                    .cloned()
                    .collect();
                work.board.retain(|c| c.month != month);
                for card in taken {
                    capture_from_flip(&mut work, card);
                }
                capture_from_flip(&mut work, flip);
                work.log.push_back(format!("Flip: month {month} full-month capture"));
                return FlipPhase::Complete(work);
            }
        }
    }

    confirm_pending_bonus(&mut work);
    FlipPhase::Complete(work)
}

/// Play a hand card for the current actor.
///
/// Illegal plays (wrong phase, card not in hand) return the state
/// unchanged.
#[must_use]
pub fn play_card(state: &GameState, card_id: CardId) -> GameState {
    if state.phase != Phase::Playing {
        return state.clone();
    }
    let current = state.current_turn;
    let player = &state.players[current];
    let Some(idx) = player.hand.iter().position(|c| c.id == card_id) else {
        return state.clone();
    };

    let played = player.hand[idx].clone();
    let is_last = player.hand.len() == 1;
    let mut hand = player.hand.clone();
    hand.remove(idx);

    let mut work = new_context(state, current, &played, hand, is_last);

    if played.pass_card {
        work.log.push_back(format!(
            "{current}: pass placeholder used (consume card + flip once)"
        ));
        return match run_flip_phase(state, work) {
            FlipPhase::Pending(pending) => pending,
            FlipPhase::Complete(work) => {
                let action = TurnAction::Pass {
                    card: PackedCard::from_card(&played),
                    flips: pack_cards(&work.flips),
                    match_events: work.match_events.clone(),
                    capture_by_source: CaptureBySource {
                        hand: Vec::new(),
                        flip: pack_cards(&work.captured_from_flip),
                    },
                };
                finalize_turn(state, work, action)
            }
        };
    }

    let remaining_same = work
        .hand
        .iter()
        .filter(|c| c.month == played.month)
        .count();
    let chain_armed = player.president_hold
        && player.president_hold_month == Some(played.month)
        && remaining_same == 3;

    let outcome = resolve_match(&played, &work.board, MatchSource::Hand, is_last, None, None);

    if outcome.kind == MatchKind::Two && outcome.needs_choice {
        let mut pending = state.clone();
        pending.phase = Phase::SelectMatch;
        pending.pending_match = Some(PendingMatch {
            side: current,
            board_cards: outcome.matches.iter().map(|c| c.id).collect(),
            origin: MatchOrigin::Hand {
                card: card_id,
                president_chain_armed: chain_armed,
            },
        });
        pending.push_log(format!(
            "{current}: month {} matches two board cards - waiting for choice",
            played.month
        ));
        return pending;
    }

    let mut arm_shake = false;
    match outcome.kind {
        MatchKind::None => {
            work.log.push_back(format!(
                "{current}: month {} played, no match",
                played.month
            ));
            work.board.push(played.clone());
        }
        MatchKind::One => {
            let matched = outcome.matches[0].clone();
            work.board.retain(|c| c.id != matched.id);
            work.log.push_back(format!(
                "{current}: month {} played, captured the pair",
                played.month
            ));
            capture_from_hand(&mut work, matched);
            capture_from_hand(&mut work, played.clone());
            arm_shake = true;
        }
        MatchKind::Two => {
            let matched = best_match_card(&outcome.matches).clone();
            work.board.retain(|c| c.id != matched.id);
            work.log.push_back(format!(
                "{current}: month {} played, auto-captured the higher pair",
                played.month
            ));
            capture_from_hand(&mut work, matched);
            capture_from_hand(&mut work, played.clone());
            arm_shake = true;
        }
        MatchKind::ThreePlus => {
            let month = played.month;
            let taken: Vec<Card> = work
                .board
                .iter()
                .filter(|c| c.month == month)
                .cloned()
                .collect();
            work.board.retain(|c| c.month != month);
            for card in taken {
                capture_from_hand(&mut work, card);
            }
            capture_from_hand(&mut work, played.clone());
            if outcome.tag == EventTag::Ttak {
                work.events.ttak += 1;
            }
            work.log
                .push_back(format!("{current}: month {month} swept off the board"));
            if !is_last {
                work.pending_steal += 1;
                work.log
                    .push_back(format!("{current}: sweep capture (reserve steal 1 pi)"));
            }
            arm_shake = true;
        }
    }
    if arm_shake && !is_last && chain_armed {
        work.events.shaking += 1;
        work.log.push_back(format!(
            "{current}: president-hold chain shake on month {}",
            played.month
        ));
    }
    work.match_events.push(MatchEvent {
        source: MatchSource::Hand,
        event_tag: outcome.tag,
        kind: outcome.kind,
    });

    match run_flip_phase(state, work) {
        FlipPhase::Pending(pending) => pending,
        FlipPhase::Complete(work) => {
            let action = TurnAction::Play {
                card: PackedCard::from_card(&played),
                selected_board_card: None,
                flips: pack_cards(&work.flips),
                match_events: work.match_events.clone(),
                capture_by_source: CaptureBySource {
                    hand: pack_cards(&work.captured_from_hand),
                    flip: pack_cards(&work.captured_from_flip),
                },
            };
            finalize_turn(state, work, action)
        }
    }
}

/// Resume a suspended `select-match` by naming the chosen board card.
#[must_use]
pub fn choose_match(state: &GameState, board_card_id: CardId) -> GameState {
    if state.phase != Phase::SelectMatch {
        return state.clone();
    }
    let Some(pending) = &state.pending_match else {
        return state.clone();
    };
    if state.current_turn != pending.side {
        return state.clone();
    }
    if !pending.board_cards.contains(&board_card_id) {
        return state.clone();
    }

    match pending.origin.clone() {
        MatchOrigin::Hand {
            card,
            president_chain_armed,
        } => resolve_hand_choice(state, pending.side, card, president_chain_armed, board_card_id),
        MatchOrigin::Flip(ctx) => resolve_flip_choice(state, *ctx, board_card_id),
    }
}

fn resolve_hand_choice(
    state: &GameState,
    side: Side,
    card_id: CardId,
    chain_armed: bool,
    board_card_id: CardId,
) -> GameState {
    let player = &state.players[side];
    let Some(idx) = player.hand.iter().position(|c| c.id == card_id) else {
        return state.clone();
    };
    let Some(selected) = state.board.iter().find(|c| c.id == board_card_id).cloned() else {
        return state.clone();
    };

    let played = player.hand[idx].clone();
    let is_last = player.hand.len() == 1;
    let mut hand = player.hand.clone();
    hand.remove(idx);

    let mut work = new_context(state, side, &played, hand, is_last);
    work.board.retain(|c| c.id != selected.id);
    work.log.push_back(format!(
        "{side}: month {} played, captured chosen {}",
        played.month, selected.name
    ));
    capture_from_hand(&mut work, played.clone());
    capture_from_hand(&mut work, selected.clone());
    if !is_last && chain_armed {
        work.events.shaking += 1;
        work.log.push_back(format!(
            "{side}: president-hold chain shake on month {}",
            played.month
        ));
    }
    work.match_events.push(MatchEvent {
        source: MatchSource::Hand,
        event_tag: EventTag::Normal,
        kind: MatchKind::Two,
    });

    match run_flip_phase(state, work) {
        FlipPhase::Pending(pending) => pending,
        FlipPhase::Complete(work) => {
            let action = TurnAction::Play {
                card: PackedCard::from_card(&played),
                selected_board_card: Some(PackedCard::from_card(&selected)),
                flips: pack_cards(&work.flips),
                match_events: work.match_events.clone(),
                capture_by_source: CaptureBySource {
                    hand: pack_cards(&work.captured_from_hand),
                    flip: pack_cards(&work.captured_from_flip),
                },
            };
            finalize_turn(state, work, action)
        }
    }
}

fn resolve_flip_choice(state: &GameState, mut work: TurnContext, board_card_id: CardId) -> GameState {
    let Some(flip_card) = work.flip_card.take() else {
        return state.clone();
    };
    let Some(selected) = work.board.iter().find(|c| c.id == board_card_id).cloned() else {
        return state.clone();
    };

    if !work.is_last_hand_turn {
        work.events.ppuk += 1;
    }
    hold_or_confirm_bonus(&mut work);

    work.board.retain(|c| c.id != selected.id);
    capture_from_flip(&mut work, flip_card.clone());
    capture_from_flip(&mut work, selected.clone());
    work.log.push_back(format!(
        "Flip: month {} captured chosen {}",
        flip_card.month, selected.name
    ));

    let action = TurnAction::FlipSelect {
        card: PackedCard::from_card(&flip_card),
        selected_board_card: PackedCard::from_card(&selected),
        flips: pack_cards(&work.flips),
        match_events: work.match_events.clone(),
        capture_by_source: CaptureBySource {
            hand: pack_cards(&work.captured_from_hand),
            flip: pack_cards(&work.captured_from_flip),
        },
    };
    finalize_turn(state, work, action)
}
