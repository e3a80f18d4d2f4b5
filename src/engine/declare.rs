//! Declarations and phase-resume actions: shaking, bomb, kung, go/stop,
//! president, and the gukjin lock.

use crate::cards::Category;
use crate::core::player::GukjinMode;
use crate::core::side::Side;
use crate::core::state::{ActionReveal, GameState, Phase, RevealKind, RoundResult, TurnContext};
use crate::engine::economy::settle_round_gold;
use crate::engine::finalize::{continue_after_turn, ensure_pass_cards, finalize_turn};
use crate::engine::resolution::resolve_round;
use crate::engine::scoring::{calculate_base_score, BakInfo, ScoreBreakdown, ScoreInfo};
use crate::engine::turn::{run_flip_phase, FlipPhase};
use crate::kibo::{pack_cards, CaptureBySource, KiboEvent, TurnAction, REVEAL_MS};

/// Base points awarded by a president stop.
const PRESIDENT_STOP_BASE: u32 = 10;

fn month_counts(state: &GameState, side: Side) -> [usize; 13] {
    let mut counts = [0usize; 13];
    for card in &state.players[side].hand {
        if !card.pass_card && card.is_seasonal() {
            counts[card.month as usize] += 1;
        }
    }
    counts
}

/// Months the actor may declare a shake for: three or more in hand, not
/// yet declared, none of the month face-up.
#[must_use]
pub fn declarable_shaking_months(state: &GameState, side: Side) -> Vec<u8> {
    if state.phase != Phase::Playing || state.current_turn != side {
        return Vec::new();
    }
    let player = &state.players[side];
    let counts = month_counts(state, side);
    (1..=12u8)
        .filter(|&m| counts[m as usize] >= 3)
        .filter(|m| !player.shaking_declared_months.contains(m))
        .filter(|&m| state.board.iter().all(|c| c.month != m))
        .collect()
}

/// Months the actor may bomb: three or more in hand with exactly one
/// card of the month face-up.
#[must_use]
pub fn declarable_bomb_months(state: &GameState, side: Side) -> Vec<u8> {
    if state.phase != Phase::Playing || state.current_turn != side {
        return Vec::new();
    }
    let counts = month_counts(state, side);
    (1..=12u8)
        .filter(|&m| counts[m as usize] >= 3)
        .filter(|&m| state.board.iter().filter(|c| c.month == m).count() == 1)
        .collect()
}

/// Declare a shake: reveal three cards of the month and arm the doubling.
#[must_use]
pub fn declare_shaking(state: &GameState, side: Side, month: u8) -> GameState {
    if !declarable_shaking_months(state, side).contains(&month) {
        return state.clone();
    }

    let mut next = state.clone();
    let reveal_cards: Vec<_> = next.players[side]
        .hand
        .iter()
        .filter(|c| c.month == month)
        .take(3)
        .cloned()
        .collect();

    {
        let player = &mut next.players[side];
        player.shaking_declared_months.push(month);
        player.events.shaking += 1;
    }
    next.reveal = Some(ActionReveal {
        kind: RevealKind::Shaking,
        side,
        month: Some(month),
        cards: pack_cards(&reveal_cards),
        turn_seq: next.turn_seq,
    });
    next.push_log(format!("{side}: shake declared on month {month}"));
    next.push_kibo(KiboEvent::ShakingDeclare {
        player_key: side,
        month,
        reveal_cards: pack_cards(&reveal_cards),
        reveal_ms: REVEAL_MS,
    });
    next
}

/// Declare a bomb: capture the month outright and consume the turn.
#[must_use]
pub fn declare_bomb(state: &GameState, side: Side, month: u8) -> GameState {
    if !declarable_bomb_months(state, side).contains(&month) {
        return state.clone();
    }
    let player = &state.players[side];
    let month_cards: Vec<_> = player
        .hand
        .iter()
        .filter(|c| c.month == month)
        .cloned()
        .collect();
    let Some(matched) = state.board.iter().find(|c| c.month == month).cloned() else {
        return state.clone();
    };

    let hand: Vec<_> = player
        .hand
        .iter()
        .filter(|c| c.month != month)
        .cloned()
        .collect();
    let is_last = hand.is_empty();

    let mut base = state.clone();
    base.reveal = Some(ActionReveal {
        kind: RevealKind::Bomb,
        side,
        month: Some(month),
        cards: pack_cards(&std::iter::once(matched.clone()).chain(month_cards.iter().cloned()).collect::<Vec<_>>()),
        turn_seq: base.turn_seq,
    });

    let mut work = TurnContext {
        side,
        played_month: month,
        played_card_id: None,
        is_last_hand_turn: is_last,
        hand,
        captured: player.captured.clone(),
        events: player.events,
        deck: base.deck.clone(),
        board: base.board.clone(),
        log: base.log.clone(),
        newly_captured: Vec::new(),
        captured_from_hand: Vec::new(),
        captured_from_flip: Vec::new(),
        pending_steal: 1,
        pending_bonus: Vec::new(),
        held_bonus_on_ppuk: Vec::new(),
        flips: Vec::new(),
        match_events: Vec::new(),
        flip_card: None,
    };
    work.events.bomb += 1;
    work.log.push_back(format!(
        "{side}: bomb declared on month {month} ({} hand cards)",
        month_cards.len()
    ));

    work.board.retain(|c| c.id != matched.id);
    let captured_list = {
        let mut list = vec![matched.clone()];
        list.extend(month_cards.iter().cloned());
        list
    };
    for card in captured_list.iter().cloned() {
        work.newly_captured.push(card.id);
        work.captured_from_hand.push(card.clone());
        work.captured.push(card);
    }

    match run_flip_phase(&base, work) {
        FlipPhase::Pending(pending) => pending,
        FlipPhase::Complete(work) => {
            let action = TurnAction::DeclareBomb {
                month,
                captured: pack_cards(&captured_list),
                flips: pack_cards(&work.flips),
                match_events: work.match_events.clone(),
                capture_by_source: CaptureBySource {
                    hand: pack_cards(&work.captured_from_hand),
                    flip: pack_cards(&work.captured_from_flip),
                },
            };
            finalize_turn(&base, work, action)
        }
    }
}

/// Use the offered kung: capture all four cards of the month and consume
/// the turn. Unlike a bomb this arms no multiplier.
#[must_use]
pub fn choose_kung_use(state: &GameState, side: Side) -> GameState {
    if state.phase != Phase::KungChoice {
        return state.clone();
    }
    let Some(pending) = state.pending_kung else {
        return state.clone();
    };
    if pending.side != side {
        return state.clone();
    }
    let month = pending.month;

    let player = &state.players[side];
    let month_cards: Vec<_> = player
        .hand
        .iter()
        .filter(|c| c.month == month)
        .cloned()
        .collect();
    let Some(matched) = state.board.iter().find(|c| c.month == month).cloned() else {
        return state.clone();
    };
    if month_cards.len() < 3 {
        return state.clone();
    }

    let hand: Vec<_> = player
        .hand
        .iter()
        .filter(|c| c.month != month)
        .cloned()
        .collect();
    let is_last = hand.is_empty();

    let mut base = state.clone();
    base.phase = Phase::Playing;
    base.pending_kung = None;
    base.players[side].kung_offered = true;

    let captured_list = {
        let mut list = vec![matched.clone()];
        list.extend(month_cards.iter().cloned());
        list
    };
    base.push_kibo(KiboEvent::KungUse {
        player_key: side,
        month,
        captured: pack_cards(&captured_list),
    });

    let player = &base.players[side];
    let mut work = TurnContext {
        side,
        played_month: month,
        played_card_id: None,
        is_last_hand_turn: is_last,
        hand,
        captured: player.captured.clone(),
        events: player.events,
        deck: base.deck.clone(),
        board: base.board.clone(),
        log: base.log.clone(),
        newly_captured: Vec::new(),
        captured_from_hand: Vec::new(),
        captured_from_flip: Vec::new(),
        pending_steal: 1,
        pending_bonus: Vec::new(),
        held_bonus_on_ppuk: Vec::new(),
        flips: Vec::new(),
        match_events: Vec::new(),
        flip_card: None,
    };
    work.events.kung += 1;
    work.log
        .push_back(format!("{side}: kung used on month {month} (four cards captured)"));

    work.board.retain(|c| c.id != matched.id);
    for card in captured_list.iter().cloned() {
        work.newly_captured.push(card.id);
        work.captured_from_hand.push(card.clone());
        work.captured.push(card);
    }

    match run_flip_phase(&base, work) {
        FlipPhase::Pending(pending) => pending,
        FlipPhase::Complete(work) => {
            let action = TurnAction::Kung {
                month,
                captured: pack_cards(&captured_list),
                flips: pack_cards(&work.flips),
                match_events: work.match_events.clone(),
                capture_by_source: CaptureBySource {
                    hand: pack_cards(&work.captured_from_hand),
                    flip: pack_cards(&work.captured_from_flip),
                },
            };
            finalize_turn(&base, work, action)
        }
    }
}

/// Pass on the offered kung; the offer is not repeated.
#[must_use]
pub fn choose_kung_pass(state: &GameState, side: Side) -> GameState {
    if state.phase != Phase::KungChoice {
        return state.clone();
    }
    let Some(pending) = state.pending_kung else {
        return state.clone();
    };
    if pending.side != side {
        return state.clone();
    }

    let mut next = state.clone();
    next.phase = Phase::Playing;
    next.pending_kung = None;
    next.players[side].kung_offered = true;
    next.push_log(format!("{side}: kung passed on month {}", pending.month));
    next.push_kibo(KiboEvent::KungPass {
        player_key: side,
        month: pending.month,
    });
    next
}

/// Declare go: keep playing for a bigger payout.
///
/// Valid only while the base score strictly exceeds the score recorded
/// at the previous go.
#[must_use]
pub fn declare_go(state: &GameState, side: Side) -> GameState {
    if state.phase != Phase::GoStop || state.pending_go_stop != Some(side) {
        return state.clone();
    }
    let (base, _) = calculate_base_score(&state.players[side]);
    if base <= state.players[side].last_go_base {
        return state.clone();
    }

    let mut next = state.clone();
    let opponent = side.other();
    {
        let player = &mut next.players[side];
        player.go_count += 1;
        player.last_go_base = base;
    }
    let go_count = next.players[side].go_count;
    next.phase = Phase::Playing;
    next.pending_go_stop = None;
    next.current_turn = opponent;
    next.push_log(format!("{side}: go #{go_count} declared"));
    next.push_kibo(KiboEvent::Go {
        player_key: side,
        go_count,
    });
    ensure_pass_cards(next, opponent)
}

/// Declare stop: end the round now, winning unconditionally.
#[must_use]
pub fn declare_stop(state: &GameState, side: Side) -> GameState {
    if state.phase != Phase::GoStop || state.pending_go_stop != Some(side) {
        return state.clone();
    }

    let mut next = state.clone();
    next.players[side].declared_stop = true;
    next.phase = Phase::Resolution;
    next.pending_go_stop = None;
    next.push_log(format!("{side}: stop declared"));
    next.push_kibo(KiboEvent::Stop { player_key: side });
    resolve_round(&next, side)
}

fn president_score(base: u32, multiplier: u32) -> ScoreInfo {
    ScoreInfo {
        base,
        multiplier,
        total: base * multiplier,
        bak: BakInfo {
            multiplier: 1,
            ..BakInfo::default()
        },
        breakdown: ScoreBreakdown {
            president_stop: base > 0,
            ..ScoreBreakdown::default()
        },
    }
}

/// Take the immediate president payout and end the round.
#[must_use]
pub fn choose_president_stop(state: &GameState, side: Side) -> GameState {
    if state.phase != Phase::PresidentChoice {
        return state.clone();
    }
    let Some(pending) = state.pending_president else {
        return state.clone();
    };
    if pending.side != side {
        return state.clone();
    }

    let mut next = state.clone();
    let carry = next.carry_over_multiplier.max(1);
    let payout = PRESIDENT_STOP_BASE * carry;
    next.push_log(format!("{side}: president stop chosen (payout {payout})"));

    let (settlement, lines) = settle_round_gold(&mut next.players, side, payout);
    for line in lines {
        next.push_log(line);
    }

    let winner_score = president_score(PRESIDENT_STOP_BASE, carry);
    let loser_score = president_score(0, 1);
    let scores = crate::core::side::SidePair::from_fn(|s| {
        if s == side {
            winner_score
        } else {
            loser_score
        }
    });

    next.phase = Phase::Resolution;
    next.pending_president = None;
    next.next_carry_over_multiplier = 1;
    next.push_kibo(KiboEvent::PresidentStop {
        player_key: side,
        payout,
    });
    next.result = Some(RoundResult {
        winner: side.into(),
        nagari: false,
        nagari_reasons: Vec::new(),
        scores,
        gold: settlement,
    });
    next
}

/// Hold the president hand and keep playing for the chained multiplier.
#[must_use]
pub fn choose_president_hold(state: &GameState, side: Side) -> GameState {
    if state.phase != Phase::PresidentChoice {
        return state.clone();
    }
    let Some(pending) = state.pending_president else {
        return state.clone();
    };
    if pending.side != side {
        return state.clone();
    }

    let mut next = state.clone();
    {
        let player = &mut next.players[side];
        player.president_hold = true;
        player.president_hold_month = Some(pending.month);
    }
    next.phase = Phase::Playing;
    next.pending_president = None;
    next.push_log(format!(
        "{side}: president hold chosen (month {})",
        pending.month
    ));
    next.push_kibo(KiboEvent::PresidentHold {
        player_key: side,
        month: pending.month,
    });
    next
}

/// Lock the gukjin scoring mode. Irreversible for the round.
#[must_use]
pub fn choose_gukjin_mode(state: &GameState, side: Side, mode: GukjinMode) -> GameState {
    if state.phase != Phase::GukjinChoice || state.pending_gukjin != Some(side) {
        return state.clone();
    }
    if state.players[side].gukjin_locked {
        return state.clone();
    }

    let mut next = state.clone();
    {
        let player = &mut next.players[side];
        match mode {
            GukjinMode::Junk => {
                if let Some(idx) = player
                    .captured
                    .five
                    .iter()
                    .position(|c| c.is_gukjin() && c.category == Category::Five && !c.gukjin_transformed)
                {
                    let mut card = player.captured.five.remove(idx);
                    card.category = Category::Junk;
                    card.pi_value = 2;
                    card.gukjin_transformed = true;
                    card.name.push_str(" (Gukjin Pi)");
                    player.captured.junk.push(card);
                }
            }
            GukjinMode::Five => {
                if let Some(idx) = player
                    .captured
                    .junk
                    .iter()
                    .position(|c| c.is_gukjin() && c.category == Category::Junk)
                {
                    let mut card = player.captured.junk.remove(idx);
                    card.category = Category::Five;
                    card.pi_value = 0;
                    card.gukjin_transformed = false;
                    if let Some(stripped) = card.name.strip_suffix(" (Gukjin Pi)") {
                        card.name = stripped.to_string();
                    }
                    player.captured.five.push(card);
                }
            }
        }
        player.gukjin_mode = mode;
        player.gukjin_locked = true;
    }

    let mode_label = match mode {
        GukjinMode::Five => "five",
        GukjinMode::Junk => "double pi",
    };
    next.phase = Phase::Playing;
    next.pending_gukjin = None;
    next.push_log(format!("{side}: gukjin locked as {mode_label}"));
    next.push_kibo(KiboEvent::GukjinMode {
        player_key: side,
        mode,
    });
    continue_after_turn(next, side)
}
