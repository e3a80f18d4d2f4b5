//! Turn finalization pipeline.
//!
//! Installs a completed [`TurnContext`] into the state, resolves the
//! ppuk/steal/economy side effects, appends the `turn_end` replay
//! record, then routes to the next phase: instant ppuk win, the gukjin
//! scoring prompt, go/stop, round resolution, or the next actor's turn.

use crate::core::player::{PlayerState, PpukSource, PpukState};
use crate::core::side::Side;
use crate::core::state::{GameState, PendingKung, PendingPresident, Phase, TurnContext};
use crate::engine::capture::steal_pi;
use crate::engine::economy::{points_to_gold, steal_gold};
use crate::engine::matching::{EventTag, MatchSource};
use crate::engine::opening::{find_kung_month, find_president_month, STARTING_HAND_SIZE};
use crate::engine::resolution::resolve_round;
use crate::engine::scoring::{calculate_base_score, calculate_score};
use crate::kibo::{pack_cards, KiboEvent, StealDelta, TurnAction};
use crate::core::state::KiboDetail;

/// Ppuk streak gold rewards, in points, for a ppuk on the player's
/// first, second and third turn.
const PPUK_REWARD_POINTS: [u32; 3] = [7, 14, 21];

fn cleared_ppuk(prev: &PpukState, turn_no: u32) -> PpukState {
    PpukState {
        active: false,
        streak: 0,
        last_turn_no: turn_no,
        last_source: prev.last_source,
        last_month: prev.last_month,
    }
}

/// Finish a turn: merge the context, settle side effects, log, and move
/// the state machine forward.
pub(crate) fn finalize_turn(state: &GameState, work: TurnContext, action: TurnAction) -> GameState {
    let current = work.side;
    let next_side = current.other();
    let prev_player = &state.players[current];
    let prev_opponent = &state.players[next_side];

    let ppuk_occurred = work.events.ppuk > prev_player.events.ppuk;
    let captured_any = !work.newly_captured.is_empty();
    let current_turn_no = state.turn_seq + 1;

    let mut events = work.events;
    let mut captured = work.captured;
    let mut log = work.log;
    let mut gold_steal: u64 = 0;
    let mut extra_steal = work.pending_steal;

    let prev_ppuk = prev_player.ppuk_state.clone();
    let prev_opp_ppuk = prev_opponent.ppuk_state.clone();
    let mut held_bonus = prev_player.held_bonus.clone();
    held_bonus.extend(work.held_bonus_on_ppuk);
    let mut opponent_eaten = false;

    let mut next_ppuk_state = if ppuk_occurred {
        let streak = prev_ppuk.streak + 1;
        let source = if work
            .match_events
            .iter()
            .any(|e| e.source == MatchSource::Flip && e.event_tag == EventTag::Ppuk)
        {
            PpukSource::Flip
        } else {
            PpukSource::Hand
        };

        match prev_player.turn_count {
            0 => {
                gold_steal += points_to_gold(PPUK_REWARD_POINTS[0]);
                log.push_back(format!(
                    "{current}: first-turn ppuk reward ({} points, {} gold)",
                    PPUK_REWARD_POINTS[0],
                    points_to_gold(PPUK_REWARD_POINTS[0])
                ));
            }
            1 if streak >= 2 => {
                gold_steal += points_to_gold(PPUK_REWARD_POINTS[1]);
                events.yeon_ppuk += 1;
                log.push_back(format!(
                    "{current}: two-ppuk streak reward ({} points, {} gold)",
                    PPUK_REWARD_POINTS[1],
                    points_to_gold(PPUK_REWARD_POINTS[1])
                ));
            }
            2 if streak >= 3 => {
                gold_steal += points_to_gold(PPUK_REWARD_POINTS[2]);
                events.yeon_ppuk += 1;
                log.push_back(format!(
                    "{current}: three-ppuk streak reward ({} points, {} gold)",
                    PPUK_REWARD_POINTS[2],
                    points_to_gold(PPUK_REWARD_POINTS[2])
                ));
            }
            _ => {}
        }

        PpukState {
            active: true,
            streak,
            last_turn_no: current_turn_no,
            last_source: Some(source),
            last_month: Some(work.played_month),
        }
    } else {
        prev_ppuk.clone()
    };

    // Eat rule: a capture converts any unresolved stuck stack - the
    // current player's own first, then the opponent's - into one steal
    // credit plus recovery of the held bonus cards.
    if captured_any && !ppuk_occurred && prev_ppuk.active {
        events.jabbeok += 1;
        extra_steal += 1;
        log.push_back(format!("{current}: own stuck stack eaten (reserve steal 1 pi)"));
        if !held_bonus.is_empty() {
            let bonus_steal: u32 = held_bonus.iter().map(|c| u32::from(c.steal_pi)).sum();
            extra_steal += bonus_steal;
            log.push_back(format!(
                "{current}: recovered {} held bonus cards (extra steal {bonus_steal})",
                held_bonus.len()
            ));
            for card in held_bonus.drain(..) {
                captured.push(card);
            }
        }
        next_ppuk_state = cleared_ppuk(&prev_ppuk, current_turn_no);
    }
    if captured_any && prev_opp_ppuk.active {
        events.jabbeok += 1;
        extra_steal += 1;
        log.push_back(format!(
            "{current}: opponent's stuck stack eaten (reserve steal 1 pi)"
        ));
        let opp_held = prev_opponent.held_bonus.clone();
        if !opp_held.is_empty() {
            let bonus_steal: u32 = opp_held.iter().map(|c| u32::from(c.steal_pi)).sum();
            extra_steal += bonus_steal;
            log.push_back(format!(
                "{current}: recovered {} bonus cards the opponent was holding (extra steal {bonus_steal})",
                opp_held.len()
            ));
            for card in opp_held {
                captured.push(card);
            }
        }
        opponent_eaten = true;
    }

    if !work.is_last_hand_turn && work.board.is_empty() && captured_any {
        events.ssul += 1;
        extra_steal += 1;
        log.push_back(format!("{current}: board sweep (reserve steal 1 pi)"));
    }

    let mut next_state = state.clone();
    next_state.phase = Phase::Playing;
    next_state.pending_match = None;
    next_state.pending_go_stop = None;
    next_state.pending_gukjin = None;
    next_state.pending_president = None;
    next_state.pending_kung = None;
    next_state.result = None;
    next_state.deck = work.deck;
    next_state.board = work.board;
    next_state.current_turn = next_side;
    next_state.log = log;

    {
        let player = &mut next_state.players[current];
        player.hand = work.hand;
        player.captured = captured;
        player.events = events;
        player.turn_count += 1;
        player.held_bonus = held_bonus;
        player.ppuk_state = next_ppuk_state;
    }
    if opponent_eaten {
        let opponent = &mut next_state.players[next_side];
        opponent.ppuk_state = cleared_ppuk(&prev_opp_ppuk, current_turn_no);
        opponent.held_bonus = Vec::new();
    }

    // Steals are void on the closing hand play.
    if work.is_last_hand_turn {
        extra_steal = 0;
    }

    if extra_steal > 0 {
        let (mut taker, mut giver) = (
            next_state.players[current].clone(),
            next_state.players[next_side].clone(),
        );
        let report = steal_pi(&mut taker, &mut giver, current, extra_steal);
        next_state.players[current] = taker;
        next_state.players[next_side] = giver;
        for line in report.lines {
            next_state.push_log(line);
        }
    }

    if gold_steal > 0 {
        let transfer = steal_gold(&mut next_state.players, current, gold_steal);
        for line in transfer.lines {
            next_state.push_log(line);
        }
    }

    // A reveal survives exactly the turn after its declaration.
    if next_state
        .reveal
        .as_ref()
        .is_some_and(|r| r.turn_seq < state.turn_seq)
    {
        next_state.reveal = None;
    }

    debug_assert!(next_state.card_partition_ok(), "card partition broken at turn end");

    next_state.turn_seq = current_turn_no;
    let deck_count = next_state.deck.len();
    let events_snapshot = next_state.players[current].events;
    let ppuk_snapshot = next_state.players[current].ppuk_state.clone();
    let held_snapshot = pack_cards(&next_state.players[current].held_bonus);
    let (board_full, hands_full, board_count, hands_count) = match next_state.kibo_detail {
        KiboDetail::Full => (
            Some(pack_cards(&next_state.board)),
            Some(next_state.players.map(|p| pack_cards(&p.hand))),
            None,
            None,
        ),
        KiboDetail::Lean => (
            None,
            None,
            Some(next_state.board.len()),
            Some(next_state.players.map(|p| p.hand.len())),
        ),
    };
    next_state.push_kibo(KiboEvent::TurnEnd {
        turn_no: current_turn_no,
        actor: current,
        action,
        deck_count,
        board: board_full,
        hands: hands_full,
        board_count,
        hands_count,
        steals: StealDelta {
            pi: extra_steal,
            gold: gold_steal,
        },
        held_bonus: held_snapshot,
        events: events_snapshot,
        ppuk_state: ppuk_snapshot,
    });

    if next_state.players[current].events.ppuk >= 3 {
        return resolve_round(&next_state, current);
    }

    if should_prompt_gukjin(&next_state, current) {
        next_state.phase = Phase::GukjinChoice;
        next_state.pending_gukjin = Some(current);
        next_state.push_log(format!("{current}: choose gukjin (September five) scoring mode"));
        return next_state;
    }

    continue_after_turn(next_state, current)
}

/// Post-turn flow gate.
///
/// Runs after a finalized turn and after actions that resume play (a
/// gukjin lock, a go declaration): auto-stop on an exhausted winning
/// hand, offer go/stop, resolve when both hands are empty, surface the
/// next actor's first-turn president/kung openers, and keep the rotation
/// well-defined with pass placeholders.
pub(crate) fn continue_after_turn(state: GameState, just_played: Side) -> GameState {
    let mut state = state;
    let rules = state.rules();
    let (base, _) = calculate_base_score(&state.players[just_played]);
    let raised = base > state.players[just_played].last_go_base;
    let hand_count = state.players[just_played].hand.len();

    // A winning score on the closing play stops immediately: there is no
    // further turn in which a go could pay off.
    if hand_count == 0 && rules.use_early_stop && base >= rules.go_min_score && raised {
        state.players[just_played].declared_stop = true;
        return resolve_round(&state, just_played);
    }

    if rules.use_early_stop && base >= rules.go_min_score && raised && hand_count > 0 {
        state.current_turn = just_played;
        state.phase = Phase::GoStop;
        state.pending_go_stop = Some(just_played);
        return state;
    }

    let both_empty = state.players[Side::A].hand.is_empty() && state.players[Side::B].hand.is_empty();
    if both_empty {
        return resolve_round(&state, just_played);
    }

    let actor = state.current_turn;
    if state.phase == Phase::Playing
        && state.pending_president.is_none()
        && state.players[actor].turn_count == 0
        && !state.players[actor].president_hold
    {
        if let Some(month) = find_president_month(&state.players[actor].hand) {
            state.phase = Phase::PresidentChoice;
            state.pending_president = Some(PendingPresident { side: actor, month });
            state.push_log(format!(
                "{actor}: first-turn hand president (month {month} x4) - choose 10-point stop or hold"
            ));
            return state;
        }
        if !state.players[actor].kung_offered {
            if let Some(month) = find_kung_month(&state.players[actor].hand, &state.board) {
                state.phase = Phase::KungChoice;
                state.pending_kung = Some(PendingKung { side: actor, month });
                state.push_log(format!(
                    "{actor}: first-turn kung available (month {month} x3 + board) - choose use or pass"
                ));
                return state;
            }
        }
    }

    ensure_pass_cards(state, actor)
}

/// Pad an exhausted hand with pass placeholders so turn rotation stays
/// well-defined while the draw pile lasts.
pub(crate) fn ensure_pass_cards(state: GameState, side: Side) -> GameState {
    let mut state = state;
    let expected = STARTING_HAND_SIZE.saturating_sub(state.players[side].turn_count as usize);

    let hand = std::mem::take(&mut state.players[side].hand);
    let (mut normal, mut passes): (Vec<_>, Vec<_>) = hand.into_iter().partition(|c| !c.pass_card);

    while normal.len() + passes.len() > expected && !passes.is_empty() {
        passes.pop();
    }
    while normal.len() + passes.len() < expected {
        let pass = state.next_pass_card();
        passes.push(pass);
    }

    normal.extend(passes);
    state.players[side].hand = normal;
    state
}

fn has_pending_gukjin_choice(player: &PlayerState) -> bool {
    !player.gukjin_locked
        && player
            .captured
            .five
            .iter()
            .any(|c| c.is_gukjin() && !c.gukjin_transformed)
}

/// Should the acting player be asked to lock the gukjin now?
///
/// Asked only when the answer matters: the go/stop decision, the final
/// auto-resolution, or any score/bak component would differ between the
/// two modes.
pub(crate) fn should_prompt_gukjin(state: &GameState, side: Side) -> bool {
    let player = &state.players[side];
    if !has_pending_gukjin_choice(player) {
        return false;
    }

    let opponent = &state.players[side.other()];
    let rules = state.rules();

    let with_mode = |mode| {
        let mut probe = player.clone();
        probe.gukjin_mode = mode;
        (
            calculate_score(&probe, opponent, rules),
            calculate_base_score(&probe).0,
        )
    };
    let (score_five, base_five) = with_mode(crate::core::player::GukjinMode::Five);
    let (score_junk, base_junk) = with_mode(crate::core::player::GukjinMode::Junk);

    let scoring_difference = score_five.base != score_junk.base
        || score_five.total != score_junk.total
        || score_five.multiplier != score_junk.multiplier
        || score_five.bak.gwang != score_junk.bak.gwang
        || score_five.bak.pi != score_junk.bak.pi
        || score_five.bak.mong_bak != score_junk.bak.mong_bak;

    let hand_count = player.hand.len();
    let last_go_base = player.last_go_base;
    let has_go = player.go_count > 0;
    let raised_five = base_five > last_go_base;
    let raised_junk = base_junk > last_go_base;

    let can_go_stop = |base: u32, raised: bool| {
        rules.use_early_stop && base >= rules.go_min_score && raised && hand_count > 0
    };
    let go_stop_five = can_go_stop(base_five, raised_five);
    let go_stop_junk = can_go_stop(base_junk, raised_junk);

    if go_stop_five != go_stop_junk {
        return true;
    }
    if (go_stop_five || go_stop_junk) && scoring_difference {
        return true;
    }

    let auto_resolve_five = has_go && hand_count == 0 && raised_five;
    let auto_resolve_junk = has_go && hand_count == 0 && raised_junk;
    if auto_resolve_five != auto_resolve_junk {
        return true;
    }
    if (auto_resolve_five || auto_resolve_junk) && scoring_difference {
        return true;
    }

    let both_empty = state.players[Side::A].hand.is_empty() && state.players[Side::B].hand.is_empty();
    if both_empty {
        return scoring_difference;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::GameRng;
    use crate::core::state::GameOptions;
    use crate::engine::opening::start_game;
    use crate::engine::rules::RuleKey;

    fn fresh_state() -> GameState {
        start_game(RuleKey::A, &mut GameRng::new(42), &GameOptions::default())
    }

    #[test]
    fn test_ensure_pass_cards_pads_to_expected() {
        let mut state = fresh_state();
        let side = state.current_turn;
        state.players[side].hand.clear();
        state.players[side].turn_count = 7;

        let state = ensure_pass_cards(state, side);

        assert_eq!(state.players[side].hand.len(), 3);
        assert!(state.players[side].hand.iter().all(|c| c.pass_card));
    }

    #[test]
    fn test_ensure_pass_cards_trims_excess_placeholders() {
        let mut state = fresh_state();
        let side = state.current_turn;
        state.players[side].hand.clear();
        state.players[side].turn_count = 9;
        for serial in 0..4 {
            state.players[side].hand.push(crate::cards::Card::pass_placeholder(serial));
        }
        state.pass_card_counter = 4;

        let state = ensure_pass_cards(state, side);

        assert_eq!(state.players[side].hand.len(), 1);
    }

    #[test]
    fn test_gukjin_prompt_needs_unlocked_gukjin() {
        let state = fresh_state();
        assert!(!should_prompt_gukjin(&state, Side::A));
    }
}
