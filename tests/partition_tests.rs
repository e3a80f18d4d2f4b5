//! Card-partition and bookkeeping invariants across random playouts.
//!
//! Every reachable state must keep each catalog card in exactly one
//! zone. The playouts here step one action at a time so the invariant
//! is checked at every intermediate state, suspensions included.

use matgo::core::{GameOptions, GameRng, GameState, Phase, Side};
use matgo::engine::{start_game, RuleKey};
use matgo::runner::{acting_side, RandomStrategy, Strategy};
use proptest::prelude::*;

const MAX_STEPS: usize = 400;

fn step_through_round(deal_seed: u64, policy_seed: u64) -> (GameState, usize) {
    let mut rng = GameRng::new(deal_seed);
    let mut state = start_game(RuleKey::A, &mut rng, &GameOptions::default());
    let mut strategy = RandomStrategy::new(policy_seed);

    assert!(state.card_partition_ok(), "partition broken at deal");

    for step in 0..MAX_STEPS {
        let Some(actor) = acting_side(&state) else {
            return (state, step);
        };
        let next = strategy.act(&state, actor);
        assert!(
            next.card_partition_ok(),
            "partition broken after step {step} (phase {:?})",
            next.phase
        );
        assert!(next.kibo_seq >= state.kibo_seq, "kibo sequence went backwards");
        assert!(next.turn_seq >= state.turn_seq, "turn sequence went backwards");
        state = next;
        if state.is_resolved() {
            return (state, step);
        }
    }
    panic!("round did not resolve within {MAX_STEPS} steps");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_partition_holds_across_playouts(deal_seed in 0u64..10_000, policy_seed in 0u64..10_000) {
        let (end, _) = step_through_round(deal_seed, policy_seed);

        prop_assert_eq!(end.phase, Phase::Resolution);
        prop_assert!(end.result.is_some());
        prop_assert!(end.card_partition_ok());
    }

    #[test]
    fn prop_round_end_bookkeeping(deal_seed in 0u64..10_000) {
        let (end, _) = step_through_round(deal_seed, deal_seed.wrapping_mul(31));
        let result = end.result.as_ref().unwrap();

        // A void round doubles the carried stake; a resolved one resets it.
        if result.nagari {
            prop_assert!(end.next_carry_over_multiplier >= 2);
            prop_assert_eq!(result.gold.paid, 0);
        } else {
            prop_assert_eq!(end.next_carry_over_multiplier, 1);
        }

        // Kibo always opens with the deal and closes with the round end.
        let first = end.kibo.front().unwrap();
        prop_assert_eq!(first.no, 1);
        let last = end.kibo.last().unwrap();
        let last_is_round_end = matches!(last.event, matgo::KiboEvent::RoundEnd { .. });
        prop_assert!(last_is_round_end);
    }

    #[test]
    fn prop_event_counters_never_regress(deal_seed in 0u64..5_000) {
        let mut rng = GameRng::new(deal_seed);
        let mut state = start_game(RuleKey::A, &mut rng, &GameOptions::default());
        let mut strategy = RandomStrategy::new(deal_seed ^ 0x5A5A);

        for _ in 0..MAX_STEPS {
            let Some(actor) = acting_side(&state) else { break };
            let next = strategy.act(&state, actor);
            for side in Side::BOTH {
                let before = &state.players[side].events;
                let after = &next.players[side].events;
                prop_assert!(after.ppuk >= before.ppuk);
                prop_assert!(after.shaking >= before.shaking);
                prop_assert!(after.bomb >= before.bomb);
                prop_assert!(after.kung >= before.kung);
            }
            state = next;
            if state.is_resolved() {
                break;
            }
        }
    }
}
