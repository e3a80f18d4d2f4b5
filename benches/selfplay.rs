//! Seeded self-play benchmark: deal and resolve full rounds.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use matgo::core::{GameOptions, GameRng};
use matgo::engine::{start_game, start_next_round, RuleKey};
use matgo::runner::{advance_auto, RandomStrategy};

fn bench_single_round(c: &mut Criterion) {
    c.bench_function("single_round", |b| {
        b.iter(|| {
            let mut rng = GameRng::new(black_box(42));
            let state = start_game(RuleKey::A, &mut rng, &GameOptions::default());
            let mut strategy = RandomStrategy::new(43);
            let end = advance_auto(state, |_| true, &mut strategy, None);
            black_box(end.result)
        });
    });
}

fn bench_round_chain(c: &mut Criterion) {
    c.bench_function("five_round_chain", |b| {
        b.iter(|| {
            let mut rng = GameRng::new(black_box(7));
            let mut strategy = RandomStrategy::new(8);
            let mut state = start_game(RuleKey::A, &mut rng, &GameOptions::default());
            for _ in 0..5 {
                state = advance_auto(state, |_| true, &mut strategy, None);
                state = start_next_round(&state, &mut rng, &GameOptions::default());
            }
            black_box(state)
        });
    });
}

criterion_group!(benches, bench_single_round, bench_round_chain);
criterion_main!(benches);
