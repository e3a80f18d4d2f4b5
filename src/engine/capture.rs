//! Pi-steal resolver.
//!
//! Chain events (sweeps, jjob/ddadak, eaten ppuk stacks, bombs) earn the
//! acting player steal credits: junk cards forfeited by the opponent, one
//! per credit. The resolver prefers the cheapest forfeit for the giver
//! and knows how to convert the dual-mode gukjin on the fly - or let it
//! escape when it is the giver's last pip asset.

use crate::cards::Category;
use crate::core::player::{GukjinMode, PlayerState};
use crate::core::side::Side;

/// Result of a steal request.
#[derive(Clone, Debug, Default)]
pub struct StealReport {
    /// Cards actually transferred (may be fewer than requested).
    pub moved: u32,
    /// Human-readable narration lines.
    pub lines: Vec<String>,
}

#[derive(Clone, Copy)]
enum PickSource {
    /// Index into the giver's junk bucket.
    Junk(usize),
    /// Index of the unconverted gukjin in the giver's five bucket.
    Gukjin(usize),
}

/// Transfer up to `count` pip cards from `giver` to `taker`.
///
/// Forfeit preference per card: plain junk, then double junk, then the
/// junk-mode gukjin converted to a 2-pip junk, then triple junk; ties go
/// to the most recently captured card, then id order. If the gukjin is
/// the giver's only candidate it locks into five mode and escapes, ending
/// the steal. Running out of candidates ends the steal without error.
pub fn steal_pi(
    taker: &mut PlayerState,
    giver: &mut PlayerState,
    taker_side: Side,
    count: u32,
) -> StealReport {
    let giver_side = taker_side.other();
    let mut report = StealReport::default();

    for _ in 0..count {
        let mut candidates: Vec<(PickSource, u32, bool)> = giver
            .captured
            .junk
            .iter()
            .enumerate()
            .map(|(idx, card)| {
                let gukjin_pi = card.gukjin_transformed
                    || (card.is_gukjin() && card.category == Category::Junk);
                (PickSource::Junk(idx), card.pi(), gukjin_pi)
            })
            .collect();

        let gukjin_idx = (giver.gukjin_mode == GukjinMode::Junk)
            .then(|| {
                giver
                    .captured
                    .five
                    .iter()
                    .position(|c| c.is_gukjin() && !c.gukjin_transformed)
            })
            .flatten();

        if candidates.is_empty() {
            let Some(idx) = gukjin_idx else { break };
            giver.gukjin_mode = GukjinMode::Five;
            giver.gukjin_locked = true;
            let name = giver.captured.five[idx].name.clone();
            report.lines.push(format!(
                "{giver_side}: {name} locks in as a five and escapes the steal"
            ));
            break;
        }
        if let Some(idx) = gukjin_idx {
            candidates.push((PickSource::Gukjin(idx), 2, true));
        }

        let rank = |value: u32, gukjin: bool| -> u32 {
            if value <= 1 {
                1
            } else if value == 2 && !gukjin {
                2
            } else if gukjin {
                3
            } else {
                4
            }
        };

        candidates.sort_by(|a, b| {
            let (sa, va, ga) = *a;
            let (sb, vb, gb) = *b;
            let idx_of = |s: PickSource| match s {
                PickSource::Junk(i) | PickSource::Gukjin(i) => i,
            };
            let id_of = |s: PickSource| match s {
                PickSource::Junk(i) => giver.captured.junk[i].id,
                PickSource::Gukjin(i) => giver.captured.five[i].id,
            };
            rank(va, ga)
                .cmp(&rank(vb, gb))
                .then(idx_of(sb).cmp(&idx_of(sa)))
                .then(id_of(sa).cmp(&id_of(sb)))
        });

        let stolen = match candidates[0].0 {
            PickSource::Junk(idx) => giver.captured.junk.remove(idx),
            PickSource::Gukjin(idx) => {
                let mut card = giver.captured.five.remove(idx);
                card.category = Category::Junk;
                card.pi_value = 2;
                card.gukjin_transformed = true;
                card.name.push_str(" (Gukjin Pi)");
                card
            }
        };

        report.lines.push(format!(
            "{taker_side}: stole 1 pi from {giver_side} ({}, value {})",
            stolen.name,
            stolen.pi()
        ));
        taker.captured.junk.push(stolen);
        report.moved += 1;
    }

    report
}
