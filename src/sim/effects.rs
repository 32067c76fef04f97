//! Special-orb catalog, weighted selection and effect computation
//!
//! Effects are computed purely from the orb kind and the timestamp passed
//! in; no wall-clock reads, so everything here is unit-testable.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{
    CRYSTAL_DISAPPEAR_MS, FOOD_SCORE, SLOW_DOWN_MODIFIER, SPEED_EFFECT_DURATION_MS,
    SPEED_UP_MODIFIER,
};

/// The closed set of special-orb kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrbKind {
    Negative,
    Positive,
    SpeedUp,
    SlowDown,
    Crystal,
}

/// One catalog row. `weight` is relative, normalized against the sum of
/// all weights at selection time.
#[derive(Debug, Clone, Copy)]
pub struct OrbSpec {
    pub kind: OrbKind,
    pub weight: f64,
    /// How long the orb stays on the board before vanishing uncollected.
    /// Absent means it persists until collected.
    pub disappear_ms: Option<f64>,
}

/// Catalog order is significant: weighted selection resolves ties by first
/// match, so this array must stay stable.
pub const ORB_CATALOG: [OrbSpec; 5] = [
    OrbSpec {
        kind: OrbKind::Negative,
        weight: 0.2,
        disappear_ms: None,
    },
    OrbSpec {
        kind: OrbKind::Positive,
        weight: 0.3,
        disappear_ms: None,
    },
    OrbSpec {
        kind: OrbKind::SpeedUp,
        weight: 0.25,
        disappear_ms: Some(SPEED_EFFECT_DURATION_MS),
    },
    OrbSpec {
        kind: OrbKind::SlowDown,
        weight: 0.25,
        disappear_ms: Some(SPEED_EFFECT_DURATION_MS),
    },
    OrbSpec {
        kind: OrbKind::Crystal,
        weight: 0.4,
        disappear_ms: Some(CRYSTAL_DISAPPEAR_MS),
    },
];

pub fn spec_for(kind: OrbKind) -> &'static OrbSpec {
    ORB_CATALOG
        .iter()
        .find(|spec| spec.kind == kind)
        .expect("every orb kind has a catalog row")
}

/// Weighted-random orb selection: draw a threshold in `[0, total)` and
/// subtract weights in catalog order until it goes non-positive.
pub fn select_kind<R: Rng>(rng: &mut R) -> OrbKind {
    let total: f64 = ORB_CATALOG.iter().map(|spec| spec.weight).sum();
    let mut threshold = rng.random::<f64>() * total;
    for spec in &ORB_CATALOG {
        threshold -= spec.weight;
        if threshold <= 0.0 {
            return spec.kind;
        }
    }
    // Float rounding can leave a sliver above zero; last row wins
    ORB_CATALOG[ORB_CATALOG.len() - 1].kind
}

/// A timed move-interval multiplier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedEffect {
    pub modifier: f64,
    pub ends_at: f64,
}

/// Outcome of consuming an orb. Applied to game state by the tick
/// resolver; the length delta is always -1, 0 or +1.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EffectResult {
    pub score_delta: i64,
    pub length_delta: i8,
    pub speed: Option<SpeedEffect>,
    pub crystal_delta: u32,
}

/// Compute an orb's effect at collection time `now`
pub fn effect(kind: OrbKind, now: f64) -> EffectResult {
    match kind {
        OrbKind::Negative => EffectResult {
            score_delta: -FOOD_SCORE,
            length_delta: -1,
            ..Default::default()
        },
        OrbKind::Positive => EffectResult {
            score_delta: FOOD_SCORE,
            length_delta: 1,
            ..Default::default()
        },
        OrbKind::SpeedUp => EffectResult {
            speed: Some(SpeedEffect {
                modifier: SPEED_UP_MODIFIER,
                ends_at: now + SPEED_EFFECT_DURATION_MS,
            }),
            ..Default::default()
        },
        OrbKind::SlowDown => EffectResult {
            speed: Some(SpeedEffect {
                modifier: SLOW_DOWN_MODIFIER,
                ends_at: now + SPEED_EFFECT_DURATION_MS,
            }),
            ..Default::default()
        },
        OrbKind::Crystal => EffectResult {
            crystal_delta: 1,
            ..Default::default()
        },
    }
}
