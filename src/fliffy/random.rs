//! Randomness seam and the Fliffy generator.
//!
//! Every draw the engine makes goes through [`RandomSource`], so tests can
//! replay an exact sequence of uniform values.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::catalog::Catalog;
use super::state::{Fliffy, Rarity, Tagged};

/// Source of uniform draws and unique ids.
pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Fresh globally unique identifier.
    fn next_id(&mut self) -> String;
}

/// [`RandomSource`] backed by any `rand` generator.
pub struct RngSource<R>(pub R);

impl RngSource<StdRng> {
    /// Seeded from the platform entropy source (`crypto.getRandomValues` in the browser).
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    #[cfg(test)]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_f64(&mut self) -> f64 {
        self.0.gen::<f64>()
    }

    fn next_id(&mut self) -> String {
        uuid::Builder::from_random_bytes(self.0.gen())
            .into_uuid()
            .to_string()
    }
}

/// `floor(roll * len)`, kept in bounds for `roll` values at the top of the range.
pub fn pick_index(rng: &mut dyn RandomSource, len: usize) -> usize {
    let idx = (rng.next_f64() * len as f64) as usize;
    idx.min(len.saturating_sub(1))
}

/// Rarity for an unforced draw. Squaring the roll skews toward Common.
pub fn roll_rarity(roll: f64) -> Rarity {
    let idx = (roll * roll * Rarity::ALL.len() as f64) as usize;
    Rarity::ALL[idx.min(Rarity::ALL.len() - 1)]
}

/// Uniform pick among `options` tagged `rarity`.
/// Falls back to the first entry when nothing matches.
fn pick_trait<T: Tagged + Clone>(options: &[T], rarity: Rarity, rng: &mut dyn RandomSource) -> T {
    let matching: Vec<&T> = options.iter().filter(|o| o.rarity() == rarity).collect();
    let idx = pick_index(rng, matching.len());
    matching
        .get(idx)
        .copied()
        .unwrap_or(&options[0])
        .clone()
}

/// Generate a Fliffy, optionally forced to `target` rarity.
///
/// Draw order: rarity (unforced only), color, pattern, income, id.
pub fn generate_fliffy(
    catalog: &Catalog,
    rng: &mut dyn RandomSource,
    target: Option<Rarity>,
) -> Fliffy {
    let rarity = match target {
        Some(r) => r,
        None => roll_rarity(rng.next_f64()),
    };
    let color = pick_trait(&catalog.colors, rarity, rng);
    let pattern = pick_trait(&catalog.patterns, rarity, rng);
    let average = (color.rarity.multiplier() + pattern.rarity.multiplier()) / 2.0;
    let income = (1.0 + rng.next_f64()) * average;

    Fliffy {
        id: rng.next_id(),
        color,
        pattern,
        rarity,
        income,
    }
}

/// Replays a fixed list of uniform draws, cycling when exhausted.
#[cfg(test)]
pub struct ScriptedSource {
    rolls: Vec<f64>,
    pos: usize,
    ids: u32,
}

#[cfg(test)]
impl ScriptedSource {
    pub fn new(rolls: &[f64]) -> Self {
        assert!(!rolls.is_empty());
        Self {
            rolls: rolls.to_vec(),
            pos: 0,
            ids: 0,
        }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedSource {
    fn next_f64(&mut self) -> f64 {
        let v = self.rolls[self.pos % self.rolls.len()];
        self.pos += 1;
        v
    }

    fn next_id(&mut self) -> String {
        self.ids += 1;
        format!("id-{}", self.ids)
    }
}
