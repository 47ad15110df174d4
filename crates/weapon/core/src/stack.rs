//! Layered stacking of numeric contributions.
//!
//! Every query quantity (fire rate, damage, recoil) is a base value refined by
//! any number of `(amount, kind, layer)` contributions. Layers apply in
//! ascending order and each layer's result becomes the next layer's base:
//!
//! ```text
//! layer result = override                      if any Override in the layer
//!              = (running + Σ Add) × Π Multiply otherwise
//! ```
//!
//! # Example
//! ```
//! # use weapon_core::stack::{fold, StackContribution, StackKind};
//! let contributions = [
//!     StackContribution::new(2.0, StackKind::Add, 0),
//!     StackContribution::new(3.0, StackKind::Add, 0),
//!     StackContribution::new(2.0, StackKind::Multiply, 1),
//! ];
//! // layer 0: 10 + 2 + 3 = 15, layer 1: 15 × 2 = 30
//! assert_eq!(fold(10.0, &contributions), 30.0);
//! ```

use crate::codec::normalize_key;

/// How a contribution combines with the rest of its layer.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackKind {
    /// Summed with other `Add` contributions before multiplication.
    Add,
    /// Multiplied with other `Multiply` contributions.
    #[default]
    Multiply,
    /// Replaces the layer result; the last override in a layer wins.
    Override,
    /// Neutral in a fold. As a trigger stacking mode it keeps a single instance.
    None,
}

impl StackKind {
    /// Lenient name parser used by the configuration codec.
    pub fn parse(text: &str) -> Option<Self> {
        match normalize_key(text).as_str() {
            "add" | "additive" | "sum" => Some(Self::Add),
            "multiply" | "mult" | "multi" | "multiplicative" => Some(Self::Multiply),
            "override" | "set" | "replace" => Some(Self::Override),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// A single `(amount, kind, layer)` entry fed into [`fold`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StackContribution {
    pub amount: f32,
    pub kind: StackKind,
    pub layer: i32,
}

impl StackContribution {
    pub const fn new(amount: f32, kind: StackKind, layer: i32) -> Self {
        Self {
            amount,
            kind,
            layer,
        }
    }
}

/// Folds `contributions` onto `base`, layer by layer in ascending order.
///
/// Grouping is stable, so contributions keep call order inside a layer; only
/// `Override` is order-sensitive there (the last one wins).
pub fn fold(base: f32, contributions: &[StackContribution]) -> f32 {
    if contributions.is_empty() {
        return base;
    }

    let mut ordered: Vec<&StackContribution> = contributions.iter().collect();
    ordered.sort_by_key(|c| c.layer);

    ordered
        .chunk_by(|a, b| a.layer == b.layer)
        .fold(base, fold_layer)
}

fn fold_layer(running: f32, layer: &[&StackContribution]) -> f32 {
    let mut add_total = 0.0f32;
    let mut mult_total = 1.0f32;
    let mut override_val = None;

    for contribution in layer {
        match contribution.kind {
            StackKind::Add => add_total += contribution.amount,
            StackKind::Multiply => mult_total *= contribution.amount,
            StackKind::Override => override_val = Some(contribution.amount),
            StackKind::None => {}
        }
    }

    override_val.unwrap_or((running + add_total) * mult_total)
}

/// Mutable accumulator embedded in query contexts.
///
/// The base is fixed at construction; [`add_contribution`](Self::add_contribution)
/// is the only write path, so independently registered modules compose
/// without overwriting each other.
#[derive(Clone, Debug, PartialEq)]
pub struct StackAccumulator {
    base: f32,
    contributions: Vec<StackContribution>,
}

impl StackAccumulator {
    pub fn new(base: f32) -> Self {
        Self {
            base,
            contributions: Vec::new(),
        }
    }

    pub fn base(&self) -> f32 {
        self.base
    }

    /// Records a contribution on an explicit layer.
    pub fn add_contribution(&mut self, amount: f32, kind: StackKind, layer: i32) {
        self.contributions
            .push(StackContribution::new(amount, kind, layer));
    }

    /// Records a contribution on the default layer (0).
    pub fn add_mod(&mut self, amount: f32, kind: StackKind) {
        self.add_contribution(amount, kind, 0);
    }

    pub fn contributions(&self) -> &[StackContribution] {
        &self.contributions
    }

    pub fn is_modified(&self) -> bool {
        !self.contributions.is_empty()
    }

    /// Final value with every recorded contribution folded in.
    pub fn value(&self) -> f32 {
        fold(self.base, &self.contributions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(amount: f32, kind: StackKind, layer: i32) -> StackContribution {
        StackContribution::new(amount, kind, layer)
    }

    #[test]
    fn layers_apply_in_ascending_order() {
        let contributions = [
            c(2.0, StackKind::Add, 0),
            c(3.0, StackKind::Add, 0),
            c(2.0, StackKind::Multiply, 1),
        ];
        assert_eq!(fold(10.0, &contributions[..2]), 15.0);
        assert_eq!(fold(10.0, &contributions), 30.0);

        // Declaring the later layer first does not change the result.
        let shuffled = [contributions[2], contributions[0], contributions[1]];
        assert_eq!(fold(10.0, &shuffled), 30.0);
    }

    #[test]
    fn layer_order_matters() {
        let add_then_mult = [c(5.0, StackKind::Add, 0), c(2.0, StackKind::Multiply, 1)];
        let mult_then_add = [c(5.0, StackKind::Add, 1), c(2.0, StackKind::Multiply, 0)];
        assert_eq!(fold(10.0, &add_then_mult), 30.0);
        assert_eq!(fold(10.0, &mult_then_add), 25.0);
    }

    #[test]
    fn add_precedes_multiply_within_layer() {
        let contributions = [c(2.0, StackKind::Multiply, 0), c(5.0, StackKind::Add, 0)];
        assert_eq!(fold(10.0, &contributions), 30.0);
    }

    #[test]
    fn override_replaces_layer() {
        let contributions = [c(5.0, StackKind::Add, 0), c(100.0, StackKind::Override, 0)];
        assert_eq!(fold(10.0, &contributions), 100.0);

        let last_wins = [
            c(100.0, StackKind::Override, 0),
            c(3.0, StackKind::Multiply, 0),
            c(7.0, StackKind::Override, 0),
        ];
        assert_eq!(fold(10.0, &last_wins), 7.0);
    }

    #[test]
    fn override_feeds_next_layer() {
        let contributions = [c(4.0, StackKind::Override, 0), c(0.5, StackKind::Multiply, 1)];
        assert_eq!(fold(10.0, &contributions), 2.0);
    }

    #[test]
    fn empty_and_neutral_contributions_keep_base() {
        assert_eq!(fold(12.5, &[]), 12.5);
        assert_eq!(fold(12.5, &[c(99.0, StackKind::None, 3)]), 12.5);
    }

    #[test]
    fn same_kind_group_is_order_invariant() {
        let a = [
            c(1.5, StackKind::Multiply, 0),
            c(2.0, StackKind::Multiply, 0),
            c(4.0, StackKind::Add, 0),
            c(1.0, StackKind::Add, 0),
        ];
        let b = [a[3], a[1], a[2], a[0]];
        assert_eq!(fold(2.0, &a), fold(2.0, &b));
        assert_eq!(fold(2.0, &a), 21.0);
    }

    #[test]
    fn accumulator_folds_recorded_contributions() {
        let mut acc = StackAccumulator::new(10.0);
        assert!(!acc.is_modified());
        assert_eq!(acc.value(), 10.0);

        acc.add_mod(1.5, StackKind::Multiply);
        acc.add_contribution(5.0, StackKind::Add, -1);
        assert_eq!(acc.base(), 10.0);
        assert_eq!(acc.contributions().len(), 2);
        // layer -1: 15, layer 0: 22.5
        assert_eq!(acc.value(), 22.5);
    }

    #[test]
    fn parse_accepts_synonyms() {
        assert_eq!(StackKind::parse("Additive"), Some(StackKind::Add));
        assert_eq!(StackKind::parse(" mult "), Some(StackKind::Multiply));
        assert_eq!(StackKind::parse("OVERRIDE"), Some(StackKind::Override));
        assert_eq!(StackKind::parse("None"), Some(StackKind::None));
        assert_eq!(StackKind::parse("sideways"), None);
    }
}
