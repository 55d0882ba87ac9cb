//! Crafting materials and per-player inventories.
//!
//! The set of materials is fixed at compile time, so inventories are plain
//! arrays indexed by [`MaterialKind`] rather than string-keyed maps. Every
//! kind is always present and starts at zero.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A material dropped by defeated waves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MaterialKind {
    /// Wood - weapons and building blocks.
    Wood,
    /// Stone - shields.
    Stone,
    /// Grass - healing drafts.
    Grass,
}

impl MaterialKind {
    /// Number of material kinds.
    pub const COUNT: usize = 3;

    /// All kinds, in drop order.
    pub const ALL: [MaterialKind; Self::COUNT] =
        [MaterialKind::Wood, MaterialKind::Stone, MaterialKind::Grass];

    /// Slot of this kind in an inventory array.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            MaterialKind::Wood => 0,
            MaterialKind::Stone => 1,
            MaterialKind::Grass => 2,
        }
    }

    /// Lowercase display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            MaterialKind::Wood => "wood",
            MaterialKind::Stone => "stone",
            MaterialKind::Grass => "grass",
        }
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Amounts of each material, used for both inventories and drop totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Inventory {
    counts: [u32; MaterialKind::COUNT],
}

impl Inventory {
    /// An empty inventory.
    pub const EMPTY: Self = Self {
        counts: [0; MaterialKind::COUNT],
    };

    /// Create an inventory from explicit counts.
    #[must_use]
    pub const fn new(wood: u32, stone: u32, grass: u32) -> Self {
        Self {
            counts: [wood, stone, grass],
        }
    }

    /// Amount held of `kind`.
    #[must_use]
    pub const fn get(&self, kind: MaterialKind) -> u32 {
        self.counts[kind.index()]
    }

    /// Add `amount` of `kind`.
    pub fn add(&mut self, kind: MaterialKind, amount: u32) {
        let slot = &mut self.counts[kind.index()];
        *slot = slot.saturating_add(amount);
    }

    /// Add every amount in `other`.
    pub fn add_all(&mut self, other: &Inventory) {
        for kind in MaterialKind::ALL {
            self.add(kind, other.get(kind));
        }
    }

    /// Sum of all materials.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Iterate `(kind, amount)` pairs in drop order.
    pub fn iter(&self) -> impl Iterator<Item = (MaterialKind, u32)> + '_ {
        MaterialKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    /// First material that falls short of `cost`, if any.
    ///
    /// Returns `(kind, required, available)`.
    #[must_use]
    pub fn shortfall(&self, cost: &MaterialCost) -> Option<(MaterialKind, u32, u32)> {
        cost.iter()
            .find(|&(kind, required)| self.get(kind) < required)
            .map(|(kind, required)| (kind, required, self.get(kind)))
    }

    /// Check whether every material in `cost` is held in sufficient quantity.
    #[must_use]
    pub fn can_afford(&self, cost: &MaterialCost) -> bool {
        self.shortfall(cost).is_none()
    }

    /// Deduct `cost` if affordable.
    ///
    /// Returns true if the payment went through. Nothing is deducted
    /// otherwise; there is no partial payment.
    pub fn spend(&mut self, cost: &MaterialCost) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for (kind, amount) in cost.iter() {
            self.counts[kind.index()] -= amount;
        }
        true
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (kind, amount) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{kind}:{amount}")?;
            first = false;
        }
        Ok(())
    }
}

/// Material price of an upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialCost(Inventory);

impl MaterialCost {
    /// A cost of `amount` units of a single material.
    #[must_use]
    pub const fn single(kind: MaterialKind, amount: u32) -> Self {
        Self(match kind {
            MaterialKind::Wood => Inventory::new(amount, 0, 0),
            MaterialKind::Stone => Inventory::new(0, amount, 0),
            MaterialKind::Grass => Inventory::new(0, 0, amount),
        })
    }

    /// Amount of `kind` required.
    #[must_use]
    pub const fn get(&self, kind: MaterialKind) -> u32 {
        self.0.get(kind)
    }

    /// Iterate the non-zero components of the cost.
    pub fn iter(&self) -> impl Iterator<Item = (MaterialKind, u32)> + '_ {
        self.0.iter().filter(|&(_, amount)| amount > 0)
    }
}

impl fmt::Display for MaterialCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (kind, amount) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{kind}:{amount}")?;
            first = false;
        }
        Ok(())
    }
}
