//! Damage tags and status kinds
//!
//! Every damage application carries a [`DamageTag`]. The three elemental tags
//! map one-to-one onto a [`StatusKind`]; Physical has no status.

use serde::{Deserialize, Serialize};

/// Tag attached to each damage application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DamageTag {
    #[default]
    Physical,
    Fire,
    Ice,
    Lightning,
}

/// Total number of damage tags (for array indexing)
pub const DAMAGE_TAG_COUNT: usize = 4;

impl DamageTag {
    /// Array index for this tag (for per-tag tallies)
    pub fn index(self) -> usize {
        match self {
            Self::Physical => 0,
            Self::Fire => 1,
            Self::Ice => 2,
            Self::Lightning => 3,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Physical => "Physical",
            Self::Fire => "Fire",
            Self::Ice => "Ice",
            Self::Lightning => "Lightning",
        }
    }

    /// The status this tag inflicts, if it is elemental
    pub fn status_kind(self) -> Option<StatusKind> {
        match self {
            Self::Physical => None,
            Self::Fire => Some(StatusKind::Fire),
            Self::Ice => Some(StatusKind::Ice),
            Self::Lightning => Some(StatusKind::Lightning),
        }
    }

    /// All tag variants
    pub fn all() -> &'static [DamageTag] {
        &[Self::Physical, Self::Fire, Self::Ice, Self::Lightning]
    }
}

/// Category of an elemental status effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusKind {
    Fire,
    Ice,
    Lightning,
}

/// Total number of status kinds (for array indexing)
pub const STATUS_KIND_COUNT: usize = 3;

impl StatusKind {
    /// Array index for this kind (slot in an actor's status table)
    pub fn index(self) -> usize {
        match self {
            Self::Fire => 0,
            Self::Ice => 1,
            Self::Lightning => 2,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Fire => "Fire",
            Self::Ice => "Ice",
            Self::Lightning => "Lightning",
        }
    }

    /// Look up a kind by name (case-insensitive). Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Damage tag used for damage this status deals
    pub fn tag(self) -> DamageTag {
        match self {
            Self::Fire => DamageTag::Fire,
            Self::Ice => DamageTag::Ice,
            Self::Lightning => DamageTag::Lightning,
        }
    }

    /// All status kinds, in slot order
    pub fn all() -> &'static [StatusKind] {
        &[Self::Fire, Self::Ice, Self::Lightning]
    }
}
