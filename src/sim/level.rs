//! Level catalog and bomb tiers
//!
//! Every level's parameters are derived from a fixed table; nothing here is stored.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_LEVEL;

/// Bomb tiers, weakest first. Ordering follows tier strength.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum BombKind {
    #[default]
    HandGrenade,
    Dynamite,
    Tnt,
    C4,
    Hydrogen,
    Nuclear,
    Plasma,
}

/// Display color of a bomb tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BombColor {
    Orange,
    Red,
    Yellow,
    Blue,
    Green,
    Purple,
    Pink,
}

/// Fixed attributes of a bomb tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BombSpec {
    pub radius: f32,
    pub points: u32,
    pub name: &'static str,
    pub asset: &'static str,
    pub color: BombColor,
}

impl BombKind {
    pub const ALL: [BombKind; 7] = [
        BombKind::HandGrenade,
        BombKind::Dynamite,
        BombKind::Tnt,
        BombKind::C4,
        BombKind::Hydrogen,
        BombKind::Nuclear,
        BombKind::Plasma,
    ];

    pub const fn spec(self) -> BombSpec {
        match self {
            BombKind::HandGrenade => BombSpec {
                radius: 60.0,
                points: 10,
                name: "Hand Grenade",
                asset: "grenade",
                color: BombColor::Orange,
            },
            BombKind::Dynamite => BombSpec {
                radius: 80.0,
                points: 20,
                name: "Dynamite",
                asset: "dynamite",
                color: BombColor::Red,
            },
            BombKind::Tnt => BombSpec {
                radius: 100.0,
                points: 30,
                name: "TNT",
                asset: "tnt",
                color: BombColor::Yellow,
            },
            BombKind::C4 => BombSpec {
                radius: 120.0,
                points: 50,
                name: "C4 Explosive",
                asset: "c4",
                color: BombColor::Blue,
            },
            BombKind::Hydrogen => BombSpec {
                radius: 150.0,
                points: 80,
                name: "Hydrogen Bomb",
                asset: "hydrogen",
                color: BombColor::Green,
            },
            BombKind::Nuclear => BombSpec {
                radius: 180.0,
                points: 120,
                name: "Nuclear Bomb",
                asset: "nuclear",
                color: BombColor::Purple,
            },
            BombKind::Plasma => BombSpec {
                radius: 200.0,
                points: 150,
                name: "Plasma Bomb",
                asset: "plasma",
                color: BombColor::Pink,
            },
        }
    }

    /// 1-based tier number
    pub fn tier(self) -> u32 {
        self as u32 + 1
    }

    pub fn radius(self) -> f32 {
        self.spec().radius
    }

    pub fn points(self) -> u32 {
        self.spec().points
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Look up a tier by its display name (stored results use names)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// Difficulty parameters for one level
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelConfig {
    pub level: u32,
    pub bomb_kind: BombKind,
    pub bomb_count: u32,
    pub round_duration: Duration,
    /// Period between target spawns
    pub spawn_interval: Duration,
    /// Period between relocations of each live target
    pub relocation_interval: Duration,
}

/// (kind, bombs, duration s, spawn interval ms, relocation interval ms) for levels 1..=7
const LEVEL_TABLE: [(BombKind, u32, u64, u64, u64); MAX_LEVEL as usize] = [
    (BombKind::HandGrenade, 3, 20, 3000, 3000),
    (BombKind::Dynamite, 4, 20, 2500, 2500),
    (BombKind::Tnt, 5, 20, 2000, 2000),
    (BombKind::C4, 4, 20, 1500, 1800),
    (BombKind::Hydrogen, 3, 20, 1200, 1500),
    (BombKind::Nuclear, 2, 20, 1000, 1300),
    (BombKind::Plasma, 1, 20, 800, 1000),
];

/// Configuration for a level. Levels past the last clamp to it; level 0 reads as level 1.
pub fn config_for(level: u32) -> LevelConfig {
    let row = (level.clamp(1, MAX_LEVEL) - 1) as usize;
    let (bomb_kind, bomb_count, secs, spawn_ms, relocate_ms) = LEVEL_TABLE[row];
    LevelConfig {
        level: level.max(1),
        bomb_kind,
        bomb_count,
        round_duration: Duration::from_secs(secs),
        spawn_interval: Duration::from_millis(spawn_ms),
        relocation_interval: Duration::from_millis(relocate_ms),
    }
}
