//! Static participant registry: party members, wild enemies, and trail items.
//!
//! Pure lookup tables. Absence of a name is a caller error, not a failure:
//! `attacks_for` returns an empty slice for unknown participants.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Direct handle to a combatant's visual representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Portrait {
    Wren,
    Moss,
    ThornShade,
    MireLurker,
}

/// Visual-effect tag attached to attacks and item uses. Rendering is the
/// presentation layer's job; a tag with no visible target is skipped there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum VisualEffect {
    Spin,
    Flash,
    Shrink,
    Glow,
    Dissolve,
    Blink,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackSpec {
    pub name: &'static str,
    pub points: u16,
    /// Played on the target when the attack lands; `None` falls back to the
    /// default hit flash.
    pub effect: Option<VisualEffect>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllySpec {
    pub name: &'static str,
    pub portrait: Portrait,
    pub attacks: &'static [AttackSpec],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemySpec {
    pub name: &'static str,
    pub portrait: Portrait,
    pub level: u8,
    pub max_hp: u16,
    pub attacks: &'static [AttackSpec],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemSpec {
    pub name: &'static str,
    /// Ally names this item works on; empty means it never applies.
    pub applies_to: &'static [&'static str],
    /// Custom use message, appended after the user's name.
    pub message: Option<&'static str>,
}

pub const ALLIES: &[AllySpec] = &[
    AllySpec {
        name: "WREN",
        portrait: Portrait::Wren,
        attacks: &[
            AttackSpec {
                name: "Swift Peck",
                points: 10,
                effect: None,
            },
            AttackSpec {
                name: "Wing Slash",
                points: 20,
                effect: None,
            },
            AttackSpec {
                name: "Gale Burst",
                points: 30,
                effect: Some(VisualEffect::Flash),
            },
        ],
    },
    AllySpec {
        name: "MOSS",
        portrait: Portrait::Moss,
        attacks: &[
            AttackSpec {
                name: "Stone Fist",
                points: 10,
                effect: Some(VisualEffect::Spin),
            },
            AttackSpec {
                name: "Boulder Toss",
                points: 20,
                effect: Some(VisualEffect::Spin),
            },
            AttackSpec {
                name: "Quake",
                points: 30,
                effect: Some(VisualEffect::Shrink),
            },
        ],
    },
];

pub const ENEMIES: &[EnemySpec] = &[
    EnemySpec {
        name: "THORN SHADE",
        portrait: Portrait::ThornShade,
        level: 5,
        max_hp: 100,
        attacks: &[
            AttackSpec {
                name: "Thorn Lash",
                points: 10,
                effect: None,
            },
            AttackSpec {
                name: "Strangle",
                points: 15,
                effect: Some(VisualEffect::Shrink),
            },
            AttackSpec {
                name: "Gloom Spit",
                points: 20,
                effect: Some(VisualEffect::Flash),
            },
        ],
    },
    EnemySpec {
        name: "MIRE LURKER",
        portrait: Portrait::MireLurker,
        level: 6,
        max_hp: 100,
        attacks: &[
            AttackSpec {
                name: "Mud Sling",
                points: 10,
                effect: None,
            },
            AttackSpec {
                name: "Drag Under",
                points: 20,
                effect: Some(VisualEffect::Shrink),
            },
        ],
    },
];

pub const ITEMS: &[ItemSpec] = &[
    ItemSpec {
        name: "FERN TONIC",
        applies_to: &["WREN"],
        message: Some("feels refreshed!"),
    },
    ItemSpec {
        name: "MOSS POLISH",
        applies_to: &["MOSS"],
        message: None,
    },
    ItemSpec {
        name: "OLD WHISTLE",
        applies_to: &[],
        message: None,
    },
];

pub fn ally(name: &str) -> Option<&'static AllySpec> {
    ALLIES.iter().find(|spec| spec.name == name)
}

pub fn enemy(name: &str) -> Option<&'static EnemySpec> {
    ENEMIES.iter().find(|spec| spec.name == name)
}

pub fn item(name: &str) -> Option<&'static ItemSpec> {
    ITEMS.iter().find(|spec| spec.name == name)
}

/// Attack set for any registered participant, ally or enemy. Unknown names
/// get an empty set.
pub fn attacks_for(name: &str) -> &'static [AttackSpec] {
    if let Some(spec) = ally(name) {
        return spec.attacks;
    }
    if let Some(spec) = enemy(name) {
        return spec.attacks;
    }
    &[]
}
