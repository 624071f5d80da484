use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::battle::BattleState;
use crate::companion::CompanionState;
use crate::encounter::EncounterState;
use crate::map::MapState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum GameMode {
    MainMenu,
    Overworld,
    Battle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlayerState {
    pub x: u16,
    pub y: u16,
    pub steps: u64,
    pub facing: Direction,
}

impl PlayerState {
    pub fn new(x: u16, y: u16) -> Self {
        Self {
            x,
            y,
            steps: 0,
            facing: Direction::Down,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MenuState {
    pub selected: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub mode: GameMode,
    pub map: MapState,
    pub player: PlayerState,
    pub companion: CompanionState,
    pub battle: Option<BattleState>,
    pub encounter: EncounterState,
    pub menu: Option<MenuState>,
    pub message: Option<String>,
    /// Counts down to the main menu after reaching the trail's end.
    pub exit_timer: Option<u16>,
    pub rng_seed: u64,
    pub tick: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_map(MapState::trail())
    }

    pub fn with_map(map: MapState) -> Self {
        let (start_x, start_y) = map.start_pos();
        Self {
            terminal_size: (80, 24),
            mode: GameMode::MainMenu,
            map,
            player: PlayerState::new(start_x, start_y),
            companion: CompanionState::new(f32::from(start_x), f32::from(start_y) - 1.0),
            battle: None,
            encounter: EncounterState::new(),
            menu: Some(MenuState::default()),
            message: None,
            exit_timer: None,
            rng_seed: seed_from_time(),
            tick: 0,
        }
    }
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        let mut sections = vec![
            DebugSection::new("Mode")
                .entry("mode", ron_string(&self.mode))
                .entry("message", ron_string(&self.message)),
            DebugSection::new("Player")
                .entry("x", ron_string(&self.player.x))
                .entry("y", ron_string(&self.player.y))
                .entry("steps", ron_string(&self.player.steps)),
            DebugSection::new("Encounter")
                .entry("armed", ron_string(&self.encounter.can_enter_battle))
                .entry("cooldown", ron_string(&self.encounter.cooldown)),
        ];

        if let Some(battle) = &self.battle {
            sections.push(
                DebugSection::new("Battle")
                    .entry("phase", ron_string(&battle.phase))
                    .entry("enemy", ron_string(&battle.enemy.name))
                    .entry("player_hp", ron_string(&battle.player.health.current()))
                    .entry("enemy_hp", ron_string(&battle.enemy.health.current())),
            );
        }

        sections
    }
}

fn seed_from_time() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (now.as_secs() << 32) ^ u64::from(now.subsec_nanos())
}
