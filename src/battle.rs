//! Battle state: combatants, the two-level action menu, and the timed
//! phases that pace a turn.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::health::HealthTracker;
use crate::roster::{self, AllySpec, AttackSpec, EnemySpec, Portrait, VisualEffect};

pub const PLAYER_MAX_HP: u16 = 100;
pub const PLAYER_LEVEL: u8 = 10;

/// Delay before the enemy counter lands (~1 s at the 120 ms tick).
pub const ENEMY_TURN_TICKS: u16 = 8;
/// Pause after the counter before the menu reopens.
pub const POST_TURN_TICKS: u16 = 8;
/// Pause on a combatant going down before the result message.
pub const DOWNED_TICKS: u16 = 8;
/// Pause on the result message before the battle closes.
pub const CLOSE_TICKS: u16 = 8;
/// Shorter close after running away.
pub const ESCAPE_TICKS: u16 = 4;
/// How long a visual-effect flash stays on screen.
pub const EFFECT_TICKS: u16 = 6;

pub const BACK: &str = "BACK";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum RootAction {
    Fight,
    Swap,
    Items,
    Run,
}

pub const ROOT_ACTIONS: [RootAction; 4] = [
    RootAction::Fight,
    RootAction::Swap,
    RootAction::Items,
    RootAction::Run,
];

impl RootAction {
    pub fn label(self) -> &'static str {
        match self {
            RootAction::Fight => "FIGHT",
            RootAction::Swap => "SWAP",
            RootAction::Items => "ITEMS",
            RootAction::Run => "RUN",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum MenuLevel {
    Root,
    Sub { kind: RootAction, items: Vec<String> },
}

/// Two-level selector. `selected` is always a valid index into the active
/// list; sub-menu lists always end with a BACK entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BattleMenu {
    pub level: MenuLevel,
    pub selected: usize,
}

impl BattleMenu {
    pub fn new() -> Self {
        Self {
            level: MenuLevel::Root,
            selected: 0,
        }
    }

    pub fn len(&self) -> usize {
        match &self.level {
            MenuLevel::Root => ROOT_ACTIONS.len(),
            MenuLevel::Sub { items, .. } => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_sub(&self) -> bool {
        matches!(self.level, MenuLevel::Sub { .. })
    }

    /// Wraps past the first entry.
    pub fn move_up(&mut self) -> bool {
        let len = self.len();
        if len < 2 {
            return false;
        }
        self.selected = (self.selected + len - 1) % len;
        true
    }

    /// Wraps past the last entry.
    pub fn move_down(&mut self) -> bool {
        let len = self.len();
        if len < 2 {
            return false;
        }
        self.selected = (self.selected + 1) % len;
        true
    }

    pub fn open_sub(&mut self, kind: RootAction, mut items: Vec<String>) {
        items.push(BACK.to_string());
        self.level = MenuLevel::Sub { kind, items };
        self.selected = 0;
    }

    pub fn close_sub(&mut self) {
        self.level = MenuLevel::Root;
        self.selected = 0;
    }

    pub fn selected_root(&self) -> Option<RootAction> {
        match self.level {
            MenuLevel::Root => ROOT_ACTIONS.get(self.selected).copied(),
            MenuLevel::Sub { .. } => None,
        }
    }

    pub fn selected_sub(&self) -> Option<(RootAction, &str)> {
        match &self.level {
            MenuLevel::Root => None,
            MenuLevel::Sub { kind, items } => items
                .get(self.selected)
                .map(|item| (*kind, item.as_str())),
        }
    }
}

impl Default for BattleMenu {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum BattleSide {
    Player,
    Enemy,
}

impl BattleSide {
    pub fn label(self) -> &'static str {
        match self {
            BattleSide::Player => "player",
            BattleSide::Enemy => "enemy",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum BattleOutcome {
    Victory,
    Defeat,
    Escape,
}

/// Outside `Menu` the selector is closed and player input is not accepted;
/// the pending timer is the only way forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum BattlePhase {
    Menu,
    EnemyTurn { timer: u16 },
    PostTurn { timer: u16 },
    Downed { side: BattleSide, timer: u16 },
    Closing { outcome: BattleOutcome, timer: u16 },
}

/// A combatant owns its health and a direct handle to its portrait; nothing
/// is looked up by display name at render time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Combatant {
    pub name: String,
    pub portrait: Portrait,
    pub health: HealthTracker,
}

impl Combatant {
    pub fn from_ally(spec: &AllySpec) -> Self {
        Self {
            name: spec.name.to_string(),
            portrait: spec.portrait,
            health: HealthTracker::new(PLAYER_MAX_HP),
        }
    }

    pub fn from_enemy(spec: &EnemySpec) -> Self {
        Self {
            name: spec.name.to_string(),
            portrait: spec.portrait,
            health: HealthTracker::new(spec.max_hp),
        }
    }

    pub fn attacks(&self) -> &'static [AttackSpec] {
        roster::attacks_for(&self.name)
    }
}

/// Timed portrait styling for a landed effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EffectFlash {
    pub side: BattleSide,
    pub effect: VisualEffect,
    pub ticks: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BattleState {
    pub player: Combatant,
    pub enemy: Combatant,
    pub enemy_level: u8,
    pub menu: BattleMenu,
    pub phase: BattlePhase,
    pub message: String,
    pub flashes: Vec<EffectFlash>,
}

impl BattleState {
    pub fn new(ally: &AllySpec, enemy: &EnemySpec) -> Self {
        Self {
            player: Combatant::from_ally(ally),
            enemy: Combatant::from_enemy(enemy),
            enemy_level: enemy.level,
            menu: BattleMenu::new(),
            phase: BattlePhase::Menu,
            message: format!("A wild {} appeared!\nWhat will {} do?", enemy.name, ally.name),
            flashes: Vec::new(),
        }
    }

    pub fn menu_open(&self) -> bool {
        matches!(self.phase, BattlePhase::Menu)
    }

    pub fn flash(&mut self, side: BattleSide, effect: Option<VisualEffect>) {
        self.flashes.push(EffectFlash {
            side,
            effect: effect.unwrap_or(VisualEffect::Blink),
            ticks: EFFECT_TICKS,
        });
    }

    pub fn active_flash(&self, side: BattleSide) -> Option<&EffectFlash> {
        self.flashes.iter().rev().find(|flash| flash.side == side)
    }

    pub fn tick_flashes(&mut self) -> bool {
        if self.flashes.is_empty() {
            return false;
        }
        for flash in &mut self.flashes {
            flash.ticks = flash.ticks.saturating_sub(1);
        }
        self.flashes.retain(|flash| flash.ticks > 0);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_menu_wraps_both_directions() {
        let mut menu = BattleMenu::new();
        assert!(menu.move_up());
        assert_eq!(menu.selected, ROOT_ACTIONS.len() - 1);
        assert!(menu.move_down());
        assert_eq!(menu.selected, 0);
    }

    #[test]
    fn selection_stays_in_bounds_for_any_sequence() {
        let mut menu = BattleMenu::new();
        menu.open_sub(RootAction::Items, vec!["A".into(), "B".into()]);
        for step in 0..40 {
            if step % 3 == 0 {
                menu.move_up();
            } else {
                menu.move_down();
            }
            assert!(menu.selected < menu.len());
        }
    }

    #[test]
    fn sub_menu_always_carries_back() {
        let mut menu = BattleMenu::new();
        menu.open_sub(RootAction::Swap, Vec::new());
        assert_eq!(menu.len(), 1);
        assert_eq!(menu.selected_sub(), Some((RootAction::Swap, BACK)));
        // Degenerate single-entry list: navigation is a no-op.
        assert!(!menu.move_down());
        assert_eq!(menu.selected, 0);
    }

    #[test]
    fn close_sub_returns_to_root_at_zero() {
        let mut menu = BattleMenu::new();
        menu.open_sub(RootAction::Fight, vec!["Swift Peck".into()]);
        menu.move_down();
        menu.close_sub();
        assert_eq!(menu.level, MenuLevel::Root);
        assert_eq!(menu.selected, 0);
    }

    #[test]
    fn flashes_expire() {
        let ally = &crate::roster::ALLIES[0];
        let enemy = &crate::roster::ENEMIES[0];
        let mut battle = BattleState::new(ally, enemy);
        battle.flash(BattleSide::Enemy, None);
        assert_eq!(
            battle.active_flash(BattleSide::Enemy).map(|f| f.effect),
            Some(VisualEffect::Blink)
        );
        for _ in 0..EFFECT_TICKS {
            battle.tick_flashes();
        }
        assert!(battle.active_flash(BattleSide::Enemy).is_none());
    }
}
