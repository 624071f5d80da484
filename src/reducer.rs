use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::battle::{
    BattleOutcome, BattlePhase, BattleSide, BattleState, RootAction, CLOSE_TICKS, DOWNED_TICKS,
    ENEMY_TURN_TICKS, ESCAPE_TICKS, POST_TURN_TICKS,
};
use crate::companion::CompanionState;
use crate::effect::{Effect, SoundCue};
use crate::encounter::EncounterState;
use crate::roster::{self, VisualEffect};
use crate::state::{AppState, Direction, GameMode, MenuState, PlayerState};

/// Delay between the end-of-trail message and the main menu.
pub const EXIT_TICKS: u16 = 20;

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.mode = GameMode::MainMenu;
            state.menu = Some(MenuState::default());
            state.battle = None;
            state.exit_timer = None;
            state.message = None;
            DispatchResult::changed()
        }
        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
        Action::Tick => tick(state),
        Action::Move(direction) => move_player(state, direction),
        Action::BattleMenuNext => battle_menu_change(state, 1),
        Action::BattleMenuPrev => battle_menu_change(state, -1),
        Action::BattleConfirm => battle_confirm(state),
        Action::BattleCancel => battle_cancel(state),
        Action::MenuSelect(index) => {
            if let Some(menu) = state.menu.as_mut() {
                menu.selected = index;
            }
            DispatchResult::changed()
        }
        Action::MenuConfirm => menu_confirm(state),
        Action::Quit => DispatchResult::unchanged(),
    }
}

fn menu_confirm(state: &mut AppState) -> DispatchResult<Effect> {
    let Some(menu) = state.menu.as_ref() else {
        return DispatchResult::unchanged();
    };
    match menu.selected {
        0 => start_expedition(state),
        // Quit is resolved by the event layer.
        _ => DispatchResult::unchanged(),
    }
}

fn start_expedition(state: &mut AppState) -> DispatchResult<Effect> {
    let (start_x, start_y) = state.map.start_pos();
    state.mode = GameMode::Overworld;
    state.menu = None;
    state.player = PlayerState::new(start_x, start_y);
    state.companion = CompanionState::new(f32::from(start_x), f32::from(start_y) - 1.0);
    state.encounter = EncounterState::new();
    state.battle = None;
    state.exit_timer = None;
    state.message = Some(
        "Careful - something rustles in the thickets. Arrows/WASD to explore.".to_string(),
    );
    DispatchResult::changed()
}

fn move_player(state: &mut AppState, direction: Direction) -> DispatchResult<Effect> {
    if state.mode != GameMode::Overworld {
        return DispatchResult::unchanged();
    }
    // Movement is halted during fades and once the trail's end is reached.
    if state.encounter.input_locked() || state.exit_timer.is_some() {
        return DispatchResult::unchanged();
    }

    state.player.facing = direction;

    let (mut next_x, mut next_y) = (state.player.x, state.player.y);
    match direction {
        Direction::Up => next_y = next_y.saturating_sub(1),
        Direction::Down => next_y = next_y.saturating_add(1),
        Direction::Left => next_x = next_x.saturating_sub(1),
        Direction::Right => next_x = next_x.saturating_add(1),
    }
    if next_x == state.player.x && next_y == state.player.y {
        return DispatchResult::changed();
    }
    if !state.map.is_walkable(next_x, next_y) {
        return DispatchResult::changed();
    }

    state.player.x = next_x;
    state.player.y = next_y;
    state.player.steps = state.player.steps.wrapping_add(1);

    if state.map.is_east_exit(next_x) {
        state.message = Some("End of the trail - thanks for playing!".to_string());
        state.exit_timer = Some(EXIT_TICKS);
        return DispatchResult::changed();
    }

    let zone_tile = state
        .map
        .is_thicket(next_x, next_y)
        .then_some((next_x, next_y));
    if state.encounter.observe_tile(zone_tile) {
        return DispatchResult::changed_with(Effect::PlaySound(SoundCue::Encounter));
    }

    DispatchResult::changed()
}

fn tick(state: &mut AppState) -> DispatchResult<Effect> {
    state.tick = state.tick.wrapping_add(1);
    match state.mode {
        GameMode::MainMenu => DispatchResult::unchanged(),
        GameMode::Overworld => tick_overworld(state),
        GameMode::Battle => tick_battle(state),
    }
}

fn tick_overworld(state: &mut AppState) -> DispatchResult<Effect> {
    let mut changed = state.companion.follow(
        f32::from(state.player.x),
        f32::from(state.player.y),
        state.player.facing,
    );

    let encounter = state.encounter.tick();
    changed |= encounter.changed;
    if encounter.start_battle {
        return start_battle(state);
    }

    if let Some(timer) = state.exit_timer {
        changed = true;
        if timer > 1 {
            state.exit_timer = Some(timer - 1);
        } else {
            return reducer(state, Action::Init);
        }
    }

    if changed {
        DispatchResult::changed()
    } else {
        DispatchResult::unchanged()
    }
}

fn start_battle(state: &mut AppState) -> DispatchResult<Effect> {
    let lead = &roster::ALLIES[0];
    let index = next_rand(state) as usize % roster::ENEMIES.len();
    let enemy = &roster::ENEMIES[index];
    state.mode = GameMode::Battle;
    state.battle = Some(BattleState::new(lead, enemy));
    DispatchResult::changed()
}

fn battle_menu_change(state: &mut AppState, delta: i16) -> DispatchResult<Effect> {
    let Some(battle) = state.battle.as_mut() else {
        return DispatchResult::unchanged();
    };
    if !battle.menu_open() {
        return DispatchResult::unchanged();
    }
    let moved = if delta < 0 {
        battle.menu.move_up()
    } else {
        battle.menu.move_down()
    };
    if moved {
        DispatchResult::changed()
    } else {
        DispatchResult::unchanged()
    }
}

fn battle_cancel(state: &mut AppState) -> DispatchResult<Effect> {
    let Some(battle) = state.battle.as_mut() else {
        return DispatchResult::unchanged();
    };
    // Esc mirrors selecting BACK; it means nothing on the root menu.
    if battle.menu_open() && battle.menu.is_sub() {
        battle.menu.close_sub();
        return DispatchResult::changed();
    }
    DispatchResult::unchanged()
}

fn battle_confirm(state: &mut AppState) -> DispatchResult<Effect> {
    let Some(battle) = state.battle.as_mut() else {
        return DispatchResult::unchanged();
    };
    if !battle.menu_open() {
        return DispatchResult::unchanged();
    }

    if let Some(root) = battle.menu.selected_root() {
        return match root {
            RootAction::Run => {
                battle.message = "Got away safely!".to_string();
                battle.phase = BattlePhase::Closing {
                    outcome: BattleOutcome::Escape,
                    timer: ESCAPE_TICKS,
                };
                DispatchResult::changed()
            }
            RootAction::Fight => {
                let items = battle
                    .player
                    .attacks()
                    .iter()
                    .map(|attack| attack.name.to_string())
                    .collect();
                battle.menu.open_sub(RootAction::Fight, items);
                DispatchResult::changed()
            }
            RootAction::Swap => {
                let items = roster::ALLIES
                    .iter()
                    .filter(|spec| spec.name != battle.player.name)
                    .map(|spec| spec.name.to_string())
                    .collect();
                battle.menu.open_sub(RootAction::Swap, items);
                DispatchResult::changed()
            }
            RootAction::Items => {
                let items = roster::ITEMS
                    .iter()
                    .map(|spec| spec.name.to_string())
                    .collect();
                battle.menu.open_sub(RootAction::Items, items);
                DispatchResult::changed()
            }
        };
    }

    let Some((kind, label)) = battle.menu.selected_sub() else {
        return DispatchResult::unchanged();
    };
    let label = label.to_string();
    if label == crate::battle::BACK {
        battle.menu.close_sub();
        return DispatchResult::changed();
    }
    resolve_selection(battle, kind, &label)
}

/// Applies one sub-menu selection. Attacks hand the turn to the enemy;
/// swaps and items leave the menu open for another pick.
fn resolve_selection(
    battle: &mut BattleState,
    kind: RootAction,
    label: &str,
) -> DispatchResult<Effect> {
    match kind {
        RootAction::Swap => {
            let Some(spec) = roster::ally(label) else {
                return unknown_selection(battle, label);
            };
            // The health tracker carries over; only the fighter changes.
            battle.player.name = spec.name.to_string();
            battle.player.portrait = spec.portrait;
            battle.message = format!("{} joins the fight!", spec.name);
            battle.menu.close_sub();
            DispatchResult::changed()
        }
        RootAction::Items => {
            let Some(item) = roster::item(label) else {
                return unknown_selection(battle, label);
            };
            if item.applies_to.iter().any(|name| *name == battle.player.name) {
                battle.message = match item.message {
                    Some(text) => format!("{} {}", battle.player.name, text),
                    None => format!("Used {}!", item.name),
                };
                battle.flash(BattleSide::Player, Some(VisualEffect::Glow));
            } else {
                tracing::debug!(item = item.name, user = %battle.player.name, "item not applicable");
                battle.message = format!("It has no effect on {}.", battle.player.name);
            }
            battle.menu.close_sub();
            DispatchResult::changed()
        }
        RootAction::Fight => {
            let Some(attack) = battle
                .player
                .attacks()
                .iter()
                .find(|attack| attack.name == label)
                .copied()
            else {
                return unknown_selection(battle, label);
            };
            battle.menu.close_sub();
            battle.enemy.health.apply_damage(attack.points);
            battle.message = format!(
                "Used {}!\n{} took {} damage!",
                attack.name, battle.enemy.name, attack.points
            );
            battle.flash(BattleSide::Enemy, attack.effect);
            if battle.enemy.health.is_depleted() {
                battle.flash(BattleSide::Enemy, Some(VisualEffect::Dissolve));
                battle.phase = BattlePhase::Downed {
                    side: BattleSide::Enemy,
                    timer: DOWNED_TICKS,
                };
            } else {
                battle.phase = BattlePhase::EnemyTurn {
                    timer: ENEMY_TURN_TICKS,
                };
            }
            DispatchResult::changed_with(Effect::PlaySound(SoundCue::Attack))
        }
        RootAction::Run => unknown_selection(battle, label),
    }
}

fn unknown_selection(battle: &mut BattleState, label: &str) -> DispatchResult<Effect> {
    tracing::warn!(selection = label, "unmapped battle selection, ignoring");
    battle.menu.close_sub();
    DispatchResult::changed()
}

fn tick_battle(state: &mut AppState) -> DispatchResult<Effect> {
    let Some(phase) = state.battle.as_ref().map(|battle| battle.phase) else {
        return DispatchResult::unchanged();
    };
    let mut changed = state
        .battle
        .as_mut()
        .map(|battle| battle.tick_flashes())
        .unwrap_or(false);

    match phase {
        BattlePhase::Menu => {}
        BattlePhase::EnemyTurn { timer } => {
            changed = true;
            if timer > 1 {
                if let Some(battle) = state.battle.as_mut() {
                    battle.phase = BattlePhase::EnemyTurn { timer: timer - 1 };
                }
            } else {
                return enemy_turn(state);
            }
        }
        BattlePhase::PostTurn { timer } => {
            changed = true;
            if let Some(battle) = state.battle.as_mut() {
                if timer > 1 {
                    battle.phase = BattlePhase::PostTurn { timer: timer - 1 };
                } else {
                    battle.phase = BattlePhase::Menu;
                    battle.message = format!("What will {} do?", battle.player.name);
                }
            }
        }
        BattlePhase::Downed { side, timer } => {
            changed = true;
            if let Some(battle) = state.battle.as_mut() {
                if timer > 1 {
                    battle.phase = BattlePhase::Downed {
                        side,
                        timer: timer - 1,
                    };
                } else {
                    match side {
                        BattleSide::Enemy => {
                            battle.message = format!("{} has won!", battle.player.name);
                            battle.phase = BattlePhase::Closing {
                                outcome: BattleOutcome::Victory,
                                timer: CLOSE_TICKS,
                            };
                            return DispatchResult::changed_with(Effect::PlaySound(
                                SoundCue::Victory,
                            ));
                        }
                        BattleSide::Player => {
                            battle.message = format!("{} has won!", battle.enemy.name);
                            battle.phase = BattlePhase::Closing {
                                outcome: BattleOutcome::Defeat,
                                timer: CLOSE_TICKS,
                            };
                        }
                    }
                }
            }
        }
        BattlePhase::Closing { outcome, timer } => {
            changed = true;
            if timer > 1 {
                if let Some(battle) = state.battle.as_mut() {
                    battle.phase = BattlePhase::Closing {
                        outcome,
                        timer: timer - 1,
                    };
                }
            } else {
                return end_battle(state, outcome);
            }
        }
    }

    if changed {
        DispatchResult::changed()
    } else {
        DispatchResult::unchanged()
    }
}

/// The enemy's fixed policy: a uniform pick among its registered attacks.
fn enemy_turn(state: &mut AppState) -> DispatchResult<Effect> {
    let roll = next_rand(state) as usize;
    let Some(battle) = state.battle.as_mut() else {
        return DispatchResult::unchanged();
    };

    let attacks = battle.enemy.attacks();
    if attacks.is_empty() {
        tracing::warn!(enemy = %battle.enemy.name, "enemy has no registered attacks");
        battle.phase = BattlePhase::PostTurn {
            timer: POST_TURN_TICKS,
        };
        return DispatchResult::changed();
    }

    let attack = attacks[roll % attacks.len()];
    battle.player.health.apply_damage(attack.points);
    battle.message = format!(
        "{} used {}!\n{} took {} damage!",
        battle.enemy.name, attack.name, battle.player.name, attack.points
    );
    battle.flash(BattleSide::Player, attack.effect);

    if battle.player.health.is_depleted() {
        battle.phase = BattlePhase::Downed {
            side: BattleSide::Player,
            timer: DOWNED_TICKS,
        };
    } else {
        battle.phase = BattlePhase::PostTurn {
            timer: POST_TURN_TICKS,
        };
    }
    DispatchResult::changed_with(Effect::PlaySound(SoundCue::Attack))
}

fn end_battle(state: &mut AppState, outcome: BattleOutcome) -> DispatchResult<Effect> {
    state.battle = None;
    state.mode = GameMode::Overworld;
    state.encounter.battle_ended();
    state.message = Some(
        match outcome {
            BattleOutcome::Victory => "The gloom lifts. Back to the trail.",
            BattleOutcome::Escape => "Back on the trail.",
            BattleOutcome::Defeat => "You wake back on the trail, shaken.",
        }
        .to_string(),
    );
    DispatchResult::changed()
}

fn next_rand(state: &mut AppState) -> u32 {
    state.rng_seed = state
        .rng_seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1);
    (state.rng_seed >> 32) as u32
}
