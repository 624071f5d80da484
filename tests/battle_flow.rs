//! Battle interaction tests: menu navigation, turn resolution, and the
//! timed phases between player action and enemy counter.

use pretty_assertions::assert_eq;
use tui_dispatch::EffectStore;

use bramble::action::Action;
use bramble::battle::{
    BattleOutcome, BattlePhase, BattleSide, BattleState, MenuLevel, RootAction, CLOSE_TICKS,
    DOWNED_TICKS, ENEMY_TURN_TICKS, ESCAPE_TICKS, POST_TURN_TICKS,
};
use bramble::effect::{Effect, SoundCue};
use bramble::reducer::reducer;
use bramble::roster;
use bramble::state::{AppState, GameMode};

fn tick_n(state: &mut AppState, n: u16) {
    for _ in 0..n {
        let _ = reducer(state, Action::Tick);
    }
}

/// Overworld state with the expedition started.
fn trail_state() -> AppState {
    let mut state = AppState::new();
    state.rng_seed = 7;
    let result = reducer(&mut state, Action::MenuConfirm);
    assert!(result.changed);
    assert_eq!(state.mode, GameMode::Overworld);
    state
}

/// Drops straight into a battle against the first registered enemy.
fn battle_state() -> AppState {
    let mut state = trail_state();
    state.battle = Some(BattleState::new(&roster::ALLIES[0], &roster::ENEMIES[0]));
    state.mode = GameMode::Battle;
    state
}

fn battle(state: &AppState) -> &BattleState {
    state.battle.as_ref().expect("battle is active")
}

#[test]
fn store_dispatch_starts_expedition() {
    let mut store = EffectStore::new(AppState::new(), reducer);
    let result = store.dispatch(Action::MenuConfirm);
    assert!(result.changed);
    assert_eq!(store.state().mode, GameMode::Overworld);
    assert!(store.state().menu.is_none());
}

#[test]
fn root_menu_wraps_upward_to_run() {
    let mut state = battle_state();
    assert_eq!(battle(&state).menu.selected, 0);
    let result = reducer(&mut state, Action::BattleMenuPrev);
    assert!(result.changed);
    assert_eq!(battle(&state).menu.selected, 3);
    assert_eq!(battle(&state).menu.selected_root(), Some(RootAction::Run));
}

#[test]
fn fight_opens_attack_submenu_with_back() {
    let mut state = battle_state();
    reducer(&mut state, Action::BattleConfirm);
    let menu = &battle(&state).menu;
    match &menu.level {
        MenuLevel::Sub { kind, items } => {
            assert_eq!(*kind, RootAction::Fight);
            assert_eq!(
                items,
                &vec![
                    "Swift Peck".to_string(),
                    "Wing Slash".to_string(),
                    "Gale Burst".to_string(),
                    "BACK".to_string(),
                ]
            );
        }
        MenuLevel::Root => panic!("expected sub-menu"),
    }
    assert_eq!(menu.selected, 0);
}

#[test]
fn back_returns_to_root_at_index_zero() {
    let mut state = battle_state();
    reducer(&mut state, Action::BattleConfirm);
    // Walk down to BACK (last entry) and confirm.
    for _ in 0..3 {
        reducer(&mut state, Action::BattleMenuNext);
    }
    reducer(&mut state, Action::BattleConfirm);
    assert_eq!(battle(&state).menu.level, MenuLevel::Root);
    assert_eq!(battle(&state).menu.selected, 0);
    assert_eq!(battle(&state).phase, BattlePhase::Menu);
}

#[test]
fn cancel_mirrors_back() {
    let mut state = battle_state();
    reducer(&mut state, Action::BattleConfirm);
    reducer(&mut state, Action::BattleMenuNext);
    let result = reducer(&mut state, Action::BattleCancel);
    assert!(result.changed);
    assert_eq!(battle(&state).menu.level, MenuLevel::Root);
    assert_eq!(battle(&state).menu.selected, 0);
    // Cancel on the root menu is a no-op.
    assert!(!reducer(&mut state, Action::BattleCancel).changed);
}

#[test]
fn attack_schedules_exactly_one_counter_turn() {
    let mut state = battle_state();
    reducer(&mut state, Action::BattleConfirm);
    // Wing Slash, 20 points.
    reducer(&mut state, Action::BattleMenuNext);
    let result = reducer(&mut state, Action::BattleConfirm);
    assert_eq!(result.effects, vec![Effect::PlaySound(SoundCue::Attack)]);

    assert_eq!(battle(&state).enemy.health.current(), 80);
    assert_eq!(
        battle(&state).phase,
        BattlePhase::EnemyTurn {
            timer: ENEMY_TURN_TICKS
        }
    );

    // The counter lands only once the delay elapses.
    tick_n(&mut state, ENEMY_TURN_TICKS - 1);
    assert_eq!(battle(&state).player.health.current(), 100);
    tick_n(&mut state, 1);
    let player_hp = battle(&state).player.health.current();
    assert!(
        (80..=90).contains(&player_hp),
        "counter damage out of range: {player_hp}"
    );
    assert_eq!(
        battle(&state).phase,
        BattlePhase::PostTurn {
            timer: POST_TURN_TICKS
        }
    );

    // Menu reopens after the pause; no further damage arrives.
    tick_n(&mut state, POST_TURN_TICKS);
    assert_eq!(battle(&state).phase, BattlePhase::Menu);
    assert_eq!(battle(&state).message, "What will WREN do?");
    tick_n(&mut state, 20);
    assert_eq!(battle(&state).player.health.current(), player_hp);
}

#[test]
fn menu_input_is_ignored_while_counter_pending() {
    let mut state = battle_state();
    reducer(&mut state, Action::BattleConfirm);
    reducer(&mut state, Action::BattleConfirm); // Swift Peck
    assert!(matches!(
        battle(&state).phase,
        BattlePhase::EnemyTurn { .. }
    ));

    let enemy_hp = battle(&state).enemy.health.current();
    assert!(!reducer(&mut state, Action::BattleConfirm).changed);
    assert!(!reducer(&mut state, Action::BattleMenuNext).changed);
    assert_eq!(battle(&state).enemy.health.current(), enemy_hp);
}

#[test]
fn lethal_attack_resolves_to_victory_without_counter() {
    let mut state = battle_state();
    state
        .battle
        .as_mut()
        .unwrap()
        .enemy
        .health
        .update(20);

    reducer(&mut state, Action::BattleConfirm);
    // Gale Burst, 30 points.
    reducer(&mut state, Action::BattleMenuNext);
    reducer(&mut state, Action::BattleMenuNext);
    reducer(&mut state, Action::BattleConfirm);

    assert_eq!(battle(&state).enemy.health.current(), 0);
    assert_eq!(
        battle(&state).phase,
        BattlePhase::Downed {
            side: BattleSide::Enemy,
            timer: DOWNED_TICKS
        }
    );

    tick_n(&mut state, DOWNED_TICKS);
    assert_eq!(battle(&state).message, "WREN has won!");
    assert!(matches!(
        battle(&state).phase,
        BattlePhase::Closing {
            outcome: BattleOutcome::Victory,
            ..
        }
    ));

    tick_n(&mut state, CLOSE_TICKS);
    assert_eq!(state.mode, GameMode::Overworld);
    assert!(state.battle.is_none());
    // The enemy never got a counter-turn in.
    // (The player walked out at full health.)
    assert!(!state.encounter.can_enter_battle);
}

#[test]
fn enemy_counter_can_end_the_battle_in_defeat() {
    let mut state = battle_state();
    state.battle.as_mut().unwrap().player.health.update(5);

    reducer(&mut state, Action::BattleConfirm);
    reducer(&mut state, Action::BattleConfirm); // Swift Peck, enemy survives
    tick_n(&mut state, ENEMY_TURN_TICKS);

    assert_eq!(battle(&state).player.health.current(), 0);
    assert_eq!(
        battle(&state).phase,
        BattlePhase::Downed {
            side: BattleSide::Player,
            timer: DOWNED_TICKS
        }
    );

    tick_n(&mut state, DOWNED_TICKS);
    assert_eq!(battle(&state).message, "THORN SHADE has won!");
    tick_n(&mut state, CLOSE_TICKS);
    assert_eq!(state.mode, GameMode::Overworld);
}

#[test]
fn run_escapes_without_damage() {
    let mut state = battle_state();
    reducer(&mut state, Action::BattleMenuPrev); // wrap to RUN
    let result = reducer(&mut state, Action::BattleConfirm);
    assert!(result.changed);
    assert_eq!(battle(&state).message, "Got away safely!");
    assert!(matches!(
        battle(&state).phase,
        BattlePhase::Closing {
            outcome: BattleOutcome::Escape,
            ..
        }
    ));

    tick_n(&mut state, ESCAPE_TICKS);
    assert_eq!(state.mode, GameMode::Overworld);
    assert!(state.battle.is_none());
}

#[test]
fn swap_keeps_health_and_consumes_no_turn() {
    let mut state = battle_state();
    state.battle.as_mut().unwrap().player.health.update(60);

    reducer(&mut state, Action::BattleMenuNext); // SWAP
    reducer(&mut state, Action::BattleConfirm);
    match &battle(&state).menu.level {
        MenuLevel::Sub { kind, items } => {
            assert_eq!(*kind, RootAction::Swap);
            assert_eq!(items, &vec!["MOSS".to_string(), "BACK".to_string()]);
        }
        MenuLevel::Root => panic!("expected sub-menu"),
    }

    reducer(&mut state, Action::BattleConfirm);
    assert_eq!(battle(&state).player.name, "MOSS");
    assert_eq!(battle(&state).player.health.current(), 60);
    assert_eq!(battle(&state).message, "MOSS joins the fight!");
    assert_eq!(battle(&state).phase, BattlePhase::Menu);
    assert_eq!(battle(&state).menu.level, MenuLevel::Root);
}

#[test]
fn swapped_fighter_uses_its_own_attack_set() {
    let mut state = battle_state();
    reducer(&mut state, Action::BattleMenuNext); // SWAP
    reducer(&mut state, Action::BattleConfirm);
    reducer(&mut state, Action::BattleConfirm); // MOSS

    reducer(&mut state, Action::BattleConfirm); // FIGHT
    match &battle(&state).menu.level {
        MenuLevel::Sub { items, .. } => {
            assert_eq!(items[0], "Stone Fist");
        }
        MenuLevel::Root => panic!("expected sub-menu"),
    }
}

#[test]
fn applicable_item_glows_and_consumes_no_turn() {
    let mut state = battle_state();
    for _ in 0..2 {
        reducer(&mut state, Action::BattleMenuNext); // ITEMS
    }
    reducer(&mut state, Action::BattleConfirm);
    reducer(&mut state, Action::BattleConfirm); // FERN TONIC on WREN

    assert_eq!(battle(&state).message, "WREN feels refreshed!");
    assert_eq!(battle(&state).phase, BattlePhase::Menu);
    assert!(battle(&state).active_flash(BattleSide::Player).is_some());
    assert_eq!(battle(&state).enemy.health.current(), 100);
}

#[test]
fn inapplicable_item_reports_no_effect() {
    let mut state = battle_state();
    for _ in 0..2 {
        reducer(&mut state, Action::BattleMenuNext); // ITEMS
    }
    reducer(&mut state, Action::BattleConfirm);
    for _ in 0..2 {
        reducer(&mut state, Action::BattleMenuNext); // OLD WHISTLE
    }
    reducer(&mut state, Action::BattleConfirm);

    assert_eq!(battle(&state).message, "It has no effect on WREN.");
    assert_eq!(battle(&state).phase, BattlePhase::Menu);
    assert!(battle(&state).active_flash(BattleSide::Player).is_none());
}
