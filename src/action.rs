use serde::{Deserialize, Serialize};

use crate::state::Direction;

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,
    UiTerminalResize(u16, u16),
    Tick,
    Move(Direction),

    // Battle actions
    BattleMenuNext,
    BattleMenuPrev,
    BattleConfirm,
    BattleCancel,

    // Main menu actions
    MenuSelect(usize),
    MenuConfirm,

    Quit,
}
