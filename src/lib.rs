//! Bramble - a trail-and-thicket adventure TUI.
//!
//! This library exposes the game's modules for testing.

pub mod action;
pub mod battle;
pub mod companion;
pub mod effect;
pub mod encounter;
pub mod health;
pub mod map;
pub mod reducer;
pub mod roster;
pub mod state;
pub mod ui;
