//! Fitness RPG WASM Module
//!
//! Browser bindings for the progression and nutrition-progress engines, so a
//! UI can render levels and macro bars without a round trip to storage.

use fitness_rpg_shared::aggregation::MacroProgress;
use fitness_rpg_shared::progression;
use wasm_bindgen::prelude::*;

/// Level (0-5) reached after `workouts` completed workouts
#[wasm_bindgen]
pub fn level_for_workouts(workouts: u32) -> u8 {
    progression::level_for(workouts)
}

/// Display name of a level; unknown levels map to the terminal name
#[wasm_bindgen]
pub fn level_name(level: u8) -> String {
    progression::level_name(level).to_string()
}

/// Level XP for a workout count (50 per workout)
#[wasm_bindgen]
pub fn xp_for_workouts(workouts: u32) -> u64 {
    progression::xp_for(workouts)
}

/// Whether going from `old_count` to `new_count` workouts crosses a level
#[wasm_bindgen]
pub fn is_level_up(old_count: u32, new_count: u32) -> bool {
    progression::detect_level_up(old_count, new_count).leveled_up
}

/// Progress bar fill in [0, 1]; a zero goal gives 0
#[wasm_bindgen]
pub fn macro_progress(total: f64, goal: f64) -> f64 {
    MacroProgress::new(total, goal).progress
}

/// Goal minus total; negative means over the goal
#[wasm_bindgen]
pub fn macro_remaining(total: f64, goal: f64) -> f64 {
    MacroProgress::new(total, goal).remaining
}
