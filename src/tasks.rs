//! Task ledger: complete, then claim.

use crate::catalog::{Catalog, TaskRequirement};
use crate::state::PlayerState;

/// Mark a task completed. Idempotent, pays nothing.
/// Returns true if the flag changed.
pub fn complete_task(state: &mut PlayerState, id: &str) -> bool {
    match state.tasks.iter_mut().find(|t| t.id == id) {
        Some(task) if !task.completed => {
            task.completed = true;
            true
        }
        _ => false,
    }
}

/// Pay a completed, unclaimed task's reward. Returns true if paid.
pub fn claim_task_reward(state: &mut PlayerState, id: &str) -> bool {
    let reward = match state.tasks.iter_mut().find(|t| t.id == id) {
        Some(task) if task.completed && !task.claimed => {
            task.claimed = true;
            task.reward
        }
        _ => return false,
    };
    state.credit(reward);
    log::debug!("task `{}` claimed (+{})", id, reward);
    true
}

/// Evaluate a live-stat requirement against the current state.
/// `External` requirements are never met here.
pub fn requirement_met(requirement: &TaskRequirement, state: &PlayerState) -> bool {
    match requirement {
        TaskRequirement::External => false,
        TaskRequirement::LevelAtLeast(level) => state.level_index >= *level,
        TaskRequirement::ReferralsAtLeast(count) => state.referrals.len() >= *count,
        TaskRequirement::ProfitPerHourAtLeast(pph) => state.profit_per_hour >= *pph,
    }
}

/// Complete every task whose stat requirement is now met.
/// Returns the ids that changed.
pub fn refresh_completion(state: &mut PlayerState, catalog: &Catalog) -> Vec<String> {
    let ready: Vec<String> = catalog
        .tasks
        .iter()
        .filter(|def| requirement_met(&def.requirement, state))
        .filter(|def| state.task(&def.id).map_or(false, |t| !t.completed))
        .map(|def| def.id.clone())
        .collect();
    for id in &ready {
        complete_task(state, id);
    }
    ready
}
