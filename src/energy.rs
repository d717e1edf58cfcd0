//! Tap energy: a bounded pool that regenerates over time and is spent by taps.

use crate::state::PlayerState;
use crate::time::{Millis, SECOND_MS};

/// Regenerate energy for the time elapsed since the last update.
///
/// The timestamp only moves when at least one whole unit was recovered, so a
/// caller polling faster than the recovery rate doesn't lose the partial
/// progress. Returns the energy actually added (0 when already full).
pub fn recover_energy(state: &mut PlayerState, now: Millis) -> u64 {
    if now <= state.last_energy_update {
        return 0;
    }
    let elapsed_secs = (now - state.last_energy_update) as f64 / SECOND_MS as f64;
    let recovered = (elapsed_secs * state.energy_recovery_per_second).floor();
    if recovered < 1.0 {
        return 0;
    }

    let before = state.energy;
    state.energy = state
        .energy
        .saturating_add(recovered as u64)
        .min(state.max_energy)
        .max(before);
    state.last_energy_update = now;
    state.energy - before
}

/// Spend up to `taps` energy units, earning `points_per_tap` for each one.
///
/// Never spends more energy than is available. Returns the number of units
/// consumed; 0 means nothing happened.
pub fn tap(state: &mut PlayerState, taps: u64) -> u64 {
    let consumed = taps.min(state.energy);
    if consumed == 0 {
        return 0;
    }
    state.credit(consumed.saturating_mul(state.points_per_tap));
    state.energy -= consumed;
    consumed
}
