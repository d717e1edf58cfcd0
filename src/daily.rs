//! Daily bonuses: streak reward, cipher word and card combo.
//!
//! The three are independent. Each has its own claim rule and its own
//! `*_if_expired` transition, which the host may call on any cadence; calling
//! it again within the same period does nothing.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::EngineConfig;
use crate::state::{Challenge, CipherChallenge, ComboChallenge, DailyReward, PlayerState};
use crate::time::{Millis, DAY_MS, HOUR_MS, SECOND_MS};

/// Minimum gap between two streak claims.
pub const CLAIM_COOLDOWN_MS: Millis = DAY_MS;
/// A gap longer than this breaks the streak.
pub const STREAK_BREAK_MS: Millis = 2 * DAY_MS;

/// Build the cyclic reward schedule from per-day amounts.
pub fn reward_track(amounts: &[u64]) -> Vec<DailyReward> {
    amounts
        .iter()
        .enumerate()
        .map(|(i, &reward)| DailyReward {
            day: i as u32 + 1,
            reward,
            claimed: false,
        })
        .collect()
}

// ── Streak ──────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreakStatus {
    Claimable,
    AlreadyClaimedToday,
    /// Claimable, but the streak restarts from day 1.
    Broken,
}

pub fn streak_status(state: &PlayerState, now: Millis) -> StreakStatus {
    match state.last_streak_claim {
        None => StreakStatus::Claimable,
        Some(last) => {
            let gap = now.saturating_sub(last);
            if gap < CLAIM_COOLDOWN_MS {
                StreakStatus::AlreadyClaimedToday
            } else if gap > STREAK_BREAK_MS {
                StreakStatus::Broken
            } else {
                StreakStatus::Claimable
            }
        }
    }
}

/// Track slot the next claim would pay from.
pub fn next_reward_slot(state: &PlayerState, now: Millis) -> Option<usize> {
    if state.daily_rewards.is_empty() {
        return None;
    }
    let streak = match streak_status(state, now) {
        StreakStatus::Broken => 0,
        _ => state.current_streak,
    };
    Some(streak as usize % state.daily_rewards.len())
}

/// Claim today's streak reward. Returns true if paid.
pub fn claim_daily_reward(state: &mut PlayerState, now: Millis) -> bool {
    let status = streak_status(state, now);
    if status == StreakStatus::AlreadyClaimedToday || state.daily_rewards.is_empty() {
        return false;
    }
    if status == StreakStatus::Broken {
        restart_streak(state);
    }

    let slot = state.current_streak as usize % state.daily_rewards.len();
    let reward = state.daily_rewards[slot].reward;
    state.daily_rewards[slot].claimed = true;
    state.current_streak += 1;
    state.last_streak_claim = Some(now);
    state.credit(reward);

    log::debug!(
        "daily reward day {} claimed (+{}, streak {})",
        slot + 1,
        reward,
        state.current_streak
    );
    true
}

/// Zero the streak once it can no longer be continued. Returns true if reset.
pub fn reset_streak_if_expired(state: &mut PlayerState, now: Millis) -> bool {
    if state.current_streak > 0 && streak_status(state, now) == StreakStatus::Broken {
        restart_streak(state);
        true
    } else {
        false
    }
}

fn restart_streak(state: &mut PlayerState) {
    state.current_streak = 0;
    for slot in &mut state.daily_rewards {
        slot.claimed = false;
    }
}

// ── Reset periods ───────────────────────────────────────────────

/// Index of the reset period containing `now`; periods start each day at
/// `reset_hour_utc`.
pub fn reset_epoch(now: Millis, reset_hour_utc: u32) -> u64 {
    now.saturating_sub(reset_hour_utc as Millis * HOUR_MS) / DAY_MS
}

/// Time left until the next rollover, as `(hours, minutes)`.
pub fn time_until_reset(now: Millis, reset_hour_utc: u32) -> (u64, u64) {
    let next = (reset_epoch(now, reset_hour_utc) + 1) * DAY_MS + reset_hour_utc as Millis * HOUR_MS;
    let left = next.saturating_sub(now);
    (left / HOUR_MS, (left % HOUR_MS) / (60 * SECOND_MS))
}

fn is_expired(issued_at: Millis, now: Millis, reset_hour_utc: u32) -> bool {
    reset_epoch(now, reset_hour_utc) > reset_epoch(issued_at, reset_hour_utc)
}

// ── Cipher ──────────────────────────────────────────────────────

pub fn generate_cipher<R: Rng + ?Sized>(
    config: &EngineConfig,
    now: Millis,
    rng: &mut R,
) -> CipherChallenge {
    let word = config
        .catalog
        .cipher_words
        .choose(rng)
        .cloned()
        .unwrap_or_default();
    CipherChallenge {
        word,
        solved: false,
        reward: config.cipher_reward,
        issued_at: now,
    }
}

/// Case-insensitive guess. Pays once; any guess after solving is refused.
pub fn solve_cipher(state: &mut PlayerState, guess: &str) -> bool {
    let reward = match state.daily_cipher.active_mut() {
        Some(cipher) if !cipher.solved && guess.to_uppercase() == cipher.word.to_uppercase() => {
            cipher.solved = true;
            cipher.reward
        }
        _ => return false,
    };
    state.credit(reward);
    log::debug!("daily cipher solved (+{})", reward);
    true
}

/// Replace the cipher with a fresh, unsolved one.
pub fn reset_cipher<R: Rng + ?Sized>(
    state: &mut PlayerState,
    config: &EngineConfig,
    now: Millis,
    rng: &mut R,
) {
    state.daily_cipher = Challenge::Active(generate_cipher(config, now, rng));
}

/// Reset the cipher if none is active or its period has passed.
pub fn reset_cipher_if_expired<R: Rng + ?Sized>(
    state: &mut PlayerState,
    config: &EngineConfig,
    now: Millis,
    rng: &mut R,
) -> bool {
    let expired = match state.daily_cipher.active() {
        None => true,
        Some(c) => is_expired(c.issued_at, now, config.daily_reset_hour_utc),
    };
    if expired {
        reset_cipher(state, config, now, rng);
    }
    expired
}

// ── Combo ───────────────────────────────────────────────────────

pub fn generate_combo<R: Rng + ?Sized>(
    config: &EngineConfig,
    now: Millis,
    rng: &mut R,
) -> ComboChallenge {
    let cards = config
        .catalog
        .combo_sets
        .choose(rng)
        .cloned()
        .unwrap_or_default();
    ComboChallenge {
        cards,
        found: Vec::new(),
        solved: false,
        reward: config.combo_reward,
        issued_at: now,
    }
}

/// Record a discovered combo card. Pays the reward when the last card is found.
///
/// Refused when no combo is active, it is already solved, the card isn't in
/// the combo, or it was already found.
pub fn select_combo_card(state: &mut PlayerState, id: &str) -> bool {
    let combo = match state.daily_combo.active_mut() {
        Some(c) if !c.solved && c.contains(id) && !c.is_found(id) => c,
        _ => return false,
    };
    combo.found.push(id.to_string());
    if combo.found.len() < combo.cards.len() {
        log::debug!("combo card `{}` found ({}/{})", id, combo.found.len(), combo.cards.len());
        return true;
    }

    combo.solved = true;
    let reward = combo.reward;
    state.credit(reward);
    log::debug!("daily combo solved (+{})", reward);
    true
}

pub fn reset_combo<R: Rng + ?Sized>(
    state: &mut PlayerState,
    config: &EngineConfig,
    now: Millis,
    rng: &mut R,
) {
    state.daily_combo = Challenge::Active(generate_combo(config, now, rng));
}

pub fn reset_combo_if_expired<R: Rng + ?Sized>(
    state: &mut PlayerState,
    config: &EngineConfig,
    now: Millis,
    rng: &mut R,
) -> bool {
    let expired = match state.daily_combo.active() {
        None => true,
        Some(c) => is_expired(c.issued_at, now, config.daily_reset_hour_utc),
    };
    if expired {
        reset_combo(state, config, now, rng);
    }
    expired
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::state::test_support::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_combo_found_is_subset_without_duplicates(
            picks in proptest::collection::vec(0usize..6, 0..20),
        ) {
            let pool = ["ceo", "marketing", "it-team", "btc-pairs", "staking", "ux-team"];
            let (_, mut state) = fresh();
            state.daily_combo = Challenge::Active(ComboChallenge {
                cards: vec!["ceo".into(), "marketing".into(), "it-team".into()],
                found: Vec::new(),
                solved: false,
                reward: 5_000_000,
                issued_at: T0,
            });
            for i in picks {
                select_combo_card(&mut state, pool[i]);
            }
            let combo = state.daily_combo.active().unwrap();
            let mut found = combo.found.clone();
            found.sort();
            found.dedup();
            prop_assert_eq!(found.len(), combo.found.len());
            prop_assert!(combo.found.iter().all(|f| combo.contains(f)));
            prop_assert_eq!(combo.solved, combo.found.len() == 3);
            let expected = if combo.solved { 5_000_000 } else { 0 };
            prop_assert_eq!(state.points, expected);
        }

        #[test]
        fn prop_claims_within_a_day_pay_once(
            offsets in proptest::collection::vec(0u64..DAY_MS, 1..10),
        ) {
            let (_, mut state) = fresh();
            prop_assert!(claim_daily_reward(&mut state, T0));
            for off in offsets {
                prop_assert!(!claim_daily_reward(&mut state, T0 + off));
            }
            prop_assert_eq!(state.points, 500);
        }
    }
}
