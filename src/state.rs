//! Player state definitions.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{Category, Prerequisite, TaskDef, TaskKind, UpgradeDef};
use crate::config::EngineConfig;
use crate::daily;
use crate::economy::{self, AirdropInputs};
use crate::referrals;
use crate::time::Millis;

/// An upgrade card: catalog fields plus the owned level.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeCard {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub base_price: u64,
    pub base_profit_per_hour: u64,
    pub max_level: u32,
    pub requires: Option<Prerequisite>,
    /// 0..=max_level
    pub level: u32,
}

impl UpgradeCard {
    pub fn from_def(def: &UpgradeDef) -> Self {
        Self {
            id: def.id.clone(),
            name: def.name.clone(),
            category: def.category,
            base_price: def.base_price,
            base_profit_per_hour: def.base_profit_per_hour,
            max_level: def.max_level,
            requires: def.requires.clone(),
            level: 0,
        }
    }

    /// Price of the next level.
    pub fn price(&self) -> u64 {
        economy::price_at_level(self.base_price, self.level)
    }

    /// Profit per hour the next level would add.
    pub fn next_profit(&self) -> u64 {
        economy::profit_at_level(self.base_profit_per_hour, self.level)
    }

    /// Profit per hour from all owned levels.
    pub fn total_profit(&self) -> u64 {
        economy::total_profit_for_level(self.base_profit_per_hour, self.level)
    }

    pub fn is_maxed(&self) -> bool {
        self.level >= self.max_level
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub reward: u64,
    pub kind: TaskKind,
    pub link: Option<String>,
    pub completed: bool,
    /// Implies `completed`.
    pub claimed: bool,
}

impl Task {
    pub fn from_def(def: &TaskDef) -> Self {
        Self {
            id: def.id.clone(),
            title: def.title.clone(),
            reward: def.reward,
            kind: def.kind,
            link: def.link.clone(),
            completed: false,
            claimed: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    pub id: String,
    pub name: String,
    pub joined_at: Millis,
}

/// One day-slot of the cyclic reward track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyReward {
    /// 1-based day number.
    pub day: u32,
    pub reward: u64,
    /// Cosmetic; the streak decides what can be claimed.
    pub claimed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CipherChallenge {
    pub word: String,
    pub solved: bool,
    pub reward: u64,
    pub issued_at: Millis,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComboChallenge {
    pub cards: Vec<String>,
    /// Discovery order; no duplicates, always a subset of `cards`.
    pub found: Vec<String>,
    pub solved: bool,
    pub reward: u64,
    pub issued_at: Millis,
}

impl ComboChallenge {
    pub fn contains(&self, id: &str) -> bool {
        self.cards.iter().any(|c| c == id)
    }

    pub fn is_found(&self, id: &str) -> bool {
        self.found.iter().any(|c| c == id)
    }
}

/// A daily challenge slot: either nothing is running or one challenge is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "challenge", rename_all = "snake_case")]
pub enum Challenge<T> {
    NotActive,
    Active(T),
}

impl<T> Default for Challenge<T> {
    fn default() -> Self {
        Challenge::NotActive
    }
}

impl<T> Challenge<T> {
    pub fn active(&self) -> Option<&T> {
        match self {
            Challenge::Active(c) => Some(c),
            Challenge::NotActive => None,
        }
    }

    pub fn active_mut(&mut self) -> Option<&mut T> {
        match self {
            Challenge::Active(c) => Some(c),
            Challenge::NotActive => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Challenge::Active(_))
    }
}

/// Full state of one player.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    pub external_id: String,
    pub display_name: String,

    /// Spendable currency.
    pub points: u64,
    /// Lifetime earnings; never decreases.
    pub total_earned: u64,
    /// Derived from `points` by `recompute_derived`.
    pub level_index: usize,

    pub points_per_tap: u64,
    pub energy: u64,
    pub max_energy: u64,
    pub energy_recovery_per_second: f64,
    pub last_energy_update: Millis,

    /// Derived: base rate plus every card's contribution.
    pub profit_per_hour: u64,
    pub last_profit_update: Millis,

    pub upgrades: Vec<UpgradeCard>,
    pub tasks: Vec<Task>,
    pub referrals: Vec<Referral>,
    pub referral_code: String,
    pub referral_bonus: u64,

    pub daily_rewards: Vec<DailyReward>,
    pub current_streak: u32,
    pub last_streak_claim: Option<Millis>,
    pub daily_cipher: Challenge<CipherChallenge>,
    pub daily_combo: Challenge<ComboChallenge>,

    pub vibration_enabled: bool,
    pub sound_enabled: bool,
}

impl PlayerState {
    /// Fresh state at `now`, with newly drawn referral code, cipher and combo.
    pub fn new<R: Rng + ?Sized>(config: &EngineConfig, now: Millis, rng: &mut R) -> Self {
        let mut state = Self::blank(config, now);
        state.referral_code = referrals::generate_referral_code(rng);
        state.daily_cipher = Challenge::Active(daily::generate_cipher(config, now, rng));
        state.daily_combo = Challenge::Active(daily::generate_combo(config, now, rng));
        state
    }

    /// Default state without any random draws: no active challenges and no
    /// referral code. Save data is applied on top of this.
    pub fn blank(config: &EngineConfig, now: Millis) -> Self {
        let catalog = &config.catalog;
        let mut state = Self {
            external_id: String::new(),
            display_name: config.placeholder_name.clone(),
            points: config.initial_points,
            total_earned: config.initial_points,
            level_index: 0,
            points_per_tap: config.points_per_tap,
            energy: config.initial_energy.min(config.max_energy),
            max_energy: config.max_energy,
            energy_recovery_per_second: config.energy_recovery_per_second,
            last_energy_update: now,
            profit_per_hour: config.initial_profit_per_hour,
            last_profit_update: now,
            upgrades: catalog.upgrades.iter().map(UpgradeCard::from_def).collect(),
            tasks: catalog.tasks.iter().map(Task::from_def).collect(),
            referrals: Vec::new(),
            referral_code: String::new(),
            referral_bonus: config.referral_bonus,
            daily_rewards: daily::reward_track(&catalog.reward_track),
            current_streak: 0,
            last_streak_claim: None,
            daily_cipher: Challenge::NotActive,
            daily_combo: Challenge::NotActive,
            vibration_enabled: true,
            sound_enabled: true,
        };
        recompute_derived(
            &mut state,
            &catalog.level_thresholds(),
            config.initial_profit_per_hour,
        );
        state
    }

    pub fn upgrade(&self, id: &str) -> Option<&UpgradeCard> {
        self.upgrades.iter().find(|u| u.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Add earned points to both the balance and the lifetime total.
    pub fn credit(&mut self, amount: u64) {
        self.points = self.points.saturating_add(amount);
        self.total_earned = self.total_earned.saturating_add(amount);
    }

    pub fn total_upgrade_levels(&self) -> u64 {
        self.upgrades.iter().map(|u| u.level as u64).sum()
    }

    pub fn airdrop_inputs(&self) -> AirdropInputs {
        AirdropInputs {
            total_earned: self.total_earned,
            level_index: self.level_index,
            profit_per_hour: self.profit_per_hour,
            referral_count: self.referrals.len(),
            total_upgrade_levels: self.total_upgrade_levels(),
        }
    }
}

/// Bring `level_index` and `profit_per_hour` in line with `points` and the
/// owned upgrade levels. Fields are only written when they differ; returns
/// whether anything changed.
pub fn recompute_derived(state: &mut PlayerState, thresholds: &[u64], base_profit: u64) -> bool {
    let mut changed = false;

    let level = economy::level_from_points(state.points, thresholds);
    if level != state.level_index {
        state.level_index = level;
        changed = true;
    }

    let profit = state
        .upgrades
        .iter()
        .map(UpgradeCard::total_profit)
        .fold(base_profit, u64::saturating_add);
    if profit != state.profit_per_hour {
        state.profit_per_hour = profit;
        changed = true;
    }

    changed
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn new_state_uses_config_defaults() {
        let (config, state) = fresh();
        assert_eq!(state.points, 0);
        assert_eq!(state.energy, 1_000);
        assert_eq!(state.max_energy, 1_000);
        assert_eq!(state.display_name, "CEO");
        assert_eq!(state.upgrades.len(), config.catalog.upgrades.len());
        assert_eq!(state.tasks.len(), config.catalog.tasks.len());
        assert_eq!(state.daily_rewards.len(), 10);
        assert_eq!(state.referral_code.len(), 8);
        assert!(state.daily_cipher.is_active());
        assert!(state.daily_combo.is_active());
        assert_eq!(state.last_energy_update, T0);
    }

    #[test]
    fn blank_state_has_no_challenges() {
        let state = PlayerState::blank(&EngineConfig::default(), T0);
        assert_eq!(state.daily_cipher, Challenge::NotActive);
        assert_eq!(state.daily_combo, Challenge::NotActive);
        assert!(state.referral_code.is_empty());
    }

    #[test]
    fn initial_energy_clamped_to_max() {
        let mut config = EngineConfig::default();
        config.initial_energy = 5_000;
        config.max_energy = 100;
        let state = PlayerState::blank(&config, T0);
        assert_eq!(state.energy, 100);
    }

    #[test]
    fn card_price_and_profit_follow_level() {
        let (_, mut state) = fresh();
        let card = &mut state.upgrades[0];
        card.base_price = 100;
        card.base_profit_per_hour = 50;
        assert_eq!(card.price(), 100);
        assert_eq!(card.next_profit(), 50);
        card.level = 2;
        assert_eq!(card.price(), 225);
        assert_eq!(card.total_profit(), 110);
    }

    #[test]
    fn recompute_level_thresholds() {
        let (_, mut state) = fresh();
        let t = [0, 5_000, 25_000];
        state.points = 24_999;
        assert!(recompute_derived(&mut state, &t, 0));
        assert_eq!(state.level_index, 1);
        state.points = 25_000;
        recompute_derived(&mut state, &t, 0);
        assert_eq!(state.level_index, 2);
    }

    #[test]
    fn recompute_reports_no_change_when_stable() {
        let (_, mut state) = fresh();
        let t = [0, 5_000];
        recompute_derived(&mut state, &t, 0);
        assert!(!recompute_derived(&mut state, &t, 0));
    }

    #[test]
    fn recompute_sums_card_profit() {
        let (_, mut state) = fresh();
        state.upgrades[0].base_profit_per_hour = 50;
        state.upgrades[0].level = 2;
        state.upgrades[1].base_profit_per_hour = 10;
        state.upgrades[1].level = 1;
        recompute_derived(&mut state, &[0], 7);
        assert_eq!(state.profit_per_hour, 7 + 110 + 10);
    }

    #[test]
    fn credit_updates_both_totals() {
        let (_, mut state) = fresh();
        state.credit(500);
        assert_eq!(state.points, 500);
        assert_eq!(state.total_earned, 500);
        state.points = u64::MAX - 1;
        state.credit(10);
        assert_eq!(state.points, u64::MAX);
    }

    #[test]
    fn challenge_accessors() {
        let mut c: Challenge<u32> = Challenge::Active(3);
        assert_eq!(c.active(), Some(&3));
        if let Some(v) = c.active_mut() {
            *v = 4;
        }
        assert_eq!(c, Challenge::Active(4));
        assert!(!Challenge::<u32>::NotActive.is_active());
    }
}
