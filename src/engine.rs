//! The game engine: owns one `PlayerState` and runs every transition on it.
//!
//! Each mutating method follows the same path: apply the pure transition,
//! bring derived fields up to date, then (if anything changed) notify
//! subscribers and write a save. Gameplay never sees a storage error; load
//! failures fall back to a fresh state and save failures are only logged.

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::accrual;
use crate::catalog::Catalog;
use crate::config::{ConfigError, EngineConfig};
use crate::daily::{self, StreakStatus};
use crate::economy;
use crate::energy;
use crate::host::{HostBridge, NoopHost};
use crate::referrals;
use crate::save::{self, NullStore, StateStore, StoreError};
use crate::state::{recompute_derived, PlayerState};
use crate::tasks;
use crate::time::{Cadence, Clock, Millis, SystemClock};
use crate::upgrades::{self, PurchaseRefusal};

pub type SubscriptionId = u64;

type Observer = Box<dyn FnMut(&PlayerState)>;

pub struct EngineBuilder {
    config: EngineConfig,
    clock: Box<dyn Clock>,
    store: Box<dyn StateStore>,
    host: Box<dyn HostBridge>,
    seed: Option<u64>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            clock: Box::new(SystemClock),
            store: Box::new(NullStore),
            host: Box::new(NoopHost),
            seed: None,
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn store(mut self, store: impl StateStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    pub fn host(mut self, host: impl HostBridge + 'static) -> Self {
        self.host = Box::new(host);
        self
    }

    /// Fixed RNG seed, for reproducible draws.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the config and hydrate from the store (once).
    pub fn build(self) -> Result<Engine, ConfigError> {
        self.config.validate()?;

        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => entropy_rng(),
        };
        let now = self.clock.now_ms();

        let mut state = match save::load_state(self.store.as_ref(), &self.config, now) {
            Ok(Some(state)) => {
                log::info!("save data loaded");
                state
            }
            Ok(None) => {
                log::info!("no save data, starting fresh");
                PlayerState::new(&self.config, now, &mut rng)
            }
            Err(e) => {
                log::warn!("discarding save data: {}", e);
                PlayerState::new(&self.config, now, &mut rng)
            }
        };
        if state.referral_code.is_empty() {
            state.referral_code = referrals::generate_referral_code(&mut rng);
        }

        Ok(Engine {
            thresholds: self.config.catalog.level_thresholds(),
            autosave: Cadence::new(self.config.autosave_interval_ms),
            config: self.config,
            clock: self.clock,
            store: self.store,
            host: self.host,
            rng,
            state,
            observers: Vec::new(),
            next_subscription: 0,
        })
    }
}

#[cfg(target_arch = "wasm32")]
fn entropy_rng() -> SmallRng {
    SmallRng::seed_from_u64((js_sys::Math::random() * u64::MAX as f64) as u64)
}

#[cfg(not(target_arch = "wasm32"))]
fn entropy_rng() -> SmallRng {
    SmallRng::from_entropy()
}

pub struct Engine {
    config: EngineConfig,
    thresholds: Vec<u64>,
    clock: Box<dyn Clock>,
    store: Box<dyn StateStore>,
    host: Box<dyn HostBridge>,
    rng: SmallRng,
    state: PlayerState,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: SubscriptionId,
    autosave: Cadence,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    // ── Read-only ───────────────────────────────────────────────

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.config.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> Millis {
        self.clock.now_ms()
    }

    pub fn price_of(&self, id: &str) -> Option<u64> {
        self.state.upgrade(id).map(|u| u.price())
    }

    pub fn next_profit_of(&self, id: &str) -> Option<u64> {
        self.state.upgrade(id).map(|u| u.next_profit())
    }

    pub fn can_purchase(&self, id: &str) -> bool {
        upgrades::can_purchase(&self.state, id)
    }

    /// Points earned from referral bonuses so far.
    pub fn referral_earnings(&self) -> u64 {
        referrals::referral_earnings(&self.state)
    }

    /// `None` when the card can be bought right now.
    pub fn purchase_refusal(&self, id: &str) -> Option<PurchaseRefusal> {
        upgrades::check_purchase(&self.state, id).err()
    }

    pub fn level_name(&self) -> &str {
        self.config.catalog.level_name(self.state.level_index)
    }

    /// Points needed for the next level; `None` at the top.
    pub fn next_level_threshold(&self) -> Option<u64> {
        self.thresholds.get(self.state.level_index + 1).copied()
    }

    pub fn airdrop_score(&self) -> u32 {
        economy::airdrop_score(&self.state.airdrop_inputs())
    }

    pub fn estimated_airdrop_tokens(&self) -> u64 {
        economy::estimated_airdrop_tokens(self.airdrop_score())
    }

    pub fn invite_link(&self) -> String {
        referrals::invite_link(&self.config.invite_base_url, &self.state.referral_code)
    }

    /// `(hours, minutes)` until the next daily rollover.
    pub fn daily_reset_in(&self) -> (u64, u64) {
        daily::time_until_reset(self.clock.now_ms(), self.config.daily_reset_hour_utc)
    }

    pub fn streak_status(&self) -> StreakStatus {
        daily::streak_status(&self.state, self.clock.now_ms())
    }

    // ── Observers ───────────────────────────────────────────────

    /// Call `f` with the new state after every change.
    pub fn subscribe<F>(&mut self, f: F) -> SubscriptionId
    where
        F: FnMut(&PlayerState) + 'static,
    {
        self.next_subscription += 1;
        let id = self.next_subscription;
        self.observers.push((id, Box::new(f)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    // ── Session ─────────────────────────────────────────────────

    /// Settle everything that happened while the app was closed.
    /// Call once after `build`.
    pub fn start_session(&mut self) -> bool {
        let now = self.clock.now_ms();
        let mut changed = false;

        match self.host.identity() {
            Some(id) => {
                changed |= self.apply_user_info(&id.display_name, &id.external_id);
            }
            None if self.state.external_id.is_empty() => {
                let placeholder = self.config.placeholder_name.clone();
                changed |= self.apply_user_info(&placeholder, "");
            }
            None => {}
        }

        let recovered = energy::recover_energy(&mut self.state, now);
        let earned = accrual::collect_passive_income(&mut self.state, now);
        changed |= recovered > 0 || earned > 0;
        changed |= self.reset_expired_at(now);
        self.autosave.update(now);

        log::info!(
            "session started (offline: +{} energy, +{} points)",
            recovered,
            earned
        );
        self.commit(changed)
    }

    /// Host timer entry point. Recovers energy, collects passive income and
    /// rolls daily challenges; saves on the autosave cadence regardless.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now_ms();
        let mut changed = energy::recover_energy(&mut self.state, now) > 0;
        changed |= accrual::collect_passive_income(&mut self.state, now) > 0;
        changed |= self.reset_expired_at(now);

        let changed = self.commit(changed);
        if self.autosave.update(now) > 0 && !changed {
            self.persist();
        }
        changed
    }

    /// Write the current state now.
    pub fn flush(&self) -> Result<(), StoreError> {
        save::save_state(self.store.as_ref(), &self.state)
    }

    // ── Energy & accrual ────────────────────────────────────────

    /// Returns the energy units spent.
    pub fn tap(&mut self, taps: u64) -> u64 {
        let consumed = energy::tap(&mut self.state, taps);
        if consumed > 0 && self.state.vibration_enabled {
            self.host.haptic_pulse();
        }
        self.commit(consumed > 0);
        consumed
    }

    /// Returns the energy recovered.
    pub fn recover_energy(&mut self) -> u64 {
        let recovered = energy::recover_energy(&mut self.state, self.clock.now_ms());
        self.commit(recovered > 0);
        recovered
    }

    /// Returns the points earned.
    pub fn collect_passive_income(&mut self) -> u64 {
        let earned = accrual::collect_passive_income(&mut self.state, self.clock.now_ms());
        self.commit(earned > 0);
        earned
    }

    // ── Upgrades ────────────────────────────────────────────────

    /// Buy one level of `id`. A matching card of the active daily combo is
    /// marked found. A refused purchase leaves the state untouched.
    pub fn purchase_upgrade(&mut self, id: &str) -> bool {
        if let Err(refusal) = upgrades::check_purchase(&self.state, id) {
            log::debug!("purchase of `{}` refused: {:?}", id, refusal);
            return false;
        }
        // Settling only adds points, so the check above still holds.
        accrual::settle_before_rate_change(&mut self.state, self.clock.now_ms());
        if !upgrades::purchase_upgrade(&mut self.state, id) {
            self.commit(true);
            return false;
        }

        let in_combo = self
            .state
            .daily_combo
            .active()
            .map_or(false, |c| c.contains(id) && !c.is_found(id));
        if in_combo {
            daily::select_combo_card(&mut self.state, id);
        }
        self.commit(true)
    }

    // ── Tasks ───────────────────────────────────────────────────

    pub fn complete_task(&mut self, id: &str) -> bool {
        let changed = tasks::complete_task(&mut self.state, id);
        self.commit(changed)
    }

    pub fn claim_task_reward(&mut self, id: &str) -> bool {
        let changed = tasks::claim_task_reward(&mut self.state, id);
        self.commit(changed)
    }

    /// Complete every task whose stat requirement is met. Returns their ids.
    pub fn refresh_task_completion(&mut self) -> Vec<String> {
        let done = tasks::refresh_completion(&mut self.state, &self.config.catalog);
        self.commit(!done.is_empty());
        done
    }

    // ── Daily ───────────────────────────────────────────────────

    pub fn claim_daily_reward(&mut self) -> bool {
        let changed = daily::claim_daily_reward(&mut self.state, self.clock.now_ms());
        self.commit(changed)
    }

    pub fn solve_daily_cipher(&mut self, guess: &str) -> bool {
        let changed = daily::solve_cipher(&mut self.state, guess);
        self.commit(changed)
    }

    pub fn select_combo_card(&mut self, id: &str) -> bool {
        let changed = daily::select_combo_card(&mut self.state, id);
        self.commit(changed)
    }

    pub fn reset_daily_cipher(&mut self) -> bool {
        let now = self.clock.now_ms();
        daily::reset_cipher(&mut self.state, &self.config, now, &mut self.rng);
        log::info!("daily cipher reset");
        self.commit(true)
    }

    pub fn reset_daily_combo(&mut self) -> bool {
        let now = self.clock.now_ms();
        daily::reset_combo(&mut self.state, &self.config, now, &mut self.rng);
        log::info!("daily combo reset");
        self.commit(true)
    }

    /// Roll over the streak, cipher and combo if their period has ended.
    /// Safe to call on any cadence.
    pub fn reset_if_expired(&mut self) -> bool {
        let changed = self.reset_expired_at(self.clock.now_ms());
        self.commit(changed)
    }

    fn reset_expired_at(&mut self, now: Millis) -> bool {
        let streak = daily::reset_streak_if_expired(&mut self.state, now);
        let cipher = daily::reset_cipher_if_expired(&mut self.state, &self.config, now, &mut self.rng);
        let combo = daily::reset_combo_if_expired(&mut self.state, &self.config, now, &mut self.rng);
        if streak || cipher || combo {
            log::info!(
                "daily rollover (streak={}, cipher={}, combo={})",
                streak,
                cipher,
                combo
            );
        }
        streak || cipher || combo
    }

    // ── Referrals & settings ────────────────────────────────────

    pub fn add_referral(&mut self, name: &str, external_id: &str) -> bool {
        let changed = referrals::add_referral(&mut self.state, name, external_id, self.clock.now_ms());
        self.commit(changed)
    }

    /// Returns the new setting.
    pub fn toggle_vibration(&mut self) -> bool {
        self.state.vibration_enabled = !self.state.vibration_enabled;
        self.commit(true);
        self.state.vibration_enabled
    }

    /// Returns the new setting.
    pub fn toggle_sound(&mut self) -> bool {
        self.state.sound_enabled = !self.state.sound_enabled;
        self.commit(true);
        self.state.sound_enabled
    }

    /// Store the host-supplied identity verbatim.
    pub fn set_user_info(&mut self, display_name: &str, external_id: &str) -> bool {
        let changed = self.apply_user_info(display_name, external_id);
        self.commit(changed)
    }

    fn apply_user_info(&mut self, display_name: &str, external_id: &str) -> bool {
        if self.state.display_name == display_name && self.state.external_id == external_id {
            return false;
        }
        self.state.display_name = display_name.to_string();
        self.state.external_id = external_id.to_string();
        true
    }

    /// Start over with fresh random draws.
    ///
    /// Unlike a full reset to defaults, the player's display name and external
    /// id are carried over, since the host still reports the same player.
    pub fn reset_game(&mut self) -> bool {
        let now = self.clock.now_ms();
        let mut fresh = PlayerState::new(&self.config, now, &mut self.rng);
        fresh.display_name = std::mem::take(&mut self.state.display_name);
        fresh.external_id = std::mem::take(&mut self.state.external_id);
        self.state = fresh;
        log::info!("game reset");
        self.commit(true)
    }

    // ── Internals ───────────────────────────────────────────────

    /// Finish a mutation. Returns `changed`.
    fn commit(&mut self, changed: bool) -> bool {
        let derived = recompute_derived(
            &mut self.state,
            &self.thresholds,
            self.config.initial_profit_per_hour,
        );
        if changed || derived {
            self.notify();
            self.persist();
        }
        changed
    }

    fn notify(&mut self) {
        for (_, observer) in &mut self.observers {
            observer(&self.state);
        }
    }

    fn persist(&self) {
        if let Err(e) = self.flush() {
            log::warn!("failed to save game state: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::host::StaticHost;
    use crate::save::MemoryStore;
    use crate::state::Challenge;
    use crate::time::{ManualClock, DAY_MS, HOUR_MS, SECOND_MS};

    const T0: Millis = 1_700_000_000_000;

    struct Rig {
        engine: Engine,
        clock: ManualClock,
        store: MemoryStore,
        host: StaticHost,
    }

    fn rig() -> Rig {
        let clock = ManualClock::new(T0);
        let store = MemoryStore::new();
        let host = StaticHost::new("Alice", "tg-1");
        let engine = Engine::builder()
            .clock(clock.clone())
            .store(store.clone())
            .host(host.clone())
            .seed(11)
            .build()
            .unwrap();
        Rig {
            engine,
            clock,
            store,
            host,
        }
    }

    fn set_combo(engine: &mut Engine, cards: [&str; 3]) {
        if let Some(combo) = engine.state.daily_combo.active_mut() {
            combo.cards = cards.iter().map(|c| c.to_string()).collect();
            combo.found.clear();
            combo.solved = false;
        }
    }

    #[test]
    fn build_rejects_bad_config() {
        let mut config = EngineConfig::default();
        config.catalog.cipher_words.clear();
        assert!(matches!(
            Engine::builder().config(config).build(),
            Err(ConfigError::EmptyCipherPool)
        ));
    }

    #[test]
    fn fresh_engine_has_active_challenges() {
        let r = rig();
        let state = r.engine.state();
        assert!(state.daily_cipher.is_active());
        assert!(state.daily_combo.is_active());
        assert_eq!(state.referral_code.len(), 8);
        assert_eq!(r.engine.level_name(), "Bronze");
        assert_eq!(r.engine.next_level_threshold(), Some(5_000));
    }

    #[test]
    fn start_session_applies_host_identity() {
        let mut r = rig();
        assert!(r.engine.start_session());
        assert_eq!(r.engine.state().display_name, "Alice");
        assert_eq!(r.engine.state().external_id, "tg-1");
    }

    #[test]
    fn start_session_without_host_uses_placeholder() {
        let mut engine = Engine::builder()
            .clock(ManualClock::new(T0))
            .seed(1)
            .build()
            .unwrap();
        engine.start_session();
        assert_eq!(engine.state().display_name, "CEO");
        assert_eq!(engine.state().external_id, "");
    }

    #[test]
    fn tap_pays_and_pulses() {
        let mut r = rig();
        assert_eq!(r.engine.tap(5), 5);
        assert_eq!(r.engine.state().points, 5);
        assert_eq!(r.engine.state().energy, 995);
        assert_eq!(r.host.pulses(), 1);
        assert!(r.store.contents().is_some());
    }

    #[test]
    fn tap_without_vibration_is_silent() {
        let mut r = rig();
        assert!(!r.engine.toggle_vibration());
        r.engine.tap(1);
        assert_eq!(r.host.pulses(), 0);
    }

    #[test]
    fn zero_tap_changes_nothing() {
        let mut r = rig();
        assert_eq!(r.engine.tap(0), 0);
        assert_eq!(r.host.pulses(), 0);
        assert!(r.store.contents().is_none());
    }

    #[test]
    fn level_follows_points() {
        let mut r = rig();
        r.engine.state.energy = 10_000;
        r.engine.state.max_energy = 10_000;
        r.engine.tap(5_000);
        assert_eq!(r.engine.state().level_index, 1);
        assert_eq!(r.engine.level_name(), "Silver");
    }

    #[test]
    fn purchase_marks_combo_card() {
        let mut r = rig();
        set_combo(&mut r.engine, ["ceo", "marketing", "it-team"]);
        r.engine.state.points = 100_000;

        assert!(r.engine.purchase_upgrade("ceo"));
        assert!(r.engine.purchase_upgrade("marketing"));
        let combo = r.engine.state().daily_combo.active().unwrap().clone();
        assert_eq!(combo.found, vec!["ceo", "marketing"]);
        assert!(!combo.solved);

        let before = r.engine.state().points;
        assert!(r.engine.purchase_upgrade("it-team"));
        let combo = r.engine.state().daily_combo.active().unwrap();
        assert!(combo.solved);
        assert_eq!(r.engine.state().points, before - 3_500 + 5_000_000);
    }

    #[test]
    fn repeat_purchase_does_not_refind_combo_card() {
        let mut r = rig();
        set_combo(&mut r.engine, ["btc-pairs", "ceo", "it-team"]);
        r.engine.state.points = 100_000;
        r.engine.purchase_upgrade("btc-pairs");
        r.engine.purchase_upgrade("btc-pairs");
        let combo = r.engine.state().daily_combo.active().unwrap();
        assert_eq!(combo.found, vec!["btc-pairs"]);
    }

    #[test]
    fn first_purchase_does_not_pay_retroactively() {
        let mut r = rig();
        r.engine.state.points = 1_000;
        r.clock.advance(10 * HOUR_MS);
        assert!(r.engine.purchase_upgrade("btc-pairs"));
        assert_eq!(r.engine.state().profit_per_hour, 100);
        assert_eq!(r.engine.collect_passive_income(), 0);
        r.clock.advance(HOUR_MS);
        assert_eq!(r.engine.collect_passive_income(), 100);
    }

    #[test]
    fn purchase_settles_old_rate_first() {
        let mut r = rig();
        r.engine.state.points = 10_000;
        assert!(r.engine.purchase_upgrade("btc-pairs"));
        r.clock.advance(HOUR_MS);
        // The hour at 100/h is paid before the rate goes up.
        assert!(r.engine.purchase_upgrade("btc-pairs"));
        assert_eq!(r.engine.state().points, 10_000 - 1_000 + 100 - 1_500);
        assert_eq!(r.engine.state().profit_per_hour, 220);
    }

    #[test]
    fn refused_purchase_leaves_state_untouched() {
        let mut r = rig();
        r.engine.state.points = 1_000;
        assert!(r.engine.purchase_upgrade("btc-pairs"));
        r.clock.advance(HOUR_MS);

        // staking needs btc-pairs at level 5
        let before = r.engine.state().clone();
        let saved = r.store.contents();
        assert!(!r.engine.purchase_upgrade("staking"));
        assert_eq!(r.engine.state(), &before);
        assert_eq!(r.store.contents(), saved);

        // The hour is still collectable afterwards.
        assert_eq!(r.engine.collect_passive_income(), 100);
    }

    #[test]
    fn purchase_helpers_follow_state() {
        let mut r = rig();
        assert!(!r.engine.can_purchase("btc-pairs"));
        r.engine.state.points = 1_000;
        assert!(r.engine.can_purchase("btc-pairs"));
        assert!(!r.engine.can_purchase("eth-pairs"));
        r.engine.add_referral("Bob", "b1");
        r.engine.add_referral("Ann", "a2");
        assert_eq!(r.engine.referral_earnings(), 10_000);
    }

    #[test]
    fn failed_purchase_reports_refusal() {
        let mut r = rig();
        assert_eq!(
            r.engine.purchase_refusal("btc-pairs"),
            Some(PurchaseRefusal::InsufficientPoints)
        );
        assert!(!r.engine.purchase_upgrade("btc-pairs"));
        assert_eq!(r.engine.price_of("btc-pairs"), Some(1_000));
        assert_eq!(r.engine.next_profit_of("btc-pairs"), Some(100));
        assert_eq!(r.engine.price_of("nope"), None);
    }

    #[test]
    fn observers_see_changes_until_unsubscribed() {
        let mut r = rig();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let id = r.engine.subscribe(move |s| sink.borrow_mut().push(s.points));

        r.engine.tap(3);
        r.engine.tap(0);
        r.engine.tap(2);
        assert_eq!(*seen.borrow(), vec![3, 5]);

        assert!(r.engine.unsubscribe(id));
        assert!(!r.engine.unsubscribe(id));
        r.engine.tap(1);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn tick_recovers_and_accrues() {
        let mut r = rig();
        r.engine.tap(100);
        r.engine.state.profit_per_hour = 3_600;
        r.engine.state.last_profit_update = T0;
        r.clock.advance(10 * SECOND_MS);
        assert!(r.engine.tick());
        assert_eq!(r.engine.state().energy, 910);
        assert_eq!(r.engine.state().points, 100 + 10);
    }

    #[test]
    fn tick_autosaves_on_cadence() {
        let mut r = rig();
        r.engine.state.energy = r.engine.state.max_energy;
        r.engine.tick();
        assert!(r.store.contents().is_none());
        r.clock.advance(30 * SECOND_MS);
        r.engine.state.last_energy_update = r.clock.now_ms();
        assert!(!r.engine.tick());
        assert!(r.store.contents().is_some());
    }

    #[test]
    fn reset_if_expired_rolls_challenges_next_day() {
        let mut r = rig();
        let cipher_issued = r.engine.state().daily_cipher.active().unwrap().issued_at;
        assert!(!r.engine.reset_if_expired());
        r.clock.advance(DAY_MS);
        assert!(r.engine.reset_if_expired());
        let cipher = r.engine.state().daily_cipher.active().unwrap();
        assert!(cipher.issued_at > cipher_issued);
        assert!(!cipher.solved);
        assert!(!r.engine.reset_if_expired());
    }

    #[test]
    fn cipher_through_engine() {
        let mut r = rig();
        let word = r.engine.state().daily_cipher.active().unwrap().word.to_lowercase();
        assert!(!r.engine.solve_daily_cipher("definitely-wrong"));
        assert!(r.engine.solve_daily_cipher(&word));
        assert!(!r.engine.solve_daily_cipher(&word));
        assert_eq!(r.engine.state().points, 1_000_000);
    }

    #[test]
    fn manual_resets_issue_new_challenges() {
        let mut r = rig();
        r.engine.state.daily_cipher = Challenge::NotActive;
        assert!(r.engine.reset_daily_cipher());
        assert!(r.engine.state().daily_cipher.is_active());
        set_combo(&mut r.engine, ["ceo", "marketing", "it-team"]);
        r.engine.select_combo_card("ceo");
        assert!(r.engine.reset_daily_combo());
        assert!(r.engine.state().daily_combo.active().unwrap().found.is_empty());
    }

    #[test]
    fn daily_reward_once_per_day() {
        let mut r = rig();
        assert!(r.engine.claim_daily_reward());
        assert!(!r.engine.claim_daily_reward());
        assert_eq!(r.engine.streak_status(), StreakStatus::AlreadyClaimedToday);
        r.clock.advance(DAY_MS);
        assert!(r.engine.claim_daily_reward());
        assert_eq!(r.engine.state().points, 500 + 1_000);
    }

    #[test]
    fn tasks_and_refresh() {
        let mut r = rig();
        assert!(r.engine.complete_task("join-telegram"));
        assert!(r.engine.claim_task_reward("join-telegram"));
        assert_eq!(r.engine.state().points, 10_000);
        // 10_000 points reaches Silver.
        assert_eq!(r.engine.refresh_task_completion(), vec!["reach-silver"]);
        assert!(r.engine.refresh_task_completion().is_empty());
    }

    #[test]
    fn referrals_and_invite_link() {
        let mut r = rig();
        assert!(r.engine.add_referral("Bob", "b1"));
        assert!(!r.engine.add_referral("Bob", "b1"));
        assert_eq!(r.engine.state().points, 5_000);
        let link = r.engine.invite_link();
        assert!(link.starts_with("https://t.me/FXUniversebot?start="));
        assert!(link.ends_with(&r.engine.state().referral_code));
    }

    #[test]
    fn settings_toggle() {
        let mut r = rig();
        assert!(!r.engine.toggle_sound());
        assert!(r.engine.toggle_sound());
        assert!(r.engine.set_user_info("Carol", "c3"));
        assert!(!r.engine.set_user_info("Carol", "c3"));
    }

    #[test]
    fn reset_game_keeps_identity_only() {
        let mut r = rig();
        r.engine.start_session();
        r.engine.tap(50);
        r.engine.add_referral("Bob", "b1");
        let old_code = r.engine.state().referral_code.clone();

        assert!(r.engine.reset_game());
        let state = r.engine.state();
        assert_eq!(state.points, 0);
        assert!(state.referrals.is_empty());
        assert_eq!(state.energy, 1_000);
        assert_eq!(state.display_name, "Alice");
        assert_ne!(state.referral_code, old_code);
    }

    #[test]
    fn reload_restores_progress() {
        let mut r = rig();
        r.engine.tap(42);
        r.engine.state.points = 5_000;
        r.engine.state.total_earned = 5_000;
        assert!(r.engine.purchase_upgrade("btc-pairs"));
        let saved = r.engine.state().clone();

        let reloaded = Engine::builder()
            .clock(r.clock.clone())
            .store(r.store.clone())
            .seed(99)
            .build()
            .unwrap();
        assert_eq!(reloaded.state(), &saved);
    }

    #[test]
    fn corrupt_save_falls_back_to_defaults() {
        let store = MemoryStore::with_data("garbage");
        let engine = Engine::builder()
            .clock(ManualClock::new(T0))
            .store(store.clone())
            .seed(3)
            .build()
            .unwrap();
        assert_eq!(engine.state().points, 0);
        assert!(engine.state().daily_combo.is_active());
        assert!(store.contents().is_none());
    }

    #[test]
    fn daily_reset_countdown() {
        let r = rig();
        let (h, m) = r.engine.daily_reset_in();
        assert!(h < 24 && m < 60);
    }

    #[test]
    fn airdrop_estimate() {
        let mut r = rig();
        assert_eq!(r.engine.airdrop_score(), 0);
        r.engine.add_referral("Bob", "b1");
        // 3 for the referral, 2 for reaching Silver with the bonus.
        assert_eq!(r.engine.airdrop_score(), 5);
        assert_eq!(r.engine.estimated_airdrop_tokens(), 5_000);
    }
}
