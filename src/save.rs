//! セーブ/ロード機能。
//!
//! ## バージョニング方針
//!
//! - `SAVE_VERSION`: 現在のセーブ形式バージョン。フィールド追加時にインクリメントする。
//! - `MIN_COMPATIBLE_VERSION`: 互換性を維持できる最小バージョン。
//!   新フィールドの追加のみの場合はこの値を変えない（旧データを維持できる）。
//!   既存フィールドの意味変更や削除など破壊的変更を行った場合のみインクリメントする。
//!
//! カタログ（カード定義・タスク定義）は保存しない。カードのレベルとタスクの
//! フラグを id をキーにして保存し、ロード時に現在のカタログから作った
//! 新しい状態へ上書きする。カタログから消えた id は無視する。

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EngineConfig;
use crate::state::{
    recompute_derived, Challenge, CipherChallenge, ComboChallenge, PlayerState, Referral,
};
use crate::time::Millis;

/// セーブデータのフォーマットバージョン。
pub const SAVE_VERSION: u32 = 1;

/// 互換性を維持できる最小バージョン。
pub const MIN_COMPATIBLE_VERSION: u32 = 1;

/// localStorage のキー。
pub const STORAGE_KEY: &str = "falco_x_game_state";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize save data: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("corrupt save data: {0}")]
    Deserialize(#[source] serde_json::Error),
    #[error("save version {saved} is older than the minimum supported {min}")]
    Incompatible { saved: u32, min: u32 },
    #[error("storage is not available")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// The storage medium. Only moves opaque strings; encoding lives in this module.
pub trait StateStore {
    fn read(&self) -> Result<Option<String>, StoreError>;
    fn write(&self, data: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// In-memory store. Clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: &str) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(data.to_string()))),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl StateStore for MemoryStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.slot.borrow().clone())
    }

    fn write(&self, data: &str) -> Result<(), StoreError> {
        *self.slot.borrow_mut() = Some(data.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.borrow_mut() = None;
        Ok(())
    }
}

/// Store that never persists anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullStore;

impl StateStore for NullStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn write(&self, _data: &str) -> Result<(), StoreError> {
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Browser localStorage. WASM 環境でのみ動作。
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Debug)]
pub struct LocalStorageStore {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub fn new() -> Self {
        Self::with_key(STORAGE_KEY)
    }

    pub fn with_key(key: &str) -> Self {
        Self { key: key.to_string() }
    }

    fn storage(&self) -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StoreError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl StateStore for LocalStorageStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        self.storage()?
            .get_item(&self.key)
            .map_err(|e| StoreError::Backend(format!("{:?}", e)))
    }

    fn write(&self, data: &str) -> Result<(), StoreError> {
        self.storage()?
            .set_item(&self.key, data)
            .map_err(|e| StoreError::Backend(format!("{:?}", e)))
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.storage()?
            .remove_item(&self.key)
            .map_err(|e| StoreError::Backend(format!("{:?}", e)))
    }
}

// ── Save format ─────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct SaveData {
    version: u32,
    game: PlayerSave,
}

fn default_true() -> bool {
    true
}

/// シリアライズ用のセーブデータ構造体。
/// 派生値（level_index, profit_per_hour）とカタログ定義は含まない。
#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct PlayerSave {
    external_id: String,
    display_name: Option<String>,

    points: u64,
    total_earned: u64,

    /// `None` のときは設定値を使う。
    points_per_tap: Option<u64>,
    energy: u64,
    max_energy: Option<u64>,
    energy_recovery_per_second: Option<f64>,
    last_energy_update: Option<Millis>,
    last_profit_update: Option<Millis>,

    /// (card id, level)
    upgrade_levels: Vec<(String, u32)>,
    /// (task id, completed, claimed)
    tasks: Vec<(String, bool, bool)>,

    referrals: Vec<Referral>,
    referral_code: String,
    referral_bonus: Option<u64>,

    /// 報酬トラックの claimed フラグ（表示用）。
    reward_claimed: Vec<bool>,
    current_streak: u32,
    last_streak_claim: Option<Millis>,
    daily_cipher: Challenge<CipherChallenge>,
    daily_combo: Challenge<ComboChallenge>,

    #[serde(default = "default_true")]
    vibration_enabled: bool,
    #[serde(default = "default_true")]
    sound_enabled: bool,
}

fn extract_save(state: &PlayerState) -> SaveData {
    SaveData {
        version: SAVE_VERSION,
        game: PlayerSave {
            external_id: state.external_id.clone(),
            display_name: Some(state.display_name.clone()),
            points: state.points,
            total_earned: state.total_earned,
            points_per_tap: Some(state.points_per_tap),
            energy: state.energy,
            max_energy: Some(state.max_energy),
            energy_recovery_per_second: Some(state.energy_recovery_per_second),
            last_energy_update: Some(state.last_energy_update),
            last_profit_update: Some(state.last_profit_update),
            upgrade_levels: state
                .upgrades
                .iter()
                .filter(|u| u.level > 0)
                .map(|u| (u.id.clone(), u.level))
                .collect(),
            tasks: state
                .tasks
                .iter()
                .filter(|t| t.completed || t.claimed)
                .map(|t| (t.id.clone(), t.completed, t.claimed))
                .collect(),
            referrals: state.referrals.clone(),
            referral_code: state.referral_code.clone(),
            referral_bonus: Some(state.referral_bonus),
            reward_claimed: state.daily_rewards.iter().map(|r| r.claimed).collect(),
            current_streak: state.current_streak,
            last_streak_claim: state.last_streak_claim,
            daily_cipher: state.daily_cipher.clone(),
            daily_combo: state.daily_combo.clone(),
            vibration_enabled: state.vibration_enabled,
            sound_enabled: state.sound_enabled,
        },
    }
}

/// セーブデータを PlayerState に復元する。
/// 定義の個数や id が合わない場合は無視して新規データの方を使う。
fn apply_save(state: &mut PlayerState, save: PlayerSave) {
    state.external_id = save.external_id;
    if let Some(name) = save.display_name {
        state.display_name = name;
    }
    state.points = save.points;
    state.total_earned = save.total_earned.max(save.points);

    if let Some(v) = save.points_per_tap {
        state.points_per_tap = v;
    }
    if let Some(v) = save.max_energy {
        state.max_energy = v;
    }
    if let Some(v) = save.energy_recovery_per_second.filter(|r| r.is_finite() && *r >= 0.0) {
        state.energy_recovery_per_second = v;
    }
    state.energy = save.energy.min(state.max_energy);
    if let Some(t) = save.last_energy_update {
        state.last_energy_update = t;
    }
    if let Some(t) = save.last_profit_update {
        state.last_profit_update = t;
    }

    // カードのレベル復元
    for (id, level) in &save.upgrade_levels {
        if let Some(card) = state.upgrades.iter_mut().find(|u| u.id == *id) {
            card.level = (*level).min(card.max_level);
        }
    }

    // タスク復元 (claimed ⇒ completed)
    for (id, completed, claimed) in &save.tasks {
        if let Some(task) = state.tasks.iter_mut().find(|t| t.id == *id) {
            task.completed = *completed || *claimed;
            task.claimed = *claimed;
        }
    }

    state.referrals.clear();
    for r in save.referrals {
        if !state.referrals.iter().any(|existing| existing.id == r.id) {
            state.referrals.push(r);
        }
    }
    state.referral_code = save.referral_code;
    if let Some(bonus) = save.referral_bonus {
        state.referral_bonus = bonus;
    }

    for (slot, &claimed) in state.daily_rewards.iter_mut().zip(&save.reward_claimed) {
        slot.claimed = claimed;
    }
    state.current_streak = save.current_streak;
    state.last_streak_claim = save.last_streak_claim;

    state.daily_cipher = save.daily_cipher;
    state.daily_combo = save.daily_combo;
    if let Some(combo) = state.daily_combo.active_mut() {
        let cards = combo.cards.clone();
        let mut found: Vec<String> = Vec::new();
        for id in combo.found.drain(..) {
            if cards.contains(&id) && !found.contains(&id) {
                found.push(id);
            }
        }
        combo.solved = !cards.is_empty() && found.len() == cards.len();
        combo.found = found;
    }

    state.vibration_enabled = save.vibration_enabled;
    state.sound_enabled = save.sound_enabled;
}

/// Serialize a state into the versioned JSON envelope.
pub fn encode(state: &PlayerState) -> Result<String, StoreError> {
    serde_json::to_string(&extract_save(state)).map_err(StoreError::Serialize)
}

/// Rebuild a state from saved JSON on top of a fresh catalog-built state.
pub fn decode(json: &str, config: &EngineConfig, now: Millis) -> Result<PlayerState, StoreError> {
    let data: SaveData = serde_json::from_str(json).map_err(StoreError::Deserialize)?;

    if data.version < MIN_COMPATIBLE_VERSION {
        return Err(StoreError::Incompatible {
            saved: data.version,
            min: MIN_COMPATIBLE_VERSION,
        });
    }
    if data.version < SAVE_VERSION {
        log::info!(
            "migrating save data (saved={}, current={})",
            data.version,
            SAVE_VERSION
        );
    }

    let mut state = PlayerState::blank(config, now);
    apply_save(&mut state, data.game);
    recompute_derived(
        &mut state,
        &config.catalog.level_thresholds(),
        config.initial_profit_per_hour,
    );
    Ok(state)
}

/// Read and decode. `Ok(None)` when nothing has been saved yet.
///
/// Corrupt or incompatible data is removed from the store before the error
/// is returned, so the next session starts clean.
pub fn load_state(
    store: &dyn StateStore,
    config: &EngineConfig,
    now: Millis,
) -> Result<Option<PlayerState>, StoreError> {
    let json = match store.read()? {
        Some(j) => j,
        None => return Ok(None),
    };
    match decode(&json, config, now) {
        Ok(state) => Ok(Some(state)),
        Err(e) => {
            if let Err(clear_err) = store.clear() {
                log::warn!("failed to discard unreadable save: {}", clear_err);
            }
            Err(e)
        }
    }
}

pub fn save_state(store: &dyn StateStore, state: &PlayerState) -> Result<(), StoreError> {
    store.write(&encode(state)?)
}
