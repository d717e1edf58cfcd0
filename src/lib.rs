//! FalcoX tap: the game-state engine of a tap-to-earn clicker.
//!
//! Pure transition functions live in the subsystem modules (`energy`,
//! `accrual`, `upgrades`, `tasks`, `daily`, `referrals`) and operate on a
//! `PlayerState`. `Engine` owns one state and wires those transitions to a
//! clock, a save store, a host bridge and change observers.

pub mod accrual;
pub mod catalog;
pub mod config;
pub mod daily;
pub mod economy;
pub mod energy;
pub mod engine;
pub mod host;
pub mod logging;
pub mod referrals;
pub mod save;
pub mod state;
pub mod tasks;
pub mod time;
pub mod upgrades;

pub use catalog::Catalog;
pub use config::{ConfigError, EngineConfig};
pub use engine::{Engine, EngineBuilder, SubscriptionId};
pub use host::{HostBridge, HostIdentity, NoopHost};
pub use save::{MemoryStore, StateStore, StoreError};
pub use state::PlayerState;
pub use time::{Clock, ManualClock, SystemClock};
