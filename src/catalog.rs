//! Static reference data: upgrade cards, tasks, the daily reward track,
//! the cipher word pool, combo sets and the level table.
//!
//! The engine reads a `Catalog` but never mutates it.

use serde::{Deserialize, Serialize};

/// Number of cards in a daily combo.
pub const COMBO_SIZE: usize = 3;

/// Upgrade card grouping (display tabs).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Markets,
    Pr,
    Team,
    Legal,
    Specials,
}

fn default_required_level() -> u32 {
    1
}

/// "Card X must be at level N before this one can be bought."
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prerequisite {
    pub card_id: String,
    #[serde(default = "default_required_level")]
    pub level: u32,
}

/// Immutable definition of an upgrade card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub base_price: u64,
    pub base_profit_per_hour: u64,
    pub max_level: u32,
    #[serde(default)]
    pub requires: Option<Prerequisite>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Daily,
    Social,
    Special,
    OneTime,
}

/// What has to be true before a task counts as completed.
///
/// Only the stat-based variants can be checked by the engine; `External`
/// tasks are completed by the host (e.g. after the player opens a link).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TaskRequirement {
    #[default]
    External,
    LevelAtLeast(usize),
    ReferralsAtLeast(usize),
    ProfitPerHourAtLeast(u64),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskDef {
    pub id: String,
    pub title: String,
    pub reward: u64,
    pub kind: TaskKind,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub requirement: TaskRequirement,
}

/// One row of the level table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    pub name: String,
    pub min_points: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub levels: Vec<LevelDef>,
    pub upgrades: Vec<UpgradeDef>,
    pub tasks: Vec<TaskDef>,
    /// Reward per day-slot; the streak indexes into this cyclically.
    pub reward_track: Vec<u64>,
    pub cipher_words: Vec<String>,
    pub combo_sets: Vec<Vec<String>>,
}

impl Catalog {
    pub fn upgrade(&self, id: &str) -> Option<&UpgradeDef> {
        self.upgrades.iter().find(|u| u.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&TaskDef> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Minimum points for each level, in level order.
    pub fn level_thresholds(&self) -> Vec<u64> {
        self.levels.iter().map(|l| l.min_points).collect()
    }

    pub fn level_name(&self, index: usize) -> &str {
        self.levels.get(index).map(|l| l.name.as_str()).unwrap_or("")
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            levels: default_levels(),
            upgrades: default_upgrades(),
            tasks: default_tasks(),
            reward_track: vec![
                500, 1_000, 2_500, 5_000, 15_000, 25_000, 100_000, 500_000, 1_000_000, 5_000_000,
            ],
            cipher_words: [
                "HODL", "MOON", "PUMP", "DUMP", "DEFI", "YIELD", "STAKE", "SWAP", "MINT", "BURN",
                "FOMO", "WHALE", "LAMBO", "REKT", "SHILL", "BAGS", "DYOR", "NGMI", "WAGMI",
                "ALPHA",
            ]
            .iter()
            .map(|w| w.to_string())
            .collect(),
            combo_sets: [
                ["fan-tokens", "staking", "btc-pairs"],
                ["ceo", "marketing", "it-team"],
                ["kyc-system", "aml-compliance", "license-eu"],
                ["hamster-nft", "vip-program", "launchpad"],
                ["eth-pairs", "defi-tokens", "gamefi-tokens"],
                ["security-team", "support-team", "ux-team"],
                ["meme-coins", "top-10-coins", "btc-pairs"],
                ["mobile-app", "trading-bot", "it-team"],
            ]
            .iter()
            .map(|set| set.iter().map(|id| id.to_string()).collect())
            .collect(),
        }
    }
}

fn default_levels() -> Vec<LevelDef> {
    [
        ("Bronze", 0),
        ("Silver", 5_000),
        ("Gold", 25_000),
        ("Platinum", 100_000),
        ("Diamond", 1_000_000),
        ("Epic", 2_000_000),
        ("Legendary", 10_000_000),
        ("Master", 50_000_000),
        ("GrandMaster", 100_000_000),
        ("Lord", 1_000_000_000),
    ]
    .iter()
    .map(|(name, min_points)| LevelDef {
        name: name.to_string(),
        min_points: *min_points,
    })
    .collect()
}

fn card(
    id: &str,
    name: &str,
    category: Category,
    base_price: u64,
    base_profit_per_hour: u64,
    max_level: u32,
    requires: Option<(&str, u32)>,
) -> UpgradeDef {
    UpgradeDef {
        id: id.into(),
        name: name.into(),
        description: String::new(),
        category,
        base_price,
        base_profit_per_hour,
        max_level,
        requires: requires.map(|(card_id, level)| Prerequisite {
            card_id: card_id.into(),
            level,
        }),
    }
}

fn default_upgrades() -> Vec<UpgradeDef> {
    use Category::*;
    vec![
        // ── Markets ─────────────────────────────────────────────
        card("btc-pairs", "BTC pairs", Markets, 1_000, 100, 20, None),
        card("eth-pairs", "ETH pairs", Markets, 1_500, 150, 20, Some(("btc-pairs", 1))),
        card("top-10-coins", "Top 10 coins", Markets, 2_500, 240, 20, None),
        card("meme-coins", "Meme coins", Markets, 3_000, 300, 20, Some(("top-10-coins", 2))),
        card("defi-tokens", "DeFi tokens", Markets, 5_000, 450, 20, Some(("eth-pairs", 3))),
        card("gamefi-tokens", "GameFi tokens", Markets, 8_000, 700, 20, Some(("defi-tokens", 1))),
        card("fan-tokens", "Fan tokens", Markets, 4_000, 350, 20, None),
        card("staking", "Staking", Markets, 10_000, 900, 20, Some(("btc-pairs", 5))),
        // ── PR ──────────────────────────────────────────────────
        card("marketing", "Marketing", Pr, 2_000, 180, 20, None),
        card("vip-program", "VIP program", Pr, 12_000, 1_000, 15, Some(("marketing", 5))),
        // ── Team ────────────────────────────────────────────────
        card("ceo", "CEO", Team, 5_000, 400, 15, None),
        card("it-team", "IT team", Team, 3_500, 320, 20, None),
        card("support-team", "Support team", Team, 2_500, 220, 20, None),
        card("security-team", "Security team", Team, 6_000, 520, 20, Some(("it-team", 3))),
        card("ux-team", "UX team", Team, 4_500, 380, 20, Some(("it-team", 1))),
        // ── Legal ───────────────────────────────────────────────
        card("kyc-system", "KYC system", Legal, 7_500, 600, 15, None),
        card("aml-compliance", "AML compliance", Legal, 9_000, 720, 15, Some(("kyc-system", 2))),
        card("license-eu", "EU license", Legal, 25_000, 2_000, 10, Some(("aml-compliance", 3))),
        // ── Specials ────────────────────────────────────────────
        card("hamster-nft", "Falcon NFT", Specials, 50_000, 3_500, 10, None),
        card("launchpad", "Launchpad", Specials, 75_000, 5_000, 10, Some(("ceo", 5))),
        card("mobile-app", "Mobile app", Specials, 30_000, 2_400, 10, Some(("ux-team", 3))),
        card("trading-bot", "Trading bot", Specials, 40_000, 3_000, 10, Some(("it-team", 5))),
    ]
}

fn task(
    id: &str,
    title: &str,
    reward: u64,
    kind: TaskKind,
    link: Option<&str>,
    requirement: TaskRequirement,
) -> TaskDef {
    TaskDef {
        id: id.into(),
        title: title.into(),
        reward,
        kind,
        link: link.map(str::to_string),
        requirement,
    }
}

fn default_tasks() -> Vec<TaskDef> {
    use TaskKind::*;
    use TaskRequirement::*;
    vec![
        task("daily-login", "Daily check-in", 5_000, Daily, None, External),
        task("join-telegram", "Join our Telegram channel", 10_000, Social, Some("https://t.me/falcox_news"), External),
        task("follow-twitter", "Follow us on X", 10_000, Social, Some("https://x.com/falcox"), External),
        task("join-discord", "Join our Discord", 10_000, Social, Some("https://discord.gg/falcox"), External),
        task("subscribe-youtube", "Subscribe on YouTube", 10_000, Social, Some("https://youtube.com/@falcox"), External),
        task("reach-silver", "Reach Silver level", 10_000, Special, None, LevelAtLeast(1)),
        task("reach-gold", "Reach Gold level", 25_000, Special, None, LevelAtLeast(2)),
        task("reach-platinum", "Reach Platinum level", 100_000, Special, None, LevelAtLeast(3)),
        task("reach-diamond", "Reach Diamond level", 500_000, Special, None, LevelAtLeast(4)),
        task("invite-3-friends", "Invite 3 friends", 50_000, OneTime, None, ReferralsAtLeast(3)),
        task("invite-10-friends", "Invite 10 friends", 250_000, OneTime, None, ReferralsAtLeast(10)),
        task("profit-1k", "Reach 1K profit per hour", 20_000, OneTime, None, ProfitPerHourAtLeast(1_000)),
        task("profit-10k", "Reach 10K profit per hour", 100_000, OneTime, None, ProfitPerHourAtLeast(10_000)),
        task("profit-100k", "Reach 100K profit per hour", 1_000_000, OneTime, None, ProfitPerHourAtLeast(100_000)),
    ]
}
