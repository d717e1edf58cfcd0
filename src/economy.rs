//! Economy formulas: prices, production, levels and display helpers.

/// Price multiplier applied per owned level.
pub const PRICE_GROWTH: f64 = 1.5;
/// Production multiplier applied per owned level.
pub const PROFIT_GROWTH: f64 = 1.2;

/// Price of buying the next level of a card currently at `level`.
pub fn price_at_level(base_price: u64, level: u32) -> u64 {
    (base_price as f64 * PRICE_GROWTH.powi(level as i32)).floor() as u64
}

/// Profit per hour added by buying the next level of a card currently at `level`.
pub fn profit_at_level(base_profit_per_hour: u64, level: u32) -> u64 {
    (base_profit_per_hour as f64 * PROFIT_GROWTH.powi(level as i32)).floor() as u64
}

/// Total profit per hour of a card that owns `level` levels
/// (sum of every purchased level's contribution).
pub fn total_profit_for_level(base_profit_per_hour: u64, level: u32) -> u64 {
    (0..level)
        .map(|l| profit_at_level(base_profit_per_hour, l))
        .fold(0u64, u64::saturating_add)
}

/// Largest index `i` with `points >= thresholds[i]`; 0 when nothing matches.
pub fn level_from_points(points: u64, thresholds: &[u64]) -> usize {
    thresholds
        .iter()
        .rposition(|&min| points >= min)
        .unwrap_or(0)
}

/// Short display form: `1.50K`, `2.00M`, `3.25B`.
pub fn format_compact(n: u64) -> String {
    let f = n as f64;
    if n >= 1_000_000_000 {
        format!("{:.2}B", f / 1e9)
    } else if n >= 1_000_000 {
        format!("{:.2}M", f / 1e6)
    } else if n >= 1_000 {
        format!("{:.2}K", f / 1e3)
    } else {
        n.to_string()
    }
}

/// Inputs for the cosmetic airdrop score.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AirdropInputs {
    pub total_earned: u64,
    pub level_index: usize,
    pub profit_per_hour: u64,
    pub referral_count: usize,
    pub total_upgrade_levels: u64,
}

pub const AIRDROP_TOKENS_PER_POINT: u64 = 1_000;

/// Airdrop eligibility score in 0..=100.
pub fn airdrop_score(inputs: &AirdropInputs) -> u32 {
    let earned = ((inputs.total_earned / 1_000_000) * 3).min(30);
    let level = inputs.level_index as u64 * 2;
    let profit = ((inputs.profit_per_hour / 10_000) * 5).min(25);
    let referrals = (inputs.referral_count as u64 * 3).min(15);
    let upgrades = (inputs.total_upgrade_levels / 10).min(10);

    (earned + level + profit + referrals + upgrades).min(100) as u32
}

pub fn estimated_airdrop_tokens(score: u32) -> u64 {
    score as u64 * AIRDROP_TOKENS_PER_POINT
}
