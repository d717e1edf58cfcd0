//! Referral ledger and invite codes.

use rand::Rng;

use crate::state::{PlayerState, Referral};
use crate::time::Millis;

pub const REFERRAL_CODE_LEN: usize = 8;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random uppercase alphanumeric invite code.
pub fn generate_referral_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..REFERRAL_CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

pub fn invite_link(base_url: &str, code: &str) -> String {
    format!("{}{}", base_url, code)
}

/// Record a referred user and pay the flat bonus.
/// A second call with the same `external_id` does nothing. Returns true if added.
pub fn add_referral(state: &mut PlayerState, name: &str, external_id: &str, now: Millis) -> bool {
    if state.referrals.iter().any(|r| r.id == external_id) {
        return false;
    }
    state.referrals.push(Referral {
        id: external_id.to_string(),
        name: name.to_string(),
        joined_at: now,
    });
    let bonus = state.referral_bonus;
    state.credit(bonus);
    log::debug!("referral `{}` added (+{})", external_id, bonus);
    true
}

/// Points earned from referrals so far.
pub fn referral_earnings(state: &PlayerState) -> u64 {
    state.referrals.len() as u64 * state.referral_bonus
}
