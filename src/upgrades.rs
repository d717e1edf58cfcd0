//! Upgrade ledger: validating and applying card purchases.

use crate::state::{PlayerState, UpgradeCard};

/// Why a purchase was refused. Used for logging and UI hints; the ledger API
/// itself reports success as a plain `bool`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PurchaseRefusal {
    UnknownCard,
    MaxLevel,
    InsufficientPoints,
    Locked,
}

/// Whether the card's prerequisite (if any) is still unmet.
pub fn is_locked(state: &PlayerState, card: &UpgradeCard) -> bool {
    match &card.requires {
        None => false,
        Some(req) => state
            .upgrade(&req.card_id)
            .map_or(true, |required| required.level < req.level),
    }
}

/// Check a purchase without applying it, in validation order.
pub fn check_purchase(state: &PlayerState, id: &str) -> Result<(), PurchaseRefusal> {
    let card = state.upgrade(id).ok_or(PurchaseRefusal::UnknownCard)?;
    if card.is_maxed() {
        return Err(PurchaseRefusal::MaxLevel);
    }
    if state.points < card.price() {
        return Err(PurchaseRefusal::InsufficientPoints);
    }
    if is_locked(state, card) {
        return Err(PurchaseRefusal::Locked);
    }
    Ok(())
}

/// Affordable, not maxed and unlocked.
pub fn can_purchase(state: &PlayerState, id: &str) -> bool {
    check_purchase(state, id).is_ok()
}

/// Buy exactly one level of card `id`. Returns true if successful.
///
/// On any refusal nothing changes. On success the price is debited, the
/// level's production is added to `profit_per_hour` and the level goes up by
/// one.
pub fn purchase_upgrade(state: &mut PlayerState, id: &str) -> bool {
    if let Err(refusal) = check_purchase(state, id) {
        log::debug!("purchase of `{}` refused: {:?}", id, refusal);
        return false;
    }
    let idx = match state.upgrades.iter().position(|u| u.id == id) {
        Some(i) => i,
        None => return false,
    };

    let price = state.upgrades[idx].price();
    let profit = state.upgrades[idx].next_profit();

    state.points -= price;
    state.profit_per_hour = state.profit_per_hour.saturating_add(profit);
    state.upgrades[idx].level += 1;

    log::debug!(
        "bought `{}` level {} for {} (+{}/h)",
        id,
        state.upgrades[idx].level,
        price,
        profit
    );
    true
}
