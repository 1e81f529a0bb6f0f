//! Shared formatting for CLI output.
//!
//! Rounding to cents happens here and nowhere else.

use anyhow::{Result, bail};

use tab_core::UserId;

use crate::Config;

const QUANTITY_EPSILON: f64 = 1e-6;

/// Formats an amount with the currency symbol and 2 decimal places.
pub fn format_currency(amount: f64, symbol: &str) -> String {
    // Avoid "-0.00" from tiny negative float noise.
    let amount = if amount.abs() < 0.005 { 0.0 } else { amount };
    format!("{symbol}{amount:.2}")
}

/// Formats a claim quantity as a suffix for an item name.
///
/// Whole single units render as nothing, common fractions as glyphs,
/// other whole numbers in parentheses and anything else as a percentage.
pub fn format_quantity(quantity: f64) -> String {
    let is = |target: f64| (quantity - target).abs() < QUANTITY_EPSILON;
    if is(1.0) {
        String::new()
    } else if is(0.5) {
        "½".to_string()
    } else if is(0.25) {
        "¼".to_string()
    } else if (quantity - 1.0 / 3.0).abs() < 0.005 {
        "⅓".to_string()
    } else if (quantity - quantity.round()).abs() < QUANTITY_EPSILON {
        format!("({quantity:.0})")
    } else {
        format!("({:.0}%)", quantity * 100.0)
    }
}

/// Item name with its quantity suffix, e.g. `Pizza ½`.
pub fn item_label(name: &str, quantity: f64) -> String {
    let suffix = format_quantity(quantity);
    if suffix.is_empty() {
        name.to_string()
    } else {
        format!("{name} {suffix}")
    }
}

/// Formats a claimed quantity next to an item total, e.g. `1.5/2`.
pub fn format_fraction(claimed: f64, total: u32) -> String {
    let claimed = if (claimed - claimed.round()).abs() < QUANTITY_EPSILON {
        format!("{claimed:.0}")
    } else {
        format!("{claimed:.2}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    };
    format!("{claimed}/{total}")
}

/// Picks the acting user from `--user` or the configured `user_id`.
pub fn resolve_user(arg: Option<&UserId>, config: &Config) -> Result<UserId> {
    match arg.or(config.user_id.as_ref()) {
        Some(user) => Ok(user.clone()),
        None => bail!("no user given: pass --user or set user_id in the config file"),
    }
}
