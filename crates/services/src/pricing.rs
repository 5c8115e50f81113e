//! Order pricing in integer paise.

use groupframe_config::PricingSettings;
use groupframe_db::models::PricingBreakdown;

/// `value * bps / 10000`, rounding halves up.
pub fn apply_bps_round_half_up(value: u64, bps: u32) -> u64 {
    (value * bps as u64 + 5_000) / 10_000
}

pub fn price_order(settings: &PricingSettings, member_count: u32) -> PricingBreakdown {
    let base_paise = settings.base_price_paise;
    let members_paise = settings.per_member_price_paise * member_count as u64;
    let subtotal_paise = base_paise + members_paise;
    let gst_paise = apply_bps_round_half_up(subtotal_paise, settings.gst_rate_bps);

    PricingBreakdown {
        member_count,
        base_paise,
        members_paise,
        subtotal_paise,
        gst_rate_bps: settings.gst_rate_bps,
        gst_paise,
        total_paise: subtotal_paise + gst_paise,
    }
}

/// Formats paise as rupees, e.g. `12345` -> `"Rs. 123.45"`.
pub fn format_rupees(paise: u64) -> String {
    format!("Rs. {}.{:02}", paise / 100, paise % 100)
}
