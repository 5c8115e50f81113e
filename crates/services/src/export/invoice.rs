use chrono::{DateTime, Utc};
use groupframe_db::models::{GridTemplateName, Order, PaymentStatus};

use super::pdf::{LEFT, PdfWriter};
use crate::pricing::format_rupees;

const QTY_X: f64 = 360.0;
const AMOUNT_X: f64 = 460.0;

pub fn invoice_number(order: &Order) -> String {
    format!("INV-{}", order.order_number)
}

/// Renders a one-order tax invoice with a member roster appendix.
pub fn render_invoice(order: &Order, issued_at: DateTime<Utc>) -> Vec<u8> {
    let mut pdf = PdfWriter::new();
    let pricing = &order.pricing;

    pdf.line("GroupFrame - Tax Invoice", 18.0, true);
    pdf.blank(8.0);
    pdf.line(&format!("Invoice: {}", invoice_number(order)), 10.0, false);
    pdf.line(&format!("Order: {}", order.order_number), 10.0, false);
    pdf.line(&format!("Date: {}", issued_at.format("%Y-%m-%d")), 10.0, false);
    pdf.blank(8.0);

    pdf.line("Bill to", 11.0, true);
    pdf.line(&order.customer.name, 10.0, false);
    pdf.line(&order.customer.email, 10.0, false);
    pdf.line(&order.customer.phone, 10.0, false);
    pdf.blank(6.0);

    let address = &order.shipping_address;
    pdf.line("Ship to", 11.0, true);
    pdf.line(&address.line1, 10.0, false);
    if let Some(line2) = address.line2.as_deref().filter(|l| !l.is_empty()) {
        pdf.line(line2, 10.0, false);
    }
    pdf.line(
        &format!(
            "{}, {} {} ({})",
            address.city, address.state, address.postal_code, address.country
        ),
        10.0,
        false,
    );
    pdf.blank(8.0);

    let template = match order.grid_template {
        GridTemplateName::Square => "square",
        GridTemplateName::Hexagonal => "hexagonal",
    };
    pdf.line(
        &format!("Group: {} ({} grid)", order.group_name, template),
        10.0,
        false,
    );
    pdf.blank(6.0);

    pdf.row(
        &[(LEFT, "Description"), (QTY_X, "Qty"), (AMOUNT_X, "Amount")],
        10.0,
        true,
    );
    pdf.row(
        &[
            (LEFT, "Group photo print"),
            (QTY_X, "1"),
            (AMOUNT_X, format_rupees(pricing.base_paise).as_str()),
        ],
        10.0,
        false,
    );
    pdf.row(
        &[
            (LEFT, "Member portraits"),
            (QTY_X, pricing.member_count.to_string().as_str()),
            (AMOUNT_X, format_rupees(pricing.members_paise).as_str()),
        ],
        10.0,
        false,
    );
    pdf.row(
        &[(LEFT, "Subtotal"), (AMOUNT_X, format_rupees(pricing.subtotal_paise).as_str())],
        10.0,
        false,
    );
    pdf.row(
        &[
            (LEFT, format!("GST @ {}", format_rate(pricing.gst_rate_bps)).as_str()),
            (AMOUNT_X, format_rupees(pricing.gst_paise).as_str()),
        ],
        10.0,
        false,
    );
    pdf.row(
        &[(LEFT, "Total"), (AMOUNT_X, format_rupees(pricing.total_paise).as_str())],
        11.0,
        true,
    );
    pdf.blank(6.0);

    let payment = match order.payment.status {
        PaymentStatus::Pending => "Payment: pending".to_string(),
        PaymentStatus::Paid => format!(
            "Payment: paid {}{}",
            format_rupees(order.payment.amount_paise),
            order
                .payment
                .reference
                .as_deref()
                .map(|r| format!(" (ref {r})"))
                .unwrap_or_default()
        ),
        PaymentStatus::Failed => "Payment: failed".to_string(),
        PaymentStatus::Refunded => "Payment: refunded".to_string(),
    };
    pdf.line(&payment, 10.0, false);
    if let Some(code) = &order.referral_code {
        pdf.line(&format!("Referral code: {code}"), 10.0, false);
    }

    pdf.blank(10.0);
    pdf.line("Members", 11.0, true);
    for (index, member) in order.members.iter().enumerate() {
        let roll = member
            .roll_number
            .as_deref()
            .map(|r| format!(" - {r}"))
            .unwrap_or_default();
        pdf.line(&format!("{}. {}{}", index + 1, member.name, roll), 9.0, false);
    }

    pdf.finish()
}

/// `1800` -> `"18%"`, `1250` -> `"12.5%"`.
fn format_rate(bps: u32) -> String {
    let whole = bps / 100;
    let frac = bps % 100;
    if frac == 0 {
        format!("{whole}%")
    } else {
        format!("{whole}.{}%", format!("{frac:02}").trim_end_matches('0'))
    }
}
