use crate::application::orchestrator::{Confirmation, Session};
use crate::domain::amount::{PRESET_AMOUNTS, TIP_PERCENTS};
use rust_decimal::Decimal;
use std::fmt::Write;

/// Formats an amount in the gateway's minor unit (paise) as rupees.
pub fn format_minor_units(amount: u64) -> String {
    let mut value = Decimal::from(amount) / Decimal::ONE_HUNDRED;
    value.rescale(2);
    value.to_string()
}

/// The contribution summary shown before submitting.
pub fn render_summary(session: &Session) -> String {
    let selection = session.selection();
    let mut out = String::new();

    let presets: Vec<String> = PRESET_AMOUNTS
        .iter()
        .map(|preset| {
            if selection.is_highlighted(*preset) {
                format!("[₹{preset}]")
            } else {
                format!(" ₹{preset} ")
            }
        })
        .collect();
    let _ = writeln!(out, "Amount:  {}", presets.join(" "));
    if selection.custom_active() {
        let _ = writeln!(out, "Other:   ₹{}", selection.custom_amount());
    }

    let tips: Vec<String> = TIP_PERCENTS
        .iter()
        .map(|tip| match selection.tip_preview(*tip) {
            Ok(value) => format!("{tip}% (₹{})", value.normalize()),
            Err(_) => format!("{tip}%"),
        })
        .collect();
    let _ = writeln!(
        out,
        "Tip:     {}%  (options: {})",
        selection.tip_percent(),
        tips.join(", ")
    );
    match session.total() {
        Some(total) => {
            let _ = writeln!(out, "Total Amount: INR {total}");
        }
        None => {
            let _ = writeln!(out, "Total Amount: --");
        }
    }
    out
}

/// Inline validation messages and the last notice, one per line.
pub fn render_problems(session: &Session) -> String {
    let mut out = String::new();
    for (field, message) in session.errors().iter() {
        let _ = writeln!(out, "{field}: {message}");
    }
    if let Some(notice) = session.notice() {
        let _ = writeln!(out, "{notice}");
    }
    out
}

pub fn render_confirmation(confirmation: &Confirmation) -> String {
    format!(
        "Payment Successful!\n\
         Thank you for your contribution. Payment ID: {}\n\
         Did You Know?\n\
         {}\n",
        confirmation.payment_id, confirmation.fact
    )
}
