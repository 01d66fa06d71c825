use crate::constants::CURRENCY_SYMBOL;

/// Formats an order total the way order pages show it. A missing total
/// is shown as zero.
pub fn format_total(total: Option<f64>) -> String {
    let amount = total.unwrap_or(0.0);
    if amount.fract() == 0.0 {
        format!("{:.0} {}", amount, CURRENCY_SYMBOL)
    } else {
        format!("{:.2} {}", amount, CURRENCY_SYMBOL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_whole_and_fractional_totals() {
        assert_eq!(format_total(Some(12000.0)), "12000 ₩");
        assert_eq!(format_total(Some(9.5)), "9.50 ₩");
        assert_eq!(format_total(None), "0 ₩");
    }
}
