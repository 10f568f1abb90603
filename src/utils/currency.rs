/// Currency utility functions for handling dollar conversions
///
/// All monetary values in the database are stored in cents (1 dollar = 100
/// cents) to avoid floating-point precision issues.

/// Convert dollars to cents (multiply by 100)
pub fn dollars_to_cents(dollars: f64) -> i64 {
    (dollars * 100.0).round() as i64
}

/// Convert cents to dollars (divide by 100)
pub fn cents_to_dollars(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Format cents as a dollar string with 2 decimal places
pub fn format_cents_as_dollars(cents: i64) -> String {
    format!("${:.2}", cents_to_dollars(cents))
}

/// A bid amount derived from an hourly rate is the exact integer product
/// rate × hours, so a bid submitted as (rate, hours) stores the same
/// amount as one submitted with the product entered directly.
pub fn bid_amount_from_rate(hourly_rate_cents: i64, estimated_hours: i64) -> i64 {
    hourly_rate_cents * estimated_hours
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dollars_to_cents() {
        assert_eq!(dollars_to_cents(100.0), 10000);
        assert_eq!(dollars_to_cents(0.50), 50);
        assert_eq!(dollars_to_cents(123.45), 12345);
    }

    #[test]
    fn test_cents_to_dollars() {
        assert_eq!(cents_to_dollars(10000), 100.0);
        assert_eq!(cents_to_dollars(50), 0.50);
        assert_eq!(cents_to_dollars(12345), 123.45);
    }

    #[test]
    fn test_format_cents_as_dollars() {
        assert_eq!(format_cents_as_dollars(10000), "$100.00");
        assert_eq!(format_cents_as_dollars(50), "$0.50");
        assert_eq!(format_cents_as_dollars(12345), "$123.45");
    }

    #[test]
    fn test_bid_amount_from_rate_is_exact() {
        // 85.00/hr for 12 hours
        assert_eq!(bid_amount_from_rate(8500, 12), 102000);
        // odd cents never lose precision
        assert_eq!(bid_amount_from_rate(333, 3), 999);
        assert_eq!(bid_amount_from_rate(0, 40), 0);
    }
}
