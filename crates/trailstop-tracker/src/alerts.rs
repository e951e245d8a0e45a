//! Alert message composition.

use trailstop_store::SymbolRecord;

/// Subject line for stop-loss alerts.
pub const ALERT_SUBJECT: &str = "Stop-loss alert";

/// Compose one aggregated message covering every due breach.
#[must_use]
pub fn compose_alert_message(rows: &[SymbolRecord]) -> String {
    let mut message = String::from("Stop-loss breached:\n");
    for row in rows {
        message.push_str(&format!(
            "{} at {} {} (threshold {}, peak {})\n",
            row.ticker, row.current_price, row.currency, row.stop_loss, row.peak_price
        ));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use trailstop_core::{Price, Ticker};

    #[test]
    fn test_message_lists_every_breach() {
        let mut a = SymbolRecord::new(
            Ticker::new("AAPL").unwrap(),
            Price::new(dec!(120)).unwrap(),
            Price::new(dec!(108)).unwrap(),
            "USD".to_string(),
        );
        a.current_price = Price::new(dec!(100)).unwrap();
        let b = SymbolRecord::new(
            Ticker::new("SHOP.TO").unwrap(),
            Price::new(dec!(80)).unwrap(),
            Price::new(dec!(72)).unwrap(),
            "CAD".to_string(),
        );

        let message = compose_alert_message(&[a, b]);
        assert!(message.contains("AAPL at 100 USD (threshold 108, peak 120)"));
        assert!(message.contains("SHOP.TO at 80 CAD (threshold 72, peak 80)"));
    }
}
