//! Range/shape invariants enforced at the ETL boundary (spec §3.2).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{ErrorKind, QuotronError};
use crate::types::{MarketIndex, Quote};

const MIN_PRICE: Decimal = dec!(0.0001);
const MAX_PRICE: Decimal = dec!(1000000);

fn validate_symbol(symbol: &str) -> Result<(), QuotronError> {
    if symbol.is_empty() || symbol.len() > 20 {
        return Err(QuotronError::Permanent(format!(
            "symbol length out of range (1-20): {symbol:?}"
        )));
    }
    let ok = symbol
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '.');
    if !ok {
        return Err(QuotronError::Permanent(format!(
            "symbol contains invalid characters: {symbol:?}"
        )));
    }
    Ok(())
}

fn validate_price_range(price: Decimal) -> Result<(), QuotronError> {
    if price < Decimal::ZERO {
        return Err(QuotronError::Permanent(format!(
            "price must be non-negative, got {price}"
        )));
    }
    if price != Decimal::ZERO && (price < MIN_PRICE || price > MAX_PRICE) {
        return Err(QuotronError::Permanent(format!(
            "price {price} out of reasonable range [{MIN_PRICE}, {MAX_PRICE}]"
        )));
    }
    Ok(())
}

/// Validate a [`Quote`] against the invariants in spec §3.2. Returns the
/// first violation found.
pub fn validate_quote(quote: &Quote) -> Result<(), QuotronError> {
    validate_symbol(&quote.symbol)?;
    validate_price_range(quote.price)?;
    Ok(())
}

/// Validate a [`MarketIndex`] against the same range invariants.
pub fn validate_index(index: &MarketIndex) -> Result<(), QuotronError> {
    if index.name.is_empty() {
        return Err(QuotronError::Permanent("index name is empty".into()));
    }
    validate_price_range(index.value)?;
    Ok(())
}

/// Whether an error kind should be retried by acknowledging-and-dropping
/// (Permanent) vs. leaving unacknowledged for redelivery (Transient).
pub fn is_retryable(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::Transient | ErrorKind::Timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn quote(symbol: &str, price: Decimal) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            price,
            change: Decimal::ZERO,
            change_percent: Decimal::ZERO,
            volume: 0,
            timestamp: Utc::now(),
            exchange: crate::types::Exchange::Nasdaq,
            source: crate::types::Source::ApiScraper,
        }
    }

    #[test]
    fn rejects_negative_price() {
        let q = quote("AAPL", dec!(-1));
        assert!(validate_quote(&q).is_err());
    }

    #[test]
    fn rejects_price_above_range() {
        let q = quote("AAPL", dec!(2000000));
        assert!(validate_quote(&q).is_err());
    }

    #[test]
    fn accepts_zero_price() {
        // Zero is used by some feeds for "no trade yet"; still non-negative.
        let q = quote("AAPL", Decimal::ZERO);
        assert!(validate_quote(&q).is_ok());
    }

    #[test]
    fn accepts_reasonable_price() {
        let q = quote("AAPL", dec!(189.23));
        assert!(validate_quote(&q).is_ok());
    }

    #[test]
    fn rejects_empty_symbol() {
        let q = quote("", dec!(1));
        assert!(validate_quote(&q).is_err());
    }

    #[test]
    fn accepts_hyphenated_crypto_symbol() {
        let q = quote("BTC-USD", dec!(67500));
        assert!(validate_quote(&q).is_ok());
    }

    #[test]
    fn rejects_symbol_too_long() {
        let q = quote("ABCDEFGHIJKLMNOPQRSTUVWXYZ", dec!(1));
        assert!(validate_quote(&q).is_err());
    }
}
