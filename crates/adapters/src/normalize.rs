//! Exchange-code and timestamp normalization shared by every adapter.

use chrono::{DateTime, TimeZone, Utc};
use quotron_core::Exchange;

/// Map a provider-specific exchange code to the canonical [`Exchange`]
/// vocabulary (spec §4.1). Hyphenated symbols (e.g. `BTC-USD`) are always
/// `CRYPTO` regardless of the code the provider reports.
pub fn normalize_exchange(symbol: &str, code: &str) -> Exchange {
    if symbol.contains('-') {
        return Exchange::Crypto;
    }
    match code.to_uppercase().as_str() {
        "NYSE" | "NYQ" => Exchange::Nyse,
        "NMS" | "NGS" | "NAS" | "NCM" | "NASDAQ" => Exchange::Nasdaq,
        "ASE" | "CBOE" | "AMEX" => Exchange::Amex,
        code if code.starts_with("OTC") => Exchange::Otc,
        _ => Exchange::Other,
    }
}

/// Normalize a provider-supplied epoch-seconds timestamp to UTC, falling
/// back to now if the provider sent something unparseable.
pub fn normalize_timestamp(epoch_secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(epoch_secs, 0).single().unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nasdaq_codes() {
        for code in ["NMS", "NGS", "NAS", "NCM"] {
            assert_eq!(normalize_exchange("AAPL", code), Exchange::Nasdaq);
        }
    }

    #[test]
    fn test_amex_codes() {
        assert_eq!(normalize_exchange("SPY", "ASE"), Exchange::Amex);
        assert_eq!(normalize_exchange("SPY", "CBOE"), Exchange::Amex);
    }

    #[test]
    fn test_otc_prefix() {
        assert_eq!(normalize_exchange("XYZF", "OTCMKTS"), Exchange::Otc);
    }

    #[test]
    fn test_hyphenated_symbol_forces_crypto() {
        assert_eq!(normalize_exchange("BTC-USD", "NMS"), Exchange::Crypto);
    }

    #[test]
    fn test_unknown_code_is_other() {
        assert_eq!(normalize_exchange("AAPL", "XYZ"), Exchange::Other);
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let ts = normalize_timestamp(1_700_000_000);
        assert_eq!(ts.timestamp(), 1_700_000_000);
    }
}
