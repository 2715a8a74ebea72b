//! Instrument to trading-pair normalization.
//!
//! TradingView tickers look like `BITGET:BTCUSDT.P` or `BITGET:BTCUSDTPERP`;
//! Bitget mix symbols look like `BTCUSDT`. This is a best-effort heuristic,
//! not a lookup against the exchange's instrument list: anything that does
//! not look like a USDT pair after stripping venue prefixes and perpetual
//! decorations falls back to the configured default symbol.

/// Used when the configured default symbol itself is empty.
pub const FALLBACK_SYMBOL: &str = "BTCUSDT";

const QUOTE: &str = "USDT";
const MIN_BASE_LEN: usize = 3;
const MAX_BASE_LEN: usize = 6;

/// Map a loosely formatted instrument to a Bitget symbol. Never fails.
pub fn normalize_symbol(raw: &str, default_symbol: &str) -> String {
    let upper = raw.trim().to_uppercase();
    let ticker = match upper.rsplit_once(':') {
        Some((_venue, ticker)) => ticker.trim(),
        None => upper.as_str(),
    };

    let ticker = ticker.strip_suffix(".P").unwrap_or(ticker);
    let candidate = ticker.replace("PERP", "").replace("USDTP", QUOTE);

    if is_usdt_pair(&candidate) {
        candidate
    } else {
        default_or_fallback(default_symbol)
    }
}

/// 3-6 uppercase letters/digits followed by `USDT`.
fn is_usdt_pair(symbol: &str) -> bool {
    let Some(base) = symbol.strip_suffix(QUOTE) else {
        return false;
    };
    (MIN_BASE_LEN..=MAX_BASE_LEN).contains(&base.len())
        && base
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

fn default_or_fallback(default_symbol: &str) -> String {
    let default_symbol = default_symbol.trim().to_uppercase();
    if default_symbol.is_empty() {
        FALLBACK_SYMBOL.to_string()
    } else {
        default_symbol
    }
}
