// Currency detection - rules as data
// Symbol, word and place tables applied in priority order; first hit wins.

use anyhow::{Context as AnyhowContext, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::normalize::contains_keyword;

/// Fallback when nothing in the text gives the currency away
pub const DEFAULT_CURRENCY: &str = "EUR";

// European amounts: decimal comma, no dollar-style decimals anywhere
re!(re_decimal_comma, r"\d+,\d{2}");
re!(re_decimal_dot, r"\$?\d+\.\d{2}");

// ============================================================================
// RULE TABLES
// ============================================================================

/// One keyword -> ISO-4217 code mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyRule {
    pub keyword: String,
    pub code: String,
}

impl CurrencyRule {
    fn new(keyword: &str, code: &str) -> Self {
        CurrencyRule {
            keyword: keyword.to_string(),
            code: code.to_string(),
        }
    }
}

/// The three lookup tables, in the order they are consulted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyTables {
    /// Symbols matched anywhere in the text: "€", "$", ...
    pub symbols: Vec<CurrencyRule>,

    /// Currency words and ISO codes, word-boundary matched: "euros", "usd"
    pub words: Vec<CurrencyRule>,

    /// Place names that imply a currency (euro-area cities and countries)
    pub places: Vec<CurrencyRule>,
}

impl CurrencyTables {
    /// Built-in tables covering the receipts the app actually sees:
    /// euro-area paper receipts first, the usual travel currencies after.
    pub fn builtin() -> Self {
        CurrencyTables {
            symbols: vec![
                CurrencyRule::new("€", "EUR"),
                CurrencyRule::new("$", "USD"),
                CurrencyRule::new("£", "GBP"),
                CurrencyRule::new("¥", "JPY"),
                CurrencyRule::new("₹", "INR"),
                CurrencyRule::new("₽", "RUB"),
                CurrencyRule::new("₩", "KRW"),
                CurrencyRule::new("¢", "USD"),
            ],
            words: vec![
                CurrencyRule::new("euro", "EUR"),
                CurrencyRule::new("euros", "EUR"),
                CurrencyRule::new("eur", "EUR"),
                // pesetas still show up on old-school Spanish receipts
                CurrencyRule::new("peseta", "EUR"),
                CurrencyRule::new("pesetas", "EUR"),
                CurrencyRule::new("dollar", "USD"),
                CurrencyRule::new("dollars", "USD"),
                CurrencyRule::new("dolar", "USD"),
                CurrencyRule::new("dólar", "USD"),
                CurrencyRule::new("usd", "USD"),
                CurrencyRule::new("pound", "GBP"),
                CurrencyRule::new("pounds", "GBP"),
                CurrencyRule::new("gbp", "GBP"),
                CurrencyRule::new("yen", "JPY"),
                CurrencyRule::new("jpy", "JPY"),
                CurrencyRule::new("rupee", "INR"),
                CurrencyRule::new("rupees", "INR"),
                CurrencyRule::new("ruble", "RUB"),
                CurrencyRule::new("rouble", "RUB"),
                CurrencyRule::new("won", "KRW"),
            ],
            places: [
                "spain", "españa", "espana", "madrid", "barcelona", "valencia", "sevilla",
                "bilbao", "granada", "malaga", "zaragoza", "france", "francia", "paris",
                "lyon", "marseille", "italy", "italia", "roma", "rome", "milano", "milan",
                "napoli", "venezia", "germany", "alemania", "deutschland", "berlin",
                "munich", "münchen", "hamburg", "portugal", "lisboa", "lisbon", "porto",
                "netherlands", "amsterdam", "austria", "wien", "vienna", "belgium",
                "brussels", "bruxelles", "ireland", "dublin", "greece", "athens",
            ]
            .iter()
            .map(|place| CurrencyRule::new(place, "EUR"))
            .collect(),
        }
    }
}

// ============================================================================
// DETECTOR
// ============================================================================

pub struct CurrencyDetector {
    tables: CurrencyTables,
}

impl CurrencyDetector {
    /// Detector with the built-in tables
    pub fn new() -> Self {
        CurrencyDetector {
            tables: CurrencyTables::builtin(),
        }
    }

    /// Load tables from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read currency tables: {:?}", path.as_ref()))?;

        let tables: CurrencyTables =
            serde_json::from_str(&content).context("Failed to parse currency tables JSON")?;

        Ok(CurrencyDetector { tables })
    }

    pub fn from_tables(tables: CurrencyTables) -> Self {
        CurrencyDetector { tables }
    }

    /// Detect the receipt currency from raw text.
    ///
    /// Priority: symbols, then currency words, then place names, then the
    /// European decimal-comma heuristic, then `DEFAULT_CURRENCY`. Always
    /// returns a code.
    pub fn detect(&self, text: &str) -> String {
        for rule in &self.tables.symbols {
            if text.contains(&rule.keyword) {
                debug!("currency: symbol {:?} -> {}", rule.keyword, rule.code);
                return rule.code.clone();
            }
        }

        for rule in &self.tables.words {
            if contains_keyword(text, &rule.keyword) {
                debug!("currency: word {:?} -> {}", rule.keyword, rule.code);
                return rule.code.clone();
            }
        }

        for rule in &self.tables.places {
            if contains_keyword(text, &rule.keyword) {
                debug!("currency: place {:?} -> {}", rule.keyword, rule.code);
                return rule.code.clone();
            }
        }

        // "12,50" somewhere but no "12.50" anywhere: European formatting
        if re_decimal_comma().is_match(text) && !re_decimal_dot().is_match(text) {
            debug!("currency: decimal-comma heuristic -> EUR");
            return "EUR".to_string();
        }

        DEFAULT_CURRENCY.to_string()
    }
}

impl Default for CurrencyDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot detection with the built-in tables
pub fn detect_currency(text: &str) -> String {
    CurrencyDetector::new().detect(text)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_beats_everything() {
        assert_eq!(detect_currency("Total: €12,50"), "EUR");
        assert_eq!(detect_currency("Total: $12.50"), "USD");
        assert_eq!(detect_currency("£3.20 crisps"), "GBP");
        assert_eq!(detect_currency("¥1200 ramen"), "JPY");
    }

    #[test]
    fn test_symbol_order_on_mixed_text() {
        // euro symbol listed first wins over a later dollar sign
        assert_eq!(detect_currency("Menu €10 (approx $11)"), "EUR");
    }

    #[test]
    fn test_currency_words() {
        assert_eq!(detect_currency("total 12.50 dollars"), "USD");
        assert_eq!(detect_currency("Precio en euros"), "EUR");
        assert_eq!(detect_currency("500 pesetas"), "EUR");
        assert_eq!(detect_currency("paid 20.00 USD"), "USD");
    }

    #[test]
    fn test_place_names_imply_eur() {
        assert_eq!(detect_currency("RESTAURANTE LA PLAZA\nMadrid\nMenu 12.00"), "EUR");
        assert_eq!(detect_currency("Trattoria Roma - grazie"), "EUR");
    }

    #[test]
    fn test_decimal_comma_heuristic() {
        assert_eq!(detect_currency("Cafe 1,20\nTostada 2,50"), "EUR");
        // dot decimals suppress the heuristic, falls through to default
        assert_eq!(detect_currency("Coffee 1.20 and pastry 2,50"), "EUR");
    }

    #[test]
    fn test_default_is_eur() {
        assert_eq!(detect_currency("no numbers here"), "EUR");
        assert_eq!(detect_currency(""), "EUR");
    }

    #[test]
    fn test_custom_tables() {
        let tables = CurrencyTables {
            symbols: vec![CurrencyRule::new("₣", "CHF")],
            words: vec![],
            places: vec![],
        };
        let detector = CurrencyDetector::from_tables(tables);
        assert_eq!(detector.detect("₣ 9.50"), "CHF");
        assert_eq!(detector.detect("plain text"), "EUR");
    }
}
