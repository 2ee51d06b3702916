// Currency conversion boundary
// The engine never fetches rates itself; callers hand in a provider.
// Conversion failure keeps the source-currency amounts and is surfaced
// through the status only, never as an error.

use anyhow::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::item::LineItem;
use crate::normalize::{round2, round3};

/// Source of exchange rates (live API client, cached table, test stub).
pub trait ExchangeRateProvider: Send + Sync {
    /// Units of `to` per one unit of `from`
    fn rate(&self, from: &str, to: &str) -> Result<f64>;
}

/// What happened to the amounts, kept alongside them so a caller can tell
/// stale source-currency prices from a real conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConversionStatus {
    NotRequested,
    SameCurrency,
    Converted { rate: f64, from: String, to: String },
    Failed { reason: String },
}

impl ConversionStatus {
    pub fn is_converted(&self) -> bool {
        matches!(self, ConversionStatus::Converted { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ConversionStatus::Failed { .. })
    }
}

pub struct ConversionOutcome {
    pub items: Vec<LineItem>,
    pub status: ConversionStatus,
}

/// Re-price items from one currency into another.
///
/// The rate is rounded to 3 decimals, the resulting amounts to cents.
/// Identity, kind, quantity and flags pass through untouched, so the
/// results can be merged back over an assignment state by id. Same
/// currency on both sides short-circuits; any provider problem (including
/// a useless non-positive rate) returns the items exactly as given.
pub fn convert_items(
    provider: &dyn ExchangeRateProvider,
    items: &[LineItem],
    from: &str,
    to: &str,
) -> ConversionOutcome {
    if from.eq_ignore_ascii_case(to) {
        debug!("conversion: {} -> {} is a no-op", from, to);
        return ConversionOutcome {
            items: items.to_vec(),
            status: ConversionStatus::SameCurrency,
        };
    }

    let raw_rate = match provider.rate(from, to) {
        Ok(rate) => rate,
        Err(err) => {
            warn!("conversion: no rate for {} -> {}: {:#}", from, to, err);
            return ConversionOutcome {
                items: items.to_vec(),
                status: ConversionStatus::Failed {
                    reason: err.to_string(),
                },
            };
        }
    };

    let rate = round3(raw_rate);
    if rate <= 0.0 {
        warn!("conversion: unusable rate {} for {} -> {}", raw_rate, from, to);
        return ConversionOutcome {
            items: items.to_vec(),
            status: ConversionStatus::Failed {
                reason: format!("unusable exchange rate {}", raw_rate),
            },
        };
    }

    debug!("conversion: {} -> {} at {} (raw {})", from, to, rate, raw_rate);

    let converted = items
        .iter()
        .map(|item| {
            let mut update = item.clone();
            update.converted_unit_price = Some(round2(item.unit_price * rate));
            update.converted_line_total = Some(round2(item.line_total * rate));
            update
        })
        .collect();

    ConversionOutcome {
        items: converted,
        status: ConversionStatus::Converted {
            rate,
            from: from.to_uppercase(),
            to: to.to_uppercase(),
        },
    }
}

// ============================================================================
// TESTS
// ============================================================================
