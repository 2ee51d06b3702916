// Receipt validator - advisory plausibility checks
// Findings are hints for the user, never a reason to block assignment
// or split computation. All checks run on source-currency prices.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::item::LineItem;
use crate::normalize::round2;

// ============================================================================
// FINDINGS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Severity {
    Warning, // Numbers disagree, worth a second look
    Info,    // Unusual but plausible
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub code: String,
    /// Name of the offending item, when the finding is about one
    pub item: Option<String>,
    pub message: String,
    pub severity: Severity,
}

impl ValidationWarning {
    fn new(code: &str, item: Option<&str>, message: String, severity: Severity) -> Self {
        ValidationWarning {
            code: code.to_string(),
            item: item.map(|name| name.to_string()),
            message,
            severity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub warnings: Vec<ValidationWarning>,
    pub items_total: f64,
    pub receipt_total: Option<f64>,
    pub checked_at: DateTime<Utc>,
}

impl ValidationReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn summary(&self) -> String {
        match self.receipt_total {
            Some(total) => format!(
                "{} findings | items {:.2} vs receipt {:.2}",
                self.warnings.len(),
                self.items_total,
                total
            ),
            None => format!(
                "{} findings | items {:.2}, no receipt total",
                self.warnings.len(),
                self.items_total
            ),
        }
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

pub struct ReceiptValidator {
    /// Total mismatch tolerance as a fraction of the receipt total
    mismatch_fraction: f64,

    /// Total mismatch tolerance floor, in currency units
    mismatch_floor: f64,

    /// An item is an outlier above this multiple of the mean unit price
    outlier_multiplier: f64,

    /// Outlier check only runs when the mean unit price exceeds this
    outlier_min_average: f64,
}

impl ReceiptValidator {
    pub fn new() -> Self {
        ReceiptValidator {
            mismatch_fraction: 0.05,
            mismatch_floor: 2.0,
            outlier_multiplier: 3.0,
            outlier_min_average: 5.0,
        }
    }

    pub fn with_thresholds(
        mismatch_fraction: f64,
        mismatch_floor: f64,
        outlier_multiplier: f64,
        outlier_min_average: f64,
    ) -> Self {
        ReceiptValidator {
            mismatch_fraction,
            mismatch_floor,
            outlier_multiplier,
            outlier_min_average,
        }
    }

    /// Check the extracted items against the externally-reported total
    pub fn validate(&self, items: &[LineItem], receipt_total: Option<f64>) -> ValidationReport {
        let mut warnings = Vec::new();
        let items_total = round2(
            items
                .iter()
                .map(|item| item.unit_price * item.quantity as f64)
                .sum(),
        );

        // Rule 1: items should add up to the printed total, within a
        // tolerance that scales with the receipt but never drops below
        // the floor (small receipts are noisy)
        if let Some(total) = receipt_total {
            let tolerance = (self.mismatch_fraction * total).max(self.mismatch_floor);
            let gap = (items_total - total).abs();
            if gap > tolerance {
                warnings.push(ValidationWarning::new(
                    "total_mismatch",
                    None,
                    format!(
                        "items add up to {:.2} but the receipt says {:.2}",
                        items_total, total
                    ),
                    Severity::Warning,
                ));
            }
        }

        // Rule 2: prices far above the receipt's own average are usually
        // extraction errors. Skipped on cheap receipts where the spread
        // is naturally wide.
        if !items.is_empty() {
            let mean = items.iter().map(|item| item.unit_price).sum::<f64>() / items.len() as f64;
            if mean > self.outlier_min_average {
                for item in items {
                    if item.unit_price > self.outlier_multiplier * mean {
                        warnings.push(ValidationWarning::new(
                            "price_outlier",
                            Some(&item.name),
                            format!(
                                "{:.2} is unusually high against the {:.2} average",
                                item.unit_price, mean
                            ),
                            Severity::Info,
                        ));
                    }
                }
            }
        }

        // Rule 3: zero and negative unit prices
        for item in items {
            if item.unit_price <= 0.0 {
                warnings.push(ValidationWarning::new(
                    "invalid_price",
                    Some(&item.name),
                    format!("invalid price {:.2}", item.unit_price),
                    Severity::Warning,
                ));
            }
        }

        debug!("validation: {} findings", warnings.len());

        ValidationReport {
            warnings,
            items_total,
            receipt_total,
            checked_at: Utc::now(),
        }
    }
}

impl Default for ReceiptValidator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
