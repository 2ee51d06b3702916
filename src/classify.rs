// Special-item classification - rules as data
// Decides per item: drop it, flag it as a special charge, or leave it alone.
// Keyword families are plain data so deployments can extend them without
// touching code.

use anyhow::{Context as AnyhowContext, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::item::{ItemKind, LineItem, SpecialKind};
use crate::normalize::{contains_keyword, starts_with_keyword};

// ============================================================================
// TAX METADATA
// ============================================================================

/// Whether printed prices already contain tax. Supplied by the
/// document-understanding service; the classifier never infers it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxContext {
    pub included: bool,

    /// Why upstream believes so ("IVA incluido printed on footer")
    #[serde(default)]
    pub reason: String,
}

impl TaxContext {
    pub fn excluded() -> Self {
        TaxContext::default()
    }

    pub fn included(reason: impl Into<String>) -> Self {
        TaxContext {
            included: true,
            reason: reason.into(),
        }
    }
}

// ============================================================================
// KEYWORD FAMILIES
// ============================================================================

/// Named keyword list, matched case-insensitively on word boundaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordFamily {
    pub name: String,
    pub keywords: Vec<String>,
}

impl KeywordFamily {
    fn new(name: &str, keywords: &[&str]) -> Self {
        KeywordFamily {
            name: name.to_string(),
            keywords: keywords.iter().map(|kw| kw.to_string()).collect(),
        }
    }

    /// Any keyword appears somewhere in the text
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|kw| contains_keyword(text, kw))
    }

    /// The text is a keyword or starts with one ("Subtotal (pre-tax)")
    pub fn matches_prefix(&self, text: &str) -> bool {
        self.keywords.iter().any(|kw| starts_with_keyword(text, kw))
    }
}

/// The six families the classifier consults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierRules {
    pub totals: KeywordFamily,
    pub taxes: KeywordFamily,
    pub tips: KeywordFamily,
    pub discounts: KeywordFamily,
    pub fees: KeywordFamily,
    pub legit_services: KeywordFamily,
}

impl ClassifierRules {
    pub fn builtin() -> Self {
        ClassifierRules {
            totals: KeywordFamily::new(
                "totals",
                &[
                    "total", "subtotal", "total qty", "total a pagar", "grand total",
                    "amount due", "balance due", "suma", "totale", "gesamt", "montant total",
                    "importe total",
                ],
            ),
            taxes: KeywordFamily::new(
                "taxes",
                &[
                    "tax", "vat", "iva", "gst", "hst", "pst", "sales tax", "city tax",
                    "tourist tax", "impuesto", "impuestos",
                ],
            ),
            tips: KeywordFamily::new("tips", &["tip", "tips", "gratuity", "propina"]),
            discounts: KeywordFamily::new(
                "discounts",
                &["discount", "descuento", "promo", "promotion", "coupon", "cupon", "cupón"],
            ),
            fees: KeywordFamily::new(
                "fees",
                &[
                    "service charge", "svc charge", "service fee", "delivery fee",
                    "convenience fee", "booking fee", "processing fee", "handling fee",
                    "corkage fee", "cover charge", "facility fee", "administrative fee",
                    "maintenance fee", "cargo por servicio", "suplemento", "supplement",
                ],
            ),
            legit_services: KeywordFamily::new(
                "legit_services",
                &[
                    "room service", "servicio de habitaciones", "laundry", "lavanderia",
                    "lavandería", "spa", "minibar", "mini bar", "tour", "parking", "massage",
                    "masaje",
                ],
            ),
        }
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

pub struct Classifier {
    rules: ClassifierRules,
}

impl Classifier {
    /// Classifier with the built-in families
    pub fn new() -> Self {
        Classifier {
            rules: ClassifierRules::builtin(),
        }
    }

    /// Load families from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read classifier rules: {:?}", path.as_ref()))?;

        let rules: ClassifierRules =
            serde_json::from_str(&content).context("Failed to parse classifier rules JSON")?;

        Ok(Classifier { rules })
    }

    pub fn from_rules(rules: ClassifierRules) -> Self {
        Classifier { rules }
    }

    /// Classify one item. `None` means the row must not reach the split
    /// (total rows, tax rows when prices already include tax).
    ///
    /// Idempotent: feeding a surviving item back in returns it unchanged.
    pub fn classify(&self, mut item: LineItem, tax: &TaxContext) -> Option<LineItem> {
        // total rows are summary lines, never payable items
        if self.rules.totals.matches_prefix(&item.name) {
            debug!("classify: dropping total row {:?}", item.name);
            return None;
        }
        if item.kind == ItemKind::Special(SpecialKind::Total) {
            debug!("classify: dropping pre-flagged total {:?}", item.name);
            return None;
        }

        match item.kind {
            ItemKind::Regular => {
                if self.rules.taxes.matches(&item.name) {
                    item.kind = ItemKind::Special(SpecialKind::Tax);
                } else if self.rules.tips.matches(&item.name) {
                    item.kind = ItemKind::Special(SpecialKind::Tip);
                } else if self.rules.discounts.matches(&item.name) {
                    item.kind = ItemKind::Special(SpecialKind::Discount);
                } else if self.rules.fees.matches(&item.name)
                    && !self.rules.legit_services.matches(&item.name)
                {
                    // the legit-service exclusion keeps this rule and the
                    // demotion below from flip-flopping on names like
                    // "Room Service Charge"
                    item.kind = ItemKind::Special(SpecialKind::ServiceCharge);
                }
            }
            ItemKind::Special(SpecialKind::ServiceCharge) => {
                if self.rules.legit_services.matches(&item.name) {
                    // a billed room-service or laundry line is a consumable,
                    // not a fee
                    debug!("classify: {:?} is a legit service, back to regular", item.name);
                    item.kind = ItemKind::Regular;
                }
            }
            _ => {}
        }

        // included tax is already inside the printed prices
        if item.kind == ItemKind::Special(SpecialKind::Tax) && tax.included {
            debug!(
                "classify: dropping tax row {:?} (included: {})",
                item.name, tax.reason
            );
            return None;
        }

        if item.is_special() {
            debug!("classify: {:?} -> {:?}", item.name, item.kind);
        }
        Some(item)
    }

    /// Classify a batch, dropping the `None`s. Order and ids survive.
    pub fn classify_all(&self, items: Vec<LineItem>, tax: &TaxContext) -> Vec<LineItem> {
        let before = items.len();
        let kept: Vec<LineItem> = items
            .into_iter()
            .filter_map(|item| self.classify(item, tax))
            .collect();
        if kept.len() != before {
            debug!("classify: dropped {} of {} rows", before - kept.len(), before);
        }
        kept
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
