// Core receipt model shared by every engine in the crate

use serde::{Deserialize, Serialize};

// ============================================================================
// ITEM KINDS
// ============================================================================

/// SpecialKind - Charges that are not consumable dishes/products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialKind {
    Tax,
    ServiceCharge,
    Tip,
    Discount,
    Total,
}

impl SpecialKind {
    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            SpecialKind::Tax => "Tax",
            SpecialKind::ServiceCharge => "Service charge",
            SpecialKind::Tip => "Tip",
            SpecialKind::Discount => "Discount",
            SpecialKind::Total => "Total",
        }
    }
}

/// ItemKind - Regular consumable vs special charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Regular,
    Special(SpecialKind),
}

impl Default for ItemKind {
    fn default() -> Self {
        ItemKind::Regular
    }
}

// ============================================================================
// LINE ITEM
// ============================================================================

/// A single receipt row after extraction.
///
/// Identity vs value: `id` never changes once assigned, even when prices are
/// re-priced into another currency or the kind is corrected by the
/// classifier. Assignments and conversion merges reference items by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Stable identity (UUID) - assigned at extraction or deserialization
    #[serde(default = "default_uuid")]
    pub id: String,

    pub name: String,

    /// Price of one unit, in the source currency
    pub unit_price: f64,

    /// Number of units (>= 1)
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Row total as printed, or unit_price * quantity when the row had none
    pub line_total: f64,

    #[serde(default)]
    pub kind: ItemKind,

    /// When set, the whole line splits evenly regardless of quantity
    #[serde(default)]
    pub share_equally: bool,

    // Set only by a successful currency conversion
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_unit_price: Option<f64>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_line_total: Option<f64>,
}

// Helper functions for serde defaults
fn default_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_quantity() -> u32 {
    1
}

impl LineItem {
    /// Create an item with a fresh identity
    pub fn new(name: impl Into<String>, unit_price: f64, quantity: u32, line_total: f64) -> Self {
        LineItem {
            id: default_uuid(),
            name: name.into(),
            unit_price,
            quantity: quantity.max(1),
            line_total,
            kind: ItemKind::Regular,
            share_equally: false,
            converted_unit_price: None,
            converted_line_total: None,
        }
    }

    /// Builder pattern: set the kind
    pub fn with_kind(mut self, kind: ItemKind) -> Self {
        self.kind = kind;
        self
    }

    /// Builder pattern: set the share-equally flag
    pub fn with_share_equally(mut self, flag: bool) -> Self {
        self.share_equally = flag;
        self
    }

    pub fn is_special(&self) -> bool {
        matches!(self.kind, ItemKind::Special(_))
    }

    pub fn special_kind(&self) -> Option<SpecialKind> {
        match self.kind {
            ItemKind::Special(kind) => Some(kind),
            ItemKind::Regular => None,
        }
    }

    /// True when the item is assigned unit by unit (quantity slots).
    /// Single-unit and share-equally items are assigned as one shared pool.
    pub fn per_unit(&self) -> bool {
        self.quantity > 1 && !self.share_equally
    }

    /// Unit price after conversion, falling back to the source price
    pub fn effective_unit_price(&self) -> f64 {
        self.converted_unit_price.unwrap_or(self.unit_price)
    }

    /// Line total after conversion, falling back to the source total
    pub fn effective_line_total(&self) -> f64 {
        self.converted_line_total.unwrap_or(self.line_total)
    }

    pub fn clear_conversion(&mut self) {
        self.converted_unit_price = None;
        self.converted_line_total = None;
    }
}

// ============================================================================
// DOCUMENT-UNDERSTANDING PAYLOAD
// ============================================================================

/// Response of the external document-understanding service.
///
/// The engine never performs that call; it consumes the payload. When the
/// service already produced structured `items`, extraction from `raw_text`
/// is skipped and those items are classified as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptAnalysis {
    #[serde(default)]
    pub raw_text: String,

    /// ISO-4217 code when the service detected one
    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub tax_included: bool,

    #[serde(default)]
    pub tax_inclusion_reason: String,

    #[serde(default)]
    pub detected_language: Option<String>,

    #[serde(default)]
    pub restaurant_name: Option<String>,

    #[serde(default)]
    pub receipt_total: Option<f64>,

    #[serde(default)]
    pub subtotal: Option<f64>,

    /// Pre-extracted items, possibly pre-flagged as special charges
    #[serde(default)]
    pub items: Vec<LineItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_gets_unique_id() {
        let a = LineItem::new("Pizza", 10.0, 1, 10.0);
        let b = LineItem::new("Pizza", 10.0, 1, 10.0);
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_effective_prices_fall_back_to_source() {
        let mut item = LineItem::new("Cola", 2.5, 2, 5.0);
        assert_eq!(item.effective_unit_price(), 2.5);
        assert_eq!(item.effective_line_total(), 5.0);

        item.converted_unit_price = Some(2.75);
        item.converted_line_total = Some(5.5);
        assert_eq!(item.effective_unit_price(), 2.75);
        assert_eq!(item.effective_line_total(), 5.5);

        item.clear_conversion();
        assert_eq!(item.effective_unit_price(), 2.5);
    }

    #[test]
    fn test_per_unit_mode() {
        let single = LineItem::new("Soup", 4.0, 1, 4.0);
        assert!(!single.per_unit());

        let multi = LineItem::new("Beer", 3.0, 4, 12.0);
        assert!(multi.per_unit());

        let pooled = LineItem::new("Paella", 18.0, 2, 36.0).with_share_equally(true);
        assert!(!pooled.per_unit());
    }

    #[test]
    fn test_quantity_floor_is_one() {
        let item = LineItem::new("Bread", 1.0, 0, 1.0);
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_analysis_payload_deserializes_camel_case() {
        let json = r#"{
            "rawText": "Pizza 10.00",
            "currency": "EUR",
            "taxIncluded": true,
            "taxInclusionReason": "IVA incluido printed on footer",
            "restaurantName": "Casa Marta",
            "receiptTotal": 10.0
        }"#;
        let analysis: ReceiptAnalysis = serde_json::from_str(json).expect("payload parses");
        assert_eq!(analysis.currency.as_deref(), Some("EUR"));
        assert!(analysis.tax_included);
        assert_eq!(analysis.restaurant_name.as_deref(), Some("Casa Marta"));
        assert!(analysis.items.is_empty());
    }

    #[test]
    fn test_deserialized_item_without_id_gets_one() {
        let json = r#"{"name": "Flan", "unitPrice": 3.0, "lineTotal": 3.0}"#;
        let item: LineItem = serde_json::from_str(json).expect("item parses");
        assert!(!item.id.is_empty());
        assert_eq!(item.quantity, 1);
        assert_eq!(item.kind, ItemKind::Regular);
    }
}
