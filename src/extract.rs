// Extraction pipeline - raw receipt text to line items
// Four strategies tried in order; the first one that yields items wins.
// Strategies are total: malformed input produces zero items, never an error.

use log::{debug, info};

use crate::item::LineItem;
use crate::normalize::{contains_keyword, parse_amount, parse_quantity, starts_with_keyword};

// ============================================================================
// LINE PATTERNS
// ============================================================================

// list strategy: "2 Beer 3.00 6.00"
re!(re_qty_name_price_total, r"^(\d+)\s+(.+?)\s+(\d+[.,]\d{2})\s+(\d+[.,]\d{2})$");
// list strategy: "Garlic Bread 4.50 4.50"
re!(re_name_price_total, r"^(.+?)\s+(\d+[.,]\d{2})\s+(\d+[.,]\d{2})$");
// list strategy: "2 Cola 2.50"
re!(re_qty_name_price, r"^(\d+)\s+(.+?)\s+(\d+[.,]\d{2})$");
// localized strategy: decimal-comma amounts only, "2 Tostada 2,50 5,00"
re!(re_qty_name_comma_amounts, r"^(\d+)\s+(.+?)\s+(\d+,\d{2})\s+(\d+,\d{2})$");
// freeform strategy: any number in the line
re!(re_numeric_token, r"\d+(?:[.,]\d+)?");
// "Table 4" / "Mesa nº 12" style headers the list strategy must skip
re!(re_table_number, r"(?i)\b(?:table|mesa)\s*(?:no|núm|num|nº|#)?\s*\.?\s*\d+\b");

/// Header cell keywords mapped to the four semantic columns
const ITEM_HEADERS: &[&str] = &[
    "item", "product", "description", "descripcion", "descripción", "articulo", "artículo",
    "concepto",
];
const QTY_HEADERS: &[&str] = &["qty", "quantity", "cantidad", "cant", "uds", "units"];
const PRICE_HEADERS: &[&str] = &["price", "precio", "unit", "unitario", "p.u."];
const TOTAL_HEADERS: &[&str] = &["total", "importe", "amount", "subtotal"];

/// Rows that close the table region
const TABLE_END_KEYWORDS: &[&str] = &["total", "subtotal", "total qty", "total a pagar"];

/// Lines the list strategy never treats as items
const LIST_SKIP_KEYWORDS: &[&str] = &[
    "total", "subtotal", "tax", "iva", "date", "fecha", "ticket",
];

/// Business header/footer noise on Spanish-style receipts
const BUSINESS_KEYWORDS: &[&str] = &[
    "restaurante", "restaurant", "bar", "cafe", "café", "cafeteria", "cafetería", "cif", "nif",
    "tel", "telefono", "teléfono", "gracias", "thank", "iva", "factura", "total", "subtotal",
];

// ============================================================================
// STRATEGY TRAIT
// ============================================================================

/// A single way of reading items out of receipt text.
///
/// Implementations must be total functions: they return an empty vector on
/// input they cannot handle and never panic on any string.
pub trait ExtractionStrategy: Send + Sync {
    /// Extract items; empty when the layout does not apply
    fn extract(&self, text: &str) -> Vec<LineItem>;

    /// Strategy name for logs
    fn name(&self) -> &str;
}

/// All strategies, most structured first
pub fn strategies() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![
        Box::new(TableStrategy),
        Box::new(ListStrategy),
        Box::new(LocalizedListStrategy),
        Box::new(FreeformStrategy),
    ]
}

/// Run the pipeline: first strategy that finds items wins.
pub fn extract_items(raw_text: &str) -> Vec<LineItem> {
    for strategy in strategies() {
        let items = strategy.extract(raw_text);
        if !items.is_empty() {
            info!("extracted {} items via {} strategy", items.len(), strategy.name());
            return items;
        }
        debug!("{} strategy found nothing", strategy.name());
    }
    info!("no strategy extracted anything");
    Vec::new()
}

// ============================================================================
// TABLE STRATEGY
// ============================================================================

/// Markdown-style tables as produced by OCR of printed receipts:
/// `| Item | Price | Qty | Total |` plus data rows.
pub struct TableStrategy;

/// Semantic column positions found in the header row
struct ColumnMap {
    item: usize,
    price: Option<usize>,
    quantity: Option<usize>,
    total: Option<usize>,
}

fn split_row(line: &str) -> Vec<String> {
    line.trim()
        .trim_matches('|')
        .split('|')
        .map(|cell| cell.trim().to_string())
        .collect()
}

fn is_separator_row(cells: &[String]) -> bool {
    !cells.is_empty()
        && cells.iter().all(|cell| {
            !cell.is_empty() && cell.chars().all(|c| matches!(c, '-' | ':' | ' '))
        })
}

fn matches_any(cell: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| contains_keyword(cell, kw))
}

fn map_columns(cells: &[String]) -> Option<ColumnMap> {
    let mut map = ColumnMap {
        item: usize::MAX,
        price: None,
        quantity: None,
        total: None,
    };

    for (idx, cell) in cells.iter().enumerate() {
        if map.item == usize::MAX && matches_any(cell, ITEM_HEADERS) {
            map.item = idx;
        } else if map.quantity.is_none() && matches_any(cell, QTY_HEADERS) {
            map.quantity = Some(idx);
        } else if map.price.is_none() && matches_any(cell, PRICE_HEADERS) {
            map.price = Some(idx);
        } else if map.total.is_none() && matches_any(cell, TOTAL_HEADERS) {
            map.total = Some(idx);
        }
    }

    if map.item == usize::MAX {
        None
    } else {
        Some(map)
    }
}

fn row_closes_table(cells: &[String]) -> bool {
    cells
        .iter()
        .any(|cell| TABLE_END_KEYWORDS.iter().any(|kw| starts_with_keyword(cell, kw)))
}

impl ExtractionStrategy for TableStrategy {
    fn extract(&self, text: &str) -> Vec<LineItem> {
        let lines: Vec<&str> = text.lines().collect();

        // Header row: pipe-delimited, one cell names the item column
        let header_pos = lines.iter().position(|line| {
            line.contains('|') && map_columns(&split_row(line)).is_some()
        });
        let Some(header_pos) = header_pos else {
            return Vec::new();
        };
        let Some(columns) = map_columns(&split_row(lines[header_pos])) else {
            return Vec::new();
        };

        let mut items = Vec::new();

        for line in &lines[header_pos + 1..] {
            if line.trim().is_empty() {
                continue;
            }
            // region ends at the first non-table line
            if !line.contains('|') {
                break;
            }

            let cells = split_row(line);
            if is_separator_row(&cells) {
                continue;
            }
            if row_closes_table(&cells) {
                break;
            }

            let Some(name) = cells.get(columns.item).filter(|cell| !cell.is_empty()) else {
                continue;
            };

            let quantity = columns
                .quantity
                .and_then(|idx| cells.get(idx))
                .map(|cell| parse_quantity(cell))
                .unwrap_or(1);
            let mut price = columns
                .price
                .and_then(|idx| cells.get(idx))
                .map(|cell| parse_amount(cell))
                .unwrap_or(0.0);
            let mut total = columns
                .total
                .and_then(|idx| cells.get(idx))
                .map(|cell| parse_amount(cell))
                .unwrap_or(0.0);

            // derive whichever amount the row left out
            if price == 0.0 && total > 0.0 {
                price = total / quantity as f64;
            }
            if total == 0.0 {
                total = price * quantity as f64;
            }

            // zero-price rows are OCR noise
            if price <= 0.0 && total <= 0.0 {
                debug!("table: skipping zero-price row {:?}", name);
                continue;
            }

            items.push(LineItem::new(name.clone(), price, quantity, total));
        }

        items
    }

    fn name(&self) -> &str {
        "table"
    }
}

// ============================================================================
// LIST STRATEGY
// ============================================================================

/// Plain line-per-item receipts: "2 Beer 3.00 6.00", "Garlic Bread 4.50".
pub struct ListStrategy;

fn is_list_noise(line: &str) -> bool {
    LIST_SKIP_KEYWORDS.iter().any(|kw| contains_keyword(line, kw))
        || re_table_number().is_match(line)
}

/// Parsed fields of one list line, before derivation
struct ListFields {
    quantity: u32,
    name: String,
    price: f64,
    total: f64,
}

fn match_list_line(line: &str) -> Option<ListFields> {
    if let Some(caps) = re_qty_name_price_total().captures(line) {
        return Some(ListFields {
            quantity: parse_quantity(&caps[1]),
            name: caps[2].trim().to_string(),
            price: parse_amount(&caps[3]),
            total: parse_amount(&caps[4]),
        });
    }
    if let Some(caps) = re_name_price_total().captures(line) {
        return Some(ListFields {
            quantity: 1,
            name: caps[1].trim().to_string(),
            price: parse_amount(&caps[2]),
            total: parse_amount(&caps[3]),
        });
    }
    if let Some(caps) = re_qty_name_price().captures(line) {
        let quantity = parse_quantity(&caps[1]);
        let price = parse_amount(&caps[3]);
        return Some(ListFields {
            quantity,
            name: caps[2].trim().to_string(),
            price,
            total: price * quantity as f64,
        });
    }
    None
}

fn fields_into_item(mut fields: ListFields) -> Option<LineItem> {
    if fields.name.is_empty() {
        return None;
    }
    // accept only lines that carry money
    if fields.price <= 0.0 && fields.total <= 0.0 {
        return None;
    }
    if fields.price == 0.0 && fields.total > 0.0 {
        fields.price = fields.total / fields.quantity as f64;
    }
    if fields.total == 0.0 {
        fields.total = fields.price * fields.quantity as f64;
    }
    Some(LineItem::new(fields.name, fields.price, fields.quantity, fields.total))
}

impl ExtractionStrategy for ListStrategy {
    fn extract(&self, text: &str) -> Vec<LineItem> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !is_list_noise(line))
            .filter_map(match_list_line)
            .filter_map(fields_into_item)
            .collect()
    }

    fn name(&self) -> &str {
        "list"
    }
}

// ============================================================================
// LOCALIZED LIST STRATEGY
// ============================================================================

/// Spanish paper receipts: decimal-comma amounts, business header noise.
/// Stricter than the list strategy (one pattern only) but with its own
/// noise filter, so it rescues receipts whose item lines trip the list
/// strategy's keyword skips.
pub struct LocalizedListStrategy;

fn is_business_noise(line: &str) -> bool {
    BUSINESS_KEYWORDS.iter().any(|kw| contains_keyword(line, kw))
}

impl ExtractionStrategy for LocalizedListStrategy {
    fn extract(&self, text: &str) -> Vec<LineItem> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !is_business_noise(line))
            .filter_map(|line| {
                let caps = re_qty_name_comma_amounts().captures(line)?;
                Some(ListFields {
                    quantity: parse_quantity(&caps[1]),
                    name: caps[2].trim().to_string(),
                    price: parse_amount(&caps[3]),
                    total: parse_amount(&caps[4]),
                })
            })
            .filter_map(fields_into_item)
            .collect()
    }

    fn name(&self) -> &str {
        "localized-list"
    }
}

// ============================================================================
// FREEFORM STRATEGY
// ============================================================================

/// Last resort: any line with a number in it becomes an item.
/// First numeric token is the unit price, last one the line total.
pub struct FreeformStrategy;

fn freeform_name(line: &str) -> String {
    let without_numbers = re_numeric_token().replace_all(line, " ");
    without_numbers
        .chars()
        .filter(|c| !"€$£¥₹₽₩¢".contains(*c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_string()
}

impl ExtractionStrategy for FreeformStrategy {
    fn extract(&self, text: &str) -> Vec<LineItem> {
        let mut items = Vec::new();

        for line in text.lines().map(str::trim) {
            if line.chars().count() <= 5 {
                continue;
            }

            let tokens: Vec<&str> = re_numeric_token()
                .find_iter(line)
                .map(|m| m.as_str())
                .collect();
            let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
                continue;
            };

            let price = parse_amount(first);
            let total = parse_amount(last);
            if price <= 0.0 && total <= 0.0 {
                continue;
            }

            let name = freeform_name(line);
            if name.is_empty() {
                continue;
            }

            let total = if total > 0.0 { total } else { price };
            items.push(LineItem::new(name, price, 1, total));
        }

        items
    }

    fn name(&self) -> &str {
        "freeform"
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const MARKDOWN_RECEIPT: &str = "\
# Receipt

| Item | Price | Qty | Total |
|------|-------|-----|-------|
| Pizza Margherita | 10.00 | 1 | 10.00 |
| Cola | 2.50 | 2 | 5.00 |
| TOTAL | | | 15.00 |";

    #[test]
    fn test_table_strategy_parses_markdown() {
        let items = TableStrategy.extract(MARKDOWN_RECEIPT);
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].name, "Pizza Margherita");
        assert_eq!(items[0].unit_price, 10.00);
        assert_eq!(items[0].quantity, 1);

        assert_eq!(items[1].name, "Cola");
        assert_eq!(items[1].quantity, 2);
        assert_eq!(items[1].line_total, 5.00);
    }

    #[test]
    fn test_table_strategy_spanish_headers() {
        let text = "\
| Artículo | Cantidad | Precio | Importe |
|----------|----------|--------|---------|
| Tortilla | 2 | 3,50 | 7,00 |
| TOTAL A PAGAR | | | 7,00 |";

        let items = TableStrategy.extract(text);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Tortilla");
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].unit_price, 3.50);
        assert_eq!(items[0].line_total, 7.00);
    }

    #[test]
    fn test_table_strategy_derives_missing_amounts() {
        // no total column: derived from price * qty
        let text = "\
| Item | Qty | Price |
| Beer | 3 | 2.00 |";
        let items = TableStrategy.extract(text);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].line_total, 6.00);

        // no price column: derived from total / qty
        let text = "\
| Item | Qty | Total |
| Wine | 2 | 18.00 |";
        let items = TableStrategy.extract(text);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_price, 9.00);
    }

    #[test]
    fn test_table_strategy_skips_zero_price_rows() {
        let text = "\
| Item | Price | Qty | Total |
| Napkins | 0.00 | 1 | 0.00 |
| Pizza | 10.00 | 1 | 10.00 |";
        let items = TableStrategy.extract(text);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Pizza");
    }

    #[test]
    fn test_table_strategy_region_ends_at_plain_text() {
        let text = "\
| Item | Price |
| Pizza | 10.00 |
Thanks for visiting
| Ghost | 9.99 |";
        let items = TableStrategy.extract(text);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_list_strategy_three_patterns() {
        let text = "\
2 Beer 3.00 6.00
Garlic Bread 4.50 4.50
2 Cola 2.50";
        let items = ListStrategy.extract(text);
        assert_eq!(items.len(), 3);

        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].unit_price, 3.00);
        assert_eq!(items[0].line_total, 6.00);

        assert_eq!(items[1].name, "Garlic Bread");
        assert_eq!(items[1].quantity, 1);

        assert_eq!(items[2].name, "Cola");
        assert_eq!(items[2].line_total, 5.00);
    }

    #[test]
    fn test_list_strategy_skips_noise_lines() {
        let text = "\
Date: 12/05/2024
Table 4
2 Beer 3.00 6.00
Tax 1.20 1.20
Subtotal 6.00 6.00
Total 7.20 7.20";
        let items = ListStrategy.extract(text);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Beer");
    }

    #[test]
    fn test_localized_strategy_spanish_receipt() {
        let text = "\
2 Tostada con tomate 2,50 5,00
1 Zumo naranja 3,20 3,20";
        let items = LocalizedListStrategy.extract(text);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Tostada con tomate");
        assert_eq!(items[0].unit_price, 2.50);
        assert_eq!(items[0].line_total, 5.00);
        assert_eq!(items[1].quantity, 1);
    }

    #[test]
    fn test_localized_strategy_skips_business_noise() {
        let text = "\
RESTAURANTE LA PLAZA
CIF B-12345678
1 Menu del dia 12,50 12,50
GRACIAS POR SU VISITA";
        let items = LocalizedListStrategy.extract(text);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Menu del dia");
    }

    #[test]
    fn test_freeform_strategy_grabs_anything_numeric() {
        let text = "\
Menu del dia 15
ref
Caña 1,80";
        let items = FreeformStrategy.extract(text);
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].name, "Menu del dia");
        assert_eq!(items[0].unit_price, 15.0);
        assert_eq!(items[0].line_total, 15.0);
        assert_eq!(items[0].quantity, 1);

        assert_eq!(items[1].name, "Caña");
        assert_eq!(items[1].unit_price, 1.80);
    }

    #[test]
    fn test_freeform_first_and_last_tokens() {
        let items = FreeformStrategy.extract("3 x Empanada 2.00 6.00");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_price, 3.0);
        assert_eq!(items[0].line_total, 6.0);
    }

    #[test]
    fn test_pipeline_prefers_table_over_list() {
        init();
        let text = "\
| Item | Price | Qty | Total |
| Pizza | 10.00 | 1 | 10.00 |

2 Beer 3.00 6.00";
        let items = extract_items(text);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Pizza");
    }

    #[test]
    fn test_pipeline_falls_through_to_freeform() {
        init();
        let items = extract_items("Menu especial 20");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Menu especial");
        assert_eq!(items[0].unit_price, 20.0);
    }

    #[test]
    fn test_pipeline_empty_input() {
        assert!(extract_items("").is_empty());
        assert!(extract_items("\n\n").is_empty());
    }

    #[test]
    fn test_extracted_items_are_regular_with_fresh_ids() {
        let items = ListStrategy.extract("2 Beer 3.00 6.00\nWine 9.00 9.00");
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| !item.is_special()));
        assert_ne!(items[0].id, items[1].id);
    }
}
