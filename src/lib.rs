// Tabsplit - receipt parsing, classification and bill splitting
// Exposes all modules for use in the CLI binary and tests

// Compiled regex cache shared by the text-parsing modules. Defined ahead
// of the module declarations so each module can declare its own patterns.
macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static regex::Regex {
            static R: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
            R.get_or_init(|| regex::Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub mod item;
pub mod normalize;
pub mod currency;
pub mod extract;
pub mod classify;
pub mod session;
pub mod split;
pub mod convert;
pub mod validate;

// Re-export commonly used types
pub use item::{ItemKind, LineItem, ReceiptAnalysis, SpecialKind};
pub use normalize::{parse_amount, parse_quantity};
pub use currency::{
    detect_currency, CurrencyDetector, CurrencyRule, CurrencyTables, DEFAULT_CURRENCY,
};
pub use extract::{
    extract_items, strategies, ExtractionStrategy,
    FreeformStrategy, ListStrategy, LocalizedListStrategy, TableStrategy,
};
pub use classify::{Classifier, ClassifierRules, KeywordFamily, TaxContext};
pub use session::{AssignedItem, Assignment, SessionError, SplitSession};
pub use split::{ParticipantShare, ShareBasis, ShareLine, SplitReport};
pub use convert::{convert_items, ConversionOutcome, ConversionStatus, ExchangeRateProvider};
pub use validate::{ReceiptValidator, Severity, ValidationReport, ValidationWarning};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
