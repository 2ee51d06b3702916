use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::process;

use tabsplit::{
    detect_currency, extract_items, Classifier, LineItem, ReceiptValidator, ShareBasis,
    SplitSession, TaxContext, VERSION,
};

struct CliArgs {
    receipt_path: String,
    currency: Option<String>,
    tax_included: bool,
    participants: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Some(cli) => cli,
        None => {
            print_usage();
            process::exit(1);
        }
    };

    let text = fs::read_to_string(&cli.receipt_path)
        .with_context(|| format!("Failed to read receipt: {}", cli.receipt_path))?;

    println!("🧾 Tabsplit v{}", VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Extract line items
    let raw_items = extract_items(&text);
    if raw_items.is_empty() {
        eprintln!("No line items recognized in {}", cli.receipt_path);
        process::exit(1);
    }

    // 2. Classify special charges
    let tax = if cli.tax_included {
        TaxContext::included("declared on the command line")
    } else {
        TaxContext::excluded()
    };
    let items = Classifier::new().classify_all(raw_items, &tax);

    // 3. Currency
    let currency = match &cli.currency {
        Some(code) => code.clone(),
        None => detect_currency(&text),
    };

    println!("\nCurrency: {}", currency);
    if tax.included {
        println!("Tax is already included in the prices");
    }

    println!("\nItems ({}):", items.len());
    for item in &items {
        let tag = match item.special_kind() {
            Some(kind) => format!("  [{}]", kind.name()),
            None => String::new(),
        };
        println!(
            "  {:<28} {:>3} x {:>8.2} = {:>8.2}{}",
            item.name, item.quantity, item.unit_price, item.line_total, tag
        );
    }

    // 4. Advisory checks (no printed total available here, so only the
    //    per-item rules can fire)
    let report = ReceiptValidator::new().validate(&items, None);
    if report.has_warnings() {
        println!("\nFindings:");
        for warning in &report.warnings {
            match &warning.item {
                Some(name) => println!("  ⚠ {}: {}", name, warning.message),
                None => println!("  ⚠ {}", warning.message),
            }
        }
    } else {
        println!("\n✓ No validation findings");
    }

    // 5. Demonstration split: everything shared by everyone
    if !cli.participants.is_empty() {
        demo_split(items, tax, &currency, &cli.participants)?;
    } else {
        println!("\nPass participant names to compute a demonstration split.");
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    Ok(())
}

/// Pool every regular item across all participants (specials are
/// auto-assigned on registration) and print who owes what.
fn demo_split(
    items: Vec<LineItem>,
    tax: TaxContext,
    currency: &str,
    participants: &[String],
) -> Result<()> {
    let mut session = SplitSession::new().with_tax(tax).with_currency(currency);
    session.load_items(items);
    for name in participants {
        session.add_participant(name)?;
    }

    let regular_ids: Vec<String> = session
        .items()
        .iter()
        .filter(|entry| !entry.item.is_special())
        .map(|entry| entry.item.id.clone())
        .collect();
    for id in &regular_ids {
        session.set_share_equally(id, true)?;
        for name in participants {
            session.toggle_share(id, name)?;
        }
    }

    let report = session.calculate_split()?;

    println!("\nSplit across {} participants:", report.participant_count);
    for share in &report.shares {
        println!("\n  {} owes {:.2} {}", share.participant, share.total, currency);
        for line in &share.lines {
            let basis = match line.basis {
                ShareBasis::EqualSplit { among } => format!("1/{}", among),
                ShareBasis::UnitCount { units } => format!("{} units", units),
            };
            println!("    {:<26} {:>8.2}  ({})", line.item_name, line.amount, basis);
        }
    }
    println!("\n✓ Grand total: {:.2} {}", report.grand_total, currency);
    println!("✓ Assignment progress: {}%", session.progress());

    Ok(())
}

fn parse_args(args: &[String]) -> Option<CliArgs> {
    let mut receipt_path: Option<String> = None;
    let mut currency: Option<String> = None;
    let mut tax_included = false;
    let mut participants = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--currency" => match iter.next() {
                Some(code) => currency = Some(code.trim().to_uppercase()),
                None => {
                    eprintln!("--currency needs an ISO code");
                    return None;
                }
            },
            "--tax-included" => tax_included = true,
            "--help" | "-h" => return None,
            _ if receipt_path.is_none() => receipt_path = Some(arg.clone()),
            _ => participants.push(arg.clone()),
        }
    }

    Some(CliArgs {
        receipt_path: receipt_path?,
        currency,
        tax_included,
        participants,
    })
}

fn print_usage() {
    eprintln!("Usage: tabsplit <receipt.txt> [--currency <code>] [--tax-included] [name ...]");
    eprintln!("  --currency <code>   skip detection and use this ISO code");
    eprintln!("  --tax-included      receipt prices already contain tax");
    eprintln!("  name ...            participants for a demonstration split");
}
