use anyhow::Result;
use std::path::Path;
use std::process;

use dispatcher::BankStatementParser;

fn main() -> Result<()> {
    // Usage:
    //   statement_parser <statement.xlsx> [bank_type]
    //
    // bank_type defaults to auto-detection from the file name.

    let args: Vec<String> = std::env::args().collect();
    let parser = BankStatementParser::new();

    let Some(input) = args.get(1) else {
        eprintln!("Usage: statement_parser <statement.xlsx> [bank_type]");
        eprintln!();
        eprintln!("Supported bank types (or 'auto'):");
        for bank in parser.supported_banks() {
            eprintln!("  {:10} {}", bank.bank_type, bank.name);
        }
        process::exit(1);
    };

    let bank_type = args.get(2).map(|s| s.as_str());

    match parser.parse_file(Path::new(input), bank_type) {
        Ok(statement) => {
            println!("{}", serde_json::to_string_pretty(&statement)?);
            eprintln!(
                "Parsed {} transactions from {} ({})",
                statement.result.transactions.len(),
                statement.result.file_name,
                statement.result.iban
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}
