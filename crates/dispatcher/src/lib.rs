use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use models::{BankInfo, ParseResult, ParsedStatement};
use statement_core::{first_sheet_grid, BankDescriptor, BankParser, Grid};
use std::fs;
use std::path::Path;

/// Ordered registry of bank parsers and the single entry point for turning a
/// statement file into normalized transactions.
pub struct BankStatementParser {
    banks: Vec<BankDescriptor>,
}

impl BankStatementParser {
    /// Registry preloaded with the supported banks. Registration order is
    /// also the filename auto-detection order.
    pub fn new() -> Self {
        let mut parser = Self { banks: Vec::new() };
        parser.register(ziraat::ZiraatParser::descriptor());
        parser.register(enpara::EnparaParser::descriptor());
        parser
    }

    /// Adding a bank is purely additive; dispatch control flow never changes.
    pub fn register(&mut self, descriptor: BankDescriptor) {
        self.banks.push(descriptor);
    }

    pub fn supported_banks(&self) -> Vec<BankInfo> {
        self.banks
            .iter()
            .map(|d| BankInfo {
                bank_type: d.bank_type.to_string(),
                name: d.display_name.to_string(),
                can_auto_detect: true,
            })
            .collect()
    }

    /// Parse one statement file. `bank_type` of `None` or `"auto"` selects the
    /// parser by filename sniffing.
    pub fn parse_file(&self, path: &Path, bank_type: Option<&str>) -> Result<ParsedStatement> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let file_size = fs::metadata(path)
            .with_context(|| format!("Cannot stat {}", path.display()))?
            .len();
        let grid = first_sheet_grid(path)?;

        self.parse_grid(&grid, &file_name, file_size, bank_type)
    }

    /// File-free entry point: the caller supplies an already-decoded grid.
    pub fn parse_grid(
        &self,
        grid: &Grid,
        file_name: &str,
        file_size: u64,
        bank_type: Option<&str>,
    ) -> Result<ParsedStatement> {
        let descriptor = self.select_descriptor(file_name, bank_type)?;
        let parser = (descriptor.build)();

        let mut result = run_parser(parser.as_ref(), grid).map_err(|e| {
            anyhow!(
                "Error parsing {} bank statement: {}",
                descriptor.bank_type,
                e
            )
        })?;
        result.file_name = file_name.to_string();

        Ok(ParsedStatement {
            result,
            file_size,
            parsed_at: Utc::now(),
        })
    }

    fn select_descriptor(
        &self,
        file_name: &str,
        bank_type: Option<&str>,
    ) -> Result<&BankDescriptor> {
        match bank_type {
            Some(requested) if requested != "auto" => self
                .banks
                .iter()
                .find(|d| d.bank_type == requested)
                .ok_or_else(|| anyhow!("Unsupported bank type: {}", requested)),
            _ => {
                let lowered = file_name.to_lowercase();
                self.banks
                    .iter()
                    .find(|d| (d.can_parse)(&lowered))
                    .ok_or_else(|| {
                        anyhow!("Unable to detect bank type. Please select bank type manually.")
                    })
            }
        }
    }
}

impl Default for BankStatementParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Escalate parser diagnostics into hard failures. Any accumulated error makes
/// the file untrustworthy as a whole (a structural failure certainly does, and
/// partial imports would silently lose rows), so nothing is committed from a
/// file that produced errors.
fn run_parser(parser: &dyn BankParser, grid: &Grid) -> Result<ParseResult> {
    let result = parser.parse(grid);

    if !result.errors.is_empty() {
        bail!(result.errors.join("; "));
    }
    if result.transactions.is_empty() {
        bail!("No valid transactions found in the file");
    }

    Ok(result)
}
