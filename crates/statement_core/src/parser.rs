use models::ParseResult;

use crate::cells::Grid;

/// One bank's statement dialect.
///
/// Implementations never fail as a whole for row-level problems: diagnostics
/// accumulate in [`ParseResult::errors`] and parsing continues. Structural
/// failures (no IBAN, no header) come back as an empty result carrying the
/// error; escalating those to hard failures is the dispatcher's job.
pub trait BankParser {
    fn bank_type(&self) -> &'static str;
    fn parse(&self, grid: &Grid) -> ParseResult;
}

/// Registry entry for one supported bank: identification data plus a factory.
/// Plain function values, so registering a new bank is purely additive.
pub struct BankDescriptor {
    pub bank_type: &'static str,
    pub display_name: &'static str,
    /// Filename sniffing only; never consulted during content parsing.
    pub can_parse: fn(&str) -> bool,
    pub build: fn() -> Box<dyn BankParser>,
}
