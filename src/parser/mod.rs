// Source-specific extraction of listing candidates
pub mod nettikone_parser;
pub mod tori_parser;

use crate::model::{Listing, ParserError};

pub use nettikone_parser::NettikoneParser;
pub use tori_parser::ToriParser;

/// Turns one response body into candidate listings, in source order.
///
/// Missing fields never fail a parse; they fall back to the sentinel and the
/// scraper filters out whatever ends up invalid.
pub trait Parser: Send + Sync {
    fn parse(&self, body: &str) -> Result<Vec<Listing>, ParserError>;
}
