//! Utilities shared by alto tests.
//!
//! - [`parse`]: a small recursive-descent parser producing [`alto_syntax::SyntaxTree`]s
//!   for AL fixtures
//! - [`FixtureOracle`]: a symbol oracle answering from a parsed fixture
//! - [`Fixture`], [`extract_range`], [`extract_offset`]: marker-based fixture helpers

mod fixtures;
mod lexer;
mod oracle;
mod parser;

pub use fixtures::{extract_offset, extract_range, Fixture, FIXTURE_FILE};
pub use oracle::FixtureOracle;
pub use parser::{parse, ParseError};
