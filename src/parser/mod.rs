//! Parser for the Java subset templates are checked against

pub mod ast;
mod grammar;
pub mod lexer;
mod stack;

pub use ast::*;
pub use grammar::{parse_statements, parse_unit};
