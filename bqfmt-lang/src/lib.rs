//! Lexer, parser and concrete syntax tree for BigQuery standard SQL.
//!
//! The tree produced here keeps every token and comment of the source so that a
//! formatter can print it back without losing anything. The node shape follows the
//! bq2cst convention (a node has an optional token and a map of named child slots),
//! so trees can also be exchanged as JSON.

pub mod cst;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod utils;

pub use cst::{ContentType, Node, NodeType};
pub use log;
pub use parser::parse;
pub use token::Token;
