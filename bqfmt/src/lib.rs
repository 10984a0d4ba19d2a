//! Formatter for BigQuery standard SQL.
//!
//! [`pretty_print`] parses source text with `bqfmt_lang` and prints it back with a
//! uniform layout. [`format_cst`] prints an already parsed tree, e.g. one read from
//! JSON with [`format_json`].

pub mod blank_lines;
pub mod casing;
pub mod config;
pub mod doc;
pub mod error;
pub mod print;

use std::path::PathBuf;

use bqfmt_lang::Node;
use bqfmt_lang::utils::error::ReportableError;

pub use config::FormatOptions;
pub use error::FormatError;

/// Prints statements followed by their `EOF` node. Non-empty output ends with a newline.
pub fn format_cst(nodes: &[Node], options: &FormatOptions) -> Result<String, FormatError> {
    let doc = print::print_code(nodes, options)?;
    let mut rendered = doc::render(doc, options.width, options.indent_size);
    if !rendered.is_empty() && !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}

/// Formats a tree serialized as JSON by `bqfmt_lang::cst::to_json` or a compatible
/// producer.
pub fn format_json(json: &str, options: &FormatOptions) -> Result<String, FormatError> {
    let nodes = bqfmt_lang::cst::from_json(json)?;
    format_cst(&nodes, options)
}

pub fn pretty_print(
    src: &str,
    file_path: &Option<PathBuf>,
    options: &FormatOptions,
) -> Result<String, Vec<Box<dyn ReportableError>>> {
    let src = src.replace("\r\n", "\n");
    let nodes = bqfmt_lang::parse(&src, file_path)?;
    format_cst(&nodes, options).map_err(|e| vec![Box::new(e) as Box<dyn ReportableError>])
}
