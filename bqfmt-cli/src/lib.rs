use std::fs;
use std::path::PathBuf;

use bqfmt::{FormatOptions, format_json, pretty_print};
use bqfmt_lang::log;
use bqfmt_lang::utils::error::{ReportableError, report};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// File to format (if not specified, reads from stdin)
    #[clap(value_parser)]
    file: Option<PathBuf>,
    /// Width of the editor
    #[arg(long, default_value = "80")]
    width: usize,
    /// Indentation size
    #[arg(long, default_value = "2")]
    indent_size: usize,
    /// Keep the source casing of keywords
    #[arg(long)]
    no_upper_case_keywords: bool,
    /// Keep the source casing of pseudo columns such as `_PARTITIONTIME`
    #[arg(long)]
    no_upper_case_pseudo_columns: bool,
    /// Re-align the lines of multiline comments
    #[arg(long)]
    format_multiline_comment: bool,
    /// Print the queries of a WITH clause at the indentation of the clause
    #[arg(long)]
    no_indent_cte: bool,
    /// Separate the queries of a WITH clause by blank lines
    #[arg(long)]
    blank_line_after_cte: bool,
    /// Treat the input as a JSON-serialized syntax tree instead of SQL
    #[arg(long)]
    cst_json: bool,
}

impl Args {
    fn options(&self) -> FormatOptions {
        FormatOptions {
            width: self.width,
            indent_size: self.indent_size,
            print_keywords_in_upper_case: !self.no_upper_case_keywords,
            print_pseudo_columns_in_upper_case: !self.no_upper_case_pseudo_columns,
            format_multiline_comment: self.format_multiline_comment,
            indent_cte: !self.no_indent_cte,
            print_blank_line_after_cte: self.blank_line_after_cte,
        }
    }
}

fn read_input(file_path: Option<&PathBuf>) -> std::io::Result<String> {
    match file_path {
        Some(path) => fs::read_to_string(path),
        None => {
            use std::io::Read;
            let mut buf = String::new();
            eprintln!("No file specified. Reading from stdin...");
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

pub fn lib_main() {
    if cfg!(debug_assertions) {
        colog::default_builder()
            .filter_level(log::LevelFilter::Trace)
            .init();
    } else {
        colog::default_builder().init();
    }

    let args = Args::parse();
    let options = args.options();
    log::debug!("{options:?}");

    let code = match read_input(args.file.as_ref()) {
        Ok(code) => code.replace("\r\n", "\n"),
        Err(e) => {
            log::error!("unable to read input: {e}");
            std::process::exit(1);
        }
    };

    let res = if args.cst_json {
        format_json(&code, &options).map_err(|e| vec![Box::new(e) as Box<dyn ReportableError>])
    } else {
        pretty_print(&code, &args.file, &options)
    };

    match res {
        Ok(rendered) => {
            print!("{rendered}");
        }
        Err(errs) => {
            report(code.as_str(), args.file.unwrap_or_default(), &errs);
            std::process::exit(1);
        }
    }
}
