use std::{collections::HashMap, path::PathBuf};

use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};

use super::metadata::Location;

/// A dynamic error type that can hold specific error messages and the location where the error happened.
pub trait ReportableError: std::error::Error {
    /// message is used for reporting verbose message for `ariadne`.
    fn get_message(&self) -> String {
        self.to_string()
    }
    /// Label is used for indicating error with the specific position for `ariadne`.
    fn get_labels(&self) -> Vec<(Location, String)>;
}

/// ReportableError implements `PartialEq` mostly for testing purpose.
impl PartialEq for dyn ReportableError + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.get_labels() == other.get_labels()
    }
}

#[derive(Debug, Clone)]
pub struct SimpleError {
    pub message: String,
    pub span: Location,
}
impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
impl std::error::Error for SimpleError {}
impl ReportableError for SimpleError {
    fn get_labels(&self) -> Vec<(Location, String)> {
        vec![(self.span.clone(), self.message.clone())]
    }
}

struct FileCache {
    pub storage: HashMap<PathBuf, ariadne::Source<String>>,
}

impl ariadne::Cache<PathBuf> for FileCache {
    type Storage = String;

    fn fetch(&mut self, id: &PathBuf) -> Result<&Source<Self::Storage>, impl std::fmt::Debug> {
        self.storage
            .get(id)
            .ok_or_else(|| format!("File not found: {}", id.display()))
    }

    fn display<'a>(&self, id: &'a PathBuf) -> Option<impl std::fmt::Display + 'a> {
        Some(id.display())
    }
}

/// Prints errors to stderr with source excerpts. Labels are re-rooted to `path`.
pub fn report(src: &str, path: PathBuf, errs: &[Box<dyn ReportableError + '_>]) {
    let mut colors = ColorGenerator::new();
    let mut cache = FileCache {
        storage: HashMap::from([(path.clone(), Source::from(src.to_string()))]),
    };
    for e in errs {
        let rawlabels = e.get_labels();
        let Some((first, _)) = rawlabels.first() else {
            eprintln!("Error: {}", e.get_message());
            continue;
        };
        let labels = rawlabels.iter().map(|(loc, message)| {
            let span = Location::new(loc.span.clone(), path.clone());
            Label::new(span)
                .with_message(message)
                .with_color(colors.next())
        });
        let report = Report::build(
            ReportKind::Error,
            Location::new(first.span.clone(), path.clone()),
        )
        .with_message(e.get_message())
        .with_labels(labels)
        .finish();
        if let Err(err) = report.eprint(&mut cache) {
            log::error!("failed to print a report: {err}");
        }
    }
}

pub fn dump_to_string(errs: &[Box<dyn ReportableError>]) -> String {
    errs.iter()
        .map(|e| e.get_message())
        .collect::<Vec<_>>()
        .join("\n")
}
