use crate::casing::FunctionTable;
use crate::config::FormatOptions;

/// Which of a node's own `comma`, `as`/`alias` and `order` slots are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Emit {
    pub comma: bool,
    pub alias: bool,
    pub order: bool,
}

impl Emit {
    pub const fn all() -> Self {
        Self {
            comma: true,
            alias: true,
            order: true,
        }
    }

    /// For operands nested in another construct.
    pub const fn none() -> Self {
        Self {
            comma: false,
            alias: false,
            order: false,
        }
    }
}

impl Default for Emit {
    fn default() -> Self {
        Self::all()
    }
}

/// Decorations of the node being printed. They apply to that node only: children
/// are printed with [`PrintContext::nested`] unless a rule decorates them itself.
#[derive(Debug, Clone, Copy)]
pub struct PrintContext<'a> {
    pub options: &'a FormatOptions,
    /// A top-level statement, which ends with its own line break.
    pub root: bool,
    /// An identifier right of `.`, which is never a keyword or a built-in.
    pub not_global: bool,
    /// An identifier called as a function, looked up in the given table.
    pub callable: Option<FunctionTable>,
    /// Blank source lines following a statement.
    pub empty_lines: usize,
}

impl<'a> PrintContext<'a> {
    pub fn new(options: &'a FormatOptions) -> Self {
        Self {
            options,
            root: false,
            not_global: false,
            callable: None,
            empty_lines: 0,
        }
    }

    pub fn nested(self) -> Self {
        Self::new(self.options)
    }

    pub fn root_statement(self, empty_lines: usize) -> Self {
        Self {
            root: true,
            empty_lines,
            ..self.nested()
        }
    }

    pub fn callable(self, table: FunctionTable) -> Self {
        Self {
            callable: Some(table),
            ..self.nested()
        }
    }

    pub fn not_global(self) -> Self {
        Self {
            not_global: true,
            ..self.nested()
        }
    }
}
