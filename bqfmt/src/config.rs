/// Options controlling the printed layout. Passed by reference to every entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Width of the editor.
    pub width: usize,
    /// Spaces per indentation level.
    pub indent_size: usize,
    pub print_keywords_in_upper_case: bool,
    /// `_PARTITIONTIME`, `_PARTITIONDATE`, `_TABLE_SUFFIX` and `_FILE_NAME`.
    pub print_pseudo_columns_in_upper_case: bool,
    /// Re-aligns the lines of `/* */` comments behind ` * ` gutters.
    pub format_multiline_comment: bool,
    /// Indents the query list of a `WITH` clause.
    pub indent_cte: bool,
    /// Separates queries of a `WITH` clause, and the clause from its query, by a blank line.
    pub print_blank_line_after_cte: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            width: 80,
            indent_size: 2,
            print_keywords_in_upper_case: true,
            print_pseudo_columns_in_upper_case: true,
            format_multiline_comment: false,
            indent_cte: true,
            print_blank_line_after_cte: false,
        }
    }
}

impl FormatOptions {
    pub fn with_width(width: usize) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }
}
