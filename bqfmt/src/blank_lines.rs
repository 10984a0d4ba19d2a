//! Blank lines between sibling statements.
//!
//! Formatting keeps whether statements were separated by blank lines, not how many:
//! the printer emits one blank line wherever the count computed here is non-zero.

use bqfmt_lang::{Node, NodeType};

use crate::error::FormatError;

/// Line on which a statement ends: its semicolon, or the last line of the last
/// comment trailing the semicolon. `None` when the statement has no semicolon.
fn end_line(stmt: &Node) -> Result<Option<usize>, FormatError> {
    let Some(semicolon) = stmt.node("semicolon") else {
        return Ok(None);
    };
    let last = semicolon.trailing_comments().last().unwrap_or(semicolon);
    let token = last.token.as_ref().ok_or_else(|| FormatError::MissingToken {
        node_type: last.node_type.to_string(),
    })?;
    Ok(Some(token.line + token.literal.matches('\n').count()))
}

/// The node holding the first token of a statement.
fn first_node(stmt: &Node) -> &Node {
    if let Some(with) = stmt.node("with") {
        return with;
    }
    match (stmt.node_type == NodeType::SetOperator, stmt.node("left")) {
        (true, Some(left)) => first_node(left),
        _ => stmt,
    }
}

/// Line on which a statement starts, including its leading comments.
fn start_line(stmt: &Node) -> Option<usize> {
    let first = first_node(stmt);
    first
        .leading_comments()
        .first()
        .unwrap_or(first)
        .token
        .as_ref()
        .map(|t| t.line)
}

/// Number of blank source lines after each statement of `stmts`. The entry for the
/// last statement, and for one followed by `EOF`, is zero.
pub fn analyze(stmts: &[Node]) -> Result<Vec<usize>, FormatError> {
    let mut empty_lines = vec![0; stmts.len()];
    for (i, pair) in stmts.windows(2).enumerate() {
        if pair[1].node_type == NodeType::Eof {
            continue;
        }
        let (Some(end), Some(start)) = (end_line(&pair[0])?, start_line(&pair[1])) else {
            continue;
        };
        empty_lines[i] = start.saturating_sub(end + 1);
        log::trace!("{} blank line(s) after statement {i}", empty_lines[i]);
    }
    Ok(empty_lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze_src(src: &str) -> Vec<usize> {
        let stmts = bqfmt_lang::parse(src, &None).expect("failed to parse");
        analyze(&stmts).expect("failed to analyze")
    }

    #[test]
    fn test_adjacent_statements() {
        assert_eq!(analyze_src("SELECT 1;\nSELECT 2;\n"), vec![0, 0, 0]);
    }

    #[test]
    fn test_blank_lines_counted() {
        assert_eq!(analyze_src("SELECT 1;\n\n\nSELECT 2;\n\nSELECT 3;"), vec![2, 1, 0, 0]);
    }

    #[test]
    fn test_same_line() {
        assert_eq!(analyze_src("SELECT 1; SELECT 2;"), vec![0, 0, 0]);
    }

    #[test]
    fn test_trailing_comment_of_semicolon() {
        // The block comment ends two lines below the semicolon.
        let stmts = analyze_src("SELECT 1; /* a\nb\nc */\nSELECT 2;");
        assert_eq!(stmts, vec![0, 0, 0]);
        let stmts = analyze_src("SELECT 1; /* a\nb */\n\nSELECT 2;");
        assert_eq!(stmts, vec![1, 0, 0]);
    }

    #[test]
    fn test_leading_comment_starts_statement() {
        assert_eq!(analyze_src("SELECT 1;\n-- next\nSELECT 2;"), vec![0, 0, 0]);
        assert_eq!(analyze_src("SELECT 1;\n\n-- next\n\nSELECT 2;"), vec![1, 0, 0]);
    }

    #[test]
    fn test_set_operator_and_with() {
        let src = "SELECT 1;\n\n(SELECT 2) UNION ALL SELECT 3;\n\nWITH a AS (SELECT 1)\nSELECT * FROM a;";
        assert_eq!(analyze_src(src), vec![1, 1, 0, 0]);
        let src = "SELECT 1;\n\nSELECT 2 UNION ALL SELECT 3;";
        assert_eq!(analyze_src(src), vec![1, 0, 0]);
    }

    #[test]
    fn test_missing_semicolon() {
        assert_eq!(analyze_src("SELECT 1\n\n"), vec![0, 0]);
    }
}
