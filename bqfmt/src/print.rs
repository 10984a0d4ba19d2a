//! Conversion of a concrete syntax tree into a [`Doc`].
//!
//! Every node kind has one `print_xxx` rule. A rule prints, in order, the leading
//! comments of its token, the token itself with the casing policy applied, the
//! trailing comments of the token as a line suffix, its child slots in grammar order
//! and finally the `order`, `alias` and `comma` slots allowed by [`Emit`].

use bqfmt_lang::{Node, NodeType};

use crate::blank_lines;
use crate::casing;
use crate::config::FormatOptions;
use crate::doc::{
    Doc, concat, group, hardline, indent, join, line_suffix, nil, softline, text,
};
use crate::error::FormatError;

mod context;
mod expr;
mod query;
mod script;

pub use context::{Emit, PrintContext};

pub(crate) type PrintResult = Result<Doc, FormatError>;

// ============================================================================
// Slot access
// ============================================================================

pub(crate) fn child<'n>(node: &'n Node, slot: &str) -> Result<&'n Node, FormatError> {
    node.node(slot).ok_or_else(|| FormatError::MissingChild {
        node_type: node.node_type.to_string(),
        slot: slot.to_string(),
    })
}

pub(crate) fn literal(node: &Node) -> Result<&str, FormatError> {
    node.literal().ok_or_else(|| FormatError::MissingToken {
        node_type: node.node_type.to_string(),
    })
}

/// The node in `slot`, or nothing when the slot is absent.
pub(crate) fn print_slot(node: &Node, slot: &str, ctx: PrintContext, emit: Emit) -> PrintResult {
    match node.node(slot) {
        Some(n) => print_node(n, ctx.nested(), emit),
        None => Ok(nil()),
    }
}

/// `prefix` followed by the node in `slot`, or nothing when the slot is absent.
pub(crate) fn print_slot_after(
    prefix: Doc,
    node: &Node,
    slot: &str,
    ctx: PrintContext,
    emit: Emit,
) -> PrintResult {
    match node.node(slot) {
        Some(n) => Ok(concat(vec![prefix, print_node(n, ctx.nested(), emit)?])),
        None => Ok(nil()),
    }
}

pub(crate) fn print_list(nodes: &[Node], ctx: PrintContext, emit: Emit) -> Result<Vec<Doc>, FormatError> {
    nodes
        .iter()
        .map(|n| print_node(n, ctx.nested(), emit))
        .collect()
}

/// Keywords of a list slot such as `["IGNORE", "NULLS"]`, separated by spaces.
pub(crate) fn print_words(node: &Node, slot: &str, ctx: PrintContext) -> PrintResult {
    Ok(join(text(" "), print_list(node.nodes(slot), ctx, Emit::none())?))
}

// ============================================================================
// Tokens and comments
// ============================================================================

fn format_multiline_comment(comment: &str) -> Doc {
    let body = comment
        .strip_prefix("/*")
        .and_then(|c| c.strip_suffix("*/"))
        .unwrap_or(comment);
    let lines: Vec<&str> = body
        .lines()
        .map(|l| {
            let l = l.trim();
            l.strip_prefix('*').map(str::trim_start).unwrap_or(l)
        })
        .collect();
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    let mut docs = vec![text("/*")];
    for l in &lines[start..end] {
        docs.push(hardline());
        docs.push(text(if l.is_empty() { " *".to_string() } else { format!(" * {l}") }));
    }
    docs.push(hardline());
    docs.push(text(" */"));
    concat(docs)
}

pub(crate) fn print_comment(comment: &Node, ctx: PrintContext) -> PrintResult {
    let literal = literal(comment)?;
    if ctx.options.format_multiline_comment && literal.starts_with("/*") && literal.contains('\n') {
        Ok(format_multiline_comment(literal))
    } else {
        Ok(text(literal))
    }
}

/// Each comment on its own line.
pub(crate) fn print_leading_comments(node: &Node, ctx: PrintContext) -> PrintResult {
    let mut docs = Vec::new();
    for comment in node.leading_comments() {
        docs.push(print_comment(comment, ctx)?);
        docs.push(hardline());
    }
    Ok(concat(docs))
}

/// Comments after the token on the same line. They stay at the end of that line.
pub(crate) fn print_trailing_comments(node: &Node, ctx: PrintContext) -> PrintResult {
    let comments = node.trailing_comments();
    if comments.is_empty() {
        return Ok(nil());
    }
    let mut docs = Vec::new();
    for comment in comments {
        docs.push(text(" "));
        docs.push(print_comment(comment, ctx)?);
    }
    Ok(line_suffix(concat(docs)))
}

/// The token of `node` rendered as `literal`, surrounded by its comments.
pub(crate) fn print_self(node: &Node, ctx: PrintContext, literal: String) -> PrintResult {
    Ok(concat(vec![
        print_leading_comments(node, ctx)?,
        print_self_without_leading(node, ctx, literal)?,
    ]))
}

/// For tokens whose leading comments are printed by the enclosing rule.
pub(crate) fn print_self_without_leading(node: &Node, ctx: PrintContext, literal: String) -> PrintResult {
    Ok(concat(vec![text(literal), print_trailing_comments(node, ctx)?]))
}

pub(crate) fn print_self_keyword(node: &Node, ctx: PrintContext) -> PrintResult {
    print_self(node, ctx, casing::keyword(literal(node)?, ctx.options))
}

/// A clause keyword whose leading comments go above the clause group, so that they do
/// not break it.
pub(crate) fn print_self_keyword_without_leading(node: &Node, ctx: PrintContext) -> PrintResult {
    print_self_without_leading(node, ctx, casing::keyword(literal(node)?, ctx.options))
}

pub(crate) fn print_self_verbatim(node: &Node, ctx: PrintContext) -> PrintResult {
    print_self(node, ctx, literal(node)?.to_string())
}

/// The `order`, `as`/`alias` and `comma` slots of `node` enabled in `emit`. Table
/// decorations (`FOR SYSTEM_TIME AS OF`, `WITH OFFSET`) go with the alias.
pub(crate) fn print_suffix(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let ctx = ctx.nested();
    let mut docs = Vec::new();
    if emit.order {
        docs.push(print_slot_after(text(" "), node, "order", ctx, Emit::none())?);
        if node.has("null_order") {
            docs.push(text(" "));
            docs.push(print_words(node, "null_order", ctx)?);
        }
    }
    if emit.alias {
        docs.push(print_slot_after(text(" "), node, "as", ctx, Emit::none())?);
        docs.push(print_slot_after(text(" "), node, "alias", ctx, Emit::none())?);
        docs.push(print_slot_after(text(" "), node, "for_system_time_as_of", ctx, Emit::none())?);
        docs.push(print_slot_after(text(" "), node, "with_offset", ctx, Emit::all())?);
    }
    if emit.comma {
        docs.push(print_slot(node, "comma", ctx, Emit::none())?);
    }
    Ok(concat(docs))
}

// ============================================================================
// Dispatch
// ============================================================================

pub fn print_node(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    match &node.node_type {
        NodeType::Identifier => expr::print_identifier(node, ctx, emit),
        NodeType::Keyword | NodeType::BooleanLiteral | NodeType::NullLiteral => {
            expr::print_keyword(node, ctx, emit)
        }
        NodeType::Symbol | NodeType::StringLiteral | NodeType::Parameter => {
            expr::print_verbatim(node, ctx, emit)
        }
        NodeType::NumericLiteral => expr::print_numeric(node, ctx, emit),
        NodeType::Comment => print_comment(node, ctx),
        NodeType::Eof => print_leading_comments(node, ctx),
        NodeType::UnaryOperator => expr::print_unary_operator(node, ctx, emit),
        NodeType::BinaryOperator => expr::print_binary_operator(node, ctx, emit),
        NodeType::IsDistinctFromOperator => expr::print_is_distinct_from_operator(node, ctx, emit),
        NodeType::BetweenOperator => expr::print_between_operator(node, ctx, emit),
        NodeType::InOperator => expr::print_in_operator(node, ctx, emit),
        NodeType::DotOperator => expr::print_dot_operator(node, ctx, emit, None),
        NodeType::AccessOperator => expr::print_access_operator(node, ctx, emit),
        NodeType::CallingFunction | NodeType::CallingTableFunction | NodeType::CallingUnnest => {
            expr::print_calling_function(node, ctx, emit)
        }
        NodeType::CastArgument => expr::print_cast_argument(node, ctx, emit),
        NodeType::ExtractArgument => expr::print_extract_argument(node, ctx, emit),
        NodeType::CaseExpr => expr::print_case_expr(node, ctx, emit),
        NodeType::CaseExprArm => expr::print_case_expr_arm(node, ctx, emit),
        NodeType::IntervalLiteral => expr::print_interval_literal(node, ctx, emit),
        NodeType::GroupedExpr => expr::print_grouped_expr(node, ctx, emit),
        NodeType::GroupedExprs => expr::print_grouped_exprs(node, ctx, emit),
        NodeType::EmptyStruct => expr::print_empty_struct(node, ctx, emit),
        NodeType::StructLiteral => expr::print_struct_literal(node, ctx, emit),
        NodeType::ArrayLiteral => expr::print_array_literal(node, ctx, emit),
        NodeType::Asterisk => expr::print_asterisk(node, ctx, emit),
        NodeType::Type => expr::print_type(node, ctx, emit),
        NodeType::GroupedType => expr::print_grouped_type(node, ctx, emit),
        NodeType::GroupedTypeDeclarationOrConstraints => {
            expr::print_grouped_type_declarations(node, ctx, emit)
        }
        NodeType::TypeDeclaration => expr::print_type_declaration(node, ctx, emit),
        NodeType::OverClause => expr::print_over_clause(node, ctx, emit),
        NodeType::WindowSpecification => expr::print_window_specification(node, ctx, emit),
        NodeType::WindowFrameClause => expr::print_window_frame_clause(node, ctx, emit),
        NodeType::SelectStatement => query::print_select_statement(node, ctx, emit),
        NodeType::SetOperator => query::print_set_operator(node, ctx, emit),
        NodeType::GroupedStatement => query::print_grouped_statement(node, ctx, emit),
        NodeType::WithClause => query::print_with_clause(node, ctx, emit),
        NodeType::WithQuery => query::print_with_query(node, ctx, emit),
        NodeType::KeywordWithExpr => query::print_keyword_with_expr(node, ctx, emit),
        NodeType::KeywordWithExprs => query::print_keyword_with_exprs(node, ctx, emit),
        NodeType::KeywordWithGroupedXXX => query::print_keyword_with_grouped(node, ctx, emit),
        NodeType::XXXByExprs | NodeType::GroupByExprs => query::print_xxxby_exprs(node, ctx, emit),
        NodeType::LimitClause => query::print_limit_clause(node, ctx, emit),
        NodeType::WindowClause => query::print_window_clause(node, ctx, emit),
        NodeType::WindowExpr => query::print_window_expr(node, ctx, emit),
        NodeType::JoinOperator => query::print_join_operator(node, ctx, emit),
        NodeType::ForSystemTimeAsOfClause => query::print_for_system_time_as_of(node, ctx, emit),
        NodeType::WithOffsetClause => query::print_with_offset(node, ctx, emit),
        NodeType::InsertStatement => script::print_insert_statement(node, ctx, emit),
        NodeType::DeleteStatement => script::print_delete_statement(node, ctx, emit),
        NodeType::TruncateStatement => script::print_truncate_statement(node, ctx, emit),
        NodeType::UpdateStatement => script::print_update_statement(node, ctx, emit),
        NodeType::DeclareStatement => script::print_declare_statement(node, ctx, emit),
        NodeType::SetStatement => script::print_set_statement(node, ctx, emit),
        NodeType::IfStatement => script::print_if_statement(node, ctx, emit),
        NodeType::ElseIfClause => script::print_else_if_clause(node, ctx, emit),
        NodeType::KeywordWithStatements => script::print_keyword_with_statements(node, ctx, emit),
        NodeType::BeginStatement => script::print_begin_statement(node, ctx, emit),
        NodeType::TransactionStatement
        | NodeType::BreakContinueStatement
        | NodeType::SingleTokenStatement
        | NodeType::CallStatement
        | NodeType::RaiseStatement => script::print_simple_statement(node, ctx, emit),
        NodeType::Other(name) => Err(FormatError::UnsupportedNodeType(name.clone())),
    }
}

// ============================================================================
// Statement lists
// ============================================================================

/// Line break closing a top-level statement, plus one blank line when the source had
/// blank lines after it.
pub(crate) fn print_statement_end(ctx: PrintContext) -> Doc {
    match (ctx.root, ctx.empty_lines) {
        (false, _) => nil(),
        (true, 0) => hardline(),
        (true, _) => concat(vec![hardline(), hardline()]),
    }
}

/// Groups the parts of a statement with its suffix and semicolon. The semicolon goes
/// on its own line when the statement spans several lines.
pub(crate) fn finish_statement(node: &Node, ctx: PrintContext, emit: Emit, mut docs: Vec<Doc>) -> PrintResult {
    docs.push(print_suffix(node, ctx, emit)?);
    if let Some(semicolon) = node.node("semicolon") {
        docs.push(softline());
        docs.push(print_node(semicolon, ctx.nested(), Emit::none())?);
    }
    Ok(concat(vec![group(concat(docs)), print_statement_end(ctx)]))
}

/// Statements nested in a block, one per line and indented. The caller puts the line
/// break before the closing keyword.
pub(crate) fn print_statement_block(stmts: &[Node], ctx: PrintContext) -> PrintResult {
    if stmts.is_empty() {
        return Ok(nil());
    }
    let empty_lines = blank_lines::analyze(stmts)?;
    let mut docs = Vec::new();
    for (i, stmt) in stmts.iter().enumerate() {
        if i > 0 {
            docs.push(hardline());
            if empty_lines[i - 1] > 0 {
                docs.push(hardline());
            }
        }
        docs.push(print_node(stmt, ctx.nested(), Emit::all())?);
    }
    Ok(indent(concat(vec![hardline(), concat(docs)])))
}

/// Prints a parsed file: statements followed by the `EOF` node.
pub fn print_code(nodes: &[Node], options: &FormatOptions) -> PrintResult {
    let ctx = PrintContext::new(options);
    let empty_lines = blank_lines::analyze(nodes)?;
    log::debug!("printing {} node(s)", nodes.len());
    let docs = nodes
        .iter()
        .zip(empty_lines)
        .map(|(node, empty)| {
            if node.node_type.is_statement() {
                print_node(node, ctx.root_statement(empty), Emit::all())
            } else {
                print_node(node, ctx, Emit::all())
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(concat(docs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{format_cst, pretty_print};
    use bqfmt_lang::ContentType;

    fn format(src: &str) -> String {
        pretty_print(src, &None, &FormatOptions::default()).expect("formatting failed")
    }

    fn format_width(src: &str, width: usize) -> String {
        pretty_print(src, &None, &FormatOptions::with_width(width)).expect("formatting failed")
    }

    fn format_with(src: &str, options: FormatOptions) -> String {
        pretty_print(src, &None, &options).expect("formatting failed")
    }

    fn assert_idempotent(src: &str) {
        let first = format(src);
        let second = format(&first);
        assert_eq!(first, second, "formatting is not idempotent for:\n{src}");
    }

    // ========================================================================
    // Statements and set operators
    // ========================================================================

    #[test]
    fn test_union_all() {
        let output = format("select 1 as one union all select 2 as two;");
        assert_eq!(output, "SELECT\n  1 AS one\nUNION ALL\nSELECT\n  2 AS two\n;\n");
    }

    #[test]
    fn test_keywords_kept_when_upper_case_disabled() {
        let options = FormatOptions {
            print_keywords_in_upper_case: false,
            ..FormatOptions::default()
        };
        let output = format_with("select 1 as one union all select 2 as two;", options);
        assert_eq!(output, "select\n  1 as one\nunion all\nselect\n  2 as two\n;\n");
    }

    #[test]
    fn test_select_clauses() {
        let output = format("select a, b from t where x = 1 group by a, b order by a desc limit 10;");
        assert_eq!(
            output,
            "SELECT\n  a,\n  b\nFROM t\nWHERE x = 1\nGROUP BY a, b\nORDER BY a DESC\nLIMIT 10\n;\n"
        );
    }

    #[test]
    fn test_select_distinct_as_struct() {
        assert_eq!(format("select distinct a from t"), "SELECT DISTINCT\n  a\nFROM t\n");
        assert_eq!(format("select as struct 1 as x"), "SELECT AS STRUCT\n  1 AS x\n");
    }

    #[test]
    fn test_statement_without_semicolon() {
        assert_eq!(format("SELECT 1"), "SELECT\n  1\n");
    }

    // ========================================================================
    // Blank lines
    // ========================================================================

    #[test]
    fn test_blank_lines_collapse() {
        let output = format("SELECT 1;\n\n\nSELECT 2;");
        assert_eq!(output, "SELECT\n  1\n;\n\nSELECT\n  2\n;\n");
    }

    #[test]
    fn test_no_blank_line_kept_as_none() {
        let output = format("SELECT 1;\nSELECT 2;");
        assert_eq!(output, "SELECT\n  1\n;\nSELECT\n  2\n;\n");
    }

    // ========================================================================
    // Line breaking
    // ========================================================================

    #[test]
    fn test_where_breaks_before_and() {
        let src = "SELECT * FROM t WHERE a = 1 AND b = 2";
        assert_eq!(format(src), "SELECT\n  *\nFROM t\nWHERE a = 1 AND b = 2\n");
        assert_eq!(
            format_width(src, 16),
            "SELECT\n  *\nFROM t\nWHERE\n  a = 1\n  AND b = 2\n"
        );
    }

    #[test]
    fn test_function_arguments_break() {
        let src = "SELECT some_function(first_argument, second_argument) FROM t";
        assert_eq!(
            format_width(src, 30),
            "SELECT\n  some_function(\n    first_argument,\n    second_argument\n  )\nFROM t\n"
        );
    }

    #[test]
    fn test_case_expr() {
        assert_eq!(
            format("select case when a then 1 else 2 end"),
            "SELECT\n  CASE WHEN a THEN 1 ELSE 2 END\n"
        );
        assert_eq!(
            format_width("select case x when 1 then 'one' else 'other' end as y", 20),
            "SELECT\n  CASE x\n    WHEN 1 THEN 'one'\n    ELSE 'other'\n  END AS y\n"
        );
    }

    // ========================================================================
    // Comments
    // ========================================================================

    #[test]
    fn test_trailing_comment() {
        assert_eq!(format("SELECT 1 -- c"), "SELECT\n  1 -- c\n");
    }

    #[test]
    fn test_leading_comments() {
        let output = format("-- head\nSELECT\n  -- first\n  a, b FROM t");
        assert_eq!(output, "-- head\nSELECT\n  -- first\n  a,\n  b\nFROM t\n");
    }

    #[test]
    fn test_trailing_comment_after_comma() {
        let output = format("SELECT a, -- note\n b");
        assert_eq!(output, "SELECT\n  a, -- note\n  b\n");
    }

    #[test]
    fn test_comment_at_end_of_file() {
        assert_eq!(format("SELECT 1;\n-- bye\n"), "SELECT\n  1\n;\n-- bye\n");
        assert_eq!(format("-- only a comment"), "-- only a comment\n");
    }

    #[test]
    fn test_trailing_comment_keeps_construct_together() {
        for (src, expected) in [
            ("select a.b -- c\nfrom t", "SELECT\n  a.b -- c\nFROM t\n"),
            ("select a.b -- c\n, d", "SELECT\n  a.b, -- c\n  d\n"),
            ("select f(x) -- c\nfrom t", "SELECT\n  f(x) -- c\nFROM t\n"),
            ("select f(x) -- c\n, d", "SELECT\n  f(x), -- c\n  d\n"),
            ("select [1, 2] -- c\nfrom t", "SELECT\n  [1, 2] -- c\nFROM t\n"),
            ("select [1, 2] -- c\n, 3", "SELECT\n  [1, 2], -- c\n  3\n"),
            ("select x in (1, 2) -- c\nfrom t", "SELECT\n  x IN (1, 2) -- c\nFROM t\n"),
        ] {
            let first = format(src);
            assert_eq!(first, expected, "for {src:?}");
            assert_eq!(format(&first), first, "second pass of {src:?}");
        }
    }

    #[test]
    fn test_trailing_comment_in_condition() {
        assert_eq!(
            format("select * from t where a = b -- c"),
            "SELECT\n  *\nFROM t\nWHERE a = b -- c\n"
        );
        let output = format("select * from t where b = 1 -- c\nand x = 2");
        assert_eq!(output, "SELECT\n  *\nFROM t\nWHERE\n  b = 1 -- c\n  AND x = 2\n");
        assert_eq!(format(&output), output);
    }

    #[test]
    fn test_comment_above_clause() {
        assert_eq!(format("select a\n-- c\nfrom t"), "SELECT\n  a\n-- c\nFROM t\n");
        assert_eq!(
            format("select x from t\n-- e\nwhere x\n-- g\ngroup by x"),
            "SELECT\n  x\nFROM t\n-- e\nWHERE x\n-- g\nGROUP BY x\n"
        );
    }

    #[test]
    fn test_multiline_comment() {
        let src = "/* first\n     second */\nSELECT 1";
        assert_eq!(format(src), "/* first\n     second */\nSELECT\n  1\n");
        let options = FormatOptions {
            format_multiline_comment: true,
            ..FormatOptions::default()
        };
        assert_eq!(
            format_with(src, options),
            "/*\n * first\n * second\n */\nSELECT\n  1\n"
        );
    }

    // ========================================================================
    // Casing
    // ========================================================================

    #[test]
    fn test_builtin_functions_upper_case() {
        let output = format("select count(*), sum(x), my_udf(y), t.count from t");
        assert_eq!(output, "SELECT\n  COUNT(*),\n  SUM(x),\n  my_udf(y),\n  t.count\nFROM t\n");
    }

    #[test]
    fn test_namespaced_functions() {
        let output = format("select safe.divide(a, b), net.host(url), hll_count.merge(s)");
        assert_eq!(
            output,
            "SELECT\n  SAFE.DIVIDE(a, b),\n  NET.HOST(url),\n  HLL_COUNT.MERGE(s)\n"
        );
    }

    #[test]
    fn test_literal_casing() {
        let output = format("select 1.5E3, 'Abc', null, true, date '2020-01-01', b'x', -1");
        assert_eq!(
            output,
            "SELECT\n  1.5e3,\n  'Abc',\n  NULL,\n  TRUE,\n  DATE '2020-01-01',\n  b'x',\n  -1\n"
        );
    }

    #[test]
    fn test_hex_literal() {
        assert_eq!(format("select 0x1F, 0xabE1 as h"), "SELECT\n  0x1F,\n  0xabE1 AS h\n");
    }

    #[test]
    fn test_date_parts() {
        let output = format("select date_trunc(d, month), date_add(d, interval 1 day), extract(year from d)");
        assert_eq!(
            output,
            "SELECT\n  DATE_TRUNC(d, MONTH),\n  DATE_ADD(d, INTERVAL 1 DAY),\n  EXTRACT(YEAR FROM d)\n"
        );
    }

    #[test]
    fn test_pseudo_columns() {
        let src = "select _partitiontime from t";
        assert_eq!(format(src), "SELECT\n  _PARTITIONTIME\nFROM t\n");
        let options = FormatOptions {
            print_pseudo_columns_in_upper_case: false,
            ..FormatOptions::default()
        };
        assert_eq!(format_with(src, options), "SELECT\n  _partitiontime\nFROM t\n");
    }

    #[test]
    fn test_exists_spacing() {
        assert_eq!(
            format("select exists(select 1)"),
            "SELECT\n  EXISTS (\n    SELECT\n      1\n  )\n"
        );
    }

    // ========================================================================
    // Suppression
    // ========================================================================

    fn slot_mut<'a>(node: &'a mut Node, slot: &str) -> &'a mut Node {
        match node.children.get_mut(slot) {
            Some(ContentType::Node(child)) => child,
            Some(ContentType::NodeVec(children)) => &mut children[0],
            None => panic!("missing slot {slot}"),
        }
    }

    fn decorate(node: &mut Node) {
        let token = |literal: &str| bqfmt_lang::Token::new(1, 1, literal);
        node.push_node("alias", Node::new(token("hidden"), NodeType::Identifier));
        node.push_node("order", Node::new(token("DESC"), NodeType::Keyword));
        node.push_node_vec(
            "null_order",
            vec![
                Node::new(token("NULLS"), NodeType::Keyword),
                Node::new(token("LAST"), NodeType::Keyword),
            ],
        );
        node.push_node("comma", Node::new(token(","), NodeType::Symbol));
    }

    #[test]
    fn test_nested_operand_does_not_print_suffix() {
        let mut nodes = bqfmt_lang::parse("SELECT x + 1", &None).expect("failed to parse");
        decorate(slot_mut(slot_mut(&mut nodes[0], "exprs"), "left"));
        let output = format_cst(&nodes, &FormatOptions::default()).expect("formatting failed");
        assert_eq!(output, "SELECT\n  x + 1\n");
    }

    #[test]
    fn test_grouped_expr_does_not_print_inner_suffix() {
        let mut nodes = bqfmt_lang::parse("SELECT (y)", &None).expect("failed to parse");
        decorate(slot_mut(slot_mut(&mut nodes[0], "exprs"), "expr"));
        let output = format_cst(&nodes, &FormatOptions::default()).expect("formatting failed");
        assert_eq!(output, "SELECT\n  (y)\n");
    }

    #[test]
    fn test_list_item_prints_suffix() {
        let mut nodes = bqfmt_lang::parse("SELECT y", &None).expect("failed to parse");
        let item = slot_mut(&mut nodes[0], "exprs");
        item.push_node("order", Node::new(bqfmt_lang::Token::new(1, 1, "desc"), NodeType::Keyword));
        let output = format_cst(&nodes, &FormatOptions::default()).expect("formatting failed");
        assert_eq!(output, "SELECT\n  y DESC\n");
    }

    // ========================================================================
    // Errors
    // ========================================================================

    #[test]
    fn test_unsupported_node_type() {
        let json = r#"[
            {"token": {"line": 1, "column": 1, "literal": "MERGE"},
             "node_type": "MergeStatement", "children": {}},
            {"token": null, "node_type": "EOF", "children": {}}
        ]"#;
        let nodes = bqfmt_lang::cst::from_json(json).expect("valid json");
        let err = format_cst(&nodes, &FormatOptions::default()).expect_err("must fail");
        assert_eq!(err, FormatError::UnsupportedNodeType("MergeStatement".to_string()));
    }

    #[test]
    fn test_missing_token() {
        let json = r#"[
            {"token": null, "node_type": "Identifier", "children": {}},
            {"token": null, "node_type": "EOF", "children": {}}
        ]"#;
        let nodes = bqfmt_lang::cst::from_json(json).expect("valid json");
        let err = format_cst(&nodes, &FormatOptions::default()).expect_err("must fail");
        assert!(matches!(err, FormatError::MissingToken { .. }));
    }

    // ========================================================================
    // Idempotence
    // ========================================================================

    #[test]
    fn test_idempotence() {
        for src in [
            "select a, b as c from t left join u using (id) where a in (1, 2) and not b",
            "with x as (select 1 as a), y as (select a from x) select * from y;",
            "select count(distinct a) over (partition by b order by c rows between unbounded preceding and current row) from t",
            "select array<int64>[1, 2], struct(1 as a, 'b' as b), cast(x as string format 'YYYY')",
            "insert into t (a, b) values (1, 2), (3, 4);\n\n\ndelete from t where a = 1;",
            "-- lead\nselect 1; -- trail\n/* block\n   comment */\nselect 2;",
        ] {
            assert_idempotent(src);
        }
    }
}
