use bqfmt_lang::Node;

use super::expr::is_query;
use super::{
    Emit, PrintContext, PrintResult, child, finish_statement, print_leading_comments,
    print_list, print_node, print_self_keyword, print_self_keyword_without_leading,
    print_self_verbatim, print_slot, print_slot_after, print_suffix, print_words,
};
use crate::doc::{
    Doc, broken_group, concat, dedent_to_root, group, hardline, indent, join, line,
    mark_as_root, nil, softline, text,
};

const SELECT_CLAUSES: &[&str] = &[
    "from", "where", "groupby", "having", "qualify", "window", "orderby", "limit",
];

/// Separator between the queries of a `WITH` clause, and between the clause and its query.
fn cte_separator(ctx: PrintContext) -> Doc {
    if ctx.options.print_blank_line_after_cte {
        concat(vec![hardline(), hardline()])
    } else {
        line()
    }
}

fn print_with_prefix(node: &Node, ctx: PrintContext) -> PrintResult {
    match node.node("with") {
        Some(with) => Ok(concat(vec![
            print_node(with, ctx.nested(), Emit::none())?,
            cte_separator(ctx),
        ])),
        None => Ok(nil()),
    }
}

// ============================================================================
// Queries
// ============================================================================

/// The select list always starts on the line below `SELECT`, one expression per line.
pub(super) fn print_select_statement(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let mut head = vec![
        print_self_keyword(node, ctx)?,
        print_slot_after(text(" "), node, "distinct_or_all", ctx, Emit::none())?,
    ];
    if node.has("as_struct_or_value") {
        head.push(text(" "));
        head.push(print_words(node, "as_struct_or_value", ctx)?);
    }
    let exprs = print_list(node.nodes("exprs"), ctx, Emit::all())?;
    let mut docs = vec![
        print_with_prefix(node, ctx)?,
        broken_group(mark_as_root(indent(concat(vec![
            dedent_to_root(concat(head)),
            line(),
            join(line(), exprs),
        ])))),
    ];
    for slot in SELECT_CLAUSES {
        if let Some(clause) = node.node(slot) {
            docs.push(line());
            docs.push(print_node(clause, ctx.nested(), Emit::none())?);
        }
    }
    finish_statement(node, ctx, emit, docs)
}

/// `left UNION ALL right`, with the operator on its own line.
pub(super) fn print_set_operator(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let docs = vec![
        print_with_prefix(node, ctx)?,
        print_slot(node, "left", ctx, Emit::none())?,
        line(),
        print_self_keyword(node, ctx)?,
        print_slot_after(text(" "), node, "distinct_or_all", ctx, Emit::none())?,
        line(),
        print_slot(node, "right", ctx, Emit::none())?,
    ];
    finish_statement(node, ctx, emit, docs)
}

/// `(query) ORDER BY ... LIMIT ... AS alias`
pub(super) fn print_grouped_statement(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let docs = vec![
        print_with_prefix(node, ctx)?,
        print_self_verbatim(node, ctx)?,
        indent(concat(vec![
            softline(),
            print_slot(node, "stmt", ctx, Emit::none())?,
        ])),
        softline(),
        print_slot(node, "rparen", ctx, Emit::none())?,
        print_slot_after(line(), node, "orderby", ctx, Emit::none())?,
        print_slot_after(line(), node, "limit", ctx, Emit::none())?,
    ];
    finish_statement(node, ctx, emit, docs)
}

// ============================================================================
// WITH
// ============================================================================

pub(super) fn print_with_clause(node: &Node, ctx: PrintContext, _emit: Emit) -> PrintResult {
    let head = concat(vec![
        print_self_keyword_without_leading(node, ctx)?,
        print_slot_after(text(" "), node, "recursive", ctx, Emit::none())?,
    ]);
    let queries = join(cte_separator(ctx), print_list(node.nodes("queries"), ctx, Emit::all())?);
    let body = if ctx.options.indent_cte {
        indent(concat(vec![line(), queries]))
    } else {
        concat(vec![text(" "), queries])
    };
    Ok(concat(vec![
        print_leading_comments(node, ctx)?,
        group(concat(vec![head, body])),
    ]))
}

/// `name AS (query),`
pub(super) fn print_with_query(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    Ok(concat(vec![
        print_self_verbatim(node, ctx)?,
        print_slot_after(text(" "), node, "as", ctx, Emit::none())?,
        print_slot_after(text(" "), node, "stmt", ctx, Emit::none())?,
        print_suffix(node, ctx, Emit { alias: false, ..emit })?,
    ]))
}

// ============================================================================
// Clauses
// ============================================================================

/// `WHERE expr`, with the expression on the next line when it does not fit. A query
/// stays on the keyword's line since it spans several lines anyway.
pub(super) fn print_keyword_with_expr(node: &Node, ctx: PrintContext, _emit: Emit) -> PrintResult {
    let expr = child(node, "expr")?;
    let keyword = print_self_keyword_without_leading(node, ctx)?;
    let body = print_node(expr, ctx.nested(), Emit::all())?;
    let clause = if is_query(expr) {
        concat(vec![keyword, text(" "), body])
    } else {
        group(concat(vec![keyword, indent(concat(vec![line(), body]))]))
    };
    Ok(concat(vec![print_leading_comments(node, ctx)?, clause]))
}

/// `VALUES (1, 2), (3, 4)`, `SET a = 1, b = 2`
pub(super) fn print_keyword_with_exprs(node: &Node, ctx: PrintContext, _emit: Emit) -> PrintResult {
    let exprs = print_list(node.nodes("exprs"), ctx, Emit::all())?;
    Ok(concat(vec![
        print_leading_comments(node, ctx)?,
        group(concat(vec![
            print_self_keyword_without_leading(node, ctx)?,
            indent(concat(vec![line(), join(line(), exprs)])),
        ])),
    ]))
}

/// `USING (a, b)`, `EXCEPT (a)`, `REPLACE (x AS a)`
pub(super) fn print_keyword_with_grouped(node: &Node, ctx: PrintContext, _emit: Emit) -> PrintResult {
    Ok(concat(vec![
        print_self_keyword(node, ctx)?,
        print_slot_after(text(" "), node, "group", ctx, Emit::none())?,
    ]))
}

/// `ORDER BY`, `PARTITION BY` and `GROUP BY`. `GROUP BY ALL` has no expressions.
pub(super) fn print_xxxby_exprs(node: &Node, ctx: PrintContext, _emit: Emit) -> PrintResult {
    let leading = print_leading_comments(node, ctx)?;
    let head = concat(vec![
        print_self_keyword_without_leading(node, ctx)?,
        print_slot_after(text(" "), node, "by", ctx, Emit::none())?,
    ]);
    if node.has("how") {
        return Ok(concat(vec![leading, head, text(" "), print_words(node, "how", ctx)?]));
    }
    let exprs = print_list(node.nodes("exprs"), ctx, Emit::all())?;
    Ok(concat(vec![
        leading,
        group(concat(vec![head, indent(concat(vec![line(), join(line(), exprs)]))])),
    ]))
}

pub(super) fn print_limit_clause(node: &Node, ctx: PrintContext, _emit: Emit) -> PrintResult {
    Ok(concat(vec![
        print_self_keyword(node, ctx)?,
        print_slot_after(text(" "), node, "expr", ctx, Emit::none())?,
        print_slot_after(text(" "), node, "offset", ctx, Emit::none())?,
    ]))
}

pub(super) fn print_window_clause(node: &Node, ctx: PrintContext, _emit: Emit) -> PrintResult {
    let exprs = print_list(node.nodes("window_exprs"), ctx, Emit::all())?;
    Ok(concat(vec![
        print_leading_comments(node, ctx)?,
        group(concat(vec![
            print_self_keyword_without_leading(node, ctx)?,
            indent(concat(vec![line(), join(line(), exprs)])),
        ])),
    ]))
}

/// `name AS (window)`
pub(super) fn print_window_expr(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    Ok(concat(vec![
        print_self_verbatim(node, ctx)?,
        print_slot_after(text(" "), node, "as", ctx, Emit::none())?,
        print_slot_after(text(" "), node, "window", ctx, Emit::none())?,
        print_suffix(node, ctx, Emit { alias: false, ..emit })?,
    ]))
}

// ============================================================================
// FROM items
// ============================================================================

/// `left, right` or `left [join_type] [OUTER] JOIN right ON ...`. Each joined item
/// starts a new line when the `FROM` clause breaks.
pub(super) fn print_join_operator(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let left = print_slot(node, "left", ctx, Emit::all())?;
    let right = print_slot(node, "right", ctx, Emit::all())?;
    if node.is(",") {
        return Ok(concat(vec![left, print_self_verbatim(node, ctx)?, line(), right]));
    }
    Ok(concat(vec![
        left,
        line(),
        print_slot(node, "join_type", ctx, Emit::none())?,
        if node.has("join_type") { text(" ") } else { nil() },
        print_slot(node, "outer", ctx, Emit::none())?,
        if node.has("outer") { text(" ") } else { nil() },
        print_self_keyword(node, ctx)?,
        text(" "),
        right,
        print_slot_after(text(" "), node, "on", ctx, Emit::none())?,
        print_slot_after(text(" "), node, "using", ctx, Emit::none())?,
        print_suffix(node, ctx, emit)?,
    ]))
}

/// `FOR SYSTEM_TIME AS OF expr`
pub(super) fn print_for_system_time_as_of(node: &Node, ctx: PrintContext, _emit: Emit) -> PrintResult {
    Ok(concat(vec![
        print_self_keyword(node, ctx)?,
        text(" "),
        print_words(node, "system_time_as_of", ctx)?,
        print_slot_after(text(" "), node, "expr", ctx, Emit::none())?,
    ]))
}

/// `WITH OFFSET [AS] [alias]`
pub(super) fn print_with_offset(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    Ok(concat(vec![
        print_self_keyword(node, ctx)?,
        print_slot_after(text(" "), node, "offset", ctx, Emit::none())?,
        print_suffix(node, ctx, emit)?,
    ]))
}
