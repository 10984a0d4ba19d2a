use bqfmt_lang::{Node, NodeType};

use super::{
    Emit, PrintContext, PrintResult, child, literal, print_leading_comments, print_list,
    print_node, print_self, print_self_keyword, print_self_verbatim, print_self_without_leading,
    print_slot, print_slot_after, print_suffix, print_words,
};
use crate::casing::{self, FunctionTable};
use crate::doc::{Doc, concat, group, indent, join, line, nil, softline, text};

const TIGHT_UNARY_OPERATORS: &[&str] = &["-", "+", "~", "B", "R", "BR", "RB"];
const LOGICAL_OPERATORS: &[&str] = &["AND", "OR"];
const NORMALIZE_FUNCTIONS: &[&str] = &["NORMALIZE", "NORMALIZE_AND_CASEFOLD"];

/// Statements used as expressions: `(SELECT ...)`, `EXISTS(SELECT ...)`.
pub(super) fn is_query(node: &Node) -> bool {
    matches!(
        node.node_type,
        NodeType::SelectStatement | NodeType::SetOperator | NodeType::GroupedStatement
    )
}

// ============================================================================
// Leaves
// ============================================================================

pub(super) fn print_identifier(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let literal = literal(node)?;
    let cased = if ctx.not_global {
        casing::pseudo_column(literal, ctx.options)
    } else {
        casing::identifier(literal, ctx.callable, ctx.options)
    };
    Ok(concat(vec![
        print_self(node, ctx, cased)?,
        print_suffix(node, ctx, emit)?,
    ]))
}

pub(super) fn print_keyword(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    Ok(concat(vec![
        print_self_keyword(node, ctx)?,
        print_suffix(node, ctx, emit)?,
    ]))
}

pub(super) fn print_verbatim(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    Ok(concat(vec![
        print_self_verbatim(node, ctx)?,
        print_suffix(node, ctx, emit)?,
    ]))
}

pub(super) fn print_numeric(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    Ok(concat(vec![
        print_self(node, ctx, casing::numeric(literal(node)?))?,
        print_suffix(node, ctx, emit)?,
    ]))
}

/// Date parts (`MONTH`, `WEEK(MONDAY)`) are keywords even though they parse as
/// identifiers and calls.
fn print_date_part(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    match node.node_type {
        NodeType::Identifier if !node.literal().is_some_and(|l| l.starts_with('`')) => {
            print_keyword(node, ctx, emit)
        }
        NodeType::CallingFunction => print_call(node, ctx, emit, true),
        _ => print_node(node, ctx, emit),
    }
}

// ============================================================================
// Operators
// ============================================================================

pub(super) fn print_unary_operator(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let op = literal(node)?;
    let right = child(node, "right")?;
    // `- -1` must not turn into the comment `--1`.
    let sign_follows = right.node_type == NodeType::UnaryOperator
        && right.token.as_ref().is_some_and(|t| t.in_(&["-", "+"]));
    let (op, separator) = if TIGHT_UNARY_OPERATORS.contains(&op.to_uppercase().as_str()) {
        let separator = if sign_follows { " " } else { "" };
        (print_self_verbatim(node, ctx)?, separator)
    } else {
        (print_self_keyword(node, ctx)?, " ")
    };
    Ok(concat(vec![
        op,
        text(separator),
        print_slot(node, "right", ctx, Emit::none())?,
        print_suffix(node, ctx, emit)?,
    ]))
}

/// `left op right`. `IS` is followed by `NOT`, the other operators are preceded by it.
fn print_operator(node: &Node, ctx: PrintContext) -> PrintResult {
    let op = print_self_keyword(node, ctx)?;
    let Some(not) = node.node("not") else {
        return Ok(op);
    };
    let not = print_node(not, ctx.nested(), Emit::none())?;
    if node.is("IS") {
        Ok(concat(vec![op, text(" "), not]))
    } else {
        Ok(concat(vec![not, text(" "), op]))
    }
}

fn is_logical_operator(node: &Node) -> bool {
    node.node_type == NodeType::BinaryOperator
        && node.token.as_ref().is_some_and(|t| t.in_(LOGICAL_OPERATORS))
}

/// `left op right` without its group. A chain such as `a AND b AND c` is flattened so
/// that all of its operators break together.
fn print_binary_operands(node: &Node, ctx: PrintContext) -> PrintResult {
    let left = child(node, "left")?;
    let right = child(node, "right")?;
    let same_chain = is_logical_operator(node)
        && is_logical_operator(left)
        && left.literal().map(str::to_uppercase) == node.literal().map(str::to_uppercase);
    let left = if same_chain {
        print_binary_operands(left, ctx.nested())?
    } else {
        print_node(left, ctx.nested(), Emit::none())?
    };
    let separator = if is_query(right) { text(" ") } else { line() };
    Ok(concat(vec![
        left,
        separator,
        print_operator(node, ctx)?,
        print_slot_after(text(" "), node, "quantifier", ctx, Emit::none())?,
        text(" "),
        print_node(right, ctx.nested(), Emit::none())?,
    ]))
}

pub(super) fn print_binary_operator(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    Ok(concat(vec![
        group(print_binary_operands(node, ctx)?),
        print_suffix(node, ctx, emit)?,
    ]))
}

pub(super) fn print_is_distinct_from_operator(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    Ok(concat(vec![
        group(concat(vec![
            print_slot(node, "left", ctx, Emit::none())?,
            line(),
            print_operator(node, ctx)?,
            text(" "),
            print_slot(node, "distinct", ctx, Emit::none())?,
            text(" "),
            print_slot(node, "from", ctx, Emit::none())?,
            text(" "),
            print_slot(node, "right", ctx, Emit::none())?,
        ])),
        print_suffix(node, ctx, emit)?,
    ]))
}

/// `left [NOT] BETWEEN min AND max`. Only the space before `BETWEEN` breaks.
pub(super) fn print_between_operator(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    Ok(concat(vec![
        group(concat(vec![
            print_slot(node, "left", ctx, Emit::none())?,
            line(),
            print_operator(node, ctx)?,
            text(" "),
            print_slot(node, "right_min", ctx, Emit::none())?,
            text(" "),
            print_slot(node, "and", ctx, Emit::none())?,
            text(" "),
            print_slot(node, "right_max", ctx, Emit::none())?,
        ])),
        print_suffix(node, ctx, emit)?,
    ]))
}

/// `left [NOT] IN (list)`, `left IN (query)` or `left IN UNNEST(array)`.
pub(super) fn print_in_operator(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let right = child(node, "right")?;
    let separator = if is_query(right) { text(" ") } else { line() };
    Ok(concat(vec![
        group(concat(vec![
            print_slot(node, "left", ctx, Emit::none())?,
            separator,
            print_operator(node, ctx)?,
            text(" "),
            print_node(right, ctx.nested(), Emit::none())?,
        ])),
        print_suffix(node, ctx, emit)?,
    ]))
}

/// `a.b`, breaking before the dot when the chain does not fit. With `namespace`, the
/// left side is a function namespace such as `SAFE` and the right side a function looked
/// up in that namespace. Such names never break.
pub(super) fn print_dot_operator(
    node: &Node,
    ctx: PrintContext,
    emit: Emit,
    namespace: Option<FunctionTable>,
) -> PrintResult {
    let left = child(node, "left")?;
    let right = child(node, "right")?;
    let left = match namespace {
        Some(_) => print_keyword(left, ctx.nested(), Emit::none())?,
        None => print_node(left, ctx.nested(), Emit::none())?,
    };
    let right = match (namespace, &right.node_type) {
        (Some(table), _) => print_identifier(right, ctx.callable(table), Emit::none())?,
        (None, NodeType::Identifier) => print_identifier(right, ctx.not_global(), Emit::none())?,
        (None, _) => print_node(right, ctx.nested(), Emit::none())?,
    };
    let dot = print_self_verbatim(node, ctx)?;
    let chain = match namespace {
        Some(_) => concat(vec![left, dot, right]),
        None => group(concat(vec![left, indent(concat(vec![softline(), dot, right]))])),
    };
    Ok(concat(vec![chain, print_suffix(node, ctx, emit)?]))
}

pub(super) fn print_access_operator(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    Ok(concat(vec![
        print_slot(node, "left", ctx, Emit::none())?,
        print_self_verbatim(node, ctx)?,
        print_slot(node, "right", ctx, Emit::none())?,
        print_slot(node, "rparen", ctx, Emit::none())?,
        print_suffix(node, ctx, emit)?,
    ]))
}

// ============================================================================
// Function calls
// ============================================================================

fn print_callee(func: &Node, ctx: PrintContext) -> PrintResult {
    match func.node_type {
        NodeType::Identifier => print_identifier(func, ctx.callable(FunctionTable::Global), Emit::none()),
        NodeType::DotOperator => {
            let namespace = match (func.node("left"), func.node("right")) {
                (Some(left), Some(right))
                    if left.node_type == NodeType::Identifier
                        && right.node_type == NodeType::Identifier =>
                {
                    left.literal().and_then(FunctionTable::from_prefix)
                }
                _ => None,
            };
            print_dot_operator(func, ctx.nested(), Emit::none(), namespace)
        }
        _ => print_node(func, ctx.nested(), Emit::none()),
    }
}

/// Index of the argument holding a date part or a normalization mode, if any.
fn keyword_argument(name: &str, args: &[Node]) -> Option<usize> {
    let index = if casing::is_date_part_function(name) {
        // `DATE_DIFF(a, b, part)`, `TIMESTAMP_TRUNC(ts, part, zone)`, `DATE_ADD(d, interval)`
        if name.ends_with("_DIFF") { 2 } else { 1 }
    } else if NORMALIZE_FUNCTIONS.contains(&name) {
        1
    } else {
        return None;
    };
    (index < args.len()).then_some(index)
}

/// `func(args)` with its modifiers. With `date_part`, the function and its arguments
/// are date parts themselves, as in `WEEK(MONDAY)`.
fn print_call(node: &Node, ctx: PrintContext, emit: Emit, date_part: bool) -> PrintResult {
    let func = child(node, "func")?;
    let name = match func.node_type {
        NodeType::Identifier => literal(func)?.to_uppercase(),
        _ => String::new(),
    };
    let func_doc = if date_part {
        print_date_part(func, ctx.nested(), Emit::none())?
    } else {
        print_callee(func, ctx)?
    };
    let args = node.nodes("args");
    let keyword_arg = keyword_argument(&name, args);
    let args = args
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            if date_part || keyword_arg == Some(i) {
                print_date_part(arg, ctx.nested(), Emit::all())
            } else {
                print_node(arg, ctx.nested(), Emit::all())
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    let mut inner = vec![softline()];
    inner.push(print_slot(node, "distinct", ctx, Emit::none())?);
    if node.has("distinct") {
        inner.push(text(" "));
    }
    inner.push(join(line(), args));
    if node.has("ignore_nulls") {
        inner.push(text(" "));
        inner.push(print_words(node, "ignore_nulls", ctx)?);
    }
    inner.push(print_slot_after(text(" "), node, "orderby", ctx, Emit::none())?);
    inner.push(print_slot_after(text(" "), node, "limit", ctx, Emit::none())?);
    let separator = if name == "EXISTS" { " " } else { "" };
    Ok(concat(vec![
        group(concat(vec![
            func_doc,
            text(separator),
            print_self_verbatim(node, ctx)?,
            indent(concat(inner)),
            softline(),
            print_slot(node, "rparen", ctx, Emit::none())?,
        ])),
        print_slot_after(text(" "), node, "over", ctx, Emit::none())?,
        print_suffix(node, ctx, emit)?,
    ]))
}

pub(super) fn print_calling_function(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    print_call(node, ctx, emit, false)
}

pub(super) fn print_cast_argument(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    Ok(concat(vec![
        print_slot(node, "cast_from", ctx, Emit::none())?,
        text(" "),
        print_self_keyword(node, ctx)?,
        text(" "),
        print_slot(node, "cast_to", ctx, Emit::none())?,
        print_slot_after(text(" "), node, "format", ctx, Emit::none())?,
        print_suffix(node, ctx, emit)?,
    ]))
}

pub(super) fn print_extract_argument(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let mut docs = vec![
        print_date_part(child(node, "extract_datepart")?, ctx.nested(), Emit::none())?,
        text(" "),
        print_self_keyword(node, ctx)?,
        text(" "),
        print_slot(node, "extract_from", ctx, Emit::none())?,
    ];
    if node.has("at_time_zone") {
        docs.push(text(" "));
        docs.push(print_words(node, "at_time_zone", ctx)?);
        docs.push(print_slot_after(text(" "), node, "time_zone", ctx, Emit::none())?);
    }
    docs.push(print_suffix(node, ctx, emit)?);
    Ok(concat(docs))
}

// ============================================================================
// CASE, INTERVAL
// ============================================================================

pub(super) fn print_case_expr(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let arms = print_list(node.nodes("arms"), ctx, Emit::none())?;
    Ok(concat(vec![
        group(concat(vec![
            print_self_keyword(node, ctx)?,
            print_slot_after(text(" "), node, "expr", ctx, Emit::none())?,
            indent(concat(vec![line(), join(line(), arms)])),
            line(),
            print_slot(node, "end", ctx, Emit::none())?,
        ])),
        print_suffix(node, ctx, emit)?,
    ]))
}

/// `WHEN expr THEN result`, or `ELSE result`.
pub(super) fn print_case_expr_arm(node: &Node, ctx: PrintContext, _emit: Emit) -> PrintResult {
    let mut docs = vec![print_self_keyword(node, ctx)?];
    if node.has("expr") {
        docs.push(print_slot_after(text(" "), node, "expr", ctx, Emit::none())?);
        docs.push(print_slot_after(text(" "), node, "then", ctx, Emit::none())?);
    }
    docs.push(print_slot_after(text(" "), node, "result", ctx, Emit::none())?);
    Ok(concat(docs))
}

pub(super) fn print_interval_literal(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let mut docs = vec![
        print_self_keyword(node, ctx)?,
        text(" "),
        print_slot(node, "expr", ctx, Emit::none())?,
        text(" "),
        print_date_part(child(node, "date_part")?, ctx.nested(), Emit::none())?,
    ];
    if let Some(to_date_part) = node.node("to_date_part") {
        docs.push(print_slot_after(text(" "), node, "to", ctx, Emit::none())?);
        docs.push(text(" "));
        docs.push(print_date_part(to_date_part, ctx.nested(), Emit::none())?);
    }
    docs.push(print_suffix(node, ctx, emit)?);
    Ok(concat(docs))
}

// ============================================================================
// Parentheses and brackets
// ============================================================================

/// `open contents close` on one line, or with the contents indented on their own lines.
fn print_enclosed(open: Doc, contents: Doc, close: Doc) -> Doc {
    group(concat(vec![
        open,
        indent(concat(vec![softline(), contents])),
        softline(),
        close,
    ]))
}

/// `(expr)`. Comments in front of `(` move inside, in front of the expression.
pub(super) fn print_grouped_expr(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let open = print_self_without_leading(node, ctx, literal(node)?.to_string())?;
    let contents = concat(vec![
        print_leading_comments(node, ctx)?,
        print_slot(node, "expr", ctx, Emit::none())?,
    ]);
    Ok(concat(vec![
        print_enclosed(open, contents, print_slot(node, "rparen", ctx, Emit::none())?),
        print_suffix(node, ctx, emit)?,
    ]))
}

pub(super) fn print_grouped_exprs(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let exprs = print_list(node.nodes("exprs"), ctx, Emit::all())?;
    Ok(concat(vec![
        print_enclosed(
            print_self_verbatim(node, ctx)?,
            join(line(), exprs),
            print_slot(node, "rparen", ctx, Emit::none())?,
        ),
        print_suffix(node, ctx, emit)?,
    ]))
}

pub(super) fn print_empty_struct(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    Ok(concat(vec![
        print_self_verbatim(node, ctx)?,
        print_slot(node, "rparen", ctx, Emit::none())?,
        print_suffix(node, ctx, emit)?,
    ]))
}

/// `STRUCT<...>(...)`, `STRUCT(...)` and `(a, b)`. `ARRAY<...>[...]` and `[...]`.
fn print_constructor(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let exprs = print_list(node.nodes("exprs"), ctx, Emit::all())?;
    Ok(concat(vec![
        print_slot(node, "type", ctx, Emit::none())?,
        print_enclosed(
            print_self_verbatim(node, ctx)?,
            join(line(), exprs),
            print_slot(node, "rparen", ctx, Emit::none())?,
        ),
        print_suffix(node, ctx, emit)?,
    ]))
}

pub(super) fn print_struct_literal(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    print_constructor(node, ctx, emit)
}

pub(super) fn print_array_literal(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    print_constructor(node, ctx, emit)
}

/// `*`, `* EXCEPT (a)`, `* REPLACE (x AS a)`
pub(super) fn print_asterisk(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    Ok(concat(vec![
        print_self_verbatim(node, ctx)?,
        print_slot_after(text(" "), node, "except", ctx, Emit::none())?,
        print_slot_after(text(" "), node, "replace", ctx, Emit::none())?,
        print_suffix(node, ctx, emit)?,
    ]))
}

// ============================================================================
// Types
// ============================================================================

/// `INT64`, `STRING(10)`, `ARRAY<INT64>`, `STRUCT<a INT64, b STRING>`, `ANY TYPE`
pub(super) fn print_type(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    Ok(concat(vec![
        print_self_keyword(node, ctx)?,
        print_slot(node, "type_declaration", ctx, Emit::none())?,
        print_slot(node, "parameter", ctx, Emit::none())?,
        print_slot_after(text(" "), node, "type", ctx, Emit::none())?,
        print_slot_after(text(" "), node, "collate", ctx, Emit::none())?,
        print_suffix(node, ctx, emit)?,
    ]))
}

pub(super) fn print_grouped_type(node: &Node, ctx: PrintContext, _emit: Emit) -> PrintResult {
    Ok(concat(vec![
        print_self_verbatim(node, ctx)?,
        print_slot(node, "type", ctx, Emit::none())?,
        print_slot(node, "rparen", ctx, Emit::none())?,
    ]))
}

pub(super) fn print_grouped_type_declarations(node: &Node, ctx: PrintContext, _emit: Emit) -> PrintResult {
    let declarations = print_list(node.nodes("declarations"), ctx, Emit::all())?;
    Ok(concat(vec![
        print_self_verbatim(node, ctx)?,
        join(text(" "), declarations),
        print_slot(node, "rparen", ctx, Emit::none())?,
    ]))
}

/// `name TYPE` inside `STRUCT<...>`. The name is absent for `STRUCT<INT64>`.
pub(super) fn print_type_declaration(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let name = match node.literal() {
        Some(name) => concat(vec![print_self(node, ctx, name.to_string())?, text(" ")]),
        None => nil(),
    };
    Ok(concat(vec![
        name,
        print_slot(node, "type", ctx, Emit::none())?,
        print_suffix(node, ctx, Emit { alias: false, ..emit })?,
    ]))
}

// ============================================================================
// Windows
// ============================================================================

pub(super) fn print_over_clause(node: &Node, ctx: PrintContext, _emit: Emit) -> PrintResult {
    Ok(concat(vec![
        print_self_keyword(node, ctx)?,
        text(" "),
        print_slot(node, "window", ctx, Emit::none())?,
    ]))
}

/// `(name PARTITION BY ... ORDER BY ... ROWS ...)`
pub(super) fn print_window_specification(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let mut parts = Vec::new();
    for slot in ["name", "partitionby", "orderby", "frame"] {
        if node.has(slot) {
            parts.push(print_slot(node, slot, ctx, Emit::none())?);
        }
    }
    Ok(concat(vec![
        print_enclosed(
            print_self_verbatim(node, ctx)?,
            join(line(), parts),
            print_slot(node, "rparen", ctx, Emit::none())?,
        ),
        print_suffix(node, ctx, emit)?,
    ]))
}

/// `ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW`, `RANGE 1 PRECEDING`
pub(super) fn print_window_frame_clause(node: &Node, ctx: PrintContext, _emit: Emit) -> PrintResult {
    let mut docs = vec![
        print_self_keyword(node, ctx)?,
        print_slot_after(text(" "), node, "between", ctx, Emit::none())?,
        text(" "),
        print_words(node, "start", ctx)?,
    ];
    if node.has("end") {
        docs.push(print_slot_after(text(" "), node, "and", ctx, Emit::none())?);
        docs.push(text(" "));
        docs.push(print_words(node, "end", ctx)?);
    }
    Ok(concat(docs))
}
