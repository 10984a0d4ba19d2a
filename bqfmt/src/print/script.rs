use bqfmt_lang::Node;

use super::{
    Emit, PrintContext, PrintResult, finish_statement, print_list, print_node,
    print_self_keyword, print_slot, print_slot_after, print_statement_block,
    print_statement_end, print_words,
};
use crate::doc::{Doc, concat, group, hardline, join, line, text};

/// Statements ending with a keyword on its own line (`END IF`, `END`). The semicolon
/// follows that keyword directly.
fn finish_block(node: &Node, ctx: PrintContext, mut docs: Vec<Doc>) -> PrintResult {
    docs.push(print_slot(node, "semicolon", ctx, Emit::none())?);
    docs.push(print_statement_end(ctx));
    Ok(concat(docs))
}

// ============================================================================
// DML
// ============================================================================

/// `INSERT INTO t (a, b) VALUES ...` or `INSERT t SELECT ...`
pub(super) fn print_insert_statement(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let docs = vec![
        print_self_keyword(node, ctx)?,
        print_slot_after(text(" "), node, "into", ctx, Emit::none())?,
        print_slot_after(text(" "), node, "target_name", ctx, Emit::none())?,
        print_slot_after(text(" "), node, "columns", ctx, Emit::none())?,
        print_slot_after(line(), node, "input", ctx, Emit::none())?,
    ];
    finish_statement(node, ctx, emit, docs)
}

pub(super) fn print_delete_statement(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let docs = vec![
        print_self_keyword(node, ctx)?,
        print_slot_after(text(" "), node, "from", ctx, Emit::none())?,
        print_slot_after(text(" "), node, "table_name", ctx, Emit::all())?,
        print_slot_after(line(), node, "where", ctx, Emit::none())?,
    ];
    finish_statement(node, ctx, emit, docs)
}

pub(super) fn print_truncate_statement(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let docs = vec![
        print_self_keyword(node, ctx)?,
        print_slot_after(text(" "), node, "table", ctx, Emit::none())?,
        print_slot_after(text(" "), node, "table_name", ctx, Emit::none())?,
    ];
    finish_statement(node, ctx, emit, docs)
}

/// `UPDATE t SET ... FROM ... WHERE ...`, one clause per line when it does not fit.
pub(super) fn print_update_statement(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let docs = vec![
        print_self_keyword(node, ctx)?,
        print_slot_after(text(" "), node, "table_name", ctx, Emit::all())?,
        print_slot_after(line(), node, "set", ctx, Emit::none())?,
        print_slot_after(line(), node, "from", ctx, Emit::none())?,
        print_slot_after(line(), node, "where", ctx, Emit::none())?,
    ];
    finish_statement(node, ctx, emit, docs)
}

// ============================================================================
// Scripting
// ============================================================================

/// `DECLARE a, b INT64 DEFAULT 0`
pub(super) fn print_declare_statement(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let idents = print_list(node.nodes("idents"), ctx, Emit::all())?;
    let docs = vec![
        print_self_keyword(node, ctx)?,
        text(" "),
        join(text(" "), idents),
        print_slot_after(text(" "), node, "variable_type", ctx, Emit::none())?,
        print_slot_after(text(" "), node, "default", ctx, Emit::none())?,
    ];
    finish_statement(node, ctx, emit, docs)
}

pub(super) fn print_set_statement(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let docs = vec![
        print_self_keyword(node, ctx)?,
        print_slot_after(text(" "), node, "expr", ctx, Emit::none())?,
    ];
    finish_statement(node, ctx, emit, docs)
}

/// `THEN`, `ELSE` and the like followed by an indented statement block.
pub(super) fn print_keyword_with_statements(node: &Node, ctx: PrintContext, _emit: Emit) -> PrintResult {
    Ok(concat(vec![
        print_self_keyword(node, ctx)?,
        print_statement_block(node.nodes("stmts"), ctx)?,
    ]))
}

fn print_condition(node: &Node, ctx: PrintContext) -> PrintResult {
    Ok(concat(vec![
        print_self_keyword(node, ctx)?,
        text(" "),
        group(print_slot(node, "condition", ctx, Emit::none())?),
        print_slot_after(text(" "), node, "then", ctx, Emit::none())?,
    ]))
}

/// `IF cond THEN ... ELSEIF cond THEN ... ELSE ... END IF;`
pub(super) fn print_if_statement(node: &Node, ctx: PrintContext, _emit: Emit) -> PrintResult {
    let mut docs = vec![print_condition(node, ctx)?];
    for elseif in print_list(node.nodes("elseifs"), ctx, Emit::none())? {
        docs.push(hardline());
        docs.push(elseif);
    }
    docs.push(print_slot_after(hardline(), node, "else", ctx, Emit::none())?);
    docs.push(hardline());
    docs.push(print_words(node, "end_if", ctx)?);
    finish_block(node, ctx, docs)
}

pub(super) fn print_else_if_clause(node: &Node, ctx: PrintContext, _emit: Emit) -> PrintResult {
    print_condition(node, ctx)
}

/// `BEGIN ... [EXCEPTION WHEN ERROR THEN ...] END;`
pub(super) fn print_begin_statement(node: &Node, ctx: PrintContext, _emit: Emit) -> PrintResult {
    let mut docs = vec![
        print_self_keyword(node, ctx)?,
        print_statement_block(node.nodes("stmts"), ctx)?,
    ];
    if node.has("exception_when_error") {
        docs.push(hardline());
        docs.push(print_words(node, "exception_when_error", ctx)?);
        docs.push(print_slot_after(text(" "), node, "then", ctx, Emit::none())?);
    }
    docs.push(hardline());
    docs.push(print_slot(node, "end", ctx, Emit::none())?);
    finish_block(node, ctx, docs)
}

/// Statements made of a keyword and at most one operand: `COMMIT TRANSACTION`,
/// `BREAK label`, `RETURN`, `CALL proc()`, `RAISE USING MESSAGE = '...'`.
pub(super) fn print_simple_statement(node: &Node, ctx: PrintContext, emit: Emit) -> PrintResult {
    let mut docs = vec![print_self_keyword(node, ctx)?];
    for slot in ["transaction", "label", "procedure", "using"] {
        if let Some(operand) = node.node(slot) {
            docs.push(text(" "));
            docs.push(print_node(operand, ctx.nested(), Emit::none())?);
        }
    }
    finish_statement(node, ctx, emit, docs)
}
