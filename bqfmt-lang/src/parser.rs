//! Recursive-descent parser turning a token stream into a list of statement nodes.
//!
//! The cursor always rests on the last token consumed: every `parse_xxx` function
//! starts with the first token of its construct as the current token and returns with
//! the last token of that construct as the current token. Comments never become the
//! current token. They are collected while moving the cursor and attached to the next
//! node built at the current position.

use std::path::PathBuf;

use crate::cst::{Node, NodeType};
use crate::lexer;
use crate::token::Token;
use crate::utils::error::{ReportableError, SimpleError};
use crate::utils::metadata::{LineIndex, Location};

pub mod error;

pub use error::{ErrorDetail, ParseError};

type ParseResult<T> = Result<T, ParseError>;

const TYPED_LITERAL_KEYWORDS: &[&str] = &[
    "DATE",
    "TIME",
    "DATETIME",
    "TIMESTAMP",
    "NUMERIC",
    "BIGNUMERIC",
    "DECIMAL",
    "BIGDECIMAL",
    "JSON",
];
const STRING_PREFIXES: &[&str] = &["B", "R", "BR", "RB"];
const SET_OPERATORS: &[&str] = &["UNION", "INTERSECT", "EXCEPT"];
const JOIN_STARTS: &[&str] = &["LEFT", "RIGHT", "CROSS", "INNER", "FULL", "JOIN", ","];
const SELECT_LIST_END: &[&str] = &[
    "FROM", "WHERE", "GROUP", "HAVING", "QUALIFY", "WINDOW", "ORDER", "LIMIT", "UNION",
    "INTERSECT", "EXCEPT", ";", ")",
];

fn is_word(token: &Token) -> bool {
    token
        .literal
        .starts_with(|c: char| c.is_alphanumeric() || c == '_' || c == '`')
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    leading_comment_indices: Vec<usize>,
    trailing_comment_indices: Vec<usize>,
}

type Checkpoint = (usize, Vec<usize>, Vec<usize>);

impl Parser {
    /// `tokens` must not contain an end-of-input sentinel; one is appended here.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        tokens.push(Token::eof());
        let mut position = 0;
        let mut leading_comment_indices = Vec::new();
        while tokens[position].is_comment() {
            leading_comment_indices.push(position);
            position += 1;
        }
        let trailing_comment_indices = Self::trailing_comment_indices_of(&tokens, position);
        Self {
            tokens,
            position,
            leading_comment_indices,
            trailing_comment_indices,
        }
    }

    fn trailing_comment_indices_of(tokens: &[Token], position: usize) -> Vec<usize> {
        let line = tokens[position].line;
        (position + 1..tokens.len())
            .take_while(|&i| tokens[i].is_comment() && tokens[i].line == line)
            .collect()
    }

    // ========================================================================
    // Cursor
    // ========================================================================

    fn get_offset_index(&self, offset: usize) -> ParseResult<usize> {
        let mut remaining = offset;
        let mut index = self.position;
        while remaining > 0 {
            index += 1;
            let token = self
                .tokens
                .get(index)
                .ok_or_else(|| ParseError::unexpected_eof("more tokens"))?;
            if !token.is_comment() {
                remaining -= 1;
            }
        }
        Ok(index)
    }

    /// The `offset`-th code token after the cursor. Comments are skipped.
    fn get_token(&self, offset: usize) -> ParseResult<&Token> {
        Ok(&self.tokens[self.get_offset_index(offset)?])
    }

    fn is_eof(&self, offset: usize) -> bool {
        self.get_offset_index(offset)
            .map_or(true, |i| i == self.tokens.len() - 1)
    }

    fn next_token(&mut self) -> ParseResult<()> {
        if self.is_eof(0) {
            return Err(ParseError::unexpected_eof("more tokens"));
        }
        let mut position = self
            .trailing_comment_indices
            .last()
            .copied()
            .unwrap_or(self.position)
            + 1;
        let mut leading = Vec::new();
        while self.tokens[position].is_comment() {
            leading.push(position);
            position += 1;
        }
        self.position = position;
        self.leading_comment_indices = leading;
        self.trailing_comment_indices = Self::trailing_comment_indices_of(&self.tokens, position);
        Ok(())
    }

    fn checkpoint(&self) -> Checkpoint {
        (
            self.position,
            self.leading_comment_indices.clone(),
            self.trailing_comment_indices.clone(),
        )
    }

    fn restore(&mut self, (position, leading, trailing): Checkpoint) {
        self.position = position;
        self.leading_comment_indices = leading;
        self.trailing_comment_indices = trailing;
    }

    /// Runs `f` and rewinds the cursor when it fails.
    fn try_parse(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<Node>) -> Option<Node> {
        let saved = self.checkpoint();
        match f(self) {
            Ok(node) => Some(node),
            Err(e) => {
                log::trace!("backtracking after: {e}");
                self.restore(saved);
                None
            }
        }
    }

    fn expect(&self, literal: &str) -> ParseResult<()> {
        let token = self.get_token(0)?;
        if token.is(literal) {
            Ok(())
        } else {
            Err(ParseError::unexpected_token(token, &format!("`{literal}`")))
        }
    }

    fn next_token_expect(&mut self, literal: &str) -> ParseResult<()> {
        self.next_token()?;
        self.expect(literal)
    }

    // ========================================================================
    // Node construction
    // ========================================================================

    fn construct_node(&self, node_type: NodeType) -> Node {
        let token = &self.tokens[self.position];
        let mut node = if token.is_eof() {
            Node::empty(node_type)
        } else {
            Node::new(token.clone(), node_type)
        };
        let comments = |indices: &[usize]| -> Vec<Node> {
            indices
                .iter()
                .map(|&i| Node::new(self.tokens[i].clone(), NodeType::Comment))
                .collect()
        };
        if !self.leading_comment_indices.is_empty() {
            node.push_node_vec("leading_comments", comments(&self.leading_comment_indices));
        }
        if !self.trailing_comment_indices.is_empty() {
            node.push_node_vec("trailing_comments", comments(&self.trailing_comment_indices));
        }
        node
    }

    fn construct_keyword(&self) -> Node {
        self.construct_node(NodeType::Keyword)
    }

    fn construct_symbol(&self) -> Node {
        self.construct_node(NodeType::Symbol)
    }

    fn construct_identifier(&self) -> ParseResult<Node> {
        let token = self.get_token(0)?;
        if is_word(token) {
            Ok(self.construct_node(NodeType::Identifier))
        } else {
            Err(ParseError::unexpected_token(token, "an identifier"))
        }
    }

    /// Moves to the next token, which must be `literal`, and builds a keyword for it.
    fn next_keyword(&mut self, literal: &str) -> ParseResult<Node> {
        self.next_token_expect(literal)?;
        Ok(self.construct_keyword())
    }

    fn push_semicolon(&mut self, node: &mut Node, semicolon: bool) -> ParseResult<()> {
        if semicolon && self.get_token(1)?.is(";") {
            self.next_token()?;
            node.push_node("semicolon", self.construct_symbol());
        }
        Ok(())
    }

    fn push_trailing_alias(&mut self, node: &mut Node) -> ParseResult<()> {
        if self.get_token(1)?.is("AS") {
            self.next_token()?;
            node.push_node("as", self.construct_keyword());
            self.next_token()?;
            node.push_node("alias", self.construct_identifier()?);
        } else if self.get_token(1)?.is_identifier() {
            self.next_token()?;
            node.push_node("alias", self.construct_identifier()?);
        }
        Ok(())
    }

    /// True when the tokens from `offset` on open a query, possibly inside parentheses.
    fn statement_follows(&self, mut offset: usize) -> bool {
        while self.get_token(offset).is_ok_and(|t| t.is("(")) {
            offset += 1;
        }
        self.get_token(offset)
            .is_ok_and(|t| t.in_(&["SELECT", "WITH"]))
    }

    fn string_follows(&self, offset: usize) -> bool {
        let Ok(token) = self.get_token(offset) else {
            return false;
        };
        token.is_string()
            || (token.in_(STRING_PREFIXES)
                && self.get_token(offset + 1).is_ok_and(|t| t.is_string()))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn get_precedence(&self, offset: usize) -> ParseResult<usize> {
        let token = self.get_token(offset)?;
        let precedence = match token.literal.to_uppercase().as_str() {
            "(" | "[" => 101,
            "." => 102,
            "*" | "/" | "||" => 103,
            "+" | "-" => 104,
            "<<" | ">>" => 105,
            "&" => 106,
            "^" => 107,
            "|" => 108,
            "=" | "<" | ">" | "<=" | ">=" | "!=" | "<>" | "LIKE" | "BETWEEN" | "IN" | "IS" => 109,
            "NOT" if self.get_token(offset + 1)?.in_(&["IN", "LIKE", "BETWEEN"]) => 109,
            "AND" => 111,
            "OR" => 112,
            "=>" => 200,
            _ => usize::MAX,
        };
        Ok(precedence)
    }

    /// Parses an expression whose operators all bind tighter than `precedence`.
    /// `alias` accepts `AS name` (or a bare name) after it and `order` accepts
    /// `ASC`/`DESC` and `NULLS FIRST`/`NULLS LAST`.
    pub fn parse_expr(&mut self, precedence: usize, alias: bool, order: bool) -> ParseResult<Node> {
        let mut left = self.parse_prefix()?;
        while self.get_precedence(1)? < precedence {
            self.next_token()?;
            let op = self.get_token(0)?.literal.to_uppercase();
            left = match op.as_str() {
                "(" => self.parse_calling_function(left)?,
                "[" => {
                    let mut node = self.construct_node(NodeType::AccessOperator);
                    node.push_node("left", left);
                    self.next_token()?;
                    node.push_node("right", self.parse_expr(usize::MAX, false, false)?);
                    self.next_token_expect("]")?;
                    node.push_node("rparen", self.construct_symbol());
                    node
                }
                "." => {
                    let mut node = self.construct_node(NodeType::DotOperator);
                    node.push_node("left", left);
                    self.next_token()?;
                    let right = if self.get_token(0)?.is("*") {
                        self.parse_expr(101, false, false)?
                    } else {
                        self.construct_identifier()?
                    };
                    node.push_node("right", right);
                    node
                }
                "IS" => self.parse_is_operator(left)?,
                "NOT" => {
                    let not = self.construct_keyword();
                    self.next_token()?;
                    self.parse_binary_operator(left, Some(not))?
                }
                _ => self.parse_binary_operator(left, None)?,
            };
        }
        if alias {
            self.push_trailing_alias(&mut left)?;
        }
        if order {
            if self.get_token(1)?.in_(&["ASC", "DESC"]) {
                self.next_token()?;
                left.push_node("order", self.construct_keyword());
            }
            if self.get_token(1)?.is("NULLS") {
                self.next_token()?;
                let nulls = self.construct_keyword();
                self.next_token()?;
                if !self.get_token(0)?.in_(&["FIRST", "LAST"]) {
                    let token = self.get_token(0)?;
                    return Err(ParseError::unexpected_token(token, "`FIRST` or `LAST`"));
                }
                left.push_node_vec("null_order", vec![nulls, self.construct_keyword()]);
            }
        }
        Ok(left)
    }

    fn parse_prefix(&mut self) -> ParseResult<Node> {
        let upper = self.get_token(0)?.literal.to_uppercase();
        let node = match upper.as_str() {
            "*" => self.parse_asterisk()?,
            "(" => self.parse_parenthesized_expr()?,
            "STRUCT" => {
                let type_ = self.parse_type()?;
                self.next_token_expect("(")?;
                let mut node = self.construct_node(NodeType::StructLiteral);
                node.push_node("type", type_);
                let exprs = if self.get_token(1)?.is(")") {
                    Vec::new()
                } else {
                    self.next_token()?;
                    self.parse_exprs(&[")"], true, false)?
                };
                node.push_node_vec("exprs", exprs);
                self.next_token_expect(")")?;
                node.push_node("rparen", self.construct_symbol());
                node
            }
            "[" => self.parse_array_literal(None)?,
            "ARRAY" if !self.get_token(1)?.is("(") => {
                let type_ = self.parse_type()?;
                self.next_token_expect("[")?;
                self.parse_array_literal(Some(type_))?
            }
            "-" | "+" | "~" => {
                let mut node = self.construct_node(NodeType::UnaryOperator);
                self.next_token()?;
                node.push_node("right", self.parse_expr(102, false, false)?);
                node
            }
            "NOT" => {
                let mut node = self.construct_node(NodeType::UnaryOperator);
                self.next_token()?;
                node.push_node("right", self.parse_expr(110, false, false)?);
                node
            }
            literal
                if (TYPED_LITERAL_KEYWORDS.contains(&literal) && self.string_follows(1))
                    || (STRING_PREFIXES.contains(&literal)
                        && self.get_token(1)?.is_string()) =>
            {
                let mut node = self.construct_node(NodeType::UnaryOperator);
                self.next_token()?;
                node.push_node("right", self.parse_expr(0, false, false)?);
                node
            }
            "INTERVAL" => {
                let mut node = self.construct_node(NodeType::IntervalLiteral);
                self.next_token()?;
                node.push_node("expr", self.parse_expr(usize::MAX, false, false)?);
                self.next_token()?;
                node.push_node("date_part", self.construct_identifier()?);
                if self.get_token(1)?.is("TO") {
                    self.next_token()?;
                    node.push_node("to", self.construct_keyword());
                    self.next_token()?;
                    node.push_node("to_date_part", self.construct_identifier()?);
                }
                node
            }
            "SELECT" | "WITH" => self.parse_select_statement(false, true)?,
            "CASE" => self.parse_case_expr()?,
            _ => {
                let node_type = self.classify_operand()?;
                self.construct_node(node_type)
            }
        };
        Ok(node)
    }

    fn classify_operand(&self) -> ParseResult<NodeType> {
        let token = self.get_token(0)?;
        let node_type = if token.is_string() {
            NodeType::StringLiteral
        } else if token.is_numeric() {
            NodeType::NumericLiteral
        } else if token.is_parameter() {
            NodeType::Parameter
        } else if token.is_boolean() {
            NodeType::BooleanLiteral
        } else if token.is_null() {
            NodeType::NullLiteral
        } else if token.is_identifier()
            || (is_word(token) && self.get_token(1)?.in_(&["(", "."]))
        {
            NodeType::Identifier
        } else if token.is("DEFAULT") {
            NodeType::Keyword
        } else {
            return Err(ParseError::unexpected_token(token, "an expression"));
        };
        Ok(node_type)
    }

    fn parse_asterisk(&mut self) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::Asterisk);
        for (keyword, alias) in [("EXCEPT", false), ("REPLACE", true)] {
            if self.get_token(1)?.is(keyword) && self.get_token(2)?.is("(") {
                self.next_token()?;
                let mut modifier = self.construct_node(NodeType::KeywordWithGroupedXXX);
                self.next_token()?;
                modifier.push_node("group", self.parse_grouped_exprs(alias)?);
                node.push_node(&keyword.to_lowercase(), modifier);
            }
        }
        Ok(node)
    }

    fn parse_parenthesized_expr(&mut self) -> ParseResult<Node> {
        if self.statement_follows(1) {
            if let Some(stmt) = self.try_parse(|p| p.parse_select_statement(false, false)) {
                return Ok(stmt);
            }
        }
        let mut node = self.construct_node(NodeType::GroupedExpr);
        if self.get_token(1)?.is(")") {
            node.node_type = NodeType::EmptyStruct;
            self.next_token()?;
            node.push_node("rparen", self.construct_symbol());
            return Ok(node);
        }
        self.next_token()?;
        let mut exprs = self.parse_exprs(&[")"], true, false)?;
        if exprs.len() == 1 && !exprs[0].has("comma") && !exprs[0].has("alias") {
            node.push_node("expr", exprs.remove(0));
        } else {
            node.node_type = NodeType::StructLiteral;
            node.push_node_vec("exprs", exprs);
        }
        self.next_token_expect(")")?;
        node.push_node("rparen", self.construct_symbol());
        Ok(node)
    }

    fn parse_array_literal(&mut self, type_: Option<Node>) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::ArrayLiteral);
        if let Some(type_) = type_ {
            node.push_node("type", type_);
        }
        let exprs = if self.get_token(1)?.is("]") {
            Vec::new()
        } else {
            self.next_token()?;
            self.parse_exprs(&["]"], false, false)?
        };
        node.push_node_vec("exprs", exprs);
        self.next_token_expect("]")?;
        node.push_node("rparen", self.construct_symbol());
        Ok(node)
    }

    fn parse_case_expr(&mut self) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::CaseExpr);
        if !self.get_token(1)?.is("WHEN") {
            self.next_token()?;
            node.push_node("expr", self.parse_expr(usize::MAX, false, false)?);
        }
        self.next_token()?;
        let mut arms = Vec::new();
        while self.get_token(0)?.is("WHEN") {
            let mut arm = self.construct_node(NodeType::CaseExprArm);
            self.next_token()?;
            arm.push_node("expr", self.parse_expr(usize::MAX, false, false)?);
            arm.push_node("then", self.next_keyword("THEN")?);
            self.next_token()?;
            arm.push_node("result", self.parse_expr(usize::MAX, false, false)?);
            arms.push(arm);
            self.next_token()?;
        }
        if self.get_token(0)?.is("ELSE") {
            let mut arm = self.construct_node(NodeType::CaseExprArm);
            self.next_token()?;
            arm.push_node("result", self.parse_expr(usize::MAX, false, false)?);
            arms.push(arm);
            self.next_token()?;
        }
        self.expect("END")?;
        node.push_node_vec("arms", arms);
        node.push_node("end", self.construct_keyword());
        Ok(node)
    }

    /// Comma separated expressions. A trailing comma is accepted when the token after
    /// it is one of `until`.
    fn parse_exprs(&mut self, until: &[&str], alias: bool, order: bool) -> ParseResult<Vec<Node>> {
        let mut exprs = Vec::new();
        loop {
            let mut expr = self.parse_expr(usize::MAX, alias, order)?;
            if !self.get_token(1)?.is(",") {
                exprs.push(expr);
                break;
            }
            self.next_token()?;
            expr.push_node("comma", self.construct_symbol());
            exprs.push(expr);
            if self.get_token(1)?.in_(until) {
                break;
            }
            self.next_token()?;
        }
        Ok(exprs)
    }

    fn parse_grouped_exprs(&mut self, alias: bool) -> ParseResult<Node> {
        self.expect("(")?;
        let mut node = self.construct_node(NodeType::GroupedExprs);
        let exprs = if self.get_token(1)?.is(")") {
            Vec::new()
        } else {
            self.next_token()?;
            self.parse_exprs(&[")"], alias, false)?
        };
        node.push_node_vec("exprs", exprs);
        self.next_token_expect(")")?;
        node.push_node("rparen", self.construct_symbol());
        Ok(node)
    }

    fn parse_binary_operator(&mut self, left: Node, not: Option<Node>) -> ParseResult<Node> {
        let op = self.get_token(0)?.literal.to_uppercase();
        let mut node = match op.as_str() {
            "IN" => {
                let mut node = self.construct_node(NodeType::InOperator);
                node.push_node("left", left);
                self.next_token()?;
                node.push_node("right", self.parse_in_operand()?);
                node
            }
            "BETWEEN" => {
                let mut node = self.construct_node(NodeType::BetweenOperator);
                node.push_node("left", left);
                self.next_token()?;
                node.push_node("right_min", self.parse_expr(109, false, false)?);
                node.push_node("and", self.next_keyword("AND")?);
                self.next_token()?;
                node.push_node("right_max", self.parse_expr(109, false, false)?);
                node
            }
            _ => {
                if not.is_some() && op != "LIKE" {
                    let token = self.get_token(0)?;
                    return Err(ParseError::unexpected_token(token, "`IN`, `LIKE` or `BETWEEN`"));
                }
                let precedence = self.get_precedence(0)?;
                let mut node = self.construct_node(NodeType::BinaryOperator);
                node.push_node("left", left);
                if self.get_token(1)?.in_(&["ALL", "ANY", "SOME"]) && self.get_token(2)?.is("(") {
                    self.next_token()?;
                    node.push_node("quantifier", self.construct_keyword());
                }
                self.next_token()?;
                node.push_node("right", self.parse_expr(precedence, false, false)?);
                node
            }
        };
        if let Some(not) = not {
            node.push_node("not", not);
        }
        Ok(node)
    }

    fn parse_is_operator(&mut self, left: Node) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::BinaryOperator);
        node.push_node("left", left);
        if self.get_token(1)?.is("NOT") {
            self.next_token()?;
            node.push_node("not", self.construct_keyword());
        }
        if self.get_token(1)?.is("DISTINCT") {
            node.node_type = NodeType::IsDistinctFromOperator;
            self.next_token()?;
            node.push_node("distinct", self.construct_keyword());
            node.push_node("from", self.next_keyword("FROM")?);
        }
        self.next_token()?;
        node.push_node("right", self.parse_expr(109, false, false)?);
        Ok(node)
    }

    fn parse_in_operand(&mut self) -> ParseResult<Node> {
        let token = self.get_token(0)?;
        if token.is("UNNEST") {
            let mut node = self.parse_expr(102, false, false)?;
            node.node_type = NodeType::CallingUnnest;
            return Ok(node);
        }
        if !token.is("(") {
            return Err(ParseError::unexpected_token(token, "`(` or `UNNEST`"));
        }
        if self.statement_follows(1) {
            if let Some(stmt) = self.try_parse(|p| p.parse_select_statement(false, false)) {
                return Ok(stmt);
            }
        }
        self.parse_grouped_exprs(false)
    }

    fn parse_calling_function(&mut self, func: Node) -> ParseResult<Node> {
        let func_name = match func.node_type {
            NodeType::Identifier => func.literal().unwrap_or_default().to_uppercase(),
            _ => String::new(),
        };
        let mut node = self.construct_node(NodeType::CallingFunction);
        node.push_node("func", func);
        if !self.get_token(1)?.is(")") {
            self.next_token()?;
            if self.get_token(0)?.is("DISTINCT") {
                node.push_node("distinct", self.construct_keyword());
                self.next_token()?;
            }
            let args = match func_name.as_str() {
                "CAST" | "SAFE_CAST" => vec![self.parse_cast_argument()?],
                "EXTRACT" => vec![self.parse_extract_argument()?],
                _ => self.parse_exprs(&[")"], false, false)?,
            };
            node.push_node_vec("args", args);
            if self.get_token(1)?.in_(&["IGNORE", "RESPECT"]) {
                self.next_token()?;
                let ignore = self.construct_keyword();
                let nulls = self.next_keyword("NULLS")?;
                node.push_node_vec("ignore_nulls", vec![ignore, nulls]);
            }
            if self.get_token(1)?.is("ORDER") {
                self.next_token()?;
                node.push_node("orderby", self.parse_xxxby_exprs()?);
            }
            if self.get_token(1)?.is("LIMIT") {
                self.next_token()?;
                node.push_node("limit", self.parse_keyword_with_expr()?);
            }
        }
        self.next_token_expect(")")?;
        node.push_node("rparen", self.construct_symbol());
        if self.get_token(1)?.is("OVER") {
            self.next_token()?;
            let mut over = self.construct_node(NodeType::OverClause);
            self.next_token()?;
            over.push_node("window", self.parse_window_expr()?);
            node.push_node("over", over);
        }
        Ok(node)
    }

    fn parse_cast_argument(&mut self) -> ParseResult<Node> {
        let cast_from = self.parse_expr(usize::MAX, false, false)?;
        self.next_token_expect("AS")?;
        let mut node = self.construct_node(NodeType::CastArgument);
        node.push_node("cast_from", cast_from);
        self.next_token()?;
        node.push_node("cast_to", self.parse_type()?);
        if self.get_token(1)?.is("FORMAT") {
            self.next_token()?;
            node.push_node("format", self.parse_keyword_with_expr()?);
        }
        Ok(node)
    }

    fn parse_extract_argument(&mut self) -> ParseResult<Node> {
        let datepart = self.parse_expr(usize::MAX, false, false)?;
        self.next_token_expect("FROM")?;
        let mut node = self.construct_node(NodeType::ExtractArgument);
        node.push_node("extract_datepart", datepart);
        self.next_token()?;
        node.push_node("extract_from", self.parse_expr(usize::MAX, false, false)?);
        if self.get_token(1)?.is("AT") {
            self.next_token()?;
            let at = self.construct_keyword();
            let time = self.next_keyword("TIME")?;
            let zone = self.next_keyword("ZONE")?;
            node.push_node_vec("at_time_zone", vec![at, time, zone]);
            self.next_token()?;
            node.push_node("time_zone", self.parse_expr(usize::MAX, false, false)?);
        }
        Ok(node)
    }

    fn parse_keyword_with_expr(&mut self) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::KeywordWithExpr);
        self.next_token()?;
        node.push_node("expr", self.parse_expr(usize::MAX, false, false)?);
        Ok(node)
    }

    /// `ORDER BY ...` and `PARTITION BY ...`. The current token is `ORDER` or `PARTITION`.
    fn parse_xxxby_exprs(&mut self) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::XXXByExprs);
        node.push_node("by", self.next_keyword("BY")?);
        self.next_token()?;
        node.push_node_vec("exprs", self.parse_exprs(&[], false, true)?);
        Ok(node)
    }

    // ========================================================================
    // Types
    // ========================================================================

    fn parse_type(&mut self) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::Type);
        let upper = self.get_token(0)?.literal.to_uppercase();
        match upper.as_str() {
            "ANY" => {
                node.push_node("type", self.next_keyword("TYPE")?);
                return Ok(node);
            }
            "ARRAY" | "RANGE" if self.get_token(1)?.is("<") => {
                self.next_token()?;
                let mut group = self.construct_node(NodeType::GroupedType);
                self.next_token()?;
                group.push_node("type", self.parse_type()?);
                self.next_token_expect(">")?;
                group.push_node("rparen", self.construct_symbol());
                node.push_node("type_declaration", group);
            }
            "STRUCT" if self.get_token(1)?.is("<") => {
                self.next_token()?;
                let mut group = self.construct_node(NodeType::GroupedTypeDeclarationOrConstraints);
                let mut declarations = Vec::new();
                while !self.get_token(1)?.is(">") {
                    self.next_token()?;
                    let mut declaration = if self.get_token(1)?.in_(&[",", ">", "<", "("]) {
                        Node::empty(NodeType::TypeDeclaration)
                    } else {
                        let declaration = self.construct_identifier()?;
                        self.next_token()?;
                        Node {
                            node_type: NodeType::TypeDeclaration,
                            ..declaration
                        }
                    };
                    declaration.push_node("type", self.parse_type()?);
                    let last = !self.get_token(1)?.is(",");
                    if !last {
                        self.next_token()?;
                        declaration.push_node("comma", self.construct_symbol());
                    }
                    declarations.push(declaration);
                    if last {
                        break;
                    }
                }
                group.push_node_vec("declarations", declarations);
                self.next_token_expect(">")?;
                group.push_node("rparen", self.construct_symbol());
                node.push_node("type_declaration", group);
            }
            "ARRAY" | "RANGE" | "STRUCT" => {}
            _ => {
                if !is_word(self.get_token(0)?) {
                    return Err(ParseError::unexpected_token(self.get_token(0)?, "a type"));
                }
                if self.get_token(1)?.is("(") {
                    self.next_token()?;
                    node.push_node("parameter", self.parse_grouped_exprs(false)?);
                }
            }
        }
        if self.get_token(1)?.is("COLLATE") {
            self.next_token()?;
            node.push_node("collate", self.parse_keyword_with_expr()?);
        }
        Ok(node)
    }

    // ========================================================================
    // FROM clause
    // ========================================================================

    fn parse_identifier(&mut self) -> ParseResult<Node> {
        let mut left = self.construct_identifier()?;
        while self.get_token(1)?.is(".") {
            self.next_token()?;
            let mut dot = self.construct_node(NodeType::DotOperator);
            dot.push_node("left", left);
            self.next_token()?;
            dot.push_node("right", self.construct_identifier()?);
            left = dot;
        }
        Ok(left)
    }

    /// A FROM item. With `root`, joins following the item are parsed as well.
    fn parse_table(&mut self, root: bool) -> ParseResult<Node> {
        let upper = self.get_token(0)?.literal.to_uppercase();
        let mut left = match upper.as_str() {
            "(" => {
                let stmt = if self.statement_follows(1) {
                    self.try_parse(|p| p.parse_select_statement(false, false))
                } else {
                    None
                };
                match stmt {
                    Some(stmt) => stmt,
                    None => {
                        let mut group = self.construct_node(NodeType::GroupedExpr);
                        self.next_token()?;
                        group.push_node("expr", self.parse_table(true)?);
                        self.next_token_expect(")")?;
                        group.push_node("rparen", self.construct_symbol());
                        group
                    }
                }
            }
            "UNNEST" => {
                let mut node = self.parse_expr(102, false, false)?;
                node.node_type = NodeType::CallingUnnest;
                node
            }
            _ => {
                let mut node = self.parse_identifier()?;
                if self.get_token(1)?.is("(") {
                    self.next_token()?;
                    node = self.parse_calling_function(node)?;
                    node.node_type = NodeType::CallingTableFunction;
                }
                node
            }
        };
        self.push_trailing_alias(&mut left)?;
        if self.get_token(1)?.is("FOR") && self.get_token(2)?.is("SYSTEM_TIME") {
            self.next_token()?;
            let mut clause = self.construct_node(NodeType::ForSystemTimeAsOfClause);
            self.next_token()?;
            let system_time = self.construct_keyword();
            let as_ = self.next_keyword("AS")?;
            let of = self.next_keyword("OF")?;
            clause.push_node_vec("system_time_as_of", vec![system_time, as_, of]);
            self.next_token()?;
            clause.push_node("expr", self.parse_expr(usize::MAX, false, false)?);
            left.push_node("for_system_time_as_of", clause);
        }
        if self.get_token(1)?.is("WITH") && self.get_token(2)?.is("OFFSET") {
            self.next_token()?;
            let mut clause = self.construct_node(NodeType::WithOffsetClause);
            clause.push_node("offset", self.next_keyword("OFFSET")?);
            self.push_trailing_alias(&mut clause)?;
            left.push_node("with_offset", clause);
        }
        if !root {
            return Ok(left);
        }
        while self.get_token(1)?.in_(JOIN_STARTS) {
            self.next_token()?;
            let mut join = if self.get_token(0)?.is(",") {
                self.construct_node(NodeType::JoinOperator)
            } else {
                let mut join_type = None;
                let mut outer = None;
                if !self.get_token(0)?.is("JOIN") {
                    join_type = Some(self.construct_keyword());
                    self.next_token()?;
                }
                if self.get_token(0)?.is("OUTER") {
                    outer = Some(self.construct_keyword());
                    self.next_token()?;
                }
                self.expect("JOIN")?;
                let mut join = self.construct_node(NodeType::JoinOperator);
                if let Some(join_type) = join_type {
                    join.push_node("join_type", join_type);
                }
                if let Some(outer) = outer {
                    join.push_node("outer", outer);
                }
                join
            };
            join.push_node("left", left);
            self.next_token()?;
            join.push_node("right", self.parse_table(false)?);
            if self.get_token(1)?.is("ON") {
                self.next_token()?;
                join.push_node("on", self.parse_keyword_with_expr()?);
            } else if self.get_token(1)?.is("USING") {
                self.next_token()?;
                let mut using = self.construct_node(NodeType::KeywordWithGroupedXXX);
                self.next_token()?;
                using.push_node("group", self.parse_grouped_exprs(false)?);
                join.push_node("using", using);
            }
            left = join;
        }
        Ok(left)
    }

    // ========================================================================
    // Query clauses
    // ========================================================================

    fn parse_with_clause(&mut self) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::WithClause);
        if self.get_token(1)?.is("RECURSIVE") {
            self.next_token()?;
            node.push_node("recursive", self.construct_keyword());
        }
        let mut queries = Vec::new();
        loop {
            self.next_token()?;
            let mut query = Node {
                node_type: NodeType::WithQuery,
                ..self.construct_identifier()?
            };
            query.push_node("as", self.next_keyword("AS")?);
            self.next_token_expect("(")?;
            query.push_node("stmt", self.parse_select_statement(false, false)?);
            let last = !self.get_token(1)?.is(",");
            if !last {
                self.next_token()?;
                query.push_node("comma", self.construct_symbol());
            }
            queries.push(query);
            if last {
                break;
            }
        }
        node.push_node_vec("queries", queries);
        Ok(node)
    }

    fn parse_groupby_exprs(&mut self) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::GroupByExprs);
        node.push_node("by", self.next_keyword("BY")?);
        if self.get_token(1)?.is("ALL") && !self.get_token(2)?.is("(") {
            self.next_token()?;
            node.push_node_vec("how", vec![self.construct_keyword()]);
            return Ok(node);
        }
        self.next_token()?;
        node.push_node_vec("exprs", self.parse_exprs(SELECT_LIST_END, false, false)?);
        Ok(node)
    }

    fn parse_window_clause(&mut self) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::WindowClause);
        let mut window_exprs = Vec::new();
        loop {
            self.next_token()?;
            let mut window_expr = Node {
                node_type: NodeType::WindowExpr,
                ..self.construct_identifier()?
            };
            window_expr.push_node("as", self.next_keyword("AS")?);
            self.next_token()?;
            window_expr.push_node("window", self.parse_window_expr()?);
            let last = !self.get_token(1)?.is(",");
            if !last {
                self.next_token()?;
                window_expr.push_node("comma", self.construct_symbol());
            }
            window_exprs.push(window_expr);
            if last {
                break;
            }
        }
        node.push_node_vec("window_exprs", window_exprs);
        Ok(node)
    }

    fn parse_window_expr(&mut self) -> ParseResult<Node> {
        if !self.get_token(0)?.is("(") {
            return self.construct_identifier();
        }
        let mut node = self.construct_node(NodeType::WindowSpecification);
        if self.get_token(1)?.is_identifier() {
            self.next_token()?;
            node.push_node("name", self.construct_identifier()?);
        }
        if self.get_token(1)?.is("PARTITION") {
            self.next_token()?;
            node.push_node("partitionby", self.parse_xxxby_exprs()?);
        }
        if self.get_token(1)?.is("ORDER") {
            self.next_token()?;
            node.push_node("orderby", self.parse_xxxby_exprs()?);
        }
        if self.get_token(1)?.in_(&["ROWS", "RANGE"]) {
            self.next_token()?;
            node.push_node("frame", self.parse_window_frame()?);
        }
        self.next_token_expect(")")?;
        node.push_node("rparen", self.construct_symbol());
        Ok(node)
    }

    fn parse_window_frame(&mut self) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::WindowFrameClause);
        if self.get_token(1)?.is("BETWEEN") {
            self.next_token()?;
            node.push_node("between", self.construct_keyword());
            self.next_token()?;
            node.push_node_vec("start", self.parse_frame_bound()?);
            node.push_node("and", self.next_keyword("AND")?);
            self.next_token()?;
            node.push_node_vec("end", self.parse_frame_bound()?);
        } else {
            self.next_token()?;
            node.push_node_vec("start", self.parse_frame_bound()?);
        }
        Ok(node)
    }

    /// `UNBOUNDED PRECEDING`, `CURRENT ROW`, `expr FOLLOWING` and the like.
    fn parse_frame_bound(&mut self) -> ParseResult<Vec<Node>> {
        let first = if self.get_token(0)?.in_(&["UNBOUNDED", "CURRENT"]) {
            self.construct_keyword()
        } else {
            self.parse_expr(usize::MAX, false, false)?
        };
        self.next_token()?;
        let token = self.get_token(0)?;
        if !token.in_(&["PRECEDING", "FOLLOWING", "ROW"]) {
            return Err(ParseError::unexpected_token(
                token,
                "`PRECEDING`, `FOLLOWING` or `ROW`",
            ));
        }
        Ok(vec![first, self.construct_keyword()])
    }

    fn parse_limit_clause(&mut self) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::LimitClause);
        self.next_token()?;
        node.push_node("expr", self.parse_expr(usize::MAX, false, false)?);
        if self.get_token(1)?.is("OFFSET") {
            self.next_token()?;
            node.push_node("offset", self.parse_keyword_with_expr()?);
        }
        Ok(node)
    }

    fn push_orderby_and_limit(&mut self, node: &mut Node) -> ParseResult<()> {
        if self.get_token(1)?.is("ORDER") {
            self.next_token()?;
            node.push_node("orderby", self.parse_xxxby_exprs()?);
        }
        if self.get_token(1)?.is("LIMIT") {
            self.next_token()?;
            node.push_node("limit", self.parse_limit_clause()?);
        }
        Ok(())
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// A query: `SELECT ...`, `WITH ... SELECT ...` or a parenthesized query. With
    /// `root`, set operators following the query are parsed as well.
    fn parse_select_statement(&mut self, semicolon: bool, root: bool) -> ParseResult<Node> {
        if self.get_token(0)?.is("WITH") {
            let with = self.parse_with_clause()?;
            self.next_token()?;
            let mut node = self.parse_select_statement(semicolon, root)?;
            node.push_node("with", with);
            return Ok(node);
        }
        let mut node = if self.get_token(0)?.is("(") {
            let mut node = self.construct_node(NodeType::GroupedStatement);
            self.next_token()?;
            node.push_node("stmt", self.parse_select_statement(false, true)?);
            self.next_token_expect(")")?;
            node.push_node("rparen", self.construct_symbol());
            if root {
                self.push_orderby_and_limit(&mut node)?;
            }
            node
        } else {
            self.expect("SELECT")?;
            let mut node = self.construct_node(NodeType::SelectStatement);
            if self.get_token(1)?.in_(&["DISTINCT", "ALL"]) {
                self.next_token()?;
                node.push_node("distinct_or_all", self.construct_keyword());
            }
            if self.get_token(1)?.is("AS") {
                self.next_token()?;
                let as_ = self.construct_keyword();
                self.next_token()?;
                let token = self.get_token(0)?;
                if !token.in_(&["STRUCT", "VALUE"]) {
                    return Err(ParseError::unexpected_token(token, "`STRUCT` or `VALUE`"));
                }
                node.push_node_vec("as_struct_or_value", vec![as_, self.construct_keyword()]);
            }
            self.next_token()?;
            node.push_node_vec("exprs", self.parse_exprs(SELECT_LIST_END, true, false)?);
            if self.get_token(1)?.is("FROM") {
                self.next_token()?;
                let mut from = self.construct_node(NodeType::KeywordWithExpr);
                self.next_token()?;
                from.push_node("expr", self.parse_table(true)?);
                node.push_node("from", from);
            }
            if self.get_token(1)?.is("WHERE") {
                self.next_token()?;
                node.push_node("where", self.parse_keyword_with_expr()?);
            }
            if self.get_token(1)?.is("GROUP") {
                self.next_token()?;
                node.push_node("groupby", self.parse_groupby_exprs()?);
            }
            if self.get_token(1)?.is("HAVING") {
                self.next_token()?;
                node.push_node("having", self.parse_keyword_with_expr()?);
            }
            if self.get_token(1)?.is("QUALIFY") {
                self.next_token()?;
                node.push_node("qualify", self.parse_keyword_with_expr()?);
            }
            if self.get_token(1)?.is("WINDOW") {
                self.next_token()?;
                node.push_node("window", self.parse_window_clause()?);
            }
            self.push_orderby_and_limit(&mut node)?;
            node
        };
        if root {
            while self.get_token(1)?.in_(SET_OPERATORS) {
                self.next_token()?;
                node = self.parse_set_operator(node)?;
            }
        }
        self.push_semicolon(&mut node, semicolon)?;
        Ok(node)
    }

    fn parse_set_operator(&mut self, left: Node) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::SetOperator);
        if self.get_token(1)?.in_(&["DISTINCT", "ALL"]) {
            self.next_token()?;
            node.push_node("distinct_or_all", self.construct_keyword());
        }
        node.push_node("left", left);
        self.next_token()?;
        node.push_node("right", self.parse_select_statement(false, false)?);
        Ok(node)
    }

    fn parse_statement(&mut self, semicolon: bool) -> ParseResult<Node> {
        let upper = self.get_token(0)?.literal.to_uppercase();
        match upper.as_str() {
            "SELECT" | "WITH" | "(" => self.parse_select_statement(semicolon, true),
            "INSERT" => self.parse_insert_statement(semicolon),
            "DELETE" => self.parse_delete_statement(semicolon),
            "TRUNCATE" => self.parse_truncate_statement(semicolon),
            "UPDATE" => self.parse_update_statement(semicolon),
            "DECLARE" => self.parse_declare_statement(semicolon),
            "SET" => self.parse_set_statement(semicolon),
            "IF" => self.parse_if_statement(semicolon),
            "BEGIN" if !self.get_token(1)?.in_(&["TRANSACTION", ";"]) && !self.is_eof(1) => {
                self.parse_begin_statement(semicolon)
            }
            "BEGIN" | "START" | "COMMIT" | "ROLLBACK" => self.parse_transaction_statement(semicolon),
            "BREAK" | "LEAVE" | "CONTINUE" | "ITERATE" => {
                let mut node = self.construct_node(NodeType::BreakContinueStatement);
                if self.get_token(1)?.is_identifier() {
                    self.next_token()?;
                    node.push_node("label", self.construct_identifier()?);
                }
                self.push_semicolon(&mut node, semicolon)?;
                Ok(node)
            }
            "RETURN" => {
                let mut node = self.construct_node(NodeType::SingleTokenStatement);
                self.push_semicolon(&mut node, semicolon)?;
                Ok(node)
            }
            "CALL" => {
                let mut node = self.construct_node(NodeType::CallStatement);
                self.next_token()?;
                node.push_node("procedure", self.parse_expr(usize::MAX, false, false)?);
                self.push_semicolon(&mut node, semicolon)?;
                Ok(node)
            }
            "RAISE" => {
                let mut node = self.construct_node(NodeType::RaiseStatement);
                if self.get_token(1)?.is("USING") {
                    self.next_token()?;
                    node.push_node("using", self.parse_keyword_with_expr()?);
                }
                self.push_semicolon(&mut node, semicolon)?;
                Ok(node)
            }
            _ => {
                let token = self.get_token(0)?;
                Err(ParseError::unsupported(
                    token,
                    &format!("statement starting with `{}`", token.literal),
                ))
            }
        }
    }

    fn parse_insert_statement(&mut self, semicolon: bool) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::InsertStatement);
        if self.get_token(1)?.is("INTO") {
            self.next_token()?;
            node.push_node("into", self.construct_keyword());
        }
        if !self.get_token(1)?.in_(&["(", "VALUES", "SELECT", "WITH"]) {
            self.next_token()?;
            node.push_node("target_name", self.parse_identifier()?);
        }
        if self.get_token(1)?.is("(") && !self.statement_follows(1) {
            self.next_token()?;
            node.push_node("columns", self.parse_grouped_exprs(false)?);
        }
        self.next_token()?;
        let input = if self.get_token(0)?.is("VALUES") {
            let mut values = self.construct_node(NodeType::KeywordWithExprs);
            self.next_token()?;
            values.push_node_vec("exprs", self.parse_exprs(&[], false, false)?);
            values
        } else {
            self.parse_select_statement(false, true)?
        };
        node.push_node("input", input);
        self.push_semicolon(&mut node, semicolon)?;
        Ok(node)
    }

    fn parse_delete_statement(&mut self, semicolon: bool) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::DeleteStatement);
        if self.get_token(1)?.is("FROM") {
            self.next_token()?;
            node.push_node("from", self.construct_keyword());
        }
        self.next_token()?;
        let mut table_name = self.parse_identifier()?;
        self.push_trailing_alias(&mut table_name)?;
        node.push_node("table_name", table_name);
        if self.get_token(1)?.is("WHERE") {
            self.next_token()?;
            node.push_node("where", self.parse_keyword_with_expr()?);
        }
        self.push_semicolon(&mut node, semicolon)?;
        Ok(node)
    }

    fn parse_truncate_statement(&mut self, semicolon: bool) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::TruncateStatement);
        node.push_node("table", self.next_keyword("TABLE")?);
        self.next_token()?;
        node.push_node("table_name", self.parse_identifier()?);
        self.push_semicolon(&mut node, semicolon)?;
        Ok(node)
    }

    fn parse_update_statement(&mut self, semicolon: bool) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::UpdateStatement);
        self.next_token()?;
        node.push_node("table_name", self.parse_table(false)?);
        self.next_token_expect("SET")?;
        let mut set = self.construct_node(NodeType::KeywordWithExprs);
        self.next_token()?;
        set.push_node_vec("exprs", self.parse_exprs(&[], false, false)?);
        node.push_node("set", set);
        if self.get_token(1)?.is("FROM") {
            self.next_token()?;
            let mut from = self.construct_node(NodeType::KeywordWithExpr);
            self.next_token()?;
            from.push_node("expr", self.parse_table(true)?);
            node.push_node("from", from);
        }
        if self.get_token(1)?.is("WHERE") {
            self.next_token()?;
            node.push_node("where", self.parse_keyword_with_expr()?);
        }
        self.push_semicolon(&mut node, semicolon)?;
        Ok(node)
    }

    fn parse_declare_statement(&mut self, semicolon: bool) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::DeclareStatement);
        let mut idents = Vec::new();
        loop {
            self.next_token()?;
            let mut ident = self.construct_identifier()?;
            let last = !self.get_token(1)?.is(",");
            if !last {
                self.next_token()?;
                ident.push_node("comma", self.construct_symbol());
            }
            idents.push(ident);
            if last {
                break;
            }
        }
        node.push_node_vec("idents", idents);
        if !self.get_token(1)?.in_(&["DEFAULT", ";"]) && !self.is_eof(1) {
            self.next_token()?;
            node.push_node("variable_type", self.parse_type()?);
        }
        if self.get_token(1)?.is("DEFAULT") {
            self.next_token()?;
            node.push_node("default", self.parse_keyword_with_expr()?);
        }
        self.push_semicolon(&mut node, semicolon)?;
        Ok(node)
    }

    fn parse_set_statement(&mut self, semicolon: bool) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::SetStatement);
        self.next_token()?;
        node.push_node("expr", self.parse_expr(usize::MAX, false, false)?);
        self.push_semicolon(&mut node, semicolon)?;
        Ok(node)
    }

    /// A keyword followed by statements up to (not including) one of `until`.
    fn parse_keyword_with_statements(&mut self, until: &[&str]) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::KeywordWithStatements);
        let mut stmts = Vec::new();
        while !self.get_token(1)?.in_(until) {
            if self.is_eof(1) {
                return Err(ParseError::unexpected_eof(&format!("`{}`", until.join("`, `"))));
            }
            self.next_token()?;
            stmts.push(self.parse_statement(true)?);
        }
        node.push_node_vec("stmts", stmts);
        Ok(node)
    }

    fn parse_if_statement(&mut self, semicolon: bool) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::IfStatement);
        self.next_token()?;
        node.push_node("condition", self.parse_expr(usize::MAX, false, false)?);
        self.next_token_expect("THEN")?;
        node.push_node("then", self.parse_keyword_with_statements(&["ELSEIF", "ELSE", "END"])?);
        let mut elseifs = Vec::new();
        while self.get_token(1)?.is("ELSEIF") {
            self.next_token()?;
            let mut elseif = self.construct_node(NodeType::ElseIfClause);
            self.next_token()?;
            elseif.push_node("condition", self.parse_expr(usize::MAX, false, false)?);
            self.next_token_expect("THEN")?;
            elseif.push_node("then", self.parse_keyword_with_statements(&["ELSEIF", "ELSE", "END"])?);
            elseifs.push(elseif);
        }
        if !elseifs.is_empty() {
            node.push_node_vec("elseifs", elseifs);
        }
        if self.get_token(1)?.is("ELSE") {
            self.next_token()?;
            node.push_node("else", self.parse_keyword_with_statements(&["END"])?);
        }
        let end = self.next_keyword("END")?;
        let if_ = self.next_keyword("IF")?;
        node.push_node_vec("end_if", vec![end, if_]);
        self.push_semicolon(&mut node, semicolon)?;
        Ok(node)
    }

    fn parse_begin_statement(&mut self, semicolon: bool) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::BeginStatement);
        let mut stmts = Vec::new();
        while !self.get_token(1)?.in_(&["END", "EXCEPTION"]) {
            if self.is_eof(1) {
                return Err(ParseError::unexpected_eof("`END`"));
            }
            self.next_token()?;
            stmts.push(self.parse_statement(true)?);
        }
        node.push_node_vec("stmts", stmts);
        if self.get_token(1)?.is("EXCEPTION") {
            self.next_token()?;
            let exception = self.construct_keyword();
            let when = self.next_keyword("WHEN")?;
            let error = self.next_keyword("ERROR")?;
            node.push_node_vec("exception_when_error", vec![exception, when, error]);
            self.next_token_expect("THEN")?;
            node.push_node("then", self.parse_keyword_with_statements(&["END"])?);
        }
        node.push_node("end", self.next_keyword("END")?);
        self.push_semicolon(&mut node, semicolon)?;
        Ok(node)
    }

    fn parse_transaction_statement(&mut self, semicolon: bool) -> ParseResult<Node> {
        let mut node = self.construct_node(NodeType::TransactionStatement);
        if self.get_token(1)?.is("TRANSACTION") {
            self.next_token()?;
            node.push_node("transaction", self.construct_keyword());
        }
        self.push_semicolon(&mut node, semicolon)?;
        Ok(node)
    }

    /// Parses statements up to the end of input. The last node is always an `EOF`
    /// node holding the comments after the last statement.
    pub fn parse_code(&mut self) -> ParseResult<Vec<Node>> {
        let mut code = Vec::new();
        while !self.is_eof(0) {
            let stmt = self.parse_statement(true)?;
            log::trace!("parsed {}", stmt.node_type);
            code.push(stmt);
            self.next_token()?;
        }
        code.push(self.construct_node(NodeType::Eof));
        Ok(code)
    }
}

/// Tokenizes and parses `src` into statement nodes followed by an `EOF` node.
pub fn parse(
    src: &str,
    path: &Option<PathBuf>,
) -> Result<Vec<Node>, Vec<Box<dyn ReportableError>>> {
    let path = path.clone().unwrap_or_default();
    let tokens = lexer::tokenize(src).map_err(|errs| {
        errs.into_iter()
            .map(|e| {
                Box::new(SimpleError {
                    message: e.message,
                    span: Location::new(e.span, path.clone()),
                }) as Box<dyn ReportableError>
            })
            .collect::<Vec<_>>()
    })?;
    log::debug!("{} tokens", tokens.len());
    Parser::new(tokens).parse_code().map_err(|e| {
        let index = LineIndex::new(src);
        vec![Box::new(e.into_reportable(&index, path)) as Box<dyn ReportableError>]
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse_code(src: &str) -> Result<Vec<Node>, ParseError> {
        let tokens = lexer::tokenize(src).expect("tokenize failed");
        Parser::new(tokens).parse_code()
    }

    fn parse_ok(src: &str) -> Vec<Node> {
        parse_code(src).expect("parse failed")
    }

    fn first_expr(src: &str) -> Node {
        let stmts = parse_ok(src);
        stmts[0].nodes("exprs")[0].clone()
    }

    fn child<'a>(node: &'a Node, path: &[&str]) -> &'a Node {
        path.iter().fold(node, |n, key| {
            n.node(key)
                .unwrap_or_else(|| panic!("missing `{key}` in\n{n}"))
        })
    }

    #[test]
    fn test_select_shape() {
        let stmts = parse_ok("select a as x, b from t where a = 1;");
        assert_eq!(stmts.len(), 2);
        let select = &stmts[0];
        assert_eq!(select.node_type, NodeType::SelectStatement);
        let exprs = select.nodes("exprs");
        assert_eq!(exprs.len(), 2);
        assert_eq!(exprs[0].literal(), Some("a"));
        assert_eq!(child(&exprs[0], &["alias"]).literal(), Some("x"));
        assert!(exprs[0].has("comma"));
        assert!(!exprs[1].has("comma"));
        assert_eq!(child(select, &["from", "expr"]).literal(), Some("t"));
        let cond = child(select, &["where", "expr"]);
        assert_eq!(cond.node_type, NodeType::BinaryOperator);
        assert_eq!(child(select, &["semicolon"]).literal(), Some(";"));
        assert_eq!(stmts[1].node_type, NodeType::Eof);
        assert!(stmts[1].token.is_none());
    }

    #[test]
    fn test_set_operator() {
        let stmts = parse_ok("SELECT 1 UNION ALL SELECT 2 EXCEPT DISTINCT SELECT 3;");
        let top = &stmts[0];
        assert_eq!(top.node_type, NodeType::SetOperator);
        assert_eq!(top.literal(), Some("EXCEPT"));
        assert!(top.has("semicolon"));
        let left = child(top, &["left"]);
        assert_eq!(left.node_type, NodeType::SetOperator);
        assert_eq!(child(left, &["distinct_or_all"]).literal(), Some("ALL"));
        assert_eq!(child(top, &["right"]).node_type, NodeType::SelectStatement);
    }

    #[test]
    fn test_comment_attachment() {
        let stmts = parse_ok("-- head\nSELECT 1 -- one\n, 2 /* two */\n;\n-- tail\n");
        let select = &stmts[0];
        assert_eq!(select.leading_comments()[0].literal(), Some("-- head"));
        let exprs = select.nodes("exprs");
        assert_eq!(exprs[0].trailing_comments()[0].literal(), Some("-- one"));
        assert_eq!(exprs[1].trailing_comments()[0].literal(), Some("/* two */"));
        let eof = &stmts[1];
        assert_eq!(eof.leading_comments()[0].literal(), Some("-- tail"));

        let only_comment = parse_ok("# nothing else");
        assert_eq!(only_comment.len(), 1);
        assert_eq!(only_comment[0].leading_comments().len(), 1);
        assert_eq!(parse_ok("").len(), 1);
    }

    #[test]
    fn test_precedence() {
        let expr = first_expr("SELECT 1 + 2 * 3");
        assert_eq!(expr.literal(), Some("+"));
        assert_eq!(child(&expr, &["right"]).literal(), Some("*"));

        let expr = first_expr("SELECT a AND b OR c");
        assert_eq!(expr.literal(), Some("OR"));
        assert_eq!(child(&expr, &["left"]).literal(), Some("AND"));

        let expr = first_expr("SELECT x BETWEEN 1 AND 2 AND y");
        assert_eq!(expr.literal(), Some("AND"));
        assert_eq!(child(&expr, &["left"]).node_type, NodeType::BetweenOperator);

        let expr = first_expr("SELECT NOT a = b");
        assert_eq!(expr.node_type, NodeType::UnaryOperator);
        assert_eq!(child(&expr, &["right"]).literal(), Some("="));

        let expr = first_expr("SELECT a NOT IN (1, 2)");
        assert_eq!(expr.node_type, NodeType::InOperator);
        assert!(expr.has("not"));
        assert_eq!(child(&expr, &["right"]).nodes("exprs").len(), 2);

        let expr = first_expr("SELECT a IS NOT DISTINCT FROM b");
        assert_eq!(expr.node_type, NodeType::IsDistinctFromOperator);
        assert!(expr.has("not"));
    }

    #[test]
    fn test_function_calls() {
        let expr = first_expr("SELECT CAST(x AS INT64)");
        assert_eq!(expr.node_type, NodeType::CallingFunction);
        let arg = &expr.nodes("args")[0];
        assert_eq!(arg.node_type, NodeType::CastArgument);
        assert_eq!(child(arg, &["cast_to"]).literal(), Some("INT64"));

        let expr = first_expr("SELECT COUNT(DISTINCT x)");
        assert!(expr.has("distinct"));

        let expr = first_expr("SELECT ROW_NUMBER() OVER (PARTITION BY a ORDER BY b DESC) rn");
        assert_eq!(child(&expr, &["alias"]).literal(), Some("rn"));
        let spec = child(&expr, &["over", "window"]);
        assert_eq!(spec.node_type, NodeType::WindowSpecification);
        let orderby = child(spec, &["orderby"]);
        assert_eq!(child(&orderby.nodes("exprs")[0], &["order"]).literal(), Some("DESC"));

        let expr = first_expr("SELECT SAFE.DIVIDE(1, 2)");
        assert_eq!(child(&expr, &["func"]).node_type, NodeType::DotOperator);

        let expr = first_expr("SELECT STRUCT<a INT64, STRING>(1, 'x')");
        assert_eq!(expr.node_type, NodeType::StructLiteral);
        let decls = child(&expr, &["type", "type_declaration"]).nodes("declarations");
        assert_eq!(decls[0].literal(), Some("a"));
        assert!(decls[1].token.is_none());

        let expr = first_expr("SELECT ARRAY<STRUCT<x INT64>>[]");
        assert_eq!(expr.node_type, NodeType::ArrayLiteral);
    }

    #[test]
    fn test_from_clause() {
        let stmts = parse_ok(
            "SELECT * FROM a LEFT OUTER JOIN b USING (id), UNNEST(arr) AS e WITH OFFSET o",
        );
        let table = child(&stmts[0], &["from", "expr"]);
        assert_eq!(table.node_type, NodeType::JoinOperator);
        assert_eq!(table.literal(), Some(","));
        let unnest = child(table, &["right"]);
        assert_eq!(unnest.node_type, NodeType::CallingUnnest);
        assert_eq!(child(unnest, &["with_offset", "alias"]).literal(), Some("o"));
        let left_join = child(table, &["left"]);
        assert_eq!(child(left_join, &["join_type"]).literal(), Some("LEFT"));
        assert!(left_join.has("outer"));
        assert!(left_join.has("using"));

        let stmts = parse_ok("SELECT 1 FROM (SELECT 2) AS sub");
        let sub = child(&stmts[0], &["from", "expr"]);
        assert_eq!(sub.node_type, NodeType::GroupedStatement);
        assert_eq!(child(sub, &["alias"]).literal(), Some("sub"));
    }

    #[test]
    fn test_with_clause() {
        let stmts = parse_ok("WITH a AS (SELECT 1), b AS (SELECT 2) SELECT * FROM a;");
        let select = &stmts[0];
        assert_eq!(select.node_type, NodeType::SelectStatement);
        let queries = child(select, &["with"]).nodes("queries");
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].literal(), Some("a"));
        assert_eq!(child(&queries[0], &["stmt"]).node_type, NodeType::GroupedStatement);
        assert!(select.has("semicolon"));
    }

    #[test]
    fn test_script_statements() {
        let stmts = parse_ok(
            "DECLARE x, y INT64 DEFAULT 1;\n\
             SET x = 2;\n\
             IF x > 1 THEN SELECT 1; ELSEIF x = 0 THEN SELECT 2; ELSE RETURN; END IF;\n\
             BEGIN SELECT 1; EXCEPTION WHEN ERROR THEN SELECT 2; END;\n\
             BEGIN TRANSACTION;\n\
             COMMIT;\n\
             DELETE FROM t WHERE true;\n\
             INSERT INTO t (a) VALUES (1), (2);\n\
             UPDATE t SET a = 1 WHERE b;",
        );
        let kinds: Vec<_> = stmts.iter().map(|s| s.node_type.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeType::DeclareStatement,
                NodeType::SetStatement,
                NodeType::IfStatement,
                NodeType::BeginStatement,
                NodeType::TransactionStatement,
                NodeType::TransactionStatement,
                NodeType::DeleteStatement,
                NodeType::InsertStatement,
                NodeType::UpdateStatement,
                NodeType::Eof,
            ]
        );
        assert_eq!(stmts[0].nodes("idents").len(), 2);
        assert_eq!(stmts[2].nodes("elseifs").len(), 1);
        assert_eq!(child(&stmts[2], &["else"]).nodes("stmts").len(), 1);
        assert!(stmts[3].has("exception_when_error"));
        assert_eq!(child(&stmts[7], &["input"]).nodes("exprs").len(), 2);
    }

    #[test]
    fn test_errors() {
        let err = parse_code("SELECT (1").expect_err("should fail");
        assert!(matches!(err.detail, ErrorDetail::UnexpectedEof { .. }));

        let err = parse_code("CREATE TABLE t (x INT64)").expect_err("should fail");
        assert!(matches!(err.detail, ErrorDetail::Unsupported { .. }));
        assert_eq!((err.line, err.column), (1, 1));

        let err = parse_code("SELECT 1 FROM )").expect_err("should fail");
        assert_eq!(
            err.detail,
            ErrorDetail::UnexpectedToken {
                expected: "an identifier".to_string(),
                found: ")".to_string()
            }
        );
    }

    #[test]
    fn test_reportable_errors() {
        let errs = parse("SELECT 1;\nSELECT )", &None).expect_err("should fail");
        assert_eq!(errs.len(), 1);
        let labels = errs[0].get_labels();
        assert_eq!(labels[0].0.span, 17..18);

        let errs = parse("SELECT 'unterminated", &None).expect_err("should fail");
        assert!(!errs.is_empty());
    }
}
