//! Concrete syntax tree.
//!
//! A [`Node`] owns an optional [`Token`] and a map of named child slots. A slot holds
//! either one node or an ordered list of nodes, so fixed grammar positions (`left`,
//! `right`, `semicolon`) and repeated ones (`exprs`, `arms`, `queries`) share one shape.
//! Comments are attached to the node of the token they precede (`leading_comments`)
//! or follow on the same line (`trailing_comments`).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::token::Token;

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub enum ContentType {
    Node(Node),
    NodeVec(Vec<Node>),
}

macro_rules! node_types {
    ($($variant:ident $(= $name:literal)?),* $(,)?) => {
        /// Kind of a [`Node`]. Kinds outside the known set are kept in `Other` so that a
        /// tree deserialized from JSON can still be inspected and reported on.
        #[derive(PartialEq, Eq, Hash, Debug, Clone, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum NodeType {
            $($variant,)*
            Other(String),
        }

        impl NodeType {
            pub fn as_str(&self) -> &str {
                match self {
                    $(NodeType::$variant => node_types!(@name $variant $($name)?),)*
                    NodeType::Other(name) => name.as_str(),
                }
            }
        }

        impl From<&str> for NodeType {
            fn from(name: &str) -> Self {
                match name {
                    $(n if n == node_types!(@name $variant $($name)?) => NodeType::$variant,)*
                    other => NodeType::Other(other.to_string()),
                }
            }
        }
    };
    (@name $variant:ident $name:literal) => { $name };
    (@name $variant:ident) => { stringify!($variant) };
}

node_types! {
    AccessOperator,
    ArrayLiteral,
    Asterisk,
    BeginStatement,
    BetweenOperator,
    BinaryOperator,
    BooleanLiteral,
    BreakContinueStatement,
    CallStatement,
    CallingFunction,
    CallingTableFunction,
    CallingUnnest,
    CaseExpr,
    CaseExprArm,
    CastArgument,
    Comment,
    DeclareStatement,
    DeleteStatement,
    DotOperator,
    ElseIfClause,
    EmptyStruct,
    Eof = "EOF",
    ExtractArgument,
    ForSystemTimeAsOfClause,
    GroupByExprs,
    GroupedExpr,
    GroupedExprs,
    GroupedStatement,
    GroupedType,
    GroupedTypeDeclarationOrConstraints,
    Identifier,
    IfStatement,
    InOperator,
    InsertStatement,
    IntervalLiteral,
    IsDistinctFromOperator,
    JoinOperator,
    Keyword,
    KeywordWithExpr,
    KeywordWithExprs,
    KeywordWithGroupedXXX,
    KeywordWithStatements,
    LimitClause,
    NullLiteral,
    NumericLiteral,
    OverClause,
    Parameter,
    RaiseStatement,
    SelectStatement,
    SetOperator,
    SetStatement,
    SingleTokenStatement,
    StringLiteral,
    StructLiteral,
    Symbol,
    TransactionStatement,
    TruncateStatement,
    Type,
    TypeDeclaration,
    UnaryOperator,
    UpdateStatement,
    WindowClause,
    WindowExpr,
    WindowFrameClause,
    WindowSpecification,
    WithClause,
    WithOffsetClause,
    WithQuery,
    XXXByExprs,
}

impl From<String> for NodeType {
    fn from(name: String) -> Self {
        NodeType::from(name.as_str())
    }
}

impl From<NodeType> for String {
    fn from(node_type: NodeType) -> Self {
        node_type.as_str().to_string()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NodeType {
    /// Statement-like kinds: every `...Statement` except `...WithStatement`, and set
    /// operators combining two queries.
    pub fn is_statement(&self) -> bool {
        let name = self.as_str();
        *self == NodeType::SetOperator
            || (name.ends_with("Statement") && !name.ends_with("WithStatement"))
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub token: Option<Token>,
    pub node_type: NodeType,
    #[serde(default)]
    pub children: HashMap<String, ContentType>,
}

impl Node {
    pub fn new(token: Token, node_type: NodeType) -> Self {
        Self {
            token: Some(token),
            node_type,
            children: HashMap::new(),
        }
    }

    pub fn empty(node_type: NodeType) -> Self {
        Self {
            token: None,
            node_type,
            children: HashMap::new(),
        }
    }

    pub fn push_node(&mut self, key: &str, node: Node) {
        self.children
            .insert(key.to_string(), ContentType::Node(node));
    }

    pub fn push_node_vec(&mut self, key: &str, nodes: Vec<Node>) {
        self.children
            .insert(key.to_string(), ContentType::NodeVec(nodes));
    }

    pub fn has(&self, key: &str) -> bool {
        self.children.contains_key(key)
    }

    /// Single-node slot. A list slot is not a single node and yields `None`.
    pub fn node(&self, key: &str) -> Option<&Node> {
        match self.children.get(key) {
            Some(ContentType::Node(n)) => Some(n),
            _ => None,
        }
    }

    /// List slot. An absent slot is an empty list and a single node is a list of one.
    pub fn nodes(&self, key: &str) -> &[Node] {
        match self.children.get(key) {
            Some(ContentType::NodeVec(ns)) => ns,
            Some(ContentType::Node(n)) => std::slice::from_ref(n),
            None => &[],
        }
    }

    pub fn take_node(&mut self, key: &str) -> Option<Node> {
        match self.children.remove(key) {
            Some(ContentType::Node(n)) => Some(n),
            Some(other) => {
                self.children.insert(key.to_string(), other);
                None
            }
            None => None,
        }
    }

    pub fn literal(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.literal.as_str())
    }

    /// Case-insensitive test of this node's own token.
    pub fn is(&self, literal: &str) -> bool {
        self.token.as_ref().is_some_and(|t| t.is(literal))
    }

    pub fn leading_comments(&self) -> &[Node] {
        self.nodes("leading_comments")
    }

    pub fn trailing_comments(&self) -> &[Node] {
        self.nodes("trailing_comments")
    }

    fn format(&self, indent: usize, is_array: bool) -> String {
        let mut res = Vec::new();
        let literal = self.literal().unwrap_or("None");
        let head = if is_array {
            format!("{}- self: {}", " ".repeat((indent - 1) * 2), literal)
        } else {
            format!("{}self: {}", " ".repeat(indent * 2), literal)
        };
        res.push(format!("{head} ({})", self.node_type));
        let mut keys: Vec<&String> = self.children.keys().collect();
        keys.sort();
        for k in keys {
            let pad = " ".repeat(indent * 2);
            match &self.children[k] {
                ContentType::Node(n) => {
                    res.push(format!("{pad}{k}:"));
                    res.push(n.format(indent + 1, false));
                }
                ContentType::NodeVec(ns) if ns.is_empty() => res.push(format!("{pad}{k}: []")),
                ContentType::NodeVec(ns) => {
                    res.push(format!("{pad}{k}:"));
                    res.extend(ns.iter().map(|n| n.format(indent + 1, true)));
                }
            }
        }
        res.join("\n")
    }
}

/// YAML-like dump used to inspect trees in tests and debug logs.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.format(0, false))
    }
}

/// Reads a statement list in the bq2cst JSON layout.
pub fn from_json(json: &str) -> Result<Vec<Node>, serde_json::Error> {
    serde_json::from_str(json)
}

pub fn to_json(nodes: &[Node]) -> Result<String, serde_json::Error> {
    serde_json::to_string(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_type_names() {
        assert_eq!(NodeType::from("EOF"), NodeType::Eof);
        assert_eq!(NodeType::Eof.as_str(), "EOF");
        assert_eq!(NodeType::from("XXXByExprs"), NodeType::XXXByExprs);
        assert_eq!(
            NodeType::from("MergeStatement"),
            NodeType::Other("MergeStatement".to_string())
        );
        assert!(NodeType::SelectStatement.is_statement());
        assert!(NodeType::SetOperator.is_statement());
        assert!(NodeType::Other("CreateTableStatement".to_string()).is_statement());
        assert!(!NodeType::Other("FooWithStatement".to_string()).is_statement());
        assert!(!NodeType::GroupedExpr.is_statement());
    }

    #[test]
    fn slots() {
        let mut node = Node::new(Token::new(1, 1, "SELECT"), NodeType::SelectStatement);
        node.push_node("semicolon", Node::new(Token::new(1, 9, ";"), NodeType::Symbol));
        node.push_node_vec(
            "exprs",
            vec![Node::new(Token::new(1, 8, "1"), NodeType::NumericLiteral)],
        );
        assert!(node.has("semicolon"));
        assert_eq!(node.node("semicolon").and_then(|n| n.literal()), Some(";"));
        assert!(node.node("exprs").is_none());
        assert_eq!(node.nodes("exprs").len(), 1);
        assert_eq!(node.nodes("semicolon").len(), 1);
        assert!(node.nodes("from").is_empty());
        assert!(node.take_node("exprs").is_none());
        assert!(node.has("exprs"));
        assert!(node.take_node("semicolon").is_some());
        assert!(!node.has("semicolon"));
    }

    #[test]
    fn json_layout() {
        let json = r#"[
            {"token": {"line": 1, "column": 1, "literal": "SELECT"},
             "node_type": "SelectStatement",
             "children": {
                "exprs": {"NodeVec": [
                    {"token": {"line": 1, "column": 8, "literal": "1"},
                     "node_type": "NumericLiteral", "children": {}}
                ]},
                "semicolon": {"Node":
                    {"token": {"line": 1, "column": 9, "literal": ";"},
                     "node_type": "Symbol", "children": {}}}
             }},
            {"token": null, "node_type": "EOF", "children": {}}
        ]"#;
        let nodes = from_json(json).expect("valid json");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].node_type, NodeType::SelectStatement);
        assert_eq!(nodes[0].nodes("exprs")[0].literal(), Some("1"));
        assert_eq!(nodes[1].node_type, NodeType::Eof);
        let back = from_json(&to_json(&nodes).expect("serializable")).expect("valid json");
        assert_eq!(back, nodes);
    }
}
