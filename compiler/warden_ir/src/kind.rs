//! Node type tags.

use std::fmt;

/// The `type` tag of an ESTree node.
///
/// Only the shapes the scope annotator treats specially get their own
/// variant; everything else is carried as [`NodeKind::Other`] and walked
/// generically.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    BlockStatement,
    ExpressionStatement,
    FunctionDeclaration,
    FunctionExpression,
    ArrowFunctionExpression,
    VariableDeclaration,
    VariableDeclarator,
    ClassDeclaration,
    CatchClause,
    Identifier,
    Literal,
    ThisExpression,
    BinaryExpression,
    LogicalExpression,
    MemberExpression,
    CallExpression,
    NewExpression,
    ArrayExpression,
    Property,
    LabeledStatement,
    BreakStatement,
    ContinueStatement,
    WhileStatement,
    DoWhileStatement,
    /// Any other standard (or non-standard) node type.
    Other(Box<str>),
}

impl NodeKind {
    /// Map an ESTree `type` string to a kind.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Program" => NodeKind::Program,
            "BlockStatement" => NodeKind::BlockStatement,
            "ExpressionStatement" => NodeKind::ExpressionStatement,
            "FunctionDeclaration" => NodeKind::FunctionDeclaration,
            "FunctionExpression" => NodeKind::FunctionExpression,
            "ArrowFunctionExpression" => NodeKind::ArrowFunctionExpression,
            "VariableDeclaration" => NodeKind::VariableDeclaration,
            "VariableDeclarator" => NodeKind::VariableDeclarator,
            "ClassDeclaration" => NodeKind::ClassDeclaration,
            "CatchClause" => NodeKind::CatchClause,
            "Identifier" => NodeKind::Identifier,
            "Literal" => NodeKind::Literal,
            "ThisExpression" => NodeKind::ThisExpression,
            "BinaryExpression" => NodeKind::BinaryExpression,
            "LogicalExpression" => NodeKind::LogicalExpression,
            "MemberExpression" => NodeKind::MemberExpression,
            "CallExpression" => NodeKind::CallExpression,
            "NewExpression" => NodeKind::NewExpression,
            "ArrayExpression" => NodeKind::ArrayExpression,
            "Property" => NodeKind::Property,
            "LabeledStatement" => NodeKind::LabeledStatement,
            "BreakStatement" => NodeKind::BreakStatement,
            "ContinueStatement" => NodeKind::ContinueStatement,
            "WhileStatement" => NodeKind::WhileStatement,
            "DoWhileStatement" => NodeKind::DoWhileStatement,
            other => NodeKind::Other(other.into()),
        }
    }

    /// The ESTree `type` string.
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::BlockStatement => "BlockStatement",
            NodeKind::ExpressionStatement => "ExpressionStatement",
            NodeKind::FunctionDeclaration => "FunctionDeclaration",
            NodeKind::FunctionExpression => "FunctionExpression",
            NodeKind::ArrowFunctionExpression => "ArrowFunctionExpression",
            NodeKind::VariableDeclaration => "VariableDeclaration",
            NodeKind::VariableDeclarator => "VariableDeclarator",
            NodeKind::ClassDeclaration => "ClassDeclaration",
            NodeKind::CatchClause => "CatchClause",
            NodeKind::Identifier => "Identifier",
            NodeKind::Literal => "Literal",
            NodeKind::ThisExpression => "ThisExpression",
            NodeKind::BinaryExpression => "BinaryExpression",
            NodeKind::LogicalExpression => "LogicalExpression",
            NodeKind::MemberExpression => "MemberExpression",
            NodeKind::CallExpression => "CallExpression",
            NodeKind::NewExpression => "NewExpression",
            NodeKind::ArrayExpression => "ArrayExpression",
            NodeKind::Property => "Property",
            NodeKind::LabeledStatement => "LabeledStatement",
            NodeKind::BreakStatement => "BreakStatement",
            NodeKind::ContinueStatement => "ContinueStatement",
            NodeKind::WhileStatement => "WhileStatement",
            NodeKind::DoWhileStatement => "DoWhileStatement",
            NodeKind::Other(tag) => tag,
        }
    }

    /// Function declarations, function expressions and arrows.
    #[inline]
    pub fn is_function_like(&self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDeclaration
                | NodeKind::FunctionExpression
                | NodeKind::ArrowFunctionExpression
        )
    }

    /// Nodes that own a scope table: the program and every function-like node.
    #[inline]
    pub fn is_function_context(&self) -> bool {
        matches!(self, NodeKind::Program) || self.is_function_like()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
