//! ESTree node types
//!
//! The interpreter does not parse source text; an external parser (esprima,
//! acorn, or any ESTree emitter) supplies the tree, typically as JSON.
//! Every node is tagged by its `type` field, so the whole tree deserializes
//! through serde. Node kinds outside the supported ES5 surface (patterns,
//! arrow functions, classes, template literals) have no variants here and
//! are refused at deserialization time.

use serde::Deserialize;

/// A complete program
#[derive(Debug, Clone, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub body: Vec<Statement>,
}

// ============ STATEMENTS ============

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Statement {
    ExpressionStatement {
        expression: Expression,
    },
    BlockStatement {
        #[serde(default)]
        body: Vec<Statement>,
    },
    EmptyStatement,
    ReturnStatement {
        #[serde(default)]
        argument: Option<Expression>,
    },
    LabeledStatement {
        label: Identifier,
        body: Box<Statement>,
    },
    BreakStatement {
        #[serde(default)]
        label: Option<Identifier>,
    },
    ContinueStatement {
        #[serde(default)]
        label: Option<Identifier>,
    },
    IfStatement {
        test: Expression,
        consequent: Box<Statement>,
        #[serde(default)]
        alternate: Option<Box<Statement>>,
    },
    SwitchStatement {
        discriminant: Expression,
        #[serde(default)]
        cases: Vec<SwitchCase>,
    },
    ThrowStatement {
        argument: Expression,
    },
    TryStatement {
        block: Block,
        #[serde(default)]
        handler: Option<CatchClause>,
        #[serde(default)]
        finalizer: Option<Block>,
    },
    WhileStatement {
        test: Expression,
        body: Box<Statement>,
    },
    DoWhileStatement {
        body: Box<Statement>,
        test: Expression,
    },
    ForStatement {
        #[serde(default)]
        init: Option<ForInit>,
        #[serde(default)]
        test: Option<Expression>,
        #[serde(default)]
        update: Option<Expression>,
        body: Box<Statement>,
    },
    ForInStatement {
        left: ForInLeft,
        right: Expression,
        body: Box<Statement>,
    },
    FunctionDeclaration(FunctionDecl),
    VariableDeclaration(VariableDecl),
}

/// A statement list that is always a block node (function bodies, try
/// blocks, catch bodies, finalizers)
#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwitchCase {
    /// None for the `default` case
    #[serde(default)]
    pub test: Option<Expression>,
    #[serde(default)]
    pub consequent: Vec<Statement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatchClause {
    pub param: Identifier,
    pub body: Block,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionDecl {
    pub id: Identifier,
    #[serde(default)]
    pub params: Vec<Identifier>,
    pub body: Block,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariableDecl {
    #[serde(default)]
    pub declarations: Vec<VariableDeclarator>,
    pub kind: VariableKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariableDeclarator {
    pub id: Identifier,
    #[serde(default)]
    pub init: Option<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum VariableKind {
    #[serde(rename = "var")]
    Var,
    #[serde(rename = "let")]
    Let,
    #[serde(rename = "const")]
    Const,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ForInit {
    Declaration(VariableDecl),
    Expression(Box<Expression>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ForInLeft {
    Declaration(VariableDecl),
    Pattern(Identifier),
}

impl ForInLeft {
    /// The iteration variable name
    pub fn name(&self) -> Option<&str> {
        match self {
            ForInLeft::Declaration(decl) => {
                decl.declarations.first().map(|d| d.id.name.as_str())
            }
            ForInLeft::Pattern(id) => Some(&id.name),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Identifier {
    pub name: String,
}

// ============ EXPRESSIONS ============

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    ThisExpression,
    ArrayExpression {
        #[serde(default)]
        elements: Vec<Option<Expression>>,
    },
    ObjectExpression {
        #[serde(default)]
        properties: Vec<ObjectProp>,
    },
    FunctionExpression(FunctionExpr),
    UnaryExpression {
        operator: String,
        argument: Box<Expression>,
    },
    UpdateExpression {
        operator: String,
        argument: Box<Expression>,
        #[serde(default)]
        prefix: bool,
    },
    BinaryExpression {
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    AssignmentExpression {
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    LogicalExpression {
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    MemberExpression {
        object: Box<Expression>,
        property: Box<Expression>,
        #[serde(default)]
        computed: bool,
    },
    ConditionalExpression {
        test: Box<Expression>,
        consequent: Box<Expression>,
        alternate: Box<Expression>,
    },
    CallExpression {
        callee: Box<Expression>,
        #[serde(default)]
        arguments: Vec<Expression>,
    },
    NewExpression {
        callee: Box<Expression>,
        #[serde(default)]
        arguments: Vec<Expression>,
    },
    SequenceExpression {
        expressions: Vec<Expression>,
    },
    Identifier {
        name: String,
    },
    Literal {
        #[serde(default)]
        value: LiteralValue,
        #[serde(default)]
        regex: Option<RegexLiteral>,
        #[serde(default)]
        raw: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionExpr {
    #[serde(default)]
    pub id: Option<Identifier>,
    #[serde(default)]
    pub params: Vec<Identifier>,
    pub body: Block,
}

/// An `ObjectExpression` property. Accessor kinds are not modelled; every
/// property is treated as a data property.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectProp {
    pub key: Expression,
    pub value: Expression,
    #[serde(default)]
    pub computed: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    /// Some producers put an opaque object here for regex literals; the
    /// sibling `regex` descriptor is authoritative in that case
    Opaque(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegexLiteral {
    pub pattern: String,
    #[serde(default)]
    pub flags: String,
}
