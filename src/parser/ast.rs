// AST (Abstract Syntax Tree) definitions for the GB plugin language

use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Numeric literal value. The lexer decides the variant from the number of
/// decimal points in the literal.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberValue {
    Integer(i64),
    /// Integer literal too large for `i64`, kept as its decimal digits.
    BigInteger(String),
    Float(f64),
}

impl fmt::Display for NumberValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberValue::Integer(n) => write!(f, "{}", n),
            NumberValue::BigInteger(digits) => write!(f, "{}", digits),
            NumberValue::Float(x) => write!(f, "{:?}", x),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        };
        f.write_str(symbol)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Plus, // +x
    Neg,  // -x
}

/// The two mutually exclusive loop forms.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopKind {
    /// `loop times <count> then ... end`
    Counted { count: Box<AstNode> },
    /// `loop <condition> then ... end`
    Conditional { condition: Box<AstNode> },
}

/// One `elif <condition> then ...` arm of an `if` statement
#[derive(Debug, Clone, PartialEq)]
pub struct ElifClause {
    pub condition: AstNode,
    pub body: Vec<AstNode>,
    pub location: SourceLocation,
}

/// AST nodes representing declarations, statements, expressions and GUI
/// elements
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    // Declarations
    VarDecl {
        name: String,
        value: Box<AstNode>,
        location: SourceLocation,
    },
    ConstDecl {
        name: String,
        value: Box<AstNode>,
        location: SourceLocation,
    },
    FunctionDef {
        name: String,
        params: Vec<String>,
        body: Vec<AstNode>,
        location: SourceLocation,
    },

    // Statements
    Return {
        expr: Box<AstNode>,
        location: SourceLocation,
    },
    If {
        condition: Box<AstNode>,
        then_branch: Vec<AstNode>,
        elif_clauses: Vec<ElifClause>,
        else_branch: Option<Vec<AstNode>>,
        location: SourceLocation,
    },
    Loop {
        kind: LoopKind,
        body: Vec<AstNode>,
        location: SourceLocation,
    },

    // Expressions
    NumberLiteral(NumberValue, SourceLocation),
    StringLiteral(String, SourceLocation),
    BoolLiteral(bool, SourceLocation),
    Identifier(String, SourceLocation),
    BinaryOp {
        op: BinOp,
        left: Box<AstNode>,
        right: Box<AstNode>,
        location: SourceLocation,
    },
    UnaryOp {
        op: UnOp,
        operand: Box<AstNode>,
        location: SourceLocation,
    },
    FunctionCall {
        name: String,
        args: Vec<AstNode>,
        location: SourceLocation,
    },

    // Host calls
    /// `ts.windows(title'...', text'...')`
    NotifyCall {
        title: String,
        text: String,
        location: SourceLocation,
    },
    /// `tsdll("library", "function", args...)`
    ForeignCall {
        library: String,
        function: String,
        args: Vec<AstNode>,
        location: SourceLocation,
    },

    // GUI elements
    Window {
        title: String,
        width: Box<AstNode>,
        height: Box<AstNode>,
        children: Vec<AstNode>,
        location: SourceLocation,
    },
    Button {
        text: String,
        /// Name following the button text, e.g. `onClick`
        event: Option<String>,
        handler: Vec<AstNode>,
        location: SourceLocation,
    },
    Input {
        name: String,
        default: String,
        location: SourceLocation,
    },
    Text {
        content: String,
        location: SourceLocation,
    },
    Container {
        children: Vec<AstNode>,
        location: SourceLocation,
    },
}

impl AstNode {
    /// Get the source location of this node
    pub fn location(&self) -> &SourceLocation {
        match self {
            AstNode::VarDecl { location, .. } => location,
            AstNode::ConstDecl { location, .. } => location,
            AstNode::FunctionDef { location, .. } => location,
            AstNode::Return { location, .. } => location,
            AstNode::If { location, .. } => location,
            AstNode::Loop { location, .. } => location,
            AstNode::NumberLiteral(_, loc) => loc,
            AstNode::StringLiteral(_, loc) => loc,
            AstNode::BoolLiteral(_, loc) => loc,
            AstNode::Identifier(_, loc) => loc,
            AstNode::BinaryOp { location, .. } => location,
            AstNode::UnaryOp { location, .. } => location,
            AstNode::FunctionCall { location, .. } => location,
            AstNode::NotifyCall { location, .. } => location,
            AstNode::ForeignCall { location, .. } => location,
            AstNode::Window { location, .. } => location,
            AstNode::Button { location, .. } => location,
            AstNode::Input { location, .. } => location,
            AstNode::Text { location, .. } => location,
            AstNode::Container { location, .. } => location,
        }
    }

    /// True for the nodes produced by the GUI-element grammar
    pub fn is_gui_element(&self) -> bool {
        matches!(
            self,
            AstNode::Window { .. }
                | AstNode::Button { .. }
                | AstNode::Input { .. }
                | AstNode::Text { .. }
                | AstNode::Container { .. }
        )
    }
}

/// Top-level program structure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub nodes: Vec<AstNode>, // Top-level statements and GUI elements, in source order
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}
