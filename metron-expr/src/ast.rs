//! Abstract Syntax Tree

use metron_core::Number;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number(Number),
    /// The single bound variable (`x` / `X`)
    Variable,
    BinaryOp(Box<Expr>, BinOp, Box<Expr>),
    UnaryOp(UnaryOp, Box<Expr>),
    FunctionCall(Function, Vec<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp { Add, Sub, Mul, Div, Rem, Pow }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp { Plus, Neg }

/// Closed whitelist of callable functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Function { Abs, Neg, Sqrt, Pow, Min, Max }

impl Function {
    pub const ALL: [Function; 6] = [
        Function::Abs,
        Function::Neg,
        Function::Sqrt,
        Function::Pow,
        Function::Min,
        Function::Max,
    ];

    /// Case-insensitive lookup
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name().eq_ignore_ascii_case(name))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Function::Abs => "abs",
            Function::Neg => "neg",
            Function::Sqrt => "sqrt",
            Function::Pow => "pow",
            Function::Min => "min",
            Function::Max => "max",
        }
    }

    /// Accepted argument counts as (min, max); `None` max means variadic
    pub fn arity(&self) -> (usize, Option<usize>) {
        match self {
            Function::Abs | Function::Neg | Function::Sqrt => (1, Some(1)),
            Function::Pow => (2, Some(2)),
            Function::Min | Function::Max => (1, None),
        }
    }
}

impl std::fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
