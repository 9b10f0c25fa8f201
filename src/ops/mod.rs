//! Shared operation model for the signature and n-token engines
//!
//! Both snippet parsers compile down to the same tagged [`Op`] set held in an
//! ordered [`OpSequence`]. The three simple variants cover the signature
//! grammar; the richer statement variants carry the n-token program. Pure
//! data; construction happens in the parsers, behavior in the interpreters.

use serde::{Deserialize, Serialize};

/// Binary operators of the closed expression grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

/// Unary operators of the closed expression grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
}

/// The closed set of callable methods the n-token grammar admits.
///
/// Anything outside this set is a parse failure, never a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallKind {
    Splice,
    Push,
    Unshift,
    Join,
    Slice,
    Split,
    Reverse,
    IndexOf,
    CharCodeAt,
    /// `String.fromCharCode(...)`, the only receiver-less call admitted
    FromCharCode,
}

impl CallKind {
    /// Map a method name to its kind; `None` means the construct is outside
    /// the supported grammar.
    pub fn from_method_name(name: &str) -> Option<Self> {
        match name {
            "splice" => Some(CallKind::Splice),
            "push" => Some(CallKind::Push),
            "unshift" => Some(CallKind::Unshift),
            "join" => Some(CallKind::Join),
            "slice" => Some(CallKind::Slice),
            "split" => Some(CallKind::Split),
            "reverse" => Some(CallKind::Reverse),
            "indexOf" => Some(CallKind::IndexOf),
            "charCodeAt" => Some(CallKind::CharCodeAt),
            _ => None,
        }
    }
}

/// Expression tree restricted to the observed n-token constructs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Num(f64),
    Str(String),
    Ident(String),
    Array(Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
    Index(Box<Expr>, Box<Expr>),
    /// `.length` is the only member access that survives parsing
    Length(Box<Expr>),
    Call {
        recv: Option<Box<Expr>>,
        kind: CallKind,
        args: Vec<Expr>,
    },
}

/// Assignment target: a local variable or an indexed store into one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Target {
    Var(String),
    Index(String, Expr),
}

/// A single elementary operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Op {
    /// Reverse the token in place
    Reverse,
    /// Drop the first `n` code units, clamped to the current length
    RemovePrefix(usize),
    /// Exchange element 0 with element `i % length`
    SwapWithFirst(usize),

    /// Variable declaration or re-assignment (indexed targets cover stores)
    Assign { target: Target, value: Expr },
    /// `if`/`else` over a supported condition
    Branch {
        cond: Expr,
        then: OpSequence,
        otherwise: Option<OpSequence>,
    },
    /// `for`/`while`; `init`/`step` absent for plain `while`
    Loop {
        init: Option<Box<Op>>,
        cond: Option<Expr>,
        step: Option<Box<Op>>,
        body: OpSequence,
    },
    /// Statement-level `x.splice(...)`
    ArraySplice { target: String, args: Vec<Expr> },
    /// Statement-level `x.push(...)`
    ArrayPush { target: String, args: Vec<Expr> },
    /// Statement-level `x.unshift(...)`
    ArrayUnshift { target: String, args: Vec<Expr> },
    /// Any other side-effecting expression statement
    Eval(Expr),
    /// Terminates evaluation with the expression's value
    Return(Expr),
}

/// An ordered sequence of operations, immutable after extraction.
///
/// Order is semantically significant and preserved exactly as discovered in
/// the snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OpSequence(Vec<Op>);

impl OpSequence {
    pub fn new(ops: Vec<Op>) -> Self {
        OpSequence(ops)
    }

    pub fn ops(&self) -> &[Op] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Op> {
        self.0.iter()
    }
}

impl From<Vec<Op>> for OpSequence {
    fn from(ops: Vec<Op>) -> Self {
        OpSequence(ops)
    }
}

impl<'a> IntoIterator for &'a OpSequence {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_kind_is_closed() {
        assert_eq!(CallKind::from_method_name("splice"), Some(CallKind::Splice));
        assert_eq!(CallKind::from_method_name("join"), Some(CallKind::Join));
        assert_eq!(
            CallKind::from_method_name("charCodeAt"),
            Some(CallKind::CharCodeAt)
        );

        // Anything unrecognized must map to None, not a default
        assert_eq!(CallKind::from_method_name("forEach"), None);
        assert_eq!(CallKind::from_method_name("eval"), None);
        assert_eq!(CallKind::from_method_name(""), None);
    }

    #[test]
    fn test_sequence_preserves_order() {
        let seq = OpSequence::new(vec![
            Op::SwapWithFirst(3),
            Op::RemovePrefix(2),
            Op::Reverse,
        ]);
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.ops()[0], Op::SwapWithFirst(3));
        assert_eq!(seq.ops()[2], Op::Reverse);
    }
}
