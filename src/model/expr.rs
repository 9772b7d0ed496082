//! Small expression AST for enum constant-expressions and, after evaluation,
//! for resolving enum-item references inside annotation parameter values
//! (spec §4.2, §9: "Enum constant-expression evaluation").
//!
//! Leaf nodes are either integer literals or references to an already- (or
//! not-yet-, since self-referential enums are tolerated) defined enum item,
//! combined with `+ - * / << >>`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Shl,
    Shr,
}

impl BinOp {
    pub fn apply(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            BinOp::Add => lhs.checked_add(rhs),
            BinOp::Sub => lhs.checked_sub(rhs),
            BinOp::Mul => lhs.checked_mul(rhs),
            BinOp::Div => lhs.checked_div(rhs),
            BinOp::Shl => rhs.try_into().ok().and_then(|r: u32| lhs.checked_shl(r)),
            BinOp::Shr => rhs.try_into().ok().and_then(|r: u32| lhs.checked_shr(r)),
        }
    }
}

/// A dotted reference such as `ITEM`, `Enum.ITEM` or `Namespace.Enum.ITEM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefPath(pub Vec<String>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    IntLiteral(i64),
    ItemRef(RefPath),
    BinOp(Box<Expr>, BinOp, Box<Expr>),
}
