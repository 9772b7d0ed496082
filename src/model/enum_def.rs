//! Enum (spec §3): owning POM, ordered items, each with a name and an
//! integer value computed by evaluating a constant expression.

use crate::model::expr::Expr;
use crate::model::PomId;

#[derive(Debug, Clone)]
pub struct EnumItem {
    pub name: String,
    pub expr: Expr,
    /// Resolved by `crate::analysis::constants::evaluate_all`; `0` until then.
    pub value: i64,
}

#[derive(Debug, Clone)]
pub struct Enum {
    pub name: String,
    pub pom: PomId,
    pub items: Vec<EnumItem>,
}

impl Enum {
    pub fn new(name: impl Into<String>, pom: PomId) -> Self {
        Self {
            name: name.into(),
            pom,
            items: Vec::new(),
        }
    }

    pub fn find_item(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|i| i.name == name)
    }
}
