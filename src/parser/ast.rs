//! Untyped syntax tree produced by [`crate::parser::grammar`]. The builder
//! (`crate::builder`) is what gives this meaning — resolving type names,
//! validating annotation shapes, and evaluating enum expressions.

use crate::annotations::RawParamValue;
use crate::model::expr::Expr;

/// A dotted name such as `uint16`, `Packet` or `Namespace.Packet`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DottedName(pub Vec<String>);

impl DottedName {
    pub fn as_dotted(&self) -> String {
        self.0.join(".")
    }
}

#[derive(Debug, Clone)]
pub struct AnnotationParamAst {
    pub name: String,
    pub value: Option<RawParamValue>,
}

#[derive(Debug, Clone)]
pub struct AnnotationAst {
    pub name: String,
    pub line: usize,
    pub params: Vec<AnnotationParamAst>,
}

#[derive(Debug, Clone)]
pub struct EnumItemAst {
    pub name: String,
    pub expr: Expr,
}

#[derive(Debug, Clone)]
pub struct EnumAst {
    pub name: String,
    pub items: Vec<EnumItemAst>,
}

#[derive(Debug, Clone)]
pub struct FieldAst {
    pub annotations: Vec<AnnotationAst>,
    pub field_type: DottedName,
    pub name: String,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct PacketAst {
    pub name: String,
    pub parent: Option<DottedName>,
    pub annotations: Vec<AnnotationAst>,
    pub fields: Vec<FieldAst>,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct IncludeAst {
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct PackageAst {
    pub lang: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct FileAst {
    pub packages: Vec<PackageAst>,
    pub includes: Vec<IncludeAst>,
    pub enums: Vec<EnumAst>,
    pub packets: Vec<PacketAst>,
}
