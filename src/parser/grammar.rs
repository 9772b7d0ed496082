//! Recursive-descent parser over the token stream from
//! [`crate::parser::lexer`], producing a [`crate::parser::ast::FileAst`].
//!
//! Binary operators in constant expressions are not given relative
//! precedence in the grammar this was ported from — `a + b * c` parses
//! strictly left-to-right, same as the enum expressions it evaluates.

use crate::annotations::RawParamValue;
use crate::model::expr::{BinOp, Expr, RefPath};
use crate::parser::ast::{
    AnnotationAst, AnnotationParamAst, DottedName, EnumAst, EnumItemAst, FieldAst, FileAst,
    IncludeAst, PackageAst, PacketAst,
};
use crate::parser::lexer::{Spanned, Token};

pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

type PResult<T> = Result<T, String>;

impl Parser {
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn line(&self) -> usize {
        self.tokens[self.pos].line
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].token.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token) -> PResult<()> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(format!("line {}: expected {:?}, found {:?}", self.line(), expected, self.peek()))
        }
    }

    fn expect_ident(&mut self) -> PResult<String> {
        match self.advance() {
            Token::Ident(name) => Ok(name),
            other => Err(format!("line {}: expected identifier, found {:?}", self.line(), other)),
        }
    }

    fn expect_str(&mut self) -> PResult<String> {
        match self.advance() {
            Token::Str(s) => Ok(s),
            other => Err(format!("line {}: expected string literal, found {:?}", self.line(), other)),
        }
    }

    fn dotted_name(&mut self) -> PResult<DottedName> {
        let mut parts = vec![self.expect_ident()?];
        while *self.peek() == Token::Dot {
            self.advance();
            parts.push(self.expect_ident()?);
        }
        Ok(DottedName(parts))
    }

    pub fn parse_file(&mut self) -> PResult<FileAst> {
        let mut file = FileAst::default();
        loop {
            match self.peek() {
                Token::Package => file.packages.push(self.parse_package()?),
                Token::Include => file.includes.push(self.parse_include()?),
                Token::Enum => file.enums.push(self.parse_enum()?),
                Token::At | Token::Packet => file.packets.push(self.parse_packet()?),
                Token::Eof => break,
                other => return Err(format!("line {}: unexpected token {:?} at top level", self.line(), other)),
            }
        }
        Ok(file)
    }

    fn parse_package(&mut self) -> PResult<PackageAst> {
        self.expect(&Token::Package)?;
        let lang = self.expect_ident()?;
        let value = self.expect_str()?;
        self.expect(&Token::Semi)?;
        Ok(PackageAst { lang, value })
    }

    fn parse_include(&mut self) -> PResult<IncludeAst> {
        self.expect(&Token::Include)?;
        let bracketed = *self.peek() == Token::Lt;
        if bracketed {
            self.advance();
        }
        let path = self.expect_str()?;
        if bracketed {
            self.expect(&Token::Gt)?;
        }
        self.expect(&Token::Semi)?;
        Ok(IncludeAst { path })
    }

    fn parse_enum(&mut self) -> PResult<EnumAst> {
        self.expect(&Token::Enum)?;
        let name = self.expect_ident()?;
        self.expect(&Token::LBrace)?;
        let mut items = Vec::new();
        while *self.peek() != Token::RBrace {
            let item_name = self.expect_ident()?;
            self.expect(&Token::Eq)?;
            let expr = self.parse_const_expr()?;
            self.expect(&Token::Semi)?;
            items.push(EnumItemAst { name: item_name, expr });
        }
        self.expect(&Token::RBrace)?;
        Ok(EnumAst { name, items })
    }

    fn parse_const_expr(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_const_term()?;
        loop {
            let op = match self.peek() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                Token::Shl => BinOp::Shl,
                Token::Shr => BinOp::Shr,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_const_term()?;
            lhs = Expr::BinOp(Box::new(lhs), op, Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_const_term(&mut self) -> PResult<Expr> {
        match self.peek().clone() {
            Token::HexInt(v) | Token::DecInt(v) => {
                self.advance();
                Ok(Expr::IntLiteral(v))
            }
            Token::Ident(_) => {
                let dotted = self.dotted_name()?;
                Ok(Expr::ItemRef(RefPath(dotted.0)))
            }
            other => Err(format!("line {}: expected a constant-expression term, found {:?}", self.line(), other)),
        }
    }

    fn parse_param_value(&mut self) -> PResult<RawParamValue> {
        match self.peek().clone() {
            Token::Str(s) => {
                self.advance();
                Ok(RawParamValue::Str(s))
            }
            Token::HexInt(v) => {
                self.advance();
                Ok(RawParamValue::Hex(v))
            }
            Token::DecInt(v) => {
                self.advance();
                Ok(RawParamValue::Dec(v))
            }
            Token::Float(v) => {
                self.advance();
                Ok(RawParamValue::Float(v.to_string()))
            }
            Token::Ident(_) => {
                let dotted = self.dotted_name()?;
                Ok(RawParamValue::Ref(RefPath(dotted.0)))
            }
            other => Err(format!("line {}: expected an annotation parameter value, found {:?}", self.line(), other)),
        }
    }

    fn parse_annotation(&mut self) -> PResult<AnnotationAst> {
        self.expect(&Token::At)?;
        let line = self.line();
        let name = self.expect_ident()?;
        let mut params = Vec::new();
        if *self.peek() == Token::LParen {
            self.advance();
            while *self.peek() != Token::RParen {
                let pname = self.expect_ident()?;
                let value = if *self.peek() == Token::Eq {
                    self.advance();
                    Some(self.parse_param_value()?)
                } else {
                    None
                };
                params.push(AnnotationParamAst { name: pname, value });
                if *self.peek() == Token::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
            self.expect(&Token::RParen)?;
        }
        Ok(AnnotationAst { name, line, params })
    }

    fn parse_annotations(&mut self) -> PResult<Vec<AnnotationAst>> {
        let mut out = Vec::new();
        while *self.peek() == Token::At {
            out.push(self.parse_annotation()?);
        }
        Ok(out)
    }

    fn parse_packet(&mut self) -> PResult<PacketAst> {
        let annotations = self.parse_annotations()?;
        let line = self.line();
        self.expect(&Token::Packet)?;
        let name = self.expect_ident()?;
        let parent = if *self.peek() == Token::Colon {
            self.advance();
            Some(self.dotted_name()?)
        } else {
            None
        };
        self.expect(&Token::LBrace)?;
        let mut fields = Vec::new();
        while *self.peek() != Token::RBrace {
            fields.push(self.parse_field()?);
        }
        self.expect(&Token::RBrace)?;
        Ok(PacketAst { name, parent, annotations, fields, line })
    }

    fn parse_field(&mut self) -> PResult<FieldAst> {
        let annotations = self.parse_annotations()?;
        let line = self.line();
        let field_type = self.dotted_name()?;
        let name = self.expect_ident()?;
        self.expect(&Token::Semi)?;
        Ok(FieldAst { annotations, field_type, name, line })
    }
}

pub fn parse(source: &str) -> PResult<FileAst> {
    let tokens = crate::parser::lexer::lex(source)?;
    Parser::new(tokens).parse_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_package_include_enum_and_packet() {
        let file = parse(
            r#"
            package cpp "my::pkg";
            include <"other.packet">;

            enum Color {
              RED = 0;
              GREEN = 1;
              BLUE = RED + 2;
            }

            @bigendian
            packet Header {
              uint16 len;
            }

            packet Body : Header {
              @repeated(count=4) uint8 payload;
            }
            "#,
        )
        .unwrap();

        assert_eq!(file.packages.len(), 1);
        assert_eq!(file.packages[0].lang, "cpp");
        assert_eq!(file.packages[0].value, "my::pkg");
        assert_eq!(file.includes.len(), 1);
        assert_eq!(file.includes[0].path, "other.packet");
        assert_eq!(file.enums.len(), 1);
        assert_eq!(file.enums[0].items.len(), 3);
        assert_eq!(file.packets.len(), 2);
        assert_eq!(file.packets[0].annotations.len(), 1);
        assert_eq!(file.packets[1].parent.as_ref().unwrap().as_dotted(), "Header");
        assert_eq!(file.packets[1].fields[0].annotations[0].name, "repeated");
    }

    #[test]
    fn dotted_type_and_parent_names() {
        let file = parse("packet P : ns.Parent { ns.Other field_name; }").unwrap();
        assert_eq!(file.packets[0].parent.as_ref().unwrap().as_dotted(), "ns.Parent");
        assert_eq!(file.packets[0].fields[0].field_type.as_dotted(), "ns.Other");
    }

    #[test]
    fn annotation_params_support_bare_flags_and_named_values() {
        let file = parse("@padded(multiple=4, excluded) packet P { uint8 a; }").unwrap();
        let ann = &file.packets[0].annotations[0];
        assert_eq!(ann.name, "padded");
        assert_eq!(ann.params.len(), 2);
        assert_eq!(ann.params[0].name, "multiple");
        assert!(ann.params[0].value.is_some());
        assert_eq!(ann.params[1].name, "excluded");
        assert!(ann.params[1].value.is_none());
    }

    #[test]
    fn missing_semicolon_is_a_parse_error() {
        assert!(parse("packet P { uint8 a }").is_err());
    }
}
