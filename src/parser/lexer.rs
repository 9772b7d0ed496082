//! Hand-rolled lexer for the `.packet` grammar (spec §6). Nothing in the
//! retrieval pack depends on a parser-generator crate, so the grammar is
//! lexed and parsed by hand rather than reaching for one.

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Package,
    Include,
    Enum,
    Packet,
    Ident(String),
    Str(String),
    HexInt(i64),
    DecInt(i64),
    Float(f64),
    LBrace,
    RBrace,
    LParen,
    RParen,
    Semi,
    Comma,
    Dot,
    Colon,
    Eq,
    At,
    Lt,
    Gt,
    Plus,
    Minus,
    Star,
    Slash,
    Shl,
    Shr,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: usize,
}

pub fn lex(source: &str) -> Result<Vec<Spanned>, String> {
    let mut out = Vec::new();
    let mut chars = source.char_indices().peekable();
    let bytes = source.as_bytes();
    let mut line = 1usize;

    while let Some(&(i, c)) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '/' if bytes.get(i + 1) == Some(&b'/') => {
                while let Some(&(_, c)) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '/' => {
                chars.next();
                out.push(Spanned { token: Token::Slash, line });
            }
            '{' => {
                chars.next();
                out.push(Spanned { token: Token::LBrace, line });
            }
            '}' => {
                chars.next();
                out.push(Spanned { token: Token::RBrace, line });
            }
            '(' => {
                chars.next();
                out.push(Spanned { token: Token::LParen, line });
            }
            ')' => {
                chars.next();
                out.push(Spanned { token: Token::RParen, line });
            }
            ';' => {
                chars.next();
                out.push(Spanned { token: Token::Semi, line });
            }
            ',' => {
                chars.next();
                out.push(Spanned { token: Token::Comma, line });
            }
            ':' => {
                chars.next();
                out.push(Spanned { token: Token::Colon, line });
            }
            '=' => {
                chars.next();
                out.push(Spanned { token: Token::Eq, line });
            }
            '@' => {
                chars.next();
                out.push(Spanned { token: Token::At, line });
            }
            '+' => {
                chars.next();
                out.push(Spanned { token: Token::Plus, line });
            }
            '-' => {
                chars.next();
                out.push(Spanned { token: Token::Minus, line });
            }
            '*' => {
                chars.next();
                out.push(Spanned { token: Token::Star, line });
            }
            '<' => {
                chars.next();
                if chars.peek().map(|&(_, c)| c) == Some('<') {
                    chars.next();
                    out.push(Spanned { token: Token::Shl, line });
                } else {
                    out.push(Spanned { token: Token::Lt, line });
                }
            }
            '>' => {
                chars.next();
                if chars.peek().map(|&(_, c)| c) == Some('>') {
                    chars.next();
                    out.push(Spanned { token: Token::Shr, line });
                } else {
                    out.push(Spanned { token: Token::Gt, line });
                }
            }
            '"' | '\'' => {
                let quote = c;
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some((_, c)) if c == quote => break,
                        Some((_, c)) => s.push(c),
                        None => return Err(format!("line {line}: unterminated string literal")),
                    }
                }
                out.push(Spanned { token: Token::Str(s), line });
            }
            '.' if !bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit()) => {
                chars.next();
                out.push(Spanned { token: Token::Dot, line });
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                let mut end = i;
                let mut is_float = false;
                let is_hex = c == '0' && bytes.get(i + 1) == Some(&b'x');
                if is_hex {
                    chars.next();
                    chars.next();
                    end = i + 2;
                    while let Some(&(j, c)) = chars.peek() {
                        if c.is_ascii_hexdigit() {
                            chars.next();
                            end = j + c.len_utf8();
                        } else {
                            break;
                        }
                    }
                    let digits = &source[i + 2..end];
                    let value = i64::from_str_radix(digits, 16)
                        .map_err(|_| format!("line {line}: invalid hex literal"))?;
                    out.push(Spanned { token: Token::HexInt(value), line });
                    continue;
                }
                while let Some(&(j, c)) = chars.peek() {
                    if c.is_ascii_digit() {
                        chars.next();
                        end = j + c.len_utf8();
                    } else if c == '.' && !is_float {
                        is_float = true;
                        chars.next();
                        end = j + c.len_utf8();
                    } else {
                        break;
                    }
                }
                let text = &source[start..end];
                if is_float {
                    let value: f64 = text
                        .parse()
                        .map_err(|_| format!("line {line}: invalid float literal {text}"))?;
                    out.push(Spanned { token: Token::Float(value), line });
                } else {
                    let value: i64 = text
                        .parse()
                        .map_err(|_| format!("line {line}: invalid integer literal {text}"))?;
                    out.push(Spanned { token: Token::DecInt(value), line });
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                let mut end = i;
                while let Some(&(j, c)) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        chars.next();
                        end = j + c.len_utf8();
                    } else {
                        break;
                    }
                }
                let text = &source[start..end];
                let token = match text {
                    "package" => Token::Package,
                    "include" => Token::Include,
                    "enum" => Token::Enum,
                    "packet" => Token::Packet,
                    _ => Token::Ident(text.to_string()),
                };
                out.push(Spanned { token, line });
            }
            other => return Err(format!("line {line}: unexpected character {other:?}")),
        }
    }

    out.push(Spanned { token: Token::Eof, line });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        lex(source).unwrap().into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn hex_and_decimal_and_float_literals() {
        assert_eq!(tokens("0x1F"), vec![Token::HexInt(31), Token::Eof]);
        assert_eq!(tokens("42"), vec![Token::DecInt(42), Token::Eof]);
        assert_eq!(tokens("3.5"), vec![Token::Float(3.5), Token::Eof]);
    }

    #[test]
    fn shift_operators_are_two_char_tokens() {
        assert_eq!(tokens("<<"), vec![Token::Shl, Token::Eof]);
        assert_eq!(tokens(">>"), vec![Token::Shr, Token::Eof]);
        assert_eq!(tokens("<"), vec![Token::Lt, Token::Eof]);
    }

    #[test]
    fn line_comments_are_skipped() {
        assert_eq!(tokens("packet // a comment\nP"), vec![Token::Packet, Token::Ident("P".to_string()), Token::Eof]);
    }

    #[test]
    fn string_literals_accept_single_or_double_quotes() {
        assert_eq!(tokens(r#""a.packet""#), vec![Token::Str("a.packet".to_string()), Token::Eof]);
        assert_eq!(tokens("'a.packet'"), vec![Token::Str("a.packet".to_string()), Token::Eof]);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(lex("\"unterminated").is_err());
    }

    #[test]
    fn keywords_are_not_identifiers() {
        assert_eq!(tokens("package include enum packet"), vec![Token::Package, Token::Include, Token::Enum, Token::Packet, Token::Eof]);
        assert_eq!(tokens("packetx"), vec![Token::Ident("packetx".to_string()), Token::Eof]);
    }
}
