//! Token stream over an n-transform function body
//!
//! The lexer only knows the characters the closed grammar can produce.
//! Anything else is an extraction failure at this stage, so the parser never
//! sees a construct it would have to guess about.

use crate::error::DescrambleError;
use crate::Result;

/// A lexical token of the n-token grammar
#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    Ident(String),
    Num(f64),
    Str(String),
    /// Operator or delimiter, always one of the fixed `PUNCTS` entries
    Punct(&'static str),
    Eof,
}

/// Token plus its byte offset in the source, for diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub tok: Tok,
    pub pos: usize,
}

/// Multi-character operators first so maximal munch wins.
const PUNCTS: &[&str] = &[
    ">>>", "===", "!==", "==", "!=", "<=", ">=", "<<", ">>", "&&", "||", "++", "--", "+=", "-=",
    "+", "-", "*", "/", "%", "&", "|", "^", "~", "!", "<", ">", "=", "(", ")", "[", "]", "{", "}",
    ",", ";", "?", ":", ".",
];

/// Lex a function body into tokens. Fails closed on any character or escape
/// the grammar does not admit.
pub fn lex(src: &str) -> Result<Vec<Token>> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    'outer: while i < bytes.len() {
        let c = bytes[i] as char;

        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                i += 1;
            }
            if i < bytes.len() && bytes[i] == b'.' {
                i += 1;
                while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                    i += 1;
                }
            }
            let text = &src[start..i];
            let value = text.parse::<f64>().map_err(|_| {
                DescrambleError::extraction("lexer", format!("bad number literal `{}`", text))
            })?;
            tokens.push(Token {
                tok: Tok::Num(value),
                pos: start,
            });
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            let start = i;
            while i < bytes.len() {
                let ch = bytes[i] as char;
                if ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' {
                    i += 1;
                } else {
                    break;
                }
            }
            tokens.push(Token {
                tok: Tok::Ident(src[start..i].to_string()),
                pos: start,
            });
            continue;
        }

        if c == '"' || c == '\'' {
            let quote = c;
            let start = i;
            i += 1;
            let mut value = String::new();
            while i < bytes.len() {
                let ch = bytes[i] as char;
                if ch == quote {
                    i += 1;
                    tokens.push(Token {
                        tok: Tok::Str(value),
                        pos: start,
                    });
                    continue 'outer;
                }
                if ch == '\\' {
                    i += 1;
                    let esc = *bytes.get(i).ok_or_else(|| {
                        DescrambleError::extraction("lexer", "unterminated string escape")
                    })? as char;
                    match esc {
                        '\\' | '"' | '\'' | '/' => value.push(esc),
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        other => {
                            return Err(DescrambleError::extraction(
                                "lexer",
                                format!("unsupported string escape `\\{}` at byte {}", other, i),
                            ))
                        }
                    }
                    i += 1;
                    continue;
                }
                // Multi-byte UTF-8 passes through intact
                let ch_len = src[i..].chars().next().map(char::len_utf8).unwrap_or(1);
                value.push_str(&src[i..i + ch_len]);
                i += ch_len;
            }
            return Err(DescrambleError::extraction(
                "lexer",
                format!("unterminated string literal at byte {}", start),
            ));
        }

        for punct in PUNCTS {
            if src[i..].starts_with(punct) {
                tokens.push(Token {
                    tok: Tok::Punct(punct),
                    pos: i,
                });
                i += punct.len();
                continue 'outer;
            }
        }

        return Err(DescrambleError::extraction(
            "lexer",
            format!("unsupported character `{}` at byte {}", c, i),
        ));
    }

    tokens.push(Token {
        tok: Tok::Eof,
        pos: src.len(),
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(src: &str) -> Vec<Tok> {
        lex(src).unwrap().into_iter().map(|t| t.tok).collect()
    }

    #[test]
    fn test_maximal_munch() {
        assert_eq!(
            toks("a>>>2"),
            vec![
                Tok::Ident("a".into()),
                Tok::Punct(">>>"),
                Tok::Num(2.0),
                Tok::Eof
            ]
        );
        assert_eq!(
            toks("a===b"),
            vec![
                Tok::Ident("a".into()),
                Tok::Punct("==="),
                Tok::Ident("b".into()),
                Tok::Eof
            ]
        );
        assert_eq!(
            toks("i++"),
            vec![Tok::Ident("i".into()), Tok::Punct("++"), Tok::Eof]
        );
    }

    #[test]
    fn test_numbers_and_strings() {
        assert_eq!(
            toks(r#"x=1.5+"ab\"c""#),
            vec![
                Tok::Ident("x".into()),
                Tok::Punct("="),
                Tok::Num(1.5),
                Tok::Punct("+"),
                Tok::Str("ab\"c".into()),
                Tok::Eof
            ]
        );
        assert_eq!(toks("'a;b'"), vec![Tok::Str("a;b".into()), Tok::Eof]);
    }

    #[test]
    fn test_dollar_identifiers() {
        assert_eq!(
            toks("$a0._x"),
            vec![
                Tok::Ident("$a0".into()),
                Tok::Punct("."),
                Tok::Ident("_x".into()),
                Tok::Eof
            ]
        );
    }

    #[test]
    fn test_unsupported_character_fails() {
        assert!(lex("a @ b").is_err());
        assert!(lex("`template`").is_err());
    }

    #[test]
    fn test_unterminated_string_fails() {
        assert!(lex("\"abc").is_err());
    }

    #[test]
    fn test_positions() {
        let tokens = lex("ab + 1").unwrap();
        assert_eq!(tokens[0].pos, 0);
        assert_eq!(tokens[1].pos, 3);
        assert_eq!(tokens[2].pos, 5);
    }
}
