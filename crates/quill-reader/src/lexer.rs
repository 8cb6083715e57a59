use quill_core::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    Dot,
    Quote,
    Quasiquote,
    Unquote,
    UnquoteSplicing,
    VectorBegin,
    Bool(bool),
    Number(f64),
    Str(String),
    Char(char),
    Ident(String),
}

/// Characters that end a word in addition to whitespace.
fn is_terminator(c: char) -> bool {
    matches!(c, '(' | ')' | '\'' | '`' | ',' | '"' | ';')
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, Error> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            _ if c.is_whitespace() => {
                i += 1;
            }

            // Comment to end of line
            ';' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }

            '(' => {
                i += 1;
                tokens.push(Token::LParen);
            }
            ')' => {
                i += 1;
                tokens.push(Token::RParen);
            }
            '\'' => {
                i += 1;
                tokens.push(Token::Quote);
            }
            '`' => {
                i += 1;
                tokens.push(Token::Quasiquote);
            }
            ',' => {
                if chars.get(i + 1) == Some(&'@') {
                    i += 2;
                    tokens.push(Token::UnquoteSplicing);
                } else {
                    i += 1;
                    tokens.push(Token::Unquote);
                }
            }

            '"' => {
                i += 1;
                let mut s = String::new();
                loop {
                    match chars.get(i) {
                        None => {
                            return Err(Error::syntax("Unexpected end of string literal"));
                        }
                        Some('"') => {
                            i += 1;
                            break;
                        }
                        Some('\\') => {
                            let next = chars.get(i + 1).ok_or_else(|| {
                                Error::syntax("Unexpected end of string literal")
                            })?;
                            match next {
                                'n' => s.push('\n'),
                                other => s.push(*other),
                            }
                            i += 2;
                        }
                        Some(other) => {
                            s.push(*other);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Str(s));
            }

            '#' => match chars.get(i + 1) {
                Some('t') => {
                    i += 2;
                    tokens.push(Token::Bool(true));
                }
                Some('f') => {
                    i += 2;
                    tokens.push(Token::Bool(false));
                }
                Some('(') => {
                    i += 2;
                    tokens.push(Token::VectorBegin);
                }
                Some('\\') => {
                    i += 2;
                    let start = i;
                    while i < chars.len() && !chars[i].is_whitespace() && !is_terminator(chars[i])
                    {
                        i += 1;
                    }
                    let body: String = chars[start..i].iter().collect();
                    let c = if body.eq_ignore_ascii_case("space") {
                        ' '
                    } else if body.eq_ignore_ascii_case("newline") {
                        '\n'
                    } else if body.chars().count() == 1 {
                        body.chars().next().unwrap()
                    } else {
                        return Err(Error::syntax(format!(
                            "Malformed character literal #\\{body}"
                        )));
                    };
                    tokens.push(Token::Char(c));
                }
                _ => {
                    return Err(Error::syntax("Unexpected character after #"));
                }
            },

            // A word: number, dot, or identifier
            _ => {
                let start = i;
                while i < chars.len() && !chars[i].is_whitespace() && !is_terminator(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if word == "." {
                    tokens.push(Token::Dot);
                } else if matches!(word.chars().next(), Some(c) if c.is_ascii_digit() || c == '+' || c == '-' || c == '.')
                {
                    match word.parse::<f64>() {
                        Ok(n) => tokens.push(Token::Number(n)),
                        Err(_) => tokens.push(Token::Ident(word)),
                    }
                } else {
                    tokens.push(Token::Ident(word));
                }
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_char_tokens() {
        assert_eq!(
            tokenize("()'`").unwrap(),
            vec![
                Token::LParen,
                Token::RParen,
                Token::Quote,
                Token::Quasiquote
            ]
        );
    }

    #[test]
    fn test_unquote_vs_splicing() {
        assert_eq!(
            tokenize(",x ,@y").unwrap(),
            vec![
                Token::Unquote,
                Token::Ident("x".into()),
                Token::UnquoteSplicing,
                Token::Ident("y".into())
            ]
        );
    }

    #[test]
    fn test_booleans_and_vector_begin() {
        assert_eq!(
            tokenize("#t #f #(").unwrap(),
            vec![Token::Bool(true), Token::Bool(false), Token::VectorBegin]
        );
    }

    #[test]
    fn test_char_literals() {
        assert_eq!(tokenize("#\\a").unwrap(), vec![Token::Char('a')]);
        assert_eq!(tokenize("#\\space").unwrap(), vec![Token::Char(' ')]);
        assert_eq!(tokenize("#\\newline").unwrap(), vec![Token::Char('\n')]);
        assert_eq!(tokenize("#\\NEWLINE").unwrap(), vec![Token::Char('\n')]);
        assert!(tokenize("#\\bogus").is_err());
    }

    #[test]
    fn test_char_literal_ends_at_terminator() {
        assert_eq!(
            tokenize("(#\\a)").unwrap(),
            vec![Token::LParen, Token::Char('a'), Token::RParen]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            tokenize(r#""a\nb\"c\\d""#).unwrap(),
            vec![Token::Str("a\nb\"c\\d".into())]
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert!(tokenize("\"abc").is_err());
    }

    #[test]
    fn test_stray_hash() {
        assert!(tokenize("#").is_err());
        assert!(tokenize("#x").is_err());
    }

    #[test]
    fn test_numbers_and_identifiers() {
        assert_eq!(tokenize("42").unwrap(), vec![Token::Number(42.0)]);
        assert_eq!(tokenize("-7.5").unwrap(), vec![Token::Number(-7.5)]);
        assert_eq!(tokenize(".5").unwrap(), vec![Token::Number(0.5)]);
        assert_eq!(tokenize("+").unwrap(), vec![Token::Ident("+".into())]);
        assert_eq!(tokenize("-").unwrap(), vec![Token::Ident("-".into())]);
        assert_eq!(tokenize("x2").unwrap(), vec![Token::Ident("x2".into())]);
    }

    #[test]
    fn test_standalone_dot() {
        assert_eq!(
            tokenize("(a . b)").unwrap(),
            vec![
                Token::LParen,
                Token::Ident("a".into()),
                Token::Dot,
                Token::Ident("b".into()),
                Token::RParen
            ]
        );
    }

    #[test]
    fn test_comment_runs_to_newline() {
        assert_eq!(
            tokenize("1 ; two three\n4").unwrap(),
            vec![Token::Number(1.0), Token::Number(4.0)]
        );
    }
}
