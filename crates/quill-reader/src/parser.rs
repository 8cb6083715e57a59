use quill_core::{Error, Value};

use crate::lexer::Token;

/// Why a parse attempt stopped: the token stream ran dry mid-form (the
/// reader can pull another line and retry), or the input is malformed.
pub(crate) enum ParseError {
    Incomplete,
    Syntax(Error),
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Error {
        match e {
            ParseError::Incomplete => Error::syntax("More token(s) expected"),
            ParseError::Syntax(err) => err,
        }
    }
}

/// Recursive-descent parser over a token deque. Leftover tokens are not
/// an error: `has_more` lets callers pull successive top-level forms.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    pub fn has_more(&self) -> bool {
        self.pos < self.tokens.len()
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    /// Unconsumed tokens from a saved position, for carry-over between
    /// source lines.
    pub(crate) fn take_from(&self, pos: usize) -> Vec<Token> {
        self.tokens[pos..].to_vec()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<Token, ParseError> {
        match self.tokens.get(self.pos) {
            Some(tok) => {
                self.pos += 1;
                Ok(tok.clone())
            }
            None => Err(ParseError::Incomplete),
        }
    }

    /// Parse one expression, consuming its tokens.
    pub fn parse(&mut self) -> Result<Value, Error> {
        self.try_parse().map_err(Error::from)
    }

    pub(crate) fn try_parse(&mut self) -> Result<Value, ParseError> {
        match self.next()? {
            Token::Bool(b) => Ok(Value::Bool(b)),
            Token::Number(n) => Ok(Value::Number(n)),
            Token::Str(s) => Ok(Value::string(s)),
            Token::Char(c) => Ok(Value::Char(c)),
            Token::Ident(name) => Ok(Value::symbol(&name)),
            Token::LParen => self.parse_tails(),
            Token::VectorBegin => self.parse_vector(),
            Token::Quote => self.parse_abbrev("quote"),
            Token::Quasiquote => self.parse_abbrev("quasiquote"),
            Token::Unquote => self.parse_abbrev("unquote"),
            Token::UnquoteSplicing => self.parse_abbrev("unquote-splicing"),
            Token::RParen => Err(ParseError::Syntax(Error::syntax("Unexpected `)`"))),
            Token::Dot => Err(ParseError::Syntax(Error::syntax("Unexpected `.`"))),
        }
    }

    /// The tail of a list after `(`: `)` closes with nil, `expr . expr )`
    /// builds a dotted pair, otherwise recurse.
    fn parse_tails(&mut self) -> Result<Value, ParseError> {
        match self.peek() {
            None => Err(ParseError::Incomplete),
            Some(Token::RParen) => {
                self.pos += 1;
                Ok(Value::Nil)
            }
            Some(_) => {
                let car = self.try_parse()?;
                if self.peek() == Some(&Token::Dot) {
                    self.pos += 1;
                    let cdr = self.try_parse()?;
                    match self.next()? {
                        Token::RParen => Ok(Value::cons(car, cdr)),
                        _ => Err(ParseError::Syntax(Error::syntax("Right paren expected"))),
                    }
                } else {
                    let cdr = self.parse_tails()?;
                    Ok(Value::cons(car, cdr))
                }
            }
        }
    }

    fn parse_vector(&mut self) -> Result<Value, ParseError> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => return Err(ParseError::Incomplete),
                Some(Token::RParen) => {
                    self.pos += 1;
                    return Ok(Value::vector(items));
                }
                Some(_) => items.push(self.try_parse()?),
            }
        }
    }

    /// `'x` reads as `(quote x)`, and likewise for the other reader
    /// abbreviations.
    fn parse_abbrev(&mut self, keyword: &str) -> Result<Value, ParseError> {
        let inner = self.try_parse()?;
        Ok(Value::list_from_vec(vec![Value::symbol(keyword), inner]))
    }
}
