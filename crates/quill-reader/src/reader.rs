use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader};

use quill_core::{Error, Value};

use crate::lexer::{tokenize, Token};
use crate::parser::{ParseError, Parser};

/// A line-buffered reader: glues the tokenizer and parser over an input
/// source, buffering parsed values and carrying incomplete token runs
/// across newlines so a form may span any number of lines.
pub struct Reader<R: BufRead> {
    source: R,
    values: VecDeque<Value>,
    pending: Vec<Token>,
    eof: bool,
}

impl<R: BufRead> Reader<R> {
    pub fn new(source: R) -> Self {
        Reader {
            source,
            values: VecDeque::new(),
            pending: Vec::new(),
            eof: false,
        }
    }

    /// Pull the next top-level value, reading further source lines until
    /// at least one complete form is buffered. `None` is the end marker:
    /// end of input with nothing pending.
    pub fn read(&mut self) -> Result<Option<Value>, Error> {
        loop {
            if let Some(value) = self.values.pop_front() {
                return Ok(Some(value));
            }
            if self.eof {
                if self.pending.is_empty() {
                    return Ok(None);
                }
                self.pending.clear();
                return Err(Error::syntax("Unexpected end of input"));
            }
            self.fill_line()?;
        }
    }

    /// Drop everything buffered (REPL error recovery).
    pub fn discard_pending(&mut self) {
        self.values.clear();
        self.pending.clear();
    }

    fn fill_line(&mut self) -> Result<(), Error> {
        let mut line = String::new();
        let n = self
            .source
            .read_line(&mut line)
            .map_err(|e| Error::interpreter(format!("Reading source failed: {e}")))?;
        if n == 0 {
            self.eof = true;
            return Ok(());
        }
        match tokenize(&line) {
            Ok(tokens) => self.pending.extend(tokens),
            Err(e) => {
                self.discard_pending();
                return Err(e);
            }
        }
        self.drain_pending()
    }

    /// Parse as many complete forms as the carried tokens allow; an
    /// incomplete tail is kept for the next line.
    fn drain_pending(&mut self) -> Result<(), Error> {
        let mut parser = Parser::new(std::mem::take(&mut self.pending));
        loop {
            if !parser.has_more() {
                return Ok(());
            }
            let mark = parser.pos();
            match parser.try_parse() {
                Ok(value) => self.values.push_back(value),
                Err(ParseError::Incomplete) => {
                    self.pending = parser.take_from(mark);
                    return Ok(());
                }
                Err(ParseError::Syntax(e)) => {
                    self.values.clear();
                    return Err(e);
                }
            }
        }
    }
}

// The standard-input reader backing the `read` builtin.
thread_local! {
    static STDIN_READER: RefCell<Reader<BufReader<io::Stdin>>> =
        RefCell::new(Reader::new(BufReader::new(io::stdin())));
}

/// Read one value from standard input through the shared reader.
pub fn read_from_stdin() -> Result<Option<Value>, Error> {
    STDIN_READER.with(|r| r.borrow_mut().read())
}

/// Read all s-expressions from a string.
pub fn read_many(input: &str) -> Result<Vec<Value>, Error> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    let mut exprs = Vec::new();
    while parser.has_more() {
        exprs.push(parser.parse()?);
    }
    Ok(exprs)
}

/// Read a single s-expression from a string (nil when empty).
pub fn read_one(input: &str) -> Result<Value, Error> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    if !parser.has_more() {
        return Ok(Value::Nil);
    }
    parser.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(input: &str) -> Reader<&[u8]> {
        Reader::new(input.as_bytes())
    }

    #[test]
    fn test_read_single_form() {
        let mut r = reader("(+ 1 2)\n");
        assert_eq!(r.read().unwrap().unwrap().to_string(), "(+ 1 2)");
        assert!(r.read().unwrap().is_none());
    }

    #[test]
    fn test_read_multiple_forms_per_line() {
        let mut r = reader("1 2 3\n");
        assert_eq!(r.read().unwrap(), Some(Value::Number(1.0)));
        assert_eq!(r.read().unwrap(), Some(Value::Number(2.0)));
        assert_eq!(r.read().unwrap(), Some(Value::Number(3.0)));
        assert_eq!(r.read().unwrap(), None);
    }

    #[test]
    fn test_form_spanning_lines() {
        let mut r = reader("(define x\n  (+ 1\n     2))\n");
        assert_eq!(
            r.read().unwrap().unwrap().to_string(),
            "(define x (+ 1 2))"
        );
        assert_eq!(r.read().unwrap(), None);
    }

    #[test]
    fn test_eof_mid_form_is_syntax_error() {
        let mut r = reader("(1 2\n");
        assert!(r.read().is_err());
    }

    #[test]
    fn test_lex_error_discards_queue() {
        let mut r = reader("1 2 \"unterminated\n");
        assert!(r.read().is_err());
        assert_eq!(r.read().unwrap(), None);
    }

    #[test]
    fn test_end_marker_is_stable() {
        let mut r = reader("");
        assert_eq!(r.read().unwrap(), None);
        assert_eq!(r.read().unwrap(), None);
    }

    #[test]
    fn test_read_many() {
        let exprs = read_many("(a) (b) 3").unwrap();
        assert_eq!(exprs.len(), 3);
        assert_eq!(exprs[2], Value::Number(3.0));
    }

    #[test]
    fn test_read_one_empty_is_nil() {
        assert_eq!(read_one("").unwrap(), Value::Nil);
        assert_eq!(read_one("  ; just a comment").unwrap(), Value::Nil);
    }
}
