/// The interpreter's error taxonomy.
///
/// `Syntax` comes out of the tokenizer and parser, `Lisp` out of the
/// evaluator, special forms, and builtins. The two arity variants are
/// internal: the application path catches them and rewords them per
/// callable kind ("arguments" for procedures, "operands" for special
/// forms) before they can surface. `Exit` is the non-local exit raised by
/// the `exit` builtin and is only ever caught by the driver.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("SyntaxError: {0}")]
    Syntax(String),

    #[error("LispError: {0}")]
    Lisp(String),

    #[error("LispError: {name}: too few arguments (expected at least {min}, got {got})")]
    TooFewArgs {
        name: String,
        min: usize,
        got: usize,
    },

    #[error("LispError: {name}: too many arguments (expected at most {max}, got {got})")]
    TooManyArgs {
        name: String,
        max: usize,
        got: usize,
    },

    #[error("InterpreterError: {0}")]
    Interpreter(String),

    #[error("exit with code {0}")]
    Exit(i32),
}

impl Error {
    pub fn syntax(msg: impl Into<String>) -> Self {
        Error::Syntax(msg.into())
    }

    pub fn lisp(msg: impl Into<String>) -> Self {
        Error::Lisp(msg.into())
    }

    pub fn interpreter(msg: impl Into<String>) -> Self {
        Error::Interpreter(msg.into())
    }

    pub fn is_arity(&self) -> bool {
        matches!(self, Error::TooFewArgs { .. } | Error::TooManyArgs { .. })
    }

    /// Process exit status for this error class.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Exit(code) => *code,
            Error::Lisp(_) | Error::TooFewArgs { .. } | Error::TooManyArgs { .. } => 1,
            Error::Syntax(_) => 2,
            Error::Interpreter(_) => 3,
        }
    }
}
