mod lexer;
mod parser;
mod reader;

pub use lexer::{tokenize, Token};
pub use parser::Parser;
pub use reader::{read_from_stdin, read_many, read_one, Reader};
