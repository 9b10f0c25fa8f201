//! N-token transform engine: lexer, grammar parser, interpreter, and facade

pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod token;

pub use parser::NsigProgram;
pub use token::NToken;
