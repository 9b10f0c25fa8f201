//! Signature cipher engine: snippet parser, interpreter, and facade

pub mod decipher;
pub mod interpreter;
pub mod parser;

pub use decipher::SigDecipher;
