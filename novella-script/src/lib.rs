pub mod ast;
pub mod edit;
pub mod lexer;
pub mod parser;
pub mod rich_text;
pub mod timing;
pub mod writer;
