use abacus_ast::InternError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("parse error: {0}")]
    Syntax(String),
    #[error("unconsumed input: {0}")]
    Unconsumed(String),
    #[error(transparent)]
    Intern(#[from] InternError),
}
