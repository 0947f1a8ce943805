use abacus_ast::InternError;
use abacus_parser::ParseError;
use thiserror::Error;

/// Engine-level failures.
///
/// Only genuinely fatal conditions surface here: a rejected input or an
/// exhausted symbol cache. A rewrite candidate with an unexpected shape
/// is a local skip inside its generator, never an error (the search
/// simply does not take that rewrite).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Intern(#[from] InternError),
}
