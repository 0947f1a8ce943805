//! Cost-directed best-first simplifier for elementary integer algebra.
//!
//! Given a flattened expression state (see `abacus_ast`), the engine
//! searches the space of algebraic rewrites for a canonical simplified
//! form — a single number, or a constant plus a linear combination of
//! distinct variables — preferring rewrite sequences that are cheap under
//! a hand-arithmetic cost model. Numeric rewrites are lazy: they record
//! the intended operation as a composite ref, and a deferred-compute
//! phase lifts composites to concrete numbers once the frontier runs dry.

pub mod cost;
pub mod driver;
pub mod error;
pub mod format;
pub mod generator;
pub mod generators;
pub mod goal;
pub mod heuristic;
pub mod model;
pub mod mux;
pub mod term;

pub use cost::{Cost, CostModel};
pub use driver::{CancelToken, Outcome, SearchOptions, Searcher};
pub use error::EngineError;
pub use format::format_path;
pub use generator::{CandKind, Candidate, Rewrite, RewriteGen};
pub use generators::default_generators;
pub use goal::is_goal;
pub use heuristic::heuristic;
pub use model::{Model, Transform};
