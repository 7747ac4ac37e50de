//! protoboil-ir
//!
//! The data generators work on:
//!  1) IR node types and ids (`types`),
//!  2) the IR store with JSON snapshots (`ir`),
//!  3) the query facade: filters, `id_iter`, `node_iter` (`query`),
//!  4) the `Emitter` output builder,
//!  5) plugin configuration and parameters (`config`), logging setup, and
//!     error types (`IrError`).

pub mod error;
pub mod types;
pub mod config;
pub mod logging;
pub mod ir;
pub mod query;
pub mod emitter;

pub use config::{Config, Params, TemplateSpec};
pub use emitter::Emitter;
pub use error::IrError;
pub use ir::{is_dangling_id, Ir};
pub use logging::{init_logging, LogMode};
pub use query::Filter;
pub use types::*;
