//! protoboil-compiler
//!
//! This crate implements:
//!  1) The descriptor-to-IR translator (`translate`),
//!  2) Generator module discovery (`Catalog`, `Registry`, `DirectoryCatalog`),
//!  3) The orchestrator running generators one by one (`Orchestrator`),
//!  4) Built-in generators (`ProtoGenerator`, `DepsGenerator`),
//!  5) The protoc plugin driver (`run_plugin`) and error types.

pub mod error;
pub mod options;
pub mod translator;
pub mod traits;
pub mod catalog;
pub mod orchestrator;
pub mod gen_proto;
pub mod gen_deps;
pub mod plugin;

pub use catalog::{
    Catalog, Catalogs, DirectoryCatalog, ExternalGenerator, ModuleRef, ModuleSource, Registry,
    INTEGRITY_EXIT_CODE,
};
pub use error::{BoilError, GeneratorError};
pub use gen_deps::DepsGenerator;
pub use gen_proto::ProtoGenerator;
pub use orchestrator::{Artifact, Batch, Failure, Orchestrator};
pub use plugin::{builtin_registry, configure, default_catalog, generate, run_plugin, PluginOutput};
pub use traits::Generator;
pub use translator::translate;
