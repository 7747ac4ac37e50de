use std::path::Path;

use protoboil_ir::{Ir, TemplateSpec};
use tracing::{error, info, warn};

use crate::{
    catalog::{Catalog, ModuleRef},
    error::{BoilError, GeneratorError},
};

/// Text produced by one generator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name:    String,
    pub module:  String,
    pub content: String,
}

/// A generator run (or a discovery) that produced nothing.
#[derive(Debug)]
pub struct Failure {
    pub pattern: String,
    pub module:  Option<String>,
    pub error:   GeneratorError,
}

/// Outcome of a whole batch: every artifact that was produced, in template
/// list order, and every failure next to them.
#[derive(Debug, Default)]
pub struct Batch {
    pub artifacts: Vec<Artifact>,
    pub failures:  Vec<Failure>,
}

impl Batch {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs generator modules one after the other against a saved snapshot.
pub struct Orchestrator<'c> {
    catalog: &'c dyn Catalog,
}

impl<'c> Orchestrator<'c> {
    pub fn new(catalog: &'c dyn Catalog) -> Self {
        Orchestrator { catalog }
    }

    /// Runs every module matched by `specs`. A module that cannot be loaded
    /// or fails while running loses its own artifact only; a dangling id
    /// reported by any module aborts the whole batch.
    pub fn run(&self, specs: &[TemplateSpec], snapshot: &Path) -> Result<Batch, BoilError> {
        let mut batch = Batch::default();

        for spec in specs {
            let modules = match self.catalog.discover(spec.pattern()) {
                Ok(modules) => modules,
                Err(err) => {
                    error!("{}", err);
                    batch.failures.push(Failure {
                        pattern: spec.pattern().to_string(),
                        module:  None,
                        error:   err,
                    });
                    continue;
                }
            };
            if modules.is_empty() {
                warn!("No generator matches \"{}\"", spec.pattern());
            }

            for module in modules {
                let name = module.output_name(spec.proto());
                info!("Boiling \"{}\" to make \"{}\"", module.name, name);

                match self.invoke(&module, snapshot, spec.proto()) {
                    Ok(content) => batch.artifacts.push(Artifact {
                        name,
                        module: module.name,
                        content,
                    }),
                    Err(err) if err.is_fatal() => {
                        error!("\"{}\" aborted the run: {}", module.name, err);
                        return Err(BoilError::Integrity {
                            module: module.name,
                            source: err,
                        });
                    }
                    Err(err) => {
                        error!("\"{}\" skipped: {}", name, err);
                        batch.failures.push(Failure {
                            pattern: spec.pattern().to_string(),
                            module:  Some(module.name),
                            error:   err,
                        });
                    }
                }
            }
        }

        Ok(batch)
    }

    /// One isolated execution: load the module, give it its own copy of the
    /// snapshot, keep the text it returns.
    fn invoke(&self, module: &ModuleRef, snapshot: &Path, proto: Option<&str>) -> Result<String, GeneratorError> {
        let generator = self.catalog.load(module)?;
        let ir = Ir::load(snapshot)?;
        generator.generate(&ir, proto)
    }
}
