use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use glob::{MatchOptions, Pattern};
use protoboil_ir::Ir;
use tracing::debug;

use crate::{error::GeneratorError, traits::Generator};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive:              true,
    require_literal_separator:   true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSource {
    /// Registered in-process under its name.
    Builtin,
    /// An executable file.
    File(PathBuf),
}

/// A discovered generator module, named like `stub.cpp.gen`: the outer
/// extension marks a generator, the inner one is the target suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRef {
    pub name:   String,
    pub source: ModuleSource,
}

impl ModuleRef {
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// The file name without the generator suffix.
    pub fn stem(&self) -> &str {
        stem(self.file_name())
    }

    /// The target suffix declared by the name, dot included (`.cpp`).
    pub fn target_suffix(&self) -> &str {
        suffix(self.stem())
    }

    /// Name of the artifact this module produces: `<proto stem><suffix>`
    /// when a proto file is given, the module stem otherwise.
    pub fn output_name(&self, proto: Option<&str>) -> String {
        match proto {
            Some(proto) => {
                let base = Path::new(proto)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or(proto);
                format!("{}{}", stem(base), self.target_suffix())
            }
            None => self.stem().to_string(),
        }
    }
}

fn stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(pos) => &name[..pos],
    }
}

fn suffix(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => "",
        Some(pos) => &name[pos..],
    }
}

/// Where generator modules come from.
pub trait Catalog {
    /// Modules matching `pattern`, in listing order.
    fn discover(&self, pattern: &str) -> Result<Vec<ModuleRef>, GeneratorError>;

    fn owns(&self, module: &ModuleRef) -> bool;

    fn load(&self, module: &ModuleRef) -> Result<Arc<dyn Generator>, GeneratorError>;
}

fn compile(pattern: &str) -> Result<Pattern, GeneratorError> {
    Pattern::new(pattern).map_err(|e| GeneratorError::Discover {
        pattern: pattern.to_string(),
        reason:  e.msg.to_string(),
    })
}

/// In-process generators, listed in registration order.
#[derive(Default)]
pub struct Registry {
    entries: Vec<(String, Arc<dyn Generator>)>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn register<G: Generator + 'static>(&mut self, name: &str, generator: G) -> &mut Self {
        let generator: Arc<dyn Generator> = Arc::new(generator);
        self.entries.push((name.to_string(), generator));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl Catalog for Registry {
    fn discover(&self, pattern: &str) -> Result<Vec<ModuleRef>, GeneratorError> {
        let pattern = compile(pattern)?;
        Ok(self
            .names()
            .filter(|name| pattern.matches_with(name, MATCH_OPTIONS))
            .map(|name| ModuleRef {
                name:   name.to_string(),
                source: ModuleSource::Builtin,
            })
            .collect())
    }

    fn owns(&self, module: &ModuleRef) -> bool {
        module.source == ModuleSource::Builtin && self.names().any(|n| n == module.name)
    }

    fn load(&self, module: &ModuleRef) -> Result<Arc<dyn Generator>, GeneratorError> {
        self.entries
            .iter()
            .find(|(name, _)| *name == module.name)
            .map(|(_, generator)| Arc::clone(generator))
            .ok_or_else(|| GeneratorError::Load {
                module: module.name.clone(),
                reason: "not registered".to_string(),
            })
    }
}

/// Executable generator modules found under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
}

impl DirectoryCatalog {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        DirectoryCatalog { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Catalog for DirectoryCatalog {
    fn discover(&self, pattern: &str) -> Result<Vec<ModuleRef>, GeneratorError> {
        compile(pattern)?;
        let root = self.root.to_str().ok_or_else(|| GeneratorError::Discover {
            pattern: pattern.to_string(),
            reason:  format!("root {} is not valid UTF-8", self.root.display()),
        })?;
        let full = if root.is_empty() {
            pattern.to_string()
        } else {
            format!("{}/{}", Pattern::escape(root.trim_end_matches('/')), pattern)
        };

        let paths = glob::glob_with(&full, MATCH_OPTIONS).map_err(|e| GeneratorError::Discover {
            pattern: pattern.to_string(),
            reason:  e.msg.to_string(),
        })?;

        let mut modules = Vec::new();
        for path in paths.filter_map(Result::ok).filter(|p| p.is_file()) {
            let name = path
                .strip_prefix(&self.root)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");
            debug!("Found generator {}", path.display());
            modules.push(ModuleRef {
                name,
                source: ModuleSource::File(path),
            });
        }
        Ok(modules)
    }

    fn owns(&self, module: &ModuleRef) -> bool {
        matches!(module.source, ModuleSource::File(_))
    }

    fn load(&self, module: &ModuleRef) -> Result<Arc<dyn Generator>, GeneratorError> {
        let path = match &module.source {
            ModuleSource::File(path) => path,
            ModuleSource::Builtin => {
                return Err(GeneratorError::Load {
                    module: module.name.clone(),
                    reason: "not a file".to_string(),
                })
            }
        };
        if !is_executable(path) {
            return Err(GeneratorError::Load {
                module: module.name.clone(),
                reason: format!("{} is not an executable file", path.display()),
            });
        }
        Ok(Arc::new(ExternalGenerator::new(path.clone())))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Several catalogs searched in order; a module is loaded by the catalog
/// that listed it.
#[derive(Default)]
pub struct Catalogs {
    members: Vec<Box<dyn Catalog>>,
}

impl Catalogs {
    pub fn new() -> Self {
        Catalogs::default()
    }

    pub fn with<C: Catalog + 'static>(mut self, catalog: C) -> Self {
        self.members.push(Box::new(catalog));
        self
    }
}

impl Catalog for Catalogs {
    fn discover(&self, pattern: &str) -> Result<Vec<ModuleRef>, GeneratorError> {
        let mut modules = Vec::new();
        for member in &self.members {
            modules.extend(member.discover(pattern)?);
        }
        Ok(modules)
    }

    fn owns(&self, module: &ModuleRef) -> bool {
        self.members.iter().any(|m| m.owns(module))
    }

    fn load(&self, module: &ModuleRef) -> Result<Arc<dyn Generator>, GeneratorError> {
        match self.members.iter().find(|m| m.owns(module)) {
            Some(member) => member.load(module),
            None => Err(GeneratorError::Load {
                module: module.name.clone(),
                reason: "no catalog provides it".to_string(),
            }),
        }
    }
}

/// Exit status of a generator executable that hit a dangling id.
pub const INTEGRITY_EXIT_CODE: u8 = 3;

/// A generator living in its own executable. It is run as
/// `<program> <snapshot> [<proto>]` and its standard output is the artifact.
/// Exiting with [`INTEGRITY_EXIT_CODE`] reports a dangling id.
#[derive(Debug, Clone)]
pub struct ExternalGenerator {
    program: PathBuf,
}

impl ExternalGenerator {
    pub fn new(program: PathBuf) -> Self {
        ExternalGenerator { program }
    }
}

impl Generator for ExternalGenerator {
    fn generate(&self, ir: &Ir, proto: Option<&str>) -> Result<String, GeneratorError> {
        let snapshot = ir.snapshot_path().ok_or_else(|| {
            GeneratorError::Execution("the IR was not loaded from a snapshot file".to_string())
        })?;

        let mut command = Command::new(&self.program);
        command.arg(snapshot).stdin(Stdio::null());
        if let Some(proto) = proto {
            command.arg(proto);
        }

        let output = command.output().map_err(|e| GeneratorError::Load {
            module: self.program.display().to_string(),
            reason: e.to_string(),
        })?;
        if output.status.code() == Some(i32::from(INTEGRITY_EXIT_CODE)) {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GeneratorError::Integrity(format!(
                "{} found a dangling id: {}",
                self.program.display(),
                stderr.trim()
            )));
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GeneratorError::Execution(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }
        String::from_utf8(output.stdout).map_err(|e| {
            GeneratorError::Execution(format!("{} wrote invalid UTF-8: {}", self.program.display(), e))
        })
    }
}
