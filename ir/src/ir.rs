use std::any::Any;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    config::Config,
    error::IrError,
    logging::{init_logging, LogMode},
    types::{Id, Kind, Node},
};

const DANGLING_ID: &str = "dangling id";

/// True when a panic payload caught with `catch_unwind` was raised by
/// [`Ir::lookup`] missing an id.
pub fn is_dangling_id(payload: &(dyn Any + Send)) -> bool {
    payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .map_or(false, |msg| msg.starts_with(DANGLING_ID))
}

/// The intermediate representation: every declaration keyed by id, the
/// top-level (file) declaration list, and the configuration it was built with.
///
/// Built once by the translator, then only ever read. Generators get their
/// own copy through [`Ir::load`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ir {
    pool:   BTreeMap<Id, Node>,
    decl:   Vec<Id>,
    config: Config,
    #[serde(skip)]
    source: Option<PathBuf>,
}

impl PartialEq for Ir {
    fn eq(&self, other: &Self) -> bool {
        self.pool == other.pool && self.decl == other.decl && self.config == other.config
    }
}

impl Ir {
    pub fn new(config: Config) -> Self {
        Ir {
            config,
            ..Default::default()
        }
    }

    pub fn pool(&self) -> &BTreeMap<Id, Node> {
        &self.pool
    }

    /// Top-level declaration list, one entry per translated file.
    pub fn decl(&self) -> &[Id] {
        &self.decl
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The snapshot file this IR was loaded from, if any.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.pool.contains_key(id)
    }

    /// Adds a node under a fresh id. The pool only grows: an id that is
    /// already taken keeps its node and `false` is returned.
    pub fn insert(&mut self, id: Id, node: Node) -> bool {
        if self.pool.contains_key(&id) {
            return false;
        }
        self.pool.insert(id, node);
        true
    }

    /// Appends a top-level declaration.
    pub fn push_decl(&mut self, id: Id) {
        self.decl.push(id);
    }

    /// Non-fatal lookup.
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.pool.get(id)
    }

    /// Returns the node for `id`.
    ///
    /// # Panics
    ///
    /// A missing id means a reference points outside the pool. Nothing
    /// generated from such an IR can be trusted, so this logs the id and
    /// aborts instead of handing out a placeholder.
    pub fn lookup(&self, id: &str) -> &Node {
        match self.pool.get(id) {
            Some(node) => node,
            None => {
                error!("USR ({}) is not found", id);
                panic!("{} {:?}: not present in the IR pool", DANGLING_ID, id);
            }
        }
    }

    /// Direct evaluator: is `id` a node of `kind`?
    pub fn is_kind(&self, kind: Kind, id: &str) -> bool {
        self.lookup(id).kind() == kind
    }

    /// Direct evaluator: is `id` a node of one of `kinds`?
    pub fn is_kind_in(&self, kinds: &[Kind], id: &str) -> bool {
        kinds.contains(&self.lookup(id).kind())
    }

    /// Writes the snapshot as pretty JSON (4-space indent).
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), IrError> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
        self.serialize(&mut ser)?;
        Ok(())
    }

    /// Restores a snapshot without touching the process environment.
    pub fn read_from<R: Read>(reader: R) -> Result<Ir, IrError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), IrError> {
        info!("Saving \"{}\"", path.display());
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Restores a snapshot and re-applies the configuration it carries, so a
    /// generator started on its own logs where the translator logged.
    pub fn load(path: &Path) -> Result<Ir, IrError> {
        let mut ir = Ir::read_from(BufReader::new(File::open(path)?))?;
        ir.source = Some(path.to_path_buf());
        init_logging(&ir.config, LogMode::Append)?;
        debug!("Loaded \"{}\" ({} nodes)", path.display(), ir.pool.len());
        Ok(ir)
    }
}
