use protoboil_ir::{Filter, Ir, Kind, Options};
use serde::Serialize;

use crate::{error::GeneratorError, traits::Generator};

#[derive(Debug, Serialize)]
struct FileDeps<'a> {
    package:      &'a str,
    filename:     &'a str,
    dependencies: &'a [String],
    options:      &'a Options,
}

/// Emits a JSON manifest of each file's package, imports and options: a
/// single object for a given proto file, an array of all files otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct DepsGenerator;

impl Generator for DepsGenerator {
    fn generate(&self, ir: &Ir, proto: Option<&str>) -> Result<String, GeneratorError> {
        let files: Vec<FileDeps> = ir
            .node_iter(ir.decl(), Some(Filter::kind(Kind::File)))
            .filter_map(|(node, _)| node.as_file())
            .filter(|file| proto.map_or(true, |p| file.name == p))
            .map(|file| FileDeps {
                package:      &file.package,
                filename:     &file.name,
                dependencies: &file.dependency,
                options:      &file.options,
            })
            .collect();

        let json = match proto {
            Some(p) => {
                let file = files.first().ok_or_else(|| {
                    GeneratorError::Execution(format!("no file named \"{}\" in the IR", p))
                })?;
                serde_json::to_string_pretty(file)
            }
            None => serde_json::to_string_pretty(&files),
        };
        json.map(|mut text| {
            text.push('\n');
            text
        })
        .map_err(|e| GeneratorError::Execution(e.to_string()))
    }
}
