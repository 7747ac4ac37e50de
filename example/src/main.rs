// example/src/main.rs
//
// A generator living in its own executable. Install it under the plugin's
// PATH as `outline.md.gen` and every run produces `outline.md` (or
// `<proto>.md` when the template list binds it to a proto file).

use std::process::ExitCode;

use protoboil::*;

struct Outline;

impl Generator for Outline {
    fn generate(&self, ir: &Ir, proto: Option<&str>) -> Result<String, GeneratorError> {
        let mut out = Emitter::with_unit("  ");
        let files = ir.node_iter(
            ir.decl(),
            [
                Filter::kind(Kind::File),
                Filter::predicate(|id| proto.map_or(true, |p| ir.lookup(id).name() == p)),
            ],
        );

        for (node, _) in files {
            let Some(file) = node.as_file() else { continue };
            out.line(format!("# {}", file.name));
            out.blank();
            if !file.package.is_empty() {
                out.line(format!("Package `{}`", file.package));
                out.blank();
            }
            section(ir, &file.decl, &mut out);
            out.blank();
        }
        Ok(out.finish())
    }
}

fn summary(node: &Node) -> String {
    node.comments()
        .and_then(|c| c.leading_comments.as_deref())
        .and_then(|text| text.lines().map(str::trim).find(|line| !line.is_empty()))
        .map(|line| format!(": {}", line))
        .unwrap_or_default()
}

fn section(ir: &Ir, decl: &[Id], out: &mut Emitter) {
    for (node, id) in ir.node_iter(decl, None) {
        out.line(format!("- {} `{}`{}", node.kind(), id, summary(node)));
        out.indented(|out| {
            match node {
                Node::Message(message) => {
                    for entry in &message.field {
                        match entry {
                            FieldEntry::Field(field) => {
                                out.line(format!("- {} `{}`: {}", field.number, field.name, field.type_));
                            }
                            FieldEntry::Oneof(oneof) => {
                                let members: Vec<&str> = oneof.field.iter().map(|f| f.name.as_str()).collect();
                                out.line(format!("- oneof `{}`: {}", oneof.name, members.join(" | ")));
                            }
                        }
                    }
                }
                Node::Enum(enum_) => {
                    for value in &enum_.value {
                        out.line(format!("- `{}` = {}", value.name, value.number));
                    }
                }
                Node::Method(method) => {
                    out.line(format!("- `{}` -> `{}`", method.input, method.output));
                }
                _ => {}
            }
            section(ir, node.decl(), out);
        });
    }
}

fn main() -> ExitCode {
    serve(Outline)
}
