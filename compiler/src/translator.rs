use std::collections::HashMap;

use prost_types::{
    source_code_info::Location, DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto,
    FieldDescriptorProto, FileDescriptorProto, MethodDescriptorProto, ServiceDescriptorProto,
};
use protoboil_ir::{
    make_id, Comments, Config, EnumNode, EnumValue, Field, FieldEntry, FileNode, Id, Ir,
    MessageNode, MethodNode, Node, Oneof, ServiceNode,
};
use tracing::{debug, info, warn};

use crate::options::options_of;

/// Field numbers of `descriptor.proto`, used to build source locations.
mod tag {
    pub const FILE_MESSAGE_TYPE:   i32 = 4;
    pub const FILE_ENUM_TYPE:      i32 = 5;
    pub const FILE_SERVICE:        i32 = 6;
    pub const MESSAGE_FIELD:       i32 = 2;
    pub const MESSAGE_NESTED_TYPE: i32 = 3;
    pub const MESSAGE_ENUM_TYPE:   i32 = 4;
    pub const MESSAGE_ONEOF_DECL:  i32 = 8;
    pub const ENUM_VALUE:          i32 = 2;
    pub const SERVICE_METHOD:      i32 = 2;
}

/// Translates the files of a request into a fresh IR.
///
/// Files are walked in order and each declaration gets the id
/// `parent + "." + name`. The walk is deterministic: the same input always
/// yields the same pool and declaration lists.
pub fn translate(files: &[FileDescriptorProto], config: Config) -> Ir {
    let mut translator = Translator { ir: Ir::new(config) };
    for file in files {
        translator.walk_file(file);
    }
    translator.ir
}

struct Translator {
    ir: Ir,
}

/// Comment table of the file being walked, keyed by location path.
struct SourceMap<'a> {
    locations: HashMap<&'a [i32], &'a Location>,
}

impl<'a> SourceMap<'a> {
    fn new(file: &'a FileDescriptorProto) -> Self {
        let mut locations = HashMap::new();
        // protoc can repeat a path; the first location carries the comments.
        for loc in file.source_code_info.iter().flat_map(|info| info.location.iter()) {
            locations.entry(loc.path.as_slice()).or_insert(loc);
        }
        SourceMap { locations }
    }

    fn comments(&self, path: &[i32]) -> Comments {
        match self.locations.get(path) {
            Some(loc) => Comments {
                leading_comments:  loc.leading_comments.clone(),
                trailing_comments: loc.trailing_comments.clone(),
            },
            None => Comments::default(),
        }
    }
}

fn child_path(path: &[i32], tag: i32, index: usize) -> Vec<i32> {
    let mut child = Vec::with_capacity(path.len() + 2);
    child.extend_from_slice(path);
    child.push(tag);
    child.push(index as i32);
    child
}

impl Translator {
    fn walk_file(&mut self, file: &FileDescriptorProto) {
        info!("Chopping \"{}\"", file.name());

        let scope = make_id("", if file.package().is_empty() { file.name() } else { file.package() });
        let source = SourceMap::new(file);

        let mut decl = Vec::new();
        for (i, desc) in file.enum_type.iter().enumerate() {
            decl.push(self.walk_enum(&source, desc, &scope, child_path(&[], tag::FILE_ENUM_TYPE, i)));
        }
        for (i, desc) in file.message_type.iter().enumerate() {
            decl.push(self.walk_message(&source, desc, &scope, child_path(&[], tag::FILE_MESSAGE_TYPE, i)));
        }
        for (i, desc) in file.service.iter().enumerate() {
            decl.push(self.walk_service(&source, desc, &scope, child_path(&[], tag::FILE_SERVICE, i)));
        }

        let node = Node::File(FileNode {
            name:       file.name().to_string(),
            package:    file.package().to_string(),
            decl,
            options:    options_of(&file.options),
            dependency: file.dependency.clone(),
        });

        // Files sharing a package would share the package id; later ones are
        // keyed by file name while their declarations stay under the package.
        let id = if self.ir.contains(&scope) {
            let fallback = make_id("", file.name());
            warn!("\"{}\" shares id {} with an earlier file, stored as {}", file.name(), scope, fallback);
            fallback
        } else {
            scope
        };
        self.insert(id.clone(), node);
        self.ir.push_decl(id);
    }

    fn insert(&mut self, id: Id, node: Node) {
        debug!("{} {}", node.kind(), id);
        if !self.ir.insert(id.clone(), node) {
            warn!("Duplicate id {} ignored", id);
        }
    }

    fn walk_enum(&mut self, source: &SourceMap, desc: &EnumDescriptorProto, parent: &str, path: Vec<i32>) -> Id {
        let id = make_id(parent, desc.name());
        let value = desc
            .value
            .iter()
            .enumerate()
            .map(|(i, v)| enum_value(source, v, child_path(&path, tag::ENUM_VALUE, i)))
            .collect();

        self.insert(
            id.clone(),
            Node::Enum(EnumNode {
                name:     desc.name().to_string(),
                value,
                options:  options_of(&desc.options),
                comments: source.comments(&path),
            }),
        );
        id
    }

    fn walk_message(&mut self, source: &SourceMap, desc: &DescriptorProto, parent: &str, path: Vec<i32>) -> Id {
        let id = make_id(parent, desc.name());

        let mut decl = Vec::new();
        for (i, nested) in desc.enum_type.iter().enumerate() {
            decl.push(self.walk_enum(source, nested, &id, child_path(&path, tag::MESSAGE_ENUM_TYPE, i)));
        }
        for (i, nested) in desc.nested_type.iter().enumerate() {
            decl.push(self.walk_message(source, nested, &id, child_path(&path, tag::MESSAGE_NESTED_TYPE, i)));
        }

        // Plain fields keep their place; oneof members are gathered into
        // their group, and the groups follow the plain fields in the order
        // they are first used.
        let mut plain = Vec::new();
        let mut groups: Vec<(usize, Vec<Field>)> = Vec::new();
        for (i, field_desc) in desc.field.iter().enumerate() {
            let member = field(source, field_desc, child_path(&path, tag::MESSAGE_FIELD, i));
            match field_desc.oneof_index {
                Some(index) => {
                    let index = index as usize;
                    match groups.iter_mut().find(|(k, _)| *k == index) {
                        Some((_, members)) => members.push(member),
                        None => groups.push((index, vec![member])),
                    }
                }
                None => plain.push(FieldEntry::Field(member)),
            }
        }
        for (index, members) in groups {
            let oneof = desc.oneof_decl.get(index);
            plain.push(FieldEntry::Oneof(Oneof {
                name:     oneof.map(|o| o.name().to_string()).unwrap_or_default(),
                field:    members,
                options:  oneof.map(|o| options_of(&o.options)).unwrap_or_default(),
                comments: source.comments(&child_path(&path, tag::MESSAGE_ONEOF_DECL, index)),
            }));
        }

        self.insert(
            id.clone(),
            Node::Message(MessageNode {
                name:     desc.name().to_string(),
                decl,
                field:    plain,
                options:  options_of(&desc.options),
                comments: source.comments(&path),
            }),
        );
        id
    }

    fn walk_service(&mut self, source: &SourceMap, desc: &ServiceDescriptorProto, parent: &str, path: Vec<i32>) -> Id {
        let id = make_id(parent, desc.name());
        let decl = desc
            .method
            .iter()
            .enumerate()
            .map(|(i, m)| self.walk_method(source, m, &id, child_path(&path, tag::SERVICE_METHOD, i)))
            .collect();

        self.insert(
            id.clone(),
            Node::Service(ServiceNode {
                name:     desc.name().to_string(),
                decl,
                options:  options_of(&desc.options),
                comments: source.comments(&path),
            }),
        );
        id
    }

    fn walk_method(&mut self, source: &SourceMap, desc: &MethodDescriptorProto, parent: &str, path: Vec<i32>) -> Id {
        let id = make_id(parent, desc.name());
        self.insert(
            id.clone(),
            Node::Method(MethodNode {
                name:             desc.name().to_string(),
                input:            desc.input_type().to_string(),
                output:           desc.output_type().to_string(),
                client_streaming: desc.client_streaming(),
                server_streaming: desc.server_streaming(),
                options:          options_of(&desc.options),
                comments:         source.comments(&path),
            }),
        );
        id
    }
}

fn enum_value(source: &SourceMap, desc: &EnumValueDescriptorProto, path: Vec<i32>) -> EnumValue {
    EnumValue {
        name:     desc.name().to_string(),
        number:   desc.number(),
        options:  options_of(&desc.options),
        comments: source.comments(&path),
    }
}

fn field(source: &SourceMap, desc: &FieldDescriptorProto, path: Vec<i32>) -> Field {
    let type_ = match desc.type_name() {
        "" => desc.r#type().as_str_name().trim_start_matches("TYPE_").to_string(),
        name => name.to_string(),
    };
    Field {
        name:            desc.name().to_string(),
        type_,
        number:          desc.number(),
        label:           desc.label().as_str_name().trim_start_matches("LABEL_").to_string(),
        proto3_optional: desc.proto3_optional(),
        json_name:       desc.json_name.clone(),
        options:         options_of(&desc.options),
        comments:        source.comments(&path),
    }
}
