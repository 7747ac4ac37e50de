use prost_types::{file_options::OptimizeMode, method_options::IdempotencyLevel};
use protoboil_ir::{
    Comments, Emitter, EnumNode, Field, FieldEntry, FileNode, Filter, Id, Ir, Kind, MessageNode,
    Options, ServiceNode,
};
use serde_json::Value;

use crate::{error::GeneratorError, traits::Generator};

/// Re-emits proto3 source from the IR: one file when a proto file name is
/// given, every translated file otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProtoGenerator;

impl Generator for ProtoGenerator {
    fn generate(&self, ir: &Ir, proto: Option<&str>) -> Result<String, GeneratorError> {
        let mut out = Emitter::new();
        let files = ir.node_iter(
            ir.decl(),
            [
                Filter::kind(Kind::File),
                Filter::predicate(|id| proto.map_or(true, |p| ir.lookup(id).name() == p)),
            ],
        );

        let mut found = false;
        for (node, _) in files {
            if let Some(file) = node.as_file() {
                found = true;
                proto_file(ir, file, &mut out);
            }
        }
        if !found {
            if let Some(proto) = proto {
                return Err(GeneratorError::Execution(format!("no file named \"{}\" in the IR", proto)));
            }
        }
        Ok(out.finish())
    }
}

fn scalar(type_: &str) -> Option<&'static str> {
    Some(match type_ {
        "DOUBLE"   => "double",
        "FLOAT"    => "float",
        "INT64"    => "int64",
        "UINT64"   => "uint64",
        "INT32"    => "int32",
        "FIXED64"  => "fixed64",
        "FIXED32"  => "fixed32",
        "BOOL"     => "bool",
        "STRING"   => "string",
        "GROUP"    => "group",
        "BYTES"    => "bytes",
        "UINT32"   => "uint32",
        "SFIXED32" => "sfixed32",
        "SFIXED64" => "sfixed64",
        "SINT32"   => "sint32",
        "SINT64"   => "sint64",
        _ => return None,
    })
}

fn label(field: &Field) -> &'static str {
    match field.label.as_str() {
        "REPEATED" => "repeated ",
        "REQUIRED" => "required ",
        _ if field.proto3_optional => "optional ",
        _ => "",
    }
}

fn stream(streaming: bool) -> &'static str {
    if streaming {
        "stream "
    } else {
        ""
    }
}

fn leading_comment(comments: &Comments, out: &mut Emitter) {
    if let Some(text) = &comments.leading_comments {
        for line in text.trim_end().lines() {
            out.line(format!("//{}", line));
        }
    }
}

/// `text` as a line, followed by the trailing comment when there is one.
fn line_with_trailing(text: &str, comments: &Comments, out: &mut Emitter) {
    match &comments.trailing_comments {
        Some(trailing) => {
            let joined = trailing.trim_end().lines().collect::<Vec<_>>().join(" ");
            out.line(format!("{} //{}", text, joined));
        }
        None => {
            out.line(text);
        }
    }
}

/// Enum-typed options are stored as numbers; proto source wants the name.
fn option_value(name: &str, value: &Value) -> String {
    let number = value.as_i64().and_then(|n| i32::try_from(n).ok());
    let symbol = number.and_then(|n| match name {
        "optimize_for" => OptimizeMode::try_from(n).ok().map(|mode| mode.as_str_name()),
        "idempotency_level" => IdempotencyLevel::try_from(n).ok().map(|level| level.as_str_name()),
        _ => None,
    });
    symbol.map_or_else(|| value.to_string(), str::to_string)
}

fn option_list(options: &Options, out: &mut Emitter) {
    for (name, value) in options {
        out.line(format!("option {} = {};", name, option_value(name, value)));
    }
}

fn proto_file(ir: &Ir, file: &FileNode, out: &mut Emitter) {
    out.line(format!("// DO NOT EDIT, the file is generated from \"{}\"", file.name));
    out.blank();
    out.line("syntax = \"proto3\";");
    out.blank();
    if !file.package.is_empty() {
        out.line(format!("package {};", file.package));
        out.blank();
    }
    for dependency in &file.dependency {
        out.line(format!("import \"{}\";", dependency));
    }
    if !file.dependency.is_empty() {
        out.blank();
    }
    if !file.options.is_empty() {
        option_list(&file.options, out);
        out.blank();
    }

    for (node, _) in ir.node_iter(&file.decl, Some(Filter::kind(Kind::Service))) {
        if let Some(service) = node.as_service() {
            service_decl(ir, service, out);
        }
    }
    enum_list(ir, &file.decl, out);
    message_list(ir, &file.decl, out);
}

fn service_decl(ir: &Ir, service: &ServiceNode, out: &mut Emitter) {
    leading_comment(&service.comments, out);
    line_with_trailing(&format!("service {} {{", service.name), &service.comments, out);
    out.indented(|out| {
        option_list(&service.options, out);
        for (node, _) in ir.node_iter(&service.decl, Some(Filter::kind(Kind::Method))) {
            let Some(method) = node.as_method() else { continue };
            leading_comment(&method.comments, out);
            let signature = format!(
                "rpc {}({}{}) returns ({}{})",
                method.name,
                stream(method.client_streaming),
                method.input,
                stream(method.server_streaming),
                method.output
            );
            if method.options.is_empty() {
                line_with_trailing(&format!("{};", signature), &method.comments, out);
            } else {
                line_with_trailing(&format!("{} {{", signature), &method.comments, out);
                out.indented(|out| option_list(&method.options, out));
                out.line("}");
            }
        }
    });
    out.line("}");
    out.blank();
}

fn enum_list(ir: &Ir, decl: &[Id], out: &mut Emitter) {
    for (node, _) in ir.node_iter(decl, Some(Filter::kind(Kind::Enum))) {
        if let Some(enum_) = node.as_enum() {
            enum_decl(enum_, out);
        }
    }
}

fn enum_decl(enum_: &EnumNode, out: &mut Emitter) {
    leading_comment(&enum_.comments, out);
    line_with_trailing(&format!("enum {} {{", enum_.name), &enum_.comments, out);
    out.indented(|out| {
        option_list(&enum_.options, out);
        for value in &enum_.value {
            leading_comment(&value.comments, out);
            line_with_trailing(&format!("{} = {};", value.name, value.number), &value.comments, out);
        }
    });
    out.line("}");
    out.blank();
}

fn message_list(ir: &Ir, decl: &[Id], out: &mut Emitter) {
    for (node, _) in ir.node_iter(decl, Some(Filter::kind(Kind::Message))) {
        if let Some(message) = node.as_message() {
            message_decl(ir, message, out);
        }
    }
}

fn message_decl(ir: &Ir, message: &MessageNode, out: &mut Emitter) {
    leading_comment(&message.comments, out);
    line_with_trailing(&format!("message {} {{", message.name), &message.comments, out);
    out.indented(|out| {
        option_list(&message.options, out);
        enum_list(ir, &message.decl, out);
        message_list(ir, &message.decl, out);
        for entry in &message.field {
            field_entry(entry, out);
        }
    });
    out.line("}");
    out.blank();
}

fn field_entry(entry: &FieldEntry, out: &mut Emitter) {
    leading_comment(entry.comments(), out);
    match entry {
        FieldEntry::Field(field) => {
            let type_ = scalar(&field.type_).unwrap_or(field.type_.as_str());
            let text = format!("{}{} {} = {};", label(field), type_, field.name, field.number);
            line_with_trailing(&text, &field.comments, out);
        }
        FieldEntry::Oneof(oneof) => {
            line_with_trailing(&format!("oneof {} {{", oneof.name), &oneof.comments, out);
            out.indented(|out| {
                for field in &oneof.field {
                    leading_comment(&field.comments, out);
                    let type_ = scalar(&field.type_).unwrap_or(field.type_.as_str());
                    let text = format!("{} {} = {};", type_, field.name, field.number);
                    line_with_trailing(&text, &field.comments, out);
                }
            });
            out.line("}");
        }
    }
}
