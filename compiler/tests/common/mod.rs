#![allow(dead_code)]

use prost_types::{
    field_descriptor_proto::{Label, Type},
    source_code_info::Location,
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, MethodDescriptorProto, OneofDescriptorProto, ServiceDescriptorProto,
    SourceCodeInfo,
};
use protoboil_ir::Config;

/// A configuration that logs to stderr and keeps every file under `dir`.
pub fn config_in(dir: &std::path::Path) -> Config {
    Config {
        logging_file: String::new(),
        path: dir.to_path_buf(),
        ..Config::default()
    }
}

pub fn scalar(name: &str, number: i32, type_: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name:   Some(name.to_string()),
        number: Some(number),
        label:  Some(Label::Optional as i32),
        r#type: Some(type_ as i32),
        ..Default::default()
    }
}

pub fn reference(name: &str, number: i32, type_: Type, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(type_name.to_string()),
        ..scalar(name, number, type_)
    }
}

pub fn repeated(field: FieldDescriptorProto) -> FieldDescriptorProto {
    FieldDescriptorProto {
        label: Some(Label::Repeated as i32),
        ..field
    }
}

pub fn in_oneof(field: FieldDescriptorProto, index: i32) -> FieldDescriptorProto {
    FieldDescriptorProto {
        oneof_index: Some(index),
        ..field
    }
}

pub fn oneof(name: &str) -> OneofDescriptorProto {
    OneofDescriptorProto {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

pub fn message(name: &str, field: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field,
        ..Default::default()
    }
}

pub fn enum_(name: &str, values: &[(&str, i32)]) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name:  Some(name.to_string()),
        value: values
            .iter()
            .map(|(name, number)| EnumValueDescriptorProto {
                name:   Some(name.to_string()),
                number: Some(*number),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

pub fn service(name: &str, method: Vec<MethodDescriptorProto>) -> ServiceDescriptorProto {
    ServiceDescriptorProto {
        name: Some(name.to_string()),
        method,
        ..Default::default()
    }
}

pub fn method(name: &str, input: &str, output: &str, server_streaming: bool) -> MethodDescriptorProto {
    MethodDescriptorProto {
        name:             Some(name.to_string()),
        input_type:       Some(input.to_string()),
        output_type:      Some(output.to_string()),
        server_streaming: Some(server_streaming),
        ..Default::default()
    }
}

pub fn location(path: &[i32], leading: Option<&str>, trailing: Option<&str>) -> Location {
    Location {
        path:              path.to_vec(),
        leading_comments:  leading.map(str::to_string),
        trailing_comments: trailing.map(str::to_string),
        ..Default::default()
    }
}

pub fn file(name: &str, package: &str) -> FileDescriptorProto {
    FileDescriptorProto {
        name:    Some(name.to_string()),
        package: if package.is_empty() { None } else { Some(package.to_string()) },
        syntax:  Some("proto3".to_string()),
        ..Default::default()
    }
}

/// `package p; enum E { A = 0; B = 1; } message M { int32 x = 1; oneof o { string y = 2; } }`
pub fn sample_file() -> FileDescriptorProto {
    let mut m = message(
        "M",
        vec![scalar("x", 1, Type::Int32), in_oneof(scalar("y", 2, Type::String), 0)],
    );
    m.oneof_decl.push(oneof("o"));

    FileDescriptorProto {
        enum_type:    vec![enum_("E", &[("A", 0), ("B", 1)])],
        message_type: vec![m],
        ..file("p.proto", "p")
    }
}

pub fn with_comments(mut file: FileDescriptorProto, locations: Vec<Location>) -> FileDescriptorProto {
    file.source_code_info = Some(SourceCodeInfo { location: locations });
    file
}
