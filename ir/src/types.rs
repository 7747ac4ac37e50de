use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Dotted path keying a declaration in the pool, e.g. `.pkg.Outer.Inner`.
pub type Id = String;

/// Flattened option list: option name to its raw value.
pub type Options = BTreeMap<String, serde_json::Value>;

/// Builds the id of `name` declared inside `parent` (`""` for the root).
pub fn make_id(parent: &str, name: &str) -> Id {
    format!("{}.{}", parent, name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Kind {
    File,
    Message,
    Enum,
    Service,
    Method,
    Field,
    Oneof,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::File    => "FILE",
            Kind::Message => "MESSAGE",
            Kind::Enum    => "ENUM",
            Kind::Service => "SERVICE",
            Kind::Method  => "METHOD",
            Kind::Field   => "FIELD",
            Kind::Oneof   => "ONEOF",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source comments attached to a declaration. Both halves are absent, not
/// empty, when the source location table has no entry for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comments {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leading_comments:  Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_comments: Option<String>,
}

impl Comments {
    pub fn is_empty(&self) -> bool {
        self.leading_comments.is_none() && self.trailing_comments.is_none()
    }
}

/// A pool entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum Node {
    File(FileNode),
    Message(MessageNode),
    Enum(EnumNode),
    Service(ServiceNode),
    Method(MethodNode),
}

impl Node {
    pub fn kind(&self) -> Kind {
        match self {
            Node::File(_)    => Kind::File,
            Node::Message(_) => Kind::Message,
            Node::Enum(_)    => Kind::Enum,
            Node::Service(_) => Kind::Service,
            Node::Method(_)  => Kind::Method,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::File(n)    => &n.name,
            Node::Message(n) => &n.name,
            Node::Enum(n)    => &n.name,
            Node::Service(n) => &n.name,
            Node::Method(n)  => &n.name,
        }
    }

    pub fn options(&self) -> &Options {
        match self {
            Node::File(n)    => &n.options,
            Node::Message(n) => &n.options,
            Node::Enum(n)    => &n.options,
            Node::Service(n) => &n.options,
            Node::Method(n)  => &n.options,
        }
    }

    /// Comments of the node; files never carry any.
    pub fn comments(&self) -> Option<&Comments> {
        match self {
            Node::File(_)    => None,
            Node::Message(n) => Some(&n.comments),
            Node::Enum(n)    => Some(&n.comments),
            Node::Service(n) => Some(&n.comments),
            Node::Method(n)  => Some(&n.comments),
        }
    }

    /// Ids of the declarations nested in this node, if it is a scope.
    pub fn decl(&self) -> &[Id] {
        match self {
            Node::File(n)    => &n.decl,
            Node::Message(n) => &n.decl,
            Node::Service(n) => &n.decl,
            Node::Enum(_) | Node::Method(_) => &[],
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Node::File(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&MessageNode> {
        match self {
            Node::Message(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumNode> {
        match self {
            Node::Enum(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&ServiceNode> {
        match self {
            Node::Service(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodNode> {
        match self {
            Node::Method(n) => Some(n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    pub name:       String,
    pub package:    String,
    pub decl:       Vec<Id>,
    #[serde(default)]
    pub options:    Options,
    #[serde(default)]
    pub dependency: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageNode {
    pub name:     String,
    pub decl:     Vec<Id>,
    pub field:    Vec<FieldEntry>,
    #[serde(default, skip_serializing_if = "Options::is_empty")]
    pub options:  Options,
    #[serde(flatten)]
    pub comments: Comments,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumNode {
    pub name:     String,
    pub value:    Vec<EnumValue>,
    #[serde(default, skip_serializing_if = "Options::is_empty")]
    pub options:  Options,
    #[serde(flatten)]
    pub comments: Comments,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    pub name:     String,
    pub number:   i32,
    #[serde(default, skip_serializing_if = "Options::is_empty")]
    pub options:  Options,
    #[serde(flatten)]
    pub comments: Comments,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceNode {
    pub name:     String,
    pub decl:     Vec<Id>,
    #[serde(default, skip_serializing_if = "Options::is_empty")]
    pub options:  Options,
    #[serde(flatten)]
    pub comments: Comments,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodNode {
    pub name:             String,
    pub input:            Id,
    pub output:           Id,
    pub client_streaming: bool,
    pub server_streaming: bool,
    #[serde(default)]
    pub options:          Options,
    #[serde(flatten)]
    pub comments:         Comments,
}

/// One entry of a message field list: a plain field or a oneof group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum FieldEntry {
    Field(Field),
    Oneof(Oneof),
}

impl FieldEntry {
    pub fn kind(&self) -> Kind {
        match self {
            FieldEntry::Field(_) => Kind::Field,
            FieldEntry::Oneof(_) => Kind::Oneof,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FieldEntry::Field(f) => &f.name,
            FieldEntry::Oneof(o) => &o.name,
        }
    }

    pub fn comments(&self) -> &Comments {
        match self {
            FieldEntry::Field(f) => &f.comments,
            FieldEntry::Oneof(o) => &o.comments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name:            String,
    /// Scalar token (`INT32`, `STRING`, ...) or the id of a message/enum.
    #[serde(rename = "type")]
    pub type_:           String,
    pub number:          i32,
    pub label:           String,
    #[serde(default)]
    pub proto3_optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_name:       Option<String>,
    #[serde(default, skip_serializing_if = "Options::is_empty")]
    pub options:         Options,
    #[serde(flatten)]
    pub comments:        Comments,
}

impl Field {
    pub fn is_repeated(&self) -> bool {
        self.label == "REPEATED"
    }

    /// True when the type refers to another declaration instead of a scalar.
    pub fn is_reference(&self) -> bool {
        self.type_.starts_with('.')
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Oneof {
    pub name:     String,
    pub field:    Vec<Field>,
    #[serde(default, skip_serializing_if = "Options::is_empty")]
    pub options:  Options,
    #[serde(flatten)]
    pub comments: Comments,
}
