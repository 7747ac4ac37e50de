use prost_types::{
    EnumOptions, EnumValueOptions, FieldOptions, FileOptions, MessageOptions, MethodOptions,
    OneofOptions, ServiceOptions,
};
use protoboil_ir::Options;
use serde_json::Value;

/// Flattens a descriptor option message into `name -> raw value`.
///
/// Only the well-known option fields decoded by `prost-types` are visible
/// here; extension (custom) options and uninterpreted options are skipped.
/// Enum-typed options keep their numeric value.
pub trait FlattenOptions {
    fn flatten(&self) -> Options;
}

macro_rules! flatten_fields {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl FlattenOptions for $ty {
            #[allow(unused_mut, deprecated)]
            fn flatten(&self) -> Options {
                let mut options = Options::new();
                $(
                    if let Some(value) = &self.$field {
                        options.insert(stringify!($field).to_string(), Value::from(value.clone()));
                    }
                )*
                options
            }
        }
    };
}

flatten_fields!(FileOptions {
    java_package,
    java_outer_classname,
    java_multiple_files,
    java_generate_equals_and_hash,
    java_string_check_utf8,
    optimize_for,
    go_package,
    cc_generic_services,
    java_generic_services,
    py_generic_services,
    deprecated,
    cc_enable_arenas,
    objc_class_prefix,
    csharp_namespace,
    swift_prefix,
    php_class_prefix,
    php_namespace,
    php_metadata_namespace,
    ruby_package,
});

flatten_fields!(MessageOptions {
    message_set_wire_format,
    no_standard_descriptor_accessor,
    deprecated,
    map_entry,
});

flatten_fields!(FieldOptions { ctype, packed, jstype, lazy, deprecated, weak });

flatten_fields!(OneofOptions {});

flatten_fields!(EnumOptions { allow_alias, deprecated });

flatten_fields!(EnumValueOptions { deprecated });

flatten_fields!(ServiceOptions { deprecated });

flatten_fields!(MethodOptions { deprecated, idempotency_level });

/// Options of an optional option message; empty when the message is unset.
pub fn options_of<T: FlattenOptions>(options: &Option<T>) -> Options {
    options.as_ref().map(FlattenOptions::flatten).unwrap_or_default()
}
