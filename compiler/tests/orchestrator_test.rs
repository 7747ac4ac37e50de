#![cfg(test)]

mod common;

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use common::*;
use protoboil_compiler::{
    default_catalog, translate, BoilError, Catalog, DirectoryCatalog, GeneratorError, ModuleRef,
    ModuleSource, Orchestrator, Registry, INTEGRITY_EXIT_CODE,
};
use protoboil_ir::{Config, Ir, TemplateSpec};
use tempfile::TempDir;

fn snapshot_in(dir: &Path) -> PathBuf {
    let config = config_in(dir);
    let path = config.snapshot_path();
    translate(&[sample_file()], config).save(&path).expect("save failed");
    path
}

fn pattern(p: &str) -> TemplateSpec {
    TemplateSpec::Pattern(p.to_string())
}

fn with_proto(p: &str, proto: &str) -> TemplateSpec {
    TemplateSpec::WithProto(p.to_string(), proto.to_string())
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register("broken.txt.gen", |_: &Ir, _: Option<&str>| -> Result<String, GeneratorError> {
            Err(GeneratorError::Execution("boom".to_string()))
        })
        .register("names.txt.gen", |ir: &Ir, _: Option<&str>| -> Result<String, GeneratorError> {
            Ok(ir.decl().join("\n"))
        })
        .register("proto.txt.gen", |_: &Ir, proto: Option<&str>| -> Result<String, GeneratorError> {
            Ok(format!("proto={}", proto.unwrap_or("-")))
        });
    registry
}

#[test]
fn test_failing_generator_does_not_stop_the_batch() {
    let dir = TempDir::new().unwrap();
    let snapshot = snapshot_in(dir.path());
    let registry = registry();

    let batch = Orchestrator::new(&registry).run(&[pattern("*.gen")], &snapshot).unwrap();

    let names: Vec<_> = batch.artifacts.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["names.txt", "proto.txt"]);
    assert_eq!(batch.artifacts[0].content, ".p");
    assert_eq!(batch.artifacts[1].content, "proto=-");

    assert!(!batch.is_clean());
    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].module.as_deref(), Some("broken.txt.gen"));
    assert!(matches!(&batch.failures[0].error, GeneratorError::Execution(msg) if msg == "boom"));
}

#[test]
fn test_artifacts_follow_template_order() {
    let dir = TempDir::new().unwrap();
    let snapshot = snapshot_in(dir.path());
    let registry = registry();

    let specs = [
        with_proto("proto.txt.gen", "protos/sample.proto"),
        pattern("names.txt.gen"),
        pattern("nothing-*.gen"),
    ];
    let batch = Orchestrator::new(&registry).run(&specs, &snapshot).unwrap();

    assert!(batch.is_clean());
    let produced: Vec<_> = batch
        .artifacts
        .iter()
        .map(|a| (a.name.as_str(), a.module.as_str(), a.content.as_str()))
        .collect();
    assert_eq!(
        produced,
        [
            ("sample.txt", "proto.txt.gen", "proto=protos/sample.proto"),
            ("names.txt", "names.txt.gen", ".p"),
        ]
    );
}

#[test]
fn test_each_generator_gets_the_loaded_snapshot() {
    let dir = TempDir::new().unwrap();
    let snapshot = snapshot_in(dir.path());
    let expected = snapshot.clone();

    let mut registry = Registry::new();
    registry.register("check.gen", move |ir: &Ir, _: Option<&str>| -> Result<String, GeneratorError> {
        assert_eq!(ir.snapshot_path(), Some(expected.as_path()));
        assert!(ir.contains(".p.M"));
        Ok(String::new())
    });

    let batch = Orchestrator::new(&registry).run(&[pattern("check.gen"), pattern("check.gen")], &snapshot).unwrap();
    assert_eq!(batch.artifacts.len(), 2);
    assert!(batch.is_clean());
}

#[test]
fn test_missing_snapshot_fails_each_module() {
    let dir = TempDir::new().unwrap();
    let registry = registry();

    let batch = Orchestrator::new(&registry).run(&[pattern("n*.gen")], &dir.path().join("absent.json")).unwrap();
    assert!(batch.artifacts.is_empty());
    assert_eq!(batch.failures.len(), 1);
    assert!(matches!(batch.failures[0].error, GeneratorError::Snapshot(_)));
}

#[test]
fn test_bad_pattern_is_a_discovery_failure() {
    let dir = TempDir::new().unwrap();
    let snapshot = snapshot_in(dir.path());
    let registry = registry();

    let batch = Orchestrator::new(&registry).run(&[pattern("[*.gen"), pattern("names.txt.gen")], &snapshot).unwrap();
    assert_eq!(batch.artifacts.len(), 1);
    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].pattern, "[*.gen");
    assert!(batch.failures[0].module.is_none());
    assert!(matches!(batch.failures[0].error, GeneratorError::Discover { .. }));
}

#[test]
fn test_output_names() {
    let module = ModuleRef {
        name:   "builtin/stub.cpp.gen".to_string(),
        source: ModuleSource::Builtin,
    };
    assert_eq!(module.file_name(), "stub.cpp.gen");
    assert_eq!(module.stem(), "stub.cpp");
    assert_eq!(module.target_suffix(), ".cpp");
    assert_eq!(module.output_name(None), "stub.cpp");
    assert_eq!(module.output_name(Some("api/v1/service.proto")), "service.cpp");

    let bare = ModuleRef {
        name:   "README.gen".to_string(),
        source: ModuleSource::Builtin,
    };
    assert_eq!(bare.output_name(None), "README");
    assert_eq!(bare.output_name(Some("x.proto")), "x");
}

#[test]
fn test_directory_catalog_discovery_and_load() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::create_dir(dir.path().join("folder.gen")).unwrap();
    fs::write(dir.path().join("b.md.gen"), "").unwrap();
    fs::write(dir.path().join("a.md.gen"), "").unwrap();
    fs::write(dir.path().join("notes.txt"), "").unwrap();
    fs::write(dir.path().join("sub").join("c.md.gen"), "").unwrap();

    let catalog = DirectoryCatalog::new(dir.path());
    let names = |pattern: &str| -> Vec<String> {
        catalog.discover(pattern).unwrap().into_iter().map(|m| m.name).collect()
    };
    assert_eq!(names("*.gen"), ["a.md.gen", "b.md.gen"]);
    assert_eq!(names("sub/*.gen"), ["sub/c.md.gen"]);
    assert!(names("*.none").is_empty());

    // Plain data files are found but cannot be run.
    let module = catalog.discover("a.md.gen").unwrap().remove(0);
    assert!(catalog.owns(&module));
    assert!(matches!(catalog.load(&module), Err(GeneratorError::Load { .. })));
}

#[test]
fn test_default_catalog_lists_builtins_first() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("builtin")).unwrap();
    fs::write(dir.path().join("builtin").join("extra.json.gen"), "").unwrap();

    let config = Config {
        path: dir.path().to_path_buf(),
        ..Config::default()
    };
    let catalog = default_catalog(&config);
    let modules = catalog.discover("builtin/*.gen").unwrap();
    let names: Vec<_> = modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["builtin/proto_to.proto.gen", "builtin/deps.json.gen", "builtin/extra.json.gen"]);

    assert!(catalog.load(&modules[0]).is_ok());
    assert!(matches!(catalog.load(&modules[2]), Err(GeneratorError::Load { .. })));

    let stray = ModuleRef {
        name:   "builtin/unknown.gen".to_string(),
        source: ModuleSource::Builtin,
    };
    assert!(!catalog.owns(&stray));
    assert!(catalog.load(&stray).is_err());
}

#[cfg(unix)]
#[test]
fn test_executable_generators() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let snapshot = snapshot_in(dir.path());

    let scripts = [
        ("args.txt.gen", "#!/bin/sh\nprintf 'snapshot=%s proto=%s' \"$1\" \"$2\"\n"),
        ("fail.txt.gen", "#!/bin/sh\necho 'cannot boil' >&2\nexit 4\n"),
    ];
    for (name, body) in scripts {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    let catalog = DirectoryCatalog::new(dir.path());
    let batch = Orchestrator::new(&catalog).run(&[with_proto("*.txt.gen", "shapes.proto")], &snapshot).unwrap();

    assert_eq!(batch.artifacts.len(), 1);
    assert_eq!(batch.artifacts[0].name, "shapes.txt");
    assert_eq!(
        batch.artifacts[0].content,
        format!("snapshot={} proto=shapes.proto", snapshot.display())
    );

    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].module.as_deref(), Some("fail.txt.gen"));
    match &batch.failures[0].error {
        GeneratorError::Execution(msg) => assert!(msg.contains("cannot boil")),
        other => panic!("unexpected error {:?}", other),
    }

    // An executable reporting a dangling id stops the batch: nothing after
    // it runs and no artifact is returned.
    let strict = dir.path().join("strict");
    fs::create_dir(&strict).unwrap();
    let scripts = [
        ("a_ghost.md.gen", format!("#!/bin/sh\necho 'USR (.p.Ghost) is not found' >&2\nexit {}\n", INTEGRITY_EXIT_CODE)),
        ("b_marker.md.gen", format!("#!/bin/sh\ntouch '{}'\n", strict.join("ran").display())),
    ];
    for (name, body) in scripts {
        let path = strict.join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    let catalog = DirectoryCatalog::new(&strict);
    match Orchestrator::new(&catalog).run(&[pattern("*.md.gen")], &snapshot) {
        Err(BoilError::Integrity { module, source }) => {
            assert_eq!(module, "a_ghost.md.gen");
            assert!(matches!(&source, GeneratorError::Integrity(msg) if msg.contains(".p.Ghost")));
        }
        other => panic!("expected the run to abort, got {:?}", other),
    }
    assert!(!strict.join("ran").exists());
}

#[test]
fn test_dangling_id_aborts_the_batch() {
    let dir = TempDir::new().unwrap();
    let snapshot = snapshot_in(dir.path());
    let runs = Rc::new(Cell::new(0));

    let mut registry = Registry::new();
    let counter = Rc::clone(&runs);
    registry
        .register("a_first.txt.gen", |_: &Ir, _: Option<&str>| -> Result<String, GeneratorError> {
            Ok("first".to_string())
        })
        .register("b_ghost.txt.gen", |_: &Ir, _: Option<&str>| -> Result<String, GeneratorError> {
            Err(GeneratorError::Integrity(".p.Ghost".to_string()))
        })
        .register("c_last.txt.gen", move |_: &Ir, _: Option<&str>| -> Result<String, GeneratorError> {
            counter.set(counter.get() + 1);
            Ok("last".to_string())
        });

    let result = Orchestrator::new(&registry).run(&[pattern("*.gen")], &snapshot);
    assert!(matches!(
        result,
        Err(BoilError::Integrity { ref module, .. }) if module == "b_ghost.txt.gen"
    ));
    assert_eq!(runs.get(), 0);
}
