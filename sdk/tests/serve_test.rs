#![cfg(test)]

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use protoboil::{run, serve_args, Config, FileNode, GeneratorError, Ir, Node, INTEGRITY_EXIT_CODE};
use tempfile::TempDir;

fn snapshot(dir: &TempDir) -> PathBuf {
    let config = Config {
        logging_file: String::new(),
        path:         dir.path().to_path_buf(),
        ..Config::default()
    };
    let mut ir = Ir::new(config);
    ir.insert(
        ".demo".to_string(),
        Node::File(FileNode {
            name:       "demo.proto".to_string(),
            package:    "demo".to_string(),
            decl:       vec![],
            options:    Default::default(),
            dependency: vec![],
        }),
    );
    ir.push_decl(".demo".to_string());

    let path = dir.path().join("ir.json");
    ir.save(&path).unwrap();
    path
}

fn files(ir: &Ir, proto: Option<&str>) -> Result<String, GeneratorError> {
    let names: Vec<&str> = ir.pool().values().map(|node| node.name()).collect();
    Ok(format!("{} for {}", names.join(","), proto.unwrap_or("all")))
}

#[test]
fn test_run_loads_the_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = snapshot(&dir);

    assert_eq!(run(&files, &path, None).unwrap(), "demo.proto for all");
    assert_eq!(run(&files, &path, Some("demo.proto")).unwrap(), "demo.proto for demo.proto");
}

#[test]
fn test_run_missing_snapshot() {
    let dir = TempDir::new().unwrap();
    let err = run(&files, &dir.path().join("nope.json"), None).unwrap_err();
    assert!(matches!(err, GeneratorError::Snapshot(_)));
}

#[test]
fn test_serve_exit_codes() {
    let dir = TempDir::new().unwrap();
    let path = snapshot(&dir);
    let code = |args: Vec<OsString>| format!("{:?}", serve_args(&files, args));

    assert_eq!(code(vec![]), format!("{:?}", ExitCode::from(2)));
    assert_eq!(code(vec![path.into_os_string()]), format!("{:?}", ExitCode::SUCCESS));
    assert_eq!(
        code(vec![dir.path().join("missing.json").into_os_string()]),
        format!("{:?}", ExitCode::FAILURE)
    );
}

fn ghost(ir: &Ir, _: Option<&str>) -> Result<String, GeneratorError> {
    Ok(ir.lookup(".demo.Ghost").name().to_string())
}

#[test]
fn test_serve_reports_dangling_ids_with_their_own_code() {
    let dir = TempDir::new().unwrap();
    let path = snapshot(&dir);

    let code = serve_args(&ghost, vec![path.into_os_string()]);
    assert_eq!(format!("{:?}", code), format!("{:?}", ExitCode::from(INTEGRITY_EXIT_CODE)));
}

#[test]
#[should_panic(expected = "unrelated")]
fn test_serve_lets_other_panics_through() {
    let dir = TempDir::new().unwrap();
    let path = snapshot(&dir);
    let broken = |_: &Ir, _: Option<&str>| -> Result<String, GeneratorError> { panic!("unrelated") };

    serve_args(&broken, vec![path.into_os_string()]);
}
