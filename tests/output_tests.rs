//! Integration tests for per-unit and merged output.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use asc::compiler::testing::{FixtureToolchain, write_fixture};
use asc::prelude::*;
use tempfile::TempDir;

fn session(
    dir: &TempDir,
    configure: impl FnOnce(CompilerOptions) -> CompilerOptions,
) -> CompilationSession<FixtureToolchain> {
    let options = configure(CompilerOptions::default().with_classpath([dir.path()]));
    CompilationSession::new(options, FixtureToolchain::new()).expect("Failed to create session")
}

fn add(session: &mut CompilationSession<FixtureToolchain>, dir: &TempDir, name: &str, text: &str) {
    let path = write_fixture(dir.path(), name, text).expect("Failed to write fixture");
    session.add_file(&path).expect("Failed to add file");
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn merged_library(options: CompilerOptions) -> CompilerOptions {
    options
        .with_mode(DriverMode::Script)
        .with_output(OutputMode::Merged)
}

// =============================================================================
// Per-unit output
// =============================================================================

#[test]
fn test_per_unit_output_starts_with_magic() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut session = session(&dir, |o| o);
    add(&mut session, &dir, "A.as", "class A\nvar x\n");

    let summary = session.run().expect("Failed to run");

    assert_eq!(summary.outputs.len(), 1);
    let bytes = fs::read(dir.path().join("A.abc")).expect("Failed to read A.abc");
    assert_eq!(&bytes[..4], &[0x10, 0x00, 0x2E, 0x00]);
    assert_eq!(&bytes[4..8], &0u32.to_le_bytes());
}

#[test]
fn test_per_unit_output_dir() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let out = tempfile::tempdir().expect("Failed to create temp dir");
    let mut session = session(&dir, |o| o.with_output_dir(out.path()));
    add(&mut session, &dir, "A.as", "class A\n");

    session.run().expect("Failed to run");

    assert!(out.path().join("A.abc").is_file());
    assert!(!dir.path().join("A.abc").exists());
}

#[test]
fn test_write_failure_is_a_unit_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = dir.path().join("no-such-dir");
    let mut session = session(&dir, |o| o.with_output_dir(&missing));
    add(&mut session, &dir, "A.as", "class A\n");
    add(&mut session, &dir, "B.as", "class B\n");

    let summary = session.run().expect("Write failures do not abort the batch");

    assert!(summary.outputs.is_empty());
    assert_eq!(summary.total_errors(), 2);
    let unit = &session.registry()[UnitId::new(0)];
    let message = &unit.context.diagnostics.errors().next().expect("write error").message;
    assert!(message.starts_with("cannot write"));
}

#[test]
fn test_imports_are_never_written() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut session = session(&dir, |o| o);
    let lib = write_fixture(dir.path(), "Lib.as", "class Lib\n").expect("Failed to write");
    session.add_import(&lib).expect("Failed to add import");
    add(&mut session, &dir, "A.as", "class A extends Lib\n");

    let summary = session.run().expect("Failed to run");

    assert_eq!(summary.outputs.len(), 1);
    assert!(dir.path().join("A.abc").is_file());
    assert!(!dir.path().join("Lib.abc").exists());
}

// =============================================================================
// Merged output
// =============================================================================

#[test]
fn test_merged_output_named_after_last_main_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut session = session(&dir, merged_library);
    add(&mut session, &dir, "first.as", "class First\n");
    add(&mut session, &dir, "second.as", "class Second\n");

    let summary = session.run().expect("Failed to run");

    assert_eq!(summary.outputs.len(), 1);
    assert_eq!(file_name(&summary.outputs[0]), "second.abc");
    let main = session.main_emitter().expect("main emitter");
    assert_eq!(main.script_count(), 2);
    assert_eq!(main.class_count(), 2);
    assert!(!dir.path().join("first.abc").exists());
}

#[test]
fn test_merged_output_with_native_stubs() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut session = session(&dir, |o| {
        merged_library(o)
            .with_builtin(true)
            .with_api_versioning(true)
            .with_native_stubs(true)
            .with_output_file("builtin")
            .with_output_dir(dir.path())
    });
    add(&mut session, &dir, "Object.as", "native class Object\nnative function trace\n");
    add(&mut session, &dir, "String.as", "class String extends Object\n");

    let summary = session.run().expect("Failed to run");

    assert_eq!(summary.outputs.len(), 3);
    let bytes = fs::read(dir.path().join("builtin.abc")).expect("Failed to read abc");
    assert_eq!(&bytes[4..8], &1u32.to_le_bytes());

    let header = fs::read_to_string(dir.path().join("builtin.h")).expect("Failed to read header");
    // Object's script was moved behind String's.
    assert!(header.contains("#define ABC_CLASS_Object 1\n"));
    assert!(header.contains("#define ABC_METHOD_trace 0\n"));
    assert!(header.contains("extern const int builtin_abc_script_count;\n"));

    let source = fs::read_to_string(dir.path().join("builtin.cpp")).expect("Failed to read cpp");
    assert!(source.starts_with(&format!("const int builtin_abc_length = {};\n", bytes.len())));
    assert!(source.contains("const int builtin_abc_method_count = 1;\n"));
    assert!(source.contains("const int builtin_abc_script_count = 2;\n"));
    assert!(source.ends_with(" };\n") || source.ends_with("\n};\n"));
}

#[test]
fn test_builtin_moves_first_script_last() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut session = session(&dir, |o| merged_library(o).with_builtin(true));
    add(&mut session, &dir, "a.as", "class A\n");
    add(&mut session, &dir, "b.as", "class B\nvar x\n");

    session.run().expect("Failed to run");

    let main = session.main_emitter().expect("main emitter");
    let last = main.scripts().last().expect("two scripts");
    assert_eq!(last.classes.len(), 1);
    // b.as also initialises a property, so its script is the longer one.
    assert!(main.scripts()[0].chunk.len() > last.chunk.len());
}

#[test]
fn test_merged_output_skipped_when_any_unit_fails() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut session = session(&dir, merged_library);
    add(&mut session, &dir, "ok.as", "class Ok\n");
    add(&mut session, &dir, "bad.as", "class Bad\nerror Syntax error\n");

    let summary = session.run().expect("Failed to run");

    assert!(summary.outputs.is_empty());
    assert!(!dir.path().join("bad.abc").exists());
    assert!(summary.has_errors());
}

struct Reverse;

impl BytecodeOptimizer for Reverse {
    fn optimize(&mut self, mut bytes: Vec<u8>) -> Result<Vec<u8>, OutputError> {
        bytes.reverse();
        Ok(bytes)
    }
}

#[test]
fn test_optimizer_runs_on_merged_bytes() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut session = session(&dir, |o| merged_library(o).with_optimize(true));
    session.set_optimizer(Reverse);
    add(&mut session, &dir, "main.as", "class Main\n");

    session.run().expect("Failed to run");

    let bytes = fs::read(dir.path().join("main.abc")).expect("Failed to read abc");
    assert_eq!(&bytes[bytes.len() - 4..], &[0x00, 0x2E, 0x00, 0x10]);
}

#[derive(Clone, Default)]
struct RecordingPackager(Rc<RefCell<Vec<(PathBuf, String, usize)>>>);

impl Packager for RecordingPackager {
    fn package(&mut self, bytes: &[u8], dir: &Path, name: &str) -> Result<PathBuf, OutputError> {
        self.0
            .borrow_mut()
            .push((dir.to_path_buf(), name.to_string(), bytes.len()));
        Ok(dir.join(format!("{}.swf", name)))
    }
}

#[test]
fn test_packager_replaces_abc_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut session = session(&dir, |o| merged_library(o).with_output_dir(dir.path()));
    let packager = RecordingPackager::default();
    session.set_packager(packager.clone());
    add(&mut session, &dir, "movie.as", "class Movie\n");

    let summary = session.run().expect("Failed to run");

    assert_eq!(summary.outputs, vec![dir.path().join("movie.swf")]);
    assert!(!dir.path().join("movie.abc").exists());
    let calls = packager.0.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, "movie");
}

#[test]
fn test_merged_options_rejected_for_per_unit_output() {
    let result = CompilationSession::new(
        CompilerOptions::default().with_builtin(true),
        FixtureToolchain::new(),
    );
    let err = result.err().expect("builtin requires merged output");
    assert!(matches!(err, CompileError::InvalidOptions(_)));

    let result = CompilationSession::new(
        CompilerOptions::default()
            .with_output(OutputMode::Merged)
            .with_api_versioning(true),
        FixtureToolchain::new(),
    );
    assert!(result.is_err());
}
