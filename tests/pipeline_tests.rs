//! Integration tests for the resolution pipeline, driven through
//! `CompilationSession` with the fixture toolchain over temporary files.

use std::path::{Path, PathBuf};

use asc::compiler::testing::{FixtureToolchain, Journal, Phase, write_fixture};
use asc::prelude::*;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A temporary source tree plus a session over it.
struct Fixture {
    dir: TempDir,
    session: CompilationSession<FixtureToolchain>,
}

impl Fixture {
    fn new(configure: impl FnOnce(CompilerOptions) -> CompilerOptions) -> Self {
        init_tracing();
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let options = configure(CompilerOptions::default().with_classpath([dir.path()]));
        let session = CompilationSession::new(options, FixtureToolchain::new())
            .expect("Failed to create session");
        Self { dir, session }
    }

    fn batch() -> Self {
        Self::new(|options| options)
    }

    fn script() -> Self {
        Self::new(|options| options.with_mode(DriverMode::Script))
    }

    fn write(&self, relative: &str, text: &str) -> PathBuf {
        write_fixture(self.dir.path(), relative, text).expect("Failed to write fixture")
    }

    fn add(&mut self, relative: &str, text: &str) -> UnitId {
        let path = self.write(relative, text);
        self.session.add_file(&path).expect("Failed to add file")
    }

    fn run(&mut self) -> BatchSummary {
        self.session.run().expect("Failed to run pipeline")
    }

    fn journal(&self) -> Journal {
        self.session.toolchain().journal().clone()
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// File names in current registry order.
    fn order(&self) -> Vec<String> {
        self.session
            .registry()
            .iter()
            .map(|(_, unit)| unit.file_name().to_string())
            .collect()
    }

    fn id_of(&self, file_name: &str) -> UnitId {
        self.session
            .registry()
            .iter()
            .find(|(_, unit)| unit.file_name() == file_name)
            .map(|(id, _)| id)
            .unwrap_or_else(|| panic!("{} not registered", file_name))
    }

    fn errors_in(&self, summary: &BatchSummary, relative: &str) -> Option<usize> {
        let canonical = std::fs::canonicalize(self.path(relative)).ok()?;
        summary.errors_in(&canonical)
    }
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    let mut names: Vec<String> = paths
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn edge_keys(edges: &EdgeSet) -> Vec<(UnitId, UnitId)> {
    edges.iter().map(|edge| edge.key()).collect()
}

// =============================================================================
// Inheritance ordering
// =============================================================================

#[test]
fn test_base_class_sorted_before_subclass() {
    let mut fx = Fixture::batch();
    fx.add("A.as", "class A extends B\n");
    fx.add("B.as", "class B\n");

    let summary = fx.run();

    assert_eq!(fx.order(), vec!["B.as", "A.as"]);
    let a = fx.id_of("A.as");
    let b = fx.id_of("B.as");
    let inheritance = &fx.session.edges().inheritance;
    assert_eq!(edge_keys(inheritance), vec![(a, b)]);
    assert!(inheritance.get(a, b).expect("edge A -> B").processed);

    assert_eq!(file_names(&summary.outputs), vec!["A.abc", "B.abc"]);
    assert!(fx.path("A.abc").is_file());
    assert!(fx.path("B.abc").is_file());
    assert!(summary.unresolved.is_empty());
    assert!(summary.circular.is_empty());
    assert_eq!(summary.files, 2);
}

#[test]
fn test_inherited_slots_linked_once() {
    let mut fx = Fixture::batch();
    fx.add("A.as", "class A extends B\n");
    fx.add("B.as", "class B\nvar shared\n");

    fx.run();

    let a = fx.id_of("A.as");
    let unit = &fx.session.registry()[a];
    let frame = &unit.program.as_ref().expect("A parsed").frame;
    let slot = frame
        .builder
        .lookup("shared", &Namespace::public(""), BindingKind::Get)
        .expect("inherited binding");
    assert!(slot.inherited);

    let journal = fx.journal();
    assert_eq!(journal.count("A.as", Phase::FirstPass), 1);
    assert_eq!(journal.count("A.as", Phase::SecondPass), 1);
    assert_eq!(journal.count("A.as", Phase::Codegen), 1);
}

#[test]
fn test_circular_inheritance_reported_without_reordering() {
    let mut fx = Fixture::batch();
    fx.add("A.as", "class A extends B\n");
    fx.add("B.as", "class B extends A\n");

    let summary = fx.run();

    assert_eq!(fx.order(), vec!["A.as", "B.as"]);
    assert_eq!(file_names(&summary.circular), vec!["A.as", "B.as"]);
    let circular: Vec<_> = fx
        .session
        .diagnostics()
        .warnings()
        .filter(|d| d.message.ends_with(" in circular reference"))
        .collect();
    assert_eq!(circular.len(), 2);
    assert!(!summary.has_errors());
    assert_eq!(summary.outputs.len(), 2);
}

#[test]
fn test_circular_reference_diagnosed_once_across_iterations() {
    let mut fx = Fixture::batch();
    fx.write("C.as", "class C\n");
    fx.add("A.as", "class A extends B\nuses C\n");
    fx.add("B.as", "class B extends A\n");

    let summary = fx.run();

    // C.as is discovered after the first sort, so the cycle is sorted twice.
    assert_eq!(fx.order(), vec!["A.as", "B.as", "C.as"]);
    assert_eq!(file_names(&summary.circular), vec!["A.as", "B.as"]);
    let circular = fx
        .session
        .diagnostics()
        .warnings()
        .filter(|d| d.message.ends_with(" in circular reference"))
        .count();
    assert_eq!(circular, 2);
}

// =============================================================================
// Reference resolution
// =============================================================================

#[test]
fn test_unresolved_global_is_reported_not_fatal() {
    let mut fx = Fixture::batch();
    fx.add("A.as", "class A\nuses Foo\n");

    let summary = fx.run();

    assert_eq!(summary.unresolved.len(), 1);
    let report = &summary.unresolved[0];
    assert_eq!(report.reference.name, "Foo");
    assert!(report.message.starts_with("[public]::Foo in "));
    assert!(report.message.ends_with("A.as not resolved"));

    assert_eq!(fx.errors_in(&summary, "A.as"), Some(0));
    assert!(fx.journal().ran("A.as", Phase::Codegen));
    assert!(fx.path("A.abc").is_file());
    assert_eq!(fx.session.diagnostics().warning_count(), 1);
    assert!(!fx.session.diagnostics().has_errors());
}

#[test]
fn test_namespace_order_beats_registration_order() {
    let mut fx = Fixture::batch();
    fx.add("Y.as", "package nsB\nclass Thing\n");
    fx.add("X.as", "package nsA\nclass Thing\n");
    fx.add("A.as", "import nsA\nimport nsB\nclass A\nuses Thing\n");

    let summary = fx.run();

    assert!(summary.unresolved.is_empty());
    let a = fx.id_of("A.as");
    let x = fx.id_of("X.as");
    let y = fx.id_of("Y.as");
    let types = &fx.session.edges().types;
    assert!(types.contains(a, x));
    assert!(!types.contains(a, y));
    assert!(types.get(a, x).expect("edge A -> X").processed);
}

#[test]
fn test_self_reference_records_no_edge() {
    let mut fx = Fixture::batch();
    fx.add("A.as", "class A\nvar next: A\n");

    let summary = fx.run();

    assert!(summary.unresolved.is_empty());
    assert!(fx.session.edges().types.is_empty());
}

// =============================================================================
// Classpath fallback and termination
// =============================================================================

#[test]
fn test_classpath_discovers_base_class() {
    let mut fx = Fixture::batch();
    fx.write("lib/Base.as", "package lib\nclass Base\n");
    fx.add("A.as", "import lib\nclass A extends Base\n");

    let summary = fx.run();

    assert_eq!(summary.files, 2);
    assert_eq!(fx.order(), vec!["Base.as", "A.as"]);
    let base = fx.id_of("Base.as");
    assert_eq!(fx.session.registry()[base].origin, UnitOrigin::Classpath);
    assert_eq!(fx.journal().count("Base.as", Phase::Parse), 1);
    assert!(fx.path("lib/Base.abc").is_file());
    assert!(summary.unresolved.is_empty());
}

#[test]
fn test_shared_classpath_dependency_admitted_once() {
    let mut fx = Fixture::batch();
    fx.write("Common.as", "class Common\nuses A\n");
    fx.write("Leaf.as", "class Leaf extends Common\n");
    fx.add("A.as", "class A extends Common\nuses Leaf\n");
    fx.add("B.as", "class B extends Common\ncall Leaf\n");

    let summary = fx.run();

    assert_eq!(summary.files, 4);
    let journal = fx.journal();
    for file in ["A.as", "B.as", "Common.as", "Leaf.as"] {
        assert_eq!(journal.count(file, Phase::Parse), 1, "{} parsed once", file);
        assert_eq!(journal.count(file, Phase::Codegen), 1, "{} generated once", file);
    }
    let order = fx.order();
    let common = order.iter().position(|f| f == "Common.as");
    let leaf = order.iter().position(|f| f == "Leaf.as");
    assert!(common < leaf);
    assert!(summary.unresolved.is_empty());
}

#[test]
fn test_chain_discovered_across_iterations() {
    let mut fx = Fixture::batch();
    fx.write("C3.as", "class C3\n");
    fx.write("C2.as", "class C2 extends C3\n");
    fx.write("C1.as", "class C1 extends C2\n");
    fx.add("C0.as", "class C0 extends C1\n");

    let summary = fx.run();

    assert_eq!(summary.files, 4);
    assert_eq!(fx.order(), vec!["C3.as", "C2.as", "C1.as", "C0.as"]);
    assert_eq!(summary.outputs.len(), 4);
}

// =============================================================================
// Error gating
// =============================================================================

#[test]
fn test_unit_with_parse_error_skips_later_phases() {
    let mut fx = Fixture::batch();
    fx.add("Bad.as", "class Bad\nerror Syntax error: expecting rightbrace\n");
    fx.add("Good.as", "class Good\n");

    let summary = fx.run();
    let journal = fx.journal();

    assert!(!journal.ran("Bad.as", Phase::FirstPass));
    assert!(!journal.ran("Bad.as", Phase::Constants));
    assert!(!journal.ran("Bad.as", Phase::Codegen));
    assert!(journal.ran("Good.as", Phase::Constants));
    assert!(journal.ran("Good.as", Phase::Codegen));

    assert!(!fx.path("Bad.abc").exists());
    assert!(fx.path("Good.abc").is_file());
    assert_eq!(fx.errors_in(&summary, "Bad.as"), Some(1));
    assert_eq!(fx.errors_in(&summary, "Good.as"), Some(0));
    assert_eq!(summary.total_errors(), 1);
}

#[test]
fn test_codegen_failure_suppresses_unit_output() {
    let mut fx = Fixture::batch();
    fx.add("Broken.as", "class Broken\nfail codegen\n");

    let summary = fx.run();

    assert!(fx.journal().ran("Broken.as", Phase::Codegen));
    assert!(summary.outputs.is_empty());
    assert!(!fx.path("Broken.abc").exists());
    assert_eq!(fx.errors_in(&summary, "Broken.as"), Some(1));
}

#[test]
fn test_missing_input_is_skipped_with_warning() {
    let mut fx = Fixture::batch();
    let missing = fx.path("Missing.as");

    assert_eq!(fx.session.add_file(&missing), None);
    assert_eq!(fx.session.diagnostics().warning_count(), 1);

    let summary = fx.run();
    assert_eq!(summary.files, 0);
}

// =============================================================================
// Script driver
// =============================================================================

#[test]
fn test_script_mode_silences_runtime_misses() {
    let mut fx = Fixture::script();
    fx.add("A.as", "class A\ncall missing\nattr id\n");

    let summary = fx.run();

    assert!(summary.unresolved.is_empty());
    assert!(fx.journal().ran("A.as", Phase::Configuration));
    assert!(fx.journal().ran("A.as", Phase::Metadata));
}

#[test]
fn test_batch_mode_reports_runtime_misses() {
    let mut fx = Fixture::batch();
    fx.add("A.as", "class A\ncall missing\nattr id\n");

    let summary = fx.run();

    let names: Vec<_> = summary
        .unresolved
        .iter()
        .map(|r| r.reference.name.as_str())
        .collect();
    assert_eq!(names, vec!["missing", "id"]);
    assert!(!fx.journal().ran("A.as", Phase::Configuration));
    assert!(!fx.journal().ran("A.as", Phase::Metadata));
}

#[test]
fn test_script_mode_annotates_line_numbers() {
    let mut fx = Fixture::script();
    let path = fx.write("A.as", "class A\n\nuses Missing\n");
    fx.session.add_file(&path).expect("Failed to add file");

    let summary = fx.run();

    assert_eq!(summary.unresolved.len(), 1);
    let message = &summary.unresolved[0].message;
    assert!(message.starts_with("[public]::Missing on line 3 of file "));
    assert!(message.ends_with("A.as not resolved"));
}

#[test]
fn test_script_mode_records_expression_edges() {
    let mut fx = Fixture::script();
    fx.add("A.as", "class A\ncall helper\n");
    fx.add("H.as", "function helper\n");

    fx.run();

    let a = fx.id_of("A.as");
    let h = fx.id_of("H.as");
    let expressions = &fx.session.edges().expressions;
    assert_eq!(edge_keys(expressions), vec![(a, h)]);
    assert!(expressions.get(a, h).expect("edge A -> H").processed);

    let frame = &fx.session.registry()[a].program.as_ref().expect("A parsed").frame;
    assert!(
        frame
            .builder
            .names()
            .contains("helper", &Namespace::public(""), BindingKind::Method)
    );
}

#[test]
fn test_batch_mode_records_no_expression_edges() {
    let mut fx = Fixture::batch();
    fx.add("A.as", "class A\ncall helper\n");
    fx.add("H.as", "function helper\n");

    let summary = fx.run();

    assert!(summary.unresolved.is_empty());
    assert!(fx.session.edges().expressions.is_empty());
}

#[test]
fn test_script_mode_links_bytecode_imports() {
    let mut fx = Fixture::script();
    let lib1 = fx.write("lib1.abc", "class L1\n");
    let lib2 = fx.write("lib2.abc", "class L2\n");
    let first = fx.session.add_import(&lib1).expect("Failed to add import");
    let second = fx.session.add_import(&lib2).expect("Failed to add import");
    fx.add("M.as", "class M extends L2\n");

    let summary = fx.run();

    let inheritance = &fx.session.edges().inheritance;
    assert!(inheritance.contains(second, first));
    assert!(!inheritance.contains(first, second));

    let journal = fx.journal();
    assert!(!journal.ran("lib1.abc", Phase::Codegen));
    assert!(journal.ran("M.as", Phase::Codegen));
    assert_eq!(file_names(&summary.outputs), vec!["M.abc"]);
}

#[test]
fn test_two_phase_constants_gate_on_preprocess_errors() {
    let mut fx = Fixture::new(|options| {
        options
            .with_mode(DriverMode::Script)
            .with_output(OutputMode::Merged)
    });
    fx.add("P.as", "class P\nfail preprocess\n");
    fx.add("Q.as", "class Q\n");

    let summary = fx.run();
    let journal = fx.journal();

    assert_eq!(journal.files(Phase::Preprocess), vec!["P.as", "Q.as"]);
    assert_eq!(journal.files(Phase::Constants), vec!["Q.as"]);
    assert!(!journal.ran("P.as", Phase::Codegen));
    assert!(summary.outputs.is_empty());
    assert!(!fx.path("Q.abc").exists());
}

#[test]
fn test_two_phase_constants_include_bytecode_imports() {
    let mut fx = Fixture::new(|options| {
        options
            .with_mode(DriverMode::Script)
            .with_output(OutputMode::Merged)
    });
    let lib = fx.write("lib.abc", "class L\n");
    fx.session.add_import(&lib).expect("Failed to add import");
    fx.add("M.as", "class M extends L\n");

    let summary = fx.run();
    let journal = fx.journal();

    assert_eq!(journal.files(Phase::Preprocess), vec!["lib.abc", "M.as"]);
    assert_eq!(journal.files(Phase::Constants), vec!["lib.abc", "M.as"]);
    let entries = journal.entries();
    let last_preprocess = entries
        .iter()
        .rposition(|(_, phase)| *phase == Phase::Preprocess)
        .expect("preprocess ran");
    let first_constants = entries
        .iter()
        .position(|(_, phase)| *phase == Phase::Constants)
        .expect("constants ran");
    assert!(last_preprocess < first_constants);

    assert!(!journal.ran("lib.abc", Phase::Codegen));
    assert!(journal.ran("M.as", Phase::Codegen));
    assert_eq!(file_names(&summary.outputs), vec!["M.abc"]);
}

#[test]
fn test_batch_constants_skip_bytecode_imports() {
    let mut fx = Fixture::batch();
    let lib = fx.write("lib.abc", "class L\n");
    fx.session.add_import(&lib).expect("Failed to add import");
    fx.add("M.as", "class M extends L\n");

    fx.run();
    let journal = fx.journal();

    assert!(!journal.ran("lib.abc", Phase::Constants));
    assert!(journal.ran("M.as", Phase::Constants));
}

// =============================================================================
// Session lifecycle
// =============================================================================

#[test]
fn test_clear_allows_independent_compiles() {
    let mut fx = Fixture::batch();
    fx.add("A.as", "class A extends B\n");
    fx.add("B.as", "class B\n");
    fx.run();

    fx.session.clear();
    assert!(fx.session.registry().is_empty());
    assert!(fx.session.edges().inheritance.is_empty());
    assert!(fx.session.diagnostics().is_empty());

    fx.add("C.as", "class C extends B\n");
    let summary = fx.run();

    // B is found again on the classpath, not left over from the first compile.
    assert_eq!(summary.files, 2);
    assert_eq!(fx.order(), vec!["B.as", "C.as"]);
    let b = fx.id_of("B.as");
    assert_eq!(fx.session.registry()[b].origin, UnitOrigin::Classpath);
}

#[test]
fn test_sessions_are_independent() {
    let mut first = Fixture::batch();
    let mut second = Fixture::batch();
    first.add("A.as", "class A\n");
    second.add("A.as", "class A\nuses Foo\n");

    let one = first.run();
    let two = second.run();

    assert!(one.unresolved.is_empty());
    assert_eq!(two.unresolved.len(), 1);
}

#[test]
fn test_adding_same_file_twice_is_deduplicated() {
    let mut fx = Fixture::batch();
    let path = fx.write("A.as", "class A\n");
    let again = Path::new(fx.dir.path()).join(".").join("A.as");

    let first = fx.session.add_file(&path);
    let second = fx.session.add_file(&again);

    assert_eq!(first, second);
    assert_eq!(fx.session.registry().len(), 1);
}
