//! A fixture toolchain for exercising the driver without a real parser.
//!
//! Fixture files hold one directive per line; blank lines and `#` comments
//! are ignored:
//!
//! ```text
//! package app                 later declarations go in public:app
//! import lib                  open public:lib for every later reference
//! class A extends B implements I, J
//! native class Object
//! interface I
//! var count: Counter          top-level binding with a type annotation
//! function helper             top-level method binding
//! native function trace
//! uses Widget                 type referenced from a function body
//! namespace AS3               namespace reference
//! call helper                 runtime expression reference
//! attr id                     attribute identifier reference
//! error message               parse error
//! fail preprocess             error raised by the named phase
//! ```
//!
//! Bytecode inputs are read the same way, as UTF-8 fixture text. Every
//! collaborator call is recorded in a shared [`Journal`].

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use asc_core::{
    AnalysisState, BindingKind, ClassDefinition, ConstantEvaluator, FlowAnalyzer, Namespace,
    ProgramNode, QualifiedName, Slot, Span, UnitContext, UnresolvedReference,
};

use crate::Toolchain;
use crate::bytecode::OpCode;
use crate::emit::BlockEmitter;

/// A collaborator call the fixture toolchain can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Parse,
    Configuration,
    FirstPass,
    SecondPass,
    Metadata,
    Preprocess,
    Constants,
    Codegen,
}

impl Phase {
    fn from_directive(word: &str) -> Option<Self> {
        Some(match word {
            "parse" => Phase::Parse,
            "flow" => Phase::SecondPass,
            "metadata" => Phase::Metadata,
            "preprocess" => Phase::Preprocess,
            "constants" => Phase::Constants,
            "codegen" => Phase::Codegen,
            _ => return None,
        })
    }
}

/// Calls recorded by a [`FixtureToolchain`], as `(file name, phase)`.
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<(String, Phase)>>>);

impl Journal {
    fn record(&self, file: &str, phase: Phase) {
        self.0.borrow_mut().push((file.to_string(), phase));
    }

    pub fn entries(&self) -> Vec<(String, Phase)> {
        self.0.borrow().clone()
    }

    /// How often `phase` ran for `file`.
    pub fn count(&self, file: &str, phase: Phase) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|(f, p)| f == file && *p == phase)
            .count()
    }

    pub fn ran(&self, file: &str, phase: Phase) -> bool {
        self.count(file, phase) > 0
    }

    /// Files `phase` ran for, in call order.
    pub fn files(&self, phase: Phase) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter(|(_, p)| *p == phase)
            .map(|(f, _)| f.clone())
            .collect()
    }
}

/// What a fixture declares, kept in [`ProgramNode::body`] for code generation.
#[derive(Debug, Clone, Default)]
pub struct FixtureProgram {
    pub package: String,
    pub classes: Vec<(QualifiedName, bool)>,
    pub functions: Vec<(QualifiedName, bool)>,
    pub vars: Vec<QualifiedName>,
    pub fails: Vec<Phase>,
}

impl FixtureProgram {
    fn fails_in(&self, phase: Phase) -> bool {
        self.fails.contains(&phase)
    }
}

fn fails_in(program: &ProgramNode, phase: Phase) -> bool {
    program
        .body_as::<FixtureProgram>()
        .is_some_and(|fixture| fixture.fails_in(phase))
}

/// Parses fixture text into a program tree.
#[derive(Debug, Default)]
struct FixtureParser {
    fixture: FixtureProgram,
    open: Vec<Namespace>,
    program: ProgramNode,
}

impl FixtureParser {
    fn parse(cx: &mut UnitContext, text: &str) -> ProgramNode {
        let mut parser = FixtureParser::default();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let span = Span::point(index as u32 + 1, 1);
            parser.directive(cx, line, span);
        }
        let mut program = parser.program;
        program.body = Some(Box::new(parser.fixture));
        program
    }

    fn package_ns(&self) -> Namespace {
        Namespace::public(self.fixture.package.clone())
    }

    fn qualify(&self, name: &str) -> QualifiedName {
        QualifiedName::new(self.package_ns(), name)
    }

    /// Open namespaces, then the current package, then the unnamed package.
    fn reference(&self, name: &str, span: Span) -> UnresolvedReference {
        let mut namespaces = self.open.clone();
        for ns in [self.package_ns(), Namespace::public("")] {
            if !namespaces.contains(&ns) {
                namespaces.push(ns);
            }
        }
        UnresolvedReference::new(name)
            .with_namespaces(namespaces)
            .with_span(span)
    }

    fn bind(&mut self, name: &str, kind: BindingKind, slot: Slot) {
        let ns = self.package_ns();
        self.program.frame.builder.define(name, ns, kind, slot);
    }

    fn directive(&mut self, cx: &mut UnitContext, line: &str, span: Span) {
        let (native, line) = match line.strip_prefix("native ") {
            Some(rest) => (true, rest.trim()),
            None => (false, line),
        };
        let (keyword, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match keyword {
            "package" => self.fixture.package = rest.to_string(),
            "import" => self.open.push(Namespace::public(rest)),
            "class" | "interface" => self.class(keyword == "interface", native, rest, span),
            "var" => {
                let (name, ty) = match rest.split_once(':') {
                    Some((name, ty)) => (name.trim(), Some(ty.trim())),
                    None => (rest, None),
                };
                self.bind(name, BindingKind::Get, Slot::default());
                self.bind(name, BindingKind::Set, Slot::default());
                let qname = self.qualify(name);
                self.fixture.vars.push(qname);
                if let Some(ty) = ty {
                    let reference = self.reference(ty, span);
                    self.program.ce_unresolved.push(reference);
                }
            }
            "function" => {
                self.bind(rest, BindingKind::Method, Slot::default());
                let qname = self.qualify(rest);
                self.fixture.functions.push((qname, native));
            }
            "uses" => {
                let reference = self.reference(rest, span);
                self.program.body_unresolved.push(reference);
            }
            "namespace" => {
                let reference = self.reference(rest, span);
                self.program.ns_unresolved.push(reference);
            }
            "call" => {
                let reference = self.reference(rest, span);
                self.program.rt_unresolved.push(reference);
            }
            "attr" => {
                let reference = self.reference(rest, span).attribute();
                self.program.rt_unresolved.push(reference);
            }
            "error" => cx.report_error(rest, span),
            "fail" => match Phase::from_directive(rest) {
                Some(Phase::Parse) => cx.report_error("forced parse failure", span),
                Some(phase) => self.fixture.fails.push(phase),
                None => cx.report_error(format!("unknown phase '{}'", rest), span),
            },
            other => cx.report_error(format!("unknown directive '{}'", other), span),
        }
    }

    fn class(&mut self, interface: bool, native: bool, rest: &str, span: Span) {
        let mut words = rest
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|w| !w.is_empty());
        let Some(name) = words.next() else {
            return;
        };
        let qname = self.qualify(name);
        let definition = if interface {
            ClassDefinition::interface(qname.clone())
        } else {
            ClassDefinition::new(qname.clone())
        };
        self.program.class_defs.push(definition);
        self.bind(name, BindingKind::Get, Slot::default().constant());
        self.fixture.classes.push((qname, native));

        for word in words {
            if word == "extends" || word == "implements" {
                continue;
            }
            let reference = self.reference(word, span);
            self.program.fa_unresolved.push(reference);
        }
    }
}

struct FixtureAnalyzer {
    file: String,
    journal: Journal,
}

impl FlowAnalyzer for FixtureAnalyzer {
    fn analyze(&mut self, cx: &mut UnitContext, program: &mut ProgramNode) {
        match program.state {
            AnalysisState::Inheritance => {
                self.journal.record(&self.file, Phase::FirstPass);
                program.state = AnalysisState::Else;
            }
            AnalysisState::Else => {
                self.journal.record(&self.file, Phase::SecondPass);
                if fails_in(program, Phase::SecondPass) {
                    cx.report_error("forced flow failure", Span::default());
                }
            }
        }
    }
}

struct FixtureEvaluator {
    file: String,
    journal: Journal,
}

impl ConstantEvaluator for FixtureEvaluator {
    fn preprocess(&mut self, cx: &mut UnitContext, program: &mut ProgramNode) {
        self.journal.record(&self.file, Phase::Preprocess);
        if fails_in(program, Phase::Preprocess) {
            cx.report_error("forced preprocess failure", Span::default());
        }
    }

    fn evaluate(&mut self, cx: &mut UnitContext, program: &mut ProgramNode) {
        self.journal.record(&self.file, Phase::Constants);
        if fails_in(program, Phase::Constants) {
            cx.report_error("forced constant evaluation failure", Span::default());
        }
    }
}

/// A [`Toolchain`] over fixture text, generating into [`BlockEmitter`]s.
#[derive(Debug, Clone, Default)]
pub struct FixtureToolchain {
    journal: Journal,
}

impl FixtureToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The journal shared with every analyzer and evaluator this toolchain creates.
    pub fn journal(&self) -> &Journal {
        &self.journal
    }
}

impl Toolchain for FixtureToolchain {
    type Emitter = BlockEmitter;

    fn create_emitter(&mut self, path: &Path) -> BlockEmitter {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        BlockEmitter::new(stem)
    }

    fn parse_source(&mut self, cx: &mut UnitContext, _path: &Path, source: &str) -> ProgramNode {
        self.journal.record(&cx.script_name, Phase::Parse);
        FixtureParser::parse(cx, source)
    }

    fn parse_bytecode(&mut self, cx: &mut UnitContext, _path: &Path, bytes: &[u8]) -> ProgramNode {
        self.journal.record(&cx.script_name, Phase::Parse);
        FixtureParser::parse(cx, &String::from_utf8_lossy(bytes))
    }

    fn evaluate_configuration(&mut self, cx: &mut UnitContext, _program: &mut ProgramNode) {
        self.journal.record(&cx.script_name, Phase::Configuration);
    }

    fn flow_analyzer(&mut self, cx: &UnitContext, _path: &Path) -> Box<dyn FlowAnalyzer> {
        Box::new(FixtureAnalyzer {
            file: cx.script_name.clone(),
            journal: self.journal.clone(),
        })
    }

    fn evaluate_metadata(&mut self, cx: &mut UnitContext, _program: &mut ProgramNode) {
        self.journal.record(&cx.script_name, Phase::Metadata);
    }

    fn constant_evaluator(&mut self, cx: &UnitContext) -> Box<dyn ConstantEvaluator> {
        Box::new(FixtureEvaluator {
            file: cx.script_name.clone(),
            journal: self.journal.clone(),
        })
    }

    fn generate_code(
        &mut self,
        cx: &mut UnitContext,
        program: &mut ProgramNode,
        emitter: &mut BlockEmitter,
    ) {
        self.journal.record(&cx.script_name, Phase::Codegen);
        let Some(fixture) = program.body_as::<FixtureProgram>() else {
            return;
        };
        if fixture.fails_in(Phase::Codegen) {
            cx.report_error("forced code generation failure", Span::default());
            return;
        }

        let stem = cx.script_name.trim_end_matches(".as").to_string();
        emitter.begin_script(&stem);
        emitter.emit_op(OpCode::GetLocal0);
        emitter.emit_op(OpCode::PushScope);
        for (name, native) in &fixture.classes {
            emitter.declare_class(name.clone(), *native);
            emitter.emit_named(OpCode::GetLex, name.clone());
            emitter.emit_op(OpCode::PushScope);
            emitter.emit_op(OpCode::PopScope);
        }
        for (name, native) in &fixture.functions {
            emitter.declare_method(name.clone(), *native);
        }
        for name in &fixture.vars {
            emitter.emit_op(OpCode::PushUndefined);
            emitter.emit_named(OpCode::InitProperty, name.clone());
        }
        emitter.emit_op(OpCode::ReturnVoid);
    }
}

/// Write fixture text to `dir/relative`, creating parent directories.
pub fn write_fixture(dir: &Path, relative: impl AsRef<Path>, text: &str) -> io::Result<PathBuf> {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, text)?;
    Ok(path)
}
