//! Writing generated bytecode.
//!
//! Per-unit output writes `<stem>.abc` beside each source (or into the
//! configured output directory). Merged output writes one file for every
//! main unit and can be post-processed:
//!
//! ```text
//! main emitter ──emit──▶ bytes ──optimize?──▶ bytes ──┬── packager installed ──▶ container
//!                                                      └── otherwise ──▶ <name>.abc
//!                                                                     ╲
//!                                               native stubs? ──▶ <name>.h, <name>.cpp
//! ```

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use asc_core::Emitter;
use asc_registry::BYTECODE_EXTENSION;

use crate::CompilerOptions;

/// Failure while producing output. Reported per unit, never fatal for the batch.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("optimizer failed: {0}")]
    Optimizer(String),

    #[error("packager failed: {0}")]
    Packager(String),
}

impl OutputError {
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        OutputError::Write {
            path: path.into(),
            source,
        }
    }
}

/// Byte-level optimizer run over merged output.
pub trait BytecodeOptimizer {
    fn optimize(&mut self, bytes: Vec<u8>) -> Result<Vec<u8>, OutputError>;
}

/// Wraps merged bytecode in a container format instead of a bare `.abc`.
pub trait Packager {
    /// Write `bytes` for output `name` into `dir`. Returns the file written.
    fn package(&mut self, bytes: &[u8], dir: &Path, name: &str) -> Result<PathBuf, OutputError>;
}

/// Where per-unit bytecode for `source` goes.
pub fn unit_output_path(source: &Path, output_dir: Option<&Path>) -> PathBuf {
    let file = source.with_extension(BYTECODE_EXTENSION);
    match (output_dir, file.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => file,
    }
}

pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), OutputError> {
    fs::write(path, bytes).map_err(|err| OutputError::write(path, err))
}

/// Name and directory of merged output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedTarget {
    pub dir: PathBuf,
    /// File name without suffix.
    pub name: String,
}

impl MergedTarget {
    /// Resolve from options, defaulting to the last main file's stem and directory.
    pub fn resolve(options: &CompilerOptions, last_main: &Path) -> Self {
        let name = options.output_file.clone().unwrap_or_else(|| {
            last_main
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        let dir = options
            .output_dir
            .clone()
            .or_else(|| last_main.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        Self { dir, name }
    }

    pub fn bytecode_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}.{}", self.name, BYTECODE_EXTENSION))
    }
}

/// Native stub sources for merged output: `(header, source)`.
///
/// The header carries the emitter's own declarations followed by `extern`
/// declarations; the source defines them and lists the bytecode as hex bytes,
/// sixteen per line.
pub fn native_stubs<E: Emitter>(name: &str, emitter: &E, bytes: &[u8]) -> (String, String) {
    let mut header = emitter.native_header();
    for suffix in ["length", "method_count", "class_count", "script_count"] {
        let _ = writeln!(header, "extern const int {}_abc_{};", name, suffix);
    }
    let _ = writeln!(header, "extern const unsigned char {}_abc_data[];", name);

    let count = bytes.len();
    let mut source = String::new();
    let _ = writeln!(source, "const int {}_abc_length = {};", name, count);
    let _ = writeln!(
        source,
        "const int {}_abc_method_count = {};",
        name,
        emitter.native_method_count()
    );
    let _ = writeln!(source, "const int {}_abc_class_count = {};", name, emitter.class_count());
    let _ = writeln!(source, "const int {}_abc_script_count = {};", name, emitter.script_count());
    let _ = writeln!(source, "const unsigned char {}_abc_data[{}] = {{", name, count);
    for (i, byte) in bytes.iter().enumerate() {
        let _ = write!(source, "0x{:02x}", byte);
        if i + 1 < count {
            source.push(',');
        }
        source.push(if (i + 1) % 16 == 0 { '\n' } else { ' ' });
    }
    source.push_str("};\n");

    (header, source)
}

/// Serialize the main emitter and write merged output. Returns the files written.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn write_merged<E: Emitter>(
    emitter: &mut E,
    target: &MergedTarget,
    options: &CompilerOptions,
    optimizer: Option<&mut dyn BytecodeOptimizer>,
    packager: Option<&mut dyn Packager>,
) -> Result<Vec<PathBuf>, OutputError> {
    if options.builtin {
        emitter.reorder_main_script();
    }
    let mut bytes = Vec::new();
    emitter.emit(&mut bytes);

    if options.optimize {
        match optimizer {
            Some(optimizer) => bytes = optimizer.optimize(bytes)?,
            None => warn!("optimize requested but no optimizer is installed"),
        }
    }

    let mut written = Vec::new();
    match packager {
        Some(packager) => written.push(packager.package(&bytes, &target.dir, &target.name)?),
        None => {
            let path = target.bytecode_path();
            write_file(&path, &bytes)?;
            info!("{}: {}", target.name, bytes.len());
            written.push(path);
        }
    }

    if options.native_stubs {
        let (header, source) = native_stubs(&target.name, &*emitter, &bytes);
        for (suffix, text) in [("h", header), ("cpp", source)] {
            let path = target.dir.join(format!("{}.{}", target.name, suffix));
            write_file(&path, text.as_bytes())?;
            written.push(path);
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutputMode;
    use crate::emit::BlockEmitter;
    use asc_core::QualifiedName;

    #[test]
    fn unit_output_beside_source_or_in_dir() {
        let source = Path::new("/src/app/A.as");
        assert_eq!(unit_output_path(source, None), PathBuf::from("/src/app/A.abc"));
        assert_eq!(
            unit_output_path(source, Some(Path::new("/out"))),
            PathBuf::from("/out/A.abc")
        );
    }

    #[test]
    fn merged_target_defaults_to_last_main() {
        let options = CompilerOptions::default().with_output(OutputMode::Merged);
        let target = MergedTarget::resolve(&options, Path::new("/lib/builtin.as"));
        assert_eq!(target.name, "builtin");
        assert_eq!(target.dir, PathBuf::from("/lib"));
        assert_eq!(target.bytecode_path(), PathBuf::from("/lib/builtin.abc"));

        let options = options.with_output_file("shell").with_output_dir("/out");
        let target = MergedTarget::resolve(&options, Path::new("/lib/builtin.as"));
        assert_eq!(target.bytecode_path(), PathBuf::from("/out/shell.abc"));
    }

    #[test]
    fn native_stub_layout() {
        let mut emitter = BlockEmitter::new("builtin");
        emitter.begin_script("builtin");
        emitter.declare_class(QualifiedName::global("Object"), true);

        let bytes: Vec<u8> = (0u8..18).collect();
        let (header, source) = native_stubs("builtin", &emitter, &bytes);

        assert!(header.starts_with("#define ABC_CLASS_"));
        assert!(header.contains("extern const int builtin_abc_length;\n"));
        assert!(header.ends_with("extern const unsigned char builtin_abc_data[];\n"));

        assert!(source.starts_with("const int builtin_abc_length = 18;\n"));
        assert!(source.contains("const int builtin_abc_class_count = 1;\n"));
        assert!(source.contains("const unsigned char builtin_abc_data[18] = {\n"));
        assert!(source.contains(
            "0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, \
             0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,\n0x10, 0x11 };\n"
        ));
    }

    #[test]
    fn write_merged_writes_abc_and_stubs() {
        let dir = tempfile::tempdir().unwrap();
        let options = CompilerOptions::default()
            .with_output(OutputMode::Merged)
            .with_native_stubs(true)
            .with_output_dir(dir.path());
        let target = MergedTarget::resolve(&options, Path::new("main.as"));

        let mut emitter = BlockEmitter::new("main");
        emitter.begin_script("main");
        let written = write_merged(&mut emitter, &target, &options, None, None).unwrap();

        assert_eq!(written.len(), 3);
        assert!(dir.path().join("main.abc").is_file());
        assert!(dir.path().join("main.h").is_file());
        assert!(dir.path().join("main.cpp").is_file());
    }

    struct Truncate;

    impl BytecodeOptimizer for Truncate {
        fn optimize(&mut self, mut bytes: Vec<u8>) -> Result<Vec<u8>, OutputError> {
            bytes.truncate(4);
            Ok(bytes)
        }
    }

    #[test]
    fn optimizer_transforms_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let options = CompilerOptions::default()
            .with_output(OutputMode::Merged)
            .with_optimize(true)
            .with_output_dir(dir.path());
        let target = MergedTarget::resolve(&options, Path::new("main.as"));
        let mut emitter = BlockEmitter::new("main");
        let mut optimizer = Truncate;

        write_merged(&mut emitter, &target, &options, Some(&mut optimizer), None).unwrap();
        let bytes = fs::read(dir.path().join("main.abc")).unwrap();
        assert_eq!(bytes, vec![0x10, 0x00, 0x2E, 0x00]);
    }

    #[test]
    fn write_failure_names_the_path() {
        let err = write_file(Path::new("/nonexistent-dir/x.abc"), b"").unwrap_err();
        assert!(err.to_string().starts_with("cannot write '/nonexistent-dir/x.abc'"));
    }
}
