//! Default block emitter.
//!
//! [`BlockEmitter`] collects generated code into script blocks that share a
//! single constant pool, and serializes them into the container layout read
//! by the target VM:
//!
//! ```text
//! magic        10 00 2E 00          (minor 16, major 46)
//! flags        u32                  bit 0: API versioning
//! constants    u32 count, tagged entries
//! scripts      u32 count, then per script:
//!              u32 name index
//!              u32 class count,  u32 class name index  (repeated)
//!              u32 method count, u32 method name index (repeated)
//!              u32 code length,  code bytes
//! ```
//!
//! # Example
//!
//! ```
//! use asc_compiler::bytecode::OpCode;
//! use asc_compiler::emit::BlockEmitter;
//! use asc_core::{Emitter, QualifiedName};
//!
//! let mut emitter = BlockEmitter::new("A.as");
//! emitter.begin_script("A");
//! emitter.declare_class(QualifiedName::global("A"), false);
//! emitter.emit_op(OpCode::ReturnVoid);
//!
//! let mut bytes = Vec::new();
//! emitter.emit(&mut bytes);
//! assert_eq!(&bytes[..4], &[0x10, 0x00, 0x2E, 0x00]);
//! assert_eq!(emitter.class_count(), 1);
//! ```

use std::fmt::Write as _;

use asc_core::{Emitter, QualifiedName};

use crate::bytecode::{BytecodeChunk, Constant, ConstantPool, OpCode};

/// Container magic: minor version 16, major version 46.
pub const MAGIC: [u8; 4] = [0x10, 0x00, 0x2E, 0x00];

/// Flag bit: output carries API version metadata.
pub const FLAG_API_VERSIONING: u32 = 1;

/// A class or method declared in a script block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration {
    /// Constant index of the qualified name.
    pub name: u32,
    /// Implemented natively by the host.
    pub native: bool,
}

/// One script: the initializer of a compiled unit.
#[derive(Debug, Clone, Default)]
pub struct ScriptBlock {
    /// Constant index of the script name.
    pub name: u32,
    pub classes: Vec<Declaration>,
    pub methods: Vec<Declaration>,
    pub chunk: BytecodeChunk,
}

/// Collects script blocks for one output file.
#[derive(Debug, Clone, Default)]
pub struct BlockEmitter {
    name: String,
    constants: ConstantPool,
    scripts: Vec<ScriptBlock>,
    api_versioning: bool,
    current_line: u32,
}

impl BlockEmitter {
    /// An empty emitter for output named after `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            current_line: 1,
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start a new script block; later emission goes into it.
    pub fn begin_script(&mut self, name: &str) -> usize {
        let name = self.constants.add_string(name);
        self.scripts.push(ScriptBlock {
            name,
            ..Default::default()
        });
        self.scripts.len() - 1
    }

    fn current(&mut self) -> &mut ScriptBlock {
        if self.scripts.is_empty() {
            let name = self.name.clone();
            self.begin_script(&name);
        }
        let last = self.scripts.len() - 1;
        &mut self.scripts[last]
    }

    pub fn declare_class(&mut self, name: QualifiedName, native: bool) {
        let name = self.constants.add_name(name);
        self.current().classes.push(Declaration { name, native });
    }

    pub fn declare_method(&mut self, name: QualifiedName, native: bool) {
        let name = self.constants.add_name(name);
        self.current().methods.push(Declaration { name, native });
    }

    /// Source line attached to subsequently emitted bytes.
    pub fn set_line(&mut self, line: u32) {
        self.current_line = line;
    }

    pub fn emit_op(&mut self, op: OpCode) {
        let line = self.current_line;
        self.current().chunk.write_op(op, line);
    }

    /// Emit `op` with a name operand interned in the constant pool.
    pub fn emit_named(&mut self, op: OpCode, name: QualifiedName) {
        let index = self.constants.add_name(name);
        let line = self.current_line;
        self.current().chunk.write_indexed(op, index, line);
    }

    pub fn emit_string(&mut self, value: &str) {
        let index = self.constants.add_string(value);
        let line = self.current_line;
        self.current().chunk.write_indexed(OpCode::PushString, index, line);
    }

    pub fn emit_int(&mut self, value: i64) {
        let line = self.current_line;
        if let Ok(byte) = u8::try_from(value) {
            let chunk = &mut self.current().chunk;
            chunk.write_op(OpCode::PushByte, line);
            chunk.write_byte(byte, line);
        } else {
            let index = self.constants.add_int(value);
            self.current().chunk.write_indexed(OpCode::PushInt, index, line);
        }
    }

    pub fn constants(&self) -> &ConstantPool {
        &self.constants
    }

    pub fn scripts(&self) -> &[ScriptBlock] {
        &self.scripts
    }

    pub fn api_versioning(&self) -> bool {
        self.api_versioning
    }

    fn constant_name(&self, index: u32) -> String {
        self.constants
            .get(index)
            .map(|c| match c {
                Constant::Name(name) => name.to_string(),
                other => format!("{:?}", other),
            })
            .unwrap_or_default()
    }
}

fn write_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn c_identifier(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

impl Emitter for BlockEmitter {
    fn emit(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MAGIC);
        let flags = if self.api_versioning {
            FLAG_API_VERSIONING
        } else {
            0
        };
        write_u32(out, flags);
        self.constants.write_to(out);

        write_u32(out, self.scripts.len() as u32);
        for script in &self.scripts {
            write_u32(out, script.name);
            write_u32(out, script.classes.len() as u32);
            for class in &script.classes {
                write_u32(out, class.name);
            }
            write_u32(out, script.methods.len() as u32);
            for method in &script.methods {
                write_u32(out, method.name);
            }
            write_u32(out, script.chunk.len() as u32);
            out.extend_from_slice(script.chunk.code());
        }
    }

    fn native_method_count(&self) -> usize {
        self.scripts
            .iter()
            .flat_map(|s| s.methods.iter())
            .filter(|m| m.native)
            .count()
    }

    fn class_count(&self) -> usize {
        self.scripts.iter().map(|s| s.classes.len()).sum()
    }

    fn script_count(&self) -> usize {
        self.scripts.len()
    }

    fn reorder_main_script(&mut self) {
        if self.scripts.len() > 1 {
            let main = self.scripts.remove(0);
            self.scripts.push(main);
        }
    }

    fn enable_api_versioning(&mut self) {
        self.api_versioning = true;
    }

    fn native_header(&self) -> String {
        let mut header = String::new();
        let classes = self.scripts.iter().flat_map(|s| s.classes.iter());
        for (id, class) in classes.enumerate().filter(|(_, d)| d.native) {
            let name = c_identifier(&self.constant_name(class.name));
            let _ = writeln!(header, "#define ABC_CLASS_{} {}", name, id);
        }
        let methods = self.scripts.iter().flat_map(|s| s.methods.iter());
        for (id, method) in methods.enumerate().filter(|(_, d)| d.native) {
            let name = c_identifier(&self.constant_name(method.name));
            let _ = writeln!(header, "#define ABC_METHOD_{} {}", name, id);
        }
        header
    }
}
