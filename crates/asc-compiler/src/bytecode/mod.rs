//! Bytecode types for the default block emitter.
//!
//! - [`OpCode`] - The instruction set
//! - [`BytecodeChunk`] - Code for one script block
//! - [`Constant`] and [`ConstantPool`] - Deduplicated constant storage

mod chunk;
mod constant;
mod opcode;

pub use chunk::BytecodeChunk;
pub use constant::{Constant, ConstantPool};
pub use opcode::OpCode;
