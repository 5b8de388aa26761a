//! Bytecode operation codes.
//!
//! Each opcode is a single byte; operands follow inline, little-endian.
//! Values follow the target VM's numbering so emitted blocks can be read by
//! its disassembler.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Instruction set of the target VM (the subset the block emitter writes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum OpCode {
    // =========================================================================
    // Control
    // =========================================================================
    Nop = 0x02,
    Throw = 0x03,
    Label = 0x09,
    /// Operand: i32 relative offset
    Jump = 0x10,
    /// Operand: i32 relative offset
    IfTrue = 0x11,
    /// Operand: i32 relative offset
    IfFalse = 0x12,
    PopScope = 0x1D,

    // =========================================================================
    // Stack
    // =========================================================================
    PushNull = 0x20,
    PushUndefined = 0x21,
    /// Operand: u8 value
    PushByte = 0x24,
    PushTrue = 0x26,
    PushFalse = 0x27,
    Pop = 0x29,
    Dup = 0x2A,
    /// Operand: u32 constant index
    PushString = 0x2C,
    /// Operand: u32 constant index
    PushInt = 0x2D,
    /// Operand: u32 constant index
    PushDouble = 0x2F,
    PushScope = 0x30,

    // =========================================================================
    // Calls
    // =========================================================================
    /// Operand: u32 name index, u8 argc
    CallProperty = 0x46,
    ReturnVoid = 0x47,
    ReturnValue = 0x48,
    /// Operand: u8 argc
    ConstructSuper = 0x49,
    /// Operand: u32 name index, u8 argc
    CallPropVoid = 0x4F,

    // =========================================================================
    // Objects
    // =========================================================================
    /// Operand: u32 class name index
    NewClass = 0x58,
    /// Operand: u32 name index
    FindPropStrict = 0x5D,
    /// Operand: u32 name index
    GetLex = 0x60,
    /// Operand: u32 name index
    SetProperty = 0x61,
    /// Operand: u32 name index
    GetProperty = 0x66,
    /// Operand: u32 name index
    InitProperty = 0x68,
    GetLocal0 = 0xD0,
}

impl OpCode {
    /// Operand bytes following the opcode byte.
    pub fn operand_size(&self) -> usize {
        match self {
            OpCode::PushByte | OpCode::ConstructSuper => 1,
            OpCode::Jump
            | OpCode::IfTrue
            | OpCode::IfFalse
            | OpCode::PushString
            | OpCode::PushInt
            | OpCode::PushDouble
            | OpCode::NewClass
            | OpCode::FindPropStrict
            | OpCode::GetLex
            | OpCode::SetProperty
            | OpCode::GetProperty
            | OpCode::InitProperty => 4,
            OpCode::CallProperty | OpCode::CallPropVoid => 5,
            _ => 0,
        }
    }

    /// Mnemonic used by disassembly.
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::Nop => "nop",
            OpCode::Throw => "throw",
            OpCode::Label => "label",
            OpCode::Jump => "jump",
            OpCode::IfTrue => "iftrue",
            OpCode::IfFalse => "iffalse",
            OpCode::PopScope => "popscope",
            OpCode::PushNull => "pushnull",
            OpCode::PushUndefined => "pushundefined",
            OpCode::PushByte => "pushbyte",
            OpCode::PushTrue => "pushtrue",
            OpCode::PushFalse => "pushfalse",
            OpCode::Pop => "pop",
            OpCode::Dup => "dup",
            OpCode::PushString => "pushstring",
            OpCode::PushInt => "pushint",
            OpCode::PushDouble => "pushdouble",
            OpCode::PushScope => "pushscope",
            OpCode::CallProperty => "callproperty",
            OpCode::ReturnVoid => "returnvoid",
            OpCode::ReturnValue => "returnvalue",
            OpCode::ConstructSuper => "constructsuper",
            OpCode::CallPropVoid => "callpropvoid",
            OpCode::NewClass => "newclass",
            OpCode::FindPropStrict => "findpropstrict",
            OpCode::GetLex => "getlex",
            OpCode::SetProperty => "setproperty",
            OpCode::GetProperty => "getproperty",
            OpCode::InitProperty => "initproperty",
            OpCode::GetLocal0 => "getlocal0",
        }
    }
}
