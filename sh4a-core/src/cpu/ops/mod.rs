//! Instruction semantics, one function per mnemonic.
//!
//! Operands arrive pre-extracted from the opcode: `m`/`n` are register
//! indices, immediates and displacements are the raw opcode fields.

pub mod alu;
pub mod branch;
pub mod control;
pub mod divide;
pub mod load_store;
pub mod multiply;
pub mod shift;

/// Sign extend 8-bit to 32-bit
#[inline]
pub fn sign_extend8(val: u8) -> u32 {
    val as i8 as i32 as u32
}

/// Sign extend 12-bit to 32-bit
#[inline]
pub fn sign_extend12(val: u16) -> u32 {
    if val & 0x800 != 0 {
        (val as u32 & 0xFFF) | 0xFFFFF000
    } else {
        val as u32 & 0xFFF
    }
}

/// Sign extend 16-bit to 32-bit
#[inline]
pub fn sign_extend16(val: u16) -> u32 {
    val as i16 as i32 as u32
}
