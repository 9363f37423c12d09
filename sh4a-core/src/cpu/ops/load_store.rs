//! Data transfer instructions
//!
//! Each addressing mode is one function taking the operand [`Width`].
//! Byte and word loads sign-extend into the destination; long loads don't.

use super::{sign_extend16, sign_extend8};
use crate::cpu::{Flow, ProcessorState};
use crate::memory::MemoryPort;

/// Operand size of a MOV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Byte,
    Word,
    Long,
}

impl Width {
    pub fn bytes(self) -> u32 {
        match self {
            Width::Byte => 1,
            Width::Word => 2,
            Width::Long => 4,
        }
    }

    /// Read and sign-extend to 32 bits
    fn load(self, mem: &mut dyn MemoryPort, addr: u32) -> u32 {
        match self {
            Width::Byte => sign_extend8(mem.read8(addr)),
            Width::Word => sign_extend16(mem.read16(addr)),
            Width::Long => mem.read32(addr),
        }
    }

    /// Write the low bits of `val`
    fn store(self, mem: &mut dyn MemoryPort, addr: u32, val: u32) {
        match self {
            Width::Byte => mem.write8(addr, val as u8),
            Width::Word => mem.write16(addr, val as u16),
            Width::Long => mem.write32(addr, val),
        }
    }
}

// ============================================================================
// Register and immediate
// ============================================================================

/// MOV Rm,Rn
pub fn mov(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_reg(n, st.reg(m));
    Flow::next(st)
}

/// MOV #imm,Rn
pub fn mov_imm(st: &mut ProcessorState, imm: u8, n: usize) -> Flow {
    st.set_reg(n, sign_extend8(imm));
    Flow::next(st)
}

/// MOVA @(disp,PC),R0
pub fn mova(st: &mut ProcessorState, disp: u8) -> Flow {
    st.r[0] = (st.pc & !3).wrapping_add(4).wrapping_add(disp as u32 * 4);
    Flow::next(st)
}

// ============================================================================
// Register indirect
// ============================================================================

/// MOV.x Rm,@Rn
pub fn mov_store(st: &mut ProcessorState, mem: &mut dyn MemoryPort, w: Width, m: usize, n: usize) -> Flow {
    w.store(mem, st.reg(n), st.reg(m));
    Flow::next(st)
}

/// MOV.x @Rm,Rn
pub fn mov_load(st: &mut ProcessorState, mem: &mut dyn MemoryPort, w: Width, m: usize, n: usize) -> Flow {
    let val = w.load(mem, st.reg(m));
    st.set_reg(n, val);
    Flow::next(st)
}

/// MOVCA.L R0,@Rn - cache allocation is not modelled, so this is a store
pub fn movca_l(st: &mut ProcessorState, mem: &mut dyn MemoryPort, n: usize) -> Flow {
    mem.write32(st.reg(n), st.r[0]);
    Flow::next(st)
}

/// MOV.x Rm,@-Rn
///
/// Rm is read before Rn is decremented, so `MOV.L R1,@-R1` stores the
/// original R1.
pub fn mov_store_predec(st: &mut ProcessorState, mem: &mut dyn MemoryPort, w: Width, m: usize, n: usize) -> Flow {
    let val = st.reg(m);
    let addr = st.reg(n).wrapping_sub(w.bytes());
    w.store(mem, addr, val);
    st.set_reg(n, addr);
    Flow::next(st)
}

/// MOV.x @Rm+,Rn
///
/// Rm advances by the operand width unless it is also the destination, in
/// which case the loaded value wins.
pub fn mov_load_postinc(st: &mut ProcessorState, mem: &mut dyn MemoryPort, w: Width, m: usize, n: usize) -> Flow {
    let addr = st.reg(m);
    let val = w.load(mem, addr);
    if n != m {
        st.set_reg(m, addr.wrapping_add(w.bytes()));
    }
    st.set_reg(n, val);
    Flow::next(st)
}

// ============================================================================
// Indexed and displacement
// ============================================================================

/// MOV.x Rm,@(R0,Rn)
pub fn mov_store_indexed(st: &mut ProcessorState, mem: &mut dyn MemoryPort, w: Width, m: usize, n: usize) -> Flow {
    let addr = st.r[0].wrapping_add(st.reg(n));
    w.store(mem, addr, st.reg(m));
    Flow::next(st)
}

/// MOV.x @(R0,Rm),Rn
pub fn mov_load_indexed(st: &mut ProcessorState, mem: &mut dyn MemoryPort, w: Width, m: usize, n: usize) -> Flow {
    let addr = st.r[0].wrapping_add(st.reg(m));
    let val = w.load(mem, addr);
    st.set_reg(n, val);
    Flow::next(st)
}

/// MOV.B/W R0,@(disp,Rn) and MOV.L Rm,@(disp,Rn); `disp` is the 4-bit field
pub fn mov_store_disp(
    st: &mut ProcessorState,
    mem: &mut dyn MemoryPort,
    w: Width,
    m: usize,
    disp: u8,
    n: usize,
) -> Flow {
    let addr = st.reg(n).wrapping_add((disp as u32 & 0xF) * w.bytes());
    w.store(mem, addr, st.reg(m));
    Flow::next(st)
}

/// MOV.B/W @(disp,Rm),R0 and MOV.L @(disp,Rm),Rn; `disp` is the 4-bit field
pub fn mov_load_disp(
    st: &mut ProcessorState,
    mem: &mut dyn MemoryPort,
    w: Width,
    disp: u8,
    m: usize,
    n: usize,
) -> Flow {
    let addr = st.reg(m).wrapping_add((disp as u32 & 0xF) * w.bytes());
    let val = w.load(mem, addr);
    st.set_reg(n, val);
    Flow::next(st)
}

/// MOV.x R0,@(disp,GBR)
pub fn mov_store_gbr(st: &mut ProcessorState, mem: &mut dyn MemoryPort, w: Width, disp: u8) -> Flow {
    let addr = st.gbr.wrapping_add(disp as u32 * w.bytes());
    w.store(mem, addr, st.r[0]);
    Flow::next(st)
}

/// MOV.x @(disp,GBR),R0
pub fn mov_load_gbr(st: &mut ProcessorState, mem: &mut dyn MemoryPort, w: Width, disp: u8) -> Flow {
    let addr = st.gbr.wrapping_add(disp as u32 * w.bytes());
    st.r[0] = w.load(mem, addr);
    Flow::next(st)
}

/// MOV.W/L @(disp,PC),Rn - literal pool load
///
/// The base is PC + 4; the long form clears the low two bits of PC first.
pub fn mov_load_pc(st: &mut ProcessorState, mem: &mut dyn MemoryPort, w: Width, disp: u8, n: usize) -> Flow {
    let base = match w {
        Width::Long => st.pc & !3,
        _ => st.pc,
    };
    let addr = base.wrapping_add(4).wrapping_add(disp as u32 * w.bytes());
    let val = w.load(mem, addr);
    st.set_reg(n, val);
    Flow::next(st)
}
