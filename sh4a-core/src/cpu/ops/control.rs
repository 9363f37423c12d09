//! System control: LDC/STC, LDS/STS, flag set/clear and no-ops
//!
//! Privilege is not checked here; every transfer is allowed.

use crate::cpu::{Flow, ProcessorState};
use crate::memory::MemoryPort;

/// Control registers reachable through LDC/STC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlReg {
    Sr,
    Gbr,
    Vbr,
    Sgr,
    Ssr,
    Spc,
    Dbr,
    /// R0_BANK..R7_BANK
    Bank(u8),
}

/// System registers reachable through LDS/STS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysReg {
    Mach,
    Macl,
    Pr,
}

impl CtrlReg {
    fn read(self, st: &ProcessorState) -> u32 {
        match self {
            CtrlReg::Sr => st.sr_word(),
            CtrlReg::Gbr => st.gbr,
            CtrlReg::Vbr => st.vbr,
            CtrlReg::Sgr => st.sgr,
            CtrlReg::Ssr => st.ssr,
            CtrlReg::Spc => st.spc,
            CtrlReg::Dbr => st.dbr,
            CtrlReg::Bank(b) => st.bank(b as usize),
        }
    }

    fn write(self, st: &mut ProcessorState, val: u32) {
        match self {
            CtrlReg::Sr => st.set_sr_word(val),
            CtrlReg::Gbr => st.gbr = val,
            CtrlReg::Vbr => st.vbr = val,
            CtrlReg::Sgr => st.sgr = val,
            CtrlReg::Ssr => st.ssr = val,
            CtrlReg::Spc => st.spc = val,
            CtrlReg::Dbr => st.dbr = val,
            CtrlReg::Bank(b) => st.set_bank(b as usize, val),
        }
    }
}

impl SysReg {
    fn read(self, st: &ProcessorState) -> u32 {
        match self {
            SysReg::Mach => st.mach(),
            SysReg::Macl => st.macl(),
            SysReg::Pr => st.pr,
        }
    }

    fn write(self, st: &mut ProcessorState, val: u32) {
        match self {
            SysReg::Mach => st.set_mach(val),
            SysReg::Macl => st.set_macl(val),
            SysReg::Pr => st.pr = val,
        }
    }
}

/// Pop a long from @Rm, post-incrementing Rm by 4.
fn pop_long(st: &mut ProcessorState, mem: &mut dyn MemoryPort, m: usize) -> u32 {
    let addr = st.reg(m);
    let val = mem.read32(addr);
    st.set_reg(m, addr.wrapping_add(4));
    val
}

/// Push a long to @-Rn.
fn push_long(st: &mut ProcessorState, mem: &mut dyn MemoryPort, n: usize, val: u32) {
    let addr = st.reg(n).wrapping_sub(4);
    mem.write32(addr, val);
    st.set_reg(n, addr);
}

// ============================================================================
// LDC / STC
// ============================================================================

/// LDC Rm,<reg>
pub fn ldc(st: &mut ProcessorState, m: usize, reg: CtrlReg) -> Flow {
    let val = st.reg(m);
    reg.write(st, val);
    Flow::next(st)
}

/// LDC.L @Rm+,<reg>
pub fn ldc_l(st: &mut ProcessorState, mem: &mut dyn MemoryPort, m: usize, reg: CtrlReg) -> Flow {
    let val = pop_long(st, mem, m);
    reg.write(st, val);
    Flow::next(st)
}

/// STC <reg>,Rn
pub fn stc(st: &mut ProcessorState, reg: CtrlReg, n: usize) -> Flow {
    let val = reg.read(st);
    st.set_reg(n, val);
    Flow::next(st)
}

/// STC.L <reg>,@-Rn
pub fn stc_l(st: &mut ProcessorState, mem: &mut dyn MemoryPort, reg: CtrlReg, n: usize) -> Flow {
    let val = reg.read(st);
    push_long(st, mem, n, val);
    Flow::next(st)
}

// ============================================================================
// LDS / STS
// ============================================================================

/// LDS Rm,<reg>
pub fn lds(st: &mut ProcessorState, m: usize, reg: SysReg) -> Flow {
    let val = st.reg(m);
    reg.write(st, val);
    Flow::next(st)
}

/// LDS.L @Rm+,<reg>
pub fn lds_l(st: &mut ProcessorState, mem: &mut dyn MemoryPort, m: usize, reg: SysReg) -> Flow {
    let val = pop_long(st, mem, m);
    reg.write(st, val);
    Flow::next(st)
}

/// STS <reg>,Rn
pub fn sts(st: &mut ProcessorState, reg: SysReg, n: usize) -> Flow {
    let val = reg.read(st);
    st.set_reg(n, val);
    Flow::next(st)
}

/// STS.L <reg>,@-Rn
pub fn sts_l(st: &mut ProcessorState, mem: &mut dyn MemoryPort, reg: SysReg, n: usize) -> Flow {
    let val = reg.read(st);
    push_long(st, mem, n, val);
    Flow::next(st)
}

// ============================================================================
// Flags and no-ops
// ============================================================================

/// CLRT
pub fn clrt(st: &mut ProcessorState) -> Flow {
    st.sr.t = false;
    Flow::next(st)
}

/// SETT
pub fn sett(st: &mut ProcessorState) -> Flow {
    st.sr.t = true;
    Flow::next(st)
}

/// CLRS
pub fn clrs(st: &mut ProcessorState) -> Flow {
    st.sr.s = false;
    Flow::next(st)
}

/// SETS
pub fn sets(st: &mut ProcessorState) -> Flow {
    st.sr.s = true;
    Flow::next(st)
}

/// CLRMAC
pub fn clrmac(st: &mut ProcessorState) -> Flow {
    st.set_mac(0);
    Flow::next(st)
}

/// NOP
pub fn nop(st: &mut ProcessorState) -> Flow {
    Flow::next(st)
}

/// ICBI @Rn - no instruction cache is modelled
pub fn icbi(st: &mut ProcessorState, _n: usize) -> Flow {
    Flow::next(st)
}

/// LDTLB - the TLB lives outside the core
pub fn ldtlb(st: &mut ProcessorState) -> Flow {
    Flow::next(st)
}

/// SLEEP - PC stays on the instruction until something outside the core
/// wakes it, which the run loop reads as a halt
pub fn sleep(st: &mut ProcessorState) -> Flow {
    Flow::Next(st.pc)
}
