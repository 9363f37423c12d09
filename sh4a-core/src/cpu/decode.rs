//! Opcode dispatch
//!
//! Maps a 16-bit instruction word to its semantics function through a
//! `(mask, key)` table. Field extraction happens here so the functions in
//! [`ops`](super::ops) only ever see register numbers and raw immediates.

use once_cell::sync::Lazy;

use super::ops::control::{CtrlReg, SysReg};
use super::ops::load_store::Width;
use super::ops::{alu, branch, control, divide, load_store, multiply, shift};
use super::{Flow, ProcessorState};
use crate::memory::MemoryPort;
use crate::{Sh4Error, Sh4Result};

/// Semantics entry point for one opcode pattern
pub type Handler = fn(&mut ProcessorState, &mut dyn MemoryPort, u16) -> Flow;

/// Anything that can run one instruction word against a state
pub trait Execute {
    fn execute(&mut self, st: &mut ProcessorState, mem: &mut dyn MemoryPort, instr: u16) -> Sh4Result<Flow>;
}

impl<F> Execute for F
where
    F: FnMut(&mut ProcessorState, &mut dyn MemoryPort, u16) -> Sh4Result<Flow>,
{
    fn execute(&mut self, st: &mut ProcessorState, mem: &mut dyn MemoryPort, instr: u16) -> Sh4Result<Flow> {
        self(st, mem, instr)
    }
}

/// One row of the opcode table
#[derive(Debug, Clone, Copy)]
pub struct Opcode {
    pub mask: u16,
    pub key: u16,
    pub mnemonic: &'static str,
    pub handler: Handler,
}

impl Opcode {
    pub fn matches(&self, instr: u16) -> bool {
        instr & self.mask == self.key
    }
}

const MASK_NONE: u16 = 0xFFFF;
const MASK_N: u16 = 0xF0FF;
const MASK_N_M: u16 = 0xF00F;
const MASK_N_BANK: u16 = 0xF08F;
const MASK_IMM8: u16 = 0xFF00;
const MASK_OP: u16 = 0xF000;

const NO_ENTRY: u16 = u16::MAX;

#[inline]
fn rn(i: u16) -> usize {
    ((i >> 8) & 0xF) as usize
}

#[inline]
fn rm(i: u16) -> usize {
    ((i >> 4) & 0xF) as usize
}

#[inline]
fn imm8(i: u16) -> u8 {
    i as u8
}

#[inline]
fn disp4(i: u16) -> u8 {
    (i & 0xF) as u8
}

#[inline]
fn disp12(i: u16) -> u16 {
    i & 0xFFF
}

#[inline]
fn bank(i: u16) -> CtrlReg {
    CtrlReg::Bank(((i >> 4) & 0x7) as u8)
}

fn op(mask: u16, key: u16, mnemonic: &'static str, handler: Handler) -> Opcode {
    Opcode { mask, key, mnemonic, handler }
}

#[rustfmt::skip]
fn opcode_table() -> Vec<Opcode> {
    use Width::{Byte, Long, Word};

    vec![
        // ====================================================================
        // 0000 group
        // ====================================================================
        op(MASK_N, 0x0002, "stc SR,Rn", |st, _, i| control::stc(st, CtrlReg::Sr, rn(i))),
        op(MASK_N, 0x0012, "stc GBR,Rn", |st, _, i| control::stc(st, CtrlReg::Gbr, rn(i))),
        op(MASK_N, 0x0022, "stc VBR,Rn", |st, _, i| control::stc(st, CtrlReg::Vbr, rn(i))),
        op(MASK_N, 0x0032, "stc SSR,Rn", |st, _, i| control::stc(st, CtrlReg::Ssr, rn(i))),
        op(MASK_N, 0x0042, "stc SPC,Rn", |st, _, i| control::stc(st, CtrlReg::Spc, rn(i))),
        op(MASK_N, 0x003A, "stc SGR,Rn", |st, _, i| control::stc(st, CtrlReg::Sgr, rn(i))),
        op(MASK_N, 0x00FA, "stc DBR,Rn", |st, _, i| control::stc(st, CtrlReg::Dbr, rn(i))),
        op(MASK_N_BANK, 0x0082, "stc R_BANK,Rn", |st, _, i| control::stc(st, bank(i), rn(i))),
        op(MASK_N, 0x0003, "bsrf Rn", |st, _, i| branch::bsrf(st, rn(i))),
        op(MASK_N, 0x0023, "braf Rn", |st, _, i| branch::braf(st, rn(i))),
        op(MASK_N, 0x0083, "pref @Rn", |st, _, _| control::nop(st)),
        op(MASK_N, 0x0093, "ocbi @Rn", |st, _, _| control::nop(st)),
        op(MASK_N, 0x00A3, "ocbp @Rn", |st, _, _| control::nop(st)),
        op(MASK_N, 0x00B3, "ocbwb @Rn", |st, _, _| control::nop(st)),
        op(MASK_N, 0x00C3, "movca.l R0,@Rn", |st, mem, i| load_store::movca_l(st, mem, rn(i))),
        op(MASK_N, 0x00E3, "icbi @Rn", |st, _, i| control::icbi(st, rn(i))),
        op(MASK_NONE, 0x00AB, "synco", |st, _, _| control::nop(st)),
        op(MASK_N_M, 0x0004, "mov.b Rm,@(R0,Rn)", |st, mem, i| load_store::mov_store_indexed(st, mem, Byte, rm(i), rn(i))),
        op(MASK_N_M, 0x0005, "mov.w Rm,@(R0,Rn)", |st, mem, i| load_store::mov_store_indexed(st, mem, Word, rm(i), rn(i))),
        op(MASK_N_M, 0x0006, "mov.l Rm,@(R0,Rn)", |st, mem, i| load_store::mov_store_indexed(st, mem, Long, rm(i), rn(i))),
        op(MASK_N_M, 0x0007, "mul.l Rm,Rn", |st, _, i| multiply::mul_l(st, rm(i), rn(i))),
        op(MASK_NONE, 0x0008, "clrt", |st, _, _| control::clrt(st)),
        op(MASK_NONE, 0x0018, "sett", |st, _, _| control::sett(st)),
        op(MASK_NONE, 0x0028, "clrmac", |st, _, _| control::clrmac(st)),
        op(MASK_NONE, 0x0038, "ldtlb", |st, _, _| control::ldtlb(st)),
        op(MASK_NONE, 0x0048, "clrs", |st, _, _| control::clrs(st)),
        op(MASK_NONE, 0x0058, "sets", |st, _, _| control::sets(st)),
        op(MASK_NONE, 0x0009, "nop", |st, _, _| control::nop(st)),
        op(MASK_NONE, 0x0019, "div0u", |st, _, _| divide::div0u(st)),
        op(MASK_N, 0x0029, "movt Rn", |st, _, i| alu::movt(st, rn(i))),
        op(MASK_N, 0x000A, "sts MACH,Rn", |st, _, i| control::sts(st, SysReg::Mach, rn(i))),
        op(MASK_N, 0x001A, "sts MACL,Rn", |st, _, i| control::sts(st, SysReg::Macl, rn(i))),
        op(MASK_N, 0x002A, "sts PR,Rn", |st, _, i| control::sts(st, SysReg::Pr, rn(i))),
        op(MASK_NONE, 0x000B, "rts", |st, _, _| branch::rts(st)),
        op(MASK_NONE, 0x001B, "sleep", |st, _, _| control::sleep(st)),
        op(MASK_NONE, 0x002B, "rte", |st, _, _| branch::rte(st)),
        op(MASK_N_M, 0x000C, "mov.b @(R0,Rm),Rn", |st, mem, i| load_store::mov_load_indexed(st, mem, Byte, rm(i), rn(i))),
        op(MASK_N_M, 0x000D, "mov.w @(R0,Rm),Rn", |st, mem, i| load_store::mov_load_indexed(st, mem, Word, rm(i), rn(i))),
        op(MASK_N_M, 0x000E, "mov.l @(R0,Rm),Rn", |st, mem, i| load_store::mov_load_indexed(st, mem, Long, rm(i), rn(i))),
        op(MASK_N_M, 0x000F, "mac.l @Rm+,@Rn+", |st, mem, i| multiply::mac_l(st, mem, rm(i), rn(i))),
        // ====================================================================
        // 0001 / 0101: long displacement moves
        // ====================================================================
        op(MASK_OP, 0x1000, "mov.l Rm,@(disp,Rn)", |st, mem, i| load_store::mov_store_disp(st, mem, Long, rm(i), disp4(i), rn(i))),
        op(MASK_OP, 0x5000, "mov.l @(disp,Rm),Rn", |st, mem, i| load_store::mov_load_disp(st, mem, Long, disp4(i), rm(i), rn(i))),
        // ====================================================================
        // 0010 group
        // ====================================================================
        op(MASK_N_M, 0x2000, "mov.b Rm,@Rn", |st, mem, i| load_store::mov_store(st, mem, Byte, rm(i), rn(i))),
        op(MASK_N_M, 0x2001, "mov.w Rm,@Rn", |st, mem, i| load_store::mov_store(st, mem, Word, rm(i), rn(i))),
        op(MASK_N_M, 0x2002, "mov.l Rm,@Rn", |st, mem, i| load_store::mov_store(st, mem, Long, rm(i), rn(i))),
        op(MASK_N_M, 0x2004, "mov.b Rm,@-Rn", |st, mem, i| load_store::mov_store_predec(st, mem, Byte, rm(i), rn(i))),
        op(MASK_N_M, 0x2005, "mov.w Rm,@-Rn", |st, mem, i| load_store::mov_store_predec(st, mem, Word, rm(i), rn(i))),
        op(MASK_N_M, 0x2006, "mov.l Rm,@-Rn", |st, mem, i| load_store::mov_store_predec(st, mem, Long, rm(i), rn(i))),
        op(MASK_N_M, 0x2007, "div0s Rm,Rn", |st, _, i| divide::div0s(st, rm(i), rn(i))),
        op(MASK_N_M, 0x2008, "tst Rm,Rn", |st, _, i| alu::tst(st, rm(i), rn(i))),
        op(MASK_N_M, 0x2009, "and Rm,Rn", |st, _, i| alu::and(st, rm(i), rn(i))),
        op(MASK_N_M, 0x200A, "xor Rm,Rn", |st, _, i| alu::xor(st, rm(i), rn(i))),
        op(MASK_N_M, 0x200B, "or Rm,Rn", |st, _, i| alu::or(st, rm(i), rn(i))),
        op(MASK_N_M, 0x200C, "cmp/str Rm,Rn", |st, _, i| alu::cmp_str(st, rm(i), rn(i))),
        op(MASK_N_M, 0x200D, "xtrct Rm,Rn", |st, _, i| alu::xtrct(st, rm(i), rn(i))),
        op(MASK_N_M, 0x200E, "mulu.w Rm,Rn", |st, _, i| multiply::mulu_w(st, rm(i), rn(i))),
        op(MASK_N_M, 0x200F, "muls.w Rm,Rn", |st, _, i| multiply::muls_w(st, rm(i), rn(i))),
        // ====================================================================
        // 0011 group
        // ====================================================================
        op(MASK_N_M, 0x3000, "cmp/eq Rm,Rn", |st, _, i| alu::cmp_eq(st, rm(i), rn(i))),
        op(MASK_N_M, 0x3002, "cmp/hs Rm,Rn", |st, _, i| alu::cmp_hs(st, rm(i), rn(i))),
        op(MASK_N_M, 0x3003, "cmp/ge Rm,Rn", |st, _, i| alu::cmp_ge(st, rm(i), rn(i))),
        op(MASK_N_M, 0x3004, "div1 Rm,Rn", |st, _, i| divide::div1(st, rm(i), rn(i))),
        op(MASK_N_M, 0x3005, "dmulu.l Rm,Rn", |st, _, i| multiply::dmulu_l(st, rm(i), rn(i))),
        op(MASK_N_M, 0x3006, "cmp/hi Rm,Rn", |st, _, i| alu::cmp_hi(st, rm(i), rn(i))),
        op(MASK_N_M, 0x3007, "cmp/gt Rm,Rn", |st, _, i| alu::cmp_gt(st, rm(i), rn(i))),
        op(MASK_N_M, 0x3008, "sub Rm,Rn", |st, _, i| alu::sub(st, rm(i), rn(i))),
        op(MASK_N_M, 0x300A, "subc Rm,Rn", |st, _, i| alu::subc(st, rm(i), rn(i))),
        op(MASK_N_M, 0x300B, "subv Rm,Rn", |st, _, i| alu::subv(st, rm(i), rn(i))),
        op(MASK_N_M, 0x300C, "add Rm,Rn", |st, _, i| alu::add(st, rm(i), rn(i))),
        op(MASK_N_M, 0x300D, "dmuls.l Rm,Rn", |st, _, i| multiply::dmuls_l(st, rm(i), rn(i))),
        op(MASK_N_M, 0x300E, "addc Rm,Rn", |st, _, i| alu::addc(st, rm(i), rn(i))),
        op(MASK_N_M, 0x300F, "addv Rm,Rn", |st, _, i| alu::addv(st, rm(i), rn(i))),
        // ====================================================================
        // 0100 group
        // ====================================================================
        op(MASK_N, 0x4000, "shll Rn", |st, _, i| shift::shll(st, rn(i))),
        op(MASK_N, 0x4001, "shlr Rn", |st, _, i| shift::shlr(st, rn(i))),
        op(MASK_N, 0x4002, "sts.l MACH,@-Rn", |st, mem, i| control::sts_l(st, mem, SysReg::Mach, rn(i))),
        op(MASK_N, 0x4003, "stc.l SR,@-Rn", |st, mem, i| control::stc_l(st, mem, CtrlReg::Sr, rn(i))),
        op(MASK_N, 0x4004, "rotl Rn", |st, _, i| shift::rotl(st, rn(i))),
        op(MASK_N, 0x4005, "rotr Rn", |st, _, i| shift::rotr(st, rn(i))),
        op(MASK_N, 0x4006, "lds.l @Rm+,MACH", |st, mem, i| control::lds_l(st, mem, rn(i), SysReg::Mach)),
        op(MASK_N, 0x4007, "ldc.l @Rm+,SR", |st, mem, i| control::ldc_l(st, mem, rn(i), CtrlReg::Sr)),
        op(MASK_N, 0x4008, "shll2 Rn", |st, _, i| shift::shll_by(st, rn(i), 2)),
        op(MASK_N, 0x4009, "shlr2 Rn", |st, _, i| shift::shlr_by(st, rn(i), 2)),
        op(MASK_N, 0x400A, "lds Rm,MACH", |st, _, i| control::lds(st, rn(i), SysReg::Mach)),
        op(MASK_N, 0x400B, "jsr @Rn", |st, _, i| branch::jsr(st, rn(i))),
        op(MASK_N, 0x400E, "ldc Rm,SR", |st, _, i| control::ldc(st, rn(i), CtrlReg::Sr)),
        op(MASK_N, 0x4010, "dt Rn", |st, _, i| alu::dt(st, rn(i))),
        op(MASK_N, 0x4011, "cmp/pz Rn", |st, _, i| alu::cmp_pz(st, rn(i))),
        op(MASK_N, 0x4012, "sts.l MACL,@-Rn", |st, mem, i| control::sts_l(st, mem, SysReg::Macl, rn(i))),
        op(MASK_N, 0x4013, "stc.l GBR,@-Rn", |st, mem, i| control::stc_l(st, mem, CtrlReg::Gbr, rn(i))),
        op(MASK_N, 0x4015, "cmp/pl Rn", |st, _, i| alu::cmp_pl(st, rn(i))),
        op(MASK_N, 0x4016, "lds.l @Rm+,MACL", |st, mem, i| control::lds_l(st, mem, rn(i), SysReg::Macl)),
        op(MASK_N, 0x4017, "ldc.l @Rm+,GBR", |st, mem, i| control::ldc_l(st, mem, rn(i), CtrlReg::Gbr)),
        op(MASK_N, 0x4018, "shll8 Rn", |st, _, i| shift::shll_by(st, rn(i), 8)),
        op(MASK_N, 0x4019, "shlr8 Rn", |st, _, i| shift::shlr_by(st, rn(i), 8)),
        op(MASK_N, 0x401A, "lds Rm,MACL", |st, _, i| control::lds(st, rn(i), SysReg::Macl)),
        op(MASK_N, 0x401B, "tas.b @Rn", |st, mem, i| alu::tas_b(st, mem, rn(i))),
        op(MASK_N, 0x401E, "ldc Rm,GBR", |st, _, i| control::ldc(st, rn(i), CtrlReg::Gbr)),
        op(MASK_N, 0x4020, "shal Rn", |st, _, i| shift::shll(st, rn(i))),
        op(MASK_N, 0x4021, "shar Rn", |st, _, i| shift::shar(st, rn(i))),
        op(MASK_N, 0x4022, "sts.l PR,@-Rn", |st, mem, i| control::sts_l(st, mem, SysReg::Pr, rn(i))),
        op(MASK_N, 0x4023, "stc.l VBR,@-Rn", |st, mem, i| control::stc_l(st, mem, CtrlReg::Vbr, rn(i))),
        op(MASK_N, 0x4024, "rotcl Rn", |st, _, i| shift::rotcl(st, rn(i))),
        op(MASK_N, 0x4025, "rotcr Rn", |st, _, i| shift::rotcr(st, rn(i))),
        op(MASK_N, 0x4026, "lds.l @Rm+,PR", |st, mem, i| control::lds_l(st, mem, rn(i), SysReg::Pr)),
        op(MASK_N, 0x4027, "ldc.l @Rm+,VBR", |st, mem, i| control::ldc_l(st, mem, rn(i), CtrlReg::Vbr)),
        op(MASK_N, 0x4028, "shll16 Rn", |st, _, i| shift::shll_by(st, rn(i), 16)),
        op(MASK_N, 0x4029, "shlr16 Rn", |st, _, i| shift::shlr_by(st, rn(i), 16)),
        op(MASK_N, 0x402A, "lds Rm,PR", |st, _, i| control::lds(st, rn(i), SysReg::Pr)),
        op(MASK_N, 0x402B, "jmp @Rn", |st, _, i| branch::jmp(st, rn(i))),
        op(MASK_N, 0x402E, "ldc Rm,VBR", |st, _, i| control::ldc(st, rn(i), CtrlReg::Vbr)),
        op(MASK_N, 0x4032, "stc.l SGR,@-Rn", |st, mem, i| control::stc_l(st, mem, CtrlReg::Sgr, rn(i))),
        op(MASK_N, 0x4033, "stc.l SSR,@-Rn", |st, mem, i| control::stc_l(st, mem, CtrlReg::Ssr, rn(i))),
        op(MASK_N, 0x4036, "ldc.l @Rm+,SGR", |st, mem, i| control::ldc_l(st, mem, rn(i), CtrlReg::Sgr)),
        op(MASK_N, 0x4037, "ldc.l @Rm+,SSR", |st, mem, i| control::ldc_l(st, mem, rn(i), CtrlReg::Ssr)),
        op(MASK_N, 0x403A, "ldc Rm,SGR", |st, _, i| control::ldc(st, rn(i), CtrlReg::Sgr)),
        op(MASK_N, 0x403E, "ldc Rm,SSR", |st, _, i| control::ldc(st, rn(i), CtrlReg::Ssr)),
        op(MASK_N, 0x4043, "stc.l SPC,@-Rn", |st, mem, i| control::stc_l(st, mem, CtrlReg::Spc, rn(i))),
        op(MASK_N, 0x4047, "ldc.l @Rm+,SPC", |st, mem, i| control::ldc_l(st, mem, rn(i), CtrlReg::Spc)),
        op(MASK_N, 0x404E, "ldc Rm,SPC", |st, _, i| control::ldc(st, rn(i), CtrlReg::Spc)),
        op(MASK_N, 0x40F2, "stc.l DBR,@-Rn", |st, mem, i| control::stc_l(st, mem, CtrlReg::Dbr, rn(i))),
        op(MASK_N, 0x40F6, "ldc.l @Rm+,DBR", |st, mem, i| control::ldc_l(st, mem, rn(i), CtrlReg::Dbr)),
        op(MASK_N, 0x40FA, "ldc Rm,DBR", |st, _, i| control::ldc(st, rn(i), CtrlReg::Dbr)),
        op(MASK_N_BANK, 0x4083, "stc.l R_BANK,@-Rn", |st, mem, i| control::stc_l(st, mem, bank(i), rn(i))),
        op(MASK_N_BANK, 0x4087, "ldc.l @Rm+,R_BANK", |st, mem, i| control::ldc_l(st, mem, rn(i), bank(i))),
        op(MASK_N_BANK, 0x408E, "ldc Rm,R_BANK", |st, _, i| control::ldc(st, rn(i), bank(i))),
        op(MASK_N_M, 0x400C, "shad Rm,Rn", |st, _, i| shift::shad(st, rm(i), rn(i))),
        op(MASK_N_M, 0x400D, "shld Rm,Rn", |st, _, i| shift::shld(st, rm(i), rn(i))),
        op(MASK_N_M, 0x400F, "mac.w @Rm+,@Rn+", |st, mem, i| multiply::mac_w(st, mem, rm(i), rn(i))),
        // ====================================================================
        // 0110 group
        // ====================================================================
        op(MASK_N_M, 0x6000, "mov.b @Rm,Rn", |st, mem, i| load_store::mov_load(st, mem, Byte, rm(i), rn(i))),
        op(MASK_N_M, 0x6001, "mov.w @Rm,Rn", |st, mem, i| load_store::mov_load(st, mem, Word, rm(i), rn(i))),
        op(MASK_N_M, 0x6002, "mov.l @Rm,Rn", |st, mem, i| load_store::mov_load(st, mem, Long, rm(i), rn(i))),
        op(MASK_N_M, 0x6003, "mov Rm,Rn", |st, _, i| load_store::mov(st, rm(i), rn(i))),
        op(MASK_N_M, 0x6004, "mov.b @Rm+,Rn", |st, mem, i| load_store::mov_load_postinc(st, mem, Byte, rm(i), rn(i))),
        op(MASK_N_M, 0x6005, "mov.w @Rm+,Rn", |st, mem, i| load_store::mov_load_postinc(st, mem, Word, rm(i), rn(i))),
        op(MASK_N_M, 0x6006, "mov.l @Rm+,Rn", |st, mem, i| load_store::mov_load_postinc(st, mem, Long, rm(i), rn(i))),
        op(MASK_N_M, 0x6007, "not Rm,Rn", |st, _, i| alu::not(st, rm(i), rn(i))),
        op(MASK_N_M, 0x6008, "swap.b Rm,Rn", |st, _, i| alu::swap_b(st, rm(i), rn(i))),
        op(MASK_N_M, 0x6009, "swap.w Rm,Rn", |st, _, i| alu::swap_w(st, rm(i), rn(i))),
        op(MASK_N_M, 0x600A, "negc Rm,Rn", |st, _, i| alu::negc(st, rm(i), rn(i))),
        op(MASK_N_M, 0x600B, "neg Rm,Rn", |st, _, i| alu::neg(st, rm(i), rn(i))),
        op(MASK_N_M, 0x600C, "extu.b Rm,Rn", |st, _, i| alu::extu_b(st, rm(i), rn(i))),
        op(MASK_N_M, 0x600D, "extu.w Rm,Rn", |st, _, i| alu::extu_w(st, rm(i), rn(i))),
        op(MASK_N_M, 0x600E, "exts.b Rm,Rn", |st, _, i| alu::exts_b(st, rm(i), rn(i))),
        op(MASK_N_M, 0x600F, "exts.w Rm,Rn", |st, _, i| alu::exts_w(st, rm(i), rn(i))),
        // ====================================================================
        // 0111: ADD #imm
        // ====================================================================
        op(MASK_OP, 0x7000, "add #imm,Rn", |st, _, i| alu::add_imm(st, imm8(i), rn(i))),
        // ====================================================================
        // 1000 group: R0 displacement moves, CMP/EQ #imm, conditional branches
        // ====================================================================
        op(MASK_IMM8, 0x8000, "mov.b R0,@(disp,Rn)", |st, mem, i| load_store::mov_store_disp(st, mem, Byte, 0, disp4(i), rm(i))),
        op(MASK_IMM8, 0x8100, "mov.w R0,@(disp,Rn)", |st, mem, i| load_store::mov_store_disp(st, mem, Word, 0, disp4(i), rm(i))),
        op(MASK_IMM8, 0x8400, "mov.b @(disp,Rm),R0", |st, mem, i| load_store::mov_load_disp(st, mem, Byte, disp4(i), rm(i), 0)),
        op(MASK_IMM8, 0x8500, "mov.w @(disp,Rm),R0", |st, mem, i| load_store::mov_load_disp(st, mem, Word, disp4(i), rm(i), 0)),
        op(MASK_IMM8, 0x8800, "cmp/eq #imm,R0", |st, _, i| alu::cmp_eq_imm(st, imm8(i))),
        op(MASK_IMM8, 0x8900, "bt label", |st, _, i| branch::bt(st, imm8(i))),
        op(MASK_IMM8, 0x8B00, "bf label", |st, _, i| branch::bf(st, imm8(i))),
        op(MASK_IMM8, 0x8D00, "bt/s label", |st, _, i| branch::bt_s(st, imm8(i))),
        op(MASK_IMM8, 0x8F00, "bf/s label", |st, _, i| branch::bf_s(st, imm8(i))),
        // ====================================================================
        // 1001 / 1101: PC-relative loads, 1010 / 1011: BRA / BSR
        // ====================================================================
        op(MASK_OP, 0x9000, "mov.w @(disp,PC),Rn", |st, mem, i| load_store::mov_load_pc(st, mem, Word, imm8(i), rn(i))),
        op(MASK_OP, 0xD000, "mov.l @(disp,PC),Rn", |st, mem, i| load_store::mov_load_pc(st, mem, Long, imm8(i), rn(i))),
        op(MASK_OP, 0xA000, "bra label", |st, _, i| branch::bra(st, disp12(i))),
        op(MASK_OP, 0xB000, "bsr label", |st, _, i| branch::bsr(st, disp12(i))),
        // ====================================================================
        // 1100 group: GBR-relative, immediate logic
        // ====================================================================
        op(MASK_IMM8, 0xC000, "mov.b R0,@(disp,GBR)", |st, mem, i| load_store::mov_store_gbr(st, mem, Byte, imm8(i))),
        op(MASK_IMM8, 0xC100, "mov.w R0,@(disp,GBR)", |st, mem, i| load_store::mov_store_gbr(st, mem, Word, imm8(i))),
        op(MASK_IMM8, 0xC200, "mov.l R0,@(disp,GBR)", |st, mem, i| load_store::mov_store_gbr(st, mem, Long, imm8(i))),
        op(MASK_IMM8, 0xC400, "mov.b @(disp,GBR),R0", |st, mem, i| load_store::mov_load_gbr(st, mem, Byte, imm8(i))),
        op(MASK_IMM8, 0xC500, "mov.w @(disp,GBR),R0", |st, mem, i| load_store::mov_load_gbr(st, mem, Word, imm8(i))),
        op(MASK_IMM8, 0xC600, "mov.l @(disp,GBR),R0", |st, mem, i| load_store::mov_load_gbr(st, mem, Long, imm8(i))),
        op(MASK_IMM8, 0xC700, "mova @(disp,PC),R0", |st, _, i| load_store::mova(st, imm8(i))),
        op(MASK_IMM8, 0xC800, "tst #imm,R0", |st, _, i| alu::tst_imm(st, imm8(i))),
        op(MASK_IMM8, 0xC900, "and #imm,R0", |st, _, i| alu::and_imm(st, imm8(i))),
        op(MASK_IMM8, 0xCA00, "xor #imm,R0", |st, _, i| alu::xor_imm(st, imm8(i))),
        op(MASK_IMM8, 0xCB00, "or #imm,R0", |st, _, i| alu::or_imm(st, imm8(i))),
        op(MASK_IMM8, 0xCC00, "tst.b #imm,@(R0,GBR)", |st, mem, i| alu::tst_b(st, mem, imm8(i))),
        op(MASK_IMM8, 0xCD00, "and.b #imm,@(R0,GBR)", |st, mem, i| alu::and_b(st, mem, imm8(i))),
        op(MASK_IMM8, 0xCE00, "xor.b #imm,@(R0,GBR)", |st, mem, i| alu::xor_b(st, mem, imm8(i))),
        op(MASK_IMM8, 0xCF00, "or.b #imm,@(R0,GBR)", |st, mem, i| alu::or_b(st, mem, imm8(i))),
        // ====================================================================
        // 1110: MOV #imm
        // ====================================================================
        op(MASK_OP, 0xE000, "mov #imm,Rn", |st, _, i| load_store::mov_imm(st, imm8(i), rn(i))),
    ]
}

static OPCODES: Lazy<Vec<Opcode>> = Lazy::new(opcode_table);

/// Index into `OPCODES` for every possible instruction word.
static LOOKUP: Lazy<Vec<u16>> = Lazy::new(|| {
    let mut lookup = vec![NO_ENTRY; 0x10000];
    for (idx, op) in OPCODES.iter().enumerate() {
        // Walk every value of the bits the mask leaves free.
        let free = !op.mask;
        let mut bits: u16 = 0;
        loop {
            lookup[(op.key | bits) as usize] = idx as u16;
            if bits == free {
                break;
            }
            bits = bits.wrapping_sub(free) & free;
        }
    }
    tracing::debug!("SH-4A opcode table built: {} patterns", OPCODES.len());
    lookup
});

/// Reference decoder over the opcode table
#[derive(Debug, Default, Clone, Copy)]
pub struct Decoder;

impl Decoder {
    pub fn new() -> Self {
        Self
    }

    /// Table entry for `instr`, if it is a known instruction
    pub fn decode(instr: u16) -> Option<&'static Opcode> {
        match LOOKUP[instr as usize] {
            NO_ENTRY => None,
            idx => OPCODES.get(idx as usize),
        }
    }

    /// Mnemonic template for `instr`
    pub fn mnemonic(instr: u16) -> &'static str {
        Self::decode(instr).map_or("<illegal>", |op| op.mnemonic)
    }

    /// All known opcode patterns
    pub fn opcodes() -> &'static [Opcode] {
        &OPCODES
    }
}

impl Execute for Decoder {
    fn execute(&mut self, st: &mut ProcessorState, mem: &mut dyn MemoryPort, instr: u16) -> Sh4Result<Flow> {
        match Self::decode(instr) {
            Some(op) => Ok((op.handler)(st, mem, instr)),
            None => {
                tracing::warn!("Illegal instruction {:#06x} at {:#010x}", instr, st.pc);
                Err(Sh4Error::IllegalInstruction { pc: st.pc, instr })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::ops::testing::setup;

    #[test]
    fn test_patterns_do_not_overlap() {
        for op in Decoder::opcodes() {
            let hits = Decoder::opcodes().iter().filter(|o| o.matches(op.key)).count();
            assert_eq!(hits, 1, "{} overlaps another pattern", op.mnemonic);
        }
    }

    #[test]
    fn test_lookup_agrees_with_table() {
        for instr in [0x300C, 0x7FFF, 0xA123, 0x41CE, 0x0082, 0x40F6, 0x6A56, 0x8F80] {
            let op = Decoder::decode(instr).expect("known opcode");
            assert!(op.matches(instr), "{instr:#06x} -> {}", op.mnemonic);
        }
    }

    #[test]
    fn test_decode_mnemonics() {
        assert_eq!(Decoder::mnemonic(0x301C), "add Rm,Rn");
        assert_eq!(Decoder::mnemonic(0xE042), "mov #imm,Rn");
        assert_eq!(Decoder::mnemonic(0x0009), "nop");
        assert_eq!(Decoder::mnemonic(0x412E), "ldc Rm,VBR");
        assert_eq!(Decoder::mnemonic(0x41BE), "ldc Rm,R_BANK");
        assert_eq!(Decoder::mnemonic(0xFFFD), "<illegal>");
        assert_eq!(Decoder::mnemonic(0xC300), "<illegal>");
    }

    #[test]
    fn test_execute_extracts_fields() {
        let (mut st, mut ram) = setup();
        let mut dec = Decoder::new();
        st.r[1] = 20;
        st.r[0] = 10;
        // ADD R1,R0
        let flow = dec.execute(&mut st, &mut ram, 0x301C).unwrap();
        assert_eq!(flow, Flow::Next(0x1002));
        assert_eq!(st.r[0], 30);

        // MOV.B R0,@(3,R2)
        st.r[2] = 0x2000;
        dec.execute(&mut st, &mut ram, 0x8023).unwrap();
        assert_eq!(ram.read8(0x2003), 30);

        // LDC R4,R5_BANK
        st.r[4] = 0x55;
        dec.execute(&mut st, &mut ram, 0x44DE).unwrap();
        assert_eq!(st.r_bank[5], 0x55);
    }

    #[test]
    fn test_illegal_instruction() {
        let (mut st, mut ram) = setup();
        let err = Decoder.execute(&mut st, &mut ram, 0xFFFD).unwrap_err();
        assert!(matches!(err, Sh4Error::IllegalInstruction { pc: 0x1000, instr: 0xFFFD }));
    }
}
