//! Arithmetic, logic and compare instructions
//!
//! None of these are delay-slotted; every one falls through to PC + 2.

use super::{sign_extend16, sign_extend8};
use crate::cpu::{Flow, ProcessorState};
use crate::memory::MemoryPort;

// ============================================================================
// Arithmetic
// ============================================================================

/// ADD Rm,Rn
pub fn add(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_reg(n, st.reg(n).wrapping_add(st.reg(m)));
    Flow::next(st)
}

/// ADD #imm,Rn
pub fn add_imm(st: &mut ProcessorState, imm: u8, n: usize) -> Flow {
    st.set_reg(n, st.reg(n).wrapping_add(sign_extend8(imm)));
    Flow::next(st)
}

/// ADDC Rm,Rn
pub fn addc(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    let rn = st.reg(n);
    let (sum, carry0) = rn.overflowing_add(st.reg(m));
    let (result, carry1) = sum.overflowing_add(st.t_bit());
    st.set_reg(n, result);
    st.set_t(carry0 || carry1);
    Flow::next(st)
}

/// ADDV Rm,Rn
///
/// Overflow is detected from sign bits: the operands agree in sign and the
/// result does not.
pub fn addv(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    let rn = st.reg(n);
    let rm = st.reg(m);
    let result = rn.wrapping_add(rm);

    let dest = rn >> 31;
    let src = (rm >> 31) + dest;
    let ans = (result >> 31) + dest;

    st.set_reg(n, result);
    st.set_t((src == 0 || src == 2) && ans == 1);
    Flow::next(st)
}

/// SUB Rm,Rn
pub fn sub(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_reg(n, st.reg(n).wrapping_sub(st.reg(m)));
    Flow::next(st)
}

/// SUBC Rm,Rn
pub fn subc(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    let rn = st.reg(n);
    let (diff, borrow0) = rn.overflowing_sub(st.reg(m));
    let (result, borrow1) = diff.overflowing_sub(st.t_bit());
    st.set_reg(n, result);
    st.set_t(borrow0 || borrow1);
    Flow::next(st)
}

/// SUBV Rm,Rn
pub fn subv(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    let (result, overflow) = (st.reg(n) as i32).overflowing_sub(st.reg(m) as i32);
    st.set_reg(n, result as u32);
    st.set_t(overflow);
    Flow::next(st)
}

/// NEG Rm,Rn
pub fn neg(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_reg(n, 0u32.wrapping_sub(st.reg(m)));
    Flow::next(st)
}

/// NEGC Rm,Rn
pub fn negc(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    let (temp, borrow0) = 0u32.overflowing_sub(st.reg(m));
    let (result, borrow1) = temp.overflowing_sub(st.t_bit());
    st.set_reg(n, result);
    st.set_t(borrow0 || borrow1);
    Flow::next(st)
}

/// DT Rn
pub fn dt(st: &mut ProcessorState, n: usize) -> Flow {
    let result = st.reg(n).wrapping_sub(1);
    st.set_reg(n, result);
    st.set_t(result == 0);
    Flow::next(st)
}

// ============================================================================
// Logic
// ============================================================================

/// AND Rm,Rn
pub fn and(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_reg(n, st.reg(n) & st.reg(m));
    Flow::next(st)
}

/// AND #imm,R0
pub fn and_imm(st: &mut ProcessorState, imm: u8) -> Flow {
    st.r[0] &= imm as u32;
    Flow::next(st)
}

/// AND.B #imm,@(R0,GBR)
pub fn and_b(st: &mut ProcessorState, mem: &mut dyn MemoryPort, imm: u8) -> Flow {
    let addr = st.gbr.wrapping_add(st.r[0]);
    let val = mem.read8(addr);
    mem.write8(addr, val & imm);
    Flow::next(st)
}

/// OR Rm,Rn
pub fn or(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_reg(n, st.reg(n) | st.reg(m));
    Flow::next(st)
}

/// OR #imm,R0
pub fn or_imm(st: &mut ProcessorState, imm: u8) -> Flow {
    st.r[0] |= imm as u32;
    Flow::next(st)
}

/// OR.B #imm,@(R0,GBR)
pub fn or_b(st: &mut ProcessorState, mem: &mut dyn MemoryPort, imm: u8) -> Flow {
    let addr = st.gbr.wrapping_add(st.r[0]);
    let val = mem.read8(addr);
    mem.write8(addr, val | imm);
    Flow::next(st)
}

/// XOR Rm,Rn
pub fn xor(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_reg(n, st.reg(n) ^ st.reg(m));
    Flow::next(st)
}

/// XOR #imm,R0
pub fn xor_imm(st: &mut ProcessorState, imm: u8) -> Flow {
    st.r[0] ^= imm as u32;
    Flow::next(st)
}

/// XOR.B #imm,@(R0,GBR)
pub fn xor_b(st: &mut ProcessorState, mem: &mut dyn MemoryPort, imm: u8) -> Flow {
    let addr = st.gbr.wrapping_add(st.r[0]);
    let val = mem.read8(addr);
    mem.write8(addr, val ^ imm);
    Flow::next(st)
}

/// NOT Rm,Rn
pub fn not(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_reg(n, !st.reg(m));
    Flow::next(st)
}

/// TST Rm,Rn
pub fn tst(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_t(st.reg(n) & st.reg(m) == 0);
    Flow::next(st)
}

/// TST #imm,R0
pub fn tst_imm(st: &mut ProcessorState, imm: u8) -> Flow {
    st.set_t(st.r[0] & imm as u32 == 0);
    Flow::next(st)
}

/// TST.B #imm,@(R0,GBR)
pub fn tst_b(st: &mut ProcessorState, mem: &mut dyn MemoryPort, imm: u8) -> Flow {
    let val = mem.read8(st.gbr.wrapping_add(st.r[0]));
    st.set_t(val & imm == 0);
    Flow::next(st)
}

/// TAS.B @Rn
pub fn tas_b(st: &mut ProcessorState, mem: &mut dyn MemoryPort, n: usize) -> Flow {
    let addr = st.reg(n);
    let val = mem.read8(addr);
    st.set_t(val == 0);
    mem.write8(addr, val | 0x80);
    Flow::next(st)
}

// ============================================================================
// Compare
// ============================================================================

/// CMP/EQ Rm,Rn
pub fn cmp_eq(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_t(st.reg(n) == st.reg(m));
    Flow::next(st)
}

/// CMP/GE Rm,Rn (signed >=)
pub fn cmp_ge(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_t(st.reg(n) as i32 >= st.reg(m) as i32);
    Flow::next(st)
}

/// CMP/GT Rm,Rn (signed >)
pub fn cmp_gt(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_t(st.reg(n) as i32 > st.reg(m) as i32);
    Flow::next(st)
}

/// CMP/HI Rm,Rn (unsigned >)
pub fn cmp_hi(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_t(st.reg(n) > st.reg(m));
    Flow::next(st)
}

/// CMP/HS Rm,Rn (unsigned >=)
pub fn cmp_hs(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_t(st.reg(n) >= st.reg(m));
    Flow::next(st)
}

/// CMP/PL Rn
pub fn cmp_pl(st: &mut ProcessorState, n: usize) -> Flow {
    st.set_t(st.reg(n) as i32 > 0);
    Flow::next(st)
}

/// CMP/PZ Rn
pub fn cmp_pz(st: &mut ProcessorState, n: usize) -> Flow {
    st.set_t(st.reg(n) as i32 >= 0);
    Flow::next(st)
}

/// CMP/EQ #imm,R0
pub fn cmp_eq_imm(st: &mut ProcessorState, imm: u8) -> Flow {
    st.set_t(st.r[0] == sign_extend8(imm));
    Flow::next(st)
}

/// CMP/STR Rm,Rn - T is set when any byte position holds equal bytes.
pub fn cmp_str(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    let temp = st.reg(n) ^ st.reg(m);
    st.set_t(temp.to_le_bytes().contains(&0));
    Flow::next(st)
}

// ============================================================================
// Extension and rearrangement
// ============================================================================

/// EXTS.B Rm,Rn
pub fn exts_b(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_reg(n, sign_extend8(st.reg(m) as u8));
    Flow::next(st)
}

/// EXTS.W Rm,Rn
pub fn exts_w(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_reg(n, sign_extend16(st.reg(m) as u16));
    Flow::next(st)
}

/// EXTU.B Rm,Rn
pub fn extu_b(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_reg(n, st.reg(m) & 0xFF);
    Flow::next(st)
}

/// EXTU.W Rm,Rn
pub fn extu_w(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_reg(n, st.reg(m) & 0xFFFF);
    Flow::next(st)
}

/// SWAP.B Rm,Rn - swap the two low bytes
pub fn swap_b(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    let rm = st.reg(m);
    st.set_reg(n, (rm & 0xFFFF0000) | ((rm & 0xFF) << 8) | ((rm >> 8) & 0xFF));
    Flow::next(st)
}

/// SWAP.W Rm,Rn - swap the two halfwords
pub fn swap_w(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_reg(n, st.reg(m).rotate_left(16));
    Flow::next(st)
}

/// XTRCT Rm,Rn - middle 32 bits of Rm:Rn
pub fn xtrct(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_reg(n, (st.reg(m) << 16) | (st.reg(n) >> 16));
    Flow::next(st)
}

/// MOVT Rn
pub fn movt(st: &mut ProcessorState, n: usize) -> Flow {
    st.set_reg(n, st.t_bit());
    Flow::next(st)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::ops::testing::setup;

    #[test]
    fn test_add() {
        let (mut st, _) = setup();
        st.r[1] = 20;
        st.r[2] = 10;
        assert_eq!(add(&mut st, 1, 2), Flow::Next(0x1002));
        assert_eq!(st.r[2], 30);
        assert_eq!(st.r[1], 20);

        st.r[3] = 0xFFFF_FFFF;
        st.r[4] = 2;
        add(&mut st, 3, 4);
        assert_eq!(st.r[4], 1);
        assert!(!st.t());
    }

    #[test]
    fn test_add_same_register() {
        let (mut st, _) = setup();
        st.r[5] = 7;
        add(&mut st, 5, 5);
        assert_eq!(st.r[5], 14);
    }

    #[test]
    fn test_add_imm() {
        let (mut st, _) = setup();
        st.r[0] = 10;
        add_imm(&mut st, 0xFF, 0);
        assert_eq!(st.r[0], 9);
        add_imm(&mut st, 0x7F, 0);
        assert_eq!(st.r[0], 136);
    }

    #[test]
    fn test_addc() {
        let (mut st, _) = setup();
        st.r[0] = 0xFFFF_FFFF;
        st.r[1] = 1;
        addc(&mut st, 0, 1);
        assert_eq!(st.r[1], 0);
        assert!(st.t());

        // Carry produced only by the +T step.
        st.r[2] = 0xFFFF_FFFF;
        st.r[3] = 0;
        addc(&mut st, 3, 2);
        assert_eq!(st.r[2], 0);
        assert!(st.t());

        st.r[4] = 1;
        st.r[5] = 2;
        addc(&mut st, 4, 5);
        assert_eq!(st.r[5], 4);
        assert!(!st.t());
    }

    #[test]
    fn test_addv() {
        let (mut st, _) = setup();
        st.r[0] = 0x7FFF_FFFF;
        st.r[1] = 1;
        addv(&mut st, 1, 0);
        assert_eq!(st.r[0], 0x8000_0000);
        assert!(st.t());

        st.r[0] = 0x8000_0000;
        st.r[1] = 0xFFFF_FFFF;
        addv(&mut st, 1, 0);
        assert_eq!(st.r[0], 0x7FFF_FFFF);
        assert!(st.t());

        st.r[0] = 5;
        st.r[1] = 3;
        addv(&mut st, 1, 0);
        assert!(!st.t());
    }

    #[test]
    fn test_addv_opposite_signs_never_overflow() {
        let (mut st, _) = setup();
        let pairs = [
            (0x7FFF_FFFF, 0x8000_0000),
            (0x0000_0001, 0xFFFF_FFFF),
            (0x8000_0000, 0x0000_0000),
            (0x1234_5678, 0xF000_0000),
        ];
        for (a, b) in pairs {
            st.r[0] = a;
            st.r[1] = b;
            st.set_t(true);
            addv(&mut st, 1, 0);
            assert!(!st.t(), "{a:#x} + {b:#x}");
        }
    }

    #[test]
    fn test_subc_and_subv() {
        let (mut st, _) = setup();
        st.r[0] = 0;
        st.r[1] = 1;
        subc(&mut st, 1, 0);
        assert_eq!(st.r[0], 0xFFFF_FFFF);
        assert!(st.t());

        st.r[2] = 5;
        st.r[3] = 5;
        subc(&mut st, 3, 2);
        assert_eq!(st.r[2], 0xFFFF_FFFF);
        assert!(st.t());

        st.r[4] = 0x8000_0000;
        st.r[5] = 1;
        subv(&mut st, 5, 4);
        assert_eq!(st.r[4], 0x7FFF_FFFF);
        assert!(st.t());
    }

    #[test]
    fn test_negc() {
        let (mut st, _) = setup();
        st.r[1] = 0;
        negc(&mut st, 1, 2);
        assert_eq!(st.r[2], 0);
        assert!(!st.t());

        st.r[1] = 1;
        negc(&mut st, 1, 2);
        assert_eq!(st.r[2], 0xFFFF_FFFF);
        assert!(st.t());
    }

    #[test]
    fn test_dt() {
        let (mut st, _) = setup();
        st.r[7] = 2;
        dt(&mut st, 7);
        assert!(!st.t());
        dt(&mut st, 7);
        assert!(st.t());
        assert_eq!(st.r[7], 0);
    }

    #[test]
    fn test_and_b() {
        let (mut st, mut ram) = setup();
        st.gbr = 0x2000;
        st.r[0] = 0x10;
        ram.write8(0x2010, 0xF3);
        assert_eq!(and_b(&mut st, &mut ram, 0x3C), Flow::Next(0x1002));
        assert_eq!(ram.read8(0x2010), 0x30);
    }

    #[test]
    fn test_logic_imm_zero_extends() {
        let (mut st, _) = setup();
        st.r[0] = 0xFFFF_FFFF;
        and_imm(&mut st, 0x80);
        assert_eq!(st.r[0], 0x80);
        or_imm(&mut st, 0x01);
        assert_eq!(st.r[0], 0x81);
        xor_imm(&mut st, 0xFF);
        assert_eq!(st.r[0], 0x7E);
    }

    #[test]
    fn test_tas_b() {
        let (mut st, mut ram) = setup();
        st.r[3] = 0x3000;
        tas_b(&mut st, &mut ram, 3);
        assert!(st.t());
        assert_eq!(ram.read8(0x3000), 0x80);
        tas_b(&mut st, &mut ram, 3);
        assert!(!st.t());
    }

    #[test]
    fn test_compare_signed_unsigned() {
        let (mut st, _) = setup();
        st.r[0] = 0xFFFF_FFFF; // -1
        st.r[1] = 1;
        cmp_gt(&mut st, 0, 1);
        assert!(st.t());
        cmp_hi(&mut st, 0, 1);
        assert!(!st.t());
        cmp_hs(&mut st, 1, 0);
        assert!(st.t());
        cmp_ge(&mut st, 1, 1);
        assert!(st.t());
        cmp_pz(&mut st, 0);
        assert!(!st.t());
        st.r[2] = 0;
        cmp_pz(&mut st, 2);
        assert!(st.t());
        cmp_pl(&mut st, 2);
        assert!(!st.t());
        assert_eq!(st.r[0], 0xFFFF_FFFF);
        assert_eq!(st.r[1], 1);
    }

    #[test]
    fn test_cmp_eq_imm_sign_extends() {
        let (mut st, _) = setup();
        st.r[0] = 0xFFFF_FF80;
        cmp_eq_imm(&mut st, 0x80);
        assert!(st.t());
        st.r[0] = 0x80;
        cmp_eq_imm(&mut st, 0x80);
        assert!(!st.t());
    }

    #[test]
    fn test_cmp_str() {
        let (mut st, _) = setup();
        st.r[0] = 0x1234_5678;
        st.r[1] = 0x1234_5678;
        cmp_str(&mut st, 0, 1);
        assert!(st.t());

        st.r[1] = 0xEDCB_A987;
        cmp_str(&mut st, 0, 1);
        assert!(!st.t());

        st.r[1] = 0xFF34_FFFF;
        cmp_str(&mut st, 0, 1);
        assert!(st.t());
    }

    #[test]
    fn test_rearrange() {
        let (mut st, _) = setup();
        st.r[0] = 0x1122_3344;
        swap_b(&mut st, 0, 1);
        assert_eq!(st.r[1], 0x1122_4433);
        swap_w(&mut st, 0, 1);
        assert_eq!(st.r[1], 0x3344_1122);
        st.r[2] = 0xAABB_CCDD;
        xtrct(&mut st, 0, 2);
        assert_eq!(st.r[2], 0x3344_AABB);
        exts_b(&mut st, 2, 3);
        assert_eq!(st.r[3], 0xFFFF_FFBB);
        extu_w(&mut st, 2, 3);
        assert_eq!(st.r[3], 0xAABB);
        exts_w(&mut st, 2, 3);
        assert_eq!(st.r[3], 0xFFFF_AABB);
    }
}
