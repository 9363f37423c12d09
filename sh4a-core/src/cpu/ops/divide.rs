//! Step division
//!
//! A 32-bit divide is one DIV0U/DIV0S followed by 32 DIV1 steps, each
//! rotating one quotient bit into T. The step loop belongs to the program,
//! not to the core.

use crate::cpu::{Flow, ProcessorState};

/// DIV0U
pub fn div0u(st: &mut ProcessorState) -> Flow {
    st.sr.m = false;
    st.sr.q = false;
    st.sr.t = false;
    Flow::next(st)
}

/// DIV0S Rm,Rn
pub fn div0s(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.sr.q = st.reg(n) >> 31 != 0;
    st.sr.m = st.reg(m) >> 31 != 0;
    st.sr.t = st.sr.q != st.sr.m;
    Flow::next(st)
}

/// DIV1 Rm,Rn
///
/// Shift T into Rn, then add or subtract the divisor depending on the
/// previous Q and M. The new Q comes from the shifted-out bit combined with
/// the carry or borrow of that step.
pub fn div1(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    let old_q = st.sr.q;
    let m_bit = st.sr.m;
    let top = st.reg(n) >> 31 != 0;
    let divisor = st.reg(m);
    let shifted = (st.reg(n) << 1) | st.t_bit();

    let (rn, q) = match (old_q, m_bit) {
        (false, false) => {
            let (rn, borrow) = shifted.overflowing_sub(divisor);
            (rn, top ^ borrow)
        }
        (false, true) => {
            let (rn, carry) = shifted.overflowing_add(divisor);
            (rn, !(top ^ carry))
        }
        (true, false) => {
            let (rn, carry) = shifted.overflowing_add(divisor);
            (rn, top ^ carry)
        }
        (true, true) => {
            let (rn, borrow) = shifted.overflowing_sub(divisor);
            (rn, !(top ^ borrow))
        }
    };

    st.set_reg(n, rn);
    st.sr.q = q;
    st.sr.t = q == m_bit;
    Flow::next(st)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::ops::shift;
    use crate::cpu::ops::testing::setup;

    /// 32-bit unsigned divide as written in the SH-4 programming manual:
    /// DIV0U, then 32 x (ROTCL R0; DIV1 R1,R2), then ROTCL R0.
    fn divu32(dividend: u32, divisor: u32) -> (u32, Vec<bool>) {
        let (mut st, _) = setup();
        st.r[0] = dividend;
        st.r[1] = divisor;
        st.r[2] = 0;
        div0u(&mut st);
        let mut trace = Vec::new();
        for _ in 0..32 {
            shift::rotcl(&mut st, 0);
            div1(&mut st, 1, 2);
            trace.push(st.sr.q);
        }
        shift::rotcl(&mut st, 0);
        (st.r[0], trace)
    }

    #[test]
    fn test_div0u() {
        let (mut st, _) = setup();
        st.sr.q = true;
        st.sr.m = true;
        st.sr.t = true;
        st.r[4] = 0x1234;
        assert_eq!(div0u(&mut st), Flow::Next(0x1002));
        assert!(!st.sr.q && !st.sr.m && !st.sr.t);
        assert_eq!(st.r[4], 0x1234);
    }

    #[test]
    fn test_div0s() {
        let (mut st, _) = setup();
        st.r[1] = 0x8000_0000;
        st.r[2] = 5;
        div0s(&mut st, 1, 2);
        assert!(!st.sr.q);
        assert!(st.sr.m);
        assert!(st.sr.t);

        div0s(&mut st, 2, 1);
        assert!(st.sr.q);
        assert!(!st.sr.m);
        assert!(st.sr.t);

        div0s(&mut st, 2, 2);
        assert!(!st.sr.t);
    }

    #[test]
    fn test_zero_divided_by_one() {
        let (quotient, trace) = divu32(0, 1);
        assert_eq!(quotient, 0);
        // The remainder never reaches the divisor: every step borrows.
        assert!(trace.iter().all(|&q| q));
    }

    #[test]
    fn test_unsigned_divide() {
        for (a, b) in [(100, 7), (0xFFFF_FFFF, 3), (12345678, 1), (5, 9), (0x8000_0000, 0x10)] {
            let (quotient, _) = divu32(a, b);
            assert_eq!(quotient, a / b, "{a} / {b}");
        }
    }

    #[test]
    fn test_div1_single_step() {
        let (mut st, _) = setup();
        div0u(&mut st);
        st.r[1] = 3;
        st.r[2] = 2;
        st.set_t(true);
        // (2 << 1 | 1) - 3 = 2, no borrow: Q = 0, T = 1
        div1(&mut st, 1, 2);
        assert_eq!(st.r[2], 2);
        assert!(!st.sr.q);
        assert!(st.t());
    }
}
