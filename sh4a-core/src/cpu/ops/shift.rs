//! Shift and rotate instructions

use crate::cpu::{Flow, ProcessorState};

/// SHLL Rn / SHAL Rn
pub fn shll(st: &mut ProcessorState, n: usize) -> Flow {
    let rn = st.reg(n);
    st.set_t(rn >> 31 != 0);
    st.set_reg(n, rn << 1);
    Flow::next(st)
}

/// SHLR Rn
pub fn shlr(st: &mut ProcessorState, n: usize) -> Flow {
    let rn = st.reg(n);
    st.set_t(rn & 1 != 0);
    st.set_reg(n, rn >> 1);
    Flow::next(st)
}

/// SHAR Rn
pub fn shar(st: &mut ProcessorState, n: usize) -> Flow {
    let rn = st.reg(n);
    st.set_t(rn & 1 != 0);
    st.set_reg(n, ((rn as i32) >> 1) as u32);
    Flow::next(st)
}

/// SHLL2/SHLL8/SHLL16 Rn - T is not affected
pub fn shll_by(st: &mut ProcessorState, n: usize, amount: u32) -> Flow {
    st.set_reg(n, st.reg(n) << amount);
    Flow::next(st)
}

/// SHLR2/SHLR8/SHLR16 Rn - T is not affected
pub fn shlr_by(st: &mut ProcessorState, n: usize, amount: u32) -> Flow {
    st.set_reg(n, st.reg(n) >> amount);
    Flow::next(st)
}

/// ROTL Rn
pub fn rotl(st: &mut ProcessorState, n: usize) -> Flow {
    let rn = st.reg(n);
    st.set_t(rn >> 31 != 0);
    st.set_reg(n, rn.rotate_left(1));
    Flow::next(st)
}

/// ROTR Rn
pub fn rotr(st: &mut ProcessorState, n: usize) -> Flow {
    let rn = st.reg(n);
    st.set_t(rn & 1 != 0);
    st.set_reg(n, rn.rotate_right(1));
    Flow::next(st)
}

/// ROTCL Rn - rotate left through T
pub fn rotcl(st: &mut ProcessorState, n: usize) -> Flow {
    let rn = st.reg(n);
    let old_t = st.t_bit();
    st.set_t(rn >> 31 != 0);
    st.set_reg(n, (rn << 1) | old_t);
    Flow::next(st)
}

/// ROTCR Rn - rotate right through T
pub fn rotcr(st: &mut ProcessorState, n: usize) -> Flow {
    let rn = st.reg(n);
    let old_t = st.t_bit();
    st.set_t(rn & 1 != 0);
    st.set_reg(n, (rn >> 1) | (old_t << 31));
    Flow::next(st)
}

/// SHAD Rm,Rn - arithmetic shift by a signed register amount
pub fn shad(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    let shift = st.reg(m) as i32;
    let rn = st.reg(n) as i32;
    let result = if shift >= 0 {
        rn << (shift & 0x1F)
    } else if shift & 0x1F == 0 {
        if rn < 0 { -1 } else { 0 }
    } else {
        rn >> ((!shift & 0x1F) + 1)
    };
    st.set_reg(n, result as u32);
    Flow::next(st)
}

/// SHLD Rm,Rn - logical shift by a signed register amount
pub fn shld(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    let shift = st.reg(m) as i32;
    let rn = st.reg(n);
    let result = if shift >= 0 {
        rn << (shift & 0x1F)
    } else if shift & 0x1F == 0 {
        0
    } else {
        rn >> ((!shift & 0x1F) + 1)
    };
    st.set_reg(n, result);
    Flow::next(st)
}
