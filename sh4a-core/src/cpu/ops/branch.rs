//! Branches
//!
//! BF and BT redirect immediately. Everything else here has a delay slot:
//! the target is computed from the registers as they are now and returned
//! in [`Flow::Delayed`], and the slot instruction runs before it lands in PC.

use super::{sign_extend12, sign_extend8};
use crate::cpu::{Flow, ProcessorState};

#[inline]
fn disp8_target(st: &ProcessorState, disp: u8) -> u32 {
    st.pc
        .wrapping_add(4)
        .wrapping_add(sign_extend8(disp) << 1)
}

#[inline]
fn disp12_target(st: &ProcessorState, disp: u16) -> u32 {
    st.pc
        .wrapping_add(4)
        .wrapping_add(sign_extend12(disp) << 1)
}

/// BF label
pub fn bf(st: &mut ProcessorState, disp: u8) -> Flow {
    if st.t() {
        Flow::next(st)
    } else {
        Flow::Next(disp8_target(st, disp))
    }
}

/// BT label
pub fn bt(st: &mut ProcessorState, disp: u8) -> Flow {
    if st.t() {
        Flow::Next(disp8_target(st, disp))
    } else {
        Flow::next(st)
    }
}

/// BF/S label - the slot runs whether or not the branch is taken
pub fn bf_s(st: &mut ProcessorState, disp: u8) -> Flow {
    let target = if st.t() {
        st.pc.wrapping_add(4)
    } else {
        disp8_target(st, disp)
    };
    Flow::delayed(st, target)
}

/// BT/S label - the slot runs whether or not the branch is taken
pub fn bt_s(st: &mut ProcessorState, disp: u8) -> Flow {
    let target = if st.t() {
        disp8_target(st, disp)
    } else {
        st.pc.wrapping_add(4)
    };
    Flow::delayed(st, target)
}

/// BRA label
pub fn bra(st: &mut ProcessorState, disp: u16) -> Flow {
    let target = disp12_target(st, disp);
    Flow::delayed(st, target)
}

/// BRAF Rn
pub fn braf(st: &mut ProcessorState, n: usize) -> Flow {
    let target = st.pc.wrapping_add(4).wrapping_add(st.reg(n));
    Flow::delayed(st, target)
}

/// BSR label
pub fn bsr(st: &mut ProcessorState, disp: u16) -> Flow {
    let target = disp12_target(st, disp);
    st.pr = st.pc.wrapping_add(4);
    Flow::delayed(st, target)
}

/// BSRF Rn
pub fn bsrf(st: &mut ProcessorState, n: usize) -> Flow {
    let target = st.pc.wrapping_add(4).wrapping_add(st.reg(n));
    st.pr = st.pc.wrapping_add(4);
    Flow::delayed(st, target)
}

/// JMP @Rn
pub fn jmp(st: &mut ProcessorState, n: usize) -> Flow {
    let target = st.reg(n);
    Flow::delayed(st, target)
}

/// JSR @Rn
pub fn jsr(st: &mut ProcessorState, n: usize) -> Flow {
    let target = st.reg(n);
    st.pr = st.pc.wrapping_add(4);
    Flow::delayed(st, target)
}

/// RTS
pub fn rts(st: &mut ProcessorState) -> Flow {
    let target = st.pr;
    Flow::delayed(st, target)
}

/// RTE - SR is restored from SSR before the slot runs
pub fn rte(st: &mut ProcessorState) -> Flow {
    let target = st.spc;
    st.set_sr_word(st.ssr);
    Flow::delayed(st, target)
}
