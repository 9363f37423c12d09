//! Multiply and multiply-accumulate
//!
//! DMULS.L/DMULU.L overwrite MAC. MAC.L/MAC.W accumulate into it and honour
//! the S bit: MAC.L saturates to 48 bits, MAC.W to 32 bits.

use crate::cpu::{Flow, ProcessorState};
use crate::memory::MemoryPort;

const MAC48_MAX: i64 = 0x0000_7FFF_FFFF_FFFF;
const MAC48_MIN: i64 = -0x0000_8000_0000_0000;

/// MUL.L Rm,Rn
pub fn mul_l(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    st.set_macl(st.reg(n).wrapping_mul(st.reg(m)));
    Flow::next(st)
}

/// MULS.W Rm,Rn
pub fn muls_w(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    let result = (st.reg(n) as i16 as i32) * (st.reg(m) as i16 as i32);
    st.set_macl(result as u32);
    Flow::next(st)
}

/// MULU.W Rm,Rn
pub fn mulu_w(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    let result = (st.reg(n) as u16 as u32) * (st.reg(m) as u16 as u32);
    st.set_macl(result);
    Flow::next(st)
}

/// DMULS.L Rm,Rn
pub fn dmuls_l(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    let result = (st.reg(n) as i32 as i64) * (st.reg(m) as i32 as i64);
    st.set_mac(result as u64);
    Flow::next(st)
}

/// DMULU.L Rm,Rn
pub fn dmulu_l(st: &mut ProcessorState, m: usize, n: usize) -> Flow {
    let result = (st.reg(n) as u64) * (st.reg(m) as u64);
    st.set_mac(result);
    Flow::next(st)
}

/// MAC.L @Rm+,@Rn+
///
/// With S set the sum is clamped to the signed 48-bit range
/// `0xFFFF8000_00000000..=0x00007FFF_FFFFFFFF`.
pub fn mac_l(st: &mut ProcessorState, mem: &mut dyn MemoryPort, m: usize, n: usize) -> Flow {
    let rn_val = mem.read32(st.reg(n)) as i32 as i64;
    st.set_reg(n, st.reg(n).wrapping_add(4));
    let rm_val = mem.read32(st.reg(m)) as i32 as i64;
    st.set_reg(m, st.reg(m).wrapping_add(4));

    let product = rn_val * rm_val;
    let mac = st.mac() as i64;
    let result = if st.sr.s {
        (mac as i128 + product as i128).clamp(MAC48_MIN as i128, MAC48_MAX as i128) as i64
    } else {
        mac.wrapping_add(product)
    };
    st.set_mac(result as u64);
    Flow::next(st)
}

/// MAC.W @Rm+,@Rn+
///
/// With S set only MACL accumulates; on 32-bit overflow the whole MAC is
/// clamped to the sign-extended 32-bit extreme.
pub fn mac_w(st: &mut ProcessorState, mem: &mut dyn MemoryPort, m: usize, n: usize) -> Flow {
    let rn_val = mem.read16(st.reg(n)) as i16 as i32;
    st.set_reg(n, st.reg(n).wrapping_add(2));
    let rm_val = mem.read16(st.reg(m)) as i16 as i32;
    st.set_reg(m, st.reg(m).wrapping_add(2));

    let product = rn_val * rm_val;
    if st.sr.s {
        match (st.macl() as i32).checked_add(product) {
            Some(sum) => st.set_macl(sum as u32),
            None if product < 0 => st.set_mac(i32::MIN as i64 as u64),
            None => st.set_mac(i32::MAX as i64 as u64),
        }
    } else {
        st.set_mac(st.mac().wrapping_add(product as i64 as u64));
    }
    Flow::next(st)
}
