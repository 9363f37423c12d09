//! SH-4A processor state
//!
//! General, bank and control registers, the status register and the
//! 64-bit multiply-accumulate register.

use serde::{Deserialize, Serialize};

/// Bit positions inside SR
const SR_T: u32 = 1 << 0;
const SR_S: u32 = 1 << 1;
const SR_IMASK_SHIFT: u32 = 4;
const SR_Q: u32 = 1 << 8;
const SR_M: u32 = 1 << 9;
const SR_FD: u32 = 1 << 15;
const SR_BL: u32 = 1 << 28;
const SR_RB: u32 = 1 << 29;
const SR_MD: u32 = 1 << 30;

/// SH-4A Status Register bits
///
/// The discrete fields are authoritative; the packed 32-bit word is always
/// produced from them, so the two views cannot disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRegister {
    /// T bit - used for conditionals
    pub t: bool,
    /// S bit - MAC saturation
    pub s: bool,
    /// Interrupt mask bits (4 bits)
    pub imask: u8,
    /// Q bit - divide step quotient
    pub q: bool,
    /// M bit - divide step
    pub m: bool,
    /// FD bit - FPU disable
    pub fd: bool,
    /// BL bit - block exceptions
    pub bl: bool,
    /// RB bit - register bank
    pub rb: bool,
    /// MD bit - processor mode (0=user, 1=privileged)
    pub md: bool,
}

impl StatusRegister {
    pub fn to_u32(&self) -> u32 {
        let mut val = 0u32;
        if self.t { val |= SR_T; }
        if self.s { val |= SR_S; }
        val |= (self.imask as u32 & 0xF) << SR_IMASK_SHIFT;
        if self.q { val |= SR_Q; }
        if self.m { val |= SR_M; }
        if self.fd { val |= SR_FD; }
        if self.bl { val |= SR_BL; }
        if self.rb { val |= SR_RB; }
        if self.md { val |= SR_MD; }
        val
    }

    pub fn from_u32(val: u32) -> Self {
        Self {
            t: val & SR_T != 0,
            s: val & SR_S != 0,
            imask: ((val >> SR_IMASK_SHIFT) & 0xF) as u8,
            q: val & SR_Q != 0,
            m: val & SR_M != 0,
            fd: val & SR_FD != 0,
            bl: val & SR_BL != 0,
            rb: val & SR_RB != 0,
            md: val & SR_MD != 0,
        }
    }

    /// State after a power-on reset: privileged, bank 1, exceptions blocked.
    pub fn reset() -> Self {
        Self {
            md: true,
            rb: true,
            bl: true,
            imask: 0xF,
            ..Default::default()
        }
    }
}

/// 64-bit multiply-accumulate register.
///
/// MACH and MACL are views computed by shifting and masking the single
/// stored value; writing one half leaves the other untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mac(u64);

impl Mac {
    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn set(&mut self, value: u64) {
        self.0 = value;
    }

    pub fn high(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub fn low(&self) -> u32 {
        self.0 as u32
    }

    pub fn set_high(&mut self, val: u32) {
        self.0 = (self.0 & 0x0000_0000_FFFF_FFFF) | ((val as u64) << 32);
    }

    pub fn set_low(&mut self, val: u32) {
        self.0 = (self.0 & 0xFFFF_FFFF_0000_0000) | val as u64;
    }
}

/// SH-4A CPU state
///
/// Register indices come from 4-bit (general) or 3-bit (bank) opcode fields;
/// an index out of range is a decoder bug and panics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorState {
    /// General purpose registers (R0-R15)
    pub r: [u32; 16],
    /// Banked registers (R0_BANK-R7_BANK)
    pub r_bank: [u32; 8],
    /// Status register
    pub sr: StatusRegister,
    /// Global base register
    pub gbr: u32,
    /// Vector base register
    pub vbr: u32,
    /// Saved general register 15
    pub sgr: u32,
    /// Saved status register
    pub ssr: u32,
    /// Saved program counter
    pub spc: u32,
    /// Debug base register
    pub dbr: u32,
    /// Procedure register (return address)
    pub pr: u32,
    /// Program counter
    pub pc: u32,
    mac: Mac,
}

impl ProcessorState {
    pub fn new(reset_vector: u32) -> Self {
        Self {
            r: [0; 16],
            r_bank: [0; 8],
            sr: StatusRegister::reset(),
            gbr: 0,
            vbr: 0,
            sgr: 0,
            ssr: 0,
            spc: 0,
            dbr: 0,
            pr: 0,
            pc: reset_vector & !1,
            mac: Mac::default(),
        }
    }

    /// Reinitialise every register; the only way state is ever discarded.
    pub fn reset(&mut self, reset_vector: u32) {
        *self = Self::new(reset_vector);
    }

    #[inline]
    pub fn reg(&self, n: usize) -> u32 {
        self.r[n]
    }

    #[inline]
    pub fn set_reg(&mut self, n: usize, val: u32) {
        self.r[n] = val;
    }

    #[inline]
    pub fn bank(&self, n: usize) -> u32 {
        self.r_bank[n]
    }

    #[inline]
    pub fn set_bank(&mut self, n: usize, val: u32) {
        self.r_bank[n] = val;
    }

    pub fn t(&self) -> bool {
        self.sr.t
    }

    pub fn set_t(&mut self, t: bool) {
        self.sr.t = t;
    }

    /// T as 0 or 1, for carry chains.
    pub fn t_bit(&self) -> u32 {
        self.sr.t as u32
    }

    /// Packed status word.
    pub fn sr_word(&self) -> u32 {
        self.sr.to_u32()
    }

    pub fn set_sr_word(&mut self, val: u32) {
        self.sr = StatusRegister::from_u32(val);
    }

    pub fn mac(&self) -> u64 {
        self.mac.value()
    }

    pub fn set_mac(&mut self, val: u64) {
        self.mac.set(val);
    }

    pub fn mach(&self) -> u32 {
        self.mac.high()
    }

    pub fn macl(&self) -> u32 {
        self.mac.low()
    }

    pub fn set_mach(&mut self, val: u32) {
        self.mac.set_high(val);
    }

    pub fn set_macl(&mut self, val: u32) {
        self.mac.set_low(val);
    }
}

impl Default for ProcessorState {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_halves_roundtrip() {
        let mut st = ProcessorState::default();
        st.set_mach(0x1234_5678);
        st.set_macl(0x9ABC_DEF0);
        assert_eq!(st.mac(), 0x1234_5678_9ABC_DEF0);

        st.set_macl(0);
        assert_eq!(st.mach(), 0x1234_5678);
        st.set_mach(0xFFFF_FFFF);
        assert_eq!(st.macl(), 0);
        assert_eq!(st.mac(), 0xFFFF_FFFF_0000_0000);
    }

    #[test]
    fn test_mac_combined_write() {
        let mut st = ProcessorState::default();
        st.set_mac(0x0000_0001_8000_0000);
        assert_eq!(st.mach(), 1);
        assert_eq!(st.macl(), 0x8000_0000);
    }

    #[test]
    fn test_sr_pack_unpack() {
        let mut st = ProcessorState::default();
        st.set_sr_word(0x7000_03F3);
        assert!(st.sr.t && st.sr.s && st.sr.q && st.sr.m);
        assert!(st.sr.md && st.sr.rb && st.sr.bl);
        assert_eq!(st.sr.imask, 0xF);
        assert_eq!(st.sr_word(), 0x7000_03F3);

        st.set_t(false);
        assert_eq!(st.sr_word() & 1, 0);
        // Reserved bits are dropped.
        st.set_sr_word(0x8000_0C00);
        assert_eq!(st.sr_word(), 0);
    }

    #[test]
    fn test_reset() {
        let mut st = ProcessorState::new(0xA000_0000);
        st.r[3] = 7;
        st.set_mac(99);
        st.reset(0xA000_0000);
        assert_eq!(st.r, [0; 16]);
        assert_eq!(st.mac(), 0);
        assert_eq!(st.pc, 0xA000_0000);
        assert_eq!(st.sr_word(), 0x7000_00F0);
    }

    #[test]
    #[should_panic]
    fn test_register_index_out_of_range() {
        let st = ProcessorState::default();
        let _ = st.reg(16);
    }
}
