//! Memory port consumed by the instruction semantics
//!
//! Multi-byte values are little-endian. Ports never sign-extend: byte and
//! word loads hand back the raw bits and the instruction widens them.

/// Memory bus seen by the SH-4A core
pub trait MemoryPort {
    fn read8(&mut self, addr: u32) -> u8;
    fn read16(&mut self, addr: u32) -> u16;
    fn read32(&mut self, addr: u32) -> u32;
    fn write8(&mut self, addr: u32, val: u8);
    fn write16(&mut self, addr: u32, val: u16);
    fn write32(&mut self, addr: u32, val: u32);
}

/// Flat RAM window mapped at `base`.
///
/// Accesses outside `[base, base + size)` read as zero and drop writes.
/// Unaligned accesses are performed byte by byte.
#[derive(Clone)]
pub struct Ram {
    base: u32,
    data: Vec<u8>,
}

impl Ram {
    pub fn new(base: u32, size: usize) -> Self {
        Self {
            base,
            data: vec![0; size],
        }
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn offset(&self, addr: u32) -> Option<usize> {
        let off = addr.wrapping_sub(self.base) as usize;
        (off < self.data.len()).then_some(off)
    }

    /// Copy `bytes` into RAM starting at bus address `addr`, truncating at the
    /// end of the window. Returns the number of bytes copied.
    pub fn load(&mut self, addr: u32, bytes: &[u8]) -> usize {
        let Some(start) = self.offset(addr) else {
            return 0;
        };
        let end = (start + bytes.len()).min(self.data.len());
        let len = end - start;
        self.data[start..end].copy_from_slice(&bytes[..len]);
        len
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl MemoryPort for Ram {
    fn read8(&mut self, addr: u32) -> u8 {
        match self.offset(addr) {
            Some(off) => self.data[off],
            None => {
                tracing::trace!("read8 outside RAM at {:#010x}", addr);
                0
            }
        }
    }

    fn read16(&mut self, addr: u32) -> u16 {
        u16::from_le_bytes([self.read8(addr), self.read8(addr.wrapping_add(1))])
    }

    fn read32(&mut self, addr: u32) -> u32 {
        let lo = self.read16(addr) as u32;
        let hi = self.read16(addr.wrapping_add(2)) as u32;
        lo | (hi << 16)
    }

    fn write8(&mut self, addr: u32, val: u8) {
        match self.offset(addr) {
            Some(off) => self.data[off] = val,
            None => tracing::trace!("write8 outside RAM at {:#010x}", addr),
        }
    }

    fn write16(&mut self, addr: u32, val: u16) {
        for (i, byte) in val.to_le_bytes().into_iter().enumerate() {
            self.write8(addr.wrapping_add(i as u32), byte);
        }
    }

    fn write32(&mut self, addr: u32, val: u32) {
        for (i, byte) in val.to_le_bytes().into_iter().enumerate() {
            self.write8(addr.wrapping_add(i as u32), byte);
        }
    }
}
