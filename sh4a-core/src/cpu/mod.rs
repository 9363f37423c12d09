//! SH-4A CPU core
//!
//! Semantics functions in [`ops`] never write PC. Each returns a [`Flow`]
//! saying where execution continues, and [`DelaySlot::settle`] installs it.

pub mod decode;
pub mod delay_slot;
pub mod interpreter;
pub mod ops;
pub mod state;

pub use decode::{Decoder, Execute};
pub use delay_slot::DelaySlot;
pub use interpreter::{RunSummary, Sh4a};
pub use state::{Mac, ProcessorState, StatusRegister};

use crate::Sh4Result;

/// Where control goes after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// PC becomes this address now (sequential advance or BF/BT).
    Next(u32),
    /// Delayed branch: run the instruction at `slot`, then PC becomes `target`.
    Delayed { slot: u32, target: u32 },
}

impl Flow {
    /// Fall through to the following instruction.
    #[inline]
    pub fn next(st: &ProcessorState) -> Self {
        Flow::Next(st.pc.wrapping_add(2))
    }

    /// Delayed branch to `target` from the instruction at PC.
    #[inline]
    pub fn delayed(st: &ProcessorState, target: u32) -> Self {
        Flow::Delayed {
            slot: st.pc.wrapping_add(2),
            target,
        }
    }

    pub fn is_delayed(&self) -> bool {
        matches!(self, Flow::Delayed { .. })
    }
}

/// Common CPU trait
pub trait Cpu {
    /// Execute one instruction, including the slot of a delayed branch
    fn step(&mut self) -> Sh4Result<()>;

    /// Reset the CPU to initial state
    fn reset(&mut self);

    /// Get the program counter
    fn pc(&self) -> u32;

    /// Set the program counter
    fn set_pc(&mut self, pc: u32);

    /// Get total instructions retired
    fn retired(&self) -> u64;
}
