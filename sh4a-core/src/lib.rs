//! # SH-4A Core
//!
//! Integer instruction semantics for the SuperH SH-4A found in the Casio
//! Prizm family of graphing calculators.
//!
//! The crate is organised leaves-first:
//! - [`cpu::ProcessorState`] - registers, flags and the 64-bit MAC
//! - [`memory::MemoryPort`] - the bus the semantics read and write through
//! - [`cpu::ops`] - one function per instruction, returning a [`cpu::Flow`]
//! - [`cpu::DelaySlot`] - runs the slot instruction of a delayed branch
//!
//! Opcode decode ([`cpu::decode`]) and the fetch/execute loop
//! ([`cpu::Sh4a`]) sit on top and are kept apart from the semantics.

pub mod config;
pub mod cpu;
pub mod memory;
pub mod snapshot;

use thiserror::Error;

pub use config::CoreConfig;
pub use cpu::{Cpu, DelaySlot, Flow, ProcessorState, RunSummary, Sh4a};
pub use memory::{MemoryPort, Ram};

/// Core errors
#[derive(Debug, Error)]
pub enum Sh4Error {
    #[error("Illegal instruction {instr:#06x} at {pc:#010x}")]
    IllegalInstruction { pc: u32, instr: u16 },

    #[error("Branch {instr:#06x} placed in delay slot at {pc:#010x}")]
    SlotIllegal { pc: u32, instr: u16 },

    #[error("Branch from {pc:#010x} to odd address {target:#010x}")]
    MisalignedBranch { pc: u32, target: u32 },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Unsupported snapshot version {found} (expected {expected})")]
    SnapshotVersion { found: u32, expected: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Sh4Result<T> = Result<T, Sh4Error>;
