//! Delay-slot controller
//!
//! A delayed branch leaves the core in "slot pending": the target is known
//! but not yet in PC. [`DelaySlot::settle`] runs the slot instruction to
//! completion, then installs the target and returns to normal sequencing.
//!
//! The slot must fall through to the next word. Any slot instruction that
//! redirects PC (a delayed branch, a taken BT/BF, SLEEP) is rejected, and so
//! is an odd branch target.

use super::decode::Execute;
use super::{Flow, ProcessorState};
use crate::memory::MemoryPort;
use crate::{Sh4Error, Sh4Result};

pub struct DelaySlot;

impl DelaySlot {
    /// Apply the flow returned by an instruction.
    ///
    /// A slot instruction that does not fall through to `slot + 2` is
    /// rejected with [`Sh4Error::SlotIllegal`] and the pending target is
    /// dropped. An odd target gives [`Sh4Error::MisalignedBranch`] with PC
    /// left at the slot.
    pub fn settle(
        st: &mut ProcessorState,
        mem: &mut dyn MemoryPort,
        exec: &mut dyn Execute,
        flow: Flow,
    ) -> Sh4Result<()> {
        let (slot, target) = match flow {
            Flow::Next(pc) => {
                st.pc = pc;
                return Ok(());
            }
            Flow::Delayed { slot, target } => (slot, target),
        };

        let instr = mem.read16(slot);
        st.pc = slot;
        let slot_flow = exec.execute(st, mem, instr)?;
        if slot_flow != Flow::Next(slot.wrapping_add(2)) {
            return Err(Sh4Error::SlotIllegal { pc: slot, instr });
        }
        if target & 1 != 0 {
            return Err(Sh4Error::MisalignedBranch {
                pc: slot.wrapping_sub(2),
                target,
            });
        }

        tracing::trace!("delay slot {:#010x} done, branching to {:#010x}", slot, target);
        st.pc = target;
        Ok(())
    }
}
