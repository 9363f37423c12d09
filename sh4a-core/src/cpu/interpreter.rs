//! Fetch/execute loop

use super::decode::{Decoder, Execute};
use super::delay_slot::DelaySlot;
use super::{Cpu, ProcessorState};
use crate::config::CoreConfig;
use crate::memory::MemoryPort;
use crate::Sh4Result;

/// Result of [`Sh4a::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Calls to `step` that completed
    pub steps: u64,
    /// True when the core stopped on an instruction that branches to itself
    pub halted: bool,
}

/// SH-4A interpreter over a memory bus
pub struct Sh4a<M: MemoryPort> {
    state: ProcessorState,
    mem: M,
    decoder: Decoder,
    reset_vector: u32,
    retired: u64,
    trace: bool,
}

impl<M: MemoryPort> Sh4a<M> {
    pub fn new(mem: M, reset_vector: u32) -> Self {
        Self {
            state: ProcessorState::new(reset_vector),
            mem,
            decoder: Decoder::new(),
            reset_vector,
            retired: 0,
            trace: false,
        }
    }

    pub fn with_config(mem: M, config: &CoreConfig) -> Self {
        let mut cpu = Self::new(mem, config.reset_vector);
        cpu.trace = config.trace_instructions;
        cpu
    }

    pub fn state(&self) -> &ProcessorState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ProcessorState {
        &mut self.state
    }

    pub fn memory(&self) -> &M {
        &self.mem
    }

    /// Step until `max_steps` is reached or the core halts.
    ///
    /// An instruction that leaves PC where it was (SLEEP, `BRA` to itself)
    /// counts as a halt. Errors stop the run with the state as it was left.
    pub fn run(&mut self, max_steps: u64) -> Sh4Result<RunSummary> {
        let mut steps = 0;
        while steps < max_steps {
            let pc = self.state.pc;
            self.step()?;
            steps += 1;
            if self.state.pc == pc {
                tracing::debug!("Halted at {:#010x} after {} steps", pc, steps);
                return Ok(RunSummary { steps, halted: true });
            }
        }
        tracing::debug!("Step limit {} reached at {:#010x}", max_steps, self.state.pc);
        Ok(RunSummary { steps, halted: false })
    }
}

impl<M: MemoryPort> Cpu for Sh4a<M> {
    fn step(&mut self) -> Sh4Result<()> {
        let pc = self.state.pc;
        let instr = self.mem.read16(pc);
        if self.trace {
            tracing::trace!("{:#010x}: {:04x}  {}", pc, instr, Decoder::mnemonic(instr));
        }

        let flow = self.decoder.execute(&mut self.state, &mut self.mem, instr)?;
        let delayed = flow.is_delayed();
        DelaySlot::settle(&mut self.state, &mut self.mem, &mut self.decoder, flow)?;

        self.retired += if delayed { 2 } else { 1 };
        Ok(())
    }

    fn reset(&mut self) {
        self.state.reset(self.reset_vector);
        self.retired = 0;
        tracing::debug!("SH-4A reset, PC={:#010x}", self.state.pc);
    }

    fn pc(&self) -> u32 {
        self.state.pc
    }

    /// Bit 0 is dropped; PC is always even.
    fn set_pc(&mut self, pc: u32) {
        self.state.pc = pc & !1;
    }

    fn retired(&self) -> u64 {
        self.retired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Ram;
    use crate::Sh4Error;

    fn load(words: &[u16]) -> Sh4a<Ram> {
        let mut ram = Ram::new(0x8800_0000, 0x1000);
        for (i, w) in words.iter().enumerate() {
            ram.write16(0x8800_0000 + (i as u32) * 2, *w);
        }
        Sh4a::new(ram, 0x8800_0000)
    }

    #[test]
    fn test_reset() {
        let mut cpu = load(&[0x0009]);
        cpu.state_mut().r[3] = 7;
        cpu.step().unwrap();
        cpu.reset();
        assert_eq!(cpu.pc(), 0x8800_0000);
        assert_eq!(cpu.retired(), 0);
        assert_eq!(cpu.state().sr_word(), 0x7000_00F0);
    }

    #[test]
    fn test_bra_with_slot() {
        // BRA +6 ; ADD #1,R5
        let mut cpu = load(&[0xA006, 0x7501]);
        cpu.step().unwrap();
        assert_eq!(cpu.state().r[5], 1);
        assert_eq!(cpu.pc(), 0x8800_0010);
        assert_eq!(cpu.retired(), 2);
    }

    #[test]
    fn test_bt_s_taken_runs_slot() {
        let mut cpu = load(&[
            0x0018, // SETT
            0x8D02, // BT/S +2
            0xE207, // MOV #7,R2 (slot)
            0x0009, // NOP
            0x0009, // NOP
            0x001B, // target: SLEEP
        ]);
        cpu.step().unwrap();
        cpu.step().unwrap();
        assert_eq!(cpu.state().r[2], 7);
        assert_eq!(cpu.pc(), 0x8800_000A);
        assert_eq!(cpu.retired(), 3);
    }

    #[test]
    fn test_bf_s_not_taken_still_runs_slot() {
        let mut cpu = load(&[
            0x0018, // SETT
            0x8F10, // BF/S +0x10
            0xE207, // MOV #7,R2 (slot)
            0x001B, // SLEEP
        ]);
        cpu.step().unwrap();
        cpu.step().unwrap();
        // Not taken: execution resumes after the slot.
        assert_eq!(cpu.state().r[2], 7);
        assert_eq!(cpu.pc(), 0x8800_0006);
    }

    #[test]
    fn test_odd_jump_target_rejected() {
        let mut cpu = load(&[
            0x412B, // JMP @R1
            0x0009, // NOP
        ]);
        cpu.state_mut().r[1] = 0x8800_0101;
        let err = cpu.step().unwrap_err();
        assert!(matches!(
            err,
            Sh4Error::MisalignedBranch { pc: 0x8800_0000, target: 0x8800_0101 }
        ));
        assert_eq!(cpu.pc() & 1, 0);
    }

    #[test]
    fn test_set_pc_keeps_pc_even() {
        let mut cpu = load(&[0x0009]);
        cpu.set_pc(0x8800_0003);
        assert_eq!(cpu.pc(), 0x8800_0002);
    }

    #[test]
    fn test_stores_reach_memory() {
        let mut cpu = load(&[
            0xE15A, // MOV #0x5A,R1
            0x2210, // MOV.B R1,@R2
            0x001B, // SLEEP
        ]);
        cpu.state_mut().r[2] = 0x8800_0100;
        cpu.run(10).unwrap();
        assert_eq!(cpu.memory().as_slice()[0x100], 0x5A);
    }

    #[test]
    fn test_counted_loop() {
        let mut cpu = load(&[
            0xE105, // MOV #5,R1
            0xE000, // MOV #0,R0
            0x7003, // loop: ADD #3,R0
            0x4110, // DT R1
            0x8BFC, // BF loop
            0x001B, // SLEEP
        ]);
        let summary = cpu.run(100).unwrap();
        assert!(summary.halted);
        assert_eq!(cpu.state().r[0], 15);
        assert_eq!(cpu.state().r[1], 0);
        assert!(cpu.state().t());
        assert_eq!(cpu.pc(), 0x8800_000A);
        // 2 setup + 5 * 3 loop + SLEEP
        assert_eq!(summary.steps, 18);
    }

    #[test]
    fn test_subroutine_call() {
        let mut cpu = load(&[
            0xB002, // BSR sub
            0xE101, // MOV #1,R1 (slot)
            0x001B, // SLEEP
            0x0009, // NOP
            0x000B, // sub: RTS
            0x7110, // ADD #16,R1 (slot)
        ]);
        let summary = cpu.run(10).unwrap();
        assert!(summary.halted);
        assert_eq!(cpu.state().r[1], 17);
        assert_eq!(cpu.state().pr, 0x8800_0004);
        assert_eq!(cpu.pc(), 0x8800_0004);
    }

    #[test]
    fn test_step_limit() {
        // BRA to itself never advances but counts as halted; use NOPs.
        let mut cpu = load(&[0x0009; 8]);
        let summary = cpu.run(4).unwrap();
        assert_eq!(summary, RunSummary { steps: 4, halted: false });
        assert_eq!(cpu.pc(), 0x8800_0008);
    }

    #[test]
    fn test_illegal_stops_run() {
        let mut cpu = load(&[0x0009, 0xFFFD]);
        let err = cpu.run(10).unwrap_err();
        assert!(matches!(err, Sh4Error::IllegalInstruction { pc: 0x8800_0002, instr: 0xFFFD }));
        assert_eq!(cpu.retired(), 1);
    }

    #[test]
    fn test_branch_in_slot_is_error() {
        // BRA +0 ; BRA +0
        let mut cpu = load(&[0xA000, 0xA000]);
        let err = cpu.step().unwrap_err();
        assert!(matches!(err, Sh4Error::SlotIllegal { pc: 0x8800_0002, .. }));
    }
}
