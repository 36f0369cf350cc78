/*!
cpu module: fetch/decode/execute core for the MOS 6502 / WDC 65C02
(spec.md §4.5).

Split across:

    state.rs       - Registers, status flags, edge-latched control bits.
    addressing.rs  - Addressing-mode enum & operand resolution.
    decode.rs      - Opcode -> (mnemonic, addressing mode) lookup.
    execute.rs     - Instruction semantic helpers (ALU, stack, RMW).
    dispatch.rs    - Orchestrates one `step`: fetch, decode, execute,
                     tick, interrupt poll.

Only the public façade (`Cpu`) is re-exported from here; the submodules
above are internal mechanics and may be reshaped freely.
*/

pub mod addressing;
pub mod decode;
pub mod dispatch;
pub mod execute;
pub mod state;

use crate::bus::Bus;
use crate::config::{CpuConfig, Variant};
use state::CpuState;

/// The embeddable CPU core. Holds architectural state only; RAM and
/// devices live on the `Bus` the host passes into every call, per
/// spec.md §9's "bus capability" design note.
#[derive(Debug, Clone, Copy)]
pub struct Cpu {
    state: CpuState,
    config: CpuConfig,
}

impl Cpu {
    /// Construct a CPU from a [`CpuConfig`] (spec.md §6: variant select
    /// plus the `tick_duration` pacing hint). Registers start at their
    /// struct defaults; call [`Cpu::reset`] before the first `step` to
    /// load `pc` from the reset vector (spec.md §4.5).
    pub fn new(config: CpuConfig) -> Self {
        Self {
            state: CpuState::new(config.variant),
            config,
        }
    }

    /// The configuration this CPU was constructed with.
    pub fn config(&self) -> CpuConfig {
        self.config
    }

    /// The host time-unit pacing hint from `config.tick_duration`
    /// (spec.md §6). The core never sleeps on its own; a host driving
    /// its own pacing loop around `step`/`run` reads this back here.
    pub fn tick_duration(&self) -> u64 {
        self.config.tick_duration
    }

    /// Perform the reset sequence immediately: registers to power-up
    /// values, `pc` loaded from `0xFFFC`, and bus-owned devices reset
    /// (spec.md §3, §4.5).
    pub fn reset(&mut self, bus: &mut Bus) {
        dispatch::reset_now(&mut self.state, bus);
        bus.reset_devices();
    }

    /// Fetch, decode, and execute exactly one instruction, advance the
    /// bus by one tick, and poll for pending interrupts (spec.md §2).
    ///
    /// A no-op if the CPU is halted. A pending reset short-circuits
    /// decode rather than executing a stray instruction at the old
    /// `pc` (spec.md §4.5).
    pub fn step(&mut self, bus: &mut Bus) {
        dispatch::step(&mut self.state, bus);
    }

    /// Loop `step` until [`Cpu::halt`] is called.
    pub fn run(&mut self, bus: &mut Bus) {
        while !self.state.halted {
            self.step(bus);
        }
    }

    /// Latch an edge-triggered IRQ request, observed at the next
    /// instruction boundary and masked by the irq-disable flag
    /// (spec.md §5).
    pub fn irq(&mut self) {
        self.state.irq_pending = true;
    }

    /// Latch an edge-triggered NMI request. NMI is never masked and
    /// strictly dominates a simultaneously pending IRQ (spec.md §5).
    pub fn nmi(&mut self) {
        self.state.nmi_pending = true;
    }

    /// Request a reset; observed at the start of the next `step`,
    /// before decoding (spec.md §4.5).
    pub fn request_reset(&mut self) {
        self.state.reset_pending = true;
    }

    /// Stop an in-progress `run` loop at the next instruction boundary.
    /// The sole cooperative cancellation mechanism (spec.md §5, §7).
    pub fn halt(&mut self) {
        self.state.halted = true;
    }

    pub fn halted(&self) -> bool {
        self.state.halted
    }

    pub fn pc(&self) -> u16 {
        self.state.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.state.pc = pc;
    }

    pub fn a(&self) -> u8 {
        self.state.a
    }

    pub fn x(&self) -> u8 {
        self.state.x
    }

    pub fn y(&self) -> u8 {
        self.state.y
    }

    pub fn sp(&self) -> u8 {
        self.state.sp
    }

    pub fn status(&self) -> u8 {
        self.state.status
    }

    pub fn variant(&self) -> Variant {
        self.state.variant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_reaches_the_cpu_through_new() {
        let config = CpuConfig {
            variant: Variant::Cmos65C02,
            tick_duration: 42,
        };
        let cpu = Cpu::new(config);
        assert_eq!(cpu.config(), config);
        assert_eq!(cpu.tick_duration(), 42);
        assert_eq!(cpu.variant(), Variant::Cmos65C02);
    }

    #[test]
    fn reset_loads_pc_from_vector_and_zeroes_registers() {
        let mut bus = Bus::new();
        bus.load_bytes(0xFFFC, &[0x00, 0x10]);
        let mut cpu = Cpu::new(CpuConfig::with_variant(Variant::Nmos6502));
        cpu.reset(&mut bus);
        assert_eq!(cpu.pc(), 0x1000);
        assert_eq!(cpu.a(), 0);
        assert_eq!(cpu.sp(), state::RESET_SP);
        assert_eq!(cpu.status(), state::RESET_STATUS);
    }

    #[test]
    fn halt_stops_run_loop() {
        let mut bus = Bus::new();
        bus.load_bytes(0xFFFC, &[0x00, 0x02]);
        bus.load_bytes(0x0200, &[0xEA, 0xEA, 0xEA]); // NOP NOP NOP
        let mut cpu = Cpu::new(CpuConfig::with_variant(Variant::Nmos6502));
        cpu.reset(&mut bus);
        cpu.step(&mut bus);
        cpu.halt();
        cpu.run(&mut bus);
        assert!(cpu.halted());
    }

    #[test]
    fn device_irq_is_observed_through_the_bus() {
        use crate::devices::via::TimerInterfaceAdapter;

        let mut bus = Bus::new();
        bus.map_device(0xC030, 0xC03F, 0x000F, Box::new(TimerInterfaceAdapter::new()))
            .unwrap();
        bus.load_bytes(0xFFFC, &[0x00, 0x02]);
        bus.load_bytes(0xFFFE, &[0x00, 0x40]); // IRQ vector -> $4000
        bus.load_bytes(0x0200, &[0x58, 0xEA, 0xEA]); // CLI, NOP, NOP

        let mut cpu = Cpu::new(CpuConfig::with_variant(Variant::Nmos6502));
        cpu.reset(&mut bus);
        cpu.step(&mut bus); // CLI: reset leaves irq-disable set (SR = 0x36)

        // Arm timer 1 for a one-shot expiry on the very next tick.
        bus.write(0xC036, 0x01); // T1 latch low
        bus.write(0xC037, 0x00); // T1 latch high
        bus.write(0xC034, 0x01); // T1 counter low
        bus.write(0xC035, 0x00); // T1 counter high: starts running
        bus.write(0xC03E, 0x80 | (1 << 6)); // enable T1 interrupt

        cpu.step(&mut bus); // NOP executes; tick decrements counter 1 -> 0
        cpu.step(&mut bus); // NOP executes; tick sees counter == 0, sets IFR_T1, IRQ serviced

        assert_eq!(cpu.pc(), 0x4000, "VIA IRQ should vector the CPU to the IRQ handler");
    }
}
