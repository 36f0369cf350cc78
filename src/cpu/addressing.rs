/*!
addressing.rs - 6502/65C02 addressing-mode enum and operand resolution.

Scope & Responsibilities
========================
- Pure address / operand resolution, driven off `CpuState::pc` and the
  bus.
- Does NOT pre-read memory operands; that is the dispatcher's job (see
  spec.md §4.5's operand-fetch policy, and `cpu::dispatch::resolve`).
- Does NOT model the NMOS indirect-JMP page-wrap bug (spec.md §1
  Non-goals); `Indirect` reads its pointer as a plain little-endian word
  with no page-boundary special case.

Every intermediate effective-address computation for the zero-page
family is taken modulo 256 (spec.md §4.5): pointer bytes are fetched
from page zero only, via `wrapping_add` on the `u8` index before it is
widened to `u16`.
*/

use crate::bus::Bus;
use crate::cpu::state::CpuState;

/// The 6502/65C02 addressing modes this core decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// JMP only.
    Indirect,
    /// (zp,X)
    IndexedIndirectX,
    /// (zp),Y
    IndirectIndexedY,
    /// Signed 8-bit branch displacement.
    Relative,
    /// 65C02: (zp)
    ZeroPageIndirect,
    /// 65C02: JMP (abs,X)
    AbsoluteIndexedIndirect,
    /// 65C02 BBRn/BBSn: zero-page operand followed by a signed relative
    /// branch displacement.
    ZeroPageRelative,
}

/// What the addressing phase resolved to, so dispatch can decide whether
/// an operand needs to be read from memory (spec.md §9 "Operand
/// plumbing").
#[derive(Debug, Clone, Copy)]
pub enum Operand {
    Implied,
    Accumulator,
    Immediate(u8),
    Memory(u16),
    /// BBRn/BBSn's two-operand form: the zero-page address to test and
    /// the branch target if the test succeeds.
    ZeroPageBranch { zp_addr: u16, target: u16 },
}

impl Operand {
    /// The effective address, if this operand refers to a single
    /// memory location.
    pub fn address(&self) -> Option<u16> {
        match self {
            Operand::Memory(addr) => Some(*addr),
            _ => None,
        }
    }
}

/// Fetch the next instruction-stream byte, advancing `pc`.
#[inline]
pub(crate) fn fetch_byte(cpu: &mut CpuState, bus: &mut Bus) -> u8 {
    let pc = cpu.pc;
    let v = bus.read(pc);
    cpu.pc = pc.wrapping_add(1);
    v
}

/// Fetch the next little-endian word (low byte, then high byte).
#[inline]
pub(crate) fn fetch_word(cpu: &mut CpuState, bus: &mut Bus) -> u16 {
    let lo = fetch_byte(cpu, bus) as u16;
    let hi = fetch_byte(cpu, bus) as u16;
    (hi << 8) | lo
}

/// Read a 16-bit little-endian pointer stored in zero page, with the
/// high byte wrapping within page zero (spec.md §4.5).
#[inline]
pub(crate) fn read_word_zp(bus: &mut Bus, base: u8) -> u16 {
    let lo = bus.read(base as u16) as u16;
    let hi = bus.read(base.wrapping_add(1) as u16) as u16;
    (hi << 8) | lo
}

/// Resolve the operand for `mode`, advancing `pc` past the opcode's
/// operand bytes. Does not read memory for `Memory(addr)` results; the
/// caller decides whether a read is needed (stores skip it).
pub(crate) fn resolve(cpu: &mut CpuState, bus: &mut Bus, mode: AddressMode) -> Operand {
    use AddressMode::*;
    match mode {
        Implied => Operand::Implied,
        Accumulator => Operand::Accumulator,
        Immediate => Operand::Immediate(fetch_byte(cpu, bus)),
        ZeroPage => Operand::Memory(fetch_byte(cpu, bus) as u16),
        ZeroPageX => {
            let zp = fetch_byte(cpu, bus).wrapping_add(cpu.x);
            Operand::Memory(zp as u16)
        }
        ZeroPageY => {
            let zp = fetch_byte(cpu, bus).wrapping_add(cpu.y);
            Operand::Memory(zp as u16)
        }
        Absolute => Operand::Memory(fetch_word(cpu, bus)),
        AbsoluteX => Operand::Memory(fetch_word(cpu, bus).wrapping_add(cpu.x as u16)),
        AbsoluteY => Operand::Memory(fetch_word(cpu, bus).wrapping_add(cpu.y as u16)),
        Indirect => {
            let ptr = fetch_word(cpu, bus);
            let lo = bus.read(ptr) as u16;
            let hi = bus.read(ptr.wrapping_add(1)) as u16;
            Operand::Memory((hi << 8) | lo)
        }
        IndexedIndirectX => {
            let zp = fetch_byte(cpu, bus).wrapping_add(cpu.x);
            Operand::Memory(read_word_zp(bus, zp))
        }
        IndirectIndexedY => {
            let zp = fetch_byte(cpu, bus);
            let base = read_word_zp(bus, zp);
            Operand::Memory(base.wrapping_add(cpu.y as u16))
        }
        Relative => {
            let offset = fetch_byte(cpu, bus) as i8;
            // PC is already advanced past the operand; offset from there.
            Operand::Memory(cpu.pc.wrapping_add(offset as i16 as u16))
        }
        ZeroPageIndirect => {
            let zp = fetch_byte(cpu, bus);
            Operand::Memory(read_word_zp(bus, zp))
        }
        AbsoluteIndexedIndirect => {
            let base = fetch_word(cpu, bus).wrapping_add(cpu.x as u16);
            let lo = bus.read(base) as u16;
            let hi = bus.read(base.wrapping_add(1)) as u16;
            Operand::Memory((hi << 8) | lo)
        }
        ZeroPageRelative => {
            let zp_addr = fetch_byte(cpu, bus) as u16;
            let offset = fetch_byte(cpu, bus) as i8;
            let target = cpu.pc.wrapping_add(offset as i16 as u16);
            Operand::ZeroPageBranch { zp_addr, target }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;

    fn setup() -> (CpuState, Bus) {
        (CpuState::new(Variant::Nmos6502), Bus::new())
    }

    #[test]
    fn zero_page_x_wraps_within_page_zero() {
        let (mut cpu, mut bus) = setup();
        bus.load_bytes(0x0200, &[0xFF]); // operand byte: $FF
        bus.load_bytes(0x0000, &[0xAA]); // $00 holds a sentinel
        cpu.pc = 0x0200;
        cpu.x = 1;
        let op = resolve(&mut cpu, &mut bus, AddressMode::ZeroPageX);
        assert_eq!(op.address(), Some(0x0000));
    }

    #[test]
    fn indexed_indirect_x_reads_pointer_from_zero_page() {
        let (mut cpu, mut bus) = setup();
        bus.load_bytes(0x0300, &[0x20]); // operand: zp base $20
        bus.load_bytes(0x0021, &[0x00, 0x10]); // ($20+X=$21): pointer -> $1000
        cpu.pc = 0x0300;
        cpu.x = 1;
        let op = resolve(&mut cpu, &mut bus, AddressMode::IndexedIndirectX);
        assert_eq!(op.address(), Some(0x1000));
    }

    #[test]
    fn relative_branch_targets_pc_after_operand_plus_offset() {
        let (mut cpu, mut bus) = setup();
        bus.load_bytes(0x0400, &[0x05]);
        cpu.pc = 0x0400;
        let op = resolve(&mut cpu, &mut bus, AddressMode::Relative);
        // pc after fetch = 0x0401; + 5 = 0x0406
        assert_eq!(op.address(), Some(0x0406));
    }
}
