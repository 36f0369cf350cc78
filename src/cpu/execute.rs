/*!
execute.rs - 6502/65C02 instruction semantic helpers (ALU, flags, stack,
read-modify-write).

Centralizes side-effect logic for instructions so the dispatcher
(`cpu::dispatch`) stays a thin table-driven match over `Mnemonic` and
`Operand`. Every helper here operates directly on `CpuState`; there is
no bus-agnostic register trait (unlike the teacher's migration-era
`CpuRegs`) because this crate has exactly one concrete CPU state type
and no legacy representation to bridge.
*/

use crate::bus::Bus;
use crate::config::Variant;
use crate::cpu::state::{CpuState, CARRY, DECIMAL, NEGATIVE, OVERFLOW, ZERO};

// ---------------------------------------------------------------------
// Stack
// ---------------------------------------------------------------------

#[inline]
pub(crate) fn push(cpu: &mut CpuState, bus: &mut Bus, v: u8) {
    let addr = 0x0100u16 | cpu.sp as u16;
    bus.write(addr, v);
    cpu.sp = cpu.sp.wrapping_sub(1);
}

#[inline]
pub(crate) fn pop(cpu: &mut CpuState, bus: &mut Bus) -> u8 {
    cpu.sp = cpu.sp.wrapping_add(1);
    let addr = 0x0100u16 | cpu.sp as u16;
    bus.read(addr)
}

#[inline]
pub(crate) fn push_word(cpu: &mut CpuState, bus: &mut Bus, v: u16) {
    push(cpu, bus, (v >> 8) as u8);
    push(cpu, bus, (v & 0xFF) as u8);
}

#[inline]
pub(crate) fn pop_word(cpu: &mut CpuState, bus: &mut Bus) -> u16 {
    let lo = pop(cpu, bus) as u16;
    let hi = pop(cpu, bus) as u16;
    (hi << 8) | lo
}

pub(crate) fn php(cpu: &mut CpuState, bus: &mut Bus) {
    let v = cpu.compose_status_for_push(true);
    push(cpu, bus, v);
}

pub(crate) fn plp(cpu: &mut CpuState, bus: &mut Bus) {
    let v = pop(cpu, bus);
    cpu.restore_status_from_pop(v);
}

pub(crate) fn pha(cpu: &mut CpuState, bus: &mut Bus) {
    push(cpu, bus, cpu.a);
}

pub(crate) fn pla(cpu: &mut CpuState, bus: &mut Bus) {
    let v = pop(cpu, bus);
    cpu.a = v;
    cpu.update_zn(v);
}

pub(crate) fn phx(cpu: &mut CpuState, bus: &mut Bus) {
    push(cpu, bus, cpu.x);
}
pub(crate) fn plx(cpu: &mut CpuState, bus: &mut Bus) {
    let v = pop(cpu, bus);
    cpu.x = v;
    cpu.update_zn(v);
}
pub(crate) fn phy(cpu: &mut CpuState, bus: &mut Bus) {
    push(cpu, bus, cpu.y);
}
pub(crate) fn ply(cpu: &mut CpuState, bus: &mut Bus) {
    let v = pop(cpu, bus);
    cpu.y = v;
    cpu.update_zn(v);
}

// ---------------------------------------------------------------------
// Loads / transfers
// ---------------------------------------------------------------------

pub(crate) fn lda(cpu: &mut CpuState, v: u8) {
    cpu.a = v;
    cpu.update_zn(v);
}
pub(crate) fn ldx(cpu: &mut CpuState, v: u8) {
    cpu.x = v;
    cpu.update_zn(v);
}
pub(crate) fn ldy(cpu: &mut CpuState, v: u8) {
    cpu.y = v;
    cpu.update_zn(v);
}
pub(crate) fn tax(cpu: &mut CpuState) {
    cpu.x = cpu.a;
    cpu.update_zn(cpu.x);
}
pub(crate) fn tay(cpu: &mut CpuState) {
    cpu.y = cpu.a;
    cpu.update_zn(cpu.y);
}
pub(crate) fn txa(cpu: &mut CpuState) {
    cpu.a = cpu.x;
    cpu.update_zn(cpu.a);
}
pub(crate) fn tya(cpu: &mut CpuState) {
    cpu.a = cpu.y;
    cpu.update_zn(cpu.a);
}
pub(crate) fn tsx(cpu: &mut CpuState) {
    cpu.x = cpu.sp;
    cpu.update_zn(cpu.x);
}
pub(crate) fn txs(cpu: &mut CpuState) {
    cpu.sp = cpu.x;
}

// ---------------------------------------------------------------------
// Logical / bit
// ---------------------------------------------------------------------

pub(crate) fn and(cpu: &mut CpuState, v: u8) {
    cpu.a &= v;
    cpu.update_zn(cpu.a);
}
pub(crate) fn ora(cpu: &mut CpuState, v: u8) {
    cpu.a |= v;
    cpu.update_zn(cpu.a);
}
pub(crate) fn eor(cpu: &mut CpuState, v: u8) {
    cpu.a ^= v;
    cpu.update_zn(cpu.a);
}

/// BIT: N <- M7, V <- M6, Z <- (A & M) == 0. A is not modified.
pub(crate) fn bit(cpu: &mut CpuState, v: u8) {
    cpu.set_flag(ZERO, (cpu.a & v) == 0);
    cpu.set_flag(NEGATIVE, v & 0x80 != 0);
    cpu.set_flag(OVERFLOW, v & 0x40 != 0);
}

/// 65C02 BIT immediate: unlike the memory forms, immediate addressing
/// does not touch N/V (there is no memory byte whose bits 6/7 apply).
pub(crate) fn bit_immediate(cpu: &mut CpuState, v: u8) {
    cpu.set_flag(ZERO, (cpu.a & v) == 0);
}

// ---------------------------------------------------------------------
// Increment / decrement (register)
// ---------------------------------------------------------------------

pub(crate) fn inx(cpu: &mut CpuState) {
    cpu.x = cpu.x.wrapping_add(1);
    cpu.update_zn(cpu.x);
}
pub(crate) fn iny(cpu: &mut CpuState) {
    cpu.y = cpu.y.wrapping_add(1);
    cpu.update_zn(cpu.y);
}
pub(crate) fn dex(cpu: &mut CpuState) {
    cpu.x = cpu.x.wrapping_sub(1);
    cpu.update_zn(cpu.x);
}
pub(crate) fn dey(cpu: &mut CpuState) {
    cpu.y = cpu.y.wrapping_sub(1);
    cpu.update_zn(cpu.y);
}
pub(crate) fn inc_a(cpu: &mut CpuState) {
    cpu.a = cpu.a.wrapping_add(1);
    cpu.update_zn(cpu.a);
}
pub(crate) fn dec_a(cpu: &mut CpuState) {
    cpu.a = cpu.a.wrapping_sub(1);
    cpu.update_zn(cpu.a);
}

// ---------------------------------------------------------------------
// Read-modify-write memory choreography
// ---------------------------------------------------------------------

/// Read `addr`, apply `transform`, write the result back. Used by the
/// memory forms of ASL/LSR/ROL/ROR/INC/DEC/TRB/TSB and the 65C02
/// RMB/SMB family.
pub(crate) fn rmw_memory(
    bus: &mut Bus,
    addr: u16,
    transform: impl FnOnce(u8) -> u8,
) -> u8 {
    let old = bus.read(addr);
    let new = transform(old);
    bus.write(addr, new);
    new
}

// ---------------------------------------------------------------------
// Shifts / rotates
// ---------------------------------------------------------------------

pub(crate) fn asl_acc(cpu: &mut CpuState) {
    cpu.set_flag(CARRY, cpu.a & 0x80 != 0);
    cpu.a <<= 1;
    cpu.update_zn(cpu.a);
}
pub(crate) fn lsr_acc(cpu: &mut CpuState) {
    cpu.set_flag(CARRY, cpu.a & 0x01 != 0);
    cpu.a >>= 1;
    cpu.update_zn(cpu.a);
}
pub(crate) fn rol_acc(cpu: &mut CpuState) {
    let carry_in = cpu.flag(CARRY) as u8;
    cpu.set_flag(CARRY, cpu.a & 0x80 != 0);
    cpu.a = (cpu.a << 1) | carry_in;
    cpu.update_zn(cpu.a);
}
pub(crate) fn ror_acc(cpu: &mut CpuState) {
    let carry_in = if cpu.flag(CARRY) { 0x80 } else { 0 };
    cpu.set_flag(CARRY, cpu.a & 0x01 != 0);
    cpu.a = (cpu.a >> 1) | carry_in;
    cpu.update_zn(cpu.a);
}

pub(crate) fn asl_mem(cpu: &mut CpuState, bus: &mut Bus, addr: u16) {
    let mut carry_out = false;
    let r = rmw_memory(bus, addr, |old| {
        carry_out = old & 0x80 != 0;
        old << 1
    });
    cpu.set_flag(CARRY, carry_out);
    cpu.update_zn(r);
}
pub(crate) fn lsr_mem(cpu: &mut CpuState, bus: &mut Bus, addr: u16) {
    let mut carry_out = false;
    let r = rmw_memory(bus, addr, |old| {
        carry_out = old & 0x01 != 0;
        old >> 1
    });
    cpu.set_flag(CARRY, carry_out);
    cpu.update_zn(r);
}
pub(crate) fn rol_mem(cpu: &mut CpuState, bus: &mut Bus, addr: u16) {
    let carry_in = cpu.flag(CARRY) as u8;
    let mut carry_out = false;
    let r = rmw_memory(bus, addr, |old| {
        carry_out = old & 0x80 != 0;
        (old << 1) | carry_in
    });
    cpu.set_flag(CARRY, carry_out);
    cpu.update_zn(r);
}
pub(crate) fn ror_mem(cpu: &mut CpuState, bus: &mut Bus, addr: u16) {
    let carry_in = if cpu.flag(CARRY) { 0x80 } else { 0 };
    let mut carry_out = false;
    let r = rmw_memory(bus, addr, |old| {
        carry_out = old & 0x01 != 0;
        (old >> 1) | carry_in
    });
    cpu.set_flag(CARRY, carry_out);
    cpu.update_zn(r);
}

pub(crate) fn inc_mem(cpu: &mut CpuState, bus: &mut Bus, addr: u16) {
    let r = rmw_memory(bus, addr, |old| old.wrapping_add(1));
    cpu.update_zn(r);
}
pub(crate) fn dec_mem(cpu: &mut CpuState, bus: &mut Bus, addr: u16) {
    let r = rmw_memory(bus, addr, |old| old.wrapping_sub(1));
    cpu.update_zn(r);
}

/// 65C02 STZ: store zero without reading the target first.
pub(crate) fn stz(bus: &mut Bus, addr: u16) {
    bus.write(addr, 0);
}

/// 65C02 TSB: test-and-set bits. Z reflects (A & M) == 0 of the *original*
/// memory value; M is OR'd with A.
pub(crate) fn tsb(cpu: &mut CpuState, bus: &mut Bus, addr: u16) {
    let old = bus.read(addr);
    cpu.set_flag(ZERO, (cpu.a & old) == 0);
    bus.write(addr, old | cpu.a);
}

/// 65C02 TRB: test-and-reset bits. Z reflects (A & M) == 0 of the
/// *original* memory value; M has A's bits cleared.
pub(crate) fn trb(cpu: &mut CpuState, bus: &mut Bus, addr: u16) {
    let old = bus.read(addr);
    cpu.set_flag(ZERO, (cpu.a & old) == 0);
    bus.write(addr, old & !cpu.a);
}

/// 65C02 RMB n: clear bit `n` of the memory operand.
pub(crate) fn rmb(bus: &mut Bus, addr: u16, bit_index: u8) {
    rmw_memory(bus, addr, |old| old & !(1 << bit_index));
}
/// 65C02 SMB n: set bit `n` of the memory operand.
pub(crate) fn smb(bus: &mut Bus, addr: u16, bit_index: u8) {
    rmw_memory(bus, addr, |old| old | (1 << bit_index));
}

// ---------------------------------------------------------------------
// Compare
// ---------------------------------------------------------------------

/// CMP/CPX/CPY: R - M in 8 bits; carry set iff R >= M (no borrow).
pub(crate) fn compare(cpu: &mut CpuState, reg: u8, v: u8) {
    cpu.set_flag(CARRY, reg >= v);
    let r = reg.wrapping_sub(v);
    cpu.update_zn(r);
}

// ---------------------------------------------------------------------
// ADC / SBC
// ---------------------------------------------------------------------

/// ADC, binary mode: carry set iff the unsigned sum exceeds 255;
/// overflow per the signed-arithmetic formula in spec.md §4.5.
fn adc_binary(cpu: &mut CpuState, v: u8) {
    let a = cpu.a;
    let carry_in = cpu.flag(CARRY) as u16;
    let sum = a as u16 + v as u16 + carry_in;
    let result = sum as u8;

    cpu.set_flag(CARRY, sum > 0xFF);
    cpu.set_flag(OVERFLOW, ((a ^ result) & (v ^ result) & 0x80) != 0);
    cpu.a = result;
    cpu.update_zn(result);
}

/// SBC, binary mode: computed as A - M - (1 - carry_in), carry set iff
/// no borrow occurred.
fn sbc_binary(cpu: &mut CpuState, v: u8) {
    let a = cpu.a;
    let borrow_in = 1 - cpu.flag(CARRY) as i16;
    let diff = a as i16 - v as i16 - borrow_in;
    let result = diff as u8;

    cpu.set_flag(CARRY, diff >= 0);
    cpu.set_flag(OVERFLOW, ((a ^ v) & (a ^ result) & 0x80) != 0);
    cpu.a = result;
    cpu.update_zn(result);
}

/// ADC, decimal (BCD) mode: nibble-wise adjustment per spec.md §4.5.
/// N and Z come from the *unadjusted binary* result (authentic NMOS
/// behavior); V is variant-dependent (forced clear on NMOS, computed
/// from the binary-mode formula on CMOS).
fn adc_decimal(cpu: &mut CpuState, v: u8) {
    let a = cpu.a;
    let carry_in = cpu.flag(CARRY) as u16;

    // N/Z and (CMOS) V are derived from the plain binary sum.
    let binary_sum = a as u16 + v as u16 + carry_in;
    let binary_result = binary_sum as u8;

    let mut lo = (a & 0x0F) as u16 + (v & 0x0F) as u16 + carry_in;
    let mut carry_to_high = 0u16;
    if lo > 9 {
        lo += 6;
        carry_to_high = 1;
    }
    let mut hi = (a >> 4) as u16 + (v >> 4) as u16 + carry_to_high;
    let carry_out = if hi > 9 {
        hi += 6;
        true
    } else {
        false
    };

    let result = (((hi & 0x0F) << 4) | (lo & 0x0F)) as u8;
    cpu.a = result;
    cpu.set_flag(CARRY, carry_out);

    cpu.set_flag(ZERO, binary_result == 0);
    cpu.set_flag(NEGATIVE, binary_result & 0x80 != 0);
    match cpu.variant {
        Variant::Nmos6502 => cpu.set_flag(OVERFLOW, false),
        Variant::Cmos65C02 => {
            cpu.set_flag(OVERFLOW, ((a ^ binary_result) & (v ^ binary_result) & 0x80) != 0)
        }
    }
}

/// SBC, decimal mode: nibble-wise adjustment per spec.md §4.5.
fn sbc_decimal(cpu: &mut CpuState, v: u8) {
    let a = cpu.a;
    let borrow_in = 1 - cpu.flag(CARRY) as i16;

    let binary_diff = a as i16 - v as i16 - borrow_in;
    let binary_result = binary_diff as u8;

    let mut lo = (a & 0x0F) as i16 - (v & 0x0F) as i16 - borrow_in;
    let mut borrow_to_high = 0i16;
    if lo < 0 {
        lo += 10;
        borrow_to_high = 1;
    }
    let mut hi = (a >> 4) as i16 - (v >> 4) as i16 - borrow_to_high;
    let carry_out = if hi < 0 {
        hi += 10;
        false
    } else {
        true
    };

    let result = (((hi as u8) << 4) & 0xF0) | (lo as u8 & 0x0F);
    cpu.a = result;
    cpu.set_flag(CARRY, carry_out);

    cpu.set_flag(ZERO, binary_result == 0);
    cpu.set_flag(NEGATIVE, binary_result & 0x80 != 0);
    match cpu.variant {
        Variant::Nmos6502 => cpu.set_flag(OVERFLOW, false),
        Variant::Cmos65C02 => {
            cpu.set_flag(OVERFLOW, ((a ^ v) & (a ^ binary_result) & 0x80) != 0)
        }
    }
}

pub(crate) fn adc(cpu: &mut CpuState, v: u8) {
    if cpu.flag(DECIMAL) {
        adc_decimal(cpu, v);
    } else {
        adc_binary(cpu, v);
    }
}

pub(crate) fn sbc(cpu: &mut CpuState, v: u8) {
    if cpu.flag(DECIMAL) {
        sbc_decimal(cpu, v);
    } else {
        sbc_binary(cpu, v);
    }
}
