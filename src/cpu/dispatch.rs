/*!
dispatch.rs - Single-step orchestration: fetch, decode, execute, and
interrupt servicing (spec.md §4.5, §5).

This is the one file that ties `addressing`, `decode`, and `execute`
together into the fetch/decode/execute loop spec.md describes. Kept
separate from `mod.rs` so the public `Cpu` façade stays a thin wrapper
over these free functions, matching the teacher's stated split between
a public-surface module and its internal mechanics.
*/

use crate::bus::Bus;
use crate::cpu::addressing::{self, AddressMode, Operand};
use crate::cpu::decode::{decode, Mnemonic};
use crate::cpu::execute;
use crate::cpu::state::{CpuState, CARRY, DECIMAL, IRQ_DISABLE, NEGATIVE, OVERFLOW, ZERO};

const NMI_VECTOR: u16 = 0xFFFA;
const RESET_VECTOR: u16 = 0xFFFC;
const IRQ_VECTOR: u16 = 0xFFFE;

/// Read one byte, honoring the operand-fetch policy: stores never read
/// their target first (spec.md §4.5).
fn read_value(cpu: &mut CpuState, bus: &mut Bus, operand: Operand) -> u8 {
    match operand {
        Operand::Immediate(v) => v,
        Operand::Memory(addr) => bus.read(addr),
        Operand::Accumulator => cpu.a,
        Operand::Implied | Operand::ZeroPageBranch { .. } => 0,
    }
}

fn branch_if(cpu: &mut CpuState, target: u16, condition: bool) {
    if condition {
        cpu.pc = target;
    }
}

/// Execute one already-decoded instruction. `mode` has already been
/// resolved into `operand` by the caller's call to `addressing::resolve`.
fn execute_instruction(
    cpu: &mut CpuState,
    bus: &mut Bus,
    mnemonic: Mnemonic,
    operand: Operand,
) {
    use Mnemonic::*;

    match mnemonic {
        Nop | Stp | Wai => {}

        Brk => service_interrupt(cpu, bus, IRQ_VECTOR, true),
        Rti => {
            let status = execute::pop(cpu, bus);
            cpu.restore_status_from_pop(status);
            cpu.pc = execute::pop_word(cpu, bus);
        }

        Clc => cpu.set_flag(CARRY, false),
        Sec => cpu.set_flag(CARRY, true),
        Cli => cpu.set_flag(IRQ_DISABLE, false),
        Sei => cpu.set_flag(IRQ_DISABLE, true),
        Cld => cpu.set_flag(DECIMAL, false),
        Sed => cpu.set_flag(DECIMAL, true),
        Clv => cpu.set_flag(OVERFLOW, false),

        Dex => execute::dex(cpu),
        Dey => execute::dey(cpu),
        Inx => execute::inx(cpu),
        Iny => execute::iny(cpu),
        Tax => execute::tax(cpu),
        Tay => execute::tay(cpu),
        Txa => execute::txa(cpu),
        Tya => execute::tya(cpu),
        Tsx => execute::tsx(cpu),
        Txs => execute::txs(cpu),

        Pha => execute::pha(cpu, bus),
        Php => execute::php(cpu, bus),
        Pla => execute::pla(cpu, bus),
        Plp => execute::plp(cpu, bus),
        Phx => execute::phx(cpu, bus),
        Phy => execute::phy(cpu, bus),
        Plx => execute::plx(cpu, bus),
        Ply => execute::ply(cpu, bus),

        Rts => {
            let target = execute::pop_word(cpu, bus);
            cpu.pc = target.wrapping_add(1);
        }
        Jsr => {
            let target = operand.address().expect("JSR always resolves to Memory");
            let return_to = cpu.pc.wrapping_sub(1);
            execute::push_word(cpu, bus, return_to);
            cpu.pc = target;
        }
        Jmp => {
            cpu.pc = operand.address().expect("JMP always resolves to Memory");
        }

        Bpl => branch_if(cpu, addr_of(operand), !cpu.flag(NEGATIVE)),
        Bmi => branch_if(cpu, addr_of(operand), cpu.flag(NEGATIVE)),
        Bvc => branch_if(cpu, addr_of(operand), !cpu.flag(OVERFLOW)),
        Bvs => branch_if(cpu, addr_of(operand), cpu.flag(OVERFLOW)),
        Bcc => branch_if(cpu, addr_of(operand), !cpu.flag(CARRY)),
        Bcs => branch_if(cpu, addr_of(operand), cpu.flag(CARRY)),
        Bne => branch_if(cpu, addr_of(operand), !cpu.flag(ZERO)),
        Beq => branch_if(cpu, addr_of(operand), cpu.flag(ZERO)),
        Bra => branch_if(cpu, addr_of(operand), true),

        Lda => {
            let v = read_value(cpu, bus, operand);
            execute::lda(cpu, v);
        }
        Ldx => {
            let v = read_value(cpu, bus, operand);
            execute::ldx(cpu, v);
        }
        Ldy => {
            let v = read_value(cpu, bus, operand);
            execute::ldy(cpu, v);
        }
        Sta => bus.write(operand.address().expect("STA resolves to Memory"), cpu.a),
        Stx => bus.write(operand.address().expect("STX resolves to Memory"), cpu.x),
        Sty => bus.write(operand.address().expect("STY resolves to Memory"), cpu.y),
        Stz => execute::stz(bus, operand.address().expect("STZ resolves to Memory")),

        And => {
            let v = read_value(cpu, bus, operand);
            execute::and(cpu, v);
        }
        Ora => {
            let v = read_value(cpu, bus, operand);
            execute::ora(cpu, v);
        }
        Eor => {
            let v = read_value(cpu, bus, operand);
            execute::eor(cpu, v);
        }
        Adc => {
            let v = read_value(cpu, bus, operand);
            execute::adc(cpu, v);
        }
        Sbc => {
            let v = read_value(cpu, bus, operand);
            execute::sbc(cpu, v);
        }
        Cmp => {
            let v = read_value(cpu, bus, operand);
            execute::compare(cpu, cpu.a, v);
        }
        Cpx => {
            let v = read_value(cpu, bus, operand);
            execute::compare(cpu, cpu.x, v);
        }
        Cpy => {
            let v = read_value(cpu, bus, operand);
            execute::compare(cpu, cpu.y, v);
        }
        Bit => match operand {
            Operand::Immediate(v) => execute::bit_immediate(cpu, v),
            _ => {
                let v = read_value(cpu, bus, operand);
                execute::bit(cpu, v);
            }
        },

        Asl => match operand {
            Operand::Accumulator => execute::asl_acc(cpu),
            _ => execute::asl_mem(cpu, bus, addr_of(operand)),
        },
        Lsr => match operand {
            Operand::Accumulator => execute::lsr_acc(cpu),
            _ => execute::lsr_mem(cpu, bus, addr_of(operand)),
        },
        Rol => match operand {
            Operand::Accumulator => execute::rol_acc(cpu),
            _ => execute::rol_mem(cpu, bus, addr_of(operand)),
        },
        Ror => match operand {
            Operand::Accumulator => execute::ror_acc(cpu),
            _ => execute::ror_mem(cpu, bus, addr_of(operand)),
        },
        Inc => match operand {
            Operand::Accumulator => execute::inc_a(cpu),
            _ => execute::inc_mem(cpu, bus, addr_of(operand)),
        },
        Dec => match operand {
            Operand::Accumulator => execute::dec_a(cpu),
            _ => execute::dec_mem(cpu, bus, addr_of(operand)),
        },

        Trb => execute::trb(cpu, bus, addr_of(operand)),
        Tsb => execute::tsb(cpu, bus, addr_of(operand)),
        Rmb(n) => execute::rmb(bus, addr_of(operand), n),
        Smb(n) => execute::smb(bus, addr_of(operand), n),

        Bbr(n) => bit_branch(cpu, bus, operand, n, false),
        Bbs(n) => bit_branch(cpu, bus, operand, n, true),
    }
}

fn addr_of(operand: Operand) -> u16 {
    operand.address().expect("operand resolves to a memory address")
}

fn bit_branch(cpu: &mut CpuState, bus: &mut Bus, operand: Operand, bit: u8, set: bool) {
    if let Operand::ZeroPageBranch { zp_addr, target } = operand {
        let v = bus.read(zp_addr);
        let bit_is_set = v & (1 << bit) != 0;
        if bit_is_set == set {
            cpu.pc = target;
        }
    }
}

/// Push PC and SR and vector to `vector`, shared by BRK/IRQ/NMI
/// (spec.md §4.5 "Interrupt service").
fn service_interrupt(cpu: &mut CpuState, bus: &mut Bus, vector: u16, software_origin: bool) {
    if software_origin {
        // BRK's one-byte padding slot is skipped before the frame is pushed.
        cpu.pc = cpu.pc.wrapping_add(1);
    }
    execute::push_word(cpu, bus, cpu.pc);
    let status = cpu.compose_status_for_push(software_origin);
    execute::push(cpu, bus, status);
    cpu.set_flag(IRQ_DISABLE, true);
    cpu.pc = bus.read_word(vector);
}

/// Fetch, decode, and execute exactly one instruction, then tick the
/// bus and poll for pending interrupts (spec.md §2, §5).
pub(crate) fn step(cpu: &mut CpuState, bus: &mut Bus) {
    if cpu.halted {
        return;
    }
    if cpu.reset_pending {
        do_reset(cpu, bus);
        return;
    }

    let opcode = addressing::fetch_byte(cpu, bus);
    let (mnemonic, mode) = decode(opcode);
    let operand = resolve_for(cpu, bus, mnemonic, mode);
    execute_instruction(cpu, bus, mnemonic, operand);

    bus.tick();
    if bus.device_irq_pending() {
        cpu.irq_pending = true;
    }
    poll_interrupts(cpu, bus);
}

/// BRK consumes its operand as a one-byte padding slot handled inside
/// `service_interrupt`, not through the addressing phase; every other
/// mnemonic resolves its operand normally.
fn resolve_for(cpu: &mut CpuState, bus: &mut Bus, mnemonic: Mnemonic, mode: AddressMode) -> Operand {
    if matches!(mnemonic, Mnemonic::Brk) {
        return Operand::Implied;
    }
    addressing::resolve(cpu, bus, mode)
}

/// Post-instruction interrupt poll: NMI strictly dominates IRQ; IRQ is
/// gated by the irq-disable flag (spec.md §4.5, §5).
fn poll_interrupts(cpu: &mut CpuState, bus: &mut Bus) {
    if cpu.nmi_pending {
        cpu.nmi_pending = false;
        service_interrupt(cpu, bus, NMI_VECTOR, false);
    } else if cpu.irq_pending && !cpu.flag(IRQ_DISABLE) {
        cpu.irq_pending = false;
        service_interrupt(cpu, bus, IRQ_VECTOR, false);
    }
}

fn do_reset(cpu: &mut CpuState, bus: &mut Bus) {
    cpu.reset_registers();
    cpu.pc = bus.read_word(RESET_VECTOR);
}

/// Perform the reset sequence immediately (used by `Cpu::reset`, which
/// does not wait for the next `step` boundary).
pub(crate) fn reset_now(cpu: &mut CpuState, bus: &mut Bus) {
    cpu.reset_pending = false;
    do_reset(cpu, bus);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;

    fn setup() -> (CpuState, Bus) {
        (CpuState::new(Variant::Nmos6502), Bus::new())
    }

    #[test]
    fn jsr_then_rts_returns_to_byte_after_operand() {
        let (mut cpu, mut bus) = setup();
        bus.load_bytes(0x0200, &[0x20, 0x00, 0x10]); // JSR $1000
        bus.load_bytes(0x1000, &[0x60]); // RTS
        cpu.pc = 0x0200;
        cpu.sp = 0xFD;

        step(&mut cpu, &mut bus);
        assert_eq!(cpu.pc, 0x1000);
        assert_eq!(cpu.sp, 0xFB);
        assert_eq!(bus.read(0x01FD), 0x02);
        assert_eq!(bus.read(0x01FC), 0x02);

        step(&mut cpu, &mut bus);
        assert_eq!(cpu.pc, 0x0203);
        assert_eq!(cpu.sp, 0xFD);
    }

    #[test]
    fn brk_then_rti_round_trips() {
        let (mut cpu, mut bus) = setup();
        bus.load_bytes(0xFFFE, &[0x00, 0x20]); // IRQ/BRK vector -> $2000
        bus.load_bytes(0x2000, &[0x40]); // RTI
        bus.load_bytes(0x0200, &[0x00, 0xEA]); // BRK, padding
        cpu.pc = 0x0200;
        cpu.sp = 0xFD;
        cpu.set_flag(IRQ_DISABLE, false);

        step(&mut cpu, &mut bus);
        assert_eq!(cpu.pc, 0x2000);
        assert_eq!(cpu.sp, 0xFA);
        assert!(cpu.flag(IRQ_DISABLE));
        let pushed_sr = bus.read(0x01FB);
        assert_ne!(pushed_sr & 0b0001_0000, 0);

        step(&mut cpu, &mut bus);
        assert_eq!(cpu.pc, 0x0202);
        assert_eq!(cpu.sp, 0xFD);
    }

    #[test]
    fn nmi_takes_priority_over_pending_irq() {
        let (mut cpu, mut bus) = setup();
        bus.load_bytes(0xFFFA, &[0x00, 0x30]); // NMI vector -> $3000
        bus.load_bytes(0xFFFE, &[0x00, 0x40]); // IRQ vector -> $4000
        bus.load_bytes(0x0200, &[0xEA]); // NOP
        cpu.pc = 0x0200;
        cpu.set_flag(IRQ_DISABLE, false);
        cpu.nmi_pending = true;
        cpu.irq_pending = true;

        step(&mut cpu, &mut bus);
        assert_eq!(cpu.pc, 0x3000);
        assert!(cpu.irq_pending, "IRQ must remain pending after NMI preempts it");
    }

    #[test]
    fn zero_page_x_never_crosses_into_page_one() {
        let (mut cpu, mut bus) = setup();
        bus.load_bytes(0x0200, &[0xB5, 0xFF]); // LDA $FF,X
        bus.load_bytes(0x0000, &[0x7A]);
        cpu.pc = 0x0200;
        cpu.x = 1;
        step(&mut cpu, &mut bus);
        assert_eq!(cpu.a, 0x7A);
    }

    #[test]
    fn reset_pending_short_circuits_decode() {
        let (mut cpu, mut bus) = setup();
        bus.load_bytes(0xFFFC, &[0x00, 0x40]);
        cpu.reset_pending = true;
        cpu.a = 0x99;
        step(&mut cpu, &mut bus);
        assert_eq!(cpu.pc, 0x4000);
        assert_eq!(cpu.a, 0);
        assert!(!cpu.reset_pending);
    }
}
