/*!
decode.rs - Opcode-to-(mnemonic, addressing-mode) lookup (spec.md §4.5,
§9 "Decode dispatch").

spec.md recommends two parallel 256-entry tables. This core collapses
them into a single exhaustively-matched function over the opcode byte,
returning both halves at once: a `match` with all 256 arms gets the
same compiler-checked completeness spec.md's design note is after,
without the bookkeeping of keeping two separately-indexed const arrays
in sync opcode-by-opcode.

Every cell absent from the documented 6502 instruction set and the
65C02 additions decodes to `(Mnemonic::Nop, AddressMode::Implied)`
(spec.md §4.5: "Unmapped cells map to NOP"), matching this core's
explicit Non-goal of not modeling undocumented-opcode behavior.
*/

use crate::cpu::addressing::AddressMode;

/// Instruction mnemonics this core decodes: the documented 6502 set
/// plus the 65C02 additions (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs,
    Clc, Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny,
    Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror,
    Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,

    // 65C02 additions.
    Bra, Phx, Phy, Plx, Ply, Stz, Trb, Tsb, Stp, Wai,
    /// Bit-branch-on-reset/set, parametrized by bit index 0..=7.
    Bbr(u8),
    Bbs(u8),
    /// Reset/set-memory-bit, parametrized by bit index 0..=7.
    Rmb(u8),
    Smb(u8),
}

/// Decode `opcode` into its mnemonic and addressing mode.
pub fn decode(opcode: u8) -> (Mnemonic, AddressMode) {
    use AddressMode::*;
    use Mnemonic::*;

    match opcode {
        0x00 => (Brk, Implied),
        0x01 => (Ora, IndexedIndirectX),
        0x04 => (Tsb, ZeroPage),
        0x05 => (Ora, ZeroPage),
        0x06 => (Asl, ZeroPage),
        0x07 => (Rmb(0), ZeroPage),
        0x08 => (Php, Implied),
        0x09 => (Ora, Immediate),
        0x0A => (Asl, Accumulator),
        0x0C => (Tsb, Absolute),
        0x0D => (Ora, Absolute),
        0x0E => (Asl, Absolute),
        0x0F => (Bbr(0), ZeroPageRelative),

        0x10 => (Bpl, Relative),
        0x11 => (Ora, IndirectIndexedY),
        0x12 => (Ora, ZeroPageIndirect),
        0x14 => (Trb, ZeroPage),
        0x15 => (Ora, ZeroPageX),
        0x16 => (Asl, ZeroPageX),
        0x17 => (Rmb(1), ZeroPage),
        0x18 => (Clc, Implied),
        0x19 => (Ora, AbsoluteY),
        0x1A => (Inc, Accumulator),
        0x1C => (Trb, Absolute),
        0x1D => (Ora, AbsoluteX),
        0x1E => (Asl, AbsoluteX),
        0x1F => (Bbr(1), ZeroPageRelative),

        0x20 => (Jsr, Absolute),
        0x21 => (And, IndexedIndirectX),
        0x24 => (Bit, ZeroPage),
        0x25 => (And, ZeroPage),
        0x26 => (Rol, ZeroPage),
        0x27 => (Rmb(2), ZeroPage),
        0x28 => (Plp, Implied),
        0x29 => (And, Immediate),
        0x2A => (Rol, Accumulator),
        0x2C => (Bit, Absolute),
        0x2D => (And, Absolute),
        0x2E => (Rol, Absolute),
        0x2F => (Bbr(2), ZeroPageRelative),

        0x30 => (Bmi, Relative),
        0x31 => (And, IndirectIndexedY),
        0x32 => (And, ZeroPageIndirect),
        0x34 => (Bit, ZeroPageX),
        0x35 => (And, ZeroPageX),
        0x36 => (Rol, ZeroPageX),
        0x37 => (Rmb(3), ZeroPage),
        0x38 => (Sec, Implied),
        0x39 => (And, AbsoluteY),
        0x3A => (Dec, Accumulator),
        0x3C => (Bit, AbsoluteX),
        0x3D => (And, AbsoluteX),
        0x3E => (Rol, AbsoluteX),
        0x3F => (Bbr(3), ZeroPageRelative),

        0x40 => (Rti, Implied),
        0x41 => (Eor, IndexedIndirectX),
        0x45 => (Eor, ZeroPage),
        0x46 => (Lsr, ZeroPage),
        0x47 => (Rmb(4), ZeroPage),
        0x48 => (Pha, Implied),
        0x49 => (Eor, Immediate),
        0x4A => (Lsr, Accumulator),
        0x4C => (Jmp, Absolute),
        0x4D => (Eor, Absolute),
        0x4E => (Lsr, Absolute),
        0x4F => (Bbr(4), ZeroPageRelative),

        0x50 => (Bvc, Relative),
        0x51 => (Eor, IndirectIndexedY),
        0x52 => (Eor, ZeroPageIndirect),
        0x55 => (Eor, ZeroPageX),
        0x56 => (Lsr, ZeroPageX),
        0x57 => (Rmb(5), ZeroPage),
        0x58 => (Cli, Implied),
        0x59 => (Eor, AbsoluteY),
        0x5A => (Phy, Implied),
        0x5D => (Eor, AbsoluteX),
        0x5E => (Lsr, AbsoluteX),
        0x5F => (Bbr(5), ZeroPageRelative),

        0x60 => (Rts, Implied),
        0x61 => (Adc, IndexedIndirectX),
        0x64 => (Stz, ZeroPage),
        0x65 => (Adc, ZeroPage),
        0x66 => (Ror, ZeroPage),
        0x67 => (Rmb(6), ZeroPage),
        0x68 => (Pla, Implied),
        0x69 => (Adc, Immediate),
        0x6A => (Ror, Accumulator),
        0x6C => (Jmp, Indirect),
        0x6D => (Adc, Absolute),
        0x6E => (Ror, Absolute),
        0x6F => (Bbr(6), ZeroPageRelative),

        0x70 => (Bvs, Relative),
        0x71 => (Adc, IndirectIndexedY),
        0x72 => (Adc, ZeroPageIndirect),
        0x74 => (Stz, ZeroPageX),
        0x75 => (Adc, ZeroPageX),
        0x76 => (Ror, ZeroPageX),
        0x77 => (Rmb(7), ZeroPage),
        0x78 => (Sei, Implied),
        0x79 => (Adc, AbsoluteY),
        0x7A => (Ply, Implied),
        0x7C => (Jmp, AbsoluteIndexedIndirect),
        0x7D => (Adc, AbsoluteX),
        0x7E => (Ror, AbsoluteX),
        0x7F => (Bbr(7), ZeroPageRelative),

        0x80 => (Bra, Relative),
        0x81 => (Sta, IndexedIndirectX),
        0x84 => (Sty, ZeroPage),
        0x85 => (Sta, ZeroPage),
        0x86 => (Stx, ZeroPage),
        0x87 => (Smb(0), ZeroPage),
        0x88 => (Dey, Implied),
        0x89 => (Bit, Immediate),
        0x8A => (Txa, Implied),
        0x8C => (Sty, Absolute),
        0x8D => (Sta, Absolute),
        0x8E => (Stx, Absolute),
        0x8F => (Bbs(0), ZeroPageRelative),

        0x90 => (Bcc, Relative),
        0x91 => (Sta, IndirectIndexedY),
        0x92 => (Sta, ZeroPageIndirect),
        0x94 => (Sty, ZeroPageX),
        0x95 => (Sta, ZeroPageX),
        0x96 => (Stx, ZeroPageY),
        0x97 => (Smb(1), ZeroPage),
        0x98 => (Tya, Implied),
        0x99 => (Sta, AbsoluteY),
        0x9A => (Txs, Implied),
        0x9C => (Stz, Absolute),
        0x9D => (Sta, AbsoluteX),
        0x9E => (Stz, AbsoluteX),
        0x9F => (Bbs(1), ZeroPageRelative),

        0xA0 => (Ldy, Immediate),
        0xA1 => (Lda, IndexedIndirectX),
        0xA2 => (Ldx, Immediate),
        0xA4 => (Ldy, ZeroPage),
        0xA5 => (Lda, ZeroPage),
        0xA6 => (Ldx, ZeroPage),
        0xA7 => (Smb(2), ZeroPage),
        0xA8 => (Tay, Implied),
        0xA9 => (Lda, Immediate),
        0xAA => (Tax, Implied),
        0xAC => (Ldy, Absolute),
        0xAD => (Lda, Absolute),
        0xAE => (Ldx, Absolute),
        0xAF => (Bbs(2), ZeroPageRelative),

        0xB0 => (Bcs, Relative),
        0xB1 => (Lda, IndirectIndexedY),
        0xB2 => (Lda, ZeroPageIndirect),
        0xB4 => (Ldy, ZeroPageX),
        0xB5 => (Lda, ZeroPageX),
        0xB6 => (Ldx, ZeroPageY),
        0xB7 => (Smb(3), ZeroPage),
        0xB8 => (Clv, Implied),
        0xB9 => (Lda, AbsoluteY),
        0xBA => (Tsx, Implied),
        0xBC => (Ldy, AbsoluteX),
        0xBD => (Lda, AbsoluteX),
        0xBE => (Ldx, AbsoluteY),
        0xBF => (Bbs(3), ZeroPageRelative),

        0xC0 => (Cpy, Immediate),
        0xC1 => (Cmp, IndexedIndirectX),
        0xC4 => (Cpy, ZeroPage),
        0xC5 => (Cmp, ZeroPage),
        0xC6 => (Dec, ZeroPage),
        0xC7 => (Smb(4), ZeroPage),
        0xC8 => (Iny, Implied),
        0xC9 => (Cmp, Immediate),
        0xCA => (Dex, Implied),
        0xCC => (Cpy, Absolute),
        0xCD => (Cmp, Absolute),
        0xCE => (Dec, Absolute),
        0xCF => (Bbs(4), ZeroPageRelative),

        0xD0 => (Bne, Relative),
        0xD1 => (Cmp, IndirectIndexedY),
        0xD2 => (Cmp, ZeroPageIndirect),
        0xD5 => (Cmp, ZeroPageX),
        0xD6 => (Dec, ZeroPageX),
        0xD7 => (Smb(5), ZeroPage),
        0xD8 => (Cld, Implied),
        0xD9 => (Cmp, AbsoluteY),
        0xDA => (Phx, Implied),
        0xDB => (Stp, Implied),
        0xDD => (Cmp, AbsoluteX),
        0xDE => (Dec, AbsoluteX),
        0xDF => (Bbs(5), ZeroPageRelative),

        0xE0 => (Cpx, Immediate),
        0xE1 => (Sbc, IndexedIndirectX),
        0xE4 => (Cpx, ZeroPage),
        0xE5 => (Sbc, ZeroPage),
        0xE6 => (Inc, ZeroPage),
        0xE7 => (Smb(6), ZeroPage),
        0xE8 => (Inx, Implied),
        0xE9 => (Sbc, Immediate),
        0xEA => (Nop, Implied),
        0xEC => (Cpx, Absolute),
        0xED => (Sbc, Absolute),
        0xEE => (Inc, Absolute),
        0xEF => (Bbs(6), ZeroPageRelative),

        0xF0 => (Beq, Relative),
        0xF1 => (Sbc, IndirectIndexedY),
        0xF2 => (Sbc, ZeroPageIndirect),
        0xF5 => (Sbc, ZeroPageX),
        0xF6 => (Inc, ZeroPageX),
        0xF7 => (Smb(7), ZeroPage),
        0xF8 => (Sed, Implied),
        0xF9 => (Sbc, AbsoluteY),
        0xFA => (Plx, Implied),
        0xFB => (Wai, Implied),
        0xFD => (Sbc, AbsoluteX),
        0xFE => (Inc, AbsoluteX),
        0xFF => (Bbs(7), ZeroPageRelative),

        // Everything else: unmapped NMOS/65C02 cells (illegal opcodes,
        // reserved CMOS multi-byte NOPs) decode to plain NOP.
        _ => (Nop, Implied),
    }
}
