//! DD/FD prefixed opcodes.
//!
//! Only the `(HL)` forms need their own handlers: they become `(IX+d)`, and the
//! register operand next to them is the real H or L, not a half of IX.
//! Everything else is the unprefixed handler running with the index active.

use super::registers::{Index, Reg8};
use super::{Bus, Op, Z80, ops_base};

pub(super) static INDEX: [Op; 256] = build();

const fn build() -> [Op; 256] {
    let mut t = [ops_base::op(0); 256];
    let mut c = 0;
    while c < 256 {
        t[c] = op(c as u8);
        c += 1;
    }
    t
}

const fn op(c: u8) -> Op {
    match c {
        0x34 => inc_mix,
        0x35 => dec_mix,
        0x36 => ld_mix_n,
        0x76 => ops_base::op(c),
        0x40..=0x7f if c & 0x07 == 0x06 => ld_r_mix,
        0x70..=0x77 => ld_mix_r,
        0x80..=0xbf if c & 0x07 == 0x06 => alu_mix,
        _ => ops_base::op(c),
    }
}

/// Register operand of an `(IX+d)` instruction.
fn plain(code: u8) -> Reg8 {
    Reg8::from_code(code, Index::HL)
}

fn inc_mix(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let addr = cpu.index_addr(bus);
    let b = cpu.read(bus, addr);
    cpu.idle(bus, addr, 1);
    let b = cpu.inc8(b);
    cpu.write(bus, addr, b);
}

fn dec_mix(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let addr = cpu.index_addr(bus);
    let b = cpu.read(bus, addr);
    cpu.idle(bus, addr, 1);
    let b = cpu.dec8(b);
    cpu.write(bus, addr, b);
}

fn ld_mix_n(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let d = cpu.fetch(bus);
    let addr = cpu.hlx().as_u16().wrapping_add(d as i8 as u16);
    cpu.regs.wz.set(addr);
    let pc = cpu.regs.pc.as_u16();
    let n = cpu.read(bus, pc);
    cpu.idle(bus, pc, 2);
    cpu.regs.pc += 1;
    cpu.write(bus, addr, n);
}

fn ld_r_mix(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let addr = cpu.index_addr(bus);
    let b = cpu.read(bus, addr);
    cpu.regs.set_reg8(plain(c >> 3), b);
}

fn ld_mix_r(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let addr = cpu.index_addr(bus);
    let b = cpu.regs.reg8(plain(c));
    cpu.write(bus, addr, b);
}

fn alu_mix(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let addr = cpu.index_addr(bus);
    let b = cpu.read(bus, addr);
    cpu.alu(c >> 3, b);
}
