//! DD CB / FD CB opcodes.
//!
//! The effective address is already in MEMPTR when the handler runs. All of them
//! operate on `(IX+d)`; the register field, when not 6, also receives a copy of
//! the result.

use super::registers::{Index, Reg8};
use super::{Bus, Op, Z80};

pub(super) static INDEX_CB: [Op; 256] = build();

const fn build() -> [Op; 256] {
    let mut t = [shift as Op; 256];
    let mut c = 0;
    while c < 256 {
        t[c] = match c >> 6 {
            0 => shift,
            1 => bit,
            2 => res,
            _ => set,
        };
        c += 1;
    }
    t
}

fn modify(cpu: &mut Z80, bus: &mut dyn Bus, c: u8, f: impl FnOnce(&mut Z80, u8) -> u8) {
    let addr = cpu.regs.wz.as_u16();
    let b = cpu.read(bus, addr);
    cpu.idle(bus, addr, 1);
    let b = f(cpu, b);
    cpu.write(bus, addr, b);
    if c & 0x07 != 0x06 {
        cpu.regs.set_reg8(Reg8::from_code(c, Index::HL), b);
    }
}

fn shift(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    modify(cpu, bus, c, |cpu, b| cpu.shift(c >> 3, b));
}

fn bit(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let addr = cpu.regs.wz.as_u16();
    let b = cpu.read(bus, addr);
    cpu.idle(bus, addr, 1);
    cpu.bit(c >> 3, b, (addr >> 8) as u8);
}

fn res(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    modify(cpu, bus, c, |_, b| b & !(1 << ((c >> 3) & 0x07)));
}

fn set(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    modify(cpu, bus, c, |_, b| b | (1 << ((c >> 3) & 0x07)));
}
