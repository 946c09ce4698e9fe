//! CB prefixed opcodes: rotations, shifts and bit operations.

use super::{Bus, Op, Z80};

pub(super) static CB: [Op; 256] = build();

const fn build() -> [Op; 256] {
    let mut t = [shift_r as Op; 256];
    let mut c = 0;
    while c < 256 {
        t[c] = op(c as u8);
        c += 1;
    }
    t
}

const fn op(c: u8) -> Op {
    let mem = c & 0x07 == 0x06;
    match (c >> 6, mem) {
        (0, false) => shift_r,
        (0, true) => shift_mhl,
        (1, false) => bit_r,
        (1, true) => bit_mhl,
        (2, false) => res_r,
        (2, true) => res_mhl,
        (_, false) => set_r,
        (_, true) => set_mhl,
    }
}

fn shift_r(cpu: &mut Z80, _bus: &mut dyn Bus, c: u8) {
    let b = cpu.reg(c);
    let b = cpu.shift(c >> 3, b);
    cpu.set_reg(c, b);
}

/// Read-modify-write of `(HL)` with one internal cycle before the write.
fn modify_mhl(cpu: &mut Z80, bus: &mut dyn Bus, f: impl FnOnce(&mut Z80, u8) -> u8) {
    let hl = cpu.regs.hl.as_u16();
    let b = cpu.read(bus, hl);
    cpu.idle(bus, hl, 1);
    let b = f(cpu, b);
    cpu.write(bus, hl, b);
}

fn shift_mhl(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    modify_mhl(cpu, bus, |cpu, b| cpu.shift(c >> 3, b));
}

fn bit_r(cpu: &mut Z80, _bus: &mut dyn Bus, c: u8) {
    let b = cpu.reg(c);
    cpu.bit(c >> 3, b, b);
}

fn bit_mhl(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let hl = cpu.regs.hl.as_u16();
    let b = cpu.read(bus, hl);
    cpu.idle(bus, hl, 1);
    let xy = cpu.regs.wz.hi();
    cpu.bit(c >> 3, b, xy);
}

fn res_r(cpu: &mut Z80, _bus: &mut dyn Bus, c: u8) {
    let b = cpu.reg(c) & !(1 << ((c >> 3) & 0x07));
    cpu.set_reg(c, b);
}

fn res_mhl(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    modify_mhl(cpu, bus, |_, b| b & !(1 << ((c >> 3) & 0x07)));
}

fn set_r(cpu: &mut Z80, _bus: &mut dyn Bus, c: u8) {
    let b = cpu.reg(c) | (1 << ((c >> 3) & 0x07));
    cpu.set_reg(c, b);
}

fn set_mhl(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    modify_mhl(cpu, bus, |_, b| b | (1 << ((c >> 3) & 0x07)));
}
