//! ED table with the ZX Spectrum Next extensions.
//!
//! Used instead of the plain ED table when the extended instruction set is
//! enabled. The new opcodes live in slots that are NOPs on a Z80, so every
//! other slot keeps its standard handler.

use super::flags::*;
use super::registers::Reg16;
use super::{Bus, Op, StackOp, Z80, ops_ed};

pub(super) static NEXT: [Op; 256] = build();

const fn build() -> [Op; 256] {
    let mut t = [ops_ed::op(0); 256];
    let mut c = 0;
    while c < 256 {
        t[c] = op(c as u8);
        c += 1;
    }
    t
}

const fn op(c: u8) -> Op {
    match c {
        0x23 => swapnib,
        0x24 => mirror_a,
        0x25 => ld_hl_sp,
        0x26 => mirror_de,
        0x27 => test_n,
        0x30 => mul,
        0x31 | 0x32 | 0x33 => add_rr_a,
        0x37 => inc_dehl,
        0x38 => dec_dehl,
        0x39 => add_dehl_a,
        0x3a => add_dehl_bc,
        0x3b => add_dehl_nn,
        0x3c => sub_dehl_a,
        0x3d => sub_dehl_bc,
        0x8a => push_nn,
        0x8b => popx,
        0x91 => nextreg_n,
        0x92 => nextreg_a,
        _ => ops_ed::op(c),
    }
}

fn swapnib(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    let a = cpu.a();
    cpu.set_a(a.rotate_left(4));
}

fn mirror_a(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    let a = cpu.a();
    cpu.set_a(a.reverse_bits());
}

fn ld_hl_sp(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    cpu.regs.hl = cpu.regs.sp;
}

fn mirror_de(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    let de = cpu.regs.de.as_u16();
    cpu.regs.de.set(de.reverse_bits());
}

/// TEST n: the flags of AND n, A unchanged.
fn test_n(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let n = cpu.fetch(bus);
    let r = cpu.a() & n;
    cpu.set_f(tables().logic(r) | FLAG_H);
}

/// MUL D,E: DE = D * E.
fn mul(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    let de = &mut cpu.regs.de;
    let r = de.hi() as u16 * de.lo() as u16;
    de.set(r);
}

/// ADD HL,A / ADD DE,A / ADD BC,A: A zero extended, no flags changed.
fn add_rr_a(cpu: &mut Z80, _bus: &mut dyn Bus, c: u8) {
    let r = match c {
        0x31 => Reg16::HL,
        0x32 => Reg16::DE,
        _ => Reg16::BC,
    };
    let w = cpu.regs.reg16(r).wrapping_add(cpu.a() as u16);
    cpu.regs.set_reg16(r, w);
}

/// DE:HL as a single 32-bit register.
fn dehl(cpu: &Z80) -> u32 {
    ((cpu.regs.de.as_u16() as u32) << 16) | cpu.regs.hl.as_u16() as u32
}

fn set_dehl(cpu: &mut Z80, v: u32) {
    cpu.regs.de.set((v >> 16) as u16);
    cpu.regs.hl.set(v as u16);
}

fn inc_dehl(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    set_dehl(cpu, dehl(cpu).wrapping_add(1));
}

fn dec_dehl(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    set_dehl(cpu, dehl(cpu).wrapping_sub(1));
}

fn add_dehl_a(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    let v = dehl(cpu).wrapping_add(cpu.a() as u32);
    set_dehl(cpu, v);
}

fn add_dehl_bc(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    let v = dehl(cpu).wrapping_add(cpu.regs.bc.as_u16() as u32);
    set_dehl(cpu, v);
}

fn add_dehl_nn(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let nn = cpu.fetch_u16(bus);
    let v = dehl(cpu).wrapping_add(nn as u32);
    set_dehl(cpu, v);
}

fn sub_dehl_a(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    let v = dehl(cpu).wrapping_sub(cpu.a() as u32);
    set_dehl(cpu, v);
}

fn sub_dehl_bc(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    let v = dehl(cpu).wrapping_sub(cpu.regs.bc.as_u16() as u32);
    set_dehl(cpu, v);
}

/// PUSH nn, operand low byte first.
fn push_nn(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let nn = cpu.fetch_u16(bus);
    cpu.push(bus, nn);
}

/// POPX: drops the top of the stack without reading it.
fn popx(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let old_sp = cpu.regs.sp.as_u16();
    cpu.regs.sp += 2;
    let pc = cpu.last_pc;
    cpu.stack_event(bus, pc, StackOp::Load, old_sp);
}

fn nextreg_n(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let reg = cpu.fetch(bus);
    let value = cpu.fetch(bus);
    bus.write_next_reg(reg, value);
}

fn nextreg_a(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let reg = cpu.fetch(bus);
    bus.write_next_reg(reg, cpu.a());
}
