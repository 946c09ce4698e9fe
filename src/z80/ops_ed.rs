//! ED prefixed opcodes.
//!
//! The slots the Z80 leaves undefined behave as an 8 T-state NOP.

use super::flags::*;
use super::registers::{Index, Reg16, Reg8};
use super::{BranchKind, Bus, InterruptMode, Op, Z80};

pub(super) static ED: [Op; 256] = build();

const fn build() -> [Op; 256] {
    let mut t = [nop as Op; 256];
    let mut c = 0;
    while c < 256 {
        t[c] = op(c as u8);
        c += 1;
    }
    t
}

pub(super) const fn op(c: u8) -> Op {
    match c {
        0x40..=0x7f => match c & 0x0f {
            0x00 | 0x08 => in_r_c,
            0x01 | 0x09 => out_c_r,
            0x02 => sbc_hl_rr,
            0x0a => adc_hl_rr,
            0x03 => ld_mnn_rr,
            0x0b => ld_rr_mnn,
            0x04 | 0x0c => neg,
            0x05 | 0x0d => retn,
            0x06 | 0x0e => im,
            _ => match c {
                0x47 => ld_i_a,
                0x4f => ld_r_a,
                0x57 => ld_a_i,
                0x5f => ld_a_r,
                0x67 => rrd,
                0x6f => rld,
                _ => nop,
            },
        },
        0xa0 | 0xa8 | 0xb0 | 0xb8 => ldi,
        0xa1 | 0xa9 | 0xb1 | 0xb9 => cpi,
        0xa2 | 0xaa | 0xb2 | 0xba => ini,
        0xa3 | 0xab | 0xb3 | 0xbb => outi,
        _ => nop,
    }
}

fn nop(_cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {}

fn in_r_c(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let bc = cpu.regs.bc.as_u16();
    let b = cpu.port_in(bus, bc);
    cpu.regs.wz.set(bc.wrapping_add(1));
    let f = (cpu.f() & FLAG_C) | sz53p(b);
    cpu.set_f(f);
    //ED 70 is IN F,(C): only the flags are updated
    let r = c >> 3;
    if r & 0x07 != 0x06 {
        cpu.set_reg(r, b);
    }
}

fn out_c_r(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let bc = cpu.regs.bc.as_u16();
    let r = c >> 3;
    //ED 71 is OUT (C),0
    let b = if r & 0x07 == 0x06 { 0 } else { cpu.reg(r) };
    cpu.port_out(bus, bc, b);
    cpu.regs.wz.set(bc.wrapping_add(1));
}

fn sbc_hl_rr(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    cpu.idle_ir(bus, 7);
    let hl = cpu.regs.hl.as_u16();
    let rr = cpu.regs.reg16(Reg16::from_rr(c >> 4, Index::HL));
    let r = cpu.sbc16(hl, rr);
    cpu.regs.wz.set(hl.wrapping_add(1));
    cpu.regs.hl.set(r);
}

fn adc_hl_rr(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    cpu.idle_ir(bus, 7);
    let hl = cpu.regs.hl.as_u16();
    let rr = cpu.regs.reg16(Reg16::from_rr(c >> 4, Index::HL));
    let r = cpu.adc16(hl, rr);
    cpu.regs.wz.set(hl.wrapping_add(1));
    cpu.regs.hl.set(r);
}

fn ld_mnn_rr(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let addr = cpu.fetch_u16(bus);
    let w = cpu.regs.reg16(Reg16::from_rr(c >> 4, Index::HL));
    cpu.write_u16(bus, addr, w);
    cpu.regs.wz.set(addr.wrapping_add(1));
}

fn ld_rr_mnn(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let addr = cpu.fetch_u16(bus);
    let w = cpu.read_u16(bus, addr);
    cpu.load_rr(bus, Reg16::from_rr(c >> 4, Index::HL), w);
    cpu.regs.wz.set(addr.wrapping_add(1));
}

fn neg(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    cpu.neg();
}

/// RETN and RETI, including the undocumented mirrors. All of them restore IFF1.
fn retn(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    cpu.iff1 = cpu.iff2;
    let pc = cpu.pop(bus);
    cpu.regs.wz.set(pc);
    cpu.branch(bus, BranchKind::Return, pc);
}

fn im(cpu: &mut Z80, _bus: &mut dyn Bus, c: u8) {
    cpu.im = match (c >> 3) & 0x03 {
        2 => InterruptMode::IM1,
        3 => InterruptMode::IM2,
        //IM 0/1 (ED 4E, 6E) behaves as IM 0
        _ => InterruptMode::IM0,
    };
}

fn ld_i_a(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    cpu.idle_ir(bus, 1);
    cpu.regs.i = cpu.a();
}

fn ld_r_a(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    cpu.idle_ir(bus, 1);
    cpu.regs.r = cpu.a();
}

fn ld_a_ir(cpu: &mut Z80, bus: &mut dyn Bus, r: Reg8) {
    cpu.idle_ir(bus, 1);
    let b = cpu.regs.reg8(r);
    cpu.set_a(b);
    let f = (cpu.f() & FLAG_C) | sz53(b);
    let f = set_flag8(f, FLAG_PV, cpu.iff2);
    cpu.set_f(f);
}

fn ld_a_i(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    ld_a_ir(cpu, bus, Reg8::I);
}

fn ld_a_r(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    ld_a_ir(cpu, bus, Reg8::R);
}

fn rrd(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let hl = cpu.regs.hl.as_u16();
    let b = cpu.read(bus, hl);
    cpu.idle(bus, hl, 4);
    let a = cpu.a();
    cpu.write(bus, hl, (a << 4) | (b >> 4));
    let a = (a & 0xf0) | (b & 0x0f);
    cpu.set_a(a);
    let f = (cpu.f() & FLAG_C) | sz53p(a);
    cpu.set_f(f);
    cpu.regs.wz.set(hl.wrapping_add(1));
}

fn rld(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let hl = cpu.regs.hl.as_u16();
    let b = cpu.read(bus, hl);
    cpu.idle(bus, hl, 4);
    let a = cpu.a();
    cpu.write(bus, hl, (b << 4) | (a & 0x0f));
    let a = (a & 0xf0) | (b >> 4);
    cpu.set_a(a);
    let f = (cpu.f() & FLAG_C) | sz53p(a);
    cpu.set_f(f);
    cpu.regs.wz.set(hl.wrapping_add(1));
}

/// Direction and repetition of a block instruction: bit 3 set means decrement,
/// bit 4 set means repeat.
fn block_mode(c: u8) -> (u16, bool) {
    let step = if c & 0x08 == 0 { 1 } else { 0xffff };
    (step, c & 0x10 != 0)
}

/// Rewinds PC over the ED prefix so the same instruction runs again.
fn repeat(cpu: &mut Z80) {
    cpu.regs.pc -= 2;
    let pc = cpu.regs.pc.as_u16();
    cpu.regs.wz.set(pc.wrapping_add(1));
}

/// LDI LDD LDIR LDDR
fn ldi(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let (step, rep) = block_mode(c);
    let hl = cpu.regs.hl.as_u16();
    let de = cpu.regs.de.as_u16();
    let b = cpu.read(bus, hl);
    cpu.write(bus, de, b);
    cpu.idle(bus, de, 2);
    cpu.regs.bc -= 1;
    let bc = cpu.regs.bc.as_u16();

    let n = cpu.a().wrapping_add(b);
    let mut f = (cpu.f() & (FLAG_S | FLAG_Z | FLAG_C)) | (n & FLAG_X) | ((n << 4) & FLAG_Y);
    f = set_flag8(f, FLAG_PV, bc != 0);
    cpu.set_f(f);

    if rep && bc != 0 {
        cpu.idle(bus, de, 5);
        repeat(cpu);
    }
    cpu.regs.hl += step;
    cpu.regs.de += step;
}

/// CPI CPD CPIR CPDR
fn cpi(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let (step, rep) = block_mode(c);
    let hl = cpu.regs.hl.as_u16();
    let b = cpu.read(bus, hl);
    cpu.idle(bus, hl, 5);
    cpu.regs.bc -= 1;
    let bc = cpu.regs.bc.as_u16();
    cpu.regs.wz += step;

    let a = cpu.a();
    let r = a.wrapping_sub(b);
    let half = (a & 0x0f) < (b & 0x0f);
    let n = r.wrapping_sub(half as u8);
    let mut f = (cpu.f() & FLAG_C) | FLAG_N | (sz53(r) & (FLAG_S | FLAG_Z)) | (n & FLAG_X) | ((n << 4) & FLAG_Y);
    f = set_flag8(f, FLAG_H, half);
    f = set_flag8(f, FLAG_PV, bc != 0);
    cpu.set_f(f);

    if rep && bc != 0 && r != 0 {
        cpu.idle(bus, hl, 5);
        repeat(cpu);
    }
    cpu.regs.hl += step;
}

/// Flags shared by the block I/O instructions. `k` is the byte transferred plus
/// C+1, C-1 or the new L, depending on the instruction.
fn block_io_flags(cpu: &mut Z80, value: u8, k: u16) {
    let b = cpu.regs.bc.hi();
    let mut f = sz53(b);
    f = set_flag8(f, FLAG_N, value & 0x80 != 0);
    f = set_flag8(f, FLAG_H | FLAG_C, k > 0xff);
    f = set_flag8(f, FLAG_PV, parity((k as u8 & 0x07) ^ b));
    cpu.set_f(f);
}

/// INI IND INIR INDR
fn ini(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let (step, rep) = block_mode(c);
    cpu.idle_ir(bus, 1);
    let bc = cpu.regs.bc.as_u16();
    let value = cpu.port_in(bus, bc);
    let hl = cpu.regs.hl.as_u16();
    cpu.write(bus, hl, value);
    cpu.regs.wz.set(bc.wrapping_add(step));
    let b = cpu.regs.bc.hi().wrapping_sub(1);
    cpu.regs.bc.set_hi(b);

    let k = value as u16 + cpu.regs.bc.lo().wrapping_add(step as u8) as u16;
    block_io_flags(cpu, value, k);

    if rep && b != 0 {
        cpu.idle(bus, hl, 5);
        repeat(cpu);
    }
    cpu.regs.hl += step;
}

/// OUTI OUTD OTIR OTDR
fn outi(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let (step, rep) = block_mode(c);
    cpu.idle_ir(bus, 1);
    let hl = cpu.regs.hl.as_u16();
    let value = cpu.read(bus, hl);
    let b = cpu.regs.bc.hi().wrapping_sub(1);
    cpu.regs.bc.set_hi(b);
    let bc = cpu.regs.bc.as_u16();
    cpu.regs.wz.set(bc.wrapping_add(step));
    cpu.port_out(bus, bc, value);
    cpu.regs.hl += step;

    let k = value as u16 + cpu.regs.hl.lo() as u16;
    block_io_flags(cpu, value, k);

    if rep && b != 0 {
        cpu.idle_port(bus, bc, 5);
        repeat(cpu);
    }
}
