//! Unprefixed opcodes.
//!
//! The handlers that touch H, L or HL go through the active index register, so the
//! DD/FD table reuses them for the IXh/IXl/IX forms.

use super::registers::Reg16;
use super::{BranchKind, Bus, Op, Z80};

pub(super) static BASE: [Op; 256] = build();

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
        //CB, DD, ED and FD are decoded by the step loop and never reach the table
        0x00 | 0xcb | 0xdd | 0xed | 0xfd => nop,
        0x01 | 0x11 | 0x21 | 0x31 => ld_rr_nn,
        0x02 | 0x12 => ld_mrr_a,
        0x0a | 0x1a => ld_a_mrr,
        0x03 | 0x13 | 0x23 | 0x33 => inc_rr,
        0x0b | 0x1b | 0x2b | 0x3b => dec_rr,
        0x34 => inc_mhl,
        0x35 => dec_mhl,
        0x36 => ld_mhl_n,
        _ if c & 0xc7 == 0x04 => inc_r,
        _ if c & 0xc7 == 0x05 => dec_r,
        _ if c & 0xc7 == 0x06 => ld_r_n,
        0x07 | 0x0f | 0x17 | 0x1f => rotate_a,
        0x08 => ex_af,
        0x09 | 0x19 | 0x29 | 0x39 => add_hl_rr,
        0x10 => djnz,
        0x18 => jr,
        0x20 | 0x28 | 0x30 | 0x38 => jr_cc,
        0x22 => ld_mnn_hl,
        0x2a => ld_hl_mnn,
        0x27 => daa,
        0x2f => cpl,
        0x37 => scf,
        0x3f => ccf,
        0x32 => ld_mnn_a,
        0x3a => ld_a_mnn,
        0x76 => halt,
        0x40..=0x7f if c & 0x07 == 0x06 => ld_r_mhl,
        0x40..=0x7f if c & 0x38 == 0x30 => ld_mhl_r,
        0x40..=0x7f => ld_r_r,
        0x80..=0xbf if c & 0x07 == 0x06 => alu_mhl,
        0x80..=0xbf => alu_r,
        0xc9 => ret,
        0xc3 => jp,
        0xcd => call,
        0xd3 => out_n_a,
        0xdb => in_a_n,
        0xd9 => exx,
        0xe3 => ex_msp_hl,
        0xe9 => jp_hl,
        0xeb => ex_de_hl,
        0xf3 => di,
        0xfb => ei,
        0xf9 => ld_sp_hl,
        _ => match c & 0x07 {
            0 => ret_cc,
            1 => pop,
            2 => jp_cc,
            4 => call_cc,
            5 => push,
            6 => alu_n,
            _ => rst,
        },
    }
}

fn nop(_cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {}

fn ld_rr_nn(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let nn = cpu.fetch_u16(bus);
    cpu.load_rr(bus, Reg16::from_rr(c >> 4, cpu.index), nn);
}

fn ld_mrr_a(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let addr = cpu.regs.reg16(Reg16::from_rr(c >> 4, cpu.index));
    let a = cpu.a();
    cpu.write(bus, addr, a);
    cpu.regs.wz.set(u16::from_le_bytes([addr.wrapping_add(1) as u8, a]));
}

fn ld_a_mrr(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let addr = cpu.regs.reg16(Reg16::from_rr(c >> 4, cpu.index));
    let a = cpu.read(bus, addr);
    cpu.set_a(a);
    cpu.regs.wz.set(addr.wrapping_add(1));
}

fn inc_rr(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    cpu.idle_ir(bus, 2);
    let r = Reg16::from_rr(c >> 4, cpu.index);
    let w = cpu.regs.reg16(r).wrapping_add(1);
    cpu.load_rr(bus, r, w);
}

fn dec_rr(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    cpu.idle_ir(bus, 2);
    let r = Reg16::from_rr(c >> 4, cpu.index);
    let w = cpu.regs.reg16(r).wrapping_sub(1);
    cpu.load_rr(bus, r, w);
}

fn inc_r(cpu: &mut Z80, _bus: &mut dyn Bus, c: u8) {
    let r = c >> 3;
    let b = cpu.reg(r);
    let b = cpu.inc8(b);
    cpu.set_reg(r, b);
}

fn dec_r(cpu: &mut Z80, _bus: &mut dyn Bus, c: u8) {
    let r = c >> 3;
    let b = cpu.reg(r);
    let b = cpu.dec8(b);
    cpu.set_reg(r, b);
}

fn inc_mhl(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let hl = cpu.regs.hl.as_u16();
    let b = cpu.read(bus, hl);
    cpu.idle(bus, hl, 1);
    let b = cpu.inc8(b);
    cpu.write(bus, hl, b);
}

fn dec_mhl(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let hl = cpu.regs.hl.as_u16();
    let b = cpu.read(bus, hl);
    cpu.idle(bus, hl, 1);
    let b = cpu.dec8(b);
    cpu.write(bus, hl, b);
}

fn ld_r_n(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let n = cpu.fetch(bus);
    cpu.set_reg(c >> 3, n);
}

fn ld_mhl_n(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let n = cpu.fetch(bus);
    let hl = cpu.regs.hl.as_u16();
    cpu.write(bus, hl, n);
}

fn rotate_a(cpu: &mut Z80, _bus: &mut dyn Bus, c: u8) {
    cpu.rotate_a(c >> 3);
}

fn ex_af(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    cpu.regs.ex_af();
}

fn add_hl_rr(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    cpu.idle_ir(bus, 7);
    let a = cpu.hlx().as_u16();
    let b = cpu.regs.reg16(Reg16::from_rr(c >> 4, cpu.index));
    let r = cpu.add16(a, b);
    cpu.regs.wz.set(a.wrapping_add(1));
    cpu.hlx().set(r);
}

/// Reads the displacement of a relative jump and, if taken, spends the 5
/// internal cycles and jumps.
fn jump_relative(cpu: &mut Z80, bus: &mut dyn Bus, taken: bool) {
    let pc = cpu.regs.pc.as_u16();
    let d = cpu.read(bus, pc);
    cpu.regs.pc += 1;
    if taken {
        cpu.idle(bus, pc, 5);
        let dest = pc.wrapping_add(1).wrapping_add(d as i8 as u16);
        cpu.regs.wz.set(dest);
        cpu.branch(bus, BranchKind::Relative, dest);
    }
}

fn djnz(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    cpu.idle_ir(bus, 1);
    let b = cpu.regs.bc.hi().wrapping_sub(1);
    cpu.regs.bc.set_hi(b);
    jump_relative(cpu, bus, b != 0);
}

fn jr(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    jump_relative(cpu, bus, true);
}

fn jr_cc(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let taken = cpu.condition((c >> 3) & 0x03);
    jump_relative(cpu, bus, taken);
}

fn ld_mnn_hl(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let addr = cpu.fetch_u16(bus);
    let hl = cpu.hlx().as_u16();
    cpu.write_u16(bus, addr, hl);
    cpu.regs.wz.set(addr.wrapping_add(1));
}

fn ld_hl_mnn(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let addr = cpu.fetch_u16(bus);
    let w = cpu.read_u16(bus, addr);
    cpu.hlx().set(w);
    cpu.regs.wz.set(addr.wrapping_add(1));
}

fn daa(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    cpu.daa();
}

fn cpl(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    cpu.cpl();
}

fn scf(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    cpu.scf();
}

fn ccf(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    cpu.ccf();
}

fn ld_mnn_a(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let addr = cpu.fetch_u16(bus);
    let a = cpu.a();
    cpu.write(bus, addr, a);
    cpu.regs.wz.set(u16::from_le_bytes([addr.wrapping_add(1) as u8, a]));
}

fn ld_a_mnn(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let addr = cpu.fetch_u16(bus);
    let a = cpu.read(bus, addr);
    cpu.set_a(a);
    cpu.regs.wz.set(addr.wrapping_add(1));
}

fn halt(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    if !cpu.halted && !cpu.iff1 {
        log::warn!("HALT with interrupts disabled at {:04x}", cpu.last_pc);
    }
    cpu.halted = true;
    //PC stays on the HALT, so it is fetched again until an interrupt
    cpu.regs.pc -= 1;
}

fn ld_r_r(cpu: &mut Z80, _bus: &mut dyn Bus, c: u8) {
    let b = cpu.reg(c);
    cpu.set_reg(c >> 3, b);
}

fn ld_r_mhl(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let hl = cpu.regs.hl.as_u16();
    let b = cpu.read(bus, hl);
    cpu.set_reg(c >> 3, b);
}

fn ld_mhl_r(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let hl = cpu.regs.hl.as_u16();
    let b = cpu.reg(c);
    cpu.write(bus, hl, b);
}

fn alu_r(cpu: &mut Z80, _bus: &mut dyn Bus, c: u8) {
    let b = cpu.reg(c);
    cpu.alu(c >> 3, b);
}

fn alu_mhl(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let hl = cpu.regs.hl.as_u16();
    let b = cpu.read(bus, hl);
    cpu.alu(c >> 3, b);
}

fn alu_n(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let n = cpu.fetch(bus);
    cpu.alu(c >> 3, n);
}

fn ret(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let pc = cpu.pop(bus);
    cpu.regs.wz.set(pc);
    cpu.branch(bus, BranchKind::Return, pc);
}

fn ret_cc(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    cpu.idle_ir(bus, 1);
    if cpu.condition(c >> 3) {
        ret(cpu, bus, c);
    }
}

fn pop(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let w = cpu.pop(bus);
    cpu.regs.set_reg16(Reg16::from_qq(c >> 4, cpu.index), w);
}

fn push(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    cpu.idle_ir(bus, 1);
    let w = cpu.regs.reg16(Reg16::from_qq(c >> 4, cpu.index));
    cpu.push(bus, w);
}

fn jp(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let nn = cpu.fetch_u16(bus);
    cpu.regs.wz.set(nn);
    cpu.branch(bus, BranchKind::Jump, nn);
}

fn jp_cc(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let nn = cpu.fetch_u16(bus);
    cpu.regs.wz.set(nn);
    if cpu.condition(c >> 3) {
        cpu.branch(bus, BranchKind::Jump, nn);
    }
}

fn jp_hl(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let dest = cpu.hlx().as_u16();
    cpu.branch(bus, BranchKind::Jump, dest);
}

fn call_to(cpu: &mut Z80, bus: &mut dyn Bus, nn: u16) {
    //one extra cycle on the high byte of the operand
    let pc = cpu.regs.pc.as_u16();
    cpu.idle(bus, pc.wrapping_sub(1), 1);
    cpu.push(bus, pc);
    cpu.branch(bus, BranchKind::Call, nn);
}

fn call(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let nn = cpu.fetch_u16(bus);
    cpu.regs.wz.set(nn);
    call_to(cpu, bus, nn);
}

fn call_cc(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    let nn = cpu.fetch_u16(bus);
    cpu.regs.wz.set(nn);
    if cpu.condition(c >> 3) {
        call_to(cpu, bus, nn);
    }
}

fn rst(cpu: &mut Z80, bus: &mut dyn Bus, c: u8) {
    cpu.idle_ir(bus, 1);
    let pc = cpu.regs.pc.as_u16();
    cpu.push(bus, pc);
    let dest = (c & 0x38) as u16;
    cpu.regs.wz.set(dest);
    cpu.branch(bus, BranchKind::Restart, dest);
}

fn out_n_a(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let n = cpu.fetch(bus);
    let a = cpu.a();
    let port = u16::from_le_bytes([n, a]);
    cpu.port_out(bus, port, a);
    cpu.regs.wz.set(u16::from_le_bytes([n.wrapping_add(1), a]));
}

fn in_a_n(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let n = cpu.fetch(bus);
    let port = u16::from_le_bytes([n, cpu.a()]);
    let a = cpu.port_in(bus, port);
    cpu.set_a(a);
    cpu.regs.wz.set(port.wrapping_add(1));
}

fn exx(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    cpu.regs.exx();
}

fn ex_msp_hl(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    let sp = cpu.regs.sp.as_u16();
    let sp1 = sp.wrapping_add(1);
    let w = cpu.read_u16(bus, sp);
    cpu.idle(bus, sp1, 1);
    let hl = cpu.hlx().as_u16();
    let [l, h] = hl.to_le_bytes();
    cpu.write(bus, sp1, h);
    cpu.write(bus, sp, l);
    cpu.idle(bus, sp, 2);
    cpu.hlx().set(w);
    cpu.regs.wz.set(w);
}

fn ex_de_hl(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    std::mem::swap(&mut cpu.regs.de, &mut cpu.regs.hl);
}

fn di(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    cpu.iff1 = false;
    cpu.iff2 = false;
}

fn ei(cpu: &mut Z80, _bus: &mut dyn Bus, _c: u8) {
    cpu.iff1 = true;
    cpu.iff2 = true;
    cpu.int_blocked = true;
}

fn ld_sp_hl(cpu: &mut Z80, bus: &mut dyn Bus, _c: u8) {
    cpu.idle_ir(bus, 2);
    let w = cpu.hlx().as_u16();
    cpu.load_rr(bus, Reg16::SP, w);
}

