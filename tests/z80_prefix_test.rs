use zx_z80::z80::{FLAG_C, FLAG_H, FLAG_PV, FLAG_S, FLAG_X, FLAG_Y, FLAG_Z};
use zx_z80::{Reg16, Reg8};
mod common;
use common::{run_instruction, run_steps, setup, Cycle};

// --- CB ---

#[test]
fn test_rlc_rrc_round_trip() {
    let (mut cpu, mut bus) = setup(&[0xcb, 0x00, 0xcb, 0x08]); // RLC B; RRC B
    cpu.set_reg8(Reg8::B, 0x80);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.reg8(Reg8::B), 0x01);
    assert_ne!(cpu.reg8(Reg8::F) & FLAG_C, 0, "C should be set");
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.reg8(Reg8::B), 0x80);
    assert_ne!(cpu.reg8(Reg8::F) & FLAG_C, 0, "C should be set");
    assert_eq!(cpu.reg8(Reg8::R), 4, "two prefixed instructions refresh twice each");
}

#[test]
fn test_sll() {
    let (mut cpu, mut bus) = setup(&[0xcb, 0x37]); // SLL A
    cpu.set_reg8(Reg8::A, 0x80);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.reg8(Reg8::A), 0x01);
    assert_ne!(cpu.reg8(Reg8::F) & FLAG_C, 0);
}

#[test]
fn test_rotate_memory() {
    let (mut cpu, mut bus) = setup(&[0xcb, 0x1e]); // RR (HL)
    bus.load(0x4000, &[0x01]);
    cpu.set_reg16(Reg16::HL, 0x4000);
    let t = run_instruction(&mut cpu, &mut bus);
    assert_eq!(t, 15);
    assert_eq!(bus.peek(0x4000), 0x00);
    assert_eq!(cpu.reg8(Reg8::F), FLAG_Z | FLAG_PV | FLAG_C);
}

#[test]
fn test_bit_register_flags() {
    let (mut cpu, mut bus) = setup(&[0xcb, 0x7f, 0xcb, 0x47]); // BIT 7,A; BIT 0,A
    cpu.set_reg8(Reg8::A, 0xa8);
    cpu.set_reg8(Reg8::F, FLAG_C);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.reg8(Reg8::F), FLAG_S | FLAG_H | FLAG_Y | FLAG_X | FLAG_C);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.reg8(Reg8::F), FLAG_Z | FLAG_PV | FLAG_H | FLAG_Y | FLAG_X | FLAG_C);
}

#[test]
fn test_bit_memory_uses_memptr() {
    // LD A,(2800h) leaves MEMPTR at 2801h; BIT 0,(HL) takes F5/F3 from its high byte
    let (mut cpu, mut bus) = setup(&[0x3a, 0x00, 0x28, 0xcb, 0x46]);
    cpu.set_reg16(Reg16::HL, 0x4000);
    bus.load(0x4000, &[0x00]);
    run_steps(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.reg8(Reg8::F) & (FLAG_Y | FLAG_X), FLAG_Y | FLAG_X);
    assert_ne!(cpu.reg8(Reg8::F) & FLAG_Z, 0);
}

#[test]
fn test_res_set() {
    let (mut cpu, mut bus) = setup(&[0xcb, 0xff, 0xcb, 0x86]); // SET 7,A; RES 0,(HL)
    cpu.set_reg16(Reg16::HL, 0x4000);
    bus.load(0x4000, &[0xff]);
    run_steps(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.reg8(Reg8::A), 0x80);
    assert_eq!(bus.peek(0x4000), 0xfe);
}

// --- DD / FD ---

#[test]
fn test_ld_ix_nn() {
    let (mut cpu, mut bus) = setup(&[0xdd, 0x21, 0x34, 0x12, 0xfd, 0x21, 0x78, 0x56]);
    run_steps(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.reg16(Reg16::IX), 0x1234);
    assert_eq!(cpu.reg16(Reg16::IY), 0x5678);
    assert_eq!(cpu.reg16(Reg16::HL), 0x0000);
}

#[test]
fn test_index_halves() {
    let (mut cpu, mut bus) = setup(&[0xdd, 0x26, 0x12, 0xdd, 0x2e, 0x34, 0xdd, 0x7c]); // LD IXh,12h; LD IXl,34h; LD A,IXh
    run_steps(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.reg16(Reg16::IX), 0x1234);
    assert_eq!(cpu.reg8(Reg8::A), 0x12);
    assert_eq!(cpu.reg16(Reg16::HL), 0x0000);
}

#[test]
fn test_ld_h_from_index_uses_real_h() {
    let (mut cpu, mut bus) = setup(&[0xdd, 0x66, 0x01]); // LD H,(IX+1)
    cpu.set_reg16(Reg16::IX, 0x4000);
    bus.load(0x4001, &[0x77]);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.reg8(Reg8::H), 0x77);
    assert_eq!(cpu.reg16(Reg16::IX), 0x4000);
    assert_eq!(cpu.reg16(Reg16::WZ), 0x4001);
}

#[test]
fn test_negative_displacement() {
    let (mut cpu, mut bus) = setup(&[0xfd, 0x7e, 0xff]); // LD A,(IY-1)
    cpu.set_reg16(Reg16::IY, 0x4000);
    bus.load(0x3fff, &[0x5a]);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.reg8(Reg8::A), 0x5a);
}

#[test]
fn test_ld_index_n() {
    let (mut cpu, mut bus) = setup(&[0xdd, 0x36, 0x02, 0x99]); // LD (IX+2),99h
    cpu.set_reg16(Reg16::IX, 0x5000);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(bus.peek(0x5002), 0x99);
    assert_eq!(cpu.pc(), 4);
}

#[test]
fn test_inc_index_memory() {
    let (mut cpu, mut bus) = setup(&[0xdd, 0x34, 0x05]); // INC (IX+5)
    cpu.set_reg16(Reg16::IX, 0x5000);
    bus.load(0x5005, &[0x7f]);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(bus.peek(0x5005), 0x80);
    assert_ne!(cpu.reg8(Reg8::F) & FLAG_PV, 0, "overflow");
}

#[test]
fn test_ex_de_hl_ignores_prefix() {
    let (mut cpu, mut bus) = setup(&[0xdd, 0xeb]);
    cpu.set_reg16(Reg16::DE, 0x0001);
    cpu.set_reg16(Reg16::HL, 0x0002);
    cpu.set_reg16(Reg16::IX, 0x0003);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.reg16(Reg16::DE), 0x0002);
    assert_eq!(cpu.reg16(Reg16::HL), 0x0001);
    assert_eq!(cpu.reg16(Reg16::IX), 0x0003);
}

#[test]
fn test_prefix_chain_last_wins() {
    let (mut cpu, mut bus) = setup(&[0xdd, 0xfd, 0x21, 0x34, 0x12]); // DD; LD IY,1234h
    let t = run_instruction(&mut cpu, &mut bus);
    assert_eq!(t, 18);
    assert_eq!(cpu.reg16(Reg16::IY), 0x1234);
    assert_eq!(cpu.reg16(Reg16::IX), 0x0000);
    assert_eq!(cpu.pc(), 5);
    assert_eq!(cpu.reg8(Reg8::R), 3);
}

#[test]
fn test_prefix_before_ed() {
    let (mut cpu, mut bus) = setup(&[0xdd, 0xed, 0x44]); // DD; NEG
    cpu.set_reg8(Reg8::A, 0x01);
    let t = run_instruction(&mut cpu, &mut bus);
    assert_eq!(t, 12);
    assert_eq!(cpu.reg8(Reg8::A), 0xff);
}

#[test]
fn test_index_alu() {
    let (mut cpu, mut bus) = setup(&[0xfd, 0x96, 0x00]); // SUB (IY+0)
    cpu.set_reg16(Reg16::IY, 0x6000);
    cpu.set_reg8(Reg8::A, 0x10);
    bus.load(0x6000, &[0x10]);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.reg8(Reg8::A), 0x00);
    assert_ne!(cpu.reg8(Reg8::F) & FLAG_Z, 0);
}

// --- DD CB / FD CB ---

#[test]
fn test_index_cb_copies_to_register() {
    let (mut cpu, mut bus) = setup(&[0xdd, 0xcb, 0x03, 0x00]); // RLC (IX+3),B
    cpu.set_reg16(Reg16::IX, 0x4000);
    bus.load(0x4003, &[0x81]);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(bus.peek(0x4003), 0x03);
    assert_eq!(cpu.reg8(Reg8::B), 0x03);
    assert_ne!(cpu.reg8(Reg8::F) & FLAG_C, 0);
}

#[test]
fn test_index_cb_set_with_copy() {
    let (mut cpu, mut bus) = setup(&[0xfd, 0xcb, 0xfe, 0xc4]); // SET 0,(IY-2),H
    cpu.set_reg16(Reg16::IY, 0x4002);
    cpu.set_reg16(Reg16::HL, 0xaaaa);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(bus.peek(0x4000), 0x01);
    assert_eq!(cpu.reg8(Reg8::H), 0x01);
    assert_eq!(cpu.reg8(Reg8::L), 0xaa);
}

#[test]
fn test_index_cb_bit_uses_address() {
    let (mut cpu, mut bus) = setup(&[0xdd, 0xcb, 0x05, 0x46]); // BIT 0,(IX+5)
    cpu.set_reg16(Reg16::IX, 0x2800);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.reg16(Reg16::WZ), 0x2805);
    assert_eq!(cpu.reg8(Reg8::F) & (FLAG_Y | FLAG_X), FLAG_Y | FLAG_X);
    assert_ne!(cpu.reg8(Reg8::F) & FLAG_Z, 0);
}

#[test]
fn test_index_cb_bus_cycles() {
    let (mut cpu, mut bus) = setup(&[0xdd, 0xcb, 0x01, 0x06]); // RLC (IX+1)
    cpu.set_reg16(Reg16::IX, 0x4000);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(
        bus.cycles,
        vec![
            Cycle::Fetch(0x0000),
            Cycle::Fetch(0x0001),
            Cycle::Read(0x0002),
            Cycle::Read(0x0003),
            Cycle::NoReqMem(0x0003),
            Cycle::NoReqMem(0x0003),
            Cycle::Read(0x4001),
            Cycle::NoReqMem(0x4001),
            Cycle::Write(0x4001, 0x00),
        ]
    );
    assert_eq!(cpu.reg8(Reg8::R), 2, "only the prefixes are M1 cycles");
}

#[test]
fn test_prefix_run_is_one_step_each() {
    let mut code = vec![0xdd; 1000];
    code.push(0x00);
    let (mut cpu, mut bus) = setup(&code);
    for i in 0..1000u16 {
        assert_eq!(cpu.step(&mut bus), 4);
        assert_eq!(cpu.pc(), i + 1);
        assert!(cpu.prefix_pending());
        assert_eq!(cpu.last_pc(), i);
    }
    assert_eq!(cpu.step(&mut bus), 4);
    assert!(!cpu.prefix_pending());
    assert_eq!(cpu.pc(), 1001);
    assert_eq!(cpu.tstates(), 4004);
}

#[test]
fn test_prefix_filled_memory_returns() {
    let mut bus = common::TestBus::new();
    bus.memory.fill(0xfd);
    let mut cpu = zx_z80::Z80::new();
    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(bus.count(|c| matches!(c, Cycle::Fetch(_))), 1);
}
