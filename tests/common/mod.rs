#![allow(dead_code)]

use zx_z80::{BranchEvent, Bus, StackEvent, Z80};

/// Everything the CPU asked of the bus, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    Fetch(u16),
    Read(u16),
    Write(u16, u8),
    In(u16),
    Out(u16, u8),
    NoReqMem(u16),
    NoReqPort(u16),
    AckReset,
    AckNmi,
    AckInt,
}

/// Debugger notifications, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Executing(u16, Vec<u8>),
    Executed(u16, Vec<u8>, u16),
    Branch(BranchEvent),
    Stack(StackEvent),
    NextReg(u8, u8),
}

/// Flat 64KB memory that records every bus cycle. Port reads return `port_value`.
pub struct TestBus {
    pub memory: Vec<u8>,
    pub cycles: Vec<Cycle>,
    pub events: Vec<Event>,
    pub port_value: u8,
}

impl TestBus {
    pub fn new() -> Self {
        Self {
            memory: vec![0; 0x10000],
            cycles: Vec::new(),
            events: Vec::new(),
            port_value: 0xff,
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    pub fn peek(&self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    pub fn writes(&self) -> Vec<(u16, u8)> {
        self.cycles
            .iter()
            .filter_map(|c| match *c {
                Cycle::Write(a, v) => Some((a, v)),
                _ => None,
            })
            .collect()
    }

    pub fn outs(&self) -> Vec<(u16, u8)> {
        self.cycles
            .iter()
            .filter_map(|c| match *c {
                Cycle::Out(p, v) => Some((p, v)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Cycle) -> bool) -> usize {
        self.cycles.iter().filter(|c| pred(c)).count()
    }

    pub fn branches(&self) -> Vec<BranchEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Branch(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    pub fn stack_events(&self) -> Vec<StackEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Stack(s) => Some(*s),
                _ => None,
            })
            .collect()
    }
}

impl Bus for TestBus {
    fn read_fetch(&mut self, addr: u16) -> u8 {
        self.cycles.push(Cycle::Fetch(addr));
        self.memory[addr as usize]
    }
    fn read_mem(&mut self, addr: u16) -> u8 {
        self.cycles.push(Cycle::Read(addr));
        self.memory[addr as usize]
    }
    fn write_mem(&mut self, addr: u16, value: u8) {
        self.cycles.push(Cycle::Write(addr, value));
        self.memory[addr as usize] = value;
    }
    fn read_port(&mut self, port: u16) -> u8 {
        self.cycles.push(Cycle::In(port));
        self.port_value
    }
    fn write_port(&mut self, port: u16, value: u8) {
        self.cycles.push(Cycle::Out(port, value));
    }
    fn no_request_mem(&mut self, addr: u16) {
        self.cycles.push(Cycle::NoReqMem(addr));
    }
    fn no_request_port(&mut self, port: u16) {
        self.cycles.push(Cycle::NoReqPort(port));
    }
    fn ack_reset(&mut self) {
        self.cycles.push(Cycle::AckReset);
    }
    fn ack_nmi(&mut self) {
        self.cycles.push(Cycle::AckNmi);
    }
    fn ack_int(&mut self) {
        self.cycles.push(Cycle::AckInt);
    }
    fn write_next_reg(&mut self, reg: u8, value: u8) {
        self.events.push(Event::NextReg(reg, value));
    }
    fn op_executing(&mut self, pc: u16, opcode: &[u8]) {
        self.events.push(Event::Executing(pc, opcode.to_vec()));
    }
    fn op_executed(&mut self, pc: u16, opcode: &[u8], next_pc: u16) {
        self.events.push(Event::Executed(pc, opcode.to_vec(), next_pc));
    }
    fn branch(&mut self, event: BranchEvent) {
        self.events.push(Event::Branch(event));
    }
    fn stack(&mut self, event: StackEvent) {
        self.events.push(Event::Stack(event));
    }
}

/// A fresh CPU with `code` at address 0.
pub fn setup(code: &[u8]) -> (Z80, TestBus) {
    let mut bus = TestBus::new();
    bus.load(0, code);
    (Z80::new(), bus)
}

/// Runs one step and checks its T-states against the counter.
pub fn run_step(cpu: &mut Z80, bus: &mut TestBus) -> u32 {
    let t0 = cpu.tstates();
    let t = cpu.step(bus);
    assert_eq!(cpu.tstates() - t0, t as u64, "step result must match the T-state counter");
    t
}

/// Runs one whole instruction: steps until no DD/FD prefix is left pending.
pub fn run_instruction(cpu: &mut Z80, bus: &mut TestBus) -> u32 {
    let mut t = run_step(cpu, bus);
    while cpu.prefix_pending() {
        t += run_step(cpu, bus);
    }
    t
}

pub fn run_steps(cpu: &mut Z80, bus: &mut TestBus, n: usize) -> u32 {
    (0..n).map(|_| run_instruction(cpu, bus)).sum()
}
