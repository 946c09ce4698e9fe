//! Cycle-accurate Z80 core.
//!
//! One call to [`Z80::step`] executes one instruction, or one DD/FD prefix, or
//! services one signal, charging every bus cycle to the T-state counter.

mod alu;
mod debug;
mod dumps;
mod flags;
mod ops_base;
mod ops_cb;
mod ops_ed;
mod ops_index;
mod ops_index_cb;
mod ops_next;
mod registers;
mod state;

pub use self::debug::{BranchEvent, BranchKind, StackEvent, StackOp};
pub use self::flags::{
    FLAG_C, FLAG_H, FLAG_N, FLAG_PV, FLAG_S, FLAG_X, FLAG_Y, FLAG_Z, AluTables, tables,
};
pub use self::registers::{Index, R16, Reg16, Reg8, Registers};
pub use self::state::{StateError, Z80State};

/// The host side of the CPU: memory, I/O ports and the signal acknowledge lines.
///
/// The CPU charges the T-states of every call itself: 4 for an opcode fetch, 3 for a
/// memory read or write, 4 for a port access and 1 for each no-request cycle.
/// A host that models wait states adds them with [`Z80::add_tstates`].
pub trait Bus {
    fn read_mem(&mut self, addr: u16) -> u8;
    fn write_mem(&mut self, addr: u16, value: u8);
    fn read_port(&mut self, port: u16) -> u8;
    fn write_port(&mut self, port: u16, value: u8);

    /// M1 opcode fetch.
    fn read_fetch(&mut self, addr: u16) -> u8 {
        self.read_mem(addr)
    }
    /// Internal cycle with `addr` on the address bus but no memory request.
    fn no_request_mem(&mut self, _addr: u16) {}
    /// Internal cycle of the block output instructions with the port on the bus.
    fn no_request_port(&mut self, _port: u16) {}
    fn ack_reset(&mut self) {}
    fn ack_nmi(&mut self) {}
    fn ack_int(&mut self) {}
    /// NEXTREG of the extended instruction set.
    fn write_next_reg(&mut self, _reg: u8, _value: u8) {}

    /// About to run the instruction at `pc`. `opcode` has the prefixes and the
    /// opcode byte, but not the operands yet.
    fn op_executing(&mut self, _pc: u16, _opcode: &[u8]) {}
    /// The instruction at `pc` is done. `opcode` has all its bytes and `next_pc` is
    /// where execution continues.
    fn op_executed(&mut self, _pc: u16, _opcode: &[u8], _next_pc: u16) {}
    fn branch(&mut self, _event: BranchEvent) {}
    fn stack(&mut self, _event: StackEvent) {}
}

/// Signal lines sampled before every instruction.
///
/// `reset` and `nmi` are latched requests, cleared by the CPU when serviced.
/// `int` is a level: it stays asserted until the host releases it.
#[derive(Default, Debug, Clone, Copy)]
pub struct Signals {
    pub reset: bool,
    pub nmi: bool,
    pub int: bool,
    /// Low byte of the IM2 vector address.
    pub data_bus: u8,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum SignalState {
    Idle,
    ResetPending,
    NmiPending,
    IntPending,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub enum InterruptMode {
    #[default]
    IM0,
    IM1,
    IM2,
}

impl TryFrom<u8> for InterruptMode {
    type Error = StateError;
    fn try_from(im: u8) -> Result<InterruptMode, StateError> {
        match im {
            0 => Ok(InterruptMode::IM0),
            1 => Ok(InterruptMode::IM1),
            2 => Ok(InterruptMode::IM2),
            _ => Err(StateError::InvalidState(format!("interrupt mode {}", im))),
        }
    }
}

/// An instruction handler. It gets the opcode byte to decode its operand fields.
pub(crate) type Op = fn(&mut Z80, &mut dyn Bus, u8);

pub struct Z80 {
    regs: Registers,
    iff1: bool,
    iff2: bool,
    im: InterruptMode,
    halted: bool,
    //set by EI: no maskable interrupt is accepted before the next instruction
    int_blocked: bool,
    index: Index,
    t: u64,
    last_pc: u16,
    int_entered: bool,
    //bytes of the instruction being executed
    op_bytes: [u8; 4],
    op_len: u8,
    extended: bool,
    pub signals: Signals,
}

impl Default for Z80 {
    fn default() -> Z80 {
        Z80::new()
    }
}

impl Z80 {
    pub fn new() -> Z80 {
        Z80 {
            regs: Registers::new(),
            iff1: false,
            iff2: false,
            im: InterruptMode::IM0,
            halted: false,
            int_blocked: false,
            index: Index::HL,
            t: 0,
            last_pc: 0,
            int_entered: false,
            op_bytes: [0; 4],
            op_len: 0,
            extended: false,
            signals: Signals::default(),
        }
    }
    #[allow(unused)]
    pub fn dump_regs(&self) {
        log::debug!("PC {:04x}; AF {:04x}; BC {:04x}; DE {:04x}; HL {:04x}; IX {:04x}; IY {:04x}; SP {:04x}; IR {:02x}{:02x}; WZ {:04x}",
                 self.regs.pc.as_u16(),
                 self.regs.af.as_u16(),
                 self.regs.bc.as_u16(), self.regs.de.as_u16(), self.regs.hl.as_u16(),
                 self.regs.ix.as_u16(), self.regs.iy.as_u16(), self.regs.sp.as_u16(),
                 self.regs.i, self.regs.r, self.regs.wz.as_u16());
    }

    pub fn regs(&self) -> &Registers {
        &self.regs
    }
    pub fn regs_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }
    pub fn reg8(&self, r: Reg8) -> u8 {
        self.regs.reg8(r)
    }
    pub fn set_reg8(&mut self, r: Reg8, b: u8) {
        self.regs.set_reg8(r, b);
    }
    pub fn reg16(&self, r: Reg16) -> u16 {
        self.regs.reg16(r)
    }
    pub fn set_reg16(&mut self, r: Reg16, w: u16) {
        self.regs.set_reg16(r, w);
    }
    pub fn pc(&self) -> u16 {
        self.regs.pc.as_u16()
    }
    pub fn set_pc(&mut self, pc: u16) {
        self.regs.pc.set(pc);
    }
    pub fn sp(&self) -> u16 {
        self.regs.sp.as_u16()
    }
    pub fn set_sp(&mut self, sp: u16) {
        self.regs.sp.set(sp);
    }
    pub fn iff1(&self) -> bool {
        self.iff1
    }
    pub fn iff2(&self) -> bool {
        self.iff2
    }
    pub fn set_iff1(&mut self, iff1: bool) {
        self.iff1 = iff1;
    }
    pub fn set_iff2(&mut self, iff2: bool) {
        self.iff2 = iff2;
    }
    pub fn im(&self) -> u8 {
        self.im as u8
    }
    pub fn set_im(&mut self, im: u8) -> Result<(), StateError> {
        self.im = InterruptMode::try_from(im)?;
        Ok(())
    }
    pub fn halted(&self) -> bool {
        self.halted
    }
    pub fn set_halted(&mut self, halted: bool) {
        self.halted = halted;
    }
    pub fn interrupt_blocked(&self) -> bool {
        self.int_blocked
    }
    pub fn set_interrupt_blocked(&mut self, blocked: bool) {
        self.int_blocked = blocked;
    }
    /// Absolute T-state counter.
    pub fn tstates(&self) -> u64 {
        self.t
    }
    pub fn set_tstates(&mut self, t: u64) {
        self.t = t;
    }
    /// Charges wait states inserted by the host, e.g. memory contention.
    pub fn add_tstates(&mut self, t: u32) {
        self.t += t as u64;
    }
    /// Address of the last instruction started by `step`.
    pub fn last_pc(&self) -> u16 {
        self.last_pc
    }
    /// Whether the last `step` serviced a maskable interrupt.
    pub fn int_entered(&self) -> bool {
        self.int_entered
    }
    /// A DD or FD prefix has been fetched and its opcode has not.
    pub fn prefix_pending(&self) -> bool {
        self.index != Index::HL
    }
    /// Whether the ED slots of the ZX Spectrum Next extended instructions are decoded.
    /// Off by default: those slots are NOPs, as on a plain Z80.
    pub fn extended_instructions(&self) -> bool {
        self.extended
    }
    pub fn set_extended_instructions(&mut self, extended: bool) {
        self.extended = extended;
    }

    /// Resolves the signal lines in priority order: RESET, NMI, INT.
    /// Only RESET is taken between a DD/FD prefix and its opcode.
    pub fn pending_signal(&self) -> SignalState {
        if self.signals.reset {
            SignalState::ResetPending
        } else if self.prefix_pending() {
            SignalState::Idle
        } else if self.signals.nmi {
            SignalState::NmiPending
        } else if self.signals.int && self.iff1 && !self.int_blocked {
            SignalState::IntPending
        } else {
            SignalState::Idle
        }
    }

    /// Executes one instruction, or services one signal. Returns the T-states used.
    pub fn step(&mut self, bus: &mut impl Bus) -> u32 {
        self.run(bus)
    }

    fn run(&mut self, bus: &mut dyn Bus) -> u32 {
        let t0 = self.t;
        self.int_entered = false;
        match self.pending_signal() {
            SignalState::ResetPending => self.do_reset(bus),
            SignalState::NmiPending => self.do_nmi(bus),
            SignalState::IntPending => self.do_int(bus),
            SignalState::Idle => self.exec(bus),
        }
        (self.t - t0) as u32
    }

    fn exec(&mut self, bus: &mut dyn Bus) {
        self.int_blocked = false;
        let pc = self.regs.pc.as_u16();
        if !self.prefix_pending() {
            self.last_pc = pc;
            self.op_len = 0;
        }
        let c = self.fetch_opcode(bus);
        if let 0xdd | 0xfd = c {
            if self.prefix_pending() {
                //the previous prefix was a NOP, this one starts the instruction
                self.last_pc = pc;
                self.op_bytes[0] = c;
                self.op_len = 1;
            }
            //a prefix is a step of its own, no interrupt until the opcode
            self.index = if c == 0xdd { Index::IX } else { Index::IY };
            self.int_blocked = true;
            return;
        }
        let (table, op): (&[Op; 256], u8) = match (c, self.index) {
            (0xcb, Index::HL) => (&ops_cb::CB, self.fetch_opcode(bus)),
            (0xcb, index) => {
                //DD CB d op: the displacement comes before the opcode, neither is an M1
                let pc = self.regs.pc.as_u16();
                let d = self.read(bus, pc);
                self.record(d);
                let addr = self.regs.hlx(index).as_u16().wrapping_add(d as i8 as u16);
                self.regs.wz.set(addr);
                let pc = pc.wrapping_add(1);
                let op = self.read(bus, pc);
                self.record(op);
                self.idle(bus, pc, 2);
                self.regs.pc.set(pc.wrapping_add(1));
                (&ops_index_cb::INDEX_CB, op)
            }
            (0xed, _) => {
                self.index = Index::HL;
                let op = self.fetch_opcode(bus);
                if self.extended {
                    (&ops_next::NEXT, op)
                } else {
                    (&ops_ed::ED, op)
                }
            }
            (_, Index::HL) => (&ops_base::BASE, c),
            (_, _) => (&ops_index::INDEX, c),
        };
        bus.op_executing(self.last_pc, self.opcode_bytes());
        table[op as usize](self, bus, op);
        self.index = Index::HL;
        bus.op_executed(self.last_pc, self.opcode_bytes(), self.regs.pc.as_u16());
    }

    fn record(&mut self, b: u8) {
        if let Some(slot) = self.op_bytes.get_mut(self.op_len as usize) {
            *slot = b;
            self.op_len += 1;
        }
    }
    fn opcode_bytes(&self) -> &[u8] {
        &self.op_bytes[..self.op_len as usize]
    }

    fn do_reset(&mut self, bus: &mut dyn Bus) {
        log::trace!("RESET at {:04x}", self.regs.pc.as_u16());
        bus.ack_reset();
        self.signals.reset = false;
        self.regs.pc.set(0);
        self.regs.i = 0;
        self.regs.r = 0;
        self.im = InterruptMode::IM0;
        self.iff1 = false;
        self.iff2 = false;
        self.halted = false;
        self.int_blocked = false;
        self.index = Index::HL;
        self.t += 3;
    }

    fn leave_halt(&mut self) {
        if self.halted {
            self.halted = false;
            self.regs.pc += 1;
        }
    }

    fn do_nmi(&mut self, bus: &mut dyn Bus) {
        log::trace!("NMI at {:04x}", self.regs.pc.as_u16());
        bus.ack_nmi();
        self.signals.nmi = false;
        self.leave_halt();
        //M1 of 5T: 4 acknowledge + 1 internal
        self.t += 4;
        self.regs.inc_r();
        let ir = self.regs.ir();
        self.idle(bus, ir, 1);
        self.iff2 = self.iff1;
        self.iff1 = false;
        let pc = self.regs.pc.as_u16();
        self.push_from(bus, pc, pc);
        self.regs.pc.set(0x0066);
        self.regs.wz.set(0x0066);
    }

    fn do_int(&mut self, bus: &mut dyn Bus) {
        log::trace!("INT IM{} at {:04x}", self.im as u8, self.regs.pc.as_u16());
        bus.ack_int();
        self.leave_halt();
        //M1 of 7T: interrupt acknowledge with two wait states
        self.t += 7;
        self.regs.inc_r();
        self.iff1 = false;
        self.iff2 = false;
        let pc = self.regs.pc.as_u16();
        self.push_from(bus, pc, pc);
        let dest = match self.im {
            InterruptMode::IM0 => {
                log::debug!("IM0 interrupt: assuming RST 38");
                0x0038
            }
            InterruptMode::IM1 => 0x0038,
            InterruptMode::IM2 => {
                let v = u16::from_le_bytes([self.signals.data_bus, self.regs.i]);
                self.read_u16(bus, v)
            }
        };
        self.regs.pc.set(dest);
        self.regs.wz.set(dest);
        self.int_entered = true;
    }

    #[inline]
    fn a(&self) -> u8 {
        self.regs.a()
    }
    #[inline]
    fn set_a(&mut self, a: u8) {
        self.regs.set_a(a);
    }
    #[inline]
    fn f(&self) -> u8 {
        self.regs.f()
    }
    #[inline]
    fn set_f(&mut self, f: u8) {
        self.regs.set_f(f);
    }

    /// Register operand of an opcode field, H/L following the active index.
    #[inline]
    fn reg(&self, code: u8) -> u8 {
        self.regs.reg8(Reg8::from_code(code, self.index))
    }
    #[inline]
    fn set_reg(&mut self, code: u8, b: u8) {
        self.regs.set_reg8(Reg8::from_code(code, self.index), b);
    }
    #[inline]
    fn hlx(&mut self) -> &mut R16 {
        self.regs.hlx(self.index)
    }

    /// Condition field of JP/JR/CALL/RET: NZ, Z, NC, C, PO, PE, P, M.
    fn condition(&self, cc: u8) -> bool {
        use self::flags::*;
        let f = self.f();
        match cc & 0x07 {
            0 => !flag8(f, FLAG_Z),
            1 => flag8(f, FLAG_Z),
            2 => !flag8(f, FLAG_C),
            3 => flag8(f, FLAG_C),
            4 => !flag8(f, FLAG_PV),
            5 => flag8(f, FLAG_PV),
            6 => !flag8(f, FLAG_S),
            _ => flag8(f, FLAG_S),
        }
    }

    fn fetch_opcode(&mut self, bus: &mut dyn Bus) -> u8 {
        let c = bus.read_fetch(self.regs.pc.as_u16());
        self.regs.pc += 1;
        self.regs.inc_r();
        self.t += 4;
        self.record(c);
        c
    }
    fn fetch(&mut self, bus: &mut dyn Bus) -> u8 {
        let pc = self.regs.pc.as_u16();
        let c = self.read(bus, pc);
        self.regs.pc += 1;
        self.record(c);
        c
    }
    fn fetch_u16(&mut self, bus: &mut dyn Bus) -> u16 {
        let l = self.fetch(bus);
        let h = self.fetch(bus);
        u16::from_le_bytes([l, h])
    }
    fn read(&mut self, bus: &mut dyn Bus, addr: u16) -> u8 {
        self.t += 3;
        bus.read_mem(addr)
    }
    fn write(&mut self, bus: &mut dyn Bus, addr: u16, value: u8) {
        self.t += 3;
        bus.write_mem(addr, value);
    }
    fn read_u16(&mut self, bus: &mut dyn Bus, addr: u16) -> u16 {
        let l = self.read(bus, addr);
        let h = self.read(bus, addr.wrapping_add(1));
        u16::from_le_bytes([l, h])
    }
    fn write_u16(&mut self, bus: &mut dyn Bus, addr: u16, w: u16) {
        let [l, h] = w.to_le_bytes();
        self.write(bus, addr, l);
        self.write(bus, addr.wrapping_add(1), h);
    }
    fn port_in(&mut self, bus: &mut dyn Bus, port: u16) -> u8 {
        self.t += 4;
        bus.read_port(port)
    }
    fn port_out(&mut self, bus: &mut dyn Bus, port: u16, value: u8) {
        self.t += 4;
        bus.write_port(port, value);
    }
    /// `n` internal cycles with `addr` on the bus.
    fn idle(&mut self, bus: &mut dyn Bus, addr: u16, n: u32) {
        for _ in 0..n {
            bus.no_request_mem(addr);
        }
        self.t += n as u64;
    }
    fn idle_port(&mut self, bus: &mut dyn Bus, port: u16, n: u32) {
        for _ in 0..n {
            bus.no_request_port(port);
        }
        self.t += n as u64;
    }
    fn idle_ir(&mut self, bus: &mut dyn Bus, n: u32) {
        let ir = self.regs.ir();
        self.idle(bus, ir, n);
    }
    fn push(&mut self, bus: &mut dyn Bus, x: u16) {
        let pc = self.last_pc;
        self.push_from(bus, pc, x);
    }
    fn push_from(&mut self, bus: &mut dyn Bus, pc: u16, x: u16) {
        let [l, h] = x.to_le_bytes();
        let old_sp = self.regs.sp.as_u16();
        self.regs.sp -= 1;
        let sp = self.regs.sp.as_u16();
        self.write(bus, sp, h);
        self.regs.sp -= 1;
        let sp = self.regs.sp.as_u16();
        self.write(bus, sp, l);
        self.stack_event(bus, pc, StackOp::Push(x), old_sp);
    }
    fn pop(&mut self, bus: &mut dyn Bus) -> u16 {
        let sp = self.regs.sp.as_u16();
        let x = self.read_u16(bus, sp);
        self.regs.sp += 2;
        let pc = self.last_pc;
        self.stack_event(bus, pc, StackOp::Pop(x), sp);
        x
    }
    fn stack_event(&mut self, bus: &mut dyn Bus, pc: u16, op: StackOp, old_sp: u16) {
        bus.stack(StackEvent {
            pc,
            op,
            old_sp,
            new_sp: self.regs.sp.as_u16(),
            tstates: self.t,
        });
    }
    /// Writes a 16-bit register, reporting it if it is SP.
    fn load_rr(&mut self, bus: &mut dyn Bus, r: Reg16, w: u16) {
        let old_sp = self.regs.sp.as_u16();
        self.regs.set_reg16(r, w);
        if r == Reg16::SP {
            let pc = self.last_pc;
            self.stack_event(bus, pc, StackOp::Load, old_sp);
        }
    }
    /// Jumps to `target` and reports the branch.
    fn branch(&mut self, bus: &mut dyn Bus, kind: BranchKind, target: u16) {
        self.regs.pc.set(target);
        bus.branch(BranchEvent {
            pc: self.last_pc,
            kind,
            target,
            tstates: self.t,
        });
    }
    /// Address of `(IX+d)`/`(IY+d)`: reads the displacement and spends the 5
    /// internal cycles of the address computation. Sets MEMPTR.
    fn index_addr(&mut self, bus: &mut dyn Bus) -> u16 {
        let pc = self.regs.pc.as_u16();
        let d = self.read(bus, pc);
        self.record(d);
        self.idle(bus, pc, 5);
        self.regs.pc += 1;
        let addr = self.hlx().as_u16().wrapping_add(d as i8 as u16);
        self.regs.wz.set(addr);
        addr
    }
}
