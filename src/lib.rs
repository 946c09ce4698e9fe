//! A cycle-accurate Z80 core for ZX Spectrum emulation.
//!
//! The host implements [`Bus`] and drives the CPU one instruction at a time with
//! [`Z80::step`], raising RESET, NMI and INT through [`Z80::signals`].

pub mod memory;
pub mod z80;

pub use memory::Memory;
pub use z80::{
    BranchEvent, BranchKind, Bus, Index, InterruptMode, Reg16, Reg8, SignalState, Signals,
    StackEvent, StackOp, StateError, Z80, Z80State,
};
