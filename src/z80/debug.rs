//! Events reported to [`Bus`](super::Bus) for debuggers and tracers.
//!
//! A host that does not care about them keeps the default no-op methods.

/// How control was transferred.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum BranchKind {
    /// JP, JP cc, JP (HL)
    Jump,
    /// JR, JR cc, DJNZ
    Relative,
    /// CALL, CALL cc
    Call,
    /// RET, RET cc, RETN, RETI
    Return,
    /// RST p
    Restart,
}

/// A taken branch.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct BranchEvent {
    /// Address of the branching instruction, prefixes included.
    pub pc: u16,
    pub kind: BranchKind,
    pub target: u16,
    pub tstates: u64,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum StackOp {
    /// SP written directly: LD SP, INC SP, DEC SP, POPX.
    Load,
    /// A word pushed by PUSH, CALL, RST or an interrupt acknowledge.
    Push(u16),
    /// A word popped by POP or a return.
    Pop(u16),
}

/// A change of the stack pointer.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct StackEvent {
    /// Address of the instruction. For an interrupt it is the return address.
    pub pc: u16,
    pub op: StackOp,
    pub old_sp: u16,
    pub new_sp: u16,
    pub tstates: u64,
}
