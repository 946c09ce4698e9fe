use std::fmt;
use std::io::{self, Read, Write};

use super::{InterruptMode, Z80};
use super::registers::{Index, Registers};

#[derive(Debug)]
pub enum StateError {
    /// A field out of range, such as an interrupt mode above 2.
    InvalidState(String),
    Io(io::Error),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidState(what) => write!(f, "invalid CPU state: {what}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::InvalidState(_) => None,
        }
    }
}

impl From<io::Error> for StateError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Everything needed to suspend and resume a CPU.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct Z80State {
    pub af: u16, pub af_: u16,
    pub bc: u16, pub bc_: u16,
    pub de: u16, pub de_: u16,
    pub hl: u16, pub hl_: u16,
    pub ix: u16,
    pub iy: u16,
    pub sp: u16,
    pub pc: u16,
    pub wz: u16,
    pub i: u8,
    pub r: u8,
    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,
    pub halted: bool,
    pub int_blocked: bool,
    /// Index register selected by a DD/FD prefix still waiting for its opcode.
    pub index: Index,
    pub tstates: u64,
}

const STATE_SIZE: usize = 2 * 13 + 3 + 4 + 1 + 8;

fn flag_byte(b: u8, what: &str) -> Result<bool, StateError> {
    match b {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(StateError::InvalidState(format!("{what} = {b}"))),
    }
}

impl Z80 {
    pub fn state(&self) -> Z80State {
        let r = &self.regs;
        Z80State {
            af: r.af.as_u16(), af_: r.af_.as_u16(),
            bc: r.bc.as_u16(), bc_: r.bc_.as_u16(),
            de: r.de.as_u16(), de_: r.de_.as_u16(),
            hl: r.hl.as_u16(), hl_: r.hl_.as_u16(),
            ix: r.ix.as_u16(),
            iy: r.iy.as_u16(),
            sp: r.sp.as_u16(),
            pc: r.pc.as_u16(),
            wz: r.wz.as_u16(),
            i: r.i,
            r: r.r,
            iff1: self.iff1,
            iff2: self.iff2,
            im: self.im as u8,
            halted: self.halted,
            int_blocked: self.int_blocked,
            index: self.index,
            tstates: self.t,
        }
    }
    /// Replaces the whole CPU state. On error nothing is changed.
    pub fn restore(&mut self, s: &Z80State) -> Result<(), StateError> {
        let im = InterruptMode::try_from(s.im)?;
        self.regs = Registers {
            af: s.af.into(), af_: s.af_.into(),
            bc: s.bc.into(), bc_: s.bc_.into(),
            de: s.de.into(), de_: s.de_.into(),
            hl: s.hl.into(), hl_: s.hl_.into(),
            ix: s.ix.into(),
            iy: s.iy.into(),
            pc: s.pc.into(),
            sp: s.sp.into(),
            wz: s.wz.into(),
            i: s.i,
            r: s.r,
        };
        self.iff1 = s.iff1;
        self.iff2 = s.iff2;
        self.im = im;
        self.halted = s.halted;
        self.int_blocked = s.int_blocked;
        self.index = s.index;
        self.t = s.tstates;
        Ok(())
    }
    pub fn save(&self, mut w: impl Write) -> io::Result<()> {
        let r = &self.regs;
        let mut data = Vec::with_capacity(STATE_SIZE);
        data.extend_from_slice(&[
            r.pc.lo(), r.pc.hi(),
            r.sp.lo(), r.sp.hi(),
            r.f(), r.a(),
            r.af_.lo(), r.af_.hi(),
            r.bc.lo(), r.bc.hi(),
            r.bc_.lo(), r.bc_.hi(),
            r.de.lo(), r.de.hi(),
            r.de_.lo(), r.de_.hi(),
            r.hl.lo(), r.hl.hi(),
            r.hl_.lo(), r.hl_.hi(),
            r.ix.lo(), r.ix.hi(),
            r.iy.lo(), r.iy.hi(),
            r.r, r.i,
            self.iff1 as u8,
            self.im as u8,
            self.halted as u8,
            self.iff2 as u8,
            self.int_blocked as u8,
            r.wz.lo(), r.wz.hi(),
            self.index as u8,
        ]);
        data.extend_from_slice(&self.t.to_le_bytes());
        w.write_all(&data)?;
        Ok(())
    }
    pub fn load(&mut self, mut r: impl Read) -> Result<(), StateError> {
        let mut data = [0; STATE_SIZE];
        r.read_exact(&mut data)?;
        let w = |i: usize| u16::from_le_bytes([data[i], data[i + 1]]);
        let mut t = [0; 8];
        t.copy_from_slice(&data[34..]);
        let index = match data[33] {
            0 => Index::HL,
            1 => Index::IX,
            2 => Index::IY,
            b => return Err(StateError::InvalidState(format!("index = {b}"))),
        };
        let s = Z80State {
            pc: w(0),
            sp: w(2),
            af: w(4), af_: w(6),
            bc: w(8), bc_: w(10),
            de: w(12), de_: w(14),
            hl: w(16), hl_: w(18),
            ix: w(20),
            iy: w(22),
            r: data[24],
            i: data[25],
            iff1: flag_byte(data[26], "IFF1")?,
            im: data[27],
            halted: flag_byte(data[28], "HALT")?,
            iff2: flag_byte(data[29], "IFF2")?,
            int_blocked: flag_byte(data[30], "EI")?,
            wz: w(31),
            index,
            tstates: u64::from_le_bytes(t),
        };
        self.restore(&s)
    }
}
