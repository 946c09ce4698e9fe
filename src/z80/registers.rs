use std::ops::{AddAssign, SubAssign};

/// A 16-bit register pair. The word is the only storage; the 8-bit halves are
/// derived from it.
#[derive(Default, Copy, Clone, PartialEq, Eq, Debug)]
pub struct R16 {
    w: u16,
}

impl R16 {
    #[inline]
    pub fn as_u16(self) -> u16 {
        self.w
    }
    #[inline]
    pub fn set(&mut self, w: u16) {
        self.w = w;
    }
    #[inline]
    pub fn lo(self) -> u8 {
        self.w.to_le_bytes()[0]
    }
    #[inline]
    pub fn hi(self) -> u8 {
        self.w.to_le_bytes()[1]
    }
    #[inline]
    pub fn set_lo(&mut self, b: u8) {
        let mut bs = self.w.to_le_bytes();
        bs[0] = b;
        self.w = u16::from_le_bytes(bs);
    }
    #[inline]
    pub fn set_hi(&mut self, b: u8) {
        let mut bs = self.w.to_le_bytes();
        bs[1] = b;
        self.w = u16::from_le_bytes(bs);
    }
}

impl From<R16> for u16 {
    #[inline]
    fn from(r: R16) -> Self {
        r.as_u16()
    }
}

impl From<u16> for R16 {
    #[inline]
    fn from(w: u16) -> Self {
        R16 { w }
    }
}

impl AddAssign<u16> for R16 {
    #[inline]
    fn add_assign(&mut self, r: u16) {
        self.w = self.w.wrapping_add(r);
    }
}

impl SubAssign<u16> for R16 {
    #[inline]
    fn sub_assign(&mut self, r: u16) {
        self.w = self.w.wrapping_sub(r);
    }
}

/// Which register stands in for HL: plain HL, or IX/IY after a DD/FD prefix.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub enum Index {
    #[default]
    HL,
    IX,
    IY,
}

/// 8-bit register selector.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Reg8 {
    A, F, B, C, D, E, H, L,
    IXH, IXL, IYH, IYL,
    I, R,
}

impl Reg8 {
    /// Decodes the 3-bit register field of an opcode. `6` is the memory operand and
    /// has no register; callers handle it before getting here. H and L are
    /// redirected to the halves of the active index register.
    #[inline]
    pub(crate) fn from_code(code: u8, index: Index) -> Reg8 {
        match (code & 0x07, index) {
            (0, _) => Reg8::B,
            (1, _) => Reg8::C,
            (2, _) => Reg8::D,
            (3, _) => Reg8::E,
            (4, Index::HL) => Reg8::H,
            (4, Index::IX) => Reg8::IXH,
            (4, Index::IY) => Reg8::IYH,
            (5, Index::HL) => Reg8::L,
            (5, Index::IX) => Reg8::IXL,
            (5, Index::IY) => Reg8::IYL,
            (7, _) => Reg8::A,
            (r, _) => unreachable!("no register for code {}", r),
        }
    }
}

/// 16-bit register selector.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Reg16 {
    AF, BC, DE, HL, SP, PC, IX, IY, IR, WZ,
    AF_, BC_, DE_, HL_,
}

impl Reg16 {
    /// Decodes the `rr` field (bits 4-5) for the BC/DE/HL/SP group, HL being
    /// replaced by the active index register.
    #[inline]
    pub fn from_rr(code: u8, index: Index) -> Reg16 {
        match (code & 0x03, index) {
            (0, _) => Reg16::BC,
            (1, _) => Reg16::DE,
            (2, Index::HL) => Reg16::HL,
            (2, Index::IX) => Reg16::IX,
            (2, Index::IY) => Reg16::IY,
            _ => Reg16::SP,
        }
    }
    /// Same as `from_rr` but for the PUSH/POP group, where SP is replaced by AF.
    #[inline]
    pub fn from_qq(code: u8, index: Index) -> Reg16 {
        match Reg16::from_rr(code, index) {
            Reg16::SP => Reg16::AF,
            r => r,
        }
    }
}

/// The architectural register file plus the MEMPTR latch.
#[derive(Default, Clone, Debug)]
pub struct Registers {
    pub af: R16, pub af_: R16,
    pub bc: R16, pub bc_: R16,
    pub de: R16, pub de_: R16,
    pub hl: R16, pub hl_: R16,
    pub ix: R16,
    pub iy: R16,
    pub pc: R16,
    pub sp: R16,
    pub wz: R16,
    pub i: u8,
    pub r: u8,
}

impl Registers {
    pub fn new() -> Registers {
        Registers::default()
    }
    #[inline]
    pub fn a(&self) -> u8 {
        self.af.hi()
    }
    #[inline]
    pub fn set_a(&mut self, a: u8) {
        self.af.set_hi(a);
    }
    #[inline]
    pub fn f(&self) -> u8 {
        self.af.lo()
    }
    #[inline]
    pub fn set_f(&mut self, f: u8) {
        self.af.set_lo(f);
    }
    #[inline]
    pub fn ir(&self) -> u16 {
        u16::from_le_bytes([self.r, self.i])
    }
    /// Memory refresh: only the low 7 bits of R count.
    #[inline]
    pub fn inc_r(&mut self) {
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7f);
    }
    #[inline]
    pub fn hlx(&mut self, index: Index) -> &mut R16 {
        match index {
            Index::HL => &mut self.hl,
            Index::IX => &mut self.ix,
            Index::IY => &mut self.iy,
        }
    }
    pub fn reg8(&self, r: Reg8) -> u8 {
        match r {
            Reg8::A => self.af.hi(),
            Reg8::F => self.af.lo(),
            Reg8::B => self.bc.hi(),
            Reg8::C => self.bc.lo(),
            Reg8::D => self.de.hi(),
            Reg8::E => self.de.lo(),
            Reg8::H => self.hl.hi(),
            Reg8::L => self.hl.lo(),
            Reg8::IXH => self.ix.hi(),
            Reg8::IXL => self.ix.lo(),
            Reg8::IYH => self.iy.hi(),
            Reg8::IYL => self.iy.lo(),
            Reg8::I => self.i,
            Reg8::R => self.r,
        }
    }
    pub fn set_reg8(&mut self, r: Reg8, b: u8) {
        match r {
            Reg8::A => self.af.set_hi(b),
            Reg8::F => self.af.set_lo(b),
            Reg8::B => self.bc.set_hi(b),
            Reg8::C => self.bc.set_lo(b),
            Reg8::D => self.de.set_hi(b),
            Reg8::E => self.de.set_lo(b),
            Reg8::H => self.hl.set_hi(b),
            Reg8::L => self.hl.set_lo(b),
            Reg8::IXH => self.ix.set_hi(b),
            Reg8::IXL => self.ix.set_lo(b),
            Reg8::IYH => self.iy.set_hi(b),
            Reg8::IYL => self.iy.set_lo(b),
            Reg8::I => self.i = b,
            Reg8::R => self.r = b,
        }
    }
    fn pair(&mut self, r: Reg16) -> &mut R16 {
        match r {
            Reg16::AF => &mut self.af,
            Reg16::BC => &mut self.bc,
            Reg16::DE => &mut self.de,
            Reg16::HL => &mut self.hl,
            Reg16::SP => &mut self.sp,
            Reg16::PC => &mut self.pc,
            Reg16::IX => &mut self.ix,
            Reg16::IY => &mut self.iy,
            Reg16::WZ => &mut self.wz,
            Reg16::AF_ => &mut self.af_,
            Reg16::BC_ => &mut self.bc_,
            Reg16::DE_ => &mut self.de_,
            Reg16::HL_ => &mut self.hl_,
            Reg16::IR => unreachable!("IR is not a stored pair"),
        }
    }
    pub fn reg16(&self, r: Reg16) -> u16 {
        match r {
            Reg16::AF => self.af.as_u16(),
            Reg16::BC => self.bc.as_u16(),
            Reg16::DE => self.de.as_u16(),
            Reg16::HL => self.hl.as_u16(),
            Reg16::SP => self.sp.as_u16(),
            Reg16::PC => self.pc.as_u16(),
            Reg16::IX => self.ix.as_u16(),
            Reg16::IY => self.iy.as_u16(),
            Reg16::IR => self.ir(),
            Reg16::WZ => self.wz.as_u16(),
            Reg16::AF_ => self.af_.as_u16(),
            Reg16::BC_ => self.bc_.as_u16(),
            Reg16::DE_ => self.de_.as_u16(),
            Reg16::HL_ => self.hl_.as_u16(),
        }
    }
    pub fn set_reg16(&mut self, r: Reg16, w: u16) {
        if r == Reg16::IR {
            let [lo, hi] = w.to_le_bytes();
            self.r = lo;
            self.i = hi;
        } else {
            self.pair(r).set(w);
        }
    }
    /// EX AF,AF'
    pub fn ex_af(&mut self) {
        std::mem::swap(&mut self.af, &mut self.af_);
    }
    /// EXX
    pub fn exx(&mut self) {
        std::mem::swap(&mut self.bc, &mut self.bc_);
        std::mem::swap(&mut self.de, &mut self.de_);
        std::mem::swap(&mut self.hl, &mut self.hl_);
    }
}
