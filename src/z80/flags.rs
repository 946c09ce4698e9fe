//! Flag bits and the precomputed flag tables used by the ALU.
//!
//! Every table entry is a complete flag byte, undocumented bits 3 and 5 included,
//! so no operation ever leaves stale bits in F. The tables are built on first use
//! and shared read-only by every CPU instance.

use std::sync::LazyLock;

pub const FLAG_S  : u8 = 0b1000_0000;
pub const FLAG_Z  : u8 = 0b0100_0000;
pub const FLAG_Y  : u8 = 0b0010_0000;
pub const FLAG_H  : u8 = 0b0001_0000;
pub const FLAG_X  : u8 = 0b0000_1000;
pub const FLAG_PV : u8 = 0b0000_0100;
pub const FLAG_N  : u8 = 0b0000_0010;
pub const FLAG_C  : u8 = 0b0000_0001;

/// The undocumented F5/F3 pair.
pub const FLAGS_XY: u8 = FLAG_X | FLAG_Y;

#[inline]
pub fn flag8(f: u8, bit: u8) -> bool {
    (f & bit) != 0
}

#[inline]
pub fn set_flag8(f: u8, bit: u8, set: bool) -> u8 {
    if set {
        f | bit
    } else {
        f & !bit
    }
}

#[inline]
pub fn parity(b: u8) -> bool {
    (b.count_ones()) % 2 == 0
}

/// S, Z, F5, F3 of a result.
#[inline]
pub fn sz53(r: u8) -> u8 {
    let z = if r == 0 { FLAG_Z } else { 0 };
    (r & (FLAG_S | FLAGS_XY)) | z
}

/// S, Z, F5, F3 and parity of a result.
#[inline]
pub fn sz53p(r: u8) -> u8 {
    sz53(r) | if parity(r) { FLAG_PV } else { 0 }
}

pub struct AluTables {
    /// ADD/ADC, indexed by `carry << 16 | a << 8 | b`.
    add: Box<[u8]>,
    /// SUB/SBC/CP/NEG, indexed by `carry << 16 | a << 8 | b`.
    sub: Box<[u8]>,
    /// INC, indexed by the operand. C must be merged in by the caller.
    inc: [u8; 256],
    /// DEC, indexed by the operand. C must be merged in by the caller.
    dec: [u8; 256],
    /// AND/OR/XOR, indexed by the result. H is added by the caller for AND.
    logic: [u8; 256],
    rlc: [u8; 256],
    rrc: [u8; 256],
    /// Left shift with the given bit shifted in: RL, SLA (0) and SLL (1).
    rl: [[u8; 256]; 2],
    /// Right shift with the given bit shifted in at bit 7: RR and SRL (0).
    rr: [[u8; 256]; 2],
    sra: [u8; 256],
    /// DAA, indexed by `(H << 2 | N << 1 | C) << 8 | a`, giving `A << 8 | F`.
    daa: Box<[u16]>,
}

static TABLES: LazyLock<AluTables> = LazyLock::new(AluTables::build);

/// The process-wide flag tables.
#[inline]
pub fn tables() -> &'static AluTables {
    &TABLES
}

fn carry_index(a: u8, b: u8, carry: bool) -> usize {
    ((carry as usize) << 16) | ((a as usize) << 8) | b as usize
}

fn shift_flags(r: u8, c: bool) -> u8 {
    sz53p(r) | if c { FLAG_C } else { 0 }
}

impl AluTables {
    fn build() -> AluTables {
        let mut add = vec![0; 0x20000].into_boxed_slice();
        let mut sub = vec![0; 0x20000].into_boxed_slice();
        for c in 0..2u16 {
            for a in 0..=0xffu16 {
                for b in 0..=0xffu16 {
                    let idx = carry_index(a as u8, b as u8, c != 0);

                    let r = a + b + c;
                    let r8 = r as u8;
                    let mut f = sz53(r8);
                    f = set_flag8(f, FLAG_C, r > 0xff);
                    f = set_flag8(f, FLAG_H, (a & 0x0f) + (b & 0x0f) + c > 0x0f);
                    f = set_flag8(f, FLAG_PV, (a ^ !b) & (a ^ r) & 0x80 != 0);
                    add[idx] = f;

                    let r = a.wrapping_sub(b).wrapping_sub(c);
                    let r8 = r as u8;
                    let mut f = sz53(r8) | FLAG_N;
                    f = set_flag8(f, FLAG_C, b + c > a);
                    f = set_flag8(f, FLAG_H, (b & 0x0f) + c > (a & 0x0f));
                    f = set_flag8(f, FLAG_PV, (a ^ b) & (a ^ r) & 0x80 != 0);
                    sub[idx] = f;
                }
            }
        }

        let mut inc = [0; 256];
        let mut dec = [0; 256];
        let mut logic = [0; 256];
        let mut rlc = [0; 256];
        let mut rrc = [0; 256];
        let mut rl = [[0; 256]; 2];
        let mut rr = [[0; 256]; 2];
        let mut sra = [0; 256];
        for b in 0..=0xffu8 {
            let i = b as usize;

            let r = b.wrapping_add(1);
            let mut f = sz53(r);
            f = set_flag8(f, FLAG_H, (b & 0x0f) == 0x0f);
            f = set_flag8(f, FLAG_PV, b == 0x7f);
            inc[i] = f;

            let r = b.wrapping_sub(1);
            let mut f = sz53(r) | FLAG_N;
            f = set_flag8(f, FLAG_H, (b & 0x0f) == 0x00);
            f = set_flag8(f, FLAG_PV, b == 0x80);
            dec[i] = f;

            logic[i] = sz53p(b);

            rlc[i] = shift_flags(b.rotate_left(1), flag8(b, 0x80));
            rrc[i] = shift_flags(b.rotate_right(1), flag8(b, 0x01));
            for c in 0..2u8 {
                rl[c as usize][i] = shift_flags((b << 1) | c, flag8(b, 0x80));
                rr[c as usize][i] = shift_flags((b >> 1) | (c << 7), flag8(b, 0x01));
            }
            sra[i] = shift_flags((b >> 1) | (b & 0x80), flag8(b, 0x01));
        }

        let mut daa = vec![0; 0x800].into_boxed_slice();
        for hnc in 0..8usize {
            let h = hnc & 4 != 0;
            let n = hnc & 2 != 0;
            let c = hnc & 1 != 0;
            for a in 0..=0xffu8 {
                let lo = a & 0x0f;
                let mut diff = 0;
                let mut new_c = c;
                if c || a > 0x99 {
                    diff |= 0x60;
                    new_c = true;
                }
                if h || lo > 9 {
                    diff |= 0x06;
                }
                let (r, new_h) = if n {
                    (a.wrapping_sub(diff), h && lo < 6)
                } else {
                    (a.wrapping_add(diff), lo > 9)
                };
                let mut f = sz53p(r);
                f = set_flag8(f, FLAG_H, new_h);
                f = set_flag8(f, FLAG_N, n);
                f = set_flag8(f, FLAG_C, new_c);
                daa[(hnc << 8) | a as usize] = u16::from_le_bytes([f, r]);
            }
        }

        AluTables { add, sub, inc, dec, logic, rlc, rrc, rl, rr, sra, daa }
    }
    #[inline]
    pub fn add(&self, a: u8, b: u8, carry: bool) -> u8 {
        self.add[carry_index(a, b, carry)]
    }
    #[inline]
    pub fn sub(&self, a: u8, b: u8, carry: bool) -> u8 {
        self.sub[carry_index(a, b, carry)]
    }
    #[inline]
    pub fn inc(&self, b: u8) -> u8 {
        self.inc[b as usize]
    }
    #[inline]
    pub fn dec(&self, b: u8) -> u8 {
        self.dec[b as usize]
    }
    #[inline]
    pub fn logic(&self, r: u8) -> u8 {
        self.logic[r as usize]
    }
    #[inline]
    pub fn rlc(&self, b: u8) -> u8 {
        self.rlc[b as usize]
    }
    #[inline]
    pub fn rrc(&self, b: u8) -> u8 {
        self.rrc[b as usize]
    }
    #[inline]
    pub fn rl(&self, b: u8, carry: bool) -> u8 {
        self.rl[carry as usize][b as usize]
    }
    #[inline]
    pub fn rr(&self, b: u8, carry: bool) -> u8 {
        self.rr[carry as usize][b as usize]
    }
    #[inline]
    pub fn sra(&self, b: u8) -> u8 {
        self.sra[b as usize]
    }
    /// Returns the new AF for DAA applied on `a` with the current flags `f`.
    #[inline]
    pub fn daa(&self, a: u8, f: u8) -> u16 {
        let hnc = ((f & FLAG_H) >> 2) | (f & (FLAG_N | FLAG_C));
        self.daa[((hnc as usize) << 8) | a as usize]
    }
}
