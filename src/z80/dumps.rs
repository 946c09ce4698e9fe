//! Flag table dumps, one line per input, for diffing against a real Z80 trace.

#![cfg(feature = "dump_ops")]

use super::Z80;

impl Z80 {
    fn dump_binary(&mut self, use_carry: bool, op: fn(&mut Z80, u8)) {
        for a in 0..=0xff {
            for r in 0..=0xff {
                for c in 0..=use_carry as u8 {
                    self.set_a(a);
                    self.set_f(c);
                    op(self, r);
                    println!("{:02x} {:02x} {:02x} {:02x} {:02x}", a, c, r, self.a(), self.f());
                }
            }
        }
    }
    pub fn dump_add(&mut self) {
        self.dump_binary(false, |z, r| z.add_a(r, false));
    }
    pub fn dump_adc(&mut self) {
        self.dump_binary(true, |z, r| z.add_a(r, true));
    }
    pub fn dump_sub(&mut self) {
        self.dump_binary(false, |z, r| z.sub_a(r, false));
    }
    pub fn dump_sbc(&mut self) {
        self.dump_binary(true, |z, r| z.sub_a(r, true));
    }
    pub fn dump_cp(&mut self) {
        self.dump_binary(false, |z, r| z.cp_a(r));
    }
    pub fn dump_daa(&mut self) {
        for f in 0..=0xff {
            for a in 0..=0xff {
                self.set_a(a);
                self.set_f(f);
                self.daa();
                println!("{:02x} {:02x} {:02x} {:02x}", a, f, self.a(), self.f());
            }
        }
    }
    /// `op` is the CB group: 0 RLC to 7 SRL.
    pub fn dump_shift(&mut self, op: u8) {
        for c in 0..2 {
            for b in 0..=0xff {
                self.set_f(c);
                let r = self.shift(op, b);
                println!("{:02x} {:02x} {:02x} {:02x}", b, c, r, self.f());
            }
        }
    }
}
