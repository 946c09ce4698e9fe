use super::Z80;
use super::flags::*;

impl Z80 {
    fn carry(&self) -> bool {
        flag8(self.f(), FLAG_C)
    }

    pub(super) fn add_a(&mut self, b: u8, with_carry: bool) {
        let a = self.a();
        let c = with_carry && self.carry();
        self.set_f(tables().add(a, b, c));
        self.set_a(a.wrapping_add(b).wrapping_add(c as u8));
    }
    pub(super) fn sub_a(&mut self, b: u8, with_carry: bool) {
        let a = self.a();
        let c = with_carry && self.carry();
        self.set_f(tables().sub(a, b, c));
        self.set_a(a.wrapping_sub(b).wrapping_sub(c as u8));
    }
    /// CP: the flags of SUB, but F5/F3 come from the operand.
    pub(super) fn cp_a(&mut self, b: u8) {
        let a = self.a();
        let f = tables().sub(a, b, false);
        self.set_f((f & !FLAGS_XY) | (b & FLAGS_XY));
    }
    pub(super) fn and_a(&mut self, b: u8) {
        let r = self.a() & b;
        self.set_a(r);
        self.set_f(tables().logic(r) | FLAG_H);
    }
    pub(super) fn xor_a(&mut self, b: u8) {
        let r = self.a() ^ b;
        self.set_a(r);
        self.set_f(tables().logic(r));
    }
    pub(super) fn or_a(&mut self, b: u8) {
        let r = self.a() | b;
        self.set_a(r);
        self.set_f(tables().logic(r));
    }
    /// The 8 accumulator operations in opcode order: ADD ADC SUB SBC AND XOR OR CP.
    pub(super) fn alu(&mut self, op: u8, b: u8) {
        match op & 0x07 {
            0 => self.add_a(b, false),
            1 => self.add_a(b, true),
            2 => self.sub_a(b, false),
            3 => self.sub_a(b, true),
            4 => self.and_a(b),
            5 => self.xor_a(b),
            6 => self.or_a(b),
            _ => self.cp_a(b),
        }
    }
    pub(super) fn neg(&mut self) {
        let a = self.a();
        self.set_a(0);
        self.sub_a(a, false);
    }

    pub(super) fn inc8(&mut self, b: u8) -> u8 {
        let f = tables().inc(b) | (self.f() & FLAG_C);
        self.set_f(f);
        b.wrapping_add(1)
    }
    pub(super) fn dec8(&mut self, b: u8) -> u8 {
        let f = tables().dec(b) | (self.f() & FLAG_C);
        self.set_f(f);
        b.wrapping_sub(1)
    }

    /// The CB rotations and shifts in opcode order: RLC RRC RL RR SLA SRA SLL SRL.
    pub(super) fn shift(&mut self, op: u8, b: u8) -> u8 {
        let t = tables();
        let c = self.carry();
        let (r, f) = match op & 0x07 {
            0 => (b.rotate_left(1), t.rlc(b)),
            1 => (b.rotate_right(1), t.rrc(b)),
            2 => ((b << 1) | c as u8, t.rl(b, c)),
            3 => ((b >> 1) | ((c as u8) << 7), t.rr(b, c)),
            4 => (b << 1, t.rl(b, false)),
            5 => ((b >> 1) | (b & 0x80), t.sra(b)),
            6 => ((b << 1) | 1, t.rl(b, true)),
            _ => (b >> 1, t.rr(b, false)),
        };
        self.set_f(f);
        r
    }
    /// RLCA RRCA RLA RRA: like the CB forms on A, but S, Z and P/V are kept.
    pub(super) fn rotate_a(&mut self, op: u8) {
        let a = self.a();
        let f = self.f();
        let r = self.shift(op & 0x03, a);
        let f = (f & (FLAG_S | FLAG_Z | FLAG_PV)) | (self.f() & FLAG_C) | (r & FLAGS_XY);
        self.set_a(r);
        self.set_f(f);
    }

    /// BIT n: F5/F3 come from `xy`, which is the operand for registers
    /// and the high byte of MEMPTR for memory.
    pub(super) fn bit(&mut self, n: u8, b: u8, xy: u8) {
        let r = b & (1 << (n & 0x07));
        let mut f = (self.f() & FLAG_C) | FLAG_H | (r & FLAG_S) | (xy & FLAGS_XY);
        if r == 0 {
            f |= FLAG_Z | FLAG_PV;
        }
        self.set_f(f);
    }

    pub(super) fn daa(&mut self) {
        let af = tables().daa(self.a(), self.f());
        self.regs.af.set(af);
    }
    pub(super) fn cpl(&mut self) {
        let a = !self.a();
        self.set_a(a);
        let f = (self.f() & (FLAG_S | FLAG_Z | FLAG_PV | FLAG_C)) | FLAG_H | FLAG_N | (a & FLAGS_XY);
        self.set_f(f);
    }
    pub(super) fn scf(&mut self) {
        let f = (self.f() & (FLAG_S | FLAG_Z | FLAG_PV)) | FLAG_C | (self.a() & FLAGS_XY);
        self.set_f(f);
    }
    pub(super) fn ccf(&mut self) {
        let f0 = self.f();
        let mut f = (f0 & (FLAG_S | FLAG_Z | FLAG_PV)) | (self.a() & FLAGS_XY);
        f = set_flag8(f, FLAG_H, flag8(f0, FLAG_C));
        f = set_flag8(f, FLAG_C, !flag8(f0, FLAG_C));
        self.set_f(f);
    }

    /// ADD HL,rr: S, Z and P/V are kept, H is the carry out of bit 11.
    pub(super) fn add16(&mut self, a: u16, b: u16) -> u16 {
        let r = a as u32 + b as u32;
        let mut f = self.f() & (FLAG_S | FLAG_Z | FLAG_PV);
        f |= ((r >> 8) as u8) & FLAGS_XY;
        f = set_flag8(f, FLAG_H, (a & 0x0fff) + (b & 0x0fff) > 0x0fff);
        f = set_flag8(f, FLAG_C, r > 0xffff);
        self.set_f(f);
        r as u16
    }
    pub(super) fn adc16(&mut self, a: u16, b: u16) -> u16 {
        let c = self.carry() as u32;
        let r = a as u32 + b as u32 + c;
        let r16 = r as u16;
        let mut f = ((r16 >> 8) as u8) & (FLAG_S | FLAGS_XY);
        f = set_flag8(f, FLAG_Z, r16 == 0);
        f = set_flag8(f, FLAG_H, (a & 0x0fff) as u32 + (b & 0x0fff) as u32 + c > 0x0fff);
        f = set_flag8(f, FLAG_PV, (a ^ !b) & (a ^ r16) & 0x8000 != 0);
        f = set_flag8(f, FLAG_C, r > 0xffff);
        self.set_f(f);
        r16
    }
    pub(super) fn sbc16(&mut self, a: u16, b: u16) -> u16 {
        let c = self.carry() as u32;
        let r16 = a.wrapping_sub(b).wrapping_sub(c as u16);
        let mut f = (((r16 >> 8) as u8) & (FLAG_S | FLAGS_XY)) | FLAG_N;
        f = set_flag8(f, FLAG_Z, r16 == 0);
        f = set_flag8(f, FLAG_H, (b & 0x0fff) as u32 + c > (a & 0x0fff) as u32);
        f = set_flag8(f, FLAG_PV, (a ^ b) & (a ^ r16) & 0x8000 != 0);
        f = set_flag8(f, FLAG_C, b as u32 + c > a as u32);
        self.set_f(f);
        r16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu(a: u8, f: u8) -> Z80 {
        let mut z80 = Z80::new();
        z80.set_a(a);
        z80.set_f(f);
        z80
    }

    #[test]
    fn add_sets_overflow_and_half() {
        let mut z = cpu(0x7f, 0);
        z.add_a(0x01, false);
        assert_eq!(z.a(), 0x80);
        assert_eq!(z.f(), FLAG_S | FLAG_H | FLAG_PV);

        let mut z = cpu(0xff, FLAG_C);
        z.add_a(0x00, true);
        assert_eq!(z.a(), 0x00);
        assert_eq!(z.f(), FLAG_Z | FLAG_H | FLAG_C);
    }

    #[test]
    fn cp_takes_xy_from_operand() {
        let mut z = cpu(0x00, 0);
        z.cp_a(0x28);
        assert_eq!(z.a(), 0x00);
        assert_eq!(z.f() & FLAGS_XY, 0x28);
        assert!(flag8(z.f(), FLAG_C));
        assert!(flag8(z.f(), FLAG_N));
    }

    #[test]
    fn and_sets_half() {
        let mut z = cpu(0xf0, FLAG_C);
        z.and_a(0x0f);
        assert_eq!(z.f(), FLAG_Z | FLAG_H | FLAG_PV);
    }

    #[test]
    fn inc_dec_keep_carry() {
        let mut z = cpu(0, FLAG_C);
        assert_eq!(z.inc8(0xff), 0x00);
        assert_eq!(z.f(), FLAG_Z | FLAG_H | FLAG_C);
        let mut z = cpu(0, 0);
        assert_eq!(z.dec8(0x80), 0x7f);
        assert_eq!(z.f(), FLAG_H | FLAG_PV | FLAG_N | FLAG_Y | FLAG_X);
    }

    #[test]
    fn shift_round_trips() {
        let mut z = cpu(0, 0);
        let r = z.shift(0, 0x80);
        assert_eq!(r, 0x01);
        assert!(flag8(z.f(), FLAG_C));
        let r = z.shift(1, r);
        assert_eq!(r, 0x80);
        assert!(flag8(z.f(), FLAG_C));

        //RL then RR restores both the byte and the carry
        let mut z = cpu(0, 0);
        let r = z.shift(2, 0x80);
        assert_eq!(r, 0x00);
        assert!(flag8(z.f(), FLAG_C));
        assert_eq!(z.shift(3, r), 0x80);
        assert!(!flag8(z.f(), FLAG_C));

        assert_eq!(z.shift(6, 0x80), 0x01);
        assert!(flag8(z.f(), FLAG_C));
        assert_eq!(z.shift(5, 0x81), 0xc0);
        assert_eq!(z.shift(7, 0x81), 0x40);
        assert!(flag8(z.f(), FLAG_C));
    }

    #[test]
    fn rotate_a_keeps_szp() {
        let mut z = cpu(0x80, FLAG_Z | FLAG_PV | FLAG_H | FLAG_N);
        z.rotate_a(0);
        assert_eq!(z.a(), 0x01);
        assert_eq!(z.f(), FLAG_Z | FLAG_PV | FLAG_C);
        z.rotate_a(3);
        assert_eq!(z.a(), 0x80);
        assert_eq!(z.f(), FLAG_Z | FLAG_PV | FLAG_C);
    }

    #[test]
    fn bit_flags() {
        let mut z = cpu(0, FLAG_C);
        z.bit(7, 0x80, 0x80);
        assert_eq!(z.f(), FLAG_S | FLAG_H | FLAG_C);
        z.bit(0, 0x80, 0x28);
        assert_eq!(z.f(), FLAG_Z | FLAG_PV | FLAG_H | FLAG_C | FLAG_Y | FLAG_X);
    }

    #[test]
    fn neg_of_0x80() {
        let mut z = cpu(0x80, 0);
        z.neg();
        assert_eq!(z.a(), 0x80);
        assert!(flag8(z.f(), FLAG_PV));
        assert!(flag8(z.f(), FLAG_C));
        let mut z = cpu(0x00, 0);
        z.neg();
        assert_eq!(z.a(), 0x00);
        assert_eq!(z.f(), FLAG_Z | FLAG_N);
    }

    #[test]
    fn daa_after_add() {
        let mut z = cpu(0x15, 0);
        z.add_a(0x27, false);
        z.daa();
        assert_eq!(z.a(), 0x42);
        assert!(!flag8(z.f(), FLAG_C));
    }

    #[test]
    fn scf_ccf_cpl() {
        let mut z = cpu(0x28, FLAG_H | FLAG_N);
        z.scf();
        assert_eq!(z.f(), FLAG_C | FLAG_Y | FLAG_X);
        z.ccf();
        assert_eq!(z.f(), FLAG_H | FLAG_Y | FLAG_X);
        let mut z = cpu(0x00, 0);
        z.cpl();
        assert_eq!(z.a(), 0xff);
        assert_eq!(z.f(), FLAG_H | FLAG_N | FLAG_Y | FLAG_X);
    }

    #[test]
    fn wide_arithmetic() {
        let mut z = cpu(0, FLAG_S | FLAG_Z);
        assert_eq!(z.add16(0x0fff, 0x0001), 0x1000);
        assert_eq!(z.f(), FLAG_S | FLAG_Z | FLAG_H);

        let mut z = cpu(0, FLAG_C);
        assert_eq!(z.adc16(0x7fff, 0x0000), 0x8000);
        assert_eq!(z.f(), FLAG_S | FLAG_H | FLAG_PV);

        let mut z = cpu(0, FLAG_C);
        assert_eq!(z.sbc16(0x0001, 0x0000), 0x0000);
        assert_eq!(z.f(), FLAG_Z | FLAG_N);

        let mut z = cpu(0, 0);
        assert_eq!(z.sbc16(0x0000, 0x0001), 0xffff);
        assert_eq!(z.f(), FLAG_S | FLAG_Y | FLAG_X | FLAG_H | FLAG_N | FLAG_C);
    }
}
