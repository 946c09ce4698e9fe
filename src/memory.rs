use crate::z80::Bus;

/// A flat 64 KiB address space with no I/O devices.
///
/// The first `rom_size` bytes are read-only, as the Spectrum ROM below 0x4000.
/// Port reads float at 0xff and port writes are discarded.
pub struct Memory {
    data: Vec<u8>,
    rom_size: usize,
}

impl Default for Memory {
    fn default() -> Self {
        Memory::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        let data = vec![0; 0x10000];
        Memory { data, rom_size: 0 }
    }
    /// Loads `rom` at address 0 and write-protects it.
    pub fn new_from_rom(rom: &[u8]) -> Self {
        let mut mem = Memory::new();
        let len = rom.len().min(0x10000);
        mem.data[..len].copy_from_slice(&rom[..len]);
        mem.rom_size = len;
        mem
    }
    /// Copies `bytes` starting at `addr`, wrapping at the top of memory and
    /// ignoring the ROM guard.
    pub fn load_at(&mut self, addr: u16, bytes: &[u8]) {
        let mut a = addr;
        for &b in bytes {
            self.data[a as usize] = b;
            a = a.wrapping_add(1);
        }
    }
    pub fn peek(&self, addr: u16) -> u8 {
        self.data[addr as usize]
    }
    pub fn poke(&mut self, addr: u16, data: u8) {
        if (addr as usize) < self.rom_size {
            log::trace!("writing to rom {:04x} <- {:02x}", addr, data);
            return;
        }
        self.data[addr as usize] = data;
    }
    pub fn peek_u16(&self, addr: u16) -> u16 {
        let lo = self.peek(addr);
        let hi = self.peek(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }
    pub fn poke_u16(&mut self, addr: u16, data: u16) {
        let [lo, hi] = data.to_le_bytes();
        self.poke(addr, lo);
        self.poke(addr.wrapping_add(1), hi);
    }
    pub fn slice(&self, addr: u16, end: u16) -> &[u8] {
        &self.data[addr as usize..end as usize]
    }
}

impl Bus for Memory {
    fn read_mem(&mut self, addr: u16) -> u8 {
        self.peek(addr)
    }
    fn write_mem(&mut self, addr: u16, value: u8) {
        self.poke(addr, value);
    }
    fn read_port(&mut self, _port: u16) -> u8 {
        0xff
    }
    fn write_port(&mut self, port: u16, value: u8) {
        log::trace!("OUT {:04x}, {:02x}", port, value);
    }
}
