use anyhow::{anyhow, Context};
use std::env;
use std::path::Path;

use zx_z80::{Memory, Z80};

mod logger {
    use log::{LevelFilter, Log, Metadata, Record};

    struct StderrLogger;

    static LOGGER: StderrLogger = StderrLogger;

    impl Log for StderrLogger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= log::max_level()
        }
        fn log(&self, record: &Record) {
            if self.enabled(record.metadata()) {
                eprintln!("[{}] {}", record.level(), record.args());
            }
        }
        fn flush(&self) {}
    }

    /// Installs the logger, with the level taken from `ZX_Z80_LOG` (default `warn`).
    pub fn init() {
        let level = std::env::var("ZX_Z80_LOG")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(LevelFilter::Warn);
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(level);
        }
    }
}

/// T-states of a 48K Spectrum frame: one maskable interrupt each.
const FRAME_TSTATES: u64 = 69888;
/// How long the ULA keeps INT asserted.
const INT_LENGTH: u64 = 32;

#[cfg(feature = "flate2")]
fn gunzip(data: &[u8]) -> anyhow::Result<Vec<u8>> {
    use std::io::Read;
    let mut out = Vec::new();
    flate2::read::GzDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(not(feature = "flate2"))]
fn gunzip(_: &[u8]) -> anyhow::Result<Vec<u8>> {
    Err(anyhow!("gzip images are not supported"))
}

#[cfg(feature = "zip")]
fn unzip(data: &[u8]) -> anyhow::Result<Vec<u8>> {
    use std::io::Read;
    let mut zip = zip::ZipArchive::new(std::io::Cursor::new(data))?;
    for i in 0..zip.len() {
        let mut ze = zip.by_index(i)?;
        if ze.is_dir() {
            continue;
        }
        log::info!("unzipping {}", ze.name());
        let mut out = Vec::new();
        ze.read_to_end(&mut out)?;
        return Ok(out);
    }
    Err(anyhow!("empty zip archive"))
}

#[cfg(not(feature = "zip"))]
fn unzip(_: &[u8]) -> anyhow::Result<Vec<u8>> {
    Err(anyhow!("zip images are not supported"))
}

fn read_image(path: &Path) -> anyhow::Result<Vec<u8>> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let ext = path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "gz" => gunzip(&data),
        "zip" => unzip(&data),
        _ => Ok(data),
    }
}

fn main() -> anyhow::Result<()> {
    logger::init();

    let mut args = env::args_os();
    let program = args
        .next()
        .ok_or_else(|| anyhow!("Missing command line argument"))?;
    let Some(image) = args.next() else {
        return Err(anyhow!("Usage: {} <image> [load-addr-hex] [max-steps]", program.to_string_lossy()));
    };
    let addr = match args.next() {
        Some(a) => {
            let a = a.to_string_lossy();
            u16::from_str_radix(a.trim_start_matches("0x"), 16)
                .with_context(|| format!("invalid load address '{}'", a))?
        }
        None => 0,
    };
    let max_steps: u64 = match args.next() {
        Some(n) => n.to_string_lossy().parse().context("invalid step count")?,
        None => 10_000_000,
    };

    let data = read_image(Path::new(&image))?;
    if data.len() > 0x10000 {
        return Err(anyhow!("image too big: {} bytes", data.len()));
    }
    log::info!("loading {} bytes at {:04x}", data.len(), addr);

    let mut mem = Memory::new();
    mem.load_at(addr, &data);
    let mut z80 = Z80::new();
    z80.set_pc(addr);

    let mut steps = 0;
    while steps < max_steps {
        z80.signals.int = z80.tstates() % FRAME_TSTATES < INT_LENGTH;
        z80.step(&mut mem);
        steps += 1;
        if z80.halted() && !z80.iff1() {
            log::info!("halted at {:04x}", z80.pc());
            break;
        }
    }

    z80.dump_regs();
    let r = z80.regs();
    println!("steps {}; T {}; PC {:04x}; SP {:04x}; AF {:04x}; BC {:04x}; DE {:04x}; HL {:04x}; IX {:04x}; IY {:04x}",
        steps, z80.tstates(), z80.pc(), z80.sp(),
        r.af.as_u16(), r.bc.as_u16(), r.de.as_u16(), r.hl.as_u16(),
        r.ix.as_u16(), r.iy.as_u16());
    Ok(())
}
