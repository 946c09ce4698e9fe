use std::env;

use anyhow::{anyhow, Result};
use zx_z80::Z80;

const SHIFTS: [&str; 8] = ["rlc", "rrc", "rl", "rr", "sla", "sra", "sll", "srl"];

fn main() -> Result<()> {
    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| String::from("dump_op"));
    let mut z80 = Z80::new();

    let Some(op) = args.next() else {
        println!("Usage: {0} <add|adc|sub|sbc|cp|daa|rlc|rrc|rl|rr|sla|sra|sll|srl>", program);
        return Ok(());
    };
    match op.as_str() {
        "add" => z80.dump_add(),
        "adc" => z80.dump_adc(),
        "sub" => z80.dump_sub(),
        "sbc" => z80.dump_sbc(),
        "cp" => z80.dump_cp(),
        "daa" => z80.dump_daa(),
        other => {
            let shift = SHIFTS.iter()
                .position(|s| *s == other)
                .ok_or_else(|| anyhow!("unknown dump_op '{0}'", other))?;
            z80.dump_shift(shift as u8);
        }
    }
    Ok(())
}
