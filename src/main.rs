use std::env;
use std::process::ExitCode;

use nescore::{Cartridge, Nes, NesConfig};

const USAGE: &str = "usage: nescore <rom.nes> [frames] [out.png]";

fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let rom_path = args.get(1).ok_or(USAGE)?;
    let frames: u32 = match args.get(2) {
        Some(n) => n.parse()?,
        None => 60,
    };

    let cart = Cartridge::load(rom_path)?;
    println!(
        "mapper {}  PRG {} KiB  CHR {} KiB{}  {:?} mirroring",
        cart.mapper_id(),
        cart.prg_rom_len() / 1024,
        cart.chr_len() / 1024,
        if cart.chr_is_ram() { " (RAM)" } else { "" },
        cart.mirroring(),
    );

    let mut nes = Nes::new(cart, NesConfig::default())?;
    let mut cycles = 0u64;
    for _ in 0..frames {
        cycles += nes.run_frame()?;
    }

    let cpu = nes.cpu();
    println!("frames: {frames}  CPU cycles: {cycles}");
    println!(
        "A: 0x{:02X}  X: 0x{:02X}  Y: 0x{:02X}  SP: 0x{:02X}  PC: 0x{:04X}  P: 0b{:08b}",
        cpu.a(),
        cpu.x(),
        cpu.y(),
        cpu.sp(),
        cpu.pc(),
        cpu.status_byte(),
    );

    if let Some(out) = args.get(3) {
        save_frame(&nes, out)?;
    }
    Ok(())
}

#[cfg(feature = "screenshot")]
fn save_frame(nes: &Nes, out: &str) -> Result<(), Box<dyn std::error::Error>> {
    nescore::screenshot::save_png(nes.frame(), out)?;
    println!("frame written to {out}");
    Ok(())
}

#[cfg(not(feature = "screenshot"))]
fn save_frame(_nes: &Nes, out: &str) -> Result<(), Box<dyn std::error::Error>> {
    Err(format!("cannot write {out}: built without the `screenshot` feature").into())
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
