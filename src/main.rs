// CD+G Decoder - Main Entry Point
//
// Decodes a .cdg file, exports frames as configured and writes the final
// frame as a PNG.

use cdg_rs::instructions::Instruction;
use cdg_rs::player::{FrameExporter, Player, PlayerConfig, CONFIG_FILE};
use std::env;
use std::path::PathBuf;

const REPORTED_INSTRUCTIONS: [Instruction; 8] = [
    Instruction::MemoryPreset,
    Instruction::BorderPreset,
    Instruction::TileBlock,
    Instruction::TileBlockXor,
    Instruction::ScrollPreset,
    Instruction::ScrollCopy,
    Instruction::LoadPaletteLow,
    Instruction::LoadPaletteHigh,
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <file.cdg> [output_dir]", args[0]);
        std::process::exit(1);
    }

    println!("CD+G Decoder (cdg-rs) v{}", env!("CARGO_PKG_VERSION"));
    println!("==============================");
    println!();

    let mut config = PlayerConfig::load_or_default(CONFIG_FILE);
    println!("Configuration loaded from '{}'", CONFIG_FILE);
    if let Some(dir) = args.get(2) {
        config.export.output_directory = PathBuf::from(dir);
    }

    let source = PathBuf::from(&args[1]);
    println!("Decoding: {}", source.display());
    println!();

    let mut exporter = FrameExporter::new(&config.export, Some(&source))?;
    let mut player = Player::new(config)?;
    let stats = player.play_file(&source, &mut exporter)?;
    let written = exporter.finish()?;
    let final_frame = player.screenshot()?;

    println!("Playback Summary:");
    println!("=================");
    println!("Packets:        {}", stats.packets);
    println!("Frames:         {}", stats.frames);
    println!("Ignored:        {}", stats.ignored_packets);
    println!("Malformed:      {}", stats.malformed);
    println!();
    for instruction in REPORTED_INSTRUCTIONS {
        println!("{:<16}{}", instruction.name(), stats.count(instruction));
    }
    println!();
    println!("Frames written: {}", written.len());
    println!("Final frame:    {}", final_frame.display());

    Ok(())
}
