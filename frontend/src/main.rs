use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use chip_8_mif_core::{
    convert_file, output_path, parse_mif, read_input, Address, MemoryLayout, MifBuilder,
};
use clap::Parser;
use log::{debug, LevelFilter};

/// CHIP-8 ROM to Memory Initialization File (MIF) converter
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Filepath to Chip-8 ROM file, asked for interactively when omitted
    #[clap(index = 1)]
    rom: Option<PathBuf>,

    /// Filepath of the generated MIF file [default: ROM path with .mif extension]
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Place the built-in font sprites at address 0x000
    #[clap(short = 'f', long)]
    with_font: bool,

    /// Filepath to 80 byte font file, implies --with-font
    #[clap(long)]
    font: Option<PathBuf>,

    /// Address of the first ROM byte as HEX [default: 0x200]
    #[clap(long)]
    program_start: Option<Address>,

    /// Read the generated file back and compare it with the ROM
    #[clap(long)]
    verify: bool,

    /// Print debug information
    #[clap(short, long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let mif_path = run(args)?;

    println!("\nMIF file successfully generated: {}", mif_path.display());

    Ok(())
}

/// Converts the ROM named by `args`, returns the path of the generated file
fn run(args: Args) -> anyhow::Result<PathBuf> {
    let rom_path = match args.rom {
        Some(rom) => rom,
        None => prompt_rom_path()?,
    };
    let mif_path = args.output.unwrap_or_else(|| output_path(&rom_path));

    if same_file(&rom_path, &mif_path) {
        bail!("output file {} would overwrite the ROM", mif_path.display());
    }

    let mut builder = MifBuilder::new().with_font_table(args.with_font);

    if let Some(font) = args.font {
        let font_data = read_input(&font).context("Failed to read font file")?;
        builder = builder.with_font(font_data);
    }

    if let Some(start) = args.program_start {
        builder = builder.with_layout(MemoryLayout::default().with_program_start(start.index()));
    }

    debug!("layout: {:?}", builder.layout());

    let image = convert_file(&rom_path, &mif_path, builder)?;

    if args.verify {
        let text = fs::read_to_string(&mif_path)
            .with_context(|| format!("Failed to read back {}", mif_path.display()))?;
        let parsed = parse_mif(&text)
            .with_context(|| format!("Generated file {} is not valid MIF", mif_path.display()))?;
        if parsed.width() != image.width() || parsed.to_memory() != image.to_memory() {
            bail!("{} does not match the ROM", mif_path.display());
        }
        debug!("verified {}", mif_path.display());
    }

    Ok(mif_path)
}

/// True when both paths name the same file, `output` need not exist yet
fn same_file(rom: &Path, output: &Path) -> bool {
    // A missing ROM fails later with a proper error
    let Ok(rom) = fs::canonicalize(rom) else {
        return false;
    };

    let output = match fs::canonicalize(output) {
        Ok(path) => path,
        Err(_) => {
            let parent = match output.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            match (fs::canonicalize(parent), output.file_name()) {
                (Ok(parent), Some(name)) => parent.join(name),
                _ => return false,
            }
        }
    };

    rom == output
}

fn prompt_rom_path() -> anyhow::Result<PathBuf> {
    print!("File name .ch8 (with extension): ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    let name = line.trim();
    if name.is_empty() {
        bail!("No ROM file given");
    }
    Ok(PathBuf::from(name))
}
