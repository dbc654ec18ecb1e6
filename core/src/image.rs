// MIF image builder
//
// Lays a CHIP-8 ROM (and optionally the font sprites) out in memory and
// renders it as an Altera/Intel Memory Initialization File.
//
// Useful links:
// * [Memory Initialization File (.mif) Definition](https://www.intel.com/content/www/us/en/programmable/quartushelp/current/index.htm#reference/glossary/def_mif.htm)
//

use std::{fmt, io};

use log::debug;

use crate::address::Address;
use crate::error::MifError;
use crate::layout::{MemoryLayout, DEFAULT_FONT, FONT_SIZE};

/// Value written to every cell not covered by the font or the ROM
const FILL_VALUE: u8 = 0x00;

/// One line of the CONTENT section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MifEntry {
    /// A single cell
    Cell { address: Address, value: u8 },
    /// Inclusive address range sharing one value
    Range { start: Address, end: Address, value: u8 },
}

impl MifEntry {
    /// First and last covered address
    pub fn span(&self) -> (Address, Address) {
        match *self {
            MifEntry::Cell { address, .. } => (address, address),
            MifEntry::Range { start, end, .. } => (start, end),
        }
    }

    pub fn value(&self) -> u8 {
        match *self {
            MifEntry::Cell { value, .. } | MifEntry::Range { value, .. } => value,
        }
    }
}

impl fmt::Display for MifEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MifEntry::Cell { address, value } => write!(f, "{} : {:02X};", address, value),
            MifEntry::Range { start, end, value } => {
                write!(f, "[{}..{}] : {:02X};", start, end, value)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct MifBuilder {
    /// ROM
    rom: Vec<u8>,
    /// Custom font sprite
    font: Option<Vec<u8>>,
    /// Place font sprites at 0x000
    include_font_table: bool,
    /// Memory layout
    layout: MemoryLayout,
}

/// Parsed or generated memory image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MifImage {
    /// Bits per cell
    width: u32,
    /// Number of cells
    depth: usize,
    /// CONTENT lines in address order
    entries: Vec<MifEntry>,
}

impl MifBuilder {
    pub fn new() -> MifBuilder {
        MifBuilder {
            rom: Vec::new(),
            font: None,
            include_font_table: false,
            layout: MemoryLayout::default(),
        }
    }

    pub fn with_rom(mut self, rom: Vec<u8>) -> Self {
        self.rom = rom;
        self
    }

    pub fn with_font_table(mut self, include: bool) -> Self {
        self.include_font_table = include;
        self
    }

    /// Replaces the built-in sprites, implies `with_font_table(true)`
    pub fn with_font(mut self, font: Vec<u8>) -> Self {
        self.font = Some(font);
        self.include_font_table = true;
        self
    }

    pub fn with_layout(mut self, layout: MemoryLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn layout(&self) -> MemoryLayout {
        self.layout
    }

    pub fn build(&self) -> Result<MifImage, MifError> {
        let font = match (&self.font, self.include_font_table) {
            (_, false) => None,
            (Some(font), true) => Some(&font[..]),
            (None, true) => Some(&DEFAULT_FONT[..]),
        };

        if let Some(font) = font {
            if font.len() != FONT_SIZE {
                return Err(MifError::InvalidFont { len: font.len() });
            }
        }

        let layout = self.layout;
        layout.validate(font.map(<[u8]>::len))?;

        let capacity = layout.program_capacity();
        if self.rom.len() > capacity {
            return Err(MifError::AddressOverflow {
                rom_len: self.rom.len(),
                capacity,
            });
        }

        let mut entries = Vec::with_capacity(
            font.map_or(0, <[u8]>::len) + self.rom.len() + 2,
        );

        // Font sprites from 0x000
        let font_end = match font {
            Some(font) => {
                push_cells(&mut entries, 0, font);
                font.len()
            }
            None => 0,
        };

        // Gap before the program
        push_fill(&mut entries, font_end, layout.program_start);

        // Program
        push_cells(&mut entries, layout.program_start, &self.rom);

        // Remaining memory
        let rom_end = layout.program_start + self.rom.len();
        push_fill(&mut entries, rom_end, layout.depth);

        debug!(
            "laid out {} ROM bytes at 0x{:03X}, font: {}, {} entries",
            self.rom.len(),
            layout.program_start,
            font.is_some(),
            entries.len()
        );

        Ok(MifImage {
            width: layout.width,
            depth: layout.depth,
            entries,
        })
    }
}

impl Default for MifBuilder {
    fn default() -> Self {
        MifBuilder::new()
    }
}

fn push_cells(entries: &mut Vec<MifEntry>, start: usize, data: &[u8]) {
    entries.extend(data.iter().enumerate().map(|(i, &value)| MifEntry::Cell {
        address: Address::from_index(start + i),
        value,
    }));
}

/// Zero fills [start, end), empty ranges are skipped
fn push_fill(entries: &mut Vec<MifEntry>, start: usize, end: usize) {
    if start < end {
        entries.push(MifEntry::Range {
            start: Address::from_index(start),
            end: Address::from_index(end - 1),
            value: FILL_VALUE,
        });
    }
}

impl MifImage {
    pub(crate) fn from_parts(width: u32, depth: usize, entries: Vec<MifEntry>) -> MifImage {
        MifImage { width, depth, entries }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn entries(&self) -> &[MifEntry] {
        &self.entries
    }

    /// Memory contents described by the image, cells without an entry read as zero
    pub fn to_memory(&self) -> Vec<u8> {
        let mut memory = vec![0u8; self.depth];
        for entry in &self.entries {
            let (start, end) = entry.span();
            memory[start.index()..=end.index()].fill(entry.value());
        }
        memory
    }

    pub fn write_to<W: io::Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "WIDTH={};", self.width)?;
        writeln!(w, "DEPTH={};", self.depth)?;
        writeln!(w)?;
        writeln!(w, "ADDRESS_RADIX=HEX;")?;
        writeln!(w, "DATA_RADIX=HEX;")?;
        writeln!(w)?;
        writeln!(w, "CONTENT BEGIN")?;
        for entry in &self.entries {
            writeln!(w, "  {}", entry)?;
        }
        writeln!(w, "END;")
    }
}

impl fmt::Display for MifImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        self.write_to(&mut buf).map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{MEMORY_DEPTH, PROGRAM_START};

    const HEADER: &str = "WIDTH=8;\nDEPTH=4096;\n\nADDRESS_RADIX=HEX;\nDATA_RADIX=HEX;\n\nCONTENT BEGIN\n";

    fn body(image: &MifImage) -> Vec<String> {
        image.entries().iter().map(|e| e.to_string()).collect()
    }

    fn assert_covers_once(image: &MifImage) {
        let mut hits = vec![0u32; image.depth()];
        for entry in image.entries() {
            let (start, end) = entry.span();
            assert!(start <= end, "inverted range {}", entry);
            for hit in &mut hits[start.index()..=end.index()] {
                *hit += 1;
            }
        }
        for (addr, hit) in hits.iter().enumerate() {
            assert_eq!(*hit, 1, "address 0x{:03X} covered {} times", addr, hit);
        }
    }

    #[test]
    fn test_empty_rom() {
        let image = MifBuilder::new().build().unwrap();
        assert_eq!(body(&image), ["[000..1FF] : 00;", "[200..FFF] : 00;"]);
        assert_covers_once(&image);
    }

    #[test]
    fn test_single_byte() {
        let image = MifBuilder::new().with_rom(vec![0xAB]).build().unwrap();
        assert_eq!(
            body(&image),
            ["[000..1FF] : 00;", "200 : AB;", "[201..FFF] : 00;"]
        );
    }

    #[test]
    fn test_full_text() {
        let image = MifBuilder::new().with_rom(vec![0x00, 0xE0]).build().unwrap();
        let expected = format!(
            "{}  [000..1FF] : 00;\n  200 : 00;\n  201 : E0;\n  [202..FFF] : 00;\nEND;\n",
            HEADER
        );
        assert_eq!(image.to_string(), expected);

        let mut buf = Vec::new();
        image.write_to(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), expected);
    }

    #[test]
    fn test_font_variant() {
        let image = MifBuilder::new()
            .with_rom(vec![0xAB])
            .with_font_table(true)
            .build()
            .unwrap();
        let lines = body(&image);
        assert_eq!(lines.len(), FONT_SIZE + 3);
        assert_eq!(lines[0], "000 : F0;");
        assert_eq!(lines[1], "001 : 90;");
        assert_eq!(lines[FONT_SIZE - 1], "04F : 80;");
        assert_eq!(
            &lines[FONT_SIZE..],
            ["[050..1FF] : 00;", "200 : AB;", "[201..FFF] : 00;"]
        );
        assert_covers_once(&image);
    }

    #[test]
    fn test_font_region_ignores_rom() {
        for rom in [vec![], vec![0xFF; 16], (0..=255).collect::<Vec<u8>>()] {
            let image = MifBuilder::new()
                .with_rom(rom)
                .with_font_table(true)
                .build()
                .unwrap();
            assert_eq!(&image.to_memory()[..FONT_SIZE], &DEFAULT_FONT[..]);
        }
    }

    #[test]
    fn test_custom_font() {
        let font: Vec<u8> = (0..FONT_SIZE as u8).collect();
        let image = MifBuilder::new().with_font(font.clone()).build().unwrap();
        assert_eq!(&image.to_memory()[..FONT_SIZE], &font[..]);
        assert_eq!(body(&image)[1], "001 : 01;");
    }

    #[test]
    fn test_custom_font_ignored_without_table() {
        let image = MifBuilder::new()
            .with_font(vec![0x11; FONT_SIZE])
            .with_font_table(false)
            .build()
            .unwrap();
        assert_eq!(body(&image), ["[000..1FF] : 00;", "[200..FFF] : 00;"]);
    }

    #[test]
    fn test_custom_font_wrong_size() {
        let err = MifBuilder::new().with_font(vec![0; 79]).build();
        assert!(matches!(err, Err(MifError::InvalidFont { len: 79 })));
    }

    #[test]
    fn test_rom_fills_memory() {
        let rom = vec![0x12; MEMORY_DEPTH - PROGRAM_START];
        let image = MifBuilder::new().with_rom(rom).build().unwrap();
        let lines = body(&image);
        assert_eq!(lines.len(), 1 + 3584);
        assert_eq!(lines.last().unwrap(), "FFF : 12;");
        assert!(!lines.iter().any(|l| l.starts_with("[E00")));
        assert_covers_once(&image);
    }

    #[test]
    fn test_rom_leaves_one_cell() {
        let rom = vec![0x34; MEMORY_DEPTH - PROGRAM_START - 1];
        let image = MifBuilder::new().with_rom(rom).build().unwrap();
        let lines = body(&image);
        assert_eq!(lines.last().unwrap(), "[FFF..FFF] : 00;");
        assert_covers_once(&image);
    }

    #[test]
    fn test_rom_overflow() {
        let rom = vec![0; MEMORY_DEPTH - PROGRAM_START + 1];
        let err = MifBuilder::new().with_rom(rom).build();
        assert!(matches!(
            err,
            Err(MifError::AddressOverflow { rom_len: 3585, capacity: 3584 })
        ));
    }

    #[test]
    fn test_cells_follow_rom() {
        let rom: Vec<u8> = (0..600).map(|i| (i * 7 % 256) as u8).collect();
        let image = MifBuilder::new().with_rom(rom.clone()).build().unwrap();
        let cells: Vec<_> = image
            .entries()
            .iter()
            .filter_map(|e| match *e {
                MifEntry::Cell { address, value } => Some((address, value)),
                MifEntry::Range { .. } => None,
            })
            .collect();
        assert_eq!(cells.len(), rom.len());
        for (i, (address, value)) in cells.iter().enumerate() {
            assert_eq!(address.index(), PROGRAM_START + i);
            assert_eq!(*value, rom[i]);
        }
        assert_eq!(&image.to_memory()[PROGRAM_START..PROGRAM_START + rom.len()], &rom[..]);
    }

    #[test]
    fn test_coverage_for_many_lengths() {
        for len in [0, 1, 2, 255, 256, 1000, 3583, 3584] {
            for font in [false, true] {
                let image = MifBuilder::new()
                    .with_rom(vec![0xEE; len])
                    .with_font_table(font)
                    .build()
                    .unwrap();
                assert_covers_once(&image);
            }
        }
    }

    #[test]
    fn test_program_start_zero() {
        let layout = MemoryLayout::default().with_program_start(0);
        let image = MifBuilder::new()
            .with_rom(vec![0x01])
            .with_layout(layout)
            .build()
            .unwrap();
        assert_eq!(body(&image), ["000 : 01;", "[001..FFF] : 00;"]);
    }

    #[test]
    fn test_font_adjacent_to_program() {
        let layout = MemoryLayout::default().with_program_start(FONT_SIZE);
        let image = MifBuilder::new()
            .with_rom(vec![0x01])
            .with_font_table(true)
            .with_layout(layout)
            .build()
            .unwrap();
        let lines = body(&image);
        assert_eq!(lines[FONT_SIZE], "050 : 01;");
        assert_eq!(lines[FONT_SIZE + 1], "[051..FFF] : 00;");
        assert_covers_once(&image);
    }

    #[test]
    fn test_invalid_layout() {
        let layout = MemoryLayout::new(MEMORY_DEPTH, 16, PROGRAM_START);
        let err = MifBuilder::new().with_layout(layout).build();
        assert!(matches!(err, Err(MifError::InvalidLayout { .. })));
    }
}
