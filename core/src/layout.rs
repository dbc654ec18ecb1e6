// CHIP-8 memory layout
//
// 4KB of 8 bit cells. Font sprites conventionally sit at 0x000, programs are
// loaded at 0x200.
//
// Useful links:
// * [Cowgod's Chip-8 Technical Reference](http://devernay.free.fr/hacks/chip8/C8TECH10.HTM#2.1)
//

use crate::address::MAX_ADDRESS;
use crate::error::MifError;

pub const MEMORY_DEPTH: usize = 0x1000;
pub const MEMORY_WIDTH: u32 = 8;
pub const PROGRAM_START: usize = 0x200;
pub const FONT_SIZE: usize = 80;

pub static DEFAULT_FONT: [u8; FONT_SIZE] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLayout {
    /// Number of memory cells
    pub depth: usize,
    /// Bits per memory cell
    pub width: u32,
    /// Address of the first ROM byte
    pub program_start: usize,
}

impl MemoryLayout {
    pub const CHIP_8: MemoryLayout = MemoryLayout {
        depth: MEMORY_DEPTH,
        width: MEMORY_WIDTH,
        program_start: PROGRAM_START,
    };

    pub const fn new(depth: usize, width: u32, program_start: usize) -> MemoryLayout {
        MemoryLayout { depth, width, program_start }
    }

    pub fn with_program_start(self, program_start: usize) -> MemoryLayout {
        MemoryLayout { program_start, ..self }
    }

    /// Number of ROM bytes that fit between the program start and the end of memory
    pub fn program_capacity(&self) -> usize {
        self.depth.saturating_sub(self.program_start)
    }

    pub fn validate(&self, font_len: Option<usize>) -> Result<(), MifError> {
        if self.depth == 0 || self.depth > MAX_ADDRESS as usize + 1 {
            return Err(MifError::InvalidLayout {
                reason: "depth must be between 1 and 4096 cells",
            });
        }

        if self.width != MEMORY_WIDTH {
            return Err(MifError::InvalidLayout {
                reason: "width must be 8 bits",
            });
        }

        if self.program_start > self.depth {
            return Err(MifError::InvalidLayout {
                reason: "program start lies beyond the end of memory",
            });
        }

        if let Some(len) = font_len {
            if len > self.program_start {
                return Err(MifError::InvalidLayout {
                    reason: "font sprites overlap the program area",
                });
            }
        }

        Ok(())
    }
}

impl Default for MemoryLayout {
    fn default() -> MemoryLayout {
        MemoryLayout::CHIP_8
    }
}
