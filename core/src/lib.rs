mod address;
mod error;
mod files;
mod image;
mod layout;
mod reader;

pub use address::{Address, AddressParseError, MAX_ADDRESS};
pub use error::MifError;
pub use files::{convert_file, output_path, read_input, write_mif};
pub use image::{MifBuilder, MifEntry, MifImage};
pub use layout::{MemoryLayout, DEFAULT_FONT, FONT_SIZE, MEMORY_DEPTH, MEMORY_WIDTH, PROGRAM_START};
pub use reader::{parse_mif, MifParseError};
