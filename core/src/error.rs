use std::{error::Error, fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum MifError {
    /// Input file does not exist
    InputNotFound { path: PathBuf },
    /// Input file exists but could not be read
    InputUnreadable { path: PathBuf, source: io::Error },
    /// Output file could not be created or written
    OutputUnwritable { path: PathBuf, source: io::Error },
    /// ROM does not fit between the program start and the end of memory
    AddressOverflow { rom_len: usize, capacity: usize },
    /// Font sprite table has the wrong size
    InvalidFont { len: usize },
    /// Memory layout can not be rendered as a MIF image
    InvalidLayout { reason: &'static str },
}

impl fmt::Display for MifError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MifError::InputNotFound { path } => {
                write!(f, "input file not found: {}", path.display())
            }
            MifError::InputUnreadable { path, .. } => {
                write!(f, "failed to read input file {}", path.display())
            }
            MifError::OutputUnwritable { path, .. } => {
                write!(f, "failed to write output file {}", path.display())
            }
            MifError::AddressOverflow { rom_len, capacity } => write!(
                f,
                "ROM is {} bytes but only {} bytes fit after the program start",
                rom_len, capacity
            ),
            MifError::InvalidFont { len } => {
                write!(f, "font sprite must be 80 bytes, got {}", len)
            }
            MifError::InvalidLayout { reason } => write!(f, "invalid memory layout: {}", reason),
        }
    }
}

impl Error for MifError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MifError::InputUnreadable { source, .. } | MifError::OutputUnwritable { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}
