use std::{error::Error, fmt, str::FromStr};

/// Highest address that still renders as three hex digits
pub const MAX_ADDRESS: u16 = 0xFFF;

/// Memory cell address, always within [0x000, 0xFFF]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u16);

impl Address {
    pub const fn new(addr: u16) -> Option<Address> {
        if addr <= MAX_ADDRESS {
            Some(Address(addr))
        } else {
            None
        }
    }

    /// Callers must have checked the index against a validated layout
    pub(crate) fn from_index(idx: usize) -> Address {
        debug_assert!(idx <= MAX_ADDRESS as usize, "address out of range: {idx}");
        Address(idx as u16)
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03X}", self.0)
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(mut s: &str) -> Result<Address, AddressParseError> {
        if s.starts_with("0x") || s.starts_with("0X") {
            s = &s[2..];
        }

        if s.is_empty() || s.len() > 3 {
            return Err(AddressParseError);
        }

        if s.chars().any(|c| !c.is_ascii_hexdigit()) {
            return Err(AddressParseError);
        }

        let addr = u16::from_str_radix(s, 16).map_err(|_| AddressParseError)?;

        Address::new(addr).ok_or(AddressParseError)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressParseError;

impl fmt::Display for AddressParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        "failed to parse hex address, expected 0x000-0xFFF".fmt(f)
    }
}

impl Error for AddressParseError {}
