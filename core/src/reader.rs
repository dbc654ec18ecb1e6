use std::{error::Error, fmt};

use crate::address::Address;
use crate::image::{MifEntry, MifImage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MifParseError {
    /// 1-based line number
    pub line: usize,
    pub reason: String,
}

impl MifParseError {
    fn new(line: usize, reason: impl Into<String>) -> MifParseError {
        MifParseError { line, reason: reason.into() }
    }
}

impl fmt::Display for MifParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

impl Error for MifParseError {}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Content,
    Done,
}

/// Parses a MIF file with hexadecimal address and data radix.
pub fn parse_mif(text: &str) -> Result<MifImage, MifParseError> {
    let mut width = None;
    let mut depth = None;
    let mut entries = Vec::new();
    let mut section = Section::Header;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        match section {
            Section::Header => {
                if line == "CONTENT BEGIN" {
                    if width.is_none() || depth.is_none() {
                        return Err(MifParseError::new(line_no, "WIDTH and DEPTH must precede CONTENT"));
                    }
                    section = Section::Content;
                    continue;
                }

                let (key, value) = header_field(line)
                    .ok_or_else(|| MifParseError::new(line_no, format!("unexpected header line `{}`", line)))?;
                match key {
                    "WIDTH" => {
                        let w: u32 = value
                            .parse()
                            .map_err(|_| MifParseError::new(line_no, "WIDTH is not a number"))?;
                        if w == 0 || w > 8 {
                            return Err(MifParseError::new(line_no, "only widths of 1 to 8 bits are supported"));
                        }
                        width = Some(w);
                    }
                    "DEPTH" => {
                        let d: usize = value
                            .parse()
                            .map_err(|_| MifParseError::new(line_no, "DEPTH is not a number"))?;
                        if d == 0 || d > 0x1000 {
                            return Err(MifParseError::new(line_no, "only depths of 1 to 4096 cells are supported"));
                        }
                        depth = Some(d);
                    }
                    "ADDRESS_RADIX" | "DATA_RADIX" => {
                        if value != "HEX" {
                            return Err(MifParseError::new(line_no, format!("unsupported {} `{}`", key, value)));
                        }
                    }
                    _ => return Err(MifParseError::new(line_no, format!("unknown header field `{}`", key))),
                }
            }
            Section::Content => {
                if line == "END;" {
                    section = Section::Done;
                    continue;
                }

                // Both set before entering Content
                let (width, depth) = (width.unwrap_or(8), depth.unwrap_or(0));
                let entry = parse_entry(line).map_err(|reason| MifParseError::new(line_no, reason))?;

                let (start, end) = entry.span();
                if end.index() >= depth {
                    return Err(MifParseError::new(line_no, format!("address {} outside of DEPTH", end)));
                }
                if width < 8 && entry.value() >> width != 0 {
                    return Err(MifParseError::new(line_no, format!("value {:02X} wider than WIDTH", entry.value())));
                }
                if start > end {
                    return Err(MifParseError::new(line_no, format!("range {} ends before it starts", entry)));
                }

                entries.push(entry);
            }
            Section::Done => {
                return Err(MifParseError::new(line_no, "content after END;"));
            }
        }
    }

    if section != Section::Done {
        let last = text.lines().count().max(1);
        return Err(MifParseError::new(last, "missing END;"));
    }

    Ok(MifImage::from_parts(width.unwrap_or(8), depth.unwrap_or(0), entries))
}

fn strip_comment(line: &str) -> &str {
    match line.find("--") {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// `KEY=VALUE;`
fn header_field(line: &str) -> Option<(&str, &str)> {
    let line = line.strip_suffix(';')?;
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim()))
}

/// `AAA : VV;` or `[AAA..BBB] : VV;`
fn parse_entry(line: &str) -> Result<MifEntry, String> {
    let line = line
        .strip_suffix(';')
        .ok_or_else(|| format!("missing `;` in `{}`", line))?;
    let (addr, value) = line
        .split_once(':')
        .ok_or_else(|| format!("missing `:` in `{}`", line))?;

    let value = value.trim();
    let value = if !value.is_empty() && value.len() <= 2 && value.chars().all(|c| c.is_ascii_hexdigit()) {
        u8::from_str_radix(value, 16).map_err(|e| e.to_string())?
    } else {
        return Err(format!("invalid value `{}`", value));
    };

    let addr = addr.trim();
    if let Some(range) = addr.strip_prefix('[').and_then(|a| a.strip_suffix(']')) {
        let (start, end) = range
            .split_once("..")
            .ok_or_else(|| format!("invalid range `{}`", addr))?;
        Ok(MifEntry::Range {
            start: parse_address(start)?,
            end: parse_address(end)?,
            value,
        })
    } else {
        Ok(MifEntry::Cell {
            address: parse_address(addr)?,
            value,
        })
    }
}

fn parse_address(s: &str) -> Result<Address, String> {
    let s = s.trim();
    // Prefixes are valid on the command line, not in a MIF file
    if s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("invalid address `{}`", s));
    }
    s.parse::<Address>().map_err(|e| format!("{} `{}`", e, s))
}
