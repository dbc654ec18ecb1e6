use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::error::MifError;
use crate::image::{MifBuilder, MifImage};

/// Output path for a ROM: same directory and stem, `.mif` extension
pub fn output_path(input: &Path) -> PathBuf {
    input.with_extension("mif")
}

/// Reads a whole ROM or font file into memory
pub fn read_input(path: &Path) -> Result<Vec<u8>, MifError> {
    let data = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => MifError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => MifError::InputUnreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;
    debug!("read {} bytes from {}", data.len(), path.display());
    Ok(data)
}

/// Creates or truncates `path` and writes the image to it
pub fn write_mif(image: &MifImage, path: &Path) -> Result<(), MifError> {
    let unwritable = |source| MifError::OutputUnwritable {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(unwritable)?;
    let mut writer = BufWriter::new(file);
    image.write_to(&mut writer).map_err(unwritable)?;
    writer.flush().map_err(unwritable)?;

    debug!("wrote {} entries to {}", image.entries().len(), path.display());
    Ok(())
}

/// Reads `input`, lays it out with `builder` and writes the result to `output`.
///
/// The output file is only opened once the input was read and laid out, so a
/// bad input never leaves a truncated output behind.
pub fn convert_file(input: &Path, output: &Path, builder: MifBuilder) -> Result<MifImage, MifError> {
    let rom = read_input(input)?;
    let image = builder.with_rom(rom).build()?;
    write_mif(&image, output)?;
    info!("converted {} to {}", input.display(), output.display());
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::parse_mif;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("chip-8-mif-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_output_path() {
        assert_eq!(output_path(Path::new("pong.ch8")), PathBuf::from("pong.mif"));
        assert_eq!(output_path(Path::new("roms/pong.ch8")), PathBuf::from("roms/pong.mif"));
        assert_eq!(output_path(Path::new("pong")), PathBuf::from("pong.mif"));
        assert_eq!(output_path(Path::new("space.invaders.ch8")), PathBuf::from("space.invaders.mif"));
        assert_eq!(output_path(Path::new(".ch8")), PathBuf::from(".ch8.mif"));
    }

    #[test]
    fn test_missing_input() {
        let path = temp_path("does-not-exist.ch8");
        let err = read_input(&path).unwrap_err();
        assert!(matches!(err, MifError::InputNotFound { .. }));
        assert!(err.to_string().contains("does-not-exist.ch8"));
    }

    #[test]
    fn test_unreadable_input() {
        // Reading a directory fails with something other than NotFound
        let dir = std::env::temp_dir();
        let err = read_input(&dir).unwrap_err();
        assert!(matches!(err, MifError::InputUnreadable { .. }));
    }

    #[test]
    fn test_unwritable_output() {
        let image = MifBuilder::new().build().unwrap();
        let path = temp_path("missing-dir").join("out.mif");
        let err = write_mif(&image, &path).unwrap_err();
        assert!(matches!(err, MifError::OutputUnwritable { .. }));
    }

    #[test]
    fn test_convert_file() {
        let input = temp_path("convert.ch8");
        let output = output_path(&input);
        fs::write(&input, [0x00, 0xE0, 0xA2, 0x2A]).unwrap();
        // Existing output gets overwritten
        fs::write(&output, "stale").unwrap();

        let image = convert_file(&input, &output, MifBuilder::new()).unwrap();
        let text = fs::read_to_string(&output).unwrap();
        assert_eq!(text, image.to_string());
        assert!(text.contains("  200 : 00;\n  201 : E0;\n  202 : A2;\n  203 : 2A;\n  [204..FFF] : 00;\n"));
        assert_eq!(parse_mif(&text).unwrap(), image);

        fs::remove_file(&input).unwrap();
        fs::remove_file(&output).unwrap();
    }

    #[test]
    fn test_convert_overflow_writes_nothing() {
        let input = temp_path("overflow.ch8");
        let output = output_path(&input);
        fs::write(&input, vec![0u8; 4000]).unwrap();

        let err = convert_file(&input, &output, MifBuilder::new()).unwrap_err();
        assert!(matches!(err, MifError::AddressOverflow { rom_len: 4000, .. }));
        assert!(!output.exists());

        fs::remove_file(&input).unwrap();
    }
}
