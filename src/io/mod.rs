//! Data exchange: block sources and JSON files.

mod data;
mod source;

pub use data::{AssemblyData, BlockData, InterfaceData};
pub use source::{BlockSource, SourceBlock};

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::assembly::Assembly;
use crate::error::{IoError, Result};

/// Reads an assembly, with its interfaces, from a JSON file.
///
/// # Errors
///
/// Returns an `IoError` if the file cannot be read or parsed, or if its
/// content does not describe a valid assembly.
pub fn read_json(path: impl AsRef<Path>) -> Result<Assembly> {
    let path = path.as_ref();
    let file = File::open(path).map_err(IoError::from)?;
    let data: AssemblyData =
        serde_json::from_reader(BufReader::new(file)).map_err(IoError::from)?;
    debug!(
        path = %path.display(),
        blocks = data.blocks.len(),
        interfaces = data.interfaces.len(),
        "read assembly"
    );
    Assembly::from_data(&data)
}

/// Writes an assembly, with its interfaces, to a JSON file.
///
/// # Errors
///
/// Returns an `IoError` if the file cannot be created or written.
pub fn write_json(assembly: &Assembly, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path).map_err(IoError::from)?);
    serde_json::to_writer_pretty(&mut writer, &assembly.to_data()).map_err(IoError::from)?;
    writer.flush().map_err(IoError::from)?;
    debug!(path = %path.display(), "wrote assembly");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::assembly::Block;
    use crate::math::Point3;
    use crate::operations::{IdentifyInterfaces, InterfaceParams};
    use crate::RbeError;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("rbe-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn file_round_trip() {
        let mut assembly = Assembly::new();
        for z in [0.0, 1.0, 2.0] {
            let block =
                Block::from_box(Point3::new(0.0, 0.0, z), Point3::new(1.0, 1.0, z + 1.0)).unwrap();
            assembly.add_block(block);
        }
        IdentifyInterfaces::new(InterfaceParams::default())
            .execute(&mut assembly)
            .unwrap();

        let path = temp_path("round-trip");
        write_json(&assembly, &path).unwrap();
        let restored = read_json(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(restored.block_count(), 3);
        assert_eq!(restored.interface_count(), 2);
        assert_eq!(restored.to_data(), assembly.to_data());
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            read_json(temp_path("missing")),
            Err(RbeError::Io(IoError::File(_)))
        ));
    }

    #[test]
    fn malformed_json() {
        let path = temp_path("malformed");
        std::fs::write(&path, "{\"blocks\": [").unwrap();
        let result = read_json(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(RbeError::Io(IoError::Json(_)))));
    }
}
