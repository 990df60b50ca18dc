//! `.mclib` interchange documents.
//!
//! A document is YAML with a small header followed by the whole drawing:
//!
//! ```yaml
//! format: mclib
//! version: 1
//! drawing:
//!   version: 9.6.2
//!   layers:
//!   - number: 1
//!     name: Top
//!     ...
//!   design:
//!     type: library
//!     symbols: [...]
//! ```
//!
//! Variant records (graphics, segment items, signal items, the design
//! payload) carry a `type` tag so they can be rebuilt without a schema.
//! Derived values such as a pad's fallback diameter are never written.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::drawing::Drawing;
use super::error::{EagleError, EagleResult};

/// Value of the `format` header field.
pub const FORMAT: &str = "mclib";

/// Newest document version this crate reads and the version it writes.
pub const VERSION: u32 = 1;

/// Default file extension (without the dot).
pub const EXTENSION: &str = "mclib";

/// Write settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Rename an existing target to a timestamped `.bak` before writing.
    pub backup_existing: bool,
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    format: &'a str,
    version: u32,
    drawing: &'a Drawing,
}

#[derive(Deserialize)]
struct Header {
    format: String,
    version: u32,
}

#[derive(Deserialize)]
struct Document {
    drawing: Drawing,
}

/// Encodes a drawing as an interchange document.
///
/// # Errors
///
/// Returns [`EagleError::Yaml`] if encoding fails.
pub fn to_yaml(drawing: &Drawing) -> EagleResult<String> {
    let doc = DocumentRef {
        format: FORMAT,
        version: VERSION,
        drawing,
    };
    Ok(serde_yaml::to_string(&doc)?)
}

/// Decodes an interchange document.
///
/// # Errors
///
/// Returns [`EagleError::UnsupportedDocument`] for a foreign or newer
/// document, [`EagleError::Yaml`] if the content does not decode, or
/// [`EagleError::InvalidAttribute`] for a pin that is not at 0, 90, 180 or
/// 270 degrees.
pub fn from_yaml(text: &str) -> EagleResult<Drawing> {
    let header: Header = serde_yaml::from_str(text)?;
    if header.format != FORMAT {
        return Err(EagleError::unsupported_document(format!(
            "format is '{}', expected '{FORMAT}'",
            header.format
        )));
    }
    if header.version > VERSION {
        return Err(EagleError::unsupported_document(format!(
            "version {} is newer than supported version {VERSION}",
            header.version
        )));
    }

    let mut drawing = serde_yaml::from_str::<Document>(text)?.drawing;
    check_pins(&drawing)?;
    drawing.seed_default_layers();
    Ok(drawing)
}

/// Rejects pins whose rotation is not a multiple of 90 degrees.
fn check_pins(drawing: &Drawing) -> EagleResult<()> {
    let bad = drawing
        .libraries()
        .into_iter()
        .flat_map(|lib| lib.symbols())
        .flat_map(|symbol| symbol.pins())
        .find(|pin| !pin.rot.is_orthogonal());
    match bad {
        Some(pin) => Err(EagleError::invalid_attribute("pin", "rot", pin.rot.code())),
        None => Ok(()),
    }
}

/// Reads an interchange document from disk.
///
/// # Errors
///
/// Returns [`EagleError::FileRead`] if the file cannot be read, plus
/// everything [`from_yaml`] can return.
pub fn load(path: &Path) -> EagleResult<Drawing> {
    let text = std::fs::read_to_string(path).map_err(|e| EagleError::file_read(path, e))?;
    let drawing = from_yaml(&text)?;

    tracing::info!(
        path = %path.display(),
        kind = drawing.kind().as_str(),
        "Read mclib"
    );

    Ok(drawing)
}

/// Writes a drawing as an interchange document.
///
/// Returns the backup path when an existing file was moved aside.
///
/// # Errors
///
/// Returns [`EagleError::FileWrite`] if the backup or the write fails, or
/// [`EagleError::Yaml`] if encoding fails.
pub fn save(
    drawing: &Drawing,
    path: &Path,
    options: &ExportOptions,
) -> EagleResult<Option<PathBuf>> {
    let yaml = to_yaml(drawing)?;

    let backup = if options.backup_existing && path.exists() {
        let backup = backup_path(path);
        std::fs::rename(path, &backup).map_err(|e| EagleError::file_write(&backup, e))?;
        tracing::debug!(from = %path.display(), to = %backup.display(), "Backed up existing file");
        Some(backup)
    } else {
        None
    };

    std::fs::write(path, &yaml).map_err(|e| EagleError::file_write(path, e))?;

    tracing::info!(
        path = %path.display(),
        bytes = yaml.len(),
        "Wrote mclib"
    );

    Ok(backup)
}

/// `<file name>.<YYYYmmdd-HHMMSS>.bak` next to `path`.
fn backup_path(path: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{name}.{stamp}.bak"))
}

/// Target path for converting `input`: same stem, `extension`, placed in
/// `output_dir` or next to the input.
#[must_use]
pub fn output_path(input: &Path, output_dir: Option<&Path>, extension: &str) -> PathBuf {
    let converted = input.with_extension(extension);
    match (output_dir, converted.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => converted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eagle::enums::PadShape;
    use crate::eagle::library::{DeviceSet, Gate, Package, Symbol};
    use crate::eagle::primitives::{Graphic, PadThd, Pin, Wire};
    use crate::eagle::rotation::Rotation;

    fn sample() -> Drawing {
        let mut drawing = Drawing::new_library();
        let mut editor = drawing.library_editor().unwrap();

        let mut symbol = Symbol::new("RES");
        let mut pin = Pin::new("1", -5.08, 0.0);
        pin.rot = Rotation::degrees(180.0);
        symbol.add(Graphic::Pin(pin));
        symbol.add(Graphic::Wire(Wire::new(0.0, 0.0, 1.0, 0.0, 0.254, 94)));
        editor.add_symbol(symbol);

        let mut package = Package::new("0207");
        let mut pad = PadThd::new("1", 0.0, 0.0, 0.8);
        pad.shape = PadShape::Octagon;
        package.add(Graphic::Pad(pad));
        editor.add_package(package);

        let mut set = DeviceSet::new("R", "R");
        set.gates.push(Gate::new("G$1", "RES", 0.0, 0.0));
        editor.add_device_set(set);
        editor.set_description("Resistors");
        drawing
    }

    #[test]
    fn document_roundtrip() {
        let drawing = sample();
        let yaml = to_yaml(&drawing).unwrap();
        assert!(yaml.starts_with("format: mclib\nversion: 1\n"));
        assert!(yaml.contains("type: library"));
        assert!(yaml.contains("type: pin"));
        assert!(!yaml.contains("derived"));

        let back = from_yaml(&yaml).unwrap();
        assert_eq!(back, drawing);
    }

    #[test]
    fn rejects_foreign_and_newer_documents() {
        let err = from_yaml("format: other\nversion: 1\ndrawing: {}\n").unwrap_err();
        assert!(matches!(err, EagleError::UnsupportedDocument { .. }));

        let err = from_yaml("format: mclib\nversion: 99\ndrawing: {}\n").unwrap_err();
        assert!(err.to_string().contains("newer"));

        let err = from_yaml("format: mclib\nversion: 1\n").unwrap_err();
        assert!(matches!(err, EagleError::Yaml { .. }));
    }

    #[test]
    fn save_with_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.mclib");
        let options = ExportOptions {
            backup_existing: true,
        };

        assert!(save(&sample(), &path, &options).unwrap().is_none());
        let backup = save(&sample(), &path, &options).unwrap().unwrap();
        assert!(backup.exists());
        assert!(backup
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("lib.mclib."));
        assert_eq!(load(&path).unwrap(), sample());
    }

    #[test]
    fn output_path_placement() {
        let input = Path::new("/data/rcl.lbr");
        assert_eq!(
            output_path(input, None, EXTENSION),
            PathBuf::from("/data/rcl.mclib")
        );
        assert_eq!(
            output_path(input, Some(Path::new("/out")), "yaml"),
            PathBuf::from("/out/rcl.yaml")
        );
    }
}
