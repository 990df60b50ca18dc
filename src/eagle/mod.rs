//! EAGLE-compatible design object model.
//!
//! Reads EAGLE XML libraries (`.lbr`), schematics (`.sch`) and boards
//! (`.brd`) into a typed graph, and writes the graph to the `.mclib` YAML
//! interchange format.
//!
//! # Example
//!
//! ```no_run
//! use eagle_mclib::eagle::{mclib, Drawing};
//!
//! let drawing = Drawing::open_library("rcl.lbr")?;
//! if let Some(lib) = drawing.library() {
//!     println!("{} device sets", lib.device_sets().len());
//! }
//! mclib::save(&drawing, "rcl.mclib".as_ref(), &mclib::ExportOptions::default())?;
//! # Ok::<(), eagle_mclib::eagle::EagleError>(())
//! ```

pub mod board;
pub mod cache;
pub mod design;
pub mod drawing;
pub mod enums;
mod error;
pub mod events;
pub mod layers;
pub mod library;
pub mod mclib;
pub mod primitives;
pub mod reader;
pub mod rotation;
pub mod schematic;
pub mod values;

pub use board::{Board, DesignRules, Element, Signal};
pub use cache::{DrawingCache, SharedDrawing};
pub use drawing::{Design, Drawing, FileKind, Grid, LibraryEditor};
pub use error::{EagleError, EagleResult, ErrorKind};
pub use events::{ChangeEvent, ChangeNotifier, FieldValue, ListenerId};
pub use layers::{LayerContext, LayerElement, LayerTable};
pub use library::{Device, DeviceSet, Gate, Library, Package, Package3d, Symbol};
pub use primitives::{Graphic, Layered, Named};
pub use reader::ReadOptions;
pub use rotation::Rotation;
pub use schematic::{Electrical, Net, Schematic, Sheet};
