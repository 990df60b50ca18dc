//! eagle-mclib: EAGLE-compatible CAD object model and `.mclib` exporter
//!
//! This library reads EAGLE XML libraries, schematics and boards into a typed
//! object graph and writes that graph as `.mclib` YAML interchange documents.
//!
//! # Architecture
//!
//! - **Import**: `.lbr`, `.sch` and `.brd` files are parsed into a [`eagle::Drawing`]
//! - **Object model**: libraries, sheets, boards, layers and design rules with
//!   name lookups and cross-reference resolution
//! - **Export**: the whole graph is written to and read back from `.mclib`
//!
//! # Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`eagle`]: Object model, import and export
//! - [`error`]: Configuration error types

pub mod config;
pub mod eagle;
pub mod error;
