//! A library for building and inspecting multi-resolution ICO files.
//!
//! ICO files consist of a 6-byte header, a directory of 16-byte entries, and
//! the raw payload of each entry (a PNG stream or a headerless DIB).
//!
//! # Examples
//!
//! ## Building an icon from one source image
//!
//! ```no_run
//! let source = image::open("logo.png").unwrap();
//! let encoder = icomaker::IconEncoder::new();
//! encoder.encode_to_path(&source, &[256, 48, 32, 16], "logo.ico").unwrap();
//! ```
//!
//! ## Inspecting an existing icon
//!
//! ```no_run
//! let bytes = std::fs::read("logo.ico").unwrap();
//! let container = icomaker::IconContainer::decode(&bytes).unwrap();
//! for entry in container.entries() {
//!     println!("{}x{}", entry.width(), entry.height());
//! }
//! for problem in container.rejected() {
//!     println!("skipped: {}", problem);
//! }
//! ```

#![warn(missing_docs)]

#[macro_use]
mod macros;

mod bmpdepth;
mod codec;
mod config;
mod container;
mod error;
mod payload;
mod restype;

pub use crate::codec::{decode, select_resolutions, IconEncoder};
pub use crate::config::{
    Config, ResizeFilter, DEFAULT_MIN_SOURCE_SIZE, DEFAULT_RESOLUTIONS,
};
pub use crate::container::{
    ContainerHeader, DirectoryEntry, IconContainer, IconEntry,
    DIRECTORY_ENTRY_LEN, HEADER_LEN,
};
pub use crate::error::{Error, Result};
pub use crate::restype::ResourceType;

//===========================================================================//
