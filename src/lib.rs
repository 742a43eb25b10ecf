//! # Registry Snapshot Reader
//!
//! Reads the text registry snapshots of Wine-style compatibility-layer
//! installations ("bottles") and extracts typed configuration facts from them.
//!
//! ## Features
//!
//! - **Stateless**: every query re-reads the file; nothing is cached, so any
//!   thread can query any installation without coordination
//! - **Exact escape decoding**: hex and octal escapes go through the extended
//!   (up to 6 byte) UTF-8 encoder used by the files' writer
//! - **Version resolution**: multi-tier matching of registry facts against a
//!   fixed table of Windows versions
//! - **Typed accessors**: bitness, audio driver, virtual desktop, DLL overrides,
//!   uninstall entries, fonts and menu shortcuts
//!
//! ## Architecture
//!
//! Queries flow one way through four layers:
//!
//! 1. **Escape decoder** ([`escape`]): turns one escaped value into text
//! 2. **Section locator** ([`section`]): finds the lines under a key path
//! 3. **Key/value extractor** ([`RegistryFile`]): values, pairs, meta attributes
//! 4. **Resolver and accessors** ([`resolve_windows_version`], [`Installation`])
//!
//! ## File Layout
//!
//! ```text
//! WINE REGISTRY Version 2
//! #arch=win64                               meta attribute, file-wide
//!
//! [Software\\Wine\\Drivers] 1700000000      section header (+ timestamp)
//! #time=1da1b6c3a8e4f20                     comment
//! "Audio"="alsa"                            name/data pair
//!                                           blank line closes the section
//! ```
//!
//! ## Examples
//!
//! ### Basic Usage
//!
//! ```no_run
//! use bottle_reg::Installation;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bottle = Installation::new("/home/user/.local/share/bottles/bottles/steam");
//!
//! println!("Bitness: {:?}", bottle.bitness()?);
//! println!("Audio: {}", bottle.audio_driver()?);
//! println!("Windows: {}", bottle.windows_version_or_default()?);
//!
//! if let Some(resolution) = bottle.virtual_desktop_resolution()? {
//!     println!("Virtual desktop: {}", resolution);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Raw Queries
//!
//! ```no_run
//! use bottle_reg::RegistryFile;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let user = RegistryFile::new("/bottles/steam/user.reg");
//!
//! for pair in user.name_data_pairs(r"[Software\\Wine\\DllOverrides]", None, Some("builtin"))? {
//!     println!("{} = {}", pair.name, pair.data);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod escape;
pub mod file;
pub mod installation;
pub mod resolver;
pub mod section;
pub mod utils;
pub mod value;
pub mod version;

// Python bindings (only compiled when python feature is enabled)
#[cfg(feature = "python")]
pub mod python;

// Re-export main types for convenience
pub use config::ReaderConfig;
pub use error::{RegistryError, Result};
pub use escape::{unescape, unescape_bytes};
pub use file::{NameDataPair, RegistryFile};
pub use installation::{AudioDriver, Bitness, InstalledProgram, Installation};
pub use resolver::{resolve_windows_version, ResolutionSource, VersionMatch};
pub use section::locate_section;
pub use value::ValueData;
pub use version::{NtTier, WindowsVersion, WindowsVersionRecord, WINDOWS_VERSIONS};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
