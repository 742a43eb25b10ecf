//! Typed accessors for one installation ("bottle").
//!
//! An installation is a directory holding a user snapshot and a system
//! snapshot. [`Installation`] stores only that directory and the reader
//! settings; each accessor is a single key/value query against one of the two
//! files plus a mapping onto a domain type.

use crate::config::ReaderConfig;
use crate::error::{RegistryError, Result};
use crate::file::{NameDataPair, RegistryFile};
use crate::resolver::{resolve_windows_version, VersionMatch};
use crate::version::WindowsVersion;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Meta attribute carrying the processor width.
pub const ARCH_META: &str = "arch";

/// Audio driver selection (user snapshot).
pub const DRIVERS_KEY: &str = r"[Software\\Wine\\Drivers]";

/// Virtual desktop switch (user snapshot).
pub const EXPLORER_KEY: &str = r"[Software\\Wine\\Explorer]";

/// Virtual desktop resolutions (user snapshot).
pub const DESKTOPS_KEY: &str = r"[Software\\Wine\\Explorer\\Desktops]";

/// DLL load-order overrides (user snapshot).
pub const DLL_OVERRIDES_KEY: &str = r"[Software\\Wine\\DllOverrides]";

/// Menu entries created for shortcuts (user snapshot).
pub const MENU_FILES_KEY: &str = r"[Software\\Wine\\MenuFiles]";

/// Prefix of uninstaller entries (system snapshot). The entry id and `]` follow.
pub const UNINSTALL_KEY_PREFIX: &str = r"[Software\\Microsoft\\Windows\\CurrentVersion\\Uninstall\\";

/// Registered fonts (system snapshot).
pub const FONTS_KEY: &str = r"[Software\\Microsoft\\Windows NT\\CurrentVersion\\Fonts]";

/// Processor width of an installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bitness {
    /// `#arch=win32`.
    Win32,
    /// `#arch=win64`.
    Win64,
}

impl Bitness {
    /// Returns the width in bits.
    pub fn bits(&self) -> u32 {
        match self {
            Bitness::Win32 => 32,
            Bitness::Win64 => 64,
        }
    }
}

/// Audio driver configured for an installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AudioDriver {
    /// PulseAudio, also used when nothing is configured.
    #[default]
    Pulse,
    /// ALSA.
    Alsa,
    /// OSS.
    Oss,
    /// CoreAudio.
    CoreAudio,
    /// Audio disabled.
    Disabled,
}

impl AudioDriver {
    /// Returns the name written in the registry.
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioDriver::Pulse => "pulse",
            AudioDriver::Alsa => "alsa",
            AudioDriver::Oss => "oss",
            AudioDriver::CoreAudio => "coreaudio",
            AudioDriver::Disabled => "disabled",
        }
    }

    /// Maps a registry value onto a driver. An empty value means disabled.
    fn from_registry(value: &str) -> Option<Self> {
        match value {
            "pulse" => Some(AudioDriver::Pulse),
            "alsa" => Some(AudioDriver::Alsa),
            "oss" => Some(AudioDriver::Oss),
            "coreaudio" => Some(AudioDriver::CoreAudio),
            "disabled" | "" => Some(AudioDriver::Disabled),
            _ => None,
        }
    }
}

impl fmt::Display for AudioDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entry under the uninstall key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledProgram {
    /// Uninstall entry id (the last key path component, e.g. a GUID).
    pub id: String,
    /// `DisplayName` of the entry, when set.
    pub display_name: Option<String>,
}

/// One installation and the settings used to read it.
#[derive(Debug, Clone)]
pub struct Installation {
    root: PathBuf,
    config: ReaderConfig,
}

impl Installation {
    /// Creates an installation handle with default settings.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self::with_config(root, ReaderConfig::default())
    }

    /// Creates an installation handle with explicit settings.
    pub fn with_config<P: Into<PathBuf>>(root: P, config: ReaderConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Returns the installation directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the reader settings.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Returns the user snapshot.
    pub fn user(&self) -> RegistryFile {
        RegistryFile::new(self.root.join(&self.config.user_file))
    }

    /// Returns the system snapshot.
    pub fn system(&self) -> RegistryFile {
        RegistryFile::new(self.root.join(&self.config.system_file))
    }

    /// Returns the processor width from the `arch` meta attribute.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnrecognizedArchitecture`] if the attribute is
    /// missing or is neither `win32` nor `win64`.
    pub fn bitness(&self) -> Result<Bitness> {
        let arch = self.system().meta(ARCH_META)?;
        match arch.as_deref() {
            Some("win32") => Ok(Bitness::Win32),
            Some("win64") => Ok(Bitness::Win64),
            other => Err(RegistryError::unrecognized_architecture(other)),
        }
    }

    /// Returns the configured audio driver, `pulse` when none is set.
    ///
    /// # Errors
    ///
    /// Returns a malformed value error for a driver name outside the known set.
    pub fn audio_driver(&self) -> Result<AudioDriver> {
        let Some(driver) = self.user().value(DRIVERS_KEY, "Audio")? else {
            return Ok(AudioDriver::default());
        };

        AudioDriver::from_registry(&driver)
            .ok_or_else(|| RegistryError::malformed(DRIVERS_KEY, "Audio", &driver, "an audio driver name"))
    }

    /// Returns true if a virtual desktop is configured.
    pub fn is_virtual_desktop_enabled(&self) -> Result<bool> {
        Ok(self
            .user()
            .value(EXPLORER_KEY, "Desktop")?
            .is_some_and(|desktop| !desktop.is_empty()))
    }

    /// Returns the virtual desktop resolution (e.g. `1280x720`), if one is enabled.
    pub fn virtual_desktop_resolution(&self) -> Result<Option<String>> {
        if !self.is_virtual_desktop_enabled()? {
            debug!("Virtual desktop disabled");
            return Ok(None);
        }
        self.user().value(DESKTOPS_KEY, "Default")
    }

    /// Returns the load-order override configured for `dll`, if any.
    pub fn dll_override(&self, dll: &str) -> Result<Option<String>> {
        self.user().value(DLL_OVERRIDES_KEY, dll)
    }

    /// Returns true if `dll` is overridden with exactly `load_order` (e.g. `native,builtin`).
    pub fn dll_override_matches(&self, dll: &str, load_order: &str) -> Result<bool> {
        Ok(self.dll_override(dll)?.as_deref() == Some(load_order))
    }

    /// Returns every configured DLL override.
    pub fn dll_overrides(&self) -> Result<Vec<NameDataPair>> {
        self.user().name_data_pairs(DLL_OVERRIDES_KEY, None, None)
    }

    /// Returns the display name registered by the uninstaller with id `id`.
    pub fn uninstaller_display_name(&self, id: &str) -> Result<Option<String>> {
        self.system()
            .value(&format!("{}{}]", UNINSTALL_KEY_PREFIX, id), "DisplayName")
    }

    /// Returns every uninstaller entry with its display name.
    pub fn installed_programs(&self) -> Result<Vec<InstalledProgram>> {
        let system = self.system();
        let mut programs = Vec::new();

        for key in system.keys_with_prefix(UNINSTALL_KEY_PREFIX)? {
            let id = key[UNINSTALL_KEY_PREFIX.len()..key.len() - 1].to_string();
            if id.is_empty() || id.contains(r"\\") {
                // Nested subkey of an entry, or the uninstall key itself
                continue;
            }
            let display_name = system.value(&key, "DisplayName")?;
            programs.push(InstalledProgram { id, display_name });
        }

        debug!(count = programs.len(), "Listed uninstall entries");
        Ok(programs)
    }

    /// Returns the file name registered for the font `font_name`.
    pub fn font_file(&self, font_name: &str) -> Result<Option<String>> {
        self.system().value(FONTS_KEY, font_name)
    }

    /// Returns the shortcut a generated menu entry points to.
    ///
    /// `menu_file` is the menu entry path exactly as written in the snapshot.
    pub fn shortcut_target(&self, menu_file: &str) -> Result<Option<String>> {
        self.user().value(MENU_FILES_KEY, menu_file)
    }

    /// Resolves the impersonated Windows version.
    ///
    /// # Errors
    ///
    /// See [`resolve_windows_version`].
    pub fn windows_version(&self) -> Result<VersionMatch> {
        resolve_windows_version(&self.root, &self.config)
    }

    /// Resolves the Windows version, using the configured default when undetermined.
    ///
    /// I/O errors are still returned.
    pub fn windows_version_or_default(&self) -> Result<WindowsVersion> {
        match self.windows_version() {
            Ok(found) => Ok(found.version),
            Err(e) if e.is_undetermined() => {
                warn!(fallback = %self.config.default_version, "Windows version undetermined, using default");
                Ok(self.config.default_version)
            }
            Err(e) => Err(e),
        }
    }
}
