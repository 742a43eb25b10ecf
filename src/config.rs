//! Reader configuration.
//!
//! The embedding application keeps these settings in its own configuration
//! file; with the `serde` feature enabled they can be stored alongside it.

use crate::version::WindowsVersion;

/// Default name of the per-user snapshot file.
pub const DEFAULT_USER_FILE: &str = "user.reg";

/// Default name of the machine-wide snapshot file.
pub const DEFAULT_SYSTEM_FILE: &str = "system.reg";

/// Settings for reading an installation's snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReaderConfig {
    /// File name of the user snapshot, relative to the installation root.
    pub user_file: String,
    /// File name of the system snapshot, relative to the installation root.
    pub system_file: String,
    /// Version reported when a 9x `VersionNumber` matches nothing, and the
    /// fallback for [`Installation::windows_version_or_default`].
    ///
    /// [`Installation::windows_version_or_default`]: crate::Installation::windows_version_or_default
    pub default_version: WindowsVersion,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            user_file: DEFAULT_USER_FILE.to_string(),
            system_file: DEFAULT_SYSTEM_FILE.to_string(),
            default_version: WindowsVersion::Win10,
        }
    }
}

impl ReaderConfig {
    /// Sets the user snapshot file name.
    pub fn with_user_file(mut self, name: impl Into<String>) -> Self {
        self.user_file = name.into();
        self
    }

    /// Sets the system snapshot file name.
    pub fn with_system_file(mut self, name: impl Into<String>) -> Self {
        self.system_file = name.into();
        self
    }

    /// Sets the default Windows version.
    pub fn with_default_version(mut self, version: WindowsVersion) -> Self {
        self.default_version = version;
        self
    }
}
