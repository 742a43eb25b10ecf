//! Windows version resolution.
//!
//! The version an installation impersonates is not stored in one place. The
//! resolver tries, in order:
//!
//! 1. the version name in the user snapshot (`[Software\\Wine]` / `Version`),
//! 2. the NT `CurrentVersion` / `CurrentBuildNumber` / `ProductType` facts in
//!    the system snapshot, matched exactly, then by build, then by version,
//! 3. the 9x `VersionNumber` in the system snapshot, falling back to the
//!    configured default when it matches nothing.
//!
//! If none of these sources exists the version is undetermined.

use crate::config::ReaderConfig;
use crate::error::{RegistryError, Result};
use crate::file::RegistryFile;
use crate::version::{find_by_token, match_9x, match_nt, NtTier, WindowsVersion};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Key holding the version name chosen in the user snapshot.
pub const USER_WINE_KEY: &str = r"[Software\\Wine]";

/// Key holding NT version facts in the system snapshot.
pub const NT_CURRENT_VERSION_KEY: &str = r"[Software\\Microsoft\\Windows NT\\CurrentVersion]";

/// Key holding 9x version facts in the system snapshot.
pub const WIN9X_CURRENT_VERSION_KEY: &str = r"[Software\\Microsoft\\Windows\\CurrentVersion]";

/// Product options key, checked first.
pub const PRODUCT_OPTIONS_KEY: &str = r"[System\\CurrentControlSet\\Control\\ProductOptions]";

/// Product options key used when the current control set has none.
pub const PRODUCT_OPTIONS_FALLBACK_KEY: &str = r"[System\\ControlSet001\\Control\\ProductOptions]";

/// Where a resolved version came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// The user snapshot named the version directly.
    UserVersion,
    /// NT facts matched a record at the given tier.
    Nt(NtTier),
    /// The 9x version number matched a record exactly.
    Win9x,
    /// The 9x version number matched nothing; the configured default was used.
    Win9xDefault,
}

/// A resolved Windows version and the evidence behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionMatch {
    /// Resolved version.
    pub version: WindowsVersion,
    /// Tier that produced it.
    pub source: ResolutionSource,
}

impl VersionMatch {
    fn new(version: WindowsVersion, source: ResolutionSource) -> Self {
        Self { version, source }
    }
}

/// Resolves the Windows version of the installation at `root`.
///
/// # Arguments
///
/// * `root` - Installation directory containing the user and system snapshots
/// * `config` - File names and the default version for the 9x branch
///
/// # Errors
///
/// Returns [`RegistryError::Io`] if a snapshot that has to be consulted cannot
/// be read, and [`RegistryError::WindowsVersionUndetermined`] if no tier
/// produced a version. The two are distinct so callers can apply a default on
/// the latter only.
///
/// # Examples
///
/// ```no_run
/// use bottle_reg::{resolve_windows_version, ReaderConfig};
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let found = resolve_windows_version(Path::new("/bottles/steam"), &ReaderConfig::default())?;
/// println!("{} via {:?}", found.version, found.source);
/// # Ok(())
/// # }
/// ```
#[instrument(skip(root, config), fields(root = %root.display()))]
pub fn resolve_windows_version(root: &Path, config: &ReaderConfig) -> Result<VersionMatch> {
    let user = RegistryFile::new(root.join(&config.user_file));
    let system = RegistryFile::new(root.join(&config.system_file));

    if let Some(found) = resolve_from_user(&user)? {
        info!(version = %found.version, "Resolved Windows version from user registry");
        return Ok(found);
    }

    if let Some(found) = resolve_from_system(&system, config)? {
        info!(version = %found.version, source = ?found.source, "Resolved Windows version from system registry");
        return Ok(found);
    }

    debug!("No version facts found in either snapshot");
    Err(RegistryError::undetermined(root))
}

/// Tier 1: the version name written in the user snapshot.
fn resolve_from_user(user: &RegistryFile) -> Result<Option<VersionMatch>> {
    let Some(name) = user.value(USER_WINE_KEY, "Version")? else {
        return Ok(None);
    };

    let found = find_by_token(&name).map(|r| VersionMatch::new(r.version, ResolutionSource::UserVersion));
    if found.is_none() {
        warn!(version = %name, "User registry names an unknown Windows version");
    }
    Ok(found)
}

/// Tiers 2 and 3: NT facts, then 9x facts, from the system snapshot.
fn resolve_from_system(system: &RegistryFile, config: &ReaderConfig) -> Result<Option<VersionMatch>> {
    let current = system
        .value(NT_CURRENT_VERSION_KEY, "CurrentVersion")?
        .filter(|v| !v.is_empty());
    if let Some(current) = current {
        let build = system
            .value(NT_CURRENT_VERSION_KEY, "CurrentBuildNumber")?
            .unwrap_or_default();
        let product = product_type(system)?;
        debug!(version = %current, build = %build, product = %product, "NT version facts");

        return Ok(match_nt(&current, &build, &product)
            .map(|(r, tier)| VersionMatch::new(r.version, ResolutionSource::Nt(tier))));
    }

    let Some(number) = system.value(WIN9X_CURRENT_VERSION_KEY, "VersionNumber")? else {
        return Ok(None);
    };
    debug!(version = %number, "9x version facts");

    Ok(Some(match match_9x(&number) {
        Some(r) => VersionMatch::new(r.version, ResolutionSource::Win9x),
        None => {
            warn!(version = %number, fallback = %config.default_version, "Unknown 9x version number, using default");
            VersionMatch::new(config.default_version, ResolutionSource::Win9xDefault)
        }
    }))
}

/// Reads the product type, preferring the current control set.
fn product_type(system: &RegistryFile) -> Result<String> {
    match system.value(PRODUCT_OPTIONS_KEY, "ProductType")? {
        Some(product) if !product.is_empty() => Ok(product),
        _ => Ok(system
            .value(PRODUCT_OPTIONS_FALLBACK_KEY, "ProductType")?
            .unwrap_or_default()),
    }
}
