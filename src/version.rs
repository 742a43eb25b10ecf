//! Windows version identifiers and the fixed reference table.
//!
//! Every version the compatibility layer can impersonate is described by one
//! [`WindowsVersionRecord`]. The table is ordered newest first; all matching
//! functions return the first qualifying record in that order, so when two
//! records share a version/build pair (server and workstation editions) the
//! newer or server edition wins unless a product type disambiguates.

use std::fmt;
use std::str::FromStr;

/// Canonical Windows version identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WindowsVersion {
    /// Windows 11.
    Win11,
    /// Windows 10.
    Win10,
    /// Windows 8.1.
    Win81,
    /// Windows 8.
    Win8,
    /// Windows Server 2008 R2.
    Win2008R2,
    /// Windows 7.
    Win7,
    /// Windows Server 2008.
    Win2008,
    /// Windows Vista.
    Vista,
    /// Windows Server 2003.
    Win2003,
    /// Windows XP x64.
    WinXp64,
    /// Windows XP.
    WinXp,
    /// Windows 2000.
    Win2k,
    /// Windows NT 4.0.
    Nt40,
    /// Windows NT 3.51.
    Nt351,
    /// Windows ME.
    WinMe,
    /// Windows 98.
    Win98,
    /// Windows 95.
    Win95,
    /// Windows 3.1.
    Win31,
    /// Windows 3.0.
    Win30,
    /// Windows 2.0.
    Win20,
}

impl WindowsVersion {
    /// Returns the canonical identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowsVersion::Win11 => "win11",
            WindowsVersion::Win10 => "win10",
            WindowsVersion::Win81 => "win81",
            WindowsVersion::Win8 => "win8",
            WindowsVersion::Win2008R2 => "win2008r2",
            WindowsVersion::Win7 => "win7",
            WindowsVersion::Win2008 => "win2008",
            WindowsVersion::Vista => "vista",
            WindowsVersion::Win2003 => "win2003",
            WindowsVersion::WinXp64 => "winxp64",
            WindowsVersion::WinXp => "winxp",
            WindowsVersion::Win2k => "win2k",
            WindowsVersion::Nt40 => "nt40",
            WindowsVersion::Nt351 => "nt351",
            WindowsVersion::WinMe => "winme",
            WindowsVersion::Win98 => "win98",
            WindowsVersion::Win95 => "win95",
            WindowsVersion::Win31 => "win31",
            WindowsVersion::Win30 => "win30",
            WindowsVersion::Win20 => "win20",
        }
    }

    /// Returns the reference record for this version.
    pub fn record(&self) -> &'static WindowsVersionRecord {
        WINDOWS_VERSIONS
            .iter()
            .find(|r| r.version == *self)
            .unwrap_or(&WINDOWS_VERSIONS[0])
    }
}

impl fmt::Display for WindowsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown version identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownWindowsVersion(pub String);

impl fmt::Display for UnknownWindowsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown Windows version: {:?}", self.0)
    }
}

impl std::error::Error for UnknownWindowsVersion {}

impl FromStr for WindowsVersion {
    type Err = UnknownWindowsVersion;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        WINDOWS_VERSIONS
            .iter()
            .find(|r| r.version.as_str() == s)
            .map(|r| r.version)
            .ok_or_else(|| UnknownWindowsVersion(s.to_string()))
    }
}

/// One entry of the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowsVersionRecord {
    /// Canonical identifier.
    pub version: WindowsVersion,
    /// Name used by the component installer helper for this version.
    pub token: &'static str,
    /// `major.minor` version number as stored in the registry.
    pub version_number: &'static str,
    /// Build number as stored in the registry.
    pub build_number: &'static str,
    /// `WinNT`, `ServerNT`, or empty for the 9x family.
    pub product_type: &'static str,
}

/// Builds a table entry.
const fn entry(
    version: WindowsVersion,
    token: &'static str,
    version_number: &'static str,
    build_number: &'static str,
    product_type: &'static str,
) -> WindowsVersionRecord {
    WindowsVersionRecord {
        version,
        token,
        version_number,
        build_number,
        product_type,
    }
}

/// Reference table, newest first.
pub static WINDOWS_VERSIONS: &[WindowsVersionRecord] = &[
    entry(WindowsVersion::Win11, "win11", "10.0", "22000", "WinNT"),
    entry(WindowsVersion::Win10, "win10", "10.0", "19043", "WinNT"),
    entry(WindowsVersion::Win81, "win81", "6.3", "9600", "WinNT"),
    entry(WindowsVersion::Win8, "win8", "6.2", "9200", "WinNT"),
    entry(WindowsVersion::Win2008R2, "win2008r2", "6.1", "7601", "ServerNT"),
    entry(WindowsVersion::Win7, "win7", "6.1", "7601", "WinNT"),
    entry(WindowsVersion::Win2008, "win2008", "6.0", "6002", "ServerNT"),
    entry(WindowsVersion::Vista, "vista", "6.0", "6002", "WinNT"),
    entry(WindowsVersion::Win2003, "win2003", "5.2", "3790", "ServerNT"),
    entry(WindowsVersion::WinXp64, "winxp64", "5.2", "3790", "WinNT"),
    entry(WindowsVersion::WinXp, "winxp", "5.1", "2600", "WinNT"),
    entry(WindowsVersion::Win2k, "win2k", "5.0", "2195", "WinNT"),
    entry(WindowsVersion::Nt40, "nt40", "4.0", "1381", "WinNT"),
    entry(WindowsVersion::Nt351, "nt351", "3.51", "1057", "WinNT"),
    entry(WindowsVersion::WinMe, "winme", "4.90", "3000", ""),
    entry(WindowsVersion::Win98, "win98", "4.10", "2222", ""),
    entry(WindowsVersion::Win95, "win95", "4.0", "950", ""),
    entry(WindowsVersion::Win31, "win31", "3.10", "0", ""),
    entry(WindowsVersion::Win30, "win30", "3.0", "0", ""),
    entry(WindowsVersion::Win20, "win20", "2.0", "0", ""),
];

/// Which NT matching tier produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NtTier {
    /// Version number and build number (and product type when known) all match.
    Exact,
    /// Only the build number (and product type when known) matches.
    Build,
    /// Only the version number (and product type when known) matches.
    Version,
}

/// Finds the record whose installer token equals `token` verbatim.
pub fn find_by_token(token: &str) -> Option<&'static WindowsVersionRecord> {
    WINDOWS_VERSIONS.iter().find(|r| r.token == token)
}

/// Matches NT-family registry facts against the table.
///
/// The three tiers run one after another over the whole table. An empty
/// `product_type` disables the product check in every tier.
pub fn match_nt(
    version_number: &str,
    build_number: &str,
    product_type: &str,
) -> Option<(&'static WindowsVersionRecord, NtTier)> {
    let product_ok =
        |r: &WindowsVersionRecord| product_type.is_empty() || r.product_type == product_type;

    [NtTier::Exact, NtTier::Build, NtTier::Version]
        .into_iter()
        .find_map(|tier| {
            WINDOWS_VERSIONS
                .iter()
                .find(|r| {
                    let fields = match tier {
                        NtTier::Exact => {
                            r.version_number == version_number && r.build_number == build_number
                        }
                        NtTier::Build => r.build_number == build_number,
                        NtTier::Version => r.version_number == version_number,
                    };
                    fields && product_ok(*r)
                })
                .map(|r| (r, tier))
        })
}

/// Matches a 9x-family `VersionNumber` such as `4.10.2222`.
///
/// The first two dot components form the version, the third the build. Fewer
/// than two components never match.
pub fn match_9x(version_number: &str) -> Option<&'static WindowsVersionRecord> {
    let parts: Vec<&str> = version_number.trim().split('.').collect();
    if parts.len() < 2 {
        return None;
    }

    let version = format!("{}.{}", parts[0], parts[1]);
    let build = parts.get(2).copied().unwrap_or_default();

    WINDOWS_VERSIONS
        .iter()
        .find(|r| r.version_number == version && r.build_number == build)
}
