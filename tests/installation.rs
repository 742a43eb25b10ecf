//! Integration tests for the installation accessors.

use bottle_reg::{
    AudioDriver, Bitness, InstalledProgram, Installation, ReaderConfig, RegistryError,
    WindowsVersion,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn test_data_path(bottle: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join(bottle)
}

fn bottle(user: &str, system: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("user.reg"), user).unwrap();
    fs::write(dir.path().join("system.reg"), system).unwrap();
    dir
}

#[test]
fn test_bitness() {
    assert_eq!(Installation::new(test_data_path("win7-64")).bitness().unwrap(), Bitness::Win64);
    assert_eq!(Installation::new(test_data_path("win98")).bitness().unwrap(), Bitness::Win32);
    assert_eq!(Bitness::Win64.bits(), 64);
}

#[test]
fn test_unrecognized_architecture_is_an_error() {
    let dir = bottle("", "WINE REGISTRY Version 2\n\n#arch=arm64\n");
    let err = Installation::new(dir.path()).bitness().unwrap_err();
    assert!(matches!(err, RegistryError::UnrecognizedArchitecture(ref a) if a == "arm64"));

    // Missing is just as fatal
    let dir = bottle("", "WINE REGISTRY Version 2\n");
    let err = Installation::new(dir.path()).bitness().unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn test_audio_driver() {
    assert_eq!(
        Installation::new(test_data_path("win7-64")).audio_driver().unwrap(),
        AudioDriver::Alsa
    );
    // Empty value means disabled
    assert_eq!(
        Installation::new(test_data_path("win98")).audio_driver().unwrap(),
        AudioDriver::Disabled
    );
}

#[test]
fn test_audio_driver_defaults_to_pulse() {
    let dir = bottle("WINE REGISTRY Version 2\n", "");
    assert_eq!(Installation::new(dir.path()).audio_driver().unwrap(), AudioDriver::Pulse);
}

#[test]
fn test_unknown_audio_driver_is_malformed() {
    let dir = bottle(
        "WINE REGISTRY Version 2\n\n[Software\\\\Wine\\\\Drivers] 1\n\"Audio\"=\"jack\"\n",
        "",
    );
    let err = Installation::new(dir.path()).audio_driver().unwrap_err();
    assert!(err.is_malformed());
}

#[test]
fn test_virtual_desktop() {
    let bottle7 = Installation::new(test_data_path("win7-64"));
    assert!(bottle7.is_virtual_desktop_enabled().unwrap());
    assert_eq!(bottle7.virtual_desktop_resolution().unwrap().as_deref(), Some("1280x720"));

    let bottle98 = Installation::new(test_data_path("win98"));
    assert!(!bottle98.is_virtual_desktop_enabled().unwrap());
    assert_eq!(bottle98.virtual_desktop_resolution().unwrap(), None);
}

#[test]
fn test_virtual_desktop_requires_explorer_switch() {
    // A resolution without the Desktop switch does not count
    let user = "WINE REGISTRY Version 2\n\n\
[Software\\\\Wine\\\\Explorer] 1\n\"Desktop\"=\"\"\n\n\
[Software\\\\Wine\\\\Explorer\\\\Desktops] 1\n\"Default\"=\"800x600\"\n";
    let dir = bottle(user, "");
    assert_eq!(Installation::new(dir.path()).virtual_desktop_resolution().unwrap(), None);
}

#[test]
fn test_dll_overrides() {
    let bottle = Installation::new(test_data_path("win7-64"));

    assert!(bottle.dll_override_matches("*d3d11", "native,builtin").unwrap());
    assert!(!bottle.dll_override_matches("*d3d11", "native").unwrap());
    assert!(bottle.dll_override_matches("mscoree", "").unwrap());
    assert!(!bottle.dll_override_matches("d3d9", "builtin").unwrap());

    assert_eq!(bottle.dll_override("*dxgi").unwrap().as_deref(), Some("native,builtin"));
    assert_eq!(bottle.dll_overrides().unwrap().len(), 4);
}

#[test]
fn test_uninstaller_and_programs() {
    let bottle = Installation::new(test_data_path("win7-64"));

    assert_eq!(bottle.uninstaller_display_name("Steam").unwrap().as_deref(), Some("Steam"));
    assert_eq!(bottle.uninstaller_display_name("Nope").unwrap(), None);

    let programs = bottle.installed_programs().unwrap();
    assert_eq!(
        programs,
        vec![
            InstalledProgram { id: "Steam".into(), display_name: Some("Steam".into()) },
            InstalledProgram {
                id: "{92FB6C44-E685-45AD-9B20-CADF4CABA132}".into(),
                display_name: Some("Microsoft .NET Framework 4.8 \u{2013} Caf\u{e9}".into()),
            },
            InstalledProgram { id: "WineGecko".into(), display_name: None },
        ]
    );
}

#[test]
fn test_font_file() {
    let bottle = Installation::new(test_data_path("win7-64"));
    assert_eq!(bottle.font_file("Tahoma (TrueType)").unwrap().as_deref(), Some("tahoma.ttf"));
    assert_eq!(bottle.font_file("Comic Sans MS (TrueType)").unwrap(), None);
}

#[test]
fn test_shortcut_target() {
    let bottle = Installation::new(test_data_path("win7-64"));
    let target = bottle
        .shortcut_target("/home/user/.local/share/applications/wine/Programs/Steam/Steam.desktop")
        .unwrap();
    assert_eq!(
        target.as_deref(),
        Some(r"C:\users\Public\Start Menu\Programs\Steam\Steam.lnk")
    );
}

#[test]
fn test_windows_version_or_default() {
    let bottle = Installation::new(test_data_path("win7-64"));
    assert_eq!(bottle.windows_version_or_default().unwrap(), WindowsVersion::Win7);

    let dir = bottle_without_facts();
    let config = ReaderConfig::default().with_default_version(WindowsVersion::Win81);
    let fresh = Installation::with_config(dir.path(), config);
    assert!(fresh.windows_version().unwrap_err().is_undetermined());
    assert_eq!(fresh.windows_version_or_default().unwrap(), WindowsVersion::Win81);
}

#[test]
fn test_io_errors_are_not_defaulted() {
    let dir = TempDir::new().unwrap();
    let missing = Installation::new(dir.path());

    assert!(missing.windows_version_or_default().unwrap_err().is_io());
    assert!(missing.bitness().unwrap_err().is_io());
    assert!(missing.audio_driver().unwrap_err().is_io());
    assert!(missing.installed_programs().unwrap_err().is_io());
}

fn bottle_without_facts() -> TempDir {
    bottle("WINE REGISTRY Version 2\n", "WINE REGISTRY Version 2\n")
}
