//! Key/value queries against a single snapshot file.
//!
//! [`RegistryFile`] is only a path. Every query reads the file from disk,
//! answers from that one read, and drops it; no parsed state survives between
//! calls, so a `RegistryFile` can be shared freely across threads and always
//! reflects the file's current contents.

use crate::error::Result;
use crate::escape::unescape;
use crate::section::{self, read_file_text, section_lines};
use crate::utils::strip_quotes;
use crate::value::ValueData;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// A `"name"="data"` pair read from a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameDataPair {
    /// Value name.
    pub name: String,
    /// Unescaped value data.
    pub data: String,
}

/// A registry snapshot file identified by its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryFile {
    path: PathBuf,
}

/// Pattern that introduces the unnamed default value of a key.
const DEFAULT_VALUE_PATTERN: &str = "@=";

impl RegistryFile {
    /// Creates a handle for the snapshot at `path`. The file is not opened.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Returns the snapshot path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the raw lines of the first section matching `key_path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub fn section(&self, key_path: &str) -> Result<Vec<String>> {
        section::locate_section(&self.path, key_path)
    }

    /// Returns the undecoded data text of a value, exactly as written after `"name"=`.
    pub fn raw_value(&self, key_path: &str, value_name: &str) -> Result<Option<String>> {
        self.raw_data_after(key_path, &format!("\"{}\"=", value_name))
    }

    /// Returns the decoded unnamed default value (`@=`) of `key_path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub fn default_value(&self, key_path: &str) -> Result<Option<String>> {
        Ok(self
            .raw_data_after(key_path, DEFAULT_VALUE_PATTERN)?
            .map(|raw| unescape(strip_quotes(&raw))))
    }

    /// Returns the text after `pattern` on the first section line containing it.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn raw_data_after(&self, key_path: &str, pattern: &str) -> Result<Option<String>> {
        let text = read_file_text(&self.path)?;

        let raw = section_lines(&text, key_path).into_iter().find_map(|line| {
            line.find(pattern)
                .map(|pos| line[pos + pattern.len()..].to_string())
        });

        if raw.is_none() {
            debug!("Value not present");
        }
        Ok(raw)
    }

    /// Returns the decoded value stored under `key_path` / `value_name`.
    ///
    /// One pair of surrounding quotes is stripped and escapes are decoded.
    /// Non-string data (`dword:`, `hex:`) is returned as written; see
    /// [`typed_value`](Self::typed_value) for parsed data.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bottle_reg::RegistryFile;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let user = RegistryFile::new("/bottles/steam/user.reg");
    /// if let Some(driver) = user.value(r"[Software\\Wine\\Drivers]", "Audio")? {
    ///     println!("audio driver: {}", driver);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read. A missing key or value
    /// is `Ok(None)`.
    pub fn value(&self, key_path: &str, value_name: &str) -> Result<Option<String>> {
        Ok(self
            .raw_value(key_path, value_name)?
            .map(|raw| unescape(strip_quotes(&raw))))
    }

    /// Returns the value under `key_path` / `value_name` parsed into [`ValueData`].
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a malformed value
    /// error if the data cannot be parsed.
    pub fn typed_value(&self, key_path: &str, value_name: &str) -> Result<Option<ValueData>> {
        self.raw_value(key_path, value_name)?
            .map(|raw| ValueData::parse(&raw, key_path, value_name))
            .transpose()
    }

    /// Returns every non-comment line of the section, unescaped as a whole line.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn subkey_lines(&self, key_path: &str) -> Result<Vec<String>> {
        let text = read_file_text(&self.path)?;
        Ok(section_lines(&text, key_path)
            .into_iter()
            .map(unescape)
            .collect())
    }

    /// Returns the name/data pairs of a section.
    ///
    /// Each line is unescaped and split on `"`; field 1 is the name and field 3
    /// the data. Lines with fewer than five fields are skipped. Filters match
    /// against the whole unescaped line: a line is kept only if it contains
    /// `include` (when given and non-empty) and does not contain `exclude`
    /// (when given and non-empty).
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn name_data_pairs(
        &self,
        key_path: &str,
        include: Option<&str>,
        exclude: Option<&str>,
    ) -> Result<Vec<NameDataPair>> {
        let include = include.filter(|s| !s.is_empty());
        let exclude = exclude.filter(|s| !s.is_empty());

        let mut pairs = Vec::new();
        for line in self.subkey_lines(key_path)? {
            if include.is_some_and(|inc| !line.contains(inc)) {
                continue;
            }
            if exclude.is_some_and(|exc| line.contains(exc)) {
                continue;
            }

            let fields: Vec<&str> = line.split('"').collect();
            if fields.len() < 5 {
                warn!(line = %line, "Skipping line that is not a name/data pair");
                continue;
            }

            pairs.push(NameDataPair {
                name: fields[1].replace('"', ""),
                data: fields[3].replace('"', ""),
            });
        }

        debug!(pairs = pairs.len(), "Collected name/data pairs");
        Ok(pairs)
    }

    /// Returns the first `#name=value` meta attribute anywhere in the file.
    ///
    /// Meta values are returned with one pair of surrounding quotes stripped
    /// and without escape decoding.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn meta(&self, meta_name: &str) -> Result<Option<String>> {
        let text = read_file_text(&self.path)?;
        let pattern = format!("#{}=", meta_name);

        Ok(text.lines().find_map(|line| {
            line.find(&pattern)
                .map(|pos| strip_quotes(line[pos + pattern.len()..].trim_end()).to_string())
        }))
    }

    /// Lists key paths whose header starts with `prefix`, brackets included.
    ///
    /// `[Software\\Microsoft\\Windows\\CurrentVersion\\Uninstall\\` lists every
    /// uninstall entry, e.g. `[Software\\...\\Uninstall\\{GUID}]`.
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let text = read_file_text(&self.path)?;
        Ok(section::keys_with_prefix(&text, prefix))
    }

    /// Returns the last-written time recorded on the first header matching `key_path`.
    pub fn key_last_written(&self, key_path: &str) -> Result<Option<DateTime<Utc>>> {
        let text = read_file_text(&self.path)?;
        Ok(section::find_header(&text, key_path).and_then(section::header_timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn snapshot(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const USER: &str = r#"WINE REGISTRY Version 2
;; All keys relative to \\User\\S-1-5-21-0-0-0-1000

#arch=win64

[Software\\Wine] 1700000000
#time=1da1b6c3a8e4f20
"Version"="win7"

[Software\\Wine\\Explorer] 1700000000
"Desktop"="Default"

[Software\\Wine\\Explorer\\Desktops] 1700000000
"Default"="1280x720"
"Other"="800x600"
@="unnamed"

[Software\\Wine\\Test] 1700000000
"Path"="C:\\Program Files\\App"
"Count"=dword:00000010
"Tab"="a\tb"
"#;

    #[test]
    fn test_value_decodes_and_strips_quotes() {
        let file = snapshot(USER);
        let reg = RegistryFile::new(file.path());
        assert_eq!(
            reg.value(r"[Software\\Wine\\Test]", "Path").unwrap().as_deref(),
            Some(r"C:\Program Files\App")
        );
        assert_eq!(
            reg.value(r"[Software\\Wine\\Test]", "Tab").unwrap().as_deref(),
            Some("a\tb")
        );
        assert_eq!(
            reg.value(r"[Software\\Wine\\Test]", "Count").unwrap().as_deref(),
            Some("dword:00000010")
        );
    }

    #[test]
    fn test_value_key_prefix_does_not_leak() {
        let file = snapshot(USER);
        let reg = RegistryFile::new(file.path());
        // "[Software\\Wine]" must not match the Explorer subkeys
        assert_eq!(reg.value(r"[Software\\Wine]", "Desktop").unwrap(), None);
        assert_eq!(reg.value(r"[Software\\Wine]", "Version").unwrap().as_deref(), Some("win7"));
    }

    #[test]
    fn test_default_value() {
        let file = snapshot(USER);
        let reg = RegistryFile::new(file.path());
        let key = r"[Software\\Wine\\Explorer\\Desktops]";
        assert_eq!(reg.default_value(key).unwrap().as_deref(), Some("unnamed"));
        assert_eq!(reg.value(key, "@").unwrap(), None);
        assert_eq!(reg.default_value(r"[Software\\Wine]").unwrap(), None);
    }

    #[test]
    fn test_value_named_at_is_not_the_default_value() {
        let file = snapshot("[K] 1\n\"@\"=\"literal-at\"\n@=\"default\"\n");
        let reg = RegistryFile::new(file.path());
        assert_eq!(reg.value("[K]", "@").unwrap().as_deref(), Some("literal-at"));
        assert_eq!(reg.default_value("[K]").unwrap().as_deref(), Some("default"));
    }

    #[test]
    fn test_typed_value() {
        let file = snapshot(USER);
        let reg = RegistryFile::new(file.path());
        assert_eq!(
            reg.typed_value(r"[Software\\Wine\\Test]", "Count").unwrap(),
            Some(ValueData::Dword(16))
        );
        assert_eq!(reg.typed_value(r"[Software\\Wine\\Test]", "Missing").unwrap(), None);
    }

    #[test]
    fn test_name_data_pairs_and_filters() {
        let file = snapshot(USER);
        let reg = RegistryFile::new(file.path());
        let key = r"[Software\\Wine\\Explorer\\Desktops]";

        let all = reg.name_data_pairs(key, None, None).unwrap();
        assert_eq!(all.len(), 2, "the @= line has too few fields");
        assert_eq!(all[0], NameDataPair { name: "Default".into(), data: "1280x720".into() });

        let only = reg.name_data_pairs(key, Some("800"), None).unwrap();
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].name, "Other");

        let without = reg.name_data_pairs(key, Some(""), Some("Other")).unwrap();
        assert_eq!(without.len(), 1);
        assert_eq!(without[0].name, "Default");
    }

    const ESCAPED: &str = r#"[K] 1700000000
"Tab"="a\tb\x41"
"Quote"="say \"hi\" now"
"#;

    #[test]
    fn test_subkey_lines_unescape_whole_line() {
        let file = snapshot(ESCAPED);
        let reg = RegistryFile::new(file.path());
        assert_eq!(
            reg.subkey_lines("[K]").unwrap(),
            vec![
                "\"Tab\"=\"a\tbA\"".to_string(),
                "\"Quote\"=\"say \"hi\" now\"".to_string(),
            ]
        );
    }

    #[test]
    fn test_name_data_pairs_split_after_unescaping() {
        let file = snapshot(ESCAPED);
        let reg = RegistryFile::new(file.path());
        let pairs = reg.name_data_pairs("[K]", None, None).unwrap();

        assert_eq!(pairs[0], NameDataPair { name: "Tab".into(), data: "a\tbA".into() });
        // An escaped quote becomes a field separator once decoded
        assert_eq!(pairs[1], NameDataPair { name: "Quote".into(), data: "say ".into() });
    }

    #[test]
    fn test_meta() {
        let file = snapshot(USER);
        let reg = RegistryFile::new(file.path());
        assert_eq!(reg.meta("arch").unwrap().as_deref(), Some("win64"));
        assert_eq!(reg.meta("nonexistent").unwrap(), None);
    }

    #[test]
    fn test_keys_and_timestamps() {
        let file = snapshot(USER);
        let reg = RegistryFile::new(file.path());
        let keys = reg.keys_with_prefix(r"[Software\\Wine\\Explorer").unwrap();
        assert_eq!(
            keys,
            vec![
                r"[Software\\Wine\\Explorer]".to_string(),
                r"[Software\\Wine\\Explorer\\Desktops]".to_string()
            ]
        );
        let ts = reg.key_last_written(r"[Software\\Wine]").unwrap().unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let reg = RegistryFile::new("/definitely/not/here/user.reg");
        assert!(reg.value("[A]", "B").unwrap_err().is_io());
        assert!(reg.meta("arch").unwrap_err().is_io());
        assert!(reg.subkey_lines("[A]").unwrap_err().is_io());
        assert!(reg.name_data_pairs("[A]", None, None).unwrap_err().is_io());
    }
}
