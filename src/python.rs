//! Python bindings for the snapshot reader using PyO3.
//!
//! This module provides Python-friendly wrappers around the core Rust types.

use pyo3::exceptions::{PyIOError, PyLookupError, PyValueError};
use pyo3::prelude::*;

use crate::RegistryError;
use crate::{Installation as RustInstallation, RegistryFile as RustRegistryFile};

/// Convert Rust RegistryError to Python exception
fn registry_error_to_py(err: RegistryError) -> PyErr {
    match err {
        RegistryError::Io { .. } => PyIOError::new_err(err.to_string()),
        RegistryError::WindowsVersionUndetermined { .. } => PyLookupError::new_err(err.to_string()),
        RegistryError::UnrecognizedArchitecture(_)
        | RegistryError::MalformedValue { .. }
        | RegistryError::InvalidUtf16 { .. } => PyValueError::new_err(err.to_string()),
    }
}

/// Decode one escaped registry value
#[pyfunction]
#[pyo3(name = "unescape")]
fn py_unescape(value: &str) -> String {
    crate::unescape(value)
}

/// Python wrapper for RegistryFile
#[pyclass(name = "RegistryFile")]
#[derive(Clone)]
pub struct PyRegistryFile {
    inner: RustRegistryFile,
}

#[pymethods]
impl PyRegistryFile {
    #[new]
    fn new(path: &str) -> Self {
        PyRegistryFile {
            inner: RustRegistryFile::new(path),
        }
    }

    /// Get a decoded value, or None
    fn value(&self, key_path: &str, value_name: &str, py: Python) -> PyResult<Option<String>> {
        // Release GIL during file I/O
        py.allow_threads(|| self.inner.value(key_path, value_name))
            .map_err(registry_error_to_py)
    }

    /// Get the unescaped lines of a section
    fn subkey_lines(&self, key_path: &str, py: Python) -> PyResult<Vec<String>> {
        py.allow_threads(|| self.inner.subkey_lines(key_path))
            .map_err(registry_error_to_py)
    }

    /// Get (name, data) pairs of a section, optionally filtered
    #[pyo3(signature = (key_path, include=None, exclude=None))]
    fn name_data_pairs(
        &self,
        key_path: &str,
        include: Option<&str>,
        exclude: Option<&str>,
        py: Python,
    ) -> PyResult<Vec<(String, String)>> {
        let pairs = py
            .allow_threads(|| self.inner.name_data_pairs(key_path, include, exclude))
            .map_err(registry_error_to_py)?;

        Ok(pairs.into_iter().map(|p| (p.name, p.data)).collect())
    }

    /// Get a meta attribute, or None
    fn meta(&self, meta_name: &str, py: Python) -> PyResult<Option<String>> {
        py.allow_threads(|| self.inner.meta(meta_name))
            .map_err(registry_error_to_py)
    }

    fn __repr__(&self) -> String {
        format!("RegistryFile({:?})", self.inner.path().display().to_string())
    }
}

/// Python wrapper for Installation
#[pyclass(name = "Installation")]
pub struct PyInstallation {
    inner: RustInstallation,
}

#[pymethods]
impl PyInstallation {
    #[new]
    fn new(root: &str) -> Self {
        PyInstallation {
            inner: RustInstallation::new(root),
        }
    }

    /// Processor width in bits (32 or 64)
    fn bitness(&self, py: Python) -> PyResult<u32> {
        py.allow_threads(|| self.inner.bitness())
            .map(|b| b.bits())
            .map_err(registry_error_to_py)
    }

    /// Configured audio driver name
    fn audio_driver(&self, py: Python) -> PyResult<String> {
        py.allow_threads(|| self.inner.audio_driver())
            .map(|d| d.as_str().to_string())
            .map_err(registry_error_to_py)
    }

    /// Virtual desktop resolution, or None when disabled
    fn virtual_desktop(&self, py: Python) -> PyResult<Option<String>> {
        py.allow_threads(|| self.inner.virtual_desktop_resolution())
            .map_err(registry_error_to_py)
    }

    /// Check a DLL load-order override
    fn dll_override_matches(&self, dll: &str, load_order: &str, py: Python) -> PyResult<bool> {
        py.allow_threads(|| self.inner.dll_override_matches(dll, load_order))
            .map_err(registry_error_to_py)
    }

    /// Resolved Windows version identifier
    fn windows_version(&self, py: Python) -> PyResult<String> {
        py.allow_threads(|| self.inner.windows_version())
            .map(|found| found.version.as_str().to_string())
            .map_err(registry_error_to_py)
    }

    fn __repr__(&self) -> String {
        format!("Installation({:?})", self.inner.root().display().to_string())
    }
}

/// Python module definition
#[pymodule]
fn bottle_reg(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_unescape, m)?)?;
    m.add_class::<PyRegistryFile>()?;
    m.add_class::<PyInstallation>()?;

    // Add version constant
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
