//! Loader utilities for svghost-core.
//!
//! Responsibilities:
//! - Fetch the guest payload from its fixed location.
//! - Detect whether the payload is a `.wasm` binary or `.wat` text.
//! - If it looks like WAT, convert it to WASM bytes (via the `wat` crate).
//! - Compile a Wasmtime `Module` from the resulting WASM bytes.
//!
//! Sniffing the bytes instead of trusting the extension keeps hand-written `.wat` guests
//! loadable from the same path as release builds.

use std::path::{Path, PathBuf};

use wasmtime::{Engine, Module};

/// Error returned by loader helpers.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read guest module {}: {source}", path.display())]
    Fetch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The input was empty or otherwise not recognized as WASM/WAT.
    #[error("unrecognized module format (expected wasm or wat)")]
    UnrecognizedFormat,
    #[error("failed to parse WAT: {0}")]
    WatParseFailed(#[from] wat::Error),
    #[error("failed to compile WASM module: {0}")]
    CompileFailed(String),
}

/// What kind of module the loader inferred from the bytes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DetectedFormat {
    Wasm,
    Wat,
}

/// Read the guest payload. There is no retry.
pub fn fetch(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|source| LoadError::Fetch {
        path: path.to_path_buf(),
        source,
    })
}

/// Load: detect -> (optional) wat->wasm -> compile.
pub fn compile_module(engine: &Engine, bytes: &[u8]) -> Result<Module, LoadError> {
    let Detected { format, wasm_bytes } = normalize_to_wasm(bytes)?;
    tracing::debug!(?format, len = wasm_bytes.len(), "compiling guest module");
    Module::new(engine, &wasm_bytes).map_err(|e| LoadError::CompileFailed(format!("{e:#}")))
}

/// Detect format and normalize to valid WASM bytes.
pub fn normalize_to_wasm(bytes: &[u8]) -> Result<Detected, LoadError> {
    let format = detect_format(bytes).ok_or(LoadError::UnrecognizedFormat)?;

    match format {
        DetectedFormat::Wasm => Ok(Detected {
            format,
            wasm_bytes: bytes.to_vec(),
        }),
        DetectedFormat::Wat => Ok(Detected {
            format,
            wasm_bytes: wat::parse_bytes(bytes)?.into_owned(),
        }),
    }
}

/// Result of normalizing (detecting + possibly converting) the input.
#[derive(Clone, Debug)]
pub struct Detected {
    pub format: DetectedFormat,
    /// Always valid WASM bytes (for WASM/WAT inputs).
    pub wasm_bytes: Vec<u8>,
}

/// Best-effort detection.
///
/// Rules:
/// - If the first 4 bytes are `\0asm`, treat as WASM.
/// - Else, after stripping UTF-8 BOM / leading whitespace, if the first non-ws byte is `(`,
///   treat as WAT (common WAT starts with `(module ...)`).
pub fn detect_format(bytes: &[u8]) -> Option<DetectedFormat> {
    if bytes.starts_with(b"\0asm") {
        return Some(DetectedFormat::Wasm);
    }

    let rest = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match rest.iter().find(|&&b| !matches!(b, b' ' | b'\t' | b'\r' | b'\n')) {
        Some(&b'(') => Some(DetectedFormat::Wat),
        _ => None,
    }
}
