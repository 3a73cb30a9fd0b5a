//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ScrySettings::default()`]
//! 2. If `~/.scry/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::ScrySettings;

/// Resolve the path to the settings file (`~/.scry/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".scry").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ScrySettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<ScrySettings> {
    let defaults = serde_json::to_value(ScrySettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: ScrySettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    sanitize_ranges(&mut settings);
    Ok(settings)
}

/// Repair out-of-range values that deserialize fine but would break a
/// capture cycle. The file is user-edited; bad values warn and fall back
/// to the default, same as the env path.
fn sanitize_ranges(settings: &mut ScrySettings) {
    let quality = settings.capture.jpeg_quality;
    if quality == 0 || quality > 100 {
        let fallback = crate::types::CaptureSettings::default().jpeg_quality;
        tracing::warn!(value = quality, fallback, "jpegQuality outside 1-100, using default");
        settings.capture.jpeg_quality = fallback;
    }
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Each env var has strict parsing rules; invalid values are logged and
/// ignored (falling back to the file/default value).
pub fn apply_env_overrides(settings: &mut ScrySettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary variable source.
///
/// Separated from the process environment so the per-variable field
/// mapping is testable without mutating global state.
fn apply_overrides<F>(settings: &mut ScrySettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = read_string(&lookup, "SCRY_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read_u16(&lookup, "SCRY_WS_PORT", 1, 65535) {
        settings.server.ws_port = v;
    }
    if let Some(v) = read_u16(&lookup, "SCRY_STATIC_PORT", 1, 65535) {
        settings.server.static_port = v;
    }
    if let Some(v) = read_string(&lookup, "SCRY_STATIC_DIR") {
        settings.server.static_dir = v;
    }
    if let Some(v) = read_string(&lookup, "SCRY_CERT_PATH") {
        settings.server.cert_path = Some(v);
    }
    if let Some(v) = read_string(&lookup, "SCRY_KEY_PATH") {
        settings.server.key_path = Some(v);
    }

    // ── Capture ─────────────────────────────────────────────────────
    if let Some(v) = read_string(&lookup, "SCRY_OUTPUT_DIR") {
        settings.capture.output_dir = v;
    }

    // ── Analysis ────────────────────────────────────────────────────
    if let Some(v) = read_string(&lookup, "SCRY_ANALYSIS_URL") {
        settings.analysis.base_url = v;
    }
    if let Some(v) = read_string(&lookup, "SCRY_ANALYSIS_MODEL") {
        settings.analysis.model = v;
    }
    if let Some(v) = read_string(&lookup, "SCRY_API_KEY") {
        settings.analysis.api_key = Some(v);
    }
    if let Some(v) = read_string(&lookup, "SCRY_PROMPT") {
        settings.analysis.prompt = v;
    }
    if let Some(v) = read_u64(&lookup, "SCRY_TIMEOUT_MS", 1000, 600_000) {
        settings.analysis.timeout_ms = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Variable readers (thin wrappers over the lookup) ────────────────────────

fn read_string<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|v| !v.is_empty())
}

fn read_u16<F>(lookup: &F, name: &str, min: u16, max: u16) -> Option<u16>
where
    F: Fn(&str) -> Option<String>,
{
    let val = lookup(name)?;
    let result = parse_u16_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u16 override, ignoring");
    }
    result
}

fn read_u64<F>(lookup: &F, name: &str, min: u64, max: u64) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let val = lookup(name)?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u64 override, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
