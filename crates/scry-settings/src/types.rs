//! Settings type definitions.
//!
//! External field names are camelCase to match the settings file the web
//! front end edits.

use scry_core::Rect;
use serde::{Deserialize, Serialize};

/// Default instructional prompt sent with every capture.
///
/// The original deployment carried two conflicting prompt variants, so the
/// prompt is configurable; this default favors the short-answer style the
/// headset overlay expects.
pub const DEFAULT_PROMPT: &str =
    "Describe the most prominent object in this image in one or two words.";

/// Top-level settings for the bridge.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrySettings {
    /// Network and TLS settings.
    pub server: ServerSettings,
    /// Screen capture settings.
    pub capture: CaptureSettings,
    /// Remote analysis settings.
    pub analysis: AnalysisSettings,
}

/// Network and TLS settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address for both servers.
    pub host: String,
    /// Realtime (WebSocket) server port.
    pub ws_port: u16,
    /// Static asset server port.
    pub static_port: u16,
    /// Directory served by the static asset server.
    pub static_dir: String,
    /// TLS certificate path (PEM). TLS is enabled when both paths are set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_path: Option<String>,
    /// TLS private key path (PEM).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_path: Option<String>,
    /// Maximum inbound WebSocket message size in bytes.
    pub max_message_size: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            ws_port: 8765,
            static_port: 8000,
            static_dir: ".".to_string(),
            cert_path: None,
            key_path: None,
            max_message_size: 64 * 1024,
        }
    }
}

/// Screen capture settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureSettings {
    /// Optional rectangle restricting every capture. `None` means the full
    /// display output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<Rect>,
    /// Directory where timestamped snapshot copies are written.
    pub output_dir: String,
    /// JPEG quality (1–100).
    pub jpeg_quality: u8,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            bounding_box: None,
            output_dir: "captures".to_string(),
            jpeg_quality: 85,
        }
    }
}

/// Remote analysis settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisSettings {
    /// Base URL of the OpenAI-compatible endpoint.
    pub base_url: String,
    /// API credential. Prefer the `SCRY_API_KEY` env var over the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model identifier sent with each request.
    pub model: String,
    /// Instructional prompt sent with each capture.
    pub prompt: String,
    /// Deadline for the whole analysis round-trip, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            timeout_ms: 30_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = ScrySettings::default();
        assert_eq!(s.server.host, "0.0.0.0");
        assert_eq!(s.server.ws_port, 8765);
        assert_eq!(s.server.static_port, 8000);
        assert!(s.server.cert_path.is_none());
        assert!(s.capture.bounding_box.is_none());
        assert_eq!(s.capture.output_dir, "captures");
        assert_eq!(s.capture.jpeg_quality, 85);
        assert_eq!(s.analysis.timeout_ms, 30_000);
        assert_eq!(s.analysis.prompt, DEFAULT_PROMPT);
    }

    #[test]
    fn serde_uses_camel_case() {
        let s = ScrySettings::default();
        let json = serde_json::to_value(&s).unwrap();
        assert!(json["server"]["wsPort"].is_number());
        assert!(json["server"]["staticPort"].is_number());
        assert!(json["server"]["maxMessageSize"].is_number());
        assert!(json["capture"]["outputDir"].is_string());
        assert!(json["analysis"]["timeoutMs"].is_number());
    }

    #[test]
    fn partial_deserialization_fills_defaults() {
        let s: ScrySettings =
            serde_json::from_str(r#"{"server": {"wsPort": 9999}}"#).unwrap();
        assert_eq!(s.server.ws_port, 9999);
        assert_eq!(s.server.static_port, 8000);
        assert_eq!(s.analysis.model, "gpt-4o-mini");
    }

    #[test]
    fn bounding_box_round_trips() {
        let s: ScrySettings = serde_json::from_str(
            r#"{"capture": {"boundingBox": {"x": 10, "y": 20, "width": 640, "height": 480}}}"#,
        )
        .unwrap();
        let bbox = s.capture.bounding_box.unwrap();
        assert_eq!(bbox.width, 640);
        assert_eq!(bbox.height, 480);
    }
}
