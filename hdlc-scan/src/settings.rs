//! Scanner settings

use std::path::{Path, PathBuf};
use std::time::Duration;

use hdlc_detect::{ScanConfig, ScannerConfig};
use hdlc_protocol::{CodecConfig, DEFAULT_MAX_FRAME_LEN};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Scanner settings, read from `settings.json` when present
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Total scan time in milliseconds
    pub timeout_ms: u64,
    /// Stop at the first framed port
    pub abort_after_first: bool,
    /// Frames a port must deliver to count as framed
    pub min_frames: u32,
    /// Line speed used to open every port
    pub baud_rate: u32,
    /// Ports whose name contains any of these are not probed
    pub skip_patterns: Vec<String>,
    /// Require a valid FCS-16 on every frame
    pub check_fcs: bool,
    /// Longest accepted frame in bytes
    pub max_frame_len: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            abort_after_first: true,
            min_frames: hdlc_detect::orchestrator::DEFAULT_MIN_FRAMES,
            baud_rate: hdlc_detect::opener::DEFAULT_BAUD_RATE,
            skip_patterns: Vec::new(),
            check_fcs: true,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

impl Settings {
    /// Get the XDG config directory for hdlc-scan
    /// Uses $XDG_CONFIG_HOME/hdlc-scan, falls back to ~/.config/hdlc-scan
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("hdlc-scan"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("hdlc-scan"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load settings from `path`; a missing file means defaults
    fn load_from(path: &Path) -> Self {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Self::default();
        };

        match serde_json::from_str(&contents) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("Ignoring malformed {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Scan timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Port enumeration settings
    pub fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            skip_patterns: self.skip_patterns.clone(),
        }
    }

    /// Probe settings
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            min_frames: self.min_frames,
            codec: CodecConfig {
                max_frame_len: self.max_frame_len,
                check_fcs: self.check_fcs,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("hdlc-scan-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.timeout(), Duration::from_secs(10));
        assert!(settings.abort_after_first);
        assert_eq!(settings.scan_config().min_frames, 1);
        assert_eq!(settings.baud_rate, 9600);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = temp_file(
            "partial.json",
            r#"{ "timeout_ms": 2500, "skip_patterns": ["Bluetooth"] }"#,
        );

        let settings = Settings::load_from(&path);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.timeout(), Duration::from_millis(2500));
        assert_eq!(settings.scanner_config().skip_patterns, vec!["Bluetooth".to_string()]);
        assert!(settings.abort_after_first);
        assert!(settings.check_fcs);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let path = temp_file("broken.json", "{ not json");

        let settings = Settings::load_from(&path);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load_from(Path::new("/nonexistent/hdlc-scan/settings.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_scan_config_mapping() {
        let settings = Settings {
            min_frames: 3,
            check_fcs: false,
            max_frame_len: 512,
            ..Default::default()
        };

        let config = settings.scan_config();
        assert_eq!(config.min_frames, 3);
        assert!(!config.codec.check_fcs);
        assert_eq!(config.codec.max_frame_len, 512);
    }
}
