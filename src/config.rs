use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: String,
    pub max_concurrent_fetches: usize,

    // yt-dlp --sub-langs selector for caption tracks.
    pub sub_langs: String,
    // Display cap per generated segment (the "..." suffix counts toward it).
    pub max_segment_chars: usize,

    // "browser" (default) or "file"
    pub cookies_source: String,
    pub cookies_file: PathBuf,
    pub cookies_browser: String,
    pub cookies_refresh_max_age_secs: u64,

    pub ytdlp_bin: PathBuf,
    pub ytdlp_path: String,
    // Preferred: explicit yt-dlp proxy (e.g. socks5://127.0.0.1:7890).
    pub ytdlp_proxy: Option<String>,
    // Whether to let yt-dlp inherit http_proxy/https_proxy from the service environment.
    pub inherit_proxy_env: bool,
}

#[derive(Debug, Deserialize)]
struct AppConfigFile {
    listen_addr: Option<String>,
    max_concurrent_fetches: Option<usize>,

    sub_langs: Option<String>,
    max_segment_chars: Option<usize>,

    cookies_source: Option<String>,
    cookies_file: Option<String>,
    cookies_browser: Option<String>,
    cookies_refresh_max_age_secs: Option<u64>,

    ytdlp_bin: Option<String>,
    ytdlp_path: Option<String>,
    ytdlp_proxy: Option<String>,
    inherit_proxy_env: Option<bool>,
}

fn default_ytdlp_path() -> String {
    // Prefer inheriting PATH from the service process; override via config.toml when needed
    // (e.g. to include Homebrew, node from nvm, etc).
    std::env::var("PATH").unwrap_or_else(|_| {
        "/opt/homebrew/bin:/usr/local/bin:/usr/bin:/bin:/usr/sbin:/sbin".to_string()
    })
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).with_context(|| {
            format!(
                "Failed to read config file: {}",
                path.to_string_lossy().as_ref()
            )
        })?;
        Self::parse(&raw)
    }

    fn parse(raw: &str) -> Result<Self> {
        let file: AppConfigFile = toml::from_str(raw).context("Failed to parse config.toml")?;

        let cfg = Self {
            listen_addr: file.listen_addr.unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            max_concurrent_fetches: file.max_concurrent_fetches.unwrap_or(4),

            sub_langs: file.sub_langs.unwrap_or_else(|| "en.*,en".to_string()),
            max_segment_chars: file.max_segment_chars.unwrap_or(270),

            cookies_source: file
                .cookies_source
                .unwrap_or_else(|| "browser".to_string())
                .to_ascii_lowercase(),
            cookies_file: PathBuf::from(file.cookies_file.unwrap_or_else(|| "cookies.txt".to_string())),
            cookies_browser: file.cookies_browser.unwrap_or_else(|| "edge".to_string()),
            cookies_refresh_max_age_secs: file.cookies_refresh_max_age_secs.unwrap_or(1800),

            ytdlp_bin: PathBuf::from(file.ytdlp_bin.unwrap_or_else(|| "yt-dlp".to_string())),
            ytdlp_path: file.ytdlp_path.unwrap_or_else(default_ytdlp_path),
            ytdlp_proxy: file.ytdlp_proxy.and_then(|s| {
                let s = s.trim().to_string();
                if s.is_empty() { None } else { Some(s) }
            }),
            inherit_proxy_env: file.inherit_proxy_env.unwrap_or(false),
        };

        if cfg.cookies_source != "browser" && cfg.cookies_source != "file" {
            return Err(anyhow!(
                "Invalid cookies_source: {} (expected: browser|file)",
                cfg.cookies_source
            ));
        }

        if cfg.max_segment_chars < 4 {
            // Truncation replaces the tail with "...", so anything shorter cannot hold content.
            return Err(anyhow!(
                "max_segment_chars too small: {} (minimum: 4)",
                cfg.max_segment_chars
            ));
        }

        if cfg.max_concurrent_fetches < 1 {
            return Err(anyhow!("max_concurrent_fetches must be at least 1"));
        }

        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = AppConfig::parse("").unwrap();
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert_eq!(cfg.max_concurrent_fetches, 4);
        assert_eq!(cfg.sub_langs, "en.*,en");
        assert_eq!(cfg.max_segment_chars, 270);
        assert_eq!(cfg.cookies_source, "browser");
        assert!(cfg.ytdlp_proxy.is_none());
        assert!(!cfg.inherit_proxy_env);
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = AppConfig::parse(
            r#"
            listen_addr = "127.0.0.1:9000"
            max_segment_chars = 140
            sub_langs = "de,en"
            cookies_source = "file"
            ytdlp_proxy = "socks5://127.0.0.1:7890"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:9000");
        assert_eq!(cfg.max_segment_chars, 140);
        assert_eq!(cfg.sub_langs, "de,en");
        assert_eq!(cfg.cookies_source, "file");
        assert_eq!(cfg.ytdlp_proxy.as_deref(), Some("socks5://127.0.0.1:7890"));
    }

    #[test]
    fn blank_proxy_is_treated_as_unset() {
        let cfg = AppConfig::parse("ytdlp_proxy = \"  \"").unwrap();
        assert!(cfg.ytdlp_proxy.is_none());
    }

    #[test]
    fn rejects_unknown_cookies_source() {
        let err = AppConfig::parse("cookies_source = \"keychain\"").unwrap_err();
        assert!(err.to_string().contains("cookies_source"));
    }

    #[test]
    fn rejects_undersized_segment_cap() {
        let err = AppConfig::parse("max_segment_chars = 3").unwrap_err();
        assert!(err.to_string().contains("max_segment_chars"));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "listen_addr = \"127.0.0.1:0\"").unwrap();
        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:0");
    }

    #[test]
    fn load_fails_for_missing_file() {
        assert!(AppConfig::load("/definitely/not/here.toml").is_err());
    }
}
