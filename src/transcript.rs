use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tokio::process::Command;

use crate::config::AppConfig;
use crate::util;

// YouTube's json3 caption track: a list of timed events, each carrying text
// fragments. Timing fields exist in the wire format but are not needed here.
#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(default)]
    events: Vec<CaptionEvent>,
}

#[derive(Debug, Deserialize)]
struct CaptionEvent {
    #[serde(default)]
    segs: Vec<CaptionSeg>,
}

#[derive(Debug, Deserialize)]
struct CaptionSeg {
    #[serde(default)]
    utf8: String,
}

fn build_ytdlp_base_command(cfg: &AppConfig) -> Command {
    let mut cmd = Command::new(&cfg.ytdlp_bin);
    cmd.env("PATH", &cfg.ytdlp_path);

    if !cfg.inherit_proxy_env {
        // Avoid being accidentally bound to a dead local proxy (common in shell env).
        cmd.env_remove("http_proxy")
            .env_remove("https_proxy")
            .env_remove("HTTP_PROXY")
            .env_remove("HTTPS_PROXY")
            .env_remove("no_proxy")
            .env_remove("NO_PROXY");
    }

    if let Some(p) = &cfg.ytdlp_proxy {
        cmd.arg("--proxy").arg(p);
    }

    cmd.arg("--cookies")
        .arg(cfg.cookies_file.to_string_lossy().as_ref())
        .arg("--no-playlist")
        .arg("--no-cache-dir");

    cmd
}

fn render_stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return "no stderr output captured".to_string();
    }
    let start = lines.len().saturating_sub(10);
    lines[start..].join("\n")
}

/// Flatten a json3 caption track into one blob of spoken text. Event texts
/// are trimmed and joined with single spaces; timing is discarded.
fn transcript_from_json3(raw: &str) -> Result<String> {
    let track: CaptionTrack =
        serde_json::from_str(raw).context("Failed to parse json3 caption track")?;

    let mut pieces: Vec<String> = Vec::with_capacity(track.events.len());
    for event in track.events {
        let line: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
        let line = line.trim();
        if !line.is_empty() {
            pieces.push(line.to_string());
        }
    }
    Ok(pieces.join(" "))
}

/// Fetch the caption track for a video and flatten it into raw transcript
/// text. Every failure mode (yt-dlp error, no caption file, unparseable or
/// empty track) is an `Err`; the handler reports them all as "transcript
/// unavailable".
pub async fn fetch_transcript(cfg: &AppConfig, video_id: &str) -> Result<String> {
    let temp_dir = tempfile::Builder::new()
        .prefix("yt-captions-")
        .tempdir()
        .context("Failed to create caption temp dir")?;

    let out_template = temp_dir.path().join("captions");

    let mut cmd = build_ytdlp_base_command(cfg);
    cmd.arg("--skip-download")
        .arg("--write-subs")
        .arg("--write-auto-subs")
        .arg("--sub-langs")
        .arg(&cfg.sub_langs)
        .arg("--sub-format")
        .arg("json3")
        .arg("-o")
        .arg(out_template.to_string_lossy().as_ref())
        .arg(util::watch_url(video_id))
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true);

    let out = cmd.output().await.context("Failed to run yt-dlp")?;
    if !out.status.success() {
        return Err(anyhow!(
            "yt-dlp exited with error (status={}): {}",
            out.status,
            render_stderr_tail(&out.stderr)
        ));
    }

    // yt-dlp inserts the language code into the file name (captions.en.json3),
    // so scan the temp dir rather than guessing the exact path.
    let mut caption_file: Option<PathBuf> = None;
    let mut entries = tokio::fs::read_dir(temp_dir.path())
        .await
        .context("Failed to read caption temp dir")?;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let p = entry.path();
        if p.extension().and_then(|e| e.to_str()) == Some("json3") {
            caption_file = Some(p);
            break;
        }
    }

    let caption_file = caption_file
        .ok_or_else(|| anyhow!("No caption track produced (video may have no captions)"))?;

    let raw = tokio::fs::read_to_string(&caption_file)
        .await
        .context("Failed to read caption file")?;

    let transcript = transcript_from_json3(&raw)?;
    if transcript.is_empty() {
        return Err(anyhow!("Caption track was empty"));
    }

    log::debug!(
        "fetched transcript: video_id={} chars={}",
        video_id,
        transcript.len()
    );
    Ok(transcript)
}
