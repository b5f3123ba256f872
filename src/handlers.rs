use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tokio::sync::OwnedSemaphorePermit;

use crate::{cookies, state::AppState, thread, transcript, util};

// Matches the browser form's slider default.
const DEFAULT_THREAD_LENGTH: usize = 5;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateThreadRequest {
    #[serde(default)]
    pub youtube_url: String,
    pub thread_length: Option<usize>,
}

pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(include_str!("../static/index.html"))
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "YouTube Thread Generator",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "GET /": "Browser form",
            "GET /api/health": "Health check",
            "POST /api/generate-thread": "Generate a thread (body: {youtubeUrl, threadLength})"
        }
    }))
}

pub async fn generate_thread(
    req: web::Json<GenerateThreadRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let url = req.youtube_url.trim();
    if url.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "YouTube URL is required"
        }));
    }

    let thread_length = req.thread_length.unwrap_or(DEFAULT_THREAD_LENGTH);
    if thread_length < 1 {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "threadLength must be at least 1"
        }));
    }

    let video_id = match util::extract_video_id(url) {
        Some(id) => id,
        None => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Invalid YouTube URL"
            }));
        }
    };

    log::info!(
        "generate request: video_id={} thread_length={}",
        video_id,
        thread_length
    );

    let permit = match state.limiter.clone().try_acquire_owned() {
        Ok(p) => p,
        Err(_) => {
            return HttpResponse::TooManyRequests().json(serde_json::json!({
                "error": format!("Too many concurrent requests (max: {})", state.config.max_concurrent_fetches)
            }));
        }
    };

    if let Err(e) = cookies::ensure_cookies(state.config.as_ref(), state.cookie_lock.as_ref()).await
    {
        log::error!("cookie refresh failed: {:#}", e);
        return HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Failed to refresh cookies: {}", e)
        }));
    }

    // Hold the concurrency slot for the duration of the yt-dlp run.
    let _permit: OwnedSemaphorePermit = permit;

    let transcript_text = match transcript::fetch_transcript(state.config.as_ref(), &video_id).await
    {
        Ok(t) => t,
        Err(e) => {
            log::warn!("transcript fetch failed: video_id={} err={:#}", video_id, e);
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Unable to fetch transcript. The video might not have captions available."
            }));
        }
    };

    let threads = thread::build_thread(
        &transcript_text,
        thread_length,
        state.config.max_segment_chars,
    );

    log::info!(
        "generated thread: video_id={} segments={}",
        video_id,
        threads.len()
    );

    HttpResponse::Ok().json(serde_json::json!({ "threads": threads }))
}
