use std::sync::Arc;

use tokio::sync::{Mutex as AsyncMutex, Semaphore};

use crate::config::AppConfig;

pub struct AppState {
    // Caps concurrent yt-dlp runs; excess requests are turned away with 429.
    pub limiter: Arc<Semaphore>,
    pub cookie_lock: Arc<AsyncMutex<()>>,
    pub config: Arc<AppConfig>,
}
