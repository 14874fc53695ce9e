use std::sync::Arc;

use ringside_sheets::RecordStore;

use crate::notify::Notifier;
use crate::sessions::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub records: Arc<dyn RecordStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub notifier: Arc<dyn Notifier>,
    pub bot_username: String,
    pub expiry_window_days: i64,
}
