//! Turns one inbound text into replies. No Telegram types beyond the user id
//! leak in here, so the whole flow runs against fakes in tests.

use chrono::NaiveDate;
use ringside_shared::wizard::WizardInput;
use ringside_shared::{Transition, compute_profit, find_expiring, roster};
use teloxide::types::UserId;
use tracing::{error, info, warn};

use crate::bot::router::{Route, route};
use crate::bot::texts;
use crate::notify::notify_expiring;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKeyboard {
    Keep,
    MainMenu,
    Wizard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: ReplyKeyboard,
}

impl Reply {
    fn new(text: String, keyboard: ReplyKeyboard) -> Self {
        Self { text, keyboard }
    }

    fn keep(text: String) -> Self {
        Self::new(text, ReplyKeyboard::Keep)
    }

    /// A long report as one or more messages under Telegram's size cap.
    fn report(text: String) -> Vec<Self> {
        texts::split_message(&text).into_iter().map(Self::keep).collect()
    }
}

pub async fn handle(state: &AppState, user: UserId, text: &str, today: NaiveDate) -> Vec<Reply> {
    let mut session = state.sessions.load(user).await;
    let route = route(text, session.is_active(), &state.bot_username);

    match route {
        Route::Ignore => Vec::new(),
        Route::Start => vec![Reply::new(texts::welcome(), ReplyKeyboard::MainMenu)],
        Route::NothingToCancel => vec![Reply::new(texts::nothing_to_cancel(), ReplyKeyboard::MainMenu)],
        Route::ListStudents => list_students(state, today).await,
        Route::CheckExpiry => check_expiry(state, today).await,
        Route::Profit => vec![show_profit(state, today).await],
        Route::BeginRegistration => {
            info!("Registration started by {}", user.0);
            let transition = session.apply(WizardInput::Begin, today);
            state.sessions.save(user, session).await;
            step_reply(transition).into_iter().collect()
        }
        Route::Cancel => {
            let transition = session.apply(WizardInput::Cancel, today);
            state.sessions.save(user, session).await;
            info!("Registration cancelled by {}", user.0);
            step_reply(transition).into_iter().collect()
        }
        Route::Wizard => {
            let transition = session.apply(WizardInput::Text(text), today);
            // Saved before the append so the session is idle whatever the backend does.
            state.sessions.save(user, session).await;
            match transition {
                Transition::Completed(record) => {
                    let reply = match state.records.append_record(&record).await {
                        Ok(()) => {
                            info!("Student {:?} registered by {}", record.full_name, user.0);
                            texts::student_added(&record)
                        }
                        Err(e) => {
                            error!("Registration of {:?} by {} lost: {}", record.full_name, user.0, e);
                            texts::append_failed()
                        }
                    };
                    vec![Reply::new(reply, ReplyKeyboard::MainMenu)]
                }
                other => step_reply(other).into_iter().collect(),
            }
        }
    }
}

fn step_reply(transition: Transition) -> Option<Reply> {
    match transition {
        Transition::Prompt(step) => {
            texts::prompt(step).map(|text| Reply::new(text, ReplyKeyboard::Wizard))
        }
        Transition::Rejected { step, error } => {
            let mut text = texts::rejected(&error);
            if let Some(prompt) = texts::prompt(step) {
                text.push_str("\n\n");
                text.push_str(&prompt);
            }
            Some(Reply::new(text, ReplyKeyboard::Wizard))
        }
        Transition::Cancelled => Some(Reply::new(texts::cancelled(), ReplyKeyboard::MainMenu)),
        Transition::Completed(_) | Transition::Ignored => None,
    }
}

async fn list_students(state: &AppState, today: NaiveDate) -> Vec<Reply> {
    match state.records.list_records().await {
        Ok(rows) => Reply::report(texts::roster(&roster(&rows, today))),
        Err(e) => {
            warn!("Roster unavailable: {}", e);
            vec![Reply::keep(texts::backend_unavailable())]
        }
    }
}

async fn check_expiry(state: &AppState, today: NaiveDate) -> Vec<Reply> {
    let rows = match state.records.list_records().await {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Expiry check unavailable: {}", e);
            return vec![Reply::keep(texts::backend_unavailable())];
        }
    };
    let expiring = find_expiring(&rows, today, state.expiry_window_days);
    let summary = notify_expiring(state.notifier.as_ref(), &expiring).await;
    info!(
        "Expiry check: {} expiring, {} reminded, {} failed",
        expiring.len(),
        summary.sent,
        summary.failed
    );
    Reply::report(texts::expiring(&expiring, state.expiry_window_days, summary))
}

async fn show_profit(state: &AppState, today: NaiveDate) -> Reply {
    match state.records.list_records().await {
        Ok(rows) => Reply::keep(texts::profit(&compute_profit(&rows, today))),
        Err(e) => {
            warn!("Profit report unavailable: {}", e);
            Reply::keep(texts::backend_unavailable())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Notifier, NotifyError};
    use crate::sessions::{InMemorySessionStore, SessionStore};
    use async_trait::async_trait;
    use ringside_shared::{Draft, StudentRecord, StudentRow, WizardStep};
    use ringside_sheets::{RecordStore, SheetsError, StoreError};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use teloxide::types::ChatId;

    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<StudentRow>>,
        appended: Mutex<Vec<StudentRecord>>,
        down: AtomicBool,
    }

    impl MemoryStore {
        fn unavailable() -> StoreError {
            StoreError::BackendUnavailable(SheetsError::Auth("offline".into()))
        }
    }

    #[async_trait]
    impl RecordStore for MemoryStore {
        async fn list_records(&self) -> Result<Vec<StudentRow>, StoreError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(Self::unavailable());
            }
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn append_record(&self, record: &StudentRecord) -> Result<(), StoreError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(Self::unavailable());
            }
            self.appended.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<ChatId>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, chat_id: ChatId, _text: &str) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(chat_id);
            Ok(())
        }
    }

    struct Harness {
        state: AppState,
        store: Arc<MemoryStore>,
        sessions: InMemorySessionStore,
        notifier: Arc<RecordingNotifier>,
    }

    const ANN: UserId = UserId(1);
    const BOB: UserId = UserId(2);

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::default());
        let sessions = InMemorySessionStore::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState {
            records: store.clone(),
            sessions: Arc::new(sessions.clone()),
            notifier: notifier.clone(),
            bot_username: "ringside_bot".into(),
            expiry_window_days: 3,
        };
        Harness {
            state,
            store,
            sessions,
            notifier,
        }
    }

    impl Harness {
        async fn say(&self, user: UserId, text: &str) -> Vec<Reply> {
            handle(&self.state, user, text, today()).await
        }

        async fn step(&self, user: UserId) -> WizardStep {
            self.sessions.load(user).await.step
        }
    }

    const FULL_RUN: [&str; 7] = [
        "Ivan Petrov",
        "+7 900 123 45 67",
        "424242",
        "Group",
        "01.03.2025",
        "17.03.2025",
        "3000",
    ];

    #[tokio::test]
    async fn full_registration_appends_and_returns_to_idle() {
        let h = harness();
        let replies = h.say(ANN, "/add_student").await;
        assert_eq!(replies[0].keyboard, ReplyKeyboard::Wizard);
        assert!(replies[0].text.contains("full name"));

        for text in FULL_RUN {
            h.say(ANN, text).await;
        }

        let appended = h.store.appended.lock().unwrap().clone();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].full_name, "Ivan Petrov");
        assert_eq!(appended[0].days_left, 2);
        assert_eq!(appended[0].payment_amount, 3000);
        assert_eq!(h.step(ANN).await, WizardStep::Idle);
        assert_eq!(h.sessions.active_count().await, 0);
    }

    #[tokio::test]
    async fn bad_date_reissues_the_same_prompt() {
        let h = harness();
        h.say(ANN, crate::bot::keyboards::ADD).await;
        for text in &FULL_RUN[..4] {
            h.say(ANN, text).await;
        }
        let before = h.sessions.load(ANN).await;

        let replies = h.say(ANN, "31-13-2024").await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("not a valid date"));
        assert!(replies[0].text.contains("start date"));
        assert_eq!(h.sessions.load(ANN).await, before);
    }

    #[tokio::test]
    async fn commands_inside_the_wizard_are_data() {
        let h = harness();
        h.say(ANN, "/add_student").await;
        h.say(ANN, "/profit").await;
        let session = h.sessions.load(ANN).await;
        assert_eq!(session.step, WizardStep::AwaitingPhone);
        assert_eq!(session.draft.full_name.as_deref(), Some("/profit"));
    }

    #[tokio::test]
    async fn cancel_discards_and_restart_is_fresh() {
        let h = harness();
        h.say(ANN, "/add_student").await;
        for text in &FULL_RUN[..5] {
            h.say(ANN, text).await;
        }
        let replies = h.say(ANN, "/cancel").await;
        assert_eq!(replies[0].keyboard, ReplyKeyboard::MainMenu);
        assert_eq!(h.step(ANN).await, WizardStep::Idle);

        h.say(ANN, "/add_student").await;
        let session = h.sessions.load(ANN).await;
        assert_eq!(session.step, WizardStep::AwaitingName);
        assert_eq!(session.draft, Draft::default());
    }

    #[tokio::test]
    async fn cancel_button_works_like_the_command() {
        let h = harness();
        h.say(ANN, "/add_student").await;
        h.say(ANN, "Ann").await;
        h.say(ANN, crate::bot::keyboards::CANCEL).await;
        assert_eq!(h.step(ANN).await, WizardStep::Idle);
    }

    #[tokio::test]
    async fn idle_cancel_and_chatter() {
        let h = harness();
        let replies = h.say(ANN, "/cancel").await;
        assert_eq!(replies[0].text, texts::nothing_to_cancel());
        assert!(h.say(ANN, "good morning").await.is_empty());
    }

    #[tokio::test]
    async fn sessions_are_isolated_per_user() {
        let h = harness();
        h.say(ANN, "/add_student").await;
        h.say(BOB, "/add_student").await;
        h.say(ANN, "Ann").await;
        h.say(BOB, "Bob").await;
        h.say(BOB, "555").await;

        let ann = h.sessions.load(ANN).await;
        let bob = h.sessions.load(BOB).await;
        assert_eq!(ann.step, WizardStep::AwaitingPhone);
        assert_eq!(ann.draft.full_name.as_deref(), Some("Ann"));
        assert_eq!(ann.draft.phone, None);
        assert_eq!(bob.step, WizardStep::AwaitingTelegramId);
        assert_eq!(bob.draft.full_name.as_deref(), Some("Bob"));

        h.say(ANN, "/cancel").await;
        assert_eq!(h.step(BOB).await, WizardStep::AwaitingTelegramId);
    }

    #[tokio::test]
    async fn failed_append_still_ends_the_session() {
        let h = harness();
        h.say(ANN, "/add_student").await;
        for text in &FULL_RUN[..6] {
            h.say(ANN, text).await;
        }
        h.store.down.store(true, Ordering::SeqCst);

        let replies = h.say(ANN, FULL_RUN[6]).await;
        assert_eq!(replies[0].text, texts::append_failed());
        assert_eq!(replies[0].keyboard, ReplyKeyboard::MainMenu);
        assert_eq!(h.step(ANN).await, WizardStep::Idle);
        assert!(h.store.appended.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_payment_keeps_waiting_for_payment() {
        let h = harness();
        h.say(ANN, "/add_student").await;
        for text in &FULL_RUN[..6] {
            h.say(ANN, text).await;
        }
        let replies = h.say(ANN, "a lot").await;
        assert!(replies[0].text.contains("whole number"));
        assert_eq!(h.step(ANN).await, WizardStep::AwaitingPayment);
    }

    #[tokio::test]
    async fn check_lists_and_notifies_expiring_students() {
        let h = harness();
        *h.store.rows.lock().unwrap() = vec![
            StudentRow {
                full_name: "Soon".into(),
                telegram_id: Some("77".into()),
                end_date: "17.03.2025".into(),
                ..Default::default()
            },
            StudentRow {
                full_name: "Later".into(),
                telegram_id: Some("88".into()),
                end_date: "30.03.2025".into(),
                ..Default::default()
            },
            StudentRow {
                full_name: "Broken".into(),
                end_date: "someday".into(),
                ..Default::default()
            },
        ];

        let replies = h.say(ANN, "/check").await;
        assert!(replies[0].text.contains("Soon - ends in 2 days"));
        assert!(!replies[0].text.contains("Later"));
        assert!(replies[0].text.contains("Reminders sent: 1, failed: 0"));
        assert_eq!(*h.notifier.sent.lock().unwrap(), vec![ChatId(77)]);
    }

    #[tokio::test]
    async fn profit_and_roster_read_the_sheet() {
        let h = harness();
        *h.store.rows.lock().unwrap() = vec![
            StudentRow {
                full_name: "Ann".into(),
                start_date: "15.03.2025".into(),
                end_date: "20.03.2025".into(),
                payment_amount: "100".into(),
                ..Default::default()
            },
            StudentRow {
                full_name: "Bob".into(),
                start_date: "05.03.2025".into(),
                end_date: "05.04.2025".into(),
                payment_amount: "100".into(),
                ..Default::default()
            },
        ];

        let profit = h.say(ANN, crate::bot::keyboards::PROFIT).await;
        assert!(profit[0].text.contains("Today: 100"));
        assert!(profit[0].text.contains("This week: 100"));
        assert!(profit[0].text.contains("This month: 200"));

        let roster = h.say(ANN, "/list_students").await;
        assert!(roster[0].text.contains("Ann - 5 days"));
        assert!(roster[0].text.contains("Bob - 21 days"));
    }

    #[tokio::test]
    async fn large_roster_arrives_in_several_messages() {
        let h = harness();
        *h.store.rows.lock().unwrap() = (0..200)
            .map(|i| StudentRow {
                full_name: format!("Student Number {:03} Ivanovich", i),
                end_date: "30.03.2025".into(),
                ..Default::default()
            })
            .collect();

        let replies = h.say(ANN, "/list_students").await;
        assert!(replies.len() > 1);
        for reply in &replies {
            assert!(reply.text.encode_utf16().count() <= texts::MESSAGE_LIMIT);
            assert_eq!(reply.keyboard, ReplyKeyboard::Keep);
        }
        let all: String = replies.iter().map(|r| r.text.as_str()).collect();
        assert!(all.contains("Student Number 000 Ivanovich - 15 days"));
        assert!(all.contains("Student Number 199 Ivanovich - 15 days"));
    }

    #[tokio::test]
    async fn profit_ignores_unrelated_end_dates() {
        let h = harness();
        *h.store.rows.lock().unwrap() = vec![StudentRow {
            full_name: "Ann".into(),
            start_date: "15.03.2025".into(),
            end_date: "not a date".into(),
            payment_amount: "700".into(),
            ..Default::default()
        }];
        let replies = h.say(ANN, "/profit").await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("Today: 700"));
    }

    #[tokio::test]
    async fn read_failures_become_a_reply() {
        let h = harness();
        h.store.down.store(true, Ordering::SeqCst);
        for command in ["/list_students", "/check", "/profit"] {
            let replies = h.say(ANN, command).await;
            assert_eq!(replies[0].text, texts::backend_unavailable());
        }
    }
}
