//! Notification poller and toast tray
//!
//! Polls the portal for unread notifications on a fixed interval,
//! deduplicates them against a page-lifetime seen set, and renders them
//! as transient toasts that auto-close and get marked read server-side.
//!
//! Toast lifecycle is deadline-driven rather than timer-driven: the tray
//! records when each toast should activate, auto-close, and be removed,
//! and `advance` applies whatever is due at a given instant. The runner
//! feeds it wall-clock instants; tests feed it synthetic ones.

use crate::api::types::{Notification, NotificationKind, NotificationsResponse};
use crate::api::ApiClient;
use crate::config::NotificationConfig;
use crate::view::UnreadBadge;

use colored::Colorize;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};

/// Delay before an inserted toast becomes visually active
///
/// The page version waited a beat so the CSS transition could run; the
/// tray keeps the same two-phase insert so activation is observable.
const ACTIVATE_DELAY: Duration = Duration::from_millis(10);

/// Visual state of a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastState {
    /// Inserted but not yet visible
    Inserted,
    /// Visible on screen
    Active,
    /// Hidden, lingering for its fade transition before removal
    Closing,
}

/// One transient notification toast
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub created_at: String,
    /// Navigation target; a linked toast is clickable as a whole
    pub link: Option<String>,
    state: ToastState,
    activate_at: Instant,
    auto_close_at: Instant,
    remove_at: Option<Instant>,
    read_pending: bool,
}

impl Toast {
    pub fn state(&self) -> ToastState {
        self.state
    }

    /// Icon for this toast's kind, falling back to the info icon
    pub fn icon(&self) -> &'static str {
        match self.kind {
            NotificationKind::Info => "ℹ",
            NotificationKind::Warning => "⚠",
            NotificationKind::Danger => "✖",
            NotificationKind::Success => "✔",
            NotificationKind::Unknown => "ℹ",
        }
    }

    /// Render one toast line for the terminal
    pub fn render(&self) -> String {
        let icon = match self.kind {
            NotificationKind::Danger => self.icon().red(),
            NotificationKind::Warning => self.icon().yellow(),
            NotificationKind::Success => self.icon().green(),
            _ => self.icon().cyan(),
        };
        let mut out = format!("{} {} — {}", icon, self.title.bold(), self.message);
        if !self.created_at.is_empty() {
            out.push_str(&format!(" {}", self.created_at.dimmed()));
        }
        if let Some(link) = &self.link {
            out.push_str(&format!(" {}", format!("-> {}", link).underline()));
        }
        out
    }
}

/// What one housekeeping tick of the tray produced
#[derive(Debug, Default)]
pub struct TrayTick {
    /// Toasts that just became visible
    pub activated: Vec<i64>,
    /// Toasts whose mark-read request became due
    pub read_due: Vec<i64>,
}

/// The on-screen collection of toasts
#[derive(Debug)]
pub struct ToastTray {
    toasts: Vec<Toast>,
    timeout: Duration,
    fade: Duration,
}

impl ToastTray {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            toasts: Vec::new(),
            timeout: Duration::from_millis(config.toast_timeout_ms),
            fade: Duration::from_millis(config.toast_fade_ms),
        }
    }

    /// Insert a toast for a notification
    pub fn insert(&mut self, notification: &Notification, now: Instant) {
        self.toasts.push(Toast {
            id: notification.id,
            kind: notification.kind,
            title: notification.title.clone(),
            message: notification.message.clone(),
            created_at: notification.created_at.clone(),
            link: notification.link.clone(),
            state: ToastState::Inserted,
            activate_at: now + ACTIVATE_DELAY,
            auto_close_at: now + ACTIVATE_DELAY + self.timeout,
            remove_at: None,
            read_pending: true,
        });
    }

    /// Close a toast, manually or by deadline
    ///
    /// Both paths go through here: the toast hides, lingers for the fade
    /// delay, and yields its mark-read duty exactly once. Returns true
    /// when the caller should issue the mark-read request.
    pub fn close(&mut self, id: i64, now: Instant) -> bool {
        for toast in &mut self.toasts {
            if toast.id == id && toast.state != ToastState::Closing {
                toast.state = ToastState::Closing;
                toast.remove_at = Some(now + self.fade);
                if toast.read_pending {
                    toast.read_pending = false;
                    return true;
                }
                return false;
            }
        }
        false
    }

    /// Apply all transitions due at `now`
    pub fn advance(&mut self, now: Instant) -> TrayTick {
        let mut tick = TrayTick::default();

        for toast in &mut self.toasts {
            if toast.state == ToastState::Inserted && now >= toast.activate_at {
                toast.state = ToastState::Active;
                tick.activated.push(toast.id);
            }
        }

        let due: Vec<i64> = self
            .toasts
            .iter()
            .filter(|t| t.state == ToastState::Active && now >= t.auto_close_at)
            .map(|t| t.id)
            .collect();
        for id in due {
            if self.close(id, now) {
                tick.read_due.push(id);
            }
        }

        self.toasts
            .retain(|t| !matches!((t.state, t.remove_at), (ToastState::Closing, Some(at)) if now >= at));

        tick
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn get(&self, id: i64) -> Option<&Toast> {
        self.toasts.iter().find(|t| t.id == id)
    }
}

/// The notification poller
///
/// Holds the monotonic seen-id set for its whole lifetime: a
/// notification shown once is never re-shown, even if a later poll still
/// reports it unread because the server has not recorded the read yet.
pub struct NotificationPoller {
    api: ApiClient,
    interval: Duration,
    seen: HashSet<i64>,
    badge: UnreadBadge,
    tray: ToastTray,
}

impl NotificationPoller {
    pub fn new(api: ApiClient, config: &NotificationConfig) -> Self {
        Self {
            api,
            interval: Duration::from_secs(config.poll_interval_seconds),
            seen: HashSet::new(),
            badge: UnreadBadge::default(),
            tray: ToastTray::new(config),
        }
    }

    pub fn badge(&self) -> &UnreadBadge {
        &self.badge
    }

    pub fn tray(&self) -> &ToastTray {
        &self.tray
    }

    pub fn tray_mut(&mut self) -> &mut ToastTray {
        &mut self.tray
    }

    /// Run one poll cycle
    ///
    /// A transport failure or non-success HTTP status skips the cycle
    /// silently; the next scheduled poll proceeds independently. Returns
    /// the number of newly displayed notifications.
    pub async fn poll_once(&mut self) -> usize {
        let resp = match self.api.notifications().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::debug!("Notification poll skipped: {}", e);
                return 0;
            }
        };
        self.absorb(resp, Instant::now())
    }

    /// Fold one poll response into the badge, seen set, and tray
    fn absorb(&mut self, resp: NotificationsResponse, now: Instant) -> usize {
        if !resp.success {
            return 0;
        }

        self.badge.update(resp.unread_count);

        let mut shown = 0;
        for notification in &resp.notifications {
            if !notification.is_read && !self.seen.contains(&notification.id) {
                self.tray.insert(notification, now);
                self.seen.insert(notification.id);
                shown += 1;
            }
        }
        shown
    }

    /// Run the poll loop until `shutdown` fires
    ///
    /// Polls immediately, then on the fixed interval with no backoff.
    /// Each fetch runs on its own task, so cycles are not mutually
    /// excluded: a slow poll delays neither the next one's schedule nor
    /// the housekeeping tick that drives toast deadlines and fires
    /// mark-read requests from spawned tasks. Mark-read and poll
    /// failures are logged and never retried.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            "Notification poller started: interval={}s",
            self.interval.as_secs()
        );

        let mut poll = tokio::time::interval(self.interval);
        let mut housekeeping = tokio::time::interval(Duration::from_millis(100));
        let (responses, mut received) = mpsc::unbounded_channel();

        loop {
            tokio::select! {
                _ = poll.tick() => {
                    let api = self.api.clone();
                    let responses = responses.clone();
                    tokio::spawn(async move {
                        match api.notifications().await {
                            Ok(resp) => {
                                let _ = responses.send(resp);
                            }
                            Err(e) => {
                                tracing::debug!("Notification poll skipped: {}", e);
                            }
                        }
                    });
                }
                Some(resp) = received.recv() => {
                    let shown = self.absorb(resp, Instant::now());
                    if shown > 0 {
                        tracing::debug!("Displayed {} new notifications", shown);
                    }
                    if self.badge.is_visible() {
                        println!("{}", self.badge.to_string().dimmed());
                    }
                }
                _ = housekeeping.tick() => {
                    let tick = self.tray.advance(Instant::now());
                    for id in &tick.activated {
                        if let Some(toast) = self.tray.get(*id) {
                            println!("{}", toast.render());
                        }
                    }
                    for id in tick.read_due {
                        let api = self.api.clone();
                        tokio::spawn(async move {
                            if let Err(e) = api.mark_notification_read(id).await {
                                tracing::warn!("Failed to mark notification {} read: {}", id, e);
                            }
                        });
                    }
                }
                _ = shutdown.changed() => {
                    tracing::info!("Notification poller stopped");
                    break;
                }
            }
        }
    }
}
