//! Typed view construction for the terminal UI
//!
//! The portal's page builds its chat pane, history list, and unread badge
//! by templating HTML strings into the DOM. Here the same surfaces are
//! typed view trees: operations mutate nodes in place and rendering is a
//! separate, side-effect-free pass, so the view logic is testable without
//! a terminal.

use crate::api::types::{MessageStatus, Sender};
use colored::Colorize;
use std::fmt;

/// Placeholder shown when a pane or list has no content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// A fresh conversation with no messages yet
    NewConversation,
    /// No conversation selected
    PickOrCreate,
    /// The history list has no sessions
    NoHistory,
}

impl EmptyState {
    fn title(&self) -> &'static str {
        match self {
            Self::NewConversation => "New conversation",
            Self::PickOrCreate => "Pick a conversation from the history or start a new one",
            Self::NoHistory => "No conversation history",
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NewConversation => Some("Start by asking a question"),
            Self::PickOrCreate => Some("I am your assistant for managing your care"),
            Self::NoHistory => None,
        }
    }
}

/// Stable handle to a rendered message node
///
/// Handles stay valid until the pane is cleared, which lets a message be
/// patched after the server's response arrives without re-rendering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageId(usize);

/// The patchable meta region of a message node
///
/// Kept separate from the message body so a post-render patch touches
/// only this struct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageMeta {
    /// Whether the personal-context badge is shown
    pub context_badge: bool,
}

/// One message bubble in the chat pane
#[derive(Debug, Clone)]
pub struct MessageNode {
    id: MessageId,
    pub sender: Sender,
    pub text: String,
    pub time: String,
    pub status: MessageStatus,
    pub meta: MessageMeta,
}

impl MessageNode {
    pub fn id(&self) -> MessageId {
        self.id
    }
}

#[derive(Debug, Clone)]
enum PaneEntry {
    Message(MessageNode),
    Typing,
}

/// The chat message pane
///
/// Messages render in a two-column layout keyed by sender: assistant
/// messages sit against the left margin, user messages are indented to
/// the right column. At most one typing indicator is shown at a time.
#[derive(Debug, Clone)]
pub struct MessagePane {
    entries: Vec<PaneEntry>,
    empty: Option<EmptyState>,
    next_id: usize,
}

const USER_COLUMN_INDENT: &str = "                    ";

impl MessagePane {
    pub fn new(empty: EmptyState) -> Self {
        Self {
            entries: Vec::new(),
            empty: Some(empty),
            next_id: 0,
        }
    }

    /// Drop all content and show an empty-state placeholder
    ///
    /// Outstanding `MessageId` handles are invalidated.
    pub fn clear_to(&mut self, empty: EmptyState) {
        self.entries.clear();
        self.empty = Some(empty);
    }

    /// Append a message bubble, returning its stable handle
    pub fn push_message(
        &mut self,
        sender: Sender,
        text: &str,
        time: &str,
        status: MessageStatus,
        context_badge: bool,
    ) -> MessageId {
        self.empty = None;
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.entries.push(PaneEntry::Message(MessageNode {
            id,
            sender,
            text: text.to_string(),
            time: time.to_string(),
            status,
            meta: MessageMeta { context_badge },
        }));
        id
    }

    /// Show the typing indicator (at most one)
    pub fn show_typing(&mut self) {
        if !self.is_typing() {
            self.empty = None;
            self.entries.push(PaneEntry::Typing);
        }
    }

    /// Remove the typing indicator if present
    pub fn hide_typing(&mut self) {
        self.entries.retain(|e| !matches!(e, PaneEntry::Typing));
    }

    /// Whether the typing indicator is currently shown
    pub fn is_typing(&self) -> bool {
        self.entries.iter().any(|e| matches!(e, PaneEntry::Typing))
    }

    /// Patch the personal-context badge of an already-rendered message
    ///
    /// Idempotent, and touches only the node's meta region; the message
    /// body is never rebuilt. Returns false when the handle no longer
    /// resolves (pane was cleared).
    pub fn set_context_badge(&mut self, id: MessageId, on: bool) -> bool {
        for entry in &mut self.entries {
            if let PaneEntry::Message(node) = entry {
                if node.id == id {
                    node.meta.context_badge = on;
                    return true;
                }
            }
        }
        false
    }

    /// Look up a message node by handle
    pub fn message(&self, id: MessageId) -> Option<&MessageNode> {
        self.entries.iter().find_map(|e| match e {
            PaneEntry::Message(node) if node.id == id => Some(node),
            _ => None,
        })
    }

    /// All message nodes in render order
    pub fn messages(&self) -> impl Iterator<Item = &MessageNode> {
        self.entries.iter().filter_map(|e| match e {
            PaneEntry::Message(node) => Some(node),
            PaneEntry::Typing => None,
        })
    }

    /// Whether the pane currently shows an empty-state placeholder
    pub fn empty_state(&self) -> Option<EmptyState> {
        self.empty
    }

    /// Render the pane for the terminal
    pub fn render(&self) -> String {
        if let Some(empty) = self.empty {
            let mut out = format!("  {}\n", empty.title().dimmed());
            if let Some(hint) = empty.hint() {
                out.push_str(&format!("  {}\n", hint.dimmed()));
            }
            return out;
        }

        let mut out = String::new();
        for entry in &self.entries {
            match entry {
                PaneEntry::Message(node) => out.push_str(&render_message(node)),
                PaneEntry::Typing => {
                    out.push_str(&format!("{}\n", "assistant is typing...".dimmed()))
                }
            }
        }
        out
    }
}

fn render_message(node: &MessageNode) -> String {
    let (label, indent) = match node.sender {
        Sender::User => ("you".blue().bold(), USER_COLUMN_INDENT),
        Sender::Assistant => ("assistant".green().bold(), ""),
    };

    let mut header = format!("{}{} {}", indent, label, node.time.dimmed());
    if node.meta.context_badge {
        header.push_str(&format!(" {}", "[personal context]".cyan()));
    }
    if node.status == MessageStatus::Error {
        header.push_str(&format!(" {}", "[error]".red()));
    }

    let mut out = format!("{}\n", header);
    for line in node.text.lines() {
        out.push_str(&format!("{}{}\n", indent, line));
    }
    out.push('\n');
    out
}

/// One row in the session history list
#[derive(Debug, Clone)]
pub struct HistoryRow {
    pub session_id: String,
    pub summary: Option<String>,
    pub updated_at: String,
    pub active: bool,
}

/// The session history list
#[derive(Debug, Clone, Default)]
pub struct HistoryList {
    rows: Vec<HistoryRow>,
    limit: usize,
}

impl HistoryList {
    /// Create a list that renders at most `limit` rows (0 = unlimited)
    pub fn with_limit(limit: usize) -> Self {
        Self {
            rows: Vec::new(),
            limit,
        }
    }

    /// Replace all rows; active highlighting resets
    pub fn set_rows(&mut self, rows: Vec<HistoryRow>) {
        self.rows = rows;
        if self.limit > 0 {
            self.rows.truncate(self.limit);
        }
    }

    /// Highlight one row as active, clearing any previous highlight
    pub fn set_active(&mut self, session_id: &str) {
        for row in &mut self.rows {
            row.active = row.session_id == session_id;
        }
    }

    /// Clear active highlighting from every row
    pub fn clear_active(&mut self) {
        for row in &mut self.rows {
            row.active = false;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[HistoryRow] {
        &self.rows
    }

    /// Render the list for the terminal
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return format!("  {}\n", EmptyState::NoHistory.title().dimmed());
        }

        let mut out = String::new();
        for row in &self.rows {
            let marker = if row.active { "*" } else { " " };
            let summary = row.summary.as_deref().unwrap_or("New conversation");
            out.push_str(&format!(
                "{} {}  {}  {}\n",
                marker,
                row.session_id.yellow(),
                summary,
                row.updated_at.dimmed()
            ));
        }
        out
    }
}

/// The unread-notification counter
///
/// Hidden entirely while the count is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnreadBadge {
    count: u64,
}

impl UnreadBadge {
    pub fn update(&mut self, count: u64) {
        self.count = count;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_visible(&self) -> bool {
        self.count > 0
    }
}

impl fmt::Display for UnreadBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_visible() {
            write!(f, "({} unread)", self.count)
        } else {
            Ok(())
        }
    }
}
