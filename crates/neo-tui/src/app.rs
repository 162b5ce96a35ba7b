use std::path::Path;
use std::sync::mpsc::Receiver;
use std::time::Instant;

use crossterm::event::KeyEvent;
use neo_core::ChatSession;
use neo_core::models::attachment::StagedAttachment;
use neo_core::models::error_store::{ErrorEntry, ErrorStore};
use neo_core::models::library::{ChatHistoryEntry, Memory, sample_chat_history, sample_memories};
use neo_core::models::notifications::{NotificationKind, NotificationStore};
use neo_core::models::overlay::DismissibleOverlay;
use neo_core::models::session_event::SessionEvent;
use neo_core::services::search_filter::filter_entries;
use neo_core::settings::{AppConfig, SessionStore, Theme};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::ListState;
use tracing::{debug, info, warn};
use tui_textarea::{CursorMove, TextArea};

pub const LOGIN_FAILED: &str = "Login failed. Please try again.";
pub const LOGOUT_FAILED: &str = "Logout failed. Please try again.";
pub const ATTACH_FAILED: &str = "Could not read that file.";

const COMPOSER_PLACEHOLDER: &str = "Ask anything... (i to type)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Chat,
    Chats,
    Memories,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the composer
    Editing,
    /// Typing a file path to attach
    AttachPath,
    /// Typing into a list page's search bar
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileItem {
    UpgradePlan,
    Settings,
    Help,
    Logout,
}

impl ProfileItem {
    pub const ALL: [ProfileItem; 4] = [
        ProfileItem::UpgradePlan,
        ProfileItem::Settings,
        ProfileItem::Help,
        ProfileItem::Logout,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::UpgradePlan => "Upgrade plan",
            Self::Settings => "Settings",
            Self::Help => "Help",
            Self::Logout => "Log out",
        }
    }
}

/// Which list a row menu belongs to; the id is the entry's id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKey {
    Recent(String),
    Chat(String),
    Memory(String),
}

impl RowKey {
    pub fn items(&self) -> &'static [&'static str] {
        match self {
            Self::Recent(_) => &["Share", "Rename", "Archive", "Delete"],
            Self::Chat(_) | Self::Memory(_) => &["Edit", "Star", "Delete"],
        }
    }
}

/// Screen areas from the last frame, used for mouse hit-testing
#[derive(Debug, Default)]
pub struct HitAreas {
    pub profile_menu: Option<Rect>,
    pub row_menu: Option<Rect>,
    pub chat_area: Option<Rect>,
}

pub struct App {
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub config: AppConfig,

    pub session: ChatSession,
    pub settings: SessionStore,
    pub notifications: NotificationStore,
    pub error_store: ErrorStore,
    error_rx: Option<Receiver<ErrorEntry>>,

    // Sidebar
    pub sidebar_collapsed: bool,
    pub profile_menu: DismissibleOverlay<()>,
    pub profile_selection: usize,
    pub row_menu: DismissibleOverlay<RowKey>,
    pub row_menu_selection: usize,

    /// Editor mirroring the composer draft text
    pub composer_input: TextArea<'static>,
    pub attach_input: String,

    // Chat view
    pub chat_scroll: u16,
    pub follow_bottom: bool,
    pub animation_frame: u8,

    // List pages
    pub chats: Vec<ChatHistoryEntry>,
    pub memories: Vec<Memory>,
    pub chats_query: String,
    pub memories_query: String,
    pub list_state: ListState,

    pub hit_areas: HitAreas,
}

impl App {
    pub fn new(
        config: AppConfig,
        session: ChatSession,
        settings: SessionStore,
        notifications: NotificationStore,
        error_store: ErrorStore,
        error_rx: Option<Receiver<ErrorEntry>>,
    ) -> Self {
        let screen = if settings.is_authenticated() {
            Screen::Chat
        } else {
            Screen::Landing
        };

        Self {
            should_quit: false,
            screen,
            input_mode: InputMode::Normal,
            config,
            session,
            settings,
            notifications,
            error_store,
            error_rx,
            sidebar_collapsed: false,
            profile_menu: DismissibleOverlay::new("profile"),
            profile_selection: 0,
            row_menu: DismissibleOverlay::new("row-menu"),
            row_menu_selection: 0,
            composer_input: composer_input_for(""),
            attach_input: String::new(),
            chat_scroll: 0,
            follow_bottom: true,
            animation_frame: 0,
            chats: sample_chat_history(),
            memories: sample_memories(),
            chats_query: String::new(),
            memories_query: String::new(),
            list_state: ListState::default(),
            hit_areas: HitAreas::default(),
        }
    }

    pub fn theme(&self) -> Theme {
        self.settings.theme()
    }

    /// Hand back the settings store for the final flush
    pub fn into_settings(self) -> SessionStore {
        self.settings
    }

    pub fn tick(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % 3;
        self.notifications.expire(Instant::now());
        if let Some(rx) = self.error_rx.as_ref() {
            self.error_store.drain_from(rx);
        }
    }

    // Session

    pub async fn login(&mut self) {
        match self.settings.login().await {
            Ok(()) => {
                self.screen = Screen::Chat;
                self.input_mode = InputMode::Normal;
            }
            Err(e) => {
                warn!(error = ?e, "Login failed");
                self.notifications.transient_error(LOGIN_FAILED);
            }
        }
    }

    /// Always ends on the landing screen; a failed save only adds a toast
    pub async fn logout(&mut self) {
        self.profile_menu.close();
        if let Err(e) = self.settings.logout().await {
            warn!(error = ?e, "Logout not saved");
            self.notifications.transient_error(LOGOUT_FAILED);
        }
        self.session.new_chat();
        self.sync_composer_input();
        self.screen = Screen::Landing;
        self.input_mode = InputMode::Normal;
    }

    pub async fn toggle_theme(&mut self) {
        match self.settings.toggle_theme().await {
            Ok(theme) => debug!(theme = theme.as_str(), "Theme switched"),
            Err(e) => warn!(error = ?e, "Theme not saved"),
        }
    }

    // Navigation

    pub fn navigate(&mut self, screen: Screen) {
        if self.screen == screen {
            return;
        }
        self.row_menu.close();
        self.screen = screen;
        self.input_mode = InputMode::Normal;
        self.list_state = ListState::default();
        self.clamp_selection();
        info!(screen = ?screen, "Navigated");
    }

    pub fn new_chat(&mut self) {
        self.session.new_chat();
        self.sync_composer_input();
        self.chat_scroll = 0;
        self.follow_bottom = true;
        self.navigate(Screen::Chat);
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
        if self.sidebar_collapsed {
            self.profile_menu.close();
        }
    }

    /// Profile button: expands a collapsed sidebar and opens the menu
    pub fn toggle_profile_menu(&mut self) {
        if self.sidebar_collapsed {
            self.sidebar_collapsed = false;
            self.profile_menu.open(());
        } else {
            self.profile_menu.toggle(());
        }
        self.profile_selection = 0;
    }

    pub async fn activate_profile_item(&mut self) {
        let Some(item) = ProfileItem::ALL.get(self.profile_selection).copied() else {
            return;
        };
        match item {
            ProfileItem::Logout => self.logout().await,
            other => {
                debug!(item = other.label(), "Profile item selected");
                self.profile_menu.close();
            }
        }
    }

    // Composer

    pub fn draft_text(&self) -> &str {
        self.session.composer().text()
    }

    /// Replace the draft, cursor at the end
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.session.update_draft_text(text);
        self.sync_composer_input();
    }

    /// Feed a key to the editor and push the edited text into the draft
    pub fn edit_composer(&mut self, key: KeyEvent) {
        if self.composer_input.input(key) {
            self.session
                .update_draft_text(self.composer_input.lines().join("\n"));
        }
    }

    pub fn insert_newline(&mut self) {
        self.composer_input.insert_newline();
        self.session
            .update_draft_text(self.composer_input.lines().join("\n"));
    }

    /// Rebuild the editor when the draft changed underneath it
    /// (submit, new chat, dictation)
    pub fn sync_composer_input(&mut self) {
        let text = self.session.composer().text();
        if self.composer_input.lines().join("\n") != text {
            self.composer_input = composer_input_for(text);
        }
    }

    pub fn submit(&mut self) {
        if self.session.submit().is_ok() {
            self.sync_composer_input();
            self.follow_bottom = true;
        }
    }

    pub fn handle_session_event(&mut self, event: SessionEvent) {
        self.session.handle_event(event);
        self.sync_composer_input();
    }

    /// Stage the file at `path`, raising a toast when it cannot be read
    pub async fn attach_path(&mut self, path: &str) {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return;
        }
        let expanded = expand_home(trimmed);
        match StagedAttachment::from_path(Path::new(&expanded)).await {
            Ok(attachment) => self.session.stage_attachment(attachment),
            Err(e) => {
                warn!(error = ?e, path = %expanded, "Failed to stage attachment");
                self.notifications.transient_error(ATTACH_FAILED);
            }
        }
    }

    pub fn toggle_dictation(&mut self) {
        if let Err(e) = self.session.toggle_dictation() {
            debug!(error = %e, "Dictation toggle failed");
        }
    }

    // List pages

    pub fn query(&self) -> &str {
        match self.screen {
            Screen::Memories => &self.memories_query,
            _ => &self.chats_query,
        }
    }

    pub fn query_mut(&mut self) -> &mut String {
        match self.screen {
            Screen::Memories => &mut self.memories_query,
            _ => &mut self.chats_query,
        }
    }

    pub fn filtered_chats(&self) -> Vec<&ChatHistoryEntry> {
        filter_entries(&self.chats, &self.chats_query)
    }

    pub fn filtered_memories(&self) -> Vec<&Memory> {
        filter_entries(&self.memories, &self.memories_query)
    }

    /// Row keys of the list currently in focus
    pub fn visible_rows(&self) -> Vec<RowKey> {
        match self.screen {
            Screen::Chats => self
                .filtered_chats()
                .into_iter()
                .map(|chat| RowKey::Chat(chat.id.clone()))
                .collect(),
            Screen::Memories => self
                .filtered_memories()
                .into_iter()
                .map(|memory| RowKey::Memory(memory.id.clone()))
                .collect(),
            Screen::Chat => self
                .chats
                .iter()
                .map(|chat| RowKey::Recent(chat.id.clone()))
                .collect(),
            Screen::Landing => Vec::new(),
        }
    }

    pub fn select_next_row(&mut self) {
        let len = self.visible_rows().len();
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let next = self.list_state.selected().map_or(0, |i| (i + 1).min(len - 1));
        self.list_state.select(Some(next));
    }

    pub fn select_prev_row(&mut self) {
        let prev = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(prev));
    }

    /// Keep the selection on a row that survives the current filter
    pub fn clamp_selection(&mut self) {
        let len = self.visible_rows().len();
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None => self.list_state.select(Some(0)),
            _ => {}
        }
    }

    pub fn toggle_row_menu(&mut self) {
        let rows = self.visible_rows();
        let Some(key) = self.list_state.selected().and_then(|i| rows.get(i).cloned()) else {
            return;
        };
        self.row_menu.toggle(key);
        self.row_menu_selection = 0;
    }

    /// Menu entries only close the menu
    pub fn activate_row_item(&mut self) {
        if let Some(key) = self.row_menu.current() {
            let item = key.items().get(self.row_menu_selection).copied().unwrap_or_default();
            debug!(?key, item, "Row menu item selected");
        }
        self.row_menu.close();
    }

    /// Pointer went down at (x, y); dismiss overlays it landed outside of
    pub fn pointer_down(&mut self, x: u16, y: u16) {
        let inside = |area: Option<Rect>| area.is_some_and(|r| point_in_rect(x, y, r));
        let in_profile = inside(self.hit_areas.profile_menu);
        let in_row_menu = inside(self.hit_areas.row_menu);
        self.profile_menu.handle_pointer_down(in_profile);
        self.row_menu.handle_pointer_down(in_row_menu);
    }

    /// A blocking toast holds all input until it is acknowledged
    pub fn is_blocked(&self) -> bool {
        self.notifications.has_blocking()
    }

    pub fn acknowledge_blocking(&mut self) {
        let blocking = self
            .notifications
            .all()
            .into_iter()
            .rev()
            .find(|n| n.kind == NotificationKind::Blocking);
        if let Some(toast) = blocking {
            self.notifications.dismiss(toast.id);
            debug!(message = %toast.message, "Notification acknowledged");
        }
    }

    /// Esc in normal mode: close the innermost overlay
    pub fn dismiss(&mut self) -> bool {
        if self.row_menu.close().is_some() {
            return true;
        }
        if self.profile_menu.close().is_some() {
            return true;
        }
        self.notifications.dismiss_latest().is_some()
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_bottom = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }
}

pub fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn composer_input_for(text: &str) -> TextArea<'static> {
    let mut input = TextArea::from(text.split('\n').map(str::to_string));
    input.set_placeholder_text(COMPOSER_PLACEHOLDER);
    input.set_cursor_line_style(Style::default());
    input.move_cursor(CursorMove::Bottom);
    input.move_cursor(CursorMove::End);
    input
}

fn expand_home(path: &str) -> String {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest).display().to_string(),
        _ => path.to_string(),
    }
}
