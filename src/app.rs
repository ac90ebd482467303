use std::path::PathBuf;

use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;

use ragask::form::load_attachment;
use ragask::{Answer, Config, QueryError, QueryForm, QueryMode, RagClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Query,
    Mode,
    Attachment,
    Answer,
}

/// Last known state of the backend's `/health` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Health {
    Unknown,
    Checking,
    Up(String),
    Down,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: Focus,

    // Form
    pub form: QueryForm,
    pub query_task: Option<JoinHandle<Result<Answer, QueryError>>>,

    // Attachment path being typed (committed to the form on submit)
    pub attachments_enabled: bool,
    pub attachment_input: String,
    pub attachment_cursor: usize,

    // Answer panel
    pub answer_scroll: u16,
    pub answer_height: u16,
    pub answer_lines: u16,

    // Mode picker popup
    pub show_mode_picker: bool,
    pub mode_picker_state: ListState,

    // Where the chosen mode is persisted (None = user config dir)
    pub config_path: Option<PathBuf>,

    // Backend
    pub client: RagClient,
    pub health: Health,
    pub health_task: Option<JoinHandle<Result<String, QueryError>>>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub answer_area: Option<Rect>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let client = RagClient::new(&config.endpoint).with_attachments(config.attachments);

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: Focus::Query,

            form: QueryForm::new(config.default_mode),
            query_task: None,

            attachments_enabled: config.attachments,
            attachment_input: String::new(),
            attachment_cursor: 0,

            answer_scroll: 0,
            answer_height: 0,
            answer_lines: 0,

            show_mode_picker: false,
            mode_picker_state: ListState::default(),

            config_path: None,

            client,
            health: Health::Unknown,
            health_task: None,

            animation_frame: 0,

            answer_area: None,
        }
    }

    /// Start a submission in the background. Returns false when the form
    /// refused it (blank text or already pending).
    pub fn submit_query(&mut self) -> bool {
        if self.query_task.is_some() {
            return false;
        }
        self.commit_attachment();

        let Some(query) = self.form.begin_submit() else {
            return false;
        };

        tracing::info!(mode = %query.mode(), "submitting query");
        self.answer_scroll = 0;
        self.animation_frame = 0;

        let client = self.client.clone();
        let attachment_path = self.form.attachment_path.clone();
        self.query_task = Some(tokio::spawn(async move {
            let query = load_attachment(query, attachment_path.as_deref()).await?;
            client.ask(&query).await
        }));
        true
    }

    /// Collect finished background work. Called on every tick.
    pub async fn poll_tasks(&mut self) {
        if self.query_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.query_task.take() {
                let outcome = match task.await {
                    Ok(outcome) => outcome,
                    Err(e) => Err(QueryError::Aborted(e.to_string())),
                };
                self.form.complete(outcome);
            }
        }

        if self.health_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.health_task.take() {
                self.health = match task.await {
                    Ok(Ok(status)) => Health::Up(status),
                    Ok(Err(e)) => {
                        tracing::warn!("health check failed: {}", e);
                        Health::Down
                    }
                    Err(e) => {
                        tracing::warn!("health check task failed: {}", e);
                        Health::Down
                    }
                };
            }
        }
    }

    pub fn check_health(&mut self) {
        if self.health_task.is_some() {
            return;
        }
        self.health = Health::Checking;
        let client = self.client.clone();
        self.health_task = Some(tokio::spawn(async move { client.health().await }));
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.form.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    fn commit_attachment(&mut self) {
        let path = self.attachment_input.trim();
        self.form.attachment_path = if self.attachments_enabled && !path.is_empty() {
            Some(PathBuf::from(path))
        } else {
            None
        };
    }

    pub fn clear_attachment(&mut self) {
        self.attachment_input.clear();
        self.attachment_cursor = 0;
        self.form.attachment_path = None;
    }

    // Focus cycling, skipping the attachment row when attachments are off
    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            Focus::Query => Focus::Mode,
            Focus::Mode if self.attachments_enabled => Focus::Attachment,
            Focus::Mode | Focus::Attachment => Focus::Answer,
            Focus::Answer => Focus::Query,
        };
        self.sync_input_mode();
    }

    pub fn focus_prev(&mut self) {
        self.focus = match self.focus {
            Focus::Query => Focus::Answer,
            Focus::Mode => Focus::Query,
            Focus::Attachment => Focus::Mode,
            Focus::Answer if self.attachments_enabled => Focus::Attachment,
            Focus::Answer => Focus::Mode,
        };
        self.sync_input_mode();
    }

    /// Text fields edit on focus; everything else is navigated in Normal mode.
    fn sync_input_mode(&mut self) {
        self.input_mode = match self.focus {
            Focus::Query | Focus::Attachment => InputMode::Editing,
            Focus::Mode | Focus::Answer => InputMode::Normal,
        };
        if self.focus == Focus::Query {
            self.form.cursor = self.form.input.chars().count();
        }
        if self.focus == Focus::Attachment {
            self.attachment_cursor = self.attachment_input.chars().count();
        }
    }

    // Mode selection
    pub fn set_mode(&mut self, mode: QueryMode) {
        if self.form.mode == mode {
            return;
        }
        self.form.mode = mode;
        let saved = match &self.config_path {
            Some(path) => Config::save_default_mode_to(path, mode),
            None => Config::save_default_mode(mode),
        };
        if let Err(e) = saved {
            tracing::warn!("mode not persisted, config left untouched: {}", e);
        }
    }

    pub fn next_mode(&mut self) {
        self.set_mode(self.form.mode.next());
    }

    pub fn prev_mode(&mut self) {
        self.set_mode(self.form.mode.prev());
    }

    pub fn open_mode_picker(&mut self) {
        let current_idx = QueryMode::all()
            .iter()
            .position(|m| *m == self.form.mode)
            .unwrap_or(0);
        self.mode_picker_state.select(Some(current_idx));
        self.show_mode_picker = true;
    }

    pub fn mode_picker_nav_down(&mut self) {
        let len = QueryMode::all().len();
        let i = self.mode_picker_state.selected().map_or(0, |i| (i + 1) % len);
        self.mode_picker_state.select(Some(i));
    }

    pub fn mode_picker_nav_up(&mut self) {
        let len = QueryMode::all().len();
        let i = self
            .mode_picker_state
            .selected()
            .map_or(0, |i| if i == 0 { len - 1 } else { i - 1 });
        self.mode_picker_state.select(Some(i));
    }

    pub fn select_mode_from_picker(&mut self) {
        if let Some(mode) = self
            .mode_picker_state
            .selected()
            .and_then(|i| QueryMode::all().get(i).copied())
        {
            self.set_mode(mode);
        }
        self.show_mode_picker = false;
    }

    // Answer scrolling
    fn max_answer_scroll(&self) -> u16 {
        self.answer_lines.saturating_sub(self.answer_height)
    }

    pub fn scroll_down(&mut self) {
        self.answer_scroll = (self.answer_scroll + 1).min(self.max_answer_scroll());
    }

    pub fn scroll_up(&mut self) {
        self.answer_scroll = self.answer_scroll.saturating_sub(1);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half = (self.answer_height / 2).max(1);
        self.answer_scroll = (self.answer_scroll + half).min(self.max_answer_scroll());
    }

    pub fn scroll_half_page_up(&mut self) {
        let half = (self.answer_height / 2).max(1);
        self.answer_scroll = self.answer_scroll.saturating_sub(half);
    }

    pub fn scroll_to_top(&mut self) {
        self.answer_scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.answer_scroll = self.max_answer_scroll();
    }
}
