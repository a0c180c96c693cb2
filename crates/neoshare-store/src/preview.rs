//! Preview dispatcher
//!
//! One `PreviewSession` per opened file. The render mode and editability
//! are computed once at open; after that the session is a small state
//! machine over `Loading -> {Viewing | Editing | Error}`, with
//! `Viewing <-> Editing` when the file is editable and `Closed` as the
//! terminal state. The external editor is mutually exclusive with the
//! inline editor; entering it discards unsaved inline edits.

use std::sync::Arc;
use std::time::{Duration, Instant};

use neoshare_api_client::FileApi;
use neoshare_core::models::{FileEntry, UserIdentity};
use neoshare_core::{can_edit, ClientConfig, ClientError, ClientResult, PreviewMode};

/// How long the "saved" indicator reads as visible after a save.
const SAVE_INDICATOR: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewPhase {
    Loading,
    Viewing,
    Editing,
    Saving,
    Error(String),
    Closed,
}

pub struct PreviewSession {
    api: Arc<dyn FileApi>,
    file: FileEntry,
    mode: PreviewMode,
    editable: bool,
    phase: PreviewPhase,
    content: String,
    preview_html: Option<String>,
    last_save: Option<Instant>,
    external: bool,
    editor_url: String,
    editor_token: String,
}

impl PreviewSession {
    /// Open a file for preview. Classifies the render mode, computes
    /// editability for the viewing identity, and fetches the initial
    /// content for text-like modes. Markdown opens in the rendered view;
    /// other editable text opens straight in the editor.
    pub async fn open(
        api: Arc<dyn FileApi>,
        viewer: Option<&UserIdentity>,
        file: FileEntry,
        config: &ClientConfig,
    ) -> Self {
        let mode = PreviewMode::classify(&file);
        let editable = can_edit(mode, viewer, &file);
        let mut session = PreviewSession {
            api,
            file,
            mode,
            editable,
            phase: PreviewPhase::Loading,
            content: String::new(),
            preview_html: None,
            last_save: None,
            external: false,
            editor_url: config.editor_url.clone(),
            editor_token: config.editor_token.clone(),
        };
        session.hydrate().await;
        session
    }

    /// Fetch whatever the current mode needs and settle into its
    /// default phase.
    async fn hydrate(&mut self) {
        self.phase = PreviewPhase::Loading;
        match self.mode {
            PreviewMode::Text { markdown } => match self.api.get_content(self.file.id).await {
                Ok(response) => {
                    self.content = response.content;
                    self.phase = if self.editable && !markdown {
                        PreviewPhase::Editing
                    } else {
                        PreviewPhase::Viewing
                    };
                }
                Err(e) => self.phase = PreviewPhase::Error(e.to_string()),
            },
            PreviewMode::Notebook => match self.api.get_preview(self.file.id).await {
                Ok(response) => {
                    self.preview_html = Some(response.html);
                    self.phase = PreviewPhase::Viewing;
                }
                Err(e) => self.phase = PreviewPhase::Error(e.to_string()),
            },
            // Binary modes stream through the download endpoint; there
            // is nothing to fetch up front.
            _ => self.phase = PreviewPhase::Viewing,
        }
    }

    pub fn phase(&self) -> &PreviewPhase {
        &self.phase
    }

    pub fn mode(&self) -> PreviewMode {
        self.mode
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn file(&self) -> &FileEntry {
        &self.file
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn preview_html(&self) -> Option<&str> {
        self.preview_html.as_deref()
    }

    pub fn in_external_editor(&self) -> bool {
        self.external
    }

    /// Replace the draft content. Only applies while editing.
    pub fn set_content(&mut self, content: impl Into<String>) {
        if self.phase == PreviewPhase::Editing {
            self.content = content.into();
        }
    }

    /// Switch between the rendered view and the inline editor.
    ///
    /// Entering the editor on a notebook refetches the raw source;
    /// leaving it refetches the rendered preview so it reflects any
    /// save.
    pub async fn toggle_edit(&mut self) -> ClientResult<()> {
        if !self.editable {
            return Err(ClientError::Validation(
                "File is not editable".to_string(),
            ));
        }
        if self.external {
            return Err(ClientError::Validation(
                "External editor is open".to_string(),
            ));
        }
        match self.phase {
            PreviewPhase::Viewing => {
                if self.mode == PreviewMode::Notebook {
                    self.content = self.api.get_content(self.file.id).await?.content;
                }
                self.phase = PreviewPhase::Editing;
                Ok(())
            }
            PreviewPhase::Editing => {
                if self.mode == PreviewMode::Notebook {
                    self.preview_html = Some(self.api.get_preview(self.file.id).await?.html);
                }
                self.phase = PreviewPhase::Viewing;
                Ok(())
            }
            _ => Err(ClientError::Validation(format!(
                "Cannot toggle edit in phase {:?}",
                self.phase
            ))),
        }
    }

    /// Persist the draft. Only valid while editing; on success the
    /// session returns to the rendered view with a transient save
    /// indicator, on failure it stays in the editor with the draft
    /// intact.
    pub async fn save(&mut self) -> ClientResult<()> {
        if self.phase != PreviewPhase::Editing {
            return Err(ClientError::Validation(
                "Nothing to save outside edit mode".to_string(),
            ));
        }
        self.phase = PreviewPhase::Saving;
        match self.api.put_content(self.file.id, &self.content).await {
            Ok(()) => {
                self.phase = PreviewPhase::Viewing;
                self.last_save = Some(Instant::now());
                Ok(())
            }
            Err(e) => {
                self.phase = PreviewPhase::Editing;
                Err(e)
            }
        }
    }

    pub fn save_indicator_visible(&self) -> bool {
        self.last_save
            .map(|at| at.elapsed() < SAVE_INDICATOR)
            .unwrap_or(false)
    }

    /// Hand the file over to the external editor. Unsaved inline edits
    /// are discarded. Returns the editor URL to open.
    pub async fn enter_external_editor(&mut self) -> ClientResult<String> {
        if !self.editable {
            return Err(ClientError::Validation(
                "File is not editable".to_string(),
            ));
        }
        if self.phase == PreviewPhase::Closed {
            return Err(ClientError::Validation("Preview is closed".to_string()));
        }
        self.external = true;
        self.phase = PreviewPhase::Viewing;
        Ok(self.external_editor_url())
    }

    /// Come back from the external editor, refetching so the inline
    /// view reflects edits made there.
    pub async fn return_to_inline(&mut self) -> ClientResult<()> {
        if !self.external {
            return Err(ClientError::Validation(
                "External editor is not open".to_string(),
            ));
        }
        self.external = false;
        self.hydrate().await;
        Ok(())
    }

    /// URL of the file inside the external editor: `notebooks/` for
    /// .ipynb, `edit/` for anything else, rooted at `public` or the
    /// owner's id.
    pub fn external_editor_url(&self) -> String {
        let base = self.editor_url.trim_end_matches('/');
        let verb = if self.file.name.to_lowercase().ends_with(".ipynb") {
            "notebooks"
        } else {
            "edit"
        };
        let root = if self.file.is_public {
            "public".to_string()
        } else {
            self.file.user_id.to_string()
        };
        let folder = self.file.path.trim_matches('/');
        let mut url = if folder.is_empty() {
            format!("{base}/{verb}/{root}/{}", self.file.name)
        } else {
            format!("{base}/{verb}/{root}/{folder}/{}", self.file.name)
        };
        if !self.editor_token.is_empty() {
            url.push_str("?token=");
            url.push_str(&urlencoding::encode(&self.editor_token));
        }
        url
    }

    /// Terminal. The session accepts no further operations.
    pub fn close(&mut self) {
        self.phase = PreviewPhase::Closed;
    }
}
