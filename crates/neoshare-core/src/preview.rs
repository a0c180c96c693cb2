//! Preview mode classification
//!
//! A single pure function maps a listing entry to exactly one render mode.
//! The view layer dispatches on the returned variant; nothing here touches
//! the network or the DOM equivalent.

use crate::models::{FileEntry, Role, UserIdentity};

/// Closed set of render modes for an opened file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewMode {
    /// Inline `<img>`-style viewer, streamed via the download endpoint.
    Image,
    /// Embedded PDF frame.
    Pdf,
    /// Spreadsheet-to-HTML renderer (.xlsx/.xls/.csv).
    Spreadsheet,
    /// Word document renderer (.docx).
    Document,
    /// Jupyter notebook: structured cell list or server-rendered HTML.
    Notebook,
    /// Inline text editor/viewer. `markdown` selects the rendered
    /// (read) presentation by default.
    Text { markdown: bool },
    /// No preview available; offer download instead.
    Unsupported,
}

impl PreviewMode {
    /// Classify an entry. Priority order: image MIME, PDF, spreadsheet
    /// suffix, document suffix, notebook suffix, text-like, fallback.
    /// Extension matching is case-insensitive.
    pub fn classify(entry: &FileEntry) -> PreviewMode {
        if entry.is_directory() {
            return PreviewMode::Unsupported;
        }

        let name = entry.name.to_lowercase();
        let mime = entry.mime_type.as_deref().unwrap_or("");

        if mime.starts_with("image/") {
            return PreviewMode::Image;
        }
        if mime == "application/pdf" || name.ends_with(".pdf") {
            return PreviewMode::Pdf;
        }
        if name.ends_with(".xlsx") || name.ends_with(".xls") || name.ends_with(".csv") {
            return PreviewMode::Spreadsheet;
        }
        if name.ends_with(".docx") {
            return PreviewMode::Document;
        }
        if name.ends_with(".ipynb") {
            return PreviewMode::Notebook;
        }

        let markdown = name.ends_with(".md") || mime == "text/markdown";
        let text_like = mime.starts_with("text/")
            || mime == "application/json"
            || mime == "application/javascript"
            || mime == "application/x-python"
            || markdown
            || name.ends_with(".py")
            || name.ends_with(".ts")
            || name.ends_with(".tsx")
            || name.ends_with(".json");
        if text_like {
            return PreviewMode::Text { markdown };
        }

        PreviewMode::Unsupported
    }

    pub fn is_text_like(&self) -> bool {
        matches!(self, PreviewMode::Text { .. } | PreviewMode::Notebook)
    }
}

/// Whether the viewing identity may edit the opened file.
///
/// Text and notebook content only; the owner, an admin, or anyone
/// authenticated when the file is public. Computed once per opened file.
pub fn can_edit(mode: PreviewMode, viewer: Option<&UserIdentity>, entry: &FileEntry) -> bool {
    if !mode.is_text_like() {
        return false;
    }
    match viewer {
        Some(user) => {
            entry.is_public || user.role == Role::Admin || user.id == entry.user_id
        }
        None => false,
    }
}
