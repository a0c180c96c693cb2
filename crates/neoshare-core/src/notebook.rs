//! Jupyter notebook document model
//!
//! Structured model of the `.ipynb` JSON format, for read-only cell
//! rendering in the client. Parsing failures surface as `ClientError::Render`
//! so a malformed notebook degrades to a contained error message instead
//! of taking down the viewer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Cell/output source text: the format allows both a plain string and an
/// array of lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellSource {
    Text(String),
    Lines(Vec<String>),
}

impl CellSource {
    /// Join into a single string, matching how the lines were written.
    pub fn joined(&self) -> String {
        match self {
            CellSource::Text(text) => text.clone(),
            CellSource::Lines(lines) => lines.concat(),
        }
    }
}

impl Default for CellSource {
    fn default() -> Self {
        CellSource::Text(String::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum CellOutput {
    Stream {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        text: CellSource,
    },
    ExecuteResult {
        #[serde(default)]
        data: BTreeMap<String, CellSource>,
        #[serde(default)]
        execution_count: Option<i64>,
    },
    DisplayData {
        #[serde(default)]
        data: BTreeMap<String, CellSource>,
    },
    Error {
        #[serde(default)]
        ename: Option<String>,
        #[serde(default)]
        evalue: Option<String>,
        #[serde(default)]
        traceback: Vec<String>,
    },
    /// Output types added by future format revisions are kept but not
    /// rendered.
    #[serde(other)]
    Unknown,
}

impl CellOutput {
    /// Best-effort plain-text rendition of the output.
    pub fn plain_text(&self) -> Option<String> {
        match self {
            CellOutput::Stream { text, .. } => Some(text.joined()),
            CellOutput::ExecuteResult { data, .. } | CellOutput::DisplayData { data } => {
                data.get("text/plain").map(CellSource::joined)
            }
            CellOutput::Error {
                evalue, traceback, ..
            } => {
                if traceback.is_empty() {
                    evalue.clone()
                } else {
                    Some(traceback.join("\n"))
                }
            }
            CellOutput::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Markdown,
    Code,
    Raw,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: CellKind,
    #[serde(default)]
    pub source: CellSource,
    #[serde(default)]
    pub execution_count: Option<i64>,
    #[serde(default)]
    pub outputs: Vec<CellOutput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub nbformat: Option<i64>,
    #[serde(default)]
    pub nbformat_minor: Option<i64>,
}

impl Notebook {
    /// Parse notebook JSON. Any structural problem is a render error.
    pub fn parse(raw: &str) -> ClientResult<Notebook> {
        serde_json::from_str(raw)
            .map_err(|e| ClientError::Render(format!("Invalid notebook structure: {e}")))
    }
}
