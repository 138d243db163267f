//! Structured error types for xlpdf.

/// All errors that can occur while reading a workbook and writing its PDF.
#[derive(Debug, thiserror::Error)]
pub enum XlpdfError {
    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// JSON (options or drawing elements) error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid cell reference.
    #[error("Invalid cell reference: {0}")]
    CellRef(String),

    /// General parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The workbook has no sheet with this name.
    #[error("Unknown sheet: {0}")]
    UnknownSheet(String),

    /// A row, column or cell lookup could not be answered.
    ///
    /// Layout degrades these to a zero-size or default value; they never
    /// abort a sheet.
    #[error("Geometry lookup failed for {what}: {reason}")]
    GeometryLookup { what: String, reason: String },

    /// Font registration or selection failed.
    #[error("Font error: {0}")]
    Font(String),

    /// A drawing element carried a tag no renderer handles.
    #[error("Unsupported element type: {0}")]
    UnsupportedElement(String),

    /// The finished document could not be serialized or saved.
    #[error("Failed to finalize output: {0}")]
    Finalize(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, XlpdfError>;

impl XlpdfError {
    pub(crate) fn lookup(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::GeometryLookup {
            what: what.into(),
            reason: reason.into(),
        }
    }
}
