//! Writer options.

/// Date pattern Weka uses when an attribute declares none.
pub const DEFAULT_DATE_PATTERN: &str = "yyyy-MM-dd'T'HH:mm:ss";

/// `chrono` rendering of [`DEFAULT_DATE_PATTERN`].
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Options for ARFF output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArffWriterOptions {
    /// Lines written as `%` comments before the relation.
    pub comments: Vec<String>,
    /// Pattern declared on date attributes (Java `SimpleDateFormat` syntax).
    pub date_pattern: String,
    /// `chrono` format used to render date cells; must agree with `date_pattern`.
    pub date_format: String,
}

impl Default for ArffWriterOptions {
    fn default() -> Self {
        Self {
            comments: Vec::new(),
            date_pattern: DEFAULT_DATE_PATTERN.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl ArffWriterOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a comment line.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }

    /// Sets the declared date pattern and the matching `chrono` format.
    #[must_use]
    pub fn with_date_format(
        mut self,
        pattern: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        self.date_pattern = pattern.into();
        self.date_format = format.into();
        self
    }
}
