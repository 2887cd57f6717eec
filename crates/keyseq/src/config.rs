#![forbid(unsafe_code)]

//! Construction-time configuration for [`KeyedSequence`].
//!
//! [`KeyedSequence`]: crate::KeyedSequence

/// Configuration for a keyed sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceConfig {
    /// Initial storage capacity. Default: 0.
    pub capacity: usize,
    /// Name attached to every log event emitted by the sequence, so several
    /// lists in one application can be told apart. Default: none.
    pub label: Option<String>,
}

impl SequenceConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial storage capacity.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the log label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label used in log events (`"-"` when unset).
    #[must_use]
    pub fn label_or_default(&self) -> &str {
        self.label.as_deref().unwrap_or("-")
    }
}
