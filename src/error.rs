//! Error types surfaced by the scoring pipeline.
//!
//! Scoring, classification and ranking are total functions; the only failure the
//! core reports is a malformed `NewsItem` (empty title or url). Configuration and
//! I/O problems stay on `anyhow::Result` at the edges.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PipelineError {
    /// A required field was empty or whitespace-only.
    /// `position` is the index inside the submitted batch, when there is one.
    #[error("invalid news item{}: `{field}` must not be empty", fmt_position(.position))]
    InvalidInput {
        field: &'static str,
        position: Option<usize>,
    },
}

impl PipelineError {
    pub fn invalid(field: &'static str) -> Self {
        Self::InvalidInput {
            field,
            position: None,
        }
    }

    /// Attach the batch position to an error raised for a single item.
    pub fn at(self, index: usize) -> Self {
        match self {
            Self::InvalidInput { field, .. } => Self::InvalidInput {
                field,
                position: Some(index),
            },
        }
    }
}

fn fmt_position(position: &Option<usize>) -> String {
    match position {
        Some(i) => format!(" at position {i}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_includes_field_and_position() {
        let e = PipelineError::invalid("url").at(3);
        assert_eq!(
            e.to_string(),
            "invalid news item at position 3: `url` must not be empty"
        );
        assert_eq!(
            PipelineError::invalid("title").to_string(),
            "invalid news item: `title` must not be empty"
        );
    }
}
