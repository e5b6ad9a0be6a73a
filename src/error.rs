use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResampleError {
    #[error("Invalid sampling rate: {0} Hz (must be a finite number above zero)")]
    InvalidSamplingRate(f64),

    #[error("Degenerate bracket: both neighbours share timestamp {0}")]
    DegenerateBracket(i64),

    #[error("Timestamps decrease at row {index}: {previous} followed by {current}")]
    UnsortedTimestamps {
        index: usize,
        previous: i64,
        current: i64,
    },

    #[error("Channel '{name}' has {actual} values but the series has {expected} timestamps")]
    ChannelLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("{names} channel names given for {columns} channel columns")]
    ChannelCount { names: usize, columns: usize },

    #[error("Channel layouts differ: {expected:?} vs {actual:?}")]
    ChannelMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Time column index {index} is past the last column ({columns} columns)")]
    TimeColumnIndex { index: usize, columns: usize },

    #[error("Column '{0}' appears in more than one joined series")]
    DuplicateColumn(String),
}

pub type Result<T> = std::result::Result<T, ResampleError>;
