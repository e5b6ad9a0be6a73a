use crate::error::{ResampleError, Result};
use log::debug;
use serde::Serialize;

/// One row of a series: a timestamp and one value per channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: i64,
    pub values: Vec<Option<f64>>,
}

/// Multi-channel samples of one sensor sharing a single millisecond timestamp column.
///
/// `time_index` remembers where the timestamp column sat among the original
/// columns so that [`SensorSeries::column_names`] reproduces the input layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSeries {
    time_column: String,
    time_index: usize,
    channel_names: Vec<String>,
    timestamps: Vec<i64>,
    channels: Vec<Vec<Option<f64>>>,
}

/// Output of the resampler. Same layout as its input, values on the new grid.
pub type ResampledSeries = SensorSeries;

impl SensorSeries {
    pub fn new(
        time_column: impl Into<String>,
        time_index: usize,
        channel_names: Vec<String>,
        timestamps: Vec<i64>,
        channels: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        if time_index > channel_names.len() {
            return Err(ResampleError::TimeColumnIndex {
                index: time_index,
                columns: channel_names.len() + 1,
            });
        }
        if channels.len() != channel_names.len() {
            return Err(ResampleError::ChannelCount {
                names: channel_names.len(),
                columns: channels.len(),
            });
        }
        for (name, values) in channel_names.iter().zip(&channels) {
            if values.len() != timestamps.len() {
                return Err(ResampleError::ChannelLength {
                    name: name.clone(),
                    expected: timestamps.len(),
                    actual: values.len(),
                });
            }
        }

        Ok(Self {
            time_column: time_column.into(),
            time_index,
            channel_names,
            timestamps,
            channels,
        })
    }

    /// Series with the timestamp column first. NaN values become missing.
    pub fn from_columns(
        time_column: impl Into<String>,
        timestamps: Vec<i64>,
        channels: Vec<(&str, Vec<f64>)>,
    ) -> Result<Self> {
        let (names, values): (Vec<String>, Vec<Vec<Option<f64>>>) = channels
            .into_iter()
            .map(|(name, v)| {
                let values = v.into_iter().map(|x| (!x.is_nan()).then_some(x)).collect();
                (name.to_string(), values)
            })
            .unzip();
        Self::new(time_column, 0, names, timestamps, values)
    }

    pub fn from_samples(
        time_column: impl Into<String>,
        time_index: usize,
        channel_names: Vec<String>,
        samples: Vec<Sample>,
    ) -> Result<Self> {
        let mut timestamps = Vec::with_capacity(samples.len());
        let mut channels = vec![Vec::with_capacity(samples.len()); channel_names.len()];
        for sample in samples {
            if sample.values.len() != channel_names.len() {
                return Err(ResampleError::ChannelLength {
                    name: format!("<row at {}>", sample.timestamp),
                    expected: channel_names.len(),
                    actual: sample.values.len(),
                });
            }
            timestamps.push(sample.timestamp);
            for (column, value) in channels.iter_mut().zip(sample.values) {
                column.push(value);
            }
        }
        Self::new(time_column, time_index, channel_names, timestamps, channels)
    }

    /// Empty series carrying the same column layout as `self`.
    pub fn empty_like(&self) -> Self {
        Self {
            time_column: self.time_column.clone(),
            time_index: self.time_index,
            channel_names: self.channel_names.clone(),
            timestamps: Vec::new(),
            channels: vec![Vec::new(); self.channel_names.len()],
        }
    }

    pub fn time_column(&self) -> &str {
        &self.time_column
    }

    pub fn time_index(&self) -> usize {
        self.time_index
    }

    pub fn channel_names(&self) -> &[String] {
        &self.channel_names
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn channels(&self) -> &[Vec<Option<f64>>] {
        &self.channels
    }

    pub fn channel(&self, name: &str) -> Option<&[Option<f64>]> {
        self.channel_names
            .iter()
            .position(|n| n == name)
            .map(|i| self.channels[i].as_slice())
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// All column names in their original order, timestamp column included.
    pub fn column_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.channel_names.iter().map(String::as_str).collect();
        names.insert(self.time_index, &self.time_column);
        names
    }

    pub fn sample(&self, row: usize) -> Option<Sample> {
        let timestamp = *self.timestamps.get(row)?;
        Some(Sample {
            timestamp,
            values: self.channels.iter().map(|c| c[row]).collect(),
        })
    }

    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        (0..self.len()).filter_map(move |row| self.sample(row))
    }

    pub(crate) fn is_row_complete(&self, row: usize) -> bool {
        self.channels.iter().all(|c| c[row].is_some())
    }

    /// Error on the first row whose timestamp is lower than its predecessor's.
    pub fn check_sorted(&self) -> Result<()> {
        for (i, pair) in self.timestamps.windows(2).enumerate() {
            if pair[1] < pair[0] {
                return Err(ResampleError::UnsortedTimestamps {
                    index: i + 1,
                    previous: pair[0],
                    current: pair[1],
                });
            }
        }
        Ok(())
    }

    /// Stable sort of rows by timestamp.
    pub fn sort_by_time(&mut self) {
        if self.timestamps.windows(2).all(|w| w[0] <= w[1]) {
            return;
        }
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by_key(|&i| self.timestamps[i]);
        self.keep_rows(&order);
    }

    /// Collapse runs of equal timestamps onto their first row. Expects sorted input.
    pub fn dedup_timestamps(&mut self) -> usize {
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| i == 0 || self.timestamps[i] != self.timestamps[i - 1])
            .collect();
        let removed = self.len() - keep.len();
        if removed > 0 {
            debug!("Dropping {} duplicate timestamps", removed);
            self.keep_rows(&keep);
        }
        removed
    }

    /// Remove every row with at least one missing channel value.
    pub fn drop_incomplete(&mut self) -> usize {
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| self.is_row_complete(i))
            .collect();
        let removed = self.len() - keep.len();
        if removed > 0 {
            self.keep_rows(&keep);
        }
        removed
    }

    /// Append the rows of `other`. Both series must share the same channel names.
    pub fn concat(&mut self, other: &SensorSeries) -> Result<()> {
        if other.channel_names != self.channel_names {
            return Err(ResampleError::ChannelMismatch {
                expected: self.channel_names.clone(),
                actual: other.channel_names.clone(),
            });
        }
        self.timestamps.extend_from_slice(&other.timestamps);
        for (mine, theirs) in self.channels.iter_mut().zip(&other.channels) {
            mine.extend_from_slice(theirs);
        }
        Ok(())
    }

    fn keep_rows(&mut self, rows: &[usize]) {
        self.timestamps = rows.iter().map(|&i| self.timestamps[i]).collect();
        for column in self.channels.iter_mut() {
            *column = rows.iter().map(|&i| column[i]).collect();
        }
    }

    pub(crate) fn with_rows(
        &self,
        timestamps: Vec<i64>,
        channels: Vec<Vec<Option<f64>>>,
    ) -> Self {
        Self {
            time_column: self.time_column.clone(),
            time_index: self.time_index,
            channel_names: self.channel_names.clone(),
            timestamps,
            channels,
        }
    }
}
