use crate::config::{AlignmentConfig, ResampleConfig};
use crate::continuity::{ContinuityBlock, HourKey};
use crate::error::{ResampleError, Result};
use crate::resample::{resample_anchored, resample_free_running};
use crate::series::SensorSeries;
use anyhow::Context;
use log::{debug, info, warn};
use std::collections::HashMap;

/// Supplies raw recordings, one sensor and one hour at a time.
pub trait BlockSource {
    fn load_hour(&self, sensor: &str, key: &HourKey) -> anyhow::Result<SensorSeries>;
}

/// Resampled output of one block.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// Anchor sensor on its own grid, incomplete rows removed
    pub anchor: SensorSeries,
    /// Anchor and dependent channels side by side, only fully covered rows
    pub merged: SensorSeries,
}

#[derive(Debug, Clone)]
pub struct AlignedBlock {
    pub block: ContinuityBlock,
    pub alignment: Alignment,
}

/// Resample `anchor` free-running, then every dependent onto the anchor's
/// surviving timestamps, and join the lot.
pub fn align_series(
    anchor: &SensorSeries,
    dependents: &[SensorSeries],
    config: &ResampleConfig,
) -> Result<Alignment> {
    let mut anchor_out = resample_free_running(anchor, config)?;
    let unusable = anchor_out.drop_incomplete();
    if unusable > 0 {
        debug!("Dropped {} anchor rows with missing values", unusable);
    }
    // Steps under a millisecond round onto the same timestamp.
    let collapsed = anchor_out.dedup_timestamps();
    if collapsed > 0 {
        debug!("Collapsed {} anchor rows onto shared timestamps", collapsed);
    }

    let grid = anchor_out.timestamps().to_vec();
    let resampled = dependents
        .iter()
        .map(|d| resample_anchored(d, &grid, config))
        .collect::<Result<Vec<_>>>()?;

    let mut merged = join_on_timestamp(&anchor_out, &resampled)?;
    let partial = merged.drop_incomplete();
    debug!(
        "Merged {} rows, dropped {} partially covered rows",
        merged.len(),
        partial
    );

    Ok(Alignment {
        anchor: anchor_out,
        merged,
    })
}

/// Left join of `others` onto the timestamps of `base`.
///
/// The result keeps `base`'s time column first, followed by the channels of
/// `base` and then of each of `others` in order. Timestamps missing from an
/// other series leave its channels empty on that row.
pub fn join_on_timestamp(base: &SensorSeries, others: &[SensorSeries]) -> Result<SensorSeries> {
    let mut names: Vec<String> = base.channel_names().to_vec();
    let mut channels: Vec<Vec<Option<f64>>> = base.channels().to_vec();

    for other in others {
        for name in other.channel_names() {
            if names.contains(name) || name == base.time_column() {
                return Err(ResampleError::DuplicateColumn(name.clone()));
            }
            names.push(name.clone());
        }

        if other.timestamps() == base.timestamps() {
            channels.extend(other.channels().iter().cloned());
            continue;
        }

        let mut rows: HashMap<i64, usize> = HashMap::with_capacity(other.len());
        for (i, &t) in other.timestamps().iter().enumerate() {
            rows.entry(t).or_insert(i);
        }
        for column in other.channels() {
            channels.push(
                base.timestamps()
                    .iter()
                    .map(|t| rows.get(t).and_then(|&i| column[i]))
                    .collect(),
            );
        }
    }

    SensorSeries::new(
        base.time_column(),
        0,
        names,
        base.timestamps().to_vec(),
        channels,
    )
}

/// Concatenate every hour of `block` for `sensor` into one time-ordered series.
pub fn load_block<S: BlockSource + ?Sized>(
    source: &S,
    sensor: &str,
    block: &ContinuityBlock,
) -> anyhow::Result<SensorSeries> {
    let mut hours = block.hours().iter();
    let first = hours
        .next()
        .with_context(|| format!("Empty continuity block for {}", sensor))?;

    let mut series = source
        .load_hour(sensor, first)
        .with_context(|| format!("Failed to load {} for {}", sensor, first.file_name()))?;
    for key in hours {
        let next = source
            .load_hour(sensor, key)
            .with_context(|| format!("Failed to load {} for {}", sensor, key.file_name()))?;
        series
            .concat(&next)
            .with_context(|| format!("{} changes layout at {}", sensor, key.file_name()))?;
    }

    series.sort_by_time();
    series.dedup_timestamps();
    Ok(series)
}

/// Load, resample and join every block for the configured anchor and dependents.
pub fn align_blocks<S: BlockSource + ?Sized>(
    source: &S,
    blocks: &[ContinuityBlock],
    config: &AlignmentConfig,
) -> anyhow::Result<Vec<AlignedBlock>> {
    config.resample.validate()?;

    let mut aligned = Vec::with_capacity(blocks.len());
    for block in blocks {
        let names = block.file_names();
        info!(
            "Aligning {} block {:?} ({} hours of {})",
            block.subject(),
            names,
            block.len(),
            config.anchor_sensor
        );

        let anchor = load_block(source, &config.anchor_sensor, block)?;
        let dependents = config
            .dependent_sensors
            .iter()
            .map(|sensor| load_block(source, sensor, block))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let alignment = align_series(&anchor, &dependents, &config.resample)
            .with_context(|| format!("Failed to align block starting {}", names[0]))?;
        if alignment.merged.is_empty() {
            warn!("Block starting {} has no fully covered rows", names[0]);
        }

        aligned.push(AlignedBlock {
            block: block.clone(),
            alignment,
        });
    }

    Ok(aligned)
}
