use crate::config::ResampleConfig;
use crate::error::Result;
use crate::interpolation::interpolate;
use crate::series::{ResampledSeries, SensorSeries};
use log::{debug, trace};

/// Forward-only scan position into a raw timestamp column.
///
/// Raw timestamps are sorted, so the bracket for each successive target is found
/// by moving on from where the previous search stopped. The index never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BracketCursor {
    index: usize,
}

impl BracketCursor {
    pub(crate) fn starting_at(index: usize) -> Self {
        Self { index }
    }

    #[cfg(test)]
    pub(crate) fn position(&self) -> usize {
        self.index
    }

    /// Advance to the first raw timestamp at or after `t`.
    /// Returns `None` once every raw timestamp lies before `t`.
    pub(crate) fn seek(&mut self, timestamps: &[i64], t: f64) -> Option<usize> {
        while self.index < timestamps.len() && (timestamps[self.index] as f64) < t {
            self.index += 1;
        }
        (self.index < timestamps.len()).then_some(self.index)
    }
}

/// Resample onto `fixed_grid` when given, otherwise onto the series' own computed grid.
pub fn resample(
    series: &SensorSeries,
    config: &ResampleConfig,
    fixed_grid: Option<&[i64]>,
) -> Result<ResampledSeries> {
    match fixed_grid {
        Some(grid) => resample_anchored(series, grid, config),
        None => resample_free_running(series, config),
    }
}

/// Resample onto an evenly spaced grid starting at the first raw timestamp.
///
/// The first row is copied from the input unchanged. Grid points are
/// `t0 + k * 1000 / sampling_rate` for every `k` whose point does not pass the last
/// raw timestamp; values are interpolated at the exact point and the emitted
/// timestamp is that point rounded to the nearest millisecond.
///
/// Termination is checked before a point is evaluated: nothing past the last raw
/// timestamp is emitted, so a series shorter than one step yields only its first
/// row rather than a trailing row of missing values.
pub fn resample_free_running(
    series: &SensorSeries,
    config: &ResampleConfig,
) -> Result<ResampledSeries> {
    config.validate()?;
    if series.len() < 2 {
        debug!(
            "Not resampling {} rows: at least two samples are needed",
            series.len()
        );
        return Ok(series.empty_like());
    }
    series.check_sorted()?;

    let ts = series.timestamps();
    let raw = series.channels();
    let step = config.step_ms();
    let first = ts[0];
    let last = ts[ts.len() - 1] as f64;

    let capacity = ((last - first as f64) / step) as usize + 1;
    let mut grid = Vec::with_capacity(capacity);
    let mut columns: Vec<Vec<Option<f64>>> = raw
        .iter()
        .map(|c| {
            let mut out = Vec::with_capacity(capacity);
            out.push(c[0]);
            out
        })
        .collect();
    grid.push(first);

    let mut cursor = BracketCursor::starting_at(1);
    let mut skipped = 0;
    let mut k: u64 = 1;
    loop {
        let t = first as f64 + k as f64 * step;
        if t > last {
            break;
        }
        let Some(after) = cursor.seek(ts, t) else {
            break;
        };
        let before = after - 1;

        if config.gap_tolerance.admits(ts[before], ts[after]) {
            for (out, values) in columns.iter_mut().zip(raw) {
                out.push(interpolate(
                    ts[before],
                    values[before],
                    ts[after],
                    values[after],
                    t,
                )?);
            }
        } else {
            trace!(
                "Gap of {} ms around {:.1}, leaving it empty",
                ts[after] - ts[before],
                t
            );
            skipped += 1;
            columns.iter_mut().for_each(|out| out.push(None));
        }

        grid.push(t.round() as i64);
        k += 1;
    }

    debug!(
        "Resampled {} rows to {} rows at {} Hz ({} inside gaps)",
        series.len(),
        grid.len(),
        config.sampling_rate,
        skipped
    );
    Ok(series.with_rows(grid, columns))
}

/// Resample onto an externally supplied grid, typically the anchor sensor's.
///
/// Produces exactly one row per grid point. Points before the first raw
/// timestamp or after the last one are missing, except a point that coincides
/// with the first raw timestamp, which takes that sample's values.
pub fn resample_anchored(
    series: &SensorSeries,
    grid: &[i64],
    config: &ResampleConfig,
) -> Result<ResampledSeries> {
    config.validate()?;
    if series.len() < 2 {
        debug!(
            "Not resampling {} rows onto fixed grid: at least two samples are needed",
            series.len()
        );
        return Ok(series.empty_like());
    }
    series.check_sorted()?;

    let ts = series.timestamps();
    let raw = series.channels();
    let mut columns: Vec<Vec<Option<f64>>> =
        raw.iter().map(|_| Vec::with_capacity(grid.len())).collect();

    let mut cursor = BracketCursor::starting_at(0);
    let mut out_of_range = 0;
    for &target in grid {
        let t = target as f64;
        match cursor.seek(ts, t) {
            None => {
                out_of_range += 1;
                columns.iter_mut().for_each(|out| out.push(None));
            }
            Some(0) => {
                let exact = ts[0] == target;
                if !exact {
                    out_of_range += 1;
                }
                for (out, values) in columns.iter_mut().zip(raw) {
                    out.push(if exact { values[0] } else { None });
                }
            }
            Some(after) => {
                let before = after - 1;
                if config.gap_tolerance.admits(ts[before], ts[after]) {
                    for (out, values) in columns.iter_mut().zip(raw) {
                        out.push(interpolate(
                            ts[before],
                            values[before],
                            ts[after],
                            values[after],
                            t,
                        )?);
                    }
                } else {
                    columns.iter_mut().for_each(|out| out.push(None));
                }
            }
        }
    }

    debug!(
        "Resampled {} rows onto a {} point grid ({} points outside the raw span)",
        series.len(),
        grid.len(),
        out_of_range
    );
    Ok(series.with_rows(grid.to_vec(), columns))
}
