use crate::series::SensorSeries;
use anyhow::{Context, Result};
use polars::prelude::*;

impl SensorSeries {
    /// Read a series from a DataFrame with an integer (or datetime) millisecond
    /// time column. Every other column is taken as a channel; nulls and NaN
    /// become missing values.
    pub fn from_dataframe(df: &DataFrame, time_column: &str) -> Result<Self> {
        let time_index = df
            .get_column_names()
            .iter()
            .position(|name| name.as_str() == time_column)
            .with_context(|| format!("Time column '{}' not found", time_column))?;

        let time = df
            .column(time_column)?
            .as_materialized_series()
            .strict_cast(&DataType::Int64)
            .with_context(|| format!("Time column '{}' is not integral", time_column))?;
        let timestamps = time
            .i64()?
            .into_iter()
            .enumerate()
            .map(|(row, t)| t.with_context(|| format!("Missing timestamp at row {}", row)))
            .collect::<Result<Vec<i64>>>()?;

        let mut names = Vec::with_capacity(df.width().saturating_sub(1));
        let mut channels = Vec::with_capacity(df.width().saturating_sub(1));
        for column in df.get_columns() {
            if column.name().as_str() == time_column {
                continue;
            }
            let values = column
                .as_materialized_series()
                .strict_cast(&DataType::Float64)
                .with_context(|| format!("Column '{}' is not numeric", column.name()))?;
            channels.push(
                values
                    .f64()?
                    .into_iter()
                    .map(|v| v.filter(|x| !x.is_nan()))
                    .collect::<Vec<Option<f64>>>(),
            );
            names.push(column.name().to_string());
        }

        Ok(SensorSeries::new(
            time_column,
            time_index,
            names,
            timestamps,
            channels,
        )?)
    }

    /// DataFrame with the original column order; missing values are nulls.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = self
            .channel_names()
            .iter()
            .zip(self.channels())
            .map(|(name, values)| Column::new(name.as_str().into(), values.as_slice()))
            .collect();
        columns.insert(
            self.time_index(),
            Column::new(self.time_column().into(), self.timestamps()),
        );
        Ok(DataFrame::new(columns)?)
    }
}
