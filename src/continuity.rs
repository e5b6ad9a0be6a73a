use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("'{0}' is not named like MM-DD-YY_HH")]
    Format(String),

    #[error("'{name}' has an unreadable date: {reason}")]
    Date { name: String, reason: String },

    #[error("Hour {hour} in '{name}' is out of range")]
    Hour { name: String, hour: u32 },
}

/// One hour of recording for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HourKey {
    subject: String,
    date: NaiveDate,
    hour: u32,
}

impl HourKey {
    pub fn new(
        subject: impl Into<String>,
        date: NaiveDate,
        hour: u32,
    ) -> Result<Self, KeyParseError> {
        let subject = subject.into();
        if hour > 23 {
            return Err(KeyParseError::Hour {
                name: format!("{} {}", subject, date),
                hour,
            });
        }
        Ok(Self {
            subject,
            date,
            hour,
        })
    }

    /// Parse an hourly file name such as `08-22-17_11.csv` (month-day-year, then hour).
    pub fn parse_file_name(subject: impl Into<String>, name: &str) -> Result<Self, KeyParseError> {
        let (date_part, rest) = name
            .split_once('_')
            .ok_or_else(|| KeyParseError::Format(name.to_string()))?;

        let hour_part = rest
            .get(..2)
            .filter(|h| h.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| KeyParseError::Format(name.to_string()))?;
        let hour: u32 = hour_part
            .parse()
            .map_err(|_| KeyParseError::Format(name.to_string()))?;

        let date = NaiveDate::parse_from_str(date_part, "%m-%d-%y").map_err(|e| {
            KeyParseError::Date {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })?;

        if hour > 23 {
            return Err(KeyParseError::Hour {
                name: name.to_string(),
                hour,
            });
        }

        Ok(Self {
            subject: subject.into(),
            date,
            hour,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN) + Duration::hours(self.hour as i64)
    }

    pub fn file_name(&self) -> String {
        format!("{}_{:02}.csv", self.date.format("%m-%d-%y"), self.hour)
    }

    /// True when `next` is the same subject's recording exactly one hour later.
    pub fn is_followed_by(&self, next: &HourKey) -> bool {
        self.subject == next.subject && next.start() - self.start() == Duration::hours(1)
    }
}

/// Maximal run of back-to-back hours for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContinuityBlock {
    hours: Vec<HourKey>,
}

impl ContinuityBlock {
    pub fn hours(&self) -> &[HourKey] {
        &self.hours
    }

    pub fn subject(&self) -> &str {
        self.hours.first().map(HourKey::subject).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.hours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    pub fn start(&self) -> Option<NaiveDateTime> {
        self.hours.first().map(HourKey::start)
    }

    /// End of the last covered hour.
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.hours.last().map(|k| k.start() + Duration::hours(1))
    }

    pub fn file_names(&self) -> Vec<String> {
        self.hours.iter().map(HourKey::file_name).collect()
    }
}

/// Sort hour keys and cut them into blocks of consecutive hours.
///
/// A repeated key is counted once. A step of more than one hour, or a change of
/// subject, starts a new block.
pub fn group_consecutive_hours(keys: impl IntoIterator<Item = HourKey>) -> Vec<ContinuityBlock> {
    let mut keys: Vec<HourKey> = keys.into_iter().collect();
    keys.sort();
    keys.dedup();

    let mut blocks = Vec::new();
    let mut run: Vec<HourKey> = Vec::new();
    for key in keys {
        if let Some(prev) = run.last() {
            if !prev.is_followed_by(&key) {
                blocks.push(ContinuityBlock {
                    hours: std::mem::take(&mut run),
                });
            }
        }
        run.push(key);
    }
    if !run.is_empty() {
        blocks.push(ContinuityBlock { hours: run });
    }

    debug!("Grouped hours into {} continuity blocks", blocks.len());
    blocks
}

#[derive(Debug, Clone, Default)]
pub struct FileGrouping {
    pub blocks: Vec<ContinuityBlock>,
    pub rejected: Vec<KeyParseError>,
}

/// Group hourly file names of one subject. Names that cannot be parsed are
/// reported in `rejected` and do not affect the other names.
pub fn group_file_names<S: AsRef<str>>(subject: &str, names: &[S]) -> FileGrouping {
    let mut keys = Vec::with_capacity(names.len());
    let mut rejected = Vec::new();

    for name in names {
        match HourKey::parse_file_name(subject, name.as_ref()) {
            Ok(key) => keys.push(key),
            Err(e) => {
                warn!("Skipping file: {}", e);
                rejected.push(e);
            }
        }
    }

    FileGrouping {
        blocks: group_consecutive_hours(keys),
        rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 8, d).unwrap()
    }

    fn hours_of(block: &ContinuityBlock) -> Vec<u32> {
        block.hours().iter().map(HourKey::hour).collect()
    }

    #[test]
    fn splits_on_missing_hour() {
        let keys = [13, 8, 10, 12, 9]
            .into_iter()
            .map(|h| HourKey::new("P121", day(22), h).unwrap());
        let blocks = group_consecutive_hours(keys);
        assert_eq!(blocks.len(), 2);
        assert_eq!(hours_of(&blocks[0]), vec![8, 9, 10]);
        assert_eq!(hours_of(&blocks[1]), vec![12, 13]);
    }

    #[test]
    fn runs_across_midnight() {
        let keys = vec![
            HourKey::new("P121", day(22), 22).unwrap(),
            HourKey::new("P121", day(22), 23).unwrap(),
            HourKey::new("P121", day(23), 0).unwrap(),
        ];
        let blocks = group_consecutive_hours(keys);
        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.start(), day(22).and_hms_opt(22, 0, 0));
        assert_eq!(block.end(), day(23).and_hms_opt(1, 0, 0));
    }

    #[test]
    fn same_hour_next_day_is_a_new_block() {
        let keys = vec![
            HourKey::new("P121", day(22), 8).unwrap(),
            HourKey::new("P121", day(23), 9).unwrap(),
        ];
        assert_eq!(group_consecutive_hours(keys).len(), 2);
    }

    #[test]
    fn duplicates_collapse() {
        let keys = vec![
            HourKey::new("P121", day(22), 8).unwrap(),
            HourKey::new("P121", day(22), 8).unwrap(),
            HourKey::new("P121", day(22), 9).unwrap(),
        ];
        let blocks = group_consecutive_hours(keys);
        assert_eq!(blocks.len(), 1);
        assert_eq!(hours_of(&blocks[0]), vec![8, 9]);
    }

    #[test]
    fn subjects_never_share_a_block() {
        let keys = vec![
            HourKey::new("P108", day(22), 8).unwrap(),
            HourKey::new("P109", day(22), 9).unwrap(),
        ];
        let blocks = group_consecutive_hours(keys);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].subject(), "P108");
        assert_eq!(blocks[1].subject(), "P109");
    }

    #[test]
    fn empty_input_gives_no_blocks() {
        assert!(group_consecutive_hours(Vec::new()).is_empty());
    }

    #[test]
    fn file_name_round_trip() {
        let key = HourKey::parse_file_name("P121", "08-22-17_11.csv").unwrap();
        assert_eq!(key.date(), day(22));
        assert_eq!(key.hour(), 11);
        assert_eq!(key.file_name(), "08-22-17_11.csv");
        assert_eq!(key.start(), day(22).and_hms_opt(11, 0, 0).unwrap());
    }

    #[test]
    fn malformed_names_are_reported_individually() {
        let names = [
            "08-22-17_08.csv",
            "notes.txt",
            "08-22-17_09.csv",
            "13-40-17_10.csv",
            "08-22-17_27.csv",
            "08-22-17_12.csv",
        ];
        let grouping = group_file_names("P121", &names);

        assert_eq!(grouping.rejected.len(), 3);
        assert_eq!(
            grouping.rejected[0],
            KeyParseError::Format("notes.txt".to_string())
        );
        assert!(matches!(grouping.rejected[1], KeyParseError::Date { .. }));
        assert!(matches!(
            grouping.rejected[2],
            KeyParseError::Hour { hour: 27, .. }
        ));

        assert_eq!(grouping.blocks.len(), 2);
        assert_eq!(
            grouping.blocks[0].file_names(),
            vec!["08-22-17_08.csv", "08-22-17_09.csv"]
        );
        assert_eq!(grouping.blocks[1].file_names(), vec!["08-22-17_12.csv"]);
    }

    #[test]
    fn hour_out_of_range_rejected() {
        assert!(HourKey::new("P121", day(22), 24).is_err());
    }
}
