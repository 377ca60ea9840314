use chrono::NaiveDate;
use regex::Regex;
use std::fmt::Display;
use std::sync::LazyLock;

// Sentinel-1 product names: acquisition start as YYYYMMDDThhmmss.
static COMPACT_WITH_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(20\d{2})([01]\d)([0-3]\d)T").expect("valid acquisition date pattern")
});

// YYYY-MM-DD, YYYY_MM_DD or YYYYMMDD anywhere in the name.
static SEPARATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(20\d{2})[-_]?([01]\d)[-_]?([0-3]\d)").expect("valid date pattern")
});

/// Which side of the threshold date an acquisition falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemporalGroup {
    Before,
    After,
}

impl TemporalGroup {
    pub const ALL: [TemporalGroup; 2] = [TemporalGroup::Before, TemporalGroup::After];

    /// `Before` strictly earlier than `threshold`, `After` on or after it.
    pub fn classify(date: NaiveDate, threshold: NaiveDate) -> Self {
        if date < threshold {
            TemporalGroup::Before
        } else {
            TemporalGroup::After
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemporalGroup::Before => "before",
            TemporalGroup::After => "after",
        }
    }
}

impl Display for TemporalGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn first_valid_date(pattern: &Regex, name: &str) -> Option<NaiveDate> {
    pattern.captures_iter(name).find_map(|caps| {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

/// Extracts the acquisition date from a file name.
///
/// A compact `YYYYMMDD` directly followed by `T` takes priority over a plain
/// `YYYY[-_]MM[-_]DD`. Matches that are not calendar dates are skipped.
pub fn extract_date(name: &str) -> Option<NaiveDate> {
    first_valid_date(&COMPACT_WITH_TIME, name).or_else(|| first_valid_date(&SEPARATED, name))
}

/// Temporal group of a file name, or `None` when it carries no date.
pub fn group_for_name(name: &str, threshold: NaiveDate) -> Option<(NaiveDate, TemporalGroup)> {
    extract_date(name).map(|date| (date, TemporalGroup::classify(date, threshold)))
}
