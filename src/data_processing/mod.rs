use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::{Bound, RangeBounds};
use std::path::Path;

/// The outcome of one match, as supplied by the data collaborator.
/// Column names follow the source tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "Winner")]
    pub winner: String,
    #[serde(rename = "Loser")]
    pub loser: String,
    /// Fraction of service points won by the winner.
    #[serde(rename = "WSP1")]
    pub winner_serve_pct: Option<f64>,
    /// Fraction of service points won by the loser.
    #[serde(rename = "WSP2")]
    pub loser_serve_pct: Option<f64>,
    #[serde(rename = "Tournament", default)]
    pub tournament: String,
    #[serde(rename = "Surface", default)]
    pub surface: String,
    #[serde(rename = "Best_of")]
    pub best_of: u8,
    #[serde(rename = "Round", default)]
    pub round: String,
    #[serde(rename = "Score", default)]
    pub score: String,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Winner_odds", default)]
    pub winner_odds: Option<f64>,
    #[serde(rename = "Loser_odds", default)]
    pub loser_odds: Option<f64>,
}

impl MatchRecord {
    /// A best-of-3 record without odds or metadata, useful for testing.
    pub fn new(
        winner: impl Into<String>,
        loser: impl Into<String>,
        serve_pcts: Option<(f64, f64)>,
        date: NaiveDate,
    ) -> Self {
        Self {
            winner: winner.into(),
            loser: loser.into(),
            winner_serve_pct: serve_pcts.map(|(w, _)| w),
            loser_serve_pct: serve_pcts.map(|(_, l)| l),
            tournament: String::new(),
            surface: String::new(),
            best_of: 3,
            round: String::new(),
            score: String::new(),
            date,
            winner_odds: None,
            loser_odds: None,
        }
    }

    /// Both serve percentages, unless either is missing or NaN.
    pub fn serve_pcts(&self) -> Option<(f64, f64)> {
        let valid = |pct: Option<f64>| pct.filter(|x| !x.is_nan());
        Some((valid(self.winner_serve_pct)?, valid(self.loser_serve_pct)?))
    }
}

/// A match record together with the model's prediction for it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnnotatedMatch {
    pub record: MatchRecord,
    /// Probability assigned to the listed winner winning.
    pub win_prob: f64,
    /// Zero means the prediction should not count towards betting volume.
    pub bet_amount: f64,
}

/// Reads a match log; rows must already be sorted by date.
pub fn read_matches_csv(path: impl AsRef<Path>) -> Result<Vec<MatchRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|err| Error::io(path, err))?;
    let matches = csv::Reader::from_reader(file)
        .deserialize()
        .collect::<std::result::Result<Vec<MatchRecord>, _>>()?;
    tracing::info!("Read {} matches from {:?}", matches.len(), path);
    Ok(matches)
}

/// The contiguous run of matches whose dates lie in `range`.
/// Assumes the matches are sorted by date.
pub fn date_range(matches: &[MatchRecord], range: impl RangeBounds<NaiveDate>) -> &[MatchRecord] {
    let start = match range.start_bound() {
        Bound::Included(d) => matches.partition_point(|m| m.date < *d),
        Bound::Excluded(d) => matches.partition_point(|m| m.date <= *d),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(d) => matches.partition_point(|m| m.date <= *d),
        Bound::Excluded(d) => matches.partition_point(|m| m.date < *d),
        Bound::Unbounded => matches.len(),
    };
    &matches[start..end.max(start)]
}

/// The matches played in the given calendar year.
pub fn year(matches: &[MatchRecord], year: i32) -> &[MatchRecord] {
    match (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year + 1, 1, 1),
    ) {
        (Some(start), Some(end)) => date_range(matches, start..end),
        _ => &[],
    }
}

pub fn write_to_json<T: Serialize + ?Sized>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(&value)?;
    std::fs::write(path, json).map_err(|err| Error::io(path, err))
}

fn write_to_csv<T: Serialize>(values: &[T], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path).map_err(|err| Error::io(path, err))?;
    let mut writer = csv::Writer::from_writer(file);
    for val in values {
        writer.serialize(val)?;
    }
    writer.flush().map_err(|err| Error::io(path, err))
}

/// Writes to JSON or CSV according to the file extension, logging the outcome.
pub fn write_slice_to_file<T: Serialize>(values: &[T], path: impl AsRef<Path>) {
    let path = path.as_ref();
    let write_res = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => write_to_json(values, path),
        Some("csv") => write_to_csv(values, path),
        _ => {
            tracing::error!("Invalid or missing filename extension: {:?}", path);
            return;
        }
    };
    match write_res {
        Ok(()) => tracing::info!("Successfully wrote to {:?}", path),
        Err(err) => tracing::error!("Failed write to {:?}: {}", path, err),
    };
}

#[cfg(test)]
mod test {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2014, 3, d).unwrap()
    }

    #[test]
    fn test_serve_pcts() {
        let mut record = MatchRecord::new("A", "B", Some((0.7, 0.6)), day(1));
        assert_eq!(record.serve_pcts(), Some((0.7, 0.6)));
        record.loser_serve_pct = Some(f64::NAN);
        assert_eq!(record.serve_pcts(), None);
        record.loser_serve_pct = None;
        assert_eq!(record.serve_pcts(), None);
    }

    #[test]
    fn test_read_matches_csv() {
        let path = std::env::temp_dir().join("tennis_skill_read_matches.csv");
        let contents = "\
Winner,Loser,WSP1,WSP2,Tournament,Surface,Best_of,Round,Score,Date,Winner_odds,Loser_odds
Rafael Nadal,Roger Federer,0.71,0.58,Roland Garros,Clay,5,F,6-1 6-3 6-0,2008-06-08,1.3,3.5
Novak Djokovic,Andy Murray,,0.61,Australian Open,Hard,5,F,6-3 6-3 6-2,2011-01-30,,
";
        std::fs::write(&path, contents).unwrap();
        let matches = read_matches_csv(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].winner, "Rafael Nadal");
        assert_eq!(matches[0].best_of, 5);
        assert_eq!(matches[0].winner_odds, Some(1.3));
        assert_eq!(matches[0].serve_pcts(), Some((0.71, 0.58)));
        assert_eq!(matches[1].winner_serve_pct, None);
        assert_eq!(matches[1].serve_pcts(), None);
        assert_eq!(matches[1].loser_odds, None);
    }

    #[test]
    fn test_date_range() {
        let matches: Vec<MatchRecord> = [1, 3, 3, 5, 9]
            .into_iter()
            .map(|d| MatchRecord::new("A", "B", None, day(d)))
            .collect();
        assert_eq!(date_range(&matches, day(3)..day(9)).len(), 3);
        assert_eq!(date_range(&matches, day(3)..=day(9)).len(), 4);
        assert_eq!(date_range(&matches, ..day(3)).len(), 1);
        assert_eq!(date_range(&matches, day(6)..day(2)).len(), 0);
        assert_eq!(year(&matches, 2014).len(), 5);
        assert!(year(&matches, 2015).is_empty());
    }
}
