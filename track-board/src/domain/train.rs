//! Train records and schedule snapshots.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One scheduled train as shown on the board at scrape time.
///
/// Text fields are never optional: an empty string means the board did not
/// show a value. In particular an empty `track` means "not yet assigned".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Train {
    /// Local date the snapshot was taken (not read from the page).
    pub day: NaiveDate,
    /// Scheduled time exactly as printed, e.g. "6:45 PM".
    pub time: String,
    pub train_number: String,
    pub train_name: String,
    pub destination: String,
    /// Free text, e.g. "On Time", "Now 9:25PM", "Second Boarding".
    pub status: String,
    pub track: String,
}

impl Train {
    /// Whether the board has assigned this train a track.
    pub fn has_track(&self) -> bool {
        !self.track.is_empty()
    }
}

/// One point-in-time read of the departures and arrivals boards.
///
/// Both lists keep the board's display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleBoard {
    pub departures: Vec<Train>,
    pub arrivals: Vec<Train>,
}

impl ScheduleBoard {
    pub fn new(departures: Vec<Train>, arrivals: Vec<Train>) -> Self {
        Self {
            departures,
            arrivals,
        }
    }

    /// Departures then arrivals, in board order.
    pub fn iter(&self) -> impl Iterator<Item = &Train> {
        self.departures.iter().chain(self.arrivals.iter())
    }

    /// Total number of records across both boards.
    pub fn len(&self) -> usize {
        self.departures.len() + self.arrivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.departures.is_empty() && self.arrivals.is_empty()
    }
}

/// Records with an assigned track, departures first then arrivals.
///
/// Only these are handed to the store; trackless rows are not retained.
pub fn filter_with_tracks(board: &ScheduleBoard) -> Vec<Train> {
    board.iter().filter(|t| t.has_track()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn train(number: &str, track: &str) -> Train {
        Train {
            day: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            time: "7:00 PM".to_string(),
            train_number: number.to_string(),
            train_name: "Northeast Regional".to_string(),
            destination: "Boston, MA".to_string(),
            status: "On Time".to_string(),
            track: track.to_string(),
        }
    }

    #[test]
    fn filter_keeps_only_tracked_in_board_order() {
        let board = ScheduleBoard::new(
            vec![train("241", "6"), train("57", ""), train("2258", "12E")],
            vec![train("67", ""), train("90", "9"), train("169", "")],
        );

        let tracked = filter_with_tracks(&board);
        let numbers: Vec<_> = tracked.iter().map(|t| t.train_number.as_str()).collect();
        assert_eq!(numbers, ["241", "2258", "90"]);
    }

    #[test]
    fn filter_includes_arrivals_when_departures_are_empty() {
        let board = ScheduleBoard::new(vec![], vec![train("67", "3"), train("90", "")]);

        let tracked = filter_with_tracks(&board);
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked[0].train_number, "67");
    }

    #[test]
    fn filter_of_empty_board_is_empty() {
        assert!(filter_with_tracks(&ScheduleBoard::default()).is_empty());
    }

    #[test]
    fn board_len_counts_both_sides() {
        let board = ScheduleBoard::new(vec![train("1", "")], vec![train("2", ""), train("3", "")]);
        assert_eq!(board.len(), 3);
        assert!(!board.is_empty());
        assert!(ScheduleBoard::default().is_empty());
    }

    #[test]
    fn serializes_day_as_iso_date() {
        let json = serde_json::to_value(train("241", "6")).unwrap();
        assert_eq!(json["day"], "2024-03-15");
        assert_eq!(json["track"], "6");
    }
}
