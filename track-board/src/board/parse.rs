//! Board table parsing.
//!
//! The station site renders each train as two adjacent table rows:
//!
//! ```text
//! <tr class="amtrak-header-row">    time | number + name
//! <tr class="amtrak-destination">   destination + status (pill) | track
//! ```
//!
//! Either row may be missing any of its sub-elements, and the destination
//! row itself may be missing. Parsing never fails: anything absent becomes
//! an empty string.

use std::sync::LazyLock;

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

use crate::domain::{Calendar, Train};

const HEADER_ROW_CLASS: &str = "amtrak-header-row";
const DESTINATION_ROW_CLASS: &str = "amtrak-destination";

static ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static CELL: LazyLock<Selector> = LazyLock::new(|| selector("td"));
static TRAIN_NUMBER: LazyLock<Selector> = LazyLock::new(|| selector("span.train-number"));
static TRAIN_NAME: LazyLock<Selector> = LazyLock::new(|| selector("span.train-name"));
static PILL_CELL: LazyLock<Selector> = LazyLock::new(|| selector("td.pill-cell"));
static PILL_DESTINATION: LazyLock<Selector> =
    LazyLock::new(|| selector("span.pill-destination"));
static PILL_STATUS: LazyLock<Selector> = LazyLock::new(|| selector("span.pill-status"));
static TRACK_CELL: LazyLock<Selector> = LazyLock::new(|| selector("td.track-cell"));

/// Compile a selector literal from this module.
pub(super) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static CSS selector must be valid")
}

/// Role of a table row on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum RowKind {
    Header,
    Destination,
    Other,
}

impl RowKind {
    fn of(row: ElementRef<'_>) -> Self {
        let mut kind = RowKind::Other;
        for class in row.value().classes() {
            if class == HEADER_ROW_CLASS {
                return RowKind::Header;
            }
            if class == DESTINATION_ROW_CLASS {
                kind = RowKind::Destination;
            }
        }
        kind
    }
}

/// A header row index and the index of its destination row, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct RowPair {
    pub header: usize,
    pub destination: Option<usize>,
}

/// Pair each header row with the first destination row that follows it.
///
/// The search for a destination stops at the next header row, so a header
/// never steals the destination row that belongs to a later train.
pub(super) fn pair_rows(kinds: &[RowKind]) -> Vec<RowPair> {
    let mut pairs: Vec<RowPair> = Vec::new();

    for (idx, kind) in kinds.iter().enumerate() {
        match kind {
            RowKind::Header => pairs.push(RowPair {
                header: idx,
                destination: None,
            }),
            RowKind::Destination => {
                if let Some(open) = pairs.last_mut()
                    && open.destination.is_none()
                {
                    open.destination = Some(idx);
                }
            }
            RowKind::Other => {}
        }
    }

    pairs
}

/// Trimmed text content of an element, or "" when there is no element.
fn text_or_empty(element: Option<ElementRef<'_>>) -> String {
    element
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// First descendant of `scope` matching `selector`.
fn find<'a>(scope: Option<ElementRef<'a>>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.and_then(|el| el.select(selector).next())
}

/// Parse one board table, stamping each record with today's date.
///
/// `markup` is the HTML of a single table (or any fragment containing one).
/// Returns one record per header row, in document order. Empty or
/// unrecognized markup yields an empty vector.
pub fn parse_board(markup: &str, calendar: &Calendar) -> Vec<Train> {
    parse_board_on(markup, calendar.today())
}

/// Parse one board table, stamping each record with `day`.
pub fn parse_board_on(markup: &str, day: NaiveDate) -> Vec<Train> {
    let fragment = parse_in_table(markup);
    let rows: Vec<ElementRef<'_>> = fragment.select(&ROW).collect();
    let kinds: Vec<RowKind> = rows.iter().map(|row| RowKind::of(*row)).collect();

    pair_rows(&kinds)
        .into_iter()
        .map(|pair| {
            let header = rows[pair.header];
            let destination = pair.destination.map(|idx| rows[idx]);
            train_from_rows(header, destination, day)
        })
        .collect()
}

/// Parse `markup` so that bare `<tr>` rows survive.
///
/// Outside a table the HTML tree builder discards row and cell tags, so
/// markup without its own `<table>` is parsed inside one.
fn parse_in_table(markup: &str) -> Html {
    if markup.to_ascii_lowercase().contains("<table") {
        Html::parse_fragment(markup)
    } else {
        Html::parse_fragment(&format!("<table>{markup}</table>"))
    }
}

fn train_from_rows(
    header: ElementRef<'_>,
    destination: Option<ElementRef<'_>>,
    day: NaiveDate,
) -> Train {
    let mut cells = header.select(&CELL);
    let time_cell = cells.next();
    let train_cell = cells.next();

    let pill = find(destination, &PILL_CELL);

    Train {
        day,
        time: text_or_empty(time_cell),
        train_number: text_or_empty(find(train_cell, &TRAIN_NUMBER)),
        train_name: text_or_empty(find(train_cell, &TRAIN_NAME)),
        destination: text_or_empty(find(pill, &PILL_DESTINATION)),
        status: text_or_empty(find(pill, &PILL_STATUS)),
        track: text_or_empty(find(destination, &TRACK_CELL)),
    }
}
