// src/fetch/government.rs
//
// Scrapes the list of Bulgarian government administrations and expands each
// administration's interval into one row per calendar day, producing a long
// lookup table joinable onto the registry by exact date.

use chrono::{Duration, NaiveDate};
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::error::{Result, SebraError};
use crate::fetch::{extract_tables, get_html, HtmlTable};

pub const GOVERNMENTS_URL: &str =
    "https://bg.wikipedia.org/wiki/%D0%9F%D1%80%D0%B0%D0%B2%D0%B8%D1%82%D0%B5%D0%BB%D1%81%D1%82%D0%B2%D0%B0_%D0%BD%D0%B0_%D0%91%D1%8A%D0%BB%D0%B3%D0%B0%D1%80%D0%B8%D1%8F";

/// Marker row separating the post-communist administrations from the rest
/// of the article's table.
const POST_1990_MARKER: &str = "Република България (от 1990 г.)";

const BG_MONTHS: &[(&str, u32)] = &[
    ("януари", 1),
    ("февруари", 2),
    ("март", 3),
    ("април", 4),
    ("май", 5),
    ("юни", 6),
    ("юли", 7),
    ("август", 8),
    ("септември", 9),
    ("октомври", 10),
    ("ноември", 11),
    ("декември", 12),
];

/// One administration with its inclusive date interval. `end` is `None` for
/// the ongoing administration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernmentPeriod {
    pub alias: String,
    pub prime_minister: String,
    pub coalition: String,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

/// One calendar day mapped to the administration in power on that day.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DailyGovernment {
    pub date: NaiveDate,
    pub government_alias: String,
    pub government_pm: String,
    pub coalition: String,
}

/// Parse a free-text Bulgarian date such as `"12 май 1997"` or
/// `"12 май 1997 г."` into a calendar date.
pub fn parse_bulgarian_date(text: &str) -> Result<NaiveDate> {
    let trimmed = text.trim().trim_end_matches("г.").trim();
    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    let [day, month_name, year] = parts.as_slice() else {
        return Err(SebraError::parse(
            GOVERNMENTS_URL,
            text,
            "expected '<day> <month> <year>'",
        ));
    };

    let day: u32 = day
        .parse()
        .map_err(|e| SebraError::parse(GOVERNMENTS_URL, text, format!("day: {e}")))?;
    let year: i32 = year
        .parse()
        .map_err(|e| SebraError::parse(GOVERNMENTS_URL, text, format!("year: {e}")))?;

    let month_lower = month_name.to_lowercase();
    let month = BG_MONTHS
        .iter()
        .find(|(name, _)| *name == month_lower)
        .map(|(_, n)| *n)
        .ok_or_else(|| SebraError::parse(GOVERNMENTS_URL, text, "unknown month name"))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| SebraError::parse(GOVERNMENTS_URL, text, "no such calendar day"))
}

/// Pull the administration rows out of the scraped page tables.
///
/// The article keeps all eras in one table; we locate the post-1990 marker
/// row and keep only full rows after it. Columns are: number, alias, prime
/// minister, start text, end text, duration, party/coalition. A blank end
/// cell means the administration is still in office and is never forced
/// through the date parser.
pub fn parse_period_rows(tables: &[HtmlTable]) -> Result<Vec<GovernmentPeriod>> {
    let table = tables
        .iter()
        .find(|t| t.rows.iter().any(|r| row_is_marker(r)))
        .ok_or_else(|| SebraError::empty(GOVERNMENTS_URL, "no table with the post-1990 marker"))?;

    let marker_ix = table
        .rows
        .iter()
        .position(|r| row_is_marker(r))
        .expect("marker row located above");

    let mut periods = Vec::new();
    for row in &table.rows[marker_ix + 1..] {
        if row.len() < 7 {
            // rowspan remnants and section separators
            continue;
        }

        let start = parse_bulgarian_date(&row[3])?;
        let end = match row[4].trim() {
            "" => None,
            cell => Some(parse_bulgarian_date(cell)?),
        };

        periods.push(GovernmentPeriod {
            alias: row[1].clone(),
            prime_minister: row[2].clone(),
            coalition: row[6].clone(),
            start,
            end,
        });
    }

    if periods.is_empty() {
        return Err(SebraError::empty(
            GOVERNMENTS_URL,
            "no administration rows after the post-1990 marker",
        ));
    }

    debug!(n_periods = periods.len(), "parsed government periods");
    Ok(periods)
}

fn row_is_marker(row: &[String]) -> bool {
    row.first().map(String::as_str) == Some(POST_1990_MARKER)
}

/// Expand each administration into one row per calendar day, from the day
/// after it took office through its last day inclusive.
///
/// `today` is the end bound for the ongoing administration (the one with no
/// end date); callers pass the current date in production and a fixed date
/// in tests. Output keeps source row order and day-granular dates, so it
/// joins onto the registry by exact date equality.
pub fn expand_periods(periods: &[GovernmentPeriod], today: NaiveDate) -> Vec<DailyGovernment> {
    let mut days = Vec::new();
    for period in periods {
        let end = period.end.unwrap_or(today);
        let mut date = period.start + Duration::days(1);
        while date <= end {
            days.push(DailyGovernment {
                date,
                government_alias: period.alias.clone(),
                government_pm: period.prime_minister.clone(),
                coalition: period.coalition.clone(),
            });
            date += Duration::days(1);
        }
    }
    days
}

/// Fetch the administrations page and return the day-expanded lookup table.
pub fn fetch_government_days(client: &Client, today: NaiveDate) -> Result<Vec<DailyGovernment>> {
    let html = get_html(client, GOVERNMENTS_URL)?;
    let tables = extract_tables(&html);
    let periods = parse_period_rows(&tables)?;
    let days = expand_periods(&periods, today);
    info!(
        n_periods = periods.len(),
        n_days = days.len(),
        "government calendar built"
    );
    Ok(days)
}
