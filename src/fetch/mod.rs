// src/fetch/mod.rs
pub mod banks;
pub mod government;

use reqwest::blocking::Client;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::error::{Result, SebraError};

/// One `<table>` element, flattened to trimmed cell texts.
///
/// Header (`th`) and data (`td`) cells are kept together because the sources
/// we scrape use header cells for mid-table marker rows, not just for the
/// top row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlTable {
    pub rows: Vec<Vec<String>>,
}

/// Blocking GET of `url_str`, returning the body as text.
///
/// Any transport or HTTP-status failure maps to `SourceUnavailable` carrying
/// the URL. The connection is released once the body has been read.
pub fn get_html(client: &Client, url_str: &str) -> Result<String> {
    let url = Url::parse(url_str).map_err(|e| SebraError::unavailable(url_str, e))?;

    let resp = client
        .get(url.as_str())
        .send()
        .map_err(|e| SebraError::unavailable(url_str, e))?
        .error_for_status()
        .map_err(|e| SebraError::unavailable(url_str, e))?;

    resp.text().map_err(|e| SebraError::unavailable(url_str, e))
}

/// Extract every `<table>` in `html` as rows of whitespace-normalized cell
/// texts, in document order.
pub fn extract_tables(html: &str) -> Vec<HtmlTable> {
    let table_sel = Selector::parse("table").expect("selector should parse");
    let row_sel = Selector::parse("tr").expect("selector should parse");
    let cell_sel = Selector::parse("th, td").expect("selector should parse");

    let document = Html::parse_document(html);
    let tables: Vec<HtmlTable> = document
        .select(&table_sel)
        .map(|table| {
            let rows = table
                .select(&row_sel)
                .map(|tr| {
                    tr.select(&cell_sel)
                        .map(|cell| {
                            cell.text()
                                .collect::<String>()
                                .split_whitespace()
                                .collect::<Vec<_>>()
                                .join(" ")
                        })
                        .collect::<Vec<String>>()
                })
                .filter(|cells| !cells.is_empty())
                .collect();
            HtmlTable { rows }
        })
        .collect();

    debug!(n_tables = tables.len(), "extracted html tables");
    tables
}
