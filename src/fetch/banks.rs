// src/fetch/banks.rs
//
// Builds the bank-name-per-BIC lookup table from the BNB registry page plus
// a static supplement of expired and corrected codes.

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::error::{Result, SebraError};
use crate::fetch::{extract_tables, get_html, HtmlTable};

pub const BIC_REGISTRY_URL: &str = "https://www.bnb.bg/RegistersAndServices/RSBAEAndBIC/index.htm";

/// Valid BIC length on this registry; longer strings are concatenation
/// artifacts from misaligned scraped columns.
const MAX_BIC_LEN: usize = 8;

/// Codes that have dropped off the live registry but still appear in the
/// SEBRA data: expired BICs, renamed banks, and one undocumented code.
const SUPPLEMENTARY_BANKS: &[(&str, &str)] = &[
    ("Българска народна банка", "BNBGBGSF"),
    ("Българска народна банка", "BNBGBGSD"),
    ("СИБАНК", "BUIBBGSF"),
    ("УниКредит Булбанк АД", "BFTBBGSF"),
    ("Сосиете Женерал Експрес Банк", "TTBBBG22"),
    ("Unknown bank", "ACBPGS2P"),
    ("МКБ Юнионбанк АД", "CBUNBGSF"),
    ("ДЗИ Банк АД", "REXIBGSF"),
    ("Корпоративна търговска банка АД", "KORPBGSF"),
    ("Пиреус Банк България АД", "PIRBBGSF"),
    ("ТИ БИ АЙ БАНК ЕАД", "WEBKBGSF"),
    ("Алфа банк - клон България", "CRBABGSF"),
    ("Креди Агрикол България", "BINVBGSF"),
    ("SG Експресбанк AD", "TTBB22"),
    ("ISBANK AG", "ISBKBGSF"),
    ("Ейч Ви Би Банк БиохимАД", "BACXBGSF"),
];

/// A bank name paired with its BIC.
///
/// The table is not deduplicated by code: when the live registry and the
/// supplement disagree, both rows survive in concatenation order (registry
/// first), and a joining caller sees the registry row first.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BankCode {
    pub bank_name: String,
    pub bic: String,
}

/// Table-selection predicate for the registry page.
///
/// A page table is part of the BIC registry when every row has exactly
/// three cells, it carries at least one data row under the header, and the
/// header row's last cell names the BIC column. The header-text check keeps
/// navigation and banner tables out even if they happen to be three columns
/// wide.
fn is_registry_table(table: &HtmlTable) -> bool {
    if table.rows.len() < 2 || !table.rows.iter().all(|r| r.len() == 3) {
        return false;
    }
    table.rows[0][2].to_uppercase().contains("BIC")
}

/// Reduce the scraped page tables to the combined, filtered lookup table.
///
/// Registry tables are concatenated in page order, rows with any blank cell
/// are dropped, and only the first (name) and third (code) columns are
/// kept. The supplement is appended afterwards, then everything with an
/// over-long code is discarded.
pub fn resolve_bank_codes(tables: &[HtmlTable]) -> Result<Vec<BankCode>> {
    let registry: Vec<&HtmlTable> = tables.iter().filter(|t| is_registry_table(t)).collect();
    if registry.is_empty() {
        return Err(SebraError::empty(
            BIC_REGISTRY_URL,
            "no three-column table with a BIC header",
        ));
    }
    debug!(n_tables = registry.len(), "matched registry tables");

    let mut codes: Vec<BankCode> = registry
        .iter()
        .flat_map(|t| t.rows[1..].iter())
        .filter(|row| row.iter().all(|cell| !cell.trim().is_empty()))
        .map(|row| BankCode {
            bank_name: row[0].clone(),
            bic: row[2].clone(),
        })
        .collect();

    codes.extend(SUPPLEMENTARY_BANKS.iter().map(|(name, bic)| BankCode {
        bank_name: (*name).to_string(),
        bic: (*bic).to_string(),
    }));

    codes.retain(|c| c.bic.chars().count() <= MAX_BIC_LEN);
    Ok(codes)
}

/// Fetch the BNB registry page and return the bank/BIC lookup table.
pub fn fetch_bank_codes(client: &Client) -> Result<Vec<BankCode>> {
    let html = get_html(client, BIC_REGISTRY_URL)?;
    let codes = resolve_bank_codes(&extract_tables(&html))?;
    info!(n_codes = codes.len(), "bank code table built");
    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> HtmlTable {
        HtmlTable {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    fn registry_fixture() -> Vec<HtmlTable> {
        vec![
            // navigation table, wrong shape
            table(&[&["Home", "Contacts"]]),
            table(&[
                &["Наименование", "Адрес", "BIC"],
                &["УниКредит Булбанк АД", "София", "UNCRBGSF"],
                &["Банка ДСК АД", "София", "STSABGSF"],
                &["", "София", "MISSING1"],
            ]),
            // three columns but no BIC header
            table(&[&["a", "b", "c"], &["1", "2", "3"]]),
            table(&[
                &["Name", "Address", "BIC"],
                &["Misaligned Bank", "Sofia", "UNCRBGSFUNCRBGSF"],
            ]),
        ]
    }

    #[test]
    fn test_resolve_keeps_name_and_code_columns() {
        let codes = resolve_bank_codes(&registry_fixture()).unwrap();
        assert!(codes.contains(&BankCode {
            bank_name: "Банка ДСК АД".into(),
            bic: "STSABGSF".into(),
        }));
        // the no-BIC-header table never contributes
        assert!(!codes.iter().any(|c| c.bic == "3"));
    }

    #[test]
    fn test_resolve_drops_rows_with_blank_cells() {
        let codes = resolve_bank_codes(&registry_fixture()).unwrap();
        assert!(!codes.iter().any(|c| c.bic == "MISSING1"));
    }

    #[test]
    fn test_resolve_filters_overlong_codes() {
        let codes = resolve_bank_codes(&registry_fixture()).unwrap();
        assert!(codes.iter().all(|c| c.bic.chars().count() <= MAX_BIC_LEN));
        assert!(!codes.iter().any(|c| c.bic == "UNCRBGSFUNCRBGSF"));
    }

    #[test]
    fn test_supplement_always_present() {
        let codes = resolve_bank_codes(&registry_fixture()).unwrap();
        for (name, bic) in SUPPLEMENTARY_BANKS {
            assert!(
                codes
                    .iter()
                    .any(|c| c.bank_name == *name && c.bic == *bic),
                "missing supplementary code {bic}"
            );
        }
    }

    #[test]
    fn test_duplicate_codes_survive_in_order() {
        let mut tables = registry_fixture();
        tables.push(table(&[
            &["Name", "Address", "BIC"],
            &["Живо име", "София", "BNBGBGSF"],
        ]));

        let codes = resolve_bank_codes(&tables).unwrap();
        let matches: Vec<&BankCode> = codes.iter().filter(|c| c.bic == "BNBGBGSF").collect();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].bank_name, "Живо име");
        assert_eq!(matches[1].bank_name, "Българска народна банка");
    }

    #[test]
    fn test_no_registry_table_is_empty_result() {
        let err = resolve_bank_codes(&[table(&[&["a", "b"]])]).unwrap_err();
        assert!(matches!(err, SebraError::EmptyResult { .. }));
    }
}
