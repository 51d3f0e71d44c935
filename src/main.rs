use anyhow::{bail, Context, Result};
use chrono::Local;
use reqwest::blocking::Client;
use sebradata::{
    chart::{render_timeseries, TimeseriesPoint},
    fetch::{banks::fetch_bank_codes, government::fetch_government_days},
    process::{add_reg_year, load_transactions, uppercase_text_fields},
    report::report_for_account,
};
use std::{collections::BTreeMap, env, fs};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sebradata=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    let mut args = env::args().skip(1);
    let (Some(zip_path), Some(iban)) = (args.next(), args.next()) else {
        bail!("usage: sebradata <registry.zip> <iban>");
    };

    // ─── 2) load + normalize the registry ────────────────────────────
    let mut rows = load_transactions(&zip_path)
        .with_context(|| format!("loading registry from {zip_path}"))?;
    add_reg_year(&mut rows);
    uppercase_text_fields(&mut rows);
    info!(n_rows = rows.len(), "registry cleaned");

    // ─── 3) reference lookups ────────────────────────────────────────
    let client = Client::new();
    let today = Local::now().date_naive();
    let government_days = fetch_government_days(&client, today)?;
    let bank_codes = fetch_bank_codes(&client)?;
    info!(
        n_government_days = government_days.len(),
        n_bank_codes = bank_codes.len(),
        "reference tables ready"
    );

    // ─── 4) per-account report ───────────────────────────────────────
    let report = report_for_account(&rows, &iban);
    println!(
        "{}: {} rows, {} client hashes, {} receiver names",
        iban,
        report.rows.len(),
        report.client_name_hashes.len(),
        report.client_receiver_names.len()
    );
    for flow in &report.flows {
        println!(
            "{:>6}  {:<50}  {:>14.2}  ({} payments)",
            flow.reg_year, flow.primary_organization, flow.total_amount, flow.payment_count
        );
    }

    // ─── 5) chart spec over daily settled amounts ────────────────────
    let mut daily: BTreeMap<(String, chrono::NaiveDate), f64> = BTreeMap::new();
    for row in &report.rows {
        *daily
            .entry((row.primary_organization.clone(), row.settlement_date))
            .or_insert(0.0) += row.amount;
    }
    let points: Vec<TimeseriesPoint> = daily
        .into_iter()
        .map(|((group, date), amount)| TimeseriesPoint {
            group,
            date,
            amount,
        })
        .collect();
    let spec = render_timeseries(
        &points,
        "primary_organization",
        "settlement_date",
        true,
        Some(&format!("{iban} settled amounts")),
    );
    fs::write("report_chart.json", serde_json::to_string_pretty(&spec)?)
        .context("writing report_chart.json")?;
    info!("wrote report_chart.json");

    Ok(())
}
