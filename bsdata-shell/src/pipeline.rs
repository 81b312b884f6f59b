use crate::{kline, reference, stocks, store, Result};
use bsdata::BaostockClient;
use log::info;
use rusqlite::Connection;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// endpoint and credential of the provider, sessions are opened per
/// pipeline stage and always closed
pub struct ProviderConfig {
    pub url: String,
    pub user: String,
    pub pwd: String,
}

impl ProviderConfig {
    fn connect(&self) -> Result<BaostockClient> {
        Ok(BaostockClient::login_at(&self.url, &self.user, &self.pwd)?)
    }
}

/// one-time full backfill: rebuild the security master from today's
/// index membership and load the whole bar history for it
///
/// the reference dataset is loaded up front so a missing file stops
/// the run before any network call; store writes only happen after
/// constituent resolution completed
pub fn run_backfill(
    provider: &ProviderConfig,
    conn: &mut Connection,
    reference_path: &Path,
    start_date: &str,
    end_date: &str,
) -> Result<()> {
    let reference = reference::load_reference(reference_path)?;
    store::init_schema(conn)?;

    let cli = provider.connect()?;
    let mut records = stocks::resolve_constituents(&cli)?;
    cli.logout()?;

    if records.is_empty() {
        info!("no index constituents resolved, leaving store untouched");
        return Ok(());
    }

    stocks::enrich(&mut records, &reference);
    let saved = store::replace_security_master(conn, &records)?;
    info!("saved {} stocks", saved);

    let codes: Vec<String> = records.iter().map(|r| r.code.clone()).collect();
    let cli = provider.connect()?;
    let bars = kline::fetch_range(&cli, &codes, start_date, end_date)?;
    cli.logout()?;

    let inserted = store::append_bars(conn, &bars)?;
    info!("inserted {} bars", inserted);
    Ok(())
}

/// daily incremental run: fetch one day of bars for the current index
/// membership and write an idempotent sql patch instead of touching
/// the store directly
///
/// a day without data still produces the (empty) patch file
pub fn run_update(provider: &ProviderConfig, date: &str, output_path: &Path) -> Result<()> {
    let cli = provider.connect()?;
    let records = stocks::resolve_constituents(&cli)?;
    let codes: Vec<String> = records.iter().map(|r| r.code.clone()).collect();
    info!("total stocks to update: {}", codes.len());

    let bars = kline::fetch_range(&cli, &codes, date, date)?;
    cli.logout()?;

    if bars.is_empty() {
        info!("no data found for {}", date);
    }
    let file = File::create(output_path)?;
    let mut out = BufWriter::new(file);
    let written = store::render_patch(&mut out, &bars)?;
    out.flush()?;
    info!("wrote {} statements to {}", written, output_path.display());
    Ok(())
}
