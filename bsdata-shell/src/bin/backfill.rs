use bsdata_shell::pipeline::{self, ProviderConfig};
use bsdata_shell::Error;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use structopt::StructOpt;

fn main() -> std::result::Result<(), Error> {
    dotenv::dotenv().ok();
    env_logger::init();
    let opt = Opt::from_args();
    let provider = ProviderConfig {
        url: opt.url.unwrap_or_else(|| bsdata::BAOSTOCK_URL.to_owned()),
        user: opt.user,
        pwd: opt.pwd,
    };
    let file = opt.file.unwrap_or_else(|| "./stock_data.db".to_owned());
    let reference = opt
        .reference
        .unwrap_or_else(|| "./data/tushare_stock_basic.csv".to_owned());
    let mut conn = Connection::open_with_flags(
        &file,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
    )?;
    pipeline::run_backfill(
        &provider,
        &mut conn,
        Path::new(&reference),
        &opt.start,
        &opt.end,
    )?;
    Ok(())
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "backfill",
    about = "full backfill of index constituents and daily bars"
)]
struct Opt {
    #[structopt(short, long, env = "BSDATA_USER")]
    user: String,

    #[structopt(short, long, env = "BSDATA_PWD")]
    pwd: String,

    #[structopt(long, env = "BSDATA_URL")]
    url: Option<String>,

    #[structopt(short, long, env = "BSDATA_FILE")]
    file: Option<String>,

    #[structopt(short, long, env = "BSDATA_REFERENCE")]
    reference: Option<String>,

    #[structopt(long, default_value = "2024-07-24")]
    start: String,

    #[structopt(long, default_value = "2025-11-26")]
    end: String,
}
