use bsdata_shell::pipeline::{self, ProviderConfig};
use bsdata_shell::Error;
use chrono::Local;
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
    // weekend or backdated runs may pass an explicit date
    let date = opt
        .date
        .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());
    let output = opt.output.unwrap_or_else(|| "./update.sql".to_owned());
    pipeline::run_update(&provider, &date, Path::new(&output))?;
    Ok(())
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "update",
    about = "daily incremental update rendered as a sql patch file"
)]
struct Opt {
    #[structopt(short, long, env = "BSDATA_USER")]
    user: String,

    #[structopt(short, long, env = "BSDATA_PWD")]
    pwd: String,

    #[structopt(long, env = "BSDATA_URL")]
    url: Option<String>,

    #[structopt(short, long)]
    date: Option<String>,

    #[structopt(short, long, env = "BSDATA_OUTPUT")]
    output: Option<String>,
}
