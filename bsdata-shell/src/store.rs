use crate::kline::BarRow;
use crate::stocks::StockRecord;
use crate::Result;
use rusqlite::{params, Connection};
use std::io::Write;

const INSERT_BAR_SQL: &str = "INSERT INTO stock_kline ( \
     date, code, open, high, low, close, volume, amount, adjustflag \
     ) VALUES ( \
     ?1,   ?2,   ?3,   ?4,   ?5,  ?6,    ?7,     ?8,     ?9 )";

const UPSERT_BAR_SQL: &str = "INSERT OR REPLACE INTO stock_kline ( \
     date, code, open, high, low, close, volume, amount, adjustflag \
     ) VALUES ( \
     ?1,   ?2,   ?3,   ?4,   ?5,  ?6,    ?7,     ?8,     ?9 )";

/// create both tables if absent, safe on an existing store
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS stock_basic ( \
            code TEXT PRIMARY KEY, \
            symbol TEXT, \
            name TEXT, \
            area TEXT, \
            industry TEXT, \
            list_date TEXT, \
            is_hs300 INTEGER, \
            is_zz500 INTEGER \
        ); \
        CREATE TABLE IF NOT EXISTS stock_kline ( \
            date TEXT, \
            code TEXT, \
            open REAL, \
            high REAL, \
            low REAL, \
            close REAL, \
            volume REAL, \
            amount REAL, \
            adjustflag INTEGER, \
            PRIMARY KEY (date, code) \
        );",
    )?;
    Ok(())
}

/// discard and rewrite the whole security master in one transaction
pub fn replace_security_master(conn: &mut Connection, records: &[StockRecord]) -> Result<usize> {
    let trx = conn.transaction()?;
    trx.execute("DELETE FROM stock_basic", params![])?;
    {
        let mut stmt = trx.prepare_cached(
            "INSERT INTO stock_basic ( \
             code, symbol, name, area, industry, list_date, is_hs300, is_zz500 \
             ) VALUES ( \
             ?1,   ?2,     ?3,   ?4,   ?5,       ?6,        ?7,       ?8 )",
        )?;
        for record in records {
            stmt.execute(params![
                record.code,
                record.symbol,
                record.name,
                record.area,
                record.industry,
                record.list_date,
                record.is_hs300 as i64,
                record.is_zz500 as i64,
            ])?;
        }
    }
    trx.commit()?;
    Ok(records.len())
}

/// plain append, used by the backfill over a fresh bar table
pub fn append_bars(conn: &mut Connection, bars: &[BarRow]) -> Result<usize> {
    insert_bars(conn, bars, INSERT_BAR_SQL)
}

/// insert replacing on (date, code) collision, safe to rerun
pub fn upsert_bars(conn: &mut Connection, bars: &[BarRow]) -> Result<usize> {
    insert_bars(conn, bars, UPSERT_BAR_SQL)
}

fn insert_bars(conn: &mut Connection, bars: &[BarRow], sql: &str) -> Result<usize> {
    let trx = conn.transaction()?;
    {
        let mut stmt = trx.prepare_cached(sql)?;
        for bar in bars {
            stmt.execute(params![
                bar.date,
                bar.code,
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                bar.volume,
                bar.amount,
                bar.adjust_flag,
            ])?;
        }
    }
    trx.commit()?;
    Ok(bars.len())
}

/// render bars as one idempotent upsert statement per line, in input
/// order; an empty input renders nothing but is not an error
pub fn render_patch<W: Write>(out: &mut W, bars: &[BarRow]) -> Result<usize> {
    for bar in bars {
        writeln!(
            out,
            "INSERT OR REPLACE INTO stock_kline (date, code, open, high, low, close, volume, amount, adjustflag) \
             VALUES ('{}', '{}', {}, {}, {}, {}, {}, {}, {});",
            bar.date,
            bar.code,
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume,
            bar.amount,
            bar.adjust_flag,
        )?;
    }
    Ok(bars.len())
}
