use crate::Result;
use bsdata::{AdjustFlag, BaostockClient, CursorState, Frequency, QueryHistoryKData};
use log::{info, warn};

/// exact field set requested from the provider, in row order
pub const KLINE_FIELDS: &str = "date,code,open,high,low,close,volume,amount,adjustflag";

/// one daily bar, unique by (date, code)
#[derive(Debug, Clone, PartialEq)]
pub struct BarRow {
    pub date: String,
    pub code: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub amount: f64,
    pub adjust_flag: i64,
}

/// fetch daily unadjusted bars for every code over the inclusive date
/// range, one code at a time, in the given code order
///
/// a code without data contributes nothing and is only logged
pub fn fetch_range(
    cli: &BaostockClient,
    codes: &[String],
    start_date: &str,
    end_date: &str,
) -> Result<Vec<BarRow>> {
    let mut bars = Vec::new();
    let total = codes.len();
    for (i, code) in codes.iter().enumerate() {
        info!("[{}/{}] fetching {}", i + 1, total, code);
        let before = bars.len();
        fetch_code(cli, code, start_date, end_date, &mut bars)?;
        if bars.len() == before {
            info!("no data for {}", code);
        }
    }
    Ok(bars)
}

/// drain the history cursor of one code
///
/// rows with unparsable numeric fields are dropped individually; a
/// provider error code truncates this code's series without failing
fn fetch_code(
    cli: &BaostockClient,
    code: &str,
    start_date: &str,
    end_date: &str,
    bars: &mut Vec<BarRow>,
) -> Result<()> {
    let mut rs = cli.query(QueryHistoryKData {
        code: code.to_owned(),
        fields: KLINE_FIELDS.to_owned(),
        start_date: start_date.to_owned(),
        end_date: end_date.to_owned(),
        frequency: Frequency::Daily,
        adjust_flag: AdjustFlag::Unadjusted,
    });
    loop {
        match rs.advance()? {
            CursorState::Row(row) => match parse_bar(&row) {
                Some(bar) => bars.push(bar),
                None => warn!("dropping unparsable bar row for {}: {:?}", code, row),
            },
            CursorState::EndOfData => break,
            CursorState::ProviderError(ec) => {
                warn!(
                    "provider returned error {} while fetching {}, keeping rows read so far",
                    ec, code
                );
                break;
            }
        }
    }
    Ok(())
}

// rows arrive positionally in KLINE_FIELDS order
pub(crate) fn parse_bar(row: &[String]) -> Option<BarRow> {
    if row.len() < 9 {
        return None;
    }
    Some(BarRow {
        date: row[0].clone(),
        code: row[1].clone(),
        open: row[2].parse().ok()?,
        high: row[3].parse().ok()?,
        low: row[4].parse().ok()?,
        close: row[5].parse().ok()?,
        volume: row[6].parse().ok()?,
        amount: row[7].parse().ok()?,
        adjust_flag: row[8].parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_bar() {
        let bar = parse_bar(&row(&[
            "2025-01-01",
            "sh.600000",
            "10.0",
            "10.8",
            "9.9",
            "10.5",
            "123456.0",
            "1300000.5",
            "3",
        ]))
        .unwrap();
        assert_eq!("2025-01-01", bar.date);
        assert_eq!("sh.600000", bar.code);
        assert_eq!(10.0, bar.open);
        assert_eq!(10.8, bar.high);
        assert_eq!(9.9, bar.low);
        assert_eq!(10.5, bar.close);
        assert_eq!(123456.0, bar.volume);
        assert_eq!(1300000.5, bar.amount);
        assert_eq!(3, bar.adjust_flag);
    }

    #[test]
    fn test_parse_bar_drops_non_numeric_volume() {
        assert_eq!(
            None,
            parse_bar(&row(&[
                "2025-01-01",
                "sh.600000",
                "10.0",
                "10.8",
                "9.9",
                "10.5",
                "NA",
                "1300000.5",
                "3",
            ]))
        );
    }

    #[test]
    fn test_parse_bar_drops_short_row() {
        assert_eq!(None, parse_bar(&row(&["2025-01-01", "sh.600000"])));
    }
}
