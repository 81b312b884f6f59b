use crate::reference::ReferenceEntry;
use crate::{Error, Result};
use bsdata::{BaostockClient, CursorState, QueryCommand, QueryHs300Stocks, QueryZz500Stocks, ResultSet};
use log::{info, warn};
use std::collections::HashMap;

/// one security-master row, unique by exchange-qualified code
#[derive(Debug, Clone, PartialEq)]
pub struct StockRecord {
    pub code: String,
    pub symbol: String,
    pub name: String,
    pub area: String,
    pub industry: String,
    pub list_date: String,
    pub is_hs300: bool,
    pub is_zz500: bool,
}

impl StockRecord {
    fn new(code: String, name: String) -> Self {
        let symbol = symbol_of(&code).to_owned();
        StockRecord {
            code,
            symbol,
            name,
            area: String::new(),
            industry: String::new(),
            list_date: String::new(),
            is_hs300: false,
            is_zz500: false,
        }
    }
}

/// bare ticker of an exchange-qualified code: sh.600000 -> 600000
///
/// a code without separator is returned unchanged
pub fn symbol_of(code: &str) -> &str {
    match code.find('.') {
        Some(pos) => &code[pos + 1..],
        None => code,
    }
}

/// fetch both index membership lists within the given session and fold
/// them into one deduplicated record set, in first-seen order
pub fn resolve_constituents(cli: &BaostockClient) -> Result<Vec<StockRecord>> {
    info!("fetching index constituents");
    let hs300 = drain_membership(cli.query(QueryHs300Stocks { date: None }))?;
    info!("HS300 count: {}", hs300.len());
    let zz500 = drain_membership(cli.query(QueryZz500Stocks { date: None }))?;
    info!("ZZ500 count: {}", zz500.len());
    Ok(merge_memberships(hs300, zz500))
}

/// read (code, display name) pairs until the cursor ends
///
/// a provider error code stops consumption of this list but keeps the
/// rows already read, matching end-of-data handling
fn drain_membership<C: QueryCommand>(mut rs: ResultSet<C>) -> Result<Vec<(String, String)>> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut indices: Option<(usize, usize)> = None;
    loop {
        match rs.advance()? {
            CursorState::Row(row) => {
                let (code_idx, name_idx) = match indices {
                    Some(pair) => pair,
                    None => {
                        let pair = membership_indices(rs.fields())?;
                        indices = Some(pair);
                        pair
                    }
                };
                let code = row.get(code_idx).cloned().unwrap_or_default();
                let name = row.get(name_idx).cloned().unwrap_or_default();
                if !code.is_empty() {
                    pairs.push((code, name));
                }
            }
            CursorState::EndOfData => break,
            CursorState::ProviderError(code) => {
                warn!(
                    "provider returned error {} while reading membership list, keeping {} rows",
                    code,
                    pairs.len()
                );
                break;
            }
        }
    }
    Ok(pairs)
}

fn membership_indices(fields: &[String]) -> Result<(usize, usize)> {
    let code = fields
        .iter()
        .position(|f| f == "code")
        .ok_or_else(|| Error("membership response has no code field".to_owned()))?;
    let name = fields
        .iter()
        .position(|f| f == "code_name")
        .ok_or_else(|| Error("membership response has no code_name field".to_owned()))?;
    Ok((code, name))
}

/// dedup by code with OR-folded membership flags; the display name of
/// the first list a code appears in wins
pub fn merge_memberships(
    hs300: Vec<(String, String)>,
    zz500: Vec<(String, String)>,
) -> Vec<StockRecord> {
    let mut records: Vec<StockRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    fold_membership(&mut records, &mut index, hs300, true);
    fold_membership(&mut records, &mut index, zz500, false);
    records
}

fn fold_membership(
    records: &mut Vec<StockRecord>,
    index: &mut HashMap<String, usize>,
    pairs: Vec<(String, String)>,
    is_hs300: bool,
) {
    for (code, name) in pairs {
        let i = match index.get(&code) {
            Some(&i) => i,
            None => {
                records.push(StockRecord::new(code.clone(), name));
                index.insert(code, records.len() - 1);
                records.len() - 1
            }
        };
        if is_hs300 {
            records[i].is_hs300 = true;
        } else {
            records[i].is_zz500 = true;
        }
    }
}

/// merge reference attributes in by bare symbol
///
/// a symbol absent from the reference dataset leaves the three
/// attributes empty, never fails
pub fn enrich(records: &mut [StockRecord], reference: &HashMap<String, ReferenceEntry>) {
    for record in records.iter_mut() {
        if let Some(entry) = reference.get(&record.symbol) {
            record.area = entry.area.clone();
            record.industry = entry.industry.clone();
            record.list_date = entry.list_date.clone();
        }
    }
}
