use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// one row of the locally cached reference dataset, keyed by bare symbol
///
/// the source file carries many more columns; only the enrichment
/// attributes are read, everything else is ignored
#[derive(Debug, Deserialize)]
pub struct ReferenceEntry {
    pub symbol: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub list_date: String,
}

/// load the reference dataset once per run
///
/// a missing file is a hard error so the pipeline stops before any
/// network call is made
pub fn load_reference<P: AsRef<Path>>(path: P) -> Result<HashMap<String, ReferenceEntry>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error(format!(
            "reference dataset {} not found",
            path.display()
        )));
    }
    let mut reader = csv::Reader::from_path(path)?;
    let mut map = HashMap::new();
    for record in reader.deserialize() {
        let entry: ReferenceEntry = record?;
        map.entry(entry.symbol.clone()).or_insert(entry);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_csv(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("bsdata-{}-{}", std::process::id(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_reference() {
        let path = temp_csv(
            "reference.csv",
            "ts_code,symbol,name,area,industry,list_date\n\
             600000.SH,600000,浦发银行,上海,银行,19991110\n\
             000001.SZ,000001,平安银行,深圳,银行,19910403\n",
        );
        let map = load_reference(&path).unwrap();
        assert_eq!(2, map.len());
        let entry = &map["600000"];
        assert_eq!("上海", entry.area);
        assert_eq!("银行", entry.industry);
        assert_eq!("19991110", entry.list_date);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = load_reference("no/such/file.csv").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
