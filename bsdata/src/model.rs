use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;

/// error code the provider uses for a successful call
pub const SUCCESS_CODE: &str = "0";

/// QueryCommand
///
/// defines the method name and parameters of one paged provider query
pub trait QueryCommand {
    fn method(&self) -> &'static str;
    // parameters merged into the request body, must be a json object
    fn params(&self) -> Value;
}

/// bar frequency accepted by history queries
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum Frequency {
    #[serde(rename = "d")]
    Daily,
    #[serde(rename = "w")]
    Weekly,
    #[serde(rename = "m")]
    Monthly,
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "d" => Ok(Frequency::Daily),
            "w" => Ok(Frequency::Weekly),
            "m" => Ok(Frequency::Monthly),
            _ => Err(Error::Client(format!("invalid frequency: {}", s))),
        }
    }
}

/// price adjustment mode, wire values follow the provider convention
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum AdjustFlag {
    #[serde(rename = "1")]
    Backward,
    #[serde(rename = "2")]
    Forward,
    #[serde(rename = "3")]
    Unadjusted,
}

impl FromStr for AdjustFlag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(AdjustFlag::Backward),
            "2" => Ok(AdjustFlag::Forward),
            "3" => Ok(AdjustFlag::Unadjusted),
            _ => Err(Error::Client(format!("invalid adjust flag: {}", s))),
        }
    }
}

/// envelope of login/logout responses
#[derive(Debug, Deserialize)]
pub struct SessionResponse {
    pub error_code: String,
    #[serde(default)]
    pub error_msg: String,
    #[serde(default)]
    pub token: String,
}

/// envelope of one result-set page
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub error_code: String,
    #[serde(default)]
    pub error_msg: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub data: Vec<Vec<String>>,
    #[serde(default)]
    pub has_more: bool,
}

/// all query commands are defined below

/// 获取沪深300成分股
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryHs300Stocks {
    pub date: Option<String>,
}

impl QueryCommand for QueryHs300Stocks {
    fn method(&self) -> &'static str {
        "query_hs300_stocks"
    }

    fn params(&self) -> Value {
        json!({ "date": self.date })
    }
}

/// 获取中证500成分股
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryZz500Stocks {
    pub date: Option<String>,
}

impl QueryCommand for QueryZz500Stocks {
    fn method(&self) -> &'static str {
        "query_zz500_stocks"
    }

    fn params(&self) -> Value {
        json!({ "date": self.date })
    }
}

/// 获取历史K线数据
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryHistoryKData {
    pub code: String,
    pub fields: String,
    pub start_date: String,
    pub end_date: String,
    pub frequency: Frequency,
    pub adjust_flag: AdjustFlag,
}

impl QueryCommand for QueryHistoryKData {
    fn method(&self) -> &'static str {
        "query_history_k_data_plus"
    }

    fn params(&self) -> Value {
        json!({
            "code": self.code,
            "fields": self.fields,
            "start_date": self.start_date,
            "end_date": self.end_date,
            "frequency": self.frequency,
            "adjustflag": self.adjust_flag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_rename() {
        assert_serde_frequency("d", &Frequency::Daily);
        assert_serde_frequency("w", &Frequency::Weekly);
        assert_serde_frequency("m", &Frequency::Monthly);
    }

    #[test]
    fn test_adjust_flag_rename() {
        assert_serde_adjust_flag("1", &AdjustFlag::Backward);
        assert_serde_adjust_flag("2", &AdjustFlag::Forward);
        assert_serde_adjust_flag("3", &AdjustFlag::Unadjusted);
    }

    #[test]
    fn test_history_params() {
        let cmd = QueryHistoryKData {
            code: "sh.600000".to_owned(),
            fields: "date,code,close".to_owned(),
            start_date: "2024-07-24".to_owned(),
            end_date: "2024-07-25".to_owned(),
            frequency: Frequency::Daily,
            adjust_flag: AdjustFlag::Unadjusted,
        };
        assert_eq!(
            json!({
                "code": "sh.600000",
                "fields": "date,code,close",
                "start_date": "2024-07-24",
                "end_date": "2024-07-25",
                "frequency": "d",
                "adjustflag": "3",
            }),
            cmd.params()
        );
    }

    #[test]
    fn test_membership_params() {
        let cmd = QueryHs300Stocks { date: None };
        assert_eq!("query_hs300_stocks", cmd.method());
        assert_eq!(json!({ "date": null }), cmd.params());
    }

    fn assert_serde_frequency(s: &str, f: &Frequency) {
        let str_repr = serde_json::to_string(s).unwrap();
        assert_eq!(str_repr, serde_json::to_string(f).unwrap());
        assert_eq!(f, &serde_json::from_str::<Frequency>(&str_repr).unwrap());
    }

    fn assert_serde_adjust_flag(s: &str, a: &AdjustFlag) {
        let str_repr = serde_json::to_string(s).unwrap();
        assert_eq!(str_repr, serde_json::to_string(a).unwrap());
        assert_eq!(a, &serde_json::from_str::<AdjustFlag>(&str_repr).unwrap());
    }
}
