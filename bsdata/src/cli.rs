use crate::error::Error;
use crate::model::{QueryCommand, QueryResponse, SessionResponse, SUCCESS_CODE};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde_json::json;
use std::collections::VecDeque;

/// default endpoint of the provider rpc service
pub const BAOSTOCK_URL: &str = "https://api.baostock.com/rpc";

/// one logged-in provider session
///
/// the token is obtained on login and invalidated by logout, which
/// consumes the session so a closed handle cannot be reused
#[derive(Debug)]
pub struct BaostockClient {
    base_url: String,
    token: String,
    http: HttpClient,
}

/// exchange credential for a session token
fn request_token(http: &HttpClient, base_url: &str, user: &str, pwd: &str) -> Result<String, Error> {
    let body = json!({
        "method": "login",
        "user": user,
        "pwd": pwd,
    })
    .to_string();
    let response = http
        .post(base_url)
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .body(body)
        .send()?;
    let session: SessionResponse = serde_json::from_str(&response.text()?)?;
    if session.error_code != SUCCESS_CODE {
        return Err(Error::Server(format!(
            "login failed: {} {}",
            session.error_code, session.error_msg
        )));
    }
    if session.token.is_empty() {
        return Err(Error::Server("login returned empty token".to_owned()));
    }
    Ok(session.token)
}

impl BaostockClient {
    pub fn login(user: &str, pwd: &str) -> Result<Self, Error> {
        Self::login_at(BAOSTOCK_URL, user, pwd)
    }

    pub fn login_at(base_url: &str, user: &str, pwd: &str) -> Result<Self, Error> {
        let http = HttpClient::new();
        let token = request_token(&http, base_url, user, pwd)?;
        Ok(BaostockClient {
            base_url: base_url.to_owned(),
            token,
            http,
        })
    }

    pub fn with_token(base_url: &str, token: &str) -> Self {
        BaostockClient {
            base_url: base_url.to_owned(),
            token: token.to_owned(),
            http: HttpClient::new(),
        }
    }

    pub fn logout(self) -> Result<(), Error> {
        let body = json!({
            "method": "logout",
            "token": self.token,
        })
        .to_string();
        let session: SessionResponse = serde_json::from_str(&self.post(body)?)?;
        if session.error_code != SUCCESS_CODE {
            return Err(Error::Server(format!(
                "logout failed: {} {}",
                session.error_code, session.error_msg
            )));
        }
        Ok(())
    }

    /// open a result-set cursor for the given command
    ///
    /// no request is issued until the cursor is first advanced
    pub fn query<C: QueryCommand>(&self, command: C) -> ResultSet<C> {
        ResultSet {
            cli: self,
            command,
            fields: Vec::new(),
            buf: VecDeque::new(),
            page: 0,
            has_more: true,
            error_code: None,
        }
    }

    fn request_body<C: QueryCommand>(&self, command: &C, page: u32) -> Result<String, Error> {
        let mut body = command.params();
        let map = body
            .as_object_mut()
            .ok_or_else(|| Error::Client("command params must be a json object".to_owned()))?;
        map.insert("method".to_owned(), json!(command.method()));
        map.insert("token".to_owned(), json!(self.token));
        map.insert("cur_page_num".to_owned(), json!(page));
        Ok(body.to_string())
    }

    fn fetch_page<C: QueryCommand>(&self, command: &C, page: u32) -> Result<QueryResponse, Error> {
        let body = self.request_body(command, page)?;
        let response = serde_json::from_str(&self.post(body)?)?;
        Ok(response)
    }

    fn post(&self, body: String) -> Result<String, Error> {
        let response = self
            .http
            .post(&self.base_url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()?;
        Ok(response.text()?)
    }
}

/// outcome of one cursor step
///
/// a non-success page status is reported as ProviderError rather than
/// Err: callers decide whether to truncate or abort, and rows already
/// read stay available either way
#[derive(Debug, PartialEq)]
pub enum CursorState {
    Row(Vec<String>),
    EndOfData,
    ProviderError(String),
}

/// paged cursor over one provider query
pub struct ResultSet<'cli, C: QueryCommand> {
    cli: &'cli BaostockClient,
    command: C,
    fields: Vec<String>,
    buf: VecDeque<Vec<String>>,
    page: u32,
    has_more: bool,
    error_code: Option<String>,
}

impl<'cli, C: QueryCommand> ResultSet<'cli, C> {
    /// step the cursor, fetching the next page when the current one is
    /// drained; Err is reserved for transport and decoding failures
    pub fn advance(&mut self) -> Result<CursorState, Error> {
        loop {
            if let Some(row) = self.buf.pop_front() {
                return Ok(CursorState::Row(row));
            }
            if let Some(ref code) = self.error_code {
                return Ok(CursorState::ProviderError(code.clone()));
            }
            if !self.has_more {
                return Ok(CursorState::EndOfData);
            }
            self.page += 1;
            let page = self.cli.fetch_page(&self.command, self.page)?;
            if page.error_code != SUCCESS_CODE {
                self.error_code = Some(page.error_code);
                continue;
            }
            if self.fields.is_empty() {
                self.fields = page.fields;
            }
            self.has_more = page.has_more;
            // an empty successful page ends the cursor regardless of has_more
            if page.data.is_empty() {
                self.has_more = false;
            }
            self.buf.extend(page.data);
        }
    }

    /// column names of the result set, empty until the first page arrived
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// non-success status observed on a page, if any
    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AdjustFlag, Frequency, QueryHistoryKData, QueryHs300Stocks};

    #[test]
    fn test_query_request_body() {
        let cli = BaostockClient::with_token("http://localhost", "abc");
        let body = cli
            .request_body(&QueryHs300Stocks { date: None }, 1)
            .unwrap();
        assert_eq!(
            json!({
                "method": "query_hs300_stocks",
                "token": "abc",
                "cur_page_num": 1,
                "date": null,
            })
            .to_string(),
            body
        );
    }

    #[test]
    fn test_history_request_body() {
        let cli = BaostockClient::with_token("http://localhost", "abc");
        let body = cli
            .request_body(
                &QueryHistoryKData {
                    code: "sh.600000".to_owned(),
                    fields: "date,code,close".to_owned(),
                    start_date: "2024-07-24".to_owned(),
                    end_date: "2024-07-25".to_owned(),
                    frequency: Frequency::Daily,
                    adjust_flag: AdjustFlag::Unadjusted,
                },
                2,
            )
            .unwrap();
        assert_eq!(
            json!({
                "method": "query_history_k_data_plus",
                "token": "abc",
                "cur_page_num": 2,
                "code": "sh.600000",
                "fields": "date,code,close",
                "start_date": "2024-07-24",
                "end_date": "2024-07-25",
                "frequency": "d",
                "adjustflag": "3",
            })
            .to_string(),
            body
        );
    }
}
