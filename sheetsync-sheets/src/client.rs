//! Spreadsheet API boundary: the [`SheetsApi`] trait and its REST client.
//!
//! Three operations, all addressed by spreadsheet id + A1 range:
//! `get` a cell matrix, `append` rows after the last data row, `update`
//! rows in place. Writes always use raw value input — no formula
//! evaluation or type coercion on the remote side.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use sheetsync_core::{EngineConfig, SheetId};

use crate::error::SheetsError;

/// Blocking spreadsheet operations as the engine consumes them.
pub trait SheetsApi {
    /// Read a range; the matrix is row-major and may be shorter than the
    /// requested range (trailing empty rows are omitted by the API).
    fn get(&self, sheet: &SheetId, range: &str) -> Result<Vec<Vec<String>>, SheetsError>;

    /// Append rows after the last data row of the range's column window.
    fn append(&self, sheet: &SheetId, range: &str, rows: &[Vec<String>]) -> Result<(), SheetsError>;

    /// Overwrite the exact cells of `range` with `rows`.
    fn update(&self, sheet: &SheetId, range: &str, rows: &[Vec<String>]) -> Result<(), SheetsError>;
}

impl<T: SheetsApi + ?Sized> SheetsApi for &T {
    fn get(&self, sheet: &SheetId, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        (**self).get(sheet, range)
    }

    fn append(&self, sheet: &SheetId, range: &str, rows: &[Vec<String>]) -> Result<(), SheetsError> {
        (**self).append(sheet, range, rows)
    }

    fn update(&self, sheet: &SheetId, range: &str, rows: &[Vec<String>]) -> Result<(), SheetsError> {
        (**self).update(sheet, range, rows)
    }
}

// ---------------------------------------------------------------------------
// REST client
// ---------------------------------------------------------------------------

/// Wire shape of a values read.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// [`SheetsApi`] over the values REST endpoints.
#[derive(Debug)]
pub struct RestSheetsClient {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

impl RestSheetsClient {
    /// Build a client from config, reading the bearer token from the
    /// configured environment variable.
    ///
    /// This is the cycle's setup step: failure here aborts the whole cycle
    /// before any record is touched.
    pub fn from_env(config: &EngineConfig) -> Result<Self, SheetsError> {
        let token = std::env::var(&config.token_env)
            .map_err(|_| SheetsError::MissingCredentials(config.token_env.clone()))?;
        Ok(Self::new(config.api_base_url.clone(), token))
    }

    pub fn new(base_url: String, token: String) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .build();
        Self {
            agent,
            base_url,
            token,
        }
    }

    fn values_url(&self, sheet: &SheetId, range: &str, suffix: &str, query: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}{}{}",
            self.base_url.trim_end_matches('/'),
            sheet.0,
            encode_range(range),
            suffix,
            query,
        )
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl SheetsApi for RestSheetsClient {
    fn get(&self, sheet: &SheetId, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.values_url(sheet, range, "", "");
        let response = self
            .agent
            .get(&url)
            .set("Authorization", &self.bearer())
            .call()?;
        let parsed: ValueRange = serde_json::from_reader(response.into_reader())
            .map_err(SheetsError::Json)?;
        Ok(parsed
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    fn append(&self, sheet: &SheetId, range: &str, rows: &[Vec<String>]) -> Result<(), SheetsError> {
        let url = self.values_url(
            sheet,
            range,
            ":append",
            "?valueInputOption=RAW&insertDataOption=INSERT_ROWS",
        );
        self.agent
            .post(&url)
            .set("Authorization", &self.bearer())
            .send_json(json!({ "values": rows }))?;
        Ok(())
    }

    fn update(&self, sheet: &SheetId, range: &str, rows: &[Vec<String>]) -> Result<(), SheetsError> {
        let url = self.values_url(sheet, range, "", "?valueInputOption=RAW");
        self.agent
            .put(&url)
            .set("Authorization", &self.bearer())
            .send_json(json!({ "values": rows }))?;
        Ok(())
    }
}

/// Cells come back as JSON strings, numbers, or bools depending on the
/// sheet's own formatting; the engine compares and writes plain strings.
fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Percent-encode the characters that actually occur in A1 ranges.
fn encode_range(range: &str) -> String {
    let mut out = String::with_capacity(range.len());
    for c in range.chars() {
        match c {
            ' ' => out.push_str("%20"),
            '!' => out.push_str("%21"),
            '\'' => out.push_str("%27"),
            ':' => out.push_str("%3A"),
            other => out.push(other),
        }
    }
    out
}
