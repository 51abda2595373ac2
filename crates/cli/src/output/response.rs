//! Rendering of splunkd responses

use serde::Serialize;
use splunkd_core::Response;

use super::Formatter;

/// A response with its body read, as printed by the request commands
#[derive(Debug, Serialize)]
pub struct ResponseOutput {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<HeaderOutput>,
    pub body: String,
    #[serde(skip)]
    raw_body: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct HeaderOutput {
    pub name: String,
    pub value: String,
}

impl ResponseOutput {
    /// Read the whole body of `response`.
    pub fn read(mut response: Response) -> std::io::Result<Self> {
        let raw_body = response.body.read_all()?;
        Ok(Self {
            status: response.status,
            reason: response.reason,
            headers: response
                .headers
                .into_iter()
                .map(|(name, value)| HeaderOutput { name, value })
                .collect(),
            body: String::from_utf8_lossy(&raw_body).into_owned(),
            raw_body,
        })
    }

    /// Status line plus, when asked for, the headers
    pub fn head(&self, include_headers: bool) -> String {
        let mut head = format!("HTTP {} {}", self.status, self.reason);
        if include_headers {
            for header in &self.headers {
                head.push('\n');
                head.push_str(&header.name);
                head.push_str(": ");
                head.push_str(&header.value);
            }
        }
        head
    }

    /// Print as JSON, or as head, blank line and raw body.
    pub fn print(&self, formatter: &Formatter, include_headers: bool) {
        if formatter.is_json() {
            formatter.json(self);
            return;
        }

        formatter.println(&formatter.dim(&self.head(include_headers)));
        if !self.raw_body.is_empty() {
            formatter.println("");
            formatter.raw(&self.raw_body);
            if !self.raw_body.ends_with(b"\n") {
                formatter.println("");
            }
        }
    }
}
