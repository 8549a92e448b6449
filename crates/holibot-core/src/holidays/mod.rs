//! Holiday lookup for the agent's action group.
//!
//! The agent calls this function with a `year` parameter. We fetch the
//! Japanese public holidays for that year and hand back a plain-text list
//! wrapped in the function-calling response envelope.
//!
//! # Envelope
//!
//! Inbound:
//! ```json
//! {"actionGroup": "holidays", "function": "get_holidays", "messageVersion": "1.0",
//!  "parameters": [{"name": "year", "type": "string", "value": "2025"}]}
//! ```
//!
//! Outbound:
//! ```json
//! {"response": {"actionGroup": "holidays", "function": "get_holidays",
//!   "functionResponse": {"responseBody": {"TEXT": {"body": "2025年の日本の祝日:\n..."}}}},
//!  "messageVersion": "1.0"}
//! ```

mod source;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use source::{HolidaySource, HttpHolidaySource, DEFAULT_BASE_URL};

/// Mapping of ISO date → holiday name. Ordered by date.
pub type Holidays = BTreeMap<String, String>;

#[derive(Error, Debug)]
pub enum HolidayError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for parameter {name}: {value:?}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("Failed to fetch holidays: {0}")]
    Fetch(String),

    #[error("Failed to parse holiday data: {0}")]
    Parse(String),
}

/// A named parameter from the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionParameter {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(default)]
    pub value: String,
}

/// An inbound function invocation. Fields the agent sends that we do not
/// use (agent, sessionId, inputText, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInvocation {
    pub action_group: String,
    pub function: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_version: Option<serde_json::Value>,
    #[serde(default)]
    pub parameters: Vec<FunctionParameter>,
}

impl FunctionInvocation {
    /// Value of the named parameter. When a name repeats, the last one wins.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .rev()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub response: ResponseEnvelope,
    pub message_version: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub action_group: String,
    pub function: String,
    pub function_response: FunctionResponseBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponseBody {
    pub response_body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(rename = "TEXT")]
    pub text: TextBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBody {
    pub body: String,
}

impl FunctionResponse {
    /// Wrap `body`, echoing identifiers and protocol version from `event`.
    pub fn text(event: &FunctionInvocation, body: String) -> Self {
        Self {
            response: ResponseEnvelope {
                action_group: event.action_group.clone(),
                function: event.function.clone(),
                function_response: FunctionResponseBody {
                    response_body: ResponseBody {
                        text: TextBody { body },
                    },
                },
            },
            message_version: event
                .message_version
                .clone()
                .unwrap_or(serde_json::Value::from(1)),
        }
    }

    pub fn body(&self) -> &str {
        &self.response.function_response.response_body.text.body
    }
}

/// Handle one invocation: read `year`, fetch, format, wrap.
pub fn handle_invocation<S>(
    event: &FunctionInvocation,
    source: &S,
) -> Result<FunctionResponse, HolidayError>
where
    S: HolidaySource + ?Sized,
{
    let year = event
        .parameter("year")
        .ok_or(HolidayError::MissingParameter("year"))?
        .trim();

    if year.is_empty() || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HolidayError::InvalidParameter {
            name: "year",
            value: year.to_string(),
        });
    }

    log::info!(
        "Holiday lookup for {} ({}/{})",
        year,
        event.action_group,
        event.function
    );

    let holidays = source.fetch(year)?;
    Ok(FunctionResponse::text(event, format_holidays(year, &holidays)))
}

/// Header line naming the year, then `"<date>: <name>"` per holiday in
/// ascending date order. Every line ends with a newline.
pub fn format_holidays(year: &str, holidays: &Holidays) -> String {
    let mut text = format!("{}年の日本の祝日:\n", year);
    for (date, name) in holidays {
        text.push_str(date);
        text.push_str(": ");
        text.push_str(name);
        text.push('\n');
    }
    text
}
