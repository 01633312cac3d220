//! Turns CLI flags or extension message payloads into an [`EmailRequest`]

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::Config;
use crate::error::{Result, SenderError};
use crate::models::{DispatchMode, EmailRequest};

/// `local@domain.tld`, no whitespace or list separators
static ADDRESS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@,;<>]+@[^\s@,;<>.]+(\.[^\s@,;<>.]+)+$").unwrap()
});

/// Validated request fields before config defaults are applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestArgs {
    pub to: Vec<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub cc: Option<Vec<String>>,
    pub bcc: Option<Vec<String>>,
    pub html: Option<String>,
    pub mode: DispatchMode,
}

impl RequestArgs {
    /// Fill an absent subject or body from the configured defaults
    pub fn into_request(self, config: &Config) -> EmailRequest {
        EmailRequest {
            to: self.to,
            subject: self
                .subject
                .unwrap_or_else(|| config.default_subject.clone()),
            body: self.body.unwrap_or_else(|| config.default_body.clone()),
            cc: self.cc,
            bcc: self.bcc,
            html_body: self.html,
            mode: self.mode,
        }
    }
}

/// Everything a CLI invocation asked for
#[derive(Debug, Clone)]
pub struct Invocation {
    pub args: RequestArgs,
    pub config_path: Option<PathBuf>,
    pub verbose: bool,
}

pub struct RequestParser;

impl RequestParser {
    /// Validate parsed CLI flags
    ///
    /// A missing `--to` is a validation error; nothing network-capable has
    /// been touched when this returns.
    pub fn parse_cli(cli: &Cli) -> Result<Invocation> {
        let to = match cli.to.as_deref() {
            Some(raw) => split_addresses(raw),
            None => Vec::new(),
        };

        let args = build_args(
            to,
            cli.subject.clone(),
            cli.body.clone(),
            cli.cc.as_deref().map(split_addresses),
            cli.bcc.as_deref().map(split_addresses),
            cli.html.clone(),
            if cli.draft {
                DispatchMode::Draft
            } else {
                DispatchMode::Send
            },
        )?;

        Ok(Invocation {
            args,
            config_path: cli.config.clone(),
            verbose: cli.verbose,
        })
    }

    /// Parse a loosely typed message object
    ///
    /// Recognized fields: `to`, `cc`, `bcc` (string or array of strings),
    /// `subject`, `body`, `html` (string) and `draft` (bool).
    pub fn parse_message(message: &Value) -> Result<RequestArgs> {
        let fields = message.as_object().ok_or_else(|| {
            SenderError::Validation("message must be a JSON object".to_string())
        })?;

        let to = address_field(fields, "to")?.unwrap_or_default();
        let draft = match fields.get("draft") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(_) => {
                return Err(SenderError::Validation(
                    "\"draft\" must be a boolean".to_string(),
                ))
            }
        };

        build_args(
            to,
            string_field(fields, "subject")?,
            string_field(fields, "body")?,
            address_field(fields, "cc")?,
            address_field(fields, "bcc")?,
            string_field(fields, "html")?,
            if draft {
                DispatchMode::Draft
            } else {
                DispatchMode::Send
            },
        )
    }
}

fn build_args(
    to: Vec<String>,
    subject: Option<String>,
    body: Option<String>,
    cc: Option<Vec<String>>,
    bcc: Option<Vec<String>>,
    html: Option<String>,
    mode: DispatchMode,
) -> Result<RequestArgs> {
    if to.is_empty() {
        return Err(SenderError::Validation(
            "a recipient is required (--to)".to_string(),
        ));
    }
    validate_addresses("to", &to)?;

    let cc = cc.filter(|list| !list.is_empty());
    let bcc = bcc.filter(|list| !list.is_empty());
    if let Some(cc) = &cc {
        validate_addresses("cc", cc)?;
    }
    if let Some(bcc) = &bcc {
        validate_addresses("bcc", bcc)?;
    }

    Ok(RequestArgs {
        to,
        subject,
        body,
        cc,
        bcc,
        html,
        mode,
    })
}

/// Split a comma-separated address list, trimming and dropping empty parts
pub fn split_addresses(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn is_plausible_address(address: &str) -> bool {
    ADDRESS_PATTERN.is_match(address)
}

fn validate_addresses(field: &str, addresses: &[String]) -> Result<()> {
    match addresses.iter().find(|a| !is_plausible_address(a)) {
        Some(bad) => Err(SenderError::Validation(format!(
            "invalid {} address: {:?}",
            field, bad
        ))),
        None => Ok(()),
    }
}

fn string_field(fields: &Map<String, Value>, name: &str) -> Result<Option<String>> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(SenderError::Validation(format!(
            "{:?} must be a string",
            name
        ))),
    }
}

fn address_field(fields: &Map<String, Value>, name: &str) -> Result<Option<Vec<String>>> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => Ok(Some(split_addresses(raw))),
        Some(Value::Array(items)) => {
            let mut addresses = Vec::new();
            for item in items {
                let raw = item.as_str().ok_or_else(|| {
                    SenderError::Validation(format!("{:?} entries must be strings", name))
                })?;
                addresses.extend(split_addresses(raw));
            }
            Ok(Some(addresses))
        }
        Some(_) => Err(SenderError::Validation(format!(
            "{:?} must be a string or a list of strings",
            name
        ))),
    }
}
