//! Email payload types consumed by the body pipeline.
//!
//! These mirror the JMAP `Email/get` objects handed over by the mail
//! retrieval layer. Only the properties mailfold reads are modelled; the
//! rest are ignored on deserialization.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A mailbox address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
}

/// A raw header as delivered by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailHeader {
    pub name: String,
    pub value: String,
}

/// Reference from a body list into `bodyValues`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyPart {
    #[serde(default)]
    pub part_id: Option<String>,
    #[serde(rename = "type", default)]
    pub content_type: Option<String>,
}

/// Decoded content of one body part.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyValue {
    pub value: String,
}

/// An email object from `Email/get`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Email {
    pub id: String,
    pub subject: Option<String>,
    pub from: Option<Vec<EmailAddress>>,
    pub to: Option<Vec<EmailAddress>>,
    pub cc: Option<Vec<EmailAddress>>,
    pub received_at: Option<String>,
    pub sent_at: Option<String>,
    pub size: u64,
    pub headers: Vec<EmailHeader>,
    pub text_body: Vec<BodyPart>,
    pub html_body: Vec<BodyPart>,
    pub body_values: HashMap<String, BodyValue>,
}

impl Email {
    /// Collect the plain and HTML representations the server sent.
    ///
    /// For each list, the first part whose id resolves in `bodyValues` wins.
    pub fn raw_bodies(&self) -> RawBodies {
        RawBodies {
            plain: self.first_body_value(&self.text_body),
            html: self.first_body_value(&self.html_body),
        }
    }

    fn first_body_value(&self, parts: &[BodyPart]) -> Option<String> {
        parts
            .iter()
            .filter_map(|part| part.part_id.as_deref())
            .find_map(|id| self.body_values.get(id))
            .map(|bv| bv.value.clone())
    }
}

/// One body representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawBody {
    PlainText(String),
    Html(String),
}

/// The body representations available for a single email.
///
/// Either or both may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBodies {
    pub plain: Option<String>,
    pub html: Option<String>,
}

impl RawBodies {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plain: Some(text.into()),
            html: None,
        }
    }

    pub fn html(markup: impl Into<String>) -> Self {
        Self {
            plain: None,
            html: Some(markup.into()),
        }
    }

    /// The representation the pipeline should use: plain text wins over HTML.
    pub fn preferred(&self) -> Option<RawBody> {
        if let Some(text) = &self.plain {
            return Some(RawBody::PlainText(text.clone()));
        }
        self.html.as_ref().map(|markup| RawBody::Html(markup.clone()))
    }
}

/// One unit of a multi-item response: a fixed header plus its bodies.
#[derive(Debug, Clone, Default)]
pub struct Item {
    /// Pre-rendered header block. Never truncated.
    pub header: String,
    pub bodies: RawBodies,
}

impl Item {
    pub fn new(header: impl Into<String>, bodies: RawBodies) -> Self {
        Self {
            header: header.into(),
            bodies,
        }
    }
}

/// `Email/get` response arguments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailGetResponse {
    pub account_id: Option<String>,
    pub list: Vec<Email>,
    pub not_found: Vec<String>,
}
