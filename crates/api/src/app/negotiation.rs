//! Content negotiation and the JSON/XML input and output formatters.
//!
//! Negotiation is strict: a request whose `Accept` header names no
//! representation we can write is rejected with 406 instead of falling back
//! to JSON.

use axum::extract::FromRequestParts;
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::app::errors::ApiError;

/// A representation the API can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Xml,
}

/// Preference order when a media range matches more than one format.
const FORMATS: [Format; 2] = [Format::Json, Format::Xml];

impl Format {
    fn media_types(self) -> &'static [&'static str] {
        match self {
            Format::Json => &["application/json", "text/json"],
            Format::Xml => &["application/xml", "text/xml"],
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Format::Json => "+json",
            Format::Xml => "+xml",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Format::Json => "application/json; charset=utf-8",
            Format::Xml => "application/xml; charset=utf-8",
        }
    }

    /// Format able to read a request body of the given `Content-Type`.
    pub fn from_content_type(value: &str) -> Option<Format> {
        let essence = value.split(';').next()?.trim().to_ascii_lowercase();
        FORMATS.into_iter().find(|format| {
            format.media_types().contains(&essence.as_str()) || essence.ends_with(format.suffix())
        })
    }

    fn satisfies(self, range: &MediaRange) -> bool {
        if range.kind == "*" && range.subtype == "*" {
            return true;
        }
        if range.subtype.ends_with(self.suffix()) {
            return true;
        }
        self.media_types().iter().any(|media_type| {
            let (kind, subtype) = media_type.split_once('/').unwrap_or((media_type, ""));
            range.kind == kind && (range.subtype == "*" || range.subtype == subtype)
        })
    }

    pub fn read<T: DeserializeOwned>(self, body: &[u8]) -> Result<T, String> {
        match self {
            Format::Json => serde_json::from_slice(body).map_err(|e| e.to_string()),
            Format::Xml => {
                let text = std::str::from_utf8(body).map_err(|e| e.to_string())?;
                quick_xml::de::from_str(text).map_err(|e| e.to_string())
            }
        }
    }

    /// Serialize `value`; `root` names the XML document element.
    pub fn write<T: Serialize + ?Sized>(self, root: &str, value: &T) -> anyhow::Result<String> {
        match self {
            Format::Json => Ok(serde_json::to_string(value)?),
            Format::Xml => Ok(quick_xml::se::to_string_with_root(root, value)?),
        }
    }

    pub fn respond<T: Serialize + ?Sized>(
        self,
        status: StatusCode,
        root: &str,
        value: &T,
    ) -> Result<Response, ApiError> {
        let body = self.write(root, value)?;
        Ok((status, [(CONTENT_TYPE, self.content_type())], body).into_response())
    }

    /// Like [`Format::respond`] for a collection. XML wraps the items in
    /// `root` as repeated `<item>` elements.
    pub fn respond_list<T: Serialize>(
        self,
        status: StatusCode,
        root: &str,
        items: &[T],
    ) -> Result<Response, ApiError> {
        match self {
            Format::Json => self.respond(status, root, items),
            Format::Xml => self.respond(status, root, &XmlList { items }),
        }
    }
}

#[derive(Serialize)]
struct XmlList<'a, T> {
    #[serde(rename = "item")]
    items: &'a [T],
}

#[derive(Debug, Clone, PartialEq)]
struct MediaRange {
    kind: String,
    subtype: String,
    quality: f32,
}

impl MediaRange {
    fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(';');
        let essence = parts.next()?.trim().to_ascii_lowercase();
        let (kind, subtype) = essence.split_once('/')?;
        if kind.is_empty() || subtype.is_empty() {
            return None;
        }

        let mut quality = 1.0;
        for param in parts {
            if let Some((name, value)) = param.split_once('=') {
                if name.trim().eq_ignore_ascii_case("q") {
                    // A malformed weight counts as the default.
                    quality = value
                        .trim()
                        .parse::<f32>()
                        .ok()
                        .filter(|q| (0.0..=1.0).contains(q))
                        .unwrap_or(1.0);
                }
            }
        }

        Some(Self {
            kind: kind.to_string(),
            subtype: subtype.to_string(),
            quality,
        })
    }

    /// `*/*` < `type/*` < a concrete type.
    fn specificity(&self) -> u8 {
        match (self.kind == "*", self.subtype == "*") {
            (true, _) => 0,
            (false, true) => 1,
            (false, false) => 2,
        }
    }
}

/// Pick the output format for an `Accept` header value.
///
/// Each format is weighed by the most specific range that matches it, so an
/// explicit `q=0` excludes a format even when a wildcard would admit it.
/// Higher weight wins, then the earlier range, then JSON. `None` means
/// nothing acceptable can be produced. A missing, blank or unparsable header
/// selects JSON.
pub fn negotiate(accept: Option<&str>) -> Option<Format> {
    let Some(accept) = accept.map(str::trim).filter(|a| !a.is_empty()) else {
        return Some(Format::Json);
    };

    let ranges: Vec<MediaRange> = accept.split(',').filter_map(MediaRange::parse).collect();
    if ranges.is_empty() {
        return Some(Format::Json);
    }

    let mut best: Option<(Format, f32, usize)> = None;
    for format in FORMATS {
        let deciding = ranges
            .iter()
            .enumerate()
            .filter(|(_, range)| format.satisfies(range))
            .max_by(|(ia, a), (ib, b)| a.specificity().cmp(&b.specificity()).then(ib.cmp(ia)));
        let Some((position, range)) = deciding else {
            continue;
        };
        if range.quality <= 0.0 {
            continue;
        }

        let preferred = match best {
            None => true,
            Some((_, quality, earliest)) => {
                range.quality > quality || (range.quality == quality && position < earliest)
            }
        };
        if preferred {
            best = Some((format, range.quality, position));
        }
    }

    best.map(|(format, _, _)| format)
}

pub(crate) fn accept_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(ACCEPT).and_then(|v| v.to_str().ok())
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Format
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let accept = accept_header(&parts.headers);
        negotiate(accept).ok_or_else(|| {
            tracing::debug!(accept = accept.unwrap_or_default(), "no acceptable representation");
            ApiError::NotAcceptable
        })
    }
}
