//! HTTP geocoder client (Yandex-style JSON API) on hyper.
//!
//! Request: `GET {base_url}?format=json&results=1&geocode=<address>[&apikey=<key>]`.
//! Plain HTTP only; TLS is terminated by an egress proxy in front of the geocoder.

use async_trait::async_trait;
use bytes::Bytes;
use http::{header, Request, Uri};
use http_body_util::{BodyExt, Empty, LengthLimitError, Limited};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;
use tracing::debug;

use super::{GeoError, GeoObject, GeoObjectProvider, GeoPoint};

/// Largest geocoder response accepted. One result is a few KiB.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

#[derive(Deserialize)]
struct Envelope {
    response: ResponseBody,
}

#[derive(Deserialize)]
struct ResponseBody {
    #[serde(rename = "GeoObjectCollection")]
    collection: Collection,
}

#[derive(Deserialize)]
struct Collection {
    #[serde(rename = "featureMember", default)]
    members: Vec<Member>,
}

#[derive(Deserialize)]
struct Member {
    #[serde(rename = "GeoObject")]
    geo_object: RawGeoObject,
}

#[derive(Deserialize)]
struct RawGeoObject {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "Point")]
    point: Option<RawPoint>,
}

#[derive(Deserialize)]
struct RawPoint {
    pos: String,
}

/// `"<longitude> <latitude>"`
fn parse_pos(pos: &str) -> Option<GeoPoint> {
    let mut parts = pos.split_whitespace();
    let longitude = parts.next()?.parse().ok()?;
    let latitude = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(GeoPoint {
        longitude,
        latitude,
    })
}

/// Decode a geocoder answer. An empty member list means the address was not found.
pub fn decode_response(body: &[u8]) -> Result<Option<GeoObject>, GeoError> {
    let envelope: Envelope =
        serde_json::from_slice(body).map_err(|e| GeoError::InvalidResponse(e.to_string()))?;
    Ok(envelope
        .response
        .collection
        .members
        .into_iter()
        .next()
        .map(|member| {
            let raw = member.geo_object;
            GeoObject {
                name: raw.name,
                description: raw.description,
                point: raw.point.as_ref().and_then(|p| parse_pos(&p.pos)),
            }
        }))
}

pub struct HttpGeoProvider {
    client: Client<HttpConnector, Empty<Bytes>>,
    base_url: String,
    api_key: Option<String>,
    max_response_bytes: usize,
}

impl HttpGeoProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            base_url: base_url.into(),
            api_key: None,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = limit;
        self
    }

    fn lookup_uri(&self, address: &str) -> Result<Uri, GeoError> {
        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        let mut url = format!(
            "{}{}format=json&results=1&geocode={}",
            self.base_url,
            separator,
            urlencoding::encode(address)
        );
        if let Some(key) = &self.api_key {
            url.push_str("&apikey=");
            url.push_str(&urlencoding::encode(key));
        }
        url.parse().map_err(|e: http::uri::InvalidUri| GeoError::Request(e.to_string()))
    }
}

#[async_trait]
impl GeoObjectProvider for HttpGeoProvider {
    async fn find_geo_object(&self, address: &str) -> Result<Option<GeoObject>, GeoError> {
        let uri = self.lookup_uri(address)?;
        let request = Request::get(uri)
            .header(header::ACCEPT, "application/json")
            .body(Empty::<Bytes>::new())
            .map_err(|e| GeoError::Request(e.to_string()))?;
        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| GeoError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::Status(status.as_u16()));
        }
        let body = Limited::new(response.into_body(), self.max_response_bytes)
            .collect()
            .await
            .map_err(|e| {
                if e.downcast_ref::<LengthLimitError>().is_some() {
                    GeoError::InvalidResponse(format!(
                        "response larger than {} bytes",
                        self.max_response_bytes
                    ))
                } else {
                    GeoError::Transport(e.to_string())
                }
            })?
            .to_bytes();
        let found = decode_response(&body)?;
        debug!(address, found = found.is_some(), "geocoder lookup");
        Ok(found)
    }
}
