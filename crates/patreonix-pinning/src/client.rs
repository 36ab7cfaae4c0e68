//! Pinata HTTP client.
//!
//! Every call is a single request; there are no retries. API calls carry the
//! configured JWT as a bearer token, gateway reads are anonymous.

use std::collections::BTreeMap;
use std::fmt;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use patreonix_core::config::PinningConfig;

use crate::error::{PinningError, PinningResult};

/// Optional name and key/value tags stored alongside a pin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinataMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub keyvalues: BTreeMap<String, String>,
}

impl PinataMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            keyvalues: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.keyvalues.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: Option<String>,
    #[serde(rename = "Hash")]
    hash: Option<String>,
}

impl PinResponse {
    fn cid(self) -> PinningResult<String> {
        self.ipfs_hash
            .or(self.hash)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| PinningError::Decode("response carried no content hash".into()))
    }
}

#[derive(Debug, Deserialize)]
struct PinListResponse {
    rows: Vec<PinRow>,
}

#[derive(Debug, Deserialize)]
struct PinRow {
    ipfs_pin_hash: String,
}

#[derive(Clone)]
pub struct PinataClient {
    http: Client,
    api_url: String,
    gateway_url: String,
    jwt: String,
}

impl fmt::Debug for PinataClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinataClient")
            .field("api_url", &self.api_url)
            .field("gateway_url", &self.gateway_url)
            .field("jwt", &"[REDACTED]")
            .finish()
    }
}

/// CIDs (base58btc v0, base32 v1) are ASCII alphanumeric.
fn require_cid(cid: &str) -> PinningResult<&str> {
    let cid = cid.trim();
    if cid.is_empty() {
        return Err(PinningError::InvalidInput("cid must not be empty".into()));
    }
    if !cid.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(PinningError::InvalidInput(format!("cid {cid:?} is not alphanumeric")));
    }
    Ok(cid)
}

impl PinataClient {
    pub fn new(cfg: &PinningConfig) -> PinningResult<Self> {
        Self::with_http_client(cfg, Client::new())
    }

    /// Use a caller-built `reqwest::Client` (timeouts, proxies).
    pub fn with_http_client(cfg: &PinningConfig, http: Client) -> PinningResult<Self> {
        if cfg.jwt.trim().is_empty() {
            return Err(PinningError::InvalidInput("pinning jwt is not configured".into()));
        }
        Ok(Self {
            http,
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
            gateway_url: cfg.gateway_url.trim_end_matches('/').to_string(),
            jwt: cfg.jwt.clone(),
        })
    }

    /// Public gateway URL for `cid`.
    pub fn gateway_url(&self, cid: &str) -> PinningResult<String> {
        Ok(format!("{}/{}", self.gateway_url, require_cid(cid)?))
    }

    fn api(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(&self.jwt)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn send(&self, op: &'static str, req: RequestBuilder) -> PinningResult<Response> {
        let resp = req.send().await.map_err(|e| {
            warn!(op, error = %e, "pinning request failed");
            PinningError::from(e)
        })?;
        let status = resp.status();
        if status.is_success() {
            debug!(op, status = status.as_u16(), "pinning request ok");
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        warn!(op, status = status.as_u16(), "pinning service error");
        Err(PinningError::Http {
            status: status.as_u16(),
            body,
        })
    }

    /// Upload `bytes` as `filename` and pin it. Returns the content hash.
    pub async fn pin_file(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        metadata: Option<&PinataMetadata>,
    ) -> PinningResult<String> {
        if filename.trim().is_empty() {
            return Err(PinningError::InvalidInput("filename must not be empty".into()));
        }
        let mut form = Form::new().part("file", Part::bytes(bytes).file_name(filename.to_string()));
        if let Some(meta) = metadata {
            let meta = serde_json::to_string(meta).map_err(|e| PinningError::InvalidInput(e.to_string()))?;
            form = form.text("pinataMetadata", meta);
        }
        let req = self.api(self.http.post(self.endpoint("/pinning/pinFileToIPFS"))).multipart(form);
        let resp: PinResponse = self.send("pin_file", req).await?.json().await?;
        resp.cid()
    }

    /// Pin a JSON document. Returns the content hash.
    pub async fn pin_json(&self, content: &Value, metadata: Option<&PinataMetadata>) -> PinningResult<String> {
        let mut body = json!({ "pinataContent": content });
        if let Some(meta) = metadata {
            body["pinataMetadata"] = serde_json::to_value(meta).map_err(|e| PinningError::InvalidInput(e.to_string()))?;
        }
        let req = self.api(self.http.post(self.endpoint("/pinning/pinJSONToIPFS"))).json(&body);
        let resp: PinResponse = self.send("pin_json", req).await?.json().await?;
        resp.cid()
    }

    /// Fetch content bytes through the gateway.
    pub async fn get_file(&self, cid: &str) -> PinningResult<Vec<u8>> {
        let url = self.gateway_url(cid)?;
        let resp = self.send("get_file", self.http.get(url)).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    /// Ask the service to pin content that already exists on IPFS.
    pub async fn pin_by_hash(&self, cid: &str) -> PinningResult<()> {
        let cid = require_cid(cid)?;
        let req = self
            .api(self.http.post(self.endpoint("/pinning/addHashToPinQueue")))
            .json(&json!({ "hashToPin": cid }));
        self.send("pin_by_hash", req).await?;
        Ok(())
    }

    pub async fn unpin(&self, cid: &str) -> PinningResult<()> {
        let cid = require_cid(cid)?;
        let req = self.api(self.http.delete(self.endpoint(&format!("/pinning/unpin/{cid}"))));
        self.send("unpin", req).await?;
        Ok(())
    }

    /// Content hashes of every pin on the account.
    pub async fn list_pinned(&self) -> PinningResult<Vec<String>> {
        let req = self.api(self.http.get(self.endpoint("/data/pinList")));
        let list: PinListResponse = self.send("list_pinned", req).await?.json().await?;
        Ok(list.rows.into_iter().map(|r| r.ipfs_pin_hash).collect())
    }

    /// Replace the key/value tags of an existing pin.
    pub async fn update_metadata(&self, cid: &str, keyvalues: &BTreeMap<String, String>) -> PinningResult<()> {
        let cid = require_cid(cid)?;
        let req = self
            .api(self.http.put(self.endpoint("/pinning/hashMetadata")))
            .json(&json!({ "ipfsPinHash": cid, "keyvalues": keyvalues }));
        self.send("update_metadata", req).await?;
        Ok(())
    }
}
