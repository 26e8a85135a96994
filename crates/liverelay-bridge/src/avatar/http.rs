//! HTTP implementations of the profile lookup and image fetch seams.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;

use liverelay_core::error::{RelayError, Result};

use super::resolver::{ImageFetch, ProfileLookup};

/// Build the shared HTTP client used for both lookups and downloads.
pub fn build_client(timeout: std::time::Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RelayError::Internal(format!("http client build failed: {e}")))
}

/// Profile endpoint replying `{"code":0,"data":{"face":"<url>",...}}`.
pub struct HttpProfileLookup {
    client: reqwest::Client,
    url: String,
}

impl HttpProfileLookup {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<ProfileData>,
}

#[derive(Debug, Deserialize)]
struct ProfileData {
    #[serde(default)]
    face: String,
}

#[async_trait]
impl ProfileLookup for HttpProfileLookup {
    async fn avatar_url(&self, uid: i64) -> Result<String> {
        let mid = uid.to_string();
        let resp = self
            .client
            .get(&self.url)
            .query(&[("mid", mid.as_str()), ("jsonp", "jsonp")])
            .send()
            .await
            .map_err(|e| RelayError::ProfileLookup(format!("request failed: {e}")))?;

        let body: ProfileResponse = resp
            .json()
            .await
            .map_err(|e| RelayError::ProfileLookup(format!("invalid response: {e}")))?;

        face_from_response(body)
    }
}

fn face_from_response(body: ProfileResponse) -> Result<String> {
    if body.code != 0 {
        return Err(RelayError::ProfileLookup(format!(
            "code {}: {}",
            body.code, body.message
        )));
    }
    match body.data {
        Some(d) if !d.face.is_empty() => Ok(d.face),
        _ => Err(RelayError::ProfileLookup("response has no avatar url".into())),
    }
}

/// Plain GET; the body is the image.
pub struct HttpImageFetch {
    client: reqwest::Client,
}

impl HttpImageFetch {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetch for HttpImageFetch {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        self.client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| RelayError::ImageFetch(format!("request failed: {e}")))?
            .bytes()
            .await
            .map_err(|e| RelayError::ImageFetch(format!("body read failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    fn parse(s: &str) -> Result<String> {
        face_from_response(serde_json::from_str(s).unwrap())
    }

    #[test]
    fn success_yields_face_url() {
        let url = parse(r#"{"code":0,"message":"0","data":{"mid":1,"name":"a","face":"https://i0.example/f.jpg"}}"#)
            .unwrap();
        assert_eq!(url, "https://i0.example/f.jpg");
    }

    #[test]
    fn nonzero_code_is_lookup_failure() {
        let err = parse(r#"{"code":-404,"message":"nothing here","data":null}"#).expect_err("must fail");
        assert_eq!(err.code().as_str(), "PROFILE_LOOKUP");
        assert!(err.to_string().contains("-404"));
    }

    #[test]
    fn missing_face_is_lookup_failure() {
        assert!(parse(r#"{"code":0,"data":{"name":"a"}}"#).is_err());
        assert!(parse(r#"{"code":0}"#).is_err());
    }
}
