// ABOUTME: Lsky Pro HTTP client for image host interactions
// ABOUTME: Handles upload, keyword search, delete by key, plain fetch, and two-phase delete

use reqwest::{header, multipart, Client as HttpClient, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{SearchFailure, SearchPhase, TransferError};

/// Broad keyword tried when the filename prefix finds nothing
pub const FALLBACK_KEYWORD: &str = "20";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteImage {
    pub name: String,
    pub key: String,
}

#[derive(Debug, Deserialize)]
struct ImageListResponse {
    data: ImageListPage,
}

#[derive(Debug, Deserialize)]
struct ImageListPage {
    data: Vec<RemoteImage>,
}

#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

pub struct LskyClient {
    http_client: HttpClient,
    base_url: String,
    token: String,
}

impl LskyClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }

    /// `Bearer <token>`, whether or not the stored token already has the prefix
    pub fn authorization(&self) -> String {
        let bare = self.token.strip_prefix("Bearer ").unwrap_or(&self.token);
        format!("Bearer {}", bare.trim())
    }

    /// Upload image bytes and return the hosted URL
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
        strategy_id: u32,
    ) -> Result<String, TransferError> {
        let part = multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime_type)?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("strategy_id", strategy_id.to_string());

        let response = self
            .http_client
            .post(self.endpoint("upload"))
            .header(header::AUTHORIZATION, self.authorization())
            .header(header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::Api {
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TransferError::Malformed(e.to_string()))?;

        hosted_url(&body)
            .map(str::to_string)
            .ok_or_else(|| TransferError::Malformed("no image url in upload response".to_string()))
    }

    pub async fn search_by_keyword(&self, keyword: &str) -> Result<Vec<RemoteImage>, TransferError> {
        let response = self
            .http_client
            .get(self.endpoint("images"))
            .query(&[("keyword", keyword)])
            .header(header::AUTHORIZATION, self.authorization())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(TransferError::Api {
                status: status.as_u16(),
            });
        }

        let list: ImageListResponse = response
            .json()
            .await
            .map_err(|e| TransferError::Malformed(e.to_string()))?;

        Ok(list.data.data)
    }

    /// Succeeds on status 200 or any non-empty body; the host is inconsistent about status codes
    pub async fn delete_by_key(&self, key: &str) -> Result<(), TransferError> {
        let response = self
            .http_client
            .delete(self.endpoint(&format!("images/{}", key)))
            .header(header::AUTHORIZATION, self.authorization())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::OK || !body.is_empty() {
            Ok(())
        } else {
            Err(TransferError::DeleteRejected {
                status: status.as_u16(),
            })
        }
    }

    /// Plain GET with no credentials
    pub async fn fetch(&self, url: &str) -> Result<FetchedImage, TransferError> {
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(TransferError::Fetch {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await?.to_vec();

        Ok(FetchedImage {
            bytes,
            content_type,
        })
    }

    /// Find the hosted image behind `url` by keyword search and delete it.
    ///
    /// The host can only search by keyword, so the filename prefix before the
    /// first `-` is tried first, then [`FALLBACK_KEYWORD`].
    pub async fn delete_image(&self, url: &str) -> Result<(), TransferError> {
        let name = match url.rsplit('/').next() {
            Some(name) if !name.is_empty() => name,
            _ => return Err(TransferError::InvalidImageUrl(url.to_string())),
        };
        let primary = name.split('-').next().unwrap_or(name);

        let mut failures = Vec::new();
        for (phase, keyword) in [
            (SearchPhase::Primary, primary),
            (SearchPhase::Fallback, FALLBACK_KEYWORD),
        ] {
            match self.find_and_delete(keyword, name).await {
                Ok(true) => return Ok(()),
                Ok(false) => debug!(keyword, name, "no exact match in search results"),
                Err(error) => failures.push(SearchFailure { phase, error }),
            }
        }

        Err(TransferError::ImageNotFound {
            name: name.to_string(),
            failures,
        })
    }

    async fn find_and_delete(&self, keyword: &str, name: &str) -> Result<bool, TransferError> {
        let images = self.search_by_keyword(keyword).await?;

        match images.iter().find(|image| image.name == name) {
            Some(image) => {
                self.delete_by_key(&image.key).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// `data.links.url`, then `data.url`, then `url`
fn hosted_url(body: &Value) -> Option<&str> {
    ["/data/links/url", "/data/url", "/url"]
        .iter()
        .find_map(|pointer| body.pointer(pointer).and_then(Value::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_authorization_normalizes_prefix() {
        assert_eq!(LskyClient::new("https://h", "abc").authorization(), "Bearer abc");
        assert_eq!(LskyClient::new("https://h", "Bearer abc").authorization(), "Bearer abc");
    }

    #[test]
    fn test_hosted_url_priority() {
        let body = json!({"data": {"links": {"url": "a"}, "url": "b"}, "url": "c"});
        assert_eq!(hosted_url(&body), Some("a"));

        let body = json!({"data": {"url": "b"}, "url": "c"});
        assert_eq!(hosted_url(&body), Some("b"));

        let body = json!({"url": "c"});
        assert_eq!(hosted_url(&body), Some("c"));

        assert_eq!(hosted_url(&json!({"status": false})), None);
    }
}
