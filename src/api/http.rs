//! reqwest-backed [`GanttApi`].
//!
//! Endpoints, relative to the configured base URL:
//!
//! | Operation | Request |
//! |---|---|
//! | option values | `GET  gantt/{uid}/filters` |
//! | presets | `GET  gantt/{uid}/user-filters` |
//! | save presets | `PUT  gantt/{uid}/user-filters` with `{"userFilters": [...]}` |
//! | dataset | `GET  gantt/{uid}/data?{query}` |
//!
//! Every successful response wraps its payload as `{"data": ...}`.

use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{ApiError, GanttApi, UserFiltersPayload, UserPreset};
use crate::config::ApiConfig;
use crate::options::OptionsSnapshot;
use crate::query::Query;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

fn decode_envelope<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let envelope: Envelope<T> = serde_json::from_slice(bytes)?;
    Ok(envelope.data)
}

#[derive(Debug, Clone)]
pub struct HttpGanttApi {
    client: Client,
    base_url: Url,
}

impl HttpGanttApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("gantt-filter/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(client, &config.base_url)
    }

    /// Use a preconfigured client; `timeout_secs` is then the client's business.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ApiError> {
        let parsed =
            Url::parse(base_url).map_err(|e| ApiError::Url(format!("{base_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::Url(format!(
                "{base_url} cannot be used as a base url"
            )));
        }
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, root_uid: &str, resource: &str) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["gantt", root_uid, resource]);
        Ok(url)
    }

    async fn read_success(response: Response) -> Result<Vec<u8>, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    warn!(status = status.as_u16(), "failed to read error body: {err}");
                    String::new()
                }
            };
            warn!(status = status.as_u16(), "gantt api request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn get_data<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        let bytes = Self::read_success(response).await?;
        decode_envelope(&bytes)
    }
}

impl GanttApi for HttpGanttApi {
    async fn fetch_filters(&self, root_uid: &str) -> Result<OptionsSnapshot, ApiError> {
        let url = self.endpoint(root_uid, "filters")?;
        let data: Value = self.get_data(url).await?;
        Ok(OptionsSnapshot::from_json(data))
    }

    async fn fetch_user_filters(&self, root_uid: &str) -> Result<Vec<UserPreset>, ApiError> {
        let url = self.endpoint(root_uid, "user-filters")?;
        let payload: UserFiltersPayload = self.get_data(url).await?;
        Ok(payload.user_filters)
    }

    async fn update_user_filters(
        &self,
        root_uid: &str,
        presets: &[UserPreset],
    ) -> Result<(), ApiError> {
        let url = self.endpoint(root_uid, "user-filters")?;
        let payload = UserFiltersPayload {
            user_filters: presets.to_vec(),
        };
        debug!(%url, presets = presets.len(), "PUT");
        let response = self.client.put(url).json(&payload).send().await?;
        Self::read_success(response).await?;
        Ok(())
    }

    async fn fetch_data(&self, root_uid: &str, params: &Query) -> Result<Value, ApiError> {
        let mut url = self.endpoint(root_uid, "data")?;
        if !params.is_empty() {
            url.set_query(Some(&params.to_url_query()));
        }
        self.get_data(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client_for(base: &str) -> HttpGanttApi {
        HttpGanttApi::new(&ApiConfig {
            base_url: base.to_string(),
            timeout_secs: 5,
        })
        .expect("client")
    }

    #[test]
    fn endpoint_appends_segments() {
        let api = client_for("https://pm.example.org/api/");
        let url = api.endpoint("root-1", "filters").unwrap();
        assert_eq!(url.as_str(), "https://pm.example.org/api/gantt/root-1/filters");

        let bare = client_for("https://pm.example.org/api");
        let url = bare.endpoint("root-1", "user-filters").unwrap();
        assert_eq!(url.as_str(), "https://pm.example.org/api/gantt/root-1/user-filters");
    }

    #[test]
    fn endpoint_escapes_root_uid() {
        let api = client_for("http://localhost:8080");
        let url = api.endpoint("a/b c", "data").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/gantt/a%2Fb%20c/data");
    }

    #[test]
    fn rejects_unusable_base_urls() {
        let err = HttpGanttApi::new(&ApiConfig {
            base_url: "mailto:someone@example.org".into(),
            timeout_secs: 5,
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Url(_)));
        let err = HttpGanttApi::new(&ApiConfig {
            base_url: "not a url".into(),
            timeout_secs: 5,
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Url(_)));
    }

    #[test]
    fn envelope_unwraps_data() {
        let snapshot: Value =
            decode_envelope(br#"{"data": {"donors": [{"id": 1}]}}"#).unwrap();
        assert_eq!(snapshot, json!({"donors": [{"id": 1}]}));
        let err = decode_envelope::<Value>(br#"{"payload": {}}"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
