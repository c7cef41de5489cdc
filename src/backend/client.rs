//! Statistics service client
//!
//! The coordinator talks to the statistics service through the
//! [`StatisticsBackend`] trait so sessions can run against the HTTP
//! service in production and an in-process double in tests.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::{BackendError, BackendResult};
use super::protocol::{
    ConceptStat, InspectRuleRequest, InspectRuleResponse, UpdateConceptRequest,
};

const INSPECT_RULE_ENDPOINT: &str = "inspect_rule/";
const UPDATE_CONCEPT_ENDPOINT: &str = "update_concept";

/// Asynchronous statistics queries issued by a session.
#[async_trait]
pub trait StatisticsBackend {
    /// Evaluates a resolved condition list over the corpus.
    async fn inspect_rule(
        &self,
        request: &InspectRuleRequest,
    ) -> BackendResult<InspectRuleResponse>;

    /// Scores a concept's member list as a standalone subpopulation.
    async fn update_concept(&self, request: &UpdateConceptRequest) -> BackendResult<ConceptStat>;
}

/// [`StatisticsBackend`] over HTTP, posting JSON bodies to the service.
pub struct HttpStatisticsBackend {
    client: Client,
    base_url: String,
}

impl HttpStatisticsBackend {
    /// Creates a client against the service at `base_url`. Trailing
    /// slashes are stripped so endpoint paths join cleanly.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        HttpStatisticsBackend {
            client: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B, T>(&self, endpoint: &'static str, body: &B) -> BackendResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::status(endpoint, status.as_u16()));
        }
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|err| BackendError::decode(endpoint, err.to_string()))
    }
}

#[async_trait]
impl StatisticsBackend for HttpStatisticsBackend {
    async fn inspect_rule(
        &self,
        request: &InspectRuleRequest,
    ) -> BackendResult<InspectRuleResponse> {
        self.post_json(INSPECT_RULE_ENDPOINT, request).await
    }

    async fn update_concept(&self, request: &UpdateConceptRequest) -> BackendResult<ConceptStat> {
        self.post_json(UPDATE_CONCEPT_ENDPOINT, request).await
    }
}
