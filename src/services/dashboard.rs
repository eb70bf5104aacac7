use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::config::{Endpoints, Environment};
use crate::services::backend::RemoteApi;
use crate::services::loading::LoadingIndicator;
use crate::services::query::QueryParams;
use crate::utils::DashboardError;

/// Everything a screen needs to reach the backend: resolved base URLs, the
/// transport, and the shared loading indicator.
#[derive(Clone)]
pub struct Dashboard {
    pub endpoints: Endpoints,
    pub loading: LoadingIndicator,
    api: Arc<dyn RemoteApi>,
}

impl Dashboard {
    pub fn new(endpoints: Endpoints, api: Arc<dyn RemoteApi>, loading: LoadingIndicator) -> Self {
        Dashboard {
            endpoints,
            loading,
            api,
        }
    }

    pub fn url(&self, environment: Environment, segments: &[&str], params: &QueryParams) -> Url {
        params.apply(self.endpoints.api_url(environment, segments))
    }

    pub async fn get(
        &self,
        environment: Environment,
        segments: &[&str],
        params: &QueryParams,
    ) -> Result<Value, DashboardError> {
        let _loading = self.loading.start();
        self.api.get_json(self.url(environment, segments, params)).await
    }

    pub async fn post(
        &self,
        environment: Environment,
        segments: &[&str],
        body: Value,
    ) -> Result<Value, DashboardError> {
        let _loading = self.loading.start();
        let url = self.endpoints.api_url(environment, segments);
        self.api.post_json(url, body).await
    }
}
