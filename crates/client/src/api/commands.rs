//! Typed commands for platform resources
//!
//! Thin wrappers over the [`ApiClient`] verb methods: contributions,
//! subscriptions, milestones, campaign updates, and documents. Each command
//! owns its path and response shape so call sites never hand-build URLs.

use std::sync::Arc;

use fundline_domain::types::{
    CampaignUpdate, Contribution, DocumentMeta, ListResponse, Milestone, NewContribution,
    NewSubscription, Subscription,
};
use fundline_domain::ApiFailure;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::client::ApiClient;

/// Typed command surface over the Fundline REST API
pub struct ApiCommands {
    client: Arc<ApiClient>,
}

impl ApiCommands {
    /// Create a new commands instance over a shared client.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    // === Contributions ===

    /// Create a one-off contribution.
    ///
    /// # Errors
    /// Returns error if the API request fails.
    #[instrument(skip(self, contribution), fields(amount_cents = contribution.amount_cents))]
    pub async fn create_contribution(
        &self,
        contribution: &NewContribution,
    ) -> Result<Contribution, ApiFailure> {
        let created: Contribution = self.client.post("/contributions", contribution).await?;

        debug!(contribution_id = %created.id, "contribution created");
        Ok(created)
    }

    /// Get a contribution by id.
    ///
    /// # Errors
    /// Returns error if the contribution is missing or the request fails.
    #[instrument(skip(self), fields(contribution_id = %id))]
    pub async fn get_contribution(&self, id: Uuid) -> Result<Contribution, ApiFailure> {
        self.client.get(&format!("/contributions/{id}")).await
    }

    /// List contributions with pagination.
    ///
    /// # Errors
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_contributions(
        &self,
        limit: u32,
    ) -> Result<ListResponse<Contribution>, ApiFailure> {
        let response: ListResponse<Contribution> =
            self.client.get(&format!("/contributions?limit={limit}")).await?;

        debug!(count = response.items.len(), "contributions listed");
        Ok(response)
    }

    // === Subscriptions ===

    /// Start a recurring subscription.
    ///
    /// # Errors
    /// Returns error if the API request fails.
    #[instrument(skip(self, subscription), fields(amount_cents = subscription.amount_cents))]
    pub async fn create_subscription(
        &self,
        subscription: &NewSubscription,
    ) -> Result<Subscription, ApiFailure> {
        let created: Subscription = self.client.post("/subscriptions", subscription).await?;

        debug!(subscription_id = %created.id, "subscription created");
        Ok(created)
    }

    /// Cancel a subscription. The API answers 204 on success.
    ///
    /// # Errors
    /// Returns error if the subscription is missing or the request fails.
    #[instrument(skip(self), fields(subscription_id = %id))]
    pub async fn cancel_subscription(&self, id: Uuid) -> Result<(), ApiFailure> {
        self.client.delete(&format!("/subscriptions/{id}")).await?;

        debug!(subscription_id = %id, "subscription cancelled");
        Ok(())
    }

    // === Public content ===

    /// List the campaign's fundraising milestones.
    ///
    /// # Errors
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_milestones(&self) -> Result<ListResponse<Milestone>, ApiFailure> {
        self.client.get("/milestones").await
    }

    /// List campaign progress updates with pagination.
    ///
    /// # Errors
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_updates(
        &self,
        limit: u32,
    ) -> Result<ListResponse<CampaignUpdate>, ApiFailure> {
        let response: ListResponse<CampaignUpdate> =
            self.client.get(&format!("/updates?limit={limit}")).await?;

        debug!(count = response.items.len(), "updates listed");
        Ok(response)
    }

    /// List published documents (reports, statutes, receipts).
    ///
    /// # Errors
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_documents(&self) -> Result<ListResponse<DocumentMeta>, ApiFailure> {
        self.client.get("/documents").await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use fundline_domain::types::ContributionStatus;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::ApiConfig;

    fn commands_for(server: &MockServer) -> ApiCommands {
        let client = ApiClient::builder()
            .config(ApiConfig::new(server.uri()))
            .build()
            .expect("client");
        ApiCommands::new(Arc::new(client))
    }

    fn contribution_json(id: Uuid) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "amount_cents": 2_500,
            "currency": "EUR",
            "donor_name": "Ada",
            "message": null,
            "status": "pending",
            "created_at": Utc::now(),
        })
    }

    #[tokio::test]
    async fn test_create_contribution() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/api/contributions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(contribution_json(id)))
            .mount(&server)
            .await;

        let commands = commands_for(&server);
        let new = NewContribution {
            amount_cents: 2_500,
            currency: "EUR".to_string(),
            donor_name: Some("Ada".to_string()),
            message: None,
        };

        let created = commands.create_contribution(&new).await.expect("created");
        assert_eq!(created.id, id);
        assert_eq!(created.status, ContributionStatus::Pending);
    }

    #[tokio::test]
    async fn test_get_contribution_builds_id_path() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path(format!("/api/contributions/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(contribution_json(id)))
            .mount(&server)
            .await;

        let commands = commands_for(&server);
        let found = commands.get_contribution(id).await.expect("found");
        assert_eq!(found.id, id);
    }

    #[tokio::test]
    async fn test_cancel_subscription_consumes_204() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();

        Mock::given(method("DELETE"))
            .and(path(format!("/api/subscriptions/{id}")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let commands = commands_for(&server);
        assert!(commands.cancel_subscription(id).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_milestones() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/milestones"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{
                    "id": Uuid::new_v4(),
                    "title": "Server costs covered",
                    "description": "One year of hosting",
                    "target_cents": 120_000,
                    "raised_cents": 120_000,
                    "reached": true,
                    "reached_at": Utc::now(),
                }],
                "total": 1,
                "page": 1,
            })))
            .mount(&server)
            .await;

        let commands = commands_for(&server);
        let milestones = commands.list_milestones().await.expect("listed");
        assert_eq!(milestones.total, 1);
        assert!(milestones.items[0].reached);
    }

    #[tokio::test]
    async fn test_list_updates_passes_limit() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/updates"))
            .and(wiremock::matchers::query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [],
                "total": 0,
                "page": 1,
            })))
            .mount(&server)
            .await;

        let commands = commands_for(&server);
        let updates = commands.list_updates(5).await.expect("listed");
        assert!(updates.items.is_empty());
    }

    #[tokio::test]
    async fn test_command_propagates_http_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/documents"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "message": "admin only"
            })))
            .mount(&server)
            .await;

        let commands = commands_for(&server);
        let result = commands.list_documents().await;

        let Err(ApiFailure::Http { status, message, .. }) = result else {
            panic!("expected http failure");
        };
        assert_eq!(status, 403);
        assert_eq!(message, "admin only");
    }
}
