//! Resource DTOs for the Fundline REST API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a one-off contribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionStatus {
    Pending,
    Completed,
    Refunded,
    Failed,
}

/// A one-off contribution to the campaign
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
    pub id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub donor_name: Option<String>,
    pub message: Option<String>,
    pub status: ContributionStatus,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a contribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContribution {
    pub amount_cents: i64,
    pub currency: String,
    pub donor_name: Option<String>,
    pub message: Option<String>,
}

/// Billing cadence for recurring contributions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    Monthly,
    Yearly,
}

/// Lifecycle state of a recurring subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Cancelled,
}

/// A recurring contribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub interval: BillingInterval,
    pub status: SubscriptionStatus,
    pub started_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// Payload for starting a subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubscription {
    pub amount_cents: i64,
    pub currency: String,
    pub interval: BillingInterval,
}

/// A fundraising milestone shown on the public site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub target_cents: i64,
    pub raised_cents: i64,
    pub reached: bool,
    pub reached_at: Option<DateTime<Utc>>,
}

/// A campaign progress update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignUpdate {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub published_at: DateTime<Utc>,
}

/// Metadata for a published document (reports, statutes, receipts)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub mime_type: String,
    pub published_at: DateTime<Utc>,
}

/// Pagination envelope returned by list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contribution_round_trip() {
        let contribution = Contribution {
            id: Uuid::new_v4(),
            amount_cents: 2_500,
            currency: "EUR".to_string(),
            donor_name: Some("Ada".to_string()),
            message: None,
            status: ContributionStatus::Completed,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&contribution).expect("serialize");
        let back: Contribution = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.id, contribution.id);
        assert_eq!(back.status, ContributionStatus::Completed);
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_value(SubscriptionStatus::PastDue).expect("serialize");
        assert_eq!(json, "past_due");
    }
}
