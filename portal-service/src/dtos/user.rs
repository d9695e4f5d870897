use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::ApprovalStatus;

/// The approval endpoint only accepts a decision, never `pendente`, so the
/// request carries its own two-variant enum instead of [`ApprovalStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub enum ApprovalDecision {
    #[serde(rename = "aprovado")]
    Approved,
    #[serde(rename = "rejeitado")]
    Rejected,
}

impl From<ApprovalDecision> for ApprovalStatus {
    fn from(decision: ApprovalDecision) -> Self {
        match decision {
            ApprovalDecision::Approved => ApprovalStatus::Approved,
            ApprovalDecision::Rejected => ApprovalStatus::Rejected,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ApprovalRequest {
    pub status: ApprovalDecision,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CompanyAssignmentRequest {
    #[serde(rename = "empresa_id")]
    pub company_id: Option<Uuid>,
}
