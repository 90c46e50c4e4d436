//! Invitation lifecycle routes.
//!
//! Provides the endpoint pair for issuing an invitation and for accepting
//! one (public endpoint reached from the emailed link).

use axum::{extract::State, Json};
use domain::models::{AcceptInvitationRequest, IssueInvitationRequest, MessageResponse};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_invitation_accepted, record_invitation_issued};

/// POST /api/auth/invitation
///
/// Issue an invitation: creates the placeholder user and sends the
/// acceptance link by email.
pub async fn issue_invitation(
    State(state): State<AppState>,
    Json(request): Json<IssueInvitationRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.invitation_service().issue(request).await?;
    record_invitation_issued();
    Ok(Json(MessageResponse::new("Invitation sent successfully.")))
}

/// PUT /api/auth/invitation
///
/// Accept an invitation: verifies the emailed token, sets the password and
/// activates the account.
pub async fn accept_invitation(
    State(state): State<AppState>,
    Json(request): Json<AcceptInvitationRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.invitation_service().accept(request).await?;
    record_invitation_accepted();
    Ok(Json(MessageResponse::new(
        "Invitation accepted successfully.",
    )))
}
