use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Role, TicketStatus};
use crate::services::auth::{self, Claims};
use crate::services::scheduling;
use crate::services::transitions::resolve_transition;
use crate::state::AppState;

use super::tickets::TicketResponse;

/// Resolves the bearer token and checks its role against `allowed`.
pub fn check_auth(headers: &HeaderMap, secret: &str, allowed: &[Role]) -> Result<Claims, AppError> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    let claims = auth::verify_token(secret, token).ok_or(AppError::Unauthorized)?;
    if !allowed.contains(&claims.role) {
        return Err(AppError::Forbidden(format!(
            "role {} may not perform this action",
            claims.role.as_str()
        )));
    }
    Ok(claims)
}

// POST /Adminregister
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    message: &'static str,
    role: Role,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    let role = auth::register(&state.db, &state.config, &req.email, &req.username, &req.password).await?;

    Ok(Json(RegisterResponse {
        message: "registration successful",
        role,
    }))
}

// POST /Adminlogin
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    token: String,
    role: Role,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (token, role) = auth::login(&state.db, &state.config, &req.email, &req.password).await?;

    Ok(Json(LoginResponse { token, role }))
}

// PUT /updateticket/:id
#[derive(Deserialize)]
pub struct UpdateTicketRequest {
    pub status: String,
}

#[derive(Serialize)]
pub struct UpdateTicketResponse {
    message: &'static str,
    ticket: TicketResponse,
}

pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateTicketRequest>,
) -> Result<Json<UpdateTicketResponse>, AppError> {
    let claims = check_auth(
        &headers,
        &state.config.token_secret,
        &[Role::SubAdmin, Role::SuperAdmin],
    )?;

    let ticket = {
        let db = state.db.lock().unwrap();

        let ticket = queries::get_ticket_by_id(&db, &id)?
            .ok_or_else(|| AppError::NotFound(format!("ticket {id}")))?;
        let transition = resolve_transition(claims.role, req.status.trim())?;

        // Approval re-checks the interval under the same lock as the write.
        if transition.status == TicketStatus::Booked {
            scheduling::ensure_slot_free(&db, ticket.date, &ticket.slot(), Some(&ticket.id))?;
        }

        queries::update_ticket_status(&db, &id, transition.status, transition.approved_by)?;
        queries::get_ticket_by_id(&db, &id)?
            .ok_or_else(|| AppError::NotFound(format!("ticket {id}")))?
    };

    tracing::info!(
        ticket_id = %id,
        actor = %claims.sub,
        role = claims.role.as_str(),
        status = ticket.status.as_str(),
        "updated ticket status"
    );

    Ok(Json(UpdateTicketResponse {
        message: "ticket updated successfully",
        ticket: ticket.into(),
    }))
}
