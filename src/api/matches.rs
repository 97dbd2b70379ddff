use crate::{
    database::MongoDB,
    models::MatchSummary,
    services::{match_service, user_service},
};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SubmitMatchRequest {
    pub sender_id: String,
    pub receiver_id: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ResolveMatchRequest {
    pub receiver_id: String,
    pub sender_id: String,
    pub action: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MatchListResponse {
    pub success: bool,
    pub matches: Vec<MatchSummary>,
    pub count: usize,
}

#[utoipa::path(
    post,
    path = "/api/v1/matches/request",
    tag = "Matches",
    request_body = SubmitMatchRequest,
    responses(
        (status = 200, description = "Match request sent"),
        (status = 400, description = "Self-targeted request"),
        (status = 404, description = "Sender or receiver not found"),
        (status = 409, description = "Request already exists")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn submit_request(
    db: web::Data<MongoDB>,
    request: web::Json<SubmitMatchRequest>,
) -> HttpResponse {
    log::info!(
        "💌 POST /matches/request - {} -> {}",
        request.sender_id,
        request.receiver_id
    );

    match match_service::submit_request(&db, &request.sender_id, &request.receiver_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Match request sent successfully."
        })),
        Err(e) => {
            log::warn!("❌ Match request failed: {}", e);
            super::error_response(&e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/matches/resolve",
    tag = "Matches",
    request_body = ResolveMatchRequest,
    responses(
        (status = 200, description = "Request resolved, returns new status"),
        (status = 400, description = "Invalid action"),
        (status = 404, description = "User or request not found"),
        (status = 502, description = "Receiver updated but sender write failed (retry safe)")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn resolve_request(
    db: web::Data<MongoDB>,
    request: web::Json<ResolveMatchRequest>,
) -> HttpResponse {
    log::info!(
        "🤝 POST /matches/resolve - {} resolves {} ({})",
        request.receiver_id,
        request.sender_id,
        request.action
    );

    // Action é validada antes de qualquer leitura do banco
    let action = match match_service::MatchAction::parse(&request.action) {
        Ok(action) => action,
        Err(e) => {
            log::warn!("❌ {}", e);
            return super::error_response(&e);
        }
    };

    match match_service::resolve_request(&db, &request.receiver_id, &request.sender_id, action)
        .await
    {
        Ok(status) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "status": status.as_str(),
            "message": format!("Match request {} successfully.", status.as_str()),
        })),
        Err(e) => {
            log::warn!("❌ Match resolve failed: {}", e);
            super::error_response(&e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/matches/{user_id}",
    tag = "Matches",
    params(
        ("user_id" = String, Path, description = "Public user id")
    ),
    responses(
        (status = 200, description = "Matched users retrieved", body = MatchListResponse),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_matches(db: web::Data<MongoDB>, path: web::Path<String>) -> HttpResponse {
    let user_id = path.into_inner();
    log::info!("💞 GET /matches/{}", user_id);

    match user_service::get_matched_users(&db, &user_id).await {
        Ok(matches) => {
            let count = matches.len();
            HttpResponse::Ok().json(MatchListResponse {
                success: true,
                matches,
                count,
            })
        }
        Err(e) => {
            log::warn!("❌ Failed to list matches for {}: {}", user_id, e);
            super::error_response(&e)
        }
    }
}
