use crate::{database::MongoDB, models::PublicProfile, services::user_service};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct GenderQuery {
    pub gender: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<PublicProfile>,
    pub count: usize,
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users retrieved", body = UserListResponse)
    )
)]
pub async fn get_all_users(db: web::Data<MongoDB>) -> HttpResponse {
    log::info!("📋 GET /users");

    match user_service::get_all_users(&db).await {
        Ok(users) => {
            let count = users.len();
            HttpResponse::Ok().json(UserListResponse {
                success: true,
                users,
                count,
            })
        }
        Err(e) => {
            log::error!("❌ Failed to list users: {}", e);
            super::error_response(&e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "Public user id")
    ),
    responses(
        (status = 200, description = "User retrieved", body = PublicProfile),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_single_user(db: web::Data<MongoDB>, path: web::Path<String>) -> HttpResponse {
    let user_id = path.into_inner();
    log::info!("🔎 GET /users/{}", user_id);

    match user_service::get_user(&db, &user_id).await {
        Ok(user) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": user,
        })),
        Err(e) => {
            log::warn!("❌ Failed to fetch user {}: {}", user_id, e);
            super::error_response(&e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users/gender",
    tag = "Users",
    params(
        ("gender" = String, Query, description = "Gender to filter by")
    ),
    responses(
        (status = 200, description = "Users retrieved", body = UserListResponse),
        (status = 400, description = "Missing gender parameter")
    )
)]
pub async fn get_users_by_gender(
    db: web::Data<MongoDB>,
    query: web::Query<GenderQuery>,
) -> HttpResponse {
    let gender = query.gender.as_deref().unwrap_or("");
    log::info!("📋 GET /users/gender?gender={}", gender);

    match user_service::get_users_by_gender(&db, gender).await {
        Ok(users) => {
            let count = users.len();
            HttpResponse::Ok().json(UserListResponse {
                success: true,
                users,
                count,
            })
        }
        Err(e) => {
            log::warn!("❌ Failed to filter users by gender: {}", e);
            super::error_response(&e)
        }
    }
}
