// ==================== DIRECTORY QUERIES ====================
// Leituras sobre a collection "users". Campos sensíveis (password, otp,
// otp_expires) são excluídos na projeção da query, não depois.

use crate::{
    database::MongoDB,
    models::{MatchSummary, PublicProfile, User},
    utils::error::AppError,
};
use futures::stream::StreamExt;
use mongodb::bson::doc;

/// Projeção aplicada a toda leitura pública - contrato duro, não sugestão
fn sensitive_fields_projection() -> mongodb::bson::Document {
    doc! { "password": 0, "otp": 0, "otp_expires": 0 }
}

/// GET /users - lista todos os usuários (projeção pública)
pub async fn get_all_users(db: &MongoDB) -> Result<Vec<PublicProfile>, AppError> {
    log::info!("📋 Listing all users");

    let users = db.collection::<User>("users");
    let mut cursor = users
        .find(doc! {})
        .projection(sensitive_fields_projection())
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    let mut result = Vec::new();
    while let Some(user) = cursor.next().await {
        let user = user.map_err(|e| AppError::DatabaseError(e.to_string()))?;
        result.push(PublicProfile::from(&user));
    }

    Ok(result)
}

/// GET /users/{id} - busca um usuário pelo id público
pub async fn get_user(db: &MongoDB, user_id: &str) -> Result<PublicProfile, AppError> {
    log::info!("🔎 Fetching user {}", user_id);

    let users = db.collection::<User>("users");
    let user = users
        .find_one(doc! { "user_id": user_id })
        .projection(sensitive_fields_projection())
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    Ok(PublicProfile::from(&user))
}

/// GET /users/gender?gender=... - filtra usuários por gênero
pub async fn get_users_by_gender(
    db: &MongoDB,
    gender: &str,
) -> Result<Vec<PublicProfile>, AppError> {
    if gender.trim().is_empty() {
        return Err(AppError::InvalidArgument(
            "Gender is required as a query parameter.".to_string(),
        ));
    }

    log::info!("📋 Listing users by gender: {}", gender);

    let users = db.collection::<User>("users");
    let mut cursor = users
        .find(doc! { "gender": gender })
        .projection(sensitive_fields_projection())
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    let mut result = Vec::new();
    while let Some(user) = cursor.next().await {
        let user = user.map_err(|e| AppError::DatabaseError(e.to_string()))?;
        result.push(PublicProfile::from(&user));
    }

    Ok(result)
}

/// GET /matches/{user_id} - matched_users expandido para perfis resumidos
pub async fn get_matched_users(
    db: &MongoDB,
    user_id: &str,
) -> Result<Vec<MatchSummary>, AppError> {
    log::info!("💞 Listing matches for user {}", user_id);

    let users = db.collection::<User>("users");
    let user = users
        .find_one(doc! { "user_id": user_id })
        .projection(sensitive_fields_projection())
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    if user.matched_users.is_empty() {
        return Ok(vec![]);
    }

    let mut cursor = users
        .find(doc! { "user_id": { "$in": user.matched_users.clone() } })
        .projection(sensitive_fields_projection())
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    let mut matches = Vec::new();
    while let Some(matched) = cursor.next().await {
        let matched = matched.map_err(|e| AppError::DatabaseError(e.to_string()))?;
        matches.push(MatchSummary::from(&matched));
    }

    Ok(matches)
}
