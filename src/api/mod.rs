pub mod auth;
pub mod health;
pub mod matches;
pub mod swagger;
pub mod users;

use crate::utils::error::AppError;
use actix_web::HttpResponse;

/// Mapeia AppError para o status HTTP e o corpo de erro padrão
pub fn error_response(err: &AppError) -> HttpResponse {
    let body = serde_json::json!({
        "success": false,
        "kind": err.kind(),
        "error": err.to_string(),
    });

    match err {
        AppError::NotFound(_) => HttpResponse::NotFound().json(body),
        AppError::Conflict(_) => HttpResponse::Conflict().json(body),
        AppError::InvalidArgument(_) => HttpResponse::BadRequest().json(body),
        // Distinto de erro total: o caller pode repetir o resolve com segurança
        AppError::PartialFailure(_) => HttpResponse::BadGateway().json(body),
        AppError::DatabaseError(_) => HttpResponse::InternalServerError().json(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_per_error_kind() {
        assert_eq!(error_response(&AppError::NotFound("x".into())).status(), 404);
        assert_eq!(error_response(&AppError::Conflict("x".into())).status(), 409);
        assert_eq!(error_response(&AppError::InvalidArgument("x".into())).status(), 400);
        assert_eq!(error_response(&AppError::PartialFailure("x".into())).status(), 502);
        assert_eq!(error_response(&AppError::DatabaseError("x".into())).status(), 500);
    }
}
