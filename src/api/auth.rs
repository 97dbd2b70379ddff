use crate::{database::MongoDB, services::auth_service};
use crate::services::auth_service::{
    AuthResponse, CreatePasswordRequest, CreateProfileRequest, LoginRequest, SendOtpRequest,
    UpdateProfileRequest, VerifyOtpRequest,
};
use actix_web::{web, HttpRequest, HttpResponse};

#[utoipa::path(
    post,
    path = "/api/v1/auth/send-otp",
    tag = "Auth",
    request_body = SendOtpRequest,
    responses(
        (status = 201, description = "OTP sent, pre-verification user created"),
        (status = 401, description = "User already exists")
    )
)]
pub async fn send_otp(
    db: web::Data<MongoDB>,
    request: web::Json<SendOtpRequest>,
) -> HttpResponse {
    log::info!("📧 POST /auth/send-otp - email: {}", request.email);

    match auth_service::request_otp(&db, &request).await {
        Ok(email) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "message": "OTP sent successfully",
            "email": email,
        })),
        Err(e) => {
            log::warn!("❌ send-otp failed: {} - {}", request.email, e);
            HttpResponse::Unauthorized().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-otp",
    tag = "Auth",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "User verified"),
        (status = 400, description = "Invalid or expired OTP")
    )
)]
pub async fn verify_otp(
    db: web::Data<MongoDB>,
    request: web::Json<VerifyOtpRequest>,
) -> HttpResponse {
    log::info!("🔑 POST /auth/verify-otp - email: {}", request.email);

    match auth_service::verify_otp(&db, &request).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "User successfully verified."
        })),
        Err(e) => {
            log::warn!("❌ verify-otp failed: {} - {}", request.email, e);
            HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}

pub async fn resend_otp(
    db: web::Data<MongoDB>,
    request: web::Json<SendOtpRequest>,
) -> HttpResponse {
    log::info!("🔄 POST /auth/resend-otp - email: {}", request.email);

    match auth_service::resend_otp(&db, &request).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "OTP resent successfully."
        })),
        Err(e) => {
            log::warn!("❌ resend-otp failed: {} - {}", request.email, e);
            HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}

pub async fn create_password(
    db: web::Data<MongoDB>,
    request: web::Json<CreatePasswordRequest>,
) -> HttpResponse {
    log::info!("🔐 POST /auth/create-password - email: {}", request.email);

    match auth_service::create_password(&db, &request).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Password created"
        })),
        Err(e) => {
            log::warn!("❌ create-password failed: {} - {}", request.email, e);
            HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}

pub async fn create_profile(
    db: web::Data<MongoDB>,
    request: web::Json<CreateProfileRequest>,
) -> HttpResponse {
    log::info!("📝 POST /auth/create-profile - email: {}", request.email);

    match auth_service::create_profile(&db, &request).await {
        Ok(profile) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "User profile created successfully",
            "profile": profile,
        })),
        Err(e) => {
            log::warn!("❌ create-profile failed: {} - {}", request.email, e);
            HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}

pub async fn update_profile(
    db: web::Data<MongoDB>,
    request: web::Json<UpdateProfileRequest>,
) -> HttpResponse {
    log::info!("📝 PUT /auth/update-profile - email: {}", request.email);

    match auth_service::update_profile(&db, &request).await {
        Ok(profile) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Profile updated successfully",
            "profile": profile,
        })),
        Err(e) => {
            log::warn!("❌ update-profile failed: {} - {}", request.email, e);
            HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials or unverified account")
    )
)]
pub async fn login(db: web::Data<MongoDB>, request: web::Json<LoginRequest>) -> HttpResponse {
    log::info!("🔐 POST /auth/login - email: {}", request.email);

    match auth_service::login(&db, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", request.email);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", request.email, e);
            HttpResponse::Unauthorized().json(serde_json::json!({
                "success": false,
                "error": e
            }))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user retrieved"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(db: web::Data<MongoDB>, req: HttpRequest) -> HttpResponse {
    log::info!("👤 GET /auth/me");

    let auth_header = req.headers().get("Authorization");

    if let Some(auth_value) = auth_header {
        if let Ok(auth_str) = auth_value.to_str() {
            if auth_str.starts_with("Bearer ") {
                let token = &auth_str[7..];

                match auth_service::verify_token(token) {
                    Ok(claims) => {
                        match auth_service::get_current_user(&db, &claims.sub).await {
                            Ok(user) => {
                                return HttpResponse::Ok().json(serde_json::json!({
                                    "success": true,
                                    "user": user
                                }));
                            }
                            Err(e) => {
                                log::error!("❌ Failed to get user: {}", e);
                                return HttpResponse::InternalServerError().json(
                                    serde_json::json!({
                                        "success": false,
                                        "error": e
                                    }),
                                );
                            }
                        }
                    }
                    Err(e) => {
                        log::warn!("❌ Invalid token: {}", e);
                        return HttpResponse::Unauthorized().json(serde_json::json!({
                            "success": false,
                            "error": e
                        }));
                    }
                }
            }
        }
    }

    HttpResponse::BadRequest().json(serde_json::json!({
        "success": false,
        "error": "No valid Authorization header"
    }))
}
