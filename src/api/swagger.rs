use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Matchmaking Service API",
        version = "1.0.0",
        description = "API documentation for the matchmaking backend. \n\n**Authentication:** Match endpoints require JWT Bearer token authentication.\n\n**Features:**\n- OTP-verified signup and JWT login\n- Profile management\n- Match request workflow (send / accept / reject)\n- Mutual match listing",
        contact(
            name = "Matchmaking Service Team",
            email = "support@matchmaking-service.com"
        )
    ),
    paths(
        // Auth endpoints
        crate::api::auth::send_otp,
        crate::api::auth::verify_otp,
        crate::api::auth::login,
        crate::api::auth::get_me,

        // Health
        crate::api::health::health_check,

        // Users
        crate::api::users::get_all_users,
        crate::api::users::get_single_user,
        crate::api::users::get_users_by_gender,

        // Matches
        crate::api::matches::submit_request,
        crate::api::matches::resolve_request,
        crate::api::matches::get_matches,
    ),
    components(
        schemas(
            // Auth
            crate::services::auth_service::SendOtpRequest,
            crate::services::auth_service::VerifyOtpRequest,
            crate::services::auth_service::CreatePasswordRequest,
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::AuthResponse,

            // Health
            crate::api::health::HealthResponse,

            // Users
            crate::models::user::PublicProfile,
            crate::models::user::MatchRequestInfo,
            crate::models::user::MatchSummary,
            crate::models::user::MatchRequestStatus,
            crate::api::users::UserListResponse,

            // Matches
            crate::api::matches::SubmitMatchRequest,
            crate::api::matches::ResolveMatchRequest,
            crate::api::matches::MatchListResponse,
        )
    ),
    tags(
        (name = "Auth", description = "OTP verification, password setup, profile management and JWT login."),
        (name = "Health", description = "Health check endpoint for monitoring service status."),
        (name = "Users", description = "Public user directory. Sensitive fields are never included in responses."),
        (name = "Matches", description = "Match request workflow: send, accept/reject, and list mutual matches."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build(),
                ),
            );
        }
    }
}
