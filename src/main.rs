mod api;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::env;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Get configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let frontend_origin =
        env::var("FRONTEND_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

    log::info!("🚀 Starting Matchmaking Service...");

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&database_url)
        .await
        .expect("Failed to connect to MongoDB");

    let db_data = web::Data::new(db.clone());

    log::info!("✅ MongoDB connected successfully");
    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_origin)
            .allowed_origin("http://localhost:8081")
            .allowed_origin("http://127.0.0.1:3000")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Auth endpoints: OTP signup, password, profile, login
            .service(
                web::scope("/api/v1/auth")
                    .route("/send-otp", web::post().to(api::auth::send_otp))
                    .route("/verify-otp", web::post().to(api::auth::verify_otp))
                    .route("/resend-otp", web::post().to(api::auth::resend_otp))
                    .route("/create-password", web::post().to(api::auth::create_password))
                    .route("/create-profile", web::post().to(api::auth::create_profile))
                    .route("/update-profile", web::put().to(api::auth::update_profile))
                    .route("/login", web::post().to(api::auth::login))
                    .route("/me", web::get().to(api::auth::get_me)),
            )
            // Users: public directory (read only)
            .service(
                web::scope("/api/v1/users")
                    .route("", web::get().to(api::users::get_all_users))
                    .route("/gender", web::get().to(api::users::get_users_by_gender))
                    // catch-all, precisa ficar por último
                    .route("/{id}", web::get().to(api::users::get_single_user)),
            )
            // Matches: request workflow - requires JWT
            .service(
                web::scope("/api/v1/matches")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("/request", web::post().to(api::matches::submit_request))
                    .route("/resolve", web::post().to(api::matches::resolve_request))
                    .route("/{user_id}", web::get().to(api::matches::get_matches)),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
