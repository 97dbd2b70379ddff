use crate::{
    database::MongoDB,
    models::user::{default_about, default_profile_pic},
    models::{PublicProfile, User},
    utils::otp::generate_otp,
};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,           // user_id
    pub email: String,
    pub iat: usize,            // issued at
    pub exp: usize,            // expiration
    pub jti: String,           // JWT ID
    pub aud: String,           // audience
    pub iss: String,           // issuer
}

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SendOtpRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreatePasswordRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateProfileRequest {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub birth_date: String,
    // Upload da imagem acontece fora deste serviço; aqui entra só a URL
    pub profile_pic: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    pub email: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub birth_date: Option<String>,
    pub about: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub gallery: Option<Vec<String>>,
    pub interests: Option<Vec<String>>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user_id: String,
    pub email: String,
}

fn get_jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "default-secret-change-me".to_string())
}

fn get_jwt_issuer() -> String {
    std::env::var("JWT_ISSUER").unwrap_or_else(|_| "matchmaking-service".to_string())
}

fn get_jwt_audience() -> String {
    std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "matchmaking-api".to_string())
}

// Generate JWT token
pub fn generate_jwt(user: &User) -> Result<String, String> {
    let iat = Utc::now().timestamp() as usize;
    let exp = (Utc::now() + Duration::hours(24)).timestamp() as usize;
    let jti = Uuid::new_v4().to_string();

    let claims = Claims {
        sub: user.user_id.clone(),
        email: user.email.clone(),
        iat,
        exp,
        jti,
        aud: get_jwt_audience(),
        iss: get_jwt_issuer(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(get_jwt_secret().as_ref()),
    )
    .map_err(|e| format!("Failed to generate token: {}", e))
}

// Verify JWT token
pub fn verify_token(token: &str) -> Result<Claims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[get_jwt_audience()]);

    let mut issuers = HashSet::new();
    issuers.insert(get_jwt_issuer());
    validation.iss = Some(issuers);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(get_jwt_secret().as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| format!("Invalid token: {}", e))
}

/// Entrega do OTP é responsabilidade de um relay externo; aqui só o POST.
/// Sem MAIL_RELAY_URL configurado (dev), o código fica apenas no log.
async fn deliver_otp(email: &str, otp: &str) -> Result<(), String> {
    let relay_url = match std::env::var("MAIL_RELAY_URL") {
        Ok(url) => url,
        Err(_) => {
            log::warn!("📧 MAIL_RELAY_URL not set, OTP for {} not delivered", email);
            return Ok(());
        }
    };

    let client = reqwest::Client::new();
    let response = client
        .post(&relay_url)
        .json(&serde_json::json!({
            "to": email,
            "subject": "Your verification code",
            "otp": otp,
        }))
        .send()
        .await
        .map_err(|e| format!("Failed to reach mail relay: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("Mail relay returned status {}", response.status()));
    }

    Ok(())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// Signup step 1: create pre-verification user and send OTP
pub async fn request_otp(db: &MongoDB, request: &SendOtpRequest) -> Result<String, String> {
    let email = normalize_email(&request.email);
    if email.is_empty() || !email.contains('@') {
        return Err("Please provide a valid email".to_string());
    }

    let collection = db.collection::<User>("users");

    let existing = collection
        .find_one(doc! { "email": &email })
        .await
        .map_err(|e| format!("Database error: {}", e))?;
    if existing.is_some() {
        return Err("User already exists. Provide new details".to_string());
    }

    let otp = generate_otp();
    let otp_expires = Utc::now() + Duration::minutes(10);

    let new_user = User {
        _id: None,
        user_id: ObjectId::new().to_hex(),
        email: email.clone(),
        password: None,
        firstname: None,
        lastname: None,
        birth_date: None,
        address: None,
        profile_pic: default_profile_pic(),
        about: default_about(),
        gallery: vec![],
        gender: None,
        interests: vec![],
        otp: Some(otp.clone()),
        otp_expires: Some(BsonDateTime::from_millis(otp_expires.timestamp_millis())),
        is_verified: false,
        matched_users: vec![],
        match_requests: vec![],
        created_at: Some(BsonDateTime::now()),
        updated_at: Some(BsonDateTime::now()),
    };

    deliver_otp(&email, &otp).await?;

    collection
        .insert_one(&new_user)
        .await
        .map_err(|e| format!("Failed to create user: {}", e))?;

    log::info!("✅ OTP sent to {}", email);
    Ok(email)
}

// Signup step 2: verify the OTP and mark the account verified
pub async fn verify_otp(db: &MongoDB, request: &VerifyOtpRequest) -> Result<(), String> {
    let email = normalize_email(&request.email);
    let collection = db.collection::<User>("users");

    let user = collection
        .find_one(doc! { "email": &email })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| "User does not exist. Provide valid details.".to_string())?;

    let stored_otp = user
        .otp
        .as_deref()
        .ok_or_else(|| "Invalid OTP. Please try again.".to_string())?;

    if stored_otp != request.otp {
        return Err("Invalid OTP. Please try again.".to_string());
    }

    let expired = match user.otp_expires {
        Some(expires) => expires.timestamp_millis() < Utc::now().timestamp_millis(),
        None => true,
    };
    if expired {
        return Err("OTP has expired. Please request a new one.".to_string());
    }

    collection
        .update_one(
            doc! { "email": &email },
            doc! {
                "$set": { "is_verified": true, "updated_at": BsonDateTime::now() },
                "$unset": { "otp": "", "otp_expires": "" },
            },
        )
        .await
        .map_err(|e| format!("Failed to update user: {}", e))?;

    log::info!("✅ User verified: {}", email);
    Ok(())
}

// Re-issue an OTP for an existing unverified account
pub async fn resend_otp(db: &MongoDB, request: &SendOtpRequest) -> Result<(), String> {
    let email = normalize_email(&request.email);
    let collection = db.collection::<User>("users");

    let user = collection
        .find_one(doc! { "email": &email })
        .await
        .map_err(|e| format!("Database error: {}", e))?;
    if user.is_none() {
        return Err("User does not exist. Provide valid details.".to_string());
    }

    let otp = generate_otp();
    let otp_expires = Utc::now() + Duration::minutes(5);

    collection
        .update_one(
            doc! { "email": &email },
            doc! {
                "$set": {
                    "otp": &otp,
                    "otp_expires": BsonDateTime::from_millis(otp_expires.timestamp_millis()),
                    "updated_at": BsonDateTime::now(),
                },
            },
        )
        .await
        .map_err(|e| format!("Failed to update user: {}", e))?;

    deliver_otp(&email, &otp).await?;

    log::info!("✅ OTP resent to {}", email);
    Ok(())
}

pub async fn create_password(db: &MongoDB, request: &CreatePasswordRequest) -> Result<(), String> {
    if request.password.is_empty() {
        return Err("Please fill in all fields".to_string());
    }

    let email = normalize_email(&request.email);
    let collection = db.collection::<User>("users");

    let user = collection
        .find_one(doc! { "email": &email })
        .await
        .map_err(|e| format!("Database error: {}", e))?;
    if user.is_none() {
        return Err("User doesn't exist, please create user".to_string());
    }

    let hashed_password = hash(&request.password, DEFAULT_COST)
        .map_err(|e| format!("Failed to hash password: {}", e))?;

    collection
        .update_one(
            doc! { "email": &email },
            doc! { "$set": { "password": hashed_password, "updated_at": BsonDateTime::now() } },
        )
        .await
        .map_err(|e| format!("Failed to update user: {}", e))?;

    log::info!("✅ Password created for {}", email);
    Ok(())
}

// User login
pub async fn login(db: &MongoDB, request: &LoginRequest) -> Result<AuthResponse, String> {
    let email = normalize_email(&request.email);
    let collection = db.collection::<User>("users");

    let user = collection
        .find_one(doc! { "email": &email })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| "User not found, please signup".to_string())?;

    if !user.is_verified {
        return Err("Please verify your email".to_string());
    }

    let stored_password = user
        .password
        .as_ref()
        .ok_or_else(|| "Password not set. Please create a password first.".to_string())?;

    let valid = verify(&request.password, stored_password)
        .map_err(|e| format!("Password verification error: {}", e))?;

    if !valid {
        return Err("Invalid email or password".to_string());
    }

    let token = generate_jwt(&user)?;

    Ok(AuthResponse {
        success: true,
        token,
        user_id: user.user_id,
        email: user.email,
    })
}

// Fill the initial profile after verification
pub async fn create_profile(
    db: &MongoDB,
    request: &CreateProfileRequest,
) -> Result<PublicProfile, String> {
    if request.firstname.is_empty() || request.lastname.is_empty() || request.birth_date.is_empty()
    {
        return Err("Please fill in all required fields".to_string());
    }

    let email = normalize_email(&request.email);
    let collection = db.collection::<User>("users");

    let user = collection
        .find_one(doc! { "email": &email })
        .await
        .map_err(|e| format!("Database error: {}", e))?;
    if user.is_none() {
        return Err("User not found. Please sign up.".to_string());
    }

    let mut update = doc! {
        "firstname": &request.firstname,
        "lastname": &request.lastname,
        "birth_date": &request.birth_date,
        "updated_at": BsonDateTime::now(),
    };
    if let Some(profile_pic) = &request.profile_pic {
        update.insert("profile_pic", profile_pic);
    }

    collection
        .update_one(doc! { "email": &email }, doc! { "$set": update })
        .await
        .map_err(|e| format!("Failed to update user: {}", e))?;

    let updated = collection
        .find_one(doc! { "email": &email })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| "User not found. Please sign up.".to_string())?;

    log::info!("✅ Profile created for {}", email);
    Ok(PublicProfile::from(&updated))
}

// Partial profile update - only provided fields change
pub async fn update_profile(
    db: &MongoDB,
    request: &UpdateProfileRequest,
) -> Result<PublicProfile, String> {
    let email = normalize_email(&request.email);
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    let collection = db.collection::<User>("users");

    let user = collection
        .find_one(doc! { "email": &email })
        .await
        .map_err(|e| format!("Database error: {}", e))?;
    if user.is_none() {
        return Err("User not found".to_string());
    }

    let mut update = doc! { "updated_at": BsonDateTime::now() };
    if let Some(firstname) = &request.firstname {
        update.insert("firstname", firstname);
    }
    if let Some(lastname) = &request.lastname {
        update.insert("lastname", lastname);
    }
    if let Some(birth_date) = &request.birth_date {
        update.insert("birth_date", birth_date);
    }
    if let Some(about) = &request.about {
        update.insert("about", about);
    }
    if let Some(address) = &request.address {
        update.insert("address", address);
    }
    if let Some(gender) = &request.gender {
        update.insert("gender", gender);
    }
    if let Some(gallery) = &request.gallery {
        update.insert("gallery", gallery.clone());
    }
    if let Some(interests) = &request.interests {
        update.insert("interests", interests.clone());
    }

    collection
        .update_one(doc! { "email": &email }, doc! { "$set": update })
        .await
        .map_err(|e| format!("Failed to update user: {}", e))?;

    let updated = collection
        .find_one(doc! { "email": &email })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| "User not found".to_string())?;

    log::info!("✅ Profile updated for {}", email);
    Ok(PublicProfile::from(&updated))
}

// Get current user (JWT caller)
pub async fn get_current_user(db: &MongoDB, user_id: &str) -> Result<PublicProfile, String> {
    let collection = db.collection::<User>("users");

    let user = collection
        .find_one(doc! { "user_id": user_id })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| "User not found".to_string())?;

    Ok(PublicProfile::from(&user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_lowercase_normalized() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }

    #[test]
    fn jwt_roundtrip_preserves_claims() {
        let user = User {
            _id: None,
            user_id: "u1".to_string(),
            email: "u1@example.com".to_string(),
            password: None,
            firstname: None,
            lastname: None,
            birth_date: None,
            address: None,
            profile_pic: String::new(),
            about: String::new(),
            gallery: vec![],
            gender: None,
            interests: vec![],
            otp: None,
            otp_expires: None,
            is_verified: true,
            matched_users: vec![],
            match_requests: vec![],
            created_at: None,
            updated_at: None,
        };

        let token = generate_jwt(&user).unwrap();
        let claims = verify_token(&token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "u1@example.com");
    }

    #[test]
    fn tampered_token_is_rejected() {
        assert!(verify_token("not.a.token").is_err());
    }
}
