use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Status de uma solicitação de match
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl MatchRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchRequestStatus::Pending => "pending",
            MatchRequestStatus::Accepted => "accepted",
            MatchRequestStatus::Rejected => "rejected",
        }
    }
}

fn default_status() -> MatchRequestStatus {
    MatchRequestStatus::Pending
}

/// Item dentro do array match_requests (embutido no documento do receiver)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MatchRequest {
    #[serde(deserialize_with = "deserialize_user_ref")]
    pub sender_id: String,
    #[serde(default = "default_status")]
    pub status: MatchRequestStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub created_at: Option<Bson>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub resolved_at: Option<Bson>,
}

/// Estrutura real do MongoDB - documento na collection "users"
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub user_id: String,  // PRIMARY IDENTIFIER - matches MongoDB structure
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,  // bcrypt hash; None até create-password
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub address: Option<String>,
    #[serde(default = "default_profile_pic")]
    pub profile_pic: String,
    #[serde(default = "default_about")]
    pub about: String,
    #[serde(default)]
    pub gallery: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub otp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub otp_expires: Option<BsonDateTime>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub matched_users: Vec<String>,
    #[serde(default)]
    pub match_requests: Vec<MatchRequest>,
    pub created_at: Option<BsonDateTime>,
    pub updated_at: Option<BsonDateTime>,
}

pub fn default_profile_pic() -> String {
    "https://media.istockphoto.com/id/2151669184/vector/vector-flat-illustration-in-grayscale-avatar-user-profile-person-icon-gender-neutral.jpg".to_string()
}

pub fn default_about() -> String {
    "Tell us about yourself...".to_string()
}

fn deserialize_user_ref<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let bson_value = Bson::deserialize(deserializer)?;
    match bson_value {
        Bson::ObjectId(oid) => Ok(oid.to_hex()),
        Bson::String(s) => Ok(s),
        _ => Err(serde::de::Error::custom("Expected ObjectId or String")),
    }
}

impl User {
    /// Entry do match_requests enviada por sender_id, se existir
    pub fn request_from(&self, sender_id: &str) -> Option<&MatchRequest> {
        self.match_requests
            .iter()
            .find(|r| r.sender_id == sender_id)
    }

    pub fn has_match(&self, user_id: &str) -> bool {
        self.matched_users.iter().any(|id| id == user_id)
    }
}

/// Projeção pública do usuário - NUNCA inclui password/otp/otp_expires
#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct PublicProfile {
    pub user_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub profile_pic: String,
    pub about: String,
    pub gallery: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    pub interests: Vec<String>,
    pub is_verified: bool,
    pub matched_users: Vec<String>,
    pub match_requests: Vec<MatchRequestInfo>,
}

#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct MatchRequestInfo {
    pub sender_id: String,
    pub status: MatchRequestStatus,
}

/// Projeção resumida usada na lista de matches
#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct MatchSummary {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    pub email: String,
    pub profile_pic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        PublicProfile {
            user_id: user.user_id.clone(),
            email: user.email.clone(),
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            birth_date: user.birth_date.clone(),
            address: user.address.clone(),
            profile_pic: user.profile_pic.clone(),
            about: user.about.clone(),
            gallery: user.gallery.clone(),
            gender: user.gender.clone(),
            interests: user.interests.clone(),
            is_verified: user.is_verified,
            matched_users: user.matched_users.clone(),
            match_requests: user
                .match_requests
                .iter()
                .map(|r| MatchRequestInfo {
                    sender_id: r.sender_id.clone(),
                    status: r.status,
                })
                .collect(),
        }
    }
}

impl From<&User> for MatchSummary {
    fn from(user: &User) -> Self {
        MatchSummary {
            user_id: user.user_id.clone(),
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            email: user.email.clone(),
            profile_pic: user.profile_pic.clone(),
            gender: user.gender.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            _id: None,
            user_id: "u1".to_string(),
            email: "u1@example.com".to_string(),
            password: Some("$2b$10$hash".to_string()),
            firstname: Some("Ana".to_string()),
            lastname: None,
            birth_date: None,
            address: None,
            profile_pic: default_profile_pic(),
            about: default_about(),
            gallery: vec![],
            gender: Some("female".to_string()),
            interests: vec![],
            otp: Some("123456".to_string()),
            otp_expires: Some(BsonDateTime::now()),
            is_verified: true,
            matched_users: vec!["u2".to_string()],
            match_requests: vec![MatchRequest {
                sender_id: "u3".to_string(),
                status: MatchRequestStatus::Pending,
                created_at: None,
                resolved_at: None,
            }],
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&MatchRequestStatus::Accepted).unwrap();
        assert_eq!(json, "\"accepted\"");
        let back: MatchRequestStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(back, MatchRequestStatus::Rejected);
    }

    #[test]
    fn request_status_defaults_to_pending() {
        let entry: MatchRequest =
            serde_json::from_str(r#"{ "sender_id": "u9" }"#).unwrap();
        assert_eq!(entry.status, MatchRequestStatus::Pending);
        assert_eq!(entry.sender_id, "u9");
    }

    #[test]
    fn public_profile_never_leaks_credentials() {
        let user = sample_user();
        let profile = PublicProfile::from(&user);
        let json = serde_json::to_value(&profile).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("password"));
        assert!(!obj.contains_key("otp"));
        assert!(!obj.contains_key("otp_expires"));
        assert_eq!(obj["user_id"], "u1");
    }

    #[test]
    fn match_summary_only_exposes_summary_fields() {
        let user = sample_user();
        let summary = MatchSummary::from(&user);
        let json = serde_json::to_value(&summary).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("password"));
        assert!(!obj.contains_key("otp"));
        assert!(!obj.contains_key("match_requests"));
        assert_eq!(obj["email"], "u1@example.com");
    }

    #[test]
    fn request_lookup_finds_entry_by_sender() {
        let user = sample_user();
        assert!(user.request_from("u3").is_some());
        assert!(user.request_from("u4").is_none());
        assert!(user.has_match("u2"));
        assert!(!user.has_match("u3"));
    }
}
