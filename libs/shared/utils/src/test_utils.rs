use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub twilio_video_base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            supabase_service_role_key: "test-service-role-key".to_string(),
            twilio_video_base_url: "http://localhost:54322".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_service_role_key: self.supabase_service_role_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            twilio_account_sid: "ACtestaccountsid00000000000000000000".to_string(),
            twilio_api_key_sid: "SKtestapikeysid000000000000000000000".to_string(),
            twilio_api_key_secret: "test-api-key-secret".to_string(),
            twilio_auth_token: "test-auth-token".to_string(),
            twilio_video_base_url: self.twilio_video_base_url.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "client".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn client(email: &str) -> Self {
        Self::new(email, "client")
    }

    pub fn artist(email: &str) -> Self {
        Self::new(email, "artist")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn consultation_response(appointment_id: &str, waiting_room_status: &str) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "appointment_id": appointment_id,
            "waiting_room_status": waiting_room_status,
            "session_started_at": null,
            "session_ended_at": null,
            "twilio_room_status": null,
            "twilio_room_sid": null,
            "recording_sid": null,
            "ended_at": null,
            "created_at": "2025-06-01T00:00:00Z",
            "updated_at": "2025-06-01T00:00:00Z"
        })
    }

    pub fn active_consultation_response(appointment_id: &str) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "appointment_id": appointment_id,
            "waiting_room_status": "client-waiting",
            "session_started_at": "2025-06-01T10:00:00Z",
            "session_ended_at": null,
            "twilio_room_status": "in-progress",
            "twilio_room_sid": "RM00000000000000000000000000000000",
            "recording_sid": null,
            "ended_at": null,
            "created_at": "2025-06-01T00:00:00Z",
            "updated_at": "2025-06-01T10:00:00Z"
        })
    }

    pub fn ended_consultation_response(appointment_id: &str) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "appointment_id": appointment_id,
            "waiting_room_status": "empty",
            "session_started_at": "2025-06-01T10:00:00Z",
            "session_ended_at": "2025-06-01T10:30:00Z",
            "twilio_room_status": "completed",
            "twilio_room_sid": "RM00000000000000000000000000000000",
            "recording_sid": null,
            "ended_at": "2025-06-01T10:30:00Z",
            "created_at": "2025-06-01T00:00:00Z",
            "updated_at": "2025-06-01T10:30:00Z"
        })
    }

    pub fn appointment_response(
        appointment_id: &str,
        client_email: &str,
        artist_email: &str,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": appointment_id,
            "client_email": client_email,
            "artist_email": artist_email,
            "status": status,
            "appointment_date": "2025-06-01T10:00:00Z",
            "created_at": "2025-05-20T00:00:00Z",
            "updated_at": "2025-05-20T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "error": {
                "message": message,
                "code": code
            }
        })
    }
}
