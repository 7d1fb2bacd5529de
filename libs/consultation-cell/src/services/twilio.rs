// libs/consultation-cell/src/services/twilio.rs
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use tracing::{debug, error, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

use crate::models::{
    AccessTokenClaims, AccessTokenResponse, ConsultationError, TokenGrants, VideoGrant,
};
use crate::services::store::ConsultationStore;

/// Lifetime of a minted room access token.
const TOKEN_TTL_SECONDS: i64 = 3600;

/// Twilio Video client for room access tokens and room control.
/// Based on: https://www.twilio.com/docs/video
pub struct TwilioVideoService {
    client: Client,
    store: ConsultationStore,
    account_sid: String,
    api_key_sid: String,
    api_key_secret: String,
    auth_token: String,
    base_url: String,
}

impl TwilioVideoService {
    pub fn new(config: &AppConfig) -> Result<Self, ConsultationError> {
        if !config.is_twilio_configured() {
            return Err(ConsultationError::NotConfigured);
        }

        Ok(Self {
            client: Client::new(),
            store: ConsultationStore::new(config),
            account_sid: config.twilio_account_sid.clone(),
            api_key_sid: config.twilio_api_key_sid.clone(),
            api_key_secret: config.twilio_api_key_secret.clone(),
            auth_token: config.twilio_auth_token.clone(),
            base_url: config.twilio_video_base_url.clone(),
        })
    }

    /// Mints a room-scoped access token for one of the appointment's parties.
    ///
    /// The token identity is namespaced by party (`client-…` / `artist-…`),
    /// which is how the webhook reconciler attributes `participant-connected`
    /// callbacks to a side of the consultation.
    pub async fn create_room_token(
        &self,
        appointment_id: Uuid,
        user: &User,
        auth_token: &str,
    ) -> Result<AccessTokenResponse, ConsultationError> {
        let (_, role) = self
            .store
            .resolve_party(appointment_id, user, auth_token)
            .await?;

        let consultation = self
            .store
            .find_by_appointment(appointment_id, auth_token)
            .await?;

        let email = user.email.as_deref().unwrap_or_default();
        let identity = role.identity_for(email);
        let room_name = consultation.room_name();

        let now = Utc::now();
        let expires_at = now + Duration::seconds(TOKEN_TTL_SECONDS);

        let claims = AccessTokenClaims {
            jti: format!("{}-{}", self.api_key_sid, now.timestamp()),
            iss: self.api_key_sid.clone(),
            sub: self.account_sid.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            grants: TokenGrants {
                identity: identity.clone(),
                video: VideoGrant {
                    room: room_name.clone(),
                },
            },
        };

        let mut header = Header::new(Algorithm::HS256);
        header.cty = Some("twilio-fpa;v=1".to_string());
        header.kid = Some(self.api_key_sid.clone());

        let token = encode(
            &header,
            &claims,
            &EncodingKey::from_secret(self.api_key_secret.as_bytes()),
        )
        .map_err(|e| ConsultationError::Internal {
            message: format!("Failed to sign access token: {}", e),
        })?;

        info!("Minted room token for {} in {}", identity, room_name);

        Ok(AccessTokenResponse {
            token,
            identity,
            room_name,
            expires_at,
        })
    }

    /// Marks a room completed, disconnecting any remaining participants.
    /// POST /v1/Rooms/{RoomSid} with Status=completed
    pub async fn complete_room(&self, room_sid: &str) -> Result<(), ConsultationError> {
        info!("Completing Twilio room: {}", room_sid);

        let url = format!("{}/v1/Rooms/{}", self.base_url, room_sid);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("Status", "completed")])
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        debug!("Twilio room completion response: {} - {}", status, response_text);

        if !status.is_success() {
            error!("Twilio room completion failed: {} - {}", status, response_text);
            return Err(ConsultationError::TwilioApiError {
                message: format!("HTTP {}: {}", status, response_text),
            });
        }

        info!("Successfully completed Twilio room: {}", room_sid);
        Ok(())
    }

    /// Lightweight connectivity probe against the Rooms API.
    pub async fn health_check(&self) -> Result<bool, ConsultationError> {
        let url = format!("{}/v1/Rooms?PageSize=1", self.base_url);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await?;

        Ok(response.status().is_success())
    }
}
