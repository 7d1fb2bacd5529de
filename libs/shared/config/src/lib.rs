use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub supabase_jwt_secret: String,
    pub twilio_account_sid: String,
    pub twilio_api_key_sid: String,
    pub twilio_api_key_secret: String,
    pub twilio_auth_token: String,
    pub twilio_video_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_ROLE_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            twilio_account_sid: env::var("TWILIO_ACCOUNT_SID")
                .unwrap_or_else(|_| {
                    warn!("TWILIO_ACCOUNT_SID not set, using empty value");
                    String::new()
                }),
            twilio_api_key_sid: env::var("TWILIO_API_KEY_SID")
                .unwrap_or_else(|_| {
                    warn!("TWILIO_API_KEY_SID not set, using empty value");
                    String::new()
                }),
            twilio_api_key_secret: env::var("TWILIO_API_KEY_SECRET")
                .unwrap_or_else(|_| {
                    warn!("TWILIO_API_KEY_SECRET not set, using empty value");
                    String::new()
                }),
            twilio_auth_token: env::var("TWILIO_AUTH_TOKEN")
                .unwrap_or_else(|_| {
                    warn!("TWILIO_AUTH_TOKEN not set, using empty value");
                    String::new()
                }),
            twilio_video_base_url: env::var("TWILIO_VIDEO_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("TWILIO_VIDEO_BASE_URL not set, using default");
                    "https://video.twilio.com".to_string()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    pub fn is_twilio_configured(&self) -> bool {
        !self.twilio_account_sid.is_empty()
            && !self.twilio_api_key_sid.is_empty()
            && !self.twilio_api_key_secret.is_empty()
    }
}
