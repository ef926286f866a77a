use crate::error::NotifyError;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use std::time::Duration;

const TWILIO_API: &str = "https://api.twilio.com/2010-04-01";

#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

#[derive(Debug, Deserialize)]
struct TwilioResponse {
    sid: Option<String>,
    message: Option<String>,
}

/// Text-message relay for members who never enabled push.
#[derive(Clone)]
pub struct SmsClient {
    client: reqwest::Client,
    credentials: TwilioCredentials,
}

impl SmsClient {
    pub fn new(credentials: TwilioCredentials, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, credentials })
    }

    fn basic_auth(&self) -> String {
        let raw = format!("{}:{}", self.credentials.account_sid, self.credentials.auth_token);
        format!("Basic {}", general_purpose::STANDARD.encode(raw))
    }

    /// Sends `message` to `to` and returns the provider's message sid.
    pub async fn send(&self, to: &str, message: &str) -> Result<String, NotifyError> {
        let url = format!(
            "{}/Accounts/{}/Messages.json",
            TWILIO_API, self.credentials.account_sid
        );
        let response = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.basic_auth())
            .form(&[
                ("To", to),
                ("From", self.credentials.from_number.as_str()),
                ("Body", message),
            ])
            .send()
            .await
            .map_err(|e| NotifyError::Upstream(e.to_string()))?;

        let status = response.status();
        let body: TwilioResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::Upstream(format!("unreadable response ({}): {}", status, e)))?;

        if !status.is_success() {
            return Err(NotifyError::Upstream(
                body.message.unwrap_or_else(|| status.to_string()),
            ));
        }
        body.sid
            .ok_or_else(|| NotifyError::Upstream("response without sid".to_string()))
    }
}

/// Normalizes a member's phone number to E.164. Bare ten-digit numbers are
/// read as North American.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let international = raw.trim_start().starts_with('+');
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        10 if !international => Some(format!("+1{}", digits)),
        11 if !international && digits.starts_with('1') => Some(format!("+{}", digits)),
        8..=15 if international => Some(format!("+{}", digits)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("(555) 123-4567"), Some("+15551234567".to_string()));
        assert_eq!(normalize_phone("1-555-123-4567"), Some("+15551234567".to_string()));
        assert_eq!(normalize_phone("+44 20 7946 0958"), Some("+442079460958".to_string()));
        assert_eq!(normalize_phone("12345"), None);
        assert_eq!(normalize_phone(""), None);
    }

    #[test]
    fn test_basic_auth_header() {
        let client = SmsClient::new(
            TwilioCredentials {
                account_sid: "AC123".to_string(),
                auth_token: "token".to_string(),
                from_number: "+15550000000".to_string(),
            },
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.basic_auth(), format!("Basic {}", general_purpose::STANDARD.encode("AC123:token")));
    }
}
