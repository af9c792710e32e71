//! Outbound transactional email
//!
//! `HttpMailer` talks to a Resend-compatible JSON API. `LogMailer` only logs
//! and is used in development when no API key is configured.

pub mod templates;

use async_trait::async_trait;
use serde::Serialize;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A single plain-text email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), BoxError>;
}

#[derive(Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            from: from.into(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), BoxError> {
        let body = SendEmailBody {
            from: &self.from,
            to: [&email.to],
            subject: &email.subject,
            text: &email.text,
        };

        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(format!("email API returned {status}: {detail}").into());
        }

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Development mailer: writes the email to the log instead of sending it
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), BoxError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.text,
            "Email not sent (no EMAIL_API_KEY configured)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_provider_shape() {
        let body = SendEmailBody {
            from: "Pack & Go <noreply@packandgo.app>",
            to: ["anna@example.com"],
            subject: "s",
            text: "t",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["to"][0], "anna@example.com");
        assert_eq!(json["from"], "Pack & Go <noreply@packandgo.app>");
    }

    #[tokio::test]
    async fn log_mailer_never_fails() {
        let email = OutboundEmail {
            to: "anna@example.com".into(),
            subject: "s".into(),
            text: "t".into(),
        };
        assert!(LogMailer.send(&email).await.is_ok());
    }
}
