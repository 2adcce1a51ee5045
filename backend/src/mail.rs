//! Outbound email through an HTTP mail API.
//!
//! Delivery failures are logged and swallowed: a dead mail relay must
//! never fail the request that triggered the message. When no API URL
//! is configured the mailer drops everything at debug level.

use chrono::{Datelike, Utc};
use reqwest::Client;
use serde::Serialize;

use crate::config::MailConfig;
use crate::models::{Application, ApplicationStatus, ContactMessage};

/// Client for the mail delivery API.
pub struct Mailer {
    http_client: Client,
    config: MailConfig,
}

/// Mail API request format.
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    html: &'a str,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),
    #[error("mail API error: {0}")]
    ApiError(String),
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            http_client: Client::new(),
            config,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.api_url.is_some()
    }

    /// Deliver one message, logging the outcome. Never fails the caller.
    async fn send(&self, to: &str, subject: &str, text: &str, html: &str) {
        let Some(api_url) = self.config.api_url.clone() else {
            tracing::debug!("Mail delivery disabled, dropping \"{}\" to {}", subject, to);
            return;
        };
        match self.post(&api_url, to, subject, text, html).await {
            Ok(()) => tracing::info!("Email sent to {} with subject \"{}\"", to, subject),
            Err(e) => tracing::error!("Error sending email: {}", e),
        }
    }

    async fn post(
        &self,
        api_url: &str,
        to: &str,
        subject: &str,
        text: &str,
        html: &str,
    ) -> Result<(), MailError> {
        let request = SendRequest {
            from: &self.config.from,
            to,
            subject,
            text,
            html,
        };

        let mut builder = self.http_client.post(api_url).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| MailError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::ApiError(format!("{}: {}", status, body)));
        }

        Ok(())
    }

    /// Shared HTML shell around every message body.
    fn layout(&self, title: &str, content: &str) -> String {
        let site = &self.config.site_name;
        let year = Utc::now().year();
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n\
             body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; margin: 0; background-color: #f4f4f4; }}\n\
             .container {{ max-width: 600px; margin: 20px auto; background-color: #ffffff; border-radius: 8px; overflow: hidden; }}\n\
             .header {{ background-color: #002d62; color: white; padding: 24px; text-align: center; }}\n\
             .header h1 {{ margin: 0; font-size: 22px; }}\n\
             .content {{ padding: 32px; }}\n\
             .content h2 {{ color: #002d62; margin-top: 0; }}\n\
             .info-box {{ background-color: #f0f9ff; border-left: 4px solid #00aeef; padding: 12px 16px; margin: 16px 0; }}\n\
             .footer {{ background-color: #f9fafb; padding: 16px; text-align: center; font-size: 12px; color: #6b7280; }}\n\
             strong {{ color: #002d62; }}\n\
             </style>\n</head>\n<body>\n<div class=\"container\">\n\
             <div class=\"header\"><h1>{site}</h1></div>\n\
             <div class=\"content\"><h2>{title}</h2>\n{content}\n</div>\n\
             <div class=\"footer\"><p>&copy; {year} {site}</p></div>\n\
             </div>\n</body>\n</html>"
        )
    }

    pub async fn send_application_confirmation(&self, to: &str, name: &str) {
        let site = &self.config.site_name;
        let subject = format!("Application Received - {site}");
        let text = format!(
            "Hi {name},\n\nThank you for applying to join {site}. We have received your \
             application and will review it shortly.\n\nBest regards,\nThe {site} Team"
        );
        let content = format!(
            "<p>Hi <strong>{name}</strong>,</p>\n\
             <p>Thank you for your interest in joining <strong>{site}</strong>.</p>\n\
             <div class=\"info-box\"><p>We have successfully received your application and \
             our team will review it shortly.</p></div>\n\
             <p>You will receive another email once your application status has been updated.</p>\n\
             <p>Best regards,<br>The {site} Team</p>"
        );
        let html = self.layout("We've Received Your Application!", &content);
        self.send(to, &subject, &text, &html).await;
    }

    pub async fn send_admin_application_notification(&self, application: &Application) {
        let Some(admin_email) = self.config.admin_email.clone() else {
            tracing::debug!("No admin email configured, skipping application notification");
            return;
        };
        let subject = "New Membership Application";
        let text = format!(
            "A new application has been submitted by {} ({}).\n\n\
             Please log in to the admin dashboard to review it.",
            application.full_name, application.email
        );
        let content = format!(
            "<p>A new membership application has been submitted.</p>\n\
             <div class=\"info-box\">\n\
             <p><strong>Name:</strong> {}</p>\n\
             <p><strong>Email:</strong> {}</p>\n\
             <p><strong>Course:</strong> {}</p>\n\
             <p><strong>Phone:</strong> {}</p>\n\
             </div>\n\
             <p><strong>Motivation:</strong><br>{}</p>",
            application.full_name,
            application.email,
            application.course,
            application.phone,
            application.message.as_deref().unwrap_or(""),
        );
        let html = self.layout("New Application Received", &content);
        self.send(&admin_email, subject, &text, &html).await;
    }

    pub async fn send_application_status_update(
        &self,
        to: &str,
        name: &str,
        status: ApplicationStatus,
    ) {
        let site = &self.config.site_name;
        let subject = format!("Application Update: {}", status_label(status));
        let (text, content) = if status == ApplicationStatus::Approved {
            (
                format!(
                    "Hi {name},\n\nCongratulations! Your application to join {site} has been \
                     approved. We will contact you soon with details about the orientation.\n\n\
                     Welcome to the club!"
                ),
                format!(
                    "<p>Hi <strong>{name}</strong>,</p>\n\
                     <div class=\"info-box\"><p><strong>Congratulations!</strong> Your \
                     application to join {site} has been <strong>APPROVED</strong>.</p></div>\n\
                     <p>We will contact you soon with details about the upcoming orientation \
                     and next steps.</p>\n\
                     <p>Welcome to the club!</p>"
                ),
            )
        } else {
            (
                format!(
                    "Hi {name},\n\nThank you for your interest in {site}. After careful review, \
                     we regret to inform you that we cannot offer you a place at this time.\n\n\
                     We wish you the best in your endeavors."
                ),
                format!(
                    "<p>Hi <strong>{name}</strong>,</p>\n\
                     <p>Thank you for your interest in {site}.</p>\n\
                     <div class=\"info-box\"><p>After careful review, we regret to inform you \
                     that we cannot offer you a place at this time.</p></div>\n\
                     <p>We appreciate the time you took to apply and wish you the best in your \
                     future endeavors.</p>"
                ),
            )
        };
        let title = format!("Application Status: {}", status.as_str().to_uppercase());
        let html = self.layout(&title, &content);
        self.send(to, &subject, &text, &html).await;
    }

    pub async fn send_contact_confirmation(&self, to: &str, name: &str) {
        let site = &self.config.site_name;
        let subject = format!("Message Received - {site}");
        let text = format!(
            "Hi {name},\n\nThank you for contacting us. We have received your message and a \
             member of our team will get back to you as soon as possible.\n\n\
             Best regards,\nThe {site} Team"
        );
        let content = format!(
            "<p>Hi <strong>{name}</strong>,</p>\n\
             <p>Thank you for reaching out to us.</p>\n\
             <div class=\"info-box\"><p>We have received your message and a member of our team \
             will get back to you as soon as possible.</p></div>\n\
             <p>Best regards,<br>The {site} Team</p>"
        );
        let html = self.layout("We've Received Your Message", &content);
        self.send(to, &subject, &text, &html).await;
    }

    pub async fn send_admin_contact_notification(&self, contact: &ContactMessage) {
        let Some(admin_email) = self.config.admin_email.clone() else {
            tracing::debug!("No admin email configured, skipping contact notification");
            return;
        };
        let subject = format!("New Contact Message: {}", contact.subject);
        let text = format!(
            "A new message has been submitted by {} ({}).\n\n\
             Subject: {}\nMessage: {}\n\n\
             Please log in to the admin dashboard to respond.",
            contact.name, contact.email, contact.subject, contact.message
        );
        let content = format!(
            "<p>A new contact form message has been submitted.</p>\n\
             <div class=\"info-box\">\n\
             <p><strong>Name:</strong> {}</p>\n\
             <p><strong>Email:</strong> {}</p>\n\
             <p><strong>Subject:</strong> {}</p>\n\
             </div>\n\
             <p><strong>Message:</strong><br>{}</p>",
            contact.name, contact.email, contact.subject, contact.message
        );
        let html = self.layout("New Contact Message", &content);
        self.send(&admin_email, &subject, &text, &html).await;
    }

    pub async fn send_contact_response(
        &self,
        contact: &ContactMessage,
        responder_name: &str,
        response_message: &str,
    ) {
        let subject = format!("Re: {}", contact.subject);
        let text = format!(
            "Hi {},\n\n{}\n\nBest regards,\n{}",
            contact.name, response_message, responder_name
        );
        let content = format!(
            "<p>Hi <strong>{}</strong>,</p>\n\
             <p>In response to your message:</p>\n\
             <div class=\"info-box\"><p>{}</p></div>\n\
             <p>Best regards,<br><strong>{}</strong></p>",
            contact.name, response_message, responder_name
        );
        let html = self.layout("Response to Your Inquiry", &content);
        self.send(&contact.email, &subject, &text, &html).await;
    }
}

fn status_label(status: ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Pending => "Pending",
        ApplicationStatus::Approved => "Approved",
        ApplicationStatus::Rejected => "Rejected",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mailer_for(url: Option<String>, api_key: Option<String>) -> Mailer {
        Mailer::new(MailConfig {
            api_url: url,
            api_key,
            from: "noreply@club.test".to_string(),
            admin_email: Some("admins@club.test".to_string()),
            site_name: "Test Club".to_string(),
        })
    }

    #[tokio::test]
    async fn posts_message_to_mail_api() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .and(body_partial_json(json!({
                "from": "noreply@club.test",
                "to": "jane@club.test",
                "subject": "Application Received - Test Club",
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mailer = mailer_for(Some(format!("{}/send", server.uri())), None);
        mailer.send_application_confirmation("jane@club.test", "Jane").await;
    }

    #[tokio::test]
    async fn api_key_is_sent_as_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer sekrit"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mailer = mailer_for(Some(server.uri()), Some("sekrit".to_string()));
        mailer.send_contact_confirmation("jane@club.test", "Jane").await;
    }

    #[tokio::test]
    async fn admin_notification_goes_to_admin_email() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "to": "admins@club.test",
                "subject": "New Membership Application",
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mailer = mailer_for(Some(server.uri()), None);
        let application = Application::new(
            "Jane Doe".to_string(),
            "jane@club.test".to_string(),
            "0700000000".to_string(),
            "Computer Science".to_string(),
            Some("I like hiking".to_string()),
        );
        mailer.send_admin_application_notification(&application).await;
    }

    #[tokio::test]
    async fn delivery_failure_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("relay down"))
            .expect(1)
            .mount(&server)
            .await;

        let mailer = mailer_for(Some(server.uri()), None);
        // Must not panic or propagate the failure.
        mailer
            .send_application_status_update("jane@club.test", "Jane", ApplicationStatus::Approved)
            .await;
    }

    #[tokio::test]
    async fn disabled_mailer_drops_messages() {
        let mailer = mailer_for(None, None);
        assert!(!mailer.is_enabled());
        mailer.send_contact_confirmation("jane@club.test", "Jane").await;
    }
}
