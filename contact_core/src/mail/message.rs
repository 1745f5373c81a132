use std::borrow::Cow;

use crate::config::{MailConfig, SmtpConfig};
use crate::models::ValidSubmission;

/// A fully composed contact email, independent of any transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEmail {
    pub from_name: String,
    pub from_address: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

impl ContactEmail {
    pub fn compose(submission: &ValidSubmission, smtp: &SmtpConfig, mail: &MailConfig) -> Self {
        Self {
            from_name: mail.sender.clone(),
            from_address: smtp.from.clone(),
            to: smtp.to.clone(),
            reply_to: submission.email.clone(),
            subject: format!("New Contact Form Submission from {}", submission.name),
            text_body: render_text(submission, &mail.footer),
            html_body: render_html(submission, &mail.footer, mail.escape),
        }
    }

    /// The `From` header value, e.g. `"Contact Form" <noreply@example.com>`.
    pub fn from_header(&self) -> String {
        format!("\"{}\" <{}>", self.from_name, self.from_address)
    }
}

fn render_text(submission: &ValidSubmission, footer: &str) -> String {
    format!(
        "New Contact Form Submission\n\
         \n\
         Name: {name}\n\
         Email: {email}\n\
         \n\
         Message:\n\
         {message}\n\
         \n\
         ---\n\
         {footer}\n",
        name = submission.name,
        email = submission.email,
        message = submission.message,
        footer = footer,
    )
}

fn render_html(submission: &ValidSubmission, footer: &str, escape: bool) -> String {
    let field = |value: &str| -> String {
        if escape {
            escape_html(value).into_owned()
        } else {
            value.to_string()
        }
    };

    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #2563eb;">New Contact Form Submission</h2>
  <div style="background-color: #f3f4f6; padding: 20px; border-radius: 8px; margin: 20px 0;">
    <p><strong>Name:</strong> {name}</p>
    <p><strong>Email:</strong> {email}</p>
    <p><strong>Message:</strong></p>
    <p style="white-space: pre-wrap;">{message}</p>
  </div>
  <p style="color: #6b7280; font-size: 14px;">
    {footer}
  </p>
</div>
"#,
        name = field(submission.name.as_str()),
        email = field(submission.email.as_str()),
        message = field(submission.message.as_str()),
        footer = field(footer),
    )
}

/// Escapes `& < > " '` for inclusion in HTML text or attribute values.
pub fn escape_html(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(message: &str) -> ValidSubmission {
        ValidSubmission {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: message.to_string(),
        }
    }

    fn smtp() -> SmtpConfig {
        SmtpConfig {
            from: "noreply@skykin.tech".to_string(),
            to: "hello@skykin.tech".to_string(),
            ..SmtpConfig::default()
        }
    }

    #[test]
    fn test_addressing() {
        let email = ContactEmail::compose(&submission("Hello"), &smtp(), &MailConfig::default());

        assert_eq!(email.to, "hello@skykin.tech");
        assert_eq!(email.reply_to, "ada@example.com");
        assert_eq!(email.from_header(), "\"SKYKIN Contact Form\" <noreply@skykin.tech>");
        assert_eq!(email.subject, "New Contact Form Submission from Ada");
    }

    #[test]
    fn test_text_body_is_verbatim() {
        let email = ContactEmail::compose(
            &submission("<b>line one</b>\nline two"),
            &smtp(),
            &MailConfig::default(),
        );

        assert!(email.text_body.contains("Name: Ada\n"));
        assert!(email.text_body.contains("Email: ada@example.com\n"));
        assert!(email.text_body.contains("Message:\n<b>line one</b>\nline two\n"));
        assert!(email.text_body.contains("---\nThis email was sent from"));
    }

    #[test]
    fn test_html_body_escapes_by_default() {
        let email = ContactEmail::compose(
            &submission("<script>alert('x')</script>"),
            &smtp(),
            &MailConfig::default(),
        );

        assert!(!email.html_body.contains("<script>"));
        assert!(email
            .html_body
            .contains("&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt;"));
    }

    #[test]
    fn test_html_body_verbatim_when_escaping_disabled() {
        let mail = MailConfig {
            escape: false,
            ..MailConfig::default()
        };
        let email = ContactEmail::compose(&submission("<em>hi</em>"), &smtp(), &mail);

        assert!(email.html_body.contains("<p style=\"white-space: pre-wrap;\"><em>hi</em></p>"));
    }

    #[test]
    fn test_subject_keeps_name_verbatim() {
        let mut s = submission("Hello");
        s.name = "O'Brien & <Co>".to_string();
        let email = ContactEmail::compose(&s, &smtp(), &MailConfig::default());
        assert_eq!(email.subject, "New Contact Form Submission from O'Brien & <Co>");
    }

    #[test]
    fn test_escape_html_borrows_clean_input() {
        assert!(matches!(escape_html("plain text"), Cow::Borrowed(_)));
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html("\"q\""), "&quot;q&quot;");
    }
}
