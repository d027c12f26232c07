use serde_json::{Map, Value};

use super::NotificationKind;

pub const FALLBACK_CLIENT_NAME: &str = "Valued Client";

/// Free-form values a template may reference, e.g. `amount` or `status`.
pub type NotificationData = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reads a data field as display text. Strings are used as-is, other JSON values
/// are printed. Missing or empty fields yield `fallback`.
fn field(data: &NotificationData, key: &str, fallback: &str) -> String {
    let text = match data.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Null) | Some(Value::String(_)) | None => fallback.to_string(),
        Some(other) => other.to_string(),
    };
    escape_html(&text)
}

#[must_use]
pub fn render(
    kind: NotificationKind,
    client_name: Option<&str>,
    data: &NotificationData,
    studio: &str,
) -> RenderedEmail {
    let name = escape_html(
        client_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(FALLBACK_CLIENT_NAME),
    );
    let studio_html = escape_html(studio);
    let sign_off = format!("<br>\n<p>Best regards,<br>{studio_html}</p>");

    let (subject, html) = match kind {
        NotificationKind::ContractSent => (
            format!("Your Contract is Ready - {studio}"),
            format!(
                "<h1>Hello {name}!</h1>\n\
                 <p>Your contract is ready for review and signature.</p>\n\
                 <p>Please log in to your client portal to review and sign the contract.</p>\n\
                 {sign_off}"
            ),
        ),
        NotificationKind::InvoiceCreated => (
            format!("New Invoice - {studio}"),
            format!(
                "<h1>Hello {name}!</h1>\n\
                 <p>A new invoice has been created for you:</p>\n\
                 <p><strong>Amount:</strong> {}</p>\n\
                 <p><strong>Description:</strong> {}</p>\n\
                 <p>Please log in to your client portal to view and pay the invoice.</p>\n\
                 {sign_off}",
                field(data, "amount", "N/A"),
                field(data, "description", "N/A"),
            ),
        ),
        NotificationKind::DeliverableSent => (
            format!("New Deliverable Ready - {studio}"),
            format!(
                "<h1>Hello {name}!</h1>\n\
                 <p>A new deliverable has been shared with you:</p>\n\
                 <p><strong>{}</strong></p>\n\
                 <p>Please log in to your client portal to download or view it.</p>\n\
                 {sign_off}",
                field(data, "title", "New File"),
            ),
        ),
        NotificationKind::ClientApproved => (
            format!("You're Approved! - {studio}"),
            format!(
                "<h1>Welcome {name}!</h1>\n\
                 <p>Great news! Your application has been approved.</p>\n\
                 <p>You can now log in to your client portal to:</p>\n\
                 <ul>\n\
                 <li>Sign your contract</li>\n\
                 <li>View project progress</li>\n\
                 <li>Access deliverables</li>\n\
                 <li>Send messages</li>\n\
                 </ul>\n\
                 <br>\n\
                 <p>We're excited to work with you!</p>\n\
                 <p>Best regards,<br>{studio_html}</p>"
            ),
        ),
        NotificationKind::MessageReceived => (
            format!("New Message - {studio}"),
            format!(
                "<h1>Hello {name}!</h1>\n\
                 <p>You have received a new message from {studio_html}.</p>\n\
                 <p>Please log in to your client portal to view and respond.</p>\n\
                 {sign_off}"
            ),
        ),
        NotificationKind::ProjectUpdated => (
            format!("Project Update - {studio}"),
            format!(
                "<h1>Hello {name}!</h1>\n\
                 <p>Your project has been updated!</p>\n\
                 <p><strong>New Status:</strong> {}</p>\n\
                 <p>Please log in to your client portal to see the latest progress.</p>\n\
                 {sign_off}",
                field(data, "status", "Updated"),
            ),
        ),
        NotificationKind::ProjectCompleted => (
            format!("Your Project is Complete! \u{1F389} - {studio}"),
            format!(
                "<h1>Congratulations {name}!</h1>\n\
                 <p>We're thrilled to let you know that your project is now complete!</p>\n\
                 <p>Thank you for choosing {studio_html}. It has been a pleasure working with you.</p>\n\
                 <p>You can access all your final deliverables in your client portal.</p>\n\
                 <br>\n\
                 <p>If you need any ongoing support or have future projects in mind, we'd love to hear from you!</p>\n\
                 <br>\n\
                 <p>With gratitude,<br>The {studio_html} Team</p>"
            ),
        ),
    };

    RenderedEmail { subject, html }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const STUDIO: &str = "Keyline Studios";

    fn data(value: Value) -> NotificationData {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_client_name_fallback() {
        let email = render(NotificationKind::ContractSent, None, &Map::new(), STUDIO);
        assert!(email.html.contains("Hello Valued Client!"));
        assert_eq!(email.subject, "Your Contract is Ready - Keyline Studios");

        let blank = render(NotificationKind::ContractSent, Some("  "), &Map::new(), STUDIO);
        assert!(blank.html.contains("Valued Client"));
    }

    #[test]
    fn test_invoice_fields() {
        let email = render(
            NotificationKind::InvoiceCreated,
            Some("Dana"),
            &data(json!({"amount": "$250.00", "description": "Deposit"})),
            STUDIO,
        );
        assert!(email.html.contains("<strong>Amount:</strong> $250.00"));
        assert!(email.html.contains("<strong>Description:</strong> Deposit"));

        let missing = render(NotificationKind::InvoiceCreated, Some("Dana"), &Map::new(), STUDIO);
        assert!(missing.html.contains("<strong>Amount:</strong> N/A"));
    }

    #[test]
    fn test_values_are_escaped() {
        let email = render(
            NotificationKind::DeliverableSent,
            Some("<b>Eve</b>"),
            &data(json!({"title": "<script>x</script>"})),
            STUDIO,
        );
        assert!(!email.html.contains("<script>"));
        assert!(email.html.contains("&lt;b&gt;Eve&lt;/b&gt;"));
    }

    #[test]
    fn test_project_updated_status() {
        let email = render(
            NotificationKind::ProjectUpdated,
            Some("Dana"),
            &data(json!({"status": "review"})),
            STUDIO,
        );
        assert!(email.html.contains("<strong>New Status:</strong> review"));

        let completed = render(
            NotificationKind::ProjectCompleted,
            Some("Dana"),
            &Map::new(),
            STUDIO,
        );
        assert!(completed.subject.starts_with("Your Project is Complete!"));
        assert!(completed.html.contains("The Keyline Studios Team"));
    }

    #[test]
    fn test_non_string_values_print() {
        let email = render(
            NotificationKind::InvoiceCreated,
            None,
            &data(json!({"amount": 250})),
            STUDIO,
        );
        assert!(email.html.contains("<strong>Amount:</strong> 250"));
    }
}
