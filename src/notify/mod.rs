mod kind;
mod mailer;
mod template;

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

pub use kind::NotificationKind;
pub use mailer::{LogMailer, Mailer, OutgoingEmail, ResendMailer, mailer_from_config};
pub use template::{FALLBACK_CLIENT_NAME, NotificationData, RenderedEmail, render};

use crate::config::NotifyConfig;
use crate::store::Store;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Client profile not found")]
    ProfileNotFound,
    #[error("email request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("email provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },
    #[error(transparent)]
    Store(#[from] crate::error::Error),
}

/// Renders and sends client emails. Each call is a single attempt.
pub struct Notifier {
    store: Arc<dyn Store>,
    mailer: Arc<dyn Mailer>,
    from_address: String,
    studio_name: String,
}

impl Notifier {
    pub fn new(store: Arc<dyn Store>, mailer: Arc<dyn Mailer>, config: &NotifyConfig) -> Self {
        Self {
            store,
            mailer,
            from_address: config.from_address.clone(),
            studio_name: config.studio_name.clone(),
        }
    }

    /// Looks up the client, renders the template for `kind`, and submits it.
    pub async fn send(
        &self,
        kind: NotificationKind,
        client_id: &str,
        data: &NotificationData,
    ) -> Result<Value, NotifyError> {
        tracing::info!(kind = %kind, client_id, "Sending notification");

        let profile = self
            .store
            .get_profile(client_id)?
            .ok_or(NotifyError::ProfileNotFound)?;

        let rendered = render(kind, profile.full_name.as_deref(), data, &self.studio_name);
        let email = OutgoingEmail {
            from: self.from_address.clone(),
            to: vec![profile.email],
            subject: rendered.subject,
            html: rendered.html,
        };

        let response = self.mailer.send(&email).await?;
        tracing::info!(kind = %kind, client_id, "Notification sent");
        Ok(response)
    }

    /// Sends on a background task after the caller's write has committed.
    /// Failures are logged and never reach the caller.
    pub fn dispatch(
        self: &Arc<Self>,
        kind: NotificationKind,
        client_id: &str,
        data: NotificationData,
    ) {
        let notifier = Arc::clone(self);
        let client_id = client_id.to_string();

        tokio::spawn(async move {
            if let Err(e) = notifier.send(kind, &client_id, &data).await {
                tracing::warn!(
                    kind = %kind,
                    client_id = %client_id,
                    error = %e,
                    "Notification failed"
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use tempfile::TempDir;

    use super::*;
    use crate::store::SqliteStore;
    use crate::types::{Profile, Role, User};

    #[derive(Default)]
    struct CapturingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for CapturingMailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<Value, NotifyError> {
            if self.fail {
                return Err(NotifyError::Provider {
                    status: 500,
                    body: "down".to_string(),
                });
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(serde_json::json!({"id": "email-1"}))
        }
    }

    fn store_with_client(temp: &TempDir, full_name: Option<&str>) -> Arc<dyn Store> {
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        let now = Utc::now();
        store
            .create_user(&User {
                profile: Profile {
                    user_id: "client-1".to_string(),
                    email: "client@example.com".to_string(),
                    full_name: full_name.map(str::to_string),
                    company_name: None,
                    logo_url: None,
                    created_at: now,
                    updated_at: now,
                },
                role: Role::Client,
            })
            .unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_send_renders_for_profile() {
        let temp = TempDir::new().unwrap();
        let mailer = Arc::new(CapturingMailer::default());
        let notifier = Notifier::new(
            store_with_client(&temp, Some("Dana")),
            mailer.clone(),
            &NotifyConfig::default(),
        );

        let response = notifier
            .send(NotificationKind::ClientApproved, "client-1", &NotificationData::new())
            .await
            .unwrap();
        assert_eq!(response["id"], "email-1");

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, ["client@example.com"]);
        assert_eq!(sent[0].from, "Keyline Studios <hello@keylinestudios.com>");
        assert!(sent[0].html.contains("Welcome Dana!"));
    }

    #[tokio::test]
    async fn test_send_unknown_profile() {
        let temp = TempDir::new().unwrap();
        let notifier = Notifier::new(
            store_with_client(&temp, None),
            Arc::new(CapturingMailer::default()),
            &NotifyConfig::default(),
        );

        let result = notifier
            .send(NotificationKind::ContractSent, "nobody", &NotificationData::new())
            .await;
        assert!(matches!(result, Err(NotifyError::ProfileNotFound)));
    }

    #[tokio::test]
    async fn test_send_surfaces_provider_failure() {
        let temp = TempDir::new().unwrap();
        let notifier = Notifier::new(
            store_with_client(&temp, None),
            Arc::new(CapturingMailer {
                fail: true,
                ..Default::default()
            }),
            &NotifyConfig::default(),
        );

        let result = notifier
            .send(NotificationKind::ContractSent, "client-1", &NotificationData::new())
            .await;
        assert!(matches!(result, Err(NotifyError::Provider { status: 500, .. })));
    }
}
