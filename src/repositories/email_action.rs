// Email action repository
// Table: email_actions

use chrono::Utc;
use serde_json::Value;

use super::base::{optional, BaseRepository, Entity};
use crate::error::StoreError;
use crate::models::{EmailAction, EmailActionDto, EmailActionStatus, NewEmailAction};
use crate::store::{Row, SupabaseClient};

impl Entity for EmailActionDto {
    const TABLE: &'static str = "email_actions";
    const OPAQUE_FIELDS: &'static [&'static str] = &["action_details"];
}

const DEFAULT_PENDING_LIMIT: u64 = 10;

#[derive(Clone)]
pub struct EmailActionRepository {
    base: BaseRepository<EmailActionDto>,
}

impl EmailActionRepository {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            base: BaseRepository::new(client),
        }
    }

    /// Store the proposed actions for one email in a single insert
    pub async fn create_many(
        &self,
        user_id: &str,
        email_id: &str,
        account_id: &str,
        actions: &[EmailAction],
    ) -> Result<Vec<EmailActionDto>, StoreError> {
        if actions.is_empty() {
            return Ok(Vec::new());
        }

        let rows = actions
            .iter()
            .map(|action| {
                self.base.owned_row(
                    user_id,
                    &NewEmailAction {
                        email_id,
                        account_id,
                        action_type: action.action_type,
                        action_details: &action.details,
                        status: EmailActionStatus::Pending,
                        requires_approval: false,
                    },
                )
            })
            .collect::<Result<Vec<Row>, StoreError>>()?;

        let response = self.base.table().insert_many(rows).execute().await?;
        let created = self.base.convert_to_dtos(response.rows)?;

        tracing::info!("Created {} actions for email {} (user {})", created.len(), email_id, user_id);
        Ok(created)
    }

    pub async fn find_by_email_id(&self, user_id: &str, email_id: &str) -> Result<Vec<EmailActionDto>, StoreError> {
        let response = self
            .base
            .table()
            .eq("user_id", user_id)
            .eq("email_id", email_id)
            .order("created_at", true)
            .execute()
            .await?;

        self.base.convert_to_dtos(response.rows)
    }

    /// Completing an action stamps `executed_at`
    pub async fn update_status(
        &self,
        user_id: &str,
        action_id: &str,
        status: EmailActionStatus,
        error_message: Option<&str>,
    ) -> Result<Option<EmailActionDto>, StoreError> {
        let mut row = Row::new();
        row.insert("status".to_string(), Value::from(status.as_str()));
        if status == EmailActionStatus::Completed {
            row.insert("executed_at".to_string(), Value::from(Utc::now().to_rfc3339()));
        }
        if let Some(message) = error_message {
            row.insert("error_message".to_string(), Value::from(message));
        }

        let updated = optional(
            self.base
                .table()
                .update(row)
                .eq("user_id", user_id)
                .eq("id", action_id)
                .single()
                .await,
        )?;

        match updated {
            Some(row) => {
                let action = self.base.convert_to_dto(row)?;
                tracing::info!("Email action {} is now {}", action_id, status.as_str());
                Ok(Some(action))
            }
            None => Ok(None),
        }
    }

    /// Oldest pending actions for an account, 10 by default
    pub async fn get_pending_actions(
        &self,
        user_id: &str,
        account_id: &str,
        limit: Option<u64>,
    ) -> Result<Vec<EmailActionDto>, StoreError> {
        let response = self
            .base
            .table()
            .eq("user_id", user_id)
            .eq("account_id", account_id)
            .eq("status", EmailActionStatus::Pending.as_str())
            .order("created_at", true)
            .limit(limit.unwrap_or(DEFAULT_PENDING_LIMIT))
            .execute()
            .await?;

        self.base.convert_to_dtos(response.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmailActionType;
    use crate::store::memory::InMemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Arc<InMemoryStore>, EmailActionRepository) {
        let store = Arc::new(InMemoryStore::new());
        let repo = EmailActionRepository::new(SupabaseClient::with_transport(store.clone()));
        (store, repo)
    }

    fn action(action_type: EmailActionType, details: Value) -> EmailAction {
        let Value::Object(details) = details else { unreachable!() };
        EmailAction { action_type, details }
    }

    #[tokio::test]
    async fn test_create_many_is_one_insert_with_pending_defaults() {
        let (store, repo) = setup();

        let created = repo
            .create_many(
                "u1",
                "e1",
                "acc",
                &[
                    action(EmailActionType::Label, json!({"labelName": "Invoices"})),
                    action(EmailActionType::Archive, json!({})),
                ],
            )
            .await
            .unwrap();

        assert_eq!(created.len(), 2);
        assert!(created.iter().all(|a| a.status == EmailActionStatus::Pending && !a.requires_approval));
        assert_eq!(created[0].action_details["labelName"], json!("Invoices"));
        assert_eq!(store.queries().len(), 1);
        assert_eq!(store.rows("email_actions")[0]["action_details"], json!({"labelName": "Invoices"}));

        assert!(repo.create_many("u1", "e2", "acc", &[]).await.unwrap().is_empty());
        assert_eq!(store.queries().len(), 1);
    }

    #[tokio::test]
    async fn test_update_status_sets_executed_at_on_completion() {
        let (_, repo) = setup();
        let created = repo
            .create_many(
                "u1",
                "e1",
                "acc",
                &[
                    action(EmailActionType::Archive, json!({})),
                    action(EmailActionType::Forward, json!({"to": "a@b.c"})),
                ],
            )
            .await
            .unwrap();

        let done = repo
            .update_status("u1", &created[0].id, EmailActionStatus::Completed, None)
            .await
            .unwrap()
            .unwrap();
        assert!(done.executed_at.is_some());

        let failed = repo
            .update_status("u1", &created[1].id, EmailActionStatus::Failed, Some("smtp down"))
            .await
            .unwrap()
            .unwrap();
        assert!(failed.executed_at.is_none());
        assert_eq!(failed.error_message.as_deref(), Some("smtp down"));

        assert!(repo.get_pending_actions("u1", "acc", None).await.unwrap().is_empty());
        assert_eq!(repo.find_by_email_id("u1", "e1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_status_missing_action_is_none() {
        let (store, repo) = setup();

        let updated = repo
            .update_status("u1", "missing", EmailActionStatus::Completed, None)
            .await
            .unwrap();

        assert!(updated.is_none());
        assert!(store.rows("email_actions").is_empty());
    }

    #[tokio::test]
    async fn test_pending_actions_oldest_first() {
        let (store, repo) = setup();
        for (id, created, status) in [
            ("a1", "2024-01-02T00:00:00Z", "pending"),
            ("a2", "2024-01-01T00:00:00Z", "pending"),
            ("a3", "2024-01-03T00:00:00Z", "completed"),
        ] {
            store.seed(
                "email_actions",
                json!({
                    "id": id,
                    "user_id": "u1",
                    "email_id": "e1",
                    "account_id": "acc",
                    "action_type": "archive",
                    "action_details": {},
                    "status": status,
                    "requires_approval": false,
                    "created_at": created,
                    "updated_at": created
                }),
            );
        }

        let pending = repo.get_pending_actions("u1", "acc", Some(5)).await.unwrap();
        let ids: Vec<&str> = pending.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a2", "a1"]);
    }
}
