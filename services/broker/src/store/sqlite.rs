//! SQLite-backed implementation of the broker store.
//!
//! # What this module is
//! Implements the [`Store`] trait using an embedded SQLite file (via `sqlx`)
//! as the durable source of truth for topics, users, subscriptions,
//! messages, and the delivery queue. The at-least-once guarantee of the
//! broker rests on this backend: a message and its queue items survive
//! process restarts, and the queue processor resumes retrying from here.
//!
//! # Data model
//! Five tables (see `migrations/0001_init.sql`):
//! - `topics(name PK)`
//! - `users(username PK, password_hash, role)`
//! - `subscriptions(topic, token, provider, username; PK (topic, token))`
//! - `messages(id PK AUTOINCREMENT, topic, payload, created_at)`
//! - `queue(id PK AUTOINCREMENT, message_id -> messages.id, token, status)`
//!   with an index on `(token, status)`
//!
//! Pending-queue reads join `messages` for the payload/topic and
//! `subscriptions` for the provider, so the processor works off a single
//! query per tick.
//!
//! # Consistency / atomicity
//! Multi-row mutations (`delete_topic` validation, `clear_topic_messages`)
//! run inside a transaction. `clear_topic_messages` deletes queue rows
//! before message rows in the same commit, preserving the invariant that a
//! queue item always references an existing message. Single-statement
//! mutations rely on SQLite's per-statement atomicity.
//!
//! # Operational notes
//! - Migrations run at startup via `sqlx::migrate!` before any request is
//!   served; a failed migration fails startup.
//! - SQLite serializes writers; the pool bounds concurrent connections and
//!   `acquire_timeout` keeps a wedged database from hanging handlers.
use super::{Store, StoreError, StoreResult};
use crate::model::{Message, QueueItem, QueueStatus, Role, Subscription, User};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::path::Path;
use std::time::Duration;

/// Durable broker store backed by an embedded SQLite file.
pub struct SqliteStore {
    pool: SqlitePool,
}

/// Row shape for the `users` table. DB-facing structs stay separate from the
/// domain types so parsing (string role -> [`Role`]) happens in one place.
#[derive(Debug, Clone, FromRow)]
struct DbUser {
    username: String,
    password_hash: String,
    role: String,
}

/// Row shape for the `subscriptions` table.
#[derive(Debug, Clone, FromRow)]
struct DbSubscription {
    topic: String,
    token: String,
    provider: String,
    username: String,
}

impl From<DbSubscription> for Subscription {
    fn from(row: DbSubscription) -> Self {
        Subscription {
            topic: row.topic,
            token: row.token,
            provider: row.provider,
            username: row.username,
        }
    }
}

/// Row shape for the `messages` table.
#[derive(Debug, Clone, FromRow)]
struct DbMessage {
    id: i64,
    topic: String,
    payload: Vec<u8>,
    created_at: DateTime<Utc>,
}

/// Row shape for pending-queue reads, already joined against `messages` and
/// `subscriptions`. `provider` is empty when the subscription has been
/// removed since the item was enqueued.
#[derive(Debug, Clone, FromRow)]
struct DbQueueItem {
    id: i64,
    message_id: i64,
    topic: String,
    token: String,
    provider: String,
    status: String,
    payload: Vec<u8>,
}

impl SqliteStore {
    /// Open (creating if missing) the database file, run migrations, and
    /// return a pooled store.
    pub async fn connect(path: impl AsRef<Path>) -> StoreResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?;

        // Schema must exist before handlers run; failing startup beats
        // serving half-working endpoints.
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?;

        Ok(Self { pool })
    }

    fn queue_item(row: DbQueueItem) -> StoreResult<QueueItem> {
        let status = QueueStatus::parse(&row.status)
            .ok_or_else(|| StoreError::Unexpected(anyhow!("unknown queue status {}", row.status)))?;
        Ok(QueueItem {
            id: row.id,
            message_id: row.message_id,
            topic: row.topic,
            token: row.token,
            provider: row.provider,
            status,
            payload: row.payload,
        })
    }

    fn user(row: DbUser) -> StoreResult<User> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| StoreError::Unexpected(anyhow!("unknown role {}", row.role)))?;
        Ok(User {
            username: row.username,
            password_hash: row.password_hash,
            role,
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err.as_database_error().map(|db| db.kind()),
        Some(sqlx::error::ErrorKind::UniqueViolation)
    )
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(
        err.as_database_error().map(|db| db.kind()),
        Some(sqlx::error::ErrorKind::ForeignKeyViolation)
    )
}

const PENDING_SELECT: &str = r#"
SELECT q.id, q.message_id, m.topic, q.token,
       COALESCE(s.provider, '') AS provider, q.status, m.payload
FROM queue q
JOIN messages m ON m.id = q.message_id
LEFT JOIN subscriptions s ON s.topic = m.topic AND s.token = q.token
WHERE q.status = 'pending'
"#;

#[async_trait]
impl Store for SqliteStore {
    async fn create_topic(&self, name: &str) -> StoreResult<()> {
        let result = sqlx::query("INSERT INTO topics (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::AlreadyExists(format!("topic {name}")))
            }
            Err(err) => Err(StoreError::Unexpected(err.into())),
        }
    }

    /// Validate emptiness and delete in one transaction so a concurrent
    /// publish or subscribe cannot slip between the check and the delete.
    async fn delete_topic(&self, name: &str) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?;

        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM topics WHERE name = ?1")
            .bind(name)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?
            > 0;
        if !exists {
            return Err(StoreError::NotFound(format!("topic {name}")));
        }

        let message_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages WHERE topic = ?1")
                .bind(name)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| StoreError::Unexpected(e.into()))?;
        let subscriber_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscriptions WHERE topic = ?1")
                .bind(name)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| StoreError::Unexpected(e.into()))?;
        if message_count > 0 || subscriber_count > 0 {
            return Err(StoreError::Conflict(format!(
                "cannot delete topic {name}: has {message_count} messages and {subscriber_count} subscribers"
            )));
        }

        sqlx::query("DELETE FROM topics WHERE name = ?1")
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?;
        tx.commit()
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?;
        Ok(())
    }

    async fn topic_exists(&self, name: &str) -> StoreResult<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM topics WHERE name = ?1")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?;
        Ok(count > 0)
    }

    async fn list_topics(&self) -> StoreResult<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT name FROM topics ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))
    }

    async fn add_subscription(&self, sub: &Subscription) -> StoreResult<()> {
        // `(topic, token)` is the primary key; re-subscribing is an
        // idempotent success and keeps the original row.
        sqlx::query(
            r#"INSERT INTO subscriptions (topic, token, provider, username)
               VALUES (?1, ?2, ?3, ?4)
               ON CONFLICT(topic, token) DO NOTHING"#,
        )
        .bind(&sub.topic)
        .bind(&sub.token)
        .bind(&sub.provider)
        .bind(&sub.username)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Unexpected(e.into()))?;
        Ok(())
    }

    async fn remove_subscription(&self, topic: &str, token: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM subscriptions WHERE topic = ?1 AND token = ?2")
            .bind(topic)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?;
        Ok(())
    }

    async fn clear_topic_subscribers(&self, topic: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM subscriptions WHERE topic = ?1")
            .bind(topic)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?;
        Ok(())
    }

    async fn get_subscribers(&self, topic: &str) -> StoreResult<Vec<Subscription>> {
        let rows = sqlx::query_as::<_, DbSubscription>(
            "SELECT topic, token, provider, username FROM subscriptions WHERE topic = ?1 ORDER BY token",
        )
        .bind(topic)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Unexpected(e.into()))?;
        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    async fn get_subscriptions_by_token(&self, token: &str) -> StoreResult<Vec<Subscription>> {
        let rows = sqlx::query_as::<_, DbSubscription>(
            "SELECT topic, token, provider, username FROM subscriptions WHERE token = ?1 ORDER BY topic",
        )
        .bind(token)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Unexpected(e.into()))?;
        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    async fn get_subscriptions_by_user(&self, username: &str) -> StoreResult<Vec<Subscription>> {
        let rows = sqlx::query_as::<_, DbSubscription>(
            "SELECT topic, token, provider, username FROM subscriptions WHERE username = ?1 ORDER BY topic",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Unexpected(e.into()))?;
        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    async fn subscription_count(&self) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscriptions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))
    }

    async fn create_user(&self, user: &User) -> StoreResult<()> {
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, role) VALUES (?1, ?2, ?3)",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .execute(&self.pool)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::AlreadyExists(format!("user {}", user.username)))
            }
            Err(err) => Err(StoreError::Unexpected(err.into())),
        }
    }

    async fn get_user(&self, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, DbUser>(
            "SELECT username, password_hash, role FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unexpected(e.into()))?;
        row.map(Self::user).transpose()
    }

    async fn delete_user(&self, username: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE username = ?1")
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user {username}")));
        }
        Ok(())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, DbUser>(
            "SELECT username, password_hash, role FROM users ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Unexpected(e.into()))?;
        rows.into_iter().map(Self::user).collect()
    }

    async fn update_user_role(&self, username: &str, role: Role) -> StoreResult<()> {
        let result = sqlx::query("UPDATE users SET role = ?1 WHERE username = ?2")
            .bind(role.as_str())
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user {username}")));
        }
        Ok(())
    }

    async fn has_admin_user(&self) -> StoreResult<bool> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = 'admin'")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| StoreError::Unexpected(e.into()))?;
        Ok(count > 0)
    }

    async fn save_message(&self, topic: &str, payload: &[u8]) -> StoreResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO messages (topic, payload, created_at) VALUES (?1, ?2, ?3) RETURNING id",
        )
        .bind(topic)
        .bind(payload)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Unexpected(e.into()))?;
        metrics::counter!("nospam_messages_saved_total").increment(1);
        Ok(id)
    }

    async fn get_recent_messages(&self, topic: &str, limit: i64) -> StoreResult<Vec<Message>> {
        // Last `limit` by recency, then reversed to chronological order so
        // replay delivers oldest first.
        let rows = sqlx::query_as::<_, DbMessage>(
            r#"SELECT id, topic, payload, created_at FROM messages
               WHERE topic = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2"#,
        )
        .bind(topic)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Unexpected(e.into()))?;
        Ok(rows
            .into_iter()
            .rev()
            .map(|row| Message {
                id: row.id,
                topic: row.topic,
                payload: row.payload,
                created_at: row.created_at,
            })
            .collect())
    }

    /// Queue rows go first so no reader can observe an orphaned queue item.
    async fn clear_topic_messages(&self, topic: &str) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?;
        sqlx::query(
            "DELETE FROM queue WHERE message_id IN (SELECT id FROM messages WHERE topic = ?1)",
        )
        .bind(topic)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Unexpected(e.into()))?;
        sqlx::query("DELETE FROM messages WHERE topic = ?1")
            .bind(topic)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?;
        tx.commit()
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?;
        Ok(())
    }

    async fn total_messages(&self) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))
    }

    async fn enqueue_message(&self, message_id: i64, token: &str) -> StoreResult<i64> {
        let result = sqlx::query_scalar::<_, i64>(
            "INSERT INTO queue (message_id, token, status) VALUES (?1, ?2, 'pending') RETURNING id",
        )
        .bind(message_id)
        .bind(token)
        .fetch_one(&self.pool)
        .await;
        match result {
            Ok(id) => Ok(id),
            // Foreign key violation means the referenced message is gone.
            Err(err) if is_foreign_key_violation(&err) => {
                Err(StoreError::NotFound(format!("message {message_id}")))
            }
            Err(err) => Err(StoreError::Unexpected(err.into())),
        }
    }

    async fn get_all_pending(&self) -> StoreResult<Vec<QueueItem>> {
        let query = format!("{PENDING_SELECT} ORDER BY m.created_at ASC, m.id ASC, q.id ASC");
        let rows = sqlx::query_as::<_, DbQueueItem>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?;
        rows.into_iter().map(Self::queue_item).collect()
    }

    async fn get_pending_by_topic(&self, topic: &str) -> StoreResult<Vec<QueueItem>> {
        let query =
            format!("{PENDING_SELECT} AND m.topic = ?1 ORDER BY m.created_at ASC, m.id ASC, q.id ASC");
        let rows = sqlx::query_as::<_, DbQueueItem>(&query)
            .bind(topic)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?;
        rows.into_iter().map(Self::queue_item).collect()
    }

    async fn get_pending_by_token(&self, token: &str) -> StoreResult<Vec<QueueItem>> {
        let query =
            format!("{PENDING_SELECT} AND q.token = ?1 ORDER BY m.created_at ASC, m.id ASC, q.id ASC");
        let rows = sqlx::query_as::<_, DbQueueItem>(&query)
            .bind(token)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?;
        rows.into_iter().map(Self::queue_item).collect()
    }

    async fn mark_delivered(&self, queue_id: i64) -> StoreResult<()> {
        sqlx::query("UPDATE queue SET status = 'delivered' WHERE id = ?1")
            .bind(queue_id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?;
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unexpected(e.into()))?;
        Ok(())
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn scratch_store() -> (TempDir, SqliteStore) {
        let dir = TempDir::new().expect("tempdir");
        let store = SqliteStore::connect(dir.path().join("broker.db"))
            .await
            .expect("connect");
        (dir, store)
    }

    fn sub(topic: &str, token: &str, provider: &str) -> Subscription {
        Subscription {
            topic: topic.to_string(),
            token: token.to_string(),
            provider: provider.to_string(),
            username: "tester".to_string(),
        }
    }

    #[tokio::test]
    async fn topic_conflicts_and_empty_delete() {
        let (_dir, store) = scratch_store().await;
        store.create_topic("orders").await.expect("create");
        let err = store.create_topic("orders").await.expect_err("duplicate");
        assert!(matches!(err, StoreError::AlreadyExists(_)));

        store.save_message("orders", b"{}").await.expect("message");
        let err = store.delete_topic("orders").await.expect_err("non-empty");
        match err {
            StoreError::Conflict(msg) => assert!(msg.contains("has 1 messages")),
            other => panic!("expected conflict, got {other:?}"),
        }

        store.clear_topic_messages("orders").await.expect("clear");
        store.delete_topic("orders").await.expect("delete");
        assert!(!store.topic_exists("orders").await.expect("exists"));
    }

    #[tokio::test]
    async fn fan_out_join_and_delivery() {
        let (_dir, store) = scratch_store().await;
        store.create_topic("orders").await.expect("create");
        store
            .add_subscription(&sub("orders", "d-1", "mock"))
            .await
            .expect("subscribe");
        store
            .add_subscription(&sub("orders", "d-1", "mock"))
            .await
            .expect("resubscribe");
        assert_eq!(store.subscription_count().await.expect("count"), 1);

        let msg_id = store.save_message("orders", b"{\"m\":\"hi\"}").await.expect("save");
        let queue_id = store.enqueue_message(msg_id, "d-1").await.expect("enqueue");

        let pending = store.get_all_pending().await.expect("pending");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].provider, "mock");
        assert_eq!(pending[0].payload, b"{\"m\":\"hi\"}");
        assert_eq!(pending[0].topic, "orders");

        store.mark_delivered(queue_id).await.expect("deliver");
        store.mark_delivered(queue_id).await.expect("idempotent");
        assert!(store.get_all_pending().await.expect("pending").is_empty());
        assert!(
            store
                .get_pending_by_token("d-1")
                .await
                .expect("by token")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn subscription_lookups_by_token_and_user() {
        let (_dir, store) = scratch_store().await;
        store
            .add_subscription(&sub("orders", "d-1", "mock"))
            .await
            .expect("subscribe");
        store
            .add_subscription(&sub("alerts", "d-1", "webhook"))
            .await
            .expect("subscribe");

        let by_token = store
            .get_subscriptions_by_token("d-1")
            .await
            .expect("by token");
        assert_eq!(by_token.len(), 2);
        assert_eq!(by_token[0].topic, "alerts");

        let by_user = store
            .get_subscriptions_by_user("tester")
            .await
            .expect("by user");
        assert_eq!(by_user.len(), 2);
    }

    #[tokio::test]
    async fn enqueue_rejects_missing_message() {
        let (_dir, store) = scratch_store().await;
        let err = store.enqueue_message(999, "d-1").await.expect_err("missing");
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn recent_messages_window_and_clear_cascade() {
        let (_dir, store) = scratch_store().await;
        store.create_topic("orders").await.expect("create");
        store.create_topic("other").await.expect("create");
        for i in 0..4 {
            let body = format!("{{\"n\":{i}}}");
            store
                .save_message("orders", body.as_bytes())
                .await
                .expect("save");
        }
        let kept = store.save_message("other", b"{}").await.expect("save");
        store.enqueue_message(kept, "d-9").await.expect("enqueue");

        let recent = store.get_recent_messages("orders", 2).await.expect("recent");
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].payload, b"{\"n\":2}");
        assert_eq!(recent[1].payload, b"{\"n\":3}");

        store.clear_topic_messages("orders").await.expect("clear");
        assert_eq!(store.total_messages().await.expect("total"), 1);
        let pending = store.get_all_pending().await.expect("pending");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].message_id, kept);
    }

    #[tokio::test]
    async fn user_round_trip() {
        let (_dir, store) = scratch_store().await;
        let user = User {
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
            role: Role::Publisher,
        };
        store.create_user(&user).await.expect("create");
        let err = store.create_user(&user).await.expect_err("duplicate");
        assert!(matches!(err, StoreError::AlreadyExists(_)));

        let loaded = store.get_user("alice").await.expect("get").expect("some");
        assert_eq!(loaded, user);

        assert!(!store.has_admin_user().await.expect("admin"));
        store
            .update_user_role("alice", Role::Admin)
            .await
            .expect("promote");
        assert!(store.has_admin_user().await.expect("admin"));

        store.delete_user("alice").await.expect("delete");
        let err = store.delete_user("alice").await.expect_err("gone");
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
