// SQLite-backed contact store.
//
// Tables:
// - users: platform accounts. Rows are written by the account service; this
//   store only reads them to validate and display contacts.
// - contacts: one row per (owner, saved user) pair

use crate::core::contacts::{
    Contact, ContactCategory, ContactEntry, ContactError, ContactStore, ContactUpdate,
    ContactUser, LinkedStartup, NewContact,
};
use crate::infra::database::{decode_timestamp, encode_timestamp, Database};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use std::sync::Arc;

pub struct SqliteContactStore {
    db: Arc<Database>,
}

fn storage_error(e: impl ToString) -> ContactError {
    ContactError::StorageError(e.to_string())
}

impl SqliteContactStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn pool(&self) -> Result<Pool<Sqlite>, ContactError> {
        self.db.pool().await.map_err(storage_error)
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), ContactError> {
        let pool = self.pool().await?;

        let result = sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                image TEXT,
                roles TEXT NOT NULL DEFAULT '[]'
            );
            "#,
        )
        .execute(&pool)
        .await;
        self.db.observe(result).await.map_err(storage_error)?;

        let result = sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS contacts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                contact_user_id INTEGER NOT NULL,
                startup_id INTEGER,
                note TEXT NOT NULL DEFAULT '',
                category TEXT NOT NULL DEFAULT 'other',
                created_at TEXT NOT NULL,
                UNIQUE (user_id, contact_user_id)
            );
            CREATE INDEX IF NOT EXISTS idx_contacts_user_created
                ON contacts(user_id, created_at DESC);
            "#,
        )
        .execute(&pool)
        .await;
        self.db.observe(result).await.map_err(storage_error)?;

        Ok(())
    }

    fn row_to_contact(row: &SqliteRow) -> Result<Contact, ContactError> {
        let category: String = row.get("category");
        let created_at: String = row.get("created_at");
        Ok(Contact {
            id: row.get("id"),
            user_id: row.get("user_id"),
            contact_user_id: row.get("contact_user_id"),
            startup_id: row.get("startup_id"),
            note: row.get("note"),
            category: category.parse().unwrap_or_default(),
            created_at: decode_timestamp(&created_at).map_err(storage_error)?,
        })
    }

    fn row_to_entry(row: &SqliteRow) -> Result<ContactEntry, ContactError> {
        let contact_user = match row.get::<Option<i64>, _>("u_id") {
            Some(id) => {
                let roles: String = row.get("u_roles");
                Some(ContactUser {
                    id,
                    name: row.get("u_name"),
                    email: row.get("u_email"),
                    image: row.get::<Option<String>, _>("u_image").unwrap_or_default(),
                    roles: serde_json::from_str(&roles).unwrap_or_default(),
                })
            }
            None => None,
        };

        let startup = row
            .get::<Option<i64>, _>("s_id")
            .map(|id| LinkedStartup {
                id,
                name: row
                    .get::<Option<String>, _>("s_name")
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| "Unknown".to_string()),
                logo: row.get::<Option<String>, _>("s_logo").unwrap_or_default(),
            });

        let category: String = row.get("category");
        let created_at: String = row.get("created_at");
        Ok(ContactEntry {
            id: row.get("id"),
            contact_user,
            startup,
            note: row.get("note"),
            category: category.parse::<ContactCategory>().unwrap_or_default(),
            created_at: decode_timestamp(&created_at).map_err(storage_error)?,
        })
    }

    async fn get(&self, id: i64) -> Result<Option<Contact>, ContactError> {
        let pool = self.pool().await?;
        let result = sqlx::query("SELECT * FROM contacts WHERE id = ?")
            .bind(id)
            .fetch_optional(&pool)
            .await;
        let row = self.db.observe(result).await.map_err(storage_error)?;
        row.as_ref().map(Self::row_to_contact).transpose()
    }
}

#[async_trait]
impl ContactStore for SqliteContactStore {
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<ContactEntry>, ContactError> {
        let pool = self.pool().await?;
        let result = sqlx::query(
            r#"
            SELECT c.id, c.note, c.category, c.created_at,
                   u.id AS u_id, u.name AS u_name, u.email AS u_email,
                   u.image AS u_image, u.roles AS u_roles,
                   s.id AS s_id, s.name AS s_name, s.logo AS s_logo
            FROM contacts c
            LEFT JOIN users u ON u.id = c.contact_user_id
            LEFT JOIN startups s ON s.id = c.startup_id
            WHERE c.user_id = ?
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&pool)
        .await;
        let rows = self.db.observe(result).await.map_err(storage_error)?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    async fn user_exists(&self, user_id: i64) -> Result<bool, ContactError> {
        let pool = self.pool().await?;
        let result = sqlx::query("SELECT 1 FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&pool)
            .await;
        let row = self.db.observe(result).await.map_err(storage_error)?;
        Ok(row.is_some())
    }

    async fn find_pair(
        &self,
        user_id: i64,
        contact_user_id: i64,
    ) -> Result<Option<Contact>, ContactError> {
        let pool = self.pool().await?;
        let result =
            sqlx::query("SELECT * FROM contacts WHERE user_id = ? AND contact_user_id = ?")
                .bind(user_id)
                .bind(contact_user_id)
                .fetch_optional(&pool)
                .await;
        let row = self.db.observe(result).await.map_err(storage_error)?;
        row.as_ref().map(Self::row_to_contact).transpose()
    }

    async fn insert(&self, new: NewContact) -> Result<Contact, ContactError> {
        let pool = self.pool().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO contacts (user_id, contact_user_id, startup_id, note, category, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.user_id)
        .bind(new.contact_user_id)
        .bind(new.startup_id)
        .bind(&new.note)
        .bind(new.category.as_str())
        .bind(encode_timestamp(new.created_at))
        .execute(&pool)
        .await;

        let done = match self.db.observe(result).await {
            Ok(done) => done,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(ContactError::AlreadyExists)
            }
            Err(e) => return Err(storage_error(e)),
        };

        let id = done.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| storage_error(format!("contact {} vanished after insert", id)))
    }

    async fn delete_owned(&self, id: i64, user_id: i64) -> Result<bool, ContactError> {
        let pool = self.pool().await?;
        let result = sqlx::query("DELETE FROM contacts WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&pool)
            .await;
        let done = self.db.observe(result).await.map_err(storage_error)?;
        Ok(done.rows_affected() > 0)
    }

    async fn update_owned(
        &self,
        id: i64,
        user_id: i64,
        update: ContactUpdate,
    ) -> Result<Option<Contact>, ContactError> {
        let pool = self.pool().await?;
        let result = sqlx::query(
            r#"
            UPDATE contacts
            SET note = COALESCE(?, note),
                category = COALESCE(?, category)
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(update.note)
        .bind(update.category.map(|c| c.as_str()))
        .bind(id)
        .bind(user_id)
        .execute(&pool)
        .await;
        let done = self.db.observe(result).await.map_err(storage_error)?;

        if done.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::contacts::{AddContact, ContactService};
    use crate::infra::startups::sqlite_startup_store::tests::{insert_startup, temp_store};
    use chrono::{Duration, Utc};

    async fn insert_user(db: &Database, name: &str) -> i64 {
        let pool = db.pool().await.unwrap();
        sqlx::query("INSERT INTO users (name, email, image, roles) VALUES (?, ?, NULL, ?)")
            .bind(name)
            .bind(format!("{}@example.com", name.to_lowercase()))
            .bind(r#"["investor"]"#)
            .execute(&pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    async fn setup() -> (tempfile::TempDir, Arc<Database>, SqliteContactStore) {
        let (dir, db, _startups) = temp_store().await;
        let store = SqliteContactStore::new(Arc::clone(&db));
        store.migrate().await.unwrap();
        (dir, db, store)
    }

    #[tokio::test]
    async fn test_list_joins_user_and_startup() {
        let (_dir, db, store) = setup().await;
        let startups = crate::infra::startups::SqliteStartupStore::new(Arc::clone(&db));
        let startup_id = insert_startup(&startups, Utc::now(), 90).await;
        let alice = insert_user(&db, "Alice").await;
        let bob = insert_user(&db, "Bob").await;
        let carol = insert_user(&db, "Carol").await;

        let now = Utc::now();
        store
            .insert(NewContact {
                user_id: alice,
                contact_user_id: bob,
                startup_id: Some(startup_id),
                note: "Met at demo day".to_string(),
                category: ContactCategory::Entrepreneur,
                created_at: now - Duration::days(1),
            })
            .await
            .unwrap();
        store
            .insert(NewContact {
                user_id: alice,
                contact_user_id: carol,
                startup_id: None,
                note: String::new(),
                category: ContactCategory::Other,
                created_at: now,
            })
            .await
            .unwrap();

        let entries = store.list_for_user(alice).await.unwrap();
        assert_eq!(entries.len(), 2);

        // Newest first.
        let newest = &entries[0];
        assert_eq!(newest.contact_user.as_ref().unwrap().name, "Carol");
        assert!(newest.startup.is_none());

        let older = &entries[1];
        let user = older.contact_user.as_ref().unwrap();
        assert_eq!(user.email, "bob@example.com");
        assert_eq!(user.image, "");
        assert_eq!(user.roles, vec!["investor".to_string()]);
        let startup = older.startup.as_ref().unwrap();
        assert_eq!(startup.name, "Acme");
        assert_eq!(startup.logo, "acme.png");
        assert_eq!(older.category, ContactCategory::Entrepreneur);

        assert!(store.list_for_user(bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unique_pair_maps_to_already_exists() {
        let (_dir, db, store) = setup().await;
        let alice = insert_user(&db, "Alice").await;
        let bob = insert_user(&db, "Bob").await;

        let new = NewContact {
            user_id: alice,
            contact_user_id: bob,
            startup_id: None,
            note: String::new(),
            category: ContactCategory::Other,
            created_at: Utc::now(),
        };
        store.insert(new.clone()).await.unwrap();
        let err = store.insert(new).await.unwrap_err();
        assert!(matches!(err, ContactError::AlreadyExists));
    }

    #[tokio::test]
    async fn test_service_flow_against_sqlite() {
        let (_dir, db, store) = setup().await;
        let alice = insert_user(&db, "Alice").await;
        let bob = insert_user(&db, "Bob").await;
        let service = ContactService::new(store);

        let contact = service
            .add(
                alice,
                AddContact {
                    contact_user_id: bob,
                    note: Some("Angel".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = service
            .update(
                alice,
                contact.id,
                ContactUpdate {
                    note: None,
                    category: Some(ContactCategory::Investor),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.note, "Angel");
        assert_eq!(updated.category, ContactCategory::Investor);

        assert!(matches!(
            service.remove(bob, contact.id).await.unwrap_err(),
            ContactError::NotFound
        ));
        service.remove(alice, contact.id).await.unwrap();
        assert!(matches!(
            service.remove(alice, contact.id).await.unwrap_err(),
            ContactError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_missing_user_is_reported() {
        let (_dir, db, store) = setup().await;
        let alice = insert_user(&db, "Alice").await;

        assert!(store.user_exists(alice).await.unwrap());
        assert!(!store.user_exists(alice + 50).await.unwrap());
    }
}
