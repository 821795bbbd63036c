// Contacts - a user's personal address book of other platform users.
//
// Following the same pattern as the other core modules: models, errors, a
// storage trait, and a service with the business rules. No HTTP here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Longest note a user can attach to a contact.
pub const MAX_NOTE_LEN: usize = 500;

// ============================================================================
// DOMAIN MODELS
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactCategory {
    Investor,
    Entrepreneur,
    Partner,
    Advisor,
    #[default]
    Other,
}

impl ContactCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactCategory::Investor => "investor",
            ContactCategory::Entrepreneur => "entrepreneur",
            ContactCategory::Partner => "partner",
            ContactCategory::Advisor => "advisor",
            ContactCategory::Other => "other",
        }
    }
}

impl FromStr for ContactCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "investor" => Ok(ContactCategory::Investor),
            "entrepreneur" => Ok(ContactCategory::Entrepreneur),
            "partner" => Ok(ContactCategory::Partner),
            "advisor" => Ok(ContactCategory::Advisor),
            "other" => Ok(ContactCategory::Other),
            other => Err(format!("unknown contact category '{}'", other)),
        }
    }
}

/// A stored contact.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i64,
    pub user_id: i64,
    pub contact_user_id: i64,
    pub startup_id: Option<i64>,
    pub note: String,
    pub category: ContactCategory,
    pub created_at: DateTime<Utc>,
}

/// Public profile of the saved user, as shown in the contact list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub image: String,
    pub roles: Vec<String>,
}

/// The startup that prompted the contact, if any.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedStartup {
    pub id: i64,
    pub name: String,
    pub logo: String,
}

/// A contact joined with the user and startup it points at. Either side may
/// be gone (deleted account, removed listing), hence the options.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactEntry {
    pub id: i64,
    pub contact_user: Option<ContactUser>,
    pub startup: Option<LinkedStartup>,
    pub note: String,
    pub category: ContactCategory,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewContact {
    pub user_id: i64,
    pub contact_user_id: i64,
    pub startup_id: Option<i64>,
    pub note: String,
    pub category: ContactCategory,
    pub created_at: DateTime<Utc>,
}

/// Partial update; `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct ContactUpdate {
    pub note: Option<String>,
    pub category: Option<ContactCategory>,
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Contact not found")]
    NotFound,

    #[error("Contact already saved")]
    AlreadyExists,
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait ContactStore: Send + Sync {
    /// All contacts of `user_id`, newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<ContactEntry>, ContactError>;

    async fn user_exists(&self, user_id: i64) -> Result<bool, ContactError>;

    async fn find_pair(
        &self,
        user_id: i64,
        contact_user_id: i64,
    ) -> Result<Option<Contact>, ContactError>;

    /// Insert a contact. Returns `AlreadyExists` if the pair is taken.
    async fn insert(&self, contact: NewContact) -> Result<Contact, ContactError>;

    /// Delete a contact owned by `user_id`. Returns false if there was none.
    async fn delete_owned(&self, id: i64, user_id: i64) -> Result<bool, ContactError>;

    /// Update a contact owned by `user_id`. Returns `None` if there was none.
    async fn update_owned(
        &self,
        id: i64,
        user_id: i64,
        update: ContactUpdate,
    ) -> Result<Option<Contact>, ContactError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Request to save someone as a contact.
#[derive(Debug, Clone, Default)]
pub struct AddContact {
    pub contact_user_id: i64,
    pub startup_id: Option<i64>,
    pub note: Option<String>,
    pub category: Option<ContactCategory>,
}

pub struct ContactService<S: ContactStore> {
    store: S,
}

impl<S: ContactStore> ContactService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<ContactEntry>, ContactError> {
        self.store.list_for_user(user_id).await
    }

    pub async fn add(&self, user_id: i64, request: AddContact) -> Result<Contact, ContactError> {
        if request.contact_user_id == user_id {
            return Err(ContactError::InvalidInput(
                "You cannot add yourself as a contact".to_string(),
            ));
        }
        let note = request.note.unwrap_or_default();
        validate_note(&note)?;

        if !self.store.user_exists(request.contact_user_id).await? {
            return Err(ContactError::UserNotFound);
        }
        if self
            .store
            .find_pair(user_id, request.contact_user_id)
            .await?
            .is_some()
        {
            return Err(ContactError::AlreadyExists);
        }

        let contact = self
            .store
            .insert(NewContact {
                user_id,
                contact_user_id: request.contact_user_id,
                startup_id: request.startup_id,
                note,
                category: request.category.unwrap_or_default(),
                created_at: Utc::now(),
            })
            .await?;

        tracing::debug!(user_id, contact_id = contact.id, "Contact saved");
        Ok(contact)
    }

    pub async fn remove(&self, user_id: i64, contact_id: i64) -> Result<(), ContactError> {
        if self.store.delete_owned(contact_id, user_id).await? {
            Ok(())
        } else {
            Err(ContactError::NotFound)
        }
    }

    pub async fn update(
        &self,
        user_id: i64,
        contact_id: i64,
        update: ContactUpdate,
    ) -> Result<Contact, ContactError> {
        if let Some(note) = &update.note {
            validate_note(note)?;
        }
        self.store
            .update_owned(contact_id, user_id, update)
            .await?
            .ok_or(ContactError::NotFound)
    }
}

fn validate_note(note: &str) -> Result<(), ContactError> {
    if note.chars().count() > MAX_NOTE_LEN {
        return Err(ContactError::InvalidInput(format!(
            "Note cannot exceed {} characters",
            MAX_NOTE_LEN
        )));
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dashmap::{DashMap, DashSet};
    use std::sync::atomic::{AtomicI64, Ordering};

    struct MockContactStore {
        users: DashSet<i64>,
        contacts: DashMap<i64, Contact>,
        next_id: AtomicI64,
    }

    impl MockContactStore {
        fn with_users(users: &[i64]) -> Self {
            let set = DashSet::new();
            for id in users {
                set.insert(*id);
            }
            Self {
                users: set,
                contacts: DashMap::new(),
                next_id: AtomicI64::new(1),
            }
        }
    }

    #[async_trait]
    impl ContactStore for MockContactStore {
        async fn list_for_user(&self, user_id: i64) -> Result<Vec<ContactEntry>, ContactError> {
            let mut entries: Vec<ContactEntry> = self
                .contacts
                .iter()
                .filter(|c| c.user_id == user_id)
                .map(|c| ContactEntry {
                    id: c.id,
                    contact_user: None,
                    startup: None,
                    note: c.note.clone(),
                    category: c.category,
                    created_at: c.created_at,
                })
                .collect();
            entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(entries)
        }

        async fn user_exists(&self, user_id: i64) -> Result<bool, ContactError> {
            Ok(self.users.contains(&user_id))
        }

        async fn find_pair(
            &self,
            user_id: i64,
            contact_user_id: i64,
        ) -> Result<Option<Contact>, ContactError> {
            Ok(self
                .contacts
                .iter()
                .find(|c| c.user_id == user_id && c.contact_user_id == contact_user_id)
                .map(|c| c.clone()))
        }

        async fn insert(&self, new: NewContact) -> Result<Contact, ContactError> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let contact = Contact {
                id,
                user_id: new.user_id,
                contact_user_id: new.contact_user_id,
                startup_id: new.startup_id,
                note: new.note,
                category: new.category,
                created_at: new.created_at,
            };
            self.contacts.insert(id, contact.clone());
            Ok(contact)
        }

        async fn delete_owned(&self, id: i64, user_id: i64) -> Result<bool, ContactError> {
            Ok(self
                .contacts
                .remove_if(&id, |_, c| c.user_id == user_id)
                .is_some())
        }

        async fn update_owned(
            &self,
            id: i64,
            user_id: i64,
            update: ContactUpdate,
        ) -> Result<Option<Contact>, ContactError> {
            match self.contacts.get_mut(&id) {
                Some(mut contact) if contact.user_id == user_id => {
                    if let Some(note) = update.note {
                        contact.note = note;
                    }
                    if let Some(category) = update.category {
                        contact.category = category;
                    }
                    Ok(Some(contact.clone()))
                }
                _ => Ok(None),
            }
        }
    }

    fn add(contact_user_id: i64) -> AddContact {
        AddContact {
            contact_user_id,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_defaults_note_and_category() {
        let service = ContactService::new(MockContactStore::with_users(&[1, 2]));

        let contact = service.add(1, add(2)).await.unwrap();
        assert_eq!(contact.note, "");
        assert_eq!(contact.category, ContactCategory::Other);
        assert_eq!(service.list(1).await.unwrap().len(), 1);
        assert!(service.list(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cannot_add_self() {
        let service = ContactService::new(MockContactStore::with_users(&[1]));

        let err = service.add(1, add(1)).await.unwrap_err();
        assert!(matches!(err, ContactError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_unknown_user_is_rejected() {
        let service = ContactService::new(MockContactStore::with_users(&[1]));

        let err = service.add(1, add(99)).await.unwrap_err();
        assert!(matches!(err, ContactError::UserNotFound));
    }

    #[tokio::test]
    async fn test_duplicate_contact_conflicts() {
        let service = ContactService::new(MockContactStore::with_users(&[1, 2]));

        service.add(1, add(2)).await.unwrap();
        let err = service.add(1, add(2)).await.unwrap_err();
        assert!(matches!(err, ContactError::AlreadyExists));

        // The other direction is a different contact.
        service.add(2, add(1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_note_length_is_capped() {
        let service = ContactService::new(MockContactStore::with_users(&[1, 2]));

        let mut request = add(2);
        request.note = Some("x".repeat(MAX_NOTE_LEN + 1));
        let err = service.add(1, request).await.unwrap_err();
        assert!(matches!(err, ContactError::InvalidInput(_)));

        let mut request = add(2);
        request.note = Some("x".repeat(MAX_NOTE_LEN));
        assert!(service.add(1, request).await.is_ok());
    }

    #[tokio::test]
    async fn test_remove_and_update_require_ownership() {
        let service = ContactService::new(MockContactStore::with_users(&[1, 2, 3]));
        let contact = service.add(1, add(2)).await.unwrap();

        let err = service.remove(3, contact.id).await.unwrap_err();
        assert!(matches!(err, ContactError::NotFound));

        let err = service
            .update(3, contact.id, ContactUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::NotFound));

        let updated = service
            .update(
                1,
                contact.id,
                ContactUpdate {
                    note: None,
                    category: Some(ContactCategory::Investor),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.category, ContactCategory::Investor);
        assert_eq!(updated.note, "");

        service.remove(1, contact.id).await.unwrap();
        assert!(service.list(1).await.unwrap().is_empty());
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(
            "advisor".parse::<ContactCategory>().unwrap(),
            ContactCategory::Advisor
        );
        assert!("friend".parse::<ContactCategory>().is_err());
        assert_eq!(ContactCategory::default().as_str(), "other");
    }
}
