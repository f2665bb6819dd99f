//! In-memory fakes injected through `Extension` in handler tests.

use crate::provider::{Error, Identity, IdentityProvider};
use crate::store::{User, UserStore, UserSummary};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Store fake backed by a `Mutex<Vec<User>>`, counts calls so tests can
/// assert that validation failures never reach the store.
pub struct MemoryStore {
    rows: Mutex<Vec<User>>,
    next_id: AtomicI64,
    pub find_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub upsert_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            find_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            upsert_calls: AtomicUsize::new(0),
        }
    }

    pub fn rows(&self) -> Vec<User> {
        self.rows.lock().unwrap().clone()
    }

    fn insert(&self, email: &str, name: Option<&str>, password_hash: &str) -> User {
        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            email: email.to_string(),
            name: name.map(String::from),
            password: password_hash.to_string(),
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(user.clone());
        user
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn create(
        &self,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|user| user.email == email)
        {
            return Err(sqlx::Error::Protocol(
                "duplicate key value violates unique constraint".into(),
            ));
        }

        Ok(self.insert(email, name, password_hash))
    }

    async fn upsert(
        &self,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);

        {
            let mut rows = self.rows.lock().unwrap();
            if let Some(user) = rows.iter_mut().find(|user| user.email == email) {
                user.name = name.map(String::from);
                user.password = password_hash.to_string();
                return Ok(user.clone());
            }
        }

        Ok(self.insert(email, name, password_hash))
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<UserSummary>, sqlx::Error> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.id.cmp(&a.id));

        Ok(rows
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|user| UserSummary {
                id: user.id,
                email: user.email,
                name: user.name,
                created_at: user.created_at,
            })
            .collect())
    }
}

struct ProviderAccount {
    id: String,
    password: String,
    name: Option<String>,
}

/// Provider fake with scripted accounts and call counters.
pub struct FakeProvider {
    accounts: Mutex<HashMap<String, ProviderAccount>>,
    next_id: AtomicUsize,
    /// Administrative key configured, enables metadata sync.
    pub admin: bool,
    /// Fail the privileged metadata call even with the key configured.
    pub fail_metadata: bool,
    /// Report success with no identity object.
    pub missing_identity: bool,
    pub sign_up_calls: AtomicUsize,
    pub sign_in_calls: AtomicUsize,
    pub metadata_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(1),
            admin: false,
            fail_metadata: false,
            missing_identity: false,
            sign_up_calls: AtomicUsize::new(0),
            sign_in_calls: AtomicUsize::new(0),
            metadata_calls: AtomicUsize::new(0),
        }
    }

    /// Seed an account that exists provider-side, as if created through
    /// another channel.
    pub fn seed(&self, email: &str, password: &str, name: Option<&str>) -> String {
        let id = format!("remote-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            ProviderAccount {
                id: id.clone(),
                password: password.to_string(),
                name: name.map(String::from),
            },
        );
        id
    }

    /// Drop all provider-side accounts, as if the remote state was reset.
    pub fn clear(&self) {
        self.accounts.lock().unwrap().clear();
    }

    fn identity_for(account: &ProviderAccount, email: &str) -> Identity {
        Identity {
            id: account.id.clone(),
            email: email.to_string(),
            name: account.name.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<Option<Identity>, Error> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);

        if self.missing_identity {
            return Ok(None);
        }

        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(Error::Rejected("User already registered".to_string()));
        }

        let id = format!("remote-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let account = ProviderAccount {
            id,
            password: password.to_string(),
            name: name.map(String::from),
        };
        let identity = Self::identity_for(&account, email);
        accounts.insert(email.to_string(), account);

        Ok(Some(identity))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<Identity>, Error> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);

        if self.missing_identity {
            return Ok(None);
        }

        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            Some(account) if account.password == password => {
                Ok(Some(Self::identity_for(account, email)))
            }
            _ => Err(Error::Rejected("Invalid login credentials".to_string())),
        }
    }

    async fn update_user_metadata(&self, id: &str, name: &str) -> Result<(), Error> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);

        if !self.admin {
            return Err(Error::AdminKeyMissing);
        }

        if self.fail_metadata {
            return Err(Error::Rejected("metadata update failed".to_string()));
        }

        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts.values_mut().find(|account| account.id == id) {
            account.name = Some(name.to_string());
        }

        Ok(())
    }

    fn can_update_metadata(&self) -> bool {
        self.admin
    }
}
