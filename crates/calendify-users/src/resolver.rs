use std::collections::HashMap;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::db::init_db;
use crate::error::{Result, UserError};
use crate::identity::{add_identity, create_user, find_user_by_identity, get_user};
use crate::tokens::{find_user_by_token, issue_token, list_tokens_for_user};
use crate::types::{ApiToken, IssuedToken, User};

/// Maximum number of (provider, subject) → user_id pairs kept in memory.
/// When full, the oldest half is dropped.
const CACHE_MAX: usize = 256;

/// Result of resolving a (provider, subject) pair.
#[derive(Debug)]
pub enum ResolvedUser {
    Known(User),
    /// Auto-created on first contact.
    NewlyCreated(User),
}

impl ResolvedUser {
    pub fn user(&self) -> &User {
        match self {
            ResolvedUser::Known(u) | ResolvedUser::NewlyCreated(u) => u,
        }
    }

    pub fn into_user(self) -> User {
        match self {
            ResolvedUser::Known(u) | ResolvedUser::NewlyCreated(u) => u,
        }
    }
}

/// Turns credentials into users.
///
/// Every authenticated request goes through here, so the (provider, subject)
/// → user_id mapping is cached to skip the identity join for known users.
pub struct UserResolver {
    db: Mutex<Connection>,
    cache: Mutex<HashMap<(String, String), String>>,
    /// Insertion order for eviction, parallel to `cache`.
    cache_order: Mutex<Vec<(String, String)>>,
}

impl UserResolver {
    /// Wrap an open connection, creating the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
            cache: Mutex::new(HashMap::new()),
            cache_order: Mutex::new(Vec::new()),
        })
    }

    /// Resolve an external identity to a user, creating the user on first
    /// contact. The display name of a new user is the subject.
    pub fn resolve(&self, provider: &str, subject: &str) -> Result<ResolvedUser> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(UserError::Validation("identity subject is empty".to_string()));
        }
        let key = (provider.to_string(), subject.to_string());

        if let Some(user_id) = self.cache_lookup(&key) {
            debug!(provider, subject, user_id, "cache hit");
            let conn = self.db.lock().unwrap();
            if let Some(user) = get_user(&conn, &user_id)? {
                return Ok(ResolvedUser::Known(user));
            }
            // Deleted underneath us; fall through to the DB.
            self.cache_remove(&key);
        }

        let conn = self.db.lock().unwrap();
        if let Some(user) = find_user_by_identity(&conn, provider, subject)? {
            self.cache_insert(key, user.id.clone());
            return Ok(ResolvedUser::Known(user));
        }

        info!(provider, subject, "new identity; creating user");
        let user = create_user(&conn, subject)?;
        add_identity(&conn, &user.id, provider, subject)?;
        self.cache_insert(key, user.id.clone());
        Ok(ResolvedUser::NewlyCreated(user))
    }

    /// Create a user with no linked identity (admin CLI path).
    pub fn create_user(&self, display_name: &str) -> Result<User> {
        let conn = self.db.lock().unwrap();
        let user = create_user(&conn, display_name)?;
        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Issue an API token for an existing user.
    pub fn issue_token(&self, user_id: &str, label: Option<&str>) -> Result<IssuedToken> {
        let conn = self.db.lock().unwrap();
        if get_user(&conn, user_id)?.is_none() {
            return Err(UserError::NotFound(user_id.to_string()));
        }
        let issued = issue_token(&conn, user_id, label)?;
        info!(user_id, token_id = %issued.record.id, "api token issued");
        Ok(issued)
    }

    /// Map a bearer token to its user, or `InvalidToken`.
    pub fn authenticate_token(&self, token: &str) -> Result<User> {
        let conn = self.db.lock().unwrap();
        match find_user_by_token(&conn, token.trim())? {
            Some(user) => Ok(user),
            None => {
                warn!("rejected unknown api token");
                Err(UserError::InvalidToken)
            }
        }
    }

    pub fn list_tokens(&self, user_id: &str) -> Result<Vec<ApiToken>> {
        let conn = self.db.lock().unwrap();
        list_tokens_for_user(&conn, user_id)
    }

    // ── cache helpers ─────────────────────────────────────────────────────────

    fn cache_lookup(&self, key: &(String, String)) -> Option<String> {
        self.cache.lock().unwrap().get(key).cloned()
    }

    fn cache_remove(&self, key: &(String, String)) {
        let mut cache = self.cache.lock().unwrap();
        let mut order = self.cache_order.lock().unwrap();
        cache.remove(key);
        order.retain(|k| k != key);
    }

    fn cache_insert(&self, key: (String, String), user_id: String) {
        let mut cache = self.cache.lock().unwrap();
        let mut order = self.cache_order.lock().unwrap();

        if let std::collections::hash_map::Entry::Occupied(mut e) = cache.entry(key.clone()) {
            e.insert(user_id);
            return;
        }

        if cache.len() >= CACHE_MAX {
            let evict_count = CACHE_MAX / 2;
            for k in order.drain(..evict_count) {
                cache.remove(&k);
            }
        }

        order.push(key.clone());
        cache.insert(key, user_id);
    }

    #[cfg(test)]
    fn cache_len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }
}
