use crate::document::UserId;
use crate::error::{AuthError, StoreError};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    Admin,
    #[default]
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_login_date: OffsetDateTime,
    pub is_active: bool,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Account registration and password checks.
pub trait UserStore: Send + Sync {
    fn register(&self, new_user: NewUser) -> Result<User, AuthError>;
    /// The active user with these credentials, if any. Updates the last login time.
    fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>, AuthError>;
    /// False when the user does not exist or `current` is wrong.
    fn change_password(&self, id: UserId, current: &str, new: &str) -> Result<bool, AuthError>;
    fn find_by_id(&self, id: UserId) -> Result<Option<User>, AuthError>;
    fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;

    fn is_username_available(&self, username: &str) -> Result<bool, AuthError> {
        Ok(self.find_by_username(username)?.is_none())
    }
    fn is_email_available(&self, email: &str) -> Result<bool, AuthError>;
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is malformed");
            false
        }
    }
}

/// Users keyed by id, with secondary username and email indexes.
pub struct SledUserStore {
    db: sled::Db,
    users: sled::Tree,
    usernames: sled::Tree,
    emails: sled::Tree,
}

impl SledUserStore {
    pub fn with_db(db: sled::Db) -> Result<Self, StoreError> {
        let users = db.open_tree("users")?;
        let usernames = db.open_tree("users_by_name")?;
        let emails = db.open_tree("users_by_email")?;
        Ok(Self { db, users, usernames, emails })
    }

    fn put(&self, user: &User) -> Result<(), StoreError> {
        self.users.insert(user.id.to_be_bytes(), bincode::serialize(user)?)?;
        self.users.flush()?;
        Ok(())
    }

    fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        match self.users.get(id.to_be_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }
}

fn id_from(bytes: &[u8]) -> Option<UserId> {
    Some(UserId::from_be_bytes(bytes.try_into().ok()?))
}

impl UserStore for SledUserStore {
    fn register(&self, new_user: NewUser) -> Result<User, AuthError> {
        if self.usernames.contains_key(new_user.username.as_bytes()).map_err(StoreError::from)? {
            return Err(AuthError::UsernameTaken(new_user.username));
        }
        let email_key = new_user.email.to_lowercase();
        if self.emails.contains_key(email_key.as_bytes()).map_err(StoreError::from)? {
            return Err(AuthError::EmailTaken(new_user.email));
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: self.db.generate_id().map_err(StoreError::from)? + 1,
            username: new_user.username,
            email: new_user.email,
            password_hash: hash_password(&new_user.password)?,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            created_date: now,
            last_login_date: now,
            is_active: true,
            role: Role::User,
        };
        // Claim the username atomically so concurrent registrations cannot both win.
        let claimed = self
            .usernames
            .compare_and_swap(user.username.as_bytes(), None as Option<&[u8]>, Some(&user.id.to_be_bytes()[..]))
            .map_err(StoreError::from)?;
        if claimed.is_err() {
            return Err(AuthError::UsernameTaken(user.username));
        }
        self.emails.insert(email_key.as_bytes(), &user.id.to_be_bytes()[..]).map_err(StoreError::from)?;
        self.put(&user)?;
        tracing::info!(user = %user.username, "user registered");
        Ok(user)
    }

    fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>, AuthError> {
        let Some(mut user) = self.find_by_username(username)? else {
            return Ok(None);
        };
        if !user.is_active || !verify_password(password, &user.password_hash) {
            tracing::debug!(user = username, "authentication rejected");
            return Ok(None);
        }
        user.last_login_date = OffsetDateTime::now_utc();
        self.put(&user)?;
        Ok(Some(user))
    }

    fn change_password(&self, id: UserId, current: &str, new: &str) -> Result<bool, AuthError> {
        let Some(mut user) = self.get(id)? else {
            return Ok(false);
        };
        if !verify_password(current, &user.password_hash) {
            return Ok(false);
        }
        user.password_hash = hash_password(new)?;
        self.put(&user)?;
        Ok(true)
    }

    fn find_by_id(&self, id: UserId) -> Result<Option<User>, AuthError> {
        Ok(self.get(id)?)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let Some(raw) = self.usernames.get(username.as_bytes()).map_err(StoreError::from)? else {
            return Ok(None);
        };
        match id_from(&raw) {
            Some(id) => Ok(self.get(id)?),
            None => Ok(None),
        }
    }

    fn is_email_available(&self, email: &str) -> Result<bool, AuthError> {
        let taken = self.emails.contains_key(email.to_lowercase().as_bytes()).map_err(StoreError::from)?;
        Ok(!taken)
    }
}
