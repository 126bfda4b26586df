//! User, role and membership persistence.
//!
//! Handlers only see the [`UserStore`] trait. `PgStore` backs the running
//! service; `MemoryStore` backs tests and local experiments.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Role assigned to every account created through registration.
pub const DEFAULT_ROLE: &str = "user";

/// A stored user together with the names of its roles.
///
/// `roles` keeps whatever order the store produced them in; no ordering is
/// guaranteed.
#[derive(Clone, Debug)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub user_name: String,
    pub password_hash: String,
    pub roles: Vec<String>,
}

impl UserRecord {
    /// The role that ends up in the session claim.
    #[must_use]
    pub fn first_role(&self) -> Option<&str> {
        self.roles.first().map(String::as_str)
    }
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub user_name: String,
    pub password_hash: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedUser {
    pub id: Uuid,
    pub user_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created(CreatedUser),
    /// Another account already exists; nothing was written.
    Closed,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn count_users(&self) -> Result<i64>;

    /// Exact, case-sensitive email lookup.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Exact, case-sensitive lookup against the stored `user_name`.
    async fn find_user_by_user_name(&self, user_name: &str) -> Result<Option<UserRecord>>;

    /// Create the first account and link it to `role`, creating the role when
    /// missing. Runs as a single unit: if any user exists when the write is
    /// attempted, returns [`BootstrapOutcome::Closed`] and changes nothing.
    async fn create_bootstrap_user(&self, user: NewUser, role: &str) -> Result<BootstrapOutcome>;

    /// Cheap reachability probe used by the health endpoint.
    async fn ping(&self) -> Result<()>;
}
