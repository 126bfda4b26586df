use super::{BootstrapOutcome, CreatedUser, NewUser, UserRecord, UserStore};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<StoredUser>,
    roles: Vec<(Uuid, String)>,
    user_roles: Vec<(Uuid, Uuid)>,
}

#[derive(Clone, Debug)]
struct StoredUser {
    id: Uuid,
    email: String,
    name: String,
    user_name: String,
    password_hash: String,
}

impl Tables {
    fn record(&self, user: &StoredUser) -> UserRecord {
        let roles = self
            .user_roles
            .iter()
            .filter(|(user_id, _)| *user_id == user.id)
            .filter_map(|(_, role_id)| {
                self.roles
                    .iter()
                    .find(|(id, _)| id == role_id)
                    .map(|(_, name)| name.clone())
            })
            .collect();

        UserRecord {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            user_name: user.user_name.clone(),
            password_hash: user.password_hash.clone(),
            roles,
        }
    }

    fn role_id(&mut self, name: &str) -> Uuid {
        if let Some((id, _)) = self.roles.iter().find(|(_, role)| role == name) {
            return *id;
        }
        let id = Uuid::new_v4();
        self.roles.push((id, name.to_string()));
        id
    }
}

/// In-process store with the same semantics as the Postgres schema.
///
/// A single mutex serializes every operation, which also makes the bootstrap
/// check-and-create atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an extra role to an existing user, creating the role if needed.
    ///
    /// # Errors
    /// Returns an error if no user has the given email.
    pub async fn grant_role(&self, email: &str, role: &str) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let user_id = tables
            .users
            .iter()
            .find(|user| user.email == email)
            .map(|user| user.id)
            .ok_or_else(|| anyhow!("no user with email {email}"))?;
        let role_id = tables.role_id(role);
        if !tables.user_roles.contains(&(user_id, role_id)) {
            tables.user_roles.push((user_id, role_id));
        }
        Ok(())
    }

    /// Number of role rows, used to check that registration reuses roles.
    pub async fn role_count(&self) -> usize {
        self.tables.lock().await.roles.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn count_users(&self) -> Result<i64> {
        let tables = self.tables.lock().await;
        Ok(i64::try_from(tables.users.len())?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|user| user.email == email)
            .map(|user| tables.record(user)))
    }

    async fn find_user_by_user_name(&self, user_name: &str) -> Result<Option<UserRecord>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|user| user.user_name == user_name)
            .map(|user| tables.record(user)))
    }

    async fn create_bootstrap_user(&self, user: NewUser, role: &str) -> Result<BootstrapOutcome> {
        let mut tables = self.tables.lock().await;
        if !tables.users.is_empty() {
            return Ok(BootstrapOutcome::Closed);
        }

        let stored = StoredUser {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            user_name: user.user_name,
            password_hash: user.password_hash,
        };
        let created = CreatedUser {
            id: stored.id,
            user_name: stored.user_name.clone(),
        };
        let role_id = tables.role_id(role);
        tables.user_roles.push((stored.id, role_id));
        tables.users.push(stored);

        Ok(BootstrapOutcome::Created(created))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
