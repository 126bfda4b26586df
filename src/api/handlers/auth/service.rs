//! Credential verification and bootstrap registration over a [`UserStore`].

use tracing::{debug, info, warn};

use super::{password::CredentialHasher, types::Identity, types::RegisterInput};
use crate::{
    api::error::ApiError,
    store::{BootstrapOutcome, CreatedUser, NewUser, UserStore, DEFAULT_ROLE},
};

pub const REGISTRATION_CLOSED: &str = "Registration is not allowed.";

/// Verify an email/password pair and return the identity to put in a session.
///
/// Unknown email and wrong password both yield `InvalidCredentials`; an
/// unknown email still pays for one hash verification.
///
/// # Errors
/// `InvalidCredentials` on any mismatch, `Internal` on store failures or a
/// user without roles.
pub async fn authenticate(
    store: &dyn UserStore,
    hasher: &CredentialHasher,
    email: &str,
    password: &str,
) -> Result<Identity, ApiError> {
    let Some(user) = store.find_user_by_email(email).await? else {
        let hasher = hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.verify_dummy(&password))
            .await
            .map_err(|e| ApiError::Internal(e.into()))?;
        debug!("Sign-in for unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    let matches = {
        let hasher = hasher.clone();
        let password = password.to_string();
        let phc = user.password_hash.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &phc))
            .await
            .map_err(|e| ApiError::Internal(e.into()))?
    };
    if !matches {
        debug!(user_id = %user.id, "Sign-in with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let Some(role) = user.first_role() else {
        return Err(ApiError::Internal(anyhow::anyhow!(
            "user {} has no role assigned",
            user.id
        )));
    };

    Ok(Identity {
        id: user.id,
        name: user.user_name.clone(),
        email: user.email.clone(),
        role: role.to_string(),
    })
}

/// Fails with `Forbidden` once any account exists.
///
/// # Errors
/// `Forbidden` when registration is closed, `Internal` on store failures.
pub async fn ensure_registration_open(store: &dyn UserStore) -> Result<(), ApiError> {
    if store.count_users().await? > 0 {
        return Err(ApiError::Forbidden(REGISTRATION_CLOSED.to_string()));
    }
    Ok(())
}

/// Create the first account. Input must already be shape-validated.
///
/// # Errors
/// `EmailExists`, `UsernameExists`, `Forbidden` if another registration won
/// the race, `Conflict` on a uniqueness violation, `Internal` otherwise.
pub async fn register(
    store: &dyn UserStore,
    hasher: &CredentialHasher,
    input: RegisterInput,
) -> Result<CreatedUser, ApiError> {
    if store.find_user_by_email(&input.email).await?.is_some() {
        return Err(ApiError::EmailExists);
    }

    let name = format!("{} {}", input.first_name, input.last_name);
    // Looked up as typed; the stored value is uppercased.
    if store.find_user_by_user_name(&name).await?.is_some() {
        return Err(ApiError::UsernameExists);
    }

    let password_hash = {
        let hasher = hasher.clone();
        let password = input.password;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ApiError::Internal(e.into()))??
    };

    let new_user = NewUser {
        email: input.email,
        user_name: name.to_uppercase(),
        name,
        password_hash,
    };

    match store.create_bootstrap_user(new_user, DEFAULT_ROLE).await? {
        BootstrapOutcome::Created(created) => {
            info!(user_id = %created.id, "Bootstrap account created");
            Ok(created)
        }
        BootstrapOutcome::Closed => {
            warn!("Concurrent registration lost the bootstrap race");
            Err(ApiError::Forbidden(REGISTRATION_CLOSED.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::password::test_hasher;
    use crate::store::MemoryStore;
    use anyhow::Result;

    fn input(first: &str, last: &str, email: &str) -> RegisterInput {
        RegisterInput {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            password: "Secret123".to_string(),
        }
    }

    #[tokio::test]
    async fn register_then_authenticate() -> Result<()> {
        let store = MemoryStore::new();
        let hasher = test_hasher();

        ensure_registration_open(&store).await?;
        let created = register(&store, &hasher, input("Ada", "Lovelace", "ada@example.com")).await?;
        assert_eq!(created.user_name, "ADA LOVELACE");

        let identity = authenticate(&store, &hasher, "ada@example.com", "Secret123").await?;
        assert_eq!(identity.id, created.id);
        assert_eq!(identity.name, "ADA LOVELACE");
        assert_eq!(identity.role, DEFAULT_ROLE);

        let stored = store.find_user_by_email("ada@example.com").await?;
        let stored = stored.ok_or_else(|| anyhow::anyhow!("user missing"))?;
        assert_eq!(stored.name, "Ada Lovelace");
        assert_ne!(stored.password_hash, "Secret123");
        Ok(())
    }

    #[tokio::test]
    async fn registration_closes_after_first_account() -> Result<()> {
        let store = MemoryStore::new();
        let hasher = test_hasher();
        register(&store, &hasher, input("Ada", "Lovelace", "ada@example.com")).await?;

        let err = ensure_registration_open(&store).await;
        assert!(matches!(err, Err(ApiError::Forbidden(ref m)) if m == REGISTRATION_CLOSED));
        Ok(())
    }

    #[tokio::test]
    async fn lost_race_is_forbidden() -> Result<()> {
        let store = MemoryStore::new();
        let hasher = test_hasher();
        register(&store, &hasher, input("Ada", "Lovelace", "ada@example.com")).await?;

        // Skips the count gate, so the store has to refuse.
        let err = register(&store, &hasher, input("Grace", "Hopper", "grace@example.com")).await;
        assert!(matches!(err, Err(ApiError::Forbidden(_))));
        assert_eq!(store.count_users().await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_reported_before_username() -> Result<()> {
        let store = MemoryStore::new();
        let hasher = test_hasher();
        register(&store, &hasher, input("Ada", "Lovelace", "ada@example.com")).await?;

        let err = register(&store, &hasher, input("Ada", "Lovelace", "ada@example.com")).await;
        assert!(matches!(err, Err(ApiError::EmailExists)));
        Ok(())
    }

    #[tokio::test]
    async fn username_check_uses_unuppercased_form() -> Result<()> {
        let store = MemoryStore::new();
        let hasher = test_hasher();
        register(&store, &hasher, input("Ada", "Lovelace", "ada@example.com")).await?;

        // "Ada Lovelace" is compared against the stored "ADA LOVELACE": no hit.
        let err = register(&store, &hasher, input("Ada", "Lovelace", "other@example.com")).await;
        assert!(matches!(err, Err(ApiError::Forbidden(_))));

        // Already-uppercase input does collide.
        let err = register(&store, &hasher, input("ADA", "LOVELACE", "third@example.com")).await;
        assert!(matches!(err, Err(ApiError::UsernameExists)));
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() -> Result<()> {
        let store = MemoryStore::new();
        let hasher = test_hasher();
        register(&store, &hasher, input("Ada", "Lovelace", "ada@example.com")).await?;

        let wrong = authenticate(&store, &hasher, "ada@example.com", "Wrong1234").await;
        let unknown = authenticate(&store, &hasher, "nobody@example.com", "Secret123").await;
        assert!(matches!(wrong, Err(ApiError::InvalidCredentials)));
        assert!(matches!(unknown, Err(ApiError::InvalidCredentials)));
        Ok(())
    }

    #[tokio::test]
    async fn email_lookup_is_case_sensitive() -> Result<()> {
        let store = MemoryStore::new();
        let hasher = test_hasher();
        register(&store, &hasher, input("Ada", "Lovelace", "ada@example.com")).await?;

        let err = authenticate(&store, &hasher, "ADA@example.com", "Secret123").await;
        assert!(matches!(err, Err(ApiError::InvalidCredentials)));
        Ok(())
    }

    #[tokio::test]
    async fn first_role_wins() -> Result<()> {
        let store = MemoryStore::new();
        let hasher = test_hasher();
        register(&store, &hasher, input("Ada", "Lovelace", "ada@example.com")).await?;
        store.grant_role("ada@example.com", "admin").await?;

        let identity = authenticate(&store, &hasher, "ada@example.com", "Secret123").await?;
        assert_eq!(identity.role, DEFAULT_ROLE);
        Ok(())
    }
}
