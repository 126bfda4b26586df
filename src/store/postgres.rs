use super::{BootstrapOutcome, CreatedUser, NewUser, UserRecord, UserStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, Connection, PgPool, Row};
use tracing::{info_span, Instrument};
use uuid::Uuid;

// Arbitrary, but must stay stable across deployments sharing a database.
const BOOTSTRAP_LOCK_ID: i64 = 0x756d_6272_616c;

const USER_WITH_ROLES: &str = r"
    SELECT u.id, u.email, u.name, u.user_name, u.password_hash,
           COALESCE(array_agg(r.name) FILTER (WHERE r.name IS NOT NULL), '{}'::text[]) AS roles
    FROM users u
    LEFT JOIN user_roles ur ON ur.user_id = u.id
    LEFT JOIN roles r ON r.id = ur.role_id
";

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_user_where(&self, column: &str, value: &str) -> Result<Option<UserRecord>> {
        let query = format!("{USER_WITH_ROLES} WHERE u.{column} = $1 GROUP BY u.id LIMIT 1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .with_context(|| format!("failed to look up user by {column}"))?;

        row.map(|row| user_from_row(&row)).transpose()
    }
}

fn user_from_row(row: &PgRow) -> Result<UserRecord> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        user_name: row.try_get("user_name")?,
        password_hash: row.try_get("password_hash")?,
        roles: row.try_get("roles")?,
    })
}

#[async_trait]
impl UserStore for PgStore {
    async fn count_users(&self) -> Result<i64> {
        let query = "SELECT COUNT(*) AS count FROM users";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to count users")?;
        Ok(row.get("count"))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        self.find_user_where("email", email).await
    }

    async fn find_user_by_user_name(&self, user_name: &str) -> Result<Option<UserRecord>> {
        self.find_user_where("user_name", user_name).await
    }

    async fn create_bootstrap_user(&self, user: NewUser, role: &str) -> Result<BootstrapOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin registration transaction")?;

        let lock_query = "SELECT pg_advisory_xact_lock($1)";
        let lock_span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = lock_query
        );
        sqlx::query(lock_query)
            .bind(BOOTSTRAP_LOCK_ID)
            .execute(&mut *tx)
            .instrument(lock_span)
            .await
            .context("failed to acquire registration lock")?;

        let count_query = "SELECT COUNT(*) AS count FROM users";
        let count_span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = count_query
        );
        let row = sqlx::query(count_query)
            .fetch_one(&mut *tx)
            .instrument(count_span)
            .await
            .context("failed to count users")?;
        let count: i64 = row.get("count");
        if count != 0 {
            tx.rollback()
                .await
                .context("failed to rollback registration transaction")?;
            return Ok(BootstrapOutcome::Closed);
        }

        let insert_user = r"
            INSERT INTO users (email, name, user_name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_name
        ";
        let insert_span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = insert_user
        );
        let row = sqlx::query(insert_user)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.user_name)
            .bind(&user.password_hash)
            .fetch_one(&mut *tx)
            .instrument(insert_span)
            .await
            .context("failed to insert user")?;
        let user_id: Uuid = row.get("id");
        let user_name: String = row.get("user_name");

        let select_role = "SELECT id FROM roles WHERE name = $1";
        let select_span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = select_role
        );
        let existing = sqlx::query(select_role)
            .bind(role)
            .fetch_optional(&mut *tx)
            .instrument(select_span)
            .await
            .context("failed to look up role")?;

        let role_id: Uuid = if let Some(row) = existing {
            row.get("id")
        } else {
            let insert_role = "INSERT INTO roles (name) VALUES ($1) RETURNING id";
            let span = info_span!(
                "db.query",
                db.system = "postgresql",
                db.operation = "INSERT",
                db.statement = insert_role
            );
            sqlx::query(insert_role)
                .bind(role)
                .fetch_one(&mut *tx)
                .instrument(span)
                .await
                .context("failed to create role")?
                .get("id")
        };

        let link = "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)";
        let link_span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = link
        );
        sqlx::query(link)
            .bind(user_id)
            .bind(role_id)
            .execute(&mut *tx)
            .instrument(link_span)
            .await
            .context("failed to link user to role")?;

        tx.commit()
            .await
            .context("failed to commit registration transaction")?;

        Ok(BootstrapOutcome::Created(CreatedUser {
            id: user_id,
            user_name,
        }))
    }

    async fn ping(&self) -> Result<()> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .context("failed to acquire database connection")?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .context("failed to ping database")
    }
}
