//! Data access for the HR store.
//!
//! Every [`Store`] call opens its own SQLite connection, runs one operation
//! and closes the connection before returning. Nothing is pooled between
//! calls; concurrency control is left entirely to SQLite.

use std::path::{Path, PathBuf};

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr,
    FromQueryResult, SqlErr, Statement, TransactionTrait, Value,
};
use thiserror::Error;
use tracing::debug;

pub const BACKEND: DatabaseBackend = DatabaseBackend::Sqlite;

const DEFAULT_DATABASE_PATH: &str = "data/hr_database.db";
const DEFAULT_TABLE_NAME: &str = "employees";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("store error: {0}")]
    Store(#[source] DbErr),
    #[error("invalid table name {0:?}: use letters, digits and underscores")]
    InvalidTableName(String),
    #[error("cannot prepare database directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DbError {
    /// Sorts a raw store error into the duplicate-key / generic split.
    pub fn classify(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(message)) = err.sql_err() {
            return DbError::DuplicateKey(message);
        }
        let message = err.to_string();
        if message.contains("UNIQUE constraint failed") {
            DbError::DuplicateKey(message)
        } else {
            DbError::Store(err)
        }
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, DbError::DuplicateKey(_))
    }
}

pub type DbResult<T> = Result<T, DbError>;

/// Where the store lives and which table holds the employees.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseSettings {
    database_path: PathBuf,
    table_name: String,
}

impl DatabaseSettings {
    pub fn new(database_path: impl Into<PathBuf>, table_name: impl Into<String>) -> DbResult<Self> {
        let table_name = table_name.into();
        if !is_valid_identifier(&table_name) {
            return Err(DbError::InvalidTableName(table_name));
        }
        Ok(Self {
            database_path: database_path.into(),
            table_name,
        })
    }

    /// Reads `HR_DATABASE_PATH` and `HR_TABLE_NAME`, falling back to
    /// `data/hr_database.db` and `employees`.
    pub fn from_env() -> DbResult<Self> {
        let path =
            std::env::var("HR_DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.into());
        let table = std::env::var("HR_TABLE_NAME").unwrap_or_else(|_| DEFAULT_TABLE_NAME.into());
        Self::new(path, table)
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn database_url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.database_path.display())
    }
}

pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Double-quotes an identifier. Callers only pass validated or sanitised names.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[derive(Clone, Debug)]
pub struct Store {
    settings: DatabaseSettings,
}

impl Store {
    pub fn new(settings: DatabaseSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &DatabaseSettings {
        &self.settings
    }

    /// The configured table name, quoted for use in SQL text.
    pub fn table(&self) -> String {
        quote_ident(self.settings.table_name())
    }

    pub fn statement(sql: impl Into<String>, params: Vec<Value>) -> Statement {
        Statement::from_sql_and_values(BACKEND, sql, params)
    }

    /// Runs a read statement and maps every row onto `T`.
    pub async fn query<T: FromQueryResult>(&self, sql: &str, params: Vec<Value>) -> DbResult<Vec<T>> {
        let conn = self.connect().await?;
        debug!(sql, "query");
        let outcome = T::find_by_statement(Self::statement(sql, params))
            .all(&conn)
            .await;
        release(conn, outcome).await
    }

    pub async fn query_one<T: FromQueryResult>(
        &self,
        sql: &str,
        params: Vec<Value>,
    ) -> DbResult<Option<T>> {
        let conn = self.connect().await?;
        debug!(sql, "query one");
        let outcome = T::find_by_statement(Self::statement(sql, params))
            .one(&conn)
            .await;
        release(conn, outcome).await
    }

    /// Runs one write statement in autocommit mode.
    pub async fn execute(&self, sql: &str, params: Vec<Value>) -> DbResult<()> {
        let conn = self.connect().await?;
        let outcome = conn.execute(Self::statement(sql, params)).await;
        let result = release(conn, outcome).await?;
        debug!(sql, rows_affected = result.rows_affected(), "statement executed");
        Ok(())
    }

    /// Runs all statements in a single transaction. Any failure rolls the
    /// whole batch back.
    pub async fn execute_batch(&self, statements: Vec<Statement>) -> DbResult<()> {
        let conn = self.connect().await?;
        let count = statements.len();
        let outcome = run_in_transaction(&conn, statements).await;
        release(conn, outcome).await?;
        debug!(statements = count, "batch committed");
        Ok(())
    }

    async fn connect(&self) -> DbResult<DatabaseConnection> {
        let path = self.settings.database_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| DbError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let mut options = ConnectOptions::new(self.settings.database_url());
        options.max_connections(1).sqlx_logging(false);
        Database::connect(options).await.map_err(DbError::classify)
    }
}

async fn run_in_transaction(
    conn: &DatabaseConnection,
    statements: Vec<Statement>,
) -> Result<(), DbErr> {
    let txn = conn.begin().await?;
    for statement in statements {
        txn.execute(statement).await?;
    }
    txn.commit().await
}

/// Closes the connection, preferring the operation's own error over a close failure.
async fn release<T>(conn: DatabaseConnection, outcome: Result<T, DbErr>) -> DbResult<T> {
    let closed = conn.close().await;
    let value = outcome.map_err(DbError::classify)?;
    closed.map_err(DbError::classify)?;
    Ok(value)
}
