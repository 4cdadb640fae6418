// The remote backend-as-a-service: authentication, row storage and blob
// storage. The client only talks to it through these traits.

pub mod models;

use std::{fmt, rc::Rc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

pub use models::{
    Category, Exercise, Level, ProfileUpdate, QuizResponses, SubscriptionStatus, UserProfile,
};

/// A row as the store sees it: a JSON object keyed by column.
pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        UserId(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub access_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    QuizResponses,
    Exercises,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::QuizResponses => "quiz_responses",
            Table::Exercises => "exercises",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("invalid login credentials")]
    InvalidCredentials,

    #[error("a user with email {0} already exists")]
    UserExists(String),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("no row with id {id} in {table}")]
    NotFound { table: Table, id: String },

    #[error("a row with id {id} already exists in {table}")]
    Conflict { table: Table, id: String },

    #[error("failed to decode {table} row: {message}")]
    Decode { table: Table, message: String },

    #[error("request failed: {0}")]
    Transport(String),
}

#[async_trait(?Send)]
pub trait AuthBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<UserId, BackendError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError>;
    async fn sign_out(&self) -> Result<(), BackendError>;
    async fn current_session(&self) -> Result<Option<Session>, BackendError>;
    async fn update_password(&self, password: &str) -> Result<(), BackendError>;
}

#[async_trait(?Send)]
pub trait RowStore {
    async fn select_by_id(&self, table: Table, id: &str) -> Result<Option<Row>, BackendError>;
    async fn select_all(&self, table: Table) -> Result<Vec<Row>, BackendError>;
    async fn insert(&self, table: Table, row: Row) -> Result<(), BackendError>;
    /// Merge the given columns into the row with primary key `id`.
    async fn update_by_id(&self, table: Table, id: &str, row: Row) -> Result<(), BackendError>;
}

#[async_trait(?Send)]
pub trait BlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<(), BackendError>;
    fn public_url(&self, path: &str) -> String;
}

/// Handles to the three backend services, cheap to clone into each flow.
#[derive(Clone)]
pub struct Backend {
    pub auth: Rc<dyn AuthBackend>,
    pub rows: Rc<dyn RowStore>,
    pub blobs: Rc<dyn BlobStore>,
}

impl Backend {
    pub fn new(
        auth: Rc<dyn AuthBackend>,
        rows: Rc<dyn RowStore>,
        blobs: Rc<dyn BlobStore>,
    ) -> Self {
        Self { auth, rows, blobs }
    }

    pub async fn fetch<T: DeserializeOwned>(
        &self,
        table: Table,
        id: &str,
    ) -> Result<Option<T>, BackendError> {
        self.rows
            .select_by_id(table, id)
            .await?
            .map(|row| from_row(table, row))
            .transpose()
    }

    pub async fn fetch_all<T: DeserializeOwned>(&self, table: Table) -> Result<Vec<T>, BackendError> {
        self.rows
            .select_all(table)
            .await?
            .into_iter()
            .map(|row| from_row(table, row))
            .collect()
    }

    pub async fn insert<T: Serialize>(&self, table: Table, value: &T) -> Result<(), BackendError> {
        self.rows.insert(table, to_row(table, value)?).await
    }

    pub async fn update<T: Serialize>(
        &self,
        table: Table,
        id: &str,
        value: &T,
    ) -> Result<(), BackendError> {
        self.rows.update_by_id(table, id, to_row(table, value)?).await
    }

    pub async fn user(&self, id: &UserId) -> Result<UserProfile, BackendError> {
        self.fetch(Table::Users, id.as_str())
            .await?
            .ok_or_else(|| BackendError::NotFound {
                table: Table::Users,
                id: id.to_string(),
            })
    }
}

pub fn to_row<T: Serialize>(table: Table, value: &T) -> Result<Row, BackendError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(BackendError::Decode {
            table,
            message: format!("expected an object, got {other}"),
        }),
        Err(e) => Err(BackendError::Decode {
            table,
            message: e.to_string(),
        }),
    }
}

pub fn from_row<T: DeserializeOwned>(table: Table, row: Row) -> Result<T, BackendError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| BackendError::Decode {
        table,
        message: e.to_string(),
    })
}
