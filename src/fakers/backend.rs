// In-memory stand-in for the remote backend, with a builder to seed data and
// force failures, so flows can be tested without a network.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap, HashSet},
    rc::Rc,
};

use async_trait::async_trait;
use serde_json::Value;

use crate::backend::{
    AuthBackend, Backend, BackendError, BlobStore, Row, RowStore, Session, Table, UserId,
    UserProfile, to_row,
};
use crate::fakers::OutputTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SignUp,
    SignIn,
    SignOut,
    CurrentSession,
    UpdatePassword,
    Select,
    SelectAll,
    Insert,
    Update,
    Upload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    SignUp(String),
    SignIn(String),
    SignOut,
    CurrentSession,
    UpdatePassword,
    Select(Table, String),
    SelectAll(Table),
    Insert(Table, Row),
    Update(Table, String, Row),
    Upload(String, usize),
}

#[derive(Debug, Clone)]
struct Account {
    user_id: UserId,
    password: String,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<String, Account>,
    session: Option<Session>,
    tables: HashMap<Table, Vec<Row>>,
    blobs: BTreeMap<String, Vec<u8>>,
    next_id: usize,
}

#[derive(Default, Clone)]
pub struct InMemoryBackendBuilder {
    accounts: Vec<(String, String, UserId)>,
    rows: Vec<(Table, Row)>,
    signed_in: Option<String>,
    failing: HashSet<Operation>,
    base_url: Option<String>,
}

impl InMemoryBackendBuilder {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn account(&mut self, email: &str, password: &str, user_id: &str) -> &mut Self {
        self.accounts
            .push((email.to_string(), password.to_string(), UserId::from(user_id)));
        self
    }
    pub fn row(&mut self, table: Table, row: Row) -> &mut Self {
        self.rows.push((table, row));
        self
    }
    pub fn user(&mut self, user: &UserProfile) -> &mut Self {
        // a UserProfile always serializes to an object
        if let Ok(row) = to_row(Table::Users, user) {
            self.row(Table::Users, row);
        }
        self
    }
    /// Start with a live session for an account added through `account`.
    pub fn signed_in(&mut self, email: &str) -> &mut Self {
        self.signed_in = Some(email.to_string());
        self
    }
    pub fn fail(&mut self, operation: Operation) -> &mut Self {
        self.failing.insert(operation);
        self
    }
    pub fn base_url(&mut self, url: &str) -> &mut Self {
        self.base_url = Some(url.trim_end_matches('/').to_string());
        self
    }
    pub fn build(&self) -> InMemoryBackend {
        let mut state = State::default();
        for (email, password, user_id) in &self.accounts {
            state.accounts.insert(
                email.clone(),
                Account {
                    user_id: user_id.clone(),
                    password: password.clone(),
                },
            );
        }
        for (table, row) in &self.rows {
            state.tables.entry(*table).or_default().push(row.clone());
        }
        state.session = self.signed_in.as_ref().and_then(|email| {
            state
                .accounts
                .get(email)
                .map(|account| session_for(email, &account.user_id))
        });
        InMemoryBackend {
            state: Rc::new(RefCell::new(state)),
            failing: Rc::new(self.failing.clone()),
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| "https://storage.test".to_string()),
            output_tracker: OutputTracker::new(),
        }
    }
}

#[derive(Clone)]
pub struct InMemoryBackend {
    state: Rc<RefCell<State>>,
    failing: Rc<HashSet<Operation>>,
    base_url: String,
    output_tracker: OutputTracker<BackendEvent>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        InMemoryBackendBuilder::new().build()
    }
}

fn session_for(email: &str, user_id: &UserId) -> Session {
    Session {
        user_id: user_id.clone(),
        email: email.to_string(),
        access_token: format!("token-{user_id}"),
    }
}

fn row_id(row: &Row) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

impl InMemoryBackend {
    pub fn output_tracker(&self) -> OutputTracker<BackendEvent> {
        self.output_tracker.enable();
        self.output_tracker.clone()
    }

    /// Bundle this fake as all three backend services.
    pub fn backend(&self) -> Backend {
        let this = Rc::new(self.clone());
        Backend::new(this.clone(), this.clone(), this)
    }

    pub fn rows(&self, table: Table) -> Vec<Row> {
        self.state
            .borrow()
            .tables
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn blob(&self, path: &str) -> Option<Vec<u8>> {
        self.state.borrow().blobs.get(path).cloned()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    fn check(&self, operation: Operation) -> Result<(), BackendError> {
        if self.failing.contains(&operation) {
            Err(BackendError::Transport(format!("{operation:?} failed")))
        } else {
            Ok(())
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        format!("{prefix}-{}", state.next_id)
    }
}

#[async_trait(?Send)]
impl AuthBackend for InMemoryBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<UserId, BackendError> {
        self.output_tracker
            .push(BackendEvent::SignUp(email.to_string()));
        self.check(Operation::SignUp)?;
        if self.state.borrow().accounts.contains_key(email) {
            return Err(BackendError::UserExists(email.to_string()));
        }
        let user_id = UserId(self.next_id("user"));
        let mut state = self.state.borrow_mut();
        state.accounts.insert(
            email.to_string(),
            Account {
                user_id: user_id.clone(),
                password: password.to_string(),
            },
        );
        state.session = Some(session_for(email, &user_id));
        Ok(user_id)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        self.output_tracker
            .push(BackendEvent::SignIn(email.to_string()));
        self.check(Operation::SignIn)?;
        let mut state = self.state.borrow_mut();
        let account = state
            .accounts
            .get(email)
            .filter(|account| account.password == password)
            .cloned()
            .ok_or(BackendError::InvalidCredentials)?;
        let session = session_for(email, &account.user_id);
        state.session = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.output_tracker.push(BackendEvent::SignOut);
        self.check(Operation::SignOut)?;
        self.state.borrow_mut().session = None;
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>, BackendError> {
        self.output_tracker.push(BackendEvent::CurrentSession);
        self.check(Operation::CurrentSession)?;
        Ok(self.state.borrow().session.clone())
    }

    async fn update_password(&self, password: &str) -> Result<(), BackendError> {
        self.output_tracker.push(BackendEvent::UpdatePassword);
        self.check(Operation::UpdatePassword)?;
        let mut state = self.state.borrow_mut();
        let email = state
            .session
            .as_ref()
            .map(|session| session.email.clone())
            .ok_or(BackendError::NotAuthenticated)?;
        if let Some(account) = state.accounts.get_mut(&email) {
            account.password = password.to_string();
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl RowStore for InMemoryBackend {
    async fn select_by_id(&self, table: Table, id: &str) -> Result<Option<Row>, BackendError> {
        self.output_tracker
            .push(BackendEvent::Select(table, id.to_string()));
        self.check(Operation::Select)?;
        Ok(self
            .state
            .borrow()
            .tables
            .get(&table)
            .and_then(|rows| rows.iter().find(|row| row_id(row) == Some(id)))
            .cloned())
    }

    async fn select_all(&self, table: Table) -> Result<Vec<Row>, BackendError> {
        self.output_tracker.push(BackendEvent::SelectAll(table));
        self.check(Operation::SelectAll)?;
        Ok(self.rows(table))
    }

    async fn insert(&self, table: Table, mut row: Row) -> Result<(), BackendError> {
        self.output_tracker
            .push(BackendEvent::Insert(table, row.clone()));
        self.check(Operation::Insert)?;
        let id = match row_id(&row) {
            Some(id) => id.to_string(),
            None => {
                let id = self.next_id(table.as_str());
                row.insert("id".into(), Value::String(id.clone()));
                id
            }
        };
        let mut state = self.state.borrow_mut();
        let rows = state.tables.entry(table).or_default();
        if rows.iter().any(|existing| row_id(existing) == Some(id.as_str())) {
            return Err(BackendError::Conflict { table, id });
        }
        rows.push(row);
        Ok(())
    }

    async fn update_by_id(&self, table: Table, id: &str, row: Row) -> Result<(), BackendError> {
        self.output_tracker
            .push(BackendEvent::Update(table, id.to_string(), row.clone()));
        self.check(Operation::Update)?;
        let mut state = self.state.borrow_mut();
        let existing = state
            .tables
            .get_mut(&table)
            .and_then(|rows| rows.iter_mut().find(|existing| row_id(existing) == Some(id)))
            .ok_or_else(|| BackendError::NotFound {
                table,
                id: id.to_string(),
            })?;
        existing.extend(row);
        Ok(())
    }
}

#[async_trait(?Send)]
impl BlobStore for InMemoryBackend {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<(), BackendError> {
        self.output_tracker
            .push(BackendEvent::Upload(path.to_string(), bytes.len()));
        self.check(Operation::Upload)?;
        self.state.borrow_mut().blobs.insert(path.to_string(), bytes);
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
