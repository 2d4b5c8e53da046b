use std::path::{Path, PathBuf};

use rusqlite::{Connection, TransactionBehavior};
use tokio::task;

use crate::error::{KingraphError, Result};
use crate::graph::{self, AddOutcome, AddPersonRequest};
use crate::model::{FamilyId, NewPerson, Person, PersonId, PersonUpdate};
use crate::store::{GraphStore, SqliteStore};

pub mod schema;

// WAL keeps readers unblocked during a bind; busy_timeout makes a second
// writer wait for the immediate transaction instead of failing fast.
const CONNECTION_PRAGMAS: &str = "PRAGMA journal_mode = WAL; \
     PRAGMA synchronous = NORMAL; \
     PRAGMA foreign_keys = ON; \
     PRAGMA busy_timeout = 5000;";

/// Async adapter over the SQLite-backed store: owns the database path and
/// runs every operation on a blocking task with its own connection.
pub struct Db {
    path: PathBuf,
}

impl Db {
    /// Create an adapter for the database at `db_path`.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            path: db_path.as_ref().to_path_buf(),
        }
    }

    /// Open a configured connection.
    pub fn open_connection(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(CONNECTION_PRAGMAS)?;
        Ok(conn)
    }

    /// Execute a closure with a database connection on a blocking task.
    pub async fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        task::spawn_blocking(move || {
            let mut conn = Connection::open(&path)?;
            conn.execute_batch(CONNECTION_PRAGMAS)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            KingraphError::Io(std::io::Error::other(format!(
                "blocking task failed: {}",
                e
            )))
        })?
    }

    /// Bootstrap the schema. Idempotent.
    pub async fn init(&self) -> Result<()> {
        self.with_connection(|conn| schema::init(conn)).await
    }

    pub async fn person(&self, id: PersonId) -> Result<Person> {
        self.with_connection(move |conn| SqliteStore::new(conn).get_person(id))
            .await
    }

    pub async fn create_person(&self, fields: NewPerson) -> Result<Person> {
        self.with_connection(move |conn| SqliteStore::new(conn).create_person(fields))
            .await
    }

    pub async fn update_person(&self, id: PersonId, update: PersonUpdate) -> Result<()> {
        self.with_connection(move |conn| SqliteStore::new(conn).update_person(id, &update))
            .await
    }

    pub async fn family_members(&self, family: FamilyId) -> Result<Vec<Person>> {
        self.with_connection(move |conn| SqliteStore::new(conn).family_members(family))
            .await
    }

    /// Add a member by name, deduplicating within the family. The dedupe
    /// check and the insert share one immediate transaction.
    pub async fn add_person(
        &self,
        family: FamilyId,
        request: AddPersonRequest,
    ) -> Result<AddOutcome> {
        self.with_connection(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let outcome = {
                let mut store = SqliteStore::new(&tx);
                graph::add_person(&mut store, family, request)?
            };
            tx.commit()?;
            Ok(outcome)
        })
        .await
    }

    /// Resolve and apply a role binding in one immediate transaction, the
    /// invite-acceptance flow: phantom creation, edge edits, and the
    /// registered mark on the target commit or roll back together. Returns
    /// the target as stored after the bind.
    pub async fn bind_by_role(
        &self,
        role: &str,
        inviter: PersonId,
        target: PersonId,
    ) -> Result<Person> {
        let role = role.to_owned();
        self.with_connection(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            {
                let mut store = SqliteStore::new(&tx);
                let mut plan = graph::bind_by_role(&mut store, &role, inviter, target)?;
                // Accepting a bind is what claims the member record, even
                // when the role itself binds no edges.
                plan.target.registered = Some(true);
                graph::apply_plan(&mut store, &plan)?;
            }
            let bound = SqliteStore::new(&tx).get_person(target)?;
            tx.commit()?;
            Ok(bound)
        })
        .await
    }

    /// Label one pair from the family snapshot.
    pub async fn infer_label(
        &self,
        family: FamilyId,
        viewer: PersonId,
        target: PersonId,
    ) -> Result<String> {
        let members = self.family_members(family).await?;
        Ok(graph::infer_label(viewer, target, &members))
    }
}
