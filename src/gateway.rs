//!
//! procgate invocation gateway
//! ---------------------------
//! Connection acquisition, input normalization, positional CALL execution and
//! result-set harvesting.
//!
//! Responsibilities:
//! - One connection per invocation, opened from fixed settings and closed on
//!   every exit path (the client is dropped; its driver task then ends).
//! - Normalizing raw submitted values: empty text binds as SQL NULL, all
//!   other values pass through unchanged as text.
//! - Executing the named procedure inside an explicit transaction and
//!   committing only after every produced result set has been materialized.
//! - Draining zero-to-many result sets in emission order, each with its own
//!   column schema.

use serde::Serialize;
use tokio_postgres::{Client, Config, NoTls, SimpleQueryMessage};
use tracing::{debug, info};

use crate::error::{classify_db, GatewayError, GatewayResult};
use crate::registry::ProcedureDef;

/// Message recorded when a call completed without producing any result set,
/// distinguishing "ran with side effects only" from an empty table.
pub const NO_DATA_MESSAGE: &str = "Executed successfully (no data returned).";

/// Fixed connection parameters for the backing database. Not under gateway
/// control at request time; populated once from the environment.
#[derive(Clone, Debug)]
pub struct ConnectSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
}

impl ConnectSettings {
    /// Read settings from `PROCGATE_DB_*` environment variables, with
    /// defaults suitable for a local development database.
    pub fn from_env() -> Self {
        let host = std::env::var("PROCGATE_DB_HOST").unwrap_or_else(|_| "localhost".to_string());
        let port = std::env::var("PROCGATE_DB_PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(5432);
        let user = std::env::var("PROCGATE_DB_USER").unwrap_or_else(|_| "postgres".to_string());
        let password = std::env::var("PROCGATE_DB_PASSWORD").unwrap_or_default();
        let dbname = std::env::var("PROCGATE_DB_NAME").unwrap_or_else(|_| "cyber_management".to_string());
        Self { host, port, user, password, dbname }
    }

    fn pg_config(&self) -> Config {
        let mut cfg = Config::new();
        cfg.host(&self.host).port(self.port).user(&self.user).dbname(&self.dbname);
        if !self.password.is_empty() {
            cfg.password(&self.password);
        }
        cfg
    }

    /// Open one connection. The driver task is spawned onto the runtime and
    /// ends when the returned client is dropped, so dropping the client on
    /// any exit path releases the connection. A failed open is a system
    /// error; there is no retry or backoff.
    pub async fn connect(&self) -> GatewayResult<Client> {
        let (client, conn) = self
            .pg_config()
            .connect(NoTls)
            .await
            .map_err(|e| GatewayError::system("connect_error", e.to_string()))?;
        tokio::spawn(async move {
            let _ = conn.await;
        });
        Ok(client)
    }
}

/// One tabular result set produced by a procedure call. Rows are positionally
/// aligned with `columns`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Everything a successful invocation produced. `messages` is non-empty only
/// when `tables` is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub tables: Vec<ResultTable>,
    pub messages: Vec<String>,
}

/// Normalize raw submitted values for positional binding: empty text becomes
/// an absent value (SQL NULL). No trimming, casing or type coercion; the
/// engine owns all further interpretation.
pub fn normalize(raw: &[String]) -> Vec<Option<String>> {
    raw.iter()
        .map(|v| if v.is_empty() { None } else { Some(v.clone()) })
        .collect()
}

/// Wrap harvested tables into an outcome, recording the side-effects-only
/// notice when the call produced no result set at all.
pub fn outcome_from_tables(tables: Vec<ResultTable>) -> Outcome {
    let messages = if tables.is_empty() {
        vec![NO_DATA_MESSAGE.to_string()]
    } else {
        Vec::new()
    };
    Outcome { tables, messages }
}

/// Render one normalized argument as a SQL text literal. Single quotes are
/// doubled; an absent value renders as NULL.
fn sql_literal(value: &Option<String>) -> String {
    match value {
        Some(v) => format!("'{}'", v.replace('\'', "''")),
        None => "NULL".to_string(),
    }
}

/// Build the CALL statement binding the normalized arguments positionally, in
/// the given order. The identifier is quoted verbatim; identifiers only ever
/// come from the fixed registry.
fn call_statement(name: &str, args: &[Option<String>]) -> String {
    let binds: Vec<String> = args.iter().map(sql_literal).collect();
    format!("CALL \"{}\"({})", name, binds.join(", "))
}

/// Wire-level events of interest while draining a call's responses. Each
/// result set arrives as a schema, zero or more rows, then a completion.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TableEvent {
    Schema(Vec<String>),
    Row(Vec<Option<String>>),
    Complete,
}

fn table_events(messages: Vec<SimpleQueryMessage>) -> Vec<TableEvent> {
    let mut events = Vec::with_capacity(messages.len());
    for m in messages {
        match m {
            SimpleQueryMessage::RowDescription(cols) => {
                events.push(TableEvent::Schema(cols.iter().map(|c| c.name().to_string()).collect()));
            }
            SimpleQueryMessage::Row(row) => {
                let mut values = Vec::with_capacity(row.len());
                for i in 0..row.len() {
                    values.push(row.get(i).map(|s| s.to_string()));
                }
                events.push(TableEvent::Row(values));
            }
            SimpleQueryMessage::CommandComplete(_) => events.push(TableEvent::Complete),
            _ => {}
        }
    }
    events
}

/// Fold drained events into result tables, preserving emission order. A
/// schema opens a table, rows append to it, a completion closes it.
/// Statements that complete without producing a schema (the CALL itself when
/// the procedure only writes) contribute no table.
pub(crate) fn collect_tables(events: Vec<TableEvent>) -> Vec<ResultTable> {
    let mut tables = Vec::new();
    let mut current: Option<ResultTable> = None;
    for ev in events {
        match ev {
            TableEvent::Schema(columns) => {
                if let Some(t) = current.take() {
                    tables.push(t);
                }
                current = Some(ResultTable { columns, rows: Vec::new() });
            }
            TableEvent::Row(values) => {
                if let Some(t) = current.as_mut() {
                    t.rows.push(values);
                }
            }
            TableEvent::Complete => {
                if let Some(t) = current.take() {
                    tables.push(t);
                }
            }
        }
    }
    if let Some(t) = current.take() {
        tables.push(t);
    }
    tables
}

/// Invoke a resolved procedure with raw positional inputs.
///
/// The caller resolves the identifier against the registry first; an unknown
/// identifier never reaches this function. Arity is not pre-validated here:
/// a mismatched argument count is rejected by the engine and surfaces as a
/// database error like any other engine-reported failure.
///
/// At most one execution attempt is made. The transaction commits only after
/// every result set has been harvested; on any failure it is dropped
/// uncommitted, so a failed invocation never partially commits.
pub async fn invoke(
    settings: &ConnectSettings,
    def: &ProcedureDef,
    raw_values: &[String],
) -> GatewayResult<Outcome> {
    let args = normalize(raw_values);
    let stmt = call_statement(def.name, &args);
    debug!(target: "gateway", procedure = def.name, "executing: {}", stmt);

    let mut client = settings.connect().await?;
    let tx = client.transaction().await.map_err(classify_db)?;
    let responses = tx.simple_query(&stmt).await.map_err(classify_db)?;
    let tables = collect_tables(table_events(responses));
    tx.commit().await.map_err(classify_db)?;

    info!(
        target: "gateway",
        procedure = def.name,
        tables = tables.len(),
        "procedure executed"
    );
    Ok(outcome_from_tables(tables))
}
