//! Catalog introspection for registered procedures.
//!
//! Scans the database catalog over a single connection: for each registered
//! identifier, in registry order, an existence probe and, when present, the
//! persisted definition text. One identifier's failure is recorded against
//! that identifier only; the scan always finishes with exactly one entry per
//! registered procedure.

use serde::Serialize;
use tokio_postgres::Client;
use tracing::{info, warn};

use crate::error::{classify_db, GatewayResult};
use crate::gateway::ConnectSettings;
use crate::registry;

// Identifiers are bound as query parameters, never interpolated into the
// statement text.
const EXISTS_SQL: &str = "SELECT 1 FROM pg_catalog.pg_proc p \
    JOIN pg_catalog.pg_namespace n ON n.oid = p.pronamespace \
    WHERE p.proname = $1 \
    AND n.nspname NOT IN ('pg_catalog', 'information_schema') \
    LIMIT 1";

const DEFINITION_SQL: &str = "SELECT pg_catalog.pg_get_functiondef(p.oid) \
    FROM pg_catalog.pg_proc p \
    JOIN pg_catalog.pg_namespace n ON n.oid = p.pronamespace \
    WHERE p.proname = $1 \
    AND n.nspname NOT IN ('pg_catalog', 'information_schema') \
    LIMIT 1";

/// Outcome of a definition lookup for one registered procedure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DefinitionLookup {
    Defined { source: String },
    NotDefined,
    Failed { error: String },
}

/// One scan entry: a registered identifier together with its lookup outcome.
#[derive(Debug, Clone, Serialize)]
pub struct DefinitionEntry {
    pub procedure: &'static str,
    #[serde(flatten)]
    pub lookup: DefinitionLookup,
}

async fn lookup_one(client: &Client, name: &str) -> GatewayResult<DefinitionLookup> {
    let probe = client.query(EXISTS_SQL, &[&name]).await.map_err(classify_db)?;
    if probe.is_empty() {
        return Ok(DefinitionLookup::NotDefined);
    }
    let rows = client.query(DEFINITION_SQL, &[&name]).await.map_err(classify_db)?;
    match rows.first() {
        Some(row) => Ok(DefinitionLookup::Defined { source: row.get(0) }),
        None => Ok(DefinitionLookup::NotDefined),
    }
}

/// Scan the catalog for every registered procedure.
///
/// The whole scan shares one connection, acquired up front and released when
/// the scan ends. A failed open aborts the scan as a system error; after
/// that, per-identifier failures are folded into the entry list and never
/// stop the remaining lookups.
pub async fn inspect_all(settings: &ConnectSettings) -> GatewayResult<Vec<DefinitionEntry>> {
    let client = settings.connect().await?;
    let mut entries = Vec::with_capacity(registry::all().len());
    for def in registry::all() {
        let lookup = match lookup_one(&client, def.name).await {
            Ok(DefinitionLookup::NotDefined) => {
                warn!(target: "catalog", procedure = def.name, "procedure is not defined in the database");
                DefinitionLookup::NotDefined
            }
            Ok(found) => found,
            Err(e) => {
                warn!(target: "catalog", procedure = def.name, "definition lookup failed: {}", e);
                DefinitionLookup::Failed { error: e.message().to_string() }
            }
        };
        entries.push(DefinitionEntry { procedure: def.name, lookup });
    }
    info!(target: "catalog", entries = entries.len(), "catalog scan complete");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_serialization_flattens_lookup() {
        let defined = DefinitionEntry {
            procedure: "EndSession",
            lookup: DefinitionLookup::Defined { source: "CREATE PROCEDURE ...".into() },
        };
        let v = serde_json::to_value(&defined).unwrap();
        assert_eq!(v["procedure"], "EndSession");
        assert_eq!(v["status"], "defined");
        assert_eq!(v["source"], "CREATE PROCEDURE ...");

        let missing = DefinitionEntry { procedure: "GetEmployeeCount", lookup: DefinitionLookup::NotDefined };
        let v = serde_json::to_value(&missing).unwrap();
        assert_eq!(v["status"], "not_defined");
        assert!(v.get("source").is_none());

        let failed = DefinitionEntry {
            procedure: "LockMachine",
            lookup: DefinitionLookup::Failed { error: "permission denied".into() },
        };
        let v = serde_json::to_value(&failed).unwrap();
        assert_eq!(v["status"], "failed");
        assert_eq!(v["error"], "permission denied");
    }
}
