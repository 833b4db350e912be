//! Index migrations contributed by modules.

use mongodb::bson::{self, doc, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::{document::Document, error::DbResult, store::Store};

/// An index over one or more top-level fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDefinition {
    pub name: &'static str,
    pub keys: &'static [&'static str],
    pub unique: bool,
}

/// Migration definition for modules
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub collection: &'static str,
    pub indexes: Vec<IndexDefinition>,
}

/// Ledger entry recording that a module's migration has been applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AppliedMigration {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    module: String,
    migration: String,
    applied_at: bson::DateTime,
}

impl Document for AppliedMigration {
    const COLLECTION: &'static str = "_migrations";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

const LEDGER_INDEX: IndexDefinition = IndexDefinition {
    name: "migrations_module_id_unique",
    keys: &["module", "migration"],
    unique: true,
};

/// Apply every migration not yet recorded in the ledger, in the given order.
///
/// Returns the number of migrations applied by this call.
pub async fn run(store: &Store, migrations: &[(String, Migration)]) -> DbResult<usize> {
    store
        .create_index(AppliedMigration::COLLECTION, &LEDGER_INDEX)
        .await?;
    let ledger = store.repository::<AppliedMigration>();

    let mut applied = 0;
    for (module, migration) in migrations {
        let recorded = ledger
            .find_one(doc! { "module": module.as_str(), "migration": migration.id })
            .await?;
        if recorded.is_some() {
            tracing::debug!(target: "shelf-db", %module, migration = migration.id, "migration already applied");
            continue;
        }

        for index in &migration.indexes {
            store.create_index(migration.collection, index).await?;
        }

        ledger
            .create(AppliedMigration {
                id: None,
                module: module.clone(),
                migration: migration.id.to_string(),
                applied_at: bson::DateTime::now(),
            })
            .await?;
        applied += 1;

        tracing::info!(target: "shelf-db", %module, migration = migration.id, "migration applied");
    }

    Ok(applied)
}
