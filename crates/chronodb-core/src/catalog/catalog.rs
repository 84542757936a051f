//! Catalog manager for table and super-table metadata.
//!
//! One catalog per database, fully in-memory. Table ids are allocated by the
//! engine so they stay unique across databases.

use std::sync::Arc;

use dashmap::DashMap;

use super::{StableDef, TableDef};
use crate::error::Error;

/// The catalog for a single database.
#[derive(Default)]
pub struct Catalog {
    /// Super-table definitions by name.
    stables: DashMap<String, Arc<StableDef>>,
    /// Table definitions by name.
    tables: DashMap<String, Arc<TableDef>>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a super-table definition.
    pub fn create_stable(&self, def: StableDef) -> Result<(), Error> {
        if self.stables.contains_key(&def.name) {
            return Err(Error::StableExists(def.name));
        }
        self.stables.insert(def.name.clone(), Arc::new(def));
        Ok(())
    }

    /// Get a super-table definition by name.
    pub fn get_stable(&self, name: &str) -> Result<Arc<StableDef>, Error> {
        self.stables
            .get(name)
            .map(|entry| entry.clone())
            .ok_or_else(|| Error::StableNotFound(name.to_string()))
    }

    /// Register a table definition.
    pub fn create_table(&self, def: TableDef) -> Result<Arc<TableDef>, Error> {
        if self.tables.contains_key(&def.name) {
            return Err(Error::TableExists(def.name));
        }
        let def = Arc::new(def);
        self.tables.insert(def.name.clone(), def.clone());
        Ok(def)
    }

    /// Get a table definition by name.
    pub fn get_table(&self, name: &str) -> Result<Arc<TableDef>, Error> {
        self.tables
            .get(name)
            .map(|entry| entry.clone())
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Remove a table definition, returning it for storage/cache cleanup.
    pub fn drop_table(&self, name: &str) -> Result<Arc<TableDef>, Error> {
        self.tables
            .remove(name)
            .map(|(_, def)| def)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Remove a super-table and all tables created from it.
    ///
    /// Returns the dropped table definitions for cleanup.
    pub fn drop_stable(&self, name: &str) -> Result<Vec<Arc<TableDef>>, Error> {
        if self.stables.remove(name).is_none() {
            return Err(Error::StableNotFound(name.to_string()));
        }
        let children: Vec<String> = self
            .tables
            .iter()
            .filter(|entry| entry.value().stable.as_deref() == Some(name))
            .map(|entry| entry.key().clone())
            .collect();
        let mut dropped = Vec::with_capacity(children.len());
        for child in children {
            if let Some((_, def)) = self.tables.remove(&child) {
                dropped.push(def);
            }
        }
        Ok(dropped)
    }

    /// All table definitions in the database.
    pub fn list_tables(&self) -> Vec<Arc<TableDef>> {
        self.tables.iter().map(|entry| entry.clone()).collect()
    }
}
