//! Engine facade: databases, sessions, and SQL dispatch.
//!
//! One [`Engine`] owns the row store and the last-value cache; databases
//! share them and differ only in catalog contents and cache model. Table
//! ids are allocated engine-wide so the store's key space and the cache
//! arena never collide across databases.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use chronodb_lang::{
    parse, ColumnSpec, CreateTableBody, Literal, SelectStatement, Statement,
};

use crate::cache::{CacheModel, LastCache};
use crate::catalog::{Catalog, ColumnDef, StableDef, TableDef, TableId, TableSchema};
use crate::error::Error;
use crate::query::{
    bind_projections, render_plan, AggregateRewriter, BoundProjection, PhysicalPlan, PlanSelector,
    QueryClassification, QueryExecutor, ResultSet,
};
use crate::storage::{RowStore, StoreConfig};
use crate::value::Value;

/// Storage and cache shared by every database of an engine.
struct Shared {
    store: RowStore,
    cache: LastCache,
    next_table_id: AtomicU64,
}

impl Shared {
    fn allocate_table_id(&self) -> TableId {
        self.next_table_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// The database engine.
pub struct Engine {
    shared: Arc<Shared>,
    databases: DashMap<String, Arc<Database>>,
}

impl Engine {
    /// Open an engine over the given store configuration.
    pub fn open(config: StoreConfig) -> Result<Self, Error> {
        let store = RowStore::open(config)?;
        if store.was_recovered() {
            info!("row store recovered from a previous run");
        }
        Ok(Self {
            shared: Arc::new(Shared {
                store,
                cache: LastCache::new(),
                next_table_id: AtomicU64::new(0),
            }),
            databases: DashMap::new(),
        })
    }

    /// Create a database with the given cache model.
    pub fn create_database(
        &self,
        name: &str,
        cache_model: CacheModel,
        if_not_exists: bool,
    ) -> Result<Arc<Database>, Error> {
        if let Some(existing) = self.databases.get(name) {
            if if_not_exists {
                return Ok(existing.clone());
            }
            return Err(Error::DatabaseExists(name.to_string()));
        }
        let db = Arc::new(Database {
            name: name.to_string(),
            cache_model,
            catalog: Catalog::new(),
            shared: self.shared.clone(),
            write_locks: DashMap::new(),
        });
        self.databases.insert(name.to_string(), db.clone());
        info!(database = name, model = cache_model.as_str(), "database created");
        Ok(db)
    }

    /// Drop a database and every table in it.
    pub fn drop_database(&self, name: &str, if_exists: bool) -> Result<(), Error> {
        let Some((_, db)) = self.databases.remove(name) else {
            if if_exists {
                return Ok(());
            }
            return Err(Error::DatabaseNotFound(name.to_string()));
        };
        for table in db.catalog.list_tables() {
            db.release_table(&table)?;
        }
        info!(database = name, "database dropped");
        Ok(())
    }

    /// Look up a database by name.
    pub fn database(&self, name: &str) -> Result<Arc<Database>, Error> {
        self.databases
            .get(name)
            .map(|entry| entry.clone())
            .ok_or_else(|| Error::DatabaseNotFound(name.to_string()))
    }

    /// Open a session for statement execution.
    pub fn session(&self) -> Session<'_> {
        Session {
            engine: self,
            current: RwLock::new(None),
        }
    }

    /// Flush pending storage writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.shared.store.flush()
    }
}

/// A single database: a catalog plus the cache model applied to its tables.
pub struct Database {
    name: String,
    cache_model: CacheModel,
    catalog: Catalog,
    shared: Arc<Shared>,
    /// Per-table write serialization, so a row's store write and cache
    /// update land in arrival order.
    write_locks: DashMap<TableId, Arc<Mutex<()>>>,
}

impl Database {
    /// Database name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The cache model this database was created with.
    pub fn cache_model(&self) -> CacheModel {
        self.cache_model
    }

    /// Create a super-table.
    pub fn create_stable(
        &self,
        name: &str,
        columns: Vec<ColumnDef>,
        tags: Vec<ColumnDef>,
    ) -> Result<(), Error> {
        let schema = TableSchema::new(columns)?;
        if tags.is_empty() {
            return Err(Error::Semantic(
                "a super-table needs at least one tag column".into(),
            ));
        }
        self.catalog.create_stable(StableDef {
            name: name.to_string(),
            schema,
            tags,
        })
    }

    /// Create a standalone table with its own schema.
    pub fn create_table(&self, name: &str, schema: TableSchema) -> Result<Arc<TableDef>, Error> {
        self.register_table(TableDef {
            id: self.shared.allocate_table_id(),
            name: name.to_string(),
            schema,
            stable: None,
            tag_values: Vec::new(),
        })
    }

    /// Create a sub-table from a super-table with the given tag values.
    pub fn create_table_using(
        &self,
        name: &str,
        stable: &str,
        tags: Vec<Value>,
    ) -> Result<Arc<TableDef>, Error> {
        let stable_def = self.catalog.get_stable(stable)?;
        if tags.len() != stable_def.tags.len() {
            return Err(Error::Semantic(format!(
                "stable '{}' has {} tag columns, got {} values",
                stable,
                stable_def.tags.len(),
                tags.len()
            )));
        }
        let tag_values = stable_def
            .tags
            .iter()
            .zip(tags)
            .map(|(col, value)| col.ty.coerce(value))
            .collect::<Result<Vec<_>, _>>()?;
        self.register_table(TableDef {
            id: self.shared.allocate_table_id(),
            name: name.to_string(),
            schema: stable_def.schema.clone(),
            stable: Some(stable.to_string()),
            tag_values,
        })
    }

    fn register_table(&self, def: TableDef) -> Result<Arc<TableDef>, Error> {
        let column_count = def.schema.column_count();
        let def = self.catalog.create_table(def)?;
        self.shared.cache.register(def.id, column_count);
        debug!(database = %self.name, table = %def.name, id = def.id, "table created");
        Ok(def)
    }

    /// Drop a table, its rows, and its cache entry.
    pub fn drop_table(&self, name: &str, if_exists: bool) -> Result<(), Error> {
        let def = match self.catalog.drop_table(name) {
            Ok(def) => def,
            Err(Error::TableNotFound(_)) if if_exists => return Ok(()),
            Err(err) => return Err(err),
        };
        self.release_table(&def)
    }

    /// Drop a super-table and every sub-table created from it.
    pub fn drop_stable(&self, name: &str, if_exists: bool) -> Result<(), Error> {
        let dropped = match self.catalog.drop_stable(name) {
            Ok(dropped) => dropped,
            Err(Error::StableNotFound(_)) if if_exists => return Ok(()),
            Err(err) => return Err(err),
        };
        for def in dropped {
            self.release_table(&def)?;
        }
        Ok(())
    }

    fn release_table(&self, def: &TableDef) -> Result<(), Error> {
        self.shared.store.drop_table(def.id)?;
        self.shared.cache.evict(def.id);
        self.write_locks.remove(&def.id);
        Ok(())
    }

    /// Insert rows into a table.
    ///
    /// Each row is aligned to the schema (missing columns fill with NULL
    /// when an explicit column list is given), coerced to the declared
    /// column types, then written to the store and the cache under the
    /// table's write lock. Returns the number of rows written.
    pub fn insert(
        &self,
        table: &str,
        columns: Option<&[String]>,
        rows: Vec<Vec<Value>>,
    ) -> Result<u64, Error> {
        let def = self.catalog.get_table(table)?;
        let lock = self.write_lock(def.id);
        let _guard = lock.lock();

        let mut written = 0u64;
        for row in rows {
            let aligned = self.align_row(&def, columns, row)?;
            let ts = match aligned[0] {
                Value::Timestamp(ts) => ts,
                _ => {
                    return Err(Error::Semantic(format!(
                        "column '{}' requires a non-null timestamp",
                        def.schema.timestamp_column()
                    )))
                }
            };
            self.shared.store.upsert(def.id, ts, &aligned)?;
            self.shared.cache.apply(def.id, ts, &aligned, self.cache_model);
            written += 1;
        }
        debug!(database = %self.name, table, rows = written, "inserted rows");
        Ok(written)
    }

    fn align_row(
        &self,
        def: &TableDef,
        columns: Option<&[String]>,
        row: Vec<Value>,
    ) -> Result<Vec<Value>, Error> {
        let schema = &def.schema;
        let mut aligned = vec![Value::Null; schema.column_count()];
        match columns {
            Some(names) => {
                if names.len() != row.len() {
                    return Err(Error::Semantic(format!(
                        "{} columns named but {} values given",
                        names.len(),
                        row.len()
                    )));
                }
                for (name, value) in names.iter().zip(row) {
                    let index = schema.column_index(name).ok_or_else(|| {
                        Error::Semantic(format!("unknown column '{}'", name))
                    })?;
                    aligned[index] = value;
                }
            }
            None => {
                if row.len() != schema.column_count() {
                    return Err(Error::Semantic(format!(
                        "table '{}' has {} columns but {} values given",
                        def.name,
                        schema.column_count(),
                        row.len()
                    )));
                }
                aligned = row;
            }
        }
        aligned
            .into_iter()
            .zip(schema.columns())
            .map(|(value, col)| col.ty.coerce(value))
            .collect()
    }

    fn write_lock(&self, table_id: TableId) -> Arc<Mutex<()>> {
        self.write_locks
            .entry(table_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run a SELECT and materialize its result.
    pub fn query(&self, select: &SelectStatement) -> Result<ResultSet, Error> {
        let (table, projections, classification) = self.analyze(select)?;
        QueryExecutor::new(&self.shared.store, &self.shared.cache).execute(
            &table,
            &projections,
            &classification,
        )
    }

    /// The physical plan a SELECT would run with.
    pub fn explain_plan(&self, select: &SelectStatement) -> Result<PhysicalPlan, Error> {
        let (_, _, classification) = self.analyze(select)?;
        Ok(PlanSelector::select(&classification))
    }

    /// EXPLAIN output: one description line per plan node.
    pub fn explain(&self, select: &SelectStatement) -> Result<Vec<String>, Error> {
        let (table, _, classification) = self.analyze(select)?;
        let plan = PlanSelector::select(&classification);
        Ok(render_plan(&plan, &table.name))
    }

    fn analyze(
        &self,
        select: &SelectStatement,
    ) -> Result<(Arc<TableDef>, Vec<BoundProjection>, QueryClassification), Error> {
        let table = self.catalog.get_table(&select.table.value)?;
        let exprs: Vec<_> = select
            .projections
            .iter()
            .map(|p| p.value.clone())
            .collect();
        let projections = bind_projections(&table.schema, &exprs)?;
        let classification = AggregateRewriter::new(self.cache_model).classify(&projections)?;
        Ok((table, projections, classification))
    }
}

/// A session: a statement executor with a current database.
pub struct Session<'a> {
    engine: &'a Engine,
    current: RwLock<Option<Arc<Database>>>,
}

impl Session<'_> {
    /// Parse and execute one SQL statement.
    pub fn execute(&self, sql: &str) -> Result<ResultSet, Error> {
        match parse(sql)? {
            Statement::CreateDatabase {
                name,
                if_not_exists,
                cache_model,
            } => {
                let model = match cache_model {
                    Some(spec) => CacheModel::parse(&spec.value).ok_or_else(|| {
                        Error::Semantic(format!("unknown cache model '{}'", spec.value))
                    })?,
                    None => CacheModel::default(),
                };
                self.engine
                    .create_database(&name.value, model, if_not_exists)?;
                Ok(ResultSet::empty(Vec::new()))
            }
            Statement::DropDatabase { name, if_exists } => {
                self.engine.drop_database(&name.value, if_exists)?;
                let mut current = self.current.write();
                if current.as_ref().is_some_and(|db| db.name() == name.value) {
                    *current = None;
                }
                Ok(ResultSet::empty(Vec::new()))
            }
            Statement::Use { name } => {
                let db = self.engine.database(&name.value)?;
                *self.current.write() = Some(db);
                Ok(ResultSet::empty(Vec::new()))
            }
            Statement::CreateStable {
                name,
                columns,
                tags,
            } => {
                self.database()?.create_stable(
                    &name.value,
                    column_defs(columns),
                    column_defs(tags),
                )?;
                Ok(ResultSet::empty(Vec::new()))
            }
            Statement::DropStable { name, if_exists } => {
                self.database()?.drop_stable(&name.value, if_exists)?;
                Ok(ResultSet::empty(Vec::new()))
            }
            Statement::CreateTable { name, body } => {
                let db = self.database()?;
                match body {
                    CreateTableBody::Using { stable, tags } => {
                        let tags = tags
                            .into_iter()
                            .map(|lit| literal_to_value(lit.value))
                            .collect();
                        db.create_table_using(&name.value, &stable.value, tags)?;
                    }
                    CreateTableBody::Columns(columns) => {
                        let schema = TableSchema::new(column_defs(columns))?;
                        db.create_table(&name.value, schema)?;
                    }
                }
                Ok(ResultSet::empty(Vec::new()))
            }
            Statement::DropTable { name, if_exists } => {
                self.database()?.drop_table(&name.value, if_exists)?;
                Ok(ResultSet::empty(Vec::new()))
            }
            Statement::Insert {
                table,
                columns,
                rows,
            } => {
                let columns: Option<Vec<String>> = columns
                    .map(|names| names.into_iter().map(|name| name.value).collect());
                let rows: Vec<Vec<Value>> = rows
                    .into_iter()
                    .map(|row| {
                        row.into_iter()
                            .map(|lit| literal_to_value(lit.value))
                            .collect()
                    })
                    .collect();
                self.database()?
                    .insert(&table.value, columns.as_deref(), rows)?;
                Ok(ResultSet::empty(Vec::new()))
            }
            Statement::Select(select) => self.database()?.query(&select),
            Statement::Explain(select) => {
                let lines = self.database()?.explain(&select)?;
                Ok(ResultSet {
                    columns: vec!["plan".to_string()],
                    rows: lines.into_iter().map(|l| vec![Value::String(l)]).collect(),
                })
            }
        }
    }

    /// The current database, or an error if none was selected.
    pub fn database(&self) -> Result<Arc<Database>, Error> {
        self.current
            .read()
            .clone()
            .ok_or(Error::NoDatabaseSelected)
    }
}

fn column_defs(specs: Vec<ColumnSpec>) -> Vec<ColumnDef> {
    specs
        .into_iter()
        .map(|spec| ColumnDef::new(spec.name.value, spec.ty.into()))
        .collect()
}

fn literal_to_value(literal: Literal) -> Value {
    match literal {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(b),
        Literal::Int(n) => Value::Int64(n),
        Literal::Float(f) => Value::Float64(f),
        Literal::String(s) => Value::String(s),
    }
}
