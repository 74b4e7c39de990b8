//! Thin CRUD façade.
//!
//! [`Dal`] compiles where/update structs through the shared
//! [`Registry`], builds MySQL statements with `sea-query`, and hands them to
//! an [`Executor`]. Updates and deletes refuse to run without a condition.

mod options;

pub use options::{Page, QueryOptions};

use crate::config::DalConfig;
use crate::error::{Error, Result};
use crate::executor::{Executor, Row};
use crate::query::{Assignment, CompareOp, Operand, Predicate, UpdateMap};
use crate::record::Record;
use crate::reflect::{UpdateModel, WhereModel};
use crate::registry::Registry;
use sea_query::extension::mysql::{IndexHintScope, MySqlSelectStatementExt};
use sea_query::{Alias, Expr, MysqlQueryBuilder, Query, Value};
use std::marker::PhantomData;
use std::sync::Arc;

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;

/// Data access object for one record type and its where/update structs.
pub struct Dal<PO, W, U, E> {
    executor: E,
    registry: Arc<Registry>,
    config: DalConfig,
    _marker: PhantomData<fn() -> (PO, W, U)>,
}

impl<PO, W, U, E> Dal<PO, W, U, E>
where
    PO: Record,
    W: WhereModel,
    U: UpdateModel,
    E: Executor,
{
    pub fn new(executor: E, registry: Arc<Registry>) -> Self {
        Self {
            executor,
            registry,
            config: DalConfig::default(),
            _marker: PhantomData,
        }
    }

    pub fn with_config(mut self, config: DalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Inserts one record.
    pub fn create(&self, record: &PO) -> Result<u64> {
        self.insert_batch(std::slice::from_ref(record))
    }

    /// Inserts records in batches of `create_batch_size`.
    pub fn create_many(&self, records: &[PO]) -> Result<u64> {
        let mut affected = 0;
        for chunk in records.chunks(self.config.create_batch_size.max(1)) {
            affected += self.insert_batch(chunk)?;
        }
        Ok(affected)
    }

    pub fn count(&self, filter: W) -> Result<u64> {
        let (predicate, force_index) = self.compile_filter(filter)?;
        self.count_where(&predicate, force_index)
    }

    pub fn find(&self, filter: W, options: &QueryOptions) -> Result<Vec<PO>> {
        self.find_as::<PO>(filter, options)
    }

    /// Like [`Dal::find`], decoding rows into another record type and
    /// selecting its columns.
    pub fn find_as<R: Record>(&self, filter: W, options: &QueryOptions) -> Result<Vec<R>> {
        let (predicate, force_index) = self.compile_filter(filter)?;
        self.select_where::<R>(&predicate, force_index, options)
    }

    /// First matching record, if any.
    pub fn first(&self, filter: W, options: &QueryOptions) -> Result<Option<PO>> {
        let options = options.clone().limit(1);
        Ok(self.find(filter, &options)?.into_iter().next())
    }

    /// Records whose primary key is in `ids`. An empty slice matches nothing.
    pub fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<PO>> {
        let predicate = Predicate::compare(
            PO::primary_key(),
            CompareOp::In,
            Operand::List(ids.iter().copied().map(Value::from).collect()),
        );
        self.select_where::<PO>(&predicate, None, &QueryOptions::default())
    }

    /// Counts first and skips the select when nothing matches.
    pub fn find_page(&self, filter: W, options: &QueryOptions) -> Result<Page<PO>> {
        let (predicate, force_index) = self.compile_filter(filter)?;
        let total = self.count_where(&predicate, force_index)?;
        if total == 0 {
            return Ok(Page {
                total,
                items: Vec::new(),
            });
        }
        let items = self.select_where::<PO>(&predicate, force_index, options)?;
        Ok(Page { total, items })
    }

    /// Applies `update` to every row matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnconditionalWrite`] if `filter` compiles to an empty
    /// predicate. An update with no set fields returns `Ok(0)`.
    pub fn update(&self, filter: W, update: &U) -> Result<u64> {
        let (predicate, _) = self.compile_filter(filter)?;
        if predicate.is_empty() {
            return Err(Error::UnconditionalWrite("update"));
        }
        let map = self.registry.compile_update(update)?;
        self.update_where(&predicate, map)
    }

    pub fn update_by_id(&self, id: i64, update: &U) -> Result<u64> {
        let map = self.registry.compile_update(update)?;
        self.update_where(&self.id_predicate(id), map)
    }

    /// # Errors
    ///
    /// Returns [`Error::UnconditionalWrite`] if `filter` compiles to an empty
    /// predicate.
    pub fn delete(&self, filter: W) -> Result<u64> {
        let (predicate, _) = self.compile_filter(filter)?;
        if predicate.is_empty() {
            return Err(Error::UnconditionalWrite("delete"));
        }
        self.delete_where(&predicate)
    }

    pub fn delete_by_id(&self, id: i64) -> Result<u64> {
        self.delete_where(&self.id_predicate(id))
    }

    fn compile_filter(&self, mut filter: W) -> Result<(Predicate, Option<&'static str>)> {
        filter.inject_defaults();
        let predicate = self.registry.compile_where(&filter)?;
        log::trace!("{} where: {}", PO::table_name(), predicate);
        Ok((predicate, filter.force_index()))
    }

    fn id_predicate(&self, id: i64) -> Predicate {
        Predicate::compare(PO::primary_key(), CompareOp::Eq, Operand::Value(Value::from(id)))
    }

    fn count_where(&self, predicate: &Predicate, force_index: Option<&'static str>) -> Result<u64> {
        let mut query = Query::select();
        query
            .expr(Expr::cust("COUNT(*)"))
            .from(Alias::new(PO::table_name().to_string()));
        if let Some(index) = force_index {
            query.use_index(Alias::new(index.to_string()), IndexHintScope::All);
        }
        if let Some(condition) = where_expr(predicate) {
            query.and_where(condition);
        }

        let (sql, values) = query.build(MysqlQueryBuilder);
        let rows = self.query(&sql, &values.0)?;
        match rows.first() {
            Some(row) => Ok(row.get_at::<i64>(0)?.max(0) as u64),
            None => Ok(0),
        }
    }

    fn select_where<R: Record>(
        &self,
        predicate: &Predicate,
        force_index: Option<&'static str>,
        options: &QueryOptions,
    ) -> Result<Vec<R>> {
        let columns: Vec<String> = if options.selects.is_empty() {
            self.registry
                .record_columns::<R>()?
                .iter()
                .map(|c| c.to_string())
                .collect()
        } else {
            options.selects.clone()
        };

        let mut query = Query::select();
        query
            .columns(columns.into_iter().map(Alias::new))
            .from(Alias::new(PO::table_name().to_string()));
        if let Some(index) = force_index {
            query.use_index(Alias::new(index.to_string()), IndexHintScope::All);
        }
        if let Some(condition) = where_expr(predicate) {
            query.and_where(condition);
        }
        for (column, order) in options.order_terms() {
            query.order_by(Alias::new(column), order);
        }
        if let Some(limit) = self.config.cap_limit(options.limit) {
            query.limit(limit);
        }
        if let Some(offset) = options.offset {
            query.offset(offset);
        }

        let (sql, values) = query.build(MysqlQueryBuilder);
        let rows = self.query(&sql, &values.0)?;
        rows.iter().map(R::from_row).collect()
    }

    fn insert_batch(&self, records: &[PO]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut query = Query::insert();
        query
            .into_table(Alias::new(PO::table_name().to_string()))
            .columns(PO::columns().iter().map(|c| Alias::new(c.column.to_string())));
        for record in records {
            query
                .values(record.values().into_iter().map(Into::into))
                .map_err(|e| Error::Statement(e.to_string()))?;
        }

        let (sql, values) = query.build(MysqlQueryBuilder);
        self.execute("insert", &sql, &values.0)
    }

    fn update_where(&self, predicate: &Predicate, map: UpdateMap) -> Result<u64> {
        if map.is_empty() {
            return Ok(0);
        }

        let mut query = Query::update();
        query.table(Alias::new(PO::table_name().to_string()));
        for (column, assignment) in map {
            match assignment {
                Assignment::Value(value) => query.value(Alias::new(column), value),
                Assignment::Expr(expr) => query.value(
                    Alias::new(column),
                    Expr::cust_with_values(expr.sql, expr.params),
                ),
            };
        }
        if let Some(condition) = where_expr(predicate) {
            query.and_where(condition);
        }

        let (sql, values) = query.build(MysqlQueryBuilder);
        self.execute("update", &sql, &values.0)
    }

    fn delete_where(&self, predicate: &Predicate) -> Result<u64> {
        let mut query = Query::delete();
        query.from_table(Alias::new(PO::table_name().to_string()));
        if let Some(condition) = where_expr(predicate) {
            query.and_where(condition);
        }

        let (sql, values) = query.build(MysqlQueryBuilder);
        self.execute("delete", &sql, &values.0)
    }

    fn execute(&self, op: &'static str, sql: &str, values: &[Value]) -> Result<u64> {
        self.log_statement(sql, values);
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("tagdal.execute", op, table = PO::table_name()).entered();
        #[cfg(feature = "metrics")]
        METRICS.record_statement();
        #[cfg(not(feature = "tracing"))]
        let _ = op;

        self.executor.execute(sql, values)
    }

    fn query(&self, sql: &str, values: &[Value]) -> Result<Vec<Row>> {
        self.log_statement(sql, values);
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("tagdal.query", table = PO::table_name()).entered();
        #[cfg(feature = "metrics")]
        METRICS.record_statement();

        self.executor.query_all(sql, values)
    }

    fn log_statement(&self, sql: &str, values: &[Value]) {
        if self.config.log_statements {
            log::debug!("{} {:?}", sql, values);
        }
    }
}

/// The predicate as a custom expression with its flattened values.
fn where_expr(predicate: &Predicate) -> Option<Expr> {
    if predicate.is_empty() {
        return None;
    }
    let (sql, values) = predicate.to_bound_sql();
    Some(Expr::cust_with_values(sql, values))
}
