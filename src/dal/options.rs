use sea_query::Order;

/// Paging, ordering and projection for reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// Terms like `"created_at desc"` or `"id"`.
    pub order: Vec<String>,
    /// Overrides the record's column list when not empty.
    pub selects: Vec<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn order(mut self, term: impl Into<String>) -> Self {
        self.order.push(term.into());
        self
    }

    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selects.extend(columns.into_iter().map(Into::into));
        self
    }

    pub(crate) fn order_terms(&self) -> Vec<(String, Order)> {
        self.order
            .iter()
            .filter_map(|term| {
                let mut parts = term.split_whitespace();
                let column = parts.next()?.to_string();
                let order = match parts.next().map(str::to_ascii_lowercase).as_deref() {
                    Some("desc") => Order::Desc,
                    _ => Order::Asc,
                };
                Some((column, order))
            })
            .collect()
    }
}

/// One page of results and the total match count.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub total: u64,
    pub items: Vec<T>,
}
