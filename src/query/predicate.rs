//! Predicate tree and its SQL rendering.

use crate::value::FieldExpr;
use sea_query::Value;
use std::fmt;

/// A compiled WHERE condition.
///
/// `And(vec![])` is the empty predicate and matches every row.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare(Comparison),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub column: String,
    pub op: CompareOp,
    pub operand: Operand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Like,
    IsNull,
    IsNotNull,
    JsonContains,
}

impl CompareOp {
    fn keyword(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::In => "IN",
            CompareOp::NotIn => "NOT IN",
            CompareOp::Like => "LIKE",
            CompareOp::IsNull => "IS NULL",
            CompareOp::IsNotNull => "IS NOT NULL",
            CompareOp::JsonContains => "JSON_CONTAINS",
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    None,
    Value(Value),
    List(Vec<Value>),
    Column(FieldExpr),
}

/// A bound parameter as kept by [`Fragment`].
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Value(Value),
    List(Vec<Value>),
}

/// Rendered SQL with one parameter per `?`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub sql: String,
    pub params: Vec<Param>,
}

impl Predicate {
    /// The predicate matching every row.
    pub fn all() -> Self {
        Predicate::And(Vec::new())
    }

    pub fn compare(column: impl Into<String>, op: CompareOp, operand: Operand) -> Self {
        Predicate::Compare(Comparison {
            column: column.into(),
            op,
            operand,
        })
    }

    /// True when the predicate constrains nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Predicate::Compare(_) => false,
            Predicate::And(children) | Predicate::Or(children) => {
                children.iter().all(Predicate::is_empty)
            }
        }
    }

    /// Number of nested OR levels.
    pub fn depth(&self) -> usize {
        match self {
            Predicate::Compare(_) => 0,
            Predicate::And(children) => children.iter().map(Predicate::depth).max().unwrap_or(0),
            Predicate::Or(children) => {
                1 + children.iter().map(Predicate::depth).max().unwrap_or(0)
            }
        }
    }

    /// Bound parameters in pre-order, matching the placeholders of
    /// [`Predicate::to_fragment`].
    pub fn params(&self) -> Vec<Param> {
        self.to_fragment().params
    }

    /// Renders with list parameters kept whole: `` `id` IN (?) ``.
    pub fn to_fragment(&self) -> Fragment {
        let mut renderer = Renderer::new(false);
        renderer.root(self);
        Fragment {
            sql: renderer.sql,
            params: renderer.params,
        }
    }

    /// Renders with one placeholder per list element and flat values.
    ///
    /// An empty list renders as `IN (NULL)`.
    pub fn to_bound_sql(&self) -> (String, Vec<Value>) {
        let mut renderer = Renderer::new(true);
        renderer.root(self);
        let values = renderer
            .params
            .into_iter()
            .flat_map(|p| match p {
                Param::Value(v) => vec![v],
                Param::List(vs) => vs,
            })
            .collect();
        (renderer.sql, values)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fragment().sql)
    }
}

/// Quotes an identifier with backticks, segment by segment:
/// `user.id` becomes `` `user`.`id` ``.
pub fn quote_column(name: &str) -> String {
    name.split('.')
        .map(|segment| format!("`{}`", segment.trim().replace('`', "``")))
        .collect::<Vec<_>>()
        .join(".")
}

struct Renderer {
    sql: String,
    params: Vec<Param>,
    expand: bool,
}

impl Renderer {
    fn new(expand: bool) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            expand,
        }
    }

    fn root(&mut self, predicate: &Predicate) {
        match predicate {
            Predicate::And(children) => self.conjunction(children),
            other => self.node(other),
        }
    }

    fn node(&mut self, predicate: &Predicate) {
        match predicate {
            Predicate::Compare(c) => self.comparison(c),
            Predicate::And(children) => self.conjunction(children),
            Predicate::Or(children) => {
                self.sql.push('(');
                for (i, child) in children.iter().filter(|c| !c.is_empty()).enumerate() {
                    if i > 0 {
                        self.sql.push_str(" OR ");
                    }
                    self.branch(child);
                }
                self.sql.push(')');
            }
        }
    }

    fn branch(&mut self, predicate: &Predicate) {
        match predicate {
            Predicate::And(children) if live(children) > 1 => {
                self.sql.push('(');
                self.conjunction(children);
                self.sql.push(')');
            }
            other => self.node(other),
        }
    }

    fn conjunction(&mut self, children: &[Predicate]) {
        for (i, child) in children.iter().filter(|c| !c.is_empty()).enumerate() {
            if i > 0 {
                self.sql.push_str(" AND ");
            }
            self.node(child);
        }
    }

    fn comparison(&mut self, c: &Comparison) {
        let column = quote_column(&c.column);
        match c.op {
            CompareOp::IsNull | CompareOp::IsNotNull => {
                self.sql.push_str(&format!("{} {}", column, c.op.keyword()));
            }
            CompareOp::JsonContains => {
                self.sql.push_str(&format!("JSON_CONTAINS({}, ", column));
                self.operand(&c.operand);
                self.sql.push(')');
            }
            CompareOp::In | CompareOp::NotIn => {
                self.sql.push_str(&format!("{} {} (", column, c.op.keyword()));
                self.operand(&c.operand);
                self.sql.push(')');
            }
            op => {
                self.sql.push_str(&format!("{} {} ", column, op.keyword()));
                self.operand(&c.operand);
            }
        }
    }

    fn operand(&mut self, operand: &Operand) {
        match operand {
            Operand::None => {}
            Operand::Value(v) => {
                self.sql.push('?');
                self.params.push(Param::Value(v.clone()));
            }
            Operand::Column(expr) => self.sql.push_str(&quote_column(expr.as_str())),
            Operand::List(values) if !self.expand => {
                self.sql.push('?');
                self.params.push(Param::List(values.clone()));
            }
            Operand::List(values) if values.is_empty() => self.sql.push_str("NULL"),
            Operand::List(values) => {
                let placeholders = vec!["?"; values.len()].join(", ");
                self.sql.push_str(&placeholders);
                self.params.push(Param::List(values.clone()));
            }
        }
    }
}

fn live(children: &[Predicate]) -> usize {
    children.iter().filter(|c| !c.is_empty()).count()
}
