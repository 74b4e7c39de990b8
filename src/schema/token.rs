//! Operator and assignment vocabularies.

/// Column mapping that excludes a field.
pub const SKIP: &str = "-";

/// Assignment token marking a field as an OR-group.
pub const OR_GROUP: &str = "$or";

/// Comparison operators accepted in `operator = "..."`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Like,
    LeftLike,
    RightLike,
    FullLike,
    Null,
    JsonContains,
    JsonContainsAny,
    JsonContainsAll,
}

impl Operator {
    /// Parses an operator token; an absent or empty token means equality.
    pub fn parse(token: Option<&str>) -> Option<Self> {
        let op = match token.map(str::trim).unwrap_or_default() {
            "" | "=" => Operator::Eq,
            "!=" => Operator::Ne,
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            ">" => Operator::Gt,
            ">=" => Operator::Ge,
            "in" => Operator::In,
            "not in" => Operator::NotIn,
            "like" => Operator::Like,
            "left like" => Operator::LeftLike,
            "right like" => Operator::RightLike,
            "full like" => Operator::FullLike,
            "null" => Operator::Null,
            "json_contains" => Operator::JsonContains,
            "json_contains any" => Operator::JsonContainsAny,
            "json_contains all" => Operator::JsonContainsAll,
            _ => return None,
        };
        Some(op)
    }

    pub fn token(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::In => "in",
            Operator::NotIn => "not in",
            Operator::Like => "like",
            Operator::LeftLike => "left like",
            Operator::RightLike => "right like",
            Operator::FullLike => "full like",
            Operator::Null => "null",
            Operator::JsonContains => "json_contains",
            Operator::JsonContainsAny => "json_contains any",
            Operator::JsonContainsAll => "json_contains all",
        }
    }

    /// Operators that may be declared on a bare collection field.
    pub fn is_multi_valued(self) -> bool {
        matches!(
            self,
            Operator::In
                | Operator::NotIn
                | Operator::JsonContains
                | Operator::JsonContainsAny
                | Operator::JsonContainsAll
        )
    }
}

/// Assignment expressions accepted in `expr = "..."`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Assign {
    Set,
    Add,
    Sub,
    JsonSet,
    MergeJson,
}

impl Assign {
    /// Parses an assignment token; an absent or empty token means plain set.
    ///
    /// `$or` is not an assignment and is rejected here.
    pub fn parse(token: Option<&str>) -> Option<Self> {
        let assign = match token.map(str::trim).unwrap_or_default() {
            "" => Assign::Set,
            "+" => Assign::Add,
            "-" => Assign::Sub,
            "json_set" => Assign::JsonSet,
            "merge_json" => Assign::MergeJson,
            _ => return None,
        };
        Some(assign)
    }

    pub fn token(self) -> &'static str {
        match self {
            Assign::Set => "=",
            Assign::Add => "+",
            Assign::Sub => "-",
            Assign::JsonSet => "json_set",
            Assign::MergeJson => "merge_json",
        }
    }
}

/// Trims a tag value and treats blank as absent.
pub(crate) fn normalize(token: Option<&'static str>) -> Option<&'static str> {
    token.map(str::trim).filter(|t| !t.is_empty())
}
