use serde_json::Value as JsonValue;

use crate::param::{IntoParam, Param};

/// PostgREST comparison operators, by wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Is,
    Like,
    ILike,
    /// `@>`
    Contains,
    /// `<@`
    ContainedBy,
    /// `&&`
    Overlaps,
    Fts,
    Plfts,
    Phfts,
    Wfts,
}

impl FilterOperator {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::Is => "is",
            Self::Like => "like",
            Self::ILike => "ilike",
            Self::Contains => "cs",
            Self::ContainedBy => "cd",
            Self::Overlaps => "ov",
            Self::Fts => "fts",
            Self::Plfts => "plfts",
            Self::Phfts => "phfts",
            Self::Wfts => "wfts",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        let op = match tag {
            "eq" => Self::Eq,
            "neq" => Self::Neq,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "in" => Self::In,
            "is" => Self::Is,
            "like" => Self::Like,
            "ilike" => Self::ILike,
            "cs" => Self::Contains,
            "cd" => Self::ContainedBy,
            "ov" => Self::Overlaps,
            "fts" => Self::Fts,
            "plfts" => Self::Plfts,
            "phfts" => Self::Phfts,
            "wfts" => Self::Wfts,
            _ => return None,
        };
        Some(op)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsValue {
    Null,
    NotNull,
    True,
    False,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSearchType {
    /// `to_tsquery`
    Raw,
    Plain,
    Phrase,
    Websearch,
}

impl TextSearchType {
    fn operator(&self) -> FilterOperator {
        match self {
            Self::Raw => FilterOperator::Fts,
            Self::Plain => FilterOperator::Plfts,
            Self::Phrase => FilterOperator::Phfts,
            Self::Websearch => FilterOperator::Wfts,
        }
    }
}

/// One `column=value` query constraint, with the operator tag already
/// baked into `value` (`eq.5`, `in.(1,2)`, `not.is.null`).
///
/// Logical groups use the group name as the column (`or`, `and`,
/// `messages.or`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

/// A [`Filter`] split back into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFilter<'a> {
    pub column: &'a str,
    pub negated: bool,
    pub operator: FilterOperator,
    /// Operator modifier, e.g. the text-search config in `fts(english)`.
    pub modifier: Option<&'a str>,
    pub operand: &'a str,
}

impl Filter {
    fn raw(column: &str, value: String) -> Self {
        Self {
            column: column.to_string(),
            value,
        }
    }

    /// `column=<op>.<value>` for any single-operand operator.
    pub fn comparison(column: &str, operator: FilterOperator, value: &Param) -> Self {
        Self::raw(column, format!("{}.{}", operator.tag(), value.render()))
    }

    /// `column=in.(a,b,c)`.
    ///
    /// Values are joined with a bare comma; values containing `,`, `(` or
    /// `)` are not escaped.
    pub fn in_list(column: &str, values: &[Param]) -> Self {
        let list = values
            .iter()
            .map(Param::render)
            .collect::<Vec<_>>()
            .join(",");
        Self::raw(column, format!("in.({})", list))
    }

    pub fn is(column: &str, value: IsValue) -> Self {
        let val = match value {
            IsValue::Null => "is.null",
            IsValue::NotNull => "not.is.null",
            IsValue::True => "is.true",
            IsValue::False => "is.false",
        };
        Self::raw(column, val.to_string())
    }

    /// `column=cs.<json>` / `cd.<json>` / `ov.<json>`.
    pub fn containment(column: &str, operator: FilterOperator, value: &JsonValue) -> Self {
        Self::raw(column, format!("{}.{}", operator.tag(), value))
    }

    pub fn text_search(
        column: &str,
        query: &str,
        config: Option<&str>,
        search_type: TextSearchType,
    ) -> Self {
        let tag = search_type.operator().tag();
        let value = match config {
            Some(cfg) => format!("{}({}).{}", tag, cfg, query),
            None => format!("{}.{}", tag, query),
        };
        Self::raw(column, value)
    }

    /// `column=not.<tag>.<value>`; `tag` is passed through untouched.
    pub fn negated(column: &str, operator_tag: &str, value: &Param) -> Self {
        Self::raw(column, format!("not.{}.{}", operator_tag, value.render()))
    }

    /// `column=<tag>.<value>` with a caller-supplied tag.
    pub fn generic(column: &str, operator_tag: &str, value: &Param) -> Self {
        Self::raw(column, format!("{}.{}", operator_tag, value.render()))
    }

    /// `<group>=(<expression>)`, e.g. `or=(status.eq.sent,status.eq.queued)`.
    pub fn group(group: &str, expression: &str) -> Self {
        Self::raw(group, format!("({})", expression))
    }

    pub fn to_query_pair(&self) -> (&str, &str) {
        (&self.column, &self.value)
    }

    /// Split into `(column, negated, operator, operand)`.
    ///
    /// Returns `None` for logical groups and unknown operator tags.
    pub fn decode(&self) -> Option<DecodedFilter<'_>> {
        let (negated, rest) = match self.value.strip_prefix("not.") {
            Some(rest) => (true, rest),
            None => (false, self.value.as_str()),
        };
        let (head, operand) = rest.split_once('.')?;
        let (tag, modifier) = match head.split_once('(') {
            Some((tag, m)) => (tag, Some(m.strip_suffix(')')?)),
            None => (head, None),
        };
        let operator = FilterOperator::from_tag(tag)?;
        Some(DecodedFilter {
            column: &self.column,
            negated,
            operator,
            modifier,
            operand,
        })
    }
}

/// Validate that a column name is safe to put in a query key.
pub fn validate_column_name(name: &str) -> Result<(), restbase_core::RestError> {
    validate_identifier(name, "Column")
}

/// Validate a resource, function or column identifier.
pub fn validate_identifier(name: &str, kind: &str) -> Result<(), restbase_core::RestError> {
    if name.is_empty() {
        return Err(restbase_core::RestError::query_builder(format!(
            "{kind} name cannot be empty"
        )));
    }
    if name.contains('"') || name.contains(';') || name.contains("--") {
        return Err(restbase_core::RestError::query_builder(format!(
            "Invalid {} name: {name:?} (contains prohibited characters)",
            kind.to_lowercase()
        )));
    }
    Ok(())
}

/// Trait providing all filter methods for query builders.
///
/// An invalid column name is logged and the filter is not added. The
/// builder is rejected instead, so execution fails without sending a
/// request that would be less constrained than the caller asked for.
pub trait Filterable: Sized {
    /// Get a mutable reference to the filter list.
    fn filters_mut(&mut self) -> &mut Vec<Filter>;

    /// Mark the builder as invalid.
    fn reject(&mut self, message: String);

    #[doc(hidden)]
    fn push_filter(mut self, method: &str, column: &str, filter: impl FnOnce() -> Filter) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in {method} filter: {e}");
            self.reject(format!("{method} filter: {}", e.message()));
            return self;
        }
        let filter = filter();
        self.filters_mut().push(filter);
        self
    }

    /// Filter: column = value
    fn eq(self, column: &str, value: impl IntoParam) -> Self {
        let value = value.into_param();
        self.push_filter("eq", column, || Filter::comparison(column, FilterOperator::Eq, &value))
    }

    /// Filter: column != value
    fn neq(self, column: &str, value: impl IntoParam) -> Self {
        let value = value.into_param();
        self.push_filter("neq", column, || Filter::comparison(column, FilterOperator::Neq, &value))
    }

    /// Filter: column > value
    fn gt(self, column: &str, value: impl IntoParam) -> Self {
        let value = value.into_param();
        self.push_filter("gt", column, || Filter::comparison(column, FilterOperator::Gt, &value))
    }

    /// Filter: column >= value
    fn gte(self, column: &str, value: impl IntoParam) -> Self {
        let value = value.into_param();
        self.push_filter("gte", column, || Filter::comparison(column, FilterOperator::Gte, &value))
    }

    /// Filter: column < value
    fn lt(self, column: &str, value: impl IntoParam) -> Self {
        let value = value.into_param();
        self.push_filter("lt", column, || Filter::comparison(column, FilterOperator::Lt, &value))
    }

    /// Filter: column <= value
    fn lte(self, column: &str, value: impl IntoParam) -> Self {
        let value = value.into_param();
        self.push_filter("lte", column, || Filter::comparison(column, FilterOperator::Lte, &value))
    }

    /// Filter: column LIKE pattern (case-sensitive)
    fn like(self, column: &str, pattern: &str) -> Self {
        self.push_filter("like", column, || {
            Filter::comparison(column, FilterOperator::Like, &Param::Text(pattern.to_string()))
        })
    }

    /// Filter: column ILIKE pattern (case-insensitive)
    fn ilike(self, column: &str, pattern: &str) -> Self {
        self.push_filter("ilike", column, || {
            Filter::comparison(column, FilterOperator::ILike, &Param::Text(pattern.to_string()))
        })
    }

    /// Filter: column IS NULL / IS NOT NULL / IS TRUE / IS FALSE
    fn is(self, column: &str, value: IsValue) -> Self {
        self.push_filter("is", column, || Filter::is(column, value))
    }

    /// Filter: column IN (v1, v2, ...)
    fn in_<V: IntoParam>(self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<Param> = values.into_iter().map(IntoParam::into_param).collect();
        self.push_filter("in", column, || Filter::in_list(column, &values))
    }

    /// Filter: column @> value (array / jsonb / range contains)
    fn contains(self, column: &str, value: impl Into<JsonValue>) -> Self {
        let value = value.into();
        self.push_filter("contains", column, || {
            Filter::containment(column, FilterOperator::Contains, &value)
        })
    }

    /// Filter: column <@ value
    fn contained_by(self, column: &str, value: impl Into<JsonValue>) -> Self {
        let value = value.into();
        self.push_filter("contained_by", column, || {
            Filter::containment(column, FilterOperator::ContainedBy, &value)
        })
    }

    /// Filter: column && value
    fn overlaps(self, column: &str, value: impl Into<JsonValue>) -> Self {
        let value = value.into();
        self.push_filter("overlaps", column, || {
            Filter::containment(column, FilterOperator::Overlaps, &value)
        })
    }

    /// Full-text search on a tsvector column.
    fn text_search(
        self,
        column: &str,
        query: &str,
        config: Option<&str>,
        search_type: TextSearchType,
    ) -> Self {
        self.push_filter("text_search", column, || {
            Filter::text_search(column, query, config, search_type)
        })
    }

    /// One `eq` filter per pair.
    fn match_filter<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: IntoParam,
    {
        for (column, value) in pairs {
            self = self.eq(column.as_ref(), value);
        }
        self
    }

    /// Negate an arbitrary operator: `column=not.<operator>.<value>`.
    fn not(self, column: &str, operator: &str, value: impl IntoParam) -> Self {
        let value = value.into_param();
        self.push_filter("not", column, || Filter::negated(column, operator, &value))
    }

    /// Raw OR group: `or=(<filters>)`, e.g. `"status.eq.sent,status.eq.queued"`.
    fn or(mut self, filters: &str) -> Self {
        self.filters_mut().push(Filter::group("or", filters));
        self
    }

    /// OR group applied to an embedded (referenced) resource.
    fn or_referenced(self, filters: &str, referenced_table: &str) -> Self {
        let key = format!("{}.or", referenced_table);
        self.push_filter("or_referenced", referenced_table, || Filter::group(&key, filters))
    }

    /// Raw AND group: `and=(<filters>)`.
    fn and(mut self, filters: &str) -> Self {
        self.filters_mut().push(Filter::group("and", filters));
        self
    }

    /// Escape hatch: `column=<operator>.<value>` with any operator tag.
    fn filter(self, column: &str, operator: &str, value: impl IntoParam) -> Self {
        let value = value.into_param();
        self.push_filter("filter", column, || Filter::generic(column, operator, &value))
    }
}
