use restbase_core::{Payload, Row};

use crate::filter::Filter;

/// Count mode for responses, sent as `Prefer: count=<mode>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountOption {
    /// No count requested.
    #[default]
    None,
    /// Exact count via COUNT(*).
    Exact,
    /// Planner estimate from table statistics.
    Planned,
    /// Exact below the server's threshold, planned above it.
    Estimated,
}

impl CountOption {
    pub(crate) fn prefer(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Exact => Some("count=exact"),
            Self::Planned => Some("count=planned"),
            Self::Estimated => Some("count=estimated"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

impl OrderDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsPosition {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderClause {
    pub column: String,
    pub direction: OrderDirection,
    pub nulls: Option<NullsPosition>,
}

impl OrderClause {
    pub(crate) fn render(&self) -> String {
        let nulls = match self.nulls {
            Some(NullsPosition::First) => ".nullsfirst",
            Some(NullsPosition::Last) => ".nullslast",
            None => "",
        };
        format!("{}.{}{}", self.column, self.direction.as_str(), nulls)
    }
}

/// What executing the builder does. Exactly one per builder.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Intent {
    #[default]
    Read,
    Insert(Payload),
    Update(Row),
    Delete,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete => "delete",
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Read)
    }
}

/// Options accepted by `select_with`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectOptions {
    pub count: CountOption,
    /// Fetch no rows, only metadata (count).
    pub head: bool,
}

impl SelectOptions {
    pub fn count(mut self, count: CountOption) -> Self {
        self.count = count;
        self
    }

    pub fn head(mut self) -> Self {
        self.head = true;
        self
    }
}

/// Everything a builder has accumulated before execution.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParts {
    pub resource: String,
    /// Projection, already normalized (`*` by default).
    pub projection: String,
    pub count: CountOption,
    pub head: bool,
    pub filters: Vec<Filter>,
    pub orders: Vec<OrderClause>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub intent: Intent,
    /// Schema override for this query only.
    pub schema: Option<String>,
    /// First construction error (e.g. an invalid column in a filter).
    /// While set, the query is refused before anything is sent.
    pub invalid: Option<String>,
}

impl QueryParts {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            projection: "*".to_string(),
            count: CountOption::None,
            head: false,
            filters: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
            intent: Intent::Read,
            schema: None,
            invalid: None,
        }
    }

    /// Record a construction error. The first one wins.
    pub fn reject(&mut self, message: impl Into<String>) {
        if self.invalid.is_none() {
            self.invalid = Some(message.into());
        }
    }

    /// Head-only applies to reads; mutations always return their rows.
    pub fn head_only(&self) -> bool {
        self.head && !self.intent.is_mutation()
    }

    /// Replace the intent; the last call wins.
    pub(crate) fn set_intent(&mut self, intent: Intent) {
        if self.intent.is_mutation() {
            tracing::warn!(
                resource = %self.resource,
                previous = self.intent.name(),
                next = intent.name(),
                "Replacing query intent; only the last one is executed"
            );
        }
        self.intent = intent;
    }
}

/// Collapse every comma + following whitespace run into a bare comma.
///
/// Whitespace elsewhere (inside embedded selects, casts, aliases) is kept.
pub fn normalize_projection(columns: &str) -> String {
    let trimmed = columns.trim();
    if trimmed.is_empty() {
        return "*".to_string();
    }
    let mut out = String::with_capacity(trimmed.len());
    let mut after_comma = false;
    for c in trimmed.chars() {
        if after_comma && c.is_whitespace() {
            continue;
        }
        after_comma = c == ',';
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use restbase_core::row;

    #[test]
    fn projection_collapses_comma_whitespace() {
        assert_eq!(normalize_projection("a, b,  c"), "a,b,c");
        assert_eq!(normalize_projection("id,\n\tname"), "id,name");
        assert_eq!(normalize_projection("*"), "*");
        assert_eq!(normalize_projection("   "), "*");
    }

    #[test]
    fn projection_keeps_inner_whitespace() {
        assert_eq!(
            normalize_projection("id, steps(id, body)"),
            "id,steps(id,body)"
        );
        assert_eq!(normalize_projection("total:count "), "total:count");
    }

    #[test]
    fn count_prefer_values() {
        assert_eq!(CountOption::None.prefer(), None);
        assert_eq!(CountOption::Exact.prefer(), Some("count=exact"));
        assert_eq!(CountOption::Planned.prefer(), Some("count=planned"));
        assert_eq!(CountOption::Estimated.prefer(), Some("count=estimated"));
    }

    #[test]
    fn order_render() {
        let clause = OrderClause {
            column: "created_at".into(),
            direction: OrderDirection::Descending,
            nulls: Some(NullsPosition::Last),
        };
        assert_eq!(clause.render(), "created_at.desc.nullslast");
    }

    #[test]
    fn last_intent_wins() {
        let mut parts = QueryParts::new("broadcasts");
        parts.set_intent(Intent::Insert(row![("name", "x")].into()));
        parts.set_intent(Intent::Update(row![("name", "y")]));
        parts.set_intent(Intent::Delete);
        assert_eq!(parts.intent, Intent::Delete);
    }

    #[test]
    fn first_rejection_is_kept() {
        let mut parts = QueryParts::new("contacts");
        assert!(parts.invalid.is_none());
        parts.reject("bad column");
        parts.reject("another");
        assert_eq!(parts.invalid.as_deref(), Some("bad column"));
    }

    #[test]
    fn head_only_ignored_for_mutations() {
        let mut parts = QueryParts::new("contacts");
        parts.head = true;
        assert!(parts.head_only());
        parts.set_intent(Intent::Delete);
        assert!(!parts.head_only());
    }
}
