use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Type-erased filter operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(NaiveDateTime),
    TimestampTz(chrono::DateTime<chrono::Utc>),
    Date(NaiveDate),
    Json(JsonValue),
}

impl Param {
    /// Render the operand the way PostgREST expects it after the operator tag.
    pub fn render(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::I64(n) => n.to_string(),
            Self::F64(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Uuid(u) => u.to_string(),
            Self::Timestamp(t) => t.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Self::TimestampTz(t) => t.to_rfc3339(),
            Self::Date(d) => d.to_string(),
            // Bare JSON strings render unquoted, like any other text operand.
            Self::Json(JsonValue::String(s)) => s.clone(),
            Self::Json(v) => v.to_string(),
        }
    }
}

/// Trait for converting Rust types into a [`Param`].
pub trait IntoParam {
    fn into_param(self) -> Param;
}

impl IntoParam for Param {
    fn into_param(self) -> Param {
        self
    }
}

impl IntoParam for bool {
    fn into_param(self) -> Param {
        Param::Bool(self)
    }
}

macro_rules! int_param {
    ($($t:ty),*) => {
        $(
            impl IntoParam for $t {
                fn into_param(self) -> Param {
                    Param::I64(i64::from(self))
                }
            }
        )*
    };
}

int_param!(i8, i16, i32, i64, u8, u16, u32);

impl IntoParam for f32 {
    fn into_param(self) -> Param {
        Param::F64(f64::from(self))
    }
}

impl IntoParam for f64 {
    fn into_param(self) -> Param {
        Param::F64(self)
    }
}

impl IntoParam for String {
    fn into_param(self) -> Param {
        Param::Text(self)
    }
}

impl IntoParam for &str {
    fn into_param(self) -> Param {
        Param::Text(self.to_string())
    }
}

impl IntoParam for &String {
    fn into_param(self) -> Param {
        Param::Text(self.clone())
    }
}

impl IntoParam for Uuid {
    fn into_param(self) -> Param {
        Param::Uuid(self)
    }
}

impl IntoParam for NaiveDateTime {
    fn into_param(self) -> Param {
        Param::Timestamp(self)
    }
}

impl IntoParam for chrono::DateTime<chrono::Utc> {
    fn into_param(self) -> Param {
        Param::TimestampTz(self)
    }
}

impl IntoParam for NaiveDate {
    fn into_param(self) -> Param {
        Param::Date(self)
    }
}

impl IntoParam for JsonValue {
    fn into_param(self) -> Param {
        Param::Json(self)
    }
}

impl<T: IntoParam> IntoParam for Option<T> {
    fn into_param(self) -> Param {
        match self {
            Some(v) => v.into_param(),
            None => Param::Null,
        }
    }
}
