use rust_decimal::Decimal;
use sqlx::postgres::PgArguments;
use sqlx::FromRow;
use uuid::Uuid;

/// A typed SQL bind value. Prices stay `Decimal` end to end so they never
/// round-trip through floats.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Str(String),
    Int(i64),
    Dec(Decimal),
    Uuid(Uuid),
    Bool(bool),
}

/// Collects bind values while handing out `$n` placeholders
#[derive(Debug, Default)]
pub struct ParamBinder {
    values: Vec<SqlParam>,
}

impl ParamBinder {
    pub fn new() -> Self {
        Self { values: vec![] }
    }

    /// Store a value and return its placeholder
    pub fn push(&mut self, value: SqlParam) -> String {
        self.values.push(value);
        format!("${}", self.values.len())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<SqlParam> {
        self.values
    }
}

pub fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &SqlParam,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        SqlParam::Str(s) => q.bind(s.clone()),
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Dec(d) => q.bind(*d),
        SqlParam::Uuid(u) => q.bind(*u),
        SqlParam::Bool(b) => q.bind(*b),
    }
}

pub fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &SqlParam,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        SqlParam::Str(s) => q.bind(s.clone()),
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Dec(d) => q.bind(*d),
        SqlParam::Uuid(u) => q.bind(*u),
        SqlParam::Bool(b) => q.bind(*b),
    }
}

pub fn bind_param_query_scalar<'q, O>(
    q: sqlx::query::QueryScalar<'q, sqlx::Postgres, O, PgArguments>,
    v: &SqlParam,
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, O, PgArguments>
where
    (O,): for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        SqlParam::Str(s) => q.bind(s.clone()),
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Dec(d) => q.bind(*d),
        SqlParam::Uuid(u) => q.bind(*u),
        SqlParam::Bool(b) => q.bind(*b),
    }
}
