use std::error::Error;
use std::str::FromStr;

use chrono::{NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes;

use crate::binder::BoundParam;
use crate::conversion::{format_date, format_time, format_timestamp, parse_date, parse_time, parse_timestamp};
use crate::types::Value;

/// Raised from `to_sql` when a value does not fit the parameter type the server inferred.
#[derive(Debug, thiserror::Error)]
#[error("cannot bind {value} value to PostgreSQL parameter ${position} of type {pg_type}")]
pub struct UnsupportedBinding {
    pub position: usize,
    pub value: &'static str,
    pub pg_type: String,
}

type BoxError = Box<dyn Error + Sync + Send>;

/// Binds one [`BoundParam`] to a statement parameter.
///
/// Conversion is driven by the parameter type `PostgreSQL` inferred at prepare time. Text is
/// parsed into temporal, NUMERIC and JSON parameters; every other mismatch is rejected with
/// [`UnsupportedBinding`] instead of being coerced.
#[derive(Debug, Clone, Copy)]
pub struct PgParam<'a>(pub BoundParam<'a>);

impl PgParam<'_> {
    fn unsupported(&self, ty: &Type) -> BoxError {
        Box::new(UnsupportedBinding {
            position: self.0.position,
            value: self.0.sql_type.name(),
            pg_type: ty.name().to_string(),
        })
    }
}

fn is_text(ty: &Type) -> bool {
    <&str as ToSql>::accepts(ty)
}

impl ToSql for PgParam<'_> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn to_sql(&self, ty: &Type, out: &mut bytes::BytesMut) -> Result<IsNull, BoxError> {
        match self.0.value {
            Value::Null => Ok(IsNull::Yes),
            Value::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)
                    .map_err(|_| self.unsupported(ty))?
                    .to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)
                    .map_err(|_| self.unsupported(ty))?
                    .to_sql(ty, out),
                Type::INT8 => i.to_sql(ty, out),
                Type::FLOAT4 => (*i as f32).to_sql(ty, out),
                Type::FLOAT8 => (*i as f64).to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*i).to_sql(ty, out),
                _ if is_text(ty) => i.to_string().to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            Value::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                Type::FLOAT8 => f.to_sql(ty, out),
                Type::NUMERIC => Decimal::try_from(*f)
                    .map_err(|_| self.unsupported(ty))?
                    .to_sql(ty, out),
                _ if is_text(ty) => f.to_string().to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            Value::Text(s) => self.text_to_sql(s, ty, out),
            Value::Bool(b) => match *ty {
                Type::BOOL => b.to_sql(ty, out),
                _ if is_text(ty) => b.to_string().to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            Value::Date(d) => match *ty {
                Type::DATE => d.to_sql(ty, out),
                Type::TIMESTAMP | Type::TIMESTAMPTZ => {
                    timestamp_to_sql(d.and_time(chrono::NaiveTime::MIN), ty, out)
                }
                _ if is_text(ty) => format_date(d).to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            Value::Time(t) => match *ty {
                Type::TIME => t.to_sql(ty, out),
                _ if is_text(ty) => format_time(t).to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            Value::Timestamp(ts) => match *ty {
                Type::TIMESTAMP | Type::TIMESTAMPTZ => timestamp_to_sql(*ts, ty, out),
                Type::DATE => ts.date().to_sql(ty, out),
                _ if is_text(ty) => format_timestamp(ts).to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            Value::Json(j) => match *ty {
                Type::JSON | Type::JSONB => j.to_sql(ty, out),
                _ if is_text(ty) => j.to_string().to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
            Value::Bytes(b) => match *ty {
                Type::BYTEA => b.as_slice().to_sql(ty, out),
                _ => Err(self.unsupported(ty)),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // Checked per value in to_sql.
        true
    }

    to_sql_checked!();
}

impl PgParam<'_> {
    fn text_to_sql(&self, s: &str, ty: &Type, out: &mut bytes::BytesMut) -> Result<IsNull, BoxError> {
        match *ty {
            Type::DATE => parse_date(s).ok_or_else(|| self.unsupported(ty))?.to_sql(ty, out),
            Type::TIME => parse_time(s).ok_or_else(|| self.unsupported(ty))?.to_sql(ty, out),
            Type::TIMESTAMP | Type::TIMESTAMPTZ => {
                let ts = parse_timestamp(s).ok_or_else(|| self.unsupported(ty))?;
                timestamp_to_sql(ts, ty, out)
            }
            Type::NUMERIC => Decimal::from_str(s.trim())
                .map_err(|_| self.unsupported(ty))?
                .to_sql(ty, out),
            Type::JSON | Type::JSONB => serde_json::from_str::<serde_json::Value>(s)
                .map_err(|_| self.unsupported(ty))?
                .to_sql(ty, out),
            _ if is_text(ty) => s.to_sql(ty, out),
            _ => Err(self.unsupported(ty)),
        }
    }
}

// TIMESTAMPTZ parameters take naive values as UTC.
fn timestamp_to_sql(ts: NaiveDateTime, ty: &Type, out: &mut bytes::BytesMut) -> Result<IsNull, BoxError> {
    if *ty == Type::TIMESTAMPTZ {
        Utc.from_utc_datetime(&ts).to_sql(ty, out)
    } else {
        ts.to_sql(ty, out)
    }
}
