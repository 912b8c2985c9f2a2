//! Conversions into [`Value`], used by the `value!` macro and by callers
//! that build a render context without `serde`.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use crate::value::{List, Map};
use crate::Value;

macro_rules! impl_from_scalar {
    ($($ty:ty => |$v:ident| $conv:expr;)+) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    $conv
                }
            }
        )+
    };
}

impl_from_scalar! {
    () => |_v| Self::None;
    bool => |v| Self::Bool(v);
    u8 => |v| Self::Integer(i64::from(v));
    u16 => |v| Self::Integer(i64::from(v));
    u32 => |v| Self::Integer(i64::from(v));
    i8 => |v| Self::Integer(i64::from(v));
    i16 => |v| Self::Integer(i64::from(v));
    i32 => |v| Self::Integer(i64::from(v));
    i64 => |v| Self::Integer(v);
    f32 => |v| Self::Float(f64::from(v));
    f64 => |v| Self::Float(v);
    char => |v| Self::String(String::from(v));
    String => |v| Self::String(v);
    &str => |v| Self::String(v.to_owned());
    Cow<'_, str> => |v| Self::String(v.into_owned());
}

impl<V> From<Option<V>> for Value
where
    V: Into<Value>,
{
    fn from(opt: Option<V>) -> Self {
        opt.map_or(Self::None, Into::into)
    }
}

impl<V> From<Vec<V>> for Value
where
    V: Into<Value>,
{
    fn from(list: Vec<V>) -> Self {
        Self::List(list.into_iter().map(Into::into).collect())
    }
}

impl<V, const N: usize> From<[V; N]> for Value
where
    V: Into<Value>,
{
    fn from(list: [V; N]) -> Self {
        Self::List(list.into_iter().map(Into::into).collect())
    }
}

macro_rules! impl_from_map {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl<K, V> From<$ty> for Value
            where
                K: Into<String>,
                V: Into<Value>,
            {
                fn from(map: $ty) -> Self {
                    Self::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
                }
            }
        )+
    };
}

impl_from_map! { BTreeMap<K, V>, HashMap<K, V>, Map<K, V> }

impl<K, V, const N: usize> From<[(K, V); N]> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(entries: [(K, V); N]) -> Self {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<V> FromIterator<V> for Value
where
    V: Into<Value>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        Self::List(iter.into_iter().map(Into::into).collect::<List<_>>())
    }
}

/// Collects entries into a map, a later duplicate key replaces the value but
/// keeps the position of the first.
impl<K, V> FromIterator<(K, V)> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect::<Map<_, _>>(),
        )
    }
}
