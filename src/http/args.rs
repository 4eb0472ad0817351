//! Runtime call arguments.
//!
//! Arguments are correlated to template slots purely by position. Each one is
//! either a JSON value (scalars, arrays, objects), a null, a reference to an
//! existing file, or an in-memory upload that gets staged before sending.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

/// An in-memory file payload for a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// One positional call argument.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Arg {
    #[default]
    Null,
    Value(Value),
    File(PathBuf),
    Upload(Upload),
}

impl Arg {
    /// Serializes any value into an argument.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Arg::from)
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Arg::File(path.into())
    }

    pub fn upload(upload: Upload) -> Self {
        Arg::Upload(upload)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Arg::Null | Arg::Value(Value::Null))
    }

    /// Textual form used for path segments, headers and plain fields.
    pub fn to_text(&self) -> String {
        self.as_field().to_text()
    }

    pub(crate) fn as_field(&self) -> Field<'_> {
        match self {
            Arg::Null => Field::Null,
            Arg::Value(value) => Field::Value(value),
            Arg::File(path) => Field::File(path),
            Arg::Upload(upload) => Field::Upload(upload),
        }
    }

    /// Expands into `(name, value)` fields: an object gives one field per
    /// entry, an array one repeated field per element, anything else a
    /// single field under `name`.
    pub(crate) fn expand<'a>(&'a self, name: &'a str, out: &mut Vec<(&'a str, Field<'a>)>) {
        match self {
            Arg::Value(Value::Object(map)) => {
                out.extend(map.iter().map(|(key, value)| (key.as_str(), Field::Value(value))));
            }
            Arg::Value(Value::Array(items)) => {
                out.extend(items.iter().map(|value| (name, Field::Value(value))));
            }
            other => out.push((name, other.as_field())),
        }
    }
}

/// Borrowed view of a single field value.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Field<'a> {
    Null,
    Value(&'a Value),
    File(&'a Path),
    Upload(&'a Upload),
}

impl Field<'_> {
    pub(crate) fn to_text(self) -> String {
        match self {
            Field::Null | Field::Value(Value::Null) => String::new(),
            Field::Value(Value::String(text)) => text.clone(),
            Field::Value(value) => value.to_string(),
            Field::File(path) => path.display().to_string(),
            Field::Upload(upload) => upload.filename.clone(),
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Arg::Null,
            value => Arg::Value(value),
        }
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Value(Value::String(value.to_string()))
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Value(Value::String(value))
    }
}

impl From<Upload> for Arg {
    fn from(upload: Upload) -> Self {
        Arg::Upload(upload)
    }
}

impl From<PathBuf> for Arg {
    fn from(path: PathBuf) -> Self {
        Arg::File(path)
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Arg::Null, Into::into)
    }
}

impl From<BTreeMap<String, String>> for Arg {
    fn from(map: BTreeMap<String, String>) -> Self {
        Arg::Value(Value::Object(
            map.into_iter().map(|(k, v)| (k, Value::String(v))).collect(),
        ))
    }
}

impl From<HashMap<String, String>> for Arg {
    fn from(map: HashMap<String, String>) -> Self {
        Arg::Value(Value::Object(
            map.into_iter().map(|(k, v)| (k, Value::String(v))).collect(),
        ))
    }
}

macro_rules! scalar_args {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::from(Value::from(value))
                }
            }
        )*
    };
}

scalar_args!(bool, i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64);
