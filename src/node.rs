use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Shared handle to a schema node. Two handles are the same node only if they point to the same
/// allocation, see [`crate::NodeId`].
pub type SchemaRef = Rc<RefCell<Schema>>;

/// The type tag of a schema node, spelled the way the target api spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
    TypeUnspecified,
}

impl SchemaType {
    /// Parses a `type` keyword, ignoring case. Returns `None` for anything that is not a single
    /// known type name.
    pub fn from_keyword(value: &Value) -> Option<Self> {
        let name = value.as_str()?;
        let value = Value::String(name.to_ascii_uppercase());
        serde_json::from_value(value).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::String => "STRING",
            SchemaType::Number => "NUMBER",
            SchemaType::Integer => "INTEGER",
            SchemaType::Boolean => "BOOLEAN",
            SchemaType::Array => "ARRAY",
            SchemaType::Object => "OBJECT",
            SchemaType::Null => "NULL",
            SchemaType::TypeUnspecified => "TYPE_UNSPECIFIED",
        }
    }
}

/// A slot that holds either a schema or a json-schema boolean schema (`true` matches anything,
/// `false` matches nothing).
#[derive(Debug, Clone)]
pub enum SchemaOrBool {
    Schema(SchemaRef),
    Bool(bool),
}

impl SchemaOrBool {
    pub fn as_schema(&self) -> Option<&SchemaRef> {
        match self {
            SchemaOrBool::Schema(schema) => Some(schema),
            SchemaOrBool::Bool(_) => None,
        }
    }
}

impl From<SchemaRef> for SchemaOrBool {
    fn from(schema: SchemaRef) -> Self {
        SchemaOrBool::Schema(schema)
    }
}

impl From<&SchemaRef> for SchemaOrBool {
    fn from(schema: &SchemaRef) -> Self {
        SchemaOrBool::Schema(Rc::clone(schema))
    }
}

impl From<bool> for SchemaOrBool {
    fn from(value: bool) -> Self {
        SchemaOrBool::Bool(value)
    }
}

/// A node describing the accepted shape of a tool parameter.
///
/// Only the keywords the sanitizer reasons about are typed. Everything else (`description`,
/// `enum`, `required`, ...) lives in `extra` and is carried through untouched.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub kind: Option<SchemaType>,
    /// Only meaningful when `kind` is [`SchemaType::String`].
    pub format: Option<String>,
    pub default: Option<Value>,
    pub any_of: Option<Vec<SchemaOrBool>>,
    pub items: Option<SchemaOrBool>,
    pub properties: Option<BTreeMap<String, SchemaOrBool>>,
    pub extra: Map<String, Value>,
}

impl Schema {
    pub fn new(kind: SchemaType) -> Self {
        Self {
            kind: Some(kind),
            ..Default::default()
        }
    }

    pub fn string() -> Self {
        Self::new(SchemaType::String)
    }

    pub fn object() -> Self {
        Self::new(SchemaType::Object)
    }

    pub fn array(items: impl Into<SchemaOrBool>) -> Self {
        Self {
            items: Some(items.into()),
            ..Self::new(SchemaType::Array)
        }
    }

    pub fn any_of(alternatives: impl IntoIterator<Item = SchemaOrBool>) -> Self {
        Self {
            any_of: Some(alternatives.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, schema: impl Into<SchemaOrBool>) -> Self {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), schema.into());
        self
    }

    pub fn with_extra(mut self, keyword: impl Into<String>, value: Value) -> Self {
        self.extra.insert(keyword.into(), value);
        self
    }

    /// Wraps this node in a new shared handle. Every call creates a distinct node.
    pub fn into_ref(self) -> SchemaRef {
        Rc::new(RefCell::new(self))
    }

    /// The schema of the property `name`, if it is a schema and not a boolean.
    pub fn property(&self, name: &str) -> Option<SchemaRef> {
        self.properties
            .as_ref()?
            .get(name)?
            .as_schema()
            .map(Rc::clone)
    }

    /// The schema of `items`, if it is a schema and not a boolean.
    pub fn item_schema(&self) -> Option<SchemaRef> {
        self.items.as_ref()?.as_schema().map(Rc::clone)
    }

    pub fn is_string(&self) -> bool {
        self.kind == Some(SchemaType::String)
    }

    /// Every direct child that is a schema, in `anyOf`, `items`, `properties` order.
    pub(crate) fn child_schemas(&self) -> Vec<SchemaRef> {
        let any_of = self.any_of.iter().flatten();
        let items = self.items.iter();
        let properties = self.properties.iter().flat_map(|map| map.values());
        any_of
            .chain(items)
            .chain(properties)
            .filter_map(SchemaOrBool::as_schema)
            .map(Rc::clone)
            .collect()
    }
}
