use std::{
    collections::{BTreeMap, HashMap, HashSet},
    rc::Rc,
};

use serde_json::{Map, Value};
use tracing::debug;

use crate::{utils::NodeId, Schema, SchemaError, SchemaOrBool, SchemaRef, SchemaType};

/// Root keywords that hold the targets of local references.
const DEFINITION_KEYWORDS: [&str; 2] = ["$defs", "definitions"];

impl Schema {
    /// Builds a schema graph from json.
    ///
    /// Local references (`#`, `#/$defs/<name>`, `#/definitions/<name>`) are resolved to one shared
    /// node per target, so a recursive definition becomes a cycle in the graph and a definition
    /// referenced twice becomes one node with two parents. A node with `$ref` is replaced by its
    /// target, keywords next to the `$ref` are dropped.
    pub fn from_value(value: &Value) -> Result<SchemaRef, SchemaError> {
        let Value::Object(root) = value else {
            return Err(SchemaError::NotAnObject {
                path: "#".to_owned(),
            });
        };
        let mut resolver = Resolver::new(root)?;
        if let Some(pointer) = root.get("$ref") {
            if root.len() > 1 {
                debug!(path = "#", "dropped keywords next to `$ref`");
            }
            let node = match resolver.resolve(pointer, "#")? {
                SchemaOrBool::Schema(node) => node,
                SchemaOrBool::Bool(_) => {
                    return Err(SchemaError::NotAnObject {
                        path: "#".to_owned(),
                    })
                }
            };
            resolver.root = Some(Rc::clone(&node));
            resolver.fill_definitions()?;
            return Ok(node);
        }
        let node = Schema::default().into_ref();
        resolver.root = Some(Rc::clone(&node));
        resolver.fill_definitions()?;
        let schema = resolver.parse_fields(root, "#", true)?;
        *node.borrow_mut() = schema;
        Ok(node)
    }

    /// Writes the graph rooted at `node` back out as json, ready to be put in a request body.
    ///
    /// `type` is written as the uppercase tag and cleared fields are left out. A node shared by
    /// several parents is written out under each of them, so the output grows with the number of
    /// paths, not the number of nodes: a chain of `n` nodes each shared by two parents is written
    /// `2^n` times. Graphs with deep sharing are better sent as json with `$ref` kept, see
    /// [`crate::clean_up_schema`]. A node that is its own ancestor cannot be written out inline
    /// and fails with [`SchemaError::CyclicSchema`].
    pub fn to_value(node: &SchemaRef) -> Result<Value, SchemaError> {
        Writer::default().write(node, "#")
    }
}

/// A definition is addressed by the keyword it lives under and its name.
type DefinitionKey = (String, String);

struct Resolver<'a> {
    raw: HashMap<DefinitionKey, &'a Value>,
    /// Nodes for the definitions that are schemas (not booleans and not aliases), filled after
    /// every placeholder exists so references between them can be handed out early.
    nodes: HashMap<DefinitionKey, SchemaRef>,
    root: Option<SchemaRef>,
}

impl<'a> Resolver<'a> {
    fn new(root: &'a Map<String, Value>) -> Result<Self, SchemaError> {
        let mut raw = HashMap::new();
        let mut nodes = HashMap::new();
        for keyword in DEFINITION_KEYWORDS {
            let Some(definitions) = root.get(keyword) else {
                continue;
            };
            let Value::Object(definitions) = definitions else {
                return Err(SchemaError::invalid_keyword(
                    "#",
                    keyword,
                    "must be an object of schemas",
                ));
            };
            for (name, definition) in definitions {
                let key = (keyword.to_owned(), name.clone());
                match definition {
                    Value::Bool(_) => {}
                    Value::Object(map) => {
                        if !map.contains_key("$ref") {
                            nodes.insert(key.clone(), Schema::default().into_ref());
                        }
                    }
                    _ => {
                        return Err(SchemaError::NotAnObject {
                            path: join(&join("#", keyword), name),
                        })
                    }
                }
                raw.insert(key, definition);
            }
        }
        Ok(Self {
            raw,
            nodes,
            root: None,
        })
    }

    fn fill_definitions(&self) -> Result<(), SchemaError> {
        let nodes: Vec<(DefinitionKey, SchemaRef)> = self
            .nodes
            .iter()
            .map(|(key, node)| (key.clone(), Rc::clone(node)))
            .collect();
        for ((keyword, name), node) in nodes {
            let raw = self.raw[&(keyword.clone(), name.clone())];
            let Value::Object(map) = raw else {
                continue;
            };
            let path = join(&join("#", &keyword), &name);
            let schema = self.parse_fields(map, &path, false)?;
            *node.borrow_mut() = schema;
        }
        Ok(())
    }

    fn resolve(&self, pointer: &Value, path: &str) -> Result<SchemaOrBool, SchemaError> {
        let Some(pointer) = pointer.as_str() else {
            return Err(SchemaError::invalid_keyword(path, "$ref", "must be a string"));
        };
        let mut pointer = pointer.to_owned();
        let mut aliases = HashSet::new();
        loop {
            if pointer == "#" {
                return match &self.root {
                    Some(root) => Ok(SchemaOrBool::Schema(Rc::clone(root))),
                    None => Err(SchemaError::RefCycle { pointer }),
                };
            }
            let Some(key) = parse_pointer(&pointer) else {
                return Err(SchemaError::UnsupportedRef {
                    path: path.to_owned(),
                    pointer,
                });
            };
            if let Some(node) = self.nodes.get(&key) {
                return Ok(SchemaOrBool::Schema(Rc::clone(node)));
            }
            let next = match self.raw.get(&key) {
                None => {
                    return Err(SchemaError::UnresolvedRef {
                        path: path.to_owned(),
                        pointer,
                    })
                }
                Some(Value::Bool(value)) => return Ok(SchemaOrBool::Bool(*value)),
                Some(alias) => alias.get("$ref"),
            };
            if !aliases.insert(pointer.clone()) {
                return Err(SchemaError::RefCycle { pointer });
            }
            pointer = match next.and_then(Value::as_str) {
                Some(next) => next.to_owned(),
                None => {
                    return Err(SchemaError::invalid_keyword(
                        &join(&join("#", &key.0), &key.1),
                        "$ref",
                        "must be a string",
                    ))
                }
            };
        }
    }

    fn parse_slot(&self, value: &Value, path: &str) -> Result<SchemaOrBool, SchemaError> {
        match value {
            Value::Bool(value) => Ok(SchemaOrBool::Bool(*value)),
            Value::Object(map) => {
                if let Some(pointer) = map.get("$ref") {
                    if map.len() > 1 {
                        debug!(path, "dropped keywords next to `$ref`");
                    }
                    return self.resolve(pointer, path);
                }
                let schema = self.parse_fields(map, path, false)?;
                Ok(SchemaOrBool::Schema(schema.into_ref()))
            }
            _ => Err(SchemaError::NotAnObject {
                path: path.to_owned(),
            }),
        }
    }

    fn parse_fields(
        &self,
        map: &Map<String, Value>,
        path: &str,
        is_root: bool,
    ) -> Result<Schema, SchemaError> {
        let mut schema = Schema::default();
        for (keyword, value) in map {
            match keyword.as_str() {
                "type" => match SchemaType::from_keyword(value) {
                    Some(kind) => schema.kind = Some(kind),
                    None => {
                        schema.extra.insert(keyword.clone(), value.clone());
                    }
                },
                "format" => match value {
                    Value::String(format) => schema.format = Some(format.clone()),
                    _ => {
                        return Err(SchemaError::invalid_keyword(path, keyword, "must be a string"))
                    }
                },
                "default" => schema.default = Some(value.clone()),
                "anyOf" => {
                    let Value::Array(entries) = value else {
                        return Err(SchemaError::invalid_keyword(path, keyword, "must be an array"));
                    };
                    let any_of_path = join(path, keyword);
                    let any_of = entries
                        .iter()
                        .enumerate()
                        .map(|(index, entry)| {
                            self.parse_slot(entry, &join(&any_of_path, &index.to_string()))
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    schema.any_of = Some(any_of);
                }
                "items" => {
                    if value.is_array() {
                        return Err(SchemaError::invalid_keyword(
                            path,
                            keyword,
                            "tuple `items` are not supported, must be a schema or boolean",
                        ));
                    }
                    schema.items = Some(self.parse_slot(value, &join(path, keyword))?);
                }
                "properties" => {
                    let Value::Object(entries) = value else {
                        return Err(SchemaError::invalid_keyword(path, keyword, "must be an object"));
                    };
                    let properties_path = join(path, keyword);
                    let mut properties = BTreeMap::new();
                    for (name, entry) in entries {
                        let entry = self.parse_slot(entry, &join(&properties_path, name))?;
                        properties.insert(name.clone(), entry);
                    }
                    schema.properties = Some(properties);
                }
                keyword if is_root && DEFINITION_KEYWORDS.contains(&keyword) => {}
                _ => {
                    schema.extra.insert(keyword.clone(), value.clone());
                }
            }
        }
        Ok(schema)
    }
}

#[derive(Default)]
struct Writer {
    /// Nodes on the path from the root to the node being written.
    ancestors: HashSet<NodeId>,
}

impl Writer {
    fn write(&mut self, node: &SchemaRef, path: &str) -> Result<Value, SchemaError> {
        let id = NodeId::of(node);
        if !self.ancestors.insert(id) {
            return Err(SchemaError::CyclicSchema {
                path: path.to_owned(),
            });
        }
        let schema = node.borrow();
        let mut map = schema.extra.clone();
        if let Some(kind) = schema.kind {
            map.insert("type".to_owned(), Value::String(kind.as_str().to_owned()));
        }
        if let Some(format) = &schema.format {
            map.insert("format".to_owned(), Value::String(format.clone()));
        }
        if let Some(default) = &schema.default {
            map.insert("default".to_owned(), default.clone());
        }
        if let Some(any_of) = &schema.any_of {
            let any_of_path = join(path, "anyOf");
            let entries = any_of
                .iter()
                .enumerate()
                .map(|(index, entry)| {
                    self.write_slot(entry, &join(&any_of_path, &index.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            map.insert("anyOf".to_owned(), Value::Array(entries));
        }
        if let Some(items) = &schema.items {
            let items = self.write_slot(items, &join(path, "items"))?;
            map.insert("items".to_owned(), items);
        }
        if let Some(properties) = &schema.properties {
            let properties_path = join(path, "properties");
            let mut entries = Map::new();
            for (name, entry) in properties {
                let entry = self.write_slot(entry, &join(&properties_path, name))?;
                entries.insert(name.clone(), entry);
            }
            map.insert("properties".to_owned(), Value::Object(entries));
        }
        self.ancestors.remove(&id);
        Ok(Value::Object(map))
    }

    fn write_slot(&mut self, slot: &SchemaOrBool, path: &str) -> Result<Value, SchemaError> {
        match slot {
            SchemaOrBool::Schema(node) => self.write(node, path),
            SchemaOrBool::Bool(value) => Ok(Value::Bool(*value)),
        }
    }
}

/// Appends `segment` to the json pointer `path`, escaping it.
fn join(path: &str, segment: &str) -> String {
    let segment = segment.replace('~', "~0").replace('/', "~1");
    format!("{path}/{segment}")
}

/// Parses `#/$defs/<name>` or `#/definitions/<name>`.
fn parse_pointer(pointer: &str) -> Option<DefinitionKey> {
    let rest = pointer.strip_prefix("#/")?;
    let (keyword, name) = rest.split_once('/')?;
    if !DEFINITION_KEYWORDS.contains(&keyword) || name.contains('/') {
        return None;
    }
    let name = name.replace("~1", "/").replace("~0", "~");
    Some((keyword.to_owned(), name))
}
