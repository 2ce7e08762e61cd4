//! Construction of the entity graph from raw responses.

use crate::response::{classify, ClassifiedBody};
use crate::siren::{Action, Entity, Link, SubEntity};
use crate::transport::TransportResponse;
use crate::{Error, Result};
use serde_json::{Map, Value};

/// Builds [`Entity`] graphs from transport responses, JSON text, or
/// already-decoded values.
///
/// Construction never yields a partial tree: any failure inside the
/// recursion surfaces as a single top-level [`Error::MalformedSiren`] with
/// the underlying cause attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct SirenBuilder;

impl SirenBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Classifies a transport response and, unless it was a 404, decodes
    /// its body into an entity graph. A 404 propagates as `Ok(None)`.
    pub fn from_response(&self, response: &TransportResponse) -> Result<Option<Entity>> {
        match classify(response.status, Some(&response.body))? {
            ClassifiedBody::Absent => Ok(None),
            ClassifiedBody::Body(text) => self.from_json(&text).map(Some),
        }
    }

    /// Decodes a JSON string into an entity graph.
    pub fn from_json(&self, text: &str) -> Result<Entity> {
        let decoded: Value = serde_json::from_str(text).map_err(|cause| Error::MalformedSiren {
            message: "response must be valid json".to_owned(),
            source: Some(Box::new(cause)),
        })?;
        self.from_value(&decoded)
    }

    /// Converts an already-decoded value into an entity graph.
    pub fn from_value(&self, decoded: &Value) -> Result<Entity> {
        if !decoded.is_object() {
            return Err(Error::ExpectedObject {
                found: json_type_name(decoded),
            });
        }
        construct_entity(decoded).map_err(|cause| Error::MalformedSiren {
            message: "missing one or more required values".to_owned(),
            source: Some(Box::new(cause)),
        })
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn construct_entity(value: &Value) -> Result<Entity> {
    let object = value.as_object().ok_or(Error::ExpectedObject {
        found: json_type_name(value),
    })?;

    let classnames: Vec<String> = match object.get("class") {
        Some(classes) => serde_json::from_value(classes.clone())
            .map_err(|cause| Error::Validation(format!(r#"invalid "class": {cause}"#)))?,
        None => return Err(Error::Validation(r#"missing required "class""#.to_owned())),
    };

    let rel: Vec<String> = match object.get("rel") {
        Some(rels) => serde_json::from_value(rels.clone())
            .map_err(|cause| Error::Validation(format!(r#"invalid "rel": {cause}"#)))?,
        None => Vec::new(),
    };

    let properties: Map<String, Value> = match object.get("properties") {
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            return Err(Error::Validation(format!(
                r#""properties" must be an object, got {}"#,
                json_type_name(other)
            )))
        }
        None => Map::new(),
    };

    let mut actions = Vec::new();
    for item in items_of(object, "actions")? {
        let action: Action = serde_json::from_value(item.clone())
            .map_err(|cause| Error::Validation(format!("invalid action: {cause}")))?;
        actions.push(action);
    }

    let mut links = Vec::new();
    for item in items_of(object, "links")? {
        let link: Link = serde_json::from_value(item.clone())
            .map_err(|cause| Error::Validation(format!("invalid link: {cause}")))?;
        links.push(link);
    }

    let mut entities = Vec::new();
    for item in items_of(object, "entities")? {
        entities.push(construct_sub_entity(item)?);
    }

    Entity::new(classnames, rel, properties, actions, links, entities)
}

/// Children are tried as embedded links first: the link shape (`rel` plus
/// `href`) is the minimal one and wins whenever both shapes fit. Only when
/// it cannot be satisfied is the child built as a full nested entity.
fn construct_sub_entity(item: &Value) -> Result<SubEntity> {
    match serde_json::from_value::<Link>(item.clone()) {
        Ok(link) => Ok(SubEntity::Link(link)),
        Err(_) => construct_entity(item).map(SubEntity::Entity),
    }
}

fn items_of<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a [Value]> {
    match object.get(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(Error::Validation(format!(
            r#""{key}" must be an array, got {}"#,
            json_type_name(other)
        ))),
        None => Ok(&[]),
    }
}
