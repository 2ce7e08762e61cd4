//! The siren data model: entities, actions, links, and action fields.
//!
//! These are the value objects the graph builder produces and the
//! materializer consumes. They map field-for-field onto the wire format and
//! are immutable after construction, apart from relation edits on links.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// One parameter of an [`Action`], with an optional declared default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionField {
    /// Parameter name.
    pub name: String,
    /// Declared value type, e.g. `text` or `number`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Default value sent when the caller supplies none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// A parameterized operation exposed by an entity.
///
/// `method` defaults to `GET` and `type` to `application/json` when the
/// document omits them; unknown keys in the document are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Identifier seed for the generated member name.
    pub name: String,
    /// Target URI, possibly containing `{var}` template placeholders.
    pub href: String,
    /// HTTP verb.
    #[serde(default = "Action::default_method")]
    pub method: String,
    /// Payload content type.
    #[serde(rename = "type", default = "Action::default_media_type")]
    pub media_type: String,
    /// Declared parameters, in document order.
    #[serde(default)]
    pub fields: Vec<ActionField>,
    /// Human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Action {
    fn default_method() -> String {
        "GET".to_owned()
    }

    fn default_media_type() -> String {
        "application/json".to_owned()
    }

    /// Builds a field descriptor without attaching it to any action.
    pub fn create_field(
        name: impl Into<String>,
        kind: Option<String>,
        value: Option<Value>,
    ) -> ActionField {
        ActionField {
            name: name.into(),
            kind,
            value,
        }
    }

    /// Appends a field to this action.
    pub fn add_field(&mut self, name: impl Into<String>, kind: Option<String>, value: Option<Value>) {
        self.fields.push(Self::create_field(name, kind, value));
    }

    /// The declared fields as a name-to-default-value map. Fields without a
    /// declared value map to null.
    pub fn fields_as_map(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.value.clone().unwrap_or(Value::Null)))
            .collect()
    }

    /// Siren-compatible value representation of this action.
    pub fn as_siren(&self) -> Value {
        json!({
            "name": self.name,
            "title": self.title,
            "method": self.method,
            "href": self.href,
            "type": self.media_type,
            "fields": self.fields,
        })
    }

    /// Siren-compatible JSON string representation of this action.
    pub fn as_json(&self) -> String {
        self.as_siren().to_string()
    }
}

/// A relation from an entity to another resource it does not own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    /// Relation names; set-like, at least one.
    pub rel: Vec<String>,
    /// Target URI.
    pub href: String,
}

impl Link {
    /// Creates a link. `rel` needs at least one relation and `href` must be
    /// non-empty, otherwise construction fails with [`Error::Validation`].
    pub fn new(rel: impl Into<Vec<String>>, href: impl Into<String>) -> Result<Self> {
        let rel = rel.into();
        let href = href.into();
        if rel.is_empty() {
            return Err(Error::Validation(
                r#"parameter "rel" requires at least one relation"#.to_owned(),
            ));
        }
        if href.is_empty() {
            return Err(Error::Validation(
                r#"parameter "href" must be a non-empty string"#.to_owned(),
            ));
        }
        Ok(Self { rel, href })
    }

    /// Adds a relation. Duplicates are not re-added.
    pub fn add_rel(&mut self, new_rel: impl Into<String>) {
        let new_rel = new_rel.into();
        if !self.rel.contains(&new_rel) {
            self.rel.push(new_rel);
        }
    }

    /// Removes a relation. Removing an absent relation is a no-op.
    pub fn rem_rel(&mut self, cur_rel: &str) {
        self.rel.retain(|existing| existing != cur_rel);
    }

    /// Siren-compatible value representation of this link.
    pub fn as_siren(&self) -> Value {
        json!({ "rel": self.rel, "href": self.href })
    }

    /// Siren-compatible JSON string representation of this link.
    pub fn as_json(&self) -> String {
        self.as_siren().to_string()
    }
}

impl<'de> Deserialize<'de> for Link {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // `rel` arrives as either a bare string or an array of strings.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RelSet {
            One(String),
            Many(Vec<String>),
        }

        #[derive(Deserialize)]
        struct LinkDoc {
            rel: RelSet,
            href: String,
        }

        let doc = LinkDoc::deserialize(deserializer)?;
        let rel = match doc.rel {
            RelSet::One(single) => vec![single],
            RelSet::Many(many) => many,
        };
        Link::new(rel, doc.href).map_err(serde::de::Error::custom)
    }
}

/// A child of an entity: either a fully embedded entity or an embedded link
/// reference. An object satisfying both shapes is treated as a link.
#[derive(Debug, Clone, PartialEq)]
pub enum SubEntity {
    /// An embedded link reference: the child lives behind another URI.
    Link(Link),
    /// A fully embedded entity.
    Entity(Entity),
}

impl SubEntity {
    /// The child's relation to its parent.
    pub fn rel(&self) -> &[String] {
        match self {
            SubEntity::Link(link) => &link.rel,
            SubEntity::Entity(entity) => &entity.rel,
        }
    }

    /// Siren-compatible value representation of this child.
    pub fn as_siren(&self) -> Value {
        match self {
            SubEntity::Link(link) => link.as_siren(),
            SubEntity::Entity(entity) => entity.as_siren(),
        }
    }
}

/// A parsed node of the siren graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Classnames; the first one is primary and names the materialized
    /// object's type.
    pub classnames: Vec<String>,
    /// Relation to the parent entity, for embedded children. Empty at the
    /// root.
    pub rel: Vec<String>,
    /// Data properties.
    pub properties: Map<String, Value>,
    /// Operations attached to this entity, in document order.
    pub actions: Vec<Action>,
    /// Navigational relations, in document order. A relation name may
    /// appear on several links and a link may carry several names.
    pub links: Vec<Link>,
    /// Child nodes, in document order.
    pub entities: Vec<SubEntity>,
}

impl Entity {
    /// Creates an entity. At least one classname is required, otherwise
    /// construction fails with [`Error::Validation`].
    pub fn new(
        classnames: Vec<String>,
        rel: Vec<String>,
        properties: Map<String, Value>,
        actions: Vec<Action>,
        links: Vec<Link>,
        entities: Vec<SubEntity>,
    ) -> Result<Self> {
        if classnames.is_empty() {
            return Err(Error::Validation(
                r#"parameter "classnames" must have at least one element"#.to_owned(),
            ));
        }
        Ok(Self {
            classnames,
            rel,
            properties,
            actions,
            links,
            entities,
        })
    }

    /// The classname that names the materialized object's type.
    pub fn primary_classname(&self) -> &str {
        &self.classnames[0]
    }

    /// Every classname after the primary one.
    pub fn base_classnames(&self) -> &[String] {
        &self.classnames[1..]
    }

    /// Every link whose relation set contains `rel`.
    pub fn get_links(&self, rel: &str) -> Vec<&Link> {
        self.links
            .iter()
            .filter(|link| link.rel.iter().any(|r| r == rel))
            .collect()
    }

    /// Every child whose relation to this entity contains `rel`.
    pub fn get_entities(&self, rel: &str) -> Vec<&SubEntity> {
        self.entities
            .iter()
            .filter(|child| child.rel().iter().any(|r| r == rel))
            .collect()
    }

    /// Siren-compatible value representation of the whole subtree.
    pub fn as_siren(&self) -> Value {
        json!({
            "class": self.classnames,
            "properties": self.properties,
            "actions": self.actions.iter().map(Action::as_siren).collect::<Vec<_>>(),
            "links": self.links.iter().map(Link::as_siren).collect::<Vec<_>>(),
            "entities": self.entities.iter().map(SubEntity::as_siren).collect::<Vec<_>>(),
        })
    }

    /// Siren-compatible JSON string representation of the whole subtree.
    pub fn as_json(&self) -> String {
        self.as_siren().to_string()
    }
}
