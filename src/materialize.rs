//! Turning a parsed entity into a live, callable object.
//!
//! Rather than synthesizing a type per classname, materialization produces
//! a single concrete [`MaterializedObject`]: the entity's properties become
//! a field map, and its actions and link relations become entries in a
//! member dispatch table keyed by normalized name. Invoking a member builds
//! the described request, performs it through the configured transport, and
//! feeds the response back through classify, build, and materialize,
//! yielding the next object in the traversal.

use crate::builder::SirenBuilder;
use crate::siren::{Action, Entity, Link, SubEntity};
use crate::template::TemplatedUri;
use crate::transport::{SirenConfig, TransportRequest};
use crate::{Error, Result};
use http::Method;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Keyword arguments for a member invocation.
pub type Args = Map<String, Value>;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-zA-Z_][a-zA-Z0-9_]*$").expect("identifier pattern is valid"));

/// Normalizes a raw action name or link relation into a member identifier:
/// lowercased, `-` mapped to `_`, every other character outside
/// `[a-zA-Z0-9_]` stripped. Fails with [`Error::InvalidMemberName`] when
/// nothing identifier-shaped survives.
pub fn normalize_member_name(raw: &str) -> Result<String> {
    let attempted: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    if IDENTIFIER.is_match(&attempted) {
        Ok(attempted)
    } else {
        Err(Error::InvalidMemberName {
            raw: raw.to_owned(),
            attempted,
        })
    }
}

/// A dispatch-table entry: what an invocation of this member performs.
#[derive(Debug, Clone)]
enum Member {
    Action(Action),
    Link(Link),
}

/// The live representation of one entity.
///
/// Its runtime classname is the entity's primary classname, its fields are
/// the entity's properties copied by value, and its callable members are
/// looked up by normalized name through [`invoke`](Self::invoke).
#[derive(Debug, Clone)]
pub struct MaterializedObject {
    classname: String,
    fields: Map<String, Value>,
    members: HashMap<String, Member>,
    entity: Entity,
    config: SirenConfig,
}

/// Builds the live object for an entity.
///
/// Members are bound in a fixed order: every action first, then one member
/// per link relation, each in document order. When two members normalize to
/// the same identifier the later binding silently wins; the collision is
/// logged but not rejected. A name that cannot be normalized aborts
/// materialization of the whole object.
pub fn materialize(entity: Entity, config: SirenConfig) -> Result<MaterializedObject> {
    let classname = entity.primary_classname().to_owned();

    let mut members: HashMap<String, Member> = HashMap::new();
    for action in &entity.actions {
        let name = normalize_member_name(&action.name)?;
        if let Some(previous) = members.insert(name.clone(), Member::Action(action.clone())) {
            warn_collision(&classname, &name, &previous);
        }
    }
    for link in &entity.links {
        for rel in &link.rel {
            let name = normalize_member_name(rel)?;
            if let Some(previous) = members.insert(name.clone(), Member::Link(link.clone())) {
                warn_collision(&classname, &name, &previous);
            }
        }
    }

    let fields = entity.properties.clone();
    Ok(MaterializedObject {
        classname,
        fields,
        members,
        entity,
        config,
    })
}

fn warn_collision(classname: &str, member: &str, previous: &Member) {
    let displaced = match previous {
        Member::Action(_) => "action",
        Member::Link(_) => "link relation",
    };
    tracing::warn!(
        classname,
        member,
        displaced,
        "member name collision; later binding wins"
    );
}

impl MaterializedObject {
    /// The entity's primary classname.
    pub fn classname(&self) -> &str {
        &self.classname
    }

    /// A data field copied from the entity's properties.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Every data field.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Whether `name` is a callable member of this object.
    pub fn has_member(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// The callable member names, in no particular order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    /// The entity this object was materialized from.
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Invokes a callable member.
    ///
    /// An action member builds its request from the action descriptor:
    /// `args` fill the href's template variables first, and the remainder
    /// overlay the action's declared field defaults to form the payload. A
    /// link member always issues a GET to the link's href, untemplated.
    /// Either way the response is classified, parsed, and materialized;
    /// a 404 resolves to `Ok(None)`.
    pub async fn invoke(&self, name: &str, args: &Args) -> Result<Option<MaterializedObject>> {
        let member = self.members.get(name).ok_or_else(|| Error::UnknownMember {
            name: name.to_owned(),
            classname: self.classname.clone(),
        })?;

        let request = match member {
            Member::Action(action) => action_request(action, args)?,
            Member::Link(link) => TransportRequest::new(Method::GET, link.href.clone()),
        };
        perform(&self.config, request).await
    }

    /// Children of this object whose relation contains `rel`.
    ///
    /// The iterator is lazy and re-filters the stored entity children on
    /// every call, so it is restartable rather than a consumed stream. An
    /// embedded entity materializes on demand without I/O; a link-shaped
    /// child is yielded as a [`Child::Reference`] to resolve explicitly.
    /// No children or no matches yields an empty iterator.
    pub fn entities<'a>(&'a self, rel: &'a str) -> impl Iterator<Item = Result<Child>> + 'a {
        self.entity
            .get_entities(rel)
            .into_iter()
            .map(move |child| match child {
                SubEntity::Entity(embedded) => {
                    materialize(embedded.clone(), self.config.clone()).map(Child::Embedded)
                }
                SubEntity::Link(reference) => Ok(Child::Reference {
                    link: reference.clone(),
                    config: self.config.clone(),
                }),
            })
    }
}

/// One child yielded by [`MaterializedObject::entities`].
///
/// An embedded entity is already an object; a link-shaped child is a
/// reference that must be fetched. [`Child::resolve`] gives both the same
/// contract.
#[derive(Debug)]
pub enum Child {
    /// A fully embedded child, materialized without any network traffic.
    Embedded(MaterializedObject),
    /// An embedded link reference to a child living behind another URI.
    Reference {
        link: Link,
        config: SirenConfig,
    },
}

impl Child {
    /// Resolves the child to an object, fetching it when it is a
    /// reference. A reference answering 404 resolves to `Ok(None)`.
    pub async fn resolve(self) -> Result<Option<MaterializedObject>> {
        match self {
            Child::Embedded(object) => Ok(Some(object)),
            Child::Reference { link, config } => {
                let request = TransportRequest::new(Method::GET, link.href.clone());
                perform(&config, request).await
            }
        }
    }
}

/// The shared pipeline behind every generated member: send the described
/// request, classify the response, build the entity graph, materialize.
pub(crate) async fn perform(
    config: &SirenConfig,
    request: TransportRequest,
) -> Result<Option<MaterializedObject>> {
    tracing::debug!(method = %request.method, url = %request.url, "performing siren request");
    let response = config.transport.send(request).await?;
    match SirenBuilder::new().from_response(&response)? {
        None => Ok(None),
        Some(entity) => materialize(entity, config.clone()).map(Some),
    }
}

/// Builds the request an action invocation describes.
///
/// Template variables take their values from `args`; whatever `args` spent
/// on the template never reaches the payload. The payload starts from the
/// action's declared field defaults, overlaid with the caller's remaining
/// values, then serialized. The payload travels as query parameters for
/// GET, as a JSON body for PUT, POST, and PATCH, and not at all for any
/// other verb.
fn action_request(action: &Action, args: &Args) -> Result<TransportRequest> {
    let template = TemplatedUri::parse(&action.href);
    let placeholders: Vec<String> = template.unbound_variables().to_vec();

    let bindings: HashMap<String, String> = args
        .iter()
        .map(|(name, value)| (name.clone(), binding_value(value)))
        .collect();
    let bound = template.bind(&bindings);
    if bound.has_unbound_variables() {
        return Err(Error::UnboundTemplateVariables {
            names: bound.unbound_variables().to_vec(),
        });
    }

    let mut fields = action.fields_as_map();
    for (name, value) in args {
        if !placeholders.contains(name) {
            fields.insert(name.clone(), value.clone());
        }
    }
    let payload = prepare_payload(&fields);

    let method = action
        .method
        .parse::<Method>()
        .map_err(|_| Error::Validation(format!("invalid http method {:?}", action.method)))?;

    let mut request = TransportRequest::new(method, bound.as_str());
    match action.method.as_str() {
        "GET" => request.query = payload,
        "PUT" | "POST" | "PATCH" => {
            request.body = Some(Value::Object(
                payload
                    .into_iter()
                    .map(|(name, value)| (name, Value::String(value)))
                    .collect(),
            ));
        }
        _ => {}
    }
    Ok(request)
}

/// Strings bind and serialize verbatim; anything else becomes its JSON
/// rendering.
fn binding_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Serializes payload fields, dropping every absent-like value: null,
/// false, zero, empty strings, and empty collections are never sent.
fn prepare_payload(fields: &Map<String, Value>) -> Vec<(String, String)> {
    fields
        .iter()
        .filter(|(_, value)| !is_falsy(value))
        .map(|(name, value)| (name.clone(), binding_value(value)))
        .collect()
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n == 0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Transport, TransportResponse};
    use async_trait::async_trait;
    use http::{HeaderMap, StatusCode};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Answers 404 to everything, remembering what was asked of it.
    struct RecordingTransport {
        requests: Mutex<Vec<TransportRequest>>,
    }

    impl RecordingTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
            })
        }

        fn recorded(&self) -> Vec<TransportRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
            self.requests.lock().unwrap().push(request);
            Ok(TransportResponse {
                status: StatusCode::NOT_FOUND,
                headers: HeaderMap::new(),
                body: String::new(),
            })
        }
    }

    fn config_with(transport: Arc<RecordingTransport>) -> SirenConfig {
        SirenConfig::with_transport(true, transport)
    }

    fn build(doc: Value) -> Entity {
        SirenBuilder::new().from_value(&doc).unwrap()
    }

    fn args(value: Value) -> Args {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn member_names_normalize() {
        for (raw, expected) in [
            ("original", "original"),
            ("original func", "originalfunc"),
            ("original-func", "original_func"),
            ("%bd#$%#$)@c", "bdc"),
            ("Self", "self"),
        ] {
            assert_eq!(normalize_member_name(raw).unwrap(), expected);
        }
    }

    #[test]
    fn unusable_member_names_are_rejected() {
        for raw in ["#$%^#$%&", "", "09345asda"] {
            let err = normalize_member_name(raw).unwrap_err();
            assert!(
                matches!(err, Error::InvalidMemberName { raw: ref r, .. } if r == raw),
                "expected InvalidMemberName for {raw:?}"
            );
        }
    }

    #[test]
    fn materialized_object_mirrors_the_entity() {
        let entity = build(json!({
            "class": ["Resource", "base"],
            "properties": {"url": "x", "time_fetched": 1409067477},
            "links": [{"href": "/r?u=x", "rel": ["self", "dup"]}],
            "actions": [{
                "name": "get_with_url",
                "href": "/resources",
                "method": "GET",
                "fields": [{"name": "url", "type": "text"}],
            }],
        }));
        let object = materialize(entity, config_with(RecordingTransport::new())).unwrap();

        assert_eq!(object.classname(), "Resource");
        assert_eq!(object.field("url"), Some(&json!("x")));
        assert_eq!(object.field("time_fetched"), Some(&json!(1409067477)));
        assert!(object.has_member("self"));
        assert!(object.has_member("dup"));
        assert!(object.has_member("get_with_url"));
        assert!(!object.has_member("missing"));
    }

    #[test]
    fn round_trip_preserves_properties() {
        let entity = build(json!({
            "class": ["Resource"],
            "properties": {"url": "x", "count": 3, "open": true},
        }));
        let rebuilt = SirenBuilder::new().from_value(&entity.as_siren()).unwrap();
        let object = materialize(rebuilt, config_with(RecordingTransport::new())).unwrap();

        assert_eq!(
            object.fields(),
            &args(json!({"url": "x", "count": 3, "open": true}))
        );
    }

    #[test]
    fn unnormalizable_action_name_aborts_materialization() {
        let entity = build(json!({
            "class": ["Resource"],
            "actions": [{"name": "#$%^#$%&", "href": "/x"}],
        }));
        let err = materialize(entity, config_with(RecordingTransport::new())).unwrap_err();
        assert!(matches!(err, Error::InvalidMemberName { .. }));
    }

    #[tokio::test]
    async fn unknown_member_is_reported_with_context() {
        let entity = build(json!({"class": ["Resource"]}));
        let object = materialize(entity, config_with(RecordingTransport::new())).unwrap();

        let err = object.invoke("nope", &Args::new()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownMember { ref name, ref classname }
                if name == "nope" && classname == "Resource"
        ));
    }

    #[tokio::test]
    async fn later_link_binding_displaces_an_action_of_the_same_name() {
        let transport = RecordingTransport::new();
        let entity = build(json!({
            "class": ["Resource"],
            "actions": [{"name": "self", "href": "/action-target", "method": "POST"}],
            "links": [{"rel": ["self"], "href": "/link-target"}],
        }));
        let object = materialize(entity, config_with(transport.clone())).unwrap();

        let resolved = object.invoke("self", &Args::new()).await.unwrap();
        assert!(resolved.is_none());

        let recorded = transport.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].method, Method::GET);
        assert_eq!(recorded[0].url, "/link-target");
    }

    #[tokio::test]
    async fn link_members_get_the_literal_href() {
        let transport = RecordingTransport::new();
        let entity = build(json!({
            "class": ["Resource"],
            "links": [{"rel": ["self"], "href": "/r?u={x}"}],
        }));
        let object = materialize(entity, config_with(transport.clone())).unwrap();

        object.invoke("self", &Args::new()).await.unwrap();

        // Links are never templated; the href goes out as-is.
        let recorded = transport.recorded();
        assert_eq!(recorded[0].url, "/r?u={x}");
        assert!(recorded[0].query.is_empty());
        assert!(recorded[0].body.is_none());
    }

    fn action(doc: Value) -> Action {
        serde_json::from_value(doc).unwrap()
    }

    #[test]
    fn action_request_binds_the_template_and_splits_the_payload() {
        let action = action(json!({
            "name": "fetch",
            "href": "http://host.com/{id}/{id}",
            "method": "GET",
        }));
        let request = action_request(
            &action,
            &args(json!({"id": 3, "x": 1, "y": 2})),
        )
        .unwrap();

        assert_eq!(request.url, "http://host.com/3/3");
        let mut query = request.query.clone();
        query.sort();
        assert_eq!(
            query,
            [("x".to_owned(), "1".to_owned()), ("y".to_owned(), "2".to_owned())]
        );
    }

    #[test]
    fn action_request_rejects_unbound_templates() {
        let action = action(json!({
            "name": "fetch",
            "href": "http://host.com/{id}/{id}",
        }));
        let err = action_request(&action, &args(json!({"x": 1, "y": 2}))).unwrap_err();
        assert!(matches!(
            err,
            Error::UnboundTemplateVariables { ref names } if names.to_vec() == ["id"]
        ));
    }

    #[test]
    fn caller_values_overlay_declared_defaults() {
        let action = action(json!({
            "name": "search",
            "href": "/search",
            "method": "GET",
            "fields": [
                {"name": "limit", "value": 10},
                {"name": "sort", "value": "asc"},
            ],
        }));

        let request = action_request(&action, &args(json!({"limit": 25}))).unwrap();
        let mut query = request.query.clone();
        query.sort();
        assert_eq!(
            query,
            [
                ("limit".to_owned(), "25".to_owned()),
                ("sort".to_owned(), "asc".to_owned())
            ]
        );
    }

    #[test]
    fn falsy_payload_values_are_dropped() {
        let action = action(json!({"name": "search", "href": "/search", "method": "GET"}));
        let request = action_request(
            &action,
            &args(json!({
                "empty": "",
                "none": null,
                "zero": 0,
                "off": false,
                "bare": [],
                "kept": "yes",
                "listed": [1, 2],
            })),
        )
        .unwrap();

        let mut query = request.query.clone();
        query.sort();
        assert_eq!(
            query,
            [
                ("kept".to_owned(), "yes".to_owned()),
                ("listed".to_owned(), "[1,2]".to_owned())
            ]
        );
    }

    #[test]
    fn mutating_verbs_carry_a_json_body() {
        let action = action(json!({"name": "create", "href": "/orders", "method": "POST"}));
        let request = action_request(&action, &args(json!({"name": "n1", "count": 2}))).unwrap();

        assert!(request.query.is_empty());
        assert_eq!(
            request.body,
            Some(json!({"name": "n1", "count": "2"}))
        );
    }

    #[test]
    fn other_verbs_send_no_payload() {
        let action = action(json!({"name": "purge", "href": "/orders/1", "method": "DELETE"}));
        let request = action_request(&action, &args(json!({"reason": "cleanup"}))).unwrap();

        assert_eq!(request.method, Method::DELETE);
        assert!(request.query.is_empty());
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn child_iteration_is_filtered_lazy_and_restartable() {
        let entity = build(json!({
            "class": ["order"],
            "entities": [
                {"class": ["item"], "rel": ["item"], "properties": {"n": 1}},
                {"rel": ["item"], "href": "/items/2"},
                {"class": ["note"], "rel": ["note"], "properties": {}},
            ],
        }));
        let object = materialize(entity, config_with(RecordingTransport::new())).unwrap();

        assert_eq!(object.entities("unrelated").count(), 0);

        // Two passes over the same children; the second starts fresh.
        for _ in 0..2 {
            let children: Vec<Child> = object
                .entities("item")
                .collect::<Result<_>>()
                .unwrap();
            assert_eq!(children.len(), 2);
            match &children[0] {
                Child::Embedded(item) => assert_eq!(item.field("n"), Some(&json!(1))),
                other => panic!("expected embedded child, got {other:?}"),
            }
            match &children[1] {
                Child::Reference { link, .. } => assert_eq!(link.href, "/items/2"),
                other => panic!("expected link reference, got {other:?}"),
            }
        }

        let embedded = object.entities("item").next().unwrap().unwrap();
        let resolved = embedded.resolve().await.unwrap().unwrap();
        assert_eq!(resolved.classname(), "item");
    }
}
