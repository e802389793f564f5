//! OpenAPI 3.x loading and semantic validation.
//!
//! Loading only checks the *shape* of the document: a field holding the wrong
//! kind of value is a load error. Fields the OpenAPI specification marks as
//! required are optional here so that their absence surfaces from
//! [`OpenApiDocument::validate`] as a [`ValidationIssue`] instead.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PolicyError;

/// HTTP methods recognized as operations in a path item.
const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Valid values of a parameter's `in` field.
const PARAMETER_LOCATIONS: &[&str] = &["query", "header", "path", "cookie", "querystring"];

/// A loaded OpenAPI document.
#[derive(Debug, Clone)]
pub struct OpenApiDocument {
    /// The `openapi` version string.
    pub openapi: Option<String>,
    pub info: Option<Info>,
    pub servers: Vec<Server>,
    /// Path items keyed by path template. `x-` extension keys are skipped.
    pub paths: BTreeMap<String, PathItem>,
    pub components: Option<Components>,
    /// The untyped document, kept for `$ref` resolution.
    root: Value,
}

#[derive(Debug, Clone, Deserialize)]
struct RawDocument {
    openapi: Option<String>,
    info: Option<Info>,
    #[serde(default)]
    servers: Vec<Server>,
    paths: Option<Map<String, Value>>,
    components: Option<Components>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Info {
    pub title: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub url: Option<String>,
    pub description: Option<String>,
}

/// Either a `$ref` to a component or the inline object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Item(T),
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathItem {
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
    pub get: Option<Operation>,
    pub put: Option<Operation>,
    pub post: Option<Operation>,
    pub delete: Option<Operation>,
    pub options: Option<Operation>,
    pub head: Option<Operation>,
    pub patch: Option<Operation>,
    pub trace: Option<Operation>,
}

impl PathItem {
    /// Iterate over the operations defined on this path, in [`HTTP_METHODS`] order.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        let slots = [
            &self.get,
            &self.put,
            &self.post,
            &self.delete,
            &self.options,
            &self.head,
            &self.patch,
            &self.trace,
        ];
        HTTP_METHODS
            .iter()
            .zip(slots)
            .filter_map(|(method, op)| op.as_ref().map(|op| (*method, op)))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
    pub request_body: Option<Value>,
    pub responses: Option<Map<String, Value>>,
    #[serde(default)]
    pub deprecated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    pub name: Option<String>,
    #[serde(rename = "in")]
    pub location: Option<String>,
    pub required: Option<bool>,
    pub schema: Option<Value>,
    pub content: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: BTreeMap<String, Value>,
    #[serde(default)]
    pub parameters: BTreeMap<String, RefOr<Parameter>>,
    /// Remaining sections (`responses`, `requestBodies`, `securitySchemes`, ...).
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// A semantic problem found in an otherwise well-formed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub code: &'static str,
    pub message: String,
    /// JSON pointer into the document.
    pub location: String,
}

impl ValidationIssue {
    fn new(code: &'static str, location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            location: location.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.code, self.message, self.location)
    }
}

/// Load an OpenAPI document from JSON bytes.
pub fn load(json: &[u8]) -> Result<OpenApiDocument, PolicyError> {
    let root: Value = serde_json::from_slice(json)
        .map_err(|e| PolicyError::Load(format!("invalid JSON: {}", e)))?;
    if !root.is_object() {
        return Err(PolicyError::Load("document root must be an object".into()));
    }

    let raw: RawDocument =
        serde_json::from_value(root.clone()).map_err(|e| PolicyError::Load(e.to_string()))?;

    let mut paths = BTreeMap::new();
    for (path, item) in raw.paths.unwrap_or_default() {
        if path.starts_with("x-") {
            continue;
        }
        let item: PathItem = serde_json::from_value(item)
            .map_err(|e| PolicyError::Load(format!("path item '{}': {}", path, e)))?;
        paths.insert(path, item);
    }

    Ok(OpenApiDocument {
        openapi: raw.openapi,
        info: raw.info,
        servers: raw.servers,
        paths,
        components: raw.components,
        root,
    })
}

impl OpenApiDocument {
    /// Run every semantic check and collect the issues. An empty list means
    /// the document is valid.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        self.check_version(&mut issues);
        self.check_info(&mut issues);
        self.check_servers(&mut issues);
        self.check_paths(&mut issues);
        self.check_operation_ids(&mut issues);
        self.check_components(&mut issues);
        check_refs(&self.root, &self.root, "", &mut issues);
        if self.is_json_schema_dialect() {
            self.check_schemas(&mut issues);
        }
        issues
    }

    /// OpenAPI 3.0 requires `responses` on every operation; 3.1 relaxed it.
    fn is_v3_0(&self) -> bool {
        self.openapi.as_deref().is_some_and(|v| v.starts_with("3.0"))
    }

    /// From 3.1 on, schema objects are plain JSON Schema 2020-12.
    fn is_json_schema_dialect(&self) -> bool {
        self.openapi
            .as_deref()
            .is_some_and(|v| v.starts_with("3.") && !v.starts_with("3.0"))
    }

    fn check_version(&self, issues: &mut Vec<ValidationIssue>) {
        match self.openapi.as_deref() {
            None => issues.push(ValidationIssue::new(
                "E2001",
                "/openapi",
                "missing 'openapi' version field",
            )),
            Some(v) if !v.starts_with("3.") => issues.push(ValidationIssue::new(
                "E2001",
                "/openapi",
                format!("unsupported OpenAPI version: {} (only 3.x supported)", v),
            )),
            Some(_) => {}
        }
    }

    fn check_info(&self, issues: &mut Vec<ValidationIssue>) {
        let Some(info) = &self.info else {
            issues.push(ValidationIssue::new("E2002", "/info", "missing 'info' object"));
            return;
        };
        if info.title.as_deref().map_or(true, str::is_empty) {
            issues.push(ValidationIssue::new("E2002", "/info/title", "missing 'info.title'"));
        }
        if info.version.as_deref().map_or(true, str::is_empty) {
            issues.push(ValidationIssue::new(
                "E2002",
                "/info/version",
                "missing 'info.version'",
            ));
        }
    }

    fn check_servers(&self, issues: &mut Vec<ValidationIssue>) {
        for (i, server) in self.servers.iter().enumerate() {
            if server.url.as_deref().map_or(true, str::is_empty) {
                issues.push(ValidationIssue::new(
                    "E2011",
                    format!("/servers/{}/url", i),
                    "server is missing 'url'",
                ));
            }
        }
    }

    fn check_paths(&self, issues: &mut Vec<ValidationIssue>) {
        for (path, item) in &self.paths {
            let location = format!("/paths/{}", escape_pointer(path));

            if !path.starts_with('/') {
                issues.push(ValidationIssue::new(
                    "E2003",
                    &location,
                    format!("path '{}' must start with '/'", path),
                ));
            }

            let template_params = match template_params(path) {
                Ok(params) => params,
                Err(reason) => {
                    issues.push(ValidationIssue::new(
                        "E2003",
                        &location,
                        format!("invalid path template '{}': {}", path, reason),
                    ));
                    continue;
                }
            };

            let path_params = self.inline_parameters(&item.parameters);
            for (i, param) in &path_params {
                check_parameter(param, &format!("{}/parameters/{}", location, i), issues);
            }

            for (method, op) in item.operations() {
                let op_location = format!("{}/{}", location, method);
                let op_params = self.inline_parameters(&op.parameters);
                for (i, param) in &op_params {
                    check_parameter(param, &format!("{}/parameters/{}", op_location, i), issues);
                }

                let declared: HashSet<&str> = path_params
                    .iter()
                    .chain(op_params.iter())
                    .filter(|(_, p)| p.location.as_deref() == Some("path"))
                    .filter_map(|(_, p)| p.name.as_deref())
                    .collect();

                for name in &template_params {
                    if !declared.contains(name) {
                        issues.push(ValidationIssue::new(
                            "E2004",
                            &op_location,
                            format!(
                                "path parameter '{}' of {} {} is not declared",
                                name,
                                method.to_uppercase(),
                                path
                            ),
                        ));
                    }
                }
                for name in declared {
                    if !template_params.contains(&name) {
                        issues.push(ValidationIssue::new(
                            "E2004",
                            &op_location,
                            format!(
                                "path parameter '{}' of {} {} does not appear in the path",
                                name,
                                method.to_uppercase(),
                                path
                            ),
                        ));
                    }
                }

                self.check_responses(op, method, path, &op_location, issues);
            }
        }
    }

    fn check_responses(
        &self,
        op: &Operation,
        method: &str,
        path: &str,
        location: &str,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let responses = op.responses.as_ref();
        let has_responses =
            responses.is_some_and(|r| r.keys().any(|code| !code.starts_with("x-")));
        if !has_responses && self.is_v3_0() {
            issues.push(ValidationIssue::new(
                "E2006",
                format!("{}/responses", location),
                format!(
                    "operation {} {} must define at least one response",
                    method.to_uppercase(),
                    path
                ),
            ));
        }
        for code in responses.into_iter().flat_map(|r| r.keys()) {
            if !code.starts_with("x-") && !is_response_code(code) {
                issues.push(ValidationIssue::new(
                    "E2006",
                    format!("{}/responses/{}", location, escape_pointer(code)),
                    format!("invalid response code '{}'", code),
                ));
            }
        }
    }

    fn check_operation_ids(&self, issues: &mut Vec<ValidationIssue>) {
        let mut seen: HashMap<&str, String> = HashMap::new();
        for (path, item) in &self.paths {
            for (method, op) in item.operations() {
                let Some(id) = op.operation_id.as_deref() else {
                    continue;
                };
                let here = format!("{} {}", method.to_uppercase(), path);
                if let Some(first) = seen.get(id) {
                    issues.push(ValidationIssue::new(
                        "E2007",
                        format!("/paths/{}/{}/operationId", escape_pointer(path), method),
                        format!("duplicate operationId '{}' ({} and {})", id, first, here),
                    ));
                } else {
                    seen.insert(id, here);
                }
            }
        }
    }

    fn check_components(&self, issues: &mut Vec<ValidationIssue>) {
        let Some(components) = &self.components else {
            return;
        };

        let mut names: Vec<(&str, &str)> = Vec::new();
        names.extend(components.schemas.keys().map(|n| ("schemas", n.as_str())));
        names.extend(components.parameters.keys().map(|n| ("parameters", n.as_str())));
        for (section, entries) in &components.other {
            if section.starts_with("x-") {
                continue;
            }
            if let Some(entries) = entries.as_object() {
                names.extend(entries.keys().map(|n| (section.as_str(), n.as_str())));
            }
        }
        for (section, name) in names {
            if !is_component_name(name) {
                issues.push(ValidationIssue::new(
                    "E2008",
                    format!("/components/{}/{}", section, escape_pointer(name)),
                    format!("invalid component name '{}'", name),
                ));
            }
        }

        for (name, param) in &components.parameters {
            if let RefOr::Item(param) = param {
                check_parameter(
                    param,
                    &format!("/components/parameters/{}", escape_pointer(name)),
                    issues,
                );
            }
        }
    }

    /// Compile every self-contained component schema as JSON Schema.
    fn check_schemas(&self, issues: &mut Vec<ValidationIssue>) {
        let Some(components) = &self.components else {
            return;
        };
        for (name, schema) in &components.schemas {
            // Referencing schemas cannot be compiled standalone, and custom
            // dialects are not known to the validator.
            if contains_key(schema, "$ref") || schema.get("$schema").is_some() {
                continue;
            }
            if let Err(e) = jsonschema::validator_for(schema) {
                issues.push(ValidationIssue::new(
                    "E2010",
                    format!("/components/schemas/{}", escape_pointer(name)),
                    format!("invalid schema '{}': {}", name, e),
                ));
            }
        }
    }

    /// Resolve parameter references, keeping each parameter's index. Broken
    /// references are reported by the `$ref` check and skipped here.
    fn inline_parameters(&self, params: &[RefOr<Parameter>]) -> Vec<(usize, Parameter)> {
        params
            .iter()
            .enumerate()
            .filter_map(|(i, param)| match param {
                RefOr::Item(p) => Some((i, p.clone())),
                RefOr::Ref { reference } => resolve_ref(&self.root, reference)
                    .and_then(|target| serde_json::from_value::<Parameter>(target.clone()).ok())
                    .map(|p| (i, p)),
            })
            .collect()
    }
}

fn check_parameter(param: &Parameter, location: &str, issues: &mut Vec<ValidationIssue>) {
    let name = param.name.as_deref().unwrap_or_default();
    if name.is_empty() {
        issues.push(ValidationIssue::new(
            "E2005",
            location,
            "parameter is missing 'name'",
        ));
    }

    match param.location.as_deref() {
        None => issues.push(ValidationIssue::new(
            "E2005",
            location,
            format!("parameter '{}' is missing 'in'", name),
        )),
        Some(loc) if !PARAMETER_LOCATIONS.contains(&loc) => issues.push(ValidationIssue::new(
            "E2005",
            location,
            format!("parameter '{}' has invalid location '{}'", name, loc),
        )),
        Some("path") if param.required != Some(true) => issues.push(ValidationIssue::new(
            "E2005",
            location,
            format!("path parameter '{}' must be required", name),
        )),
        Some(_) => {}
    }

    match (&param.schema, &param.content) {
        (Some(_), Some(_)) => issues.push(ValidationIssue::new(
            "E2005",
            location,
            format!("parameter '{}' must not define both 'schema' and 'content'", name),
        )),
        (None, None) => issues.push(ValidationIssue::new(
            "E2005",
            location,
            format!("parameter '{}' must define 'schema' or 'content'", name),
        )),
        (None, Some(content)) if content.len() != 1 => issues.push(ValidationIssue::new(
            "E2005",
            location,
            format!("parameter '{}' content must hold exactly one media type", name),
        )),
        _ => {}
    }
}

/// Walk the whole document and report every local `$ref` that does not resolve.
fn check_refs(value: &Value, root: &Value, location: &str, issues: &mut Vec<ValidationIssue>) {
    match value {
        Value::Object(obj) => {
            if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
                if reference.starts_with('#') && resolve_ref(root, reference).is_none() {
                    issues.push(ValidationIssue::new(
                        "E2009",
                        location,
                        format!("unresolved $ref: {}", reference),
                    ));
                }
            }
            for (key, child) in obj {
                // Examples are free-form data, extensions are vendor-defined.
                if key == "example" || key.starts_with("x-") {
                    continue;
                }
                let child_location = format!("{}/{}", location, escape_pointer(key));
                check_refs(child, root, &child_location, issues);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                check_refs(child, root, &format!("{}/{}", location, i), issues);
            }
        }
        _ => {}
    }
}

/// Resolve a JSON Reference like `#/components/schemas/User` from the document root.
///
/// Only local references are supported. Returns `None` for external refs.
fn resolve_ref<'a>(root: &'a Value, ref_path: &str) -> Option<&'a Value> {
    if ref_path == "#" {
        return Some(root);
    }
    let pointer = ref_path.strip_prefix("#/")?;
    let mut current = root;
    for segment in pointer.split('/') {
        let unescaped = segment.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Array(items) => items.get(unescaped.parse::<usize>().ok()?)?,
            other => other.get(&unescaped)?,
        };
    }
    Some(current)
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Extract the parameter names of a path template such as `/users/{id}`.
fn template_params(path: &str) -> Result<Vec<&str>, &'static str> {
    let mut names = Vec::new();
    let mut open: Option<usize> = None;
    for (i, c) in path.char_indices() {
        match (c, open) {
            ('{', None) => open = Some(i + 1),
            ('{', Some(_)) => return Err("nested '{'"),
            ('}', None) => return Err("unmatched '}'"),
            ('}', Some(start)) => {
                let name = &path[start..i];
                if name.is_empty() {
                    return Err("empty parameter name");
                }
                names.push(name);
                open = None;
            }
            _ => {}
        }
    }
    if open.is_some() {
        return Err("unclosed '{'");
    }
    Ok(names)
}

/// `default`, a three-digit status code, or a range such as `4XX`.
fn is_response_code(code: &str) -> bool {
    if code == "default" {
        return true;
    }
    let bytes = code.as_bytes();
    if bytes.len() != 3 || !(b'1'..=b'5').contains(&bytes[0]) {
        return false;
    }
    bytes[1..].iter().all(u8::is_ascii_digit) || &bytes[1..] == b"XX"
}

/// Component names must match `^[a-zA-Z0-9.\-_]+$`.
fn is_component_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

fn contains_key(value: &Value, key: &str) -> bool {
    match value {
        Value::Object(obj) => obj.contains_key(key) || obj.values().any(|v| contains_key(v, key)),
        Value::Array(items) => items.iter().any(|v| contains_key(v, key)),
        _ => false,
    }
}
