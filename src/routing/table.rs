//! The capability table.
//!
//! # Responsibilities
//! - Run the classifier over the full descriptor list
//! - Assign stable, collision-free capability names
//! - Resolve capability names and resource URIs
//!
//! # Design Decisions
//! - Built once at startup and shared via Arc; never patched
//! - Immutable after construction (thread-safe without locks)
//! - Name collisions resolved in table order: `_{method}`, then `_2`, `_3`...
//! - A resource URI already taken falls back to `{scheme}://{name}`

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::routing::classifier::{classify_route, derive_name, CapabilityKind, Classification};
use crate::routing::descriptor::RouteDescriptor;
use crate::routing::matcher::PathTemplate;

/// An exposed backend route.
#[derive(Debug, Clone)]
pub struct CapabilityEntry {
    pub kind: CapabilityKind,
    pub name: String,
    pub description: String,
    /// Resource URI, or URI template for templated resources.
    pub uri: Option<String>,
    /// Path placeholders, in order.
    pub params: Vec<String>,
    pub template: PathTemplate,
    /// Originating descriptor.
    pub route: Arc<RouteDescriptor>,
}

/// The `listCapabilities()` view of an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilitySummary {
    pub name: String,
    pub kind: CapabilityKind,
    pub method: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    pub description: String,
}

impl CapabilityEntry {
    pub fn summary(&self) -> CapabilitySummary {
        CapabilitySummary {
            name: self.name.clone(),
            kind: self.kind,
            method: self.route.method.to_string(),
            path: self.route.path_template.clone(),
            uri: self.uri.clone(),
            description: self.description.clone(),
        }
    }
}

/// Read-only lookup structure built from the classified routes.
#[derive(Debug, Default)]
pub struct CapabilityTable {
    entries: Vec<Arc<CapabilityEntry>>,
    by_name: HashMap<String, usize>,
    excluded: Vec<Arc<RouteDescriptor>>,
    scheme: String,
}

impl CapabilityTable {
    /// Classify `routes` and build the table.
    pub fn build(routes: Vec<RouteDescriptor>, scheme: &str) -> Self {
        let mut entries = Vec::new();
        let mut by_name = HashMap::new();
        let mut taken: HashSet<String> = HashSet::new();
        let mut uris: HashSet<String> = HashSet::new();
        let mut excluded = Vec::new();

        for route in routes {
            let route = Arc::new(route);
            let kind = match classify_route(&route) {
                Classification::Excluded => {
                    excluded.push(route);
                    continue;
                }
                Classification::Exposed(kind) => kind,
            };

            let name = unique_name(&route, &taken);
            taken.insert(name.clone());

            let template = PathTemplate::parse(&route.path_template);
            let uri = match kind {
                CapabilityKind::Action => None,
                CapabilityKind::Resource | CapabilityKind::TemplatedResource => {
                    let mut uri = resource_uri(scheme, &route.path_template, &name);
                    if kind == CapabilityKind::Resource && uris.contains(&uri) {
                        uri = format!("{}://{}", scheme, name);
                    }
                    uris.insert(uri.clone());
                    Some(uri)
                }
            };
            let description = route
                .description
                .clone()
                .unwrap_or_else(|| format!("{} {}", route.method, route.path_template));

            by_name.insert(name.clone(), entries.len());
            entries.push(Arc::new(CapabilityEntry {
                kind,
                name,
                description,
                uri,
                params: template.params(),
                template,
                route,
            }));
        }

        Self {
            entries,
            by_name,
            excluded,
            scheme: scheme.to_string(),
        }
    }

    /// Look up a capability by name.
    pub fn get(&self, name: &str) -> Option<&Arc<CapabilityEntry>> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    /// All exposed entries, in table order.
    pub fn entries(&self) -> &[Arc<CapabilityEntry>] {
        &self.entries
    }

    pub fn of_kind(&self, kind: CapabilityKind) -> impl Iterator<Item = &Arc<CapabilityEntry>> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// Descriptors dropped by the safety partition.
    pub fn excluded(&self) -> &[Arc<RouteDescriptor>] {
        &self.excluded
    }

    pub fn summaries(&self) -> Vec<CapabilitySummary> {
        self.entries.iter().map(|e| e.summary()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a resource URI to its entry and captured placeholder values.
    ///
    /// Any query string is ignored. Plain resources need an exact URI match;
    /// templated resources are matched segment by segment with captured
    /// values percent-decoded.
    pub fn resolve_uri(&self, uri: &str) -> Option<(&Arc<CapabilityEntry>, Map<String, Value>)> {
        let uri = uri.split('?').next().unwrap_or(uri);
        if let Some(entry) = self
            .of_kind(CapabilityKind::Resource)
            .find(|e| e.uri.as_deref() == Some(uri))
        {
            return Some((entry, Map::new()));
        }

        let prefix = format!("{}://", self.scheme);
        let path = uri.strip_prefix(&prefix)?;

        self.of_kind(CapabilityKind::TemplatedResource)
            .find_map(|entry| {
                let captured = entry.template.capture(path)?;
                let mut args = Map::new();
                for (name, raw) in captured {
                    let value = urlencoding::decode(&raw).ok()?.into_owned();
                    args.insert(name, Value::String(value));
                }
                Some((entry, args))
            })
    }
}

fn unique_name(route: &RouteDescriptor, taken: &HashSet<String>) -> String {
    let base = route
        .name_override
        .clone()
        .unwrap_or_else(|| derive_name(&route.path_template));
    if !taken.contains(&base) {
        return base;
    }

    let with_method = format!("{}_{}", base, route.method.as_str().to_ascii_lowercase());
    if !taken.contains(&with_method) {
        return with_method;
    }

    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", with_method, n);
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn resource_uri(scheme: &str, path_template: &str, name: &str) -> String {
    let path = path_template.trim_matches('/');
    if path.is_empty() {
        format!("{}://{}", scheme, name)
    } else {
        format!("{}://{}", scheme, path)
    }
}
