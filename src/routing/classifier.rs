//! Route classification.
//!
//! Decides for every route descriptor whether it is excluded or exposed, and
//! as which capability kind. Classification is a pure function of
//! `(method, path_template, safety)`; the same input list always yields the
//! same output in the same order.

use serde::Serialize;

use crate::routing::descriptor::{HttpMethod, RouteDescriptor, SafetyTag};
use crate::routing::matcher::{PathTemplate, Segment};

/// How an exposed route is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    /// Invokable, takes a structured argument payload.
    Action,
    /// Zero-argument readable content.
    Resource,
    /// Readable content addressed by path placeholders.
    TemplatedResource,
}

impl CapabilityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CapabilityKind::Action => "action",
            CapabilityKind::Resource => "resource",
            CapabilityKind::TemplatedResource => "templated_resource",
        }
    }
}

/// Classifier verdict for a single descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Excluded,
    Exposed(CapabilityKind),
}

/// Classify one route.
pub fn classify_route(route: &RouteDescriptor) -> Classification {
    // Safety partition first: mutating routes in sensitive namespaces never
    // reach the capability surface.
    if route.method.is_mutating() && route.safety == SafetyTag::Sensitive {
        return Classification::Excluded;
    }

    match route.method {
        HttpMethod::Get if PathTemplate::parse(&route.path_template).has_params() => {
            Classification::Exposed(CapabilityKind::TemplatedResource)
        }
        HttpMethod::Get => Classification::Exposed(CapabilityKind::Resource),
        _ => Classification::Exposed(CapabilityKind::Action),
    }
}

/// Classify every route, preserving input order.
pub fn classify(routes: &[RouteDescriptor]) -> Vec<Classification> {
    routes.iter().map(classify_route).collect()
}

/// Base capability name for a path template.
///
/// Placeholders and empty segments are dropped, the rest lowercased with every
/// non-alphanumeric character mapped to `_`, then joined with `_`. Separators
/// left dangling by a removed placeholder are trimmed.
pub fn derive_name(path_template: &str) -> String {
    let parts: Vec<String> = PathTemplate::parse(path_template)
        .segments()
        .iter()
        .filter_map(|segment| {
            let name: String = segment
                .literal_text()
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() {
                        c.to_ascii_lowercase()
                    } else {
                        '_'
                    }
                })
                .collect();
            let name = match segment {
                Segment::Literal(_) => name,
                Segment::Pattern(_) => name.trim_matches('_').to_string(),
            };
            (!name.is_empty()).then_some(name)
        })
        .collect();

    if parts.is_empty() {
        "root".to_string()
    } else {
        parts.join("_")
    }
}
