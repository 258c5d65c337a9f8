use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A desired hostname-to-port binding for an application.
///
/// Routes are immutable values with set-element semantics: two routes are the
/// same iff both hostname and port match.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    pub hostname: String,
    pub port: u16,
}

/// An unordered set of desired routes, as decoded from a workload's route
/// annotation.
pub type RouteSet = HashSet<Route>;

#[derive(Debug, thiserror::Error)]
#[error("malformed route annotation {annotation:?}: {source}")]
pub struct DecodeError {
    pub annotation: String,
    #[source]
    source: serde_json::Error,
}

/// Decodes the JSON route-list annotation on a workload object.
///
/// A missing or empty annotation is an empty set, not an error. Malformed
/// JSON is a hard error and never yields a partial set; callers abort only
/// the current diff unit.
pub fn decode_routes(annotation: Option<&str>) -> Result<RouteSet, DecodeError> {
    let raw = match annotation {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(RouteSet::default()),
    };

    let routes: Vec<Route> = serde_json::from_str(raw).map_err(|source| DecodeError {
        annotation: raw.to_string(),
        source,
    })?;
    Ok(routes.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(hostname: &str, port: u16) -> Route {
        Route {
            hostname: hostname.to_string(),
            port,
        }
    }

    #[test]
    fn missing_and_empty_annotations_decode_to_empty_sets() {
        assert_eq!(decode_routes(None).unwrap(), RouteSet::default());
        assert_eq!(decode_routes(Some("")).unwrap(), RouteSet::default());
        assert_eq!(decode_routes(Some("[]")).unwrap(), RouteSet::default());
    }

    #[test]
    fn decodes_route_lists() {
        let routes = decode_routes(Some(
            r#"[{"hostname":"a.example.com","port":8080},{"hostname":"b.example.com","port":6565}]"#,
        ))
        .unwrap();
        assert_eq!(
            routes,
            [route("a.example.com", 8080), route("b.example.com", 6565)]
                .into_iter()
                .collect::<RouteSet>(),
        );
    }

    #[test]
    fn duplicate_entries_collapse() {
        let routes = decode_routes(Some(
            r#"[{"hostname":"a.example.com","port":8080},{"hostname":"a.example.com","port":8080}]"#,
        ))
        .unwrap();
        assert_eq!(routes.len(), 1);
    }

    #[test]
    fn malformed_json_is_a_hard_error() {
        let error = decode_routes(Some("{not json")).unwrap_err();
        assert_eq!(error.annotation, "{not json");

        // A syntactically valid but mistyped document is also rejected.
        assert!(decode_routes(Some(r#"{"hostname":"a.com","port":1}"#)).is_err());
    }

    #[test]
    fn out_of_range_ports_fail_the_whole_annotation() {
        // Ports are u16 end to end; one bad entry rejects the document, the
        // same all-or-nothing contract as malformed JSON.
        let error =
            decode_routes(Some(r#"[{"hostname":"a.com","port":70000}]"#)).unwrap_err();
        assert_eq!(error.annotation, r#"[{"hostname":"a.com","port":70000}]"#);
    }

    #[test]
    fn set_difference_over_decoded_routes() {
        let old = decode_routes(Some(
            r#"[{"hostname":"a.com","port":8080},{"hostname":"b.com","port":6565}]"#,
        ))
        .unwrap();
        let new = decode_routes(Some(r#"[{"hostname":"a.com","port":8080}]"#)).unwrap();

        let removed = old.difference(&new).cloned().collect::<RouteSet>();
        assert_eq!(removed, [route("b.com", 6565)].into_iter().collect());
    }
}
