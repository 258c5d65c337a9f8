use crate::{ObjectMeta, Pod, Workload};

/// Annotation on the workload object holding the JSON route list.
pub const ROUTES_ANNOTATION: &str = "route-sync.io/routes";

/// Optional annotation naming the TLS port shared by all of the workload's
/// routes. Absent or unparsable means TLS is unused.
pub const TLS_PORT_ANNOTATION: &str = "route-sync.io/tls-port";

/// Owner kind that makes a pod eligible for route registration.
pub const WORKLOAD_KIND: &str = "StatefulSet";

/// Reads the raw route annotation, if any.
pub fn routes_annotation(meta: &ObjectMeta) -> Option<&str> {
    meta.annotations
        .as_ref()
        .and_then(|annotations| annotations.get(ROUTES_ANNOTATION))
        .map(String::as_str)
}

/// Reads the workload's TLS port annotation; 0 means unused.
pub fn tls_port(meta: &ObjectMeta) -> u16 {
    let raw = match meta
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(TLS_PORT_ANNOTATION))
    {
        Some(raw) => raw,
        None => return 0,
    };

    match raw.parse() {
        Ok(port) => port,
        Err(error) => {
            tracing::warn!(annotation = %raw, %error, "Ignoring invalid TLS port annotation");
            0
        }
    }
}

/// Formats the workload's pod-template selector as a label selector string.
///
/// Only equality-based (`matchLabels`) selection is supported; the workload
/// authoring API never writes expressions.
pub fn selector_string(workload: &Workload) -> Option<String> {
    let labels = workload
        .spec
        .as_ref()?
        .selector
        .match_labels
        .as_ref()?;
    if labels.is_empty() {
        return None;
    }
    Some(
        labels
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// Resolves the name of the pod's owning workload, if it has one.
pub fn owner_workload(pod: &Pod) -> Option<String> {
    pod.metadata
        .owner_references
        .iter()
        .flatten()
        .find(|owner| owner.kind == WORKLOAD_KIND)
        .map(|owner| owner.name.clone())
}

/// A pod is ready when its `Ready` condition reports `True`.
pub fn pod_ready(pod: &Pod) -> bool {
    pod.status
        .as_ref()
        .and_then(|status| status.conditions.as_ref())
        .into_iter()
        .flatten()
        .any(|condition| condition.type_ == "Ready" && condition.status == "True")
}

/// The pod's routable address, if the kubelet has assigned one.
pub fn pod_ip(pod: &Pod) -> Option<&str> {
    pod.status
        .as_ref()
        .and_then(|status| status.pod_ip.as_deref())
        .filter(|ip| !ip.is_empty())
}

pub fn marked_for_deletion(meta: &ObjectMeta) -> bool {
    meta.deletion_timestamp.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PodStatus;
    use k8s_openapi::api::apps::v1::StatefulSetSpec;
    use k8s_openapi::api::core::v1::PodCondition;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, OwnerReference};

    fn meta_with_annotations(annotations: &[(&str, &str)]) -> ObjectMeta {
        ObjectMeta {
            annotations: Some(
                annotations
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn reads_route_annotation() {
        let meta = meta_with_annotations(&[(ROUTES_ANNOTATION, "[]")]);
        assert_eq!(routes_annotation(&meta), Some("[]"));
        assert_eq!(routes_annotation(&ObjectMeta::default()), None);
    }

    #[test]
    fn tls_port_defaults_to_zero() {
        assert_eq!(tls_port(&ObjectMeta::default()), 0);
        assert_eq!(
            tls_port(&meta_with_annotations(&[(TLS_PORT_ANNOTATION, "8443")])),
            8443
        );
        assert_eq!(
            tls_port(&meta_with_annotations(&[(TLS_PORT_ANNOTATION, "not-a-port")])),
            0
        );
    }

    #[test]
    fn selector_string_joins_match_labels() {
        let workload = Workload {
            spec: Some(StatefulSetSpec {
                selector: LabelSelector {
                    match_labels: Some(
                        [("app".to_string(), "web".to_string())].into_iter().collect(),
                    ),
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(selector_string(&workload).as_deref(), Some("app=web"));
        assert_eq!(selector_string(&Workload::default()), None);
    }

    #[test]
    fn owner_resolution_requires_a_workload_kind_owner() {
        let mut pod = Pod::default();
        assert_eq!(owner_workload(&pod), None);

        pod.metadata.owner_references = Some(vec![
            OwnerReference {
                kind: "ReplicaSet".to_string(),
                name: "other".to_string(),
                ..Default::default()
            },
            OwnerReference {
                kind: WORKLOAD_KIND.to_string(),
                name: "app".to_string(),
                ..Default::default()
            },
        ]);
        assert_eq!(owner_workload(&pod).as_deref(), Some("app"));
    }

    #[test]
    fn readiness_follows_the_ready_condition() {
        let mut pod = Pod::default();
        assert!(!pod_ready(&pod));

        pod.status = Some(PodStatus {
            conditions: Some(vec![PodCondition {
                type_: "Ready".to_string(),
                status: "True".to_string(),
                ..Default::default()
            }]),
            pod_ip: Some("10.0.0.1".to_string()),
            ..Default::default()
        });
        assert!(pod_ready(&pod));
        assert_eq!(pod_ip(&pod), Some("10.0.0.1"));
    }
}
