//! Workload spec rendering.
//!
//! [`render`] is pure: identical inputs produce identical documents, and the
//! peer service name is the only templated value.

use serde::{Deserialize, Serialize};

use crate::image::ImageDetails;

/// Pod spec schema version understood by the orchestration platform.
pub const POD_SPEC_VERSION: u32 = 3;

pub const CONTAINER_NAME: &str = "ml-pipeline-persistenceagent";

/// Startup flag carrying the pipeline API server's service name.
pub const API_SERVER_FLAG: &str = "mlPipelineAPIServerName";

const READ_VERBS: [&str; 3] = ["get", "list", "watch"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    pub version: u32,
    pub service_account: ServiceAccount,
    pub containers: Vec<Container>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccount {
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub global: bool,
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub api_groups: Vec<String>,
    pub resources: Vec<String>,
    pub verbs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub name: String,
    pub image_details: ImageDetails,
    pub command: Vec<String>,
}

impl PodSpec {
    pub fn to_json(&self) -> serde_json::Value {
        // Every field is a string, bool, integer, or list of those.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

fn read_rule(api_group: &str, resource: &str) -> Rule {
    Rule {
        api_groups: vec![api_group.to_string()],
        resources: vec![resource.to_string()],
        verbs: READ_VERBS.iter().map(|v| v.to_string()).collect(),
    }
}

/// Render the persistence agent's pod spec.
pub fn render(image: &ImageDetails, api_service_name: &str) -> PodSpec {
    let command = [
        "persistence_agent".to_string(),
        "--logtostderr=true".to_string(),
        "--namespace=".to_string(),
        "--ttlSecondsAfterWorkflowFinish=86400".to_string(),
        "--numWorker=2".to_string(),
        format!("--{}={}", API_SERVER_FLAG, api_service_name),
    ];

    PodSpec {
        version: POD_SPEC_VERSION,
        service_account: ServiceAccount {
            roles: vec![Role {
                global: true,
                rules: vec![
                    read_rule("argoproj.io", "workflows"),
                    read_rule("kubeflow.org", "scheduledworkflows"),
                ],
            }],
        },
        containers: vec![Container {
            name: CONTAINER_NAME.to_string(),
            image_details: image.clone(),
            command: command.into(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_expected_document() {
        let spec = render(&ImageDetails::new("repo/img:tag"), "ml-pipeline");
        assert_eq!(
            spec.to_json(),
            json!({
                "version": 3,
                "serviceAccount": {
                    "roles": [{
                        "global": true,
                        "rules": [
                            {
                                "apiGroups": ["argoproj.io"],
                                "resources": ["workflows"],
                                "verbs": ["get", "list", "watch"]
                            },
                            {
                                "apiGroups": ["kubeflow.org"],
                                "resources": ["scheduledworkflows"],
                                "verbs": ["get", "list", "watch"]
                            }
                        ]
                    }]
                },
                "containers": [{
                    "name": "ml-pipeline-persistenceagent",
                    "imageDetails": {"imagePath": "repo/img:tag", "username": "", "password": ""},
                    "command": [
                        "persistence_agent",
                        "--logtostderr=true",
                        "--namespace=",
                        "--ttlSecondsAfterWorkflowFinish=86400",
                        "--numWorker=2",
                        "--mlPipelineAPIServerName=ml-pipeline"
                    ]
                }]
            })
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let image = ImageDetails {
            image_path: "repo/img:tag".to_string(),
            username: "u".to_string(),
            password: "p".to_string(),
        };
        let a = render(&image, "svc");
        let b = render(&image, "svc");
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn service_name_is_interpolated_verbatim_once() {
        for name in ["ml-pipeline", "odd name=with/chars", ""] {
            let spec = render(&ImageDetails::new("i"), name);
            let expected = format!("--mlPipelineAPIServerName={}", name);
            let hits = spec.containers[0]
                .command
                .iter()
                .filter(|arg| **arg == expected)
                .count();
            assert_eq!(hits, 1, "name: {:?}", name);
        }
    }

    #[test]
    fn credentials_are_carried_into_image_details() {
        let image = ImageDetails {
            image_path: "private/img:1".to_string(),
            username: "robot".to_string(),
            password: "secret".to_string(),
        };
        let json = render(&image, "svc").to_json();
        assert_eq!(
            json["containers"][0]["imageDetails"],
            json!({"imagePath": "private/img:1", "username": "robot", "password": "secret"})
        );
    }
}
