//! OCI image resource reader.
//!
//! The resource file is a JSON document published by the hosting runtime:
//!
//! ```json
//! {"registrypath": "repo/img:tag", "username": "", "password": ""}
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::ImageSource;

/// Resolved image reference handed to the container definition.
///
/// All three keys are always serialized; a public image carries empty
/// credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDetails {
    pub image_path: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl ImageDetails {
    pub fn new(image_path: impl Into<String>) -> Self {
        Self {
            image_path: image_path.into(),
            username: String::new(),
            password: String::new(),
        }
    }
}

/// Failures resolving an image resource. Both need operator action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageResourceError {
    #[error("Missing resource: {0}")]
    Missing(String),

    #[error("Invalid resource: {0}")]
    Invalid(String),
}

#[derive(Deserialize)]
struct ResourceFile {
    registrypath: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// An image resource backed by a file the runtime may or may not have attached.
#[derive(Debug, Clone)]
pub struct OciImageResource {
    name: String,
    path: Option<PathBuf>,
}

impl OciImageResource {
    pub fn new(name: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path,
        }
    }
}

impl ImageSource for OciImageResource {
    fn fetch(&self) -> Result<ImageDetails, ImageResourceError> {
        let missing = || ImageResourceError::Missing(self.name.clone());

        let path = self.path.as_ref().ok_or_else(missing)?;
        let content = std::fs::read_to_string(path).map_err(|_| missing())?;
        if content.trim().is_empty() {
            return Err(missing());
        }

        let resource: ResourceFile = serde_json::from_str(&content).map_err(|e| {
            tracing::debug!(resource = %self.name, error = %e, "unparseable image resource");
            ImageResourceError::Invalid(self.name.clone())
        })?;

        Ok(ImageDetails {
            image_path: resource.registrypath,
            username: resource.username,
            password: resource.password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn resource_file(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn fetch_reads_registry_path_and_credentials() {
        let f = resource_file(
            r#"{"registrypath": "repo/img:tag", "username": "u", "password": "p"}"#,
        );
        let image = OciImageResource::new("oci-image", Some(f.path().to_path_buf()));
        assert_eq!(
            image.fetch().unwrap(),
            ImageDetails {
                image_path: "repo/img:tag".to_string(),
                username: "u".to_string(),
                password: "p".to_string(),
            }
        );
    }

    #[test]
    fn credentials_are_optional() {
        let f = resource_file(r#"{"registrypath": "repo/img:tag"}"#);
        let image = OciImageResource::new("oci-image", Some(f.path().to_path_buf()));
        assert_eq!(image.fetch().unwrap(), ImageDetails::new("repo/img:tag"));
    }

    #[test]
    fn image_details_always_serialize_credentials() {
        let json = serde_json::to_value(ImageDetails::new("repo/img:tag")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"imagePath": "repo/img:tag", "username": "", "password": ""})
        );
    }

    #[test]
    fn unattached_or_empty_resource_is_missing() {
        let image = OciImageResource::new("oci-image", None);
        assert_eq!(
            image.fetch(),
            Err(ImageResourceError::Missing("oci-image".to_string()))
        );

        let image = OciImageResource::new("oci-image", Some(PathBuf::from("/nonexistent/x.json")));
        assert!(matches!(image.fetch(), Err(ImageResourceError::Missing(_))));

        let f = resource_file("  \n");
        let image = OciImageResource::new("oci-image", Some(f.path().to_path_buf()));
        assert!(matches!(image.fetch(), Err(ImageResourceError::Missing(_))));
    }

    #[test]
    fn malformed_resource_is_invalid() {
        for content in ["not json", r#"{"username": "u"}"#, r#"{"registrypath": 5}"#] {
            let f = resource_file(content);
            let image = OciImageResource::new("oci-image", Some(f.path().to_path_buf()));
            assert_eq!(
                image.fetch(),
                Err(ImageResourceError::Invalid("oci-image".to_string())),
                "content: {}",
                content
            );
        }
    }

    #[test]
    fn error_messages_name_the_resource() {
        assert_eq!(
            ImageResourceError::Missing("oci-image".to_string()).to_string(),
            "Missing resource: oci-image"
        );
        assert_eq!(
            ImageResourceError::Invalid("oci-image".to_string()).to_string(),
            "Invalid resource: oci-image"
        );
    }
}
