use kfp_persistence_core::{render, ImageDetails};

use crate::OutputFormat;

pub(crate) fn cmd_render(
    image: String,
    username: Option<String>,
    password: Option<String>,
    service_name: &str,
    output: OutputFormat,
) {
    let details = ImageDetails {
        image_path: image,
        username: username.unwrap_or_default(),
        password: password.unwrap_or_default(),
    };
    let spec = render(&details, service_name);

    let rendered = match output {
        OutputFormat::Text => serde_json::to_string_pretty(&spec),
        OutputFormat::Json => serde_json::to_string(&spec),
    };
    println!(
        "{}",
        rendered.unwrap_or_else(|e| format!("serialization error: {}", e))
    );
}
