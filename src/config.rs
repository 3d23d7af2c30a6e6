// src/config.rs
//
// Descriptor requests read from TOML/JSON files, and the tool's own
// `eltwise.toml` settings.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::core::kinds::{AlgKind, PropKind};
use crate::core::memory::MemoryDesc;
use crate::engine::eltwise::{
    eltwise_backward_desc_init, eltwise_forward_desc_init, relu_backward_desc_init,
    relu_forward_desc_init, EltwiseDesc,
};
use crate::engine::error::EltwiseError;

pub const CONFIG_FILE: &str = "eltwise.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported request file extension: {0}")]
    UnknownExtension(String),

    #[error("Missing field `{field}` for op {op}")]
    MissingField { op: RequestOp, field: &'static str },

    #[error(transparent)]
    Descriptor(#[from] EltwiseError),
}

/// Entry point a request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOp {
    Forward,
    Backward,
    ReluForward,
    ReluBackward,
}

impl std::fmt::Display for RequestOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RequestOp::Forward => "forward",
            RequestOp::Backward => "backward",
            RequestOp::ReluForward => "relu_forward",
            RequestOp::ReluBackward => "relu_backward",
        };
        f.write_str(name)
    }
}

/// Un request de descriptor tal como aparece en un fichero:
///
/// ```toml
/// op = "relu_backward"
/// negative_slope = 0.2
///
/// [data]
/// dims = [2, 3]
/// data_type = "f32"
///
/// [diff_data]
/// dims = [2, 3]
/// data_type = "f32"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorRequest {
    pub op: RequestOp,
    #[serde(default)]
    pub prop_kind: Option<PropKind>,
    #[serde(default)]
    pub alg_kind: Option<AlgKind>,
    #[serde(default)]
    pub data: Option<MemoryDesc>,
    #[serde(default)]
    pub diff_data: Option<MemoryDesc>,
    #[serde(default)]
    pub alpha: f64,
    #[serde(default)]
    pub beta: f64,
    #[serde(default)]
    pub negative_slope: f64,
}

impl DescriptorRequest {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads a request, picking the format from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        debug!(path = %path.display(), ext = %ext, "loading descriptor request");
        match ext.as_str() {
            "toml" => Self::from_toml_str(&text),
            "json" => Self::from_json_str(&text),
            other => Err(ConfigError::UnknownExtension(other.to_string())),
        }
    }

    fn required<T: Copy>(&self, field: &'static str, value: Option<T>) -> Result<T, ConfigError> {
        value.ok_or(ConfigError::MissingField { op: self.op, field })
    }

    /// Routes the request to its builder. `data`/`diff_data` go through
    /// as-is; the builder checks presence and memory descriptor limits.
    pub fn build(&self) -> Result<EltwiseDesc, ConfigError> {
        let data = self.data.as_ref();
        let diff = self.diff_data.as_ref();

        let ed = match self.op {
            RequestOp::Forward => eltwise_forward_desc_init(
                self.required("prop_kind", self.prop_kind)?,
                self.required("alg_kind", self.alg_kind)?,
                data,
                self.alpha,
                self.beta,
            )?,
            RequestOp::Backward => eltwise_backward_desc_init(
                self.required("alg_kind", self.alg_kind)?,
                diff,
                data,
                self.alpha,
                self.beta,
            )?,
            RequestOp::ReluForward => relu_forward_desc_init(
                self.required("prop_kind", self.prop_kind)?,
                data,
                self.negative_slope,
            )?,
            RequestOp::ReluBackward => relu_backward_desc_init(diff, data, self.negative_slope)?,
        };
        debug!(op = %self.op, prop = %ed.prop_kind(), alg = %ed.alg_kind(), "descriptor built");
        Ok(ed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Display,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "display" => Ok(OutputFormat::Display),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub format: OutputFormat,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            format: OutputFormat::Display,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// EnvFilter directive used when RUST_LOG is unset.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Contenido de `eltwise.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub output: OutputSection,
    pub logging: LoggingSection,
}

impl ToolConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn default_toml() -> &'static str {
        r#"[output]
format = "display"

[logging]
level = "warn"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::MemoryDescError;
    use crate::engine::error::InvalidReason;

    #[test]
    fn test_relu_backward_request_from_toml() {
        let req = DescriptorRequest::from_toml_str(
            r#"
op = "relu_backward"
negative_slope = 0.2

[data]
dims = [2, 3]
data_type = "f32"

[diff_data]
dims = [2, 3]
data_type = "f32"
"#,
        )
        .unwrap();
        let ed = req.build().unwrap();
        assert_eq!(ed.prop_kind(), PropKind::BackwardData);
        assert_eq!(ed.alg_kind(), AlgKind::EltwiseRelu);
        assert_eq!(ed.alpha(), 0.2);
        assert_eq!(ed.negative_slope(), 0.2);
    }

    #[test]
    fn test_forward_request_needs_prop_kind() {
        let req = DescriptorRequest::from_json_str(
            r#"{"op": "forward", "alg_kind": "eltwise_tanh", "data": {"dims": [4]}}"#,
        )
        .unwrap();
        assert!(matches!(
            req.build(),
            Err(ConfigError::MissingField {
                field: "prop_kind",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_data_reaches_builder() {
        let req = DescriptorRequest::from_json_str(
            r#"{"op": "backward", "alg_kind": "eltwise_elu", "diff_data": {"dims": [4]}}"#,
        )
        .unwrap();
        match req.build() {
            Err(ConfigError::Descriptor(e)) => {
                assert_eq!(e.reason(), &InvalidReason::MissingDataDesc)
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_deserialized_memory_desc_is_validated() {
        let req = DescriptorRequest::from_json_str(
            r#"{"op": "relu_forward", "prop_kind": "forward_inference", "data": {"dims": [2, 0]}}"#,
        )
        .unwrap();
        match req.build() {
            Err(ConfigError::Descriptor(e)) => assert!(matches!(
                e.reason(),
                InvalidReason::InvalidMemoryDesc {
                    which: "data",
                    error: MemoryDescError::ZeroExtent { axis: 1, .. }
                }
            )),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_tool_config_defaults() {
        let cfg = ToolConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, ToolConfig::default());
        assert_eq!(cfg.output.format, OutputFormat::Display);

        let cfg = ToolConfig::from_toml_str("[output]\nformat = \"json\"\n").unwrap();
        assert_eq!(cfg.output.format, OutputFormat::Json);
        assert_eq!(cfg.logging.level, "warn");

        let round = ToolConfig::from_toml_str(ToolConfig::default_toml()).unwrap();
        assert_eq!(round, ToolConfig::default());
    }
}
