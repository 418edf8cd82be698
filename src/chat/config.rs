//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg`, an optional YAML
//! configuration file, and the resolved configuration that drives a session.
//! Precedence, lowest first: built-in defaults, the YAML file, command-line flags.

use std::path::Path;
use std::time::Duration;

use arrrg_derive::CommandLine;
use serde::{Deserialize, Serialize};

use crate::client::DEFAULT_ENDPOINT;
use crate::error::{Error, Result};

/// Deployment used when none is configured.
pub const DEFAULT_DEPLOYMENT: &str = "gpt-4o";

/// System prompt used when none is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Answer accurately and concisely.";

/// Default timeout for connecting and for blocking responses, in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Command-line arguments for the dialchat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// YAML configuration file.
    #[arrrg(optional, "YAML configuration file", "PATH")]
    pub config: Option<String>,

    /// Deployment to chat with.
    #[arrrg(optional, "Deployment to use (default: gpt-4o)", "NAME")]
    pub deployment: Option<String>,

    /// Service root URL.
    #[arrrg(optional, "Service root URL", "URL")]
    pub endpoint: Option<String>,

    /// System prompt to set context for the conversation.
    #[arrrg(optional, "System prompt for the conversation", "PROMPT")]
    pub system: Option<String>,

    /// Timeout in seconds.
    #[arrrg(optional, "Connect/response timeout in seconds (default: 60)", "SECONDS")]
    pub timeout: Option<u64>,

    /// Wait for whole answers instead of streaming them.
    #[arrrg(flag, "Wait for whole answers instead of streaming")]
    pub no_stream: bool,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Print every request and raw stream line to stderr.
    #[arrrg(flag, "Log requests and responses to stderr")]
    pub verbose: bool,
}

/// The on-disk form of a configuration.  Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfigFile {
    /// Deployment to chat with.
    #[serde(default)]
    pub deployment: Option<String>,
    /// Service root URL.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// System prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Whether to stream responses.
    #[serde(default)]
    pub stream: Option<bool>,
    /// Whether to use ANSI colors.
    #[serde(default)]
    pub color: Option<bool>,
    /// Whether to log traffic to stderr.
    #[serde(default)]
    pub verbose: Option<bool>,
    /// Timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// the configuration file and command-line arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// The deployment answering the conversation.
    pub deployment: String,

    /// The service root URL.
    pub endpoint: String,

    /// The system prompt that opens every conversation.
    pub system_prompt: String,

    /// Whether to stream responses.
    pub stream: bool,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Whether to log every request and stream line to stderr.
    pub verbose: bool,

    /// Timeout for connecting and for blocking responses, in seconds.
    pub timeout_secs: u64,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Deployment: gpt-4o
    /// - Streaming: enabled
    /// - Color: enabled
    /// - Verbose: disabled
    /// - Timeout: 60 seconds
    pub fn new() -> Self {
        Self {
            deployment: DEFAULT_DEPLOYMENT.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            stream: true,
            use_color: true,
            verbose: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the deployment.
    pub fn with_deployment(mut self, deployment: impl Into<String>) -> Self {
        self.deployment = deployment.into();
        self
    }

    /// Sets the service root URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Sets whether responses are streamed.
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets whether traffic is logged to stderr.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// The timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Loads a configuration file on top of the defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            Error::config(
                format!("failed to read {}: {err}", path.display()),
                Some(Box::new(err)),
            )
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parses YAML configuration on top of the defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: ChatConfigFile = serde_yaml::from_str(yaml).map_err(|err| {
            Error::config(
                format!("invalid configuration: {err}"),
                Some(Box::new(err)),
            )
        })?;
        Ok(Self::new().merge_file(file))
    }

    /// Resolves the final configuration from defaults, the `--config` file, and flags.
    ///
    /// The merged result is validated, so a flag may repair a bad file setting.
    pub fn resolve(args: &ChatArgs) -> Result<Self> {
        let base = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::new(),
        };
        base.apply_args(args).validate()
    }

    /// Rejects settings that would make every request fail.
    pub fn validate(self) -> Result<Self> {
        if self.timeout_secs == 0 {
            return Err(Error::config("timeout must be at least one second", None));
        }
        Ok(self)
    }

    fn merge_file(mut self, file: ChatConfigFile) -> Self {
        if let Some(deployment) = file.deployment {
            self.deployment = deployment;
        }
        if let Some(endpoint) = file.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(system_prompt) = file.system_prompt {
            self.system_prompt = system_prompt;
        }
        if let Some(stream) = file.stream {
            self.stream = stream;
        }
        if let Some(color) = file.color {
            self.use_color = color;
        }
        if let Some(verbose) = file.verbose {
            self.verbose = verbose;
        }
        if let Some(timeout_secs) = file.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        self
    }

    fn apply_args(mut self, args: &ChatArgs) -> Self {
        if let Some(deployment) = &args.deployment {
            self.deployment = deployment.clone();
        }
        if let Some(endpoint) = &args.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(system) = &args.system {
            self.system_prompt = system.clone();
        }
        if let Some(timeout) = args.timeout {
            self.timeout_secs = timeout;
        }
        if args.no_stream {
            self.stream = false;
        }
        if args.no_color {
            self.use_color = false;
        }
        if args.verbose {
            self.verbose = true;
        }
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        ChatConfig::new().apply_args(&args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.deployment, "gpt-4o");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert!(config.stream);
        assert!(config.use_color);
        assert!(!config.verbose);
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::from(ChatArgs::default());
        assert_eq!(config, ChatConfig::new());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            deployment: Some("gpt-4o-mini".to_string()),
            system: Some("You are terse.".to_string()),
            timeout: Some(5),
            no_stream: true,
            no_color: true,
            verbose: true,
            ..ChatArgs::default()
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.deployment, "gpt-4o-mini");
        assert_eq!(config.system_prompt, "You are terse.");
        assert_eq!(config.timeout_secs, 5);
        assert!(!config.stream);
        assert!(!config.use_color);
        assert!(config.verbose);
    }

    #[test]
    fn yaml_overrides_defaults() {
        let yaml = concat!(
            "deployment: gpt-35-turbo\n",
            "endpoint: http://localhost:8080\n",
            "stream: false\n",
            "color: false\n",
        );
        let config = ChatConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.deployment, "gpt-35-turbo");
        assert_eq!(config.endpoint, "http://localhost:8080");
        assert!(!config.stream);
        assert!(!config.use_color);
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn empty_yaml_is_defaults() {
        assert_eq!(ChatConfig::from_yaml_str("{}").unwrap(), ChatConfig::new());
    }

    #[test]
    fn unknown_yaml_field_rejected() {
        let err = ChatConfig::from_yaml_str("model: gpt-4\n").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn flags_override_file() {
        let dir = std::env::temp_dir().join(format!("dialchat-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dialchat.yaml");
        std::fs::write(&path, "deployment: from-file\nsystem_prompt: file prompt\n").unwrap();

        let args = ChatArgs {
            config: Some(path.display().to_string()),
            deployment: Some("from-flag".to_string()),
            ..ChatArgs::default()
        };
        let config = ChatConfig::resolve(&args).unwrap();
        assert_eq!(config.deployment, "from-flag");
        assert_eq!(config.system_prompt, "file prompt");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_config_error() {
        let args = ChatArgs {
            config: Some("/nonexistent/dialchat.yaml".to_string()),
            ..ChatArgs::default()
        };
        assert!(matches!(
            ChatConfig::resolve(&args),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn zero_timeout_rejected() {
        let args = ChatArgs {
            timeout: Some(0),
            ..ChatArgs::default()
        };
        let err = ChatConfig::resolve(&args).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("timeout"));

        let from_file = ChatConfig::from_yaml_str("timeout_secs: 0\n").unwrap();
        assert!(matches!(from_file.validate(), Err(Error::Config { .. })));

        assert!(ChatConfig::new().with_timeout_secs(0).validate().is_err());
        assert!(ChatConfig::new().with_timeout_secs(1).validate().is_ok());
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_deployment("d")
            .with_endpoint("http://e")
            .with_system_prompt("p")
            .with_stream(false)
            .without_color()
            .with_verbose(true)
            .with_timeout_secs(7);
        assert_eq!(config.deployment, "d");
        assert_eq!(config.endpoint, "http://e");
        assert_eq!(config.system_prompt, "p");
        assert!(!config.stream);
        assert!(!config.use_color);
        assert!(config.verbose);
        assert_eq!(config.timeout(), Duration::from_secs(7));
    }
}
