//! Converter configuration.

use utoipa::openapi::server::{Server, ServerBuilder};

use crate::convert::Converter;
use crate::url::KNOWN_HOSTS;

/// Tag of requests that are not inside any folder.
pub const DEFAULT_TAG: &str = "default";

/// Title used when the collection has no name.
pub const DEFAULT_TITLE: &str = "Megaport API";

/// Settings of a [`Converter`].
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    pub(crate) default_title: String,
    pub(crate) version: String,
    pub(crate) contact_email: Option<String>,
    pub(crate) servers: Vec<Server>,
    pub(crate) known_hosts: Vec<String>,
    pub(crate) default_tag: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_TITLE.to_string(),
            version: "1.0.0".to_string(),
            contact_email: Some("techpubs@megaport.com".to_string()),
            servers: vec![
                server("https://api.megaport.com", "Production Environment"),
                server("https://api-staging.megaport.com", "Staging Environment"),
            ],
            known_hosts: KNOWN_HOSTS.map(String::from).to_vec(),
            default_tag: DEFAULT_TAG.to_string(),
        }
    }
}

fn server(url: &str, description: &str) -> Server {
    ServerBuilder::new()
        .url(url)
        .description(Some(description))
        .build()
}

/// Builder for [`Converter`].
///
/// # Example
///
/// ```rust
/// use postspec_core::Converter;
///
/// let converter = Converter::builder()
///     .with_version("2.0.0")
///     .without_servers()
///     .with_server("http://localhost:8080", "Local")
///     .with_known_host("http://localhost:8080")
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConverterBuilder {
    config: ConverterConfig,
}

impl ConverterBuilder {
    /// Sets the title used when the collection has no name.
    #[must_use]
    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.config.default_title = title.into();
        self
    }

    /// Sets the document version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    /// Sets the contact email, `None` to omit the contact.
    #[must_use]
    pub fn with_contact_email(mut self, email: Option<String>) -> Self {
        self.config.contact_email = email;
        self
    }

    /// Removes every configured server, including the default ones.
    #[must_use]
    pub fn without_servers(mut self) -> Self {
        self.config.servers.clear();
        self
    }

    /// Adds a server.
    #[must_use]
    pub fn with_server(mut self, url: &str, description: &str) -> Self {
        self.config.servers.push(server(url, description));
        self
    }

    /// Adds a host stripped from URL strings.
    #[must_use]
    pub fn with_known_host(mut self, host: impl Into<String>) -> Self {
        self.config.known_hosts.push(host.into());
        self
    }

    /// Sets the tag of requests outside any folder.
    #[must_use]
    pub fn with_default_tag(mut self, tag: impl Into<String>) -> Self {
        self.config.default_tag = tag.into();
        self
    }

    /// Builds the converter.
    pub fn build(self) -> Converter {
        Converter::new(self.config)
    }
}
