use semver::Version;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error;
use url::Url;

use crate::xml::NamespaceScope;

/// Errors raised when building a descriptor for a custom extension.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("Extension prefix must not be empty")]
    EmptyPrefix,

    #[error("Extension prefix '{0}' is not a valid XML name prefix")]
    InvalidPrefix(String),

    #[error("Extension name must not be empty")]
    EmptyName,

    #[error("Extension namespace '{0}' is not an absolute URI")]
    InvalidNamespace(String),

    #[error("Extension documentation '{0}' is not an absolute URI")]
    InvalidDocumentation(String),
}

/// How a descriptor is matched against the namespaces in scope at a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamespaceMatching {
    /// Match when the namespace URI is bound to any prefix, or when the
    /// extension's prefix is bound to anything.
    #[default]
    UriOrPrefix,
    /// Match only when the namespace URI is bound to some prefix.
    Uri,
}

/// Immutable identity of an extension: prefix, namespace and documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionDescriptor {
    prefix: Cow<'static, str>,
    namespace: Cow<'static, str>,
    version: Version,
    name: Cow<'static, str>,
    description: Option<Cow<'static, str>>,
    documentation: Option<Cow<'static, str>>,
}

impl ExtensionDescriptor {
    /// Builds a descriptor from static parts without validation.
    ///
    /// Intended for `static` descriptor tables whose values are fixed at
    /// compile time; use [`ExtensionDescriptor::new`] for anything else.
    pub const fn from_static(
        prefix: &'static str,
        namespace: &'static str,
        version: Version,
        name: &'static str,
        description: Option<&'static str>,
        documentation: Option<&'static str>,
    ) -> Self {
        Self {
            prefix: Cow::Borrowed(prefix),
            namespace: Cow::Borrowed(namespace),
            version,
            name: Cow::Borrowed(name),
            description: match description {
                Some(d) => Some(Cow::Borrowed(d)),
                None => None,
            },
            documentation: match documentation {
                Some(d) => Some(Cow::Borrowed(d)),
                None => None,
            },
        }
    }

    /// Builds a validated descriptor.
    ///
    /// The prefix must be a non-empty name without `:` or whitespace, the
    /// namespace an absolute URI, and the name non-empty.
    pub fn new(
        prefix: impl Into<String>,
        namespace: impl Into<String>,
        version: Version,
        name: impl Into<String>,
    ) -> Result<Self, DescriptorError> {
        let prefix = prefix.into();
        let namespace = namespace.into();
        let name = name.into();

        if prefix.is_empty() {
            return Err(DescriptorError::EmptyPrefix);
        }
        if prefix.contains(':') || prefix.chars().any(char::is_whitespace) {
            return Err(DescriptorError::InvalidPrefix(prefix));
        }
        if Url::parse(&namespace).is_err() {
            return Err(DescriptorError::InvalidNamespace(namespace));
        }
        if name.trim().is_empty() {
            return Err(DescriptorError::EmptyName);
        }

        Ok(Self {
            prefix: Cow::Owned(prefix),
            namespace: Cow::Owned(namespace),
            version,
            name: Cow::Owned(name),
            description: None,
            documentation: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Cow::Owned(description.into()));
        self
    }

    pub fn with_documentation(
        mut self,
        documentation: impl Into<String>,
    ) -> Result<Self, DescriptorError> {
        let documentation = documentation.into();
        if Url::parse(&documentation).is_err() {
            return Err(DescriptorError::InvalidDocumentation(documentation));
        }
        self.documentation = Some(Cow::Owned(documentation));
        Ok(self)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn documentation(&self) -> Option<&str> {
        self.documentation.as_deref()
    }

    /// Documentation link parsed as a URL, if present and well-formed.
    pub fn documentation_url(&self) -> Option<Url> {
        self.documentation.as_deref().and_then(|d| Url::parse(d).ok())
    }

    /// True if this descriptor's namespace (or prefix, per `matching`) is in `scope`.
    pub fn matches_scope(&self, scope: &NamespaceScope, matching: NamespaceMatching) -> bool {
        if scope.contains_namespace(self.namespace()) {
            return true;
        }
        match matching {
            NamespaceMatching::UriOrPrefix => scope.contains_prefix(self.prefix()),
            NamespaceMatching::Uri => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DC: &str = "http://purl.org/dc/elements/1.1/";

    static STATIC: ExtensionDescriptor = ExtensionDescriptor::from_static(
        "dc",
        DC,
        Version::new(1, 1, 0),
        "Dublin Core",
        Some("Metadata element set"),
        None,
    );

    #[test]
    fn test_static_descriptor() {
        assert_eq!(STATIC.prefix(), "dc");
        assert_eq!(STATIC.namespace(), DC);
        assert_eq!(STATIC.version(), &Version::new(1, 1, 0));
        assert_eq!(STATIC.description(), Some("Metadata element set"));
        assert!(STATIC.documentation().is_none());
    }

    #[test]
    fn test_new_validates_prefix() {
        let v = Version::new(1, 0, 0);
        assert_eq!(
            ExtensionDescriptor::new("", DC, v.clone(), "x"),
            Err(DescriptorError::EmptyPrefix)
        );
        assert!(matches!(
            ExtensionDescriptor::new("a:b", DC, v.clone(), "x"),
            Err(DescriptorError::InvalidPrefix(_))
        ));
        assert!(matches!(
            ExtensionDescriptor::new("a b", DC, v, "x"),
            Err(DescriptorError::InvalidPrefix(_))
        ));
    }

    #[test]
    fn test_new_requires_absolute_namespace() {
        let result = ExtensionDescriptor::new("geo", "not a uri", Version::new(1, 0, 0), "Geo");
        assert!(matches!(result, Err(DescriptorError::InvalidNamespace(_))));

        let urn = ExtensionDescriptor::new("geo", "urn:example:geo", Version::new(1, 0, 0), "Geo");
        assert!(urn.is_ok());
    }

    #[test]
    fn test_new_requires_name() {
        let result = ExtensionDescriptor::new("geo", DC, Version::new(1, 0, 0), "  ");
        assert_eq!(result, Err(DescriptorError::EmptyName));
    }

    #[test]
    fn test_documentation_must_be_absolute() {
        let d = ExtensionDescriptor::new("geo", DC, Version::new(1, 0, 0), "Geo").unwrap();
        assert!(d.clone().with_documentation("/relative").is_err());
        let d = d.with_documentation("https://example.com/geo").unwrap();
        assert_eq!(
            d.documentation_url().map(|u| u.to_string()),
            Some("https://example.com/geo".to_string())
        );
    }

    #[test]
    fn test_matches_scope_by_uri() {
        let scope: NamespaceScope = [("dublin", DC)].into_iter().collect();
        assert!(STATIC.matches_scope(&scope, NamespaceMatching::UriOrPrefix));
        assert!(STATIC.matches_scope(&scope, NamespaceMatching::Uri));
    }

    #[test]
    fn test_prefix_only_match_depends_on_mode() {
        let scope: NamespaceScope = [("dc", "http://example.com/unrelated")].into_iter().collect();
        assert!(STATIC.matches_scope(&scope, NamespaceMatching::UriOrPrefix));
        assert!(!STATIC.matches_scope(&scope, NamespaceMatching::Uri));
    }

    #[test]
    fn test_no_match() {
        let scope: NamespaceScope = [("atom", "http://www.w3.org/2005/Atom")].into_iter().collect();
        assert!(!STATIC.matches_scope(&scope, NamespaceMatching::UriOrPrefix));
    }
}
