//! The logical remote a client talks to.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::descriptor::InterfaceDescriptor;
use crate::template::RequestTemplate;

/// Identity of a remote endpoint: declared interface, symbolic name, base URL.
///
/// Equality and hashing consider only the interface name, the symbolic name and
/// the URL, so two independently built clients for the same remote compare equal.
#[derive(Clone)]
pub struct Target {
    interface: Arc<InterfaceDescriptor>,
    name: String,
    url: String,
}

impl Target {
    /// A target with an explicit name and URL.
    #[must_use]
    pub fn new(
        interface: impl Into<Arc<InterfaceDescriptor>>,
        name: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            interface: interface.into(),
            name: name.into(),
            url: url.into(),
        }
    }

    /// A target named after the client, with a normalised URL.
    ///
    /// A missing or empty `url` becomes `http://{name}`; a URL without a scheme gets
    /// `http://`. A non-empty `path` is appended with exactly one leading `/` and no
    /// trailing `/`.
    #[must_use]
    pub fn for_client(
        interface: impl Into<Arc<InterfaceDescriptor>>,
        name: impl Into<String>,
        url: Option<&str>,
        path: &str,
    ) -> Self {
        let name = name.into();
        let mut base = match url.map(str::trim) {
            Some(u) if !u.is_empty() => u.to_owned(),
            _ => name.clone(),
        };
        if !base.contains("://") {
            base.insert_str(0, "http://");
        }
        let path = path.trim().trim_end_matches('/');
        if !path.is_empty() {
            let base_trimmed = base.trim_end_matches('/').len();
            base.truncate(base_trimmed);
            if !path.starts_with('/') {
                base.push('/');
            }
            base.push_str(path);
        }
        Self::new(interface, name, base)
    }

    /// The declared interface.
    #[must_use]
    pub fn interface(&self) -> &Arc<InterfaceDescriptor> {
        &self.interface
    }

    /// Simple name of the declared interface.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.interface.name()
    }

    /// Symbolic name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Point a relative template at this target's base URL.
    pub fn apply(&self, template: &mut RequestTemplate) {
        if !template.url().starts_with("http") {
            template.set_target(&self.url);
        }
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.type_name() == other.type_name() && self.name == other.name && self.url == other.url
    }
}

impl Eq for Target {}

impl Hash for Target {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_name().hash(state);
        self.name.hash(state);
        self.url.hash(state);
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Target(type={}, name={}, url={})",
            self.type_name(),
            self.name,
            self.url
        )
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("type", &self.type_name())
            .field("name", &self.name)
            .field("url", &self.url)
            .finish()
    }
}
