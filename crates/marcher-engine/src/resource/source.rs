use std::borrow::Cow;
use std::collections::HashMap;

/// Name → shader text lookup injected into the resource factory.
pub trait ShaderSourceProvider {
    /// Returns the source registered under `name`, if any.
    fn source(&self, name: &str) -> Option<Cow<'_, str>>;
}

impl<F> ShaderSourceProvider for F
where
    F: Fn(&str) -> Option<String>,
{
    fn source(&self, name: &str) -> Option<Cow<'_, str>> {
        self(name).map(Cow::Owned)
    }
}

/// In-memory shader source registry.
#[derive(Debug, Clone, Default)]
pub struct ShaderSources {
    entries: HashMap<String, Cow<'static, str>>,
}

impl ShaderSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `text` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<Cow<'static, str>>) {
        self.entries.insert(name.into(), text.into());
    }

    /// Builder-style `insert`.
    pub fn with(mut self, name: impl Into<String>, text: impl Into<Cow<'static, str>>) -> Self {
        self.insert(name, text);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ShaderSourceProvider for ShaderSources {
    fn source(&self, name: &str) -> Option<Cow<'_, str>> {
        self.entries.get(name).map(|text| Cow::Borrowed(text.as_ref()))
    }
}
