//! Model routes.

use serde::{Deserialize, Serialize};

/// Ordered provider ids: the preferred provider first, then fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRoute {
    pub preferred: String,
    #[serde(default)]
    pub fallbacks: Vec<String>,
}

impl ModelRoute {
    pub fn new(preferred: impl Into<String>) -> Self {
        Self {
            preferred: preferred.into(),
            fallbacks: Vec::new(),
        }
    }

    pub fn with_fallbacks<I, S>(mut self, fallbacks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallbacks = fallbacks.into_iter().map(Into::into).collect();
        self
    }

    /// Attempt order with duplicates and blank ids removed.
    pub fn providers(&self) -> Vec<&str> {
        let mut ordered: Vec<&str> = Vec::with_capacity(self.fallbacks.len() + 1);
        for id in std::iter::once(&self.preferred).chain(self.fallbacks.iter()) {
            let id = id.trim();
            if !id.is_empty() && !ordered.contains(&id) {
                ordered.push(id);
            }
        }
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_providers_order() {
        let route = ModelRoute::new("p1").with_fallbacks(["p2", "p3"]);
        assert_eq!(route.providers(), vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn test_providers_dedup() {
        let route = ModelRoute::new("p1").with_fallbacks(["p2", "p1", "p2"]);
        assert_eq!(route.providers(), vec!["p1", "p2"]);
    }

    #[test]
    fn test_empty_route() {
        let route = ModelRoute::new("").with_fallbacks(Vec::<String>::new());
        assert!(route.providers().is_empty());
    }
}
