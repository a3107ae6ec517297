//! Entries accepted by the batch fetch operations.

use gleaner_core::{FetchKey, Params};

/// One entry of a batch fetch: a bare key, or a key with call params.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchRequest {
    Key(String),
    WithParams(String, Params),
}

impl FetchRequest {
    pub fn key(&self) -> &str {
        match self {
            Self::Key(key) | Self::WithParams(key, _) => key,
        }
    }

    pub fn into_parts(self) -> (String, Params) {
        match self {
            Self::Key(key) => (key, Params::new()),
            Self::WithParams(key, params) => (key, params),
        }
    }
}

impl From<&str> for FetchRequest {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for FetchRequest {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<&FetchKey> for FetchRequest {
    fn from(key: &FetchKey) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<(&str, Params)> for FetchRequest {
    fn from((key, params): (&str, Params)) -> Self {
        Self::WithParams(key.to_string(), params)
    }
}

impl From<(String, Params)> for FetchRequest {
    fn from((key, params): (String, Params)) -> Self {
        Self::WithParams(key, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_key_has_empty_params() {
        let (key, params) = FetchRequest::from("user").into_parts();
        assert_eq!(key, "user");
        assert!(params.is_empty());
    }

    #[test]
    fn pair_keeps_params() {
        let mut params = Params::new();
        params.insert("limit".into(), 5.into());
        let request = FetchRequest::from(("records", params.clone()));
        assert_eq!(request.key(), "records");
        assert_eq!(request.into_parts().1, params);
    }
}
