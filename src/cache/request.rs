//! Fetch Request Module
//!
//! Describes what a fetch looks up: logical key, optional parameters and TTL.

use std::time::Duration;

use serde::Serialize;

use crate::cache::key::{derive_key, NoParams};
use crate::error::Result;

// == Fetch Request ==
/// Arguments of a single `fetch` call other than the callback.
///
/// ```ignore
/// let request = FetchRequest::new("user").params(&user_id).ttl_secs(60);
/// ```
#[derive(Debug)]
pub struct FetchRequest<'a, P: ?Sized = NoParams> {
    key: &'a str,
    params: Option<&'a P>,
    ttl: Option<Duration>,
}

impl<P: ?Sized> Clone for FetchRequest<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: ?Sized> Copy for FetchRequest<'_, P> {}

impl<'a> FetchRequest<'a, NoParams> {
    /// Creates a request for `key` with no parameters and the default TTL.
    pub fn new(key: &'a str) -> Self {
        Self {
            key,
            params: None,
            ttl: None,
        }
    }
}

impl<'a, P: ?Sized> FetchRequest<'a, P> {
    /// Attaches parameters that become part of the derived key.
    pub fn params<Q>(self, params: &'a Q) -> FetchRequest<'a, Q>
    where
        Q: Serialize + ?Sized,
    {
        FetchRequest {
            key: self.key,
            params: Some(params),
            ttl: self.ttl,
        }
    }

    /// Sets the TTL in whole seconds.
    pub fn ttl_secs(self, secs: u64) -> Self {
        self.ttl(Duration::from_secs(secs))
    }

    /// Sets the TTL.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// The logical key.
    pub fn key(&self) -> &'a str {
        self.key
    }

    /// The explicit TTL, if one was set.
    pub fn ttl_override(&self) -> Option<Duration> {
        self.ttl
    }
}

impl<P> FetchRequest<'_, P>
where
    P: Serialize + ?Sized,
{
    /// Derives the composite key this request is stored under.
    pub fn derived_key(&self) -> Result<String> {
        derive_key(self.key, self.params)
    }
}

impl<'a> From<&'a str> for FetchRequest<'a, NoParams> {
    fn from(key: &'a str) -> Self {
        Self::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_defaults() {
        let request = FetchRequest::new("a");
        assert_eq!(request.key(), "a");
        assert!(request.ttl_override().is_none());
    }

    #[test]
    fn test_request_builder() {
        let params = json!({"x": 1});
        let request = FetchRequest::new("a").ttl_secs(60).params(&params);

        assert_eq!(request.ttl_override(), Some(Duration::from_secs(60)));
        assert_ne!(
            request.derived_key().unwrap(),
            FetchRequest::new("a").derived_key().unwrap()
        );
    }

    #[test]
    fn test_request_from_str() {
        let request: FetchRequest<'_> = "a".into();
        assert_eq!(
            request.derived_key().unwrap(),
            derive_key::<NoParams>("a", None).unwrap()
        );
    }
}
