//! A single query or mutation operation.

use crate::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// One operation: query text, bound variables and header overrides.
///
/// The query text is opaque and never validated here. Variables are created lazily:
/// [`Request::variables`] is `None` until the first variable is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    query: String,
    variables: Option<Map<String, Value>>,
    /// Variables whose value has no JSON form, with the reason. Encoding fails while
    /// any remain.
    rejected: Vec<(String, String)>,
    headers: Vec<(String, String)>,
}

impl Request {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: None,
            rejected: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// Start a builder that applies variables and headers in the order supplied.
    pub fn builder(query: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            request: Self::new(query),
        }
    }

    /// Set a variable, overwriting any previous value for `key`.
    ///
    /// A value with no JSON representation (NaN, infinities, maps with non-string
    /// keys) is not stored; the request then fails to encode with
    /// [`Error::Encoding`] until `key` is set again to a representable value.
    pub fn set_variable<T>(&mut self, key: impl Into<String>, value: T)
    where
        T: Serialize,
    {
        let key = key.into();
        let vars = self.variables.get_or_insert_with(Map::new);
        self.rejected.retain(|(k, _)| *k != key);
        match crate::variable::to_value(&value) {
            Ok(v) => {
                vars.insert(key, v);
            }
            Err(e) => {
                vars.remove(&key);
                self.rejected.push((key, e.to_string()));
            }
        }
    }

    /// Set a variable, reporting an unrepresentable value immediately.
    ///
    /// On failure the request is left untouched.
    pub fn try_set_variable<T>(&mut self, key: impl Into<String>, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let value = crate::variable::to_value(value).map_err(Error::Encoding)?;
        self.set_variable(key, value);
        Ok(())
    }

    /// Set a header, replacing every existing value with the same name.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&key));
        self.headers.push((key, value.into()));
    }

    /// Append a header value, keeping any existing values with the same name.
    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.push((key.into(), value.into()));
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn variables(&self) -> Option<&Map<String, Value>> {
        self.variables.as_ref()
    }

    /// Header overrides in the order they will be sent.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First variable that could not be represented, with the reason.
    pub(crate) fn rejected_variable(&self) -> Option<(&str, &str)> {
        self.rejected
            .first()
            .map(|(k, reason)| (k.as_str(), reason.as_str()))
    }

    pub(crate) fn from_parts(query: String, variables: Option<Map<String, Value>>) -> Self {
        Self {
            query,
            variables,
            rejected: Vec::new(),
            headers: Vec::new(),
        }
    }
}

/// Builder for [`Request`].
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    pub fn variable<T>(mut self, key: impl Into<String>, value: T) -> Self
    where
        T: Serialize,
    {
        self.request.set_variable(key, value);
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.set_header(key, value);
        self
    }

    pub fn build(self) -> Request {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn new_request_has_no_variables() {
        let req = Request::new("query { test }");
        assert_eq!(req.query(), "query { test }");
        assert!(req.variables().is_none());
        assert!(req.headers().is_empty());
    }

    #[test]
    fn any_query_text_is_accepted() {
        assert_eq!(Request::new("").query(), "");
        assert_eq!(Request::new("{{{ not graphql").query(), "{{{ not graphql");
    }

    #[test]
    fn set_variable_is_last_write_wins() {
        let mut req = Request::new("query { test }");
        req.set_variable("foo", 123);
        req.set_variable("bar", true);
        req.set_variable("foo", "replaced");

        let vars = req.variables().unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars["foo"], json!("replaced"));
        assert_eq!(vars["bar"], json!(true));
    }

    #[test]
    fn try_set_variable_accepts_structs() {
        #[derive(Serialize)]
        struct Filter {
            name: &'static str,
            limit: u32,
        }

        let mut req = Request::new("query($f: Filter) { items(f: $f) { id } }");
        req.try_set_variable("f", &Filter { name: "x", limit: 5 })
            .unwrap();
        assert_eq!(req.variables().unwrap()["f"], json!({"name": "x", "limit": 5}));
    }

    #[test]
    fn try_set_variable_rejects_unrepresentable_values() {
        let mut bad = BTreeMap::new();
        bad.insert(vec![1u8], "non-string key");

        let mut req = Request::new("query { test }");
        let err = req.try_set_variable("bad", &bad).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
        assert!(err.to_string().starts_with("encode body: "));
        assert!(req.variables().is_none());
    }

    #[test]
    fn non_finite_float_is_held_back_from_variables() {
        let mut req = Request::new("q");
        req.set_variable("x", f64::NAN);

        assert!(req.variables().unwrap().get("x").is_none());
        assert_eq!(req.rejected_variable(), Some(("x", "unsupported value: NaN")));

        req.set_variable("x", 1.5);
        assert_eq!(req.variables().unwrap()["x"], json!(1.5));
        assert!(req.rejected_variable().is_none());
    }

    #[test]
    fn try_set_variable_rejects_infinity() {
        let mut req = Request::new("q");
        let err = req.try_set_variable("x", &f64::INFINITY).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
        assert_eq!(err.to_string(), "encode body: unsupported value: +Inf");
        assert!(req.variables().is_none());
        assert!(req.rejected_variable().is_none());
    }

    #[test]
    fn set_header_replaces_and_add_header_appends() {
        let mut req = Request::new("");
        req.add_header("X-Trace", "a");
        req.add_header("X-Trace", "b");
        req.set_header("x-trace", "c");
        req.add_header("X-Other", "1");

        assert_eq!(
            req.headers(),
            &[
                ("x-trace".to_string(), "c".to_string()),
                ("X-Other".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn builder_applies_options_in_order() {
        let req = Request::builder("mutation { ping }")
            .variable("a", 1)
            .variable("a", 2)
            .header("X-Test", "header-value")
            .build();

        assert_eq!(req.query(), "mutation { ping }");
        assert_eq!(req.variables().unwrap()["a"], json!(2));
        assert_eq!(
            req.headers(),
            &[("X-Test".to_string(), "header-value".to_string())]
        );
    }
}
