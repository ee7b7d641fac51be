//! JMAP request construction
//!
//! A JMAP request is a list of method invocations processed in order within
//! a single HTTP round trip. An invocation may take an argument from the
//! result of an earlier one through a [`ResultReference`], which is how the
//! delta request hydrates the ids returned by `Mailbox/changes` without a
//! second round trip.
//!
//! ```rust
//! use mailsync_jmap::request::{RequestBuilder, ResultReference};
//! use serde_json::json;
//!
//! let mut builder = RequestBuilder::new();
//! let changes = builder.call("Mailbox/changes", json!({ "accountId": "a1", "sinceState": "s1" }));
//! builder.call(
//!     "Mailbox/get",
//!     json!({
//!         "accountId": "a1",
//!         "#ids": ResultReference::new(&changes, "Mailbox/changes", "/created"),
//!     }),
//! );
//! let request = builder.build();
//! assert_eq!(request.method_calls.len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Capability required by every JMAP request
pub const CORE_CAPABILITY: &str = "urn:ietf:params:jmap:core";

/// Capability required for `Mailbox/*` methods
pub const MAIL_CAPABILITY: &str = "urn:ietf:params:jmap:mail";

/// A method call: `[name, arguments, callId]` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation(pub String, pub Value, pub String);

impl Invocation {
    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn arguments(&self) -> &Value {
        &self.1
    }

    pub fn call_id(&self) -> &str {
        &self.2
    }
}

/// Pointer to a value inside the result of an earlier invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultReference {
    /// Call id of the invocation whose result is referenced
    pub result_of: String,
    /// Expected response name of that invocation
    pub name: String,
    /// JSON pointer into the response arguments
    pub path: String,
}

impl ResultReference {
    pub fn new(result_of: &str, name: &str, path: &str) -> Self {
        Self {
            result_of: result_of.to_string(),
            name: name.to_string(),
            path: path.to_string(),
        }
    }
}

/// Request envelope posted to the JMAP API URL
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JmapRequest {
    pub using: Vec<String>,
    pub method_calls: Vec<Invocation>,
}

/// Builder assigning sequential call ids to invocations
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    using: Vec<String>,
    method_calls: Vec<Invocation>,
}

impl RequestBuilder {
    /// Creates a builder declaring the core and mail capabilities
    pub fn new() -> Self {
        Self {
            using: vec![CORE_CAPABILITY.to_string(), MAIL_CAPABILITY.to_string()],
            method_calls: Vec::new(),
        }
    }

    /// Appends an invocation and returns its call id
    pub fn call(&mut self, name: &str, arguments: Value) -> String {
        let call_id = self.method_calls.len().to_string();
        self.method_calls
            .push(Invocation(name.to_string(), arguments, call_id.clone()));
        call_id
    }

    pub fn build(self) -> JmapRequest {
        JmapRequest {
            using: self.using,
            method_calls: self.method_calls,
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
