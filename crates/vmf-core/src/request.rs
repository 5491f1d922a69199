//! Creation request model
//!
//! Raw requests are parsed in a fixed order: the provider tag is resolved
//! first, then `name`, then `params` against that provider's shape. Nothing is
//! partially constructed: a request either parses completely or yields the
//! first error.

use crate::error::{RequestError, ValidationError};
use crate::params::ProviderParams;
use crate::provider::Provider;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Actor recorded when a request does not name one
pub const DEFAULT_ACTOR: &str = "system";

const TOP_LEVEL_FIELDS: [&str; 4] = ["provider", "name", "params", "requested_by"];

/// Typed, provider-discriminated creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationRequest {
    /// Target provider
    pub provider: Provider,
    /// Display name, non-empty
    pub name: String,
    /// Parameters; shape must match `provider`
    pub params: ProviderParams,
    /// Actor for the audit trail; `None` defers to the caller's default
    pub requested_by: Option<String>,
}

impl CreationRequest {
    /// Create request; provider is taken from the params shape
    #[must_use]
    pub fn new(name: impl Into<String>, params: ProviderParams) -> Self {
        Self {
            provider: params.provider(),
            name: name.into(),
            params,
            requested_by: None,
        }
    }

    /// With explicit actor
    #[inline]
    #[must_use]
    pub fn requested_by(mut self, actor: impl Into<String>) -> Self {
        self.requested_by = Some(actor.into());
        self
    }

    /// Named actor, or `default_actor` when the request names none
    #[inline]
    #[must_use]
    pub fn actor_or<'a>(&'a self, default_actor: &'a str) -> &'a str {
        self.requested_by.as_deref().unwrap_or(default_actor)
    }

    /// With explicit provider tag (may disagree with the params shape)
    #[inline]
    #[must_use]
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    /// Parse raw JSON, attributing anonymous requests to [`DEFAULT_ACTOR`]
    ///
    /// # Errors
    /// See [`Self::parse_with_actor`].
    pub fn parse(raw: &Value) -> Result<Self, RequestError> {
        Self::parse_with_actor(raw, DEFAULT_ACTOR)
    }

    /// Parse raw JSON text
    ///
    /// # Errors
    /// `ValidationError` on malformed JSON, otherwise as [`Self::parse`].
    pub fn parse_str(raw: &str) -> Result<Self, RequestError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ValidationError::new("", format!("malformed JSON at line {}", e.line())))?;
        Self::parse(&value)
    }

    /// Parse raw JSON, attributing anonymous requests to `default_actor`
    ///
    /// # Errors
    /// - `RequestError::UnsupportedProvider` if the provider tag is unknown
    /// - `RequestError::Validation` for any missing, mistyped or unknown field
    pub fn parse_with_actor(raw: &Value, default_actor: &str) -> Result<Self, RequestError> {
        let map = raw
            .as_object()
            .ok_or_else(|| ValidationError::new("", "expected an object"))?;

        let tag = required_str(map, "provider")?;
        let provider: Provider = tag.parse()?;

        let name = required_str(map, "name")?;
        if name.trim().is_empty() {
            return Err(ValidationError::new("name", "must not be empty").into());
        }

        let raw_params = map.get("params").ok_or_else(|| ValidationError::missing("params"))?;
        let params =
            ProviderParams::parse(provider, raw_params).map_err(|e| e.nested_in("params"))?;

        let requested_by = match map.get("requested_by") {
            None | Some(Value::Null) => Some(default_actor.to_string()),
            Some(Value::String(actor)) => Some(actor.clone()),
            Some(_) => return Err(ValidationError::wrong_type("requested_by", "a string").into()),
        };

        if let Some(extra) = map.keys().find(|k| !TOP_LEVEL_FIELDS.contains(&k.as_str())) {
            return Err(ValidationError::unknown(extra.clone()).into());
        }

        Ok(Self {
            provider,
            name: name.to_string(),
            params,
            requested_by,
        })
    }

    /// Best-effort actor of a raw request that may not parse
    #[must_use]
    pub fn actor_of(raw: &Value, default_actor: &str) -> String {
        raw.get("requested_by")
            .and_then(Value::as_str)
            .unwrap_or(default_actor)
            .to_string()
    }

    /// Check invariants of a typed request
    ///
    /// # Errors
    /// `ValidationError` if the name is empty, the params shape does not
    /// belong to `provider`, or a param value breaks its constraint.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", "must not be empty"));
        }
        if self.params.provider() != self.provider {
            return Err(ValidationError::new(
                "params",
                format!("shape does not match provider `{}`", self.provider),
            ));
        }
        self.params.validate().map_err(|e| e.nested_in("params"))
    }
}

fn required_str<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a str, ValidationError> {
    map.get(key)
        .ok_or_else(|| ValidationError::missing(key))?
        .as_str()
        .ok_or_else(|| ValidationError::wrong_type(key, "a string"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{AwsParams, GcpParams};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn aws_request() -> Value {
        json!({
            "provider": "aws",
            "name": "mi-vm-aws",
            "params": {
                "instance_type": "t2.micro",
                "region": "us-east-1",
                "vpc": "vpc-123",
                "ami": "ami-abc"
            },
            "requested_by": "alumno"
        })
    }

    #[test]
    fn parse_aws_request() {
        let req = CreationRequest::parse(&aws_request()).unwrap();
        assert_eq!(
            req,
            CreationRequest {
                provider: Provider::Aws,
                name: "mi-vm-aws".into(),
                params: ProviderParams::Aws(AwsParams {
                    instance_type: "t2.micro".into(),
                    region: "us-east-1".into(),
                    vpc: "vpc-123".into(),
                    ami: "ami-abc".into(),
                }),
                requested_by: Some("alumno".into()),
            }
        );
    }

    #[test]
    fn missing_actor_defaults() {
        let mut raw = aws_request();
        raw.as_object_mut().unwrap().remove("requested_by");
        let req = CreationRequest::parse_with_actor(&raw, "ops").unwrap();
        assert_eq!(req.requested_by.as_deref(), Some("ops"));
    }

    #[test]
    fn typed_request_defers_actor_to_caller() {
        let req = CreationRequest::new("vm", ProviderParams::Gcp(GcpParams {
            machine_type: "e2-micro".into(),
            zone: "us-central1-a".into(),
            base_disk: "debian-12".into(),
            project: "demo".into(),
        }));
        assert_eq!(req.requested_by, None);
        assert_eq!(req.actor_or("ops"), "ops");
        assert_eq!(req.requested_by("alumno").actor_or("ops"), "alumno");
    }

    #[test]
    fn gcp_tag_with_aws_shape_fails_on_params() {
        let mut raw = aws_request();
        raw["provider"] = json!("gcp");
        let err = CreationRequest::parse(&raw).unwrap_err();
        assert_eq!(
            err,
            RequestError::Validation(ValidationError::missing("params.machine_type"))
        );
    }

    #[test]
    fn unknown_provider_tag() {
        let mut raw = aws_request();
        raw["provider"] = json!("ibm");
        let err = CreationRequest::parse(&raw).unwrap_err();
        assert_eq!(err, RequestError::UnsupportedProvider("ibm".into()));
    }

    #[test]
    fn empty_name_rejected() {
        let mut raw = aws_request();
        raw["name"] = json!("");
        let err = CreationRequest::parse(&raw).unwrap_err();
        assert_eq!(
            err,
            RequestError::Validation(ValidationError::new("name", "must not be empty"))
        );
    }

    #[test]
    fn unknown_top_level_field_rejected() {
        let mut raw = aws_request();
        raw["password"] = json!("hunter2");
        let err = CreationRequest::parse(&raw).unwrap_err();
        assert_eq!(err, RequestError::Validation(ValidationError::unknown("password")));
    }

    #[test]
    fn missing_params_rejected() {
        let mut raw = aws_request();
        raw.as_object_mut().unwrap().remove("params");
        let err = CreationRequest::parse(&raw).unwrap_err();
        assert_eq!(err, RequestError::Validation(ValidationError::missing("params")));
    }

    #[test]
    fn params_not_object_reports_params_field() {
        let mut raw = aws_request();
        raw["params"] = json!("t2.micro");
        let err = CreationRequest::parse(&raw).unwrap_err();
        assert_eq!(
            err,
            RequestError::Validation(ValidationError::new("params", "expected an object"))
        );
    }

    #[test]
    fn malformed_json_text() {
        let err = CreationRequest::parse_str("{\"provider\": ").unwrap_err();
        assert!(matches!(err, RequestError::Validation(_)));
    }

    #[test]
    fn actor_of_unparseable_request() {
        let raw = json!({"requested_by": "alumno", "provider": 3});
        assert_eq!(CreationRequest::actor_of(&raw, "system"), "alumno");
        assert_eq!(CreationRequest::actor_of(&json!(null), "system"), "system");
    }

    #[test]
    fn typed_validate_detects_mismatch() {
        let req = CreationRequest::new(
            "vm",
            ProviderParams::Gcp(GcpParams {
                machine_type: "e2-micro".into(),
                zone: "us-central1-a".into(),
                base_disk: "debian-12".into(),
                project: "demo".into(),
            }),
        )
        .with_provider(Provider::Aws);
        let err = req.validate().unwrap_err();
        assert_eq!(err.field, "params");
    }
}
