//! Provider-specific parameter shapes
//!
//! [`ProviderParams`] is a sum type with one variant per [`Provider`]. Raw JSON
//! is parsed by dispatching on the provider tag first, then reading the exact
//! field set of that provider's shape: missing, mistyped and unknown fields are
//! all rejected.

use crate::error::ValidationError;
use crate::provider::Provider;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// AWS EC2-style parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwsParams {
    /// Instance type (e.g. `t2.micro`)
    pub instance_type: String,
    /// Region (e.g. `us-east-1`)
    pub region: String,
    /// VPC identifier
    pub vpc: String,
    /// Machine image identifier
    pub ami: String,
}

/// Azure parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AzureParams {
    /// VM size (e.g. `Standard_B1s`)
    pub size: String,
    /// Resource group
    pub resource_group: String,
    /// Image reference
    pub image: String,
    /// Virtual network
    pub vnet: String,
}

/// GCP parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GcpParams {
    /// Machine type (e.g. `e2-micro`)
    pub machine_type: String,
    /// Zone (e.g. `us-central1-a`)
    pub zone: String,
    /// Boot disk image
    pub base_disk: String,
    /// Project id
    pub project: String,
}

/// On-premise hypervisor parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OnPremiseParams {
    /// Virtual CPUs
    pub cpu: u32,
    /// Memory in GB
    pub ram_gb: u32,
    /// Disk in GB
    pub disk_gb: u32,
    /// Network interface
    pub nic: String,
}

/// Provider-discriminated parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderParams {
    /// AWS shape
    Aws(AwsParams),
    /// Azure shape
    Azure(AzureParams),
    /// GCP shape
    Gcp(GcpParams),
    /// On-premise shape
    OnPremise(OnPremiseParams),
}

impl ProviderParams {
    /// Parse raw JSON against the shape of `provider`
    ///
    /// # Errors
    /// `ValidationError` naming the first offending field (relative to the
    /// params object).
    pub fn parse(provider: Provider, raw: &Value) -> Result<Self, ValidationError> {
        let mut reader = FieldReader::new(raw)?;
        let params = match provider {
            Provider::Aws => Self::Aws(AwsParams {
                instance_type: reader.required_str("instance_type")?,
                region: reader.required_str("region")?,
                vpc: reader.required_str("vpc")?,
                ami: reader.required_str("ami")?,
            }),
            Provider::Azure => Self::Azure(AzureParams {
                size: reader.required_str("size")?,
                resource_group: reader.required_str("resource_group")?,
                image: reader.required_str("image")?,
                vnet: reader.required_str("vnet")?,
            }),
            Provider::Gcp => Self::Gcp(GcpParams {
                machine_type: reader.required_str("machine_type")?,
                zone: reader.required_str("zone")?,
                base_disk: reader.required_str("base_disk")?,
                project: reader.required_str("project")?,
            }),
            Provider::OnPremise => Self::OnPremise(OnPremiseParams {
                cpu: reader.required_positive_int("cpu")?,
                ram_gb: reader.required_positive_int("ram_gb")?,
                disk_gb: reader.required_positive_int("disk_gb")?,
                nic: reader.required_str("nic")?,
            }),
        };
        reader.finish()?;
        Ok(params)
    }

    /// Provider this shape belongs to
    #[must_use]
    pub fn provider(&self) -> Provider {
        match self {
            Self::Aws(_) => Provider::Aws,
            Self::Azure(_) => Provider::Azure,
            Self::Gcp(_) => Provider::Gcp,
            Self::OnPremise(_) => Provider::OnPremise,
        }
    }

    /// Field names of this shape, without values
    #[must_use]
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            Self::Aws(_) => &["instance_type", "region", "vpc", "ami"],
            Self::Azure(_) => &["size", "resource_group", "image", "vnet"],
            Self::Gcp(_) => &["machine_type", "zone", "base_disk", "project"],
            Self::OnPremise(_) => &["cpu", "ram_gb", "disk_gb", "nic"],
        }
    }

    /// Check value constraints on an already-typed shape
    ///
    /// Typed values can be built directly in Rust, bypassing [`Self::parse`];
    /// this applies the same non-empty / positive rules.
    ///
    /// # Errors
    /// `ValidationError` naming the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Aws(p) => {
                non_empty("instance_type", &p.instance_type)?;
                non_empty("region", &p.region)?;
                non_empty("vpc", &p.vpc)?;
                non_empty("ami", &p.ami)
            }
            Self::Azure(p) => {
                non_empty("size", &p.size)?;
                non_empty("resource_group", &p.resource_group)?;
                non_empty("image", &p.image)?;
                non_empty("vnet", &p.vnet)
            }
            Self::Gcp(p) => {
                non_empty("machine_type", &p.machine_type)?;
                non_empty("zone", &p.zone)?;
                non_empty("base_disk", &p.base_disk)?;
                non_empty("project", &p.project)
            }
            Self::OnPremise(p) => {
                positive("cpu", p.cpu)?;
                positive("ram_gb", p.ram_gb)?;
                positive("disk_gb", p.disk_gb)?;
                non_empty("nic", &p.nic)
            }
        }
    }

    /// Overlay a partial object of this shape's own fields
    ///
    /// Absent fields keep their current value. The merged shape is re-read
    /// through [`Self::parse`], so value types and constraints are checked
    /// exactly as on creation.
    ///
    /// # Errors
    /// `ValidationError` if `patch` is not an object, names a field outside
    /// this shape, or the merged shape breaks a constraint.
    pub fn merge_patch(&self, patch: &Value) -> Result<Self, ValidationError> {
        let patch = patch
            .as_object()
            .ok_or_else(|| ValidationError::new("", "expected an object"))?;
        let fields = self.field_names();
        if let Some(extra) = patch.keys().find(|k| !fields.iter().any(|f| *f == k.as_str())) {
            return Err(ValidationError::unknown(extra.clone()));
        }

        let mut merged = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => return Err(ValidationError::new("", "stored shape is not an object")),
        };
        for (key, value) in patch {
            merged.insert(key.clone(), value.clone());
        }
        Self::parse(self.provider(), &Value::Object(merged))
    }
}

fn non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

fn positive(field: &str, value: u32) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::new(field, "must be greater than zero"));
    }
    Ok(())
}

/// Reads an exact field set out of a JSON object
struct FieldReader<'a> {
    map: &'a Map<String, Value>,
    consumed: Vec<&'static str>,
}

impl<'a> FieldReader<'a> {
    fn new(raw: &'a Value) -> Result<Self, ValidationError> {
        let map = raw
            .as_object()
            .ok_or_else(|| ValidationError::new("", "expected an object"))?;
        Ok(Self {
            map,
            consumed: Vec::with_capacity(map.len()),
        })
    }

    fn take(&mut self, key: &'static str) -> Result<&'a Value, ValidationError> {
        self.consumed.push(key);
        self.map.get(key).ok_or_else(|| ValidationError::missing(key))
    }

    fn required_str(&mut self, key: &'static str) -> Result<String, ValidationError> {
        let value = self
            .take(key)?
            .as_str()
            .ok_or_else(|| ValidationError::wrong_type(key, "a string"))?;
        non_empty(key, value)?;
        Ok(value.to_string())
    }

    fn required_positive_int(&mut self, key: &'static str) -> Result<u32, ValidationError> {
        let value = self
            .take(key)?
            .as_u64()
            .ok_or_else(|| ValidationError::wrong_type(key, "a positive integer"))?;
        let value =
            u32::try_from(value).map_err(|_| ValidationError::new(key, "value is too large"))?;
        positive(key, value)?;
        Ok(value)
    }

    /// Reject any field the shape did not read
    fn finish(self) -> Result<(), ValidationError> {
        let unread = self
            .map
            .keys()
            .find(|k| !self.consumed.iter().any(|c| *c == k.as_str()));
        match unread {
            Some(extra) => Err(ValidationError::unknown(extra.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_patch_overlays_single_field() {
        let params = ProviderParams::parse(Provider::Aws, &aws_raw()).unwrap();
        let merged = params.merge_patch(&json!({"instance_type": "t3.large"})).unwrap();
        assert_eq!(
            merged,
            ProviderParams::Aws(AwsParams {
                instance_type: "t3.large".into(),
                region: "us-east-1".into(),
                vpc: "vpc-123".into(),
                ami: "ami-abc".into(),
            })
        );
    }

    #[test]
    fn merge_patch_rejects_foreign_and_bad_values() {
        let params = ProviderParams::parse(Provider::Aws, &aws_raw()).unwrap();
        assert_eq!(
            params.merge_patch(&json!({"zone": "us-central1-a"})).unwrap_err(),
            ValidationError::unknown("zone")
        );
        assert_eq!(
            params.merge_patch(&json!({"region": ""})).unwrap_err().field,
            "region"
        );
        assert_eq!(
            params.merge_patch(&json!({"vpc": 7})).unwrap_err(),
            ValidationError::wrong_type("vpc", "a string")
        );
        assert_eq!(params.merge_patch(&json!({})).unwrap(), params);
    }

    #[test]
    fn merge_patch_on_integer_fields() {
        let raw = json!({"cpu": 2, "ram_gb": 4, "disk_gb": 50, "nic": "eth0"});
        let params = ProviderParams::parse(Provider::OnPremise, &raw).unwrap();
        let merged = params.merge_patch(&json!({"ram_gb": 16})).unwrap();
        assert!(matches!(merged, ProviderParams::OnPremise(ref p) if p.ram_gb == 16 && p.cpu == 2));
        assert_eq!(
            params.merge_patch(&json!({"cpu": 0})).unwrap_err().field,
            "cpu"
        );
    }

    fn aws_raw() -> Value {
        json!({
            "instance_type": "t2.micro",
            "region": "us-east-1",
            "vpc": "vpc-123",
            "ami": "ami-abc"
        })
    }

    #[test]
    fn parse_aws_shape() {
        let params = ProviderParams::parse(Provider::Aws, &aws_raw()).unwrap();
        assert_eq!(params.provider(), Provider::Aws);
        match params {
            ProviderParams::Aws(p) => assert_eq!(p.instance_type, "t2.micro"),
            other => panic!("expected aws params, got {other:?}"),
        }
    }

    #[test]
    fn parse_onpremise_shape() {
        let raw = json!({"cpu": 4, "ram_gb": 16, "disk_gb": 200, "nic": "eth0"});
        let params = ProviderParams::parse(Provider::OnPremise, &raw).unwrap();
        assert_eq!(
            params,
            ProviderParams::OnPremise(OnPremiseParams {
                cpu: 4,
                ram_gb: 16,
                disk_gb: 200,
                nic: "eth0".into(),
            })
        );
    }

    #[test]
    fn aws_shape_rejected_for_gcp() {
        let err = ProviderParams::parse(Provider::Gcp, &aws_raw()).unwrap_err();
        assert_eq!(err.field, "machine_type");
        assert_eq!(err.reason, "field is required");
    }

    #[test]
    fn unknown_field_rejected() {
        let mut raw = aws_raw();
        raw["size"] = json!("Standard_B1s");
        let err = ProviderParams::parse(Provider::Aws, &raw).unwrap_err();
        assert_eq!(err, ValidationError::unknown("size"));
    }

    #[test]
    fn mistyped_field_rejected() {
        let raw = json!({"cpu": "four", "ram_gb": 16, "disk_gb": 200, "nic": "eth0"});
        let err = ProviderParams::parse(Provider::OnPremise, &raw).unwrap_err();
        assert_eq!(err.field, "cpu");
        assert_eq!(err.reason, "expected a positive integer");
    }

    #[test]
    fn zero_and_negative_ints_rejected() {
        let raw = json!({"cpu": 0, "ram_gb": 16, "disk_gb": 200, "nic": "eth0"});
        let err = ProviderParams::parse(Provider::OnPremise, &raw).unwrap_err();
        assert_eq!(err.reason, "must be greater than zero");

        let raw = json!({"cpu": 2, "ram_gb": -1, "disk_gb": 200, "nic": "eth0"});
        let err = ProviderParams::parse(Provider::OnPremise, &raw).unwrap_err();
        assert_eq!(err.field, "ram_gb");
    }

    #[test]
    fn empty_string_rejected() {
        let mut raw = aws_raw();
        raw["vpc"] = json!("  ");
        let err = ProviderParams::parse(Provider::Aws, &raw).unwrap_err();
        assert_eq!(err.field, "vpc");
    }

    #[test]
    fn non_object_rejected() {
        let err = ProviderParams::parse(Provider::Azure, &json!(["size"])).unwrap_err();
        assert_eq!(err.reason, "expected an object");
    }

    #[test]
    fn reasons_do_not_echo_values() {
        let mut raw = aws_raw();
        raw["ami"] = json!(42);
        let err = ProviderParams::parse(Provider::Aws, &raw).unwrap_err();
        assert!(!err.to_string().contains("42"));
    }

    #[test]
    fn typed_validate_matches_parse_rules() {
        let params = ProviderParams::OnPremise(OnPremiseParams {
            cpu: 0,
            ram_gb: 1,
            disk_gb: 1,
            nic: "eth0".into(),
        });
        assert_eq!(params.validate().unwrap_err().field, "cpu");
    }

    #[test]
    fn serializes_as_plain_object() {
        let params = ProviderParams::parse(Provider::Aws, &aws_raw()).unwrap();
        assert_eq!(serde_json::to_value(&params).unwrap(), aws_raw());
    }
}
