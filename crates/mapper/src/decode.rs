//! Decoder: stored Typed Value map -> structured value
//!
//! Decoding starts from `T::default()` and writes every stored field that
//! the plan maps. Fields the plan maps but the document lacks keep their
//! default. The partially built instance is dropped on the first error, so
//! callers never observe a half-decoded value.

use docmap_core::{Error, MapValue, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::shape::{plan, Document, ShapePlan};

/// What to do with a stored field the target shape does not map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Skip silently
    Ignore,
    /// Skip and log a warning
    #[default]
    Warn,
    /// Fail with `UnknownField`
    Reject,
}

/// Decoder options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Policy for stored fields the shape does not map
    pub unknown_fields: UnknownFieldPolicy,
}

impl DecodeOptions {
    /// Options with the given unknown-field policy
    pub fn with_unknown_fields(policy: UnknownFieldPolicy) -> Self {
        DecodeOptions {
            unknown_fields: policy,
        }
    }
}

/// Decode a document map into a structured value with default options
///
/// # Errors
///
/// - `UnsupportedShape` if the shape cannot be planned
/// - `TypeMismatch` naming the dotted path of the first field that does not
///   convert
pub fn decode<T: Document>(map: &MapValue) -> Result<T> {
    decode_with(map, &DecodeOptions::default())
}

/// Decode a document map into a structured value
pub fn decode_with<T: Document>(map: &MapValue, options: &DecodeOptions) -> Result<T> {
    let plan = plan::<T>()?;
    decode_with_plan(map, &plan, options)
}

/// Decode with an already-built plan
pub fn decode_with_plan<T: Default>(
    map: &MapValue,
    plan: &ShapePlan<T>,
    options: &DecodeOptions,
) -> Result<T> {
    let mut instance = T::default();
    for (name, value) in map {
        let Some(field) = plan.field(name) else {
            match options.unknown_fields {
                UnknownFieldPolicy::Ignore => {}
                UnknownFieldPolicy::Warn => {
                    warn!(shape = plan.shape_name(), field = %name, "No mapped field for stored value, ignoring");
                }
                UnknownFieldPolicy::Reject => {
                    return Err(Error::UnknownField {
                        shape: plan.shape_name().to_string(),
                        field: name.clone(),
                    });
                }
            }
            continue;
        };
        field
            .write(&mut instance, value.clone(), options)
            .map_err(|e| e.within(name))?;
    }
    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapeBuilder;
    use docmap_core::Value;

    #[derive(Debug, Default, PartialEq)]
    struct Address {
        city: String,
        zip: Option<String>,
    }

    impl Document for Address {
        fn describe(shape: &mut ShapeBuilder<Self>) {
            shape
                .field("city", |a| &a.city, |a| &mut a.city)
                .field("zip", |a| &a.zip, |a| &mut a.zip);
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Customer {
        name: String,
        number: f64,
        address: Address,
        previous: Option<Address>,
        scores: Vec<i64>,
    }

    impl Document for Customer {
        fn describe(shape: &mut ShapeBuilder<Self>) {
            shape
                .field("name", |c| &c.name, |c| &mut c.name)
                .field("number", |c| &c.number, |c| &mut c.number)
                .nested("address", |c| &c.address, |c| &mut c.address)
                .nested_opt("previous", |c| c.previous.as_ref(), |c, v| c.previous = v)
                .field("scores", |c| &c.scores, |c| &mut c.scores);
        }
    }

    fn stored() -> MapValue {
        MapValue::new()
            .with("name", "Ada")
            .with("number", 2i64)
            .with("address", MapValue::new().with("city", "Oslo"))
            .with("previous", Value::Null)
            .with("scores", vec![Value::Int(1), Value::Int(2)])
    }

    #[test]
    fn test_decode_with_coercion_and_defaults() {
        let customer: Customer = decode(&stored()).unwrap();
        assert_eq!(
            customer,
            Customer {
                name: "Ada".to_string(),
                number: 2.0,
                address: Address {
                    city: "Oslo".to_string(),
                    zip: None,
                },
                previous: None,
                scores: vec![1, 2],
            }
        );
    }

    #[test]
    fn test_missing_fields_keep_defaults() {
        let customer: Customer = decode(&MapValue::new().with("name", "Ada")).unwrap();
        assert_eq!(customer.number, 0.0);
        assert_eq!(customer.address, Address::default());
    }

    #[test]
    fn test_nested_mismatch_names_full_path() {
        let map = stored().with("address", MapValue::new().with("city", 5i64));
        match decode::<Customer>(&map).unwrap_err() {
            Error::TypeMismatch {
                path,
                expected,
                found,
            } => {
                assert_eq!(path, "address.city");
                assert_eq!(expected, "String");
                assert_eq!(found, "Int");
            }
            other => panic!("Wrong error variant: {:?}", other),
        }
    }

    #[test]
    fn test_list_mismatch_names_index() {
        let map = stored().with("scores", vec![Value::Int(1), Value::from("x")]);
        match decode::<Customer>(&map).unwrap_err() {
            Error::TypeMismatch { path, .. } => assert_eq!(path, "scores[1]"),
            other => panic!("Wrong error variant: {:?}", other),
        }
    }

    #[test]
    fn test_non_map_for_nested_shape() {
        let map = stored().with("address", "Oslo");
        match decode::<Customer>(&map).unwrap_err() {
            Error::TypeMismatch { path, found, .. } => {
                assert_eq!(path, "address");
                assert_eq!(found, "String");
            }
            other => panic!("Wrong error variant: {:?}", other),
        }
    }

    #[test]
    fn test_null_into_required_field() {
        let map = stored().with("number", Value::Null);
        assert!(decode::<Customer>(&map).unwrap_err().is_type_mismatch());
    }

    #[test]
    fn test_unknown_field_policies() {
        let map = stored().with("nickname", "ace");

        assert!(decode_with::<Customer>(&map, &DecodeOptions::default()).is_ok());
        assert!(decode_with::<Customer>(
            &map,
            &DecodeOptions::with_unknown_fields(UnknownFieldPolicy::Ignore)
        )
        .is_ok());

        let err = decode_with::<Customer>(
            &map,
            &DecodeOptions::with_unknown_fields(UnknownFieldPolicy::Reject),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownField { ref field, .. } if field == "nickname"));
    }

    #[test]
    fn test_reject_applies_inside_nested_shapes() {
        let map = stored().with(
            "address",
            MapValue::new().with("city", "Oslo").with("street", "Main"),
        );
        let err = decode_with::<Customer>(
            &map,
            &DecodeOptions::with_unknown_fields(UnknownFieldPolicy::Reject),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownField { ref field, .. } if field == "address.street"));
    }

    #[test]
    fn test_policy_serde_names() {
        #[derive(Deserialize)]
        struct Holder {
            policy: UnknownFieldPolicy,
        }
        let parsed: Holder = serde_json::from_str(r#"{"policy": "reject"}"#).unwrap();
        assert_eq!(parsed.policy, UnknownFieldPolicy::Reject);
    }
}
