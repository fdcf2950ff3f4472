use serde_json::Value;

/// Serialize a JSON value into its canonical byte form (RFC 8785, JCS).
///
/// Compact output with object keys sorted at every depth. Numbers follow the
/// ECMAScript rules, so `1` and `1.0` canonicalize to the same bytes.
pub fn canonical_json(value: &Value) -> Result<Vec<u8>, serde_json::Error> {
    serde_jcs::to_vec(value)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn canonical_str(value: &Value) -> String {
        String::from_utf8(canonical_json(value).unwrap()).unwrap()
    }

    #[test]
    fn sorts_keys_at_every_depth() {
        let value: Value = serde_json::from_str(r#"{"b":1,"a":{"z":true,"y":null}}"#).unwrap();
        assert_eq!(canonical_str(&value), r#"{"a":{"y":null,"z":true},"b":1}"#);
    }

    #[test]
    fn compact_arrays_and_scalars() {
        assert_eq!(canonical_str(&json!([1, "two", false, null, 2.5])), r#"[1,"two",false,null,2.5]"#);
        assert_eq!(canonical_str(&json!(-7)), "-7");
    }

    #[test]
    fn integral_floats_match_integers() {
        let int: Value = serde_json::from_str(r#"{"n":1}"#).unwrap();
        let float: Value = serde_json::from_str(r#"{"n":1.0}"#).unwrap();
        assert_eq!(canonical_json(&int).unwrap(), canonical_json(&float).unwrap());
        assert_eq!(canonical_str(&float), r#"{"n":1}"#);
    }

    #[test]
    fn escapes_strings_like_serde_json() {
        let s = "quote\" slash\\ nl\n tab\t bell\u{07} snow\u{2603}";
        assert_eq!(canonical_str(&json!(s)), serde_json::to_string(s).unwrap());
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-z\\\\\"\n ]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-d]{1,3}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn canonical_form_parses_back(value in arb_json()) {
            let parsed: Value = serde_json::from_slice(&canonical_json(&value).unwrap()).unwrap();
            prop_assert_eq!(parsed, value);
        }

        #[test]
        fn canonical_form_is_injective(a in arb_json(), b in arb_json()) {
            prop_assert_eq!(canonical_json(&a).unwrap() == canonical_json(&b).unwrap(), a == b);
        }
    }
}
