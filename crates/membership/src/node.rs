//! Node records decoded from the facts a remote unit publishes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::scalar::ScalarValue;

/// Wire key for a unit's hostname.
pub const HOSTNAME_KEY: &str = "hostname";

/// Wire key for a unit's private address.
pub const ADDRESS_KEY: &str = "private-address";

/// Wire key for the partition a unit belongs to.
pub const PARTITION_KEY: &str = "partition";

/// Wire key for a unit's default-partition flag.
pub const DEFAULT_KEY: &str = "default";

/// Keys fetched for every node record.
pub const NODE_KEYS: [&str; 4] = [HOSTNAME_KEY, ADDRESS_KEY, PARTITION_KEY, DEFAULT_KEY];

/// One published value: the wire text and its decoded scalar.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Text as received, empty if the unit did not publish the key.
    pub raw: String,

    /// Decoded scalar.
    pub value: ScalarValue,
}

impl Fact {
    /// Decode a wire value, keeping the raw text next to it.
    pub fn decode(raw: Option<&str>) -> Self {
        Self {
            raw: raw.unwrap_or_default().to_string(),
            value: ScalarValue::decode(raw),
        }
    }

    /// Textual form for string fields.
    ///
    /// Null is empty and a decoded string is used as is (quotes stripped). Any other
    /// scalar keeps the wire text, so `1.10` or `0x1F` are not reformatted.
    pub fn text(&self) -> String {
        match &self.value {
            ScalarValue::Null => String::new(),
            ScalarValue::String(s) => s.clone(),
            _ => self.raw.clone(),
        }
    }
}

/// Decoded facts of one remote unit, keyed by normalized name, in request order.
pub type FactMap = IndexMap<String, Fact>;

/// Normalize a wire key: hyphens become underscores.
pub fn normalize_key(key: &str) -> String {
    key.replace('-', "_")
}

/// Decode raw wire values into a [`FactMap`].
///
/// Every requested key appears in the result; missing values decode to null.
pub fn decode_facts<'a, I>(raw: I) -> FactMap
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    raw.into_iter()
        .map(|(key, value)| (normalize_key(key), Fact::decode(value)))
        .collect()
}

/// One member of the cluster as seen in a single aggregation pass.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Hostname of the unit. Empty if not published.
    pub hostname: String,

    /// Private address of the unit. Empty if not published.
    #[serde(rename = "private_address")]
    pub address: String,

    /// Partition the unit belongs to. Empty if not published.
    pub partition: String,

    /// Whether the unit marks its partition as the default one.
    #[serde(rename = "default")]
    pub is_default: bool,
}

impl NodeRecord {
    /// Build a record from decoded facts. Absent facts become empty values.
    pub fn from_facts(facts: &FactMap) -> Self {
        let text = |key: &str| {
            facts
                .get(&normalize_key(key))
                .map(Fact::text)
                .unwrap_or_default()
        };

        Self {
            hostname: text(HOSTNAME_KEY),
            address: text(ADDRESS_KEY),
            partition: text(PARTITION_KEY),
            is_default: facts
                .get(&normalize_key(DEFAULT_KEY))
                .is_some_and(|fact| fact.value.is_truthy()),
        }
    }

    /// Whether the record carries an address, which is what readiness is judged on.
    pub fn has_address(&self) -> bool {
        !self.address.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("private-address"), "private_address");
        assert_eq!(normalize_key("hostname"), "hostname");
        assert_eq!(normalize_key("a-b-c"), "a_b_c");
    }

    #[test]
    fn test_decode_facts() {
        let facts = decode_facts([
            ("hostname", Some("node1")),
            ("private-address", Some("10.0.0.1")),
            ("partition", None),
            ("default", Some("true")),
        ]);

        let keys: Vec<_> = facts.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["hostname", "private_address", "partition", "default"]);
        assert_eq!(facts["partition"].value, ScalarValue::Null);
        assert_eq!(facts["partition"].raw, "");
        assert_eq!(facts["default"].value, ScalarValue::Bool(true));
        assert_eq!(facts["default"].raw, "true");
    }

    #[test]
    fn test_record_from_complete_facts() {
        let facts = decode_facts([
            ("hostname", Some("node1")),
            ("private-address", Some("10.0.0.1")),
            ("partition", Some("batch")),
            ("default", Some("true")),
        ]);

        assert_eq!(
            NodeRecord::from_facts(&facts),
            NodeRecord {
                hostname: "node1".to_string(),
                address: "10.0.0.1".to_string(),
                partition: "batch".to_string(),
                is_default: true,
            }
        );
    }

    #[test]
    fn test_record_from_partial_facts() {
        let facts = decode_facts([("private-address", Some("10.0.0.2"))]);
        let record = NodeRecord::from_facts(&facts);

        assert!(record.has_address());
        assert_eq!(record.hostname, "");
        assert_eq!(record.partition, "");
        assert!(!record.is_default);

        let record = NodeRecord::from_facts(&FactMap::new());
        assert!(!record.has_address());
    }

    #[test]
    fn test_numeric_hostname_keeps_text() {
        let facts = decode_facts([("hostname", Some("1234")), ("default", Some("1"))]);
        let record = NodeRecord::from_facts(&facts);

        assert_eq!(record.hostname, "1234");
        assert!(record.is_default);
    }

    #[test]
    fn test_numeric_looking_text_is_not_reformatted() {
        for raw in ["1.10", "0x1F", "1e3", "18446744073709551615", "+5", ".5", "007"] {
            let facts = decode_facts([
                ("hostname", Some(raw)),
                ("private-address", Some(raw)),
                ("partition", Some(raw)),
            ]);
            let record = NodeRecord::from_facts(&facts);

            assert_eq!(record.hostname, raw);
            assert_eq!(record.address, raw);
            assert_eq!(record.partition, raw);
        }

        // Quoted strings still lose their quotes, booleans keep their spelling
        let facts = decode_facts([("hostname", Some("'node1'")), ("partition", Some("True"))]);
        let record = NodeRecord::from_facts(&facts);
        assert_eq!(record.hostname, "node1");
        assert_eq!(record.partition, "True");
    }

    #[test]
    fn test_default_accepts_yaml11_booleans() {
        for (raw, expected) in [
            ("no", false),
            ("No", false),
            ("off", false),
            ("OFF", false),
            ("yes", true),
            ("on", true),
            ("'no'", true),
        ] {
            let record = NodeRecord::from_facts(&decode_facts([("default", Some(raw))]));
            assert_eq!(record.is_default, expected, "default={raw}");
        }
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let record = NodeRecord {
            hostname: "node1".to_string(),
            address: "10.0.0.1".to_string(),
            partition: "batch".to_string(),
            is_default: false,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "hostname": "node1",
                "private_address": "10.0.0.1",
                "partition": "batch",
                "default": false,
            })
        );
    }
}
