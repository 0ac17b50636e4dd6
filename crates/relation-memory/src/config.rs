use std::collections::BTreeMap;

use serde::Deserialize;

/// Unit definition in the relation file
#[derive(Debug, Deserialize)]
pub struct ConfigUnit {
    pub name: String,
    #[serde(default)]
    pub facts: BTreeMap<String, String>,
}

/// Relation instance definition in the relation file
#[derive(Debug, Deserialize)]
pub struct ConfigRelation {
    pub relation_id: String,
    #[serde(default)]
    pub units: Vec<ConfigUnit>,
}

/// Relation file
#[derive(Debug, Deserialize)]
pub struct Config {
    pub relations: Vec<ConfigRelation>,
}
