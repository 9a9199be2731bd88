//! Resource schema tables
//!
//! Declares, per entity, which fields the host supplies, which are computed and
//! the default of every optional field. The host applies these defaults to a
//! desired-state document before handing it to a reconciler.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::model::ci::defaults;

/// Value type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Int,
    Bool,
    IntList,
    /// Optional nested record (0 or 1 per entity)
    Block,
}

/// Who provides a field's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Required,
    Optional,
    /// Set by the remote service, never by the host
    Computed,
}

/// One field of a resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    pub description: &'static str,
}

impl FieldSchema {
    fn new(
        name: &'static str,
        kind: FieldKind,
        presence: Presence,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind,
            presence,
            default: None,
            description,
        }
    }

    fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Field table of a managed resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: Vec<FieldSchema>,
}

impl ResourceSchema {
    /// Schema of `idefix_ci`.
    pub fn ci() -> Self {
        use FieldKind::*;
        use Presence::*;

        Self {
            name: "idefix_ci",
            description: "Manages CI.",
            fields: vec![
                FieldSchema::new("id", String, Computed, "The ID of this resource."),
                FieldSchema::new("name", String, Required, "The name of this CI."),
                FieldSchema::new("type_id", Int, Optional, "The type of the CI.")
                    .with_default(json!(defaults::TYPE_ID)),
                FieldSchema::new(
                    "company_id",
                    Int,
                    Required,
                    "The company ID associated to the CI.",
                ),
                FieldSchema::new(
                    "project_ids",
                    IntList,
                    Required,
                    "The projects associated to the CI.",
                ),
                FieldSchema::new(
                    "outsourcing_name",
                    String,
                    Optional,
                    "The Outsourcing level name.",
                )
                .with_default(json!(defaults::OUTSOURCING_NAME)),
                FieldSchema::new("service_level_id", Int, Optional, "The Level of the service.")
                    .with_default(json!(defaults::SERVICE_LEVEL_ID)),
                FieldSchema::new("team", String, Optional, "The team in charge.")
                    .with_default(json!(defaults::TEAM)),
                FieldSchema::new("is_owner_lbn", Bool, Optional, "The owner of the CI.")
                    .with_default(json!(defaults::IS_OWNER_LBN)),
                FieldSchema::new("comment", String, Optional, "Comment.").with_default(json!("")),
                FieldSchema::new("service_at", Block, Optional, "Services AT."),
                FieldSchema::new("key_dates", Block, Optional, "Use And Key Date."),
                FieldSchema::new("service_cloud", Block, Optional, "Service Cloud."),
            ],
        }
    }

    /// Schema of `idefix_project`.
    pub fn project() -> Self {
        use FieldKind::*;
        use Presence::*;

        let mut fields = vec![
            FieldSchema::new("id", String, Computed, "The id of the project."),
            FieldSchema::new(
                "name",
                String,
                Required,
                "The name of project (must be unique).",
            ),
            FieldSchema::new(
                "company_id",
                Int,
                Required,
                "The company ID associated to the project.",
            ),
            FieldSchema::new("parent_id", Int, Optional, "The ID of the parent project."),
        ];
        fields.extend(
            [
                "wbs_france",
                "wbs_vietnam",
                "wbs_singapour",
                "wbs_maurice",
                "wbs_luxembourg",
                "wbs_hong_kong",
                "wbs_chine",
                "wbs_canada",
                "wbs_belgique",
            ]
            .into_iter()
            .map(|name| FieldSchema::new(name, String, Optional, "The WBS of this project")),
        );
        fields.push(FieldSchema::new(
            "contract_number",
            String,
            Required,
            "Contract number",
        ));

        Self {
            name: "idefix_project",
            description: "Manages project.",
            fields,
        }
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Fill every unset (missing or null) optional field that declares a default.
    pub fn apply_defaults(&self, document: &mut Map<String, Value>) {
        for field in &self.fields {
            if field.presence != Presence::Optional {
                continue;
            }
            let Some(default) = &field.default else {
                continue;
            };
            let unset = document.get(field.name).is_none_or(Value::is_null);
            if unset {
                document.insert(field.name.to_string(), default.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CiSpec;

    #[test]
    fn test_ci_defaults_table() {
        let schema = ResourceSchema::ci();
        assert_eq!(schema.field("type_id").unwrap().default, Some(json!(41)));
        assert_eq!(
            schema.field("outsourcing_name").unwrap().default,
            Some(json!("0 - Non-défini"))
        );
        assert_eq!(
            schema.field("service_level_id").unwrap().default,
            Some(json!(100000080))
        );
        assert_eq!(schema.field("team").unwrap().default, Some(json!("Unix")));
        assert_eq!(
            schema.field("is_owner_lbn").unwrap().default,
            Some(json!(true))
        );
        assert_eq!(schema.field("id").unwrap().presence, Presence::Computed);
    }

    #[test]
    fn test_apply_defaults_fills_missing_and_null() {
        let schema = ResourceSchema::ci();
        let mut document = json!({
            "name": "web-01",
            "company_id": 1,
            "project_ids": [3],
            "team": null,
            "type_id": 12
        })
        .as_object()
        .cloned()
        .unwrap();

        schema.apply_defaults(&mut document);

        assert_eq!(document["team"], json!("Unix"));
        assert_eq!(document["type_id"], json!(12));
        assert_eq!(document["service_level_id"], json!(100000080));
        assert!(!document.contains_key("service_cloud"));

        let spec: CiSpec = serde_json::from_value(Value::Object(document)).unwrap();
        assert_eq!(spec.core.team, "Unix");
        assert_eq!(spec.core.type_id, 12);
    }

    #[test]
    fn test_project_schema_lists_regional_wbs_codes() {
        let schema = ResourceSchema::project();
        let wbs = schema
            .fields
            .iter()
            .filter(|field| field.name.starts_with("wbs_"))
            .count();
        assert_eq!(wbs, 9);
        assert_eq!(
            schema.field("contract_number").unwrap().presence,
            Presence::Required
        );
    }
}
