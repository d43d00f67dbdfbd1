//! Service and metadata documents describing the catalog.
//!
//! These are documentation only; the query engine never consults them.

use crate::catalog::Catalog;
use serde_json::json;
use std::fmt::Write;

pub const SCHEMA_NAMESPACE: &str = "OData.Demo";
pub const METADATA_PATH: &str = "/odata/$metadata";

/// Render the EDMX metadata document for every registered shape
pub fn metadata_document(catalog: &Catalog) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(
        "<edmx:Edmx Version=\"4.0\" xmlns:edmx=\"http://docs.oasis-open.org/odata/ns/edmx\">\n",
    );
    xml.push_str("  <edmx:DataServices>\n");
    let _ = writeln!(
        xml,
        "    <Schema Namespace=\"{}\" xmlns=\"http://docs.oasis-open.org/odata/ns/edm\">",
        SCHEMA_NAMESPACE
    );

    for shape in catalog.shapes() {
        let _ = writeln!(xml, "      <EntityType Name=\"{}\">", shape.type_name);
        let _ = writeln!(
            xml,
            "        <Key><PropertyRef Name=\"{}\"/></Key>",
            shape.key_field
        );
        for field in &shape.fields {
            let nullable = if field.nullable { "" } else { " Nullable=\"false\"" };
            let _ = writeln!(
                xml,
                "        <Property Name=\"{}\" Type=\"{}\"{}/>",
                field.field_name,
                field.field_type.edm_name(),
                nullable
            );
        }
        for relation in &shape.relations {
            let target_type = catalog
                .get(&relation.target_set)
                .map(|target| target.type_name.as_str())
                .unwrap_or(relation.target_set.as_str());
            let _ = writeln!(
                xml,
                "        <NavigationProperty Name=\"{}\" Type=\"{}.{}\"/>",
                relation.name, SCHEMA_NAMESPACE, target_type
            );
        }
        xml.push_str("      </EntityType>\n");
    }

    xml.push_str("      <EntityContainer Name=\"Container\">\n");
    for shape in catalog.shapes() {
        let _ = writeln!(
            xml,
            "        <EntitySet Name=\"{}\" EntityType=\"{}.{}\"/>",
            shape.entity_set, SCHEMA_NAMESPACE, shape.type_name
        );
    }
    xml.push_str("      </EntityContainer>\n");
    xml.push_str("    </Schema>\n");
    xml.push_str("  </edmx:DataServices>\n");
    xml.push_str("</edmx:Edmx>\n");
    xml
}

/// Service document listing the entity sets
pub fn service_document(catalog: &Catalog) -> serde_json::Value {
    let sets: Vec<serde_json::Value> = catalog
        .shapes()
        .map(|shape| json!({"name": shape.entity_set, "url": shape.entity_set}))
        .collect();

    json!({
        "@odata.context": METADATA_PATH,
        "value": sets,
    })
}

/// `@odata.context` URL for a collection response
pub fn collection_context(entity_set: &str) -> String {
    format!("{}#{}", METADATA_PATH, entity_set)
}

/// `@odata.context` URL for a single created entity
pub fn entity_context(entity_set: &str) -> String {
    format!("{}#{}/$entity", METADATA_PATH, entity_set)
}
