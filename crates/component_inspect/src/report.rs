//! Layout reports for the inspector.

use std::fmt::Write as _;

use component_schema::{ComponentId, DefaultValue};
use component_world::{Host, World};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize)]
pub struct FieldReport {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub accessor: String,
    pub storage: String,
    pub words: u32,
    pub offset: u32,
    pub column_bytes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
}

#[derive(Debug, Serialize)]
pub struct ComponentReport {
    pub id: u32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<u32>,
    pub fields: Vec<FieldReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Create a store for every target and describe its layout. A component
/// that fails to compile or bind gets a report carrying the error.
pub fn inspect<H: Host + 'static>(world: &mut World<H>, targets: &[ComponentId]) -> Vec<ComponentReport> {
    targets
        .iter()
        .map(|&id| {
            let name = world.host().component_name(id).unwrap_or_default();
            let mut report = ComponentReport {
                id: id.0,
                name,
                capacity: None,
                total_bytes: None,
                fields: Vec::new(),
                error: None,
            };

            let handle = match world.create_store(id) {
                Ok(handle) => handle,
                Err(e) => {
                    warn!(component = %report.name, error = %e, "component rejected");
                    report.error = Some(e.to_string());
                    return report;
                }
            };
            let (Ok(store), Ok(view_type)) = (world.store(handle), world.view_type(handle)) else {
                report.error = Some(format!("store for {id} vanished"));
                return report;
            };

            let layout = store.layout();
            report.capacity = Some(layout.capacity);
            report.total_bytes = Some(layout.total_bytes);
            report.fields = store
                .schema()
                .fields
                .iter()
                .zip(view_type.accessors())
                .enumerate()
                .map(|(i, (field, accessor))| FieldReport {
                    name: field.name.clone(),
                    type_name: field.type_name.clone(),
                    accessor: accessor.kind.to_string(),
                    storage: field.storage.to_string(),
                    words: field.storage_words,
                    offset: layout.field_offsets[i],
                    column_bytes: field.byte_width() * layout.capacity,
                    default: field.default.clone(),
                })
                .collect();
            report
        })
        .collect()
}

/// Plain-text table of the reports.
pub fn render(reports: &[ComponentReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let _ = writeln!(out, "component {} (id {})", report.name, report.id);
        if let Some(error) = &report.error {
            let _ = writeln!(out, "  error: {error}");
            continue;
        }
        let _ = writeln!(
            out,
            "  capacity {}, {} bytes",
            report.capacity.unwrap_or(0),
            report.total_bytes.unwrap_or(0)
        );
        for field in &report.fields {
            let _ = writeln!(
                out,
                "  {:>8}  {:<16} {:<6} {}x{} ({} bytes)",
                field.offset, field.name, field.type_name, field.storage, field.words, field.column_bytes
            );
        }
    }
    out
}
