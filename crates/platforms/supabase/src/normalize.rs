//! Normalizers for the backend platform.

use serde_json::Value;
use webhub_core::error::{HubError, HubResult};
use webhub_core::fields::{datetime_field, first_text};
use webhub_core::records::{AuthUser, TableInfo, TableRows};

/// Maps the SQL RPC's table listing.
///
/// Rows without a table name are dropped; the schema defaults to
/// `public`.
pub fn normalize_tables(body: &Value) -> HubResult<Vec<TableInfo>> {
    let rows = body
        .as_array()
        .ok_or_else(|| HubError::malformed("table listing is not an array"))?;
    Ok(rows
        .iter()
        .filter_map(|row| {
            let name = first_text(row, &["table_name"])?;
            Some(TableInfo {
                table_name: name.to_string(),
                table_schema: first_text(row, &["table_schema"])
                    .unwrap_or("public")
                    .to_string(),
            })
        })
        .collect())
}

/// Derives the table listing from the REST root's OpenAPI document.
///
/// Every exposed table appears as a path; the root itself and RPC paths
/// are not tables.
pub fn tables_from_rest_root(body: &Value) -> HubResult<Vec<TableInfo>> {
    let paths = body
        .get("paths")
        .and_then(Value::as_object)
        .ok_or_else(|| HubError::malformed("schema document has no paths"))?;
    Ok(paths
        .keys()
        .filter(|path| path.starts_with('/') && path.as_str() != "/" && !path.contains("rpc"))
        .map(|path| TableInfo {
            table_name: path.trim_start_matches('/').to_string(),
            table_schema: "public".to_string(),
        })
        .collect())
}

/// Packages a table-rows payload, deriving columns from the first row.
pub fn normalize_table_rows(body: &Value, table: &str, limit: u32) -> HubResult<TableRows> {
    let rows = body
        .as_array()
        .ok_or_else(|| HubError::malformed("table rows payload is not an array"))?;
    let columns = rows
        .first()
        .and_then(Value::as_object)
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default();
    Ok(TableRows {
        table: table.to_string(),
        columns,
        rows: rows.clone(),
        limit,
    })
}

/// Maps an auth-service user listing.
pub fn normalize_auth_users(body: &Value) -> HubResult<Vec<AuthUser>> {
    let rows = body
        .get("users")
        .and_then(Value::as_array)
        .or_else(|| body.as_array())
        .ok_or_else(|| HubError::malformed("auth listing has no users array"))?;
    Ok(rows
        .iter()
        .map(|row| AuthUser {
            id: first_text(row, &["id"]).unwrap_or_default().to_string(),
            email: first_text(row, &["email"]).map(str::to_string),
            created_at: datetime_field(row, "created_at"),
            last_sign_in_at: datetime_field(row, "last_sign_in_at"),
        })
        .collect())
}
