//! # WebHub Supabase Platform
//!
//! Adapter and normalizers for the backend platform.
//!
//! ## Features
//!
//! - Table discovery via the SQL RPC, with an OpenAPI-root fallback for
//!   projects that never installed the RPC function
//! - Row browsing with a caller-set limit
//! - Auth-service user listing (service-role key required)
//!
//! ## Example
//!
//! ```rust,ignore
//! use webhub_platform_supabase::{normalize_tables, SupabaseAdapter};
//!
//! let adapter = SupabaseAdapter::new(http_client);
//! let response = adapter.list_tables(&credential, &project_url).await?;
//! let tables = normalize_tables(&response.body)?;
//! println!("{} tables", tables.len());
//! ```

mod client;
mod normalize;

pub use client::{SupabaseAdapter, DEFAULT_ROW_LIMIT};
pub use normalize::{
    normalize_auth_users, normalize_table_rows, normalize_tables, tables_from_rest_root,
};
