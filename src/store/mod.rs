// Store module - Supabase (PostgREST) access

pub mod client;
#[cfg(test)]
pub mod memory;
pub mod query;

pub use client::{PostgrestTransport, QueryBuilder, StoreResponse, StoreTransport, SupabaseClient};
pub use query::{Filter, Operation, Order, Query, Row};
