//! IZI Supabase - the hosted backend behind the IZI forwarding client.
//!
//! This crate implements the `izi-core` traits over Supabase: PostgREST for
//! table reads and inserts, GoTrue for session refresh, plus the webhook
//! used for loyalty signups.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use izi_core::ConvoyFeed;
//! use izi_supabase::{ConvoyRepository, SupabaseAuth, SupabaseClient, SupabaseConfig};
//!
//! let config = SupabaseConfig::from_env()?;
//! let client = Arc::new(SupabaseClient::new(&config)?);
//! let auth = Arc::new(SupabaseAuth::new(&config)?);
//! auth.set_session(session_from_sign_in);
//!
//! let feed = ConvoyFeed::new(Arc::new(ConvoyRepository::new(client)), auth);
//! feed.refetch().await;
//! ```

mod auth;
mod client;
mod config;
mod error;
mod query;
mod repositories;
mod webhook;

pub use auth::SupabaseAuth;
pub use client::SupabaseClient;
pub use config::{
    SupabaseConfig, ENV_REQUEST_TIMEOUT_MS, ENV_SIGNUP_WEBHOOK_URL, ENV_SUPABASE_ANON_KEY,
    ENV_SUPABASE_URL,
};
pub use error::{Result, SupabaseError};
pub use query::{Direction, Query};
pub use repositories::{ContactRepository, ConvoyRepository, LoyaltyRepository};
pub use webhook::SignupWebhook;
