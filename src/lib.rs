//! Lead Desk API Library
//!
//! This library provides the core functionality for the Lead Desk service:
//! lead CRUD over a hosted table store, listing cache invalidation,
//! user notifications, placeholder lead scoring and the headless dashboard
//! state that drives them.
//!
//! # Modules
//!
//! - `cache`: Keyed listing cache with invalidation.
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `leads`: Create/update/delete/score operations and their side effects.
//! - `models`: Core data models.
//! - `notify`: Notification sinks.
//! - `scoring`: Scoring strategies and score bands.
//! - `store`: Lead store gateway and its backends.
//! - `validation`: Input validation.
//! - `views`: Dashboard list, form and dialog state.

pub mod cache;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod leads;
pub mod models;
pub mod notify;
pub mod scoring;
pub mod store;
pub mod validation;
pub mod views;
