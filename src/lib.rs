//! Credit Quote API Library
//!
//! A toy credit-scoring service: applicants are scored from synthetic
//! financial attributes, persisted once per SSN, and quoted 4/8/12-week
//! installment plans priced from their score.
//!
//! # Modules
//!
//! - `api`: API-layer namespace (handlers, router).
//! - `core`: Domain namespace (scoring, pricing, quotes).
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `db_storage`: PostgreSQL applicant store.
//! - `errors`: Error handling types.
//! - `extract`: Extractors with JSON rejections.
//! - `features`: Synthetic applicant attributes.
//! - `handlers`: HTTP request handlers.
//! - `model`: Learned model artifact.
//! - `models`: Records and API payloads.
//! - `pricing`: Interest-rate bands and payment plans.
//! - `quote`: Score-and-quote workflow.
//! - `router`: Route table.
//! - `scoring`: Score engine.
//! - `store`: Applicant store contract and in-memory store.
//! - `training`: Least-squares fit for the learned model.
//! - `validation`: Request validation.

pub mod api;
pub mod core;

pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod extract;
pub mod features;
pub mod handlers;
pub mod model;
pub mod models;
pub mod pricing;
pub mod quote;
pub mod router;
pub mod scoring;
pub mod store;
pub mod training;
pub mod validation;
