//! RoommateFinder listing API.
//!
//! An actix-web service over a single `roommates` collection. Request
//! parameters are turned into typed queries in [`query`] and executed by a
//! [`store::ListingStore`], either MongoDB or in memory.
pub mod app;
pub mod config;
pub mod controllers;
pub mod error;
pub mod models;
pub mod query;
pub mod store;
