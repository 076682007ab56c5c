#![warn(clippy::all, missing_docs)]

//! Core domain logic for the delivery planner.
//!
//! This crate hosts the data models, configuration handling, the delivery
//! cost engine, record persistence and the interactive session dispatcher
//! used by the terminal front end.

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod models;
pub mod store;
pub mod terminal;
pub mod transport;

pub use config::AppConfig;
pub use dispatch::{Dispatcher, DispatchError, Session, SessionState};
pub use models::{Customer, GridPoint, Role, User};
pub use store::{CustomerStore, StoreError, UserStore};
pub use terminal::Terminal;
pub use transport::{compute_quotes, TransportMethod, TripQuote};
