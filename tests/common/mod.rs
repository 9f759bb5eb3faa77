#![allow(dead_code)]

pub mod entities;
pub mod repositories;
pub mod service;

pub use entities::{Order, User};
pub use mock::{Event, MockDriver};
pub use repositories::{Adapter, OrderRepository, UserRepository};
pub use service::{register, ServiceError};
