mod dispatch;
mod error;
mod service;
mod transfer;

pub use error::AppError;
pub use service::{EntityService, ServiceConfig};
