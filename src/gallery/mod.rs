//! The photo gallery around the compressor.
//!
//! - [`store`]: the upload/persistence gateway ([`PhotoGateway`], [`LocalGateway`])
//! - [`auth`]: sign-in gate for mutations
//! - [`upload`]: upload, edit and delete pipelines
//! - [`photo`]: stored records, editable details and layout classes
//! - [`filter`]: the color-overlay settings shared by all photos

pub mod auth;
pub mod filter;
pub mod photo;
pub mod store;
pub mod upload;

pub use auth::{AuthError, AuthGate, TokenGate};
pub use filter::{BlendMode, FilterSettings};
pub use photo::{LayoutClass, PhotoDetails, PhotoRecord};
pub use store::{GatewayError, LocalGateway, PhotoGateway};
pub use upload::{UploadError, UploadEvent, UploadReport, UploadedPhoto};
