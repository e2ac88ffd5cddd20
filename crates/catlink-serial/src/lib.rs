//! Serial endpoint lifecycle and USB device matching.
//!
//! This is the lowest layer of catlink. It owns exactly one serial endpoint
//! at a time:
//! - [`ConnectionManager`] opens, closes, resets and writes to the endpoint
//! - [`discovery`] enumerates attached USB serial devices and picks the
//!   preferred one by vendor/product id
//!
//! Links are produced by a [`Connector`]. [`SystemConnector`] opens real OS
//! ports; [`MemoryConnector`] is an in-process endpoint for tests and demos.

pub mod config;
pub mod connection;
pub mod discovery;
pub mod error;
pub mod memory;
pub mod system;
pub mod traits;

pub use config::{
    DeviceDefaults, SerialConfig, DEFAULT_BAUD_RATE, PREFERRED_PRODUCT_ID, PREFERRED_VENDOR_ID,
};
pub use connection::ConnectionManager;
pub use discovery::{discover, locate_preferred, locate_preferred_in, DeviceDescriptor};
pub use error::{Result, SerialError};
pub use memory::MemoryConnector;
pub use system::SystemConnector;
pub use traits::{Connector, SerialLink};
