//! chainconf-core: Inheritable configuration documents
//!
//! This crate loads tree-structured configuration documents that may extend
//! a parent document and embed nested sub-configurations, and resolves them
//! into a flat, read-only [`KeyStore`] addressed by `/`-separated keys.
//!
//! # Example
//!
//! ```rust
//! use chainconf_core::Loader;
//!
//! let xml = r#"
//! <configuration>
//!   <add key="logo" value="img/logo.png"/>
//!   <add key="padding" nested="true">
//!     <configuration>
//!       <add key="horizontal" value="40"/>
//!     </configuration>
//!   </add>
//! </configuration>
//! "#;
//!
//! let store = Loader::new().load_str(xml, "episode").unwrap();
//! assert_eq!(store.get(&["logo"]).unwrap(), "img/logo.png");
//! assert_eq!(store.get(&["padding", "horizontal"]).unwrap(), "40");
//! ```

pub mod error;
pub mod node;
pub mod reader;
pub mod resolver;
pub mod store;

mod loader;

pub use error::{Error, ErrorKind, Result};
pub use loader::{load, Loader, LoaderOptions, DEFAULT_EXTENSION};
pub use node::ConfigNode;
pub use reader::{TreeReader, XmlReader};
pub use resolver::{Inheritance, Resolution, Resolver, Visited};
pub use store::KeyStore;
