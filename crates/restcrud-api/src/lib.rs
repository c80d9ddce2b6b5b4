// restcrud-api: async typed resource client for REST-ish JSON backends

pub mod client;
pub mod config;
pub mod error;
pub mod mapping;
pub mod middleware;
pub mod resource;
pub mod transport;

pub use client::ResourceClient;
pub use config::{EndpointConfig, EndpointConfigBuilder, EndpointSpec, ResponseSpec};
pub use error::{ConfigError, Error, ErrorKind, classify};
pub use mapping::{FieldMapping, ResponseStructure};
pub use middleware::{BearerAuth, LoggingMiddleware, Middleware, StaticHeaders};
pub use resource::{Resource, ResourceId};
pub use transport::{HttpTransport, Request, Response, Transport, TransportFailure};

pub use reqwest::Method;
