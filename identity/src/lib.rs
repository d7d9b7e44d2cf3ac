//! # identity
//!
//! Resolution of the caller's identity from what the hosting platform's
//! authentication proxy hands us:
//! - the base64 JSON `x-ms-client-principal` header family
//! - the `/.auth/me` identity endpoint, queried with the caller's forwarded cookies
//!
//! Both raw shapes are normalized into one [`Profile`] through claim alias resolution.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use identity::{HeaderSource, IdentitySource, ResolvedPrincipal};
//!
//! if let Some(raw) = HeaderSource.principal(&headers).await? {
//!     let resolved = ResolvedPrincipal::from_raw(raw, identity::DEFAULT_IDENTITY_PROVIDER);
//! }
//! ```

pub mod claims;
pub mod endpoint;
pub mod error;
pub mod header;
pub mod principal;
pub mod profile;
pub mod source;

// Re-export commonly used types
pub use claims::{Claim, ClaimSet, ProfileField};
pub use endpoint::{endpoint_url, IdentityEndpointClient};
pub use error::{Error, ErrorKind};
pub use principal::{EndpointPrincipal, HeaderPrincipal, RawPrincipal};
pub use profile::{Profile, DEFAULT_IDENTITY_PROVIDER};
pub use source::{HeaderSource, IdentitySource, ResolvedPrincipal};
