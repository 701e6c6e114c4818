//! Clients for third-party services the storefront depends on.
//!
//! # Services
//!
//! - `identity` - Email/password accounts (Firebase Identity Toolkit)
//! - `image_host` - Product image uploads (imgbb)
//! - `cart` - The active cart: session cart for visitors, remote cart once signed in

pub mod cart;
pub mod identity;
pub mod image_host;

pub use identity::{IdentityClient, IdentityError, IdentitySession};
pub use image_host::{ImageHostClient, ImageHostError, ImageUpload};
