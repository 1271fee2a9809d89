// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Everything under /api/* that acts on behalf of the signed-in user. The JWT
// middleware has already validated the token and stashed an `AuthUser` in the
// request extensions.

pub mod account;
pub mod addresses;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod reviews;
