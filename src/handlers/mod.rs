// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (JWT auth) → Elevated (admin role required)

pub mod public;    // Tier 1: No authentication required (/, /auth/*, catalog reads)
pub mod protected; // Tier 2: JWT authentication required (/api/*)
pub mod elevated;  // Tier 3: Admin role required (/api/admin/*)
