/// Router Module Index
///
/// Routing split by access requirement. The authentication layer is applied to the whole
/// `authenticated` router in `create_router`, so nothing in it is reachable anonymously.

/// Routes accessible to all clients.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
pub mod authenticated;
