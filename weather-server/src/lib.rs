pub mod libs;
pub mod routes;
