//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_user_group_gateway;
mod in_memory_user_group_gateway;

pub use http_user_group_gateway::HttpUserGroupGateway;
pub use in_memory_user_group_gateway::InMemoryUserGroupGateway;
