// handlers/mod.rs - HTTP handlers
//
// accounts:   account lifecycle, behind the authorization gate (/accounts/*)
// authorizer: gateway authorizer endpoint, evaluates tokens itself
// service:    public service info and liveness

pub mod accounts;
pub mod authorizer;
pub mod service;
