pub mod policy;
pub mod token;

pub use policy::{
    check_permissions, policy_for, AccessError, AuthorizationGate, AuthorizerResponse, Effect, Permission,
};
pub use token::{extract_bearer_token, AuthError, Claims, TokenValidator, GROUPS_CLAIM};
