// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod auth;
mod credentials;
mod health;
mod identity;
mod metrics;
mod pages;
mod passkey_login;
mod passkey_register;

// Core handlers
pub use health::health_check;
pub use metrics::metrics_handler;

// Password authentication
pub use auth::{login, logout, signup};

// Passkey ceremonies
pub use passkey_login::{begin as passkey_login_begin, finish as passkey_login_finish};
pub use passkey_register::{begin as passkey_register_begin, finish as passkey_register_finish};

// Identity management
pub use identity::{api_key, get_user, update_password};

// Stored-credential management
pub use credentials::{delete_credential, list_credentials};

// Page surface
pub use pages::{auth_page, home_page, page_fallback};
