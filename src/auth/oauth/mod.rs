//! HubSpot OAuth 2.0 authorization-code flow
//!
//! The initiator persists a [`StateData`] and hands back the consent URL; the
//! callback validates it, exchanges the code and parks a [`CredentialRecord`]
//! for a single pickup.

pub mod credentials;
pub mod flows;
pub mod health;
pub mod providers;
pub mod state;

pub use credentials::{CREDENTIALS_TTL_SECONDS, CredentialRecord};
pub use flows::{AuthorizeResponse, CLOSE_WINDOW_HTML, CallbackParams, OAuthFlows};
pub use health::HubspotConfigChecker;
pub use providers::{Oauth2Client, create_oauth_client};
pub use state::{OAUTH_STATE_TTL_SECONDS, StateData};
