// Adapters layer: concrete implementations of the domain ports (cloud storage, CRM)
// plus the token files both of them read at start-up.

pub mod credentials;
pub mod dropbox;
pub mod twenty;

pub use credentials::Credentials;
pub use dropbox::DropboxStore;
pub use twenty::TwentyClient;
