//! # taskdeck settings
//!
//! Every value the application needs at start-up lives in [`Settings`]:
//! the document title prefix, the default route, the shared password and
//! session timeout, and the storage keys used for persistence.
//!
//! All sections are defaulted, so an empty TOML document is valid.
//!
//! ```
//! use taskdeck_conf::Settings;
//!
//! let settings = Settings::from_toml_str(r#"
//! [auth]
//! password = "s3cret"
//! "#).unwrap();
//!
//! assert_eq!(settings.auth.password, "s3cret");
//! assert_eq!(settings.app.title_prefix, "Todo App");
//! ```
//!
//! Environment variables named `TASKDECK_<SECTION>__<FIELD>` override file
//! values, see [`Settings::with_env_overrides`].

mod env;
mod error;
mod settings;

pub use env::ENV_PREFIX;
pub use error::SettingsError;
pub use settings::{AppSettings, AuthSettings, SessionKeys, Settings, StoreSettings};
