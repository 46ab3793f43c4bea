//! # Configuration
//!
//! Settings are layered, later sources winning:
//!
//! 1. built-in defaults
//! 2. `config/default.toml`, then `config/{RUN_ENV}.toml`
//! 3. `APP__SECTION__KEY` environment variables (a `.env` file is read first)
//! 4. the shorthand variables `SERVER_HOST`, `SERVER_PORT`, `DATABASE_URL`,
//!    `STORAGE_BACKEND` and `JWT_SECRET`
//!
//! ```rust,ignore
//! let settings = messenger_server::config::Settings::load()?;
//! assert!(settings.messages.max_page_size >= settings.messages.default_page_size);
//! ```

mod settings;

pub use settings::*;
