//! Subscription-URL generation: turns a list of services into one converter
//! URL per profile kind, shortens them and renders the result as Markdown.

mod config;
mod profile;
mod service;
mod shortener;
mod table;

use std::collections::BTreeMap;

pub use config::{load_config, AppConfig, ConfigError, ConfigResult, Settings};
pub use profile::{
    build_profile_params, merge_params, plan_profiles, profile_url, ProfileEntry, ProfileError,
    ProfileKind, ProfileResult, ProfileRule, HOME_OFFICE_TAG,
};
pub use service::{add_tag_metadata, build_mix_service, prepare_services, Service};
pub use shortener::{
    parse_short_url, RetryPolicy, ShortenError, ShortenResult, Shortener,
    DEFAULT_SHORTENER_ENDPOINT,
};
pub use table::render_table;

/// Query parameters passed to the converter endpoint.
pub type Params = BTreeMap<String, String>;
