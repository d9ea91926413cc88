use mongodb::options::ClientOptions;
use std::time::Duration;

/// Client settings applied on top of what the connection string specifies.
///
/// Every setting is optional; an unset value leaves the connection string's
/// (or the driver's default) value in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MongoConfig {
    app_name: Option<String>,
    connect_timeout: Option<Duration>,
    server_selection_timeout: Option<Duration>,
    max_pool_size: Option<u32>,
}

impl MongoConfig {
    pub fn new() -> MongoConfig {
        MongoConfig::default()
    }

    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    pub fn server_selection_timeout(&self) -> Option<Duration> {
        self.server_selection_timeout
    }

    pub fn max_pool_size(&self) -> Option<u32> {
        self.max_pool_size
    }

    pub(crate) fn set_app_name(&mut self, app_name: &str) {
        self.app_name = Some(app_name.to_string());
    }

    pub(crate) fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = Some(timeout);
    }

    pub(crate) fn set_server_selection_timeout(&mut self, timeout: Duration) {
        self.server_selection_timeout = Some(timeout);
    }

    pub(crate) fn set_max_pool_size(&mut self, size: u32) {
        self.max_pool_size = Some(size);
    }

    /// Overrides the parsed client options with the values set here.
    pub(crate) fn apply(&self, options: &mut ClientOptions) {
        if let Some(app_name) = &self.app_name {
            options.app_name = Some(app_name.clone());
        }
        if let Some(timeout) = self.connect_timeout {
            options.connect_timeout = Some(timeout);
        }
        if let Some(timeout) = self.server_selection_timeout {
            options.server_selection_timeout = Some(timeout);
        }
        if let Some(size) = self.max_pool_size {
            options.max_pool_size = Some(size);
        }
    }
}
