use crate::config::AppConfig;
use crate::users::{
    repo::UserStore,
    services::{Clock, SystemClock, UserService},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<UserService>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        Ok(Self::from_parts(config, Arc::new(SystemClock)))
    }

    pub fn from_parts(config: Arc<AppConfig>, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(UserStore::new());
        let users = Arc::new(UserService::new(store, config.user.min_age, clock));
        Self { config, users }
    }

    /// Minimum age 18, today pinned to 2024-06-01.
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::UserConfig;
        use crate::users::services::FixedClock;

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            user: UserConfig { min_age: 18 },
        });
        Self::from_parts(config, Arc::new(FixedClock(time::macros::date!(2024 - 06 - 01))))
    }
}
