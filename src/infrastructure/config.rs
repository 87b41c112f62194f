use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub gitlab: GitLabSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GitLabSettings {
    pub host: String,
    pub token: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_page_concurrency")]
    pub page_concurrency: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_per_page() -> u32 {
    100
}

fn default_page_concurrency() -> usize {
    25
}

fn default_user_agent() -> String {
    "dashboarder/1.0".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:5000".to_string()
}

/// Load `config/dashboard.*` if present, overridden by `DASHBOARD__*`
/// environment variables (e.g. `DASHBOARD__GITLAB__TOKEN`).
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
