use std::path::Path;

use anyhow::Result;

use autopr::config::Config;
use autopr::serve::{ServerConfig, start_server};

pub async fn cmd_serve(project_dir: &Path, port: u16, dev_mode: bool) -> Result<()> {
    let config = Config::load(project_dir.to_path_buf())?;
    start_server(ServerConfig {
        port,
        config,
        dev_mode,
    })
    .await
}
