use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_MODEL: &str = "llama3.1:8b-instruct-q8_0";
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Runtime configuration for a pipeline run.
///
/// Values resolve in order: `autopr.toml` in the project directory, then
/// `OLLAMA_HOST` / `AUTOPR_MODEL` environment variables, then defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_dir: PathBuf,
    /// Base URL of the completion service, e.g. `http://localhost:11434`.
    pub ollama_host: String,
    /// Model name passed to the completion service.
    pub model: String,
}

/// On-disk shape of `autopr.toml`.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    llm: LlmSection,
}

#[derive(Debug, Default, Deserialize)]
struct LlmSection {
    host: Option<String>,
    model: Option<String>,
}

impl Config {
    pub fn load(project_dir: PathBuf) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;

        let file = Self::read_config_file(&project_dir)?;

        let ollama_host = std::env::var("OLLAMA_HOST")
            .ok()
            .or(file.llm.host)
            .unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string());
        let model = std::env::var("AUTOPR_MODEL")
            .ok()
            .or(file.llm.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            project_dir,
            ollama_host,
            model,
        })
    }

    fn read_config_file(project_dir: &std::path::Path) -> Result<ConfigFile> {
        let path = project_dir.join("autopr.toml");
        if !path.exists() {
            return Ok(ConfigFile::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    /// `std::env::set_var` is process-global; tests that touch the env
    /// must hold this lock.
    static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn clear_env() {
        unsafe {
            std::env::remove_var("OLLAMA_HOST");
            std::env::remove_var("AUTOPR_MODEL");
        }
    }

    #[test]
    fn test_defaults_without_config_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.ollama_host, DEFAULT_OLLAMA_HOST);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.project_dir, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("autopr.toml"),
            "[llm]\nhost = \"http://ollama.internal:11434\"\nmodel = \"codellama:13b\"\n",
        )
        .unwrap();
        let config = Config::load(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.ollama_host, "http://ollama.internal:11434");
        assert_eq!(config.model, "codellama:13b");
    }

    #[test]
    fn test_env_overrides_config_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("autopr.toml"),
            "[llm]\nmodel = \"codellama:13b\"\n",
        )
        .unwrap();
        unsafe {
            std::env::set_var("AUTOPR_MODEL", "mistral:7b");
        }
        let config = Config::load(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.model, "mistral:7b");
        clear_env();
    }

    #[test]
    fn test_invalid_config_file_is_an_error() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("autopr.toml"), "[llm\nnot toml").unwrap();
        let result = Config::load(dir.path().to_path_buf());
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_project_dir_is_an_error() {
        let result = Config::load(PathBuf::from("/nonexistent/autopr-test-dir"));
        assert!(result.is_err());
    }
}
