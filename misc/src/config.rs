use std::path::PathBuf;
use std::{env, fs, io};

use anyhow::{bail, Context, Result};
use clap::Args;
use log::warn;
use serde::de::DeserializeOwned;

use crate::dirs::ensure_dir_exists;

/// Resolved config/data/pki directories for the current process.
pub struct PathSet {
    pub config_path: PathBuf,
    pub data_path: PathBuf,
    pub pki_path: PathBuf,
}

impl PathSet {
    pub fn new(config_path: Option<PathBuf>, data_path: Option<PathBuf>) -> Result<Self> {
        // Check if running as root (UID == 0)
        let is_root = unsafe { libc::geteuid() == 0 };

        let config_path = if let Some(path) = config_path {
            path
        } else if let Ok(path) = env::var("PAWMART_CONFIG") {
            PathBuf::from(path)
        } else if is_root {
            PathBuf::from("/etc/pawmart")
        } else {
            Self::home_dir()?.join(".config").join("pawmart")
        };

        let data_path = if let Some(path) = data_path {
            path
        } else if let Ok(path) = env::var("PAWMART_DATA") {
            PathBuf::from(path)
        } else if is_root {
            PathBuf::from("/var/lib/pawmart")
        } else {
            Self::home_dir()?
                .join(".local")
                .join("share")
                .join("pawmart")
        };

        // PKI path is always under config path
        let pki_path = config_path.join("pki");

        ensure_dir_exists(&config_path)
            .with_context(|| format!("ensure config directory: {}", config_path.display()))?;
        ensure_dir_exists(&data_path)
            .with_context(|| format!("ensure data directory: {}", data_path.display()))?;
        ensure_dir_exists(&pki_path)
            .with_context(|| format!("ensure pki directory: {}", pki_path.display()))?;

        Ok(Self {
            config_path,
            data_path,
            pki_path,
        })
    }

    pub fn load_config<T>(&self, name: &str) -> Result<T>
    where
        T: CommonConfig + DeserializeOwned,
    {
        let path = self.config_path.join(format!("{name}.toml"));
        let mut cfg: T = match fs::read_to_string(&path) {
            Ok(s) => toml::from_str(&s).context("parse config toml")?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!("Config file for {name} not found, using defaults");
                T::default()
            }
            Err(err) => {
                return Err(err).context(format!("read config file: {}", path.display()));
            }
        };

        cfg.complete(self).context("validate config")?;
        Ok(cfg)
    }

    fn home_dir() -> Result<PathBuf> {
        let dir = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from);
        match dir {
            Some(dir) => Ok(dir),
            None => {
                bail!("could not determine home directory, please specify config path manually")
            }
        }
    }
}

pub trait CommonConfig {
    fn default() -> Self;
    fn complete(&mut self, ps: &PathSet) -> Result<()>;
}

/// Common command line arguments to override config and data locations.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Override the config directory. Supports `~` and env expansion.
    #[arg(long)]
    pub config_path: Option<String>,

    /// Override the data directory. Supports `~` and env expansion.
    #[arg(long)]
    pub data_path: Option<String>,
}

impl ConfigArgs {
    pub fn build_path_set(&self) -> Result<PathSet> {
        let config_path = self.config_path.as_deref().map(expand_path).transpose()?;
        let data_path = self.data_path.as_deref().map(expand_path).transpose()?;
        PathSet::new(config_path, data_path)
    }

    pub fn load<T>(&self, name: &str) -> Result<T>
    where
        T: CommonConfig + DeserializeOwned,
    {
        let ps = self.build_path_set()?;
        ps.load_config(name)
    }
}

fn expand_path(s: &str) -> Result<PathBuf> {
    let s = shellexpand::full(s).with_context(|| format!("expand path '{s}'"))?;
    Ok(PathBuf::from(s.to_string()))
}
