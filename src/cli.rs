//! CLI argument parsing for dotprof

use crate::config::DotConfig;
use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dotprof")]
#[command(version)]
#[command(about = "Render a method-call profile as a Graphviz DOT call graph", long_about = None)]
pub struct Cli {
    /// Size of the synthetic hash workload to profile
    #[arg(value_name = "SIZE", default_value = "1")]
    pub size: u64,

    /// Where to write the DOT graph
    #[arg(short = 'o', long = "output", value_name = "PATH", default_value = "hash.gv")]
    pub output: PathBuf,

    /// Render a JSON profile instead of running the workload
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Also save the profile as JSON
    #[arg(long = "save-profile", value_name = "PATH")]
    pub save_profile: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Label renderer (simple or table)
    #[arg(long = "renderer", value_name = "NAME")]
    pub renderer: Option<String>,

    /// Font used for nodes and edges
    #[arg(long = "font-name", value_name = "NAME")]
    pub font_name: Option<String>,

    /// Base font size in points
    #[arg(long = "font-size", value_name = "POINTS")]
    pub font_size: Option<u32>,

    /// Enable debug tracing output (to stderr)
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Resolve the effective configuration: file first, then flag overrides
    pub fn dot_config(&self) -> Result<DotConfig> {
        let mut config = match &self.config {
            Some(path) => DotConfig::from_file(path)?,
            None => DotConfig::default(),
        };
        if let Some(name) = &self.renderer {
            config = config.with_renderer(name)?;
        }
        if let Some(font) = &self.font_name {
            config = config.with_font_name(font.clone());
        }
        if let Some(size) = self.font_size {
            config = config.with_base_font_size(size);
        }
        config.validate()?;
        Ok(config)
    }
}
