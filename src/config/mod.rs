//! Configuration module for the blog server.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Number of items per listing page
    pub page_size: usize,
    /// Number of posts in the sidebar hot list
    pub hot_list_size: usize,
    /// Only the author of a comment may soft-delete it
    pub restrict_comment_delete: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/blog.sqlite"),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_level: "info".to_string(),
            page_size: 10,
            hot_list_size: 10,
            restrict_comment_delete: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let db_path = env::var("BLOG_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let bind_addr = match env::var("BLOG_BIND_ADDR") {
            Ok(raw) => raw
                .parse::<SocketAddr>()
                .map_err(|e| invalid("BLOG_BIND_ADDR", &raw, e))?,
            Err(_) => defaults.bind_addr,
        };

        let log_level = env::var("BLOG_LOG_LEVEL").unwrap_or(defaults.log_level);

        let page_size = parse_positive("BLOG_PAGE_SIZE", defaults.page_size)?;
        let hot_list_size = parse_positive("BLOG_HOT_LIST_SIZE", defaults.hot_list_size)?;

        let restrict_comment_delete = match env::var("BLOG_RESTRICT_COMMENT_DELETE") {
            Ok(raw) => parse_flag(&raw)
                .ok_or_else(|| invalid("BLOG_RESTRICT_COMMENT_DELETE", &raw, "expected a boolean"))?,
            Err(_) => defaults.restrict_comment_delete,
        };

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            page_size,
            hot_list_size,
            restrict_comment_delete,
        })
    }
}

fn parse_positive(var: &str, default: usize) -> Result<usize, AppError> {
    match env::var(var) {
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(value) if value > 0 => Ok(value),
            Ok(_) => Err(invalid(var, &raw, "must be greater than zero")),
            Err(e) => Err(invalid(var, &raw, e)),
        },
        Err(_) => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(var: &str, raw: &str, reason: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(format!("Invalid {} value {:?}: {}", var, raw, reason))
}
