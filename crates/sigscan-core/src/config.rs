//! 配置文件加载（TOML）
use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;
use crate::options::EngineOptions;

/// 顶层配置文件结构
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    engine: EngineOptions,
}

/// 从 TOML 文件加载引擎选项；缺省字段取默认值
pub fn load_options(path: &Path) -> Result<EngineOptions, ConfigError> {
    let txt = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    parse_options(&txt).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

pub(crate) fn parse_options(txt: &str) -> Result<EngineOptions, toml::de::Error> {
    let parsed: ConfigFile = toml::from_str(txt)?;
    Ok(parsed.engine)
}
