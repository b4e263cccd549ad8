use esg_report_core::EngineConfig;

use super::file;

/// Load an engine configuration file. YAML is a superset of JSON, so both
/// are accepted; omitted keys keep their defaults.
pub fn read_config(path: &str) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let canonical = file::resolve_path(path)?;
    let contents = file::read_text(&canonical)?;
    let config: EngineConfig = serde_yaml::from_str(&contents)
        .map_err(|e| format!("Failed to parse config '{}': {}", canonical.display(), e))?;
    config.validate()?;
    tracing::debug!(path = %canonical.display(), "loaded engine configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: EngineConfig =
            serde_yaml::from_str("display_threshold: 0.1\nexecutive_position: Director\n").unwrap();
        assert_eq!(config.display_threshold, dec!(0.1));
        assert_eq!(config.executive_position, "Director");
        assert_eq!(config.unknown_label, EngineConfig::default().unknown_label);
    }
}
