//! `check-config`: validate the configuration without touching the network

use rbac_core::{MigrationConfig, Selection};

/// Human-readable description of what a run with `config` would do
pub fn describe(config: &MigrationConfig) -> String {
    let target = match config.selection() {
        Selection::All => "all organizations".to_string(),
        Selection::Organization(id) => format!("organization {id}"),
    };
    let directory = if config.directory.enabled {
        config.directory.url.as_str()
    } else {
        "disabled"
    };
    let log_file = if config.report.log_file.as_os_str().is_empty() {
        "disabled".to_string()
    } else {
        config.report.log_file.display().to_string()
    };

    format!(
        "Platform:        {platform}\n\
         Target:          {target}\n\
         Directory:       {directory}\n\
         Fallback admin:  {fallback}\n\
         Mapped owners:   {mapped}\n\
         Report:          {report}\n\
         Log file:        {log_file}\n",
        platform = config.platform.url,
        fallback = config.options.fallback_admin,
        mapped = config.mapping.len(),
        report = config.report.path.display(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn description_names_target_and_outputs() {
        let config = parse_config(
            r#"
            [platform]
            url = "https://api.example.test/v2"

            [options]
            fallback_admin = "admin@corp.test"
            target_organization = "o-7"

            [report]
            log_file = ""

            [mapping]
            "oid-1" = "alice@corp.test"
            "oid-2" = "bob@corp.test"
            "#,
        )
        .unwrap();

        let text = describe(&config);

        assert_eq!(text.lines().count(), 7);
        assert!(text.starts_with("Platform:        https://api.example.test/v2\n"));
        assert!(text.contains("Target:          organization o-7"));
        assert!(text.contains("Directory:       disabled"));
        assert!(text.contains("Mapped owners:   2"));
        assert!(text.contains("Log file:        disabled"));
        assert!(text.contains("Report:          migration-report.csv"));
    }
}
