#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Start,
    Restore,
    Reconcile,
    Sync,
    Identity,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "start" => CliVerb::Start,
        "restore" => CliVerb::Restore,
        "reconcile" => CliVerb::Reconcile,
        "sync" => CliVerb::Sync,
        "identity" => CliVerb::Identity,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Usage: clawboot [command]".to_string(),
        String::new(),
        "Commands:".to_string(),
        "  start                 Restore, reconcile, start bridges, then exec the gateway (default)"
            .to_string(),
        "  restore               Pull config, workspace and skills from remote storage".to_string(),
        "  reconcile [--dry-run] Apply environment overlays to the gateway config".to_string(),
        "  sync                  Push config, workspace and skills to remote storage".to_string(),
        "  identity              Rebuild the identity document from knowledge fragments"
            .to_string(),
        "  help                  Show this help".to_string(),
    ]
}

pub fn help_text() -> String {
    cli_help_lines().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_help_command_parses() {
        for verb in ["start", "restore", "reconcile", "sync", "identity", "help"] {
            assert_ne!(parse_cli_verb(verb), CliVerb::Unknown, "{verb}");
            assert!(help_text().contains(&format!("  {verb}")));
        }
        assert_eq!(parse_cli_verb("launch"), CliVerb::Unknown);
    }
}
