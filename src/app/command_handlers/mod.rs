use crate::app::cli::{help_text, parse_cli_verb, CliVerb};

pub mod boot;
pub mod state;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    let Some(verb) = args.first() else {
        return boot::cmd_start();
    };

    match parse_cli_verb(verb.as_str()) {
        CliVerb::Start => boot::cmd_start(),
        CliVerb::Restore => state::cmd_restore(),
        CliVerb::Reconcile => boot::cmd_reconcile(&args[1..]),
        CliVerb::Sync => state::cmd_sync(),
        CliVerb::Identity => boot::cmd_identity(),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{verb}`\n{}", help_text())),
    }
}
