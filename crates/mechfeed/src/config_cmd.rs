// SPDX-FileCopyrightText: 2026 Mechfeed Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mechfeed config` command implementation.

use mechfeed_config::MechfeedConfig;
use mechfeed_core::MechfeedError;

const REDACTED: &str = "<redacted>";

/// Prints the effective configuration as TOML with secrets replaced.
pub fn print_config(config: &MechfeedConfig) -> Result<(), MechfeedError> {
    print!("{}", render(config)?);
    Ok(())
}

fn render(config: &MechfeedConfig) -> Result<String, MechfeedError> {
    toml::to_string_pretty(&redact(config))
        .map_err(|e| MechfeedError::Internal(format!("failed to serialize config: {e}")))
}

/// Copy of `config` with tokens, client secrets and webhook URLs masked.
fn redact(config: &MechfeedConfig) -> MechfeedConfig {
    let mask = |value: &mut Option<String>| {
        if value.is_some() {
            *value = Some(REDACTED.to_string());
        }
    };

    let mut config = config.clone();
    mask(&mut config.discord.token);
    mask(&mut config.reddit.client_secret);
    mask(&mut config.reddit.imgur_client_id);
    for owner in &mut config.owners {
        mask(&mut owner.webhook);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_never_reach_the_output() {
        let config = mechfeed_config::load_and_validate_str(
            r#"
[discord]
token = "very-secret-token"

[reddit]
client_id = "public-id"
client_secret = "hunter2"

[[owners]]
id = "alice"
webhook = "https://discord.com/api/webhooks/1/xyz"

[[subscriptions]]
owner_id = "alice"
expression = "kaze"
"#,
        )
        .unwrap();

        let out = render(&config).unwrap();
        assert!(!out.contains("very-secret-token"));
        assert!(!out.contains("hunter2"));
        assert!(!out.contains("webhooks/1/xyz"));
        assert!(out.contains("public-id"));
        assert!(out.contains(REDACTED));
        assert!(out.contains("expression = \"kaze\""));
    }

    #[test]
    fn absent_secrets_stay_absent() {
        let mut config = MechfeedConfig::default();
        config.discord.token = None;
        let redacted = redact(&config);
        assert!(redacted.discord.token.is_none());
        assert!(redacted.reddit.client_secret.is_none());
    }
}
