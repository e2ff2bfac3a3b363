// ABOUTME: Hosts command implementation.
// ABOUTME: Lists inventory entries with their resolved user and address.

use sshclient::config::Config;
use sshclient::output::{Output, OutputMode};

pub fn list_hosts(config: &Config, output: &Output) {
    if config.hosts.is_empty() {
        output.progress("No hosts configured");
        return;
    }

    for (name, host) in &config.hosts {
        let user = host.effective_user(&config.defaults);
        match output.mode() {
            OutputMode::Json => {
                let entry = serde_json::json!({
                    "name": name,
                    "user": user,
                    "address": host.target.to_string(),
                });
                println!("{entry}");
            }
            OutputMode::Normal | OutputMode::Quiet => {
                println!("{name}\t{user}@{}", host.target);
            }
        }
    }
}
