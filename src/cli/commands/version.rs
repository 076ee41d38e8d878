//! Version command implementation

use crate::cli::Output;
use anyhow::Result;

pub async fn execute(output: &Output) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let name = env!("CARGO_PKG_NAME");
    let description = env!("CARGO_PKG_DESCRIPTION");

    println!("{} {}", name, version);

    output.category("About");
    output.key_value("Description:", description, false);

    output.category("Build Information");
    output.key_value("Target:", std::env::consts::ARCH, false);
    output.key_value("Profile:", if cfg!(debug_assertions) { "debug" } else { "release" }, false);
    output.key_value("CPU cores:", &num_cpus::get().to_string(), true);

    Ok(())
}
