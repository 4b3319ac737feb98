//! `agrab check` – report whether the external programs are installed.

use agrab_core::config::AgrabConfig;
use agrab_core::tools;
use anyhow::{bail, Result};

pub fn run_check(cfg: &AgrabConfig) -> Result<()> {
    let statuses = tools::check_all(cfg);
    for status in &statuses {
        match &status.path {
            Some(path) => println!("{:<10} {}", status.name, path.display()),
            None => println!("{:<10} not found", status.name),
        }
    }
    let missing: Vec<&str> = statuses
        .iter()
        .filter(|s| !s.is_available())
        .map(|s| s.name.as_str())
        .collect();
    if !missing.is_empty() {
        bail!("missing programs: {}", missing.join(", "));
    }
    Ok(())
}
