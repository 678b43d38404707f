//! Opening vendor submission pages in the user's browser

use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::info;

use crate::pipeline::Vendor;

/// Something that can show a URL to the user
pub trait UrlOpener {
    fn open(&self, url: &str) -> Result<()>;
}

/// Hands URLs to the platform's default opener
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl UrlOpener for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        let mut command = opener_command(url);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to launch a browser for {}", url))?;
        Ok(())
    }
}

#[cfg(target_os = "windows")]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "", url]);
    command
}

#[cfg(target_os = "macos")]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(url);
    command
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    command
}

/// Open the submission page of `vendor`, returning the URL shown
pub fn open_vendor_page(vendor: Vendor, opener: &dyn UrlOpener) -> Result<&'static str> {
    let url = vendor.submission_url();
    opener.open(url)?;
    info!(vendor = %vendor, url, "opened vendor page");
    Ok(url)
}
