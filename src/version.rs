pub const CURRENT: &str = env!("CARGO_PKG_VERSION");

/// One-line identification used for the About dialog text and startup
/// log.
pub fn banner() -> String {
    format!("Apcupsd tray agent v{}", CURRENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_carries_the_crate_version() {
        let banner = banner();
        assert!(banner.contains(CURRENT));
        assert!(banner.starts_with("Apcupsd"));
    }
}
