use boshu::recruit::command::{COMMAND_NAME, DEFAULT_DEADLINE, DEFAULT_LIMIT};

/// Display version information
pub fn execute() {
    println!("{}", banner());
}

fn banner() -> String {
    format!(
        "boshu {}\n{}\nCommand: /{} (default limit {}, default deadline {})",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_DESCRIPTION"),
        COMMAND_NAME,
        DEFAULT_LIMIT,
        DEFAULT_DEADLINE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_names_command_and_defaults() {
        let banner = banner();
        let mut lines = banner.lines();

        assert_eq!(
            lines.next(),
            Some(format!("boshu {}", env!("CARGO_PKG_VERSION")).as_str())
        );
        assert_eq!(
            lines.next(),
            Some("Timed group sign-up (recruitment) bot for chat platforms")
        );
        assert_eq!(
            lines.next(),
            Some("Command: /boshu (default limit 4, default deadline 10m)")
        );
    }
}
