pub const APP_NAME: &str = "Freight Quote";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_TAG: Option<&str> = option_env!("GIT_TAG");

const USER_AGENT_NAME: &str = "freight-quote";

pub fn version_label() -> String {
    if let Some(tag) = GIT_TAG {
        tag.to_string()
    } else {
        format!("v{}", APP_VERSION)
    }
}

/// `User-Agent` header sent to external services.
pub fn user_agent() -> String {
    format!("{USER_AGENT_NAME}/{}", version_label().trim_start_matches('v'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert!(version_label().starts_with('v') || GIT_TAG.is_some());
        assert!(user_agent().starts_with("freight-quote/"));
        assert!(!user_agent().contains("/v"));
    }
}
