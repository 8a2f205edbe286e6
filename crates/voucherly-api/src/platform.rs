/// What kind of controller sits behind the configured address.
///
/// Decides every path prefix and the login endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPlatform {
    /// UniFi OS console (UDM, UCG, Cloud Key Gen2+). The Network app is
    /// reached through `/proxy/network`.
    UnifiOs,
    /// Self-hosted Network Application, usually on port 8443.
    ClassicController,
}

impl ControllerPlatform {
    pub fn legacy_prefix(self) -> &'static str {
        match self {
            Self::UnifiOs => "/proxy/network",
            Self::ClassicController => "",
        }
    }

    pub fn integration_prefix(self) -> &'static str {
        match self {
            Self::UnifiOs => "/proxy/network/integration",
            Self::ClassicController => "/integration",
        }
    }

    pub fn login_path(self) -> &'static str {
        match self {
            Self::UnifiOs => "/api/auth/login",
            Self::ClassicController => "/api/login",
        }
    }

    pub fn logout_path(self) -> &'static str {
        match self {
            Self::UnifiOs => "/api/auth/logout",
            Self::ClassicController => "/api/logout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ControllerPlatform;

    #[test]
    fn consoles_proxy_the_network_app() {
        let os = ControllerPlatform::UnifiOs;
        assert_eq!(os.legacy_prefix(), "/proxy/network");
        assert_eq!(os.integration_prefix(), "/proxy/network/integration");
        assert_eq!(os.login_path(), "/api/auth/login");
    }

    #[test]
    fn standalone_paths_sit_at_the_root() {
        let classic = ControllerPlatform::ClassicController;
        assert_eq!(classic.legacy_prefix(), "");
        assert_eq!(classic.integration_prefix(), "/integration");
        assert_eq!(classic.logout_path(), "/api/logout");
    }
}
