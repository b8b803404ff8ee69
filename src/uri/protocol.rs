use std::fmt;

/// URL schemes curl understands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scheme {
    #[default]
    Https,
    Http,
    Ftp,
    Ftps,
    Sftp,
    Scp,
    Tftp,
    Telnet,
    Ldap,
    File,
    Ws,
    Wss,
    Unknown,
}

impl From<&str> for Scheme {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "https" => Scheme::Https,
            "http" => Scheme::Http,
            "ftp" => Scheme::Ftp,
            "ftps" => Scheme::Ftps,
            "sftp" => Scheme::Sftp,
            "scp" => Scheme::Scp,
            "tftp" => Scheme::Tftp,
            "telnet" => Scheme::Telnet,
            "ldap" => Scheme::Ldap,
            "file" => Scheme::File,
            "ws" => Scheme::Ws,
            "wss" => Scheme::Wss,
            _ => Scheme::Unknown,
        }
    }
}

impl Scheme {
    /// `http` and `https` URLs must name a host.
    pub fn requires_host(self) -> bool {
        matches!(self, Scheme::Http | Scheme::Https)
    }

    pub fn default_port(self) -> Option<u16> {
        match self {
            Scheme::Https | Scheme::Wss => Some(443),
            Scheme::Http | Scheme::Ws => Some(80),
            Scheme::Ftp => Some(21),
            Scheme::Ftps => Some(990),
            Scheme::Sftp | Scheme::Scp => Some(22),
            Scheme::Tftp => Some(69),
            Scheme::Telnet => Some(23),
            Scheme::Ldap => Some(389),
            Scheme::File | Scheme::Unknown => None,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scheme::Https => "https",
            Scheme::Http => "http",
            Scheme::Ftp => "ftp",
            Scheme::Ftps => "ftps",
            Scheme::Sftp => "sftp",
            Scheme::Scp => "scp",
            Scheme::Tftp => "tftp",
            Scheme::Telnet => "telnet",
            Scheme::Ldap => "ldap",
            Scheme::File => "file",
            Scheme::Ws => "ws",
            Scheme::Wss => "wss",
            Scheme::Unknown => "unknown",
        })
    }
}
