use std::fmt;

use crate::command::Command;

/// Sender identity from the `:name!user@host` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Prefix {
    pub name: String,
    pub user: String,
    pub host: String,
}

impl Prefix {
    fn parse(raw: &str) -> Self {
        let (name, rest) = match raw.split_once('!') {
            Some((name, rest)) => (name, Some(rest)),
            None => (raw, None),
        };
        let (user, host) = match rest {
            Some(rest) => rest.split_once('@').unwrap_or((rest, "")),
            None => match name.split_once('@') {
                // nick@host without a user part
                Some((_, host)) => ("", host),
                None => ("", ""),
            },
        };
        let name = name.split_once('@').map_or(name, |(n, _)| n);

        Self {
            name: name.to_string(),
            user: user.to_string(),
            host: host.to_string(),
        }
    }
}

/// One parsed IRC frame.
///
/// The final `:`-introduced parameter is kept apart as `trailing`, so
/// `params` only holds the middle parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub prefix: Option<Prefix>,
    pub command: Command,
    pub params: Vec<String>,
    pub trailing: String,
}

impl Message {
    pub fn new(command: Command, params: Vec<String>, trailing: impl Into<String>) -> Self {
        Self {
            prefix: None,
            command,
            params,
            trailing: trailing.into(),
        }
    }

    pub fn join(channel: &str) -> Self {
        Self::new(Command::Join, vec![channel.to_string()], "")
    }

    pub fn privmsg(target: &str, text: &str) -> Self {
        Self::new(Command::Privmsg, vec![target.to_string()], text)
    }

    /// Parse a single line, with or without the trailing CRLF.
    /// Returns `None` for blank lines and lines without a command.
    pub fn parse(line: &str) -> Option<Self> {
        let mut rest = line.trim_end_matches(['\r', '\n']);

        // IRCv3 message tags are not used by anything we route
        if rest.starts_with('@') {
            rest = rest.split_once(' ').map(|(_, r)| r)?;
        }
        rest = rest.trim_start_matches(' ');

        let mut prefix = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let (raw, r) = stripped.split_once(' ')?;
            prefix = Some(Prefix::parse(raw));
            rest = r.trim_start_matches(' ');
        }

        let (head, trailing) = match rest.find(" :") {
            Some(idx) => (&rest[..idx], &rest[idx + 2..]),
            None => match rest.strip_prefix(':') {
                Some(t) => ("", t),
                None => (rest, ""),
            },
        };

        let mut words = head.split(' ').filter(|w| !w.is_empty());
        let command = Command::parse(words.next()?);
        let params = words.map(str::to_string).collect();

        Some(Self {
            prefix,
            command,
            params,
            trailing: trailing.to_string(),
        })
    }

    /// Sender display name, empty for server-originated frames without a prefix.
    pub fn sender_name(&self) -> &str {
        self.prefix.as_ref().map_or("", |p| p.name.as_str())
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{}", prefix.name)?;
            if !prefix.user.is_empty() {
                write!(f, "!{}", prefix.user)?;
            }
            if !prefix.host.is_empty() {
                write!(f, "@{}", prefix.host)?;
            }
            f.write_str(" ")?;
        }
        write!(f, "{}", self.command)?;
        for param in &self.params {
            write!(f, " {}", param)?;
        }
        if !self.trailing.is_empty() {
            write!(f, " :{}", self.trailing)?;
        }
        Ok(())
    }
}
