use std::fmt;

/// Message-kind tag of an IRC frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    Ping,
    Pong,
    Nick,
    User,
    Join,
    Privmsg,
    Notice,
    Mode,
    Topic,
    /// 001
    RplWelcome,
    /// 002
    RplYourHost,
    /// 003
    RplCreated,
    /// 004
    RplMyInfo,
    /// 005
    RplBounce,
    /// 250
    RplStatsDLine,
    /// 251
    RplLuserClient,
    /// 252
    RplLuserOp,
    /// 253
    RplLuserUnknown,
    /// 254
    RplLuserChannels,
    /// 255
    RplLuserMe,
    /// 265
    RplLocalUsers,
    /// 266
    RplGlobalUsers,
    /// 331
    RplNoTopic,
    /// 332
    RplTopic,
    /// 333
    RplTopicWhoTime,
    /// 353
    RplNamReply,
    /// 366
    RplEndOfNames,
    /// 372
    RplMotd,
    /// 375
    RplMotdStart,
    /// 376
    RplEndOfMotd,
    /// Anything we do not route, kept as sent.
    Other(String),
}

const TABLE: &[(Command, &str)] = &[
    (Command::Ping, "PING"),
    (Command::Pong, "PONG"),
    (Command::Nick, "NICK"),
    (Command::User, "USER"),
    (Command::Join, "JOIN"),
    (Command::Privmsg, "PRIVMSG"),
    (Command::Notice, "NOTICE"),
    (Command::Mode, "MODE"),
    (Command::Topic, "TOPIC"),
    (Command::RplWelcome, "001"),
    (Command::RplYourHost, "002"),
    (Command::RplCreated, "003"),
    (Command::RplMyInfo, "004"),
    (Command::RplBounce, "005"),
    (Command::RplStatsDLine, "250"),
    (Command::RplLuserClient, "251"),
    (Command::RplLuserOp, "252"),
    (Command::RplLuserUnknown, "253"),
    (Command::RplLuserChannels, "254"),
    (Command::RplLuserMe, "255"),
    (Command::RplLocalUsers, "265"),
    (Command::RplGlobalUsers, "266"),
    (Command::RplNoTopic, "331"),
    (Command::RplTopic, "332"),
    (Command::RplTopicWhoTime, "333"),
    (Command::RplNamReply, "353"),
    (Command::RplEndOfNames, "366"),
    (Command::RplMotd, "372"),
    (Command::RplMotdStart, "375"),
    (Command::RplEndOfMotd, "376"),
];

impl Command {
    /// Classify a command word. Verbs are case-insensitive on the wire.
    pub fn parse(word: &str) -> Self {
        let upper = word.to_ascii_uppercase();
        TABLE
            .iter()
            .find(|(_, name)| *name == upper)
            .map(|(cmd, _)| cmd.clone())
            .unwrap_or_else(|| Command::Other(word.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Command::Other(word) => word,
            known => TABLE
                .iter()
                .find(|(cmd, _)| cmd == known)
                .map(|(_, name)| *name)
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
