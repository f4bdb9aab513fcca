//! Outbound command line builders.
//!
//! Each function formats one well-formed protocol line, CRLF excluded
//! (the transport codec appends it). Parameters that may contain spaces
//! are always emitted as the final, colon-prefixed trailing parameter.

/// `NICK`: request a nickname change.
pub fn nick(nickname: &str) -> String {
    format!("NICK {nickname}")
}

/// `USER`: the registration identity line.
pub fn user(username: &str, realname: &str) -> String {
    format!("USER {username} 0 * :{realname}")
}

/// `JOIN` a channel.
pub fn join(channel: &str) -> String {
    format!("JOIN {channel}")
}

/// `PART` a channel, optionally with a reason.
pub fn part(channel: &str, reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("PART {channel} :{reason}"),
        None => format!("PART {channel}"),
    }
}

/// `PRIVMSG`: one line of message text to a channel or nickname.
pub fn privmsg(target: &str, line: &str) -> String {
    format!("PRIVMSG {target} :{line}")
}

/// `NOTICE`: one line of notice text to a channel or nickname.
pub fn notice(target: &str, line: &str) -> String {
    format!("NOTICE {target} :{line}")
}

/// `WHOIS` a nickname.
pub fn whois(nickname: &str) -> String {
    format!("WHOIS {nickname}")
}

/// `TOPIC`: the query form omits the trailing parameter, the set form
/// carries the new topic as trailing.
pub fn topic(channel: &str, new_topic: Option<&str>) -> String {
    match new_topic {
        Some(new_topic) => format!("TOPIC {channel} :{new_topic}"),
        None => format!("TOPIC {channel}"),
    }
}

/// `KICK` a nickname from a channel. The reason defaults to the kicked
/// nickname when not supplied.
pub fn kick(channel: &str, nickname: &str, reason: Option<&str>) -> String {
    let reason = reason.unwrap_or(nickname);
    format!("KICK {channel} {nickname} :{reason}")
}

/// `MODE`: a mode string plus up to two arguments.
pub fn mode(channel: &str, modes: &str, arg1: Option<&str>, arg2: Option<&str>) -> String {
    let mut line = format!("MODE {channel} {modes}");
    if let Some(arg1) = arg1 {
        line.push(' ');
        line.push_str(arg1);
    }
    if let Some(arg2) = arg2 {
        line.push(' ');
        line.push_str(arg2);
    }
    line
}

/// `AWAY`: a reason marks you away, no reason marks you back.
pub fn away(reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("AWAY :{reason}"),
        None => "AWAY".to_string(),
    }
}

/// `QUIT`, optionally with a reason.
pub fn quit(reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("QUIT :{reason}"),
        None => "QUIT".to_string(),
    }
}

/// `PONG` reply carrying the server's `PING` payload.
pub fn pong(payload: &str) -> String {
    format!("PONG :{payload}")
}

/// `CAP REQ` for a capability.
pub fn cap_req(capability: &str) -> String {
    format!("CAP REQ {capability}")
}

/// `CAP END`: close capability negotiation.
pub fn cap_end() -> String {
    "CAP END".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_reason_forms() {
        assert_eq!(part("#chan", None), "PART #chan");
        assert_eq!(part("#chan", Some("bye now")), "PART #chan :bye now");
    }

    #[test]
    fn test_topic_query_vs_set() {
        assert_eq!(topic("#chan", None), "TOPIC #chan");
        assert_eq!(topic("#chan", Some("new topic")), "TOPIC #chan :new topic");
    }

    #[test]
    fn test_kick_reason_defaults_to_nickname() {
        assert_eq!(kick("#chan", "troll", None), "KICK #chan troll :troll");
        assert_eq!(
            kick("#chan", "troll", Some("enough")),
            "KICK #chan troll :enough"
        );
    }

    #[test]
    fn test_mode_optional_args() {
        assert_eq!(mode("#chan", "+o", Some("nick"), None), "MODE #chan +o nick");
        assert_eq!(
            mode("#chan", "+ov", Some("a"), Some("b")),
            "MODE #chan +ov a b"
        );
        assert_eq!(mode("#chan", "+m", None, None), "MODE #chan +m");
    }

    #[test]
    fn test_away_toggle() {
        assert_eq!(away(Some("lunch break")), "AWAY :lunch break");
        assert_eq!(away(None), "AWAY");
    }

    #[test]
    fn test_registration_lines() {
        assert_eq!(user("kae", "Kae Chat"), "USER kae 0 * :Kae Chat");
        assert_eq!(nick("kae"), "NICK kae");
        assert_eq!(cap_req("multi-prefix"), "CAP REQ multi-prefix");
        assert_eq!(cap_end(), "CAP END");
    }

    #[test]
    fn test_pong_echoes_payload() {
        assert_eq!(pong("irc.example.com"), "PONG :irc.example.com");
    }
}
