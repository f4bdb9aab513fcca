//! Canonical names for numeric replies.
//!
//! Servers send numeric replies (`001`-`399` informational, `400`-`999`
//! errors). Dispatching on bare digits makes for unreadable listener code,
//! so the numerics this engine and its listeners care about are mapped to
//! their RFC names before the dispatch key is formed. Unlisted commands
//! pass through unchanged.

/// Map a command word to its canonical spelling.
pub fn canonical(command: &str) -> &str {
    match command {
        "001" => "rpl_welcome",
        "002" => "rpl_yourhost",
        "003" => "rpl_created",

        "301" => "rpl_away",
        "305" => "rpl_unaway",
        "306" => "rpl_nowaway",

        "311" => "rpl_whoisuser",
        "324" => "rpl_channelmodeis",

        "331" => "rpl_notopic",
        "332" => "rpl_topic",
        // Non-standard but widely sent alongside 332.
        "333" => "rpl_topicsetby",

        "353" => "rpl_namreply",
        "366" => "rpl_endofnames",

        "372" => "rpl_motd",
        "375" => "rpl_motdstart",
        "376" => "rpl_endofmotd",

        "401" => "err_nosuchnick",
        "433" => "err_nicknameinuse",
        "482" => "err_chanoprivsneeded",

        other => other,
    }
}
