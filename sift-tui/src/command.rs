use sift_search::Vertical;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),  // plain text
    Lucky(String),   // /lucky <text>
    Related(usize),  // /related <n>, 1-based
    Tab(Vertical),   // /tab <all|images|videos|news|maps>
    Page(u32),       // /page <n>
    Help,            // /help
    Quit,            // /quit or /exit
    Unknown(String),
}

pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return Command::Search(trimmed.to_string());
    }
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let verb = parts.next().unwrap_or_default();
    let rest = parts.next().map(str::trim).filter(|s| !s.is_empty());

    match (verb, rest) {
        ("/lucky", text) => Command::Lucky(text.unwrap_or_default().to_string()),
        ("/related", Some(n)) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Command::Related(n),
            _ => Command::Unknown(trimmed.to_string()),
        },
        ("/tab", Some(name)) => name
            .parse()
            .map(Command::Tab)
            .unwrap_or_else(|_| Command::Unknown(trimmed.to_string())),
        ("/page", Some(n)) => n
            .parse()
            .map(Command::Page)
            .unwrap_or_else(|_| Command::Unknown(trimmed.to_string())),
        ("/help", _) => Command::Help,
        ("/quit" | "/exit", _) => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_search() {
        assert_eq!(parse_command("  open ai "), Command::Search("open ai".into()));
    }

    #[test]
    fn verbs_parse_their_arguments() {
        assert_eq!(parse_command("/lucky rust"), Command::Lucky("rust".into()));
        assert_eq!(parse_command("/lucky"), Command::Lucky(String::new()));
        assert_eq!(parse_command("/related 3"), Command::Related(3));
        assert_eq!(parse_command("/tab News"), Command::Tab(Vertical::News));
        assert_eq!(parse_command("/page 2"), Command::Page(2));
        assert_eq!(parse_command("/exit"), Command::Quit);
        assert_eq!(parse_command("/help"), Command::Help);
    }

    #[test]
    fn bad_arguments_are_unknown() {
        for raw in ["/related 0", "/related x", "/tab shopping", "/page", "/frobnicate"] {
            assert_eq!(parse_command(raw), Command::Unknown(raw.into()), "{raw}");
        }
    }
}
