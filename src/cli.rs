use std::path::PathBuf;

use crate::config::parse_user_id;

pub const USAGE: &str = "\
usage: activity-listing [--user ID]
       activity-listing render [ATTRIBUTES.json | -] [--user ID]

Without a command, opens the live preview with its settings panel.
`render` fetches once and prints the block's HTML to stdout.";

#[derive(Debug, PartialEq, Eq)]
pub enum Attributes {
    Defaults,
    Stdin,
    File(PathBuf),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Preview,
    Render(Attributes),
    Help,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    pub user: Option<u64>,
}

pub fn parse_args<I>(argv: I) -> Result<Args, String>
where
    I: IntoIterator<Item = String>,
{
    let mut user = None;
    let mut rest = Vec::new();
    let mut argv = argv.into_iter().skip(1);
    while let Some(arg) = argv.next() {
        if arg == "--user" {
            let raw = argv.next().ok_or("--user needs a value")?;
            user = Some(parse_user_id(&raw).map_err(|err| err.to_string())?);
        } else if let Some(raw) = arg.strip_prefix("--user=") {
            user = Some(parse_user_id(raw).map_err(|err| err.to_string())?);
        } else {
            rest.push(arg);
        }
    }

    let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
    let command = match rest.as_slice() {
        [] => Command::Preview,
        ["-h" | "--help" | "help"] => Command::Help,
        ["render"] => Command::Render(Attributes::Defaults),
        ["render", "-"] => Command::Render(Attributes::Stdin),
        ["render", path] => Command::Render(Attributes::File(PathBuf::from(path))),
        _ => return Err("arguments don't match the pattern".to_owned()),
    };
    Ok(Args { command, user })
}
