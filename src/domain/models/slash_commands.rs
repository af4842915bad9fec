#[cfg(test)]
#[path = "slash_commands_test.rs"]
mod tests;

pub struct SlashCommand {
    command: String,
    pub args: Vec<String>,
}

impl SlashCommand {
    pub fn parse(text: &str) -> Option<SlashCommand> {
        let mut args = text
            .trim()
            .split(' ')
            .filter(|e| return !e.is_empty())
            .map(|e| return e.to_string())
            .collect::<Vec<String>>();
        if args.is_empty() {
            return None;
        }

        let prefix = args[0].to_string();
        args.remove(0);

        let cmd = SlashCommand {
            command: prefix,
            args,
        };
        if cmd.is_quit() || cmd.is_help() || cmd.is_clear() || cmd.is_history() || cmd.is_image()
        {
            return Some(cmd);
        }

        return None;
    }

    pub fn is_quit(&self) -> bool {
        return ["/q", "/quit", "/exit"].contains(&self.command.as_str());
    }

    pub fn is_help(&self) -> bool {
        return ["/h", "/help"].contains(&self.command.as_str());
    }

    pub fn is_clear(&self) -> bool {
        return ["/c", "/clear"].contains(&self.command.as_str());
    }

    pub fn is_history(&self) -> bool {
        return ["/history"].contains(&self.command.as_str());
    }

    /// `/image PATH [caption...]`
    pub fn is_image(&self) -> bool {
        return ["/i", "/image"].contains(&self.command.as_str()) && !self.args.is_empty();
    }

    /// Image reference and caption of an `/image` command.
    pub fn image_args(&self) -> Option<(String, String)> {
        if !self.is_image() {
            return None;
        }

        return Some((self.args[0].to_string(), self.args[1..].join(" ")));
    }
}
