#[cfg(test)]
#[path = "repl_test.rs"]
mod tests;

use anyhow::Result;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use yansi::Paint;

use crate::domain::models::ImagePayload;
use crate::domain::models::Message;
use crate::domain::models::Role;
use crate::domain::models::SlashCommand;
use crate::domain::services::ChatSession;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /image (/i) [PATH] [CAPTION?] - Attaches an image file or data URI. With a caption it is sent right away, otherwise it goes along with your next message.
- /history - Prints the whole conversation.
- /clear (/c) - Deletes the conversation, both here and on disk.
- /quit /exit (/q) - Exit PocketChat.
- /help (/h) - Provides this help menu.
    "#;

    return text.trim().to_string();
}

/// What a line typed at the prompt asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplAction {
    Quit,
    Help,
    Clear,
    History,
    /// Image stored for the next turn.
    Attached(String),
    Send {
        text: String,
        image: Option<ImagePayload>,
    },
    Nothing,
}

/// Interprets one line. An image attached by an earlier `/image` is consumed
/// by the next send.
pub fn interpret(line: &str, pending_image: &mut Option<ImagePayload>) -> ReplAction {
    if let Some(cmd) = SlashCommand::parse(line) {
        if cmd.is_quit() {
            return ReplAction::Quit;
        }
        if cmd.is_help() {
            return ReplAction::Help;
        }
        if cmd.is_clear() {
            *pending_image = None;
            return ReplAction::Clear;
        }
        if cmd.is_history() {
            return ReplAction::History;
        }
        if let Some((reference, caption)) = cmd.image_args() {
            let image = ImagePayload::new(&reference);
            if caption.is_empty() {
                *pending_image = Some(image);
                return ReplAction::Attached(reference);
            }

            *pending_image = None;
            return ReplAction::Send {
                text: caption,
                image: Some(image),
            };
        }
    }

    if line.trim().is_empty() && pending_image.is_none() {
        return ReplAction::Nothing;
    }

    return ReplAction::Send {
        text: line.trim().to_string(),
        image: pending_image.take(),
    };
}

pub fn format_message(message: &Message) -> String {
    let author = match message.role {
        Role::User => "You",
        Role::Assistant => "Assistant",
        Role::System => "System",
    };

    let mut res = format!("{author}: {}", message.content);
    if let Some(image_ref) = &message.image_ref {
        if image_ref.starts_with("data:") {
            res = format!("{res}\n[image attached]");
        } else {
            res = format!("{res}\n[image: {image_ref}]");
        }
    }

    return res;
}

fn paint_message(message: &Message) -> String {
    let text = format_message(message);
    if message.is_error() {
        return Paint::red(text).to_string();
    }
    if message.role == Role::User {
        return Paint::cyan(text).to_string();
    }

    return text;
}

fn print_log(session: &ChatSession) {
    for message in session.log().messages() {
        println!("{}\n", paint_message(message));
    }
}

async fn print_prompt(stdout: &mut tokio::io::Stdout, pending_image: bool) -> Result<()> {
    let prompt = if pending_image { "[image] > " } else { "> " };
    stdout
        .write_all(Paint::green(prompt).bold().to_string().as_bytes())
        .await?;
    stdout.flush().await?;

    return Ok(());
}

/// Reads lines from stdin and drives the session until `/quit` or EOF.
pub async fn start(mut session: ChatSession) -> Result<()> {
    let transport = session.client().transport();
    if let Err(err) = transport.health_check().await {
        tracing::warn!(error = ?err, transport = %transport.name(), "Health check failed");
        println!(
            "{}",
            Paint::yellow(format!(
                "Warning: the {} transport is not healthy, messages may fail. {err}",
                transport.name()
            ))
        );
    }

    print_log(&session);
    println!(
        "{}",
        Paint::new("Type a message, or /help for commands.").dimmed()
    );

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending_image: Option<ImagePayload> = None;

    loop {
        print_prompt(&mut stdout, pending_image.is_some()).await?;
        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };

        match interpret(&line, &mut pending_image) {
            ReplAction::Quit => break,
            ReplAction::Help => println!("{}\n", help_text()),
            ReplAction::History => print_log(&session),
            ReplAction::Clear => {
                if session.clear().await {
                    println!("{}\n", Paint::new("Conversation cleared.").dimmed());
                }
            }
            ReplAction::Attached(reference) => {
                println!(
                    "{}\n",
                    Paint::new(format!(
                        "Attached {reference}. Type a caption, or press enter to send it as is."
                    ))
                    .dimmed()
                );
            }
            ReplAction::Send { text, image } => {
                println!("{}", Paint::new("...").dimmed());
                if let Some(reply) = session.send(&text, image).await {
                    println!("{}\n", paint_message(&reply));
                }
            }
            ReplAction::Nothing => continue,
        }
    }

    return Ok(());
}
