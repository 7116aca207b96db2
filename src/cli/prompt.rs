use clap::{Parser, Subcommand, error::ErrorKind};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::scheduling::{ManagerRequest, ManagerSender};

use super::{EditCommand, render};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct PromptLine {
    #[command(subcommand)]
    command: PromptCommand,
}

#[derive(Subcommand, Debug)]
enum PromptCommand {
    /// Stop watching reminders
    #[command(alias = "exit")]
    Quit,
    #[command(flatten)]
    Edit(EditCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptExit {
    Quit,
    EndOfInput,
}

/// Reads commands until `quit` or end of input.
pub async fn run<R>(input: R, sender: &ManagerSender) -> anyhow::Result<PromptExit>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    println!("Watching reminders. Type 'help' for commands, 'quit' to stop.");

    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let command = match PromptLine::try_parse_from(words) {
            Ok(PromptLine { command: PromptCommand::Quit }) => return Ok(PromptExit::Quit),
            Ok(PromptLine { command: PromptCommand::Edit(command) }) => command,
            Err(error) => {
                if matches!(error.kind(), ErrorKind::DisplayHelp) {
                    println!("{error}");
                } else {
                    eprintln!("{error}");
                }
                continue;
            }
        };

        match submit(sender, command).await {
            Ok(text) => println!("{text}"),
            Err(error) => eprintln!("{error:#}"),
        }
    }

    Ok(PromptExit::EndOfInput)
}

async fn submit(sender: &ManagerSender, command: EditCommand) -> anyhow::Result<String> {
    let request = ManagerRequest::try_from(command)?;
    let response = sender.send(request).await?;
    Ok(render::response_text(&response))
}
