use std::io::{self, BufRead, Write};

use log::info;

use super::ScriptedPlatform;
use crate::bot::{COMMANDS, ChessBot, Command, CommandEvent};
use crate::config::Config;
use crate::session::GameSession;

/// Runs an interactive terminal chat for playing through the bot's commands.
///
/// Each line is `<user> <command>`, e.g. `alice /start_chess @bob`. Users are
/// registered on first mention; `addbot <name>` registers an automated one.
pub fn run_interactive_terminal(config: &Config) {
    let mut platform = ScriptedPlatform::new();
    platform.add_user("chessbot", true);
    let mut bot = ChessBot::new(platform, GameSession::shared(), config.render_dir.clone());

    println!("♟️  Chess bot ({})", config.status);
    print_help();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        if let Err(e) = io::stdout().flush() {
            eprintln!("Failed to flush stdout: {}", e);
            break;
        }

        let input = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("Failed to read input: {}", e);
                break;
            }
            None => break,
        };

        let parts: Vec<&str> = input.split_whitespace().collect();
        match parts.as_slice() {
            [] => continue,
            ["q"] => break,
            ["help"] => print_help(),
            ["users"] => {
                for user in bot.platform().users() {
                    let kind = if user.bot { " (bot)" } else { "" };
                    println!("  {} {}{}", user.id, user.name, kind);
                }
            }
            ["addbot", name] => {
                let id = bot.platform_mut().add_user(name, true);
                println!("Registered bot {name} as {id}");
            }
            ["board"] => match GameSession::lock(bot.session()).board() {
                Some(board) => println!("{board}"),
                None => println!("No game in progress."),
            },
            [name, rest @ ..] => {
                let user = bot.platform_mut().user_id(name);
                let text = substitute_mentions(bot.platform_mut(), rest);
                match Command::parse(&text) {
                    Ok(command) => {
                        let reply = bot.handle(&CommandEvent { user, command });
                        println!("[reply to {name}] {reply}");
                        for message in bot.platform_mut().take_sent() {
                            println!("[channel] {}", message.content);
                            if let Some(attachment) = message.attachment {
                                println!(
                                    "[attachment] {} ({}, {} bytes)",
                                    attachment.name,
                                    attachment.content_type,
                                    attachment.bytes.len()
                                );
                            }
                        }
                    }
                    Err(e) => println!("Invalid command: {e}"),
                }
            }
        }
    }
    info!("terminal session closed");
}

/// Replace `@name` words with platform mentions.
fn substitute_mentions(platform: &mut ScriptedPlatform, words: &[&str]) -> String {
    words
        .iter()
        .map(|word| match word.strip_prefix('@') {
            Some(name) if !name.is_empty() => platform.user_id(name).to_string(),
            _ => word.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_help() {
    println!();
    println!("Commands: <user> /<command> [options] | users | addbot <name> | board | help | q (quit)");
    for command in COMMANDS {
        let options: String = command
            .options
            .iter()
            .map(|option| format!(" <{}>", option.name))
            .collect();
        println!("  /{}{options}: {}", command.name, command.description);
    }
    println!();
}
