//! Executes parsed commands against the backend and prints the results.

use anyhow::{Context, Result, bail};
use std::io::{self, Write};
use taskpilot::{
    TaskPilotClient,
    models::{ChatId, ChatStreamEvent, LoginRequest, NewMessage, RegisterRequest, TaskFilter},
};

use crate::commands::{Command, USAGE};

/// Run one command to completion.
pub async fn execute(client: &TaskPilotClient, command: Command) -> Result<()> {
    match command {
        Command::Help => print!("{USAGE}"),
        Command::Login { email, password } => {
            let user = client
                .auth()
                .login(&LoginRequest { email, password })
                .await
                .context("Login failed")?;
            println!("Logged in as {}", user.display_name());
        }
        Command::Register {
            email,
            username,
            password,
        } => {
            let user = client
                .auth()
                .register(&RegisterRequest {
                    email,
                    username,
                    password,
                    full_name: None,
                })
                .await
                .context("Registration failed")?;
            println!("Registered and logged in as {}", user.display_name());
        }
        Command::Logout => {
            client.auth().logout().await;
            println!("Logged out");
        }
        Command::WhoAmI => {
            require_session(client)?;
            let user = client.auth().me().await.context("Failed to load profile")?;
            println!("{} <{}> (id {})", user.display_name(), user.email, user.id);
        }
        Command::Projects => {
            require_session(client)?;
            let projects = client
                .projects()
                .list()
                .await
                .context("Failed to list projects")?;
            if projects.is_empty() {
                println!("No projects");
            }
            for project in projects {
                println!("  {:>4}  {}", project.id, project.name);
            }
        }
        Command::Tasks { project_id } => {
            require_session(client)?;
            let filter = project_id.map(TaskFilter::for_project).unwrap_or_default();
            let tasks = client
                .tasks()
                .list(&filter)
                .await
                .context("Failed to list tasks")?;
            if tasks.is_empty() {
                println!("No tasks");
            }
            for task in tasks {
                println!("  {:>4}  [{:<11}]  {}", task.id, task.status.as_str(), task.title);
            }
        }
        Command::Chats => {
            require_session(client)?;
            let chats = client.chats().list().await.context("Failed to list chats")?;
            if chats.is_empty() {
                println!("No chats");
            }
            for chat in chats {
                println!("  {:>4}  {}", chat.id, chat.title);
            }
        }
        Command::Chat { chat_id, message } => {
            require_session(client)?;
            stream_chat(client, chat_id, message).await?;
        }
        Command::Notifications => {
            require_session(client)?;
            watch_notifications(client).await?;
        }
    }

    Ok(())
}

fn require_session(client: &TaskPilotClient) -> Result<()> {
    if client.store().access_token().is_none() {
        bail!("Not logged in. Use 'login <email> <password>' first");
    }
    Ok(())
}

/// Send a message over the chat stream and print the reply as it arrives.
async fn stream_chat(client: &TaskPilotClient, chat_id: ChatId, message: String) -> Result<()> {
    let mut channel = client
        .channels()
        .connect_chat(chat_id)
        .await
        .context("Failed to open chat stream")?;
    channel.send(&NewMessage::new(message)).await?;

    let mut stdout = io::stdout();
    while let Some(event) = channel.next_event().await {
        match event {
            Ok(ChatStreamEvent::Token { content }) => {
                write!(stdout, "{content}")?;
                stdout.flush()?;
            }
            Ok(ChatStreamEvent::MessageComplete { .. }) => {
                writeln!(stdout)?;
                break;
            }
            Ok(ChatStreamEvent::Error { message }) => {
                writeln!(stdout)?;
                bail!("Assistant failed: {message}");
            }
            Err(e) => tracing::warn!(error = %e, "Skipping unreadable chat frame"),
        }
    }

    channel.close().await?;
    Ok(())
}

/// Print pushed notifications until the server closes the channel or Ctrl+C.
async fn watch_notifications(client: &TaskPilotClient) -> Result<()> {
    let user_id = match client.store().user() {
        Some(user) => user.id,
        None => client.auth().me().await.context("Failed to load profile")?.id,
    };

    let unread = client.notifications().unread_count().await?;
    println!("{unread} unread. Waiting for notifications (Ctrl+C to stop)...");

    let mut channel = client
        .channels()
        .connect_notifications(user_id)
        .await
        .context("Failed to open notification stream")?;

    loop {
        tokio::select! {
            event = channel.next_event() => match event {
                Some(Ok(notification)) => match notification.message {
                    Some(message) => println!("* {}: {}", notification.title, message),
                    None => println!("* {}", notification.title),
                },
                Some(Err(e)) => tracing::warn!(error = %e, "Skipping unreadable notification"),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    channel.close().await?;
    Ok(())
}
