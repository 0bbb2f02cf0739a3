#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! CLI for a form-driven webmail server

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;
use webmail_client::{
    Answer, AssumeYes, AttachmentRecord, Confirm, CredentialSource, Credentials, Mailbox,
    MessageRef, NoRefresh, OutgoingMail, StaticCredentials, WebmailClient, WebmailConfig,
};

#[derive(Parser)]
#[command(name = "webmail-cli")]
#[command(about = "CLI for a form-driven webmail server")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a fresh message id
    MessageId,

    /// List attachments of a message that can be forwarded
    Attachments {
        /// Mailbox containing the message
        mailbox: String,

        /// Message UID
        uid: u32,

        /// MIME part of the message text
        #[arg(long, default_value = "1")]
        part: String,
    },

    /// Send a message or save it as a draft
    Send {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        #[arg(long, default_value = "")]
        subject: String,

        /// Plain-text body
        #[arg(long, default_value = "")]
        text: String,

        /// HTML body (defaults to the plain-text body)
        #[arg(long)]
        html: Option<String>,

        /// UUID of an uploaded attachment (repeatable)
        #[arg(long = "attachment")]
        attachments: Vec<String>,

        /// Part string of an attachment to carry over (repeatable)
        #[arg(long = "prev-attachment")]
        prev_attachments: Vec<String>,

        /// Save as draft instead of sending
        #[arg(long)]
        draft: bool,

        /// Reply to MAILBOX/UID
        #[arg(long)]
        reply_to: Option<MessageRef>,

        /// Forward MAILBOX/UID
        #[arg(long)]
        forward: Option<MessageRef>,
    },

    /// Delete messages
    Delete {
        mailbox: String,

        #[arg(required = true)]
        uids: Vec<u32>,

        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Mark messages as read
    MarkRead {
        mailbox: String,

        #[arg(required = true)]
        uids: Vec<u32>,

        /// Mark as unread instead
        #[arg(long)]
        unread: bool,
    },

    /// Move messages to another mailbox
    Move {
        /// Mailbox the messages are in
        from: String,

        /// Destination mailbox
        to: String,

        #[arg(required = true)]
        uids: Vec<u32>,
    },

    /// Create a mailbox
    CreateMailbox { name: String },

    /// Read or replace user settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the current settings
    Get,

    /// Replace the settings with a JSON document
    Set {
        #[arg(id = "document", value_name = "JSON")]
        json: String,
    },
}

/// Reads credentials and confirmations from stdin, prompting on stderr.
struct Terminal {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl Terminal {
    fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    async fn ask(&self, prompt: &str) -> Option<String> {
        eprint!("{prompt}");
        std::io::stderr().flush().ok();
        self.lines.lock().await.next_line().await.ok().flatten()
    }
}

#[async_trait]
impl CredentialSource for Terminal {
    async fn credentials(&self, attempt: usize) -> Credentials {
        if attempt > 0 {
            eprintln!("Login failed, try again.");
        }
        let Some(username) = self.ask("Username: ").await else {
            return futures::future::pending().await;
        };
        let Some(password) = self.ask("Password: ").await else {
            return futures::future::pending().await;
        };
        Credentials::new(username.trim(), password)
    }
}

#[async_trait]
impl Confirm for Terminal {
    async fn show_yes_no(&self, title: &str, message: &str, destructive: bool) -> Answer {
        let hint = if destructive { "[y/N]" } else { "[Y/n]" };
        let Some(reply) = self.ask(&format!("{title}: {message} {hint} ")).await else {
            return Answer::Dismissed;
        };
        match reply.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Answer::Yes,
            "" if !destructive => Answer::Yes,
            _ => Answer::No,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = WebmailConfig::from_env()?;
    let terminal = Arc::new(Terminal::new());

    let credentials: Arc<dyn CredentialSource> = match config.credentials() {
        Some((username, password)) => Arc::new(StaticCredentials::new(Credentials::new(
            username, password,
        ))),
        None => terminal.clone(),
    };
    let client = WebmailClient::new(&config, credentials, Arc::new(NoRefresh))?;

    match &args.command {
        Command::MessageId => cmd_message_id(&client, &args).await?,
        Command::Attachments { mailbox, uid, part } => {
            cmd_attachments(&client, &args, mailbox, *uid, part).await?;
        }
        Command::Send {
            from,
            to,
            subject,
            text,
            html,
            attachments,
            prev_attachments,
            draft,
            reply_to,
            forward,
        } => {
            let mail = OutgoingMail {
                from: from.clone(),
                to: to.clone(),
                subject: subject.clone(),
                text: text.clone(),
                html: html.clone().unwrap_or_else(|| text.clone()),
                attachment_uuids: attachments.clone(),
                prev_attachments: prev_attachments.clone(),
                save_as_draft: *draft,
                reply_to: reply_to.clone(),
                forward_of: forward.clone(),
            };
            let ok = client.send_mail(&mail).await?;
            report(ok, if *draft { "Draft saved" } else { "Message sent" })?;
        }
        Command::Delete { mailbox, uids, yes } => {
            let confirm: &dyn Confirm = if *yes { &AssumeYes } else { terminal.as_ref() };
            let ok = client
                .remove_mail(uids, &Mailbox::from(mailbox.as_str()), confirm)
                .await?;
            report(ok, &format!("Deleted {} message(s)", uids.len()))?;
        }
        Command::MarkRead {
            mailbox,
            uids,
            unread,
        } => {
            let ok = client
                .mark_read(uids, &Mailbox::from(mailbox.as_str()), !*unread)
                .await?;
            let state = if *unread { "unread" } else { "read" };
            report(ok, &format!("Marked {} message(s) {state}", uids.len()))?;
        }
        Command::Move { from, to, uids } => {
            let target = Mailbox::from(to.as_str());
            let ok = client
                .move_to_mailbox(uids, &Mailbox::from(from.as_str()), &target)
                .await?;
            let name = target.display_name();
            report(ok, &format!("Moved {} message(s) to {name}", uids.len()))?;
        }
        Command::CreateMailbox { name } => {
            let ok = client.create_mailbox(name).await?;
            report(ok, &format!("Created mailbox {name}"))?;
        }
        Command::Settings { action } => cmd_settings(&client, action).await?,
    }

    Ok(())
}

fn report(ok: bool, success: &str) -> anyhow::Result<()> {
    if !ok {
        anyhow::bail!("The server did not confirm the operation");
    }
    println!("{success}");
    Ok(())
}

async fn cmd_message_id(client: &WebmailClient, args: &Args) -> anyhow::Result<()> {
    let Some(id) = client.generate_message_id().await? else {
        anyhow::bail!("The server did not return a message id");
    };

    if args.json {
        println!("{}", serde_json::to_string(&id)?);
    } else {
        println!("{id}");
    }
    Ok(())
}

async fn cmd_attachments(
    client: &WebmailClient,
    args: &Args,
    mailbox: &str,
    uid: u32,
    part: &str,
) -> anyhow::Result<()> {
    let records = client
        .previous_attachments(&Mailbox::from(mailbox), uid, part)
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print_attachment_table(&records);
    }
    Ok(())
}

async fn cmd_settings(client: &WebmailClient, action: &SettingsAction) -> anyhow::Result<()> {
    match action {
        SettingsAction::Get => {
            let settings = client.settings().await?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Set { json } => {
            let value: serde_json::Value = serde_json::from_str(json)?;
            let ok = client.set_settings(&value).await?;
            report(ok, "Settings saved")?;
        }
    }
    Ok(())
}

fn print_attachment_table(records: &[AttachmentRecord]) {
    if records.is_empty() {
        println!("No attachments.");
        return;
    }

    println!("{:<12} Name", "Part");
    println!("{}", "-".repeat(40));
    for record in records {
        println!(
            "{:<12} {}",
            record.part_string,
            record.name.as_deref().unwrap_or("-")
        );
    }
    println!("\n{} attachment(s)", records.len());
}
