//! Administrative slash commands — parsing and execution.
//!
//! Commands arrive as text on the primary channel. Arguments that may
//! contain spaces are double-quoted; times are `HH:MM`.

use super::{Gateway, SECONDARY_CHANNEL};
use parrot_core::{error::ParrotError, message::OutgoingMessage, phone};
use parrot_store::Schedule;
use std::time::Duration;

/// Known administrative commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Command {
    Rules,
    AddRule {
        trigger: String,
        reply: String,
    },
    EditRule {
        trigger: String,
        reply: String,
    },
    DelRule {
        trigger: String,
    },
    AddContact {
        number: String,
    },
    Contacts,
    DelContact {
        number: String,
    },
    Send {
        number: String,
        message: String,
    },
    Schedule {
        number: String,
        message: String,
        hour: u8,
        minute: u8,
    },
    Schedules,
    CancelSchedule {
        number: String,
        hour: u8,
        minute: u8,
    },
    Status,
    Help,
}

impl Command {
    /// Parse a command from message text.
    ///
    /// Returns `None` for anything that is not a known `/` command (plain
    /// text passes through to the matcher), and `Some(Err(..))` for a known
    /// command with malformed arguments.
    pub(super) fn parse(text: &str) -> Option<Result<Self, ParrotError>> {
        let trimmed = text.trim();
        let first = trimmed.split_whitespace().next()?;
        if !first.starts_with('/') {
            return None;
        }
        // Strip @botname suffix (e.g. "/rules@parrot_bot" → "/rules").
        let cmd = first.split('@').next().unwrap_or(first);
        let rest = trimmed[first.len()..].trim();

        match cmd {
            "/rules" => Some(Ok(Self::Rules)),
            "/contacts" => Some(Ok(Self::Contacts)),
            "/schedules" => Some(Ok(Self::Schedules)),
            "/status" => Some(Ok(Self::Status)),
            "/help" => Some(Ok(Self::Help)),
            "/addrule" => Some(parse_two(rest, "/addrule \"trigger\" \"reply\"").map(
                |(trigger, reply)| Self::AddRule { trigger, reply },
            )),
            "/editrule" => Some(parse_two(rest, "/editrule \"trigger\" \"new reply\"").map(
                |(trigger, reply)| Self::EditRule { trigger, reply },
            )),
            "/delrule" => Some(
                parse_one(rest, "/delrule \"trigger\"").map(|trigger| Self::DelRule { trigger }),
            ),
            "/addcontact" => Some(
                parse_one(rest, "/addcontact <number>").map(|number| Self::AddContact { number }),
            ),
            "/delcontact" => Some(
                parse_one(rest, "/delcontact <number>").map(|number| Self::DelContact { number }),
            ),
            "/send" => Some(
                parse_two(rest, "/send <number> \"message\"")
                    .map(|(number, message)| Self::Send { number, message }),
            ),
            "/schedule" => Some(parse_schedule(rest)),
            "/cancelschedule" => Some(parse_cancel_schedule(rest)),
            _ => None,
        }
    }
}

/// Split command arguments, honoring double quotes.
fn split_args(input: &str) -> Result<Vec<String>, ParrotError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err(ParrotError::Validation("unterminated quote".to_string()));
    }
    if has_token {
        args.push(current);
    }
    Ok(args)
}

fn parse_one(rest: &str, usage: &str) -> Result<String, ParrotError> {
    let mut args = split_args(rest)?;
    if args.len() != 1 || args[0].is_empty() {
        return Err(ParrotError::Validation(format!("usage: {usage}")));
    }
    Ok(args.remove(0))
}

fn parse_two(rest: &str, usage: &str) -> Result<(String, String), ParrotError> {
    let mut args = split_args(rest)?;
    if args.len() != 2 {
        return Err(ParrotError::Validation(format!("usage: {usage}")));
    }
    let second = args.remove(1);
    let first = args.remove(0);
    Ok((first, second))
}

fn parse_schedule(rest: &str) -> Result<Command, ParrotError> {
    const USAGE: &str = "usage: /schedule <number> \"message\" HH:MM";
    let mut args = split_args(rest)?;
    if args.len() != 3 {
        return Err(ParrotError::Validation(USAGE.to_string()));
    }
    let (hour, minute) = parse_hhmm(&args[2])?;
    let message = args.remove(1);
    let number = args.remove(0);
    Ok(Command::Schedule {
        number,
        message,
        hour,
        minute,
    })
}

fn parse_cancel_schedule(rest: &str) -> Result<Command, ParrotError> {
    const USAGE: &str = "usage: /cancelschedule <number> HH:MM";
    let mut args = split_args(rest)?;
    if args.len() != 2 {
        return Err(ParrotError::Validation(USAGE.to_string()));
    }
    let (hour, minute) = parse_hhmm(&args[1])?;
    let number = args.remove(0);
    Ok(Command::CancelSchedule {
        number,
        hour,
        minute,
    })
}

/// Parse a `HH:MM` time-of-day.
fn parse_hhmm(s: &str) -> Result<(u8, u8), ParrotError> {
    let invalid = || ParrotError::Validation(format!("invalid time '{s}', expected HH:MM"));
    let (h, m) = s.split_once(':').ok_or_else(invalid)?;
    let hour: u8 = h.parse().map_err(|_| invalid())?;
    let minute: u8 = m.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

/// Convert an error into the reply shown to the requester.
pub(super) fn user_message(err: &ParrotError, deny_message: &str) -> String {
    match err {
        ParrotError::Unauthorized => deny_message.to_string(),
        ParrotError::Store(_) => "Storage failure, nothing was changed. Please try again.".to_string(),
        other => other.to_string(),
    }
}

impl Gateway {
    /// Execute a parsed command and produce the reply text.
    pub(super) async fn handle_command(&self, cmd: Command) -> String {
        match self.execute_command(cmd).await {
            Ok(reply) => reply,
            Err(e) => user_message(&e, &self.auth.deny_message),
        }
    }

    async fn execute_command(&self, cmd: Command) -> Result<String, ParrotError> {
        match cmd {
            Command::Rules => {
                let rules = self.store.list_rules().await?;
                Ok(format_rules(&rules))
            }
            Command::AddRule { trigger, reply } => {
                self.store.upsert_rule(&trigger, &reply).await?;
                Ok(format!(
                    "Rule saved: \"{}\" -> \"{reply}\"",
                    trigger.trim().to_lowercase()
                ))
            }
            Command::EditRule { trigger, reply } => {
                let key = trigger.trim().to_lowercase();
                if self.store.get_reply(&key).await?.is_none() {
                    return Err(ParrotError::NotFound(format!("rule \"{key}\"")));
                }
                self.store.upsert_rule(&key, &reply).await?;
                Ok(format!("Rule updated: \"{key}\" -> \"{reply}\""))
            }
            Command::DelRule { trigger } => {
                let key = trigger.trim().to_lowercase();
                if self.store.remove_rule(&key).await? {
                    Ok(format!("Rule \"{key}\" deleted."))
                } else {
                    Err(ParrotError::NotFound(format!("rule \"{key}\"")))
                }
            }
            Command::AddContact { number } => {
                let contact = phone::normalize_contact(&number, &self.reply.country_code)?;
                self.store.add_contact(&contact).await?;
                Ok(format!("Contact {contact} added to the allow-list."))
            }
            Command::Contacts => {
                let contacts = self.store.list_contacts().await?;
                Ok(format_contacts(&contacts))
            }
            Command::DelContact { number } => {
                let contact = phone::normalize_contact(&number, &self.reply.country_code)?;
                if self.store.remove_contact(&contact).await? {
                    Ok(format!("Contact {contact} removed from the allow-list."))
                } else {
                    Err(ParrotError::NotFound(format!("contact {contact}")))
                }
            }
            Command::Send { number, message } => {
                let contact = phone::normalize_contact(&number, &self.reply.country_code)?;
                let channel = self
                    .channels
                    .get(SECONDARY_CHANNEL)
                    .ok_or_else(|| ParrotError::Channel("whatsapp channel not enabled".into()))?;
                if !channel.is_ready().await {
                    return Err(ParrotError::Channel("whatsapp not connected".into()));
                }
                let msg = OutgoingMessage::to_target(contact.clone(), message);
                tokio::time::timeout(self.send_timeout(), channel.send(msg))
                    .await
                    .map_err(|_| ParrotError::Channel("send timed out".into()))??;
                Ok(format!("Sent to {contact}."))
            }
            Command::Schedule {
                number,
                message,
                hour,
                minute,
            } => {
                let contact = phone::normalize_contact(&number, &self.reply.country_code)?;
                let schedule = self.scheduler.create(&contact, &message, hour, minute).await?;
                Ok(format!(
                    "Scheduled daily at {:02}:{:02} to {}: \"{}\"",
                    schedule.hour, schedule.minute, schedule.contact_id, schedule.message
                ))
            }
            Command::Schedules => {
                let schedules = self.store.list_schedules().await?;
                Ok(format_schedules(&schedules))
            }
            Command::CancelSchedule {
                number,
                hour,
                minute,
            } => {
                let contact = phone::normalize_contact(&number, &self.reply.country_code)?;
                self.scheduler.cancel(&contact, hour, minute).await?;
                Ok(format!(
                    "Schedule for {contact} at {hour:02}:{minute:02} cancelled."
                ))
            }
            Command::Status => self.status_text().await,
            Command::Help => Ok(help_text()),
        }
    }

    async fn status_text(&self) -> Result<String, ParrotError> {
        let rules = self.store.list_rules().await?.len();
        let contacts = self.store.list_contacts().await?.len();
        let schedules = self.store.list_schedules().await?.len();
        let timers = self.scheduler.timer_count().await;

        let mut lines = vec!["Parrot status".to_string()];
        for (name, channel) in &self.channels {
            lines.push(format!(
                "  {name}: {}",
                if channel.is_ready().await {
                    "ready"
                } else {
                    "not ready"
                }
            ));
        }
        lines.push(format!(
            "  rules: {rules} | contacts: {contacts} | schedules: {schedules} (timers: {timers})"
        ));
        Ok(lines.join("\n"))
    }

    pub(super) fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.reply.send_timeout_secs)
    }
}

fn format_rules(rules: &[(String, String)]) -> String {
    if rules.is_empty() {
        return "No rules yet. Add one with /addrule \"trigger\" \"reply\".".to_string();
    }
    let mut lines = vec![format!("Rules ({}):", rules.len())];
    for (i, (trigger, reply)) in rules.iter().enumerate() {
        lines.push(format!("{}. \"{trigger}\" -> \"{reply}\"", i + 1));
    }
    lines.join("\n")
}

fn format_contacts(contacts: &[String]) -> String {
    if contacts.is_empty() {
        return "Allow-list is empty. Add a contact with /addcontact <number>.".to_string();
    }
    let mut lines = vec![format!("Allowed contacts ({}):", contacts.len())];
    for (i, contact) in contacts.iter().enumerate() {
        lines.push(format!("{}. {contact}", i + 1));
    }
    lines.join("\n")
}

fn format_schedules(schedules: &[Schedule]) -> String {
    if schedules.is_empty() {
        return "No schedules. Add one with /schedule <number> \"message\" HH:MM.".to_string();
    }
    let mut lines = vec![format!("Schedules ({}):", schedules.len())];
    for (i, s) in schedules.iter().enumerate() {
        lines.push(format!(
            "{}. {} at {:02}:{:02}: \"{}\"",
            i + 1,
            s.contact_id,
            s.hour,
            s.minute,
            s.message
        ));
    }
    lines.join("\n")
}

fn help_text() -> String {
    [
        "Commands:",
        "/rules - list auto-reply rules",
        "/addrule \"trigger\" \"reply\" - add or overwrite a rule",
        "/editrule \"trigger\" \"new reply\" - change an existing rule",
        "/delrule \"trigger\" - delete a rule",
        "/contacts - list allowed contacts",
        "/addcontact <number> - allow a contact",
        "/delcontact <number> - remove a contact",
        "/send <number> \"message\" - send now via WhatsApp",
        "/schedule <number> \"message\" HH:MM - daily send",
        "/schedules - list schedules",
        "/cancelschedule <number> HH:MM - cancel a schedule",
        "/status - relay health",
    ]
    .join("\n")
}
