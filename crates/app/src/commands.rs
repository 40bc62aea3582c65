//! Console command handlers
//!
//! One line per command; each handler maps onto an engine operation and
//! returns the text to print.

use crate::state::AppState;
use anyhow::{bail, Context, Result};
use ascend_core::{AccountStore, CharacterClass, GiftDraft, GiftId, GiftPatch, GiftStatus, Rarity};
use ascend_engine::MysteryOutcome;
use std::fmt::Write as _;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Status,
    Xp(u64),
    Streak,
    Gifts,
    AddGift {
        level_required: u32,
        rarity: Rarity,
        name: String,
    },
    Claim(GiftId),
    SetStatus(GiftId, GiftStatus),
    Delete(GiftId),
    Mystery,
    Create(CharacterClass),
    Reset,
    Flush,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  status                              character, streak and sync phase
  xp <amount>                         grant experience
  streak                              claim today's streak
  gifts                               list gifts
  add <level> <rarity> <name...>      create a locked gift
  claim <gift-id>                     use an unlocked gift
  set-status <gift-id> <status>       override a gift's status
  delete <gift-id>                    delete a gift
  mystery                             open a mystery reward
  create <class>                      create the character (warrior|mage|ranger|healer)
  reset                               reset level and experience
  flush                               save pending progression now
  quit";

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            bail!("empty command");
        };

        let command = match verb {
            "status" => Command::Status,
            "xp" => {
                let raw = parts.next().context("usage: xp <amount>")?;
                Command::Xp(raw.parse().with_context(|| format!("invalid amount '{}'", raw))?)
            }
            "streak" => Command::Streak,
            "gifts" => Command::Gifts,
            "add" => {
                let level = parts.next().context("usage: add <level> <rarity> <name>")?;
                let rarity = parts.next().context("usage: add <level> <rarity> <name>")?;
                let name = parts.collect::<Vec<_>>().join(" ");
                if name.is_empty() {
                    bail!("gift name is required");
                }
                Command::AddGift {
                    level_required: level
                        .parse()
                        .with_context(|| format!("invalid level '{}'", level))?,
                    rarity: rarity.parse()?,
                    name,
                }
            }
            "claim" => Command::Claim(gift_id(parts.next())?),
            "set-status" => {
                let id = gift_id(parts.next())?;
                let status = parts.next().context("usage: set-status <gift-id> <status>")?;
                Command::SetStatus(id, status.parse()?)
            }
            "delete" => Command::Delete(gift_id(parts.next())?),
            "mystery" => Command::Mystery,
            "create" => Command::Create(
                parts
                    .next()
                    .context("usage: create <class>")?
                    .parse()?,
            ),
            "reset" => Command::Reset,
            "flush" => Command::Flush,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => bail!("unknown command '{}' (try 'help')", other),
        };
        Ok(command)
    }
}

fn gift_id(raw: Option<&str>) -> Result<GiftId> {
    raw.map(GiftId::new).context("a gift id is required")
}

pub async fn execute<S: AccountStore + 'static>(
    state: &AppState<S>,
    command: Command,
) -> Result<String> {
    let output = match command {
        Command::Status => {
            let character = state.character().await;
            let streak = state.streak.lock().await;
            let today = chrono::Local::now().date_naive();
            format!(
                "{} | level {} ({} xp, {:.0}% to next) | energy {}/{} | onboarded: {}\nstreak: {} day(s), claimable: {}\nsync: {:?}",
                character.character_class,
                character.level,
                character.experience,
                character.progress() * 100.0,
                character.energy.current,
                character.energy.max,
                character.is_onboarded,
                streak.current_streak(today),
                streak.can_claim_today(),
                state.sync.phase().await,
            )
        }
        Command::Xp(amount) => {
            let gain = state.grant_experience(amount).await;
            if gain.leveled_up() {
                format!("+{} xp, level up to {}!", amount, gain.new_level)
            } else {
                format!("+{} xp", amount)
            }
        }
        Command::Streak => {
            let claim = state.claim_streak().await?;
            format!(
                "streak {} day(s) ({:?}), +{} xp",
                claim.streak_count, claim.change, state.config.streak_bonus_xp
            )
        }
        Command::Gifts => {
            let gifts = state.gifts().await;
            if gifts.is_empty() {
                "no gifts yet".to_string()
            } else {
                let mut out = String::new();
                for gift in gifts {
                    let _ = writeln!(
                        out,
                        "{} {} [{}] {} (lvl {}, {})",
                        gift.icon, gift.id, gift.status, gift.name, gift.level_required, gift.rarity
                    );
                }
                out.trim_end().to_string()
            }
        }
        Command::AddGift {
            level_required,
            rarity,
            name,
        } => {
            let gift = state
                .gifts
                .create(
                    &state.user_id,
                    GiftDraft::new(name, level_required).with_rarity(rarity),
                )
                .await?;
            let level = state.character().await.level;
            state.gifts.unlock_eligible(&state.user_id, level).await?;
            format!("created {} '{}'", gift.id, gift.name)
        }
        Command::Claim(id) => {
            let gift = state.gifts.claim(&id).await?;
            format!("{} enjoy '{}'!", gift.icon, gift.name)
        }
        Command::SetStatus(id, status) => {
            let gift = state.gifts.update(&id, GiftPatch::status(status)).await?;
            format!("'{}' is now {}", gift.name, gift.status)
        }
        Command::Delete(id) => {
            state.gifts.delete(&id).await?;
            format!("deleted {}", id)
        }
        Command::Mystery => match state.open_mystery_reward().await? {
            MysteryOutcome::Opened(gift) => {
                format!("{} mystery reward: '{}' ({})", gift.icon, gift.name, gift.rarity)
            }
            MysteryOutcome::EmptyChest => "the chest was empty".to_string(),
            MysteryOutcome::GenerationUnavailable(_) => {
                "reward generation unavailable, try again later".to_string()
            }
        },
        Command::Create(class) => {
            let character = state.sync.create_character(class).await?;
            format!("created a level {} {}", character.level, character.character_class)
        }
        Command::Reset => {
            state.sync.update_character(|c| c.reset_progress()).await;
            "progress reset".to_string()
        }
        Command::Flush => {
            state.sync.flush().await?;
            "saved".to_string()
        }
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("status".parse::<Command>().unwrap(), Command::Status);
        assert_eq!("xp 120".parse::<Command>().unwrap(), Command::Xp(120));
        assert_eq!("  quit ".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!(
            "create ranger".parse::<Command>().unwrap(),
            Command::Create(CharacterClass::Ranger)
        );
    }

    #[test]
    fn test_parse_add_gift_joins_name() {
        let command: Command = "add 3 epic Weekend in Lisbon".parse().unwrap();
        assert_eq!(
            command,
            Command::AddGift {
                level_required: 3,
                rarity: Rarity::Epic,
                name: "Weekend in Lisbon".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_set_status() {
        let command: Command = "set-status g-1 used".parse().unwrap();
        assert_eq!(command, Command::SetStatus(GiftId::new("g-1"), GiftStatus::Used));
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Command>().is_err());
        assert!("xp lots".parse::<Command>().is_err());
        assert!("add 2 common".parse::<Command>().is_err());
        assert!("add 2 shiny Cake".parse::<Command>().is_err());
        assert!("claim".parse::<Command>().is_err());
        assert!("create bard".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }
}
