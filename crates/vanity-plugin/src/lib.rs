//! Composition root for the cosmetics plugin: configuration, lifecycle,
//! event hooks, command execution, and the cosmetic storage UI model.
//!
//! The host server owns the world and the tick loop; it constructs the
//! plugin on enable, forwards events and commands, calls
//! [`CosmeticsPlugin::tick`] once per game tick, and calls
//! [`CosmeticsPlugin::disable`] on shutdown.

pub mod chat;
pub mod config;
mod events;
pub mod locker;

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use uuid::Uuid;
use vanity_command::{CommandContext, CommandResult, CosmeticsCommand};
use vanity_engine::{ArmorEquipment, CosmeticsEngine};
use vanity_item::{ConfigError, DescriptorRegistry, ItemStack};
use vanity_world::ServerWorld;

use config::{CosmeticsConfig, Messages};
use locker::CosmeticLocker;

/// The cosmetics plugin instance, alive from enable to disable.
pub struct CosmeticsPlugin {
    data_dir: PathBuf,
    config: CosmeticsConfig,
    pub engine: CosmeticsEngine,
    pub locker: CosmeticLocker,
    equipment: ArmorEquipment,
}

impl CosmeticsPlugin {
    /// Load configuration and set up the engine.
    pub fn enable(data_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let data_dir = data_dir.into();
        let config = CosmeticsConfig::load(&data_dir)?;
        info!("cosmetics plugin enabled");
        Ok(Self {
            data_dir,
            config,
            engine: CosmeticsEngine::new(),
            locker: CosmeticLocker::new(),
            equipment: ArmorEquipment,
        })
    }

    /// Drive the engine one game tick.
    pub fn tick(&mut self, world: &mut ServerWorld) {
        self.engine
            .tick(world, &self.equipment, &self.config.registry);
    }

    /// Save player lockers and tear down every attachment.
    pub fn disable(&mut self, world: &mut ServerWorld) {
        let online: Vec<Uuid> = world.online_players().map(|p| p.uuid).collect();
        for player in online {
            if let Err(err) = self.locker.save_player(&self.data_dir, player) {
                warn!(%player, %err, "failed to save cosmetic locker");
            }
        }
        self.engine.shutdown(world);
        info!("cosmetics plugin disabled");
    }

    /// Reload descriptors and messages; the previous configuration survives
    /// a failed reload.
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        self.config.reload(&self.data_dir)
    }

    pub fn registry(&self) -> &DescriptorRegistry {
        &self.config.registry
    }

    pub fn messages(&self) -> &Messages {
        &self.config.messages
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Execute a cosmetics command.
    pub fn handle_command(&mut self, world: &mut ServerWorld, ctx: &CommandContext) -> CommandResult {
        let command = match vanity_command::parse(&ctx.args) {
            Ok(command) => command,
            Err(err) => return CommandResult::err(err.usage()),
        };
        match command {
            CosmeticsCommand::Spawn { item_id, target } => {
                self.spawn_item(world, &ctx.sender_name, &item_id, target.as_deref())
            }
            CosmeticsCommand::Reload => match self.reload() {
                Ok(()) => CommandResult::ok(self.config.messages.reloaded()),
                Err(err) => {
                    warn!(%err, "configuration reload failed");
                    CommandResult::err(format!("Reload failed: {err}"))
                }
            },
            CosmeticsCommand::Storage => {
                CommandResult::ok(self.config.messages.storage_opened())
            }
            CosmeticsCommand::Help => CommandResult::ok(
                "/cosmetics spawn <item-id> [player] | storage | reload",
            ),
        }
    }

    /// Tab-complete a cosmetics command line.
    pub fn complete_command(&self, world: &ServerWorld, args: &[String]) -> Vec<String> {
        let ids = self.config.registry.ids();
        let names: Vec<&str> = world.online_players().map(|p| p.name.as_str()).collect();
        vanity_command::complete(args, &ids, &names)
    }

    fn spawn_item(
        &mut self,
        world: &mut ServerWorld,
        sender_name: &str,
        item_id: &str,
        target: Option<&str>,
    ) -> CommandResult {
        let target_name = target.unwrap_or(sender_name);
        let Some(target_uuid) = world
            .online_players()
            .find(|p| p.name.eq_ignore_ascii_case(target_name))
            .map(|p| p.uuid)
        else {
            return CommandResult::err(self.config.messages.player_not_found());
        };
        let Some(item) = ItemStack::from_descriptor(&self.config.registry, item_id) else {
            return CommandResult::err(self.config.messages.unknown_item());
        };
        if let Some(node) = self.config.registry.permission_of(item_id) {
            let allowed = world
                .player(target_uuid)
                .is_some_and(|p| p.has_permission(node));
            if !allowed {
                return CommandResult::err(self.config.messages.no_permission());
            }
        }
        if let Some(player) = world.player_mut(target_uuid) {
            player.add_item(item);
        }
        CommandResult::ok(self.config.messages.given(item_id, target_name))
    }
}
