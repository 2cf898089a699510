//! World-level errors.

use thiserror::Error;

use crate::components::AuxId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    #[error("entity {0:?} is not valid")]
    EntityNotFound(AuxId),

    #[error("player is not online")]
    PlayerOffline,

    #[error("entity {0:?} cannot hold a leash")]
    NotLeashable(AuxId),
}
