//! Value objects - immutable domain primitives

mod direction;
mod reaction_id;
mod snowflake;

pub use direction::{Direction, DirectionParseError, ReactionMode};
pub use reaction_id::ReactionId;
pub use snowflake::{Snowflake, SnowflakeParseError};
