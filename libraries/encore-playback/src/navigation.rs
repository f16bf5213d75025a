//! Next/previous policy
//!
//! Pure functions of (direction, current index, context length, repeat mode,
//! shuffle order). The session applies the result; nothing here mutates.
//!
//! Precedence:
//! 1. Repeat One keeps the current index.
//! 2. With a shuffle order, step the cursor and always wrap. Repeat None and
//!    All behave the same here.
//! 3. Sequentially, `next` wraps to 0 only under repeat All and `previous`
//!    wraps to the last index only under repeat All.

use crate::error::{PlaybackError, Result};
use crate::shuffle::ShuffleOrder;
use crate::types::RepeatMode;

/// Navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the end of the context
    Next,

    /// Toward the start of the context
    Previous,
}

/// Resolve the context index to move to
///
/// Returns [`PlaybackError::NoTarget`] when the policy has nowhere to go.
pub fn resolve(
    direction: Direction,
    current: usize,
    len: usize,
    repeat: RepeatMode,
    shuffle: Option<&ShuffleOrder>,
) -> Result<usize> {
    if len == 0 {
        return Err(PlaybackError::NoTarget);
    }

    if repeat == RepeatMode::One {
        return Ok(current);
    }

    if let Some(order) = shuffle {
        let target = match direction {
            Direction::Next => order.peek_next(),
            Direction::Previous => order.peek_previous(),
        };
        return target.ok_or(PlaybackError::NoTarget);
    }

    match direction {
        Direction::Next => {
            let target = (current + 1) % len;
            if target == 0 && repeat != RepeatMode::All {
                Err(PlaybackError::NoTarget)
            } else {
                Ok(target)
            }
        }
        Direction::Previous => {
            if current > 0 {
                Ok(current - 1)
            } else if repeat == RepeatMode::All {
                Ok(len - 1)
            } else {
                Err(PlaybackError::NoTarget)
            }
        }
    }
}

/// Whether navigation in `direction` is available
///
/// Shuffle reports availability only when there is another entry to move to,
/// even though stepping a one-entry order would land on the same track.
pub fn is_available(
    direction: Direction,
    current: usize,
    len: usize,
    repeat: RepeatMode,
    shuffle: Option<&ShuffleOrder>,
) -> bool {
    if len == 0 {
        return false;
    }
    if repeat == RepeatMode::One {
        return true;
    }
    if let Some(order) = shuffle {
        return order.len() > 1;
    }
    resolve(direction, current, len, repeat, None).is_ok()
}
