//! Proxy for the controlling player entity.

use std::sync::Arc;

use terrapin_types::Point;

use crate::error::Result;
use crate::remote::Remote;

/// Position query and teleport for the controlling player.
///
/// Stateless pass-through to the remote — the player is not part of the
/// cache, so nothing here touches it.
pub struct Player {
    remote: Arc<dyn Remote>,
}

impl Player {
    /// Create a proxy for the connection's controlling player.
    pub fn new(remote: Arc<dyn Remote>) -> Self {
        Self { remote }
    }

    /// The player's current tile position.
    pub fn position(&self) -> Result<Point> {
        self.remote.player_position()
    }

    /// Move the player to `to`.
    pub fn teleport(&self, to: Point) -> Result<()> {
        self.remote.teleport_player(to)
    }

    /// Teleport the player `height` cells straight up.
    pub fn jump(&self, height: i64) -> Result<()> {
        let pos = self.position()?;
        self.teleport(pos + Point::new(0, height, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryWorld;

    #[test]
    fn test_teleport_and_jump() {
        let world = Arc::new(MemoryWorld::new());
        let player = Player::new(world.clone());

        player.teleport(Point::new(10, 64, -3)).expect("teleport");
        assert_eq!(player.position().expect("pos"), Point::new(10, 64, -3));

        player.jump(2).expect("jump");
        assert_eq!(player.position().expect("pos"), Point::new(10, 66, -3));
    }
}
