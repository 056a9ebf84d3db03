use pooltrivia_shared::config::RulesConfig;

/// A seat at the table. Humans are `P1..`, NPCs are `N1..`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub label: String,
    pub is_npc: bool,
}

impl Player {
    pub fn human(n: u32) -> Self {
        Self {
            id: format!("P{n}"),
            label: format!("Player {n}"),
            is_npc: false,
        }
    }

    pub fn npc(n: u32) -> Self {
        Self {
            id: format!("N{n}"),
            label: format!("NPC {n}"),
            is_npc: true,
        }
    }
}

/// Player counts from the setup modal after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setup {
    pub humans: u32,
    pub npcs: u32,
}

impl Setup {
    /// Clamp raw input. A missing or zero human count means one human;
    /// a missing NPC count means none.
    pub fn from_counts(human_count: Option<i64>, npc_count: Option<i64>, rules: &RulesConfig) -> Self {
        let humans = match human_count {
            Some(n) if n != 0 => n.clamp(1, rules.max_humans as i64),
            _ => 1,
        };
        let npcs = npc_count.unwrap_or(0).clamp(0, rules.max_npcs as i64);
        Self {
            humans: humans as u32,
            npcs: npcs as u32,
        }
    }

    /// Humans first, then NPCs, in seat order.
    pub fn roster(&self) -> Vec<Player> {
        let mut players: Vec<Player> = (1..=self.humans).map(Player::human).collect();
        players.extend((1..=self.npcs).map(Player::npc));
        if players.is_empty() {
            players.push(Player::human(1));
        }
        players
    }
}
