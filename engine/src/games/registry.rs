//! Game registry: per-game configuration, metadata, and active flags.
//!
//! Configurations hold the tunable constants of each engine (house
//! edges, event probabilities, variant selection). The observed defaults
//! are starting points, not law; operators adjust them here rather than
//! in engine code. Each config round-trips through a compact byte
//! encoding for storage.

use super::cards::BLACKJACK_DECKS;
use fortuna_types::GameType;
use std::collections::HashMap;

/// Per-game configuration values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameConfig {
    Crash(CrashConfig),
    PaylineSlots(PaylineConfig),
    ClusterSlots(ClusterConfig),
    Mines(MinesConfig),
    Blackjack(BlackjackConfig),
    Holdem(HoldemConfig),
    Roulette(RouletteConfig),
    Penalty(PenaltyConfig),
}

impl GameConfig {
    /// Create a default configuration for a game type.
    pub fn default_for(game_type: GameType) -> Self {
        match game_type {
            GameType::Crash => Self::Crash(CrashConfig::default()),
            GameType::PaylineSlots => Self::PaylineSlots(PaylineConfig::default()),
            GameType::ClusterSlots => Self::ClusterSlots(ClusterConfig::default()),
            GameType::Mines => Self::Mines(MinesConfig::default()),
            GameType::Blackjack => Self::Blackjack(BlackjackConfig::default()),
            GameType::Holdem => Self::Holdem(HoldemConfig::default()),
            GameType::Roulette => Self::Roulette(RouletteConfig::default()),
            GameType::Penalty => Self::Penalty(PenaltyConfig::default()),
        }
    }

    /// Get the game type for this configuration.
    pub fn game_type(&self) -> GameType {
        match self {
            Self::Crash(_) => GameType::Crash,
            Self::PaylineSlots(_) => GameType::PaylineSlots,
            Self::ClusterSlots(_) => GameType::ClusterSlots,
            Self::Mines(_) => GameType::Mines,
            Self::Blackjack(_) => GameType::Blackjack,
            Self::Holdem(_) => GameType::Holdem,
            Self::Roulette(_) => GameType::Roulette,
            Self::Penalty(_) => GameType::Penalty,
        }
    }

    /// Encode configuration to bytes for storage.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Crash(c) => c.to_bytes(),
            Self::PaylineSlots(c) => c.to_bytes(),
            Self::ClusterSlots(c) => c.to_bytes(),
            Self::Mines(c) => c.to_bytes(),
            Self::Blackjack(c) => c.to_bytes(),
            Self::Holdem(c) => c.to_bytes(),
            Self::Roulette(c) => c.to_bytes(),
            Self::Penalty(c) => c.to_bytes(),
        }
    }

    /// Decode configuration from bytes. Short or empty input yields the
    /// defaults for the game type.
    pub fn from_bytes(game_type: GameType, bytes: &[u8]) -> Option<Self> {
        match game_type {
            GameType::Crash => CrashConfig::from_bytes(bytes).map(Self::Crash),
            GameType::PaylineSlots => PaylineConfig::from_bytes(bytes).map(Self::PaylineSlots),
            GameType::ClusterSlots => ClusterConfig::from_bytes(bytes).map(Self::ClusterSlots),
            GameType::Mines => MinesConfig::from_bytes(bytes).map(Self::Mines),
            GameType::Blackjack => BlackjackConfig::from_bytes(bytes).map(Self::Blackjack),
            GameType::Holdem => HoldemConfig::from_bytes(bytes).map(Self::Holdem),
            GameType::Roulette => RouletteConfig::from_bytes(bytes).map(Self::Roulette),
            GameType::Penalty => PenaltyConfig::from_bytes(bytes).map(Self::Penalty),
        }
    }

    // Engines take `&GameConfig` and read their own variant; a
    // mismatched variant falls back to the engine's defaults so a
    // mis-wired registry can never abort a round.

    pub(crate) fn crash(&self) -> CrashConfig {
        match self {
            Self::Crash(c) => *c,
            _ => CrashConfig::default(),
        }
    }

    pub(crate) fn payline(&self) -> PaylineConfig {
        match self {
            Self::PaylineSlots(c) => *c,
            _ => PaylineConfig::default(),
        }
    }

    pub(crate) fn cluster(&self) -> ClusterConfig {
        match self {
            Self::ClusterSlots(c) => *c,
            _ => ClusterConfig::default(),
        }
    }

    pub(crate) fn mines(&self) -> MinesConfig {
        match self {
            Self::Mines(c) => *c,
            _ => MinesConfig::default(),
        }
    }

    pub(crate) fn blackjack(&self) -> BlackjackConfig {
        match self {
            Self::Blackjack(c) => *c,
            _ => BlackjackConfig::default(),
        }
    }

    pub(crate) fn holdem(&self) -> HoldemConfig {
        match self {
            Self::Holdem(c) => *c,
            _ => HoldemConfig::default(),
        }
    }

    pub(crate) fn roulette(&self) -> RouletteConfig {
        match self {
            Self::Roulette(c) => *c,
            _ => RouletteConfig::default(),
        }
    }

    pub(crate) fn penalty(&self) -> PenaltyConfig {
        match self {
            Self::Penalty(c) => *c,
            _ => PenaltyConfig::default(),
        }
    }
}

// ============================================================================
// Per-game configuration structs
// ============================================================================

/// Crash engine configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CrashConfig {
    /// Probability of an instant 1.00x bust, in basis points.
    pub instant_bust_bps: u16,
    /// Growth-rate constant `k` per second, in basis points (800 = 0.08/s).
    pub growth_rate_bps: u16,
    /// Numerator of the crash-point formula, in basis points
    /// (9_900 = 0.99, the baked-in house edge).
    pub payout_numerator_bps: u16,
    /// Cap on the sampled crash point, in basis points.
    pub max_crash_bps: u64,
}

impl Default for CrashConfig {
    fn default() -> Self {
        Self {
            instant_bust_bps: 300,
            growth_rate_bps: 800,
            payout_numerator_bps: 9_900,
            max_crash_bps: 100_000_000, // 10_000.00x
        }
    }
}

impl CrashConfig {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(14);
        out.extend_from_slice(&self.instant_bust_bps.to_be_bytes());
        out.extend_from_slice(&self.growth_rate_bps.to_be_bytes());
        out.extend_from_slice(&self.payout_numerator_bps.to_be_bytes());
        out.extend_from_slice(&self.max_crash_bps.to_be_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 14 {
            return Some(Self::default());
        }
        Some(Self {
            instant_bust_bps: u16::from_be_bytes([bytes[0], bytes[1]]),
            growth_rate_bps: u16::from_be_bytes([bytes[2], bytes[3]]),
            payout_numerator_bps: u16::from_be_bytes([bytes[4], bytes[5]]),
            max_crash_bps: u64::from_be_bytes([
                bytes[6], bytes[7], bytes[8], bytes[9], bytes[10], bytes[11], bytes[12], bytes[13],
            ]),
        })
    }
}

/// Payline slot variant (symbol table + stake unit).
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaylineVariant {
    /// 7-symbol table, wild pays 250x, stake unit is bet/10.
    #[default]
    FortuneTiger = 0,
    /// 6-symbol table, wild pays 30x, stake unit is the full bet.
    FortuneMouse = 1,
}

impl PaylineVariant {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::FortuneTiger),
            1 => Some(Self::FortuneMouse),
            _ => None,
        }
    }
}

/// Payline slots configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaylineConfig {
    pub variant: PaylineVariant,
}

impl PaylineConfig {
    pub fn to_bytes(&self) -> Vec<u8> {
        vec![self.variant as u8]
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return Some(Self::default());
        }
        Some(Self {
            variant: PaylineVariant::from_u8(bytes[0])?,
        })
    }
}

/// Cluster slots configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClusterConfig {
    /// Probability of the multiplier-boost event per winning tumble, bps.
    pub boost_probability_bps: u16,
    /// Inclusive bounds of the random integer boost.
    pub boost_min: u8,
    pub boost_max: u8,
    /// Hard cap on tumble steps per spin (engine guard).
    pub max_tumbles: u8,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            boost_probability_bps: 3_000,
            boost_min: 2,
            boost_max: 26,
            max_tumbles: 32,
        }
    }
}

impl ClusterConfig {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(5);
        out.extend_from_slice(&self.boost_probability_bps.to_be_bytes());
        out.push(self.boost_min);
        out.push(self.boost_max);
        out.push(self.max_tumbles);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 5 {
            return Some(Self::default());
        }
        let config = Self {
            boost_probability_bps: u16::from_be_bytes([bytes[0], bytes[1]]),
            boost_min: bytes[2],
            boost_max: bytes[3],
            max_tumbles: bytes[4],
        };
        if config.boost_min > config.boost_max || config.max_tumbles == 0 {
            return None;
        }
        Some(config)
    }
}

/// Mines configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinesConfig {
    /// House-edge factor applied to the fair multiplier, bps (9_500 = 0.95).
    pub house_edge_bps: u16,
    /// Bomb count used when the round does not specify one.
    pub default_bombs: u8,
}

impl Default for MinesConfig {
    fn default() -> Self {
        Self {
            house_edge_bps: 9_500,
            default_bombs: 3,
        }
    }
}

impl MinesConfig {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(3);
        out.extend_from_slice(&self.house_edge_bps.to_be_bytes());
        out.push(self.default_bombs);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 3 {
            return Some(Self::default());
        }
        Some(Self {
            house_edge_bps: u16::from_be_bytes([bytes[0], bytes[1]]),
            default_bombs: bytes[2],
        })
    }
}

/// Blackjack configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlackjackConfig {
    /// Number of decks in the shoe.
    pub decks: u8,
}

impl Default for BlackjackConfig {
    fn default() -> Self {
        Self {
            decks: BLACKJACK_DECKS,
        }
    }
}

impl BlackjackConfig {
    pub fn to_bytes(&self) -> Vec<u8> {
        vec![self.decks]
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return Some(Self::default());
        }
        if bytes[0] == 0 {
            return None;
        }
        Some(Self { decks: bytes[0] })
    }
}

/// Hold'em configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HoldemConfig {
    /// Call size as a multiple of the ante.
    pub call_multiple: u8,
}

impl Default for HoldemConfig {
    fn default() -> Self {
        Self { call_multiple: 2 }
    }
}

impl HoldemConfig {
    pub fn to_bytes(&self) -> Vec<u8> {
        vec![self.call_multiple]
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return Some(Self::default());
        }
        if bytes[0] == 0 {
            return None;
        }
        Some(Self {
            call_multiple: bytes[0],
        })
    }
}

/// Roulette configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouletteConfig {
    /// Maximum number of simultaneous bets on one sheet.
    pub max_bets: u8,
}

impl Default for RouletteConfig {
    fn default() -> Self {
        Self { max_bets: 16 }
    }
}

impl RouletteConfig {
    pub fn to_bytes(&self) -> Vec<u8> {
        vec![self.max_bets]
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return Some(Self::default());
        }
        if bytes[0] == 0 {
            return None;
        }
        Some(Self { max_bets: bytes[0] })
    }
}

/// Penalty shootout configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PenaltyConfig {
    /// Force an auto-cash-out once the ladder's last rung is reached.
    /// The ladder is fixed-length; behavior past it is a policy choice,
    /// and forcing the cash-out keeps payouts bounded by the table.
    pub auto_cashout_at_ladder_end: bool,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            auto_cashout_at_ladder_end: true,
        }
    }
}

impl PenaltyConfig {
    pub fn to_bytes(&self) -> Vec<u8> {
        vec![self.auto_cashout_at_ladder_end as u8]
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return Some(Self::default());
        }
        Some(Self {
            auto_cashout_at_ladder_end: bytes[0] != 0,
        })
    }
}

// ============================================================================
// Game metadata
// ============================================================================

/// Game category for catalogue grouping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameCategory {
    Slots,
    Cards,
    Table,
    Arcade,
}

/// Static metadata about a game.
#[derive(Clone, Debug)]
pub struct GameInfo {
    pub game_type: GameType,
    pub name: &'static str,
    pub description: &'static str,
    pub category: GameCategory,
    pub min_bet: u64,
    pub max_bet: u64,
    /// Typical house edge in basis points.
    pub house_edge_bps: u16,
    pub active: bool,
}

impl GameInfo {
    const fn new(
        game_type: GameType,
        name: &'static str,
        description: &'static str,
        category: GameCategory,
        min_bet: u64,
        max_bet: u64,
        house_edge_bps: u16,
    ) -> Self {
        Self {
            game_type,
            name,
            description,
            category,
            min_bet,
            max_bet,
            house_edge_bps,
            active: true,
        }
    }
}

// ============================================================================
// Game registry
// ============================================================================

/// Registry of available games and their configurations.
#[derive(Clone, Debug)]
pub struct GameRegistry {
    configs: HashMap<GameType, GameConfig>,
    active: HashMap<GameType, bool>,
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRegistry {
    /// Create a new registry with all games using default configurations.
    pub fn new() -> Self {
        let mut configs = HashMap::new();
        let mut active = HashMap::new();
        for game_type in GameType::ALL {
            configs.insert(game_type, GameConfig::default_for(game_type));
            active.insert(game_type, true);
        }
        Self { configs, active }
    }

    /// Get static metadata for a game type.
    pub fn get_info(game_type: GameType) -> GameInfo {
        match game_type {
            GameType::Crash => GameInfo::new(
                GameType::Crash,
                "Aviator",
                "Cash out before the multiplier crashes.",
                GameCategory::Arcade,
                1,
                10_000,
                100, // 1.00% from the 0.99 numerator
            ),
            GameType::PaylineSlots => GameInfo::new(
                GameType::PaylineSlots,
                "Fortune Reels",
                "3x3 reels with five paylines and a substituting wild.",
                GameCategory::Slots,
                // One stake unit: line wins are paid in tenths of the bet.
                10,
                5_000,
                400,
            ),
            GameType::ClusterSlots => GameInfo::new(
                GameType::ClusterSlots,
                "Gates",
                "Cluster pays anywhere with tumbling reels and bolt multipliers.",
                GameCategory::Slots,
                // Keeps the smallest scatter (2x at eight copies) above zero.
                10,
                5_000,
                450,
            ),
            GameType::Mines => GameInfo::new(
                GameType::Mines,
                "Mines",
                "Reveal safe tiles and cash out before hitting a bomb.",
                GameCategory::Arcade,
                1,
                10_000,
                500, // 5.00% from the 0.95 edge factor
            ),
            GameType::Blackjack => GameInfo::new(
                GameType::Blackjack,
                "Blackjack",
                "Beat the dealer to 21 without going bust.",
                GameCategory::Cards,
                1,
                5_000,
                60,
            ),
            GameType::Holdem => GameInfo::new(
                GameType::Holdem,
                "Casino Hold'em",
                "Heads-up hold'em: fold the ante or call and show down.",
                GameCategory::Cards,
                1,
                5_000,
                220,
            ),
            GameType::Roulette => GameInfo::new(
                GameType::Roulette,
                "Roulette",
                "Single-zero wheel with straight, even-money, and dozen bets.",
                GameCategory::Table,
                1,
                10_000,
                270, // 2.70% European
            ),
            GameType::Penalty => GameInfo::new(
                GameType::Penalty,
                "Penalty Shootout",
                "Pick a corner, beat the keeper, ride the ladder.",
                GameCategory::Arcade,
                1,
                5_000,
                400, // 1.92x on a 4/5 event
            ),
        }
    }

    /// Check if a game is active.
    pub fn is_active(&self, game_type: GameType) -> bool {
        self.active.get(&game_type).copied().unwrap_or(false)
    }

    /// Set a game's active status.
    pub fn set_active(&mut self, game_type: GameType, active: bool) {
        self.active.insert(game_type, active);
    }

    /// Get all active games.
    pub fn active_games(&self) -> Vec<GameType> {
        GameType::ALL
            .iter()
            .copied()
            .filter(|gt| self.is_active(*gt))
            .collect()
    }

    /// Get configuration for a game.
    pub fn get_config(&self, game_type: GameType) -> Option<&GameConfig> {
        self.configs.get(&game_type)
    }

    /// Set configuration for a game.
    pub fn set_config(&mut self, config: GameConfig) {
        self.configs.insert(config.game_type(), config);
    }

    /// Get all game info with current active status.
    pub fn all_games_info(&self) -> Vec<GameInfo> {
        GameType::ALL
            .iter()
            .map(|&gt| {
                let mut info = Self::get_info(gt);
                info.active = self.is_active(gt);
                info
            })
            .collect()
    }

    /// Get games by category.
    pub fn games_by_category(&self, category: GameCategory) -> Vec<GameType> {
        GameType::ALL
            .iter()
            .copied()
            .filter(|&gt| Self::get_info(gt).category == category)
            .collect()
    }

    /// Load configuration from bytes (for persistence).
    pub fn load_config(&mut self, game_type: GameType, bytes: &[u8]) -> bool {
        if let Some(config) = GameConfig::from_bytes(game_type, bytes) {
            self.configs.insert(game_type, config);
            true
        } else {
            false
        }
    }

    /// Export configuration to bytes (for persistence).
    pub fn export_config(&self, game_type: GameType) -> Option<Vec<u8>> {
        self.configs.get(&game_type).map(|c| c.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_default_covers_all_games() {
        let registry = GameRegistry::default();
        for game_type in GameType::ALL {
            assert!(registry.is_active(game_type), "{:?} should be active", game_type);
            assert!(
                registry.get_config(game_type).is_some(),
                "{:?} should have config",
                game_type
            );
        }
    }

    #[test]
    fn set_active_filters() {
        let mut registry = GameRegistry::new();
        assert_eq!(registry.active_games().len(), 8);

        registry.set_active(GameType::Crash, false);
        registry.set_active(GameType::Penalty, false);

        let active = registry.active_games();
        assert_eq!(active.len(), 6);
        assert!(!active.contains(&GameType::Crash));
        assert!(!active.contains(&GameType::Penalty));
    }

    #[test]
    fn config_round_trip() {
        let registry = GameRegistry::new();
        for game_type in GameType::ALL {
            let config = registry.get_config(game_type).expect("config");
            let bytes = config.to_bytes();
            let decoded = GameConfig::from_bytes(game_type, &bytes).expect("decode");
            assert_eq!(config, &decoded, "{:?} config round trip failed", game_type);
        }
    }

    #[test]
    fn empty_bytes_yield_defaults() {
        for game_type in GameType::ALL {
            let decoded = GameConfig::from_bytes(game_type, &[]).expect("defaults");
            assert_eq!(decoded, GameConfig::default_for(game_type));
        }
    }

    #[test]
    fn config_game_type_matches() {
        for game_type in GameType::ALL {
            assert_eq!(GameConfig::default_for(game_type).game_type(), game_type);
        }
    }

    #[test]
    fn mismatched_variant_falls_back_to_defaults() {
        let config = GameConfig::default_for(GameType::Roulette);
        assert_eq!(config.crash(), CrashConfig::default());
        assert_eq!(config.mines(), MinesConfig::default());
    }

    #[test]
    fn cluster_config_rejects_inverted_bounds() {
        // boost_min > boost_max
        let bytes = [0x0B, 0xB8, 26, 2, 32];
        assert_eq!(ClusterConfig::from_bytes(&bytes), None);
    }

    #[test]
    fn load_export_round_trip() {
        let mut registry = GameRegistry::new();
        registry.set_config(GameConfig::Mines(MinesConfig {
            house_edge_bps: 9_700,
            default_bombs: 5,
        }));

        let bytes = registry.export_config(GameType::Mines).expect("export");
        let mut fresh = GameRegistry::new();
        assert!(fresh.load_config(GameType::Mines, &bytes));
        assert_eq!(
            fresh.get_config(GameType::Mines),
            registry.get_config(GameType::Mines)
        );
    }

    #[test]
    fn categories_group_games() {
        let registry = GameRegistry::new();
        let slots = registry.games_by_category(GameCategory::Slots);
        assert!(slots.contains(&GameType::PaylineSlots));
        assert!(slots.contains(&GameType::ClusterSlots));

        let cards = registry.games_by_category(GameCategory::Cards);
        assert!(cards.contains(&GameType::Blackjack));
        assert!(cards.contains(&GameType::Holdem));

        let arcade = registry.games_by_category(GameCategory::Arcade);
        assert!(arcade.contains(&GameType::Crash));
        assert!(arcade.contains(&GameType::Mines));
        assert!(arcade.contains(&GameType::Penalty));
    }
}
