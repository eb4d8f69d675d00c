/// Tunables for the heuristic planners.
#[derive(Debug, Clone, PartialEq)]
pub struct BotParams {
    /// Hand strength at or above which a bot claims the landlord seat.
    pub claim_threshold: i32,
    pub big_joker_weight: i32,
    pub small_joker_weight: i32,
    pub two_weight: i32,
    pub ace_weight: i32,
    pub bomb_weight: i32,
    pub rocket_bonus: i32,
}

impl Default for BotParams {
    fn default() -> Self {
        Self {
            claim_threshold: 7,
            big_joker_weight: 4,
            small_joker_weight: 3,
            two_weight: 2,
            ace_weight: 1,
            bomb_weight: 4,
            rocket_bonus: 1,
        }
    }
}

impl BotParams {
    pub fn with_claim_threshold(mut self, threshold: i32) -> Self {
        self.claim_threshold = threshold;
        self
    }
}
