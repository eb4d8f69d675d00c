pub mod bot;
pub mod hint;
pub mod policy;

pub use bot::{BidPlanner, BotContext, BotParams, FollowPlanner, LeadPlanner};
pub use hint::{HintError, HintProvider, HintRequest, HintResponse, NoHints};
pub use policy::{
    AdvisedPolicy, Decision, DecisionSource, HeuristicPolicy, PlayChoice, Policy, PolicyContext,
};
