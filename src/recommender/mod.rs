//! Contextual-bandit model recommender.
//!
//! - `features`: typed request context and its one-hot encoding
//! - `engine`: LinUCB scoring, selection and online updates
//! - `policy`: per-action sufficient statistics and their snapshot form
//! - `shared` / `store`: concurrent access and durable persistence
//! - `catalog`, `rewards`, `training`: the candidate models and offline simulation
//! - `service`: the context-level API used by the CLI and serve loop

pub mod catalog;
pub mod engine;
pub mod features;
pub mod linalg;
pub mod policy;
pub mod rewards;
pub mod service;
pub mod shared;
pub mod store;
pub mod training;

pub use catalog::{ActionCatalog, ModelCard, ModelCatalog};
pub use engine::{ActionScore, LinUcb};
pub use features::{
    Budget, Context, DatasetSize, Domain, FEATURE_DIM, FeatureEncoder, OneHotEncoder, Task,
    feature_names,
};
pub use policy::{PolicyConfig, PolicySnapshot, PolicyState};
pub use rewards::{ConstantRewards, HeuristicRewarder, RewardSource};
pub use service::{Recommendation, Recommender};
pub use shared::SharedPolicy;
pub use store::{JsonFileStore, MemoryStore, PolicyStore};
pub use training::{ContextSampler, TrainOptions, TrainReport, train};
